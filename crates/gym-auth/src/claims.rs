use super::*;
use gym_core::ID;

/// Which job a token was minted for. Access tokens open guarded routes;
/// refresh tokens only buy new pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Access,
    Refresh,
}

/// JWT payload: who the token speaks for, what they may do, and for how long.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Claims {
    pub sub: uuid::Uuid,
    pub typ: Kind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// Expiry saturates at `i64::MAX` rather than wrapping.
    pub fn new(kind: Kind, user: ID<Member>, role: Option<Role>, ttl: std::time::Duration) -> Self {
        let now = jsonwebtoken::get_current_timestamp() as i64;
        let exp = i64::try_from(ttl.as_secs())
            .ok()
            .and_then(|ttl| now.checked_add(ttl))
            .unwrap_or(i64::MAX);
        Self {
            sub: user.inner(),
            typ: kind,
            role,
            iat: now,
            exp,
        }
    }
    pub fn expired(&self) -> bool {
        self.exp < jsonwebtoken::get_current_timestamp() as i64
    }
    pub fn kind(&self) -> Kind {
        self.typ
    }
    pub fn user(&self) -> ID<Member> {
        ID::from(self.sub)
    }
    pub fn role(&self) -> Option<Role> {
        self.role
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn expiry_is_issue_time_plus_ttl() {
        let claims = Claims::new(Kind::Access, ID::default(), None, Duration::from_secs(600));
        assert_eq!(claims.exp - claims.iat, 600);
        assert!(!claims.expired());
    }

    #[test]
    fn roleless_claims_omit_the_field() {
        let claims = Claims::new(Kind::Access, ID::default(), None, Duration::from_secs(1));
        let json = serde_json::to_value(&claims).unwrap();
        assert!(json.get("role").is_none());
        let back = serde_json::from_value::<Claims>(json).unwrap();
        assert_eq!(back.role(), None);
    }

    #[test]
    fn kind_is_serialized_lowercase() {
        let claims = Claims::new(Kind::Refresh, ID::default(), None, Duration::from_secs(1));
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["typ"], "refresh");
    }

    #[test]
    fn claims_without_kind_do_not_parse() {
        let json = serde_json::json!({
            "sub": uuid::Uuid::now_v7(),
            "iat": 0,
            "exp": 1,
        });
        assert!(serde_json::from_value::<Claims>(json).is_err());
    }

    #[test]
    fn huge_ttl_saturates_instead_of_overflowing() {
        for ttl in [Duration::MAX, Duration::from_secs(u64::MAX), Duration::from_secs(i64::MAX as u64)] {
            let claims = Claims::new(Kind::Access, ID::default(), None, ttl);
            assert_eq!(claims.exp, i64::MAX);
            assert!(!claims.expired());
        }
    }
}

use super::*;
use gym_core::ACCESS_TTL;
use gym_core::ID;
use gym_core::REFRESH_TTL;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use std::time::Duration;

/// Token service: JWT signing and verification.
///
/// Holds only the keys and lifetimes it was built with. Validity of a token
/// is decided by signature and `exp` alone, with no server-side lookup.
pub struct Crypto {
    header: Header,
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    access: Duration,
    refresh: Duration,
}

impl Crypto {
    /// HS256 over a shared secret.
    pub fn hmac(secret: &[u8]) -> Self {
        Self::keyed(
            EncodingKey::from_secret(secret),
            DecodingKey::from_secret(secret),
            Algorithm::HS256,
        )
    }
    /// RS256 over a PEM-encoded key pair.
    pub fn rsa(private: &[u8], public: &[u8]) -> Result<Self, Failure> {
        Ok(Self::keyed(
            EncodingKey::from_rsa_pem(private).map_err(Failure::internal)?,
            DecodingKey::from_rsa_pem(public).map_err(Failure::internal)?,
            Algorithm::RS256,
        ))
    }
    fn keyed(encoding: EncodingKey, decoding: DecodingKey, algorithm: Algorithm) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            header: Header::new(algorithm),
            encoding,
            decoding,
            validation,
            access: ACCESS_TTL,
            refresh: REFRESH_TTL,
        }
    }
    pub fn with_ttl(self, access: Duration, refresh: Duration) -> Self {
        Self {
            access,
            refresh,
            ..self
        }
    }
}

impl Crypto {
    /// Short-lived access token for Authorization headers.
    pub fn sign(&self, user: ID<Member>, role: Option<Role>) -> Result<String, Failure> {
        self.issue(Kind::Access, user, role, self.access)
    }
    /// Long-lived token for minting fresh access tokens.
    pub fn refresh(&self, user: ID<Member>, role: Option<Role>) -> Result<String, Failure> {
        self.issue(Kind::Refresh, user, role, self.refresh)
    }
    pub fn issue(
        &self,
        kind: Kind,
        user: ID<Member>,
        role: Option<Role>,
        ttl: Duration,
    ) -> Result<String, Failure> {
        self.encode(&Claims::new(kind, user, role, ttl))
    }
    pub fn encode(&self, claims: &Claims) -> Result<String, Failure> {
        jsonwebtoken::encode(&self.header, claims, &self.encoding).map_err(Failure::internal)
    }
    /// Bad signature, expiry, and malformed input all collapse into
    /// `InvalidToken`. The underlying cause only reaches the debug log.
    pub fn verify(&self, token: &str) -> Result<Claims, Failure> {
        std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
        }))
        .map_err(|_| String::from("decoder panicked"))
        .and_then(|decoded| decoded.map_err(|e| e.to_string()))
        .map(|data| data.claims)
        .inspect_err(|cause| log::debug!("[crypto] rejected token: {}", cause))
        .map_err(|_| Failure::InvalidToken)
    }
    /// [`Self::verify`], then refuse tokens minted for the other job.
    pub fn verify_as(&self, token: &str, kind: Kind) -> Result<Claims, Failure> {
        self.verify(token).and_then(|claims| match claims.kind() {
            k if k == kind => Ok(claims),
            k => {
                log::debug!("[crypto] rejected {:?} token where {:?} was expected", k, kind);
                Err(Failure::InvalidToken)
            }
        })
    }
    pub fn access_ttl(&self) -> Duration {
        self.access
    }
    pub fn refresh_ttl(&self) -> Duration {
        self.refresh
    }
}

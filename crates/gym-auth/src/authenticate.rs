use super::*;
use gym_core::ID;
use gym_core::Unique;
use std::sync::Arc;

/// Sign-in, sign-up, and token renewal over a member store.
///
/// Collaborators are handed in at construction; nothing is looked up from
/// ambient state.
pub struct Authenticator<R> {
    members: R,
    hasher: Hasher,
    crypto: Arc<Crypto>,
}

impl<R> Authenticator<R>
where
    R: Members,
{
    pub fn new(members: R, hasher: Hasher, crypto: Arc<Crypto>) -> Self {
        Self {
            members,
            hasher,
            crypto,
        }
    }
    pub fn crypto(&self) -> &Arc<Crypto> {
        &self.crypto
    }

    /// Resolves an email and password to the member they belong to.
    ///
    /// Unknown email and wrong password are the same failure, and both
    /// paths spend one password verification.
    pub async fn identify(&self, email: &str, password: &str) -> Result<Member, Failure> {
        match self.members.lookup(email).await? {
            Some((member, stored)) if self.hasher.verify(password, &stored) => Ok(member),
            Some(_) => {
                log::debug!("[auth] wrong password for {}", email);
                Err(Failure::InvalidCredentials)
            }
            None => {
                self.hasher.decoy(password);
                log::debug!("[auth] unknown email {}", email);
                Err(Failure::InvalidCredentials)
            }
        }
    }

    /// Verifies credentials and signs an access token for the member.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<String, Failure> {
        let member = self.identify(email, password).await?;
        self.crypto.sign(member.id(), Some(member.role()))
    }

    /// Like [`Self::authenticate`], but also mints a refresh token.
    pub async fn login(&self, email: &str, password: &str) -> Result<Tokens, Failure> {
        let member = self.identify(email, password).await?;
        log::info!("[auth] {} signed in", member.id());
        self.grant(member.id(), Some(member.role()))
    }

    /// Trades a refresh token for a fresh pair with the same subject and role.
    /// Access tokens are refused.
    pub fn renew(&self, refresh_token: &str) -> Result<Tokens, Failure> {
        let claims = self.crypto.verify_as(refresh_token, Kind::Refresh)?;
        self.grant(claims.user(), claims.role())
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<Member, Failure> {
        if name.trim().is_empty() {
            return Err(Failure::Validation("name must not be empty".into()));
        }
        if !email.contains('@') {
            return Err(Failure::Validation("email is not valid".into()));
        }
        let password = self.hasher.create(password)?;
        if self.members.exists(email).await? {
            return Err(Failure::Conflict);
        }
        let member = Member::new(ID::default(), name.to_string(), email.to_string(), Role::Member);
        self.members.create(&member, &password).await?;
        log::info!("[auth] registered {}", member.id());
        Ok(member)
    }

    pub async fn profile(&self, id: ID<Member>) -> Result<Member, Failure> {
        self.members.find(id).await?.ok_or(Failure::NotFound)
    }

    fn grant(&self, user: ID<Member>, role: Option<Role>) -> Result<Tokens, Failure> {
        Ok(Tokens {
            token: self.crypto.sign(user, role)?,
            refresh_token: self.crypto.refresh(user, role)?,
        })
    }
}

use super::*;
use actix_web::HttpMessage;
use actix_web::dev::ServiceRequest;
use actix_web::http::header::AUTHORIZATION;
use std::sync::Arc;

/// A request-pipeline stage that may end the request before its handler.
pub trait Guard {
    fn check(&self, req: &ServiceRequest) -> Result<(), Failure>;
}

/// Verifies the bearer token and attaches its [`Claims`] to the request.
pub struct Authenticate {
    crypto: Arc<Crypto>,
}

impl Authenticate {
    pub fn new(crypto: Arc<Crypto>) -> Self {
        Self { crypto }
    }
    /// Missing or non-bearer headers are `Unauthenticated`;
    /// anything the token service refuses, refresh tokens included, is
    /// `InvalidToken`.
    pub fn claims(&self, header: Option<&str>) -> Result<Claims, Failure> {
        let token = header.and_then(bearer).ok_or(Failure::Unauthenticated)?;
        self.crypto.verify_as(token, Kind::Access)
    }
}

fn bearer(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

impl Guard for Authenticate {
    fn check(&self, req: &ServiceRequest) -> Result<(), Failure> {
        let header = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok());
        let claims = self
            .claims(header)
            .inspect_err(|f| log::debug!("[guard] {} {} rejected: {}", req.method(), req.path(), f))?;
        req.extensions_mut().insert(claims);
        Ok(())
    }
}

/// Admits only requests whose authenticated role is one of `roles`.
/// Must sit after [`Authenticate`] in the chain.
pub struct Authorize {
    roles: Vec<Role>,
}

impl Authorize {
    pub fn new(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            roles: roles.into_iter().collect(),
        }
    }
    pub fn admin() -> Self {
        Self::new([Role::Admin])
    }
    pub fn permits(&self, claims: &Claims) -> bool {
        claims
            .role()
            .is_some_and(|role| self.roles.contains(&role))
    }
}

impl Guard for Authorize {
    fn check(&self, req: &ServiceRequest) -> Result<(), Failure> {
        let ref extensions = req.extensions();
        let claims = extensions.get::<Claims>().ok_or_else(|| {
            Failure::internal(format!("{} has a role check but no authentication", req.path()))
        })?;
        if self.permits(claims) {
            Ok(())
        } else {
            log::warn!("[guard] {} denied {}", claims.user(), req.path());
            Err(Failure::Forbidden)
        }
    }
}

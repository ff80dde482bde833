use super::*;
use actix_web::Error;
use actix_web::FromRequest;
use actix_web::HttpMessage;
use actix_web::HttpRequest;
use actix_web::body::EitherBody;
use actix_web::dev::Payload;
use actix_web::dev::Service;
use actix_web::dev::ServiceRequest;
use actix_web::dev::ServiceResponse;
use actix_web::dev::Transform;
use actix_web::dev::forward_ready;
use futures::future::LocalBoxFuture;
use gym_core::ID;
use std::future::Ready;
use std::future::ready;
use std::rc::Rc;
use std::sync::Arc;

/// Ordered guard chain, attached per resource with `.wrap(...)`.
///
/// Guards run first to last. The first failure becomes the response and
/// the wrapped handler never runs. Routes without a `Guarded` wrapper are
/// public.
///
/// ```ignore
/// web::resource("/members/{id}")
///     .route(web::get().to(profile::<Roster>))
///     .wrap(Guarded::restricted(crypto.clone(), [Role::Admin]))
/// ```
#[derive(Clone, Default)]
pub struct Guarded {
    guards: Vec<Rc<dyn Guard>>,
}

impl Guarded {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn then(mut self, guard: impl Guard + 'static) -> Self {
        self.guards.push(Rc::new(guard));
        self
    }
    pub fn authenticated(crypto: Arc<Crypto>) -> Self {
        Self::new().then(Authenticate::new(crypto))
    }
    pub fn restricted(crypto: Arc<Crypto>, roles: impl IntoIterator<Item = Role>) -> Self {
        Self::authenticated(crypto).then(Authorize::new(roles))
    }
    fn admit(&self, req: &ServiceRequest) -> Result<(), Failure> {
        self.guards.iter().try_for_each(|guard| guard.check(req))
    }
}

impl<S, B> Transform<S, ServiceRequest> for Guarded
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = GuardedService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(GuardedService {
            service,
            chain: self.clone(),
        }))
    }
}

pub struct GuardedService<S> {
    service: S,
    chain: Guarded,
}

impl<S, B> Service<ServiceRequest> for GuardedService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match self.chain.admit(&req) {
            Ok(()) => {
                let next = self.service.call(req);
                Box::pin(async move { next.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(failure) => {
                let rejected = req.error_response(failure).map_into_right_body();
                Box::pin(async move { Ok(rejected) })
            }
        }
    }
}

/// Extractor for the claims an [`Authenticate`] guard attached.
pub struct Auth(pub Claims);

impl Auth {
    pub fn claims(&self) -> &Claims {
        &self.0
    }
    pub fn user(&self) -> ID<Member> {
        self.0.user()
    }
}

impl FromRequest for Auth {
    type Error = Failure;
    type Future = Ready<Result<Self, Self::Error>>;
    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<Claims>()
                .cloned()
                .map(Auth)
                .ok_or_else(|| {
                    Failure::internal(format!("{} reads claims but has no authentication", req.path()))
                }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::App;
    use actix_web::HttpResponse;
    use actix_web::http::StatusCode;
    use actix_web::http::header::AUTHORIZATION;
    use actix_web::test;
    use actix_web::web;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    async fn whoami(hits: web::Data<AtomicUsize>, auth: Auth) -> HttpResponse {
        hits.fetch_add(1, Ordering::SeqCst);
        HttpResponse::Ok().body(auth.user().to_string())
    }

    async fn open(hits: web::Data<AtomicUsize>) -> HttpResponse {
        hits.fetch_add(1, Ordering::SeqCst);
        HttpResponse::Ok().finish()
    }

    fn crypto() -> Arc<Crypto> {
        Arc::new(Crypto::hmac(b"middleware-secret"))
    }

    macro_rules! app {
        ($crypto:expr, $hits:expr) => {
            test::init_service(
                App::new()
                    .app_data($hits.clone())
                    .service(web::resource("/open").route(web::get().to(open)))
                    .service(
                        web::resource("/me")
                            .route(web::get().to(whoami))
                            .wrap(Guarded::authenticated($crypto.clone())),
                    )
                    .service(
                        web::resource("/admin")
                            .route(web::get().to(whoami))
                            .wrap(Guarded::restricted($crypto.clone(), [Role::Admin])),
                    )
                    .service(
                        web::resource("/misconfigured")
                            .route(web::get().to(whoami))
                            .wrap(Guarded::new().then(Authorize::admin())),
                    ),
            )
            .await
        };
    }

    fn get(uri: &str, token: Option<&str>) -> test::TestRequest {
        let req = test::TestRequest::get().uri(uri);
        match token {
            Some(token) => req.insert_header((AUTHORIZATION, format!("Bearer {}", token))),
            None => req,
        }
    }

    #[actix_web::test]
    async fn missing_header_never_reaches_handler() {
        let crypto = crypto();
        let hits = web::Data::new(AtomicUsize::new(0));
        let app = app!(crypto, hits);
        let res = test::call_service(&app, get("/me", None).to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[actix_web::test]
    async fn expired_token_never_reaches_handler() {
        let crypto = crypto();
        let hits = web::Data::new(AtomicUsize::new(0));
        let app = app!(crypto, hits);
        let mut claims = Claims::new(Kind::Access, ID::default(), Some(Role::Admin), Duration::ZERO);
        claims.exp -= 60;
        let token = crypto.encode(&claims).unwrap();
        let res = test::call_service(&app, get("/me", Some(&token)).to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[actix_web::test]
    async fn refresh_token_never_reaches_handler() {
        let crypto = crypto();
        let hits = web::Data::new(AtomicUsize::new(0));
        let app = app!(crypto, hits);
        let token = crypto.refresh(ID::default(), Some(Role::Admin)).unwrap();
        for uri in ["/me", "/admin"] {
            let res = test::call_service(&app, get(uri, Some(&token)).to_request()).await;
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        }
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[actix_web::test]
    async fn valid_token_reaches_handler_with_identity() {
        let crypto = crypto();
        let hits = web::Data::new(AtomicUsize::new(0));
        let app = app!(crypto, hits);
        let user = ID::<Member>::default();
        let token = crypto.sign(user, Some(Role::Member)).unwrap();
        let res = test::call_service(&app, get("/me", Some(&token)).to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        let body = test::read_body(res).await;
        assert_eq!(body, web::Bytes::from(user.to_string()));
    }

    #[actix_web::test]
    async fn member_is_forbidden_from_admin_route() {
        let crypto = crypto();
        let hits = web::Data::new(AtomicUsize::new(0));
        let app = app!(crypto, hits);
        let token = crypto.sign(ID::default(), Some(Role::Member)).unwrap();
        let res = test::call_service(&app, get("/admin", Some(&token)).to_request()).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[actix_web::test]
    async fn admin_reaches_admin_route() {
        let crypto = crypto();
        let hits = web::Data::new(AtomicUsize::new(0));
        let app = app!(crypto, hits);
        let token = crypto.sign(ID::default(), Some(Role::Admin)).unwrap();
        let res = test::call_service(&app, get("/admin", Some(&token)).to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[actix_web::test]
    async fn admin_route_still_requires_authentication() {
        let crypto = crypto();
        let hits = web::Data::new(AtomicUsize::new(0));
        let app = app!(crypto, hits);
        let res = test::call_service(&app, get("/admin", None).to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[actix_web::test]
    async fn unprotected_route_skips_guards() {
        let crypto = crypto();
        let hits = web::Data::new(AtomicUsize::new(0));
        let app = app!(crypto, hits);
        let res = test::call_service(&app, get("/open", Some("garbage")).to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[actix_web::test]
    async fn role_check_without_authentication_is_a_server_error() {
        let crypto = crypto();
        let hits = web::Data::new(AtomicUsize::new(0));
        let app = app!(crypto, hits);
        let token = crypto.sign(ID::default(), Some(Role::Admin)).unwrap();
        let res = test::call_service(&app, get("/misconfigured", Some(&token)).to_request()).await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}

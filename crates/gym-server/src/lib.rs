//! Backend Server
//!
//! Mounts the auth routes onto a single actix-web server. Public routes
//! carry no guards; protected ones are wrapped in a [`Guarded`] chain.
//!
//! | route                  | guards                 |
//! |------------------------|------------------------|
//! | `GET /health`          | none                   |
//! | `POST /users`          | none                   |
//! | `POST /sessions`       | none                   |
//! | `PATCH /token/refresh` | none                   |
//! | `GET /me`              | authenticate           |
//! | `GET /members/{id}`    | authenticate, ADMIN    |

use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::Responder;
use actix_web::middleware::Logger;
use actix_web::web;
use gym_auth::*;
use std::sync::Arc;

async fn health() -> impl Responder {
    HttpResponse::Ok().body("ok")
}

/// Route table for a member store `R`.
pub fn routes<R: Members + 'static>(crypto: Arc<Crypto>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.route("/health", web::get().to(health))
            .route("/users", web::post().to(register::<R>))
            .route("/sessions", web::post().to(login::<R>))
            .route("/token/refresh", web::patch().to(refresh::<R>))
            .service(
                web::resource("/me")
                    .route(web::get().to(me::<R>))
                    .wrap(Guarded::authenticated(crypto.clone())),
            )
            .service(
                web::resource("/members/{id}")
                    .route(web::get().to(profile::<R>))
                    .wrap(Guarded::restricted(crypto, [Role::Admin])),
            );
    }
}

pub async fn run() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let crypto = Arc::new(config.crypto()?);
    let hasher = config.hasher()?;
    let bind = std::env::var("BIND_ADDR").map_err(|_| anyhow::anyhow!("BIND_ADDR must be set"))?;
    #[cfg(feature = "database")]
    let members = gym_auth::db().await?;
    #[cfg(not(feature = "database"))]
    let members = {
        log::warn!("built without database; members live in memory");
        Roster::default()
    };
    serve(Authenticator::new(members, hasher, crypto.clone()), crypto, bind).await
}

async fn serve<R>(auth: Authenticator<R>, crypto: Arc<Crypto>, bind: String) -> anyhow::Result<()>
where
    R: Members + Send + Sync + 'static,
{
    let auth = web::Data::new(auth);
    log::info!("starting server on {}", bind);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%r %s %Ts"))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header(),
            )
            .app_data(auth.clone())
            .configure(routes::<R>(crypto.clone()))
    })
    .bind(bind)?
    .run()
    .await?;
    Ok(())
}

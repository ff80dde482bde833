//! Backend Binary
//!
//! Serves registration, sign-in, token refresh, and guarded profile routes.
//! Runs on BIND_ADDR (e.g. 0.0.0.0:3333); see `gym_auth::Config` for the
//! remaining environment.

#[tokio::main]
async fn main() {
    gym_core::log();
    gym_core::kys();
    if let Err(e) = gym_server::run().await {
        log::error!("server stopped: {:#}", e);
        std::process::exit(1);
    }
}

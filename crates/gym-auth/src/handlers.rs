use super::*;
use actix_web::HttpResponse;
use actix_web::web;
use gym_core::ID;
use gym_core::Unique;

fn info(member: &Member) -> UserInfo {
    UserInfo {
        id: member.id().to_string(),
        name: member.name().to_string(),
        email: member.email().to_string(),
        role: member.role().to_string(),
    }
}

pub async fn register<R: Members + 'static>(
    auth: web::Data<Authenticator<R>>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse, Failure> {
    let member = auth.register(&req.name, &req.email, &req.password).await?;
    Ok(HttpResponse::Created().json(info(&member)))
}

pub async fn login<R: Members + 'static>(
    auth: web::Data<Authenticator<R>>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, Failure> {
    let tokens = auth.login(&req.email, &req.password).await?;
    Ok(HttpResponse::Ok().json(tokens))
}

pub async fn refresh<R: Members + 'static>(
    auth: web::Data<Authenticator<R>>,
    req: web::Json<RefreshRequest>,
) -> Result<HttpResponse, Failure> {
    let tokens = auth.renew(&req.refresh_token)?;
    Ok(HttpResponse::Ok().json(tokens))
}

pub async fn me<R: Members + 'static>(
    auth: web::Data<Authenticator<R>>,
    caller: Auth,
) -> Result<HttpResponse, Failure> {
    let member = auth.profile(caller.user()).await?;
    Ok(HttpResponse::Ok().json(info(&member)))
}

pub async fn profile<R: Members + 'static>(
    auth: web::Data<Authenticator<R>>,
    path: web::Path<String>,
) -> Result<HttpResponse, Failure> {
    let id = path
        .parse::<ID<Member>>()
        .map_err(|_| Failure::Validation("member id is not a uuid".into()))?;
    let member = auth.profile(id).await?;
    Ok(HttpResponse::Ok().json(info(&member)))
}

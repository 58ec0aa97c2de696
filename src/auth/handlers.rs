use actix_web::{web, HttpResponse};

use crate::api::ApiResponse;
use crate::auth::service::{AuthService, LoginRequest, RegisterRequest};
use crate::error::ServiceError;

// ============================================================================
// Auth HTTP Surface
// ============================================================================

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(register))
            .route("/register-owner", web::post().to(register_owner))
            .route("/login", web::post().to(login)),
    );
}

async fn register(
    service: web::Data<AuthService>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ServiceError> {
    let user = service.register(&request).await?;
    Ok(HttpResponse::Created().json(ApiResponse::<()>::message_only(
        format!("User registered successfully with email: {}", user.email),
        201,
    )))
}

async fn register_owner(
    service: web::Data<AuthService>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ServiceError> {
    let user = service.register_owner(&request).await?;
    Ok(HttpResponse::Created().json(ApiResponse::<()>::message_only(
        format!("User registered successfully with email: {}", user.email),
        201,
    )))
}

async fn login(
    service: web::Data<AuthService>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, ServiceError> {
    let response = service.login(&request).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Login successful", 200, response)))
}

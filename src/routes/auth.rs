use crate::{
    auth::{AuthService, AuthenticatedUser, LoginRequest, RegisterRequest},
    error::AppError,
    models::ProfileUpdate,
};
use actix_web::{get, post, put, web, HttpResponse, Responder};
use validator::Validate;

/// Register a new user
///
/// Creates a new account and returns `{user_id, email, token}` with 201.
/// An email that is already registered yields 400.
#[post("/register")]
pub async fn register(
    auth: web::Data<AuthService>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;
    let response = auth.register(&register_data).await?;
    Ok(HttpResponse::Created().json(response))
}

/// Login user
///
/// Unknown emails and wrong passwords both yield 401 with the same body.
#[post("/login")]
pub async fn login(
    auth: web::Data<AuthService>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;
    let response = auth.login(&login_data).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Profile of the caller.
#[get("/me")]
pub async fn me(
    auth: web::Data<AuthService>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let profile = auth.current_user(user.id).await?;
    Ok(HttpResponse::Ok().json(profile))
}

#[put("/me")]
pub async fn update_me(
    auth: web::Data<AuthService>,
    user: AuthenticatedUser,
    update: web::Json<ProfileUpdate>,
) -> Result<impl Responder, AppError> {
    update.validate()?;
    let profile = auth.update_profile(user.id, &update).await?;
    Ok(HttpResponse::Ok().json(profile))
}

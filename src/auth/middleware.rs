use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use log::debug;

use crate::auth::token::TokenService;
use crate::error::AppError;

/// Paths reachable without a bearer token.
const PUBLIC_PATHS: [&str; 2] = ["/api/auth/login", "/api/auth/register"];

/// Rejects requests without a valid bearer token.
///
/// On success the decoded [`Claims`](crate::auth::Claims) are stored in the
/// request extensions for [`AuthenticatedUser`](crate::auth::AuthenticatedUser)
/// to pick up. Requires a `web::Data<TokenService>` in the app data.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let path = req.path();
        if PUBLIC_PATHS.iter().any(|public| path.starts_with(public)) {
            return Box::pin(self.service.call(req));
        }

        let tokens = match req.app_data::<web::Data<TokenService>>() {
            Some(tokens) => tokens.clone(),
            None => {
                let err = AppError::InternalServerError("Token service is not configured".into());
                return Box::pin(async move { Err(err.into()) });
            }
        };

        let bearer = req
            .headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        let token = match bearer {
            Some(token) => token,
            None => {
                let err = AppError::Unauthorized("Missing token".into());
                return Box::pin(async move { Err(err.into()) });
            }
        };

        match tokens.decode(token) {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                Box::pin(self.service.call(req))
            }
            Err(token_err) => {
                debug!("rejected token on {}: {}", req.path(), token_err);
                let err = AppError::from(token_err);
                Box::pin(async move { Err(err.into()) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthenticatedUser;
    use crate::config::JwtSettings;
    use crate::models::User;
    use actix_web::{http::StatusCode, test, App, HttpResponse};

    fn token_service() -> TokenService {
        TokenService::new(&JwtSettings {
            secret: "m".repeat(32),
            issuer: JwtSettings::DEFAULT_ISSUER.to_string(),
            audience: JwtSettings::DEFAULT_AUDIENCE.to_string(),
            expiration_hours: 1,
        })
    }

    async fn whoami(user: AuthenticatedUser) -> HttpResponse {
        HttpResponse::Ok().body(user.id.to_string())
    }

    async fn open() -> HttpResponse {
        HttpResponse::Ok().finish()
    }

    #[actix_rt::test]
    async fn test_middleware_guards_routes() {
        let tokens = web::Data::new(token_service());
        let user = User::new(
            "mw@example.com".to_string(),
            "Mid".to_string(),
            "Ware".to_string(),
            String::new(),
        );
        let token = tokens.issue(&user).unwrap();

        let app = test::init_service(
            App::new().app_data(tokens.clone()).service(
                web::scope("/api")
                    .wrap(AuthMiddleware)
                    .route("/auth/login", web::post().to(open))
                    .route("/whoami", web::get().to(whoami)),
            ),
        )
        .await;

        let req = test::TestRequest::post().uri("/api/auth/login").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/api/whoami").to_request();
        let err = test::try_call_service(&app, req).await.unwrap_err();
        assert_eq!(err.error_response().status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get()
            .uri("/api/whoami")
            .insert_header(("Authorization", "Bearer not-a-token"))
            .to_request();
        let err = test::try_call_service(&app, req).await.unwrap_err();
        assert_eq!(err.error_response().status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get()
            .uri("/api/whoami")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, user.id.to_string());
    }
}

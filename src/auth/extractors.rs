use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::auth::token::Claims;
use crate::error::AppError;

/// The caller identified by the bearer token.
///
/// Built from the [`Claims`] that `AuthMiddleware` stores in the request
/// extensions, so it only resolves on routes behind that middleware. Anywhere
/// else it fails with `AppError::Unauthorized`.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: String,
    pub role: String,
}

impl TryFrom<&Claims> for AuthenticatedUser {
    type Error = AppError;

    fn try_from(claims: &Claims) -> Result<Self, Self::Error> {
        Ok(AuthenticatedUser {
            id: claims.user_id()?,
            email: claims.email.clone(),
            role: claims.role.clone(),
        })
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = match req.extensions().get::<Claims>() {
            Some(claims) => AuthenticatedUser::try_from(claims),
            None => Err(AppError::Unauthorized(
                "User identity not found in request".to_string(),
            )),
        };
        ready(result.map_err(ActixError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;

    fn claims(sub: String) -> Claims {
        Claims {
            sub,
            email: "user@example.com".to_string(),
            role: "User".to_string(),
            iss: "issuer".to_string(),
            aud: "audience".to_string(),
            iat: 0,
            exp: 0,
        }
    }

    #[actix_rt::test]
    async fn test_authenticated_user_extractor_success() {
        let id = Uuid::new_v4();
        let req = test::TestRequest::default().to_http_request();
        req.extensions_mut().insert(claims(id.to_string()));

        let mut payload = Payload::None;
        let user = AuthenticatedUser::from_request(&req, &mut payload)
            .await
            .unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.email, "user@example.com");
        assert_eq!(user.role, "User");
    }

    #[actix_rt::test]
    async fn test_authenticated_user_extractor_failure() {
        let req = test::TestRequest::default().to_http_request();

        let mut payload = Payload::None;
        let err = AuthenticatedUser::from_request(&req, &mut payload)
            .await
            .unwrap_err();
        assert_eq!(err.error_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_non_uuid_subject_is_rejected() {
        let req = test::TestRequest::default().to_http_request();
        req.extensions_mut().insert(claims("42".to_string()));

        let mut payload = Payload::None;
        let err = AuthenticatedUser::from_request(&req, &mut payload)
            .await
            .unwrap_err();
        assert_eq!(err.error_response().status(), StatusCode::UNAUTHORIZED);
    }
}

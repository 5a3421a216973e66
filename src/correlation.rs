//! `X-Correlation-ID` propagation.
//!
//! The inbound header is echoed back when present and non-blank; otherwise a
//! fresh UUID is generated. The id is also stored in the request extensions
//! as [`CorrelationId`] so handlers and the access log can see it.

use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::middleware::Next;
use actix_web::{Error, HttpMessage};
use log::warn;
use uuid::Uuid;

pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationId(pub String);

fn resolve(header_value: Option<&str>) -> String {
    header_value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Middleware body; mount with `actix_web::middleware::from_fn(correlation_id)`.
///
/// Errors raised further in are rendered here so that they carry the header too.
pub async fn correlation_id(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let id = resolve(
        req.headers()
            .get(CORRELATION_ID_HEADER)
            .and_then(|value| value.to_str().ok()),
    );
    req.extensions_mut().insert(CorrelationId(id.clone()));
    let http_req = req.request().clone();

    let mut res = match next.call(req).await {
        Ok(res) => res.map_into_boxed_body(),
        Err(err) => ServiceResponse::from_err(err, http_req),
    };

    match HeaderValue::from_str(&id) {
        Ok(value) => {
            res.headers_mut()
                .insert(HeaderName::from_static(CORRELATION_ID_HEADER), value);
        }
        Err(e) => warn!("could not encode correlation id {:?}: {}", id, e),
    }
    Ok(res)
}

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::api::problem::internal_error;

pub const APPLICATION_HAL_JSON: &str = "application/hal+json";

/// 200 OK with a HAL document body (`application/hal+json`).
#[derive(Debug, Clone)]
pub struct HalJson<T>(pub T);

impl<T: Serialize> IntoResponse for HalJson<T> {
    fn into_response(self) -> Response {
        // serialize eagerly so a failing payload becomes a problem response
        let body = match serde_json::to_vec(&self.0) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize hal document");
                return internal_error("failed to serialize response").into_response();
            }
        };
        (
            StatusCode::OK,
            [(
                axum::http::header::CONTENT_TYPE,
                HeaderValue::from_static(APPLICATION_HAL_JSON),
            )],
            body,
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hal_core::HalResource;

    #[test]
    fn sets_hal_content_type() {
        let res = HalResource::with_self("/Order/Get/1", serde_json::json!({"id": 1}));
        let resp = HalJson(res).into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        let ct = resp
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        assert_eq!(ct, APPLICATION_HAL_JSON);
    }
}

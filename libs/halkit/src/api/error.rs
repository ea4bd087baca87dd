use crate::api::problem::{Problem, ProblemResponse};
use axum::http::StatusCode;
use hal_core::Error as HalError;

/// Map page-state errors to RFC 9457 Problem responses.
///
/// Size limits are reported as 422; every other variant is a 400.
pub fn hal_error_to_problem(e: &HalError, instance: &str) -> ProblemResponse {
    let (status, title, code) = match e {
        HalError::MissingPageState => (
            StatusCode::BAD_REQUEST,
            "Missing Page State",
            "MISSING_PAGE_STATE",
        ),
        HalError::MalformedPageState(_) => (
            StatusCode::BAD_REQUEST,
            "Malformed Page State",
            "MALFORMED_PAGE_STATE",
        ),
        HalError::InvalidPageSize(_) => (
            StatusCode::BAD_REQUEST,
            "Invalid Page Size",
            "INVALID_PAGE_SIZE",
        ),
        HalError::PageSizeTooLarge { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "Page Size Too Large",
            "PAGE_SIZE_TOO_LARGE",
        ),
        HalError::InvalidPageNumber(_) => (
            StatusCode::BAD_REQUEST,
            "Invalid Page Number",
            "INVALID_PAGE_NUMBER",
        ),
        HalError::InvalidSortDirection(_) => (
            StatusCode::BAD_REQUEST,
            "Invalid Sort Direction",
            "INVALID_SORT_DIRECTION",
        ),
        HalError::SortWithoutField => (
            StatusCode::BAD_REQUEST,
            "Sort Without Field",
            "SORT_WITHOUT_FIELD",
        ),
    };

    Problem::new(status, title, e.to_string())
        .with_code(code)
        .with_instance(instance)
        .into()
}

impl From<HalError> for ProblemResponse {
    fn from(e: HalError) -> Self {
        hal_error_to_problem(&e, "/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_state_is_400() {
        let p = hal_error_to_problem(&HalError::MalformedPageState("size=x".into()), "/Orders").0;
        assert_eq!(p.status, 400);
        assert_eq!(p.code, "MALFORMED_PAGE_STATE");
        assert_eq!(p.instance, "/Orders");
        assert!(p.detail.contains("size=x"));
    }

    #[test]
    fn size_limit_is_422() {
        let p = hal_error_to_problem(&HalError::PageSizeTooLarge { size: 5000, max: 1000 }, "/").0;
        assert_eq!(p.status, 422);
        assert_eq!(p.code, "PAGE_SIZE_TOO_LARGE");
    }

    #[test]
    fn every_variant_has_a_code() {
        let all = [
            HalError::MissingPageState,
            HalError::MalformedPageState(String::new()),
            HalError::InvalidPageSize(0),
            HalError::PageSizeTooLarge { size: 2, max: 1 },
            HalError::InvalidPageNumber("x".into()),
            HalError::InvalidSortDirection("x".into()),
            HalError::SortWithoutField,
        ];
        for e in &all {
            let p = hal_error_to_problem(e, "/").0;
            assert!(!p.code.is_empty(), "{:?}", e);
            assert!(p.status == 400 || p.status == 422);
        }
    }

    #[test]
    fn from_uses_root_instance() {
        let resp: ProblemResponse = HalError::SortWithoutField.into();
        assert_eq!(resp.0.instance, "/");
    }
}

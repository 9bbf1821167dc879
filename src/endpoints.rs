//! The API endpoint URIs.

/// The route that serves every action.
pub const API: &str = "/api";
/// The older path still used by existing clients.
pub const LEGACY_API: &str = "/api.php";

#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::API);
        assert_endpoint_is_valid_uri(endpoints::LEGACY_API);
    }
}

pub mod platforms;
pub mod status;
pub mod verify;

/// Default API endpoint of a local node.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:9101";

/// Join `path` onto an endpoint, tolerating a trailing slash.
pub fn api_url(endpoint: &str, path: &str) -> String {
    format!("{}{}", endpoint.trim_end_matches('/'), path)
}

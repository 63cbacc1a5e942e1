use tracing::debug;
use tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tungstenite::http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN, VARY,
};
use tungstenite::http::{HeaderMap, HeaderValue, StatusCode};

/// Builds the callback run on every upgrade request.
///
/// Requests for any path other than `path` are answered with 404. Accepted
/// upgrades carry permissive CORS headers; no origin is ever refused.
pub fn upgrade_callback(
    path: String,
) -> impl FnOnce(&Request, Response) -> Result<Response, ErrorResponse> {
    move |request: &Request, mut response: Response| {
        if request.uri().path() != path {
            debug!("Rejecting upgrade for {}", request.uri());
            let mut not_found = ErrorResponse::new(Some("Not Found".to_string()));
            *not_found.status_mut() = StatusCode::NOT_FOUND;
            return Err(not_found);
        }

        apply_cors(request.headers().get(ORIGIN), response.headers_mut());
        Ok(response)
    }
}

/// Allows any origin, method and header, with credentials.
///
/// Credentialed responses may not use a wildcard origin, so the request's
/// `Origin` is echoed back when present.
pub fn apply_cors(origin: Option<&HeaderValue>, headers: &mut HeaderMap) {
    match origin {
        Some(origin) => {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
            headers.insert(VARY, HeaderValue::from_static("Origin"));
        }
        None => {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        }
    }
    headers.insert(
        ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("*"));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*"));
}

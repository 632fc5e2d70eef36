use crate::types::Credentials;
use reqwest::header::AUTHORIZATION;
use reqwest::RequestBuilder;

/// Attach HTTP Basic auth when both credential fields are set.
pub fn apply_auth(request: RequestBuilder, credentials: &Credentials) -> RequestBuilder {
    match credentials.basic_auth_header() {
        Some(auth_header) => request.header(AUTHORIZATION, auth_header),
        None => request,
    }
}

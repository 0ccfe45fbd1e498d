use super::{error_response, AppState};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use sha2::{Digest, Sha256};

/// Configured admin username and password, held as SHA-256 digests.
#[derive(Clone)]
pub struct AdminCredentials {
    username: Vec<u8>,
    password: Vec<u8>,
}

impl AdminCredentials {
    pub fn new(username: &str, password: &str) -> Self {
        AdminCredentials {
            username: Sha256::digest(username.as_bytes()).to_vec(),
            password: Sha256::digest(password.as_bytes()).to_vec(),
        }
    }

    /// Compares digests so both checks always run over fixed-length input.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        let username_ok = Sha256::digest(username.as_bytes()).as_slice() == self.username;
        let password_ok = Sha256::digest(password.as_bytes()).as_slice() == self.password;
        username_ok & password_ok
    }
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AdminCredentials(..)")
    }
}

/// Decode an `Authorization: Basic <base64(user:pass)>` header value.
pub fn parse_basic_auth(value: &str) -> Option<(String, String)> {
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

/// Middleware guarding the admin routes.
pub async fn require_admin(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let credentials = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_basic_auth);

    match credentials {
        Some((username, password)) if state.admin.verify(&username, &password) => {
            next.run(request).await
        }
        Some((username, _)) => {
            log::warn!("Rejected admin credentials for user '{}'", username);
            unauthorized()
        }
        None => unauthorized(),
    }
}

fn unauthorized() -> Response {
    let mut response = error_response(StatusCode::UNAUTHORIZED, "Unauthorized");
    response.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"Restricted\""),
    );
    response
}

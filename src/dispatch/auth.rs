// Bearer-token authentication guard
// Author: kelexine (https://github.com/kelexine)

use crate::exchange::CanonicalRequest;

/// Auth settings snapshotted once at startup from the `TOKEN` variable.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    pub token: Option<String>,
}

/// Compare the Authorization header against the configured secret.
/// No configured token means the guard always passes; that is the
/// documented "no auth configured" policy, not an error.
pub fn authorize(request: &CanonicalRequest, auth: &AuthConfig) -> bool {
    let Some(token) = auth.token.as_deref() else {
        return true;
    };

    match request.header("authorization") {
        Some(value) => value == format!("Bearer {token}"),
        None => false,
    }
}

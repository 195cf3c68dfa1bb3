//! The `token` session cookie.

use axum::http::header::COOKIE;
use axum::http::HeaderMap;

use crate::config::ServerConfig;

pub const TOKEN_COOKIE: &str = "token";

/// `Set-Cookie` value carrying a freshly signed token.
pub fn session_cookie(config: &ServerConfig, token: &str) -> String {
    format!(
        "{TOKEN_COOKIE}={token}; Path=/; HttpOnly; SameSite=Strict;{} Max-Age={}",
        secure_flag(config),
        config.auth.cookie_max_age_secs
    )
}

/// `Set-Cookie` value that expires the token cookie immediately.
pub fn clear_cookie(config: &ServerConfig) -> String {
    format!(
        "{TOKEN_COOKIE}=; Path=/; HttpOnly; SameSite=Strict;{} Max-Age=0",
        secure_flag(config)
    )
}

// Omitted outside production so plain-http localhost works.
fn secure_flag(config: &ServerConfig) -> &'static str {
    if config.is_production() {
        " Secure;"
    } else {
        ""
    }
}

/// Reads cookie `name` from every `Cookie` header in `headers`.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

/// The request's token: the `token` cookie first, then `Authorization: Bearer`.
pub fn request_token(headers: &HeaderMap) -> Option<String> {
    read_cookie(headers, TOKEN_COOKIE).or_else(|| {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(|s| s.to_string())
    })
}

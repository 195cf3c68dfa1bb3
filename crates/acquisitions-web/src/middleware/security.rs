//! Request protection applied to every route: bot detection, the shield,
//! then the per-role sliding-window rate limit.

use std::net::SocketAddr;
use std::time::Instant;

use acquisitions_core::Role;
use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{header, HeaderMap, HeaderValue, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::bot_guard;
use super::rate_limit::RateTier;
use super::shield;
use crate::auth::{cookie, jwt};
use crate::config::SecurityMode;
use crate::error::{AppError, BlockReason};
use crate::state::AppState;

/// Address used to key the rate limit. Forwarding headers (first
/// `X-Forwarded-For` hop, then `X-Real-IP`) are honoured only when
/// `trust_proxy` is set; otherwise the socket peer is authoritative.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>, trust_proxy: bool) -> String {
    let forwarded = trust_proxy
        .then(|| {
            header_ip(headers, "x-forwarded-for", |v| v.split(',').next())
                .or_else(|| header_ip(headers, "x-real-ip", Some))
        })
        .flatten();

    forwarded
        .map(String::from)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

fn header_ip<'a>(
    headers: &'a HeaderMap,
    name: &str,
    pick: impl FnOnce(&'a str) -> Option<&'a str>,
) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(pick)
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
}

/// Role carried by a valid request token; `None` for guests.
fn caller_role(state: &AppState, headers: &HeaderMap) -> Option<Role> {
    let token = cookie::request_token(headers)?;
    jwt::verify_token(&state.config.auth.jwt_secret, &token)
        .ok()
        .map(|claims| claims.role)
}

pub async fn protect(State(state): State<AppState>, req: Request<Body>, next: Next) -> Response {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0);
    let ip = client_ip(req.headers(), peer, state.config.security.trust_proxy);
    let user_agent = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());
    let path = req.uri().path().to_string();
    let method = req.method().clone();

    let tier = RateTier::for_role(caller_role(&state, req.headers()));
    let security = &state.config.security;

    let mut rate = None;
    let reason = if bot_guard::classify(user_agent.as_deref()).is_denied() {
        tracing::warn!(
            ip = %ip,
            user_agent = user_agent.as_deref().unwrap_or(""),
            path = %path,
            "Bot request blocked"
        );
        Some(BlockReason::Bot)
    } else if let Some(rule) = shield::inspect(req.uri()) {
        tracing::warn!(
            ip = %ip,
            user_agent = user_agent.as_deref().unwrap_or(""),
            path = %path,
            method = %method,
            rule,
            "Shield blocked request"
        );
        Some(BlockReason::Shield)
    } else {
        let key = format!("{}:{ip}", tier.rule_name());
        let decision = state.limiter.check(&key, tier.limit(security), Instant::now());
        rate = Some(decision);
        if decision.allowed {
            None
        } else {
            tracing::warn!(
                ip = %ip,
                user_agent = user_agent.as_deref().unwrap_or(""),
                path = %path,
                method = %method,
                rule = %tier.rule_name(),
                limit = decision.limit,
                "Rate limit exceeded"
            );
            Some(BlockReason::RateLimit)
        }
    };

    let mut response = match (reason, security.mode) {
        (None, _) => next.run(req).await,
        (Some(reason), SecurityMode::DryRun) => {
            tracing::info!("Dry run: would have blocked request ({reason:?})");
            next.run(req).await
        }
        (Some(reason), SecurityMode::Live) => {
            let mut response = AppError::Blocked(reason).into_response();
            if reason == BlockReason::RateLimit {
                response.headers_mut().insert(
                    header::RETRY_AFTER,
                    HeaderValue::from(state.limiter.window().as_secs()),
                );
            }
            response
        }
    };

    if let Some(decision) = rate {
        let headers = response.headers_mut();
        headers.insert("x-ratelimit-limit", HeaderValue::from(decision.limit));
        headers.insert("x-ratelimit-remaining", HeaderValue::from(decision.remaining));
    }
    response
}

mod auth_handlers;
mod health;
mod users;

use axum::http::{header, HeaderValue, Method};
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::error::AppError;
use crate::middleware::{security, security_headers};
use crate::state::AppState;

const MAX_BODY_BYTES: usize = 1024 * 1024;

pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/auth/sign-up", post(auth_handlers::sign_up))
        .route("/auth/sign-in", post(auth_handlers::sign_in))
        .route("/auth/sign-out", post(auth_handlers::sign_out))
}

pub fn users_router() -> Router<AppState> {
    Router::new()
        .route("/users", get(users::list_users))
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
}

async fn not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let origins: Vec<HeaderValue> = config
        .cors
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {origin}");
                None
            }
        })
        .collect();

    // Same-origin only unless origins are configured.
    if origins.is_empty() {
        layer
    } else {
        layer
            .allow_origin(AllowOrigin::list(origins))
            .allow_credentials(true)
    }
}

/// The complete application: routes, security layer and ambient layers.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .nest(
            "/api",
            Router::new()
                .route("/", get(health::api_status))
                .merge(auth_router())
                .merge(users_router()),
        )
        .fallback(not_found)
        .layer(from_fn_with_state(state.clone(), security::protect))
        .layer(from_fn_with_state(
            state.clone(),
            security_headers::security_headers,
        ))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt;
    use crate::config::SecurityMode;
    use crate::state::{test_state, test_state_with};
    use acquisitions_core::{password, NewUser, Role, User};
    use axum::body::{to_bytes, Body};
    use axum::extract::ConnectInfo;
    use axum::http::{header::SET_COOKIE, Request, StatusCode};
    use axum::response::Response;
    use serde_json::{json, Value};
    use std::net::SocketAddr;
    use tower::ServiceExt;

    const BROWSER_UA: &str = "Mozilla/5.0 (X11; Linux x86_64) Firefox/128.0";

    fn request(method: Method, uri: &str) -> axum::http::request::Builder {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::USER_AGENT, BROWSER_UA)
    }

    fn get_req(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = request(Method::GET, uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn json_req(method: Method, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = request(method, uri).header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn send(app: &Router, req: Request<Body>) -> Response {
        app.clone().oneshot(req).await.unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// `token=...` pair from the response's `Set-Cookie` header.
    fn token_pair(response: &Response) -> String {
        let raw = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        raw.split(';').next().unwrap().to_string()
    }

    async fn seed(state: &AppState, email: &str, role: Role) -> (User, String) {
        let user = state
            .store
            .create(NewUser {
                name: "Seeded".to_string(),
                email: email.to_string(),
                password_hash: "unused".to_string(),
                role,
            })
            .await
            .unwrap();
        let (token, _) =
            jwt::create_token(&state.config.auth.jwt_secret, 1, user.id, &user.email, role)
                .unwrap();
        (user, format!("token={token}"))
    }

    // --- service endpoints ---

    #[tokio::test]
    async fn health_reports_status_timestamp_and_uptime() {
        let app = app(test_state());
        let response = send(&app, get_req("/health", None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "OK");
        assert!(body["timestamp"].is_string());
        assert!(body["uptime"].is_number());
    }

    #[tokio::test]
    async fn api_root_reports_running() {
        let app = app(test_state());
        let response = send(&app, get_req("/api", None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["message"], "ACQUISITIONS-JSM API is running!");
    }

    #[tokio::test]
    async fn root_greets() {
        let app = app(test_state());
        let response = send(&app, get_req("/", None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"Hello from Acquisitions!");
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let app = app(test_state());
        let response = send(&app, get_req("/wrong-route", None)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Route not found");
    }

    #[tokio::test]
    async fn responses_carry_security_headers() {
        let app = app(test_state());
        let response = send(&app, get_req("/health", None)).await;
        let headers = response.headers();
        assert_eq!(headers["x-content-type-options"], "nosniff");
        assert_eq!(headers["x-frame-options"], "DENY");
        assert_eq!(headers["referrer-policy"], "no-referrer");
        assert!(headers.get("strict-transport-security").is_none());
    }

    #[tokio::test]
    async fn tls_adds_strict_transport_security() {
        let mut config = (*test_state().config).clone();
        config.tls.cert_path = Some("cert.pem".to_string());
        config.tls.key_path = Some("key.pem".to_string());
        let app = app(test_state_with(config));

        let response = send(&app, get_req("/wrong-route", None)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let headers = response.headers();
        assert_eq!(
            headers["strict-transport-security"],
            "max-age=31536000; includeSubDomains"
        );
        assert_eq!(headers["x-content-type-options"], "nosniff");
    }

    // --- auth ---

    #[tokio::test]
    async fn sign_up_creates_user_and_sets_cookie() {
        let app = app(test_state());
        let response = send(
            &app,
            json_req(
                Method::POST,
                "/api/auth/sign-up",
                None,
                json!({ "name": "Ada", "email": "Ada@Example.com", "password": "secret1", "role": "admin" }),
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let cookie = response.headers()[SET_COOKIE].to_str().unwrap().to_string();
        assert!(cookie.starts_with("token="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));

        let body = body_json(response).await;
        assert_eq!(body["message"], "User Registered Successfully");
        assert_eq!(body["user"]["email"], "ada@example.com");
        assert_eq!(body["user"]["role"], "user");
        assert!(body["user"].get("password").is_none());
    }

    #[tokio::test]
    async fn sign_up_reports_validation_details() {
        let app = app(test_state());
        let response = send(
            &app,
            json_req(
                Method::POST,
                "/api/auth/sign-up",
                None,
                json!({ "name": "A", "email": "bad", "password": "123" }),
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Validation failed");
        assert!(body["details"].as_str().unwrap().contains("Invalid email address"));
    }

    #[tokio::test]
    async fn malformed_json_is_a_validation_failure() {
        let app = app(test_state());
        let req = request(Method::POST, "/api/auth/sign-up")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = send(&app, req).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["message"], "Validation failed");
    }

    #[tokio::test]
    async fn oversized_body_is_rejected_with_413() {
        let app = app(test_state());
        let payload = json!({
            "name": "x".repeat(MAX_BODY_BYTES),
            "email": "big@example.com",
            "password": "secret1",
        });
        let response = send(
            &app,
            json_req(Method::POST, "/api/auth/sign-up", None, payload),
        )
        .await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn duplicate_sign_up_conflicts() {
        let state = test_state();
        seed(&state, "taken@example.com", Role::User).await;
        let app = app(state);

        let response = send(
            &app,
            json_req(
                Method::POST,
                "/api/auth/sign-up",
                None,
                json!({ "name": "Dup", "email": "taken@example.com", "password": "secret1" }),
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(
            body_json(response).await["error"],
            "User with this email already exists"
        );
    }

    #[tokio::test]
    async fn sign_in_checks_password() {
        let state = test_state();
        state
            .store
            .create(NewUser {
                name: "Grace".to_string(),
                email: "grace@example.com".to_string(),
                password_hash: password::hash_password("hopper42").unwrap(),
                role: Role::User,
            })
            .await
            .unwrap();
        let app = app(state);

        let ok = send(
            &app,
            json_req(
                Method::POST,
                "/api/auth/sign-in",
                None,
                json!({ "email": "grace@example.com", "password": "hopper42" }),
            ),
        )
        .await;
        assert_eq!(ok.status(), StatusCode::OK);
        assert!(token_pair(&ok).len() > "token=".len());
        let body = body_json(ok).await;
        assert_eq!(body["message"], "Sign in successful");
        assert_eq!(body["user"]["name"], "Grace");

        let wrong = send(
            &app,
            json_req(
                Method::POST,
                "/api/auth/sign-in",
                None,
                json!({ "email": "grace@example.com", "password": "nope-nope" }),
            ),
        )
        .await;
        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(wrong).await["error"], "Invalid email or password");
    }

    #[tokio::test]
    async fn sign_in_unknown_email_is_401() {
        let app = app(test_state());
        let response = send(
            &app,
            json_req(
                Method::POST,
                "/api/auth/sign-in",
                None,
                json!({ "email": "ghost@example.com", "password": "whatever" }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "Invalid email or password");
    }

    #[tokio::test]
    async fn sign_out_clears_cookie() {
        let app = app(test_state());
        let response = send(
            &app,
            request(Method::POST, "/api/auth/sign-out")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response.headers()[SET_COOKIE].to_str().unwrap().to_string();
        assert!(cookie.starts_with("token=;"));
        assert!(cookie.contains("Max-Age=0"));
        assert_eq!(body_json(response).await["message"], "Sign out successful");
    }

    // --- authorization chain ---

    #[tokio::test]
    async fn listing_users_requires_token() {
        let app = app(test_state());
        let response = send(&app, get_req("/api/users", None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["message"], "Authentication required");

        let response = send(&app, get_req("/api/users", Some("token=forged"))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["message"], "Invalid or expired token");
    }

    #[tokio::test]
    async fn listing_users_requires_admin() {
        let state = test_state();
        let (_, user_cookie) = seed(&state, "u@example.com", Role::User).await;
        let (_, admin_cookie) = seed(&state, "a@example.com", Role::Admin).await;
        let app = app(state);

        let denied = send(&app, get_req("/api/users", Some(&user_cookie))).await;
        assert_eq!(denied.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(denied).await["message"], "Access denied");

        let allowed = send(&app, get_req("/api/users", Some(&admin_cookie))).await;
        assert_eq!(allowed.status(), StatusCode::OK);
        let body = body_json(allowed).await;
        assert_eq!(body["message"], "Successfully retrieved users");
        assert_eq!(body["count"], 2);
        assert_eq!(body["users"].as_array().unwrap().len(), 2);
        assert!(body["users"][0].get("created_at").is_some());
    }

    #[tokio::test]
    async fn bearer_token_is_accepted() {
        let state = test_state();
        let (user, cookie) = seed(&state, "b@example.com", Role::User).await;
        let token = cookie.trim_start_matches("token=").to_string();
        let app = app(state);

        let req = request(Method::GET, &format!("/api/users/{}", user.id))
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        assert_eq!(send(&app, req).await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn users_can_only_read_themselves() {
        let state = test_state();
        let (me, my_cookie) = seed(&state, "me@example.com", Role::User).await;
        let (other, _) = seed(&state, "other@example.com", Role::User).await;
        let app = app(state);

        let own = send(&app, get_req(&format!("/api/users/{}", me.id), Some(&my_cookie))).await;
        assert_eq!(own.status(), StatusCode::OK);
        let body = body_json(own).await;
        assert_eq!(body["message"], "User retrieved successfully");
        assert_eq!(body["user"]["email"], "me@example.com");

        let foreign =
            send(&app, get_req(&format!("/api/users/{}", other.id), Some(&my_cookie))).await;
        assert_eq!(foreign.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            body_json(foreign).await["message"],
            "You can only access your own account"
        );

        // Ownership is checked before the id is validated.
        let junk = send(&app, get_req("/api/users/abc", Some(&my_cookie))).await;
        assert_eq!(junk.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admins_read_anyone_and_get_404_or_400() {
        let state = test_state();
        let (other, _) = seed(&state, "other@example.com", Role::User).await;
        let (_, admin_cookie) = seed(&state, "admin@example.com", Role::Admin).await;
        let app = app(state);

        let found =
            send(&app, get_req(&format!("/api/users/{}", other.id), Some(&admin_cookie))).await;
        assert_eq!(found.status(), StatusCode::OK);

        let missing = send(&app, get_req("/api/users/999", Some(&admin_cookie))).await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(missing).await["error"], "User not found");

        let invalid = send(&app, get_req("/api/users/abc", Some(&admin_cookie))).await;
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(invalid).await["message"], "Validation failed");
    }

    #[tokio::test]
    async fn user_updates_own_profile_but_not_role() {
        let state = test_state();
        let (me, cookie) = seed(&state, "me@example.com", Role::User).await;
        let app = app(state);
        let uri = format!("/api/users/{}", me.id);

        let renamed = send(
            &app,
            json_req(Method::PUT, &uri, Some(&cookie), json!({ "name": "New Name" })),
        )
        .await;
        assert_eq!(renamed.status(), StatusCode::OK);
        let body = body_json(renamed).await;
        assert_eq!(body["message"], "User updated successfully");
        assert_eq!(body["user"]["name"], "New Name");

        let promote = send(
            &app,
            json_req(Method::PUT, &uri, Some(&cookie), json!({ "role": "admin" })),
        )
        .await;
        assert_eq!(promote.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            body_json(promote).await["message"],
            "Only admin users can change user roles"
        );

        let empty = send(&app, json_req(Method::PUT, &uri, Some(&cookie), json!({}))).await;
        assert_eq!(empty.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn admin_can_change_roles() {
        let state = test_state();
        let (target, _) = seed(&state, "t@example.com", Role::User).await;
        let (_, admin_cookie) = seed(&state, "a@example.com", Role::Admin).await;
        let app = app(state);

        let response = send(
            &app,
            json_req(
                Method::PUT,
                &format!("/api/users/{}", target.id),
                Some(&admin_cookie),
                json!({ "role": "admin" }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["user"]["role"], "admin");
    }

    #[tokio::test]
    async fn update_to_taken_email_conflicts() {
        let state = test_state();
        let (me, cookie) = seed(&state, "me@example.com", Role::User).await;
        seed(&state, "taken@example.com", Role::User).await;
        let app = app(state);

        let response = send(
            &app,
            json_req(
                Method::PUT,
                &format!("/api/users/{}", me.id),
                Some(&cookie),
                json!({ "email": "taken@example.com" }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn delete_is_admin_only() {
        let state = test_state();
        let (me, cookie) = seed(&state, "me@example.com", Role::User).await;
        let (_, admin_cookie) = seed(&state, "a@example.com", Role::Admin).await;
        let app = app(state);
        let uri = format!("/api/users/{}", me.id);

        let denied = send(
            &app,
            request(Method::DELETE, &uri)
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(denied.status(), StatusCode::FORBIDDEN);

        let delete = || {
            request(Method::DELETE, &uri)
                .header(header::COOKIE, &admin_cookie)
                .body(Body::empty())
                .unwrap()
        };
        let deleted = send(&app, delete()).await;
        assert_eq!(deleted.status(), StatusCode::OK);
        let body = body_json(deleted).await;
        assert_eq!(body["message"], "User deleted successfully");
        assert_eq!(body["user"]["id"], me.id);

        let again = send(&app, delete()).await;
        assert_eq!(again.status(), StatusCode::NOT_FOUND);
    }

    // --- security layer ---

    #[tokio::test]
    async fn requests_without_user_agent_are_blocked() {
        let app = app(test_state());
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = send(&app, req).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Forbidden");
        assert_eq!(body["message"], "Automated requests are not allowed");
    }

    #[tokio::test]
    async fn scripted_clients_are_blocked() {
        let app = app(test_state());
        let req = Request::builder()
            .uri("/api")
            .header(header::USER_AGENT, "curl/8.4.0")
            .body(Body::empty())
            .unwrap();
        assert_eq!(send(&app, req).await.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn shield_blocks_attack_payloads() {
        let app = app(test_state());
        let response = send(&app, get_req("/api/users?id=1%27%20OR%20%271%27=%271", None)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            body_json(response).await["message"],
            "Request blocked by security policy"
        );
    }

    fn limited_state(mode: SecurityMode) -> AppState {
        let mut config = (*test_state().config).clone();
        config.security.guest_limit = 2;
        config.security.user_limit = 3;
        config.security.mode = mode;
        test_state_with(config)
    }

    #[tokio::test]
    async fn guests_hit_their_limit() {
        let app = app(limited_state(SecurityMode::Live));

        let first = send(&app, get_req("/api", None)).await;
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(first.headers()["x-ratelimit-limit"], "2");
        assert_eq!(first.headers()["x-ratelimit-remaining"], "1");
        assert_eq!(send(&app, get_req("/api", None)).await.status(), StatusCode::OK);

        let limited = send(&app, get_req("/api", None)).await;
        assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(limited.headers()[header::RETRY_AFTER], "60");
        let body = body_json(limited).await;
        assert_eq!(body["error"], "Too Many Requests");
        assert_eq!(body["message"], "Rate limit exceeded. Please try again later.");
    }

    #[tokio::test]
    async fn signed_in_users_get_their_own_budget() {
        let state = limited_state(SecurityMode::Live);
        let (_, cookie) = seed(&state, "u@example.com", Role::User).await;
        let app = app(state);

        for _ in 0..2 {
            send(&app, get_req("/api", None)).await;
        }
        assert_eq!(
            send(&app, get_req("/api", None)).await.status(),
            StatusCode::TOO_MANY_REQUESTS
        );

        for _ in 0..3 {
            assert_eq!(
                send(&app, get_req("/api", Some(&cookie))).await.status(),
                StatusCode::OK
            );
        }
        assert_eq!(
            send(&app, get_req("/api", Some(&cookie))).await.status(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    fn from_peer(peer: [u8; 4], forwarded_for: Option<&str>) -> Request<Body> {
        let mut builder = request(Method::GET, "/api")
            .extension(ConnectInfo(SocketAddr::from((peer, 40000))));
        if let Some(ip) = forwarded_for {
            builder = builder.header("x-forwarded-for", ip);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn clients_are_limited_per_ip() {
        let app = app(limited_state(SecurityMode::Live));

        for _ in 0..2 {
            send(&app, from_peer([203, 0, 113, 1], None)).await;
        }
        assert_eq!(
            send(&app, from_peer([203, 0, 113, 1], None)).await.status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            send(&app, from_peer([203, 0, 113, 2], None)).await.status(),
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn rotating_forwarded_for_does_not_reset_the_budget() {
        let app = app(limited_state(SecurityMode::Live));

        let mut statuses = Vec::new();
        for i in 0..10 {
            let spoofed = format!("10.9.9.{i}");
            statuses.push(send(&app, from_peer([203, 0, 113, 1], Some(&spoofed))).await.status());
        }
        assert_eq!(&statuses[..2], &[StatusCode::OK, StatusCode::OK]);
        assert!(statuses[2..]
            .iter()
            .all(|s| *s == StatusCode::TOO_MANY_REQUESTS));
    }

    #[tokio::test]
    async fn trusted_proxy_limits_by_forwarded_client() {
        let mut config = (*limited_state(SecurityMode::Live).config).clone();
        config.security.trust_proxy = true;
        let app = app(test_state_with(config));
        let proxy = [10, 0, 0, 1];

        for _ in 0..2 {
            send(&app, from_peer(proxy, Some("198.51.100.7"))).await;
        }
        assert_eq!(
            send(&app, from_peer(proxy, Some("198.51.100.7"))).await.status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            send(&app, from_peer(proxy, Some("198.51.100.8, 10.0.0.1"))).await.status(),
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn dry_run_never_blocks() {
        let app = app(limited_state(SecurityMode::DryRun));
        for _ in 0..5 {
            assert_eq!(send(&app, get_req("/api", None)).await.status(), StatusCode::OK);
        }
        let req = Request::builder().uri("/api").body(Body::empty()).unwrap();
        assert_eq!(send(&app, req).await.status(), StatusCode::OK);
    }
}

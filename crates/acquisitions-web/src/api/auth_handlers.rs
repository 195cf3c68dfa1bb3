use acquisitions_core::{password, NewUser, Role, SignInRequest, SignUpRequest, User};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::response::AppendHeaders;
use axum::Json;

use crate::auth::{cookie, jwt};
use crate::dto::{AuthResponse, MessageResponse};
use crate::error::AppError;
use crate::state::AppState;

type CookieHeader = AppendHeaders<[(axum::http::HeaderName, String); 1]>;

/// Maps a malformed JSON body onto the regular validation response. A body
/// over the size limit keeps its 413.
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(value)| value).map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge
        } else {
            AppError::Validation(rejection.body_text())
        }
    })
}

fn issue_cookie(state: &AppState, user: &User) -> Result<CookieHeader, AppError> {
    let (token, _) = jwt::create_token(
        &state.config.auth.jwt_secret,
        state.config.auth.jwt_ttl_hours,
        user.id,
        &user.email,
        user.role,
    )?;
    Ok(AppendHeaders([(
        SET_COOKIE,
        cookie::session_cookie(&state.config, &token),
    )]))
}

/// POST /api/auth/sign-up
pub async fn sign_up(
    State(state): State<AppState>,
    body: Result<Json<SignUpRequest>, JsonRejection>,
) -> Result<(StatusCode, CookieHeader, Json<AuthResponse>), AppError> {
    let input = json_body(body)?.validate()?;

    let password = input.password;
    let password_hash =
        tokio::task::spawn_blocking(move || password::hash_password(&password)).await??;

    // Self-registration always yields a regular account.
    let user = state
        .store
        .create(NewUser {
            name: input.name,
            email: input.email,
            password_hash,
            role: Role::User,
        })
        .await
        .inspect_err(|e| tracing::warn!("Sign up failed: {e}"))?;

    tracing::info!("User registered successfully: {}", user.email);

    let cookie = issue_cookie(&state, &user)?;
    Ok((
        StatusCode::CREATED,
        cookie,
        Json(AuthResponse {
            message: "User Registered Successfully",
            user: (&user).into(),
        }),
    ))
}

/// POST /api/auth/sign-in
pub async fn sign_in(
    State(state): State<AppState>,
    body: Result<Json<SignInRequest>, JsonRejection>,
) -> Result<(CookieHeader, Json<AuthResponse>), AppError> {
    let input = json_body(body)?.validate()?;

    let Some(user) = state.store.find_by_email(&input.email).await? else {
        tracing::warn!("Sign in failed: user not found: {}", input.email);
        return Err(AppError::InvalidCredentials);
    };

    let hash = user.password_hash.clone();
    let password = input.password;
    let valid =
        tokio::task::spawn_blocking(move || password::verify_password(&hash, &password)).await??;

    if !valid {
        tracing::warn!("Sign in failed: invalid password for {}", user.email);
        return Err(AppError::InvalidCredentials);
    }

    let cookie = issue_cookie(&state, &user)?;
    tracing::info!("User signed in successfully: {}", user.email);

    Ok((
        cookie,
        Json(AuthResponse {
            message: "Sign in successful",
            user: (&user).into(),
        }),
    ))
}

/// POST /api/auth/sign-out
pub async fn sign_out(State(state): State<AppState>) -> (CookieHeader, Json<MessageResponse>) {
    tracing::info!("User signed out successfully");
    (
        AppendHeaders([(SET_COOKIE, cookie::clear_cookie(&state.config))]),
        Json(MessageResponse {
            message: "Sign out successful",
        }),
    )
}

//! HTTP Request Handlers
//!
//! Axum handlers wiring the authentication core to the HTTP surface. The
//! browser session rides in an opaque `auth_session` cookie; handlers open
//! or create the session, call into the services, and fold the session-held
//! UX state (recovery link, pending authorization) into the response.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse, Response},
    Json,
};
use chrono::Utc;
use validator::Validate;

use crate::config::SecurityConfig;
use crate::models::requests::*;
use crate::models::{RecoveryAuthorization, SecurityQuestionId, CATALOG_VERSION};
use crate::service::{
    AuthService, LoginOutcome, RecoveryError, RecoveryService, RegistrationService, SessionStore,
};
use crate::store::CredentialStore;
use crate::utils::error::{AppError, AppResult, ErrorResponse};
use crate::VERSION;

/// Cookie carrying the opaque session id
pub const SESSION_COOKIE: &str = "auth_session";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CredentialStore>,
    pub registration: Arc<RegistrationService>,
    pub auth: Arc<AuthService>,
    pub recovery: Arc<RecoveryService>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    /// Builds the full service stack over any credential store.
    pub fn new(store: Arc<dyn CredentialStore>, security: &SecurityConfig) -> Self {
        Self {
            registration: Arc::new(RegistrationService::new(
                store.clone(),
                security.bcrypt_cost,
            )),
            auth: Arc::new(AuthService::new(store.clone(), security.lockout.clone())),
            recovery: Arc::new(RecoveryService::new(store.clone(), security.bcrypt_cost)),
            sessions: Arc::new(SessionStore::new(security.recovery_link_threshold)),
            store,
        }
    }
}

/// Standard success response wrapper
#[derive(serde::Serialize)]
pub struct SuccessResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

// Extract the session id from the Cookie header, if any.
fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

fn session_cookie_value(session_id: &str) -> String {
    format!("{SESSION_COOKIE}={session_id}; Path=/; HttpOnly; SameSite=Lax")
}

/// Register a new member
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    let user_id = state.registration.register(request).await?;

    let response = RegisterResponse {
        user_id,
        message: "Registration successful! You can now log in.".to_string(),
    };
    Ok((StatusCode::CREATED, Json(SuccessResponse::new(response))))
}

/// Evaluate a login attempt
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.into()))?;

    let session_id = state
        .sessions
        .open(session_id_from_headers(&headers).as_deref());

    let outcome = state
        .auth
        .login(&request.identifier, &request.password)
        .await?;

    let (status, body) = match outcome {
        LoginOutcome::Success(user) => {
            // The browser session and its failure history end here.
            state.sessions.destroy(&session_id);
            (
                StatusCode::OK,
                LoginResponse {
                    outcome: "success",
                    message: "Login successful.".to_string(),
                    user: Some(user),
                    remaining_seconds: None,
                    show_recovery_link: false,
                },
            )
        }
        LoginOutcome::LockedOut { remaining_seconds } => (
            StatusCode::TOO_MANY_REQUESTS,
            LoginResponse {
                outcome: "locked_out",
                message: format!(
                    "Too many failed attempts. Please try again in {remaining_seconds} seconds."
                ),
                user: None,
                remaining_seconds: Some(remaining_seconds),
                show_recovery_link: state.sessions.recovery_link_visible(&session_id),
            },
        ),
        LoginOutcome::InvalidCredentials => {
            let failure = state
                .sessions
                .record_login_failure(&session_id, &request.identifier);
            (
                StatusCode::UNAUTHORIZED,
                LoginResponse {
                    outcome: "invalid_credentials",
                    message: "Invalid credentials.".to_string(),
                    user: None,
                    remaining_seconds: None,
                    show_recovery_link: failure.show_recovery_link,
                },
            )
        }
    };

    Ok((
        status,
        AppendHeaders([(header::SET_COOKIE, session_cookie_value(&session_id))]),
        Json(body),
    ))
}

/// The fixed security-question catalog
pub async fn question_catalog() -> Json<SuccessResponse<QuestionCatalogResponse>> {
    let questions = SecurityQuestionId::ALL
        .iter()
        .map(|q| QuestionCatalogEntry {
            id: q.key(),
            prompt: q.prompt(),
        })
        .collect();

    Json(SuccessResponse::new(QuestionCatalogResponse {
        version: CATALOG_VERSION,
        questions,
    }))
}

/// Recovery stage one: identify the account
pub async fn begin_recovery(
    State(state): State<AppState>,
    Json(request): Json<BeginRecoveryRequest>,
) -> AppResult<Json<SuccessResponse<RecoveryChallengeResponse>>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.into()))?;

    let challenge = state.recovery.begin_recovery(&request.identifier).await?;
    Ok(Json(SuccessResponse::new(challenge)))
}

/// Recovery stage two: verify the three answers
pub async fn submit_recovery_answers(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<SubmitAnswersRequest>,
) -> AppResult<Response> {
    let session_id = state
        .sessions
        .open(session_id_from_headers(&headers).as_deref());
    let cookie = AppendHeaders([(header::SET_COOKIE, session_cookie_value(&session_id))]);

    match state
        .recovery
        .submit_answers(request.user_id, &request.answers, &request.confirmations)
        .await
    {
        Ok(authorization) => {
            // Replaces any authorization an earlier recovery left behind.
            state.sessions.grant_recovery(&session_id, authorization);
            let body = MessageResponse {
                message: "Answers verified. You may now set a new password.".to_string(),
            };
            Ok((StatusCode::OK, cookie, Json(SuccessResponse::new(body))).into_response())
        }
        Err(RecoveryError::AnswersIncorrect) => {
            // Generic by design; the caller returns to the answers stage
            // pre-seeded with the same user.
            let body = ErrorResponse::with_details(
                "ANSWERS_INCORRECT",
                "One or more of the provided answers were incorrect. Please try again.",
                serde_json::json!({ "retry_user_id": request.user_id }),
            );
            Ok((StatusCode::UNAUTHORIZED, cookie, Json(body)).into_response())
        }
        Err(other) => Err(other.into()),
    }
}

/// Terminal recovery operation: set the replacement password
pub async fn set_new_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<SetPasswordRequest>,
) -> AppResult<Json<SuccessResponse<MessageResponse>>> {
    let authorization = session_id_from_headers(&headers)
        .and_then(|session_id| state.sessions.take_recovery(&session_id).map(|a| (session_id, a)));

    let Some((session_id, authorization)) = authorization else {
        // Hard failure: no silent no-op without a live authorization.
        return Err(AppError::Authorization(
            "No active password reset authorization.".to_string(),
        ));
    };

    let user_id = authorization.authorized_user_id;
    match state
        .recovery
        .set_new_password(authorization, &request.new_password, &request.confirm_password)
        .await
    {
        Ok(()) => Ok(Json(SuccessResponse::new(MessageResponse {
            message: "Successfully changed password.".to_string(),
        }))),
        Err(error @ (RecoveryError::WeakPassword(_) | RecoveryError::PasswordMismatch)) => {
            // Correctable input: the authorization survives for a retry.
            state
                .sessions
                .grant_recovery(&session_id, RecoveryAuthorization::new(user_id));
            Err(error.into())
        }
        Err(other) => Err(other.into()),
    }
}

/// Health check endpoint
pub async fn health_check(
    State(state): State<AppState>,
) -> AppResult<Json<SuccessResponse<HealthCheckResponse>>> {
    state.store.health_check().await?;

    let response = HealthCheckResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        version: VERSION.to_string(),
    };
    Ok(Json(SuccessResponse::new(response)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_success_response_creation() {
        let response = SuccessResponse::new("test data");
        assert!(response.success);
        assert_eq!(response.data, "test data");
    }

    #[test]
    fn test_session_id_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; auth_session=abc123; lang=en"),
        );
        assert_eq!(session_id_from_headers(&headers).as_deref(), Some("abc123"));

        let mut other = HeaderMap::new();
        other.insert(header::COOKIE, HeaderValue::from_static("theme=dark"));
        assert_eq!(session_id_from_headers(&other), None);

        assert_eq!(session_id_from_headers(&HeaderMap::new()), None);
    }

    #[test]
    fn test_session_cookie_value() {
        let value = session_cookie_value("abc123");
        assert!(value.starts_with("auth_session=abc123"));
        assert!(value.contains("HttpOnly"));
    }
}

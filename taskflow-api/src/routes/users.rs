/// User endpoints
///
/// - `POST /users/register` - Create an account and receive a session token
/// - `POST /users/login` - Exchange credentials for a session token
///
/// Both set an `Authorization` cookie carrying the token in addition to
/// returning it in the body.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use taskflow_shared::{auth::jwt, services::users::NewUser};
use validator::Validate;

/// Register request
///
/// Absent fields deserialize as empty and fail validation, so a missing
/// field gets the same 400 as an empty one.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterRequest {
    #[validate(
        custom(function = "super::required", message = "first_name is required"),
        length(max = 255, message = "first_name must be at most 255 characters")
    )]
    pub first_name: String,

    #[validate(
        custom(function = "super::required", message = "last_name is required"),
        length(max = 255, message = "last_name must be at most 255 characters")
    )]
    pub last_name: String,

    #[validate(
        custom(function = "super::required", message = "email is required"),
        length(max = 255, message = "email must be at most 255 characters")
    )]
    pub email: String,

    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

impl RegisterRequest {
    /// Order in which missing fields are reported
    const FIELD_ORDER: [&'static str; 4] = ["email", "password", "first_name", "last_name"];
}

/// Login request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginRequest {
    #[validate(
        custom(function = "super::required", message = "email is required"),
        length(max = 255, message = "email must be at most 255 characters")
    )]
    pub email: String,

    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

impl LoginRequest {
    const FIELD_ORDER: [&'static str; 2] = ["email", "password"];
}

/// Session response for register and login
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub user_id: i64,

    /// Token valid for 72 hours
    pub token: String,
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /users/register
/// Content-Type: application/json
///
/// {
///   "first_name": "John",
///   "last_name": "Doe",
///   "email": "j@d.com",
///   "password": "pw"
/// }
/// ```
///
/// # Response
///
/// `201 Created` with `{"user_id": 1, "token": "eyJ..."}`
///
/// # Errors
///
/// - `400 Bad Request`: Malformed JSON or a missing field
/// - `409 Conflict`: Email already registered
/// - `500 Internal Server Error`: Hashing, token or store failure
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(req) = payload?;
    req.validate()
        .map_err(|e| ApiError::from_validation(e, &RegisterRequest::FIELD_ORDER))?;

    let user = state
        .users
        .register(NewUser {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            password: req.password,
        })
        .await?;

    session_response(StatusCode::CREATED, user.id, state.jwt_secret())
}

/// Log in with email and password
///
/// # Endpoint
///
/// ```text
/// POST /users/login
/// Content-Type: application/json
///
/// { "email": "j@d.com", "password": "pw" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Malformed JSON or a missing field
/// - `401 Unauthorized`: Unknown email or wrong password
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(req) = payload?;
    req.validate()
        .map_err(|e| ApiError::from_validation(e, &LoginRequest::FIELD_ORDER))?;

    let user = state.users.login(&req.email, &req.password).await?;

    session_response(StatusCode::OK, user.id, state.jwt_secret())
}

/// Issues a token and returns it in both the body and a cookie
fn session_response(status: StatusCode, user_id: i64, secret: &str) -> ApiResult<Response> {
    let token = jwt::issue_token(user_id, secret)?;

    let cookie = HeaderValue::from_str(&format!("Authorization={}; Path=/; HttpOnly", token))
        .map_err(|e| ApiError::InternalError(format!("Invalid cookie value: {}", e)))?;

    let mut response = (status, Json(SessionResponse { user_id, token })).into_response();
    response.headers_mut().insert(header::SET_COOKIE, cookie);

    Ok(response)
}

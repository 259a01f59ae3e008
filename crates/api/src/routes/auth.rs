//! Authentication and profile routes.
//!
//! Credentials never live here. Registration creates the account at the
//! identity service and mirrors a profile document into `users` under the
//! returned uid; login exchanges an email for a custom sign-in token
//! carrying the role claim. Logout is a client-side concern and the
//! endpoint exists only so the dashboard has something to call.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};

use trego_core::Email;

use crate::error::{AppError, FieldError};
use crate::identity::IdentityError;
use crate::middleware::RequireAuth;
use crate::models::{NewUser, UpdateProfile, User};
use crate::state::AppState;
use crate::store::{Document, collections, from_document, to_document};

use super::missing;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me).put(update_profile))
        .route("/logout", post(logout))
}

#[derive(Debug, Default, Deserialize)]
struct LoginBody {
    email: Option<String>,
    password: Option<String>,
}

async fn register(
    State(state): State<AppState>,
    Json(payload): Json<NewUser>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let valid = payload.validate().map_err(AppError::Validation)?;

    let account = state
        .identity()
        .create_user(valid.email.as_str(), &valid.password, &valid.display_name)
        .await
        .map_err(|e| match e {
            IdentityError::EmailExists => {
                AppError::BadRequest("Email already exists".to_owned())
            }
            other => AppError::Identity(other),
        })?;

    let user = User {
        id: account.uid.clone(),
        email: valid.email.as_str().to_owned(),
        display_name: valid.display_name,
        role: valid.role,
        phone: valid.phone,
        is_active: true,
        created_at: Utc::now(),
        last_login_at: None,
    };
    state
        .store()
        .put(collections::USERS, account.uid.as_str(), to_document(&user)?)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User created successfully",
            "user": {
                "uid": user.id,
                "email": user.email,
                "displayName": user.display_name,
                "role": user.role,
            },
        })),
    ))
}

async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<Json<Value>, AppError> {
    let mut errors = Vec::new();
    let email = match body.email.as_deref().map(Email::parse) {
        Some(Ok(email)) => Some(email),
        _ => {
            errors.push(FieldError::new("email", "Valid email is required"));
            None
        }
    };
    if body.password.as_deref().is_none_or(str::is_empty) {
        errors.push(FieldError::new("password", "Password is required"));
    }
    let Some(email) = email else {
        return Err(AppError::Validation(errors));
    };
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let uid = state
        .identity()
        .lookup_by_email(email.as_str())
        .await
        .map_err(|e| match e {
            IdentityError::UserNotFound => AppError::NotFound("User"),
            other => AppError::Identity(other),
        })?;

    let fields = state
        .store()
        .get(collections::USERS, uid.as_str())
        .await?
        .ok_or(AppError::NotFound("User"))?;
    let user: User = from_document(fields)?;

    if !user.is_active {
        return Err(AppError::Forbidden("Account is deactivated".to_owned()));
    }

    let custom_token = state.identity().custom_token(&uid, user.role).await?;

    let mut update = Document::new();
    update.insert(
        "lastLoginAt".to_owned(),
        Value::String(Utc::now().to_rfc3339()),
    );
    state
        .store()
        .update(collections::USERS, uid.as_str(), update)
        .await
        .map_err(missing("User"))?;

    Ok(Json(json!({
        "message": "Login successful",
        "customToken": custom_token,
        "user": {
            "uid": user.id,
            "email": user.email,
            "displayName": user.display_name,
            "role": user.role,
        },
    })))
}

async fn me(State(state): State<AppState>, auth: RequireAuth) -> Result<Json<User>, AppError> {
    let fields = state
        .store()
        .get(collections::USERS, auth.0.uid.as_str())
        .await?
        .ok_or(AppError::NotFound("User"))?;
    Ok(Json(from_document(fields)?))
}

async fn update_profile(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(payload): Json<UpdateProfile>,
) -> Result<Json<User>, AppError> {
    let mut fields = to_document(&payload)?;
    fields.insert(
        "updatedAt".to_owned(),
        Value::String(Utc::now().to_rfc3339()),
    );

    state
        .store()
        .update(collections::USERS, auth.0.uid.as_str(), fields)
        .await
        .map_err(missing("User"))?;

    let updated = state
        .store()
        .get(collections::USERS, auth.0.uid.as_str())
        .await?
        .ok_or(AppError::NotFound("User"))?;
    Ok(Json(from_document(updated)?))
}

async fn logout(_auth: RequireAuth) -> Json<Value> {
    // Token invalidation is the client's job; the verification cache TTL
    // bounds how long a discarded token would still verify.
    Json(json!({ "message": "Logout successful" }))
}

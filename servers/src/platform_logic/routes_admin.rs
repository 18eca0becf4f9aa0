//! Administration surface: sign-in, content CRUD, live classes, user
//! management, monetization settings and backups.
//!
//! Every mutation follows the refetch-after-write model: write to the
//! store, then `state.reload()` so all consumers see the fresh snapshot.
//! Authorization is UI-level gating on the session cookie's profile role;
//! uploaders may only add lectures, admins manage everything.

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use lib_platform::models::{NewLecture, NewLiveClass, UserProfile};
use lib_platform::monetization::MonetizationConfig;

use crate::platform_logic::error::AppError;
use crate::platform_logic::model::{
    BackupCreated, CreateBatchPayload, CreateChapterPayload, CreateSubjectPayload,
    CreateUserPayload, IdResponse, MonetizationView, RestorePayload, SignInPayload,
    UpdateBatchPayload, UpdateLiveStatusPayload, UpdateUserPayload,
};
use crate::platform_logic::state::{AppState, SESSION_COOKIE};

// ---------- identity ----------

/// Resolves the acting profile from the request cookies or rejects with 401.
async fn require_identity(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<UserProfile, AppError> {
    let cookie_header = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    state
        .identity_from_cookies(cookie_header)
        .await?
        .ok_or(AppError::Unauthorized)
}

/// Like [`require_identity`] but additionally demands a managing role.
async fn require_manager(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<UserProfile, AppError> {
    let profile = require_identity(state, headers).await?;
    if !profile.role.can_manage() {
        return Err(AppError::Forbidden("this action requires an admin role"));
    }
    Ok(profile)
}

/// Sign-in by email: resolves the profile and sets the session cookie.
/// Not an authentication protocol; the identity layer only decides what
/// the admin UI shows.
pub async fn sign_in(
    State(state): State<AppState>,
    Json(payload): Json<SignInPayload>,
) -> Result<impl IntoResponse, AppError> {
    let profile = state
        .store()
        .find_profile_by_email(&payload.email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    info!("sign-in: {} ({})", profile.email, profile.role.as_str());
    let cookie = format!("{}={}; path=/", SESSION_COOKIE, profile.email);
    Ok(([(header::SET_COOKIE, cookie)], Json(profile)))
}

/// Clears the session cookie.
pub async fn sign_out() -> impl IntoResponse {
    let cookie = format!("{}=; max-age=0; path=/", SESSION_COOKIE);
    ([(header::SET_COOKIE, cookie)], Json(json!({ "signed_out": true })))
}

pub async fn whoami(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserProfile>, AppError> {
    Ok(Json(require_identity(&state, &headers).await?))
}

// ---------- batches ----------

pub async fn create_batch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateBatchPayload>,
) -> Result<(StatusCode, Json<IdResponse>), AppError> {
    require_manager(&state, &headers).await?;
    let id = state
        .store()
        .create_batch(&payload.name, payload.description.as_deref())
        .await?;
    state.reload().await?;
    Ok((StatusCode::CREATED, Json(IdResponse { id })))
}

pub async fn update_batch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBatchPayload>,
) -> Result<StatusCode, AppError> {
    require_manager(&state, &headers).await?;
    state
        .store()
        .update_batch(
            id,
            payload.name.as_deref(),
            payload.description.as_deref(),
            payload.assigned_uploaders.as_deref(),
        )
        .await?;
    state.reload().await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_batch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    require_manager(&state, &headers).await?;
    state.store().delete_batch(id).await?;
    state.reload().await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------- subjects ----------

pub async fn create_subject(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(batch_id): Path<Uuid>,
    Json(payload): Json<CreateSubjectPayload>,
) -> Result<(StatusCode, Json<IdResponse>), AppError> {
    require_manager(&state, &headers).await?;
    let id = state
        .store()
        .create_subject(batch_id, &payload.name, &payload.color)
        .await?;
    state.reload().await?;
    Ok((StatusCode::CREATED, Json(IdResponse { id })))
}

pub async fn delete_subject(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    require_manager(&state, &headers).await?;
    state.store().delete_subject(id).await?;
    state.reload().await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------- chapters ----------

pub async fn create_chapter(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(subject_id): Path<Uuid>,
    Json(payload): Json<CreateChapterPayload>,
) -> Result<(StatusCode, Json<IdResponse>), AppError> {
    require_manager(&state, &headers).await?;
    let id = state.store().create_chapter(subject_id, &payload.title).await?;
    state.reload().await?;
    Ok((StatusCode::CREATED, Json(IdResponse { id })))
}

pub async fn delete_chapter(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    require_manager(&state, &headers).await?;
    state.store().delete_chapter(id).await?;
    state.reload().await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------- lectures ----------

/// Lecture creation is open to uploaders as well; the acting identity is
/// recorded on the lecture regardless of what the payload claims.
pub async fn create_lecture(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(chapter_id): Path<Uuid>,
    Json(mut payload): Json<NewLecture>,
) -> Result<(StatusCode, Json<IdResponse>), AppError> {
    let profile = require_identity(&state, &headers).await?;
    payload.uploaded_by = profile.email;
    let id = state.store().create_lecture(chapter_id, &payload).await?;
    state.reload().await?;
    Ok((StatusCode::CREATED, Json(IdResponse { id })))
}

pub async fn delete_lecture(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    require_manager(&state, &headers).await?;
    state.store().delete_lecture(id).await?;
    state.reload().await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------- live classes ----------

pub async fn create_live_class(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<NewLiveClass>,
) -> Result<(StatusCode, Json<IdResponse>), AppError> {
    require_manager(&state, &headers).await?;
    let id = state.store().create_live_class(&payload).await?;
    state.reload().await?;
    Ok((StatusCode::CREATED, Json(IdResponse { id })))
}

pub async fn update_live_class_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLiveStatusPayload>,
) -> Result<StatusCode, AppError> {
    require_manager(&state, &headers).await?;
    state
        .store()
        .update_live_class_status(id, payload.status)
        .await?;
    state.reload().await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_live_class(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    require_manager(&state, &headers).await?;
    state.store().delete_live_class(id).await?;
    state.reload().await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------- users ----------

pub async fn list_users(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<UserProfile>>, AppError> {
    require_manager(&state, &headers).await?;
    Ok(Json(state.store().list_profiles().await?))
}

pub async fn create_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateUserPayload>,
) -> Result<(StatusCode, Json<IdResponse>), AppError> {
    require_manager(&state, &headers).await?;
    let id = state
        .store()
        .create_profile(&payload.email, payload.role, &payload.assigned_batches)
        .await?;
    Ok((StatusCode::CREATED, Json(IdResponse { id })))
}

pub async fn update_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<StatusCode, AppError> {
    require_manager(&state, &headers).await?;
    state
        .store()
        .update_profile(id, payload.role, payload.assigned_batches.as_deref())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    require_manager(&state, &headers).await?;
    state.store().delete_profile(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------- monetization settings ----------

pub async fn get_monetization(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MonetizationView>, AppError> {
    require_manager(&state, &headers).await?;
    let config = state.store().monetization_config().await;
    Ok(Json(MonetizationView::from(config)))
}

pub async fn put_monetization(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(config): Json<MonetizationConfig>,
) -> Result<Json<MonetizationView>, AppError> {
    require_manager(&state, &headers).await?;
    config.validate().map_err(AppError::BadRequest)?;
    state.store().save_monetization_config(&config).await?;
    info!(
        "monetization settings updated: duration {}s, linkshortify {}",
        config.access_duration, config.linkshortify_enabled
    );
    Ok(Json(MonetizationView::from(config)))
}

// ---------- backups ----------

pub async fn create_backup(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<BackupCreated>), AppError> {
    require_manager(&state, &headers).await?;
    // Back up what the database holds now, not a possibly stale snapshot.
    let snapshot = state.reload().await?;
    let backup_date = state.store().create_backup(&snapshot).await?;
    info!("manual backup stored for {}", backup_date);
    Ok((StatusCode::CREATED, Json(BackupCreated { backup_date })))
}

pub async fn list_backups(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    require_manager(&state, &headers).await?;
    let backups = state.store().list_backups().await?;
    Ok(Json(json!({ "backups": backups })))
}

pub async fn restore_backup(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<RestorePayload>,
) -> Result<StatusCode, AppError> {
    require_manager(&state, &headers).await?;
    let snapshot = state.store().restore_backup(payload.restore_date).await?;
    info!(
        "restored backup of {}: {} batches, {} live classes",
        payload.restore_date,
        snapshot.batches.len(),
        snapshot.live_classes.len()
    );
    state.install(std::sync::Arc::new(snapshot)).await;
    Ok(StatusCode::NO_CONTENT)
}

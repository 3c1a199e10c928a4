use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::auth::dto::{PublicUser, UpdatePasswordRequest};
use crate::auth::jwt::CurrentUser;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::validate;
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::dto::{
    AgentProfileResponse, AgentPublicProfile, MessageResponse, ProfileResponse,
    UpdateProfileRequest, UpdateProfileResponse,
};
use crate::users::repo_types::User;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile).put(update_profile))
        .route("/password", put(update_password))
        .route("/agents/:id", get(get_agent_profile))
}

#[instrument(skip_all)]
async fn get_profile(CurrentUser(user): CurrentUser) -> Json<ProfileResponse> {
    Json(ProfileResponse {
        user: PublicUser::from(&user),
    })
}

#[instrument(skip_all, fields(user_id = %user.id))]
async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<UpdateProfileResponse>, ApiError> {
    let mut patch = payload.into_allowed(user.role());
    validate::validate_patch(&patch)?;
    if let Some(hours) = patch.working_hours.take() {
        patch.working_hours = Some(crate::users::repo_types::WorkingHours {
            start: validate::normalize_time(&hours.start),
            end: validate::normalize_time(&hours.end),
        });
    }

    // A patch whose every field was discarded by the allow-list is a no-op;
    // skip the write and echo the current record.
    let updated = if patch.is_empty() {
        user
    } else {
        User::update(&state.db, user.id, patch)
            .await?
            .ok_or(ApiError::NotFound("User"))?
    };

    info!("profile updated");
    Ok(Json(UpdateProfileResponse {
        message: "Profile updated successfully",
        user: PublicUser::from(&updated),
    }))
}

#[instrument(skip_all, fields(user_id = %user.id))]
async fn update_password(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<UpdatePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    validate::validate_password_update(&payload)?;

    if !verify_password(&payload.current_password, &user.password_hash)? {
        warn!("password change with wrong current password");
        return Err(ApiError::InvalidCurrentPassword);
    }

    // The new password is hashed exactly once, here; the profile-update path
    // cannot reach the password column at all.
    let password_hash = hash_password(&payload.new_password)?;
    if !User::update_password(&state.db, user.id, &password_hash).await? {
        return Err(ApiError::NotFound("User"));
    }

    info!("password updated");
    Ok(Json(MessageResponse {
        message: "Password updated successfully",
    }))
}

/// Public lookup. A customer id resolves to 404 just like an unknown id: only
/// agents have a public profile.
#[instrument(skip(state))]
async fn get_agent_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AgentProfileResponse>, ApiError> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Agent"))?;
    let agent = user.agent().ok_or(ApiError::NotFound("Agent"))?;
    Ok(Json(AgentProfileResponse {
        agent: AgentPublicProfile::new(&user, agent),
    }))
}

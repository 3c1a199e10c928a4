use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::auth::dto::{AuthResponse, PublicUser, SigninRequest, SignupRequest};
use crate::auth::jwt::JwtKeys;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::validate;
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::repo::{NewAgentFields, NewUser};
use crate::users::repo_types::{Role, User, WorkingHours};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup/customer", post(signup_customer))
        .route("/signup/agent", post(signup_agent))
        .route("/signin", post(signin))
}

#[instrument(skip(state, payload))]
async fn signup_customer(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    signup(state, Role::Customer, payload).await
}

#[instrument(skip(state, payload))]
async fn signup_agent(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    signup(state, Role::Agent, payload).await
}

/// Shared signup flow; the role is pinned by the route, never by the body.
async fn signup(
    state: AppState,
    role: Role,
    mut payload: SignupRequest,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    payload.email = validate::normalize_email(&payload.email);
    validate::validate_signup(&payload, role)?;

    // Early duplicate check for a friendlier error; the unique constraint on
    // email is the real guarantee and maps to the same response if we race.
    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "signup with existing email");
        return Err(ApiError::DuplicateEmail);
    }

    let password_hash = hash_password(&payload.password)?;

    let agent = match role {
        Role::Customer => None,
        // Validation guarantees the agent fields are present and well-formed.
        Role::Agent => Some(NewAgentFields {
            specialization: payload.specialization.unwrap_or_default().trim().to_string(),
            working_days: payload.working_days.unwrap_or_default(),
            working_hours: payload
                .working_hours
                .map(|h| WorkingHours {
                    start: validate::normalize_time(&h.start),
                    end: validate::normalize_time(&h.end),
                })
                .unwrap_or(WorkingHours {
                    start: String::new(),
                    end: String::new(),
                }),
            charges: payload.charges.unwrap_or_default(),
        }),
    };

    let user = User::create(
        &state.db,
        NewUser {
            full_name: payload.full_name.trim().to_string(),
            email: payload.email,
            password_hash,
            region: payload.region.trim().to_string(),
            district: payload.district.trim().to_string(),
            phone_number: payload.phone_number.trim().to_string(),
            ethereum_wallet_id: payload.ethereum_wallet_id.trim().to_string(),
            role,
            agent,
        },
    )
    .await?;

    let token = JwtKeys::from_ref(&state).sign(user.id, role)?;

    info!(user_id = %user.id, role = ?role, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully",
            token,
            user: PublicUser::from(&user),
        }),
    ))
}

#[instrument(skip(state, payload))]
async fn signin(
    State(state): State<AppState>,
    Json(mut payload): Json<SigninRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.email = validate::normalize_email(&payload.email);
    validate::validate_signin(&payload)?;

    // Unknown email and wrong password produce the same response, so the
    // endpoint cannot be used to enumerate accounts.
    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| {
            warn!(email = %payload.email, "signin with unknown email");
            ApiError::InvalidCredentials
        })?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "signin with invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let token = JwtKeys::from_ref(&state).sign(user.id, user.role())?;

    info!(user_id = %user.id, "user signed in");
    Ok(Json(AuthResponse {
        message: "Signed in successfully",
        token,
        user: PublicUser::from(&user),
    }))
}

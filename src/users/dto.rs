use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::dto::PublicUser;
use crate::users::repo::UserPatch;
use crate::users::repo_types::{AgentProfile, CertificateFile, Role, User, WorkingHours};

/// Profile patch. Password, email and role have no fields here, so those keys
/// in a request body are dropped during deserialization; any other unknown key
/// is likewise silently discarded rather than rejected.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub region: Option<String>,
    pub district: Option<String>,
    pub phone_number: Option<String>,
    pub specialization: Option<String>,
    pub working_days: Option<Vec<String>>,
    pub working_hours: Option<WorkingHours>,
    pub charges: Option<f64>,
}

impl UpdateProfileRequest {
    /// Applies the role allow-list: customers may change their basic contact
    /// fields; agents may additionally change their service fields. Everything
    /// outside the list is discarded without error.
    pub fn into_allowed(self, role: Role) -> UserPatch {
        let mut patch = UserPatch {
            full_name: self.full_name,
            region: self.region,
            district: self.district,
            phone_number: self.phone_number,
            ..Default::default()
        };
        if role == Role::Agent {
            patch.specialization = self.specialization;
            patch.working_days = self.working_days;
            patch.working_hours = self.working_hours;
            patch.charges = self.charges;
        }
        patch
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct UpdateProfileResponse {
    pub message: &'static str,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Public agent view: everything a prospective customer may see. No password
/// field exists on the type and the email is deliberately absent.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentPublicProfile {
    pub id: Uuid,
    pub full_name: String,
    pub region: String,
    pub district: String,
    pub phone_number: String,
    pub ethereum_wallet_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub specialization: String,
    pub certificate_files: Vec<CertificateFile>,
    pub working_days: Vec<String>,
    pub working_hours: WorkingHours,
    pub charges: f64,
    pub rating: f64,
    pub total_ratings: i32,
}

impl AgentPublicProfile {
    pub fn new(user: &User, agent: &AgentProfile) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name.clone(),
            region: user.region.clone(),
            district: user.district.clone(),
            phone_number: user.phone_number.clone(),
            ethereum_wallet_id: user.ethereum_wallet_id.clone(),
            created_at: user.created_at,
            specialization: agent.specialization.clone(),
            certificate_files: agent.certificate_files.clone(),
            working_days: agent.working_days.clone(),
            working_hours: agent.working_hours.clone(),
            charges: agent.charges,
            rating: agent.rating,
            total_ratings: agent.total_ratings,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AgentProfileResponse {
    pub agent: AgentPublicProfile,
}

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::repo_types::{CertificateFile, Role, RoleProfile, User, WorkingHours};

/// Signup body shared by both roles; agent fields stay `None` for customers.
/// Missing scalar fields default to empty strings so the validation layer can
/// report every omission instead of the deserializer rejecting the request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub ethereum_wallet_id: String,
    pub specialization: Option<String>,
    pub working_days: Option<Vec<String>>,
    pub working_hours: Option<WorkingHours>,
    pub charges: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

/// Client-facing user. Built from the domain record; the password hash has no
/// field here, so it cannot leak. Agent-only fields serialize only when set.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub region: String,
    pub district: String,
    pub phone_number: String,
    pub ethereum_wallet_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_files: Option<Vec<CertificateFile>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_days: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_hours: Option<WorkingHours>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charges: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_ratings: Option<i32>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        let mut public = Self {
            id: user.id,
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            role: user.role(),
            region: user.region.clone(),
            district: user.district.clone(),
            phone_number: user.phone_number.clone(),
            ethereum_wallet_id: user.ethereum_wallet_id.clone(),
            created_at: user.created_at,
            specialization: None,
            certificate_files: None,
            working_days: None,
            working_hours: None,
            charges: None,
            rating: None,
            total_ratings: None,
        };
        if let RoleProfile::Agent(agent) = &user.profile {
            public.specialization = Some(agent.specialization.clone());
            public.certificate_files = Some(agent.certificate_files.clone());
            public.working_days = Some(agent.working_days.clone());
            public.working_hours = Some(agent.working_hours.clone());
            public.charges = Some(agent.charges);
            public.rating = Some(agent.rating);
            public.total_ratings = Some(agent.total_ratings);
        }
        public
    }
}

/// Body returned by signup and signin.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: &'static str,
    pub token: String,
    pub user: PublicUser,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::repo_types::test_support::{agent_row, customer_row};

    #[test]
    fn public_user_never_serializes_password() {
        let user = User::from(agent_row());
        let json = serde_json::to_value(PublicUser::from(&user)).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("password"));
        assert!(!obj.contains_key("passwordHash"));
        assert!(!obj.contains_key("password_hash"));
    }

    #[test]
    fn customer_omits_agent_fields() {
        let user = User::from(customer_row());
        let json = serde_json::to_value(PublicUser::from(&user)).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj["role"], "customer");
        assert!(!obj.contains_key("specialization"));
        assert!(!obj.contains_key("charges"));
        assert!(!obj.contains_key("rating"));
    }

    #[test]
    fn agent_exposes_agent_fields() {
        let user = User::from(agent_row());
        let json = serde_json::to_value(PublicUser::from(&user)).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj["role"], "agent");
        assert_eq!(obj["specialization"], "Plumbing");
        assert_eq!(obj["charges"], 50.0);
        assert_eq!(obj["workingHours"]["start"], "08:00");
    }

    #[test]
    fn signup_request_tolerates_missing_fields() {
        // Deserialization must not fail; validation reports the omissions.
        let req: SignupRequest = serde_json::from_str("{}").unwrap();
        assert!(req.full_name.is_empty());
        assert!(req.charges.is_none());
    }

    #[test]
    fn signup_request_tolerates_partial_working_hours() {
        // A working-hours object missing one bound must still deserialize so
        // the validation layer can report it as a field error.
        let req: SignupRequest = serde_json::from_value(serde_json::json!({
            "workingHours": { "start": "09:00" }
        }))
        .unwrap();
        let hours = req.working_hours.expect("object should be kept");
        assert_eq!(hours.start, "09:00");
        assert!(hours.end.is_empty());
    }
}

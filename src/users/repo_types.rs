use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Role discriminator, fixed at signup. One email maps to exactly one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Agent,
}

/// Reference to an uploaded certificate file, stored as JSONB.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateFile {
    pub filename: String,
    pub path: String,
    #[serde(with = "time::serde::rfc3339")]
    pub upload_date: OffsetDateTime,
}

/// Daily working window, "HH:MM" zero-padded so string order is time order.
/// Missing fields deserialize to empty strings so a partial object reaches the
/// validation layer and comes back as a field error, not a body rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHours {
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
}

/// Flat row as stored in `users`. Agent columns are NULL for customers.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub region: String,
    pub district: String,
    pub phone_number: String,
    pub ethereum_wallet_id: String,
    pub role: Role,
    pub created_at: OffsetDateTime,
    pub specialization: Option<String>,
    pub certificate_files: Option<sqlx::types::Json<Vec<CertificateFile>>>,
    pub working_days: Option<Vec<String>>,
    pub working_hours_start: Option<String>,
    pub working_hours_end: Option<String>,
    pub charges: Option<f64>,
    pub rating: f64,
    pub total_ratings: i32,
}

/// Agent-only payload of the identity record.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentProfile {
    pub specialization: String,
    pub certificate_files: Vec<CertificateFile>,
    pub working_days: Vec<String>,
    pub working_hours: WorkingHours,
    pub charges: f64,
    pub rating: f64,
    pub total_ratings: i32,
}

/// Role-specific part of a user: empty for customers, `AgentProfile` for agents.
#[derive(Debug, Clone, PartialEq)]
pub enum RoleProfile {
    Customer,
    Agent(AgentProfile),
}

/// Identity record shared by both roles. The password hash never leaves the
/// process; response DTOs omit it structurally.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub region: String,
    pub district: String,
    pub phone_number: String,
    pub ethereum_wallet_id: String,
    pub created_at: OffsetDateTime,
    pub profile: RoleProfile,
}

impl User {
    pub fn role(&self) -> Role {
        match self.profile {
            RoleProfile::Customer => Role::Customer,
            RoleProfile::Agent(_) => Role::Agent,
        }
    }

    pub fn agent(&self) -> Option<&AgentProfile> {
        match &self.profile {
            RoleProfile::Customer => None,
            RoleProfile::Agent(a) => Some(a),
        }
    }

    /// Role gate predicate: 403 unless the user is an agent.
    pub fn ensure_agent(&self) -> Result<&AgentProfile, crate::error::ApiError> {
        self.agent().ok_or(crate::error::ApiError::Forbidden("Agents"))
    }

    /// Role gate predicate: 403 unless the user is a customer.
    pub fn ensure_customer(&self) -> Result<(), crate::error::ApiError> {
        match self.profile {
            RoleProfile::Customer => Ok(()),
            RoleProfile::Agent(_) => Err(crate::error::ApiError::Forbidden("Customers")),
        }
    }
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        let profile = match row.role {
            Role::Customer => RoleProfile::Customer,
            Role::Agent => RoleProfile::Agent(AgentProfile {
                specialization: row.specialization.unwrap_or_default(),
                certificate_files: row.certificate_files.map(|j| j.0).unwrap_or_default(),
                working_days: row.working_days.unwrap_or_default(),
                working_hours: WorkingHours {
                    start: row.working_hours_start.unwrap_or_default(),
                    end: row.working_hours_end.unwrap_or_default(),
                },
                charges: row.charges.unwrap_or_default(),
                rating: row.rating,
                total_ratings: row.total_ratings,
            }),
        };
        Self {
            id: row.id,
            full_name: row.full_name,
            email: row.email,
            password_hash: row.password_hash,
            region: row.region,
            district: row.district,
            phone_number: row.phone_number,
            ethereum_wallet_id: row.ethereum_wallet_id,
            created_at: row.created_at,
            profile,
        }
    }
}

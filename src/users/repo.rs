use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;
use crate::users::repo_types::{CertificateFile, Role, User, UserRow, WorkingHours};

const USER_COLUMNS: &str = "id, full_name, email, password_hash, region, district, \
     phone_number, ethereum_wallet_id, role, created_at, specialization, \
     certificate_files, working_days, working_hours_start, working_hours_end, \
     charges, rating, total_ratings";

/// Agent-only fields supplied at signup.
#[derive(Debug)]
pub struct NewAgentFields {
    pub specialization: String,
    pub working_days: Vec<String>,
    pub working_hours: WorkingHours,
    pub charges: f64,
}

/// Payload for inserting a user. The password is already hashed by the caller;
/// hashing is an explicit step of the signup and password-change flows, never a
/// side effect of persistence.
#[derive(Debug)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub region: String,
    pub district: String,
    pub phone_number: String,
    pub ethereum_wallet_id: String,
    pub role: Role,
    pub agent: Option<NewAgentFields>,
}

/// Field-level merge applied by `User::update`. Password, email and role are
/// structurally absent: this path cannot touch them.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct UserPatch {
    pub full_name: Option<String>,
    pub region: Option<String>,
    pub district: Option<String>,
    pub phone_number: Option<String>,
    pub specialization: Option<String>,
    pub working_days: Option<Vec<String>>,
    pub working_hours: Option<WorkingHours>,
    pub charges: Option<f64>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        *self == UserPatch::default()
    }
}

impl User {
    pub async fn create(db: &PgPool, new: NewUser) -> Result<User, ApiError> {
        let (specialization, working_days, start, end, charges, certificates) = match &new.agent {
            Some(a) => (
                Some(a.specialization.as_str()),
                Some(a.working_days.clone()),
                Some(a.working_hours.start.as_str()),
                Some(a.working_hours.end.as_str()),
                Some(a.charges),
                // No certificates are uploaded at signup; agents start with an empty list.
                Some(sqlx::types::Json(Vec::<CertificateFile>::new())),
            ),
            None => (None, None, None, None, None, None),
        };

        let sql = format!(
            r#"
            INSERT INTO users (full_name, email, password_hash, region, district,
                               phone_number, ethereum_wallet_id, role, specialization,
                               certificate_files, working_days, working_hours_start,
                               working_hours_end, charges)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {USER_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&new.full_name)
            .bind(&new.email)
            .bind(&new.password_hash)
            .bind(&new.region)
            .bind(&new.district)
            .bind(&new.phone_number)
            .bind(&new.ethereum_wallet_id)
            .bind(new.role)
            .bind(specialization)
            .bind(certificates)
            .bind(working_days)
            .bind(start)
            .bind(end)
            .bind(charges)
            .fetch_one(db)
            .await?;
        Ok(row.into())
    }

    pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<User>, ApiError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(db)
            .await?;
        Ok(row.map(Into::into))
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<User>, ApiError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await?;
        Ok(row.map(Into::into))
    }

    /// Partial merge; absent patch fields keep their stored value. Returns the
    /// updated record, or `None` when the id no longer resolves.
    pub async fn update(db: &PgPool, id: Uuid, patch: UserPatch) -> Result<Option<User>, ApiError> {
        let (start, end) = match &patch.working_hours {
            Some(h) => (Some(h.start.as_str()), Some(h.end.as_str())),
            None => (None, None),
        };
        let sql = format!(
            r#"
            UPDATE users SET
                full_name = COALESCE($2, full_name),
                region = COALESCE($3, region),
                district = COALESCE($4, district),
                phone_number = COALESCE($5, phone_number),
                specialization = COALESCE($6, specialization),
                working_days = COALESCE($7, working_days),
                working_hours_start = COALESCE($8, working_hours_start),
                working_hours_end = COALESCE($9, working_hours_end),
                charges = COALESCE($10, charges)
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(patch.full_name)
            .bind(patch.region)
            .bind(patch.district)
            .bind(patch.phone_number)
            .bind(patch.specialization)
            .bind(patch.working_days)
            .bind(start)
            .bind(end)
            .bind(patch.charges)
            .fetch_optional(db)
            .await?;
        Ok(row.map(Into::into))
    }

    /// Replaces the stored hash. The caller hashes exactly once before calling;
    /// no other update path can modify the password column.
    pub async fn update_password(
        db: &PgPool,
        id: Uuid,
        password_hash: &str,
    ) -> Result<bool, ApiError> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(db)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_patch_is_detected() {
        assert!(UserPatch::default().is_empty());
        let patch = UserPatch {
            full_name: Some("New Name".into()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}

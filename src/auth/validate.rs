//! Declarative request validation, applied before anything touches the model.
//!
//! Every check runs to completion and violations are collected, so a single
//! response reports all problems as `{field, message}` pairs. Agent-only rules
//! are inert for customer payloads.

use lazy_static::lazy_static;
use regex::Regex;

use crate::auth::dto::{SigninRequest, SignupRequest, UpdatePasswordRequest};
use crate::error::{ApiError, FieldError};
use crate::users::repo::UserPatch;
use crate::users::repo_types::Role;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    static ref PHONE_RE: Regex = Regex::new(r"^\+?[1-9]\d{1,14}$").unwrap();
    static ref WALLET_RE: Regex = Regex::new(r"^0x[a-fA-F0-9]{40}$").unwrap();
    static ref TIME_RE: Regex = Regex::new(r"^([0-1]?[0-9]|2[0-3]):[0-5][0-9]$").unwrap();
}

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Accumulates violations; checks never short-circuit each other.
#[derive(Debug, Default)]
pub struct Violations(Vec<FieldError>);

impl Violations {
    fn push(&mut self, field: &str, message: &str) {
        self.0.push(FieldError::new(field, message));
    }

    fn into_result(self) -> Result<(), ApiError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self.0))
        }
    }
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Zero-pads the hour so "9:30" becomes "09:30"; padded HH:MM strings order
/// lexicographically the same as times of day.
pub fn normalize_time(raw: &str) -> String {
    match raw.split_once(':') {
        Some((h, m)) if h.len() == 1 => format!("0{h}:{m}"),
        _ => raw.to_string(),
    }
}

fn has_upper_lower_digit(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_uppercase())
        && s.chars().any(|c| c.is_ascii_lowercase())
        && s.chars().any(|c| c.is_ascii_digit())
}

fn check_full_name(v: &mut Violations, value: &str) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        v.push("fullName", "Full name is required");
    } else {
        let len = trimmed.chars().count();
        if !(2..=50).contains(&len) {
            v.push("fullName", "Full name must be between 2 and 50 characters");
        }
    }
}

fn check_email(v: &mut Violations, value: &str) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        v.push("email", "Email is required");
    } else if !EMAIL_RE.is_match(trimmed) {
        v.push("email", "Please enter a valid email");
    }
}

fn check_password_strength(v: &mut Violations, field: &str, value: &str, prefix: &str) {
    if value.is_empty() {
        v.push(field, &format!("{prefix} is required"));
        return;
    }
    if value.chars().count() < 6 {
        v.push(field, &format!("{prefix} must be at least 6 characters"));
    }
    if !has_upper_lower_digit(value) {
        v.push(
            field,
            "Password must contain at least one uppercase letter, one lowercase letter, and one number",
        );
    }
}

fn check_phone(v: &mut Violations, value: &str) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        v.push("phoneNumber", "Phone number is required");
    } else if !PHONE_RE.is_match(trimmed) {
        v.push("phoneNumber", "Please enter a valid phone number");
    }
}

fn check_wallet(v: &mut Violations, value: &str) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        v.push("ethereumWalletId", "Ethereum wallet ID is required");
    } else if !WALLET_RE.is_match(trimmed) {
        v.push("ethereumWalletId", "Please enter a valid Ethereum wallet address");
    }
}

fn check_working_days(v: &mut Violations, days: &[String]) {
    if days.is_empty() {
        v.push("workingDays", "Working days are required");
    } else if !days.iter().all(|d| WEEKDAYS.contains(&d.as_str())) {
        v.push("workingDays", "Invalid working days");
    }
}

fn check_working_hours(v: &mut Violations, start: &str, end: &str) {
    let start_ok = TIME_RE.is_match(start);
    let end_ok = TIME_RE.is_match(end);
    if !start_ok {
        v.push("workingHours.start", "Invalid start time format (HH:MM)");
    }
    if !end_ok {
        v.push("workingHours.end", "Invalid end time format (HH:MM)");
    }
    // Strict ordering as times of day; equality is rejected.
    if start_ok && end_ok && normalize_time(end) <= normalize_time(start) {
        v.push("workingHours.end", "End time must be after start time");
    }
}

fn check_charges(v: &mut Violations, charges: f64) {
    if charges.is_nan() || charges < 0.0 {
        v.push("charges", "Charges must be a positive number");
    }
}

/// Full signup rule set. Agent-conditional rules activate only for `Role::Agent`.
pub fn validate_signup(req: &SignupRequest, role: Role) -> Result<(), ApiError> {
    let mut v = Violations::default();

    check_full_name(&mut v, &req.full_name);
    check_email(&mut v, &req.email);
    check_password_strength(&mut v, "password", &req.password, "Password");
    if req.region.trim().is_empty() {
        v.push("region", "Region is required");
    }
    if req.district.trim().is_empty() {
        v.push("district", "District is required");
    }
    check_phone(&mut v, &req.phone_number);
    check_wallet(&mut v, &req.ethereum_wallet_id);

    if role == Role::Agent {
        match req.specialization.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => {}
            _ => v.push("specialization", "Specialization is required"),
        }
        match &req.working_days {
            Some(days) => check_working_days(&mut v, days),
            None => v.push("workingDays", "Working days are required"),
        }
        match &req.working_hours {
            Some(hours) => check_working_hours(&mut v, &hours.start, &hours.end),
            None => {
                v.push("workingHours.start", "Working hours start time is required");
                v.push("workingHours.end", "Working hours end time is required");
            }
        }
        match req.charges {
            Some(c) => check_charges(&mut v, c),
            None => v.push("charges", "Charges are required"),
        }
    }

    v.into_result()
}

/// Signin is a strict subset: syntactic email, non-empty password. Password
/// strength is not re-checked at login.
pub fn validate_signin(req: &SigninRequest) -> Result<(), ApiError> {
    let mut v = Violations::default();
    check_email(&mut v, &req.email);
    if req.password.is_empty() {
        v.push("password", "Password is required");
    }
    v.into_result()
}

pub fn validate_password_update(req: &UpdatePasswordRequest) -> Result<(), ApiError> {
    let mut v = Violations::default();
    if req.current_password.is_empty() {
        v.push("currentPassword", "Current password is required");
    }
    check_password_strength(&mut v, "newPassword", &req.new_password, "New password");
    v.into_result()
}

/// Revalidates only the fields a profile patch actually carries.
pub fn validate_patch(patch: &UserPatch) -> Result<(), ApiError> {
    let mut v = Violations::default();
    if let Some(name) = &patch.full_name {
        check_full_name(&mut v, name);
    }
    if let Some(region) = &patch.region {
        if region.trim().is_empty() {
            v.push("region", "Region is required");
        }
    }
    if let Some(district) = &patch.district {
        if district.trim().is_empty() {
            v.push("district", "District is required");
        }
    }
    if let Some(phone) = &patch.phone_number {
        check_phone(&mut v, phone);
    }
    if let Some(specialization) = &patch.specialization {
        if specialization.trim().is_empty() {
            v.push("specialization", "Specialization is required");
        }
    }
    if let Some(days) = &patch.working_days {
        check_working_days(&mut v, days);
    }
    if let Some(hours) = &patch.working_hours {
        check_working_hours(&mut v, &hours.start, &hours.end);
    }
    if let Some(charges) = patch.charges {
        check_charges(&mut v, charges);
    }
    v.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::repo_types::WorkingHours;

    fn customer_signup() -> SignupRequest {
        SignupRequest {
            full_name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            password: "Str0ngPass".into(),
            region: "Dhaka".into(),
            district: "Gulshan".into(),
            phone_number: "+8801712345678".into(),
            ethereum_wallet_id: format!("0x{}", "a".repeat(40)),
            specialization: None,
            working_days: None,
            working_hours: None,
            charges: None,
        }
    }

    fn agent_signup() -> SignupRequest {
        SignupRequest {
            specialization: Some("Plumbing".into()),
            working_days: Some(vec!["Monday".into()]),
            working_hours: Some(WorkingHours {
                start: "08:00".into(),
                end: "17:00".into(),
            }),
            charges: Some(50.0),
            ..customer_signup()
        }
    }

    fn fields(err: ApiError) -> Vec<String> {
        match err {
            ApiError::Validation(errors) => errors.into_iter().map(|e| e.field).collect(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn valid_customer_signup_passes() {
        assert!(validate_signup(&customer_signup(), Role::Customer).is_ok());
    }

    #[test]
    fn valid_agent_signup_passes() {
        assert!(validate_signup(&agent_signup(), Role::Agent).is_ok());
    }

    #[test]
    fn collects_all_violations_in_one_pass() {
        let req = SignupRequest {
            full_name: "J".into(),
            email: "not-an-email".into(),
            password: "short".into(),
            phone_number: "0123".into(),
            ..customer_signup()
        };
        let err = validate_signup(&req, Role::Customer).unwrap_err();
        let fields = fields(err);
        assert!(fields.contains(&"fullName".to_string()));
        assert!(fields.contains(&"email".to_string()));
        assert!(fields.contains(&"password".to_string()));
        assert!(fields.contains(&"phoneNumber".to_string()));
        assert!(fields.len() >= 4);
    }

    #[test]
    fn password_needs_upper_lower_digit() {
        let req = SignupRequest {
            password: "alllowercase".into(),
            ..customer_signup()
        };
        let err = validate_signup(&req, Role::Customer).unwrap_err();
        assert_eq!(fields(err), vec!["password"]);
    }

    #[test]
    fn weak_short_password_reports_both_rules() {
        let req = SignupRequest {
            password: "abc".into(),
            ..customer_signup()
        };
        let err = validate_signup(&req, Role::Customer).unwrap_err();
        let fields = fields(err);
        assert_eq!(fields, vec!["password", "password"]);
    }

    #[test]
    fn wallet_must_be_forty_hex_chars() {
        let req = SignupRequest {
            ethereum_wallet_id: "0x1234".into(),
            ..customer_signup()
        };
        let err = validate_signup(&req, Role::Customer).unwrap_err();
        assert_eq!(fields(err), vec!["ethereumWalletId"]);
    }

    #[test]
    fn agent_rules_are_inert_for_customers() {
        // A customer payload missing every agent field is still valid.
        let req = customer_signup();
        assert!(req.specialization.is_none());
        assert!(validate_signup(&req, Role::Customer).is_ok());
    }

    #[test]
    fn agent_missing_conditional_fields_fails() {
        let err = validate_signup(&customer_signup(), Role::Agent).unwrap_err();
        let fields = fields(err);
        assert!(fields.contains(&"specialization".to_string()));
        assert!(fields.contains(&"workingDays".to_string()));
        assert!(fields.contains(&"workingHours.start".to_string()));
        assert!(fields.contains(&"charges".to_string()));
    }

    #[test]
    fn invalid_weekday_is_rejected() {
        let req = SignupRequest {
            working_days: Some(vec!["Monday".into(), "Funday".into()]),
            ..agent_signup()
        };
        let err = validate_signup(&req, Role::Agent).unwrap_err();
        assert_eq!(fields(err), vec!["workingDays"]);
    }

    #[test]
    fn working_hours_equal_boundary_is_rejected() {
        let req = SignupRequest {
            working_hours: Some(WorkingHours {
                start: "09:00".into(),
                end: "09:00".into(),
            }),
            ..agent_signup()
        };
        let err = validate_signup(&req, Role::Agent).unwrap_err();
        assert_eq!(fields(err), vec!["workingHours.end"]);
    }

    #[test]
    fn partial_working_hours_reports_missing_bound_as_field_error() {
        // `{"workingHours": {"start": "09:00"}}` deserializes with an empty
        // end; that must surface as a workingHours.end violation, not a 422.
        let req: SignupRequest = serde_json::from_value(serde_json::json!({
            "fullName": "Jane Doe",
            "email": "jane@example.com",
            "password": "Str0ngPass",
            "region": "Dhaka",
            "district": "Gulshan",
            "phoneNumber": "+8801712345678",
            "ethereumWalletId": format!("0x{}", "a".repeat(40)),
            "specialization": "Plumbing",
            "workingDays": ["Monday"],
            "workingHours": { "start": "09:00" },
            "charges": 50.0,
        }))
        .unwrap();
        let err = validate_signup(&req, Role::Agent).unwrap_err();
        assert_eq!(fields(err), vec!["workingHours.end"]);
    }

    #[test]
    fn working_hours_one_minute_later_is_accepted() {
        let req = SignupRequest {
            working_hours: Some(WorkingHours {
                start: "09:00".into(),
                end: "09:01".into(),
            }),
            ..agent_signup()
        };
        assert!(validate_signup(&req, Role::Agent).is_ok());
    }

    #[test]
    fn unpadded_hours_compare_as_times_of_day() {
        // "9:00".."17:00" is valid even though "17:00" < "9:00" as raw strings.
        let req = SignupRequest {
            working_hours: Some(WorkingHours {
                start: "9:00".into(),
                end: "17:00".into(),
            }),
            ..agent_signup()
        };
        assert!(validate_signup(&req, Role::Agent).is_ok());
    }

    #[test]
    fn negative_charges_are_rejected() {
        let req = SignupRequest {
            charges: Some(-1.0),
            ..agent_signup()
        };
        let err = validate_signup(&req, Role::Agent).unwrap_err();
        assert_eq!(fields(err), vec!["charges"]);
    }

    #[test]
    fn signin_skips_password_strength() {
        let req = SigninRequest {
            email: "jane@example.com".into(),
            password: "weak".into(),
        };
        assert!(validate_signin(&req).is_ok());
    }

    #[test]
    fn signin_requires_email_and_password() {
        let req = SigninRequest {
            email: "".into(),
            password: "".into(),
        };
        let err = validate_signin(&req).unwrap_err();
        assert_eq!(fields(err), vec!["email", "password"]);
    }

    #[test]
    fn password_update_checks_new_password_strength() {
        let req = UpdatePasswordRequest {
            current_password: "OldPass1".into(),
            new_password: "weak".into(),
        };
        let err = validate_password_update(&req).unwrap_err();
        assert_eq!(fields(err), vec!["newPassword", "newPassword"]);
    }

    #[test]
    fn patch_validates_only_provided_fields() {
        let patch = UserPatch {
            phone_number: Some("invalid".into()),
            ..Default::default()
        };
        let err = validate_patch(&patch).unwrap_err();
        assert_eq!(fields(err), vec!["phoneNumber"]);

        assert!(validate_patch(&UserPatch::default()).is_ok());
    }

    #[test]
    fn normalize_time_pads_single_digit_hours() {
        assert_eq!(normalize_time("9:30"), "09:30");
        assert_eq!(normalize_time("09:30"), "09:30");
        assert_eq!(normalize_time("23:59"), "23:59");
    }

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email("  Jane@Example.COM "), "jane@example.com");
    }
}

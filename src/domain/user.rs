//! User domain entity and related types.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{
    RESET_CODE_LENGTH, RESET_CODE_MAX_ATTEMPTS, RESET_CODE_TTL_MINUTES, ROLE_ADMIN, ROLE_CUSTOMER,
};

/// User roles enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Customer,
    Admin,
}

impl UserRole {
    /// Check if this role has admin privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => ROLE_ADMIN,
            UserRole::Customer => ROLE_CUSTOMER,
        }
    }
}

impl From<&str> for UserRole {
    fn from(s: &str) -> Self {
        if s.eq_ignore_ascii_case(ROLE_ADMIN) {
            UserRole::Admin
        } else {
            UserRole::Customer
        }
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        role.as_str().to_string()
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Postal address, used both on profiles and as the order shipping snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    #[schema(example = "12 Market Road")]
    pub street: String,
    #[serde(default)]
    #[schema(example = "Pune")]
    pub city: String,
    #[serde(default)]
    #[schema(example = "Maharashtra")]
    pub state: String,
    #[serde(default, alias = "zip", alias = "zip_code")]
    #[schema(example = "411001")]
    pub zip_code: String,
    #[serde(default)]
    #[schema(example = "India")]
    pub country: String,
}

/// Outstanding password-reset code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetChallenge {
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub attempts: i32,
}

/// Result of checking a submitted reset code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetVerdict {
    Accepted,
    Expired,
    AttemptsExhausted,
    Mismatch { remaining: i32 },
}

impl ResetChallenge {
    /// Issue a fresh six-digit code valid for ten minutes.
    pub fn issue(now: DateTime<Utc>) -> Self {
        let upper = 10u32.pow(RESET_CODE_LENGTH as u32);
        let code = rand::thread_rng().gen_range(upper / 10..upper);
        Self {
            code: code.to_string(),
            expires_at: now + Duration::minutes(RESET_CODE_TTL_MINUTES),
            attempts: 0,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Judge a submitted code. Expiry wins over the attempt ceiling,
    /// which wins over the comparison itself.
    pub fn judge(&self, submitted: &str, now: DateTime<Utc>) -> ResetVerdict {
        if self.is_expired(now) {
            return ResetVerdict::Expired;
        }
        if self.attempts >= RESET_CODE_MAX_ATTEMPTS {
            return ResetVerdict::AttemptsExhausted;
        }
        if self.code == submitted.trim() {
            ResetVerdict::Accepted
        } else {
            ResetVerdict::Mismatch {
                remaining: RESET_CODE_MAX_ATTEMPTS - self.attempts - 1,
            }
        }
    }

    /// Copy of this challenge with one more failed attempt recorded.
    pub fn with_failed_attempt(&self) -> Self {
        Self {
            attempts: self.attempts + 1,
            ..self.clone()
        }
    }
}

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub address: Option<Address>,
    #[serde(skip_serializing)]
    pub reset_challenge: Option<ResetChallenge>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new customer account
    pub fn new(
        name: String,
        email: Option<String>,
        phone: Option<String>,
        password_hash: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            phone,
            password_hash,
            role: UserRole::Customer,
            address: None,
            reset_challenge: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the role at creation time
    pub fn with_role(mut self, role: UserRole) -> Self {
        self.role = role;
        self
    }

    /// Check if user has admin role
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// New user registration data
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
    pub role: UserRole,
}

/// Profile fields a user may change
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ProfileChanges {
    /// New display name
    #[schema(example = "Asha Rao")]
    pub name: Option<String>,
    /// New phone number
    #[schema(example = "9876543210")]
    pub phone: Option<String>,
    /// New postal address
    pub address: Option<Address>,
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// Unique user identifier
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    /// Display name
    #[schema(example = "Asha Rao")]
    pub name: String,
    /// Email address
    #[schema(example = "asha@example.com")]
    pub email: Option<String>,
    /// Phone number
    #[schema(example = "9876543210")]
    pub phone: Option<String>,
    /// Role
    #[schema(example = "customer")]
    pub role: UserRole,
    pub address: Option<Address>,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            role: user.role,
            address: user.address,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing_defaults_to_customer() {
        assert_eq!(UserRole::from("admin"), UserRole::Admin);
        assert_eq!(UserRole::from("ADMIN"), UserRole::Admin);
        assert_eq!(UserRole::from("user"), UserRole::Customer);
        assert_eq!(UserRole::from("customer"), UserRole::Customer);
    }

    #[test]
    fn test_issued_code_shape() {
        let now = Utc::now();
        let challenge = ResetChallenge::issue(now);
        assert_eq!(challenge.code.len(), 6);
        assert!(challenge.code.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(challenge.attempts, 0);
        assert_eq!(challenge.expires_at, now + Duration::minutes(10));
    }

    #[test]
    fn test_judge_order_of_checks() {
        let now = Utc::now();
        let challenge = ResetChallenge {
            code: "123456".into(),
            expires_at: now + Duration::minutes(5),
            attempts: 0,
        };
        assert_eq!(challenge.judge("123456", now), ResetVerdict::Accepted);
        assert_eq!(
            challenge.judge("000000", now),
            ResetVerdict::Mismatch { remaining: 4 }
        );

        let exhausted = ResetChallenge {
            attempts: 5,
            ..challenge.clone()
        };
        assert_eq!(
            exhausted.judge("123456", now),
            ResetVerdict::AttemptsExhausted
        );

        let later = now + Duration::minutes(6);
        assert_eq!(exhausted.judge("123456", later), ResetVerdict::Expired);
    }

    #[test]
    fn test_failed_attempt_counts_down() {
        let now = Utc::now();
        let mut challenge = ResetChallenge::issue(now);
        for expected in (0..5).rev() {
            match challenge.judge("bad", now) {
                ResetVerdict::Mismatch { remaining } => assert_eq!(remaining, expected),
                other => panic!("unexpected verdict {other:?}"),
            }
            challenge = challenge.with_failed_attempt();
        }
        assert_eq!(challenge.judge("bad", now), ResetVerdict::AttemptsExhausted);
    }

    #[test]
    fn test_address_accepts_zip_aliases() {
        let a: Address = serde_json::from_str(r#"{"street":"s","zip":"1"}"#).unwrap();
        let b: Address = serde_json::from_str(r#"{"zipCode":"1"}"#).unwrap();
        assert_eq!(a.zip_code, "1");
        assert_eq!(b.zip_code, "1");
        assert_eq!(a.city, "");
    }
}

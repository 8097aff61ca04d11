use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Identity entity: one row per account that can log in.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub email: String,

    /// Password hash (excluded from serialization via serde skip)
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Canonical upper-case role name, see [`Role`].
    pub role: String,

    pub active: bool,

    pub password_reset: bool,

    pub created_by: Option<String>,

    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Closed set of roles an identity can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Supervisor,
    Worker,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Supervisor => "SUPERVISOR",
            Role::Worker => "WORKER",
        }
    }

    /// Title-case name for messages.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Supervisor => "Supervisor",
            Role::Worker => "Worker",
        }
    }

    /// Authority granted to a principal holding this role.
    pub fn authority(&self) -> String {
        authority_for(self.as_str())
    }
}

/// `"ROLE_" + role.uppercase()`, the authority string checked by route guards.
pub fn authority_for(role: &str) -> String {
    format!("ROLE_{}", role.to_uppercase())
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    /// Accepts any case and normalizes to the canonical form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "SUPERVISOR" => Ok(Role::Supervisor),
            "WORKER" => Ok(Role::Worker),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// Public identity data (safe to return in API responses).
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub role: String,
    pub active: bool,
    pub password_reset: bool,
    pub created_by: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<super::user_details::DetailsResponse>,
}

impl From<Model> for UserResponse {
    fn from(user: Model) -> Self {
        UserResponse {
            id: user.id,
            email: user.email,
            role: user.role,
            active: user.active,
            password_reset: user.password_reset,
            created_by: user.created_by,
            created_at: user.created_at,
            updated_at: user.updated_at,
            details: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_any_case() {
        assert_eq!("supervisor".parse::<Role>(), Ok(Role::Supervisor));
        assert_eq!(" Worker ".parse::<Role>(), Ok(Role::Worker));
        assert!("ADMIN".parse::<Role>().is_err());
    }

    #[test]
    fn authority_is_prefixed_and_uppercased() {
        assert_eq!(Role::Supervisor.authority(), "ROLE_SUPERVISOR");
        assert_eq!(authority_for("worker"), "ROLE_WORKER");
    }

    #[test]
    fn role_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Role::Worker).unwrap(), "\"WORKER\"");
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::TicketError;

/// The five account kinds of the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Company,
    Conductor,
    AccountsManager,
    Passenger,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::Company,
        Role::Conductor,
        Role::AccountsManager,
        Role::Passenger,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Company => "company",
            Role::Conductor => "conductor",
            Role::AccountsManager => "accounts_manager",
            Role::Passenger => "passenger",
        }
    }

    /// Roles a visitor may pick when creating an account.
    pub fn is_self_registrable(&self) -> bool {
        match self {
            Role::Passenger | Role::Company => true,
            Role::Admin | Role::Conductor | Role::AccountsManager => false,
        }
    }

    pub fn can_book(&self) -> bool {
        match self {
            Role::Passenger => true,
            Role::Admin | Role::Company | Role::Conductor | Role::AccountsManager => false,
        }
    }

    pub fn can_scan(&self) -> bool {
        match self {
            Role::Conductor | Role::Company | Role::Admin => true,
            Role::AccountsManager | Role::Passenger => false,
        }
    }

    pub fn can_manage_schedules(&self) -> bool {
        match self {
            Role::Company | Role::Admin => true,
            Role::Conductor | Role::AccountsManager | Role::Passenger => false,
        }
    }

    /// Whether the role may read bookings that belong to other users.
    pub fn sees_all_bookings(&self) -> bool {
        match self {
            Role::Admin => true,
            Role::Company | Role::Conductor | Role::AccountsManager | Role::Passenger => false,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = TicketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "company" => Ok(Role::Company),
            "conductor" => Ok(Role::Conductor),
            "accounts_manager" => Ok(Role::AccountsManager),
            "passenger" => Ok(Role::Passenger),
            other => Err(TicketError::Validation(format!("Unknown role: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

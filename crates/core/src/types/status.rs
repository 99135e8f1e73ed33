//! Role and status enums.

use serde::{Deserialize, Serialize};

/// Account role attached to every user.
///
/// Admin unlocks catalog management, media upload, order status changes and
/// the user-management routes. Everything else is a customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    #[default]
    Customer,
}

impl UserRole {
    /// Whether this role grants admin access.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Customer => write!(f, "customer"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "customer" => Ok(Self::Customer),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}

/// Order lifecycle status.
///
/// Deliberately not a guarded state machine: an admin may move an order from
/// any status to any other, including reopening a completed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    New,
    InProgress,
    Completed,
    Canceled,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::New => write!(f, "new"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Completed => write!(f, "completed"),
            Self::Canceled => write!(f, "canceled"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "canceled" => Ok(Self::Canceled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_display_matches_from_str() {
        for role in [UserRole::Admin, UserRole::Customer] {
            let round: UserRole = role.to_string().parse().expect("parse role");
            assert_eq!(round, role);
        }
        assert!("superuser".parse::<UserRole>().is_err());
    }

    #[test]
    fn role_serde_uses_snake_case() {
        assert_eq!(
            serde_json::to_string(&UserRole::Admin).expect("serialize"),
            "\"admin\""
        );
        let role: UserRole = serde_json::from_str("\"customer\"").expect("deserialize");
        assert_eq!(role, UserRole::Customer);
    }

    #[test]
    fn order_status_round_trips() {
        for status in [
            OrderStatus::New,
            OrderStatus::InProgress,
            OrderStatus::Completed,
            OrderStatus::Canceled,
        ] {
            let round: OrderStatus = status.to_string().parse().expect("parse status");
            assert_eq!(round, status);
        }
    }

    #[test]
    fn order_status_serde_matches_display() {
        let json = serde_json::to_string(&OrderStatus::InProgress).expect("serialize");
        assert_eq!(json, "\"in_progress\"");
    }
}

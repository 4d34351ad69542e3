//! Domain enums shared across entities, services and handlers.
//!
//! Roles and reservation states are persisted as strings; `strum` keeps the
//! round-trip in one place instead of scattering match arms.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// Staff identity classification for the dashboard.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    ToSchema,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Gerente,
    Garcom,
    Cozinha,
    User,
}

impl Role {
    /// ADMIN is implicitly granted every dashboard route.
    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }
}

/// Reservation lifecycle state.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    ToSchema,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn roles_round_trip_through_strings() {
        for role in [Role::Admin, Role::Gerente, Role::Garcom, Role::Cozinha, Role::User] {
            let s = role.to_string();
            assert_eq!(Role::from_str(&s).unwrap(), role);
        }
        assert_eq!(Role::from_str("GARCOM").unwrap(), Role::Garcom);
        assert!(Role::from_str("waiter").is_err());
    }

    #[test]
    fn reservation_status_defaults_parse() {
        assert_eq!(
            ReservationStatus::from_str("PENDING").unwrap(),
            ReservationStatus::Pending
        );
        assert_eq!(ReservationStatus::Cancelled.to_string(), "CANCELLED");
    }
}

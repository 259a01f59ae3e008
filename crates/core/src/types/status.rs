//! Status and role enums for the delivery domain.
//!
//! Wire names match the strings persisted in the record store exactly
//! (`in-transit`, not `in_transit`), since documents written by earlier
//! versions of the system must keep deserializing.

use serde::{Deserialize, Serialize};

/// Delivery lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryStatus {
    #[default]
    Pending,
    Assigned,
    InTransit,
    Delivered,
    Cancelled,
}

impl DeliveryStatus {
    /// All valid statuses, for the categories endpoint.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Assigned,
        Self::InTransit,
        Self::Delivered,
        Self::Cancelled,
    ];
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Assigned => write!(f, "assigned"),
            Self::InTransit => write!(f, "in-transit"),
            Self::Delivered => write!(f, "delivered"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for DeliveryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "assigned" => Ok(Self::Assigned),
            "in-transit" => Ok(Self::InTransit),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid delivery status: {s}")),
        }
    }
}

/// Deliverer availability status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DelivererStatus {
    #[default]
    Available,
    Busy,
    Offline,
}

impl DelivererStatus {
    /// All valid statuses, for the categories endpoint.
    pub const ALL: [Self; 3] = [Self::Available, Self::Busy, Self::Offline];
}

impl std::fmt::Display for DelivererStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Available => write!(f, "available"),
            Self::Busy => write!(f, "busy"),
            Self::Offline => write!(f, "offline"),
        }
    }
}

impl std::str::FromStr for DelivererStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "busy" => Ok(Self::Busy),
            "offline" => Ok(Self::Offline),
            _ => Err(format!("invalid deliverer status: {s}")),
        }
    }
}

/// Payment status of a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
}

impl PaymentStatus {
    /// All valid statuses, for the categories endpoint.
    pub const ALL: [Self; 3] = [Self::Pending, Self::Paid, Self::Failed];
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Paid => write!(f, "paid"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// User role carried as a custom claim by the identity service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access including client/deliverer management and deletion.
    Admin,
    /// Can create and update deliveries.
    Deliverer,
    /// Read-only dashboard access.
    Client,
}

impl Role {
    /// All valid roles, for the categories endpoint.
    pub const ALL: [Self; 3] = [Self::Admin, Self::Deliverer, Self::Client];
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Deliverer => write!(f, "deliverer"),
            Self::Client => write!(f, "client"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "deliverer" => Ok(Self::Deliverer),
            "client" => Ok(Self::Client),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_delivery_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&DeliveryStatus::InTransit).expect("serialize"),
            "\"in-transit\""
        );
        let parsed: DeliveryStatus =
            serde_json::from_str("\"in-transit\"").expect("deserialize");
        assert_eq!(parsed, DeliveryStatus::InTransit);
    }

    #[test]
    fn test_delivery_status_display_fromstr_roundtrip() {
        for status in DeliveryStatus::ALL {
            let parsed = DeliveryStatus::from_str(&status.to_string()).expect("roundtrip");
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_invalid_status_rejected() {
        assert!(DeliveryStatus::from_str("shipped").is_err());
        assert!(DelivererStatus::from_str("away").is_err());
        assert!(Role::from_str("superuser").is_err());
    }

    #[test]
    fn test_role_wire_names() {
        assert_eq!(
            serde_json::to_string(&Role::Deliverer).expect("serialize"),
            "\"deliverer\""
        );
    }
}

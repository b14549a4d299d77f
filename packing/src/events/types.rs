//! Event types for the packing station
//!
//! One event per successful state change, plus rejected item scans so a
//! scanner display can flash the failure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::RecommendationMode;

/// All packing station events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StationEvent {
    LoggedIn {
        username: String,
        session_id: String,
        timestamp: DateTime<Utc>,
    },

    LoggedOut {
        username: String,
        timestamp: DateTime<Utc>,
    },

    WorkstationRegistered {
        packer_id: Option<String>,
        workstation_id: Option<String>,
        timestamp: DateTime<Utc>,
    },

    /// A handling unit became the active unit of work
    HandlingUnitClaimed {
        hu: String,
        item_count: usize,
        timestamp: DateTime<Utc>,
    },

    ItemScanned {
        hu: String,
        order_item_id: String,
        timestamp: DateTime<Utc>,
    },

    /// Barcode did not match the item; the item is unchanged
    ItemScanRejected {
        hu: String,
        order_item_id: String,
        code: String,
        timestamp: DateTime<Utc>,
    },

    ImeiVerified {
        hu: String,
        order_item_id: String,
        slots: usize,
        timestamp: DateTime<Utc>,
    },

    BoxSelected {
        hu: String,
        box_id: String,
        timestamp: DateTime<Utc>,
    },

    BoxDeselected {
        hu: String,
        box_id: String,
        timestamp: DateTime<Utc>,
    },

    BoxScanned {
        hu: String,
        box_id: String,
        barcode: String,
        timestamp: DateTime<Utc>,
    },

    ModeToggled {
        hu: String,
        mode: RecommendationMode,
        timestamp: DateTime<Utc>,
    },

    ManualBoxAdded {
        hu: String,
        box_id: String,
        barcode: String,
        timestamp: DateTime<Utc>,
    },

    ItemReassigned {
        hu: String,
        order_item_id: String,
        box_id: String,
        timestamp: DateTime<Utc>,
    },

    PackageSubmitted {
        hu: String,
        package_id: String,
        item_count: usize,
        box_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// The active unit was discarded to start over
    OrderReset {
        hu: Option<String>,
        timestamp: DateTime<Utc>,
    },
}

impl StationEvent {
    /// Get the timestamp of this event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            StationEvent::LoggedIn { timestamp, .. }
            | StationEvent::LoggedOut { timestamp, .. }
            | StationEvent::WorkstationRegistered { timestamp, .. }
            | StationEvent::HandlingUnitClaimed { timestamp, .. }
            | StationEvent::ItemScanned { timestamp, .. }
            | StationEvent::ItemScanRejected { timestamp, .. }
            | StationEvent::ImeiVerified { timestamp, .. }
            | StationEvent::BoxSelected { timestamp, .. }
            | StationEvent::BoxDeselected { timestamp, .. }
            | StationEvent::BoxScanned { timestamp, .. }
            | StationEvent::ModeToggled { timestamp, .. }
            | StationEvent::ManualBoxAdded { timestamp, .. }
            | StationEvent::ItemReassigned { timestamp, .. }
            | StationEvent::PackageSubmitted { timestamp, .. }
            | StationEvent::OrderReset { timestamp, .. } => *timestamp,
        }
    }

    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            StationEvent::LoggedIn { .. } => "logged_in",
            StationEvent::LoggedOut { .. } => "logged_out",
            StationEvent::WorkstationRegistered { .. } => "workstation_registered",
            StationEvent::HandlingUnitClaimed { .. } => "handling_unit_claimed",
            StationEvent::ItemScanned { .. } => "item_scanned",
            StationEvent::ItemScanRejected { .. } => "item_scan_rejected",
            StationEvent::ImeiVerified { .. } => "imei_verified",
            StationEvent::BoxSelected { .. } => "box_selected",
            StationEvent::BoxDeselected { .. } => "box_deselected",
            StationEvent::BoxScanned { .. } => "box_scanned",
            StationEvent::ModeToggled { .. } => "mode_toggled",
            StationEvent::ManualBoxAdded { .. } => "manual_box_added",
            StationEvent::ItemReassigned { .. } => "item_reassigned",
            StationEvent::PackageSubmitted { .. } => "package_submitted",
            StationEvent::OrderReset { .. } => "order_reset",
        }
    }

    /// Get the handling unit code if this event is scoped to one
    pub fn hu(&self) -> Option<&str> {
        match self {
            StationEvent::HandlingUnitClaimed { hu, .. }
            | StationEvent::ItemScanned { hu, .. }
            | StationEvent::ItemScanRejected { hu, .. }
            | StationEvent::ImeiVerified { hu, .. }
            | StationEvent::BoxSelected { hu, .. }
            | StationEvent::BoxDeselected { hu, .. }
            | StationEvent::BoxScanned { hu, .. }
            | StationEvent::ModeToggled { hu, .. }
            | StationEvent::ManualBoxAdded { hu, .. }
            | StationEvent::ItemReassigned { hu, .. }
            | StationEvent::PackageSubmitted { hu, .. } => Some(hu),
            StationEvent::OrderReset { hu, .. } => hu.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = StationEvent::ModeToggled {
            hu: "HU-1".to_string(),
            mode: RecommendationMode::Manual,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "mode_toggled");
        assert_eq!(json["mode"], "manual");

        let back: StationEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back.event_type(), "mode_toggled");
    }

    #[test]
    fn test_hu_scope() {
        let scoped = StationEvent::BoxScanned {
            hu: "HU-1".to_string(),
            box_id: "BX-1".to_string(),
            barcode: "X".to_string(),
            timestamp: Utc::now(),
        };
        assert_eq!(scoped.hu(), Some("HU-1"));

        let unscoped = StationEvent::LoggedOut {
            username: "packer01".to_string(),
            timestamp: Utc::now(),
        };
        assert_eq!(unscoped.hu(), None);

        let reset = StationEvent::OrderReset {
            hu: None,
            timestamp: Utc::now(),
        };
        assert_eq!(reset.hu(), None);
    }
}

//! Core types for the packing station
//!
//! Handling units, order items and shipping boxes as they move through a
//! packing session. Field names serialize in camelCase so the catalog JSON
//! and the response payloads share one shape.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Public profile of an authenticated user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub display_name: String,
}

/// Packer known to the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Packer {
    pub packer_id: String,
    pub name: String,
    pub warehouse: String,
    pub shift: String,
}

/// Packing workstation known to the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Workstation {
    pub workstation_id: String,
    pub line: String,
}

// ============================================================================
// Order Items
// ============================================================================

/// Scan state of a single order item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    /// Not scanned yet
    #[default]
    Pending,
    /// Barcode matched the item's UPC or SKU
    Success,
    /// Flagged as failed outside the scan transition
    Failed,
}

impl std::fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Success => write!(f, "success"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Captured IMEI set for a serialized item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ImeiCapture {
    /// Number of IMEI slots on the device
    pub slots: u32,
    /// One value per slot, in slot order
    #[serde(default)]
    pub values: Vec<String>,
    /// Once true the capture is permanent
    #[serde(default)]
    pub verified: bool,
}

/// Physical attributes that drive packing instructions
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct ItemAttributes {
    pub electronic: bool,
    pub fragile: bool,
    pub heavy: bool,
}

/// A line of the sales order, owned by its handling unit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Unique within the handling unit
    pub order_item_id: String,
    pub sku: String,
    pub upc: String,
    pub sku_id: String,
    pub name: String,
    pub qty: u32,

    /// Serialized electronics need a verified IMEI set
    #[serde(default)]
    pub requires_imei: bool,

    #[serde(default)]
    pub imei_slots: u32,

    #[serde(default)]
    pub attributes: ItemAttributes,

    /// Packing SOP steps, in order
    #[serde(default)]
    pub sop: Vec<String>,

    #[serde(default)]
    pub special_handling: BTreeSet<String>,

    #[serde(default)]
    pub scan_status: ScanStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imei: Option<ImeiCapture>,
}

impl OrderItem {
    /// A scan matches on either the UPC or the SKU, case-sensitive
    pub fn matches_code(&self, code: &str) -> bool {
        code == self.upc || code == self.sku
    }

    pub fn is_scanned(&self) -> bool {
        self.scan_status == ScanStatus::Success
    }

    pub fn imei_verified(&self) -> bool {
        self.imei.as_ref().is_some_and(|imei| imei.verified)
    }

    /// Scanned, and IMEI-verified when the item requires it
    pub fn is_complete(&self) -> bool {
        self.is_scanned() && (!self.requires_imei || self.imei_verified())
    }
}

// ============================================================================
// Boxes and Recommendations
// ============================================================================

/// How boxes are being chosen for the handling unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationMode {
    /// System-suggested boxes from the catalog
    #[default]
    Auto,
    /// Packer scans and fills boxes by hand
    Manual,
}

impl RecommendationMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Auto => Self::Manual,
            Self::Manual => Self::Auto,
        }
    }
}

impl std::fmt::Display for RecommendationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

/// Selection state of a box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoxStatus {
    #[default]
    Unselected,
    Selected,
}

/// One step of a box's visual packing guide
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GuideStep {
    pub number: u32,
    pub instruction: String,
    pub image: String,
}

/// Illustrated packing guide attached to a box
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VisualGuide {
    pub title: String,
    #[serde(default)]
    pub steps: Vec<GuideStep>,
}

impl Default for VisualGuide {
    fn default() -> Self {
        Self {
            title: "Packing visual guide".to_string(),
            steps: Vec::new(),
        }
    }
}

/// A shipping box, either recommended by the catalog or scanned manually
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PackingBox {
    pub box_id: String,
    pub name: String,
    pub inner_dim: String,
    pub capacity_l: f64,
    pub location: String,

    #[serde(default)]
    pub status: BoxStatus,

    #[serde(default)]
    pub special_handling_tags: BTreeSet<String>,

    /// Order item ids packed into this box; no duplicates
    #[serde(default)]
    pub assigned_items: Vec<String>,

    #[serde(default)]
    pub scanned: bool,

    #[serde(default)]
    pub barcode: Option<String>,

    #[serde(default)]
    pub visual_guide: VisualGuide,
}

impl PackingBox {
    /// Box created by scanning a barcode in manual mode.
    ///
    /// Scanning and creation are one step, so the box starts selected and
    /// scanned with nothing assigned.
    pub fn manual(box_id: impl Into<String>, barcode: impl Into<String>) -> Self {
        let barcode = barcode.into();
        Self {
            box_id: box_id.into(),
            name: format!("Box ({})", barcode),
            inner_dim: "Custom".to_string(),
            capacity_l: 0.0,
            location: "Manual Scan".to_string(),
            status: BoxStatus::Selected,
            special_handling_tags: BTreeSet::new(),
            assigned_items: Vec::new(),
            scanned: true,
            barcode: Some(barcode),
            visual_guide: VisualGuide::default(),
        }
    }

    pub fn is_selected(&self) -> bool {
        self.status == BoxStatus::Selected
    }

    pub fn holds(&self, order_item_id: &str) -> bool {
        self.assigned_items.iter().any(|id| id == order_item_id)
    }
}

/// Box recommendation state for a handling unit.
///
/// The auto set and the manual work-in-progress set are kept apart so that
/// switching modes never discards either one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct BoxRecommendations {
    #[serde(default)]
    pub mode: RecommendationMode,

    /// Catalog-recommended boxes
    #[serde(default)]
    pub boxes: Vec<PackingBox>,

    /// Boxes added by the packer in manual mode
    #[serde(default)]
    pub manual_boxes: Vec<PackingBox>,
}

impl BoxRecommendations {
    /// Boxes visible in the current mode
    pub fn current(&self) -> &[PackingBox] {
        match self.mode {
            RecommendationMode::Auto => &self.boxes,
            RecommendationMode::Manual => &self.manual_boxes,
        }
    }

    pub fn current_mut(&mut self) -> &mut Vec<PackingBox> {
        match self.mode {
            RecommendationMode::Auto => &mut self.boxes,
            RecommendationMode::Manual => &mut self.manual_boxes,
        }
    }

    pub fn selected(&self) -> impl Iterator<Item = &PackingBox> {
        self.current().iter().filter(|b| b.is_selected())
    }

    pub fn find(&self, box_id: &str) -> Option<&PackingBox> {
        self.current().iter().find(|b| b.box_id == box_id)
    }

    pub fn find_mut(&mut self, box_id: &str) -> Option<&mut PackingBox> {
        self.current_mut().iter_mut().find(|b| b.box_id == box_id)
    }

    /// Whether any box in either set already uses this id
    pub fn contains_id(&self, box_id: &str) -> bool {
        self.boxes
            .iter()
            .chain(self.manual_boxes.iter())
            .any(|b| b.box_id == box_id)
    }
}

// ============================================================================
// Handling Unit
// ============================================================================

/// The unit of work: one shipment grouping picked together for packing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HandlingUnit {
    pub hu: String,
    pub sales_order: String,
    pub package_id: String,
    pub client_id: String,
    pub client_name: String,
    pub logistic: String,
    pub dest_city: String,
    pub picked_by: String,
    pub package_count: u32,
    pub total_qty: u32,
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub recommendations: BoxRecommendations,
}

impl HandlingUnit {
    pub fn item(&self, order_item_id: &str) -> Option<&OrderItem> {
        self.items.iter().find(|i| i.order_item_id == order_item_id)
    }

    pub fn item_mut(&mut self, order_item_id: &str) -> Option<&mut OrderItem> {
        self.items
            .iter_mut()
            .find(|i| i.order_item_id == order_item_id)
    }

    pub fn mode(&self) -> RecommendationMode {
        self.recommendations.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_item() -> OrderItem {
        OrderItem {
            order_item_id: "OI-1".to_string(),
            sku: "SKU-1".to_string(),
            upc: "0001".to_string(),
            sku_id: "MTA-1".to_string(),
            name: "Phone".to_string(),
            qty: 1,
            requires_imei: true,
            imei_slots: 1,
            attributes: ItemAttributes::default(),
            sop: Vec::new(),
            special_handling: BTreeSet::new(),
            scan_status: ScanStatus::Pending,
            imei: None,
        }
    }

    #[test]
    fn test_matches_code_is_case_sensitive() {
        let item = sample_item();
        assert!(item.matches_code("0001"));
        assert!(item.matches_code("SKU-1"));
        assert!(!item.matches_code("sku-1"));
        assert!(!item.matches_code(""));
    }

    #[test]
    fn test_item_completion_requires_imei() {
        let mut item = sample_item();
        assert!(!item.is_complete());

        item.scan_status = ScanStatus::Success;
        assert!(!item.is_complete());

        item.imei = Some(ImeiCapture {
            slots: 1,
            values: vec!["123456789012345".to_string()],
            verified: true,
        });
        assert!(item.is_complete());

        item.requires_imei = false;
        item.imei = None;
        assert!(item.is_complete());
    }

    #[test]
    fn test_manual_box_defaults() {
        let b = PackingBox::manual("BX-MANUAL-0001", "BOX001");
        assert_eq!(b.name, "Box (BOX001)");
        assert!(b.is_selected());
        assert!(b.scanned);
        assert_eq!(b.barcode.as_deref(), Some("BOX001"));
        assert!(b.assigned_items.is_empty());
        assert!(b.visual_guide.steps.is_empty());
    }

    #[test]
    fn test_recommendation_sets_follow_mode() {
        let mut recs = BoxRecommendations {
            mode: RecommendationMode::Auto,
            boxes: vec![PackingBox::manual("A", "a")],
            manual_boxes: Vec::new(),
        };
        assert_eq!(recs.current().len(), 1);

        recs.mode = recs.mode.toggled();
        assert!(recs.current().is_empty());
        assert!(recs.find("A").is_none());
        assert!(recs.contains_id("A"));

        recs.mode = recs.mode.toggled();
        assert!(recs.find("A").is_some());
    }

    #[test]
    fn test_enum_serialization() {
        assert_eq!(
            serde_json::to_string(&ScanStatus::Success).unwrap(),
            "\"success\""
        );
        assert_eq!(
            serde_json::to_string(&RecommendationMode::Manual).unwrap(),
            "\"manual\""
        );
        let status: BoxStatus = serde_json::from_str("\"selected\"").unwrap();
        assert_eq!(status, BoxStatus::Selected);
    }
}

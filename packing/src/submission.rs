//! Submission result builder
//!
//! Snapshot of a completed handling unit, handed to whatever consumes packed
//! shipments. Building never mutates the unit.

use crate::types::{HandlingUnit, OrderItem, PackingBox, RecommendationMode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable record of a submitted package
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionSummary {
    pub hu: String,
    pub sales_order: String,
    pub package_id: String,
    pub client_name: String,
    pub logistic: String,
    pub dest_city: String,
    pub item_count: usize,
    pub items: Vec<OrderItem>,
    /// Selected boxes of the mode in effect at submission
    pub boxes: Vec<PackingBox>,
    pub mode: RecommendationMode,
    pub submitted_at: DateTime<Utc>,
}

impl SubmissionSummary {
    pub fn build(hu: &HandlingUnit) -> Self {
        Self {
            hu: hu.hu.clone(),
            sales_order: hu.sales_order.clone(),
            package_id: hu.package_id.clone(),
            client_name: hu.client_name.clone(),
            logistic: hu.logistic.clone(),
            dest_city: hu.dest_city.clone(),
            item_count: hu.items.len(),
            items: hu.items.clone(),
            boxes: hu.recommendations.selected().cloned().collect(),
            mode: hu.mode(),
            submitted_at: Utc::now(),
        }
    }

    /// Serialize for a manifest hand-off
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl std::fmt::Display for SubmissionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Packing summary: {} ({})", self.hu, self.package_id)?;
        writeln!(f, "  Sales order: {}", self.sales_order)?;
        writeln!(f, "  Client:      {}", self.client_name)?;
        writeln!(f, "  Courier:     {} -> {}", self.logistic, self.dest_city)?;
        writeln!(
            f,
            "  Submitted:   {} ({} mode)",
            self.submitted_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.mode
        )?;

        writeln!(f, "  Boxes used ({}):", self.boxes.len())?;
        for b in &self.boxes {
            writeln!(
                f,
                "    {} {} [{}] barcode {}",
                b.box_id,
                b.name,
                b.inner_dim,
                b.barcode.as_deref().unwrap_or("-")
            )?;
        }

        writeln!(f, "  Items ({}):", self.item_count)?;
        for item in &self.items {
            write!(
                f,
                "    {:<8} {:<14} x{:<3} {}",
                item.order_item_id, item.sku, item.qty, item.name
            )?;
            if let Some(imei) = item.imei.as_ref().filter(|c| c.verified) {
                write!(f, "  IMEI {}", imei.values.join(" / "))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::types::BoxStatus;

    fn unit() -> HandlingUnit {
        Catalog::seeded()
            .unwrap()
            .find_handling_unit_template("HU-8822114455")
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_build_takes_selected_boxes_only() {
        let mut hu = unit();
        hu.recommendations.boxes[1].status = BoxStatus::Unselected;
        let before = hu.clone();

        let summary = SubmissionSummary::build(&hu);
        assert_eq!(hu, before);
        assert_eq!(summary.item_count, 3);
        assert_eq!(summary.boxes.len(), 1);
        assert_eq!(summary.boxes[0].box_id, "BX-003");
        assert_eq!(summary.client_name, "Tokopedia");
        assert_eq!(summary.mode, RecommendationMode::Auto);
    }

    #[test]
    fn test_display_and_json() {
        let summary = SubmissionSummary::build(&unit());
        let text = summary.to_string();
        assert!(text.contains("HU-8822114455"));
        assert!(text.contains("Boxes used (2)"));
        assert!(text.contains("LAPTOP-ASUS"));

        let json: serde_json::Value = serde_json::from_str(&summary.to_json().unwrap()).unwrap();
        assert_eq!(json["packageId"], "PKG-5589");
        assert_eq!(json["itemCount"], 3);
    }
}

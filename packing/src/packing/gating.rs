//! Submission gating
//!
//! A handling unit may be submitted only when every item is scanned and
//! IMEI-complete, at least one box is selected, every selected box is
//! scanned, and (in manual mode) every item sits in a selected box.

use crate::types::{HandlingUnit, OrderItem, RecommendationMode};
use serde::{Deserialize, Serialize};

/// One unmet submission requirement, with the offending ids
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubmitBlocker {
    ItemsPending { item_ids: Vec<String> },
    ImeiUnverified { item_ids: Vec<String> },
    NoBoxSelected,
    BoxesNotScanned { box_ids: Vec<String> },
    /// Manual mode only
    ItemsUnassigned { item_ids: Vec<String> },
}

impl std::fmt::Display for SubmitBlocker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ItemsPending { item_ids } => {
                write!(f, "scan all items ({} pending: {})", item_ids.len(), item_ids.join(", "))
            }
            Self::ImeiUnverified { item_ids } => {
                write!(f, "verify IMEI for {}", item_ids.join(", "))
            }
            Self::NoBoxSelected => write!(f, "select a box"),
            Self::BoxesNotScanned { box_ids } => write!(f, "scan box {}", box_ids.join(", ")),
            Self::ItemsUnassigned { item_ids } => {
                write!(f, "assign {} to a selected box", item_ids.join(", "))
            }
        }
    }
}

/// Every unmet requirement, in check order. Empty iff submission is allowed.
pub fn submit_blockers(hu: &HandlingUnit) -> Vec<SubmitBlocker> {
    let mut blockers = Vec::new();

    if !hu.items.iter().all(OrderItem::is_complete) {
        let pending: Vec<String> = hu
            .items
            .iter()
            .filter(|i| !i.is_scanned())
            .map(|i| i.order_item_id.clone())
            .collect();
        if !pending.is_empty() {
            blockers.push(SubmitBlocker::ItemsPending { item_ids: pending });
        }

        let unverified: Vec<String> = hu
            .items
            .iter()
            .filter(|i| i.requires_imei && !i.imei_verified())
            .map(|i| i.order_item_id.clone())
            .collect();
        if !unverified.is_empty() {
            blockers.push(SubmitBlocker::ImeiUnverified {
                item_ids: unverified,
            });
        }
    }

    let recs = &hu.recommendations;
    if recs.selected().next().is_none() {
        blockers.push(SubmitBlocker::NoBoxSelected);
    } else {
        let unscanned: Vec<String> = recs
            .selected()
            .filter(|b| !b.scanned)
            .map(|b| b.box_id.clone())
            .collect();
        if !unscanned.is_empty() {
            blockers.push(SubmitBlocker::BoxesNotScanned { box_ids: unscanned });
        }
    }

    if recs.mode == RecommendationMode::Manual {
        let unassigned: Vec<String> = hu
            .items
            .iter()
            .filter(|i| !recs.selected().any(|b| b.holds(&i.order_item_id)))
            .map(|i| i.order_item_id.clone())
            .collect();
        if !unassigned.is_empty() {
            blockers.push(SubmitBlocker::ItemsUnassigned {
                item_ids: unassigned,
            });
        }
    }

    blockers
}

pub fn is_submit_enabled(hu: &HandlingUnit) -> bool {
    submit_blockers(hu).is_empty()
}

/// Counters for the item list and box panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackingProgress {
    pub total_items: usize,
    pub scanned_items: usize,
    pub imei_required: usize,
    pub imei_verified: usize,
    pub selected_boxes: usize,
    pub scanned_boxes: usize,
    pub mode: RecommendationMode,
    pub submit_enabled: bool,
}

impl PackingProgress {
    pub fn of(hu: &HandlingUnit) -> Self {
        let recs = &hu.recommendations;
        Self {
            total_items: hu.items.len(),
            scanned_items: hu.items.iter().filter(|i| i.is_scanned()).count(),
            imei_required: hu.items.iter().filter(|i| i.requires_imei).count(),
            imei_verified: hu
                .items
                .iter()
                .filter(|i| i.requires_imei && i.imei_verified())
                .count(),
            selected_boxes: recs.selected().count(),
            scanned_boxes: recs.selected().filter(|b| b.scanned).count(),
            mode: recs.mode,
            submit_enabled: is_submit_enabled(hu),
        }
    }
}

impl std::fmt::Display for PackingProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} scanned, IMEI {}/{}, boxes {}/{} scanned ({} mode){}",
            self.scanned_items,
            self.total_items,
            self.imei_verified,
            self.imei_required,
            self.scanned_boxes,
            self.selected_boxes,
            self.mode,
            if self.submit_enabled {
                ", ready to submit"
            } else {
                ""
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::types::{ImeiCapture, ScanStatus};

    fn fresh() -> HandlingUnit {
        Catalog::seeded()
            .unwrap()
            .find_handling_unit_template("HU-9911223344")
            .cloned()
            .unwrap()
    }

    fn complete_items(hu: &mut HandlingUnit) {
        for item in &mut hu.items {
            item.scan_status = ScanStatus::Success;
            if item.requires_imei {
                item.imei = Some(ImeiCapture {
                    slots: item.imei_slots,
                    values: Vec::new(),
                    verified: true,
                });
            }
        }
    }

    #[test]
    fn test_fresh_unit_blockers() {
        let hu = fresh();
        let blockers = submit_blockers(&hu);
        assert_eq!(
            blockers,
            vec![
                SubmitBlocker::ItemsPending {
                    item_ids: vec!["OI-001".into(), "OI-002".into(), "OI-003".into()]
                },
                SubmitBlocker::ImeiUnverified {
                    item_ids: vec!["OI-001".into()]
                },
                SubmitBlocker::BoxesNotScanned {
                    box_ids: vec!["BX-002".into()]
                },
            ]
        );
        assert!(!is_submit_enabled(&hu));
    }

    #[test]
    fn test_enabled_once_complete() {
        let mut hu = fresh();
        complete_items(&mut hu);
        hu.recommendations.boxes[0].scanned = true;
        assert!(submit_blockers(&hu).is_empty());

        let progress = PackingProgress::of(&hu);
        assert_eq!(progress.scanned_items, 3);
        assert_eq!(progress.imei_verified, 1);
        assert!(progress.submit_enabled);
    }

    #[test]
    fn test_manual_mode_checks_coverage() {
        let mut hu = fresh();
        complete_items(&mut hu);
        hu.recommendations.mode = RecommendationMode::Manual;
        assert_eq!(
            submit_blockers(&hu),
            vec![
                SubmitBlocker::NoBoxSelected,
                SubmitBlocker::ItemsUnassigned {
                    item_ids: vec!["OI-001".into(), "OI-002".into(), "OI-003".into()]
                },
            ]
        );
    }

    #[test]
    fn test_blocker_display() {
        assert_eq!(SubmitBlocker::NoBoxSelected.to_string(), "select a box");
        let b = SubmitBlocker::ItemsPending {
            item_ids: vec!["OI-1".into()],
        };
        assert!(b.to_string().starts_with("scan all items"));
    }
}

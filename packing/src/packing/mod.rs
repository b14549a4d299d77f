//! Packing-session state machine
//!
//! Owns the active handling unit and applies every packing transition to it.
//!
//! ```text
//!  NoHu ──claim──▶ InProgress ◀──▶ Submittable ──submit──▶ Submitted
//!   ▲                                                         │
//!   └──────────────────────── start_new_order ◀──────────────┘
//! ```
//!
//! `Submittable` is derived: an in-progress unit becomes submittable as soon
//! as [`submit_blockers`] comes back empty. Once submitted the unit stays
//! readable, but every mutation fails with `AlreadySubmitted`.

mod boxes;
pub mod gating;
pub mod imei;

pub use gating::{is_submit_enabled, submit_blockers, PackingProgress, SubmitBlocker};
pub use imei::ImeiRule;

use crate::catalog::Catalog;
use crate::error::{BoxError, ClaimError, ImeiError, ScanError, SubmitError};
use crate::submission::SubmissionSummary;
use crate::types::{HandlingUnit, ImeiCapture, OrderItem, RecommendationMode, ScanStatus};
use serde::{Deserialize, Serialize};

/// Where the packing session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackingPhase {
    NoHu,
    InProgress,
    Submittable,
    Submitted,
}

impl std::fmt::Display for PackingPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoHu => write!(f, "no_hu"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Submittable => write!(f, "submittable"),
            Self::Submitted => write!(f, "submitted"),
        }
    }
}

/// Why a mutation found no unit to work on
#[derive(Debug, Clone, Copy)]
enum Inactive {
    NoHu,
    Submitted,
}

impl From<Inactive> for ScanError {
    fn from(i: Inactive) -> Self {
        match i {
            Inactive::NoHu => Self::NoActiveHu,
            Inactive::Submitted => Self::AlreadySubmitted,
        }
    }
}

impl From<Inactive> for ImeiError {
    fn from(i: Inactive) -> Self {
        match i {
            Inactive::NoHu => Self::NoActiveHu,
            Inactive::Submitted => Self::AlreadySubmitted,
        }
    }
}

impl From<Inactive> for BoxError {
    fn from(i: Inactive) -> Self {
        match i {
            Inactive::NoHu => Self::NoActiveHu,
            Inactive::Submitted => Self::AlreadySubmitted,
        }
    }
}

impl From<Inactive> for SubmitError {
    fn from(i: Inactive) -> Self {
        match i {
            Inactive::NoHu => Self::NoActiveHu,
            Inactive::Submitted => Self::AlreadySubmitted,
        }
    }
}

/// State machine over the active handling unit
#[derive(Debug)]
pub struct PackingSession {
    active: Option<HandlingUnit>,
    submitted: Option<SubmissionSummary>,
    /// Never reset, so manual box ids stay unique for the station's lifetime
    manual_box_seq: u32,
    manual_box_prefix: String,
    imei_rule: ImeiRule,
}

impl Default for PackingSession {
    fn default() -> Self {
        Self::new("BX-MANUAL", ImeiRule::default())
    }
}

impl PackingSession {
    pub fn new(manual_box_prefix: impl Into<String>, imei_rule: ImeiRule) -> Self {
        Self {
            active: None,
            submitted: None,
            manual_box_seq: 0,
            manual_box_prefix: manual_box_prefix.into(),
            imei_rule,
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn phase(&self) -> PackingPhase {
        match (&self.active, &self.submitted) {
            (None, _) => PackingPhase::NoHu,
            (Some(_), Some(_)) => PackingPhase::Submitted,
            (Some(hu), None) if is_submit_enabled(hu) => PackingPhase::Submittable,
            (Some(_), None) => PackingPhase::InProgress,
        }
    }

    /// The active unit, including a submitted one
    pub fn handling_unit(&self) -> Option<&HandlingUnit> {
        self.active.as_ref()
    }

    pub fn hu_code(&self) -> Option<&str> {
        self.active.as_ref().map(|hu| hu.hu.as_str())
    }

    /// Summary of the last submission, until a new order starts
    pub fn submission(&self) -> Option<&SubmissionSummary> {
        self.submitted.as_ref()
    }

    /// False when there is no unit or it is already submitted
    pub fn is_submit_enabled(&self) -> bool {
        self.phase() == PackingPhase::Submittable
    }

    pub fn submit_blockers(&self) -> Vec<SubmitBlocker> {
        self.active.as_ref().map(submit_blockers).unwrap_or_default()
    }

    pub fn progress(&self) -> Option<PackingProgress> {
        self.active.as_ref().map(PackingProgress::of)
    }

    fn active_mut(&mut self) -> Result<&mut HandlingUnit, Inactive> {
        if self.submitted.is_some() {
            return Err(Inactive::Submitted);
        }
        self.active.as_mut().ok_or(Inactive::NoHu)
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Make an independent copy of the catalog template the active unit.
    ///
    /// Replaces any unit already in progress. The template is never touched,
    /// so claiming the same code twice yields two unrelated copies.
    pub fn claim_handling_unit(
        &mut self,
        catalog: &Catalog,
        code: &str,
    ) -> Result<&HandlingUnit, ClaimError> {
        let template = catalog
            .find_handling_unit_template(code)
            .ok_or_else(|| ClaimError::NotFound {
                code: code.to_string(),
            })?;

        let mut hu = template.clone();
        hu.recommendations.mode = RecommendationMode::Auto;
        hu.recommendations.manual_boxes.clear();

        self.submitted = None;
        Ok(&*self.active.insert(hu))
    }

    /// Mark an item scanned when the code equals its UPC or SKU.
    ///
    /// A mismatch leaves the item as it was.
    pub fn scan_item(&mut self, order_item_id: &str, code: &str) -> Result<&OrderItem, ScanError> {
        let hu = self.active_mut()?;
        let item = hu
            .item_mut(order_item_id)
            .ok_or_else(|| ScanError::ItemNotFound {
                order_item_id: order_item_id.to_string(),
            })?;

        if !item.matches_code(code) {
            return Err(ScanError::Mismatch {
                order_item_id: order_item_id.to_string(),
                code: code.to_string(),
            });
        }

        item.scan_status = ScanStatus::Success;
        Ok(&*item)
    }

    /// Capture and lock the IMEI set of a serialized item
    pub fn verify_imei(
        &mut self,
        order_item_id: &str,
        values: Vec<String>,
    ) -> Result<&ImeiCapture, ImeiError> {
        let rule = self.imei_rule;
        let hu = self.active_mut()?;
        let item = hu
            .item_mut(order_item_id)
            .ok_or_else(|| ImeiError::ItemNotFound {
                order_item_id: order_item_id.to_string(),
            })?;

        if !item.requires_imei {
            return Err(ImeiError::NotRequired {
                order_item_id: order_item_id.to_string(),
            });
        }
        if item.imei_verified() {
            return Err(ImeiError::AlreadyVerified {
                order_item_id: order_item_id.to_string(),
            });
        }

        rule.validate(item.imei_slots as usize, &values)?;

        let slots = item.imei_slots;
        Ok(&*item.imei.insert(ImeiCapture {
            slots,
            values,
            verified: true,
        }))
    }

    /// Flip between auto and manual box recommendation.
    ///
    /// Each mode keeps its own box set, so toggling back restores exactly
    /// what was there before.
    pub fn toggle_manual_mode(&mut self) -> Result<RecommendationMode, BoxError> {
        let hu = self.active_mut()?;
        let mode = hu.recommendations.mode.toggled();
        hu.recommendations.mode = mode;
        Ok(mode)
    }

    /// Record the submission and freeze the unit
    pub fn submit_package(&mut self) -> Result<&SubmissionSummary, SubmitError> {
        let hu = self.active_mut()?;

        let blockers = submit_blockers(hu);
        if !blockers.is_empty() {
            return Err(SubmitError::NotReady { blockers });
        }

        let summary = SubmissionSummary::build(hu);
        Ok(&*self.submitted.insert(summary))
    }

    /// Discard the active unit, submitted or not. Returns its code.
    pub fn start_new_order(&mut self) -> Option<String> {
        self.submitted = None;
        self.active.take().map(|hu| hu.hu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HU: &str = "HU-9911223344";

    fn claimed() -> (Catalog, PackingSession) {
        let catalog = Catalog::seeded().unwrap();
        let mut session = PackingSession::default();
        session.claim_handling_unit(&catalog, HU).unwrap();
        (catalog, session)
    }

    fn imeis() -> Vec<String> {
        vec!["352099001761481".to_string(), "352099001761499".to_string()]
    }

    #[test]
    fn test_operations_need_a_unit() {
        let mut session = PackingSession::default();
        assert_eq!(session.phase(), PackingPhase::NoHu);
        assert_eq!(
            session.scan_item("OI-001", "x").unwrap_err(),
            ScanError::NoActiveHu
        );
        assert_eq!(
            session.verify_imei("OI-001", imeis()).unwrap_err(),
            ImeiError::NoActiveHu
        );
        assert_eq!(session.toggle_manual_mode(), Err(BoxError::NoActiveHu));
        assert_eq!(session.submit_package().unwrap_err(), SubmitError::NoActiveHu);
        assert!(!session.is_submit_enabled());
        assert!(session.submit_blockers().is_empty());
    }

    #[test]
    fn test_claim_unknown_code() {
        let catalog = Catalog::seeded().unwrap();
        let mut session = PackingSession::default();
        assert_eq!(
            session.claim_handling_unit(&catalog, "HU-0000").unwrap_err(),
            ClaimError::NotFound {
                code: "HU-0000".to_string()
            }
        );
        assert!(session.claim_handling_unit(&catalog, "").is_err());
        assert_eq!(session.phase(), PackingPhase::NoHu);
    }

    #[test]
    fn test_claim_requires_exact_code() {
        let catalog = Catalog::seeded().unwrap();
        let mut session = PackingSession::default();
        for code in [" HU-9911223344 ", "HU-9911223344\n", "hu-9911223344"] {
            assert_eq!(
                session.claim_handling_unit(&catalog, code).unwrap_err(),
                ClaimError::NotFound {
                    code: code.to_string()
                }
            );
        }
        assert_eq!(session.phase(), PackingPhase::NoHu);
    }

    #[test]
    fn test_scan_item_by_upc_or_sku() {
        let (_, mut session) = claimed();
        let item = session.scan_item("OI-001", "699329630118").unwrap();
        assert_eq!(item.scan_status, ScanStatus::Success);

        let item = session.scan_item("OI-002", "ACC-CASE-01").unwrap();
        assert!(item.is_scanned());

        // re-scan is a no-op success
        assert!(session.scan_item("OI-002", "699329630119").is_ok());
    }

    #[test]
    fn test_scan_mismatch_leaves_item() {
        let (_, mut session) = claimed();
        let err = session.scan_item("OI-001", "ACC-CASE-01").unwrap_err();
        assert!(matches!(err, ScanError::Mismatch { .. }));
        let item = session.handling_unit().unwrap().item("OI-001").unwrap();
        assert_eq!(item.scan_status, ScanStatus::Pending);

        assert!(matches!(
            session.scan_item("OI-404", "x"),
            Err(ScanError::ItemNotFound { .. })
        ));
    }

    #[test]
    fn test_verify_imei() {
        let (_, mut session) = claimed();
        assert!(matches!(
            session.verify_imei("OI-002", imeis()),
            Err(ImeiError::NotRequired { .. })
        ));

        let capture = session.verify_imei("OI-001", imeis()).unwrap();
        assert!(capture.verified);
        assert_eq!(capture.slots, 2);
        assert_eq!(capture.values, imeis());

        assert!(matches!(
            session.verify_imei("OI-001", imeis()),
            Err(ImeiError::AlreadyVerified { .. })
        ));
    }

    #[test]
    fn test_rejected_imei_changes_nothing() {
        let (_, mut session) = claimed();
        let err = session
            .verify_imei("OI-001", vec!["1234567890123".into(), "352099001761499".into()])
            .unwrap_err();
        assert!(matches!(err, ImeiError::InvalidFormat { .. }));

        let item = session.handling_unit().unwrap().item("OI-001").unwrap();
        assert!(!item.imei_verified());
        assert!(item.imei.as_ref().unwrap().values.is_empty());
    }

    #[test]
    fn test_toggle_is_reversible() {
        let (_, mut session) = claimed();
        assert_eq!(session.toggle_manual_mode(), Ok(RecommendationMode::Manual));
        assert!(session
            .handling_unit()
            .unwrap()
            .recommendations
            .current()
            .is_empty());

        assert_eq!(session.toggle_manual_mode(), Ok(RecommendationMode::Auto));
        let recs = &session.handling_unit().unwrap().recommendations;
        assert_eq!(recs.current().len(), 1);
        assert_eq!(recs.current()[0].box_id, "BX-002");
    }

    #[test]
    fn test_phase_progression() {
        let (_, mut session) = claimed();
        assert_eq!(session.phase(), PackingPhase::InProgress);

        session.scan_item("OI-001", "699329630118").unwrap();
        session.scan_item("OI-002", "699329630119").unwrap();
        session.scan_item("OI-003", "699329630120").unwrap();
        session.verify_imei("OI-001", imeis()).unwrap();
        session.scan_box("BX-002", "BOX-LABEL-1").unwrap();
        assert_eq!(session.phase(), PackingPhase::Submittable);

        let summary = session.submit_package().unwrap();
        assert_eq!(summary.item_count, 3);
        assert_eq!(session.phase(), PackingPhase::Submitted);
        assert!(!session.is_submit_enabled());

        assert_eq!(
            session.submit_package().unwrap_err(),
            SubmitError::AlreadySubmitted
        );
        assert_eq!(
            session.scan_item("OI-001", "699329630118").unwrap_err(),
            ScanError::AlreadySubmitted
        );
        assert_eq!(session.hu_code(), Some(HU));

        assert_eq!(session.start_new_order().as_deref(), Some(HU));
        assert_eq!(session.phase(), PackingPhase::NoHu);
        assert!(session.submission().is_none());
        assert!(session.start_new_order().is_none());
    }

    #[test]
    fn test_submit_not_ready_lists_blockers() {
        let (_, mut session) = claimed();
        match session.submit_package().unwrap_err() {
            SubmitError::NotReady { blockers } => {
                assert!(blockers
                    .iter()
                    .any(|b| matches!(b, SubmitBlocker::ItemsPending { .. })));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_reclaim_replaces_and_resets() {
        let (catalog, mut session) = claimed();
        session.scan_item("OI-001", "699329630118").unwrap();
        session.toggle_manual_mode().unwrap();

        let hu = session.claim_handling_unit(&catalog, HU).unwrap();
        assert_eq!(hu.mode(), RecommendationMode::Auto);
        assert!(!hu.item("OI-001").unwrap().is_scanned());

        let template = catalog.find_handling_unit_template(HU).unwrap();
        assert!(!template.item("OI-001").unwrap().is_scanned());
    }
}

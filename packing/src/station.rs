//! Station controller
//!
//! Single owner of the catalog, the login session, the packing session and
//! the event bus. Every operation logs, publishes an event on success and
//! returns a typed result; [`Station::respond`] folds any of those results
//! into the success/failure shape shown to the packer.

use crate::catalog::Catalog;
use crate::config::StationConfig;
use crate::error::{
    AuthError, BoxError, ClaimError, ImeiError, RegistrationError, ScanError, StationError,
    StationResult, SubmitError,
};
use crate::events::{EventBus, SharedEventBus, StationEvent};
use crate::packing::{ImeiRule, PackingPhase, PackingProgress, PackingSession, SubmitBlocker};
use crate::session::{SessionInfo, SessionManager};
use crate::submission::SubmissionSummary;
use crate::types::{HandlingUnit, ImeiCapture, OrderItem, PackingBox, RecommendationMode, User};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

// ============================================================================
// Response Types
// ============================================================================

/// Discriminated success/failure result for the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OperationResponse {
    pub success: bool,
    pub message: String,

    /// Stable error code, failures only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recovery_action: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub retryable: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl OperationResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            code: None,
            recovery_action: None,
            retryable: false,
            data: None,
        }
    }

    pub fn with_data(mut self, data: impl Serialize) -> Self {
        self.data = serde_json::to_value(data).ok();
        self
    }

    pub fn failure(err: &StationError) -> Self {
        let structured = err.to_structured();
        let data = if structured.context.is_empty() {
            None
        } else {
            serde_json::to_value(&structured.context).ok()
        };
        Self {
            success: false,
            message: structured.message,
            code: Some(structured.code),
            recovery_action: Some(structured.recovery_action),
            retryable: structured.retryable,
            data,
        }
    }

    /// Failure that never reached the station, such as an unparseable command
    pub fn rejected(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            code: Some(code.into()),
            recovery_action: None,
            retryable: true,
            data: None,
        }
    }
}

/// Snapshot of the whole station for a status display
#[derive(Debug, Clone, Serialize)]
pub struct StationStatus {
    pub user: Option<User>,
    pub session: Option<SessionInfo>,
    pub can_pack: bool,
    pub phase: PackingPhase,
    pub hu: Option<String>,
    pub progress: Option<PackingProgress>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blockers: Vec<SubmitBlocker>,
}

impl std::fmt::Display for StationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.user {
            Some(user) => write!(f, "{} logged in", user.display_name)?,
            None => write!(f, "logged out")?,
        }
        if let Some(session) = &self.session {
            write!(f, "; {}", session)?;
        }
        write!(f, "; phase {}", self.phase)?;
        if let (Some(hu), Some(progress)) = (&self.hu, &self.progress) {
            write!(f, "; {}: {}", hu, progress)?;
        }
        Ok(())
    }
}

// ============================================================================
// Station
// ============================================================================

pub struct Station {
    config: StationConfig,
    catalog: Catalog,
    sessions: SessionManager,
    packing: PackingSession,
    events: SharedEventBus,
}

impl Station {
    pub fn new(config: StationConfig, catalog: Catalog) -> Self {
        let packing = PackingSession::new(
            config.manual_box_prefix.clone(),
            ImeiRule::new(config.imei_min_len, config.imei_max_len),
        );
        let events = EventBus::with_capacity(config.event_capacity).shared();
        Self {
            config,
            catalog,
            sessions: SessionManager::new(),
            packing,
            events,
        }
    }

    /// Validate the config and load the catalog it points at (or the seed)
    pub fn from_config(config: StationConfig) -> StationResult<Self> {
        config.validate()?;
        let catalog = match &config.catalog_path {
            Some(path) => Catalog::load(path)?,
            None => Catalog::seeded()?,
        };
        for issue in catalog.validate() {
            warn!(issue = %issue, "Catalog integrity issue");
        }
        Ok(Self::new(config, catalog))
    }

    pub fn config(&self) -> &StationConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn packing(&self) -> &PackingSession {
        &self.packing
    }

    pub fn events(&self) -> SharedEventBus {
        self.events.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StationEvent> {
        self.events.subscribe()
    }

    fn current_hu(&self) -> String {
        self.packing.hu_code().unwrap_or_default().to_string()
    }

    /// Fold an operation result into a presentation response
    pub fn respond<T, E>(result: Result<T, E>, message: impl Into<String>) -> OperationResponse
    where
        T: Serialize,
        E: Into<StationError>,
    {
        match result {
            Ok(value) => OperationResponse::ok(message).with_data(value),
            Err(err) => OperationResponse::failure(&err.into()),
        }
    }

    // ========================================================================
    // Session
    // ========================================================================

    /// Log in. Any handling unit left from an earlier login is discarded.
    pub fn login(&mut self, username: &str, password: &str) -> Result<User, AuthError> {
        let user = match self.sessions.login(&self.catalog, username, password) {
            Ok(user) => user,
            Err(e) => {
                warn!(username = %username, error = %e, "Login rejected");
                return Err(e);
            }
        };

        self.packing.start_new_order();
        let session_id = self
            .sessions
            .info()
            .map(|i| i.session_id.clone())
            .unwrap_or_default();
        info!(username = %user.username, session_id = %session_id, "Logged in");
        self.events.publish(StationEvent::LoggedIn {
            username: user.username.clone(),
            session_id,
            timestamp: Utc::now(),
        });
        Ok(user)
    }

    /// Clear the user, the registration and the active handling unit
    pub fn logout(&mut self) -> Option<User> {
        if let Some(hu) = self.packing.start_new_order() {
            self.events.publish(StationEvent::OrderReset {
                hu: Some(hu),
                timestamp: Utc::now(),
            });
        }
        let user = self.sessions.logout()?;
        info!(username = %user.username, "Logged out");
        self.events.publish(StationEvent::LoggedOut {
            username: user.username.clone(),
            timestamp: Utc::now(),
        });
        Some(user)
    }

    pub fn register_workstation(
        &mut self,
        packer_id: Option<&str>,
        workstation_id: Option<&str>,
    ) -> Result<SessionInfo, RegistrationError> {
        let info = self
            .sessions
            .register_workstation(&self.catalog, packer_id, workstation_id)?;
        info!(
            packer = ?info.packer_id,
            workstation = ?info.workstation_id,
            warehouse = ?info.warehouse,
            "Workstation registered"
        );
        self.events.publish(StationEvent::WorkstationRegistered {
            packer_id: info.packer_id.clone(),
            workstation_id: info.workstation_id.clone(),
            timestamp: Utc::now(),
        });
        Ok(info)
    }

    // ========================================================================
    // Packing
    // ========================================================================

    pub fn claim_handling_unit(&mut self, code: &str) -> Result<HandlingUnit, ClaimError> {
        if !self.sessions.can_pack(self.config.require_registration) {
            return Err(ClaimError::SessionNotReady);
        }
        let hu = self
            .packing
            .claim_handling_unit(&self.catalog, code)?
            .clone();
        info!(hu = %hu.hu, items = hu.items.len(), "Handling unit claimed");
        self.events.publish(StationEvent::HandlingUnitClaimed {
            hu: hu.hu.clone(),
            item_count: hu.items.len(),
            timestamp: Utc::now(),
        });
        Ok(hu)
    }

    pub fn scan_item(&mut self, order_item_id: &str, code: &str) -> Result<OrderItem, ScanError> {
        match self.packing.scan_item(order_item_id, code) {
            Ok(item) => {
                let item = item.clone();
                debug!(item = %order_item_id, "Item scanned");
                self.events.publish(StationEvent::ItemScanned {
                    hu: self.current_hu(),
                    order_item_id: item.order_item_id.clone(),
                    timestamp: Utc::now(),
                });
                Ok(item)
            }
            Err(e) => {
                warn!(item = %order_item_id, error = %e, "Item scan rejected");
                if matches!(e, ScanError::Mismatch { .. }) {
                    self.events.publish(StationEvent::ItemScanRejected {
                        hu: self.current_hu(),
                        order_item_id: order_item_id.to_string(),
                        code: code.to_string(),
                        timestamp: Utc::now(),
                    });
                }
                Err(e)
            }
        }
    }

    pub fn verify_imei(
        &mut self,
        order_item_id: &str,
        values: Vec<String>,
    ) -> Result<ImeiCapture, ImeiError> {
        let capture = self
            .packing
            .verify_imei(order_item_id, values)
            .map_err(|e| {
                warn!(item = %order_item_id, error = %e, "IMEI rejected");
                e
            })?
            .clone();
        debug!(item = %order_item_id, slots = capture.values.len(), "IMEI verified");
        self.events.publish(StationEvent::ImeiVerified {
            hu: self.current_hu(),
            order_item_id: order_item_id.to_string(),
            slots: capture.values.len(),
            timestamp: Utc::now(),
        });
        Ok(capture)
    }

    pub fn toggle_manual_mode(&mut self) -> Result<RecommendationMode, BoxError> {
        let mode = self.packing.toggle_manual_mode()?;
        debug!(mode = %mode, "Recommendation mode toggled");
        self.events.publish(StationEvent::ModeToggled {
            hu: self.current_hu(),
            mode,
            timestamp: Utc::now(),
        });
        Ok(mode)
    }

    pub fn select_box(&mut self, box_id: &str) -> Result<PackingBox, BoxError> {
        let b = self.packing.select_box(box_id)?.clone();
        self.events.publish(StationEvent::BoxSelected {
            hu: self.current_hu(),
            box_id: b.box_id.clone(),
            timestamp: Utc::now(),
        });
        Ok(b)
    }

    pub fn deselect_box(&mut self, box_id: &str) -> Result<PackingBox, BoxError> {
        let b = self.packing.deselect_box(box_id)?.clone();
        self.events.publish(StationEvent::BoxDeselected {
            hu: self.current_hu(),
            box_id: b.box_id.clone(),
            timestamp: Utc::now(),
        });
        Ok(b)
    }

    pub fn scan_box(&mut self, box_id: &str, barcode: &str) -> Result<PackingBox, BoxError> {
        let b = self.packing.scan_box(box_id, barcode)?.clone();
        debug!(box_id = %b.box_id, barcode = %barcode, "Box scanned");
        self.events.publish(StationEvent::BoxScanned {
            hu: self.current_hu(),
            box_id: b.box_id.clone(),
            barcode: barcode.to_string(),
            timestamp: Utc::now(),
        });
        Ok(b)
    }

    pub fn add_manual_box(&mut self, barcode: &str) -> Result<PackingBox, BoxError> {
        let b = self.packing.add_manual_box(barcode)?.clone();
        info!(box_id = %b.box_id, barcode = %barcode, "Manual box added");
        self.events.publish(StationEvent::ManualBoxAdded {
            hu: self.current_hu(),
            box_id: b.box_id.clone(),
            barcode: barcode.to_string(),
            timestamp: Utc::now(),
        });
        Ok(b)
    }

    pub fn reassign_item_to_box(
        &mut self,
        order_item_id: &str,
        box_id: &str,
    ) -> Result<PackingBox, BoxError> {
        let b = self
            .packing
            .reassign_item_to_box(order_item_id, box_id)?
            .clone();
        debug!(item = %order_item_id, box_id = %box_id, "Item reassigned");
        self.events.publish(StationEvent::ItemReassigned {
            hu: self.current_hu(),
            order_item_id: order_item_id.to_string(),
            box_id: box_id.to_string(),
            timestamp: Utc::now(),
        });
        Ok(b)
    }

    pub fn is_submit_enabled(&self) -> bool {
        self.packing.is_submit_enabled()
    }

    pub fn submit_blockers(&self) -> Vec<SubmitBlocker> {
        self.packing.submit_blockers()
    }

    pub fn progress(&self) -> Option<PackingProgress> {
        self.packing.progress()
    }

    pub fn status(&self) -> StationStatus {
        StationStatus {
            user: self.sessions.user().cloned(),
            session: self.sessions.info().cloned(),
            can_pack: self.sessions.can_pack(self.config.require_registration),
            phase: self.packing.phase(),
            hu: self.packing.hu_code().map(String::from),
            progress: self.packing.progress(),
            blockers: self.packing.submit_blockers(),
        }
    }

    pub fn submit_package(&mut self) -> Result<SubmissionSummary, SubmitError> {
        let summary = match self.packing.submit_package() {
            Ok(summary) => summary.clone(),
            Err(e) => {
                warn!(hu = %self.current_hu(), error = %e, "Submission refused");
                return Err(e);
            }
        };
        info!(
            hu = %summary.hu,
            package = %summary.package_id,
            items = summary.item_count,
            boxes = summary.boxes.len(),
            "Package submitted"
        );
        self.events.publish(StationEvent::PackageSubmitted {
            hu: summary.hu.clone(),
            package_id: summary.package_id.clone(),
            item_count: summary.item_count,
            box_count: summary.boxes.len(),
            timestamp: Utc::now(),
        });
        Ok(summary)
    }

    /// Discard the active handling unit and return to the scan prompt
    pub fn start_new_order(&mut self) -> Option<String> {
        let hu = self.packing.start_new_order();
        info!(hu = ?hu, "Starting new order");
        self.events.publish(StationEvent::OrderReset {
            hu: hu.clone(),
            timestamp: Utc::now(),
        });
        hu
    }
}

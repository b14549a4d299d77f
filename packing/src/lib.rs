//! Packing station library
//!
//! Quality-control and packing workflow for a warehouse packing line:
//! - Catalog lookups for users, packers, workstations and handling units
//! - Login and workstation registration
//! - The packing-session state machine (item scans, IMEI capture, box
//!   selection and assignment, submission gating)
//! - Submission summaries and state-change events
//!
//! # Usage
//!
//! ```no_run
//! use packing::{Station, StationConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut station = Station::from_config(StationConfig::from_env())?;
//! station.login("packer01", "demo123")?;
//! station.register_workstation(Some("PKR-0821"), Some("WS-07"))?;
//! station.claim_handling_unit("HU-9911223344")?;
//! station.scan_item("OI-002", "699329630119")?;
//! println!("{}", station.status());
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod packing;
pub mod session;
pub mod station;
pub mod submission;
pub mod types;

pub use catalog::{Catalog, UserRecord};
pub use config::StationConfig;
pub use error::{
    AuthError, BoxError, CatalogError, ClaimError, ConfigError, ImeiError, ImeiIssue,
    ImeiViolation, RegistrationError, ScanError, StationError, StationResult, StructuredError,
    SubmitError,
};
pub use events::{EventBus, EventFilter, FilteredReceiver, SharedEventBus, StationEvent};
pub use packing::{ImeiRule, PackingPhase, PackingProgress, PackingSession, SubmitBlocker};
pub use session::{SessionInfo, SessionManager};
pub use station::{OperationResponse, Station, StationStatus};
pub use submission::SubmissionSummary;
pub use types::{
    BoxRecommendations, BoxStatus, GuideStep, HandlingUnit, ImeiCapture, ItemAttributes,
    OrderItem, Packer, PackingBox, RecommendationMode, ScanStatus, User, VisualGuide, Workstation,
};

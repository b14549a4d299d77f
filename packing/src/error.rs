//! Station error types
//!
//! One error enum per concern, matching the operation that raises it, plus a
//! `StationError` umbrella used when results cross to the presentation layer.
//! The umbrella formats operator-friendly structured errors with a
//! stable code and a recovery action.

use crate::packing::SubmitBlocker;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for station-level operations
pub type StationResult<T> = Result<T, StationError>;

// ============================================================================
// Structured Error Response
// ============================================================================

/// Structured error response for the presentation layer.
///
/// # Example Response
/// ```json
/// {
///   "code": "SCAN_MISMATCH",
///   "message": "Barcode 'X' does not match item OI-001",
///   "recovery_action": "Scan the UPC or SKU printed on the item",
///   "context": { "order_item_id": "OI-001" },
///   "retryable": true
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Machine-readable error code (e.g., "SCAN_MISMATCH", "SUBMIT_NOT_READY")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// What the operator should do next
    pub recovery_action: String,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,

    /// Whether the same operation may succeed with corrected input
    #[serde(default)]
    pub retryable: bool,
}

impl StructuredError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        recovery_action: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            recovery_action: recovery_action.into(),
            context: HashMap::new(),
            retryable: false,
        }
    }

    /// Add context key-value pair
    pub fn with_context(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    pub fn retryable(mut self) -> Self {
        self.retryable = true;
        self
    }
}

impl std::fmt::Display for StructuredError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for StructuredError {}

// ============================================================================
// Operation Errors
// ============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Username and password are required")]
    MissingCredentials,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// Neither a packer id nor a workstation id was supplied
    #[error("Provide at least one field (packer ID or workstation ID)")]
    MissingFields,

    #[error("Log in before registering a workstation")]
    NotAuthenticated,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClaimError {
    #[error("Handling unit '{code}' not found or invalid")]
    NotFound { code: String },

    /// Login and workstation registration must come first
    #[error("Log in and register a workstation before claiming a handling unit")]
    SessionNotReady,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("No active handling unit")]
    NoActiveHu,

    #[error("Handling unit already submitted")]
    AlreadySubmitted,

    #[error("Item not found: {order_item_id}")]
    ItemNotFound { order_item_id: String },

    #[error("Barcode '{code}' does not match item {order_item_id}")]
    Mismatch { order_item_id: String, code: String },
}

/// Why a single IMEI value failed the format check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImeiIssue {
    Empty,
    NonDigit,
    BadLength { len: usize },
}

impl std::fmt::Display for ImeiIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "must not be empty"),
            Self::NonDigit => write!(f, "must contain digits only"),
            Self::BadLength { len } => write!(f, "has {} digits", len),
        }
    }
}

/// Format violation for the IMEI at a given slot (0-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImeiViolation {
    pub slot: usize,
    pub issue: ImeiIssue,
}

impl std::fmt::Display for ImeiViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "slot {} {}", self.slot + 1, self.issue)
    }
}

fn join_violations(violations: &[ImeiViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImeiError {
    #[error("No active handling unit")]
    NoActiveHu,

    #[error("Handling unit already submitted")]
    AlreadySubmitted,

    #[error("Item not found: {order_item_id}")]
    ItemNotFound { order_item_id: String },

    #[error("Item {order_item_id} does not require IMEI capture")]
    NotRequired { order_item_id: String },

    /// Verification is permanent once it succeeds
    #[error("IMEI for item {order_item_id} is already verified")]
    AlreadyVerified { order_item_id: String },

    #[error("Expected {expected} IMEI value(s), got {actual}")]
    SlotCountMismatch { expected: usize, actual: usize },

    #[error("Invalid IMEI: {}", join_violations(.violations))]
    InvalidFormat { violations: Vec<ImeiViolation> },

    #[error("IMEI values must be unique: '{value}' appears more than once")]
    Duplicate { value: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoxError {
    #[error("No active handling unit")]
    NoActiveHu,

    #[error("Handling unit already submitted")]
    AlreadySubmitted,

    #[error("Box not found: {box_id}")]
    NotFound { box_id: String },

    #[error("Item not found: {order_item_id}")]
    ItemNotFound { order_item_id: String },

    #[error("Manual mode is required to add a box")]
    ManualModeRequired,
}

fn describe_blockers(blockers: &[SubmitBlocker]) -> String {
    blockers
        .iter()
        .map(|b| b.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("No active handling unit")]
    NoActiveHu,

    #[error("Handling unit already submitted")]
    AlreadySubmitted,

    #[error("Not all requirements are met: {}", describe_blockers(.blockers))]
    NotReady { blockers: Vec<SubmitBlocker> },
}

// ============================================================================
// Infrastructure Errors
// ============================================================================

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog not found at {path}")]
    NotFound { path: PathBuf },

    #[error("Invalid catalog JSON: {message}")]
    Invalid { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CatalogError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config TOML: {message}")]
    Parse { message: String },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

impl ConfigError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

// ============================================================================
// Umbrella
// ============================================================================

/// Any error a station operation can surface
#[derive(Error, Debug)]
pub enum StationError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Claim(#[from] ClaimError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Imei(#[from] ImeiError),

    #[error(transparent)]
    Box(#[from] BoxError),

    #[error(transparent)]
    Submit(#[from] SubmitError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl StationError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Auth(AuthError::InvalidCredentials) => "INVALID_CREDENTIALS",
            Self::Auth(AuthError::MissingCredentials) => "MISSING_CREDENTIALS",
            Self::Registration(RegistrationError::MissingFields) => "REGISTRATION_MISSING_FIELDS",
            Self::Registration(RegistrationError::NotAuthenticated) => "NOT_AUTHENTICATED",
            Self::Claim(ClaimError::NotFound { .. }) => "HU_NOT_FOUND",
            Self::Claim(ClaimError::SessionNotReady) => "SESSION_NOT_READY",
            Self::Scan(ScanError::NoActiveHu)
            | Self::Imei(ImeiError::NoActiveHu)
            | Self::Box(BoxError::NoActiveHu)
            | Self::Submit(SubmitError::NoActiveHu) => "NO_ACTIVE_HU",
            Self::Scan(ScanError::AlreadySubmitted)
            | Self::Imei(ImeiError::AlreadySubmitted)
            | Self::Box(BoxError::AlreadySubmitted)
            | Self::Submit(SubmitError::AlreadySubmitted) => "ALREADY_SUBMITTED",
            Self::Scan(ScanError::ItemNotFound { .. })
            | Self::Imei(ImeiError::ItemNotFound { .. })
            | Self::Box(BoxError::ItemNotFound { .. }) => "ITEM_NOT_FOUND",
            Self::Scan(ScanError::Mismatch { .. }) => "SCAN_MISMATCH",
            Self::Imei(ImeiError::NotRequired { .. }) => "IMEI_NOT_REQUIRED",
            Self::Imei(ImeiError::AlreadyVerified { .. }) => "IMEI_ALREADY_VERIFIED",
            Self::Imei(ImeiError::SlotCountMismatch { .. }) => "IMEI_SLOT_COUNT_MISMATCH",
            Self::Imei(ImeiError::InvalidFormat { .. }) => "IMEI_INVALID_FORMAT",
            Self::Imei(ImeiError::Duplicate { .. }) => "IMEI_DUPLICATE",
            Self::Box(BoxError::NotFound { .. }) => "BOX_NOT_FOUND",
            Self::Box(BoxError::ManualModeRequired) => "MANUAL_MODE_REQUIRED",
            Self::Submit(SubmitError::NotReady { .. }) => "SUBMIT_NOT_READY",
            Self::Catalog(CatalogError::NotFound { .. }) => "CATALOG_NOT_FOUND",
            Self::Catalog(CatalogError::Invalid { .. }) => "CATALOG_INVALID",
            Self::Catalog(CatalogError::Io(_)) => "CATALOG_IO_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Whether retrying the same operation with corrected input can succeed
    /// without any other state change first
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Auth(AuthError::InvalidCredentials)
                | Self::Scan(ScanError::Mismatch { .. })
                | Self::Imei(ImeiError::SlotCountMismatch { .. })
                | Self::Imei(ImeiError::InvalidFormat { .. })
                | Self::Imei(ImeiError::Duplicate { .. })
        )
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::Auth(AuthError::InvalidCredentials) => {
                "Check the username and password and log in again."
            }
            Self::Auth(AuthError::MissingCredentials) => "Enter both a username and a password.",
            Self::Registration(RegistrationError::MissingFields) => {
                "Scan or type a packer ID, a workstation ID, or both."
            }
            Self::Registration(RegistrationError::NotAuthenticated) => {
                "Log in before registering the workstation."
            }
            Self::Claim(ClaimError::NotFound { .. }) => {
                "Re-scan the handling unit label; the code must match exactly."
            }
            Self::Claim(ClaimError::SessionNotReady) => {
                "Log in and register a workstation, then scan the handling unit again."
            }
            Self::Scan(ScanError::NoActiveHu)
            | Self::Imei(ImeiError::NoActiveHu)
            | Self::Box(BoxError::NoActiveHu)
            | Self::Submit(SubmitError::NoActiveHu) => "Scan a handling unit first.",
            Self::Scan(ScanError::AlreadySubmitted)
            | Self::Imei(ImeiError::AlreadySubmitted)
            | Self::Box(BoxError::AlreadySubmitted)
            | Self::Submit(SubmitError::AlreadySubmitted) => {
                "This package is already submitted. Start a new order to continue."
            }
            Self::Scan(ScanError::ItemNotFound { .. })
            | Self::Imei(ImeiError::ItemNotFound { .. })
            | Self::Box(BoxError::ItemNotFound { .. }) => {
                "Pick an item listed on the active handling unit."
            }
            Self::Scan(ScanError::Mismatch { .. }) => {
                "Scan the UPC or SKU printed on the item itself."
            }
            Self::Imei(ImeiError::NotRequired { .. }) => "No IMEI capture is needed for this item.",
            Self::Imei(ImeiError::AlreadyVerified { .. }) => {
                "The IMEI set is locked. Continue with the next item."
            }
            Self::Imei(ImeiError::SlotCountMismatch { .. }) => {
                "Enter exactly one IMEI per device slot."
            }
            Self::Imei(ImeiError::InvalidFormat { .. }) => {
                "Each IMEI must be 14-16 digits with no letters or spaces."
            }
            Self::Imei(ImeiError::Duplicate { .. }) => "Each slot needs a different IMEI.",
            Self::Box(BoxError::NotFound { .. }) => {
                "Pick a box listed for the current recommendation mode."
            }
            Self::Box(BoxError::ManualModeRequired) => {
                "Switch to manual mode before scanning a new box."
            }
            Self::Submit(SubmitError::NotReady { .. }) => {
                "Scan and verify every item, then select and scan a box."
            }
            Self::Catalog(CatalogError::NotFound { .. }) => {
                "Point PACKING_CATALOG_PATH at an existing catalog file or unset it to use the seed."
            }
            Self::Catalog(CatalogError::Invalid { .. }) => {
                "Fix the catalog JSON; validate it with a JSON linter."
            }
            Self::Catalog(CatalogError::Io(_)) => "Check file permissions for the catalog path.",
            Self::Config(_) => "Check the station config file and PACKING_* environment variables.",
        }
    }

    /// Convert to structured error for responses
    pub fn to_structured(&self) -> StructuredError {
        let mut structured =
            StructuredError::new(self.code(), self.to_string(), self.recovery_suggestion());

        match self {
            Self::Claim(ClaimError::NotFound { code }) => {
                structured = structured.with_context("hu", code.clone());
            }
            Self::Scan(ScanError::ItemNotFound { order_item_id })
            | Self::Imei(ImeiError::ItemNotFound { order_item_id })
            | Self::Imei(ImeiError::NotRequired { order_item_id })
            | Self::Imei(ImeiError::AlreadyVerified { order_item_id })
            | Self::Box(BoxError::ItemNotFound { order_item_id }) => {
                structured = structured.with_context("order_item_id", order_item_id.clone());
            }
            Self::Scan(ScanError::Mismatch {
                order_item_id,
                code,
            }) => {
                structured = structured
                    .with_context("order_item_id", order_item_id.clone())
                    .with_context("code", code.clone());
            }
            Self::Imei(ImeiError::SlotCountMismatch { expected, actual }) => {
                structured = structured
                    .with_context("expected", *expected)
                    .with_context("actual", *actual);
            }
            Self::Imei(ImeiError::InvalidFormat { violations }) => {
                structured = structured.with_context(
                    "violations",
                    serde_json::to_value(violations).unwrap_or_default(),
                );
            }
            Self::Box(BoxError::NotFound { box_id }) => {
                structured = structured.with_context("box_id", box_id.clone());
            }
            Self::Submit(SubmitError::NotReady { blockers }) => {
                structured = structured.with_context(
                    "blockers",
                    serde_json::to_value(blockers).unwrap_or_default(),
                );
            }
            _ => {}
        }

        if self.is_retryable() {
            structured = structured.retryable();
        }

        structured
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ScanError::Mismatch {
            order_item_id: "OI-001".to_string(),
            code: "XYZ".to_string(),
        };
        assert!(err.to_string().contains("OI-001"));
        assert!(err.to_string().contains("XYZ"));

        let err = ImeiError::SlotCountMismatch {
            expected: 2,
            actual: 1,
        };
        assert!(err.to_string().contains("Expected 2"));
    }

    #[test]
    fn test_invalid_format_lists_every_violation() {
        let err = ImeiError::InvalidFormat {
            violations: vec![
                ImeiViolation {
                    slot: 0,
                    issue: ImeiIssue::Empty,
                },
                ImeiViolation {
                    slot: 1,
                    issue: ImeiIssue::BadLength { len: 13 },
                },
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("slot 1 must not be empty"));
        assert!(msg.contains("slot 2 has 13 digits"));
    }

    #[test]
    fn test_codes_are_shared_across_operations() {
        let a: StationError = ScanError::NoActiveHu.into();
        let b: StationError = BoxError::NoActiveHu.into();
        assert_eq!(a.code(), "NO_ACTIVE_HU");
        assert_eq!(a.code(), b.code());

        let c: StationError = SubmitError::AlreadySubmitted.into();
        assert_eq!(c.code(), "ALREADY_SUBMITTED");
    }

    #[test]
    fn test_is_retryable() {
        let err: StationError = ScanError::Mismatch {
            order_item_id: "OI-1".to_string(),
            code: "x".to_string(),
        }
        .into();
        assert!(err.is_retryable());

        let err: StationError = ImeiError::AlreadyVerified {
            order_item_id: "OI-1".to_string(),
        }
        .into();
        assert!(!err.is_retryable());

        let err: StationError = RegistrationError::MissingFields.into();
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_to_structured_carries_context() {
        let err: StationError = BoxError::NotFound {
            box_id: "BX-404".to_string(),
        }
        .into();
        let structured = err.to_structured();
        assert_eq!(structured.code, "BOX_NOT_FOUND");
        assert_eq!(structured.context.get("box_id").unwrap(), "BX-404");
        assert!(!structured.retryable);
    }

    #[test]
    fn test_catalog_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: StationError = CatalogError::from(io_err).into();
        assert_eq!(err.code(), "CATALOG_IO_ERROR");
    }
}

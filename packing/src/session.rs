//! Session manager for the logged-in packer
//!
//! Handles login, logout and workstation registration, and answers whether
//! the packing workflow may start.

use crate::catalog::Catalog;
use crate::error::{AuthError, RegistrationError};
use crate::types::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Registration state of the current login
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub session_id: String,
    pub started_at: DateTime<Utc>,
    pub packer_id: Option<String>,
    pub workstation_id: Option<String>,
    pub warehouse: Option<String>,
    pub shift: Option<String>,
    pub line: Option<String>,
    pub is_registered: bool,
}

impl SessionInfo {
    fn new() -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            packer_id: None,
            workstation_id: None,
            warehouse: None,
            shift: None,
            line: None,
            is_registered: false,
        }
    }

    /// Short session ID (first 8 chars)
    pub fn short_id(&self) -> &str {
        &self.session_id[..8.min(self.session_id.len())]
    }
}

impl std::fmt::Display for SessionInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let dash = "-";
        write!(
            f,
            "Session {}: packer {} ({} / {}), workstation {} ({}){}",
            self.short_id(),
            self.packer_id.as_deref().unwrap_or(dash),
            self.warehouse.as_deref().unwrap_or(dash),
            self.shift.as_deref().unwrap_or(dash),
            self.workstation_id.as_deref().unwrap_or(dash),
            self.line.as_deref().unwrap_or(dash),
            if self.is_registered {
                ""
            } else {
                " [unregistered]"
            }
        )
    }
}

fn normalize(input: Option<&str>) -> Option<String> {
    input
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Session manager
#[derive(Debug, Default)]
pub struct SessionManager {
    user: Option<User>,
    info: Option<SessionInfo>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Authenticate against the catalog.
    ///
    /// A successful login starts a fresh, unregistered session and replaces
    /// any previous one. A failed login changes nothing; an empty field that
    /// matches no catalog entry is reported as missing rather than wrong.
    pub fn login(
        &mut self,
        catalog: &Catalog,
        username: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let user = catalog.find_user(username, password).ok_or_else(|| {
            if username.is_empty() || password.is_empty() {
                AuthError::MissingCredentials
            } else {
                AuthError::InvalidCredentials
            }
        })?;

        let info = SessionInfo::new();
        debug!(username = %user.username, session_id = %info.session_id, "Session started");
        self.user = Some(user.clone());
        self.info = Some(info);
        Ok(user)
    }

    /// Clear authentication and registration. Returns the user that was
    /// logged in, if any.
    pub fn logout(&mut self) -> Option<User> {
        self.info = None;
        self.user.take()
    }

    /// Register the packer and/or workstation for this session.
    ///
    /// Ids are trimmed; at least one must remain. Ids unknown to the catalog
    /// are stored without enrichment. Calling again overwrites.
    pub fn register_workstation(
        &mut self,
        catalog: &Catalog,
        packer_id: Option<&str>,
        workstation_id: Option<&str>,
    ) -> Result<SessionInfo, RegistrationError> {
        let packer_id = normalize(packer_id);
        let workstation_id = normalize(workstation_id);

        if packer_id.is_none() && workstation_id.is_none() {
            return Err(RegistrationError::MissingFields);
        }

        let info = self
            .info
            .as_mut()
            .ok_or(RegistrationError::NotAuthenticated)?;

        let packer = packer_id.as_deref().and_then(|id| catalog.find_packer(id));
        let workstation = workstation_id
            .as_deref()
            .and_then(|id| catalog.find_workstation(id));

        info.warehouse = packer.map(|p| p.warehouse.clone());
        info.shift = packer.map(|p| p.shift.clone());
        info.line = workstation.map(|w| w.line.clone());
        info.packer_id = packer_id;
        info.workstation_id = workstation_id;
        info.is_registered = true;

        Ok(info.clone())
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn info(&self) -> Option<&SessionInfo> {
        self.info.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_registered(&self) -> bool {
        self.info.as_ref().is_some_and(|i| i.is_registered)
    }

    /// Whether a handling unit may be claimed
    pub fn can_pack(&self, require_registration: bool) -> bool {
        self.is_authenticated() && (!require_registration || self.is_registered())
    }
}

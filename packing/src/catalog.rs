//! Catalog of users, packers, workstations and handling units
//!
//! Read-only for the life of the process. Handling units are templates:
//! claiming one hands out an independent copy and the template never changes.

use crate::error::CatalogError;
use crate::types::{HandlingUnit, Packer, User, Workstation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

const SEED_CATALOG: &str = include_str!("../data/catalog.json");

/// Login record; the password never leaves the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    pub password: String,
    pub name: String,
}

impl UserRecord {
    fn profile(&self) -> User {
        User {
            username: self.username.clone(),
            display_name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct CatalogData {
    users: Vec<UserRecord>,
    packers: Vec<Packer>,
    workstations: Vec<Workstation>,
    handling_units: Vec<HandlingUnit>,
}

/// Lookup service over the static catalog
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    data: CatalogData,
}

impl Catalog {
    /// Catalog built from the embedded seed data
    pub fn seeded() -> Result<Self, CatalogError> {
        Self::from_json(SEED_CATALOG)
    }

    /// Load catalog from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CatalogError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, CatalogError> {
        let data: CatalogData =
            serde_json::from_str(content).map_err(|e| CatalogError::invalid(e.to_string()))?;
        Ok(Self { data })
    }

    /// Exact, case-sensitive credential match
    pub fn find_user(&self, username: &str, password: &str) -> Option<User> {
        self.data
            .users
            .iter()
            .find(|u| u.username == username && u.password == password)
            .map(UserRecord::profile)
    }

    pub fn find_packer(&self, packer_id: &str) -> Option<&Packer> {
        self.data.packers.iter().find(|p| p.packer_id == packer_id)
    }

    pub fn find_workstation(&self, workstation_id: &str) -> Option<&Workstation> {
        self.data
            .workstations
            .iter()
            .find(|w| w.workstation_id == workstation_id)
    }

    /// Template for a handling unit code. Callers clone it before mutating.
    pub fn find_handling_unit_template(&self, code: &str) -> Option<&HandlingUnit> {
        self.data.handling_units.iter().find(|h| h.hu == code)
    }

    pub fn workstations(&self) -> &[Workstation] {
        &self.data.workstations
    }

    pub fn packers(&self) -> &[Packer] {
        &self.data.packers
    }

    pub fn handling_units(&self) -> &[HandlingUnit] {
        &self.data.handling_units
    }

    /// Validate catalog integrity (returns list of issues)
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        let mut seen_hus = HashSet::new();
        for hu in &self.data.handling_units {
            if !seen_hus.insert(hu.hu.as_str()) {
                issues.push(format!("Duplicate handling unit: {}", hu.hu));
            }

            let mut item_ids = HashSet::new();
            for item in &hu.items {
                if !item_ids.insert(item.order_item_id.as_str()) {
                    issues.push(format!(
                        "{}: duplicate order item {}",
                        hu.hu, item.order_item_id
                    ));
                }
                if item.requires_imei && item.imei_slots == 0 {
                    issues.push(format!(
                        "{}: item {} requires IMEI but has no slots",
                        hu.hu, item.order_item_id
                    ));
                }
                if item.is_scanned() {
                    issues.push(format!(
                        "{}: item {} is already scanned in the template",
                        hu.hu, item.order_item_id
                    ));
                }
                if item.imei_verified() {
                    issues.push(format!(
                        "{}: item {} carries a verified IMEI in the template",
                        hu.hu, item.order_item_id
                    ));
                }
            }

            let recs = &hu.recommendations;
            let mut box_ids = HashSet::new();
            for b in recs.boxes.iter().chain(recs.manual_boxes.iter()) {
                if !box_ids.insert(b.box_id.as_str()) {
                    issues.push(format!("{}: duplicate box {}", hu.hu, b.box_id));
                }
                for assigned in &b.assigned_items {
                    if !item_ids.contains(assigned.as_str()) {
                        issues.push(format!(
                            "{}: box {} references unknown item {}",
                            hu.hu, b.box_id, assigned
                        ));
                    }
                }
            }
        }

        let mut seen_users = HashSet::new();
        for user in &self.data.users {
            if !seen_users.insert(user.username.as_str()) {
                issues.push(format!("Duplicate username: {}", user.username));
            }
            if user.username.is_empty() || user.password.is_empty() {
                issues.push(format!(
                    "User '{}' has an empty username or password",
                    user.username
                ));
            }
        }

        let mut seen_packers = HashSet::new();
        for packer in self.packers() {
            if !seen_packers.insert(packer.packer_id.as_str()) {
                issues.push(format!("Duplicate packer: {}", packer.packer_id));
            }
        }

        let mut seen_workstations = HashSet::new();
        for ws in self.workstations() {
            if !seen_workstations.insert(ws.workstation_id.as_str()) {
                issues.push(format!("Duplicate workstation: {}", ws.workstation_id));
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_catalog_is_valid() {
        let catalog = Catalog::seeded().unwrap();
        assert!(catalog.validate().is_empty(), "{:?}", catalog.validate());
        assert_eq!(catalog.handling_units().len(), 2);
        assert_eq!(catalog.workstations().len(), 2);
        assert_eq!(catalog.packers().len(), 2);
    }

    #[test]
    fn test_find_user() {
        let catalog = Catalog::seeded().unwrap();
        let user = catalog.find_user("packer01", "demo123").unwrap();
        assert_eq!(user.display_name, "Ahmad Packer");

        assert!(catalog.find_user("packer01", "wrong").is_none());
        assert!(catalog.find_user("PACKER01", "demo123").is_none());
        assert!(catalog.find_user("", "").is_none());
    }

    #[test]
    fn test_find_by_id() {
        let catalog = Catalog::seeded().unwrap();
        assert_eq!(catalog.find_packer("PKR-0821").unwrap().warehouse, "JKT-01");
        assert_eq!(catalog.find_workstation("WS-07").unwrap().line, "LINE-B");
        assert!(catalog.find_packer("PKR-9999").is_none());

        let hu = catalog.find_handling_unit_template("HU-9911223344").unwrap();
        assert_eq!(hu.items.len(), 3);
        assert!(catalog.find_handling_unit_template("hu-9911223344").is_none());
    }

    #[test]
    fn test_validate_reports_issues() {
        let json = r#"{
            "users": [
                {"username": "a", "password": "x", "name": "A"},
                {"username": "a", "password": "y", "name": "A2"}
            ],
            "handlingUnits": [{
                "hu": "HU-1", "salesOrder": "SO", "packageId": "P", "clientId": "C",
                "clientName": "N", "logistic": "L", "destCity": "D", "pickedBy": "B",
                "packageCount": 1, "totalQty": 1,
                "items": [{
                    "orderItemId": "OI-1", "sku": "S", "upc": "U", "skuId": "SI",
                    "name": "Phone", "qty": 1, "requiresImei": true, "imeiSlots": 0
                }],
                "recommendations": {"mode": "auto", "boxes": [{
                    "boxId": "BX-1", "name": "B", "innerDim": "1", "capacityL": 1.0,
                    "location": "here", "assignedItems": ["OI-9"]
                }]}
            }]
        }"#;
        let catalog = Catalog::from_json(json).unwrap();
        let issues = catalog.validate();
        assert_eq!(issues.len(), 3, "{:?}", issues);
        assert!(issues.iter().any(|i| i.contains("no slots")));
        assert!(issues.iter().any(|i| i.contains("unknown item OI-9")));
        assert!(issues.iter().any(|i| i.contains("Duplicate username")));
    }

    #[test]
    fn test_validate_flags_prefilled_templates() {
        let json = r#"{
            "users": [{"username": "kiosk", "password": "", "name": "Kiosk"}],
            "packers": [
                {"packerId": "PKR-1", "name": "P", "warehouse": "W", "shift": "S"},
                {"packerId": "PKR-1", "name": "Q", "warehouse": "W", "shift": "S"}
            ],
            "handlingUnits": [{
                "hu": "HU-1", "salesOrder": "SO", "packageId": "P", "clientId": "C",
                "clientName": "N", "logistic": "L", "destCity": "D", "pickedBy": "B",
                "packageCount": 1, "totalQty": 2,
                "items": [
                    {
                        "orderItemId": "OI-1", "sku": "S1", "upc": "U1", "skuId": "SI1",
                        "name": "Case", "qty": 1, "scanStatus": "success"
                    },
                    {
                        "orderItemId": "OI-2", "sku": "S2", "upc": "U2", "skuId": "SI2",
                        "name": "Phone", "qty": 1, "requiresImei": true, "imeiSlots": 1,
                        "imei": {"slots": 1, "values": ["352099001761481"], "verified": true}
                    }
                ],
                "recommendations": {"mode": "auto", "boxes": []}
            }]
        }"#;
        let catalog = Catalog::from_json(json).unwrap();
        let issues = catalog.validate();
        assert_eq!(issues.len(), 4, "{:?}", issues);
        assert!(issues.iter().any(|i| i.contains("OI-1 is already scanned")));
        assert!(issues.iter().any(|i| i.contains("OI-2 carries a verified IMEI")));
        assert!(issues.iter().any(|i| i.contains("'kiosk' has an empty")));
        assert!(issues.iter().any(|i| i.contains("Duplicate packer: PKR-1")));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            Catalog::from_json("{not json"),
            Err(CatalogError::Invalid { .. })
        ));
    }
}

//! Box selection, scanning and item assignment.
//!
//! Every operation acts on the box set of the current recommendation mode.

use super::PackingSession;
use crate::error::BoxError;
use crate::types::{BoxStatus, PackingBox, RecommendationMode};

fn not_found(box_id: &str) -> BoxError {
    BoxError::NotFound {
        box_id: box_id.to_string(),
    }
}

impl PackingSession {
    /// Mark a box selected; other boxes keep their status
    pub fn select_box(&mut self, box_id: &str) -> Result<&PackingBox, BoxError> {
        self.set_box_status(box_id, BoxStatus::Selected)
    }

    pub fn deselect_box(&mut self, box_id: &str) -> Result<&PackingBox, BoxError> {
        self.set_box_status(box_id, BoxStatus::Unselected)
    }

    fn set_box_status(
        &mut self,
        box_id: &str,
        status: BoxStatus,
    ) -> Result<&PackingBox, BoxError> {
        let hu = self.active_mut()?;
        let b = hu
            .recommendations
            .find_mut(box_id)
            .ok_or_else(|| not_found(box_id))?;
        b.status = status;
        Ok(&*b)
    }

    /// Record the physical box barcode. The barcode is not interpreted.
    pub fn scan_box(&mut self, box_id: &str, barcode: &str) -> Result<&PackingBox, BoxError> {
        let hu = self.active_mut()?;
        let b = hu
            .recommendations
            .find_mut(box_id)
            .ok_or_else(|| not_found(box_id))?;
        b.scanned = true;
        b.barcode = Some(barcode.to_string());
        Ok(&*b)
    }

    /// Create a selected, scanned box from a barcode. Manual mode only.
    ///
    /// Every call creates a new box, even for a barcode seen before.
    pub fn add_manual_box(&mut self, barcode: &str) -> Result<&PackingBox, BoxError> {
        let hu = self.active.as_ref().ok_or(BoxError::NoActiveHu)?;
        if self.submitted.is_some() {
            return Err(BoxError::AlreadySubmitted);
        }
        if hu.mode() != RecommendationMode::Manual {
            return Err(BoxError::ManualModeRequired);
        }

        let box_id = loop {
            self.manual_box_seq += 1;
            let candidate = format!("{}-{:04}", self.manual_box_prefix, self.manual_box_seq);
            if !hu.recommendations.contains_id(&candidate) {
                break candidate;
            }
        };

        let hu = self.active_mut()?;
        let boxes = hu.recommendations.current_mut();
        boxes.push(PackingBox::manual(box_id, barcode));
        boxes.last().ok_or(BoxError::NoActiveHu)
    }

    /// Move an item into a box, taking it out of every other box first.
    ///
    /// Assignment is single-owner; assigning to the box that already holds
    /// the item changes nothing.
    pub fn reassign_item_to_box(
        &mut self,
        order_item_id: &str,
        box_id: &str,
    ) -> Result<&PackingBox, BoxError> {
        let hu = self.active_mut()?;
        if hu.recommendations.find(box_id).is_none() {
            return Err(not_found(box_id));
        }
        if hu.item(order_item_id).is_none() {
            return Err(BoxError::ItemNotFound {
                order_item_id: order_item_id.to_string(),
            });
        }

        for b in hu.recommendations.current_mut() {
            if b.box_id != box_id {
                b.assigned_items.retain(|id| id != order_item_id);
            }
        }

        let target = hu
            .recommendations
            .find_mut(box_id)
            .ok_or_else(|| not_found(box_id))?;
        if !target.holds(order_item_id) {
            target.assigned_items.push(order_item_id.to_string());
        }
        Ok(&*target)
    }
}

//! Items

use std::{
    collections::BTreeMap,
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    entities::{BuyableId, Entity},
    prices::ResolvedPrice,
};

pub mod collection;
pub mod rows;

/// Errors related to line item construction or update.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ItemError {
    /// Quantity was below the minimum of one.
    #[error("quantity must be at least 1, got {quantity}")]
    InvalidQuantity {
        /// The rejected quantity.
        quantity: u32,
    },

    /// Two stored rows shared a row id.
    #[error("duplicate row id {row_id} in stored rows")]
    DuplicateRow {
        /// The duplicated row id.
        row_id: RowId,
    },
}

/// Stable identifier of one line item within a cart.
///
/// Generated from the entity kind, id and distinguishing options, so adding
/// the same purchase twice lands on the same row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowId(String);

impl RowId {
    fn generate(kind: &str, id: &BuyableId, options: &BTreeMap<String, String>) -> Self {
        let mut hasher = FxHasher::default();

        kind.hash(&mut hasher);
        id.hash(&mut hasher);
        options.hash(&mut hasher);

        RowId(format!("{:016x}", hasher.finish()))
    }

    /// The row id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowId {
    fn from(id: &str) -> Self {
        RowId(id.to_string())
    }
}

impl From<String> for RowId {
    fn from(id: String) -> Self {
        RowId(id)
    }
}

/// One cart entry: a quantity of some priceable entity.
///
/// The resolved price starts absent and is populated by batch resolution;
/// until then the price accessors read as zero, so items can be listed before
/// any catalog lookup has happened.
#[derive(Debug, Clone)]
pub struct LineItem {
    row_id: RowId,
    kind: String,
    id: BuyableId,
    quantity: u32,
    options: BTreeMap<String, String>,
    resolved: Option<ResolvedPrice>,
    model: Option<Arc<dyn Entity>>,
}

impl LineItem {
    /// Creates a line item with no distinguishing options.
    ///
    /// # Errors
    ///
    /// Returns [`ItemError::InvalidQuantity`] if `quantity` is zero.
    pub fn new(
        kind: impl Into<String>,
        id: impl Into<BuyableId>,
        quantity: u32,
    ) -> Result<Self, ItemError> {
        Self::with_options(kind, id, quantity, BTreeMap::new())
    }

    /// Creates a line item with distinguishing options (size, colour, ...).
    ///
    /// # Errors
    ///
    /// Returns [`ItemError::InvalidQuantity`] if `quantity` is zero.
    pub fn with_options(
        kind: impl Into<String>,
        id: impl Into<BuyableId>,
        quantity: u32,
        options: BTreeMap<String, String>,
    ) -> Result<Self, ItemError> {
        if quantity == 0 {
            return Err(ItemError::InvalidQuantity { quantity });
        }

        let kind = kind.into();
        let id = id.into();
        let row_id = RowId::generate(&kind, &id, &options);

        Ok(LineItem {
            row_id,
            kind,
            id,
            quantity,
            options,
            resolved: None,
            model: None,
        })
    }

    pub(crate) fn with_row_id(mut self, row_id: RowId) -> Self {
        self.row_id = row_id;
        self
    }

    /// The item's row id within its cart.
    #[must_use]
    pub fn row_id(&self) -> &RowId {
        &self.row_id
    }

    /// The kind tag of the referenced entity.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The identifier of the referenced entity.
    #[must_use]
    pub fn id(&self) -> &BuyableId {
        &self.id
    }

    /// The quantity of this row.
    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// The distinguishing options of this row.
    #[must_use]
    pub fn options(&self) -> &BTreeMap<String, String> {
        &self.options
    }

    /// Updates the quantity, leaving prior state untouched on failure.
    ///
    /// # Errors
    ///
    /// Returns [`ItemError::InvalidQuantity`] if `quantity` is zero.
    pub fn set_quantity(&mut self, quantity: u32) -> Result<(), ItemError> {
        if quantity == 0 {
            return Err(ItemError::InvalidQuantity { quantity });
        }

        self.quantity = quantity;

        Ok(())
    }

    pub(crate) fn add_quantity(&mut self, quantity: u32) {
        self.quantity = self.quantity.saturating_add(quantity);
    }

    /// The resolved price, if resolution has run for the current context.
    #[must_use]
    pub fn resolved_price(&self) -> Option<&ResolvedPrice> {
        self.resolved.as_ref()
    }

    /// Replaces the resolved price wholesale.
    pub fn set_resolved_price(&mut self, price: ResolvedPrice) {
        self.resolved = Some(price);
    }

    /// Discards the resolved price, re-arming lazy resolution.
    pub fn clear_resolved_price(&mut self) {
        self.resolved = None;
    }

    /// Unit price in minor units; zero until a price has been resolved.
    #[must_use]
    pub fn unit_price(&self) -> u64 {
        self.resolved.map_or(0, |price| price.unit_price())
    }

    /// Pre-discount price in minor units; zero until a price has been resolved.
    #[must_use]
    pub fn original_price(&self) -> u64 {
        self.resolved.map_or(0, |price| price.original_price())
    }

    /// Line subtotal: unit price times quantity.
    #[must_use]
    pub fn subtotal(&self) -> u64 {
        self.unit_price() * u64::from(self.quantity)
    }

    /// The loaded backing entity, if batch model loading has run.
    #[must_use]
    pub fn model(&self) -> Option<&Arc<dyn Entity>> {
        self.model.as_ref()
    }

    /// Assigns the loaded backing entity.
    pub fn set_model(&mut self, model: Arc<dyn Entity>) {
        self.model = Some(model);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_quantity_is_rejected() {
        let result = LineItem::new("product", 1_u64, 0);

        assert!(matches!(
            result,
            Err(ItemError::InvalidQuantity { quantity: 0 })
        ));
    }

    #[test]
    fn identical_purchases_share_a_row_id() {
        let a = LineItem::new("product", 7_u64, 1).expect("valid item");
        let b = LineItem::new("product", 7_u64, 3).expect("valid item");

        assert_eq!(a.row_id(), b.row_id());
    }

    #[test]
    fn options_distinguish_rows() {
        let plain = LineItem::new("product", 7_u64, 1).expect("valid item");

        let mut options = BTreeMap::new();
        options.insert("size".to_string(), "L".to_string());
        let sized = LineItem::with_options("product", 7_u64, 1, options).expect("valid item");

        assert_ne!(plain.row_id(), sized.row_id());
    }

    #[test]
    fn kind_and_id_distinguish_rows() {
        let product = LineItem::new("product", 7_u64, 1).expect("valid item");
        let gift_card = LineItem::new("gift_card", 7_u64, 1).expect("valid item");
        let other = LineItem::new("product", 8_u64, 1).expect("valid item");

        assert_ne!(product.row_id(), gift_card.row_id());
        assert_ne!(product.row_id(), other.row_id());
    }

    #[test]
    fn set_quantity_validates_before_mutating() {
        let mut item = LineItem::new("product", 7_u64, 2).expect("valid item");

        let result = item.set_quantity(0);

        assert!(matches!(
            result,
            Err(ItemError::InvalidQuantity { quantity: 0 })
        ));
        assert_eq!(item.quantity(), 2);

        item.set_quantity(5).expect("valid quantity");
        assert_eq!(item.quantity(), 5);
    }

    #[test]
    fn prices_read_as_zero_before_resolution() {
        let item = LineItem::new("product", 7_u64, 3).expect("valid item");

        assert_eq!(item.unit_price(), 0);
        assert_eq!(item.original_price(), 0);
        assert_eq!(item.subtotal(), 0);
    }

    #[test]
    fn resolved_price_is_replaced_wholesale() {
        let mut item = LineItem::new("product", 7_u64, 3).expect("valid item");

        item.set_resolved_price(ResolvedPrice::new(250, 300));
        assert_eq!(item.unit_price(), 250);
        assert_eq!(item.original_price(), 300);
        assert_eq!(item.subtotal(), 750);

        item.set_resolved_price(ResolvedPrice::from_unit(100));
        assert_eq!(item.unit_price(), 100);
        assert_eq!(item.original_price(), 100);

        item.clear_resolved_price();
        assert_eq!(item.unit_price(), 0);
        assert!(item.resolved_price().is_none());
    }
}

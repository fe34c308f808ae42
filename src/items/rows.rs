//! Cart Rows
//!
//! Plain row-array representation of a [`LineItemCollection`] for cart
//! storage backends. A collection rebuilt from rows is a cold cache: no
//! resolved prices and no loaded models.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    entities::BuyableId,
    items::{ItemError, LineItem, RowId, collection::LineItemCollection},
};

/// One stored cart row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartRow {
    /// Stable row identifier.
    pub row_id: RowId,

    /// Entity kind tag.
    pub kind: String,

    /// Entity identifier.
    pub id: BuyableId,

    /// Row quantity.
    pub quantity: u32,

    /// Distinguishing options.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
}

impl From<&LineItem> for CartRow {
    fn from(item: &LineItem) -> Self {
        CartRow {
            row_id: item.row_id().clone(),
            kind: item.kind().to_string(),
            id: item.id().clone(),
            quantity: item.quantity(),
            options: item.options().clone(),
        }
    }
}

impl LineItemCollection {
    /// Serializes the collection to a plain row array, in insertion order.
    #[must_use]
    pub fn to_rows(&self) -> Vec<CartRow> {
        self.iter().map(CartRow::from).collect()
    }

    /// Rebuilds a collection from stored rows.
    ///
    /// Stored row ids are kept verbatim rather than regenerated, so rows
    /// written by an older id scheme stay addressable.
    ///
    /// # Errors
    ///
    /// Returns [`ItemError::InvalidQuantity`] if a row's quantity is zero, or
    /// [`ItemError::DuplicateRow`] if two rows share a row id.
    pub fn from_rows(rows: Vec<CartRow>) -> Result<Self, ItemError> {
        let mut collection = Self::new();

        for row in rows {
            if collection.contains(&row.row_id) {
                return Err(ItemError::DuplicateRow { row_id: row.row_id });
            }

            let item = LineItem::with_options(row.kind, row.id, row.quantity, row.options)?
                .with_row_id(row.row_id);

            collection.push(item);
        }

        Ok(collection)
    }
}

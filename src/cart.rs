//! Carts

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{
    context::PricingContext,
    entities::BuyableId,
    items::{ItemError, LineItem, RowId, collection::LineItemCollection},
    resolvers::{PriceResolver, ResolvePriceError},
};

/// Errors raised by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Wrapped line item validation error.
    #[error(transparent)]
    Item(#[from] ItemError),

    /// The cart rejects duplicate rows and this row already exists.
    #[error("cart {instance} already contains row {row_id}")]
    DuplicateItem {
        /// Cart instance name.
        instance: String,

        /// The existing row id.
        row_id: RowId,
    },

    /// Adding a row would exceed the configured item cap.
    #[error("cart {instance} holds {count} of a maximum of {max} items")]
    MaxItemsExceeded {
        /// Cart instance name.
        instance: String,

        /// Current number of rows.
        count: usize,

        /// Configured cap.
        max: usize,
    },

    /// The referenced row does not exist in this cart.
    #[error("no row {row_id} in this cart")]
    InvalidRowId {
        /// The unknown row id.
        row_id: RowId,
    },

    /// Wrapped price resolution error.
    #[error(transparent)]
    Resolution(#[from] ResolvePriceError),
}

/// What an add landing on an existing row does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Merge the added quantity into the existing row.
    #[default]
    Merge,

    /// Reject the add with [`CartError::DuplicateItem`].
    Reject,
}

/// Per-instance cart configuration.
///
/// Passed explicitly into [`Cart::new`] rather than read from ambient state,
/// so resolution behavior stays pure and testable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartConfig {
    /// Maximum number of rows; unlimited when absent.
    #[serde(default)]
    pub max_items: Option<usize>,

    /// Behavior when an add lands on an existing row.
    #[serde(default)]
    pub duplicates: DuplicatePolicy,
}

/// A named cart instance: line items plus the lazy price-resolution gate.
///
/// Prices are never resolved eagerly. Reading a total or a unit price checks
/// the resolved flag against the current context fingerprint and, on a miss,
/// runs one batch resolution over the whole collection. Every content or
/// context mutation clears the flag synchronously at the mutation site.
pub struct Cart {
    context: PricingContext,
    config: CartConfig,
    items: LineItemCollection,
    resolver: Box<dyn PriceResolver>,
    prices_resolved: bool,
    resolved_fingerprint: Option<String>,
}

impl Cart {
    /// Creates a cart for the given context and configuration.
    ///
    /// The cart's name is the context's instance name: it is one of the
    /// pricing axes, so renaming via [`Cart::set_context`] invalidates cached
    /// prices like any other context change.
    #[must_use]
    pub fn new(
        context: PricingContext,
        config: CartConfig,
        resolver: Box<dyn PriceResolver>,
    ) -> Self {
        Cart {
            context,
            config,
            items: LineItemCollection::new(),
            resolver,
            prices_resolved: false,
            resolved_fingerprint: None,
        }
    }

    /// Restores a cart around a collection rebuilt from storage.
    ///
    /// The collection arrives as a cold cache; prices resolve lazily on the
    /// first read, exactly as for a freshly filled cart.
    #[must_use]
    pub fn with_items(
        context: PricingContext,
        config: CartConfig,
        resolver: Box<dyn PriceResolver>,
        items: LineItemCollection,
    ) -> Self {
        Cart {
            context,
            config,
            items,
            resolver,
            prices_resolved: false,
            resolved_fingerprint: None,
        }
    }

    /// The cart instance name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.context.instance()
    }

    /// The current pricing context.
    #[must_use]
    pub fn context(&self) -> &PricingContext {
        &self.context
    }

    /// Replaces the pricing context, invalidating cached prices.
    pub fn set_context(&mut self, context: PricingContext) {
        self.context = context;
        self.invalidate();
    }

    /// The cart's line items.
    #[must_use]
    pub fn items(&self) -> &LineItemCollection {
        &self.items
    }

    /// Returns the item with the given row id, without triggering resolution.
    #[must_use]
    pub fn get(&self, row_id: &RowId) -> Option<&LineItem> {
        self.items.get(row_id)
    }

    /// Number of rows in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities across all rows.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items.total_quantity()
    }

    /// Whether cached prices are valid for the current context.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.prices_resolved
            && self.resolved_fingerprint.as_deref() == Some(self.context.fingerprint().as_str())
    }

    /// Adds an entity to the cart with no distinguishing options.
    ///
    /// # Errors
    ///
    /// See [`Cart::add_with_options`].
    pub fn add(
        &mut self,
        kind: impl Into<String>,
        id: impl Into<BuyableId>,
        quantity: u32,
    ) -> Result<RowId, CartError> {
        self.add_with_options(kind, id, quantity, BTreeMap::new())
    }

    /// Adds an entity to the cart, returning the row id it landed on.
    ///
    /// An add landing on an existing row merges quantities or is rejected,
    /// per the configured [`DuplicatePolicy`].
    ///
    /// # Errors
    ///
    /// - [`ItemError::InvalidQuantity`] if `quantity` is zero.
    /// - [`CartError::DuplicateItem`] if the row exists and the policy is
    ///   [`DuplicatePolicy::Reject`].
    /// - [`CartError::MaxItemsExceeded`] if a new row would exceed the cap.
    pub fn add_with_options(
        &mut self,
        kind: impl Into<String>,
        id: impl Into<BuyableId>,
        quantity: u32,
        options: BTreeMap<String, String>,
    ) -> Result<RowId, CartError> {
        let item = LineItem::with_options(kind, id, quantity, options)?;
        let row_id = item.row_id().clone();

        if self.items.contains(&row_id) {
            match self.config.duplicates {
                DuplicatePolicy::Merge => {
                    if let Some(existing) = self.items.get_mut(&row_id) {
                        existing.add_quantity(quantity);
                    }
                }
                DuplicatePolicy::Reject => {
                    return Err(CartError::DuplicateItem {
                        instance: self.name().to_string(),
                        row_id,
                    });
                }
            }
        } else {
            if let Some(max) = self.config.max_items {
                if self.items.len() >= max {
                    return Err(CartError::MaxItemsExceeded {
                        instance: self.name().to_string(),
                        count: self.items.len(),
                        max,
                    });
                }
            }

            self.items.push(item);
        }

        self.invalidate();

        Ok(row_id)
    }

    /// Updates a row's quantity, leaving state untouched on failure.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidRowId`] if the row does not exist.
    /// - [`ItemError::InvalidQuantity`] if `quantity` is zero.
    pub fn update_quantity(&mut self, row_id: &RowId, quantity: u32) -> Result<(), CartError> {
        let item = self
            .items
            .get_mut(row_id)
            .ok_or_else(|| CartError::InvalidRowId {
                row_id: row_id.clone(),
            })?;

        item.set_quantity(quantity)?;
        self.invalidate();

        Ok(())
    }

    /// Removes a row, returning the removed item.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidRowId`] if the row does not exist.
    pub fn remove(&mut self, row_id: &RowId) -> Result<LineItem, CartError> {
        let removed = self
            .items
            .remove(row_id)
            .ok_or_else(|| CartError::InvalidRowId {
                row_id: row_id.clone(),
            })?;

        self.invalidate();

        Ok(removed)
    }

    /// Removes all rows.
    pub fn clear(&mut self) {
        self.items.clear();
        self.invalidate();
    }

    /// Ensures every item carries a price resolved under the current context.
    ///
    /// A no-op when the resolved flag is set and the stored fingerprint
    /// matches the current context. An empty cart is marked resolved without
    /// calling the resolver. On failure the flag stays cleared, so the next
    /// read retries from scratch; no partial result is ever cached.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Resolution`] if the resolver fails or omits a row.
    pub fn ensure_resolved(&mut self) -> Result<(), CartError> {
        let fingerprint = self.context.fingerprint();

        if self.prices_resolved
            && self.resolved_fingerprint.as_deref() == Some(fingerprint.as_str())
        {
            debug!(instance = self.name(), "price cache hit");
            return Ok(());
        }

        if !self.items.is_empty() {
            let resolved = self.resolver.resolve_many(&self.items, &self.context)?;
            self.items.assign_prices(resolved)?;

            debug!(
                instance = self.name(),
                rows = self.items.len(),
                fingerprint = %fingerprint,
                "resolved cart prices"
            );
        }

        self.prices_resolved = true;
        self.resolved_fingerprint = Some(fingerprint);

        Ok(())
    }

    /// The cart total in minor units: sum of line subtotals.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Resolution`] if prices cannot be resolved.
    pub fn total(&mut self) -> Result<u64, CartError> {
        self.ensure_resolved()?;

        Ok(self.items.iter().map(LineItem::subtotal).sum())
    }

    /// The pre-discount cart total in minor units.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Resolution`] if prices cannot be resolved.
    pub fn original_total(&mut self) -> Result<u64, CartError> {
        self.ensure_resolved()?;

        Ok(self
            .items
            .iter()
            .map(|item| item.original_price() * u64::from(item.quantity()))
            .sum())
    }

    /// A row's resolved unit price in minor units.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidRowId`] if the row does not exist.
    /// - [`CartError::Resolution`] if prices cannot be resolved.
    pub fn unit_price(&mut self, row_id: &RowId) -> Result<u64, CartError> {
        self.priced_item(row_id).map(LineItem::unit_price)
    }

    /// A row's subtotal (unit price times quantity) in minor units.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidRowId`] if the row does not exist.
    /// - [`CartError::Resolution`] if prices cannot be resolved.
    pub fn line_subtotal(&mut self, row_id: &RowId) -> Result<u64, CartError> {
        self.priced_item(row_id).map(LineItem::subtotal)
    }

    fn priced_item(&mut self, row_id: &RowId) -> Result<&LineItem, CartError> {
        if !self.items.contains(row_id) {
            return Err(CartError::InvalidRowId {
                row_id: row_id.clone(),
            });
        }

        self.ensure_resolved()?;

        self.items.get(row_id).ok_or_else(|| CartError::InvalidRowId {
            row_id: row_id.clone(),
        })
    }

    fn invalidate(&mut self) {
        self.prices_resolved = false;
    }
}

impl fmt::Debug for Cart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cart")
            .field("context", &self.context)
            .field("config", &self.config)
            .field("items", &self.items)
            .field("prices_resolved", &self.prices_resolved)
            .field("resolved_fingerprint", &self.resolved_fingerprint)
            .finish_non_exhaustive()
    }
}

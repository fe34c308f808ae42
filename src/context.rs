//! Pricing Context

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;
use rusty_money::iso::Currency;
use uuid::Uuid;

/// The axes along which a resolved price may vary.
///
/// A context is an immutable value constructed per operation. The cart keeps
/// a reference to the current one and compares fingerprints to decide whether
/// cached prices are still valid.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingContext {
    user: Option<Uuid>,
    instance: String,
    currency: &'static Currency,
    locale: String,
}

impl PricingContext {
    /// Creates a new context for the given cart instance, currency and locale,
    /// with no acting user.
    pub fn new(
        instance: impl Into<String>,
        currency: &'static Currency,
        locale: impl Into<String>,
    ) -> Self {
        PricingContext {
            user: None,
            instance: instance.into(),
            currency,
            locale: locale.into(),
        }
    }

    /// Returns a copy of this context acting as the given user.
    #[must_use]
    pub fn with_user(mut self, user: Uuid) -> Self {
        self.user = Some(user);
        self
    }

    /// Returns a copy of this context with a different currency.
    #[must_use]
    pub fn with_currency(mut self, currency: &'static Currency) -> Self {
        self.currency = currency;
        self
    }

    /// Returns a copy of this context with a different locale.
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Returns a copy of this context for a different cart instance.
    #[must_use]
    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = instance.into();
        self
    }

    /// The acting user, if any.
    #[must_use]
    pub fn user(&self) -> Option<Uuid> {
        self.user
    }

    /// The cart instance name.
    #[must_use]
    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// The currency prices are quoted in.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// The locale prices are quoted for.
    #[must_use]
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Deterministic digest over the ordered tuple of context attributes.
    ///
    /// Two contexts with identical attributes produce identical fingerprints;
    /// string equality of the digest is the cache-invalidation test. `FxHasher`
    /// is seed-free, so the digest is stable across processes.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = FxHasher::default();

        self.currency.iso_alpha_code.hash(&mut hasher);
        self.locale.hash(&mut hasher);
        self.user.hash(&mut hasher);
        self.instance.hash(&mut hasher);

        format!("{:016x}", hasher.finish())
    }
}

//! Tier catalog: the single price and quantity table the engine consults.

use crate::error::TicketError;
use crate::types::Tier;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Price and admissions for one tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierTerms {
    /// Price in major currency units
    pub price: u64,
    /// Admissions covered by one ticket
    pub quantity: u32,
}

/// Injected tier table.
///
/// Pricing changes go through configuration; the lifecycle engine never
/// hardcodes a price.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCatalog {
    entries: BTreeMap<Tier, TierTerms>,
}

impl TierCatalog {
    /// Launch prices: REGULAR 5000, VIP 30000, `GANG_OF_5` 20000.
    pub const STANDARD: [(Tier, TierTerms); 3] = [
        (Tier::Regular, TierTerms { price: 5_000, quantity: 1 }),
        (Tier::Vip, TierTerms { price: 30_000, quantity: 1 }),
        (Tier::GangOf5, TierTerms { price: 20_000, quantity: 5 }),
    ];

    /// Build a catalog from explicit entries.
    #[must_use]
    pub fn new(entries: impl IntoIterator<Item = (Tier, TierTerms)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// The launch catalog.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(Self::STANDARD)
    }

    /// The launch catalog with prices overridden; quantities stay fixed per tier.
    #[must_use]
    pub fn with_prices(regular: u64, vip: u64, gang_of_5: u64) -> Self {
        let mut catalog = Self::standard();
        for (tier, price) in [
            (Tier::Regular, regular),
            (Tier::Vip, vip),
            (Tier::GangOf5, gang_of_5),
        ] {
            if let Some(terms) = catalog.entries.get_mut(&tier) {
                terms.price = price;
            }
        }
        catalog
    }

    /// Whether `tier` is offered.
    #[must_use]
    pub fn is_valid_tier(&self, tier: Tier) -> bool {
        self.entries.contains_key(&tier)
    }

    /// Price of `tier`, if offered.
    #[must_use]
    pub fn price_of(&self, tier: Tier) -> Option<u64> {
        self.entries.get(&tier).map(|terms| terms.price)
    }

    /// Admissions covered by `tier`, if offered.
    #[must_use]
    pub fn quantity_of(&self, tier: Tier) -> Option<u32> {
        self.entries.get(&tier).map(|terms| terms.quantity)
    }

    /// Terms of `tier`, if offered.
    #[must_use]
    pub fn terms_of(&self, tier: Tier) -> Option<TierTerms> {
        self.entries.get(&tier).copied()
    }

    /// Resolve a wire name to an offered tier.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::Validation`] when the name is unknown or the
    /// tier is not offered by this catalog.
    pub fn parse_tier(&self, raw: &str) -> Result<Tier, TicketError> {
        raw.parse::<Tier>()
            .ok()
            .filter(|tier| self.is_valid_tier(*tier))
            .ok_or_else(|| TicketError::validation("Invalid ticket tier"))
    }

    /// Offered tiers with their terms, in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Tier, TierTerms)> + '_ {
        self.entries.iter().map(|(tier, terms)| (*tier, *terms))
    }
}

impl Default for TierCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

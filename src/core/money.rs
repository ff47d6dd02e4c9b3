//! Money arithmetic and the order price breakdown
//!
//! Amounts are stored as `f64` and computed with `rust_decimal::Decimal`,
//! rounding to 2 decimal places half away from zero.

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

/// Rounding scale for monetary values
const DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    round(value).to_f64().unwrap_or_default()
}

#[inline]
fn round(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Pricing knobs applied to every order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingPolicy {
    /// Tax as a fraction of the items price
    pub tax_rate: f64,
    /// Items price strictly above this ships for free
    pub free_shipping_threshold: f64,
    /// Shipping fee charged otherwise
    pub flat_shipping_fee: f64,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            tax_rate: 0.10,
            free_shipping_threshold: 50.0,
            flat_shipping_fee: 5.0,
        }
    }
}

/// The four derived money fields of an order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub items_price: f64,
    pub tax_price: f64,
    pub shipping_price: f64,
    pub total_price: f64,
}

impl PricingPolicy {
    /// Compute the breakdown for `(unit_price, quantity)` lines
    ///
    /// `total = items + tax + shipping` holds exactly on the rounded values.
    pub fn breakdown<I>(&self, lines: I) -> PriceBreakdown
    where
        I: IntoIterator<Item = (f64, u32)>,
    {
        let items: Decimal = lines
            .into_iter()
            .map(|(price, quantity)| to_decimal(price) * Decimal::from(quantity))
            .sum();
        let items = round(items);

        let shipping = if items > to_decimal(self.free_shipping_threshold) {
            Decimal::ZERO
        } else {
            round(to_decimal(self.flat_shipping_fee))
        };
        let tax = round(items * to_decimal(self.tax_rate));
        let total = items + tax + shipping;

        PriceBreakdown {
            items_price: to_f64(items),
            tax_price: to_f64(tax),
            shipping_price: to_f64(shipping),
            total_price: to_f64(total),
        }
    }
}

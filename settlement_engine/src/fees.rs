//! Fee calculation for checkout.
//!
//! The storefront's commission is either a percentage chosen by subtotal tier, or a flat value. Whatever the customer
//! is shown at checkout is what gets persisted on the order row; fees are locked at order time and never recomputed,
//! so this calculation runs exactly once per order, server-side.
use serde::{Deserialize, Serialize};
use sps_common::Money;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum PolicyError {
    #[error("A tiered commission policy needs at least one tier")]
    NoTiers,
    #[error("Commission tiers must be in ascending order of max_subtotal")]
    TiersOutOfOrder,
    #[error("Commission percentage {0} is not a valid percentage")]
    InvalidPercent(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CommissionTier {
    /// Highest subtotal (inclusive) this tier applies to.
    pub max_subtotal: Money,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CommissionMode {
    /// Percentage by subtotal tier, ascending. A subtotal above the last tier still uses the last tier's percent.
    Tiers(Vec<CommissionTier>),
    /// A flat service fee regardless of subtotal.
    Fixed(Money),
}

/// The storefront's commission configuration, loaded once and passed into [`calculate_fees`] as an immutable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionPolicy {
    pub mode: CommissionMode,
    pub delivery_fee: Money,
    pub min_order_value: Money,
}

impl CommissionPolicy {
    pub fn tiered(
        tiers: Vec<CommissionTier>,
        delivery_fee: Money,
        min_order_value: Money,
    ) -> Result<Self, PolicyError> {
        if tiers.is_empty() {
            return Err(PolicyError::NoTiers);
        }
        if let Some(t) = tiers.iter().find(|t| !t.percent.is_finite() || t.percent < 0.0) {
            return Err(PolicyError::InvalidPercent(t.percent));
        }
        if tiers.windows(2).any(|w| w[0].max_subtotal > w[1].max_subtotal) {
            return Err(PolicyError::TiersOutOfOrder);
        }
        Ok(Self { mode: CommissionMode::Tiers(tiers), delivery_fee, min_order_value })
    }

    pub fn fixed(fixed_value: Money, delivery_fee: Money, min_order_value: Money) -> Self {
        Self { mode: CommissionMode::Fixed(fixed_value), delivery_fee, min_order_value }
    }
}

/// The monetary breakdown for one cart, as shown to the customer and persisted on the order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeBreakdown {
    pub subtotal: Money,
    pub delivery_fee: Money,
    pub service_fee: Money,
    /// The percentage the service fee was derived from. `None` for fixed-fee policies, so callers never display a
    /// flat fee as a bogus 0%.
    pub service_percent: Option<f64>,
    pub total: Money,
    /// Whether the subtotal clears the minimum order value. The calculator only reports this; blocking checkout is
    /// the caller's decision, which keeps the function usable for cart previews.
    pub meets_minimum: bool,
}

/// Computes the full fee breakdown for a cart subtotal under the given policy. Pure and infallible: a below-minimum
/// cart is reported, not rejected. Monetary rounding is half-up, applied once to the final service fee rather than
/// to intermediate products.
pub fn calculate_fees(subtotal: Money, policy: &CommissionPolicy) -> FeeBreakdown {
    let (service_fee, service_percent) = match &policy.mode {
        CommissionMode::Fixed(value) => (*value, None),
        CommissionMode::Tiers(tiers) => {
            // First tier whose ceiling covers the subtotal; carts above every tier keep the last tier's rate.
            let tier = tiers.iter().find(|t| t.max_subtotal >= subtotal).or_else(|| tiers.last());
            let percent = tier.map(|t| t.percent).unwrap_or_default();
            let fee_cents = (subtotal.value() as f64 * percent / 100.0).round();
            (Money::from_cents(fee_cents as i64), Some(percent))
        },
    };
    FeeBreakdown {
        subtotal,
        delivery_fee: policy.delivery_fee,
        service_fee,
        service_percent,
        total: subtotal + policy.delivery_fee + service_fee,
        meets_minimum: subtotal >= policy.min_order_value,
    }
}

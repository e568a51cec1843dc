//! Currency conversion
//!
//! Rates are quoted against a single base currency: `rate(X)` is how many
//! units of `X` one unit of the base buys. Converting between two non-base
//! currencies goes through the base.

use std::collections::HashMap;

use crate::models::{AssetCode, Money};

#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeRates {
    base: AssetCode,
    rates: HashMap<AssetCode, f64>,
}

impl ExchangeRates {
    /// Rates with only the base currency known
    pub fn new(base: AssetCode) -> Self {
        Self {
            base,
            rates: HashMap::new(),
        }
    }

    /// Non-positive or non-finite rates are ignored
    pub fn with_rate(mut self, asset: AssetCode, rate: f64) -> Self {
        self.insert(asset, rate);
        self
    }

    pub fn insert(&mut self, asset: AssetCode, rate: f64) {
        if rate.is_finite() && rate > 0.0 && asset != self.base {
            self.rates.insert(asset, rate);
        }
    }

    pub fn base(&self) -> &AssetCode {
        &self.base
    }

    pub fn rate(&self, asset: &AssetCode) -> Option<f64> {
        if *asset == self.base {
            Some(1.0)
        } else {
            self.rates.get(asset).copied()
        }
    }

    /// Known non-base currencies with their rates, sorted by code
    pub fn entries(&self) -> Vec<(AssetCode, f64)> {
        let mut entries: Vec<_> = self.rates.iter().map(|(a, r)| (a.clone(), *r)).collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Convert `amount` from one asset to another, rounded to cents.
    /// `None` when either side has no known rate.
    pub fn convert(&self, amount: Money, from: &AssetCode, to: &AssetCode) -> Option<Money> {
        if from == to {
            return Some(amount);
        }
        let from_rate = self.rate(from)?;
        let to_rate = self.rate(to)?;
        Some(Money::from_f64_rounded(amount.as_f64() / from_rate * to_rate))
    }
}

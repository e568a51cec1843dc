//! Exchange rate store
//!
//! One row per `(base, currency)` pair. Rates are read straight from the
//! table; the set is small and changes rarely.

use uuid::Uuid;

use crate::error::{WalletError, WalletResult};
use crate::models::AssetCode;
use crate::rates::ExchangeRates;

use super::records::ExchangeRateRecord;
use super::table::Table;

pub struct ExchangeRateStore {
    table: Box<dyn Table<ExchangeRateRecord>>,
}

impl ExchangeRateStore {
    pub fn new(table: Box<dyn Table<ExchangeRateRecord>>) -> Self {
        Self { table }
    }

    /// Every stored rate, sorted by base then currency
    pub fn list(&self) -> WalletResult<Vec<ExchangeRateRecord>> {
        let mut rows = self.table.find_all()?;
        rows.sort_by(|a, b| a.base.cmp(&b.base).then_with(|| a.currency.cmp(&b.currency)));
        Ok(rows)
    }

    fn find_pair(&self, base: &AssetCode, currency: &AssetCode) -> WalletResult<Option<ExchangeRateRecord>> {
        Ok(self
            .table
            .find_all()?
            .into_iter()
            .find(|r| r.base == base.as_str() && r.currency == currency.as_str()))
    }

    /// Insert or replace the rate for a pair
    pub fn set_rate(
        &self,
        base: &AssetCode,
        currency: &AssetCode,
        rate: f64,
        manual_override: bool,
    ) -> WalletResult<()> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(WalletError::Validation(format!(
                "exchange rate must be a positive number, got {}",
                rate
            )));
        }
        if base == currency {
            return Err(WalletError::Validation(format!(
                "cannot set a rate from {} to itself",
                base
            )));
        }

        let id = self
            .find_pair(base, currency)?
            .map(|r| r.id)
            .unwrap_or_else(Uuid::new_v4);
        self.table.save(ExchangeRateRecord {
            id,
            base: base.as_str().to_string(),
            currency: currency.as_str().to_string(),
            rate,
            manual_override,
        })?;
        tracing::debug!(%base, %currency, rate, "exchange rate stored");
        Ok(())
    }

    /// Returns whether a rate was removed
    pub fn remove_rate(&self, base: &AssetCode, currency: &AssetCode) -> WalletResult<bool> {
        match self.find_pair(base, currency)? {
            Some(row) => {
                self.table.delete_by_id(row.id)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Rates usable for conversion around `base`.
    ///
    /// Rows quoted against `base` are taken as is; rows quoting `base`
    /// against another currency are inverted unless a direct row exists.
    pub fn rates(&self, base: &AssetCode) -> WalletResult<ExchangeRates> {
        let rows = self.table.find_all()?;
        let mut rates = ExchangeRates::new(base.clone());

        for row in rows.iter().filter(|r| r.currency == base.as_str()) {
            if let Ok(asset) = AssetCode::new(&row.base) {
                rates.insert(asset, 1.0 / row.rate);
            }
        }
        for row in rows.iter().filter(|r| r.base == base.as_str()) {
            match AssetCode::new(&row.currency) {
                Ok(asset) => rates.insert(asset, row.rate),
                Err(e) => tracing::warn!(currency = %row.currency, error = %e, "skipping exchange rate"),
            }
        }
        Ok(rates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use crate::storage::table::MemoryTable;

    fn code(s: &str) -> AssetCode {
        AssetCode::new(s).unwrap()
    }

    #[test]
    fn test_set_rate_replaces_pair() {
        let store = ExchangeRateStore::new(Box::new(MemoryTable::<ExchangeRateRecord>::new()));
        store.set_rate(&code("USD"), &code("EUR"), 0.9, false).unwrap();
        store.set_rate(&code("usd"), &code("eur"), 0.92, true).unwrap();

        let rows = store.list().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].rate, 0.92);
        assert!(rows[0].manual_override);
    }

    #[test]
    fn test_set_rate_validates() {
        let store = ExchangeRateStore::new(Box::new(MemoryTable::<ExchangeRateRecord>::new()));
        assert!(store.set_rate(&code("USD"), &code("EUR"), 0.0, false).is_err());
        assert!(store.set_rate(&code("USD"), &code("USD"), 1.0, false).is_err());
    }

    #[test]
    fn test_rates_inverts_reverse_quotes() {
        let store = ExchangeRateStore::new(Box::new(MemoryTable::<ExchangeRateRecord>::new()));
        store.set_rate(&code("EUR"), &code("USD"), 2.0, false).unwrap();

        let rates = store.rates(&code("USD")).unwrap();
        assert_eq!(
            rates.convert(Money::from_cents(1000), &code("EUR"), &code("USD")),
            Some(Money::from_cents(2000))
        );
    }

    #[test]
    fn test_remove_rate() {
        let store = ExchangeRateStore::new(Box::new(MemoryTable::<ExchangeRateRecord>::new()));
        store.set_rate(&code("USD"), &code("EUR"), 0.9, false).unwrap();

        assert!(store.remove_rate(&code("USD"), &code("EUR")).unwrap());
        assert!(!store.remove_rate(&code("USD"), &code("EUR")).unwrap());
        assert!(store.rates(&code("USD")).unwrap().entries().is_empty());
    }
}

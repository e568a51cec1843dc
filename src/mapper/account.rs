use crate::models::{Account, AccountId, AssetCode, NotBlankTrimmedString};
use crate::storage::records::AccountRecord;

use super::MappingError;

/// Map a record, using `base` when the record carries no currency
pub fn to_domain(record: &AccountRecord, base: &AssetCode) -> Result<Account, MappingError> {
    let name = NotBlankTrimmedString::new(&record.name)
        .map_err(MappingError::invalid(record.id, "name"))?;

    let asset = match record.currency.as_deref().map(str::trim) {
        None | Some("") => base.clone(),
        Some(code) => AssetCode::new(code).map_err(MappingError::invalid(record.id, "currency"))?,
    };

    Ok(Account {
        id: AccountId::from_uuid(record.id),
        name,
        asset,
        color: record.color,
        icon: record.icon.clone(),
        include_in_balance: record.include_in_balance,
        order_num: record.order_num,
        removed: record.is_deleted,
        last_updated: record.last_updated.unwrap_or_default(),
    })
}

pub fn to_record(account: &Account) -> AccountRecord {
    AccountRecord {
        id: *account.id.as_uuid(),
        name: account.name.as_str().to_string(),
        currency: Some(account.asset.as_str().to_string()),
        color: account.color,
        icon: account.icon.clone(),
        include_in_balance: account.include_in_balance,
        order_num: account.order_num,
        is_deleted: account.removed,
        last_updated: Some(account.last_updated),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn usd() -> AssetCode {
        AssetCode::new("USD").unwrap()
    }

    fn record(name: &str, currency: Option<&str>) -> AccountRecord {
        AccountRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            currency: currency.map(String::from),
            color: 7,
            icon: None,
            include_in_balance: true,
            order_num: 2.0,
            is_deleted: false,
            last_updated: None,
        }
    }

    #[test]
    fn test_round_trip() {
        let account = Account::new(
            NotBlankTrimmedString::new("Revolut").unwrap(),
            AssetCode::new("EUR").unwrap(),
        )
        .with_order_num(3.0);

        let back = to_domain(&to_record(&account), &usd()).unwrap();
        assert_eq!(back, account);
    }

    #[test]
    fn test_missing_currency_uses_base() {
        let account = to_domain(&record("Cash", None), &usd()).unwrap();
        assert_eq!(account.asset, usd());

        let account = to_domain(&record("Cash", Some("  ")), &usd()).unwrap();
        assert_eq!(account.asset, usd());
    }

    #[test]
    fn test_blank_name_fails() {
        let err = to_domain(&record("   ", Some("EUR")), &usd()).unwrap_err();
        assert!(matches!(err, MappingError::Invalid { field: "name", .. }));
    }
}

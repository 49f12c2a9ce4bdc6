use crate::accounts::AccountId;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Dated unit price for an asset-holding account
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PriceRecord {
    pub account: AccountId,
    pub date: NaiveDate,
    #[schemars(with = "f64")]
    pub price: Decimal,
}

/// Unit price history per asset-holding account, used at snapshot-freeze time
/// to value holdings as of a period end.
#[derive(Debug, Default, Clone)]
pub struct PriceHistory {
    prices: BTreeMap<AccountId, Vec<(NaiveDate, Decimal)>>,
}

impl PriceHistory {
    pub fn new(records: impl IntoIterator<Item = PriceRecord>) -> Self {
        let mut history = PriceHistory::default();
        for record in records {
            history.insert(record.account, record.date, record.price);
        }
        history
    }

    pub fn insert(&mut self, account: AccountId, date: NaiveDate, price: Decimal) {
        let series = self.prices.entry(account).or_default();
        let pos = series.partition_point(|(d, _)| *d < date);
        series.insert(pos, (date, price));
    }

    /// Latest known price at or before `at`; `None` when no price precedes it
    pub fn latest(&self, account: AccountId, at: NaiveDate) -> Option<Decimal> {
        let series = self.prices.get(&account)?;
        let pos = series.partition_point(|(d, _)| *d <= at);
        pos.checked_sub(1).map(|i| series[i].1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn latest_at_or_before() {
        let history = PriceHistory::new(vec![
            PriceRecord {
                account: AccountId(8),
                date: date(2024, 6, 1),
                price: dec!(10),
            },
            PriceRecord {
                account: AccountId(8),
                date: date(2024, 9, 1),
                price: dec!(12),
            },
        ]);

        assert_eq!(history.latest(AccountId(8), date(2024, 6, 1)), Some(dec!(10)));
        assert_eq!(history.latest(AccountId(8), date(2024, 8, 31)), Some(dec!(10)));
        assert_eq!(history.latest(AccountId(8), date(2025, 1, 1)), Some(dec!(12)));
    }

    #[test]
    fn no_price_before_date() {
        let history = PriceHistory::new(vec![PriceRecord {
            account: AccountId(8),
            date: date(2024, 6, 1),
            price: dec!(10),
        }]);

        assert_eq!(history.latest(AccountId(8), date(2024, 5, 31)), None);
        assert_eq!(history.latest(AccountId(9), date(2024, 6, 1)), None);
    }

    #[test]
    fn out_of_order_inserts_stay_sorted() {
        let mut history = PriceHistory::default();
        history.insert(AccountId(8), date(2024, 9, 1), dec!(12));
        history.insert(AccountId(8), date(2024, 6, 1), dec!(10));

        assert_eq!(history.latest(AccountId(8), date(2024, 7, 1)), Some(dec!(10)));
    }
}

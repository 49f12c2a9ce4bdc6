use crate::error::AnalysisError;
use crate::events::{Classification, FinancialEvent};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// One deferred gain awaiting top-slicing relief
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeableEntry {
    pub event_id: usize,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    /// Tax already paid at source on the gain
    pub tax_paid: Decimal,
    /// Years the gain accrued over
    pub years: i32,
    /// amount / years, truncated at pennies. The remainder is permanently lost
    /// from slicing, matching the statute's per-annum convention.
    pub slice: Decimal,
}

/// Relief apportionment computed for one entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceRelief {
    pub event_id: usize,
    /// This entry's pro-rata share of the tax computed on the slice total
    pub portion: Decimal,
    /// The portion re-grossed by the entry's accrual years
    pub taxation: Decimal,
}

/// Chargeable gains in insertion order (not sorted), with chain totals and the
/// statutory top-slicing tax apportionment.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ChargeableGains {
    entries: Vec<ChargeableEntry>,
}

impl ChargeableGains {
    /// Append a chargeable-gain event to the tail of the chain.
    /// A missing or non-positive years count is a fatal configuration error.
    pub fn append(&mut self, event: &FinancialEvent) -> Result<&ChargeableEntry, AnalysisError> {
        let years = event.years.unwrap_or(0);
        if years <= 0 {
            return Err(AnalysisError::InvalidYears {
                id: event.id,
                years,
            });
        }
        let slice = (event.amount / Decimal::from(years)).trunc_with_scale(2);
        self.entries.push(ChargeableEntry {
            event_id: event.id,
            date: event.date,
            description: event.description.clone(),
            amount: event.amount,
            tax_paid: event.tax_credit.unwrap_or(Decimal::ZERO),
            years,
            slice,
        });
        log::debug!(
            "chargeable gain {}: amount={} years={} slice={}",
            event.id,
            event.amount,
            years,
            slice
        );
        Ok(self.entries.last().expect("entry just pushed"))
    }

    /// Collect every chargeable-gain event from a stream, in stream order
    pub fn from_events<'a>(
        events: impl IntoIterator<Item = &'a FinancialEvent>,
    ) -> Result<Self, AnalysisError> {
        let mut gains = ChargeableGains::default();
        for event in events {
            if event.classification == Classification::ChargeableGain {
                gains.append(event)?;
            }
        }
        Ok(gains)
    }

    pub fn entries(&self) -> &[ChargeableEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn slice_total(&self) -> Decimal {
        self.entries.iter().map(|e| e.slice).sum()
    }

    pub fn gains_total(&self) -> Decimal {
        self.entries.iter().map(|e| e.amount).sum()
    }

    pub fn tax_total(&self) -> Decimal {
        self.entries.iter().map(|e| e.tax_paid).sum()
    }

    /// Top-slicing relief: `total_tax` was computed once on the combined slice
    /// (avoiding bracket distortion from bunching multi-year gains into one
    /// year); redistribute it pro-rata to each entry's slice share, then
    /// re-gross by that entry's years to get the actual liability.
    ///
    /// A zero `slice_total` (every slice truncated to nothing) leaves nothing
    /// to apportion, so every portion is zero.
    pub fn apply_tax(&self, total_tax: Decimal, slice_total: Decimal) -> Vec<SliceRelief> {
        self.entries
            .iter()
            .map(|entry| {
                let portion = if slice_total.is_zero() {
                    Decimal::ZERO
                } else {
                    (total_tax * entry.slice / slice_total).round_dp(2)
                };
                SliceRelief {
                    event_id: entry.event_id,
                    portion,
                    taxation: portion * Decimal::from(entry.years),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::AccountId;
    use rust_decimal_macros::dec;

    fn gain(id: usize, amount: Decimal, years: i32, tax_paid: Option<Decimal>) -> FinancialEvent {
        FinancialEvent {
            id,
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            classification: Classification::ChargeableGain,
            debit: AccountId(1),
            credit: AccountId(2),
            amount,
            tax_credit: tax_paid,
            units: None,
            dilution: None,
            years: Some(years),
            description: String::new(),
        }
    }

    #[test]
    fn slice_truncates_at_pennies() {
        let mut gains = ChargeableGains::default();
        let entry = gains.append(&gain(1, dec!(10000), 3, None)).unwrap();
        assert_eq!(entry.slice, dec!(3333.33));
        // slice * years never exceeds the amount
        assert!(entry.slice * dec!(3) <= dec!(10000));
    }

    #[test]
    fn whole_pound_gain_over_three_years() {
        let mut gains = ChargeableGains::default();
        let entry = gains.append(&gain(1, dec!(9999), 3, None)).unwrap();
        assert_eq!(entry.slice, dec!(3333));
    }

    #[test]
    fn zero_years_rejected() {
        let mut gains = ChargeableGains::default();
        let err = gains.append(&gain(1, dec!(9999), 0, None)).unwrap_err();
        assert_eq!(err, AnalysisError::InvalidYears { id: 1, years: 0 });

        let mut event = gain(2, dec!(9999), 1, None);
        event.years = None;
        assert!(gains.append(&event).is_err());
    }

    #[test]
    fn chain_totals_are_simple_sums() {
        let mut gains = ChargeableGains::default();
        gains.append(&gain(1, dec!(9999), 3, Some(dec!(500)))).unwrap();
        gains.append(&gain(2, dec!(5000), 5, Some(dec!(250)))).unwrap();
        gains.append(&gain(3, dec!(100), 2, None)).unwrap();

        assert_eq!(gains.gains_total(), dec!(15099));
        assert_eq!(gains.tax_total(), dec!(750));
        assert_eq!(gains.slice_total(), dec!(3333) + dec!(1000) + dec!(50));
    }

    #[test]
    fn apply_tax_single_entry() {
        let mut gains = ChargeableGains::default();
        gains.append(&gain(1, dec!(9999), 3, None)).unwrap();

        let reliefs = gains.apply_tax(dec!(999), gains.slice_total());
        assert_eq!(reliefs.len(), 1);
        assert_eq!(reliefs[0].portion, dec!(999));
        assert_eq!(reliefs[0].taxation, dec!(2997));
    }

    #[test]
    fn apply_tax_apportions_by_slice_share() {
        let mut gains = ChargeableGains::default();
        gains.append(&gain(1, dec!(3000), 3, None)).unwrap(); // slice 1000
        gains.append(&gain(2, dec!(6000), 2, None)).unwrap(); // slice 3000

        let slice_total = gains.slice_total();
        assert_eq!(slice_total, dec!(4000));

        let reliefs = gains.apply_tax(dec!(800), slice_total);
        assert_eq!(reliefs[0].portion, dec!(200));
        assert_eq!(reliefs[0].taxation, dec!(600));
        assert_eq!(reliefs[1].portion, dec!(600));
        assert_eq!(reliefs[1].taxation, dec!(1200));

        // Portions conserve the total tax
        let portion_sum: Decimal = reliefs.iter().map(|r| r.portion).sum();
        assert_eq!(portion_sum, dec!(800));
    }

    #[test]
    fn apply_tax_on_empty_chain_yields_nothing() {
        let gains = ChargeableGains::default();
        assert!(gains.apply_tax(dec!(100), dec!(1)).is_empty());
    }

    #[test]
    fn zero_slice_total_apportions_nothing() {
        // Zero-amount gains are valid input; only bad years are rejected
        let mut gains = ChargeableGains::default();
        gains.append(&gain(1, dec!(0), 3, None)).unwrap();
        gains.append(&gain(2, dec!(0.02), 3, None)).unwrap();

        let slice_total = gains.slice_total();
        assert_eq!(slice_total, Decimal::ZERO);

        let reliefs = gains.apply_tax(Decimal::ZERO, slice_total);
        assert_eq!(reliefs.len(), 2);
        for relief in &reliefs {
            assert_eq!(relief.portion, Decimal::ZERO);
            assert_eq!(relief.taxation, Decimal::ZERO);
        }
    }

    #[test]
    fn from_events_keeps_stream_order_and_skips_others() {
        let mut other = gain(2, dec!(50), 1, None);
        other.classification = Classification::Interest;
        other.years = None;

        let events = vec![
            gain(1, dec!(9999), 3, None),
            other,
            gain(3, dec!(5000), 5, None),
        ];
        let gains = ChargeableGains::from_events(&events).unwrap();
        let ids: Vec<_> = gains.entries().iter().map(|e| e.event_id).collect();
        assert_eq!(ids, vec![1, 3]);
    }
}

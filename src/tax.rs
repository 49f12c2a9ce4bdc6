use crate::analysis::sequencer::TaxAnalysis;
use crate::events::{Classification, FinancialEvent};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Tax band for income tax calculations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaxBand {
    #[default]
    Basic,
    Higher,
    Additional,
}

/// UK Tax Year (runs 6 April to 5 April)
/// The year value represents the end year (e.g., 2025 = 2024/25 tax year)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaxYear(pub i32);

impl TaxYear {
    /// Create a tax year from a date
    pub fn from_date(date: NaiveDate) -> Self {
        let year = date.year();
        // Tax year starts 6 April
        if date >= NaiveDate::from_ymd_opt(year, 4, 6).expect("valid date") {
            TaxYear(year + 1)
        } else {
            TaxYear(year)
        }
    }

    /// Start date of the tax year (6 April of previous year)
    pub fn start_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.0 - 1, 4, 6).expect("valid date")
    }

    /// End date of the tax year (5 April)
    pub fn end_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.0, 4, 5).expect("valid date")
    }

    /// Display as "2024/25" format
    pub fn display(&self) -> String {
        format!("{}/{:02}", self.0 - 1, self.0 % 100)
    }

    /// Get dividend allowance for this tax year
    pub fn dividend_allowance(&self) -> Decimal {
        match self.0 {
            // 2024/25 onwards: £500
            2025.. => dec!(500),
            // 2023/24: £1,000
            2024 => dec!(1000),
            // Earlier: £2,000
            _ => dec!(2000),
        }
    }

    /// Get dividend tax rate for a given tax band
    pub fn dividend_rate(&self, band: TaxBand) -> Decimal {
        // Dividend rates have been stable for several years
        match band {
            TaxBand::Basic => dec!(0.0875),      // 8.75%
            TaxBand::Higher => dec!(0.3375),     // 33.75%
            TaxBand::Additional => dec!(0.3935), // 39.35%
        }
    }

    /// Get income tax rate for general income (salary, interest, chargeable gains)
    pub fn income_rate(&self, band: TaxBand) -> Decimal {
        match band {
            TaxBand::Basic => dec!(0.20),      // 20%
            TaxBand::Higher => dec!(0.40),     // 40%
            TaxBand::Additional => dec!(0.45), // 45%
        }
    }
}

impl std::fmt::Display for TaxYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Running income totals by band-relevant category, accumulated alongside the
/// core sub-analyses as each event is sequenced.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BandTotals {
    pub salary: Decimal,
    pub interest: Decimal,
    pub dividends: Decimal,
    pub chargeable: Decimal,
}

impl TaxAnalysis for BandTotals {
    fn process(&mut self, event: &FinancialEvent) {
        let gross = event.amount + event.tax_credit.unwrap_or(Decimal::ZERO);
        match event.classification {
            Classification::TaxedIncome | Classification::Benefit => self.salary += gross,
            Classification::Interest => self.interest += gross,
            Classification::Dividend => self.dividends += gross,
            Classification::ChargeableGain => self.chargeable += event.amount,
            _ => {}
        }
    }
}

impl BandTotals {
    /// Rough liability estimate at a flat band, before allowances other than
    /// the dividend allowance
    pub fn estimated_liability(&self, year: TaxYear, band: TaxBand) -> Decimal {
        let income_tax = ((self.salary + self.interest) * year.income_rate(band)).round_dp(2);
        let taxable_dividends =
            (self.dividends - year.dividend_allowance()).max(Decimal::ZERO);
        let dividend_tax = (taxable_dividends * year.dividend_rate(band)).round_dp(2);
        income_tax + dividend_tax
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::AccountId;

    #[test]
    fn tax_year_from_date_before_april_6() {
        // 5 April 2024 is in 2023/24 tax year
        let date = NaiveDate::from_ymd_opt(2024, 4, 5).unwrap();
        assert_eq!(TaxYear::from_date(date), TaxYear(2024));
    }

    #[test]
    fn tax_year_from_date_on_april_6() {
        // 6 April 2024 is in 2024/25 tax year
        let date = NaiveDate::from_ymd_opt(2024, 4, 6).unwrap();
        assert_eq!(TaxYear::from_date(date), TaxYear(2025));
    }

    #[test]
    fn tax_year_from_date_january() {
        // 15 January 2024 is in 2023/24 tax year
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(TaxYear::from_date(date), TaxYear(2024));
    }

    #[test]
    fn tax_year_display() {
        assert_eq!(TaxYear(2024).display(), "2023/24");
        assert_eq!(TaxYear(2025).display(), "2024/25");
        assert_eq!(TaxYear(2026).display(), "2025/26");
        // Single-digit end years are zero-padded
        assert_eq!(TaxYear(2005).display(), "2004/05");
        assert_eq!(TaxYear(2100).display(), "2099/00");
    }

    #[test]
    fn tax_year_start_end_dates() {
        let ty = TaxYear(2025);
        assert_eq!(ty.start_date(), NaiveDate::from_ymd_opt(2024, 4, 6).unwrap());
        assert_eq!(ty.end_date(), NaiveDate::from_ymd_opt(2025, 4, 5).unwrap());
    }

    #[test]
    fn dividend_allowances() {
        assert_eq!(TaxYear(2025).dividend_allowance(), dec!(500));
        assert_eq!(TaxYear(2026).dividend_allowance(), dec!(500));
        assert_eq!(TaxYear(2024).dividend_allowance(), dec!(1000));
    }

    #[test]
    fn income_rates() {
        let ty = TaxYear(2025);
        assert_eq!(ty.income_rate(TaxBand::Basic), dec!(0.20));
        assert_eq!(ty.income_rate(TaxBand::Higher), dec!(0.40));
        assert_eq!(ty.income_rate(TaxBand::Additional), dec!(0.45));
    }

    fn income_event(classification: Classification, amount: Decimal, credit: Option<Decimal>) -> FinancialEvent {
        FinancialEvent {
            id: 1,
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            classification,
            debit: AccountId(1),
            credit: AccountId(2),
            amount,
            tax_credit: credit,
            units: None,
            dilution: None,
            years: None,
            description: String::new(),
        }
    }

    #[test]
    fn band_totals_accumulate_gross() {
        let mut totals = BandTotals::default();
        totals.process(&income_event(Classification::TaxedIncome, dec!(2000), Some(dec!(400))));
        totals.process(&income_event(Classification::Interest, dec!(50), None));
        totals.process(&income_event(Classification::Dividend, dec!(1000), Some(dec!(100))));
        totals.process(&income_event(Classification::Purchase, dec!(9999), None));

        assert_eq!(totals.salary, dec!(2400));
        assert_eq!(totals.interest, dec!(50));
        assert_eq!(totals.dividends, dec!(1100));
        assert_eq!(totals.chargeable, Decimal::ZERO);
    }

    #[test]
    fn estimated_liability_applies_dividend_allowance() {
        let totals = BandTotals {
            salary: dec!(1000),
            interest: Decimal::ZERO,
            dividends: dec!(1500),
            chargeable: Decimal::ZERO,
        };
        // 1000 * 20% + (1500 - 500) * 8.75%
        assert_eq!(
            totals.estimated_liability(TaxYear(2025), TaxBand::Basic),
            dec!(287.50)
        );
    }
}

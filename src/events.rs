use crate::accounts::AccountId;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Transaction classification for a financial event
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub enum Classification {
    /// Purchase of units in a priced asset
    Purchase,
    /// Sale of units in a priced asset
    Sale,
    /// Unit adjustment for a stock split or rights issue
    Dilution,
    Interest,
    Dividend,
    /// Income taxed at source (salary)
    TaxedIncome,
    Benefit,
    NationalInsurance,
    /// Deferred gain crystallising, eligible for top-slicing relief
    ChargeableGain,
    Transfer,
}

impl Classification {
    /// Events that touch an asset-holding account's capital ledger
    pub fn is_asset_related(self) -> bool {
        matches!(
            self,
            Classification::Purchase | Classification::Sale | Classification::Dilution
        )
    }

    pub fn display(&self) -> &'static str {
        match self {
            Classification::Purchase => "Purchase",
            Classification::Sale => "Sale",
            Classification::Dilution => "Dilution",
            Classification::Interest => "Interest",
            Classification::Dividend => "Dividend",
            Classification::TaxedIncome => "TaxedIncome",
            Classification::Benefit => "Benefit",
            Classification::NationalInsurance => "NationalInsurance",
            Classification::ChargeableGain => "ChargeableGain",
            Classification::Transfer => "Transfer",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// An immutable account-to-account monetary event.
///
/// Streams are presented in non-decreasing date order, ties broken by id; the
/// engine does not re-check this (caller's contract).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FinancialEvent {
    /// Unique event identifier, final ordering tie-break
    pub id: usize,
    pub date: NaiveDate,
    pub classification: Classification,
    /// Account receiving the value
    pub debit: AccountId,
    /// Account providing the value
    pub credit: AccountId,
    #[schemars(with = "f64")]
    pub amount: Decimal,
    /// Tax credited/paid at source, where applicable
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub tax_credit: Option<Decimal>,
    /// Unit movement for asset purchases and sales
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub units: Option<Decimal>,
    /// Unit scale factor for splits/rights issues
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub dilution: Option<Decimal>,
    /// Accrual years for a chargeable gain
    #[serde(default)]
    pub years: Option<i32>,
    #[serde(default)]
    pub description: String,
}

impl FinancialEvent {
    /// The asset-holding account this event affects: purchases and unit
    /// adjustments debit the asset account, sales credit it.
    pub fn asset_account(&self) -> AccountId {
        match self.classification {
            Classification::Sale => self.credit,
            _ => self.debit,
        }
    }
}

use crate::accounts::{AccountId, AccountRegistry};
use crate::error::AnalysisError;
use crate::events::FinancialEvent;
use crate::periods::{Period, PeriodSet};
use crate::prices::PriceHistory;
use std::collections::BTreeMap;

use super::income::IncomeAnalysis;
use super::ledger::{CapitalLedger, Valuation};

/// Per-period tax computation driven alongside the core sub-analyses.
/// `()` is the no-op analysis.
pub trait TaxAnalysis: Default + Clone {
    fn process(&mut self, event: &FinancialEvent);
}

impl TaxAnalysis for () {
    fn process(&mut self, _event: &FinancialEvent) {}
}

/// All derived analyses as of the end of one period. State is cumulative:
/// each snapshot is seeded from its predecessor by value, so no snapshot
/// aliases mutable state with another.
#[derive(Debug, Clone)]
pub struct PeriodSnapshot<T: TaxAnalysis = ()> {
    period: Period,
    ledgers: BTreeMap<AccountId, CapitalLedger>,
    income: IncomeAnalysis,
    tax: T,
}

impl<T: TaxAnalysis> PeriodSnapshot<T> {
    fn new(period: Period) -> Self {
        PeriodSnapshot {
            period,
            ledgers: BTreeMap::new(),
            income: IncomeAnalysis::default(),
            tax: T::default(),
        }
    }

    /// Value-copy seed from the previous period's final state
    fn seeded(period: Period, prev: &PeriodSnapshot<T>) -> Self {
        PeriodSnapshot {
            period,
            ledgers: prev.ledgers.clone(),
            income: prev.income.clone(),
            tax: prev.tax.clone(),
        }
    }

    pub fn period(&self) -> &Period {
        &self.period
    }

    pub fn ledger(&self, account: AccountId) -> Option<&CapitalLedger> {
        self.ledgers.get(&account)
    }

    pub fn ledgers(&self) -> impl Iterator<Item = &CapitalLedger> {
        self.ledgers.values()
    }

    pub fn income(&self) -> &IncomeAnalysis {
        &self.income
    }

    pub fn tax(&self) -> &T {
        &self.tax
    }

    fn record_capital(&mut self, event: &FinancialEvent, valuer: &dyn Valuation) {
        let account = event.asset_account();
        let ledger = self
            .ledgers
            .entry(account)
            .or_insert_with(|| CapitalLedger::new(account));
        let deltas = valuer.deltas(event, ledger);
        ledger.record(event, deltas);
    }

    /// Fix priced-asset valuations using the latest prices as of period end
    fn freeze(&mut self, prices: &PriceHistory) {
        let end = self.period.end();
        for ledger in self.ledgers.values_mut() {
            let price = prices.latest(ledger.account(), end);
            ledger.freeze(price);
        }
        log::debug!("froze snapshot for {}", self.period);
    }
}

/// Ordered snapshots, one per period encountered in the event stream.
/// Lookups are linear scans; period counts are small.
#[derive(Debug, Clone)]
pub struct SnapshotSeries<T: TaxAnalysis = ()> {
    snapshots: Vec<PeriodSnapshot<T>>,
}

impl<T: TaxAnalysis> SnapshotSeries<T> {
    pub fn iter(&self) -> impl Iterator<Item = &PeriodSnapshot<T>> {
        self.snapshots.iter()
    }

    // External reporting surface
    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    #[allow(dead_code)]
    pub fn last(&self) -> Option<&PeriodSnapshot<T>> {
        self.snapshots.last()
    }

    pub fn for_period(&self, period: &Period) -> Option<&PeriodSnapshot<T>> {
        self.snapshots.iter().find(|s| s.period() == period)
    }

    /// The most recent ledger recorded for `account`, scanning newest first
    #[allow(dead_code)]
    pub fn latest_ledger(&self, account: AccountId) -> Option<&CapitalLedger> {
        self.snapshots.iter().rev().find_map(|s| s.ledger(account))
    }
}

/// Partition a date-sorted event stream into successive period snapshots.
///
/// A single pass: each event lands in the snapshot for its period (created
/// lazily and seeded from the previous snapshot when the stream crosses a
/// period boundary), is fanned out to the capital ledger (asset-related events
/// only), the income categorizer and the tax analysis, and marks its accounts
/// as touched. Snapshot valuations are frozen when the stream moves past a
/// period and once more at the end.
pub fn build_snapshots<T: TaxAnalysis>(
    events: &[FinancialEvent],
    periods: &PeriodSet,
    accounts: &mut AccountRegistry,
    prices: &PriceHistory,
    valuer: &dyn Valuation,
) -> Result<SnapshotSeries<T>, AnalysisError> {
    let mut snapshots: Vec<PeriodSnapshot<T>> = Vec::new();

    for event in events {
        // Cached end-date comparison short-circuits the period lookup
        let in_current = snapshots
            .last()
            .is_some_and(|s| event.date <= s.period().end());
        if !in_current {
            let period = periods
                .containing(event.date)
                .ok_or(AnalysisError::DateOutsidePeriods {
                    id: event.id,
                    date: event.date,
                })?
                .clone();
            let next = match snapshots.last_mut() {
                Some(prev) => {
                    prev.freeze(prices);
                    PeriodSnapshot::seeded(period, prev)
                }
                None => PeriodSnapshot::new(period),
            };
            log::debug!("opening snapshot for {}", next.period());
            snapshots.push(next);
        }

        // Unresolvable account references abort the pass
        accounts.get(event.debit)?;
        accounts.get(event.credit)?;
        accounts.touch(event.debit);
        accounts.touch(event.credit);

        let snapshot = snapshots
            .last_mut()
            .expect("a snapshot exists for the current period");
        if event.classification.is_asset_related() {
            snapshot.record_capital(event, valuer);
        }
        snapshot.income.process(event, accounts)?;
        snapshot.tax.process(event);
    }

    if let Some(last) = snapshots.last_mut() {
        last.freeze(prices);
    }

    Ok(SnapshotSeries { snapshots })
}

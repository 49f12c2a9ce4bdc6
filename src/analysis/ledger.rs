use crate::accounts::AccountId;
use crate::events::{Classification, FinancialEvent};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Already-computed cost/unit/gain movements for one asset-related event.
/// Computing these (the cost-basis math) is the valuation component's job;
/// the ledger only records them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapitalDeltas {
    pub cost: Decimal,
    pub units: Decimal,
    pub gain: Decimal,
    /// Unit price implied by the event, where one exists
    pub price: Option<Decimal>,
}

/// Supplies capital deltas for asset-related events
pub trait Valuation {
    fn deltas(&self, event: &FinancialEvent, ledger: &CapitalLedger) -> CapitalDeltas;
}

/// Average-cost valuation: a disposal carries out cost in proportion to the
/// units sold, like a section 104 pool.
#[derive(Debug, Default, Clone, Copy)]
pub struct AverageCost;

impl Valuation for AverageCost {
    fn deltas(&self, event: &FinancialEvent, ledger: &CapitalLedger) -> CapitalDeltas {
        match event.classification {
            Classification::Purchase => {
                let units = event.units.unwrap_or(Decimal::ZERO);
                let price = if units.is_zero() {
                    None
                } else {
                    Some((event.amount / units).round_dp(4))
                };
                CapitalDeltas {
                    cost: event.amount,
                    units,
                    gain: Decimal::ZERO,
                    price,
                }
            }
            Classification::Sale => {
                let units = event.units.unwrap_or(Decimal::ZERO);
                // Selling everything (or more) empties the whole cost basis
                let cost_out = if units >= ledger.total_units() {
                    ledger.total_cost()
                } else {
                    (ledger.total_cost() * units / ledger.total_units()).round_dp(2)
                };
                let price = if units.is_zero() {
                    None
                } else {
                    Some((event.amount / units).round_dp(4))
                };
                CapitalDeltas {
                    cost: -cost_out,
                    units: -units,
                    gain: event.amount - cost_out,
                    price,
                }
            }
            Classification::Dilution => {
                let factor = event.dilution.unwrap_or(Decimal::ONE);
                CapitalDeltas {
                    cost: Decimal::ZERO,
                    units: ledger.total_units() * (factor - Decimal::ONE),
                    gain: Decimal::ZERO,
                    price: None,
                }
            }
            _ => CapitalDeltas::default(),
        }
    }
}

/// One recorded movement in an account's capital ledger. Immutable once
/// appended; equality requires every field to match, including the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub id: usize,
    pub date: NaiveDate,
    pub classification: Classification,
    pub description: String,
    pub delta_cost: Decimal,
    /// Running total cost after this entry
    pub total_cost: Decimal,
    pub delta_units: Decimal,
    /// Running units after this entry
    pub units: Decimal,
    pub price: Option<Decimal>,
    pub delta_gain: Decimal,
    /// Running realised gain after this entry
    pub total_gain: Decimal,
    /// Holding value at this entry's price, where priced
    pub value: Option<Decimal>,
    /// Unrealised profit at this entry's price, where priced
    pub profit: Option<Decimal>,
}

impl LedgerEntry {
    fn key(&self) -> (NaiveDate, Classification, &str, usize) {
        (self.date, self.classification, self.description.as_str(), self.id)
    }
}

/// Append-only cost/units/gain record for one asset-holding account.
///
/// Entries stay sorted by (date, classification, description, id); list-level
/// running totals always equal the latest entry's running totals.
#[derive(Debug, Clone, PartialEq)]
pub struct CapitalLedger {
    account: AccountId,
    entries: Vec<LedgerEntry>,
    total_cost: Decimal,
    total_units: Decimal,
    total_gain: Decimal,
    market_value: Option<Decimal>,
    market_profit: Option<Decimal>,
}

impl CapitalLedger {
    pub fn new(account: AccountId) -> Self {
        CapitalLedger {
            account,
            entries: Vec::new(),
            total_cost: Decimal::ZERO,
            total_units: Decimal::ZERO,
            total_gain: Decimal::ZERO,
            market_value: None,
            market_profit: None,
        }
    }

    pub fn account(&self) -> AccountId {
        self.account
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn total_cost(&self) -> Decimal {
        self.total_cost
    }

    pub fn total_units(&self) -> Decimal {
        self.total_units
    }

    pub fn total_gain(&self) -> Decimal {
        self.total_gain
    }

    /// Holding value at the latest frozen price
    pub fn market_value(&self) -> Option<Decimal> {
        self.market_value
    }

    /// Unrealised profit at the latest frozen price
    pub fn market_profit(&self) -> Option<Decimal> {
        self.market_profit
    }

    /// Record the movements for `event`. Never fails; upstream validation of
    /// account/event consistency is the caller's responsibility.
    pub fn record(&mut self, event: &FinancialEvent, deltas: CapitalDeltas) -> &LedgerEntry {
        let key = (
            event.date,
            event.classification,
            event.description.as_str(),
            event.id,
        );
        let pos = self.entries.partition_point(|e| e.key() < key);
        self.entries.insert(
            pos,
            LedgerEntry {
                id: event.id,
                date: event.date,
                classification: event.classification,
                description: event.description.clone(),
                delta_cost: deltas.cost,
                total_cost: Decimal::ZERO,
                delta_units: deltas.units,
                units: Decimal::ZERO,
                price: deltas.price,
                delta_gain: deltas.gain,
                total_gain: Decimal::ZERO,
                value: None,
                profit: None,
            },
        );
        self.rebuild_from(pos);
        log::debug!(
            "ledger {}: {} cost {:+} units {:+} gain {:+} -> totals cost={} units={} gain={}",
            self.account,
            event.classification,
            deltas.cost,
            deltas.units,
            deltas.gain,
            self.total_cost,
            self.total_units,
            self.total_gain
        );
        &self.entries[pos]
    }

    /// Recompute running totals from `pos` onwards. With a date-sorted stream,
    /// an insertion displaces at most a same-date suffix.
    fn rebuild_from(&mut self, pos: usize) {
        let (mut cost, mut units, mut gain) = match pos.checked_sub(1) {
            Some(i) => {
                let prev = &self.entries[i];
                (prev.total_cost, prev.units, prev.total_gain)
            }
            None => (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO),
        };
        for entry in &mut self.entries[pos..] {
            cost += entry.delta_cost;
            units += entry.delta_units;
            gain += entry.delta_gain;
            entry.total_cost = cost;
            entry.units = units;
            entry.total_gain = gain;
            entry.value = entry.price.map(|p| (units * p).round_dp(2));
            entry.profit = entry.value.map(|v| v - cost);
        }
        self.total_cost = cost;
        self.total_units = units;
        self.total_gain = gain;
    }

    /// Binary search on the entry sort order
    #[allow(dead_code)]
    pub fn find(
        &self,
        date: NaiveDate,
        classification: Classification,
        description: &str,
        id: usize,
    ) -> Option<&LedgerEntry> {
        let key = (date, classification, description, id);
        self.entries
            .binary_search_by(|e| e.key().cmp(&key))
            .ok()
            .map(|i| &self.entries[i])
    }

    /// Fix the market valuation from a period-end price. Absent a price the
    /// valuation stays unset.
    pub fn freeze(&mut self, price: Option<Decimal>) {
        self.market_value = price.map(|p| (self.total_units * p).round_dp(2));
        self.market_profit = self.market_value.map(|v| v - self.total_cost);
    }
}

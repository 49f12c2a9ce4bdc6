//! Snapshots command - per-period capital ledgers and valuations

use crate::analysis::ledger::{AverageCost, CapitalLedger};
use crate::analysis::sequencer::{build_snapshots, PeriodSnapshot};
use crate::cmd::{format_gbp, format_gbp_signed, read_portfolio};
use crate::periods::Period;
use crate::tax::{BandTotals, TaxYear};
use clap::Args;
use std::io;
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct SnapshotsCommand {
    /// Portfolio JSON file. Reads from stdin if not specified.
    #[arg(default_value = "-")]
    file: PathBuf,

    /// Tax year to filter (e.g., 2025 for 2024/25)
    #[arg(short, long)]
    year: Option<i32>,

    /// Show individual ledger entries instead of per-account totals
    #[arg(long)]
    entries: bool,

    /// Output as CSV instead of formatted table
    #[arg(long)]
    csv: bool,
}

impl SnapshotsCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let mut portfolio = read_portfolio(&self.file)?;
        let series = build_snapshots::<BandTotals>(
            &portfolio.events,
            &portfolio.periods,
            &mut portfolio.accounts,
            &portfolio.prices,
            &AverageCost,
        )?;

        let year = self.year.map(TaxYear);
        let snapshots: Vec<&PeriodSnapshot<BandTotals>> = match year {
            Some(y) => series.for_period(&Period::from(y)).into_iter().collect(),
            None => series.iter().collect(),
        };

        if self.entries {
            self.print_entries(&snapshots, &portfolio.accounts)
        } else {
            let rows = holding_rows(&snapshots, &portfolio.accounts);
            if self.csv {
                self.write_csv(&rows)
            } else {
                self.print_table(&rows, year);
                Ok(())
            }
        }
    }

    fn print_table(&self, rows: &[HoldingRow], year: Option<TaxYear>) {
        let year_str = year.map_or("All Years".to_string(), |y| y.display());
        if rows.is_empty() {
            println!("No capital ledgers found ({})", year_str);
            return;
        }

        println!();
        println!("CAPITAL SNAPSHOTS ({})", year_str);
        println!();

        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
    }

    fn print_entries(
        &self,
        snapshots: &[&PeriodSnapshot<BandTotals>],
        accounts: &crate::accounts::AccountRegistry,
    ) -> anyhow::Result<()> {
        for snapshot in snapshots {
            println!();
            println!("Period {}", snapshot.period());
            for ledger in snapshot.ledgers() {
                let name = accounts.name(ledger.account())?;
                println!();
                println!("  {} ({})", name, ledger.account());

                let rows: Vec<EntryRow> = ledger
                    .entries()
                    .iter()
                    .map(|e| EntryRow {
                        date: e.date.format("%Y-%m-%d").to_string(),
                        kind: e.classification.to_string(),
                        description: e.description.clone(),
                        delta_cost: format_gbp_signed(e.delta_cost),
                        cost: format_gbp(e.total_cost),
                        units: e.units.to_string(),
                        gain: format_gbp_signed(e.total_gain),
                    })
                    .collect();

                let table = Table::new(rows)
                    .with(Style::rounded())
                    .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
                    .to_string();
                println!("{}", table);
            }
        }
        Ok(())
    }

    fn write_csv(&self, rows: &[HoldingRow]) -> anyhow::Result<()> {
        let mut wtr = csv::Writer::from_writer(io::stdout());
        for row in rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Row for the per-account holdings table
#[derive(Debug, Clone, Tabled, serde::Serialize)]
struct HoldingRow {
    #[tabled(rename = "Period")]
    period: String,

    #[tabled(rename = "Account")]
    account: String,

    #[tabled(rename = "Cost")]
    cost: String,

    #[tabled(rename = "Units")]
    units: String,

    #[tabled(rename = "Realised Gain")]
    gain: String,

    #[tabled(rename = "Value")]
    value: String,

    #[tabled(rename = "Profit")]
    profit: String,
}

#[derive(Debug, Clone, Tabled)]
struct EntryRow {
    #[tabled(rename = "Date")]
    date: String,

    #[tabled(rename = "Type")]
    kind: String,

    #[tabled(rename = "Description")]
    description: String,

    #[tabled(rename = "Δ Cost")]
    delta_cost: String,

    #[tabled(rename = "Cost")]
    cost: String,

    #[tabled(rename = "Units")]
    units: String,

    #[tabled(rename = "Gain")]
    gain: String,
}

fn holding_rows(
    snapshots: &[&PeriodSnapshot<BandTotals>],
    accounts: &crate::accounts::AccountRegistry,
) -> Vec<HoldingRow> {
    let mut rows = Vec::new();
    for snapshot in snapshots {
        for ledger in snapshot.ledgers() {
            rows.push(HoldingRow {
                period: snapshot.period().label().to_string(),
                account: account_label(accounts, ledger),
                cost: format_gbp(ledger.total_cost()),
                units: ledger.total_units().to_string(),
                gain: format_gbp_signed(ledger.total_gain()),
                value: ledger
                    .market_value()
                    .map_or("-".to_string(), format_gbp),
                profit: ledger
                    .market_profit()
                    .map_or("-".to_string(), format_gbp_signed),
            });
        }
    }
    rows
}

fn account_label(accounts: &crate::accounts::AccountRegistry, ledger: &CapitalLedger) -> String {
    accounts
        .name(ledger.account())
        .map(str::to_string)
        .unwrap_or_else(|_| ledger.account().to_string())
}

//! Income command - categorised income trees per period

use crate::accounts::AccountRegistry;
use crate::analysis::income::{AccountRecord, IncomeCategory, RecordList};
use crate::analysis::ledger::AverageCost;
use crate::analysis::sequencer::build_snapshots;
use crate::cmd::{format_gbp, read_portfolio};
use crate::tax::{BandTotals, TaxBand, TaxYear};
use clap::{Args, ValueEnum};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct IncomeCommand {
    /// Portfolio JSON file. Reads from stdin if not specified.
    #[arg(default_value = "-")]
    file: PathBuf,

    /// Tax year to report (e.g., 2025 for 2024/25)
    #[arg(short, long)]
    year: Option<i32>,

    /// Tax band for the liability estimate
    #[arg(short, long, value_enum, default_value_t = TaxBandArg::Basic)]
    tax_band: TaxBandArg,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum TaxBandArg {
    #[default]
    Basic,
    Higher,
    Additional,
}

impl From<TaxBandArg> for TaxBand {
    fn from(arg: TaxBandArg) -> Self {
        match arg {
            TaxBandArg::Basic => TaxBand::Basic,
            TaxBandArg::Higher => TaxBand::Higher,
            TaxBandArg::Additional => TaxBand::Additional,
        }
    }
}

const CATEGORIES: [IncomeCategory; 3] = [
    IncomeCategory::Salary,
    IncomeCategory::Interest,
    IncomeCategory::Dividend,
];

impl IncomeCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let band: TaxBand = self.tax_band.into();
        let mut portfolio = read_portfolio(&self.file)?;
        let series = build_snapshots::<BandTotals>(
            &portfolio.events,
            &portfolio.periods,
            &mut portfolio.accounts,
            &portfolio.prices,
            &AverageCost,
        )?;

        if series.is_empty() {
            println!("No periods analysed");
            return Ok(());
        }

        let year = self.year.map(TaxYear);
        for snapshot in series
            .iter()
            .filter(|s| year.is_none_or(|y| s.period().tax_year() == y))
        {
            println!();
            println!("INCOME ({})", snapshot.period());

            for category in CATEGORIES {
                let list = snapshot.income().category(category);
                if list.is_empty() {
                    continue;
                }
                println!();
                print_category(category, list, &portfolio.accounts)?;
            }

            let rate_year = snapshot.period().tax_year();
            println!();
            println!(
                "Estimated liability @ {} rate: {}",
                band_name(band),
                format_gbp(snapshot.tax().estimated_liability(rate_year, band))
            );
        }
        Ok(())
    }
}

fn print_category(
    category: IncomeCategory,
    list: &RecordList,
    accounts: &AccountRegistry,
) -> anyhow::Result<()> {
    let totals = list.totals();
    println!(
        "{}: gross {} | net {} | tax {}",
        category,
        format_gbp(totals.gross),
        format_gbp(totals.net),
        format_gbp(totals.tax_credit)
    );
    for record in list.records() {
        print_record(record, accounts, 1)?;
    }
    Ok(())
}

fn print_record(
    record: &AccountRecord,
    accounts: &AccountRegistry,
    depth: usize,
) -> anyhow::Result<()> {
    let indent = "  ".repeat(depth);
    let name = accounts.name(record.account())?;
    let closed = if accounts.is_closed(record.account()) {
        " (closed)"
    } else {
        ""
    };
    let totals = record.totals();
    if record.events().is_empty() {
        println!("{}{}{}", indent, name, closed);
    } else {
        println!(
            "{}{}{}: gross {} | net {} | tax {}",
            indent,
            name,
            closed,
            format_gbp(totals.gross),
            format_gbp(totals.net),
            format_gbp(totals.tax_credit)
        );
    }
    for child in record.children().records() {
        print_record(child, accounts, depth + 1)?;
    }
    Ok(())
}

fn band_name(band: TaxBand) -> &'static str {
    match band {
        TaxBand::Basic => "basic",
        TaxBand::Higher => "higher",
        TaxBand::Additional => "additional",
    }
}

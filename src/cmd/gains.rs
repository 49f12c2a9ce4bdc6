//! Gains command - chargeable gains with top-slicing relief

use crate::analysis::chargeable::ChargeableGains;
use crate::cmd::{format_gbp, income::TaxBandArg, read_portfolio};
use crate::tax::{TaxBand, TaxYear};
use clap::Args;
use rust_decimal::Decimal;
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct GainsCommand {
    /// Portfolio JSON file. Reads from stdin if not specified.
    #[arg(default_value = "-")]
    file: PathBuf,

    /// Tax year whose rates apply (e.g., 2025 for 2024/25)
    #[arg(short, long)]
    year: Option<i32>,

    /// Tax band for the slice taxation
    #[arg(short, long, value_enum, default_value_t = TaxBandArg::Basic)]
    tax_band: TaxBandArg,
}

impl GainsCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let band: TaxBand = self.tax_band.into();
        let portfolio = read_portfolio(&self.file)?;
        let gains = ChargeableGains::from_events(&portfolio.events)?;

        if gains.is_empty() {
            println!("No chargeable gains found");
            return Ok(());
        }

        let rate_year = self.year.map_or_else(
            || {
                gains
                    .entries()
                    .last()
                    .map(|e| TaxYear::from_date(e.date))
                    .unwrap_or(TaxYear(2025))
            },
            TaxYear,
        );

        // Tax is computed once on the combined slice, then apportioned back
        let slice_total = gains.slice_total();
        let slice_tax = (slice_total * rate_year.income_rate(band)).round_dp(2);
        let reliefs = gains.apply_tax(slice_tax, slice_total);

        let rows: Vec<GainRow> = gains
            .entries()
            .iter()
            .zip(&reliefs)
            .map(|(entry, relief)| GainRow {
                date: entry.date.format("%Y-%m-%d").to_string(),
                description: entry.description.clone(),
                amount: format_gbp(entry.amount),
                years: entry.years.to_string(),
                slice: format_gbp(entry.slice),
                tax_paid: format_gbp(entry.tax_paid),
                portion: format_gbp(relief.portion),
                taxation: format_gbp(relief.taxation),
            })
            .collect();

        println!();
        println!(
            "CHARGEABLE GAINS ({}, {} rate)",
            rate_year,
            band_name(band)
        );
        println!();

        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);

        let taxation_total: Decimal = reliefs.iter().map(|r| r.taxation).sum();
        println!();
        println!(
            "Gains: {} | Slice total: {} | Tax on slice: {} | Liability: {} | Paid at source: {}",
            format_gbp(gains.gains_total()),
            format_gbp(slice_total),
            format_gbp(slice_tax),
            format_gbp(taxation_total),
            format_gbp(gains.tax_total())
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Tabled)]
struct GainRow {
    #[tabled(rename = "Date")]
    date: String,

    #[tabled(rename = "Description")]
    description: String,

    #[tabled(rename = "Amount")]
    amount: String,

    #[tabled(rename = "Years")]
    years: String,

    #[tabled(rename = "Slice")]
    slice: String,

    #[tabled(rename = "Paid")]
    tax_paid: String,

    #[tabled(rename = "Portion")]
    portion: String,

    #[tabled(rename = "Taxation")]
    taxation: String,
}

fn band_name(band: TaxBand) -> &'static str {
    match band {
        TaxBand::Basic => "basic",
        TaxBand::Higher => "higher",
        TaxBand::Additional => "additional",
    }
}

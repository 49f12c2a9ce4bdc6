pub mod gains;
pub mod income;
pub mod schema;
pub mod snapshots;

use crate::accounts::{Account, AccountRegistry};
use crate::events::FinancialEvent;
use crate::periods::PeriodSet;
use crate::prices::{PriceHistory, PriceRecord};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Tax years the analysis covers, both given as end years
/// (e.g. 2025 for 2024/25), inclusive
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
pub struct TaxYearRange {
    pub from: i32,
    pub to: i32,
}

/// Portfolio input file (JSON): account registry, optional unit prices and the
/// chronological event stream
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PortfolioInput {
    pub tax_years: TaxYearRange,
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub prices: Vec<PriceRecord>,
    pub events: Vec<FinancialEvent>,
}

/// Loaded portfolio ready for analysis
pub struct Portfolio {
    pub periods: PeriodSet,
    pub accounts: AccountRegistry,
    pub prices: PriceHistory,
    pub events: Vec<FinancialEvent>,
}

impl Portfolio {
    fn load(input: PortfolioInput) -> Self {
        let mut events = input.events;
        events.sort_by_key(|e| (e.date, e.id));
        Portfolio {
            periods: PeriodSet::uk_tax_years(input.tax_years.from, input.tax_years.to),
            accounts: AccountRegistry::new(input.accounts),
            prices: PriceHistory::new(input.prices),
            events,
        }
    }
}

/// Read a portfolio (JSON) from a file, or stdin with "-"
pub fn read_portfolio(path: &Path) -> anyhow::Result<Portfolio> {
    let input = if path.as_os_str() == "-" {
        read_from_stdin()?
    } else {
        let file = File::open(path)?;
        serde_json::from_reader(BufReader::new(file))?
    };
    let portfolio = Portfolio::load(input);
    if portfolio.periods.is_empty() {
        anyhow::bail!("tax_years range covers no periods");
    }
    for period in portfolio.periods.iter() {
        log::debug!("configured period {}", period);
    }
    Ok(portfolio)
}

fn read_from_stdin() -> anyhow::Result<PortfolioInput> {
    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin.lock());

    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;

    if buffer.is_empty() {
        anyhow::bail!("No input received. Provide a file or pipe data to stdin.");
    }

    Ok(serde_json::from_slice(&buffer)?)
}

fn format_gbp(amount: rust_decimal::Decimal) -> String {
    format!("£{:.2}", amount)
}

fn format_gbp_signed(amount: rust_decimal::Decimal) -> String {
    if amount < rust_decimal::Decimal::ZERO {
        format!("-£{:.2}", amount.abs())
    } else {
        format!("£{:.2}", amount)
    }
}

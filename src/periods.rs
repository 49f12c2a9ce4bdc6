use crate::tax::TaxYear;
use chrono::NaiveDate;

/// A reporting period with inclusive start and end dates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    start: NaiveDate,
    end: NaiveDate,
    label: String,
}

impl Period {
    pub fn new(start: NaiveDate, end: NaiveDate, label: impl Into<String>) -> Self {
        Period {
            start,
            end,
            label: label.into(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    // External reporting surface
    #[allow(dead_code)]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn tax_year(&self) -> TaxYear {
        TaxYear::from_date(self.end)
    }
}

impl From<TaxYear> for Period {
    fn from(year: TaxYear) -> Self {
        Period::new(year.start_date(), year.end_date(), year.display())
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// Ordered, contiguous periods. Must cover the entire event range; the engine
/// never synthesizes periods for uncovered dates.
#[derive(Debug, Clone, Default)]
pub struct PeriodSet {
    periods: Vec<Period>,
}

impl PeriodSet {
    pub fn new(periods: Vec<Period>) -> Self {
        PeriodSet { periods }
    }

    /// Contiguous UK tax years, `from` and `to` given as end years
    /// (e.g. 2025 for 2024/25)
    pub fn uk_tax_years(from: i32, to: i32) -> Self {
        PeriodSet::new((from..=to).map(|y| Period::from(TaxYear(y))).collect())
    }

    /// The period containing `date`, or `None` when no period covers it
    pub fn containing(&self, date: NaiveDate) -> Option<&Period> {
        self.periods.iter().find(|p| p.contains(date))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Period> {
        self.periods.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }
}

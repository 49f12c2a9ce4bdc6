use crate::accounts::{AccountId, AccountRegistry};
use crate::error::AnalysisError;
use crate::events::{Classification, FinancialEvent};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Top-level income categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncomeCategory {
    Salary,
    Interest,
    Dividend,
}

impl IncomeCategory {
    pub fn display(&self) -> &'static str {
        match self {
            IncomeCategory::Salary => "Salary",
            IncomeCategory::Interest => "Interest",
            IncomeCategory::Dividend => "Dividend",
        }
    }
}

impl std::fmt::Display for IncomeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Gross / net / tax-credit accumulators
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IncomeTotals {
    pub gross: Decimal,
    pub net: Decimal,
    pub tax_credit: Decimal,
}

impl IncomeTotals {
    fn apply(&mut self, event: &FinancialEvent) {
        match event.classification {
            // NI and benefits count towards gross income only
            Classification::NationalInsurance | Classification::Benefit => {
                self.gross += event.amount;
            }
            _ => {
                self.gross += event.amount;
                self.net += event.amount;
                if let Some(credit) = event.tax_credit {
                    self.gross += credit;
                    self.tax_credit += credit;
                }
            }
        }
    }
}

/// Account nodes keyed by account identity, created lazily on first use.
/// List-level totals cover every descendant node.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RecordList {
    totals: IncomeTotals,
    records: BTreeMap<AccountId, AccountRecord>,
}

impl RecordList {
    pub fn totals(&self) -> IncomeTotals {
        self.totals
    }

    pub fn records(&self) -> impl Iterator<Item = &AccountRecord> {
        self.records.values()
    }

    // Drill-down lookup for external reporting
    #[allow(dead_code)]
    pub fn get(&self, account: AccountId) -> Option<&AccountRecord> {
        self.records.get(&account)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn find_or_create(&mut self, account: AccountId) -> &mut AccountRecord {
        self.records
            .entry(account)
            .or_insert_with(|| AccountRecord::new(account))
    }

    fn process(&mut self, account: AccountId, event: &FinancialEvent) {
        self.totals.apply(event);
        self.find_or_create(account).process(event);
    }
}

/// One node of the income tree: local totals cover the directly attributed
/// leaf events only; deeper events live in the nested child list.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountRecord {
    account: AccountId,
    totals: IncomeTotals,
    children: RecordList,
    events: Vec<FinancialEvent>,
}

impl AccountRecord {
    fn new(account: AccountId) -> Self {
        AccountRecord {
            account,
            totals: IncomeTotals::default(),
            children: RecordList::default(),
            events: Vec::new(),
        }
    }

    pub fn account(&self) -> AccountId {
        self.account
    }

    pub fn totals(&self) -> IncomeTotals {
        self.totals
    }

    pub fn children(&self) -> &RecordList {
        &self.children
    }

    /// Events attributed directly to this node
    pub fn events(&self) -> &[FinancialEvent] {
        &self.events
    }

    fn process(&mut self, event: &FinancialEvent) {
        if event.debit != self.account {
            // Belongs to a descendant of this node
            self.children.process(event.debit, event);
        } else {
            self.totals.apply(event);
            self.events.push(event.clone());
        }
    }
}

/// The three category trees. Events route by classification; unrouted
/// classifications are silently skipped.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct IncomeAnalysis {
    salary: RecordList,
    interest: RecordList,
    dividends: RecordList,
}

impl IncomeAnalysis {
    pub fn category(&self, category: IncomeCategory) -> &RecordList {
        match category {
            IncomeCategory::Salary => &self.salary,
            IncomeCategory::Interest => &self.interest,
            IncomeCategory::Dividend => &self.dividends,
        }
    }

    /// Route and attribute one event.
    ///
    /// Interest attributes to the debit account's parent; dividends to the
    /// parent when the debit account is a sub-account, otherwise to the debit
    /// account itself; salary-type events to the debit account directly.
    pub fn process(
        &mut self,
        event: &FinancialEvent,
        accounts: &AccountRegistry,
    ) -> Result<(), AnalysisError> {
        let routed = match event.classification {
            Classification::Interest => {
                let parent = accounts
                    .parent(event.debit)?
                    .ok_or(AnalysisError::MissingParentAccount(event.debit))?;
                Some((IncomeCategory::Interest, parent))
            }
            Classification::Dividend => {
                let target = match accounts.parent(event.debit)? {
                    Some(parent) => parent,
                    None => event.debit,
                };
                Some((IncomeCategory::Dividend, target))
            }
            Classification::TaxedIncome
            | Classification::Benefit
            | Classification::NationalInsurance => Some((IncomeCategory::Salary, event.debit)),
            _ => None,
        };

        if let Some((category, account)) = routed {
            let list = match category {
                IncomeCategory::Salary => &mut self.salary,
                IncomeCategory::Interest => &mut self.interest,
                IncomeCategory::Dividend => &mut self.dividends,
            };
            list.process(account, event);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::Account;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn registry() -> AccountRegistry {
        AccountRegistry::new(vec![
            Account {
                id: AccountId(1),
                name: "P".to_string(),
                parent: None,
                closed: false,
            },
            Account {
                id: AccountId(2),
                name: "C".to_string(),
                parent: Some(AccountId(1)),
                closed: false,
            },
            Account {
                id: AccountId(3),
                name: "Q".to_string(),
                parent: Some(AccountId(1)),
                closed: false,
            },
            Account {
                id: AccountId(4),
                name: "R".to_string(),
                parent: None,
                closed: false,
            },
        ])
    }

    fn event(
        id: usize,
        classification: Classification,
        debit: AccountId,
        amount: Decimal,
        tax_credit: Option<Decimal>,
    ) -> FinancialEvent {
        FinancialEvent {
            id,
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            classification,
            debit,
            credit: AccountId(9),
            amount,
            tax_credit,
            units: None,
            dilution: None,
            years: None,
            description: String::new(),
        }
    }

    #[test]
    fn dividend_from_child_attributes_under_parent() {
        let registry = registry();
        let mut analysis = IncomeAnalysis::default();
        analysis
            .process(
                &event(1, Classification::Dividend, AccountId(2), dec!(1000), Some(dec!(100))),
                &registry,
            )
            .unwrap();

        let root = analysis.category(IncomeCategory::Dividend);
        assert_eq!(root.totals().gross, dec!(1100));
        assert_eq!(root.totals().net, dec!(1000));
        assert_eq!(root.totals().tax_credit, dec!(100));

        // Node for the parent exists; the event sits on the child beneath it
        let parent = root.get(AccountId(1)).unwrap();
        assert!(parent.events().is_empty());
        assert_eq!(parent.totals(), IncomeTotals::default());

        let child = parent.children().get(AccountId(2)).unwrap();
        assert_eq!(child.events().len(), 1);
        assert_eq!(child.totals().gross, dec!(1100));
        assert_eq!(child.totals().net, dec!(1000));
        assert_eq!(child.totals().tax_credit, dec!(100));
    }

    #[test]
    fn dividend_from_top_level_account_attributes_directly() {
        let registry = registry();
        let mut analysis = IncomeAnalysis::default();
        analysis
            .process(
                &event(1, Classification::Dividend, AccountId(4), dec!(500), None),
                &registry,
            )
            .unwrap();

        let root = analysis.category(IncomeCategory::Dividend);
        let node = root.get(AccountId(4)).unwrap();
        assert_eq!(node.events().len(), 1);
        assert_eq!(node.totals().gross, dec!(500));
        assert_eq!(node.totals().net, dec!(500));
    }

    #[test]
    fn interest_requires_a_parent() {
        let registry = registry();
        let mut analysis = IncomeAnalysis::default();
        let err = analysis
            .process(
                &event(1, Classification::Interest, AccountId(4), dec!(50), None),
                &registry,
            )
            .unwrap_err();
        assert_eq!(err, AnalysisError::MissingParentAccount(AccountId(4)));
    }

    #[test]
    fn ni_and_benefit_count_towards_gross_only() {
        let registry = registry();
        let mut analysis = IncomeAnalysis::default();
        analysis
            .process(
                &event(1, Classification::NationalInsurance, AccountId(4), dec!(200), None),
                &registry,
            )
            .unwrap();
        analysis
            .process(
                &event(2, Classification::Benefit, AccountId(4), dec!(75), None),
                &registry,
            )
            .unwrap();

        let root = analysis.category(IncomeCategory::Salary);
        assert_eq!(root.totals().gross, dec!(275));
        assert_eq!(root.totals().net, Decimal::ZERO);
        assert_eq!(root.totals().tax_credit, Decimal::ZERO);
    }

    #[test]
    fn unrouted_classifications_are_skipped() {
        let registry = registry();
        let mut analysis = IncomeAnalysis::default();
        analysis
            .process(
                &event(1, Classification::Transfer, AccountId(4), dec!(9999), None),
                &registry,
            )
            .unwrap();

        assert!(analysis.category(IncomeCategory::Salary).is_empty());
        assert!(analysis.category(IncomeCategory::Interest).is_empty());
        assert!(analysis.category(IncomeCategory::Dividend).is_empty());
    }

    #[test]
    fn three_event_categorisation_scenario() {
        // Dividend £1,000 (credit £100) from child C of P; interest £50 from
        // child Q of P; NI £200 from R
        let registry = registry();
        let mut analysis = IncomeAnalysis::default();
        analysis
            .process(
                &event(1, Classification::Dividend, AccountId(2), dec!(1000), Some(dec!(100))),
                &registry,
            )
            .unwrap();
        analysis
            .process(
                &event(2, Classification::Interest, AccountId(3), dec!(50), None),
                &registry,
            )
            .unwrap();
        analysis
            .process(
                &event(3, Classification::NationalInsurance, AccountId(4), dec!(200), None),
                &registry,
            )
            .unwrap();

        let dividends = analysis.category(IncomeCategory::Dividend).totals();
        assert_eq!(dividends.gross, dec!(1100));
        assert_eq!(dividends.net, dec!(1000));
        assert_eq!(dividends.tax_credit, dec!(100));

        let interest = analysis.category(IncomeCategory::Interest).totals();
        assert_eq!(interest.gross, dec!(50));
        assert_eq!(interest.net, dec!(50));

        let salary = analysis.category(IncomeCategory::Salary).totals();
        assert_eq!(salary.gross, dec!(200));
        assert_eq!(salary.net, Decimal::ZERO);

        // Each event attributed to exactly one node
        assert!(analysis
            .category(IncomeCategory::Dividend)
            .get(AccountId(1))
            .unwrap()
            .children()
            .get(AccountId(2))
            .is_some());
        assert!(analysis
            .category(IncomeCategory::Interest)
            .get(AccountId(1))
            .unwrap()
            .children()
            .get(AccountId(3))
            .is_some());
        assert_eq!(
            analysis
                .category(IncomeCategory::Salary)
                .get(AccountId(4))
                .unwrap()
                .events()
                .len(),
            1
        );
    }
}

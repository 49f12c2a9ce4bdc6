use crate::error::AnalysisError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Stable account identifier
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct AccountId(pub u32);

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An account in the flat registry. Hierarchy is expressed through `parent`;
/// one level of nesting is all the income trees ever use.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    #[serde(default)]
    pub parent: Option<AccountId>,
    #[serde(default)]
    pub closed: bool,
}

/// All known accounts, plus which of them the analysed stream touched
#[derive(Debug, Clone, Default)]
pub struct AccountRegistry {
    accounts: BTreeMap<AccountId, Account>,
    touched: BTreeSet<AccountId>,
}

impl AccountRegistry {
    pub fn new(accounts: impl IntoIterator<Item = Account>) -> Self {
        AccountRegistry {
            accounts: accounts.into_iter().map(|a| (a.id, a)).collect(),
            touched: BTreeSet::new(),
        }
    }

    pub fn get(&self, id: AccountId) -> Result<&Account, AnalysisError> {
        self.accounts
            .get(&id)
            .ok_or(AnalysisError::UnknownAccount(id))
    }

    pub fn name(&self, id: AccountId) -> Result<&str, AnalysisError> {
        self.get(id).map(|a| a.name.as_str())
    }

    pub fn parent(&self, id: AccountId) -> Result<Option<AccountId>, AnalysisError> {
        self.get(id).map(|a| a.parent)
    }

    /// Whether `id` is a sub-account of `parent`
    #[allow(dead_code)]
    pub fn is_child(&self, id: AccountId, parent: AccountId) -> bool {
        self.accounts
            .get(&id)
            .is_some_and(|a| a.parent == Some(parent))
    }

    pub fn is_closed(&self, id: AccountId) -> bool {
        self.accounts.get(&id).is_some_and(|a| a.closed)
    }

    pub fn touch(&mut self, id: AccountId) {
        self.touched.insert(id);
    }

    // External reporting surface
    #[allow(dead_code)]
    pub fn is_touched(&self, id: AccountId) -> bool {
        self.touched.contains(&id)
    }

    #[allow(dead_code)]
    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }
}

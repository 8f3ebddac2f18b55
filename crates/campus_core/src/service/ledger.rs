//! Ledger totals over the current semester's accounting entries.

use crate::model::entities::{AccountingItem, TransactionKind};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LedgerTotals {
    pub income: f64,
    pub expense: f64,
}

impl LedgerTotals {
    pub fn balance(&self) -> f64 {
        self.income - self.expense
    }
}

/// Income and expense sums; transfers are neutral.
pub fn totals(items: &[AccountingItem]) -> LedgerTotals {
    items
        .iter()
        .fold(LedgerTotals::default(), |mut totals, item| {
            match item.kind {
                TransactionKind::Income => totals.income += item.amount,
                TransactionKind::Expense => totals.expense += item.amount,
                TransactionKind::Transfer => {}
            }
            totals
        })
}

/// Balance per payment method.
///
/// Every configured method appears, even at zero. Methods only referenced by
/// entries are added. A transfer without a target is ignored.
pub fn balances(methods: &[String], items: &[AccountingItem]) -> BTreeMap<String, f64> {
    let mut balances: BTreeMap<String, f64> =
        methods.iter().map(|method| (method.clone(), 0.0)).collect();

    for item in items {
        match (item.kind, item.to_method.as_deref()) {
            (TransactionKind::Income, _) => {
                *balances.entry(item.method.clone()).or_default() += item.amount;
            }
            (TransactionKind::Expense, _) => {
                *balances.entry(item.method.clone()).or_default() -= item.amount;
            }
            (TransactionKind::Transfer, Some(target)) => {
                *balances.entry(item.method.clone()).or_default() -= item.amount;
                *balances.entry(target.to_string()).or_default() += item.amount;
            }
            (TransactionKind::Transfer, None) => {}
        }
    }
    balances
}

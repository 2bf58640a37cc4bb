//! Income projection and treasury ledger
//!
//! The income projection is a pure function of a CV score, cumulative
//! valuation units and a tier. The treasury is the one piece of shared
//! mutable state in the core: a platform-wide balance fed by contributions
//! and reduced by deductions. It is held as signed micro-units in an
//! [`AtomicI64`] updated with checked compare-and-set loops, so any replay
//! order of the same entries reaches the same balance. An entry that would
//! push the balance or a running total outside the `i64` micro-unit range
//! is rejected with a warning and leaves the account untouched.

use crate::coefficients::{IncomeCoefficients, TreasuryCoefficients};
use crate::cv::CvLevel;
use crate::types::Valuation;
use crate::utils::numeric::{
    from_micros, non_negative_or_zero, round_amount, to_micros, MICROS_PER_UNIT,
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::warn;

/// Clamp an income figure into `[0, cap]`
///
/// Idempotent: capping an already-capped value returns it unchanged.
pub fn apply_cap(income: f64, cap: f64) -> f64 {
    if income.is_nan() || income <= 0.0 {
        0.0
    } else {
        income.min(non_negative_or_zero(cap))
    }
}

/// Projected monthly income
///
/// `cv_score × per_cv_point + units × per_unit + level bonus`, rounded to two
/// decimals and capped. Negative or non-finite inputs count as zero, so
/// the result always lies in `[0, monthly_cap]`.
pub fn monthly_income(
    cv_score: f64,
    cumulative_units: f64,
    level: CvLevel,
    income: &IncomeCoefficients,
) -> f64 {
    let bonus = match level {
        CvLevel::Junior => income.level_bonus.junior,
        CvLevel::Middle => income.level_bonus.middle,
        CvLevel::Senior => income.level_bonus.senior,
    };

    let raw = non_negative_or_zero(cv_score) * income.per_cv_point
        + non_negative_or_zero(cumulative_units) * income.per_unit
        + bonus;

    apply_cap(round_amount(raw), income.monthly_cap)
}

/// One historical treasury movement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum LedgerEntry {
    Contribution(f64),
    Deduction(f64),
}

/// Point-in-time view of a treasury account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreasurySnapshot {
    pub balance: f64,
    pub total_contributions: f64,
    pub total_deductions: f64,
}

/// Platform treasury balance
///
/// Safe to share across threads behind an `Arc`; updates never lose writes.
#[derive(Debug, Default)]
pub struct TreasuryAccount {
    balance: AtomicI64,
    contributions: AtomicI64,
    deductions: AtomicI64,
}

impl TreasuryAccount {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account opened with a starting balance
    pub fn with_balance(initial: f64) -> Self {
        let account = Self::new();
        if let Some(micros) = checked_micros("opening balance", initial) {
            account.balance.store(micros, Ordering::SeqCst);
        }
        account
    }

    /// Rebuild an account from its history
    pub fn replay(initial: f64, entries: &[LedgerEntry]) -> Self {
        let account = Self::with_balance(initial);
        for entry in entries {
            account.apply(*entry);
        }
        account
    }

    pub fn apply(&self, entry: LedgerEntry) -> bool {
        match entry {
            LedgerEntry::Contribution(amount) => self.contribute(amount),
            LedgerEntry::Deduction(amount) => self.deduct(amount),
        }
    }

    /// Add to the balance; returns false when the entry was rejected
    pub fn contribute(&self, amount: f64) -> bool {
        match checked_micros("contribution", amount) {
            Some(micros) => self.post("contribution", &self.contributions, micros, micros),
            None => false,
        }
    }

    /// Take from the balance; returns false when the entry was rejected
    pub fn deduct(&self, amount: f64) -> bool {
        match checked_micros("deduction", amount) {
            Some(micros) => self.post("deduction", &self.deductions, micros, -micros),
            None => false,
        }
    }

    /// Move the running total and the balance together, or neither
    fn post(&self, kind: &str, total: &AtomicI64, micros: i64, delta: i64) -> bool {
        if total
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |t| t.checked_add(micros))
            .is_err()
        {
            warn!("Rejecting treasury {}: running total would overflow", kind);
            return false;
        }

        if self
            .balance
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |b| b.checked_add(delta))
            .is_err()
        {
            // Wrapping subtraction is the exact inverse of the add above
            total.fetch_sub(micros, Ordering::SeqCst);
            warn!("Rejecting treasury {}: balance would overflow", kind);
            return false;
        }

        true
    }

    pub fn balance(&self) -> f64 {
        from_micros(self.balance.load(Ordering::SeqCst))
    }

    pub fn snapshot(&self) -> TreasurySnapshot {
        TreasurySnapshot {
            balance: self.balance(),
            total_contributions: from_micros(self.contributions.load(Ordering::SeqCst)),
            total_deductions: from_micros(self.deductions.load(Ordering::SeqCst)),
        }
    }
}

/// Micro-units of an amount, or `None` when it is not representable
fn checked_micros(kind: &str, amount: f64) -> Option<i64> {
    if !amount.is_finite() {
        warn!("Ignoring non-finite treasury {} {}", kind, amount);
        return None;
    }
    if (amount * MICROS_PER_UNIT).abs() >= i64::MAX as f64 {
        warn!("Rejecting treasury {} {}: outside the micro-unit range", kind, amount);
        return None;
    }
    Some(to_micros(amount))
}

/// Share of a valuation owed to the treasury
pub fn contribution_for(valuation: &Valuation, treasury: &TreasuryCoefficients) -> f64 {
    non_negative_or_zero(valuation.amount) * treasury.contribution_rate
}

/// Tax withheld on an amount
pub fn tax_for(amount: f64, treasury: &TreasuryCoefficients) -> f64 {
    non_negative_or_zero(amount) * treasury.tax_rate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coefficients::CoefficientTable;
    use std::sync::Arc;
    use std::thread;

    fn income() -> IncomeCoefficients {
        CoefficientTable::default().income
    }

    #[test]
    fn test_monthly_income_formula() {
        // 100 × 5 + 200 × 0.5 + 300 (middle bonus)
        assert_eq!(monthly_income(100.0, 200.0, CvLevel::Middle, &income()), 900.0);
        assert_eq!(monthly_income(0.0, 0.0, CvLevel::Junior, &income()), 100.0);
    }

    #[test]
    fn test_monthly_income_is_capped() {
        let income = income();
        assert_eq!(
            monthly_income(1e12, 1e12, CvLevel::Senior, &income),
            income.monthly_cap
        );
        assert_eq!(
            monthly_income(f64::INFINITY, f64::NAN, CvLevel::Senior, &income),
            income.level_bonus.senior
        );
    }

    #[test]
    fn test_apply_cap_is_idempotent() {
        let once = apply_cap(7500.0, 5000.0);
        assert_eq!(once, 5000.0);
        assert_eq!(apply_cap(once, 5000.0), once);
        assert_eq!(apply_cap(-3.0, 5000.0), 0.0);
    }

    #[test]
    fn test_replay_is_order_independent() {
        let entries = [
            LedgerEntry::Contribution(10.0),
            LedgerEntry::Contribution(5.0),
            LedgerEntry::Deduction(3.0),
        ];
        let orders = [
            [0, 1, 2],
            [0, 2, 1],
            [1, 0, 2],
            [1, 2, 0],
            [2, 0, 1],
            [2, 1, 0],
        ];

        for order in orders {
            let permuted: Vec<LedgerEntry> = order.iter().map(|i| entries[*i]).collect();
            let account = TreasuryAccount::replay(100.0, &permuted);
            assert_eq!(account.balance(), 112.0);
        }
    }

    #[test]
    fn test_snapshot_tracks_totals() {
        let account = TreasuryAccount::with_balance(1.5);
        account.contribute(2.25);
        account.deduct(0.75);
        account.contribute(f64::NAN);

        let snapshot = account.snapshot();
        assert_eq!(snapshot.balance, 3.0);
        assert_eq!(snapshot.total_contributions, 2.25);
        assert_eq!(snapshot.total_deductions, 0.75);
    }

    #[test]
    fn test_concurrent_updates_are_not_lost() {
        let account = Arc::new(TreasuryAccount::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let account = Arc::clone(&account);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        account.contribute(0.01);
                        account.deduct(0.005);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(account.balance(), 40.0);
    }

    #[test]
    fn test_overflowing_entries_are_rejected() {
        let account = TreasuryAccount::new();
        assert!(account.contribute(6e12));
        // 1.2e19 micro-units does not fit in an i64
        assert!(!account.contribute(6e12));
        assert!(!account.contribute(1e13));

        let snapshot = account.snapshot();
        assert_eq!(snapshot.balance, 6e12);
        assert_eq!(snapshot.total_contributions, 6e12);
        assert_eq!(snapshot.total_deductions, 0.0);
    }

    #[test]
    fn test_balance_overflow_leaves_totals_untouched() {
        let account = TreasuryAccount::with_balance(6e12);
        // The running total fits, the balance would not
        assert!(!account.contribute(5e12));

        let snapshot = account.snapshot();
        assert_eq!(snapshot.balance, 6e12);
        assert_eq!(snapshot.total_contributions, 0.0);

        let debtor = TreasuryAccount::with_balance(-6e12);
        assert!(!debtor.deduct(5e12));
        assert_eq!(debtor.balance(), -6e12);
        assert_eq!(debtor.snapshot().total_deductions, 0.0);
        assert!(debtor.deduct(1e12));
        assert_eq!(debtor.balance(), -7e12);
    }

    #[test]
    fn test_unrepresentable_opening_balance_is_ignored() {
        assert_eq!(TreasuryAccount::with_balance(1e13).balance(), 0.0);
        assert_eq!(TreasuryAccount::with_balance(f64::INFINITY).balance(), 0.0);
    }

    #[test]
    fn test_contribution_and_tax() {
        let table = CoefficientTable::default();
        let valuation = Valuation {
            amount: 50.0,
            estimated_cost: 0.1,
            impact_points: 5.0,
        };
        assert_eq!(contribution_for(&valuation, &table.treasury), 5.0);
        assert_eq!(tax_for(200.0, &table.treasury), 10.0);
        assert_eq!(tax_for(-5.0, &table.treasury), 0.0);
    }

    #[test]
    fn test_ledger_entry_serde_shape() {
        let json = serde_json::to_string(&LedgerEntry::Deduction(3.0)).unwrap();
        assert_eq!(json, r#"{"kind":"deduction","amount":3.0}"#);
    }
}

//! Debt payoff simulation for snowball and avalanche orderings.

use serde::Serialize;

use kassa_domain::{Debt, PaymentStrategy, PayoffOrdering};

use crate::{display::round2, CoreError};

/// Hard stop for simulations that never converge (50 years).
pub const MAX_SIMULATION_MONTHS: u32 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PayoffResult {
    pub months: u32,
    /// Rounded to cents once the simulation has finished.
    pub total_interest: f64,
    /// True when the month cap stopped the simulation with balances left.
    pub capped: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PayoffComparison {
    pub strategy: PaymentStrategy,
    pub snowball: PayoffResult,
    pub avalanche: PayoffResult,
}

pub struct DebtService;

impl DebtService {
    /// Checks the fields a new debt must satisfy before it is stored.
    pub fn validate(debt: &Debt) -> Result<(), CoreError> {
        if debt.name.trim().is_empty() {
            return Err(CoreError::Validation("debt name must not be empty".into()));
        }
        if !debt.amount.is_finite() || debt.amount <= 0.0 {
            return Err(CoreError::Validation("debt amount must be greater than 0".into()));
        }
        if !debt.rate.is_finite() || debt.rate < 0.0 {
            return Err(CoreError::Validation("interest rate must be 0 or more".into()));
        }
        if !debt.min_payment.is_finite() || debt.min_payment <= 0.0 {
            return Err(CoreError::Validation(
                "minimum payment must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Copies `debts` into simulation order. Sorting is stable.
    pub fn order(debts: &[Debt], ordering: PayoffOrdering) -> Vec<Debt> {
        let mut ordered = debts.to_vec();
        match ordering {
            PayoffOrdering::Snowball => ordered.sort_by(|a, b| a.amount.total_cmp(&b.amount)),
            PayoffOrdering::Avalanche => ordered.sort_by(|a, b| b.rate.total_cmp(&a.rate)),
        }
        ordered
    }

    pub fn simulate(
        debts: &[Debt],
        ordering: PayoffOrdering,
        strategy: PaymentStrategy,
    ) -> PayoffResult {
        let ordered = Self::order(debts, ordering);
        let mut balances: Vec<f64> = ordered.iter().map(|debt| debt.amount).collect();
        let budget: f64 = ordered.iter().map(|debt| debt.min_payment).sum();
        let mut total_interest = 0.0;
        let mut months = 0;

        while balances.iter().any(|balance| *balance > 0.0) && months < MAX_SIMULATION_MONTHS {
            months += 1;
            let mut paid = 0.0;
            for (debt, balance) in ordered.iter().zip(balances.iter_mut()) {
                if *balance <= 0.0 {
                    continue;
                }
                let interest = *balance * debt.monthly_rate();
                total_interest += interest;
                *balance += interest;
                let payment = debt.min_payment.min(*balance);
                *balance -= payment;
                paid += payment;
            }

            if strategy == PaymentStrategy::Rollover {
                let mut extra = budget - paid;
                for balance in balances.iter_mut() {
                    if extra <= 0.0 {
                        break;
                    }
                    if *balance <= 0.0 {
                        continue;
                    }
                    let payment = extra.min(*balance);
                    *balance -= payment;
                    extra -= payment;
                }
            }
        }

        let capped = balances.iter().any(|balance| *balance > 0.0);
        if capped {
            tracing::warn!(%ordering, months, "debt simulation hit the month cap");
        }
        PayoffResult {
            months,
            total_interest: round2(total_interest),
            capped,
        }
    }

    /// Runs both orderings with the same payment strategy.
    pub fn compare(debts: &[Debt], strategy: PaymentStrategy) -> PayoffComparison {
        PayoffComparison {
            strategy,
            snowball: Self::simulate(debts, PayoffOrdering::Snowball, strategy),
            avalanche: Self::simulate(debts, PayoffOrdering::Avalanche, strategy),
        }
    }
}

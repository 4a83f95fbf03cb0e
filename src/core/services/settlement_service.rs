//! Greedy settlement planning.
//!
//! Repeatedly pairs the largest creditor with the largest debtor. This is a
//! heuristic rather than a proven minimum, but it never needs more than
//! `members - 1` transfers and is fully deterministic.
//!
//! Balances arrive already rounded to minor units, so the smallest non-zero
//! balance is exactly one minor unit (`epsilon`). A member counts as a
//! creditor when the balance is `>= epsilon` and as a debtor when it is
//! `<= -epsilon`; with strict comparisons a one-cent debt would never be
//! settled.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::MemberId;
use crate::errors::LedgerError;

use super::{BalanceSheet, ServiceResult};

/// A single payment from a debtor to a creditor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transfer {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Decimal,
}

#[derive(Debug, Clone)]
struct Position {
    member_id: MemberId,
    /// Always positive: credit for creditors, debt for debtors.
    remaining: Decimal,
}

pub struct SettlementService;

impl SettlementService {
    pub fn plan(sheet: &BalanceSheet) -> ServiceResult<Vec<Transfer>> {
        let balances = sheet
            .balances
            .iter()
            .map(|entry| (entry.member_id.clone(), entry.balance));
        Self::plan_balances(balances, sheet.currency.epsilon())
    }

    /// Plans transfers for a raw balance map. Balances with magnitude below
    /// `epsilon` count as settled.
    pub fn plan_balances(
        balances: impl IntoIterator<Item = (MemberId, Decimal)>,
        epsilon: Decimal,
    ) -> ServiceResult<Vec<Transfer>> {
        let balances: BTreeMap<MemberId, Decimal> = balances.into_iter().collect();
        let net = balances
            .values()
            .try_fold(Decimal::ZERO, |total, balance| total.checked_add(*balance))
            .ok_or_else(|| Self::inconsistent("balances are too large to total".to_string()))?;
        if net.abs() >= epsilon {
            return Err(Self::inconsistent(format!(
                "balances sum to {} instead of zero",
                net
            )));
        }

        let mut creditors = Vec::new();
        let mut debtors = Vec::new();
        for (member_id, balance) in &balances {
            if *balance >= epsilon {
                creditors.push(Position {
                    member_id: member_id.clone(),
                    remaining: *balance,
                });
            } else if *balance <= -epsilon {
                debtors.push(Position {
                    member_id: member_id.clone(),
                    remaining: -*balance,
                });
            }
        }

        let mut transfers = Vec::new();
        while let (Some(ci), Some(di)) = (Self::largest(&creditors), Self::largest(&debtors)) {
            let amount = creditors[ci].remaining.min(debtors[di].remaining);
            transfers.push(Transfer {
                from: debtors[di].member_id.clone(),
                to: creditors[ci].member_id.clone(),
                amount,
            });
            creditors[ci].remaining -= amount;
            debtors[di].remaining -= amount;
            if creditors[ci].remaining < epsilon {
                creditors.remove(ci);
            }
            if debtors[di].remaining < epsilon {
                debtors.remove(di);
            }
        }

        if let Some(stray) = creditors.first().or(debtors.first()) {
            return Err(Self::inconsistent(format!(
                "member {} is left with an unmatched balance of {}",
                stray.member_id, stray.remaining
            )));
        }

        let residuals = Self::residuals(&balances, &transfers);
        if let Some((member_id, residual)) = residuals
            .iter()
            .find(|(_, residual)| residual.abs() >= epsilon)
        {
            return Err(Self::inconsistent(format!(
                "plan leaves {} with a balance of {}",
                member_id, residual
            )));
        }
        Ok(transfers)
    }

    /// Balances remaining after every transfer has been paid.
    pub fn residuals(
        balances: &BTreeMap<MemberId, Decimal>,
        transfers: &[Transfer],
    ) -> BTreeMap<MemberId, Decimal> {
        let mut remaining = balances.clone();
        for transfer in transfers {
            *remaining.entry(transfer.from.clone()).or_default() += transfer.amount;
            *remaining.entry(transfer.to.clone()).or_default() -= transfer.amount;
        }
        remaining
    }

    /// Index of the largest remaining amount; ties go to the lower member id.
    fn largest(positions: &[Position]) -> Option<usize> {
        positions
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| {
                a.remaining
                    .cmp(&b.remaining)
                    .then_with(|| b.member_id.cmp(&a.member_id))
            })
            .map(|(index, _)| index)
    }

    fn inconsistent(message: String) -> LedgerError {
        tracing::error!(%message, "settlement planning failed");
        LedgerError::internal(message)
    }
}

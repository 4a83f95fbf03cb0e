//! Derives owed shares and net member balances from the expense list.
//!
//! Every share is rounded half-to-even to the currency's minor unit, and the
//! rounding remainder of an expense is absorbed by its first listed
//! participant. Shares therefore always sum exactly to the expense amount, and
//! balances always sum exactly to zero.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::Serialize;

use crate::currency::{round_money, CurrencyCode};
use crate::domain::{Expense, Group, MemberId, SplitRule};
use crate::errors::LedgerError;

use super::ServiceResult;

/// One participant's owed portion of a single expense.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareLine {
    pub member_id: MemberId,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberBalance {
    pub member_id: MemberId,
    pub name: String,
    /// Total paid as payer.
    pub paid: Decimal,
    /// Total owed as participant.
    pub owed: Decimal,
    /// `paid - owed`; positive means the group owes this member.
    pub balance: Decimal,
}

/// Per-member balances in member order, plus the group's total spend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceSheet {
    pub currency: CurrencyCode,
    pub total_spent: Decimal,
    pub balances: Vec<MemberBalance>,
}

impl BalanceSheet {
    pub fn get(&self, id: &MemberId) -> Option<&MemberBalance> {
        self.balances.iter().find(|entry| &entry.member_id == id)
    }

    pub fn balance_of(&self, id: &MemberId) -> Decimal {
        self.get(id).map_or(Decimal::ZERO, |entry| entry.balance)
    }

    pub fn net_total(&self) -> Decimal {
        self.balances.iter().map(|entry| entry.balance).sum()
    }

    pub fn as_map(&self) -> BTreeMap<MemberId, Decimal> {
        self.balances
            .iter()
            .map(|entry| (entry.member_id.clone(), entry.balance))
            .collect()
    }
}

pub struct BalanceService;

impl BalanceService {
    /// Owed shares for one expense, in `participant_ids` order.
    pub fn shares(expense: &Expense, minor_units: u32) -> ServiceResult<Vec<ShareLine>> {
        let participants = &expense.participant_ids;
        if participants.is_empty() {
            return Err(LedgerError::internal(format!(
                "expense {} has no participants",
                expense.id
            )));
        }
        let amount = expense.amount;
        let overflow = || Self::overflow(expense);
        let raw: Vec<Decimal> = match &expense.split {
            SplitRule::Equal => {
                let count = Decimal::from(participants.len());
                let each = amount.checked_div(count).ok_or_else(overflow)?;
                vec![each; participants.len()]
            }
            SplitRule::Shares(weights) => {
                let total: u64 = weights.values().map(|weight| u64::from(*weight)).sum();
                if total == 0 {
                    return Err(LedgerError::internal(format!(
                        "expense {} has a zero total share weight",
                        expense.id
                    )));
                }
                let total = Decimal::from(total);
                participants
                    .iter()
                    .map(|id| {
                        let weight = Self::detail(expense, weights, id)?;
                        amount
                            .checked_mul(Decimal::from(weight))
                            .and_then(|scaled| scaled.checked_div(total))
                            .ok_or_else(overflow)
                    })
                    .collect::<ServiceResult<_>>()?
            }
            SplitRule::Percentage(percentages) => participants
                .iter()
                .map(|id| {
                    let pct = Self::detail(expense, percentages, id)?;
                    amount
                        .checked_mul(pct)
                        .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
                        .ok_or_else(overflow)
                })
                .collect::<ServiceResult<_>>()?,
            SplitRule::Custom(amounts) => participants
                .iter()
                .map(|id| Self::detail(expense, amounts, id))
                .collect::<ServiceResult<_>>()?,
        };

        let mut lines: Vec<ShareLine> = participants
            .iter()
            .zip(raw)
            .map(|(id, value)| ShareLine {
                member_id: id.clone(),
                amount: round_money(value, minor_units),
            })
            .collect();
        let remainder = lines
            .iter()
            .try_fold(Decimal::ZERO, |total, line| total.checked_add(line.amount))
            .and_then(|allocated| amount.checked_sub(allocated))
            .ok_or_else(overflow)?;
        if let Some(first) = lines.first_mut() {
            first.amount = first.amount.checked_add(remainder).ok_or_else(overflow)?;
        }
        Ok(lines)
    }

    /// Balances for every member of `group`.
    pub fn compute(group: &Group) -> ServiceResult<BalanceSheet> {
        let minor_units = group.currency.minor_units();
        let mut paid: HashMap<&MemberId, Decimal> = HashMap::new();
        let mut owed: HashMap<MemberId, Decimal> = HashMap::new();
        let mut total_spent = Decimal::ZERO;

        for expense in &group.expenses {
            if !group.has_member(&expense.payer_id) {
                return Err(Self::inconsistent(format!(
                    "expense {} is paid by unknown member {}",
                    expense.id, expense.payer_id
                )));
            }
            let overflow = || Self::overflow(expense);
            let paid_so_far = paid.entry(&expense.payer_id).or_default();
            *paid_so_far = paid_so_far.checked_add(expense.amount).ok_or_else(overflow)?;
            total_spent = total_spent.checked_add(expense.amount).ok_or_else(overflow)?;
            for line in Self::shares(expense, minor_units)? {
                if !group.has_member(&line.member_id) {
                    return Err(Self::inconsistent(format!(
                        "expense {} is shared with unknown member {}",
                        expense.id, line.member_id
                    )));
                }
                let owed_so_far = owed.entry(line.member_id).or_default();
                *owed_so_far = owed_so_far.checked_add(line.amount).ok_or_else(overflow)?;
            }
        }

        let balances: Vec<MemberBalance> = group
            .members
            .iter()
            .map(|member| {
                let paid = paid.get(&member.id).copied().unwrap_or_default();
                let owed = owed.get(&member.id).copied().unwrap_or_default();
                let balance = paid.checked_sub(owed).ok_or_else(|| {
                    Self::inconsistent(format!("balance of member {} overflowed", member.id))
                })?;
                Ok(MemberBalance {
                    member_id: member.id.clone(),
                    name: member.name.clone(),
                    paid,
                    owed,
                    balance: round_money(balance, minor_units),
                })
            })
            .collect::<ServiceResult<_>>()?;

        let sheet = BalanceSheet {
            currency: group.currency.clone(),
            total_spent,
            balances,
        };
        let net = sheet.net_total();
        if !net.is_zero() {
            return Err(Self::inconsistent(format!(
                "member balances sum to {} instead of zero",
                net
            )));
        }
        Ok(sheet)
    }

    fn detail<T: Copy>(
        expense: &Expense,
        details: &BTreeMap<MemberId, T>,
        id: &MemberId,
    ) -> ServiceResult<T> {
        details.get(id).copied().ok_or_else(|| {
            LedgerError::internal(format!(
                "expense {} has no {} split entry for {}",
                expense.id,
                expense.split_type(),
                id
            ))
        })
    }

    fn overflow(expense: &Expense) -> LedgerError {
        Self::inconsistent(format!(
            "arithmetic overflow while splitting expense {}",
            expense.id
        ))
    }

    fn inconsistent(message: String) -> LedgerError {
        tracing::error!(%message, "balance derivation failed");
        LedgerError::internal(message)
    }
}

use std::collections::HashSet;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::currency::fits_precision;
use crate::domain::{Expense, ExpenseDraft, ExpenseId, Group, MemberId, SplitRule, SplitType};
use crate::errors::LedgerError;

use super::{CategoryService, ServiceResult};

/// Allowed drift for percentage and custom split totals.
pub const SPLIT_TOLERANCE: Decimal = dec!(0.01);

/// Largest accepted expense amount. Keeps `amount × u32::MAX` share weights
/// inside `Decimal`'s range.
pub const MAX_EXPENSE_AMOUNT: Decimal = dec!(1000000000000000000);

const FULL_PERCENT: Decimal = dec!(100);

pub struct ExpenseService;

impl ExpenseService {
    pub fn add(group: &mut Group, draft: ExpenseDraft) -> ServiceResult<ExpenseId> {
        Self::validate(group, &draft)?;
        let id = ExpenseId::generate();
        group.expenses.push(Expense::from_draft(id.clone(), draft));
        Ok(id)
    }

    /// Replaces every field but the id, keeping the expense's position.
    pub fn update(group: &mut Group, id: &ExpenseId, draft: ExpenseDraft) -> ServiceResult<()> {
        if group.expense(id).is_none() {
            return Err(LedgerError::not_found(format!("expense {}", id)));
        }
        Self::validate(group, &draft)?;
        let expense = group
            .expense_mut(id)
            .ok_or_else(|| LedgerError::not_found(format!("expense {}", id)))?;
        *expense = Expense::from_draft(id.clone(), draft);
        Ok(())
    }

    pub fn remove(group: &mut Group, id: &ExpenseId) -> ServiceResult<Expense> {
        let position = group
            .expenses
            .iter()
            .position(|expense| &expense.id == id)
            .ok_or_else(|| LedgerError::not_found(format!("expense {}", id)))?;
        Ok(group.expenses.remove(position))
    }

    /// Checks `draft` against the group's members, categories, and currency.
    pub fn validate(group: &Group, draft: &ExpenseDraft) -> ServiceResult<()> {
        if draft.title.trim().is_empty() {
            return Err(LedgerError::validation("expense title must not be empty"));
        }
        if draft.amount <= Decimal::ZERO {
            return Err(LedgerError::validation(format!(
                "expense amount must be greater than zero, got {}",
                draft.amount
            )));
        }
        if draft.amount > MAX_EXPENSE_AMOUNT {
            return Err(LedgerError::validation(format!(
                "expense amount {} exceeds the maximum of {}",
                draft.amount, MAX_EXPENSE_AMOUNT
            )));
        }
        let minor_units = group.currency.minor_units();
        if !fits_precision(draft.amount, minor_units) {
            return Err(LedgerError::validation(format!(
                "expense amount {} has more than {} decimal places for {}",
                draft.amount, minor_units, group.currency
            )));
        }
        if !group.has_member(&draft.payer_id) {
            return Err(LedgerError::validation(format!(
                "payer {} is not a member of the group",
                draft.payer_id
            )));
        }
        Self::validate_participants(group, &draft.participant_ids)?;
        if !CategoryService::is_available(group, &draft.category) {
            return Err(LedgerError::validation(format!(
                "category `{}` is not available",
                draft.category
            )));
        }
        Self::validate_split(draft)
    }

    fn validate_participants(group: &Group, participants: &[MemberId]) -> ServiceResult<()> {
        if participants.is_empty() {
            return Err(LedgerError::validation(
                "expense must have at least one participant",
            ));
        }
        let mut seen = HashSet::new();
        for id in participants {
            if !seen.insert(id) {
                return Err(LedgerError::validation(format!(
                    "participant {} is listed more than once",
                    id
                )));
            }
            if !group.has_member(id) {
                return Err(LedgerError::validation(format!(
                    "participant {} is not a member of the group",
                    id
                )));
            }
        }
        Ok(())
    }

    fn validate_split(draft: &ExpenseDraft) -> ServiceResult<()> {
        let Some(keys) = draft.split.detail_keys() else {
            return Ok(());
        };
        let split_type = draft.split.split_type();
        if let Some(extra) = keys
            .iter()
            .find(|id| !draft.participant_ids.contains(**id))
        {
            return Err(LedgerError::validation(format!(
                "{} split names {} who is not a participant",
                split_type, extra
            )));
        }
        if let Some(missing) = draft
            .participant_ids
            .iter()
            .find(|id| !keys.contains(id))
        {
            return Err(LedgerError::validation(format!(
                "{} split has no entry for participant {}",
                split_type, missing
            )));
        }

        match &draft.split {
            SplitRule::Equal => Ok(()),
            SplitRule::Shares(weights) => {
                match weights.iter().find(|(_, weight)| **weight == 0) {
                    Some((id, _)) => Err(LedgerError::validation(format!(
                        "share weight for {} must be greater than zero",
                        id
                    ))),
                    None => Ok(()),
                }
            }
            SplitRule::Percentage(percentages) => {
                Self::ensure_non_negative(split_type, percentages.iter())?;
                let total = Self::checked_total(split_type, percentages.values())?;
                if (total - FULL_PERCENT).abs() > SPLIT_TOLERANCE {
                    return Err(LedgerError::validation(format!(
                        "percentages must sum to 100, got {}",
                        total
                    )));
                }
                Ok(())
            }
            SplitRule::Custom(amounts) => {
                Self::ensure_non_negative(split_type, amounts.iter())?;
                let total = Self::checked_total(split_type, amounts.values())?;
                if (total - draft.amount).abs() > SPLIT_TOLERANCE {
                    return Err(LedgerError::validation(format!(
                        "custom amounts must sum to {}, got {}",
                        draft.amount, total
                    )));
                }
                Ok(())
            }
        }
    }

    fn checked_total<'a>(
        split_type: SplitType,
        mut values: impl Iterator<Item = &'a Decimal>,
    ) -> ServiceResult<Decimal> {
        values
            .try_fold(Decimal::ZERO, |total, value| total.checked_add(*value))
            .ok_or_else(|| {
                LedgerError::validation(format!("{} split values are too large to total", split_type))
            })
    }

    fn ensure_non_negative<'a>(
        split_type: SplitType,
        mut values: impl Iterator<Item = (&'a MemberId, &'a Decimal)>,
    ) -> ServiceResult<()> {
        match values.find(|(_, value)| **value < Decimal::ZERO) {
            Some((id, value)) => Err(LedgerError::validation(format!(
                "{} split value for {} must not be negative, got {}",
                split_type, id, value
            ))),
            None => Ok(()),
        }
    }
}

//! Domain types representing shared expenses and their split rules.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::common::*;
use crate::errors::LedgerError;

/// Discriminant of a [`SplitRule`], as it appears in snapshots.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SplitType {
    Equal,
    Shares,
    Percentage,
    Custom,
}

impl fmt::Display for SplitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SplitType::Equal => "equal",
            SplitType::Shares => "shares",
            SplitType::Percentage => "percentage",
            SplitType::Custom => "custom",
        };
        f.write_str(label)
    }
}

/// How an expense's amount is divided among its participants.
///
/// Each variant carries exactly the details its rule needs, keyed by
/// participant.
#[derive(Debug, Clone, PartialEq)]
pub enum SplitRule {
    Equal,
    /// Integer weights; a participant's share is `weight / total_weight`.
    Shares(BTreeMap<MemberId, u32>),
    /// Percent of the amount per participant; must total 100.
    Percentage(BTreeMap<MemberId, Decimal>),
    /// Explicit amounts per participant; must total the expense amount.
    Custom(BTreeMap<MemberId, Decimal>),
}

impl SplitRule {
    pub fn split_type(&self) -> SplitType {
        match self {
            SplitRule::Equal => SplitType::Equal,
            SplitRule::Shares(_) => SplitType::Shares,
            SplitRule::Percentage(_) => SplitType::Percentage,
            SplitRule::Custom(_) => SplitType::Custom,
        }
    }

    /// Participants named in the rule's details, if the rule has any.
    pub fn detail_keys(&self) -> Option<Vec<&MemberId>> {
        match self {
            SplitRule::Equal => None,
            SplitRule::Shares(weights) => Some(weights.keys().collect()),
            SplitRule::Percentage(details) | SplitRule::Custom(details) => {
                Some(details.keys().collect())
            }
        }
    }

    fn into_details(self) -> Option<BTreeMap<MemberId, Decimal>> {
        match self {
            SplitRule::Equal => None,
            SplitRule::Shares(weights) => Some(
                weights
                    .into_iter()
                    .map(|(id, weight)| (id, Decimal::from(weight)))
                    .collect(),
            ),
            SplitRule::Percentage(details) | SplitRule::Custom(details) => Some(details),
        }
    }

    fn from_parts(
        split_type: SplitType,
        details: Option<BTreeMap<MemberId, Decimal>>,
    ) -> Result<Self, LedgerError> {
        match (split_type, details) {
            (SplitType::Equal, None) => Ok(SplitRule::Equal),
            (SplitType::Equal, Some(details)) if details.is_empty() => Ok(SplitRule::Equal),
            (SplitType::Equal, Some(_)) => Err(LedgerError::validation(
                "splitDetails must be absent for an equal split",
            )),
            (other, None) => Err(LedgerError::validation(format!(
                "splitDetails are required for a {} split",
                other
            ))),
            (SplitType::Shares, Some(details)) => {
                let mut weights = BTreeMap::new();
                for (id, value) in details {
                    let weight = (value.fract().is_zero())
                        .then(|| value.to_u32())
                        .flatten()
                        .ok_or_else(|| {
                            LedgerError::validation(format!(
                                "share weight for {} must be a whole number, got {}",
                                id, value
                            ))
                        })?;
                    weights.insert(id, weight);
                }
                Ok(SplitRule::Shares(weights))
            }
            (SplitType::Percentage, Some(details)) => Ok(SplitRule::Percentage(details)),
            (SplitType::Custom, Some(details)) => Ok(SplitRule::Custom(details)),
        }
    }
}

/// A cost paid by one member on behalf of a set of participants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "ExpenseRecord", into = "ExpenseRecord")]
pub struct Expense {
    pub id: ExpenseId,
    pub title: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub payer_id: MemberId,
    pub participant_ids: Vec<MemberId>,
    pub split: SplitRule,
    pub category: String,
    pub note: Option<String>,
}

impl Expense {
    pub fn from_draft(id: ExpenseId, draft: ExpenseDraft) -> Self {
        Self {
            id,
            title: draft.title.trim().to_string(),
            amount: draft.amount,
            date: draft.date,
            payer_id: draft.payer_id,
            participant_ids: draft.participant_ids,
            split: draft.split,
            category: draft.category,
            note: draft
                .note
                .map(|note| note.trim().to_string())
                .filter(|note| !note.is_empty()),
        }
    }

    pub fn split_type(&self) -> SplitType {
        self.split.split_type()
    }

    pub fn involves(&self, member: &MemberId) -> bool {
        &self.payer_id == member || self.participant_ids.contains(member)
    }

    /// The mutable fields of this expense, as accepted by add/update.
    pub fn to_draft(&self) -> ExpenseDraft {
        ExpenseDraft {
            title: self.title.clone(),
            amount: self.amount,
            date: self.date,
            payer_id: self.payer_id.clone(),
            participant_ids: self.participant_ids.clone(),
            split: self.split.clone(),
            category: self.category.clone(),
            note: self.note.clone(),
        }
    }
}

impl Identifiable for Expense {
    fn id(&self) -> &str {
        self.id.as_str()
    }
}

impl NamedEntity for Expense {
    fn name(&self) -> &str {
        &self.title
    }
}

/// Caller-supplied expense fields; the ledger assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseDraft {
    pub title: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub payer_id: MemberId,
    pub participant_ids: Vec<MemberId>,
    pub split: SplitRule,
    pub category: String,
    pub note: Option<String>,
}

impl ExpenseDraft {
    /// Equal split among `participants`, without a note.
    pub fn new(
        title: impl Into<String>,
        amount: Decimal,
        date: NaiveDate,
        payer_id: MemberId,
        participant_ids: Vec<MemberId>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            amount,
            date,
            payer_id,
            participant_ids,
            split: SplitRule::Equal,
            category: category.into(),
            note: None,
        }
    }

    pub fn with_split(mut self, split: SplitRule) -> Self {
        self.split = split;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Flat snapshot shape: `splitType` plus an optional `splitDetails` map.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExpenseRecord {
    id: ExpenseId,
    title: String,
    amount: Decimal,
    date: NaiveDate,
    payer_id: MemberId,
    participant_ids: Vec<MemberId>,
    split_type: SplitType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    split_details: Option<BTreeMap<MemberId, Decimal>>,
    category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    note: Option<String>,
}

impl TryFrom<ExpenseRecord> for Expense {
    type Error = LedgerError;

    fn try_from(record: ExpenseRecord) -> Result<Self, Self::Error> {
        let split = SplitRule::from_parts(record.split_type, record.split_details)
            .map_err(|err| match err {
                LedgerError::Validation(message) => {
                    LedgerError::validation(format!("expense {}: {}", record.id, message))
                }
                other => other,
            })?;
        Ok(Self {
            id: record.id,
            title: record.title,
            amount: record.amount,
            date: record.date,
            payer_id: record.payer_id,
            participant_ids: record.participant_ids,
            split,
            category: record.category,
            note: record.note,
        })
    }
}

impl From<Expense> for ExpenseRecord {
    fn from(expense: Expense) -> Self {
        let split_type = expense.split.split_type();
        Self {
            id: expense.id,
            title: expense.title,
            amount: expense.amount,
            date: expense.date,
            payer_id: expense.payer_id,
            participant_ids: expense.participant_ids,
            split_type,
            split_details: expense.split.into_details(),
            category: expense.category,
            note: expense.note,
        }
    }
}

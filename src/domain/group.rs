use serde::{Deserialize, Serialize};

use super::{
    activity::ActivityLog,
    common::{ExpenseId, MemberId},
    expense::Expense,
    member::Member,
};
use crate::currency::CurrencyCode;

/// Root aggregate: one group with its members, expenses, and history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    pub currency: CurrencyCode,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub custom_categories: Vec<String>,
    #[serde(default)]
    pub activity_log: ActivityLog,
}

/// Serialized form used for persistence, export, and import.
pub type GroupSnapshot = Group;

impl Group {
    pub fn new(name: impl Into<String>, currency: CurrencyCode) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            currency,
            members: Vec::new(),
            expenses: Vec::new(),
            custom_categories: Vec::new(),
            activity_log: ActivityLog::new(),
        }
    }

    pub fn member(&self, id: &MemberId) -> Option<&Member> {
        self.members.iter().find(|member| &member.id == id)
    }

    pub fn member_mut(&mut self, id: &MemberId) -> Option<&mut Member> {
        self.members.iter_mut().find(|member| &member.id == id)
    }

    pub fn has_member(&self, id: &MemberId) -> bool {
        self.member(id).is_some()
    }

    pub fn expense(&self, id: &ExpenseId) -> Option<&Expense> {
        self.expenses.iter().find(|expense| &expense.id == id)
    }

    pub fn expense_mut(&mut self, id: &ExpenseId) -> Option<&mut Expense> {
        self.expenses.iter_mut().find(|expense| &expense.id == id)
    }

    /// True when any expense names `id` as payer or participant.
    pub fn member_in_use(&self, id: &MemberId) -> bool {
        self.expenses.iter().any(|expense| expense.involves(id))
    }

    /// True when any expense references the category `name`.
    pub fn category_in_use(&self, name: &str) -> bool {
        self.expenses.iter().any(|expense| expense.category == name)
    }

    /// Display name for a member id, falling back to the raw id.
    pub fn member_label(&self, id: &MemberId) -> String {
        self.member(id)
            .map(|member| member.name.clone())
            .unwrap_or_else(|| id.to_string())
    }
}

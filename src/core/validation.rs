//! Whole-snapshot invariant checks run before an import is committed.

use std::collections::HashSet;

use crate::core::services::{ExpenseService, MemberService};
use crate::domain::common::first_duplicate_id;
use crate::domain::{DefaultCategory, Group};
use crate::errors::{LedgerError, LedgerResult};

/// Validates every invariant of `snapshot`, reporting the first violation.
pub fn validate_snapshot(snapshot: &Group) -> LedgerResult<()> {
    if snapshot.id.trim().is_empty() {
        return Err(LedgerError::validation("group id must not be empty"));
    }
    if snapshot.name.trim().is_empty() {
        return Err(LedgerError::validation("group name must not be empty"));
    }
    if !snapshot.currency.is_valid() {
        return Err(LedgerError::validation(format!(
            "currency `{}` is not a three-letter ISO code",
            snapshot.currency
        )));
    }
    validate_members(snapshot)?;
    validate_categories(snapshot)?;
    validate_expenses(snapshot)?;
    validate_activity(snapshot)
}

fn validate_members(snapshot: &Group) -> LedgerResult<()> {
    if let Some(member) = snapshot.members.iter().find(|m| m.id.as_str().trim().is_empty()) {
        return Err(LedgerError::validation(format!(
            "member `{}` has an empty id",
            member.name
        )));
    }
    if let Some(id) = first_duplicate_id(&snapshot.members) {
        return Err(LedgerError::validation(format!(
            "member id {} appears more than once",
            id
        )));
    }
    // Each name is checked against the members before it.
    let mut seen = Group::new(snapshot.name.clone(), snapshot.currency.clone());
    for member in &snapshot.members {
        let name = MemberService::validate_name(&seen, None, &member.name)?;
        if name != member.name {
            return Err(LedgerError::validation(format!(
                "member name `{}` has surrounding whitespace",
                member.name
            )));
        }
        seen.members.push(member.clone());
    }
    Ok(())
}

fn validate_categories(snapshot: &Group) -> LedgerResult<()> {
    let mut seen = HashSet::new();
    for name in &snapshot.custom_categories {
        if name.trim().is_empty() {
            return Err(LedgerError::validation("custom category name must not be empty"));
        }
        if DefaultCategory::from_name(name).is_some() {
            return Err(LedgerError::validation(format!(
                "custom category `{}` shadows a default category",
                name
            )));
        }
        if !seen.insert(name.as_str()) {
            return Err(LedgerError::validation(format!(
                "custom category `{}` appears more than once",
                name
            )));
        }
    }
    Ok(())
}

fn validate_expenses(snapshot: &Group) -> LedgerResult<()> {
    if let Some(id) = first_duplicate_id(&snapshot.expenses) {
        return Err(LedgerError::validation(format!(
            "expense id {} appears more than once",
            id
        )));
    }
    for expense in &snapshot.expenses {
        if expense.id.as_str().trim().is_empty() {
            return Err(LedgerError::validation(format!(
                "expense `{}` has an empty id",
                expense.title
            )));
        }
        ExpenseService::validate(snapshot, &expense.to_draft()).map_err(|err| match err {
            LedgerError::Validation(message) => {
                LedgerError::validation(format!("expense {}: {}", expense.id, message))
            }
            other => other,
        })?;
    }
    Ok(())
}

fn validate_activity(snapshot: &Group) -> LedgerResult<()> {
    if let Some(id) = first_duplicate_id(snapshot.activity_log.iter()) {
        return Err(LedgerError::validation(format!(
            "activity id {} appears more than once",
            id
        )));
    }
    let entries = snapshot.activity_log.entries();
    if let Some(pair) = entries
        .windows(2)
        .find(|pair| pair[0].timestamp < pair[1].timestamp)
    {
        return Err(LedgerError::validation(format!(
            "activity log is not newest-first at entry {}",
            pair[1].id
        )));
    }
    Ok(())
}

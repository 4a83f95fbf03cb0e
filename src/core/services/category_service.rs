use crate::domain::{Category, DefaultCategory, Group};
use crate::errors::LedgerError;

use super::ServiceResult;

/// Registry over the constant default categories and the group's custom ones.
pub struct CategoryService;

impl CategoryService {
    /// Defaults first, then custom categories in insertion order.
    pub fn available(group: &Group) -> Vec<Category> {
        DefaultCategory::ALL
            .into_iter()
            .map(Category::Default)
            .chain(group.custom_categories.iter().cloned().map(Category::Custom))
            .collect()
    }

    /// Case-sensitive resolution of a category name.
    pub fn resolve(group: &Group, name: &str) -> Option<Category> {
        if let Some(category) = DefaultCategory::from_name(name) {
            return Some(Category::Default(category));
        }
        group
            .custom_categories
            .iter()
            .find(|custom| custom.as_str() == name)
            .map(|custom| Category::Custom(custom.clone()))
    }

    pub fn is_available(group: &Group, name: &str) -> bool {
        Self::resolve(group, name).is_some()
    }

    pub fn add(group: &mut Group, name: &str) -> ServiceResult<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::validation("category name must not be empty"));
        }
        if Self::is_available(group, name) {
            return Err(LedgerError::validation(format!(
                "category `{}` already exists",
                name
            )));
        }
        group.custom_categories.push(name.to_string());
        Ok(name.to_string())
    }

    pub fn remove(group: &mut Group, name: &str) -> ServiceResult<()> {
        if DefaultCategory::from_name(name).is_some() {
            return Err(LedgerError::validation(format!(
                "default category `{}` cannot be removed",
                name
            )));
        }
        let position = group
            .custom_categories
            .iter()
            .position(|custom| custom == name)
            .ok_or_else(|| LedgerError::not_found(format!("category `{}`", name)))?;
        if group.category_in_use(name) {
            return Err(LedgerError::conflict(format!(
                "category `{}` is used by at least one expense",
                name
            )));
        }
        group.custom_categories.remove(position);
        Ok(())
    }
}

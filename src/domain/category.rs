//! Domain types representing expense categories.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::common::*;

/// Built-in categories available to every group. They can never be removed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DefaultCategory {
    #[serde(rename = "Food & Drinks")]
    FoodAndDrinks,
    Groceries,
    Transport,
    Accommodation,
    Entertainment,
    Shopping,
    Utilities,
    Other,
}

impl DefaultCategory {
    pub const ALL: [DefaultCategory; 8] = [
        DefaultCategory::FoodAndDrinks,
        DefaultCategory::Groceries,
        DefaultCategory::Transport,
        DefaultCategory::Accommodation,
        DefaultCategory::Entertainment,
        DefaultCategory::Shopping,
        DefaultCategory::Utilities,
        DefaultCategory::Other,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            DefaultCategory::FoodAndDrinks => "Food & Drinks",
            DefaultCategory::Groceries => "Groceries",
            DefaultCategory::Transport => "Transport",
            DefaultCategory::Accommodation => "Accommodation",
            DefaultCategory::Entertainment => "Entertainment",
            DefaultCategory::Shopping => "Shopping",
            DefaultCategory::Utilities => "Utilities",
            DefaultCategory::Other => "Other",
        }
    }

    /// Exact, case-sensitive lookup.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.name() == name)
    }
}

impl fmt::Display for DefaultCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A category as offered to callers: either built in or owned by the group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum Category {
    Default(DefaultCategory),
    Custom(String),
}

impl Category {
    pub fn is_default(&self) -> bool {
        matches!(self, Category::Default(_))
    }
}

impl NamedEntity for Category {
    fn name(&self) -> &str {
        match self {
            Category::Default(category) => category.name(),
            Category::Custom(name) => name,
        }
    }
}

pub mod activity;
pub mod category;
pub mod common;
pub mod expense;
pub mod group;
pub mod member;

pub use activity::{ActivityEntry, ActivityKind, ActivityLog};
pub use category::{Category, DefaultCategory};
pub use common::{ActivityId, ExpenseId, Identifiable, MemberId, NamedEntity};
pub use expense::{Expense, ExpenseDraft, SplitRule, SplitType};
pub use group::{Group, GroupSnapshot};
pub use member::Member;

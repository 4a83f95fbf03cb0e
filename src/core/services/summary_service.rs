use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{Category, Group, MemberId, NamedEntity};

use super::CategoryService;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub total: Decimal,
    pub expense_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayerTotal {
    pub member_id: MemberId,
    pub name: String,
    pub total: Decimal,
}

/// Spending overview of a group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub total_spent: Decimal,
    pub expense_count: usize,
    pub per_category: Vec<CategoryTotal>,
    pub per_payer: Vec<PayerTotal>,
}

pub struct SummaryService;

impl SummaryService {
    /// Categories appear in registry order and only when they carry spending;
    /// payers appear in member order.
    pub fn summarize(group: &Group) -> GroupSummary {
        let per_category = CategoryService::available(group)
            .into_iter()
            .filter_map(|category| {
                let (total, expense_count) = group
                    .expenses
                    .iter()
                    .filter(|expense| expense.category == category.name())
                    .fold((Decimal::ZERO, 0), |(total, count), expense| {
                        (total + expense.amount, count + 1)
                    });
                (expense_count > 0).then_some(CategoryTotal {
                    category,
                    total,
                    expense_count,
                })
            })
            .collect();

        let per_payer = group
            .members
            .iter()
            .map(|member| PayerTotal {
                member_id: member.id.clone(),
                name: member.name.clone(),
                total: group
                    .expenses
                    .iter()
                    .filter(|expense| expense.payer_id == member.id)
                    .map(|expense| expense.amount)
                    .sum(),
            })
            .collect();

        GroupSummary {
            total_spent: group.expenses.iter().map(|expense| expense.amount).sum(),
            expense_count: group.expenses.len(),
            per_category,
            per_payer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::CurrencyCode;
    use crate::domain::{DefaultCategory, Expense, ExpenseDraft, ExpenseId, Member};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn spend(group: &mut Group, payer: &str, amount: Decimal, category: &str) {
        let draft = ExpenseDraft::new(
            "Item",
            amount,
            NaiveDate::from_ymd_opt(2024, 8, 1).unwrap(),
            MemberId::new(payer),
            vec![MemberId::new("a"), MemberId::new("b")],
            category,
        );
        group
            .expenses
            .push(Expense::from_draft(ExpenseId::generate(), draft));
    }

    #[test]
    fn totals_by_category_and_payer() {
        let mut group = Group::new("Holiday", CurrencyCode::new("EUR"));
        group.members.push(Member::new("Ana").with_id("a"));
        group.members.push(Member::new("Ben").with_id("b"));
        group.custom_categories.push("Health".into());
        spend(&mut group, "a", dec!(40), "Transport");
        spend(&mut group, "b", dec!(12.5), "Health");
        spend(&mut group, "a", dec!(10), "Transport");

        let summary = SummaryService::summarize(&group);
        assert_eq!(summary.total_spent, dec!(62.5));
        assert_eq!(summary.expense_count, 3);
        assert_eq!(summary.per_category.len(), 2);
        assert_eq!(
            summary.per_category[0].category,
            Category::Default(DefaultCategory::Transport)
        );
        assert_eq!(summary.per_category[0].total, dec!(50));
        assert_eq!(summary.per_category[0].expense_count, 2);
        assert_eq!(summary.per_category[1].category, Category::Custom("Health".into()));
        assert_eq!(summary.per_payer[0].total, dec!(50));
        assert_eq!(summary.per_payer[1].total, dec!(12.5));
    }
}

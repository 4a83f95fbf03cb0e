pub mod balance_service;
pub mod category_service;
pub mod expense_service;
pub mod member_service;
pub mod settlement_service;
pub mod summary_service;

pub use balance_service::{BalanceService, BalanceSheet, MemberBalance, ShareLine};
pub use category_service::CategoryService;
pub use expense_service::{ExpenseService, MAX_EXPENSE_AMOUNT};
pub use member_service::MemberService;
pub use settlement_service::{SettlementService, Transfer};
pub use summary_service::{CategoryTotal, GroupSummary, PayerTotal, SummaryService};

use crate::errors::LedgerResult;

pub type ServiceResult<T> = LedgerResult<T>;

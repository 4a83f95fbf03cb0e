use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::EngineConfig;
use crate::core::services::{
    BalanceService, BalanceSheet, CategoryService, ExpenseService, GroupSummary, MemberService,
    SettlementService, SummaryService, Transfer,
};
use crate::core::time::{Clock, SystemClock};
use crate::core::validation::validate_snapshot;
use crate::currency::{fits_precision, format_amount, CurrencyCode};
use crate::domain::{
    ActivityEntry, ActivityKind, Category, Expense, ExpenseDraft, ExpenseId, Group, GroupSnapshot,
    Member, MemberId,
};
use crate::errors::{LedgerError, LedgerResult};
use crate::storage::{JsonFileStore, MemoryStore, SnapshotStore};

/// Storage write that failed after a mutation was applied in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistenceWarning {
    pub key: String,
    pub message: String,
}

impl fmt::Display for PersistenceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to persist `{}`: {}", self.key, self.message)
    }
}

/// Result of a successful mutation.
///
/// `warning` is set when the in-memory change stands but could not be saved.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied<T> {
    pub value: T,
    pub warning: Option<PersistenceWarning>,
}

impl<T> Applied<T> {
    pub fn persisted(&self) -> bool {
        self.warning.is_none()
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// Changes accepted by [`LedgerStore::update_group`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupUpdate {
    pub name: Option<String>,
    pub currency: Option<String>,
}

pub type SubscriptionId = u64;

type Listener = Box<dyn Fn(&Arc<Group>) + Send + Sync>;

/// Single writer for the active group.
///
/// Every mutation runs against a private copy of the group and is committed
/// only when it fully succeeds; readers only ever see immutable snapshots.
pub struct LedgerStore {
    group: Arc<Group>,
    storage: Box<dyn SnapshotStore>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: SubscriptionId,
}

impl LedgerStore {
    /// Loads the group stored under the configured key, or starts a fresh one.
    pub fn open(
        storage: Box<dyn SnapshotStore>,
        clock: Arc<dyn Clock>,
        config: EngineConfig,
    ) -> LedgerResult<Self> {
        config.validate()?;
        let group = match storage.load(&config.storage_key)? {
            Some(snapshot) => {
                validate_snapshot(&snapshot)?;
                tracing::info!(
                    key = %config.storage_key,
                    members = snapshot.members.len(),
                    expenses = snapshot.expenses.len(),
                    "loaded group snapshot"
                );
                snapshot
            }
            None => {
                tracing::info!(key = %config.storage_key, "no stored group, starting fresh");
                Group::new(config.default_group_name.clone(), config.currency()?)
            }
        };
        Ok(Self {
            group: Arc::new(group),
            storage,
            clock,
            config,
            listeners: Vec::new(),
            next_subscription: 0,
        })
    }

    /// Store backed by a [`MemoryStore`] and the system clock.
    pub fn in_memory(config: EngineConfig) -> LedgerResult<Self> {
        Self::open(Box::new(MemoryStore::new()), Arc::new(SystemClock), config)
    }

    /// Store persisted as JSON files under `config.data_dir`, or the app
    /// data dir when unset.
    pub fn open_json(config: EngineConfig) -> LedgerResult<Self> {
        let storage = JsonFileStore::new(config.data_dir.clone())?;
        Self::open(Box::new(storage), Arc::new(SystemClock), config)
    }

    // ----- reads -----

    /// Current immutable snapshot.
    pub fn group(&self) -> Arc<Group> {
        Arc::clone(&self.group)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn members(&self) -> &[Member] {
        &self.group.members
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.group.expenses
    }

    pub fn balances(&self) -> LedgerResult<BalanceSheet> {
        BalanceService::compute(&self.group)
    }

    pub fn settlement(&self) -> LedgerResult<Vec<Transfer>> {
        SettlementService::plan(&self.balances()?)
    }

    pub fn summary(&self) -> GroupSummary {
        SummaryService::summarize(&self.group)
    }

    pub fn recent_activity(&self, n: usize) -> &[ActivityEntry] {
        self.group.activity_log.recent(n)
    }

    pub fn available_categories(&self) -> Vec<Category> {
        CategoryService::available(&self.group)
    }

    /// Full snapshot of the current group, activity log included.
    pub fn export(&self) -> GroupSnapshot {
        (*self.group).clone()
    }

    pub fn export_json(&self) -> LedgerResult<String> {
        Ok(serde_json::to_string_pretty(&*self.group)?)
    }

    // ----- members -----

    pub fn add_member(&mut self, name: &str, avatar: Option<String>) -> LedgerResult<Applied<MemberId>> {
        self.mutate(|group, now| {
            let id = MemberService::add(group, name, avatar)?;
            let description = format!("Added member {}", group.member_label(&id));
            group.activity_log.record(ActivityKind::MemberAdded, description, now);
            Ok(id)
        })
    }

    pub fn rename_member(&mut self, id: &MemberId, name: &str) -> LedgerResult<Applied<()>> {
        self.mutate(|group, now| {
            let previous = MemberService::rename(group, id, name)?;
            let description = format!("Renamed member {} to {}", previous, group.member_label(id));
            group.activity_log.record(ActivityKind::GroupUpdated, description, now);
            Ok(())
        })
    }

    /// Fails with `Conflict` while the member is payer or participant of any expense.
    pub fn remove_member(&mut self, id: &MemberId) -> LedgerResult<Applied<Member>> {
        self.mutate(|group, now| {
            let member = MemberService::remove(group, id)?;
            let description = format!("Removed member {}", member.name);
            group.activity_log.record(ActivityKind::MemberRemoved, description, now);
            Ok(member)
        })
    }

    // ----- expenses -----

    pub fn add_expense(&mut self, draft: ExpenseDraft) -> LedgerResult<Applied<ExpenseId>> {
        self.mutate(|group, now| {
            let id = ExpenseService::add(group, draft)?;
            let description = group
                .expense(&id)
                .map(|expense| Self::describe_expense("Added", group, expense))
                .unwrap_or_default();
            group.activity_log.record(ActivityKind::ExpenseAdded, description, now);
            Ok(id)
        })
    }

    pub fn update_expense(&mut self, id: &ExpenseId, draft: ExpenseDraft) -> LedgerResult<Applied<()>> {
        self.mutate(|group, now| {
            ExpenseService::update(group, id, draft)?;
            let description = group
                .expense(id)
                .map(|expense| Self::describe_expense("Updated", group, expense))
                .unwrap_or_default();
            group.activity_log.record(ActivityKind::ExpenseUpdated, description, now);
            Ok(())
        })
    }

    pub fn remove_expense(&mut self, id: &ExpenseId) -> LedgerResult<Applied<Expense>> {
        self.mutate(|group, now| {
            let expense = ExpenseService::remove(group, id)?;
            let description = Self::describe_expense("Deleted", group, &expense);
            group.activity_log.record(ActivityKind::ExpenseDeleted, description, now);
            Ok(expense)
        })
    }

    // ----- categories -----

    pub fn add_custom_category(&mut self, name: &str) -> LedgerResult<Applied<String>> {
        self.mutate(|group, now| {
            let name = CategoryService::add(group, name)?;
            let description = format!("Added category {}", name);
            group.activity_log.record(ActivityKind::GroupUpdated, description, now);
            Ok(name)
        })
    }

    pub fn remove_custom_category(&mut self, name: &str) -> LedgerResult<Applied<()>> {
        self.mutate(|group, now| {
            CategoryService::remove(group, name)?;
            let description = format!("Removed category {}", name);
            group.activity_log.record(ActivityKind::GroupUpdated, description, now);
            Ok(())
        })
    }

    // ----- group -----

    /// Renames the group and/or switches its currency.
    ///
    /// A currency switch is refused when an existing amount cannot be
    /// expressed in the new currency's minor unit.
    pub fn update_group(&mut self, update: GroupUpdate) -> LedgerResult<Applied<()>> {
        if update.name.is_none() && update.currency.is_none() {
            return Err(LedgerError::validation("no group changes supplied"));
        }
        self.mutate(|group, now| {
            let mut changes = Vec::new();
            if let Some(name) = update.name.as_deref() {
                let name = name.trim();
                if name.is_empty() {
                    return Err(LedgerError::validation("group name must not be empty"));
                }
                changes.push(format!("Renamed group to {}", name));
                group.name = name.to_string();
            }
            if let Some(code) = update.currency.as_deref() {
                let currency = CurrencyCode::parse(code)?;
                Self::ensure_amounts_fit(group, &currency)?;
                changes.push(format!(
                    "Changed currency from {} to {}",
                    group.currency, currency
                ));
                group.currency = currency;
            }
            group
                .activity_log
                .record(ActivityKind::GroupUpdated, changes.join("; "), now);
            Ok(())
        })
    }

    /// Discards the current group and starts an empty one.
    pub fn reset(&mut self, name: &str, currency: &str) -> LedgerResult<Applied<()>> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::validation("group name must not be empty"));
        }
        let group = Group::new(name, CurrencyCode::parse(currency)?);
        tracing::info!(group = %group.name, currency = %group.currency, "group reset");
        Ok(self.commit(group, ()))
    }

    /// Wholesale import. The snapshot is validated in full before anything
    /// changes; the first violation is reported.
    pub fn replace(&mut self, snapshot: GroupSnapshot) -> LedgerResult<Applied<()>> {
        validate_snapshot(&snapshot)?;
        BalanceService::compute(&snapshot)?;
        tracing::info!(
            group = %snapshot.name,
            members = snapshot.members.len(),
            expenses = snapshot.expenses.len(),
            "group replaced from snapshot"
        );
        Ok(self.commit(snapshot, ()))
    }

    /// Parses and imports a JSON snapshot; malformed JSON is a validation error.
    pub fn import_json(&mut self, json: &str) -> LedgerResult<Applied<()>> {
        let snapshot: GroupSnapshot = serde_json::from_str(json).map_err(|err| {
            LedgerError::validation(format!("snapshot is not a valid group: {}", err))
        })?;
        self.replace(snapshot)
    }

    // ----- observers -----

    /// Registers `listener`; it receives every snapshot committed from now on.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&Arc<Group>) + Send + Sync + 'static,
    {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    // ----- internals -----

    fn mutate<T>(
        &mut self,
        op: impl FnOnce(&mut Group, DateTime<Utc>) -> LedgerResult<T>,
    ) -> LedgerResult<Applied<T>> {
        let mut draft = (*self.group).clone();
        let value = op(&mut draft, self.clock.now())?;
        BalanceService::compute(&draft)?;
        if let Some(entry) = draft.activity_log.recent(1).first() {
            tracing::debug!(kind = %entry.kind, description = %entry.description, "ledger mutation applied");
        }
        Ok(self.commit(draft, value))
    }

    fn commit<T>(&mut self, group: Group, value: T) -> Applied<T> {
        self.group = Arc::new(group);
        let warning = self.persist();
        for (_, listener) in &self.listeners {
            listener(&self.group);
        }
        Applied { value, warning }
    }

    fn persist(&self) -> Option<PersistenceWarning> {
        let key = &self.config.storage_key;
        let result = match self.config.activity_retention {
            Some(limit) if self.group.activity_log.len() > limit => {
                let mut trimmed = (*self.group).clone();
                trimmed.activity_log.retain_newest(limit);
                self.storage.save(key, &trimmed)
            }
            _ => self.storage.save(key, &self.group),
        };
        match result {
            Ok(()) => None,
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "snapshot not persisted; in-memory state kept");
                Some(PersistenceWarning {
                    key: key.clone(),
                    message: err.to_string(),
                })
            }
        }
    }

    fn ensure_amounts_fit(group: &Group, currency: &CurrencyCode) -> LedgerResult<()> {
        let minor_units = currency.minor_units();
        match group
            .expenses
            .iter()
            .find(|expense| !fits_precision(expense.amount, minor_units))
        {
            Some(expense) => Err(LedgerError::validation(format!(
                "expense {} amount {} cannot be expressed in {}",
                expense.id, expense.amount, currency
            ))),
            None => Ok(()),
        }
    }

    fn describe_expense(verb: &str, group: &Group, expense: &Expense) -> String {
        format!(
            "{} expense \"{}\" ({}) paid by {}",
            verb,
            expense.title,
            format_amount(expense.amount, &group.currency),
            group.member_label(&expense.payer_id)
        )
    }
}

impl fmt::Debug for LedgerStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerStore")
            .field("group", &self.group.name)
            .field("storage_key", &self.config.storage_key)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

mod common;

use std::collections::BTreeMap;

use chrono::Duration;
use common::{add_members, day, memory_env};
use group_ledger::{
    core::services::{Transfer, MAX_EXPENSE_AMOUNT},
    domain::{ActivityKind, Category, ExpenseDraft, ExpenseId, MemberId, NamedEntity, SplitRule},
    ErrorKind, GroupUpdate,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn transfer(from: &MemberId, to: &MemberId, amount: Decimal) -> Transfer {
    Transfer {
        from: from.clone(),
        to: to.clone(),
        amount,
    }
}

#[test]
fn dinner_for_three_settles_to_payer() {
    let (mut store, _, _) = memory_env();
    let ids = add_members(&mut store, &["A", "B", "C"]);
    store
        .add_expense(ExpenseDraft::new(
            "Dinner",
            dec!(90),
            day(1),
            ids[0].clone(),
            ids.clone(),
            "Food & Drinks",
        ))
        .unwrap();

    let sheet = store.balances().unwrap();
    assert_eq!(sheet.balance_of(&ids[0]), dec!(60));
    assert_eq!(sheet.balance_of(&ids[1]), dec!(-30));
    assert_eq!(sheet.balance_of(&ids[2]), dec!(-30));

    let plan = store.settlement().unwrap();
    assert_eq!(
        plan,
        vec![
            transfer(&ids[1], &ids[0], dec!(30)),
            transfer(&ids[2], &ids[0], dec!(30)),
        ]
    );
}

#[test]
fn uneven_split_rounds_and_reconciles() {
    let (mut store, _, _) = memory_env();
    let ids = add_members(&mut store, &["Ana", "Ben", "Cy"]);
    let pct: BTreeMap<_, _> = ids.iter().map(|id| (id.clone(), dec!(33.33))).collect();
    store
        .add_expense(
            ExpenseDraft::new("Taxi", dec!(50), day(2), ids[1].clone(), ids.clone(), "Transport")
                .with_split(SplitRule::Percentage(pct)),
        )
        .unwrap();

    let sheet = store.balances().unwrap();
    assert_eq!(sheet.balance_of(&ids[0]), dec!(-16.68));
    assert_eq!(sheet.balance_of(&ids[1]), dec!(33.34));
    assert_eq!(sheet.balance_of(&ids[2]), dec!(-16.66));
    assert!(sheet.net_total().is_zero());
    assert_eq!(store.settlement().unwrap().len(), 2);
}

#[test]
fn member_removal_is_blocked_while_referenced() {
    let (mut store, _, _) = memory_env();
    let ids = add_members(&mut store, &["Ana", "Ben", "Idle"]);
    let expense = store
        .add_expense(ExpenseDraft::new(
            "Museum",
            dec!(24),
            day(3),
            ids[0].clone(),
            vec![ids[0].clone(), ids[1].clone()],
            "Entertainment",
        ))
        .unwrap()
        .into_value();

    let err = store.remove_member(&ids[1]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(store.members().len(), 3);

    let removed = store.remove_member(&ids[2]).unwrap().into_value();
    assert_eq!(removed.name, "Idle");
    assert_eq!(store.recent_activity(1)[0].kind, ActivityKind::MemberRemoved);

    store.remove_expense(&expense).unwrap();
    store.remove_member(&ids[1]).unwrap();
    assert_eq!(store.members().len(), 1);

    let missing = store.remove_member(&MemberId::new("ghost")).unwrap_err();
    assert_eq!(missing.kind(), ErrorKind::NotFound);
}

#[test]
fn custom_category_lifecycle() {
    let (mut store, _, _) = memory_env();
    let ids = add_members(&mut store, &["Ana", "Ben"]);
    let name = store.add_custom_category("  Health ").unwrap().into_value();
    assert_eq!(name, "Health");
    assert!(store
        .available_categories()
        .contains(&Category::Custom("Health".into())));

    let duplicate = store.add_custom_category("Health").unwrap_err();
    assert_eq!(duplicate.kind(), ErrorKind::Validation);
    let shadow = store.add_custom_category("Groceries").unwrap_err();
    assert_eq!(shadow.kind(), ErrorKind::Validation);

    let pharmacy = store
        .add_expense(ExpenseDraft::new(
            "Pharmacy",
            dec!(18.40),
            day(4),
            ids[0].clone(),
            ids.clone(),
            "Health",
        ))
        .unwrap()
        .into_value();

    let in_use = store.remove_custom_category("Health").unwrap_err();
    assert_eq!(in_use.kind(), ErrorKind::Conflict);
    let default = store.remove_custom_category("Transport").unwrap_err();
    assert_eq!(default.kind(), ErrorKind::Validation);
    let unknown = store.remove_custom_category("Pets").unwrap_err();
    assert_eq!(unknown.kind(), ErrorKind::NotFound);

    store.remove_expense(&pharmacy).unwrap();
    store.remove_custom_category("Health").unwrap();
    assert!(!store
        .available_categories()
        .contains(&Category::Custom("Health".into())));
}

#[test]
fn expense_validation_rejects_bad_drafts_atomically() {
    let (mut store, _, _) = memory_env();
    let ids = add_members(&mut store, &["Ana", "Ben"]);
    let before = store.export();
    let base = ExpenseDraft::new("Hotel", dec!(200), day(5), ids[0].clone(), ids.clone(), "Accommodation");

    let mut zero = base.clone();
    zero.amount = Decimal::ZERO;
    let mut too_precise = base.clone();
    too_precise.amount = dec!(10.005);
    let mut unknown_category = base.clone();
    unknown_category.category = "Pets".into();
    let mut stranger = base.clone();
    stranger.payer_id = MemberId::new("stranger");
    let bad_custom = base.clone().with_split(SplitRule::Custom(BTreeMap::from([
        (ids[0].clone(), dec!(150)),
        (ids[1].clone(), dec!(40)),
    ])));
    let missing_key = base
        .clone()
        .with_split(SplitRule::Shares(BTreeMap::from([(ids[0].clone(), 1)])));

    for draft in [zero, too_precise, unknown_category, stranger, bad_custom, missing_key] {
        let err = store.add_expense(draft).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
    assert_eq!(store.export(), before);
}

#[test]
fn update_expense_replaces_fields_and_logs() {
    let (mut store, _, clock) = memory_env();
    let ids = add_members(&mut store, &["Ana", "Ben"]);
    let id = store
        .add_expense(ExpenseDraft::new("Fuel", dec!(60), day(6), ids[0].clone(), ids.clone(), "Transport"))
        .unwrap()
        .into_value();

    clock.advance(Duration::hours(1));
    let update = ExpenseDraft::new("Fuel", dec!(80), day(6), ids[1].clone(), ids.clone(), "Transport")
        .with_split(SplitRule::Shares(BTreeMap::from([
            (ids[0].clone(), 3),
            (ids[1].clone(), 1),
        ])))
        .with_note("full tank");
    store.update_expense(&id, update).unwrap();

    let group = store.group();
    let expense = group.expense(&id).unwrap();
    assert_eq!(expense.amount, dec!(80));
    assert_eq!(expense.payer_id, ids[1]);
    assert_eq!(expense.note.as_deref(), Some("full tank"));
    assert_eq!(store.balances().unwrap().balance_of(&ids[0]), dec!(-60));
    assert_eq!(store.recent_activity(1)[0].kind, ActivityKind::ExpenseUpdated);

    let missing = store
        .update_expense(&ExpenseId::new("nope"), expense.to_draft())
        .unwrap_err();
    assert_eq!(missing.kind(), ErrorKind::NotFound);
}

#[test]
fn summary_reports_category_and_payer_totals() {
    let (mut store, _, _) = memory_env();
    let ids = add_members(&mut store, &["Ana", "Ben"]);
    for (title, amount, payer, category) in [
        ("Bus", dec!(4.50), 0, "Transport"),
        ("Market", dec!(31.20), 1, "Groceries"),
        ("Train", dec!(12), 1, "Transport"),
    ] {
        store
            .add_expense(ExpenseDraft::new(title, amount, day(7), ids[payer].clone(), ids.clone(), category))
            .unwrap();
    }

    let summary = store.summary();
    assert_eq!(summary.total_spent, dec!(47.70));
    assert_eq!(summary.expense_count, 3);
    let transport = summary
        .per_category
        .iter()
        .find(|line| line.category.name() == "Transport")
        .unwrap();
    assert_eq!(transport.total, dec!(16.50));
    assert_eq!(summary.per_payer[1].total, dec!(43.20));
}

#[test]
fn currency_switch_to_zero_decimal_currency() {
    let (mut store, _, _) = memory_env();
    let ids = add_members(&mut store, &["Ana", "Ben", "Cy"]);
    store
        .add_expense(ExpenseDraft::new("Sushi", dec!(1000), day(8), ids[0].clone(), ids.clone(), "Food & Drinks"))
        .unwrap();
    store
        .update_group(GroupUpdate {
            currency: Some("JPY".into()),
            ..GroupUpdate::default()
        })
        .unwrap();

    let sheet = store.balances().unwrap();
    assert_eq!(sheet.balance_of(&ids[0]), dec!(666));
    assert_eq!(sheet.balance_of(&ids[1]), dec!(-333));
    assert_eq!(sheet.balance_of(&ids[2]), dec!(-333));
}

#[test]
fn renaming_members_keeps_names_unique() {
    let (mut store, _, _) = memory_env();
    let ids = add_members(&mut store, &["Ana", "Ben"]);
    let clash = store.rename_member(&ids[1], " ana ").unwrap_err();
    assert_eq!(clash.kind(), ErrorKind::Validation);

    store.rename_member(&ids[0], "Anna").unwrap();
    assert_eq!(store.group().member(&ids[0]).unwrap().name, "Anna");
    assert_eq!(store.recent_activity(1)[0].description, "Renamed member Ana to Anna");

    let dup = store.add_member("BEN", None).unwrap_err();
    assert_eq!(dup.kind(), ErrorKind::Validation);
}

#[test]
fn recent_activity_is_bounded_and_newest_first() {
    let (mut store, _, clock) = memory_env();
    for name in ["Ana", "Ben", "Cy", "Dee"] {
        store.add_member(name, None).unwrap();
        clock.advance(Duration::seconds(30));
    }
    let recent = store.recent_activity(3);
    assert_eq!(recent.len(), 3);
    assert_eq!(recent[0].description, "Added member Dee");
    assert!(recent.windows(2).all(|pair| pair[0].timestamp >= pair[1].timestamp));
    assert_eq!(store.recent_activity(10).len(), 4);
    assert!(store.recent_activity(0).is_empty());
}

#[test]
fn oversized_expense_is_rejected_without_touching_the_group() {
    let (mut store, _, _) = memory_env();
    let ids = add_members(&mut store, &["Ana", "Ben"]);
    let before = store.export();
    let weights = BTreeMap::from([(ids[0].clone(), u32::MAX), (ids[1].clone(), 1)]);
    let draft = ExpenseDraft::new(
        "Island",
        dec!(100000000000000000000),
        day(14),
        ids[0].clone(),
        ids.clone(),
        "Other",
    )
    .with_split(SplitRule::Shares(weights.clone()));

    let err = store.add_expense(draft).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(store.export(), before);

    let at_limit = ExpenseDraft::new(
        "Island",
        MAX_EXPENSE_AMOUNT,
        day(14),
        ids[0].clone(),
        ids.clone(),
        "Other",
    )
    .with_split(SplitRule::Shares(weights));
    store.add_expense(at_limit).unwrap();
    assert!(store.balances().unwrap().net_total().is_zero());
    assert_eq!(store.settlement().unwrap().len(), 1);
}

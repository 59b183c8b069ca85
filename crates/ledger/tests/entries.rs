use chrono::NaiveDate;
use ledger::{
    BudgetDefaults, CreateEntryCmd, Direction, EntryListFilter, EntryScope, Ledger, LedgerError,
    Money, OwnerRef,
};
use migration::MigratorTrait;
use sea_orm::Database;

async fn ledger_with_db() -> Ledger {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Ledger::builder().database(db).build()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn non_positive_amounts_are_rejected() {
    let ledger = ledger_with_db().await;
    let budget = ledger
        .ensure_for_owner(OwnerRef::User(1), BudgetDefaults::default())
        .await
        .unwrap();

    for amount in [Money::ZERO, Money::new(-100)] {
        let err = ledger
            .create_entry(CreateEntryCmd::new(budget.id, 1, Direction::Expense, amount))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::Validation("amount must be > 0".to_string())
        );
    }
}

#[tokio::test]
async fn category_direction_mismatch_is_rejected() {
    let ledger = ledger_with_db().await;
    let budget = ledger
        .ensure_for_owner(OwnerRef::User(1), BudgetDefaults::default())
        .await
        .unwrap();
    let salary = ledger.category_by_name("Salary").await.unwrap();
    assert_eq!(salary.direction, Direction::Income);

    let err = ledger
        .create_entry(
            CreateEntryCmd::new(budget.id, 1, Direction::Expense, Money::new(1_000))
                .category_id(salary.id),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
}

#[tokio::test]
async fn entry_against_missing_budget_is_not_found() {
    let ledger = ledger_with_db().await;

    let err = ledger
        .create_entry(CreateEntryCmd::new(
            uuid::Uuid::new_v4(),
            1,
            Direction::Income,
            Money::new(100),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotFound(_)));
}

#[tokio::test]
async fn idempotency_key_returns_the_original_entry() {
    let ledger = ledger_with_db().await;
    let budget = ledger
        .ensure_for_owner(OwnerRef::User(1), BudgetDefaults::default())
        .await
        .unwrap();

    let cmd = CreateEntryCmd::new(budget.id, 1, Direction::Income, Money::new(2_000))
        .idempotency_key("retry-1");
    let first = ledger.create_entry(cmd.clone()).await.unwrap();
    let second = ledger.create_entry(cmd).await.unwrap();

    assert_eq!(first.id, second.id);
    let entries = ledger
        .list_entries(
            EntryScope::Budget(budget.id),
            EntryListFilter::new(),
            10,
            0,
        )
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
}

#[tokio::test]
async fn delete_entry_refreshes_the_budget() {
    let ledger = ledger_with_db().await;
    let budget = ledger
        .ensure_for_owner(OwnerRef::User(1), BudgetDefaults::default())
        .await
        .unwrap();
    let entry = ledger
        .create_entry(CreateEntryCmd::new(
            budget.id,
            1,
            Direction::Income,
            Money::new(3_000),
        ))
        .await
        .unwrap();
    ledger.recalc(budget.id).await.unwrap();

    ledger.delete_entry(entry.id).await.unwrap();

    let snapshot = ledger.snapshot(budget.id).await.unwrap();
    assert_eq!(snapshot.total_income, Money::ZERO);
    assert_eq!(snapshot.current_amount, Money::ZERO);
}

#[tokio::test]
async fn listing_orders_newest_first_and_paginates() {
    let ledger = ledger_with_db().await;
    let budget = ledger
        .ensure_for_owner(OwnerRef::User(1), BudgetDefaults::default())
        .await
        .unwrap();

    for (day, cents) in [(1, 100), (3, 300), (2, 200)] {
        ledger
            .create_entry(
                CreateEntryCmd::new(budget.id, 1, Direction::Expense, Money::new(cents))
                    .occurred_on(date(2026, 8, day)),
            )
            .await
            .unwrap();
    }

    let entries = ledger
        .list_entries(
            EntryScope::Budget(budget.id),
            EntryListFilter::new(),
            10,
            0,
        )
        .await
        .unwrap();
    let days: Vec<u32> = entries
        .iter()
        .map(|e| chrono::Datelike::day(&e.occurred_on))
        .collect();
    assert_eq!(days, vec![3, 2, 1]);

    let page = ledger
        .list_entries(EntryScope::Budget(budget.id), EntryListFilter::new(), 1, 1)
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].amount, Money::new(200));
}

#[tokio::test]
async fn filters_combine_direction_date_and_search() {
    let ledger = ledger_with_db().await;
    let budget = ledger
        .ensure_for_owner(OwnerRef::User(1), BudgetDefaults::default())
        .await
        .unwrap();
    let salary = ledger.category_by_name("Salary").await.unwrap();

    ledger
        .create_entry(
            CreateEntryCmd::new(budget.id, 1, Direction::Income, Money::new(50_000))
                .category_id(salary.id)
                .occurred_on(date(2026, 8, 1)),
        )
        .await
        .unwrap();
    ledger
        .create_entry(
            CreateEntryCmd::new(budget.id, 1, Direction::Expense, Money::new(1_200))
                .note("lunch at the office")
                .occurred_on(date(2026, 8, 2)),
        )
        .await
        .unwrap();
    ledger
        .create_entry(
            CreateEntryCmd::new(budget.id, 1, Direction::Expense, Money::new(800))
                .note("bus ticket")
                .occurred_on(date(2026, 7, 20)),
        )
        .await
        .unwrap();

    let incomes = ledger
        .list_entries(
            EntryScope::Budget(budget.id),
            EntryListFilter::new().direction(Direction::Income),
            10,
            0,
        )
        .await
        .unwrap();
    assert_eq!(incomes.len(), 1);
    assert_eq!(incomes[0].amount, Money::new(50_000));

    let recent = ledger
        .list_entries(
            EntryScope::Budget(budget.id),
            EntryListFilter::new().date_from(date(2026, 8, 1)),
            10,
            0,
        )
        .await
        .unwrap();
    assert_eq!(recent.len(), 2);

    // Search matches notes...
    let by_note = ledger
        .list_entries(
            EntryScope::Budget(budget.id),
            EntryListFilter::new().search("lunch"),
            10,
            0,
        )
        .await
        .unwrap();
    assert_eq!(by_note.len(), 1);
    assert_eq!(by_note[0].amount, Money::new(1_200));

    // ...and category names.
    let by_category = ledger
        .list_entries(
            EntryScope::Budget(budget.id),
            EntryListFilter::new().search("salar"),
            10,
            0,
        )
        .await
        .unwrap();
    assert_eq!(by_category.len(), 1);
    assert_eq!(by_category[0].category_id, Some(salary.id));

    let by_category_id = ledger
        .list_entries(
            EntryScope::Budget(budget.id),
            EntryListFilter::new().category_id(salary.id),
            10,
            0,
        )
        .await
        .unwrap();
    assert_eq!(by_category_id.len(), 1);
    assert_eq!(by_category_id[0].amount, Money::new(50_000));
}

#[tokio::test]
async fn payer_scope_spans_budgets() {
    let ledger = ledger_with_db().await;
    let own = ledger
        .ensure_for_owner(OwnerRef::User(1), BudgetDefaults::default())
        .await
        .unwrap();
    let group = ledger
        .ensure_for_owner(OwnerRef::Group(9), BudgetDefaults::default())
        .await
        .unwrap();

    ledger
        .create_entry(CreateEntryCmd::new(
            own.id,
            1,
            Direction::Expense,
            Money::new(100),
        ))
        .await
        .unwrap();
    ledger
        .create_entry(CreateEntryCmd::new(
            group.id,
            1,
            Direction::Income,
            Money::new(200),
        ))
        .await
        .unwrap();
    ledger
        .create_entry(CreateEntryCmd::new(
            group.id,
            2,
            Direction::Income,
            Money::new(300),
        ))
        .await
        .unwrap();

    let mine = ledger
        .list_entries(EntryScope::Payer(1), EntryListFilter::new(), 10, 0)
        .await
        .unwrap();
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|e| e.payer_id == 1));
}

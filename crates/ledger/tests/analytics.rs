use chrono::NaiveDate;
use ledger::{
    BudgetDefaults, CreateEntryCmd, Direction, Ledger, Money, OwnerRef, TransferCmd,
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
async fn kpi_sums_the_inclusive_range() {
    let ledger = ledger_with_db().await;
    let budget = ledger
        .ensure_for_owner(OwnerRef::User(1), BudgetDefaults::default())
        .await
        .unwrap();

    for (day, direction, cents) in [
        (1, Direction::Income, 10_000),
        (15, Direction::Expense, 3_000),
        (31, Direction::Expense, 1_000),
    ] {
        ledger
            .create_entry(
                CreateEntryCmd::new(budget.id, 1, direction, Money::new(cents))
                    .occurred_on(date(2026, 8, day)),
            )
            .await
            .unwrap();
    }

    let kpi = ledger
        .kpi(budget.id, date(2026, 8, 1), date(2026, 8, 31))
        .await
        .unwrap();
    assert_eq!(kpi.total_income, Money::new(10_000));
    assert_eq!(kpi.total_expense, Money::new(4_000));
    assert_eq!(kpi.balance, Money::new(6_000));

    // Both bounds are inclusive.
    let partial = ledger
        .kpi(budget.id, date(2026, 8, 15), date(2026, 8, 31))
        .await
        .unwrap();
    assert_eq!(partial.total_expense, Money::new(4_000));
    assert_eq!(partial.total_income, Money::ZERO);
}

#[tokio::test]
async fn kpi_on_an_empty_budget_is_zero() {
    let ledger = ledger_with_db().await;
    let budget = ledger
        .ensure_for_owner(OwnerRef::User(1), BudgetDefaults::default())
        .await
        .unwrap();

    let kpi = ledger
        .kpi(budget.id, date(2026, 1, 1), date(2026, 12, 31))
        .await
        .unwrap();
    assert_eq!(kpi.total_income, Money::ZERO);
    assert_eq!(kpi.total_expense, Money::ZERO);
    assert_eq!(kpi.balance, Money::ZERO);
}

#[tokio::test]
async fn cashflow_groups_by_day_ascending() {
    let ledger = ledger_with_db().await;
    let budget = ledger
        .ensure_for_owner(OwnerRef::User(1), BudgetDefaults::default())
        .await
        .unwrap();

    for (day, direction, cents) in [
        (3, Direction::Expense, 500),
        (1, Direction::Income, 2_000),
        (3, Direction::Income, 700),
    ] {
        ledger
            .create_entry(
                CreateEntryCmd::new(budget.id, 1, direction, Money::new(cents))
                    .occurred_on(date(2026, 8, day)),
            )
            .await
            .unwrap();
    }

    let points = ledger
        .cashflow(budget.id, date(2026, 8, 1), date(2026, 8, 31))
        .await
        .unwrap();

    // Quiet days produce no point.
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].date, date(2026, 8, 1));
    assert_eq!(points[0].income, Money::new(2_000));
    assert_eq!(points[0].expense, Money::ZERO);
    assert_eq!(points[1].date, date(2026, 8, 3));
    assert_eq!(points[1].income, Money::new(700));
    assert_eq!(points[1].expense, Money::new(500));
}

#[tokio::test]
async fn category_breakdown_shares_the_grand_total() {
    let ledger = ledger_with_db().await;
    let budget = ledger
        .ensure_for_owner(OwnerRef::User(1), BudgetDefaults::default())
        .await
        .unwrap();
    let groceries = ledger.category_by_name("Groceries").await.unwrap();

    ledger
        .create_entry(
            CreateEntryCmd::new(budget.id, 1, Direction::Expense, Money::new(2_000))
                .category_id(groceries.id)
                .occurred_on(date(2026, 8, 2)),
        )
        .await
        .unwrap();
    ledger
        .create_entry(
            CreateEntryCmd::new(budget.id, 1, Direction::Expense, Money::new(1_000))
                .occurred_on(date(2026, 8, 3)),
        )
        .await
        .unwrap();
    // Income entries stay out of an expense breakdown.
    ledger
        .create_entry(
            CreateEntryCmd::new(budget.id, 1, Direction::Income, Money::new(9_000))
                .occurred_on(date(2026, 8, 4)),
        )
        .await
        .unwrap();

    let stats = ledger
        .category_breakdown(budget.id, Direction::Expense)
        .await
        .unwrap();

    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0].category, "Groceries");
    assert_eq!(stats[0].total_amount, Money::new(2_000));
    assert_eq!(stats[0].count, 1);
    assert_eq!(stats[0].percentage, 66.67);
    // Uncategorized entries land in one shared bucket.
    assert_eq!(stats[1].category, "Other");
    assert_eq!(stats[1].percentage, 33.33);
}

#[tokio::test]
async fn category_breakdown_tolerates_an_empty_budget() {
    let ledger = ledger_with_db().await;
    let budget = ledger
        .ensure_for_owner(OwnerRef::User(1), BudgetDefaults::default())
        .await
        .unwrap();

    let stats = ledger
        .category_breakdown(budget.id, Direction::Expense)
        .await
        .unwrap();
    assert!(stats.is_empty());
}

#[tokio::test]
async fn rolling_progress_caps_at_one_hundred_percent() {
    let ledger = ledger_with_db().await;
    let event = OwnerRef::Event(5);
    let budget = ledger
        .ensure_for_owner(
            event,
            BudgetDefaults {
                planned_amount: Money::new(1_000),
                ..BudgetDefaults::default()
            },
        )
        .await
        .unwrap();
    ledger
        .create_entry(
            CreateEntryCmd::new(budget.id, 1, Direction::Income, Money::new(5_000))
                .occurred_on(date(2026, 8, 10)),
        )
        .await
        .unwrap();
    ledger.recalc(budget.id).await.unwrap();

    let progress = ledger
        .rolling_progress(event, Some(date(2026, 8, 20)), 30)
        .await
        .unwrap();

    assert_eq!(progress.percent, 100.0);
    assert_eq!(progress.series.len(), 31);
    assert_eq!(progress.series[0].date, date(2026, 7, 21));
    assert_eq!(progress.series[30].date, date(2026, 8, 20));
    let active: Vec<_> = progress
        .series
        .iter()
        .filter(|p| p.total != Money::ZERO)
        .collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].date, date(2026, 8, 10));
    assert_eq!(active[0].total, Money::new(5_000));
}

#[tokio::test]
async fn rolling_progress_rounds_to_one_decimal() {
    let ledger = ledger_with_db().await;
    let event = OwnerRef::Event(6);
    let budget = ledger
        .ensure_for_owner(
            event,
            BudgetDefaults {
                planned_amount: Money::new(30_000),
                ..BudgetDefaults::default()
            },
        )
        .await
        .unwrap();
    ledger
        .create_entry(
            CreateEntryCmd::new(budget.id, 1, Direction::Income, Money::new(10_000))
                .occurred_on(date(2026, 8, 10)),
        )
        .await
        .unwrap();
    ledger.recalc(budget.id).await.unwrap();

    let progress = ledger
        .rolling_progress(event, Some(date(2026, 8, 20)), 30)
        .await
        .unwrap();

    // 10000 / 30000 = 33.333... -> one decimal.
    assert_eq!(progress.percent, 33.3);
}

#[tokio::test]
async fn rolling_progress_on_a_goal_less_empty_budget_is_zero() {
    let ledger = ledger_with_db().await;
    let event = OwnerRef::Event(7);
    ledger
        .ensure_for_owner(event, BudgetDefaults::default())
        .await
        .unwrap();

    let progress = ledger
        .rolling_progress(event, Some(date(2026, 8, 20)), 7)
        .await
        .unwrap();

    assert_eq!(progress.percent, 0.0);
    assert_eq!(progress.series.len(), 8);
    assert!(progress.series.iter().all(|p| p.total == Money::ZERO));
}

#[tokio::test]
async fn leaderboard_ranks_income_contributors() {
    let ledger = ledger_with_db().await;
    let event = OwnerRef::Event(5);
    let event_budget = ledger
        .ensure_for_owner(event, BudgetDefaults::default())
        .await
        .unwrap();
    for payer in 1..=3 {
        ledger
            .ensure_for_owner(
                OwnerRef::User(payer),
                BudgetDefaults {
                    start_amount: Money::new(100_000),
                    ..BudgetDefaults::default()
                },
            )
            .await
            .unwrap();
    }

    for (payer, cents) in [(1, 2_000), (2, 5_000), (3, 1_000), (1, 1_500)] {
        ledger
            .transfer(TransferCmd::new(
                OwnerRef::User(payer),
                event,
                payer,
                Money::new(cents),
            ))
            .await
            .unwrap();
    }

    let top = ledger.leaderboard(event_budget.id, 2).await.unwrap();

    assert_eq!(top.len(), 2);
    assert_eq!(top[0].payer_id, 2);
    assert_eq!(top[0].total_contributed, Money::new(5_000));
    assert_eq!(top[1].payer_id, 1);
    assert_eq!(top[1].total_contributed, Money::new(3_500));
}

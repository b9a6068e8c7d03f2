mod common;

use budget_forecast::config::{ConfigManager, EngineConfig};
use budget_forecast::core::{LedgerSnapshot, RecomputePass, RecordStore};
use budget_forecast::ledger::{BudgetCategoryRecord, CategoryKind, Frequency, MonthKey};
use budget_forecast::utils::persistence::{load_or_default, save_snapshot_to_file};
use common::{at, date, monthly_expenses, template};
use rust_decimal_macros::dec;
use tempfile::tempdir;

fn household() -> LedgerSnapshot {
    let first = MonthKey::new(2024, 10).unwrap();
    let mut transactions = monthly_expenses(
        CategoryKind::Groceries,
        first,
        &[dec!(380), dec!(395), dec!(410), dec!(440), dec!(470), dec!(500)],
    );
    transactions.extend(monthly_expenses(
        CategoryKind::Entertainment,
        first,
        &[dec!(60); 6],
    ));

    LedgerSnapshot::new()
        .with_transactions(transactions)
        .with_categories(vec![
            BudgetCategoryRecord::new(CategoryKind::Groceries, dec!(450)).unwrap(),
            BudgetCategoryRecord::new(CategoryKind::Entertainment, dec!(100)).unwrap(),
            BudgetCategoryRecord::new(CategoryKind::Subscriptions, dec!(40)).unwrap(),
        ])
        .with_templates(vec![
            template("Streaming", dec!(15.99), Frequency::Monthly, date(2025, 4, 2))
                .with_category(CategoryKind::Subscriptions),
            template("Ancient", dec!(1), Frequency::Weekly, date(2001, 1, 1)),
            template("Gym", dec!(35), Frequency::Monthly, date(2025, 4, 1))
                .with_category(CategoryKind::Entertainment)
                .with_auto_pay(false),
        ])
}

#[test]
fn pass_is_repeatable_and_reports_problems() {
    let mut store = household();
    let pass = RecomputePass::new(EngineConfig::default()).unwrap();
    let now = at(2025, 4, 20);

    let summary = pass.run(&mut store, now).unwrap();
    assert_eq!(summary.generated, 1);
    assert_eq!(summary.overflows.len(), 1);
    assert_eq!(summary.awaiting_confirmation.len(), 1);
    assert_eq!(summary.awaiting_confirmation[0].name, "Gym");

    let subscriptions = store
        .budget_categories()
        .unwrap()
        .into_iter()
        .find(|category| category.kind == CategoryKind::Subscriptions)
        .unwrap();
    assert_eq!(subscriptions.spent_amount(), dec!(15.99));

    let groceries = summary.forecast.forecast_for(CategoryKind::Groceries).unwrap();
    assert!(groceries.is_at_risk());
    assert_eq!(summary.forecast.at_risk[0].category, CategoryKind::Groceries);

    let count = store.transactions.len();
    let again = pass.run(&mut store, now).unwrap();
    assert_eq!(again.generated, 0);
    assert_eq!(store.transactions.len(), count);
    assert_eq!(again.forecast.forecasts, summary.forecast.forecasts);
}

#[test]
fn snapshot_and_config_persist_between_passes() {
    let dir = tempdir().unwrap();
    let ledger_path = dir.path().join("ledger.json");
    let config_manager = ConfigManager::new(dir.path().join("engine.json"));

    let config = EngineConfig {
        history_window: 3,
        ..config_manager.load().unwrap()
    };
    config_manager.save(&config).unwrap();

    let mut store = load_or_default(&ledger_path).unwrap();
    assert!(store.transactions.is_empty());
    store = household();

    let pass = RecomputePass::new(config_manager.load().unwrap()).unwrap();
    let summary = pass.run(&mut store, at(2025, 4, 20)).unwrap();
    assert_eq!(summary.forecast.window.len(), 3);
    save_snapshot_to_file(&store, &ledger_path).unwrap();

    let mut reloaded = load_or_default(&ledger_path).unwrap();
    assert_eq!(reloaded, store);
    let replay = pass.run(&mut reloaded, at(2025, 4, 20)).unwrap();
    assert_eq!(replay.inserted, 0);
}

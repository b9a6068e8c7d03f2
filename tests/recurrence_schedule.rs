mod common;

use budget_forecast::config::EngineConfig;
use budget_forecast::errors::ScheduleError;
use budget_forecast::ledger::{
    advance_due_date, occurrence_id, overdue_periods, process_overdue, snapshot_templates,
    Frequency, ScheduledStatus, TemplateState,
};
use common::{at, date, template};
use rust_decimal_macros::dec;

#[test]
fn monthly_clamp_literal() {
    assert_eq!(
        advance_due_date(date(2025, 1, 31), Frequency::Monthly),
        Some(date(2025, 2, 28))
    );
    assert_eq!(
        advance_due_date(date(2024, 1, 31), Frequency::Monthly),
        Some(date(2024, 2, 29))
    );
}

#[test]
fn due_dates_always_move_forward() {
    let mut seeds = Vec::new();
    let mut day = date(2023, 12, 25);
    while day <= date(2024, 3, 5) {
        seeds.push(day);
        day = day.succ_opt().unwrap();
    }
    for frequency in Frequency::ALL {
        for seed in &seeds {
            let next = advance_due_date(*seed, frequency).unwrap();
            assert!(next > *seed, "{} from {}", frequency, seed);
        }
    }
}

#[test]
fn end_of_life_literal() {
    // Next occurrence would be Mar 15; the template ends the day before.
    let gym = template("Gym", dec!(45), Frequency::Monthly, date(2025, 1, 15))
        .with_end_date(date(2025, 3, 14))
        .unwrap();
    let run = process_overdue(&gym, at(2025, 6, 1), &EngineConfig::default()).unwrap();

    let dates: Vec<_> = run.generated.iter().map(|txn| txn.date).collect();
    assert_eq!(dates, vec![date(2025, 1, 15), date(2025, 2, 15)]);
    assert_eq!(run.template.state(), TemplateState::Ended);
    assert!(run.ended());

    let after = process_overdue(&run.template, at(2026, 1, 1), &EngineConfig::default()).unwrap();
    assert!(after.generated.is_empty());
}

#[test]
fn second_run_at_same_instant_generates_nothing() {
    let config = EngineConfig::default();
    let insurance = template("Insurance", dec!(310), Frequency::Quarterly, date(2024, 2, 29));
    let now = at(2025, 3, 1);

    let first = process_overdue(&insurance, now, &config).unwrap();
    let second = process_overdue(&first.template, now, &config).unwrap();
    assert_eq!(first.generated.len(), 5);
    assert!(second.generated.is_empty());
    assert_eq!(second.template, first.template);

    // A duplicate invocation on the stale template yields the same records.
    let duplicate = process_overdue(&insurance, now, &config).unwrap();
    let ids: Vec<_> = duplicate.generated.iter().map(|txn| txn.id).collect();
    let originals: Vec<_> = first.generated.iter().map(|txn| txn.id).collect();
    assert_eq!(ids, originals);
    assert_eq!(ids[0], occurrence_id(insurance.id, date(2024, 2, 29)));
}

#[test]
fn generated_records_reference_their_template() {
    let salary = template("Salary", dec!(2800), Frequency::Biweekly, date(2025, 1, 3));
    let run = process_overdue(&salary, at(2025, 2, 14), &EngineConfig::default()).unwrap();
    assert_eq!(run.generated.len(), 4);
    assert!(run
        .generated
        .iter()
        .all(|txn| txn.origin_template == Some(salary.id) && txn.amount == dec!(2800)));
    let refs: Vec<_> = run.generated.iter().map(|txn| txn.id).collect();
    assert_eq!(run.template.generated(), refs.as_slice());
}

#[test]
fn paused_template_does_not_catch_up_on_resume() {
    let config = EngineConfig::default();
    let mut music = template("Music", dec!(11), Frequency::Monthly, date(2025, 1, 1));
    music.pause(at(2025, 1, 2)).unwrap();

    let paused = process_overdue(&music, at(2025, 5, 1), &config).unwrap();
    assert!(paused.generated.is_empty());
    assert_eq!(paused.template.next_due_date(), date(2025, 1, 1));

    music.resume(at(2025, 5, 1)).unwrap();
    assert_eq!(music.next_due_date(), date(2025, 1, 1));
    assert_eq!(overdue_periods(&music, at(2025, 5, 1), 100), 5);

    let caught_up = process_overdue(&music, at(2025, 5, 1), &config).unwrap();
    assert_eq!(caught_up.generated.len(), 5);
}

#[test]
fn runaway_backlog_is_reported_not_truncated() {
    let stale = template("Newspaper", dec!(3), Frequency::Weekly, date(1990, 1, 1));
    let err = process_overdue(&stale, at(2025, 1, 1), &EngineConfig::default()).unwrap_err();
    assert_eq!(
        err,
        ScheduleError::Overflow {
            template_id: stale.id,
            pending_since: date(1990, 1, 1),
            cap: 520,
        }
    );
    assert_eq!(stale.next_due_date(), date(1990, 1, 1));
}

#[test]
fn snapshots_classify_upcoming_work() {
    let config = EngineConfig::default();
    let now = at(2025, 3, 10);
    let overdue = template("Rent", dec!(1200), Frequency::Monthly, date(2025, 3, 1));
    let pending = template("Phone", dec!(30), Frequency::Monthly, date(2025, 3, 14));
    let future = template("Car", dec!(600), Frequency::Yearly, date(2025, 9, 1));

    let snapshots = snapshot_templates(&[future, pending, overdue], now, &config);
    let statuses: Vec<_> = snapshots.iter().map(|snap| (snap.name.as_str(), snap.status)).collect();
    assert_eq!(
        statuses,
        vec![
            ("Rent", Some(ScheduledStatus::Overdue)),
            ("Phone", Some(ScheduledStatus::Pending)),
            ("Car", Some(ScheduledStatus::Future)),
        ]
    );
    assert_eq!(snapshots[0].overdue, 1);
}

#![allow(dead_code)]

use budget_forecast::ledger::{
    CategoryKind, Frequency, MonthKey, RecurringTemplate, TransactionKind, TransactionRecord,
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// One expense per month on the 10th, starting at `first`.
pub fn monthly_expenses(
    category: CategoryKind,
    first: MonthKey,
    amounts: &[Decimal],
) -> Vec<TransactionRecord> {
    let mut month = first;
    let mut records = Vec::new();
    for amount in amounts {
        let day = date(month.year, month.month, 10);
        records.push(TransactionRecord::expense(*amount, day, category));
        month = month.next();
    }
    records
}

pub fn template(name: &str, amount: Decimal, frequency: Frequency, start: NaiveDate) -> RecurringTemplate {
    RecurringTemplate::new(name, amount, TransactionKind::Expense, frequency, start)
        .expect("valid template")
        .with_auto_pay(true)
}

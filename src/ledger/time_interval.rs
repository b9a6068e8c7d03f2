use std::fmt;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Cadence at which a recurring template produces transactions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    pub const ALL: [Frequency; 5] = [
        Frequency::Weekly,
        Frequency::Biweekly,
        Frequency::Monthly,
        Frequency::Quarterly,
        Frequency::Yearly,
    ];

    /// Calculates the occurrence following `from`.
    ///
    /// Month-based cadences keep the day of month and clamp to the last valid
    /// day when the target month is shorter. Returns `None` only when the
    /// result falls outside the representable calendar.
    pub fn next_date(&self, from: NaiveDate) -> Option<NaiveDate> {
        match self {
            Frequency::Weekly => from.checked_add_signed(Duration::days(7)),
            Frequency::Biweekly => from.checked_add_signed(Duration::days(14)),
            Frequency::Monthly => shift_month(from, 1),
            Frequency::Quarterly => shift_month(from, 3),
            Frequency::Yearly => shift_year(from, 1),
        }
    }

    pub fn periods_per_year(&self) -> usize {
        match self {
            Frequency::Weekly => 52,
            Frequency::Biweekly => 26,
            Frequency::Monthly => 12,
            Frequency::Quarterly => 4,
            Frequency::Yearly => 1,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Frequency::Weekly => "Weekly",
            Frequency::Biweekly => "Every 2 Weeks",
            Frequency::Monthly => "Monthly",
            Frequency::Quarterly => "Quarterly",
            Frequency::Yearly => "Yearly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Advances a due date by one period of `frequency`.
pub fn advance_due_date(current: NaiveDate, frequency: Frequency) -> Option<NaiveDate> {
    frequency.next_date(current)
}

fn shift_month(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    let mut year = date.year();
    let mut month = date.month() as i32 + months;
    while month > 12 {
        month -= 12;
        year += 1;
    }
    while month < 1 {
        month += 12;
        year -= 1;
    }
    let day = date.day().min(days_in_month(year, month as u32)?);
    NaiveDate::from_ymd_opt(year, month as u32, day)
}

fn shift_year(date: NaiveDate, years: i32) -> Option<NaiveDate> {
    let year = date.year() + years;
    let month = date.month();
    let day = date.day().min(days_in_month(year, month)?);
    NaiveDate::from_ymd_opt(year, month, day)
}

pub(crate) fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    match NaiveDate::from_ymd_opt(next_year, next_month, 1) {
        Some(first_next) => Some((first_next - first).num_days() as u32),
        // December of the last representable year.
        None => Some(31),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn weekly_and_biweekly_add_fixed_days() {
        let start = date(2025, 1, 1);
        assert_eq!(Frequency::Weekly.next_date(start), Some(date(2025, 1, 8)));
        assert_eq!(Frequency::Biweekly.next_date(start), Some(date(2025, 1, 15)));
    }

    #[test]
    fn monthly_clamps_to_short_months() {
        assert_eq!(
            advance_due_date(date(2025, 1, 31), Frequency::Monthly),
            Some(date(2025, 2, 28))
        );
        assert_eq!(
            advance_due_date(date(2024, 1, 31), Frequency::Monthly),
            Some(date(2024, 2, 29))
        );
        assert_eq!(
            advance_due_date(date(2024, 12, 15), Frequency::Monthly),
            Some(date(2025, 1, 15))
        );
    }

    #[test]
    fn quarterly_clamps_and_wraps_year() {
        assert_eq!(
            Frequency::Quarterly.next_date(date(2024, 11, 30)),
            Some(date(2025, 2, 28))
        );
        assert_eq!(
            Frequency::Quarterly.next_date(date(2025, 1, 31)),
            Some(date(2025, 4, 30))
        );
    }

    #[test]
    fn yearly_clamps_leap_day() {
        assert_eq!(
            Frequency::Yearly.next_date(date(2024, 2, 29)),
            Some(date(2025, 2, 28))
        );
        assert_eq!(
            Frequency::Yearly.next_date(date(2023, 6, 1)),
            Some(date(2024, 6, 1))
        );
    }

    #[test]
    fn every_frequency_moves_strictly_forward() {
        let samples = [
            date(2024, 1, 31),
            date(2024, 2, 29),
            date(2023, 12, 31),
            date(2025, 3, 15),
            date(2025, 8, 31),
        ];
        for frequency in Frequency::ALL {
            for sample in samples {
                let next = advance_due_date(sample, frequency).unwrap();
                assert!(next > sample, "{frequency} did not advance {sample}");
            }
        }
    }

    #[test]
    fn days_in_month_matches_calendar() {
        assert_eq!(days_in_month(2023, 2), Some(28));
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2024, 12), Some(31));
        assert_eq!(days_in_month(2024, 13), None);
    }
}

use chrono::{Datelike, Duration, NaiveDate};

use crate::error::CalendarError;

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Name of a weekday numbered from Monday = 0.
pub fn weekday_name(weekday: u32) -> Result<&'static str, CalendarError> {
    usize::try_from(weekday)
        .ok()
        .and_then(|index| WEEKDAYS.get(index).copied())
        .ok_or(CalendarError::InvalidWeekday(weekday))
}

/// Date of the `n`th occurrence of `weekday` (Monday = 0) in a month.
///
/// `nth_weekday_in_month(2, 6, 3, 2024)` is the second Sunday of March 2024.
pub fn nth_weekday_in_month(
    n: u32,
    weekday: u32,
    month: u32,
    year: i32,
) -> Result<NaiveDate, CalendarError> {
    let name = weekday_name(weekday)?;
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or(CalendarError::InvalidMonth { month, year })?;
    let no_such = CalendarError::NoSuchWeekday {
        n,
        weekday: name,
        month,
        year,
    };
    if n == 0 {
        return Err(no_such);
    }

    let lead = (weekday + 7 - first.weekday().num_days_from_monday()) % 7;
    let offset = i64::from(lead) + (i64::from(n) - 1) * 7;
    first
        .checked_add_signed(Duration::days(offset))
        .filter(|date| date.month() == month)
        .ok_or(no_such)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{nth_weekday_in_month, weekday_name};
    use crate::error::CalendarError;

    #[test]
    fn names_weekdays_from_monday() {
        assert_eq!(weekday_name(0), Ok("Monday"));
        assert_eq!(weekday_name(6), Ok("Sunday"));
        assert_eq!(weekday_name(7), Err(CalendarError::InvalidWeekday(7)));
    }

    #[test]
    fn finds_daylight_saving_sundays() {
        assert_eq!(
            nth_weekday_in_month(2, 6, 3, 2024),
            Ok(NaiveDate::from_ymd_opt(2024, 3, 10).expect("date"))
        );
        assert_eq!(
            nth_weekday_in_month(1, 6, 11, 2024),
            Ok(NaiveDate::from_ymd_opt(2024, 11, 3).expect("date"))
        );
    }

    #[test]
    fn first_day_of_month_counts_as_first_occurrence() {
        // 2024-03-01 is a Friday.
        assert_eq!(
            nth_weekday_in_month(1, 4, 3, 2024),
            Ok(NaiveDate::from_ymd_opt(2024, 3, 1).expect("date"))
        );
        assert_eq!(
            nth_weekday_in_month(5, 4, 3, 2024),
            Ok(NaiveDate::from_ymd_opt(2024, 3, 29).expect("date"))
        );
    }

    #[test]
    fn rejects_occurrences_outside_the_month() {
        assert_eq!(
            nth_weekday_in_month(6, 6, 3, 2024),
            Err(CalendarError::NoSuchWeekday {
                n: 6,
                weekday: "Sunday",
                month: 3,
                year: 2024,
            })
        );
        assert_eq!(
            nth_weekday_in_month(1, 6, 13, 2024),
            Err(CalendarError::InvalidMonth {
                month: 13,
                year: 2024
            })
        );
        assert_eq!(
            nth_weekday_in_month(1, 9, 3, 2024),
            Err(CalendarError::InvalidWeekday(9))
        );
    }
}

use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::BTreeSet;

/// Which days a run should cover.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateSelection {
    pub dates: Vec<NaiveDate>,
    pub today: bool,
    pub yesterday: bool,
    pub from: Option<NaiveDate>,
    /// End of the range; defaults to `today` when only `from` is given.
    pub to: Option<NaiveDate>,
}

impl DateSelection {
    /// Expand the selection into unique dates in chronological order.
    ///
    /// `today` is passed in rather than read from the clock so runs are
    /// reproducible. An inverted range contributes no dates.
    pub fn enumerate(&self, today: NaiveDate) -> Vec<NaiveDate> {
        let mut dates: BTreeSet<NaiveDate> = self.dates.iter().copied().collect();

        if self.today {
            dates.insert(today);
        }
        if self.yesterday {
            dates.insert(today - Duration::days(1));
        }
        if let Some(from) = self.from {
            let to = self.to.unwrap_or(today);
            dates.extend(from.iter_days().take_while(|day| *day <= to));
        }

        dates.into_iter().collect()
    }
}

/// Parse a date, ignoring any time-of-day component.
pub fn parse_date(input: &str) -> Result<NaiveDate, chrono::ParseError> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .or_else(|e| {
            NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S")
                .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S"))
                .map(|dt| dt.date())
                .map_err(|_| e)
        })
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };

    match (
        NaiveDate::from_ymd_opt(year, month, 1),
        NaiveDate::from_ymd_opt(next_year, next_month, 1),
    ) {
        (Some(first), Some(next)) => (next - first).num_days() as u32,
        _ => 0,
    }
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

use std::fmt::Write;

use anyhow::bail;
use chrono::{
    format::{Item, StrftimeItems},
    Datelike, Days, NaiveDate, Weekday,
};
use serde::Serialize;

use crate::config::DailyConfig;

/// Format `date` with a user supplied strftime string. Unknown specifiers
/// are an error instead of a panic.
pub fn format_date(date: NaiveDate, fmt: &str) -> anyhow::Result<String> {
    let items: Vec<Item> = StrftimeItems::new(fmt).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        bail!("invalid date format {fmt:?}");
    }

    let mut out = String::new();
    write!(out, "{}", date.format_with_items(items.into_iter()))?;
    Ok(out)
}

/// Vault-relative path of the daily note for `date`.
pub fn daily_note_path(config: &DailyConfig, date: NaiveDate) -> anyhow::Result<String> {
    let file = format_date(date, &config.file_format)?;
    let folder = config.folder.trim_matches('/');
    if folder.is_empty() {
        Ok(format!("{file}.md"))
    } else {
        Ok(format!("{folder}/{file}.md"))
    }
}

pub fn daily_label(config: &DailyConfig, date: NaiveDate) -> anyhow::Result<String> {
    format_date(date, &config.label_format)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekDay {
    pub date: String,
    pub day_number: String,
    pub short_name: String,
    pub is_active: bool,
    pub is_weekend: bool,
    pub has_note: bool,
}

/// The seven days of the week containing `today`.
pub fn week_days(
    today: NaiveDate,
    week_starts_on_monday: bool,
    has_note: impl Fn(NaiveDate) -> bool,
) -> Vec<WeekDay> {
    let offset = if week_starts_on_monday {
        today.weekday().num_days_from_monday()
    } else {
        today.weekday().num_days_from_sunday()
    };
    let start = today - Days::new(offset as u64);

    (0..7)
        .map(|i| {
            let date = start + Days::new(i);
            WeekDay {
                date: date.format("%Y-%m-%d").to_string(),
                day_number: date.format("%d").to_string(),
                short_name: date.format("%a").to_string(),
                is_active: date == today,
                is_weekend: matches!(date.weekday(), Weekday::Sat | Weekday::Sun),
                has_note: has_note(date),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_daily_note_path() {
        let mut config = DailyConfig::default();
        assert_eq!(
            daily_note_path(&config, day("2024-03-07")).unwrap(),
            "2024-03-07.md"
        );

        config.folder = "/Journal/Daily/".into();
        config.file_format = "%Y/%m/%d".into();
        assert_eq!(
            daily_note_path(&config, day("2024-03-07")).unwrap(),
            "Journal/Daily/2024/03/07.md"
        );
    }

    #[test]
    fn test_daily_label_default_format() {
        let config = DailyConfig::default();
        assert_eq!(
            daily_label(&config, day("2024-03-07")).unwrap(),
            "Thursday 07, March"
        );
    }

    #[test]
    fn test_invalid_format_is_an_error() {
        assert!(format_date(day("2024-03-07"), "%Q").is_err());
    }

    #[test]
    fn test_week_days_monday_start() {
        // 2024-03-07 is a Thursday
        let days = week_days(day("2024-03-07"), true, |d| d == day("2024-03-05"));
        assert_eq!(days.len(), 7);
        assert_eq!(days[0].date, "2024-03-04");
        assert_eq!(days[0].short_name, "Mon");
        assert_eq!(days[6].date, "2024-03-10");

        let active: Vec<_> = days.iter().filter(|d| d.is_active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].day_number, "07");

        let weekend: Vec<_> = days.iter().filter(|d| d.is_weekend).map(|d| d.short_name.as_str()).collect();
        assert_eq!(weekend, vec!["Sat", "Sun"]);

        assert!(days[1].has_note);
        assert_eq!(days.iter().filter(|d| d.has_note).count(), 1);
    }

    #[test]
    fn test_week_days_sunday_start() {
        let days = week_days(day("2024-03-07"), false, |_| false);
        assert_eq!(days[0].date, "2024-03-03");
        assert_eq!(days[0].short_name, "Sun");
        assert!(days[0].is_weekend);
        assert_eq!(days[6].date, "2024-03-09");
    }
}

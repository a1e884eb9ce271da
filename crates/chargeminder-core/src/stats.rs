//! Statistics derived from the charge history.

use chrono::{DateTime, Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::records::ChargeRecord;

/// Days the per-day average is spread over.
const AVERAGE_WINDOW_DAYS: f64 = 30.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeStats {
    pub total_charges: usize,
    /// Charges within the last seven days.
    pub this_week: usize,
    /// Charges per day over a 30-day window, one decimal.
    pub avg_per_day: f64,
    /// Consecutive charged days ending today or yesterday.
    pub current_run: u32,
    /// Longest run of consecutive charged days in the history.
    pub longest_run: u32,
}

/// Records of one calendar day, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayGroup {
    pub date: String,
    pub label: String,
    pub records: Vec<ChargeRecord>,
}

pub fn charge_stats(records: &[ChargeRecord], now: DateTime<Local>) -> ChargeStats {
    let week_ago = (now - Duration::days(7)).timestamp_millis();
    let this_week = records.iter().filter(|r| r.timestamp > week_ago).count();
    let avg_per_day = (records.len() as f64 / AVERAGE_WINDOW_DAYS * 10.0).round() / 10.0;
    let dates = distinct_dates_desc(records);

    ChargeStats {
        total_charges: records.len(),
        this_week,
        avg_per_day,
        current_run: current_run(&dates, now.date_naive()),
        longest_run: longest_run(&dates),
    }
}

fn distinct_dates_desc(records: &[ChargeRecord]) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = records
        .iter()
        .filter_map(|r| NaiveDate::parse_from_str(&r.date, "%Y-%m-%d").ok())
        .collect();
    dates.sort_unstable_by(|a, b| b.cmp(a));
    dates.dedup();
    dates
}

fn current_run(dates: &[NaiveDate], today: NaiveDate) -> u32 {
    let Some(&first) = dates.first() else {
        return 0;
    };
    if (today - first).num_days() > 1 {
        return 0;
    }
    1 + dates
        .windows(2)
        .take_while(|w| (w[0] - w[1]).num_days() == 1)
        .count() as u32
}

fn longest_run(dates: &[NaiveDate]) -> u32 {
    if dates.is_empty() {
        return 0;
    }
    let mut best = 1;
    let mut run = 1;
    for w in dates.windows(2) {
        if (w[0] - w[1]).num_days() == 1 {
            run += 1;
            best = best.max(run);
        } else {
            run = 1;
        }
    }
    best
}

/// "Today", "Yesterday", or e.g. "Monday 3 June".
pub fn day_label(date: &str, today: NaiveDate) -> String {
    let Ok(day) = NaiveDate::parse_from_str(date, "%Y-%m-%d") else {
        return date.to_string();
    };
    match (today - day).num_days() {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        _ => day.format("%A %-d %B").to_string(),
    }
}

/// Group a newest-first history by calendar date.
pub fn group_by_date(records: &[ChargeRecord], today: NaiveDate) -> Vec<DayGroup> {
    let mut groups: Vec<DayGroup> = Vec::new();
    for record in records {
        match groups.iter_mut().find(|g| g.date == record.date) {
            Some(group) => group.records.push(record.clone()),
            None => groups.push(DayGroup {
                date: record.date.clone(),
                label: day_label(&record.date, today),
                records: vec![record.clone()],
            }),
        }
    }
    groups
}

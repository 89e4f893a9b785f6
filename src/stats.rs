use crate::models::{DashboardResponse, Record};
use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Day,
    Week,
    Month,
}

impl Period {
    /// Inclusive date window for the period containing `reference`.
    ///
    /// Weeks run Monday through Sunday even when part of the week is still
    /// ahead; months only run up to the reference date.
    pub fn window(self, reference: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            Period::Day => (reference, reference),
            Period::Week => {
                let start = week_start(reference);
                (start, start + Duration::days(6))
            }
            Period::Month => (month_start(reference), reference),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standing {
    pub name: String,
    pub score: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Leaderboard {
    pub period: Period,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub standings: Vec<Standing>,
    pub winner: Option<Standing>,
}

impl Leaderboard {
    pub fn winner(&self) -> Option<&Standing> {
        self.winner.as_ref()
    }

    pub fn total_for(&self, name: &str) -> Option<i64> {
        self.standings
            .iter()
            .find(|standing| standing.name == name)
            .map(|standing| standing.score)
    }
}

/// Sums scores per name over the period window, highest first. Equal sums
/// are listed alphabetically.
pub fn aggregate(records: &[Record], period: Period, reference: NaiveDate) -> Leaderboard {
    let (start, end) = period.window(reference);

    let mut totals: BTreeMap<&str, i64> = BTreeMap::new();
    for record in records
        .iter()
        .filter(|record| record.date() >= start && record.date() <= end)
    {
        let total = totals.entry(record.name()).or_insert(0);
        *total = total.saturating_add(record.score());
    }

    let mut standings: Vec<Standing> = totals
        .into_iter()
        .map(|(name, score)| Standing {
            name: name.to_string(),
            score,
        })
        .collect();
    // stable: BTreeMap order survives among ties
    standings.sort_by(|a, b| b.score.cmp(&a.score));

    Leaderboard {
        period,
        start_date: start,
        end_date: end,
        winner: standings.first().cloned(),
        standings,
    }
}

pub fn entries_on(records: &[Record], date: NaiveDate) -> Vec<Record> {
    let mut entries: Vec<Record> = records
        .iter()
        .filter(|record| record.date() == date)
        .cloned()
        .collect();
    entries.sort_by(|a, b| a.name().cmp(b.name()));
    entries
}

pub fn build_dashboard_at(today: NaiveDate, records: &[Record]) -> DashboardResponse {
    DashboardResponse {
        today,
        entries: entries_on(records, today),
        daily: aggregate(records, Period::Day, today),
        weekly: aggregate(records, Period::Week, today),
        monthly: aggregate(records, Period::Month, today),
    }
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.day0() as i64)
}

use crate::date::{add_days, iso_week_key, previous_date, previous_week_key, week_key_start};
use crate::due::is_due_on;
use crate::model::{Habit, HabitLog};
use crate::schedule::Schedule;
use std::collections::{BTreeMap, BTreeSet};

/// Hard bound for the backward daily walk, on top of the created-date
/// floor, so a record with a corrupt creation date still terminates.
const MAX_BACKWARD_DAYS: usize = 1096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct StreakSummary {
    pub current_daily: u32,
    pub best_daily: u32,
    pub current_weekly: u32,
    pub best_weekly: u32,
}

/// Current/best daily and weekly streaks for one habit.
///
/// The historical (best) scans consider only dates that have a log row:
/// a scheduled date nobody ever touched is invisible to them, which
/// avoids enumerating the habit's whole lifetime. The current-streak
/// walks enumerate backward from `today` explicitly, since a live figure
/// is required.
pub fn compute_streaks(habit: &Habit, logs: &[HabitLog], today: &str) -> StreakSummary {
    let mut by_date: BTreeMap<&str, &HabitLog> = BTreeMap::new();
    for l in logs.iter().filter(|l| l.habit_id == habit.id) {
        by_date.insert(l.date.as_str(), l);
    }

    let best_daily = best_daily_streak(habit, &by_date);
    let current_daily = current_daily_streak(habit, &by_date, today);

    let (current_weekly, best_weekly) = match habit.schedule {
        Schedule::Weekly { .. } => (
            current_weekly_streak(habit, &by_date, today),
            best_weekly_streak(habit, &by_date),
        ),
        _ => (0, 0),
    };

    StreakSummary {
        current_daily,
        best_daily,
        current_weekly,
        best_weekly,
    }
}

fn best_daily_streak(habit: &Habit, by_date: &BTreeMap<&str, &HabitLog>) -> u32 {
    let mut best = 0u32;
    let mut run = 0u32;
    for (date, log) in by_date.iter() {
        if !is_due_on(habit, date) {
            continue;
        }
        if log.done {
            run += 1;
            best = best.max(run);
        } else {
            run = 0;
        }
    }
    best
}

fn current_daily_streak(habit: &Habit, by_date: &BTreeMap<&str, &HabitLog>, today: &str) -> u32 {
    let mut current = 0u32;
    let mut walk = today.to_string();

    for _ in 0..MAX_BACKWARD_DAYS {
        if walk.as_str() < habit.created_date.as_str() {
            break;
        }
        if is_due_on(habit, &walk) {
            match by_date.get(walk.as_str()) {
                Some(log) if log.done => current += 1,
                _ => break,
            }
        }
        match previous_date(&walk) {
            Some(prev) => walk = prev,
            None => break,
        }
    }

    current
}

/// A week is complete iff its scheduled subset is non-empty and every
/// scheduled date in it is logged done.
fn week_complete(habit: &Habit, week_key: &str, by_date: &BTreeMap<&str, &HabitLog>) -> bool {
    let start = match week_key_start(week_key) {
        Some(s) => s,
        None => return false,
    };

    let mut scheduled = 0u32;
    for offset in 0..7 {
        let date = match add_days(&start, offset) {
            Some(d) => d,
            None => return false,
        };
        if !is_due_on(habit, &date) {
            continue;
        }
        scheduled += 1;
        match by_date.get(date.as_str()) {
            Some(log) if log.done => {}
            _ => return false,
        }
    }

    scheduled > 0
}

fn best_weekly_streak(habit: &Habit, by_date: &BTreeMap<&str, &HabitLog>) -> u32 {
    // Week keys derived from logged dates, not all calendar weeks; the
    // "YYYY-Www" form sorts chronologically as plain strings.
    let week_keys: BTreeSet<String> = by_date
        .keys()
        .filter_map(|date| iso_week_key(date))
        .collect();

    let mut best = 0u32;
    let mut run = 0u32;
    for key in week_keys.iter() {
        if week_complete(habit, key, by_date) {
            run += 1;
            best = best.max(run);
        } else {
            run = 0;
        }
    }
    best
}

fn current_weekly_streak(habit: &Habit, by_date: &BTreeMap<&str, &HabitLog>, today: &str) -> u32 {
    let mut key = match iso_week_key(today) {
        Some(k) => k,
        None => return 0,
    };

    // Terminates: every complete week consumes at least one distinct
    // logged date, and the log map is finite.
    let mut current = 0u32;
    while week_complete(habit, &key, by_date) {
        current += 1;
        match previous_week_key(&key) {
            Some(prev) => key = prev,
            None => break,
        }
    }
    current
}

use crate::date::{
    add_days, date_range_inclusive, days_in_month, format_date, iso_week_key, parse_date_string,
    weekday_abbrev, year_month,
};
use crate::due::is_due_on;
use crate::model::{Habit, HabitLog};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DaySummary {
    pub date: String,
    pub label: &'static str,
    pub total_planned: u32,
    pub total_done: u32,
    pub completion_rate: f64,
}

fn done_lookup<'a>(logs: &'a [HabitLog]) -> HashMap<(&'a str, &'a str), bool> {
    let mut map = HashMap::new();
    for l in logs.iter() {
        map.insert((l.habit_id.as_str(), l.date.as_str()), l.done);
    }
    map
}

fn summarize_day(
    date: &str,
    habits: &[Habit],
    done: &HashMap<(&str, &str), bool>,
) -> DaySummary {
    let mut planned = 0u32;
    let mut completed = 0u32;
    for h in habits.iter().filter(|h| !h.is_paused) {
        if !is_due_on(h, date) {
            continue;
        }
        planned += 1;
        if done.get(&(h.id.as_str(), date)).copied().unwrap_or(false) {
            completed += 1;
        }
    }

    // 0.0 when nothing was planned; a rate must never be NaN.
    let completion_rate = if planned == 0 {
        0.0
    } else {
        f64::from(completed) / f64::from(planned)
    };

    DaySummary {
        date: date.to_string(),
        label: weekday_abbrev(date),
        total_planned: planned,
        total_done: completed,
        completion_rate,
    }
}

/// Per-day roll-up for the 7 days ending at `reference_date` inclusive,
/// oldest first. Malformed reference dates yield an empty summary.
pub fn weekly_summary(
    reference_date: &str,
    habits: &[Habit],
    logs: &[HabitLog],
) -> Vec<DaySummary> {
    let from = match add_days(reference_date, -6) {
        Some(f) => f,
        None => return Vec::new(),
    };
    let dates = match date_range_inclusive(&from, reference_date) {
        Some(d) => d,
        None => return Vec::new(),
    };

    let done = done_lookup(logs);
    dates
        .iter()
        .map(|d| summarize_day(d, habits, &done))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayState {
    Done,
    Missed,
    Future,
    Unscheduled,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MonthDay {
    pub date: String,
    pub day: u32,
    pub state: DayState,
    /// Only done/missed days may be toggled by the caller.
    pub togglable: bool,
}

/// Day states for one habit over one calendar month. Expired dates come
/// back `Unscheduled` (never `Missed`), since `is_due_on` applies the end
/// condition before the schedule.
pub fn monthly_calendar(
    habit: &Habit,
    year: i32,
    month: u32,
    logs: &[HabitLog],
    today: &str,
) -> Vec<MonthDay> {
    let dim = match days_in_month(&format_date(year, month, 1)) {
        Some(d) => d,
        None => return Vec::new(),
    };

    let done = done_lookup(logs);
    let mut out = Vec::with_capacity(dim as usize);
    for day in 1..=dim {
        let date = format_date(year, month, day);
        let state = if !is_due_on(habit, &date) {
            DayState::Unscheduled
        } else if done.get(&(habit.id.as_str(), date.as_str())).copied().unwrap_or(false) {
            DayState::Done
        } else if date.as_str() > today {
            DayState::Future
        } else {
            DayState::Missed
        };
        out.push(MonthDay {
            togglable: matches!(state, DayState::Done | DayState::Missed),
            date,
            day,
            state,
        });
    }
    out
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct WeekHistory {
    pub week: String,
    pub days: Vec<DaySummary>,
}

/// One calendar month of history. Months come back newest first (the
/// caller pages backward); weeks and days inside a month run oldest
/// first. A week straddling a month boundary is split between the two
/// months.
#[derive(Debug, Clone, serde::Serialize)]
pub struct MonthHistory {
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<WeekHistory>,
}

/// Per-day summaries grouped weeks-within-months over `[from, to]`.
///
/// `from` is clamped to the earliest logged date, so no summaries are
/// fabricated for the time before the user's first interaction; with no
/// logs at all the history is empty.
pub fn full_history(
    from: &str,
    to: &str,
    habits: &[Habit],
    logs: &[HabitLog],
) -> Vec<MonthHistory> {
    let earliest = logs
        .iter()
        .map(|l| l.date.as_str())
        .filter(|d| parse_date_string(d, "log date").is_ok())
        .min();
    let earliest = match earliest {
        Some(e) => e,
        None => return Vec::new(),
    };

    let clamped_from = if from < earliest { earliest } else { from };
    let dates = match date_range_inclusive(clamped_from, to) {
        Some(d) => d,
        None => return Vec::new(),
    };

    let done = done_lookup(logs);
    let mut months: Vec<MonthHistory> = Vec::new();

    for date in dates.iter() {
        let (year, month) = match year_month(date) {
            Some(ym) => ym,
            None => continue,
        };
        let week_key = iso_week_key(date).unwrap_or_default();
        let summary = summarize_day(date, habits, &done);

        let needs_month = months
            .last()
            .map(|m| (m.year, m.month) != (year, month))
            .unwrap_or(true);
        if needs_month {
            months.push(MonthHistory {
                year,
                month,
                weeks: Vec::new(),
            });
        }
        let current_month = match months.last_mut() {
            Some(m) => m,
            None => continue,
        };

        let needs_week = current_month
            .weeks
            .last()
            .map(|w| w.week != week_key)
            .unwrap_or(true);
        if needs_week {
            current_month.weeks.push(WeekHistory {
                week: week_key,
                days: Vec::new(),
            });
        }
        if let Some(current_week) = current_month.weeks.last_mut() {
            current_week.days.push(summary);
        }
    }

    months.reverse();
    months
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{EndCondition, Schedule};

    fn habit(id: &str, name: &str, schedule: Schedule) -> Habit {
        Habit {
            id: id.to_string(),
            name: name.to_string(),
            icon: None,
            color: None,
            schedule,
            end_condition: EndCondition::None,
            start_time: None,
            end_time: None,
            reminder_offset_minutes: None,
            is_paused: false,
            paused_at: None,
            pause_reason: None,
            target_repeats: 1,
            notification_ids: Vec::new(),
            created_date: "2024-01-01".to_string(),
        }
    }

    fn log(habit_id: &str, date: &str, done: bool) -> HabitLog {
        HabitLog {
            id: format!("l-{}-{}", habit_id, date),
            habit_id: habit_id.to_string(),
            date: date.to_string(),
            done,
            progress: u32::from(done),
        }
    }

    #[test]
    fn weekly_summary_counts_planned_and_done() {
        let habits = vec![
            habit("h0001", "Stretch", Schedule::Daily),
            habit(
                "h0002",
                "Gym",
                Schedule::Weekly {
                    days_of_week: vec![1], // Mondays
                },
            ),
        ];
        let logs = vec![
            log("h0001", "2024-01-01", true),
            log("h0002", "2024-01-01", true),
            log("h0001", "2024-01-03", true),
        ];

        let days = weekly_summary("2024-01-07", &habits, &logs);
        assert_eq!(days.len(), 7);
        assert_eq!(days[0].date, "2024-01-01");
        assert_eq!(days[6].date, "2024-01-07");

        // Monday: both habits planned, both done.
        assert_eq!(days[0].total_planned, 2);
        assert_eq!(days[0].total_done, 2);
        assert!((days[0].completion_rate - 1.0).abs() < f64::EPSILON);

        // Wednesday: only the daily habit planned.
        assert_eq!(days[2].total_planned, 1);
        assert_eq!(days[2].total_done, 1);

        // Sunday: planned but nothing done.
        assert_eq!(days[6].total_done, 0);
        assert!((days[6].completion_rate - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn weekly_summary_with_no_planned_habits_is_zero_not_nan() {
        let habits = vec![habit(
            "h0001",
            "Gym",
            Schedule::Weekly {
                days_of_week: vec![],
            },
        )];
        let days = weekly_summary("2024-01-07", &habits, &[]);
        for d in days.iter() {
            assert_eq!(d.total_planned, 0);
            assert_eq!(d.completion_rate, 0.0);
            assert!(!d.completion_rate.is_nan());
        }
    }

    #[test]
    fn weekly_summary_is_idempotent() {
        let habits = vec![habit("h0001", "Stretch", Schedule::Daily)];
        let logs = vec![log("h0001", "2024-01-05", true)];
        let a = weekly_summary("2024-01-07", &habits, &logs);
        let b = weekly_summary("2024-01-07", &habits, &logs);
        assert_eq!(a, b);
    }

    #[test]
    fn paused_habits_do_not_count_as_planned() {
        let mut h = habit("h0001", "Stretch", Schedule::Daily);
        h.is_paused = true;
        let days = weekly_summary("2024-01-07", &[h], &[]);
        assert!(days.iter().all(|d| d.total_planned == 0));
    }

    #[test]
    fn monthly_calendar_classifies_each_day() {
        let h = habit(
            "h0001",
            "Gym",
            Schedule::Weekly {
                days_of_week: vec![1], // Mondays
            },
        );
        let logs = vec![log("h0001", "2024-01-08", true)];

        let days = monthly_calendar(&h, 2024, 1, &logs, "2024-01-20");
        assert_eq!(days.len(), 31);

        let by_date: HashMap<&str, &MonthDay> =
            days.iter().map(|d| (d.date.as_str(), d)).collect();

        assert_eq!(by_date["2024-01-01"].state, DayState::Missed);
        assert_eq!(by_date["2024-01-08"].state, DayState::Done);
        assert_eq!(by_date["2024-01-15"].state, DayState::Missed);
        assert_eq!(by_date["2024-01-22"].state, DayState::Future);
        assert_eq!(by_date["2024-01-02"].state, DayState::Unscheduled);

        assert!(by_date["2024-01-08"].togglable);
        assert!(by_date["2024-01-15"].togglable);
        assert!(!by_date["2024-01-22"].togglable);
        assert!(!by_date["2024-01-02"].togglable);
    }

    #[test]
    fn monthly_calendar_expired_dates_are_unscheduled_not_missed() {
        let mut h = habit("h0001", "Stretch", Schedule::Daily);
        h.end_condition = EndCondition::ByDate {
            end_date: "2024-01-10".to_string(),
        };
        let days = monthly_calendar(&h, 2024, 1, &[], "2024-01-31");
        let by_date: HashMap<&str, &MonthDay> =
            days.iter().map(|d| (d.date.as_str(), d)).collect();

        assert_eq!(by_date["2024-01-10"].state, DayState::Missed);
        assert_eq!(by_date["2024-01-11"].state, DayState::Unscheduled);
        assert_eq!(by_date["2024-01-31"].state, DayState::Unscheduled);
    }

    #[test]
    fn monthly_calendar_is_idempotent() {
        let h = habit("h0001", "Stretch", Schedule::Daily);
        let logs = vec![log("h0001", "2024-02-10", true)];
        let a = monthly_calendar(&h, 2024, 2, &logs, "2024-02-15");
        let b = monthly_calendar(&h, 2024, 2, &logs, "2024-02-15");
        assert_eq!(a.len(), 29);
        assert_eq!(
            a.iter().map(|d| d.state).collect::<Vec<_>>(),
            b.iter().map(|d| d.state).collect::<Vec<_>>()
        );
    }

    #[test]
    fn full_history_clamps_to_first_log() {
        let habits = vec![habit("h0001", "Stretch", Schedule::Daily)];
        let logs = vec![
            log("h0001", "2024-02-10", true),
            log("h0001", "2024-02-20", true),
        ];

        let months = full_history("2023-11-01", "2024-03-05", &habits, &logs);
        // Nothing fabricated before 2024-02-10.
        assert_eq!(months.len(), 2);
        assert_eq!((months[0].year, months[0].month), (2024, 3));
        assert_eq!((months[1].year, months[1].month), (2024, 2));

        let feb = &months[1];
        let first_day = &feb.weeks[0].days[0];
        assert_eq!(first_day.date, "2024-02-10");
    }

    #[test]
    fn full_history_without_logs_is_empty() {
        let habits = vec![habit("h0001", "Stretch", Schedule::Daily)];
        assert!(full_history("2024-01-01", "2024-03-01", &habits, &[]).is_empty());
    }

    #[test]
    fn full_history_splits_weeks_at_month_boundaries() {
        let habits = vec![habit("h0001", "Stretch", Schedule::Daily)];
        let logs = vec![log("h0001", "2024-01-29", true)];

        // Jan 29 (Mon) .. Feb 4 (Sun) is one ISO week across two months.
        let months = full_history("2024-01-29", "2024-02-04", &habits, &logs);
        assert_eq!(months.len(), 2);

        let feb = &months[0];
        let jan = &months[1];
        assert_eq!(jan.weeks.len(), 1);
        assert_eq!(feb.weeks.len(), 1);
        assert_eq!(jan.weeks[0].week, feb.weeks[0].week);
        assert_eq!(jan.weeks[0].days.len(), 3); // Jan 29-31
        assert_eq!(feb.weeks[0].days.len(), 4); // Feb 1-4
    }
}

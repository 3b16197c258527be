use crate::date::{day_of_month, day_of_week, days_in_month};
use crate::habits::stable_habit_sort;
use crate::model::{Habit, HabitLog};
use crate::schedule::{EndCondition, Schedule};

/// Whether `habit` is due on `date` (`YYYY-MM-DD`).
///
/// Expiry wins over the schedule: past the end date a habit is
/// permanently not due. Pause state is deliberately not consulted here;
/// the aggregation layer filters paused habits so that per-habit history
/// views keep rendering paused periods.
///
/// Malformed dates and out-of-range configured days never match, and
/// never panic.
pub fn is_due_on(habit: &Habit, date: &str) -> bool {
    if let EndCondition::ByDate { end_date } = &habit.end_condition {
        // Lexicographic compare is exact for zero-padded YYYY-MM-DD.
        if date > end_date.as_str() {
            return false;
        }
    }

    match &habit.schedule {
        Schedule::Daily => day_of_week(date).is_some(),
        Schedule::Weekly { days_of_week } => match day_of_week(date) {
            Some(wd) => days_of_week.contains(&wd),
            None => false,
        },
        Schedule::Monthly { days_of_month } => {
            let (dom, dim) = match (day_of_month(date), days_in_month(date)) {
                (Some(dom), Some(dim)) => (dom, dim),
                _ => return false,
            };
            if days_of_month.contains(&dom) {
                return true;
            }
            // A configured 31st collapses onto the last day of short
            // months, otherwise February would never fire.
            dom == dim && days_of_month.iter().any(|d| *d > dim && *d <= 31)
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct DueEntry {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
    pub start_time: Option<String>,
    pub target_repeats: u32,
    pub progress: u32,
    pub done: bool,
}

/// The day's task list: habits due on `date`, not paused, each paired
/// with its completion state (absent log means not done).
pub fn habits_due_on(date: &str, habits: &[Habit], logs_for_date: &[HabitLog]) -> Vec<DueEntry> {
    let mut due: Vec<&Habit> = habits
        .iter()
        .filter(|h| !h.is_paused && is_due_on(h, date))
        .collect();
    due.sort_by(|a, b| stable_habit_sort(a, b));

    due.into_iter()
        .map(|h| {
            let log = logs_for_date.iter().find(|l| l.habit_id == h.id);
            DueEntry {
                id: h.id.clone(),
                name: h.name.clone(),
                icon: h.icon.clone(),
                start_time: h.start_time.clone(),
                target_repeats: h.target_repeats,
                progress: log.map(|l| l.progress).unwrap_or(0),
                done: log.map(|l| l.done).unwrap_or(false),
            }
        })
        .collect()
}

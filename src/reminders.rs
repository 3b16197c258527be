use crate::date::{add_days, date_range_inclusive};
use crate::due::is_due_on;
use crate::habits::stable_habit_sort;
use crate::model::{Db, Habit};
use crate::times::{hhmm_to_minutes, minutes_to_hhmm};

/// One planned reminder: the wall-clock moment a notification should
/// fire. Delivery itself belongs to the platform scheduler, not to us;
/// we only hand it the slots and remember the ids it gives back.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ReminderSlot {
    pub habit_id: String,
    pub name: String,
    pub date: String,
    pub time: String,
}

/// Fire times for one habit over the `days` dates starting at `from`.
///
/// A habit yields reminders only when it has a start time and a reminder
/// offset configured; the offset is applied relative to the start time
/// and clamped within the day. Paused and expired habits yield nothing.
pub fn plan_reminders(habit: &Habit, from: &str, days: u32) -> Vec<ReminderSlot> {
    if habit.is_paused || days == 0 {
        return Vec::new();
    }

    let (start, offset) = match (&habit.start_time, habit.reminder_offset_minutes) {
        (Some(start), Some(offset)) => (start, offset),
        _ => return Vec::new(),
    };
    let start_minutes = match hhmm_to_minutes(start) {
        Some(m) => m,
        None => return Vec::new(),
    };
    let time = minutes_to_hhmm(start_minutes + offset);

    let to = match add_days(from, days as i32 - 1) {
        Some(t) => t,
        None => return Vec::new(),
    };
    let dates = match date_range_inclusive(from, &to) {
        Some(d) => d,
        None => return Vec::new(),
    };

    dates
        .into_iter()
        .filter(|d| is_due_on(habit, d))
        .map(|date| ReminderSlot {
            habit_id: habit.id.clone(),
            name: habit.name.clone(),
            date,
            time: time.clone(),
        })
        .collect()
}

pub fn plan_all_reminders(habits: &[Habit], from: &str, days: u32) -> Vec<ReminderSlot> {
    let mut sorted: Vec<&Habit> = habits.iter().collect();
    sorted.sort_by(|a, b| stable_habit_sort(a, b));

    let mut out = Vec::new();
    for h in sorted {
        out.extend(plan_reminders(h, from, days));
    }
    out.sort_by(|a, b| {
        (a.date.as_str(), a.time.as_str(), a.habit_id.as_str())
            .cmp(&(b.date.as_str(), b.time.as_str(), b.habit_id.as_str()))
    });
    out
}

pub fn next_notification_id(db: &mut Db) -> String {
    let n = db.meta.next_notification_number;
    db.meta.next_notification_number = n + 1;
    format!("n{:04}", n)
}

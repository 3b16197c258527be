use crate::schedule::{EndCondition, Schedule};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Db {
    pub version: u32,
    pub meta: Meta,
    pub habits: Vec<Habit>,
    pub logs: Vec<HabitLog>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Meta {
    pub next_habit_number: u32,
    pub next_log_number: u32,
    pub next_notification_number: u32,
}

/// A recurring task definition. Dates and times are carried as
/// `YYYY-MM-DD` / `HH:mm` strings end to end; date ordering and expiry
/// checks rely on lexicographic order of that exact format.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Habit {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub schedule: Schedule,
    #[serde(default)]
    pub end_condition: EndCondition,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub reminder_offset_minutes: Option<i32>,
    #[serde(default)]
    pub is_paused: bool,
    #[serde(default)]
    pub paused_at: Option<String>,
    #[serde(default)]
    pub pause_reason: Option<String>,
    /// Completions required before a date counts as done.
    pub target_repeats: u32,
    /// Opaque ids handed back by the reminder scheduler.
    #[serde(default)]
    pub notification_ids: Vec<String>,
    pub created_date: String,
}

/// One record per (habit, date). Created on first interaction, mutated in
/// place afterwards, removed only when its habit is deleted.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HabitLog {
    pub id: String,
    pub habit_id: String,
    pub date: String,
    pub done: bool,
    #[serde(default)]
    pub progress: u32,
}

pub fn default_db() -> Db {
    Db {
        version: 1,
        meta: Meta {
            next_habit_number: 1,
            next_log_number: 1,
            next_notification_number: 1,
        },
        habits: Vec::new(),
        logs: Vec::new(),
    }
}

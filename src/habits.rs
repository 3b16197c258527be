use crate::date::parse_date_string;
use crate::error::CliError;
use crate::model::{Db, Habit};
use crate::schedule::{validate_schedule, EndCondition, Schedule};
use crate::times::validate_hhmm;

fn normalize_name(name: &str) -> String {
    name.trim().to_string()
}

pub fn validate_habit_name(name: &str) -> Result<String, CliError> {
    let n = normalize_name(name);
    if n.is_empty() {
        return Err(CliError::usage("Habit name is required"));
    }
    Ok(n)
}

pub fn next_habit_id(db: &mut Db) -> String {
    let n = db.meta.next_habit_number;
    db.meta.next_habit_number = n + 1;
    format!("h{:04}", n)
}

pub fn stable_habit_sort(a: &Habit, b: &Habit) -> std::cmp::Ordering {
    let key = |h: &Habit| {
        (
            h.start_time.clone().unwrap_or_else(|| "~".to_string()),
            h.name.to_lowercase(),
            h.id.clone(),
        )
    };
    key(a).cmp(&key(b))
}

pub fn list_habits(db: &Db) -> Vec<Habit> {
    let mut out: Vec<Habit> = db.habits.to_vec();
    out.sort_by(stable_habit_sort);
    out
}

/// Resolve a selector to an index in `db.habits`: exact id (`h0001`) or a
/// unique case-insensitive name prefix. An ambiguous prefix lists the
/// candidates instead of guessing.
pub fn select_habit_index(db: &Db, selector: &str) -> Result<usize, CliError> {
    let s = selector.trim();
    if s.is_empty() {
        return Err(CliError::usage("Habit selector is required"));
    }

    if s.len() == 5 && s.starts_with('h') && s[1..].chars().all(|c| c.is_ascii_digit()) {
        return db
            .habits
            .iter()
            .position(|h| h.id == s)
            .ok_or_else(|| CliError::not_found(format!("Habit not found: {}", selector)));
    }

    let prefix = s.to_lowercase();
    let mut matches: Vec<(usize, &Habit)> = db
        .habits
        .iter()
        .enumerate()
        .filter(|(_, h)| h.name.to_lowercase().starts_with(&prefix))
        .collect();

    matches.sort_by(|a, b| stable_habit_sort(a.1, b.1));

    if matches.is_empty() {
        return Err(CliError::not_found(format!(
            "Habit not found: {}",
            selector
        )));
    }

    if matches.len() > 1 {
        let candidates = matches
            .iter()
            .map(|(_, h)| format!("{} {}", h.id, h.name))
            .collect::<Vec<String>>()
            .join(", ");
        return Err(CliError::ambiguous(format!(
            "Ambiguous selector '{}'. Candidates: {}",
            selector, candidates
        )));
    }

    Ok(matches[0].0)
}

/// Field bundle for `add` and `edit`; everything but the name and
/// schedule is optional.
pub struct HabitDraft<'a> {
    pub name: &'a str,
    pub schedule: Schedule,
    pub target_repeats: u32,
    pub icon: Option<&'a str>,
    pub color: Option<&'a str>,
    pub start_time: Option<&'a str>,
    pub end_time: Option<&'a str>,
    pub reminder_offset_minutes: Option<i32>,
    pub end_date: Option<&'a str>,
}

pub fn make_habit(id: String, draft: &HabitDraft, today: &str) -> Result<Habit, CliError> {
    let name = validate_habit_name(draft.name)?;

    let schedule = draft.schedule.clone();
    validate_schedule(&schedule)?;

    if draft.target_repeats < 1 {
        return Err(CliError::usage("Invalid target: must be >= 1"));
    }

    if let Some(t) = draft.start_time {
        validate_hhmm(t, "start time")?;
    }
    if let Some(t) = draft.end_time {
        validate_hhmm(t, "end time")?;
    }

    let end_condition = match draft.end_date {
        Some(d) => {
            parse_date_string(d, "end date")?;
            EndCondition::ByDate {
                end_date: d.to_string(),
            }
        }
        None => EndCondition::None,
    };

    Ok(Habit {
        id,
        name,
        icon: draft.icon.map(|s| s.to_string()),
        color: draft.color.map(|s| s.to_string()),
        schedule,
        end_condition,
        start_time: draft.start_time.map(|s| s.to_string()),
        end_time: draft.end_time.map(|s| s.to_string()),
        reminder_offset_minutes: draft.reminder_offset_minutes,
        is_paused: false,
        paused_at: None,
        pause_reason: None,
        target_repeats: draft.target_repeats,
        notification_ids: Vec::new(),
        created_date: today.to_string(),
    })
}

/// Full-replace update; id and created date survive from the stored row.
pub fn replace_habit(db: &mut Db, index: usize, mut habit: Habit) -> Habit {
    habit.id = db.habits[index].id.clone();
    habit.created_date = db.habits[index].created_date.clone();
    db.habits[index] = habit.clone();
    habit
}

/// Remove the habit and every log it owns; no log outlives its habit.
pub fn delete_habit(db: &mut Db, index: usize) -> Habit {
    let habit = db.habits.remove(index);
    db.logs.retain(|l| l.habit_id != habit.id);
    habit
}

pub fn pause_habit(db: &mut Db, index: usize, today: &str, reason: Option<&str>) -> Habit {
    let h = &mut db.habits[index];
    h.is_paused = true;
    h.paused_at = Some(today.to_string());
    h.pause_reason = reason.map(|s| s.to_string());
    h.clone()
}

pub fn resume_habit(db: &mut Db, index: usize) -> Habit {
    let h = &mut db.habits[index];
    h.is_paused = false;
    h.paused_at = None;
    h.pause_reason = None;
    h.clone()
}

/// Record the opaque ids handed back by the reminder scheduler, replacing
/// whatever was there.
pub fn set_notification_ids(db: &mut Db, index: usize, ids: Vec<String>) -> Habit {
    let h = &mut db.habits[index];
    h.notification_ids = ids;
    h.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logs::toggle;
    use crate::model::default_db;
    use crate::schedule::Schedule;

    fn draft(name: &str) -> HabitDraft<'_> {
        HabitDraft {
            name,
            schedule: Schedule::Daily,
            target_repeats: 1,
            icon: None,
            color: None,
            start_time: None,
            end_time: None,
            reminder_offset_minutes: None,
            end_date: None,
        }
    }

    fn add(db: &mut Db, name: &str) -> Habit {
        let id = next_habit_id(db);
        let habit = make_habit(id, &draft(name), "2024-01-01").unwrap();
        db.habits.push(habit.clone());
        habit
    }

    #[test]
    fn ids_are_sequential() {
        let mut db = default_db();
        assert_eq!(add(&mut db, "Stretch").id, "h0001");
        assert_eq!(add(&mut db, "Read").id, "h0002");
    }

    #[test]
    fn selector_by_id_and_prefix() {
        let mut db = default_db();
        add(&mut db, "Stretch");
        add(&mut db, "Read");
        add(&mut db, "Run");

        assert_eq!(select_habit_index(&db, "h0002").unwrap(), 1);
        assert_eq!(select_habit_index(&db, "stre").unwrap(), 0);
        assert_eq!(select_habit_index(&db, "rea").unwrap(), 1);

        let err = select_habit_index(&db, "r").unwrap_err();
        assert_eq!(err.exit_code, 4);

        let err = select_habit_index(&db, "swim").unwrap_err();
        assert_eq!(err.exit_code, 3);
    }

    #[test]
    fn make_habit_validates_fields() {
        assert!(make_habit("h0001".into(), &draft("  "), "2024-01-01").is_err());

        let mut d = draft("Gym");
        d.schedule = Schedule::Weekly {
            days_of_week: vec![],
        };
        assert!(make_habit("h0001".into(), &d, "2024-01-01").is_err());

        let mut d = draft("Gym");
        d.target_repeats = 0;
        assert!(make_habit("h0001".into(), &d, "2024-01-01").is_err());

        let mut d = draft("Gym");
        d.start_time = Some("25:00");
        assert!(make_habit("h0001".into(), &d, "2024-01-01").is_err());

        let mut d = draft("Gym");
        d.end_date = Some("2024-02-30");
        assert!(make_habit("h0001".into(), &d, "2024-01-01").is_err());
    }

    #[test]
    fn replace_preserves_id_and_created_date() {
        let mut db = default_db();
        add(&mut db, "Stretch");

        let mut replacement =
            make_habit("ignored".into(), &draft("Morning stretch"), "2030-01-01").unwrap();
        replacement.schedule = Schedule::Weekly {
            days_of_week: vec![1, 3],
        };

        let updated = replace_habit(&mut db, 0, replacement);
        assert_eq!(updated.id, "h0001");
        assert_eq!(updated.created_date, "2024-01-01");
        assert_eq!(updated.name, "Morning stretch");
        assert_eq!(db.habits[0].name, "Morning stretch");
    }

    #[test]
    fn delete_cascades_logs() {
        let mut db = default_db();
        add(&mut db, "Stretch");
        add(&mut db, "Read");
        toggle(&mut db, "h0001", "2024-01-05", 1).unwrap();
        toggle(&mut db, "h0001", "2024-01-06", 1).unwrap();
        toggle(&mut db, "h0002", "2024-01-05", 1).unwrap();

        let idx = select_habit_index(&db, "h0001").unwrap();
        delete_habit(&mut db, idx);

        assert_eq!(db.habits.len(), 1);
        assert!(db.logs.iter().all(|l| l.habit_id == "h0002"));
    }

    #[test]
    fn pause_and_resume_round_trip() {
        let mut db = default_db();
        add(&mut db, "Stretch");

        let paused = pause_habit(&mut db, 0, "2024-02-01", Some("travel"));
        assert!(paused.is_paused);
        assert_eq!(paused.paused_at.as_deref(), Some("2024-02-01"));
        assert_eq!(paused.pause_reason.as_deref(), Some("travel"));

        let resumed = resume_habit(&mut db, 0);
        assert!(!resumed.is_paused);
        assert!(resumed.paused_at.is_none());
        assert!(resumed.pause_reason.is_none());
    }
}

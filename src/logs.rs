use crate::date::parse_date_string;
use crate::error::CliError;
use crate::model::{Db, HabitLog};

fn find_log_index(db: &Db, habit_id: &str, date: &str) -> Option<usize> {
    db.logs
        .iter()
        .position(|l| l.habit_id == habit_id && l.date == date)
}

pub fn next_log_id(db: &mut Db) -> String {
    let n = db.meta.next_log_number;
    db.meta.next_log_number = n + 1;
    format!("l{:04}", n)
}

pub fn get_log<'a>(db: &'a Db, habit_id: &str, date: &str) -> Option<&'a HabitLog> {
    find_log_index(db, habit_id, date).map(|i| &db.logs[i])
}

pub fn get_logs_for_date(db: &Db, date: &str) -> Vec<HabitLog> {
    let mut out: Vec<HabitLog> = db.logs.iter().filter(|l| l.date == date).cloned().collect();
    out.sort_by(|a, b| a.habit_id.cmp(&b.habit_id));
    out
}

pub fn get_logs_for_habit(db: &Db, habit_id: &str) -> Vec<HabitLog> {
    let mut out: Vec<HabitLog> = db
        .logs
        .iter()
        .filter(|l| l.habit_id == habit_id)
        .cloned()
        .collect();
    out.sort_by(|a, b| {
        if a.date != b.date {
            a.date.cmp(&b.date)
        } else {
            a.id.cmp(&b.id)
        }
    });
    out
}

/// Restores the invariant `done == true  =>  progress >= target` before a
/// row is written.
fn normalized(done: bool, progress: u32, target: u32) -> (bool, u32) {
    let done = done || progress >= target;
    if done {
        (true, progress.max(target))
    } else {
        (false, progress)
    }
}

fn write_log(
    db: &mut Db,
    habit_id: &str,
    date: &str,
    done: bool,
    progress: u32,
) -> HabitLog {
    match find_log_index(db, habit_id, date) {
        Some(i) => {
            db.logs[i].done = done;
            db.logs[i].progress = progress;
            db.logs[i].clone()
        }
        None => {
            let log = HabitLog {
                id: next_log_id(db),
                habit_id: habit_id.to_string(),
                date: date.to_string(),
                done,
                progress,
            };
            db.logs.push(log.clone());
            log
        }
    }
}

/// Flip the day's done flag, creating the row on first interaction.
/// Turning a day on snaps progress up to the target; turning it off
/// clears progress.
pub fn toggle(db: &mut Db, habit_id: &str, date: &str, target: u32) -> Result<HabitLog, CliError> {
    parse_date_string(date, "date")?;

    let currently_done = get_log(db, habit_id, date).map(|l| l.done).unwrap_or(false);
    let (done, progress) = if currently_done {
        (false, 0)
    } else {
        (true, target.max(1))
    };
    Ok(write_log(db, habit_id, date, done, progress))
}

pub fn upsert_log(
    db: &mut Db,
    habit_id: &str,
    date: &str,
    done: bool,
    progress: u32,
    target: u32,
) -> Result<HabitLog, CliError> {
    parse_date_string(date, "date")?;
    let (done, progress) = normalized(done, progress, target.max(1));
    Ok(write_log(db, habit_id, date, done, progress))
}

/// Bump progress by one, clamped at the target; the day flips done when
/// the target is reached.
pub fn increment_progress(
    db: &mut Db,
    habit_id: &str,
    date: &str,
    target: u32,
) -> Result<HabitLog, CliError> {
    parse_date_string(date, "date")?;

    let target = target.max(1);
    let cur = get_log(db, habit_id, date).map(|l| l.progress).unwrap_or(0);
    let progress = cur.saturating_add(1).min(target);
    let done = progress >= target;
    Ok(write_log(db, habit_id, date, done, progress))
}

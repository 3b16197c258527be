use crate::error::CliError;
use crate::model::{Habit, HabitLog};
use crate::schedule::{end_condition_to_string, schedule_to_string};
use std::fs;
use std::io::Write;
use std::path::Path;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

fn csv_escape(value: &str) -> String {
    if value.contains(['\n', '\r', '"', ',']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn to_csv_line(values: &[String]) -> String {
    values
        .iter()
        .map(|v| csv_escape(v))
        .collect::<Vec<String>>()
        .join(",")
}

fn write_csv(path: &Path, lines: &[String]) -> Result<(), CliError> {
    let mut f = fs::File::create(path).map_err(|_| CliError::store("DB IO error"))?;
    #[cfg(unix)]
    {
        let _ = f.set_permissions(fs::Permissions::from_mode(0o600));
    }
    f.write_all(lines.join("\n").as_bytes())
        .map_err(|_| CliError::store("DB IO error"))?;
    let _ = f.write_all(b"\n");
    Ok(())
}

pub fn export_csv_to_dir(
    out_dir: &str,
    habits: &[Habit],
    logs: &[HabitLog],
) -> Result<(), CliError> {
    let out_path = Path::new(out_dir);
    fs::create_dir_all(out_path).map_err(|_| CliError::store("DB IO error"))?;

    #[cfg(unix)]
    {
        let _ = fs::set_permissions(out_path, fs::Permissions::from_mode(0o700));
    }

    let habits_header: Vec<String> = [
        "id",
        "name",
        "icon",
        "color",
        "schedule",
        "end_condition",
        "start_time",
        "end_time",
        "reminder_offset_minutes",
        "target_repeats",
        "paused",
        "created_date",
    ]
    .into_iter()
    .map(|s| s.to_string())
    .collect();

    let mut habit_lines: Vec<String> = vec![to_csv_line(&habits_header)];
    for h in habits.iter() {
        habit_lines.push(to_csv_line(&[
            h.id.clone(),
            h.name.clone(),
            h.icon.clone().unwrap_or_default(),
            h.color.clone().unwrap_or_default(),
            schedule_to_string(&h.schedule),
            end_condition_to_string(&h.end_condition),
            h.start_time.clone().unwrap_or_default(),
            h.end_time.clone().unwrap_or_default(),
            h.reminder_offset_minutes
                .map(|m| m.to_string())
                .unwrap_or_default(),
            h.target_repeats.to_string(),
            if h.is_paused {
                "true".to_string()
            } else {
                "false".to_string()
            },
            h.created_date.clone(),
        ]));
    }

    let logs_header: Vec<String> = ["id", "habit_id", "date", "done", "progress"]
        .into_iter()
        .map(|s| s.to_string())
        .collect();

    let mut log_lines: Vec<String> = vec![to_csv_line(&logs_header)];
    for l in logs.iter() {
        log_lines.push(to_csv_line(&[
            l.id.clone(),
            l.habit_id.clone(),
            l.date.clone(),
            if l.done {
                "true".to_string()
            } else {
                "false".to_string()
            },
            l.progress.to_string(),
        ]));
    }

    write_csv(&out_path.join("habits.csv"), &habit_lines)?;
    write_csv(&out_path.join("logs.csv"), &log_lines)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_escaping() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}

mod date;
mod db;
mod due;
mod error;
mod export;
mod habits;
mod logs;
mod model;
mod output;
mod reminders;
mod schedule;
mod streaks;
mod summary;
mod times;

use crate::date::{format_date, parse_date_string, system_today, year_month};
use crate::db::{read_db, resolve_db_path, stable_to_string_pretty, update_db};
use crate::due::habits_due_on;
use crate::error::CliError;
use crate::export::export_csv_to_dir;
use crate::habits::{
    delete_habit, list_habits, make_habit, next_habit_id, pause_habit, replace_habit,
    resume_habit, select_habit_index, set_notification_ids, HabitDraft,
};
use crate::logs::{get_logs_for_date, get_logs_for_habit, increment_progress, toggle, upsert_log};
use crate::model::Habit;
use crate::output::{render_month_grid, render_simple_table, Styler};
use crate::reminders::{next_notification_id, plan_all_reminders, plan_reminders};
use crate::schedule::{
    end_condition_to_string, parse_schedule_pattern, schedule_to_string, EndCondition,
};
use crate::streaks::compute_streaks;
use crate::summary::{full_history, monthly_calendar, weekly_summary, DayState};
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Format {
    Table,
    Json,
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "habitrack", version, about = "Local habit tracking CLI")]
struct Cli {
    /// Overrides the DB path for this invocation.
    #[arg(long, global = true)]
    db: Option<String>,

    /// Overrides logical "today" for deterministic output/testing.
    #[arg(long, global = true)]
    today: Option<String>,

    /// Output format. Most commands support table/json. `export` supports csv.
    #[arg(long, global = true, value_enum, default_value = "table")]
    format: Format,

    /// Disables ANSI color output.
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Add(AddArgs),
    List,
    Show(SelectorArgs),
    Edit(EditArgs),
    Delete(SelectorArgs),
    Pause(PauseArgs),
    Resume(SelectorArgs),
    /// Record progress: bump by one, set an exact count, or flip the day.
    Log(LogArgs),
    /// Habits due on a date, with completion state.
    Today(DateArgs),
    /// Per-day completion summary for the 7 days ending at a date.
    Week(DateArgs),
    /// Day-state calendar of one habit for a month.
    Month(MonthArgs),
    /// Day summaries grouped weeks-within-months, newest month first.
    History(HistoryArgs),
    Streaks(StreaksArgs),
    /// Reminder planning and notification-id bookkeeping.
    Remind(RemindArgs),
    Export(ExportArgs),
}

#[derive(Args, Debug)]
struct AddArgs {
    name: String,

    /// One of: daily, weekdays, weekends, mon,tue,...,sun or monthly:1,15,31
    #[arg(long, default_value = "daily")]
    repeat: String,

    /// Completions required per day, >= 1
    #[arg(long, default_value_t = 1)]
    target: u32,

    #[arg(long)]
    icon: Option<String>,

    #[arg(long)]
    color: Option<String>,

    /// HH:mm display block start
    #[arg(long)]
    start_time: Option<String>,

    /// HH:mm display block end
    #[arg(long)]
    end_time: Option<String>,

    /// Reminder offset in minutes relative to start time (negative = before)
    #[arg(long, allow_hyphen_values = true)]
    remind: Option<i32>,

    /// Last date the habit is due (YYYY-MM-DD)
    #[arg(long)]
    end_date: Option<String>,
}

#[derive(Args, Debug)]
struct SelectorArgs {
    /// Habit selector: exact id (h0001) or unique name prefix (case-insensitive)
    habit: String,
}

#[derive(Args, Debug)]
struct EditArgs {
    /// Habit selector: exact id (h0001) or unique name prefix (case-insensitive)
    habit: String,

    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    repeat: Option<String>,

    #[arg(long)]
    target: Option<u32>,

    #[arg(long)]
    icon: Option<String>,

    #[arg(long)]
    color: Option<String>,

    #[arg(long)]
    start_time: Option<String>,

    #[arg(long)]
    end_time: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    remind: Option<i32>,

    #[arg(long)]
    end_date: Option<String>,

    /// Clears the end date.
    #[arg(long, conflicts_with = "end_date")]
    no_end_date: bool,
}

#[derive(Args, Debug)]
struct PauseArgs {
    /// Habit selector: exact id (h0001) or unique name prefix (case-insensitive)
    habit: String,

    #[arg(long)]
    reason: Option<String>,
}

#[derive(Args, Debug)]
struct LogArgs {
    /// Habit selector: exact id (h0001) or unique name prefix (case-insensitive)
    habit: String,

    #[arg(long)]
    date: Option<String>,

    /// Flip the day between done and not done.
    #[arg(long, conflicts_with = "set")]
    toggle: bool,

    /// Set the day's progress count directly.
    #[arg(long)]
    set: Option<u32>,
}

#[derive(Args, Debug)]
struct DateArgs {
    #[arg(long)]
    date: Option<String>,
}

#[derive(Args, Debug)]
struct MonthArgs {
    /// Habit selector: exact id (h0001) or unique name prefix (case-insensitive)
    habit: String,

    #[arg(long)]
    year: Option<i32>,

    #[arg(long)]
    month: Option<u32>,
}

#[derive(Args, Debug)]
struct HistoryArgs {
    /// Last date shown (defaults to today).
    #[arg(long)]
    to: Option<String>,

    /// Number of months per page, counted backward from --to.
    #[arg(long, default_value_t = 3)]
    months: u32,
}

#[derive(Args, Debug)]
struct StreaksArgs {
    /// Optional habit selector; all habits when omitted.
    habit: Option<String>,
}

#[derive(Args, Debug)]
struct RemindArgs {
    #[command(subcommand)]
    command: RemindCommand,
}

#[derive(Subcommand, Debug)]
enum RemindCommand {
    /// Upcoming reminder fire times.
    List(RemindListArgs),
    /// Recompute fire times for a habit and record fresh notification ids.
    Sync(RemindSyncArgs),
    /// Drop a habit's recorded notification ids.
    Cancel(SelectorArgs),
}

#[derive(Args, Debug)]
struct RemindListArgs {
    #[arg(long, default_value_t = 7)]
    days: u32,
}

#[derive(Args, Debug)]
struct RemindSyncArgs {
    /// Habit selector: exact id (h0001) or unique name prefix (case-insensitive)
    habit: String,

    #[arg(long, default_value_t = 7)]
    days: u32,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[arg(long)]
    out: Option<String>,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    let exit = match run(cli) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{}", e);
            e.exit_code
        }
    };

    std::process::exit(exit);
}

fn print_line(s: &str) {
    println!("{}", s);
}

fn print_json<T: serde::Serialize>(obj: &T) -> Result<(), CliError> {
    let s = stable_to_string_pretty(obj).map_err(|_| CliError::store("DB IO error"))?;
    println!("{}", s);
    Ok(())
}

fn resolve_today(cli_today: Option<&str>) -> Result<String, CliError> {
    if let Some(t) = cli_today {
        parse_date_string(t, "today")?;
        return Ok(t.to_string());
    }

    if let Ok(t) = std::env::var("HABITRACK_TODAY") {
        let tt = t.trim();
        if !tt.is_empty() {
            parse_date_string(tt, "today")?;
            return Ok(tt.to_string());
        }
    }

    Ok(system_today())
}

fn resolve_color_enabled(no_color_flag: bool) -> bool {
    if no_color_flag {
        return false;
    }
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    true
}

fn ensure_format_supported(format: Format, allow_csv: bool) -> Result<(), CliError> {
    if format == Format::Csv && !allow_csv {
        return Err(CliError::usage(
            "--format csv is only supported by `habitrack export`",
        ));
    }
    Ok(())
}

fn resolve_date_arg(arg: Option<&str>, today: &str) -> Result<String, CliError> {
    match arg {
        Some(d) => {
            parse_date_string(d, "date")?;
            Ok(d.to_string())
        }
        None => Ok(today.to_string()),
    }
}

fn habit_summary_row(h: &Habit) -> Vec<String> {
    vec![
        h.id.clone(),
        format!(
            "{}{}",
            h.icon.as_deref().map(|i| format!("{} ", i)).unwrap_or_default(),
            h.name
        ),
        schedule_to_string(&h.schedule),
        format!("{}x", h.target_repeats),
        end_condition_to_string(&h.end_condition),
        if h.is_paused {
            "paused".to_string()
        } else {
            "active".to_string()
        },
    ]
}

fn print_habit_table(habits: &[Habit]) {
    let rows: Vec<Vec<String>> = habits.iter().map(habit_summary_row).collect();
    print_line(&render_simple_table(
        &["id", "name", "repeat", "target", "ends", "state"],
        &rows,
    ));
}

fn percent(rate: f64) -> String {
    format!("{}%", (rate * 100.0).round() as u32)
}

fn run(cli: Cli) -> Result<(), CliError> {
    let db_path = resolve_db_path(cli.db.as_deref())?;
    let today = resolve_today(cli.today.as_deref())?;

    let styler = Styler::new(resolve_color_enabled(cli.no_color));

    match cli.command {
        Command::Add(args) => {
            ensure_format_supported(cli.format, false)?;

            let created = update_db(&db_path, |db| {
                let id = next_habit_id(db);
                let habit = make_habit(
                    id,
                    &HabitDraft {
                        name: &args.name,
                        schedule: parse_schedule_pattern(&args.repeat)?,
                        target_repeats: args.target,
                        icon: args.icon.as_deref(),
                        color: args.color.as_deref(),
                        start_time: args.start_time.as_deref(),
                        end_time: args.end_time.as_deref(),
                        reminder_offset_minutes: args.remind,
                        end_date: args.end_date.as_deref(),
                    },
                    &today,
                )?;
                db.habits.push(habit.clone());
                Ok(habit)
            })?;

            if cli.format == Format::Json {
                #[derive(serde::Serialize)]
                struct Out {
                    habit: Habit,
                }
                print_json(&Out { habit: created })?;
            } else {
                print_habit_table(&[created]);
            }

            Ok(())
        }

        Command::List => {
            ensure_format_supported(cli.format, false)?;

            let db = read_db(&db_path)?;
            let habits = list_habits(&db);

            if cli.format == Format::Json {
                #[derive(serde::Serialize)]
                struct Out {
                    habits: Vec<Habit>,
                }
                print_json(&Out { habits })?;
            } else {
                print_habit_table(&habits);
            }

            Ok(())
        }

        Command::Show(args) => {
            ensure_format_supported(cli.format, false)?;

            let db = read_db(&db_path)?;
            let idx = select_habit_index(&db, &args.habit)?;
            let habit = db.habits[idx].clone();
            let habit_logs = get_logs_for_habit(&db, &habit.id);
            let streaks = compute_streaks(&habit, &habit_logs, &today);

            if cli.format == Format::Json {
                #[derive(serde::Serialize)]
                struct Out {
                    habit: Habit,
                    logs: Vec<model::HabitLog>,
                    streaks: streaks::StreakSummary,
                }
                print_json(&Out {
                    habit,
                    logs: habit_logs,
                    streaks,
                })?;
            } else {
                print_line(&format!("{} ({})", habit.name, habit.id));
                print_line(&format!("repeat: {}", schedule_to_string(&habit.schedule)));
                print_line(&format!(
                    "ends: {}",
                    end_condition_to_string(&habit.end_condition)
                ));
                print_line(&format!("target: {}x/day", habit.target_repeats));
                if let Some(t) = &habit.start_time {
                    print_line(&format!("time: {} - {}", t, habit.end_time.as_deref().unwrap_or("?")));
                }
                if habit.is_paused {
                    print_line(&format!(
                        "paused since {} ({})",
                        habit.paused_at.as_deref().unwrap_or("?"),
                        habit.pause_reason.as_deref().unwrap_or("no reason"),
                    ));
                }
                print_line(&format!(
                    "streak: {} current / {} best",
                    streaks.current_daily, streaks.best_daily
                ));
                print_line(&format!("logged days: {}", habit_logs.len()));
            }

            Ok(())
        }

        Command::Edit(args) => {
            ensure_format_supported(cli.format, false)?;

            let updated = update_db(&db_path, |db| {
                let idx = select_habit_index(db, &args.habit)?;
                let existing = db.habits[idx].clone();

                let schedule = match &args.repeat {
                    Some(pattern) => parse_schedule_pattern(pattern)?,
                    None => existing.schedule.clone(),
                };
                let end_date = if args.no_end_date {
                    None
                } else {
                    args.end_date.clone().or(match &existing.end_condition {
                        EndCondition::ByDate { end_date } => Some(end_date.clone()),
                        EndCondition::None => None,
                    })
                };
                let icon = args.icon.clone().or(existing.icon.clone());
                let color = args.color.clone().or(existing.color.clone());
                let start_time = args.start_time.clone().or(existing.start_time.clone());
                let end_time = args.end_time.clone().or(existing.end_time.clone());

                let mut habit = make_habit(
                    existing.id.clone(),
                    &HabitDraft {
                        name: args.name.as_deref().unwrap_or(&existing.name),
                        schedule,
                        target_repeats: args.target.unwrap_or(existing.target_repeats),
                        icon: icon.as_deref(),
                        color: color.as_deref(),
                        start_time: start_time.as_deref(),
                        end_time: end_time.as_deref(),
                        reminder_offset_minutes: args
                            .remind
                            .or(existing.reminder_offset_minutes),
                        end_date: end_date.as_deref(),
                    },
                    &today,
                )?;
                habit.is_paused = existing.is_paused;
                habit.paused_at = existing.paused_at.clone();
                habit.pause_reason = existing.pause_reason.clone();
                habit.notification_ids = existing.notification_ids.clone();

                Ok(replace_habit(db, idx, habit))
            })?;

            if cli.format == Format::Json {
                #[derive(serde::Serialize)]
                struct Out {
                    habit: Habit,
                }
                print_json(&Out { habit: updated })?;
            } else {
                print_habit_table(&[updated]);
            }

            Ok(())
        }

        Command::Delete(args) => {
            ensure_format_supported(cli.format, false)?;

            let deleted = update_db(&db_path, |db| {
                let idx = select_habit_index(db, &args.habit)?;
                Ok(delete_habit(db, idx))
            })?;

            if cli.format == Format::Json {
                #[derive(serde::Serialize)]
                struct Out {
                    deleted: Habit,
                }
                print_json(&Out { deleted })?;
            } else {
                print_line(&format!("Deleted {} ({})", deleted.name, deleted.id));
            }

            Ok(())
        }

        Command::Pause(args) => {
            ensure_format_supported(cli.format, false)?;

            let paused = update_db(&db_path, |db| {
                let idx = select_habit_index(db, &args.habit)?;
                Ok(pause_habit(db, idx, &today, args.reason.as_deref()))
            })?;

            if cli.format == Format::Json {
                #[derive(serde::Serialize)]
                struct Out {
                    habit: Habit,
                }
                print_json(&Out { habit: paused })?;
            } else {
                print_line(&format!("Paused {} ({})", paused.name, paused.id));
            }

            Ok(())
        }

        Command::Resume(args) => {
            ensure_format_supported(cli.format, false)?;

            let resumed = update_db(&db_path, |db| {
                let idx = select_habit_index(db, &args.habit)?;
                Ok(resume_habit(db, idx))
            })?;

            if cli.format == Format::Json {
                #[derive(serde::Serialize)]
                struct Out {
                    habit: Habit,
                }
                print_json(&Out { habit: resumed })?;
            } else {
                print_line(&format!("Resumed {} ({})", resumed.name, resumed.id));
            }

            Ok(())
        }

        Command::Log(args) => {
            ensure_format_supported(cli.format, false)?;
            let date = resolve_date_arg(args.date.as_deref(), &today)?;

            let (habit, log) = update_db(&db_path, |db| {
                let idx = select_habit_index(db, &args.habit)?;
                let habit = db.habits[idx].clone();
                let target = habit.target_repeats;

                let log = if args.toggle {
                    toggle(db, &habit.id, &date, target)?
                } else if let Some(count) = args.set {
                    upsert_log(db, &habit.id, &date, count >= target, count, target)?
                } else {
                    increment_progress(db, &habit.id, &date, target)?
                };
                Ok((habit, log))
            })?;

            if cli.format == Format::Json {
                #[derive(serde::Serialize)]
                struct Out {
                    habit_id: String,
                    log: model::HabitLog,
                }
                print_json(&Out {
                    habit_id: habit.id,
                    log,
                })?;
            } else {
                let mark = if log.done {
                    styler.green("done")
                } else {
                    styler.gray(&format!("{}/{}", log.progress, habit.target_repeats))
                };
                print_line(&format!("{} {} {}", log.date, habit.name, mark));
            }

            Ok(())
        }

        Command::Today(args) => {
            ensure_format_supported(cli.format, false)?;
            let date = resolve_date_arg(args.date.as_deref(), &today)?;

            let db = read_db(&db_path)?;
            let logs_for_date = get_logs_for_date(&db, &date);
            let due = habits_due_on(&date, &db.habits, &logs_for_date);

            if cli.format == Format::Json {
                #[derive(serde::Serialize)]
                struct Out {
                    date: String,
                    habits: Vec<due::DueEntry>,
                }
                print_json(&Out { date, habits: due })?;
            } else {
                let rows: Vec<Vec<String>> = due
                    .iter()
                    .map(|e| {
                        vec![
                            e.id.clone(),
                            format!(
                                "{}{}",
                                e.icon.as_deref().map(|i| format!("{} ", i)).unwrap_or_default(),
                                e.name
                            ),
                            e.start_time.clone().unwrap_or_else(|| "-".to_string()),
                            format!("{}/{}", e.progress, e.target_repeats),
                            if e.done {
                                styler.green("done")
                            } else {
                                styler.gray("open")
                            },
                        ]
                    })
                    .collect();
                print_line(&format!("Due on {}", date));
                print_line(&render_simple_table(
                    &["id", "habit", "time", "progress", "state"],
                    &rows,
                ));
            }

            Ok(())
        }

        Command::Week(args) => {
            ensure_format_supported(cli.format, false)?;
            let date = resolve_date_arg(args.date.as_deref(), &today)?;

            let db = read_db(&db_path)?;
            let days = weekly_summary(&date, &db.habits, &db.logs);

            if cli.format == Format::Json {
                #[derive(serde::Serialize)]
                struct Out {
                    reference_date: String,
                    days: Vec<summary::DaySummary>,
                }
                print_json(&Out {
                    reference_date: date,
                    days,
                })?;
            } else {
                let rows: Vec<Vec<String>> = days
                    .iter()
                    .map(|d| {
                        vec![
                            d.date.clone(),
                            d.label.to_string(),
                            format!("{}/{}", d.total_done, d.total_planned),
                            percent(d.completion_rate),
                        ]
                    })
                    .collect();
                print_line(&render_simple_table(&["date", "day", "done", "rate"], &rows));
            }

            Ok(())
        }

        Command::Month(args) => {
            ensure_format_supported(cli.format, false)?;

            let db = read_db(&db_path)?;
            let idx = select_habit_index(&db, &args.habit)?;
            let habit = db.habits[idx].clone();

            let (default_year, default_month) =
                year_month(&today).ok_or_else(|| CliError::usage("Invalid today"))?;
            let year = args.year.unwrap_or(default_year);
            let month = args.month.unwrap_or(default_month);
            if !(1..=12).contains(&month) {
                return Err(CliError::usage(format!("Invalid month: {}", month)));
            }

            let habit_logs = get_logs_for_habit(&db, &habit.id);
            let days = monthly_calendar(&habit, year, month, &habit_logs, &today);

            if cli.format == Format::Json {
                #[derive(serde::Serialize)]
                struct Out {
                    habit_id: String,
                    year: i32,
                    month: u32,
                    days: Vec<summary::MonthDay>,
                }
                print_json(&Out {
                    habit_id: habit.id,
                    year,
                    month,
                    days,
                })?;
            } else {
                let first_weekday = date::day_of_week(&format_date(year, month, 1))
                    .unwrap_or(0) as usize;
                let cells: Vec<String> = days
                    .iter()
                    .map(|d| {
                        let cell = format!("{:>2}", d.day);
                        match d.state {
                            DayState::Done => styler.green(&cell),
                            DayState::Missed => styler.red(&cell),
                            DayState::Future => cell,
                            DayState::Unscheduled => styler.gray(&cell),
                        }
                    })
                    .collect();
                print_line(&format!(
                    "{} ({}) {:04}-{:02}",
                    habit.name, habit.id, year, month
                ));
                print_line(&render_month_grid(first_weekday, &cells));
            }

            Ok(())
        }

        Command::History(args) => {
            ensure_format_supported(cli.format, false)?;
            let to = resolve_date_arg(args.to.as_deref(), &today)?;
            if args.months < 1 {
                return Err(CliError::usage("Invalid months: must be >= 1"));
            }

            let (to_year, to_month) =
                year_month(&to).ok_or_else(|| CliError::usage("Invalid date"))?;
            let total = to_year * 12 + to_month as i32 - 1 - (args.months as i32 - 1);
            let from = format_date(total.div_euclid(12), (total.rem_euclid(12) + 1) as u32, 1);

            let db = read_db(&db_path)?;
            let months = full_history(&from, &to, &db.habits, &db.logs);

            if cli.format == Format::Json {
                #[derive(serde::Serialize)]
                struct Out {
                    from: String,
                    to: String,
                    months: Vec<summary::MonthHistory>,
                }
                print_json(&Out { from, to, months })?;
            } else if months.is_empty() {
                print_line("No history yet");
            } else {
                for m in months.iter() {
                    print_line(&format!("{:04}-{:02}", m.year, m.month));
                    for w in m.weeks.iter() {
                        print_line(&format!("  {}", w.week));
                        for d in w.days.iter() {
                            print_line(&format!(
                                "    {} {} {}/{} {}",
                                d.date,
                                d.label,
                                d.total_done,
                                d.total_planned,
                                percent(d.completion_rate),
                            ));
                        }
                    }
                }
            }

            Ok(())
        }

        Command::Streaks(args) => {
            ensure_format_supported(cli.format, false)?;

            let db = read_db(&db_path)?;
            let selected: Vec<Habit> = match &args.habit {
                Some(sel) => {
                    let idx = select_habit_index(&db, sel)?;
                    vec![db.habits[idx].clone()]
                }
                None => list_habits(&db),
            };

            #[derive(serde::Serialize)]
            struct Row {
                habit_id: String,
                name: String,
                streaks: streaks::StreakSummary,
            }

            let rows: Vec<Row> = selected
                .iter()
                .map(|h| Row {
                    habit_id: h.id.clone(),
                    name: h.name.clone(),
                    streaks: compute_streaks(h, &get_logs_for_habit(&db, &h.id), &today),
                })
                .collect();

            if cli.format == Format::Json {
                #[derive(serde::Serialize)]
                struct Out {
                    streaks: Vec<Row>,
                }
                print_json(&Out { streaks: rows })?;
            } else {
                let table: Vec<Vec<String>> = rows
                    .iter()
                    .map(|r| {
                        vec![
                            r.habit_id.clone(),
                            r.name.clone(),
                            r.streaks.current_daily.to_string(),
                            r.streaks.best_daily.to_string(),
                            r.streaks.current_weekly.to_string(),
                            r.streaks.best_weekly.to_string(),
                        ]
                    })
                    .collect();
                print_line(&render_simple_table(
                    &["id", "name", "current", "best", "current wk", "best wk"],
                    &table,
                ));
            }

            Ok(())
        }

        Command::Remind(args) => match args.command {
            RemindCommand::List(list_args) => {
                ensure_format_supported(cli.format, false)?;

                let db = read_db(&db_path)?;
                let slots = plan_all_reminders(&db.habits, &today, list_args.days);

                if cli.format == Format::Json {
                    #[derive(serde::Serialize)]
                    struct Out {
                        reminders: Vec<reminders::ReminderSlot>,
                    }
                    print_json(&Out { reminders: slots })?;
                } else {
                    let rows: Vec<Vec<String>> = slots
                        .iter()
                        .map(|s| {
                            vec![
                                s.date.clone(),
                                s.time.clone(),
                                s.habit_id.clone(),
                                s.name.clone(),
                            ]
                        })
                        .collect();
                    print_line(&render_simple_table(
                        &["date", "time", "id", "habit"],
                        &rows,
                    ));
                }

                Ok(())
            }

            RemindCommand::Sync(sync_args) => {
                ensure_format_supported(cli.format, false)?;

                let synced = update_db(&db_path, |db| {
                    let idx = select_habit_index(db, &sync_args.habit)?;
                    let habit = db.habits[idx].clone();
                    let slots = plan_reminders(&habit, &today, sync_args.days);
                    let ids: Vec<String> =
                        slots.iter().map(|_| next_notification_id(db)).collect();
                    Ok(set_notification_ids(db, idx, ids))
                })?;

                if cli.format == Format::Json {
                    #[derive(serde::Serialize)]
                    struct Out {
                        habit: Habit,
                    }
                    print_json(&Out { habit: synced })?;
                } else {
                    print_line(&format!(
                        "Scheduled {} reminders for {} ({})",
                        synced.notification_ids.len(),
                        synced.name,
                        synced.id
                    ));
                }

                Ok(())
            }

            RemindCommand::Cancel(sel_args) => {
                ensure_format_supported(cli.format, false)?;

                let cancelled = update_db(&db_path, |db| {
                    let idx = select_habit_index(db, &sel_args.habit)?;
                    Ok(set_notification_ids(db, idx, Vec::new()))
                })?;

                if cli.format == Format::Json {
                    #[derive(serde::Serialize)]
                    struct Out {
                        habit: Habit,
                    }
                    print_json(&Out { habit: cancelled })?;
                } else {
                    print_line(&format!(
                        "Cancelled reminders for {} ({})",
                        cancelled.name, cancelled.id
                    ));
                }

                Ok(())
            }
        },

        Command::Export(args) => {
            let db = read_db(&db_path)?;
            let habits = list_habits(&db);
            let mut all_logs = db.logs.clone();
            all_logs.sort_by(|a, b| {
                if a.date != b.date {
                    a.date.cmp(&b.date)
                } else {
                    a.habit_id.cmp(&b.habit_id)
                }
            });

            match cli.format {
                Format::Csv => {
                    let out_dir = args
                        .out
                        .as_deref()
                        .ok_or_else(|| CliError::usage("--out is required for csv export"))?;
                    export_csv_to_dir(out_dir, &habits, &all_logs)?;
                    print_line(&format!("Exported to {}", out_dir));
                }
                _ => {
                    #[derive(serde::Serialize)]
                    struct Out {
                        habits: Vec<Habit>,
                        logs: Vec<model::HabitLog>,
                    }
                    print_json(&Out {
                        habits,
                        logs: all_logs,
                    })?;
                }
            }

            Ok(())
        }
    }
}

use crate::date::parse_date_string;
use crate::error::CliError;
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const DAY_NAMES: [(&str, u8); 7] = [
    ("sun", 0),
    ("mon", 1),
    ("tue", 2),
    ("wed", 3),
    ("thu", 4),
    ("fri", 5),
    ("sat", 6),
];

fn day_name(d: u8) -> Option<&'static str> {
    DAY_NAMES.iter().find(|(_, n)| *n == d).map(|(name, _)| *name)
}

/// Recurrence rule. Weekday numbers are Sunday=0 .. Saturday=6; days of
/// month are 1..=31 with configured days beyond a short month collapsing
/// onto its last day (see `due::is_due_on`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Schedule {
    Daily,
    Weekly { days_of_week: Vec<u8> },
    Monthly { days_of_month: Vec<u32> },
}

/// When a habit stops being due, independent of its schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EndCondition {
    None,
    ByDate { end_date: String },
}

fn clamped_weekdays(values: &[i64]) -> Vec<u8> {
    let mut out: Vec<u8> = values
        .iter()
        .filter(|v| (0..=6).contains(*v))
        .map(|v| *v as u8)
        .collect();
    out.sort_unstable();
    out.dedup();
    out
}

fn clamped_monthdays(values: &[i64]) -> Vec<u32> {
    let mut out: Vec<u32> = values
        .iter()
        .filter(|v| (1..=31).contains(*v))
        .map(|v| *v as u32)
        .collect();
    out.sort_unstable();
    out.dedup();
    out
}

fn int_array(v: &Value) -> Vec<i64> {
    match v {
        Value::Array(items) => items.iter().filter_map(Value::as_i64).collect(),
        _ => Vec::new(),
    }
}

impl Schedule {
    /// Interpret an arbitrary stored JSON shape. Anything that does not
    /// spell out a valid weekly or monthly rule heals to `Daily`; the
    /// statistics engine must keep working when one record is corrupt.
    fn from_value(v: &Value) -> Schedule {
        match v.get("type").and_then(Value::as_str) {
            Some("weekly") => Schedule::Weekly {
                days_of_week: v
                    .get("days_of_week")
                    .map(|d| clamped_weekdays(&int_array(d)))
                    .unwrap_or_default(),
            },
            Some("monthly") => Schedule::Monthly {
                days_of_month: v
                    .get("days_of_month")
                    .map(|d| clamped_monthdays(&int_array(d)))
                    .unwrap_or_default(),
            },
            _ => Schedule::Daily,
        }
    }
}

impl<'de> Deserialize<'de> for Schedule {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let v = Value::deserialize(deserializer)?;
        Ok(Schedule::from_value(&v))
    }
}

impl EndCondition {
    fn from_value(v: &Value) -> EndCondition {
        match v.get("type").and_then(Value::as_str) {
            Some("by_date") => match v.get("end_date").and_then(Value::as_str) {
                Some(d) if parse_date_string(d, "end date").is_ok() => EndCondition::ByDate {
                    end_date: d.to_string(),
                },
                _ => EndCondition::None,
            },
            _ => EndCondition::None,
        }
    }
}

impl<'de> Deserialize<'de> for EndCondition {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let v = Value::deserialize(deserializer)?;
        Ok(EndCondition::from_value(&v))
    }
}

impl Default for EndCondition {
    fn default() -> Self {
        EndCondition::None
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Schedule::Daily
    }
}

/// Parse a CLI repeat pattern:
/// `daily`, `everyday`, `weekdays`, `weekends`, a weekday list like
/// `mon,wed,fri`, or `monthly:1,15,31`.
pub fn parse_schedule_pattern(pattern_raw: &str) -> Result<Schedule, CliError> {
    let pattern = pattern_raw.trim().to_lowercase();
    if pattern.is_empty() {
        return Err(CliError::usage("Invalid repeat pattern"));
    }

    if pattern == "daily" || pattern == "everyday" {
        return Ok(Schedule::Daily);
    }
    if pattern == "weekdays" {
        return Ok(Schedule::Weekly {
            days_of_week: vec![1, 2, 3, 4, 5],
        });
    }
    if pattern == "weekends" {
        return Ok(Schedule::Weekly {
            days_of_week: vec![0, 6],
        });
    }

    if let Some(rest) = pattern.strip_prefix("monthly:") {
        let mut days: Vec<u32> = Vec::new();
        for p in rest.split(',').map(|p| p.trim()).filter(|p| !p.is_empty()) {
            let d: u32 = p.parse().map_err(|_| {
                CliError::usage(format!("Invalid repeat pattern: {}", pattern_raw))
            })?;
            if !(1..=31).contains(&d) {
                return Err(CliError::usage(format!(
                    "Invalid repeat pattern: {}",
                    pattern_raw
                )));
            }
            if !days.contains(&d) {
                days.push(d);
            }
        }
        if days.is_empty() {
            return Err(CliError::usage(format!(
                "Invalid repeat pattern: {}",
                pattern_raw
            )));
        }
        days.sort_unstable();
        return Ok(Schedule::Monthly {
            days_of_month: days,
        });
    }

    let list = pattern.strip_prefix("weekly:").unwrap_or(&pattern);
    let parts: Vec<&str> = list.split(',').map(|p| p.trim()).filter(|p| !p.is_empty()).collect();
    if parts.is_empty() {
        return Err(CliError::usage(format!(
            "Invalid repeat pattern: {}",
            pattern_raw
        )));
    }

    let mut days: Vec<u8> = Vec::new();
    for p in parts {
        let wd = DAY_NAMES
            .iter()
            .find(|(name, _)| *name == p)
            .map(|(_, d)| *d)
            .ok_or_else(|| CliError::usage(format!("Invalid repeat pattern: {}", pattern_raw)))?;
        if !days.contains(&wd) {
            days.push(wd);
        }
    }
    days.sort_unstable();

    Ok(Schedule::Weekly { days_of_week: days })
}

pub fn schedule_to_string(schedule: &Schedule) -> String {
    match schedule {
        Schedule::Daily => "daily".to_string(),
        Schedule::Weekly { days_of_week } => {
            let mut days = days_of_week.clone();
            days.sort_unstable();

            if days == [0, 1, 2, 3, 4, 5, 6] {
                return "everyday".to_string();
            }
            if days == [1, 2, 3, 4, 5] {
                return "weekdays".to_string();
            }
            if days == [0, 6] {
                return "weekends".to_string();
            }

            days.iter()
                .filter_map(|d| day_name(*d))
                .collect::<Vec<&str>>()
                .join(",")
        }
        Schedule::Monthly { days_of_month } => {
            let mut days = days_of_month.clone();
            days.sort_unstable();
            format!(
                "monthly:{}",
                days.iter()
                    .map(|d| d.to_string())
                    .collect::<Vec<String>>()
                    .join(",")
            )
        }
    }
}

/// Construction-time check; the evaluator itself tolerates out-of-range
/// values by treating them as never matching.
pub fn validate_schedule(schedule: &Schedule) -> Result<(), CliError> {
    match schedule {
        Schedule::Daily => Ok(()),
        Schedule::Weekly { days_of_week } => {
            if days_of_week.is_empty() {
                return Err(CliError::usage("Invalid schedule: no weekdays"));
            }
            if days_of_week.iter().any(|d| *d > 6) {
                return Err(CliError::usage("Invalid schedule: weekday out of range"));
            }
            Ok(())
        }
        Schedule::Monthly { days_of_month } => {
            if days_of_month.is_empty() {
                return Err(CliError::usage("Invalid schedule: no days of month"));
            }
            if days_of_month.iter().any(|d| *d < 1 || *d > 31) {
                return Err(CliError::usage(
                    "Invalid schedule: day of month out of range",
                ));
            }
            Ok(())
        }
    }
}

pub fn end_condition_to_string(end: &EndCondition) -> String {
    match end {
        EndCondition::None => "-".to_string(),
        EndCondition::ByDate { end_date } => format!("until {}", end_date),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_roundtrip() {
        assert_eq!(
            schedule_to_string(&parse_schedule_pattern("daily").unwrap()),
            "daily"
        );
        assert_eq!(
            schedule_to_string(&parse_schedule_pattern("weekdays").unwrap()),
            "weekdays"
        );
        assert_eq!(
            schedule_to_string(&parse_schedule_pattern("weekends").unwrap()),
            "weekends"
        );
        assert_eq!(
            schedule_to_string(&parse_schedule_pattern("mon,wed,fri").unwrap()),
            "mon,wed,fri"
        );
        assert_eq!(
            schedule_to_string(&parse_schedule_pattern("monthly:31,1,15").unwrap()),
            "monthly:1,15,31"
        );
    }

    #[test]
    fn pattern_rejects_garbage() {
        assert!(parse_schedule_pattern("").is_err());
        assert!(parse_schedule_pattern("mon,funday").is_err());
        assert!(parse_schedule_pattern("monthly:0").is_err());
        assert!(parse_schedule_pattern("monthly:32").is_err());
        assert!(parse_schedule_pattern("monthly:").is_err());
    }

    #[test]
    fn corrupt_schedule_heals_to_daily() {
        let s: Schedule = serde_json::from_str("\"whenever\"").unwrap();
        assert_eq!(s, Schedule::Daily);

        let s: Schedule = serde_json::from_str(r#"{"type":"lunar","phase":3}"#).unwrap();
        assert_eq!(s, Schedule::Daily);

        let s: Schedule = serde_json::from_str(r#"{"type":"weekly"}"#).unwrap();
        assert_eq!(
            s,
            Schedule::Weekly {
                days_of_week: vec![]
            }
        );
    }

    #[test]
    fn out_of_range_days_are_clamped_on_load() {
        let s: Schedule =
            serde_json::from_str(r#"{"type":"weekly","days_of_week":[-1,0,3,3,9]}"#).unwrap();
        assert_eq!(
            s,
            Schedule::Weekly {
                days_of_week: vec![0, 3]
            }
        );

        let s: Schedule =
            serde_json::from_str(r#"{"type":"monthly","days_of_month":[0,15,31,40]}"#).unwrap();
        assert_eq!(
            s,
            Schedule::Monthly {
                days_of_month: vec![15, 31]
            }
        );
    }

    #[test]
    fn corrupt_end_condition_heals_to_none() {
        let e: EndCondition =
            serde_json::from_str(r#"{"type":"by_date","end_date":"2024-01-10"}"#).unwrap();
        assert_eq!(
            e,
            EndCondition::ByDate {
                end_date: "2024-01-10".to_string()
            }
        );

        let e: EndCondition =
            serde_json::from_str(r#"{"type":"by_date","end_date":"soon"}"#).unwrap();
        assert_eq!(e, EndCondition::None);

        let e: EndCondition = serde_json::from_str("42").unwrap();
        assert_eq!(e, EndCondition::None);
    }
}

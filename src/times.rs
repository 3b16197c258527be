use crate::error::CliError;

/// Strict `HH:mm` validation for CLI input. Times are carried as strings
/// end to end; this is the only place a time is ever parsed.
pub fn validate_hhmm(t: &str, label: &str) -> Result<(), CliError> {
    let tt = t.trim();
    if tt.is_empty() {
        return Err(CliError::usage(format!("Invalid {}: (empty)", label)));
    }
    chrono::NaiveTime::parse_from_str(tt, "%H:%M")
        .map(|_| ())
        .map_err(|_| CliError::usage(format!("Invalid {}: {}", label, t)))
}

pub fn hhmm_to_minutes(t: &str) -> Option<i32> {
    let tt = t.trim();
    if tt.len() != 5 || tt.as_bytes()[2] != b':' {
        return None;
    }
    let h: i32 = tt[0..2].parse().ok()?;
    let m: i32 = tt[3..5].parse().ok()?;
    if !(0..24).contains(&h) || !(0..60).contains(&m) {
        return None;
    }
    Some(h * 60 + m)
}

pub fn minutes_to_hhmm(total: i32) -> String {
    let clamped = total.clamp(0, 23 * 60 + 59);
    format!("{:02}:{:02}", clamped / 60, clamped % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hhmm_validation() {
        assert!(validate_hhmm("07:30", "start time").is_ok());
        assert!(validate_hhmm("23:59", "start time").is_ok());
        assert!(validate_hhmm("24:00", "start time").is_err());
        assert!(validate_hhmm("7:30", "start time").is_err());
        assert!(validate_hhmm("", "start time").is_err());
    }

    #[test]
    fn minute_conversions() {
        assert_eq!(hhmm_to_minutes("07:30"), Some(450));
        assert_eq!(hhmm_to_minutes("00:00"), Some(0));
        assert_eq!(hhmm_to_minutes("25:00"), None);
        assert_eq!(minutes_to_hhmm(450), "07:30");
        // Offsets that would cross midnight clamp to the same day.
        assert_eq!(minutes_to_hhmm(-20), "00:00");
        assert_eq!(minutes_to_hhmm(24 * 60 + 5), "23:59");
    }
}

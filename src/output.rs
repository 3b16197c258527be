pub struct Styler {
    color_enabled: bool,
}

impl Styler {
    pub fn new(color_enabled: bool) -> Self {
        Self { color_enabled }
    }

    fn wrap(&self, code: &str, s: &str) -> String {
        if !self.color_enabled {
            return s.to_string();
        }
        format!("{}{}\u{001b}[0m", code, s)
    }

    pub fn green(&self, s: &str) -> String {
        self.wrap("\u{001b}[32m", s)
    }

    pub fn red(&self, s: &str) -> String {
        self.wrap("\u{001b}[31m", s)
    }

    pub fn gray(&self, s: &str) -> String {
        self.wrap("\u{001b}[90m", s)
    }
}

/// Display width of a string. Habit icons are usually emoji, which most
/// terminals render two columns wide; without this the list columns
/// drift.
pub fn display_width(s: &str) -> usize {
    s.chars().map(|c| if is_wide_char(c) { 2 } else { 1 }).sum()
}

fn is_wide_char(c: char) -> bool {
    let cp = c as u32;
    // CJK ideographs, Hangul, fullwidth forms
    (0x4E00..=0x9FFF).contains(&cp)
        || (0x3400..=0x4DBF).contains(&cp)
        || (0xF900..=0xFAFF).contains(&cp)
        || (0xFF00..=0xFFEF).contains(&cp)
        || (0xAC00..=0xD7AF).contains(&cp)
        // Emoji and symbol blocks
        || (0x1F300..=0x1F9FF).contains(&cp)
        || (0x2600..=0x27BF).contains(&cp)
        // Block elements used in progress cells
        || (0x2580..=0x259F).contains(&cp)
}

fn pad_right(s: &str, width: usize) -> String {
    let dw = display_width(s);
    if dw >= width {
        s.to_string()
    } else {
        let mut out = String::with_capacity(s.len() + (width - dw));
        out.push_str(s);
        out.push_str(&" ".repeat(width - dw));
        out
    }
}

pub fn render_simple_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| display_width(h)).collect();

    for row in rows.iter() {
        for (i, cell) in row.iter().enumerate() {
            let cell_width = display_width(cell);
            if i >= widths.len() {
                widths.push(cell_width);
            } else {
                widths[i] = widths[i].max(cell_width);
            }
        }
    }

    let header_line = headers
        .iter()
        .enumerate()
        .map(|(i, h)| pad_right(h, widths[i]))
        .collect::<Vec<String>>()
        .join("  ");

    let mut body_lines: Vec<String> = Vec::new();
    for row in rows.iter() {
        let line = row
            .iter()
            .enumerate()
            .map(|(i, cell)| pad_right(cell, widths[i]))
            .collect::<Vec<String>>()
            .join("  ");
        body_lines.push(line);
    }

    if body_lines.is_empty() {
        header_line
    } else {
        format!("{}\n{}", header_line, body_lines.join("\n"))
    }
}

/// Lay pre-rendered day cells out as a Sunday-first calendar grid.
/// `first_weekday` is the weekday of the month's first day (Sunday=0).
pub fn render_month_grid(first_weekday: usize, cells: &[String]) -> String {
    let mut lines: Vec<String> = vec!["Su Mo Tu We Th Fr Sa".to_string()];

    let mut row: Vec<String> = vec!["  ".to_string(); first_weekday.min(6)];
    for cell in cells.iter() {
        row.push(pad_right(cell, 2));
        if row.len() == 7 {
            lines.push(row.join(" ").trim_end().to_string());
            row.clear();
        }
    }
    if !row.is_empty() {
        lines.push(row.join(" ").trim_end().to_string());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_of_ascii_and_emoji() {
        assert_eq!(display_width("hello"), 5);
        assert_eq!(display_width(""), 0);
        assert_eq!(display_width("🏃"), 2);
        assert_eq!(display_width("Gym🏋"), 5);
    }

    #[test]
    fn pad_right_accounts_for_width() {
        assert_eq!(pad_right("hi", 5), "hi   ");
        assert_eq!(pad_right("hello", 5), "hello");
        assert_eq!(pad_right("toolong", 5), "toolong");
    }

    #[test]
    fn table_aligns_mixed_width_rows() {
        let headers = &["name", "state"];
        let rows = vec![
            vec!["🏃 Run".to_string(), "done".to_string()],
            vec!["Read".to_string(), "missed".to_string()],
        ];
        let table = render_simple_table(headers, &rows);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(display_width(lines[1]), display_width(lines[2]));
    }

    #[test]
    fn month_grid_wraps_at_seven_columns() {
        let cells: Vec<String> = (1..=10).map(|d| d.to_string()).collect();
        // A month starting on Thursday.
        let grid = render_month_grid(4, &cells);
        let lines: Vec<&str> = grid.lines().collect();
        assert_eq!(lines[0], "Su Mo Tu We Th Fr Sa");
        assert!(lines[1].trim_start().starts_with('1'));
        assert_eq!(lines.len(), 3);
    }
}

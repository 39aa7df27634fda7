use snaplock_core::{LayoutPlan, LockEntry, Scene};

use crate::commands::WindowRow;

/// Box-drawn table with fixed column widths.
pub struct TableFormatter {
    headers: Vec<&'static str>,
    widths: Vec<usize>,
}

impl TableFormatter {
    /// Size each column to its widest cell, clamped between the header width
    /// and `max`.
    pub fn new(headers: &[&'static str], rows: &[Vec<String>], max: &[usize]) -> Self {
        let widths = headers
            .iter()
            .enumerate()
            .map(|(col, header)| {
                let widest = rows
                    .iter()
                    .filter_map(|row| row.get(col))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0);
                let min = header.chars().count();
                widest.clamp(min, max.get(col).copied().unwrap_or(50).max(min))
            })
            .collect();

        Self {
            headers: headers.to_vec(),
            widths,
        }
    }

    pub fn print_table(&self, rows: &[Vec<String>]) {
        println!("{}", self.border('┌', '┬', '┐'));
        println!("{}", self.row(self.headers.iter().copied()));
        println!("{}", self.border('├', '┼', '┤'));
        for row in rows {
            println!("{}", self.row(row.iter().map(String::as_str)));
        }
        println!("{}", self.border('└', '┴', '┘'));
    }

    fn border(&self, left: char, mid: char, right: char) -> String {
        let segments: Vec<String> = self.widths.iter().map(|w| "─".repeat(w + 2)).collect();
        format!("{}{}{}", left, segments.join(&mid.to_string()), right)
    }

    fn row<'a>(&self, cells: impl Iterator<Item = &'a str>) -> String {
        let cells: Vec<String> = cells
            .zip(&self.widths)
            .map(|(cell, width)| format!(" {} ", truncate(cell, *width)))
            .collect();
        format!("│{}│", cells.join("│"))
    }
}

pub fn print_windows_table(windows: &[WindowRow]) {
    let rows: Vec<Vec<String>> = windows
        .iter()
        .map(|w| {
            vec![
                w.handle.to_string(),
                w.process_name.clone(),
                w.title.clone(),
                w.rect.to_string(),
            ]
        })
        .collect();
    TableFormatter::new(&["Handle", "Process", "Title", "Rect"], &rows, &[12, 20, 50, 24])
        .print_table(&rows);
}

pub fn print_plan_table(plan: &LayoutPlan) {
    let rows: Vec<Vec<String>> = plan
        .placements()
        .iter()
        .map(|p| {
            vec![
                p.handle.to_string(),
                p.rect.to_string(),
                if p.locked { "locked" } else { "" }.to_string(),
            ]
        })
        .collect();
    TableFormatter::new(&["Handle", "Rect", "Lock"], &rows, &[12, 24, 6]).print_table(&rows);
}

pub fn print_locks_table(locks: &[LockEntry]) {
    let rows: Vec<Vec<String>> = locks
        .iter()
        .enumerate()
        .map(|(index, lock)| {
            vec![
                index.to_string(),
                lock.process_name.clone(),
                lock.title.clone(),
                lock.rect.to_string(),
                lock.match_key.clone(),
            ]
        })
        .collect();
    TableFormatter::new(
        &["#", "Process", "Title", "Rect", "Match Key"],
        &rows,
        &[5, 20, 40, 24, 40],
    )
    .print_table(&rows);
}

pub fn print_scenes_table(scenes: &[Scene]) {
    let rows: Vec<Vec<String>> = scenes
        .iter()
        .map(|scene| {
            vec![
                scene.name.clone(),
                scene.items.len().to_string(),
                scene
                    .thumbnail_path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            ]
        })
        .collect();
    TableFormatter::new(&["Name", "Windows", "Thumbnail"], &rows, &[30, 7, 50])
        .print_table(&rows);
}

/// Truncate a string to a maximum display width, adding "..." if truncated.
///
/// Counts characters rather than bytes so multi-byte titles stay intact.
pub fn truncate(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_len {
        format!("{:<width$}", s, width = max_len)
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{:<width$}", format!("{}...", truncated), width = max_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_pads_short_strings() {
        assert_eq!(truncate("abc", 5), "abc  ");
    }

    #[test]
    fn test_truncate_shortens_long_strings() {
        assert_eq!(truncate("abcdefgh", 6), "abc...");
    }

    #[test]
    fn test_truncate_counts_characters_not_bytes() {
        assert_eq!(truncate("微信聊天窗口", 5), "微信...");
    }

    #[test]
    fn test_widths_clamp_between_header_and_max() {
        let rows = vec![
            vec!["1".to_string(), "a very long process name".to_string()],
            vec!["22".to_string(), "x".to_string()],
        ];
        let table = TableFormatter::new(&["Handle", "Process"], &rows, &[12, 10]);
        assert_eq!(table.widths, vec![6, 10]);
    }

    #[test]
    fn test_border_spans_all_columns() {
        let rows = vec![vec!["ab".to_string(), "cde".to_string()]];
        let table = TableFormatter::new(&["A", "B"], &rows, &[10, 10]);
        assert_eq!(table.border('┌', '┬', '┐'), "┌────┬─────┐");
        assert_eq!(table.row(["ab", "cde"].into_iter()), "│ ab │ cde │");
    }
}

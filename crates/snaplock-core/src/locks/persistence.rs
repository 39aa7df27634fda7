//! Lock file codec.
//!
//! One lock per line: `processName|title|x,y,w,h|matchKey|execPath|url`.
//! Fields after the rect are optional. Text fields escape `%`, `|`, CR and
//! LF as `%25`, `%7C`, `%0D` and `%0A`; unescaped legacy lines still load.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use super::errors::LockError;
use crate::geometry::Rect;
use crate::identity::LockEntry;

const SEPARATOR: &str = "|";

fn escape_field(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '%' => out.push_str("%25"),
            '|' => out.push_str("%7C"),
            '\r' => out.push_str("%0D"),
            '\n' => out.push_str("%0A"),
            _ => out.push(c),
        }
    }
    out
}

fn unescape_field(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        let decoded = match tail.get(..3) {
            Some("%25") => Some('%'),
            Some("%7C") | Some("%7c") => Some('|'),
            Some("%0D") | Some("%0d") => Some('\r'),
            Some("%0A") | Some("%0a") => Some('\n'),
            _ => None,
        };
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &tail[3..];
            }
            None => {
                out.push('%');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn format_line(entry: &LockEntry) -> String {
    [
        escape_field(&entry.process_name),
        escape_field(&entry.title),
        entry.rect.to_string(),
        escape_field(&entry.match_key),
        escape_field(&entry.exec_path),
        escape_field(&entry.url),
    ]
    .join(SEPARATOR)
}

/// Parse one lock line. The error string says why the line was rejected.
pub fn parse_line(line: &str) -> Result<LockEntry, String> {
    let fields: Vec<&str> = line.split(SEPARATOR).collect();
    if fields.len() < 3 {
        return Err(format!("expected at least 3 fields, found {}", fields.len()));
    }

    let rect: Rect = fields[2].parse().map_err(|e| format!("bad rect: {e}"))?;
    let optional = |i: usize| fields.get(i).map(|f| unescape_field(f)).unwrap_or_default();

    Ok(LockEntry {
        process_name: unescape_field(fields[0]),
        title: unescape_field(fields[1]),
        match_key: optional(3),
        rect,
        exec_path: optional(4),
        url: optional(5),
    })
}

/// Read all valid locks from `path`. A missing file is an empty list;
/// malformed lines are skipped with a warning.
pub fn load_locks(path: &Path) -> Result<Vec<LockEntry>, LockError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(LockError::IoError {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    let mut entries = Vec::new();
    for (number, raw) in content.lines().enumerate() {
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(line) {
            Ok(entry) => entries.push(entry),
            Err(reason) => {
                tracing::warn!(
                    event = "core.locks.malformed_line_skipped",
                    file = %path.display(),
                    line = number + 1,
                    reason = %reason
                );
            }
        }
    }

    tracing::debug!(
        event = "core.locks.load_completed",
        file = %path.display(),
        count = entries.len()
    );
    Ok(entries)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

fn cleanup_temp_file(temp_file: &Path, original_error: &std::io::Error) {
    if let Err(cleanup_err) = fs::remove_file(temp_file) {
        tracing::warn!(
            event = "core.locks.temp_file_cleanup_failed",
            temp_file = %temp_file.display(),
            original_error = %original_error,
            cleanup_error = %cleanup_err
        );
    }
}

/// Replace the lock file atomically: write `<file>.tmp`, then rename.
pub fn save_locks(path: &Path, entries: &[LockEntry]) -> Result<(), LockError> {
    let io_err = |source: std::io::Error| LockError::IoError {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let mut content = String::new();
    for entry in entries {
        content.push_str(&format_line(entry));
        content.push('\n');
    }

    let temp_file = temp_path(path);
    if let Err(e) = fs::write(&temp_file, &content) {
        cleanup_temp_file(&temp_file, &e);
        return Err(io_err(e));
    }
    if let Err(e) = fs::rename(&temp_file, path) {
        cleanup_temp_file(&temp_file, &e);
        return Err(io_err(e));
    }

    tracing::debug!(
        event = "core.locks.save_completed",
        file = %path.display(),
        count = entries.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_entry() -> LockEntry {
        LockEntry::new("msedge", "Docs | Notes 100% - Microsoft Edge", Rect::new(0, 0, 960, 1080))
            .with_match_key("domain:docs.rs")
            .with_exec_path("C:\\Program Files\\Edge\\msedge.exe")
            .with_url("https://docs.rs/?q=a|b")
    }

    #[test]
    fn test_round_trip_with_and_without_optionals() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locks.txt");
        let entries = vec![
            full_entry(),
            LockEntry::new("code", "main.rs", Rect::new(960, 0, 960, 540)),
            LockEntry::new("notes", "line one\r\nline two %7C", Rect::new(1, 2, 3, 4))
                .with_match_key("title:line one"),
        ];

        save_locks(&path, &entries).unwrap();
        assert_eq!(load_locks(&path).unwrap(), entries);
    }

    #[test]
    fn test_escaped_line_format() {
        let line = format_line(&full_entry());
        assert_eq!(
            line,
            "msedge|Docs %7C Notes 100%25 - Microsoft Edge|0,0,960,1080|domain:docs.rs|\
             C:\\Program Files\\Edge\\msedge.exe|https://docs.rs/?q=a%7Cb"
        );
    }

    #[test]
    fn test_legacy_three_field_line() {
        let entry = parse_line("code|main.rs - snaplock|0,0,800,600").unwrap();
        assert_eq!(entry.process_name, "code");
        assert_eq!(entry.title, "main.rs - snaplock");
        assert_eq!(entry.rect, Rect::new(0, 0, 800, 600));
        assert_eq!(entry.match_key, "");
        assert_eq!(entry.exec_path, "");
        assert_eq!(entry.url, "");
    }

    #[test]
    fn test_legacy_percent_text_kept() {
        let entry = parse_line("app|50% done|0,0,10,10").unwrap();
        assert_eq!(entry.title, "50% done");
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locks.txt");
        fs::write(
            &path,
            "code|main.rs|0,0,800,600\r\n\
             too|short\n\
             \n\
             bad|rect|a,b,c,d\n\
             neg|rect|0,0,-5,10\n\
             chrome|Docs|10,10,500,500|title:Docs\n",
        )
        .unwrap();

        let entries = load_locks(&path).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].process_name, "code");
        assert_eq!(entries[1].match_key, "title:Docs");
    }

    #[test]
    fn test_rect_past_coordinate_range_is_skipped_and_packing_survives() {
        use crate::layout::GapPacker;
        use crate::window::WindowHandle;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locks.txt");
        fs::write(
            &path,
            "code|main.rs|2147483000,0,1000,1000\n\
             notes|todo|0,0,960,1080\n",
        )
        .unwrap();

        let entries = load_locks(&path).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].process_name, "notes");

        // A far-off rect can still arrive from a window adapter.
        let work_area = Rect::new(0, 0, 1920, 1080);
        let locked = vec![
            (WindowHandle::new(1), entries[0].rect),
            (WindowHandle::new(2), Rect::new(i32::MAX - 500, 0, 1000, 1000)),
        ];
        let normals = vec![WindowHandle::new(3)];
        let plan = GapPacker::default().assign_smart_gaps(work_area, &locked, &normals);

        assert_eq!(plan.len(), 3);
        assert_eq!(
            plan.rect_for(WindowHandle::new(3)),
            Some(Rect::new(960, 0, 960, 1080))
        );
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_locks(&dir.path().join("absent.txt")).unwrap().is_empty());
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locks.txt");
        save_locks(&path, &[full_entry()]).unwrap();
        assert!(path.exists());
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn test_save_into_unwritable_location_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();
        let err = save_locks(&blocker.join("locks.txt"), &[]).unwrap_err();
        assert!(matches!(err, LockError::IoError { .. }));
    }
}

//! Working-tree change detection.

use crate::error::Result;
use crate::models::{ChangeRecord, ChangeStatus};
use crate::repository::Repository;

pub(crate) const STATUS_ARGS: [&str; 2] = ["--short", "--untracked-files=all"];

impl Repository {
    /// Current working-tree changes, in backend order.
    pub fn scan(&self) -> Result<Vec<ChangeRecord>> {
        let output = self.git("status", &STATUS_ARGS)?;
        Ok(parse_status(&output))
    }

    pub fn has_changes(&self) -> Result<bool> {
        Ok(!self.scan()?.is_empty())
    }

    /// Changes to a single pathspec.
    pub(crate) fn scan_path(&self, path: &str) -> Result<Vec<ChangeRecord>> {
        let output = self.git("status", &[STATUS_ARGS[0], STATUS_ARGS[1], "--", path])?;
        Ok(parse_status(&output))
    }
}

/// Parse `status --short` output into change records.
///
/// Ignored (`!!`) entries and lines without a recognised code are dropped.
pub fn parse_status(output: &str) -> Vec<ChangeRecord> {
    output.lines().filter_map(parse_status_line).collect()
}

fn parse_status_line(line: &str) -> Option<ChangeRecord> {
    if line.trim().is_empty() {
        return None;
    }
    let code = line.get(..2)?;
    // any run of whitespace separates the code field from the path
    let field = line.get(2..)?.trim_start().trim_end_matches('\r');
    if field.is_empty() {
        return None;
    }

    if code == "??" {
        return Some(ChangeRecord::untracked(unquote(field)));
    }

    let codes: Vec<ChangeStatus> = code
        .chars()
        .filter_map(ChangeStatus::from_code)
        .filter(|status| *status != ChangeStatus::Untracked)
        .collect();
    if codes.is_empty() {
        return None;
    }

    let path = if code.contains(|c: char| c == 'R' || c == 'C') {
        destination(field)
    } else {
        unquote(field)
    };
    Some(ChangeRecord::new(codes, path))
}

/// Destination of a `source -> destination` rename field.
fn destination(field: &str) -> String {
    let (_, rest) = split_quoted(field);
    match rest.find(" -> ") {
        Some(idx) => unquote(&rest[idx + 4..]),
        None => unquote(field),
    }
}

/// Split off a leading quoted token, returning it and the remainder. An
/// unquoted field is returned whole as the remainder.
fn split_quoted(field: &str) -> (&str, &str) {
    if !field.starts_with('"') {
        return ("", field);
    }
    let mut escaped = false;
    for (idx, c) in field.char_indices().skip(1) {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return field.split_at(idx + 1),
            _ => {}
        }
    }
    ("", field)
}

/// Undo git's C-style path quoting. Unquoted input is returned unchanged.
pub fn unquote(field: &str) -> String {
    let inner = match field
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        Some(inner) => inner,
        None => return field.to_string(),
    };

    let bytes = inner.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'\\' || i + 1 == bytes.len() {
            out.push(bytes[i]);
            i += 1;
            continue;
        }

        let escape = bytes[i + 1];
        i += 2;
        match escape {
            b'n' => out.push(b'\n'),
            b't' => out.push(b'\t'),
            b'r' => out.push(b'\r'),
            b'a' => out.push(0x07),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0c),
            b'v' => out.push(0x0b),
            b'0'..=b'7' => {
                let mut value = u32::from(escape - b'0');
                let mut digits = 1;
                while digits < 3 && i < bytes.len() && (b'0'..=b'7').contains(&bytes[i]) {
                    value = value * 8 + u32::from(bytes[i] - b'0');
                    i += 1;
                    digits += 1;
                }
                out.push(value as u8);
            }
            other => out.push(other),
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

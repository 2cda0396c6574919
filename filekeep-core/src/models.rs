use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// State of a path as reported by the backend's short status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeStatus {
    Added,
    Modified,
    Deleted,
    Untracked,
}

impl ChangeStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ChangeStatus::Added => "added",
            ChangeStatus::Modified => "modified",
            ChangeStatus::Deleted => "deleted",
            ChangeStatus::Untracked => "untracked",
        }
    }

    /// Map one character of a tracked `XY` status field.
    ///
    /// Renames and copies count as additions of the destination path, type
    /// changes and unmerged entries as modifications.
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'A' | 'R' | 'C' => Some(ChangeStatus::Added),
            'M' | 'T' | 'U' => Some(ChangeStatus::Modified),
            'D' => Some(ChangeStatus::Deleted),
            '?' => Some(ChangeStatus::Untracked),
            _ => None,
        }
    }

    /// Verb used in generated commit messages. Untracked paths are staged
    /// before a message is built, so they have none.
    pub fn verb(&self) -> Option<&'static str> {
        match self {
            ChangeStatus::Added => Some("add"),
            ChangeStatus::Modified => Some("modify"),
            ChangeStatus::Deleted => Some("delete"),
            ChangeStatus::Untracked => None,
        }
    }
}

/// One line of working-tree status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub codes: Vec<ChangeStatus>,
    pub path: String,
}

impl ChangeRecord {
    pub fn new(codes: Vec<ChangeStatus>, path: impl Into<String>) -> Self {
        Self {
            codes,
            path: path.into(),
        }
    }

    pub fn untracked(path: impl Into<String>) -> Self {
        Self::new(vec![ChangeStatus::Untracked], path)
    }

    pub fn is_untracked(&self) -> bool {
        self.codes.contains(&ChangeStatus::Untracked)
    }

    /// Human-readable commit message, e.g. `"Add and modify notes.txt"`.
    ///
    /// Repeated verbs collapse, so `MM` reads "Modify". Returns `None` when no
    /// code carries a verb.
    pub fn commit_message(&self) -> Option<String> {
        let mut verbs: Vec<&str> = Vec::with_capacity(self.codes.len());
        for verb in self.codes.iter().filter_map(ChangeStatus::verb) {
            if verbs.last() != Some(&verb) {
                verbs.push(verb);
            }
        }
        if verbs.is_empty() {
            return None;
        }

        let actions = verbs.join(" and ");
        let mut chars = actions.chars();
        let capitalized = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
            None => String::new(),
        };
        Some(format!("{} {}", capitalized, self.path))
    }
}

/// A committed snapshot of one path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub revision: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Result of one Commit Engine pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreReport {
    /// Paths committed, in scan order.
    pub committed: Vec<String>,
    /// Paths left for the next cycle, with the reason.
    pub failed: Vec<(String, String)>,
}

impl StoreReport {
    pub fn is_empty(&self) -> bool {
        self.committed.is_empty() && self.failed.is_empty()
    }
}

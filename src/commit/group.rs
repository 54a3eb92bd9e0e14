//! Grouping of related changes into commits.

use crate::git::FileChange;

use super::ChangeType;

/// Stable identity of a group, used to cache generated messages.
pub type GroupKey = Vec<String>;

/// Changes that will be committed together.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeGroup {
    pub changes: Vec<FileChange>,
}

impl ChangeGroup {
    pub fn new(changes: Vec<FileChange>) -> Self {
        Self { changes }
    }

    /// Most frequent change type in the group; ties go to the type seen first.
    pub fn change_type(&self) -> ChangeType {
        let mut counts: Vec<(ChangeType, usize)> = Vec::new();
        for change in &self.changes {
            match counts.iter_mut().find(|(t, _)| *t == change.change_type) {
                Some((_, count)) => *count += 1,
                None => counts.push((change.change_type, 1)),
            }
        }

        let mut dominant: Option<(ChangeType, usize)> = None;
        for (t, count) in counts {
            if dominant.is_none_or(|(_, best)| count > best) {
                dominant = Some((t, count));
            }
        }
        dominant.map_or(ChangeType::Chore, |(t, _)| t)
    }

    pub fn paths(&self) -> Vec<&str> {
        self.changes.iter().map(|c| c.path.as_str()).collect()
    }

    pub fn key(&self) -> GroupKey {
        self.changes.iter().map(|c| c.path.clone()).collect()
    }

    /// Space-separated file names without directories.
    pub fn file_names(&self) -> String {
        self.changes
            .iter()
            .map(FileChange::file_name)
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn total_diff_lines(&self) -> usize {
        self.changes.iter().map(|c| c.diff_lines).sum()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(dir, _)| dir)
}

/// Bucket changes by parent directory and change type, keeping the order in
/// which each bucket first appears.
pub fn group_related_changes(changes: Vec<FileChange>) -> Vec<ChangeGroup> {
    let mut buckets: Vec<((String, ChangeType), Vec<FileChange>)> = Vec::new();

    for change in changes {
        let key = (parent_dir(&change.path).to_string(), change.change_type);
        match buckets.iter_mut().find(|(k, _)| *k == key) {
            Some((_, bucket)) => bucket.push(change),
            None => buckets.push((key, vec![change])),
        }
    }

    buckets
        .into_iter()
        .map(|(_, changes)| ChangeGroup::new(changes))
        .collect()
}

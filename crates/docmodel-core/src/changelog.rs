//! Append-only log of committed mutations.

use serde_json::Value;
use tracing::debug;

/// One batch of same-event mutations, before an id is assigned.
///
/// The three vectors are parallel: `paths[i]` was set to `values[i]` and
/// previously held `previous[i]` (`None` when it was absent).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Change {
    pub paths: Vec<String>,
    pub values: Vec<Value>,
    pub previous: Vec<Option<Value>>,
}

impl Change {
    pub fn single(path: String, value: Value, previous: Option<Value>) -> Self {
        Self {
            paths: vec![path],
            values: vec![value],
            previous: vec![previous],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// A committed change with its monotonically increasing id.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRecord {
    pub id: u64,
    pub paths: Vec<String>,
    pub values: Vec<Value>,
    pub previous: Vec<Option<Value>>,
}

/// Answer to a "did this path change since id X?" query.
///
/// Once the log has been pruned past the queried revision the honest
/// answer is [`PathChanged::Unknown`]: the records that could prove the
/// path unchanged are gone.
#[derive(Debug, Clone, PartialEq)]
pub enum PathChanged {
    /// The path changed; `from` is its value before the first change.
    Changed {
        record: ChangeRecord,
        from: Option<Value>,
    },
    /// The log covers the whole interval and the path does not appear.
    Unchanged,
    /// The interval extends past the retained records.
    Unknown,
}

impl PathChanged {
    /// True unless the path is provably unchanged.
    pub fn maybe_changed(&self) -> bool {
        !matches!(self, PathChanged::Unchanged)
    }
}

/// Append-only change log with id-based queries and explicit pruning.
///
/// Ids start at 1, so `since: 0` in [`ChangeLog::changed_since`] covers
/// everything ever committed.
#[derive(Debug)]
pub struct ChangeLog {
    records: Vec<ChangeRecord>,
    next_id: u64,
}

impl Default for ChangeLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeLog {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            next_id: 1,
        }
    }

    /// Commit a change batch, returning its assigned id.
    pub fn add(&mut self, change: Change) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        debug!(id, paths = ?change.paths, "change committed");
        self.records.push(ChangeRecord {
            id,
            paths: change.paths,
            values: change.values,
            previous: change.previous,
        });
        id
    }

    /// The id the next committed change will get.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// The id of the most recently committed change; 0 before the first.
    /// Suitable as a `since` watermark for [`ChangeLog::changed_since`].
    pub fn last_id(&self) -> u64 {
        self.next_id - 1
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All retained records with `id >= since`, oldest first.
    pub fn since(&self, since: u64) -> impl Iterator<Item = &ChangeRecord> {
        let start = self.records.partition_point(|record| record.id < since);
        self.records[start..].iter()
    }

    /// The `offset`-from-latest record: `latest(1)` is the most recent.
    pub fn latest(&self, offset: usize) -> Option<&ChangeRecord> {
        if offset == 0 {
            return None;
        }
        self.records.len().checked_sub(offset).map(|i| &self.records[i])
    }

    /// Drop every retained record. Ids keep counting from where they were.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Drop records with `id < before`.
    pub fn clear_before(&mut self, before: u64) {
        self.records.retain(|record| record.id >= before);
    }

    /// Keep only the `count` most recent records.
    pub fn keep_last(&mut self, count: usize) {
        if let Some(excess) = self.records.len().checked_sub(count) {
            self.records.drain(..excess);
        }
    }

    /// Whether `path` changed in any record with `id > since`.
    ///
    /// The match is exact on recorded paths: a record for `a.b` does not
    /// answer for `a`, and vice versa.
    pub fn changed_since(&self, since: u64, path: &str) -> PathChanged {
        for record in self.records.iter().filter(|record| record.id > since) {
            if let Some(position) = record.paths.iter().position(|p| p == path) {
                return PathChanged::Changed {
                    from: record.previous[position].clone(),
                    record: record.clone(),
                };
            }
        }
        let first_retained = self.records.first().map_or(self.next_id, |record| record.id);
        if first_retained > since.saturating_add(1) {
            PathChanged::Unknown
        } else {
            PathChanged::Unchanged
        }
    }
}

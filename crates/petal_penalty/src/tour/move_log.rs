use crate::problem::stop::StopRef;

/// The four stops bounding the edges exchanged by one structural edit:
/// `(t1, t2)` and `(t3, t4)` are the removed edges, `t1` belongs to the edited route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapRecord {
    pub t1: StopRef,
    pub t2: StopRef,
    pub t3: StopRef,
    pub t4: StopRef,
}

impl SwapRecord {
    pub fn new(
        t1: impl Into<StopRef>,
        t2: impl Into<StopRef>,
        t3: impl Into<StopRef>,
        t4: impl Into<StopRef>,
    ) -> Self {
        SwapRecord {
            t1: t1.into(),
            t2: t2.into(),
            t3: t3.into(),
            t4: t4.into(),
        }
    }

    pub fn stops(&self) -> [StopRef; 4] {
        [self.t1, self.t2, self.t3, self.t4]
    }
}

/// Append-only stack of the edits applied since the last commit.
///
/// The driver owns the log: it pushes entries while editing the tour and
/// truncates or clears it once a move is committed or undone.
#[derive(Debug, Clone, Default)]
pub struct MoveLog {
    records: Vec<SwapRecord>,
}

impl MoveLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: SwapRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[SwapRecord] {
        &self.records
    }

    /// Entries from the most recent to the oldest.
    pub fn iter_recent_first(&self) -> impl Iterator<Item = &SwapRecord> {
        self.records.iter().rev()
    }

    pub fn truncate(&mut self, len: usize) {
        self.records.truncate(len);
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

use serde::Serialize;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar dates without a time component (participation dates).
pub type Date = chrono::NaiveDate;

/// A number per fragment table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    pub groups: usize,
    pub employees: usize,
    pub projects: usize,
    pub participations: usize,
}

impl TableCounts {
    pub fn total(&self) -> usize {
        self.groups + self.employees + self.projects + self.participations
    }
}

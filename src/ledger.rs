use crate::models::Record;
use crate::storage::UndecodedRow;
use chrono::NaiveDate;

/// The full score sheet as loaded from, and written back to, a store.
///
/// Rows that could not be decoded are carried along untouched so a full-set
/// write never drops them; they take no part in upserts or aggregation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    records: Vec<Record>,
    undecoded: Vec<UndecodedRow>,
}

impl RecordSet {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            undecoded: Vec::new(),
        }
    }

    pub(crate) fn with_undecoded(records: Vec<Record>, undecoded: Vec<UndecodedRow>) -> Self {
        Self { records, undecoded }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn undecoded(&self) -> &[UndecodedRow] {
        &self.undecoded
    }

    pub fn len(&self) -> usize {
        self.records.len() + self.undecoded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn find(&self, name: &str, date: NaiveDate) -> Option<&Record> {
        self.records.iter().find(|record| record.is_for(name, date))
    }

    /// Latest submission wins: any record for the same name and date is
    /// replaced.
    pub fn upsert(mut self, record: Record) -> Self {
        self.records
            .retain(|existing| !existing.is_for(record.name(), record.date()));
        self.records.push(record);
        self
    }

    /// Replaces everything, undecoded rows included, with an empty sheet.
    pub fn reset(self) -> Self {
        Self::default()
    }
}

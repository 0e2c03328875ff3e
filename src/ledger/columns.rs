use csv::StringRecord;
use std::collections::HashMap;

/// Maps logical fields onto the concrete header row of one CSV export.
///
/// Processors rename columns between export versions, so each logical field
/// is looked up through a prioritized candidate list. Resolution happens per
/// row: a candidate column that exists but is empty on a given row falls
/// through to the next candidate.
pub struct ColumnResolver {
    index_by_header: HashMap<String, usize>,
}

impl ColumnResolver {
    pub fn new(headers: &StringRecord) -> Self {
        let mut index_by_header = HashMap::new();
        for (index, header) in headers.iter().enumerate() {
            // First occurrence wins when a header repeats.
            index_by_header
                .entry(header.trim().to_string())
                .or_insert(index);
        }
        Self { index_by_header }
    }

    /// Returns the first non-empty value among the candidate columns, or ""
    /// when none of them yields one. Absent columns are not an error.
    pub fn resolve<'a>(&self, record: &'a StringRecord, candidates: &[&str]) -> &'a str {
        for candidate in candidates {
            if let Some(&index) = self.index_by_header.get(*candidate) {
                if let Some(value) = record.get(index) {
                    let value = value.trim();
                    if !value.is_empty() {
                        return value;
                    }
                }
            }
        }
        ""
    }
}

use std::collections::HashMap;

/// The two record types of the legacy tab-delimited format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordKind {
    /// `TRNS`: document header carrying context for the detail lines below.
    Txn,
    /// `SPL`: one detail (split) line.
    Split,
}

#[derive(Debug)]
pub enum Line<'a> {
    /// `!TRNS` / `!SPL`: declares the column layout for subsequent data
    /// lines of that kind.
    Declaration(RecordKind, Vec<&'a str>),
    Data(RecordKind, Vec<&'a str>),
    /// `!ENDTRNS`, `ENDTRNS`, blanks, anything unrecognized.
    Other,
}

pub fn classify(line: &str) -> Line<'_> {
    let cells: Vec<&str> = line.split('\t').collect();
    let marker = cells
        .first()
        .map(|cell| cell.trim_start_matches('\u{feff}').trim())
        .unwrap_or("");
    match marker {
        "!TRNS" => Line::Declaration(RecordKind::Txn, cells),
        "!SPL" => Line::Declaration(RecordKind::Split, cells),
        "TRNS" => Line::Data(RecordKind::Txn, cells),
        "SPL" => Line::Data(RecordKind::Split, cells),
        _ => Line::Other,
    }
}

/// Field positions declared by the most recent `!TRNS`/`!SPL` line. Cell 0 is
/// the record marker in both declaration and data lines, so positions line up
/// without offset bookkeeping. A redeclaration replaces the whole layout.
#[derive(Debug, Default)]
pub struct RecordLayout {
    position_by_field: HashMap<String, usize>,
}

impl RecordLayout {
    pub fn new(cells: &[&str]) -> Self {
        let mut position_by_field = HashMap::new();
        for (position, field) in cells.iter().enumerate().skip(1) {
            position_by_field
                .entry(field.trim().to_string())
                .or_insert(position);
        }
        Self { position_by_field }
    }

    /// "" when the field was never declared or the data line is short.
    pub fn value<'a>(&self, cells: &[&'a str], field: &str) -> &'a str {
        self.position_by_field
            .get(field)
            .and_then(|&position| cells.get(position))
            .map(|value| value.trim())
            .unwrap_or("")
    }

    /// First non-empty value among alternate field spellings.
    pub fn first_value<'a>(&self, cells: &[&'a str], fields: &[&str]) -> &'a str {
        for field in fields {
            let value = self.value(cells, field);
            if !value.is_empty() {
                return value;
            }
        }
        ""
    }
}

//! Finding the header row of an export and the columns it names.

use log::debug;

use crate::config::{Cell, SelectionError, SelectionRules};

/// Index of the first row that looks like a header, among the first
/// `header_scan_rows` rows.
///
/// A row qualifies when its lower-cased cells, joined with spaces, contain at
/// least `header_keyword_threshold` of the header keywords.
pub fn locate_header(rows: &[Vec<Cell>], rules: &SelectionRules) -> Option<usize> {
    let keywords: Vec<String> = rules
        .header_keywords
        .iter()
        .map(|k| k.to_lowercase())
        .collect();
    for (idx, row) in rows.iter().take(rules.header_scan_rows).enumerate() {
        let row_text = row
            .iter()
            .map(|c| c.text().trim().to_lowercase())
            .collect::<Vec<String>>()
            .join(" ");
        let matches = keywords.iter().filter(|k| row_text.contains(k.as_str())).count();
        if matches >= rules.header_keyword_threshold {
            debug!("locate_header: row {} matches {} keywords", idx, matches);
            return Some(idx);
        }
    }
    None
}

static EMPTY: Cell = Cell::Empty;

/// Positions of the columns read from a header row.
///
/// When several header cells match the same column, the last one wins.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ColumnMap {
    pub section_id: Option<usize>,
    pub dept: Option<usize>,
    pub section_name: usize,
    pub start_date: Option<usize>,
    pub end_date: Option<usize>,
    pub building: Option<usize>,
    pub room: Option<usize>,
    pub days: Option<usize>,
    pub start_time: Option<usize>,
    pub end_time: Option<usize>,
    pub weeks: Option<usize>,
    pub capacity: Option<usize>,
    pub primary_faculty: Option<usize>,
}

impl ColumnMap {
    pub fn from_header(header: &[Cell]) -> Result<ColumnMap, SelectionError> {
        let mut section_name: Option<usize> = None;
        let mut map = ColumnMap::default();
        for (idx, cell) in header.iter().enumerate() {
            let h = cell.text();
            let h = h.trim();
            if h.contains("Section ID") {
                map.section_id = Some(idx);
            }
            if h.contains("Dept") {
                map.dept = Some(idx);
            }
            if h.contains("Section Name") {
                section_name = Some(idx);
            }
            if h.contains("Start Date") {
                map.start_date = Some(idx);
            }
            if h.contains("End Date") {
                map.end_date = Some(idx);
            }
            if h.contains("Bldg") {
                map.building = Some(idx);
            }
            if h.contains("Room") {
                map.room = Some(idx);
            }
            if h.contains("Days") {
                map.days = Some(idx);
            }
            if h.contains("Start Time") {
                map.start_time = Some(idx);
            }
            if h.contains("End Time") {
                map.end_time = Some(idx);
            }
            if h.contains("Weeks") {
                map.weeks = Some(idx);
            }
            if h.contains("Capacity") {
                map.capacity = Some(idx);
            }
            if h.contains("Primary Faculty") {
                map.primary_faculty = Some(idx);
            }
        }
        map.section_name = section_name.ok_or_else(|| SelectionError::MissingRequiredColumn {
            column: "Section Name".to_string(),
        })?;
        debug!("from_header: {:?}", map);
        Ok(map)
    }
}

/// The cell of a row at an optional column. Short rows read as empty.
pub fn cell_at(row: &[Cell], column: Option<usize>) -> &Cell {
    column.and_then(|idx| row.get(idx)).unwrap_or(&EMPTY)
}

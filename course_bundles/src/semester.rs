//! Naming a processed sheet: its semester and its campus.

use chrono::Datelike;

use crate::config::*;
use crate::header::{cell_at, ColumnMap};
use crate::schedule::month_year;

/// Month and year of a start date cell.
fn cell_month_year(cell: &Cell) -> Option<(u32, i32)> {
    match cell {
        Cell::Date(dt) => Some((dt.month(), dt.year())),
        Cell::Text(s) => month_year(s),
        _ => None,
    }
}

/// The semester code of the most frequent (month, year) pair. Among equally
/// frequent pairs, the first one seen wins.
///
/// Terms starting from August to December are fall terms (`F25`), from
/// January to April winter terms (`W25`), and the others spring/summer terms
/// (`SS25`). An empty string is returned if there are no dates.
pub fn semester_code_of<I>(dates: I) -> String
where
    I: IntoIterator<Item = (u32, i32)>,
{
    let mut counts: Vec<((u32, i32), usize)> = Vec::new();
    for date in dates {
        match counts.iter_mut().find(|(d, _)| *d == date) {
            Some((_, n)) => *n += 1,
            None => counts.push((date, 1)),
        }
    }
    let mut best: Option<((u32, i32), usize)> = None;
    for (date, n) in counts {
        if best.map(|(_, m)| n > m).unwrap_or(true) {
            best = Some((date, n));
        }
    }
    match best {
        Some(((month, year), _)) => {
            let yy = year.rem_euclid(100);
            match month {
                8..=12 => format!("F{:02}", yy),
                1..=4 => format!("W{:02}", yy),
                _ => format!("SS{:02}", yy),
            }
        }
        None => String::new(),
    }
}

/// Semester code of a list of sections, read from their start dates.
pub fn semester_code(sections: &[Section]) -> String {
    semester_code_of(sections.iter().filter_map(|s| month_year(&s.start_date)))
}

/// Semester code of a sheet, read from the start date column of every data
/// row, whether or not the row describes a section.
pub fn sheet_semester_code(data_rows: &[Vec<Cell>], columns: &ColumnMap) -> String {
    if columns.start_date.is_none() {
        return String::new();
    }
    semester_code_of(
        data_rows
            .iter()
            .filter_map(|row| cell_month_year(cell_at(row, columns.start_date))),
    )
}

/// True if more than half of the sections are taught online.
pub fn is_online_schedule(sections: &[Section]) -> bool {
    let online = sections
        .iter()
        .filter(|s| s.mode_code == ModeCode::Online)
        .count();
    online * 2 > sections.len()
}

/// The campus a sheet was exported for.
///
/// Mostly online sheets are `Online`. Otherwise the most common department
/// of the other sections names the campus. Unknown departments give an empty
/// name.
pub fn infer_campus_name(sections: &[Section], catalog: &CourseCatalog) -> String {
    if sections.is_empty() {
        return String::new();
    }
    if is_online_schedule(sections) {
        return Campus::Online.label().to_string();
    }
    let mut counts: Vec<(String, usize)> = Vec::new();
    for s in sections.iter().filter(|s| s.mode_code != ModeCode::Online) {
        let dept = s.dept.trim().to_uppercase();
        match counts.iter_mut().find(|(d, _)| *d == dept) {
            Some((_, n)) => *n += 1,
            None => counts.push((dept, 1)),
        }
    }
    let mut most_common: Option<(&str, usize)> = None;
    for (dept, n) in counts.iter() {
        if most_common.map(|(_, m)| *n > m).unwrap_or(true) {
            most_common = Some((dept.as_str(), *n));
        }
    }
    most_common
        .and_then(|(dept, _)| catalog.campus_of_department(dept))
        .map(|c| c.label().to_string())
        .unwrap_or_default()
}

//! Splitting a sheet by campus.
//!
//! This placement differs from [crate::normalize::campus_of] for remote and
//! hybrid sections: both follow their department, and default to online.

use log::debug;

use crate::config::*;
use crate::header::{cell_at, ColumnMap};
use crate::normalize::parse_section_name;

pub fn classify_campus(code: ModeCode, dept: &str, catalog: &CourseCatalog) -> Campus {
    match code {
        ModeCode::SouthInPerson => Campus::South,
        ModeCode::CenterInPerson => Campus::Center,
        ModeCode::Online => Campus::Online,
        ModeCode::Hybrid | ModeCode::Remote => catalog
            .campus_of_department(dept)
            .unwrap_or(Campus::Online),
        ModeCode::Other(_) => Campus::Unknown,
    }
}

/// Assigns the data rows of the campus subjects to their campus.
///
/// Rows with no valid section name and rows of other subjects are left out.
/// Within each campus, the rows of the selection subjects come first.
pub fn partition_rows(
    data_rows: &[Vec<Cell>],
    columns: &ColumnMap,
    catalog: &CourseCatalog,
) -> CampusRows {
    let mut partitions = CampusRows::default();
    let mut trailing = CampusRows::default();
    for (idx, row) in data_rows.iter().enumerate() {
        let name = cell_at(row, Some(columns.section_name)).text();
        let parsed = match parse_section_name(&name) {
            Some(p) => p,
            None => continue,
        };
        if !catalog.campus_subjects.contains(&parsed.subject) {
            continue;
        }
        let dept = cell_at(row, columns.dept).text();
        let campus = classify_campus(parsed.mode_code, &dept, catalog);
        let target = if catalog.selection_subjects.contains(&parsed.subject) {
            &mut partitions
        } else {
            partitions.secondary.push(idx);
            &mut trailing
        };
        match campus {
            Campus::Center => target.center.push(idx),
            Campus::South => target.south.push(idx),
            Campus::Online => target.online.push(idx),
            Campus::Unknown => target.unknown.push(idx),
        }
    }
    partitions.center.extend(trailing.center);
    partitions.south.extend(trailing.south);
    partitions.online.extend(trailing.online);
    partitions.unknown.extend(trailing.unknown);
    debug!("partition_rows: {:?}", partitions.counts());
    partitions
}

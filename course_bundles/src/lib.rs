mod config;
pub mod bundles;
pub mod campus;
pub mod days;
pub mod flags;
pub mod header;
pub mod layout;
pub mod manual;
pub mod normalize;
pub mod schedule;
pub mod semester;
pub mod session;
pub mod sort;

use log::{debug, info};

pub use crate::bundles::Scope;
pub use crate::config::*;
pub use crate::layout::{layout_campus_sheet, layout_selection_sheet, SheetLayout};
pub use crate::session::Session;

use crate::bundles::detect_bundles;
use crate::campus::partition_rows;
use crate::flags::detect_flags;
use crate::header::{locate_header, ColumnMap};
use crate::normalize::{collapse_hybrid_duplicates, normalize_rows};
use crate::semester::{infer_campus_name, semester_code, sheet_semester_code};
use crate::sort::sort_sections;

/// The header row and the column map of a sheet.
fn read_header(
    input: &SheetInput,
    rules: &SelectionRules,
) -> Result<(usize, ColumnMap), SelectionError> {
    let header_row = locate_header(&input.rows, rules).ok_or(SelectionError::HeaderNotFound {
        scanned: rules.header_scan_rows.min(input.rows.len()),
    })?;
    let columns = ColumnMap::from_header(&input.rows[header_row])?;
    Ok((header_row, columns))
}

/// Bundles, flags and sorts the sections of one scope.
///
/// The flags of bundle detection come first, followed by the room, capacity
/// and hours checks.
fn process_sections(
    sections: Vec<Section>,
    rules: &SelectionRules,
    scope: Scope,
) -> (Vec<Section>, Vec<Bundle>, Vec<Flag>) {
    let sections = collapse_hybrid_duplicates(sections);
    let detection = detect_bundles(&sections, rules, scope);
    let mut flags = detection.flags.clone();
    flags.extend(detect_flags(&sections, &detection, rules));
    let sorted = sort_sections(sections, &detection.bundles, &rules.catalog);
    (sorted, detection.bundles, flags)
}

/// Processes a whole sheet: finds the sections, detects the bundles, flags
/// the anomalies and sorts the sections for display.
///
/// Arguments:
/// * `input` the cells of the sheet, and their display text
/// * `rules` the thresholds and course tables to apply
pub fn run_selection(
    input: &SheetInput,
    rules: &SelectionRules,
) -> Result<ProcessingResult, SelectionError> {
    let (header_row, columns) = read_header(input, rules)?;
    info!(
        "run_selection: header at row {}, {} rows in sheet",
        header_row,
        input.rows.len()
    );
    let sections = normalize_rows(&input.rows[header_row + 1..], &columns, rules);
    let (sections, bundles, flags) = process_sections(sections, rules, Scope::Sheet);

    let semester_code = semester_code(&sections);
    let campus_name = infer_campus_name(&sections, &rules.catalog);
    info!(
        "run_selection: {} sections, {} bundles, {} flags, semester {:?}, campus {:?}",
        sections.len(),
        bundles.len(),
        flags.len(),
        semester_code,
        campus_name
    );
    Ok(ProcessingResult {
        sections,
        bundles,
        flags,
        semester_code,
        campus_name,
        header_row,
        original_rows: input.display_rows.clone(),
    })
}

/// Splits a sheet by campus and processes the selection subjects of each
/// campus separately.
///
/// Bundles are only formed within a campus. The original rows of each campus
/// result are the header row followed by the rows of the campus.
pub fn run_campus_sort(
    input: &SheetInput,
    rules: &SelectionRules,
) -> Result<CampusSortResult, SelectionError> {
    let (header_row, columns) = read_header(input, rules)?;
    let data_rows = &input.rows[header_row + 1..];
    let partitions = partition_rows(data_rows, &columns, &rules.catalog);
    let semester_code = sheet_semester_code(data_rows, &columns);
    info!(
        "run_campus_sort: header at row {}, semester {:?}, {:?}",
        header_row,
        semester_code,
        partitions.counts()
    );

    let mut processed = Vec::new();
    for campus in [Campus::Center, Campus::South, Campus::Online] {
        let ids = partitions.rows(campus);
        if ids.is_empty() {
            continue;
        }
        let sections: Vec<Section> = normalize_rows(data_rows, &columns, rules)
            .into_iter()
            .filter(|s| ids.contains(&s.id))
            .filter(|s| rules.catalog.selection_subjects.contains(&s.subject))
            .collect();
        // Partition order: selection subjects first, then row order.
        let mut ordered: Vec<Section> = Vec::with_capacity(sections.len());
        for id in ids {
            if let Some(s) = sections.iter().find(|s| s.id == *id) {
                ordered.push(s.clone());
            }
        }
        let (sections, bundles, flags) = process_sections(ordered, rules, Scope::Campus(campus));
        debug!(
            "run_campus_sort: {}: {} sections, {} bundles, {} flags",
            campus.label(),
            sections.len(),
            bundles.len(),
            flags.len()
        );

        let mut original_rows = Vec::with_capacity(ids.len() + 1);
        original_rows.push(input.display_rows.get(header_row).cloned().unwrap_or_default());
        for id in ids {
            original_rows.push(
                input
                    .display_rows
                    .get(header_row + 1 + id)
                    .cloned()
                    .unwrap_or_default(),
            );
        }
        processed.push((
            campus,
            ProcessingResult {
                sections,
                bundles,
                flags,
                semester_code: semester_code.clone(),
                campus_name: campus.label().to_string(),
                header_row: 0,
                original_rows,
            },
        ));
    }

    Ok(CampusSortResult {
        header_row,
        semester_code,
        counts: partitions.counts(),
        partitions,
        processed,
    })
}

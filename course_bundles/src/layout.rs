//! Display decisions for the workbook writer.
//!
//! Nothing here writes a file. The layout describes the columns, the text
//! of each cell, the colours of the rows and the borders of the bundles, so
//! that any spreadsheet writer can render a selection sheet.

use std::collections::HashSet;

use crate::config::*;
use crate::semester::is_online_schedule;

/// Background colours of bundled rows, cycled by bundle index.
pub const BUNDLE_FILLS: [&str; 8] = [
    "FFE3F2FD", "FFF3E5F5", "FFE8F5E9", "FFFFF8E1", "FFFCE4EC", "FFE0F7FA", "FFFBE9E7",
    "FFF1F8E9",
];
pub const PLAIN_FILL: &str = "FFFFFFFF";
/// Colour of the border drawn around each bundle.
pub const BUNDLE_BORDER: &str = "FF4472C4";
/// Background of the rows of secondary subjects in the campus sheets.
pub const SECONDARY_FILL: &str = "FFE0E0E0";
pub const FLAG_MARKER: &str = "⚠️ ";
/// Characters per line of the flags column.
pub const FLAGS_WRAP_WIDTH: usize = 45;
pub const MIN_ROW_HEIGHT: u32 = 20;
pub const LINE_HEIGHT: u32 = 16;
pub const ORIGINAL_MAX_WIDTH: usize = 40;
pub const ORIGINAL_MIN_WIDTH: usize = 5;

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum ColumnKey {
    Course,
    Section,
    Mode,
    Campus,
    Weeks,
    Days,
    Time,
    Building,
    Room,
    Dates,
    Capacity,
    EquatedHours,
    BundleId,
    Notes,
    FacultySelection,
    Flags,
}

impl ColumnKey {
    /// Columns that only make sense for sections meeting in a room.
    pub fn is_meeting_detail(&self) -> bool {
        matches!(
            self,
            ColumnKey::Days | ColumnKey::Time | ColumnKey::Building | ColumnKey::Room
        )
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Column {
    pub key: ColumnKey,
    pub label: &'static str,
    pub width: u32,
}

const COLUMNS: [(ColumnKey, &str, u32); 16] = [
    (ColumnKey::Course, "Course", 12),
    (ColumnKey::Section, "Section", 9),
    (ColumnKey::Mode, "Mode", 11),
    (ColumnKey::Campus, "Campus", 9),
    (ColumnKey::Weeks, "Weeks", 7),
    (ColumnKey::Days, "Days", 7),
    (ColumnKey::Time, "Time", 18),
    (ColumnKey::Building, "Building", 9),
    (ColumnKey::Room, "Room", 7),
    (ColumnKey::Dates, "Dates", 20),
    (ColumnKey::Capacity, "Capacity", 9),
    (ColumnKey::EquatedHours, "Hours/Eq. Hours", 15),
    (ColumnKey::BundleId, "Bundle ID", 11),
    (ColumnKey::Notes, "Notes", 15),
    (ColumnKey::FacultySelection, "Faculty Selection", 20),
    (ColumnKey::Flags, "Flags/Issues", 45),
];

/// The columns of a selection sheet. Online sheets have no meeting details.
pub fn columns(online: bool) -> Vec<Column> {
    COLUMNS
        .iter()
        .filter(|(key, _, _)| !(online && key.is_meeting_detail()))
        .map(|(key, label, width)| Column {
            key: *key,
            label: *label,
            width: *width,
        })
        .collect()
}

/// One row of a selection sheet.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SheetRow {
    pub section_id: SectionId,
    /// One value for each column of the sheet.
    pub values: Vec<String>,
    pub bundle_id: Option<String>,
    pub fill: &'static str,
    /// Colour of the bundle border, on bundled rows only.
    pub border: Option<&'static str>,
    /// The row opens a bundle block, and gets the top border.
    pub first_in_bundle: bool,
    /// The row closes a bundle block, and gets the bottom border.
    pub last_in_bundle: bool,
    pub height: u32,
}

/// A sheet of raw rows, copied as they were read.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RawSheet {
    pub rows: Vec<Vec<String>>,
    pub widths: Vec<u32>,
    /// Background of each row, if it has one.
    pub fills: Vec<Option<&'static str>>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SheetLayout {
    pub columns: Vec<Column>,
    pub rows: Vec<SheetRow>,
    pub original: RawSheet,
    pub file_name: String,
}

/// The flags of a section as shown in the flags column: one marked line per
/// flag.
pub fn flags_text(flags: &[&Flag]) -> String {
    flags
        .iter()
        .map(|f| format!("{}{}", FLAG_MARKER, f.message))
        .collect::<Vec<String>>()
        .join("\n")
}

/// Height of a row whose flags column holds `text`, wrapped at
/// [FLAGS_WRAP_WIDTH] characters.
pub fn row_height(text: &str) -> u32 {
    let lines: Vec<&str> = if text.is_empty() {
        Vec::new()
    } else {
        text.split('\n').collect()
    };
    let wrapped = lines
        .iter()
        .map(|l| (l.chars().count() + FLAGS_WRAP_WIDTH - 1) / FLAGS_WRAP_WIDTH)
        .max()
        .unwrap_or(0);
    let count = lines.len().max(wrapped).max(1) as u32;
    MIN_ROW_HEIGHT.max(LINE_HEIGHT * count)
}

/// Column widths of a raw sheet: the longest value from the header row on,
/// within bounds, plus one.
pub fn original_column_widths(rows: &[Vec<String>], header_row: usize) -> Vec<u32> {
    let columns = rows.iter().map(|r| r.len()).max().unwrap_or(0);
    (0..columns)
        .map(|col| {
            let longest = rows
                .iter()
                .skip(header_row)
                .filter_map(|r| r.get(col))
                .map(|v| v.chars().count())
                .max()
                .unwrap_or(0);
            let width = longest.min(ORIGINAL_MAX_WIDTH).max(ORIGINAL_MIN_WIDTH);
            (width + 1) as u32
        })
        .collect()
}

/// `{semester}_{campus}_Faculty_Selection_Sheet.xlsx`, leaving out the
/// parts that are not known.
pub fn suggested_filename(semester_code: &str, campus_name: &str) -> String {
    let prefix: Vec<&str> = [semester_code, campus_name]
        .iter()
        .cloned()
        .filter(|s| !s.is_empty())
        .collect();
    if prefix.is_empty() {
        "Faculty_Selection_Sheet.xlsx".to_string()
    } else {
        format!("{}_Faculty_Selection_Sheet.xlsx", prefix.join("_"))
    }
}

/// The label of a campus in the names of the campus workbooks.
pub fn campus_file_label(campus: Campus) -> &'static str {
    match campus {
        Campus::Center => "Center_Campus",
        Campus::South => "South_Campus",
        Campus::Online => "Online",
        Campus::Unknown => "Unknown",
    }
}

/// The label of the workbook holding every campus.
pub const ALL_CAMPUSES_LABEL: &str = "All_Campuses";

/// `{semester}_{label}_Selection_Schedule.xlsx`
pub fn campus_filename(semester_code: &str, label: &str) -> String {
    if semester_code.is_empty() {
        format!("{}_Selection_Schedule.xlsx", label)
    } else {
        format!("{}_{}_Selection_Schedule.xlsx", semester_code, label)
    }
}

/// Sections whose equated hours are shown in parentheses: in each bundle,
/// every member after the first one in display order, anchors excepted.
fn parenthesized_hours(result: &ProcessingResult, catalog: &CourseCatalog) -> HashSet<SectionId> {
    let mut ids = HashSet::new();
    for bundle in result.bundles.iter() {
        let members = result
            .sections
            .iter()
            .filter(|s| bundle.contains(s.id) && s.course != catalog.anchor);
        ids.extend(members.skip(1).map(|s| s.id));
    }
    ids
}

fn notes(mode: Mode) -> &'static str {
    match mode {
        Mode::Hybrid => "[HYBRID]",
        Mode::Remote => "[REMOTE]",
        _ => "",
    }
}

fn cell_value(
    key: ColumnKey,
    s: &Section,
    bundle_id: &Option<String>,
    hours: &str,
    flags: &str,
) -> String {
    match key {
        ColumnKey::Course => s.course.clone(),
        ColumnKey::Section => s.section.clone(),
        ColumnKey::Mode => s.mode.label().to_string(),
        ColumnKey::Campus => s.campus.label().to_string(),
        ColumnKey::Weeks => s.weeks.to_string(),
        ColumnKey::Days => s.days.clone(),
        ColumnKey::Time => s.time_range.clone(),
        ColumnKey::Building => s.building.clone(),
        ColumnKey::Room => s.room.clone(),
        ColumnKey::Dates => s.date_range.clone(),
        ColumnKey::Capacity => s.capacity.to_string(),
        ColumnKey::EquatedHours => hours.to_string(),
        ColumnKey::BundleId => bundle_id.clone().unwrap_or_default(),
        ColumnKey::Notes => notes(s.mode).to_string(),
        ColumnKey::FacultySelection => String::new(),
        ColumnKey::Flags => flags.to_string(),
    }
}

/// Lays out the selection sheet of a processed sheet.
///
/// Sheets with more than half of their sections online, and the online
/// campus sheet, drop the meeting detail columns and the hybrid sections.
pub fn layout_selection_sheet(result: &ProcessingResult, catalog: &CourseCatalog) -> SheetLayout {
    let online =
        result.campus_name == Campus::Online.label() || is_online_schedule(&result.sections);
    let columns = columns(online);
    let parenthesized = parenthesized_hours(result, catalog);
    let bundle_index = |id: SectionId| result.bundle_of(id).map(|(idx, _)| idx);

    let mut rows = Vec::with_capacity(result.sections.len());
    for (pos, s) in result.sections.iter().enumerate() {
        if online && s.mode_code == ModeCode::Hybrid {
            continue;
        }
        let bundle = result.bundle_of(s.id);
        let (bundle_id, fill, first, last) = match bundle {
            Some((idx, b)) => {
                let prev = pos
                    .checked_sub(1)
                    .and_then(|p| result.sections.get(p))
                    .and_then(|p| bundle_index(p.id));
                let next = result.sections.get(pos + 1).and_then(|n| bundle_index(n.id));
                (
                    Some(b.id.clone()),
                    BUNDLE_FILLS[idx % BUNDLE_FILLS.len()],
                    prev != Some(idx),
                    next != Some(idx),
                )
            }
            None => (None, PLAIN_FILL, false, false),
        };
        let hours = match catalog.equated_hours(&s.course) {
            Some(h) if parenthesized.contains(&s.id) => format!("({})", h),
            Some(h) => h.to_string(),
            None => String::new(),
        };
        let flags = flags_text(&result.flags_for(s.id));
        let border = bundle_id.as_ref().map(|_| BUNDLE_BORDER);
        rows.push(SheetRow {
            section_id: s.id,
            values: columns
                .iter()
                .map(|c| cell_value(c.key, s, &bundle_id, &hours, &flags))
                .collect(),
            bundle_id,
            fill,
            border,
            first_in_bundle: first,
            last_in_bundle: last,
            height: row_height(&flags),
        });
    }

    SheetLayout {
        columns,
        rows,
        original: RawSheet {
            rows: result.original_rows.clone(),
            widths: original_column_widths(&result.original_rows, result.header_row),
            fills: vec![None; result.original_rows.len()],
        },
        file_name: suggested_filename(&result.semester_code, &result.campus_name),
    }
}

/// Lays out the selection sheet of one campus of a campus sort.
///
/// The raw sheet lists the campus rows under the header row, with the rows
/// of secondary subjects greyed out.
pub fn layout_campus_sheet(
    sort: &CampusSortResult,
    campus: Campus,
    catalog: &CourseCatalog,
) -> Option<SheetLayout> {
    let result = sort.campus(campus)?;
    let mut layout = layout_selection_sheet(result, catalog);
    let mut fills = vec![None];
    fills.extend(sort.partitions.rows(campus).iter().map(|id| {
        if sort.partitions.secondary.contains(id) {
            Some(SECONDARY_FILL)
        } else {
            None
        }
    }));
    fills.resize(result.original_rows.len(), None);
    layout.original.fills = fills;
    layout.file_name = campus_filename(&sort.semester_code, campus_file_label(campus));
    Some(layout)
}

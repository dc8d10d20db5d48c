// ********* Input data structures ***********

use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::Display;

/// One raw value of a schedule export, as delivered by the spreadsheet reader.
///
/// The reader is expected to have coerced each cell to text, a number or a
/// date. Time columns may arrive under any of the three forms.
#[derive(PartialEq, Debug, Clone)]
pub enum Cell {
    Empty,
    Text(String),
    /// A number. For time columns, this is a fraction of a day.
    Number(f64),
    Date(NaiveDateTime),
}

impl Cell {
    /// The text content of the cell.
    ///
    /// Integral numbers are printed without a decimal point, the way a
    /// spreadsheet shows them.
    pub fn text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
            Cell::Number(f) => f.to_string(),
            Cell::Date(dt) => dt.format("%-m/%-d/%y").to_string(),
        }
    }

    /// The leading integer of the cell, if any.
    ///
    /// Numbers are truncated. Text is read up to the first non-digit, so that
    /// "25 seats" reads as 25.
    pub fn leading_int(&self) -> Option<i64> {
        match self {
            Cell::Number(f) if f.is_finite() => Some(f.trunc() as i64),
            Cell::Number(_) | Cell::Empty | Cell::Date(_) => None,
            Cell::Text(s) => {
                let s = s.trim();
                let (negative, digits) = match s.strip_prefix('-') {
                    Some(rest) => (true, rest),
                    None => (false, s.strip_prefix('+').unwrap_or(s)),
                };
                let end = digits
                    .char_indices()
                    .find(|(_, c)| !c.is_ascii_digit())
                    .map(|(idx, _)| idx)
                    .unwrap_or(digits.len());
                let value = digits[..end].parse::<i64>().ok()?;
                Some(if negative { -value } else { value })
            }
        }
    }
}

/// The two parallel views of one worksheet.
///
/// `rows` holds the typed cells used for processing. `display_rows` holds the
/// same rows with every value already rendered as text (dates included). It is
/// passed through untouched as the "Original Data" of the export.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct SheetInput {
    pub rows: Vec<Vec<Cell>>,
    pub display_rows: Vec<Vec<String>>,
}

impl SheetInput {
    /// Builds an input in which the display rows are derived from the cells.
    pub fn from_cells(rows: Vec<Vec<Cell>>) -> SheetInput {
        let display_rows = rows
            .iter()
            .map(|row| row.iter().map(|c| c.text()).collect())
            .collect();
        SheetInput { rows, display_rows }
    }
}

// ******** Domain structures *********

/// Position of the row among the data rows that follow the header.
pub type SectionId = usize;

/// The letter of a section name that encodes where and how a section is taught.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum ModeCode {
    /// `C`: in person at the Center campus.
    CenterInPerson,
    /// `S`: in person at the South campus.
    SouthInPerson,
    /// `O`
    Online,
    /// `H`
    Hybrid,
    /// `R`
    Remote,
    /// Any other letter, kept as upper case.
    Other(char),
}

impl ModeCode {
    pub fn from_letter(c: char) -> ModeCode {
        match c.to_ascii_uppercase() {
            'C' => ModeCode::CenterInPerson,
            'S' => ModeCode::SouthInPerson,
            'O' => ModeCode::Online,
            'H' => ModeCode::Hybrid,
            'R' => ModeCode::Remote,
            x => ModeCode::Other(x),
        }
    }

    pub fn letter(&self) -> char {
        match self {
            ModeCode::CenterInPerson => 'C',
            ModeCode::SouthInPerson => 'S',
            ModeCode::Online => 'O',
            ModeCode::Hybrid => 'H',
            ModeCode::Remote => 'R',
            ModeCode::Other(c) => *c,
        }
    }

    /// True for the `C` and `S` codes.
    pub fn is_in_person(&self) -> bool {
        matches!(self, ModeCode::CenterInPerson | ModeCode::SouthInPerson)
    }

    pub fn mode(&self) -> Mode {
        match self {
            ModeCode::CenterInPerson | ModeCode::SouthInPerson => Mode::InPerson,
            ModeCode::Online => Mode::Online,
            ModeCode::Hybrid => Mode::Hybrid,
            ModeCode::Remote => Mode::Remote,
            ModeCode::Other(_) => Mode::Unknown,
        }
    }
}

/// Delivery format of a section.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Mode {
    InPerson,
    Online,
    Hybrid,
    Remote,
    Unknown,
}

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Mode::InPerson => "In-Person",
            Mode::Online => "Online",
            Mode::Hybrid => "Hybrid",
            Mode::Remote => "Remote",
            Mode::Unknown => "Unknown",
        }
    }
}

/// Physical or virtual site of a section.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum Campus {
    Center,
    South,
    Online,
    Unknown,
}

impl Campus {
    pub fn label(&self) -> &'static str {
        match self {
            Campus::Center => "Center",
            Campus::South => "South",
            Campus::Online => "Online",
            Campus::Unknown => "Unknown",
        }
    }
}

/// One scheduled meeting pattern of a course offering, built from one row.
#[derive(PartialEq, Debug, Clone)]
pub struct Section {
    pub id: SectionId,
    /// The section name as written in the export, e.g. `ENGL-1181-C02`.
    pub name: String,
    pub subject: String,
    pub course_num: String,
    pub mode_code: ModeCode,
    /// Digits after the mode letter. Only used for proximity heuristics.
    pub sequence: String,
    /// Mode letter followed by the sequence, e.g. `C02`.
    pub section: String,
    /// `{subject} {course_num}`
    pub course: String,
    pub mode: Mode,
    pub campus: Campus,
    pub dept: String,
    pub days: String,
    /// Minutes after midnight.
    pub start_time: Option<u32>,
    pub end_time: Option<u32>,
    pub time_range: String,
    pub building: String,
    pub room: String,
    pub start_date: String,
    pub end_date: String,
    pub date_range: String,
    pub capacity: u32,
    pub weeks: u32,
    pub primary_faculty: String,
}

impl Section {
    pub fn sequence_number(&self) -> Option<u32> {
        self.sequence.parse::<u32>().ok()
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum BundleKind {
    /// One anchor section with two satellite sections.
    PairedCorequisite,
    /// The first and second course of a linked sequence.
    PairedSplit,
    /// Two low capacity online satellite sections with no anchor found.
    PairedOnlineLowCapacity,
}

impl BundleKind {
    pub fn label(&self) -> &'static str {
        match self {
            BundleKind::PairedCorequisite => "paired-corequisite",
            BundleKind::PairedSplit => "paired-split",
            BundleKind::PairedOnlineLowCapacity => "paired-online-low-capacity",
        }
    }
}

/// A group of sections meant to be offered together.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Bundle {
    /// Display label: `Bundle-01`, `Bundle-02`, ... in detection order.
    pub id: String,
    pub kind: BundleKind,
    pub sections: Vec<SectionId>,
}

impl Bundle {
    pub fn contains(&self, id: SectionId) -> bool {
        self.sections.contains(&id)
    }
}

/// A diagnostic attached to one section, for human review.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Flag {
    pub section_id: SectionId,
    pub message: String,
}

// ******** Output data structures *********

#[derive(PartialEq, Debug, Clone)]
pub struct ProcessingResult {
    /// The sections in display order.
    pub sections: Vec<Section>,
    pub bundles: Vec<Bundle>,
    pub flags: Vec<Flag>,
    /// e.g. `W25`. Empty if no start date could be read.
    pub semester_code: String,
    /// e.g. `Center`. Empty if it could not be inferred.
    pub campus_name: String,
    pub header_row: usize,
    /// The display rows of the whole sheet, header and preamble included.
    pub original_rows: Vec<Vec<String>>,
}

impl ProcessingResult {
    /// The bundle of a section, with its index in detection order.
    pub fn bundle_of(&self, id: SectionId) -> Option<(usize, &Bundle)> {
        self.bundles.iter().enumerate().find(|(_, b)| b.contains(id))
    }

    pub fn flags_for(&self, id: SectionId) -> Vec<&Flag> {
        self.flags.iter().filter(|f| f.section_id == id).collect()
    }

    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct CampusCounts {
    pub center: usize,
    pub south: usize,
    pub online: usize,
    pub unknown: usize,
    pub total: usize,
}

/// The data rows of a sheet split by campus.
///
/// The values are indexes of data rows (counted after the header row), in
/// display order.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct CampusRows {
    pub center: Vec<SectionId>,
    pub south: Vec<SectionId>,
    pub online: Vec<SectionId>,
    pub unknown: Vec<SectionId>,
    /// The rows, of any campus, whose subject is not on the selection sheets.
    pub secondary: Vec<SectionId>,
}

impl CampusRows {
    pub fn rows(&self, campus: Campus) -> &[SectionId] {
        match campus {
            Campus::Center => &self.center,
            Campus::South => &self.south,
            Campus::Online => &self.online,
            Campus::Unknown => &self.unknown,
        }
    }

    pub fn counts(&self) -> CampusCounts {
        CampusCounts {
            center: self.center.len(),
            south: self.south.len(),
            online: self.online.len(),
            unknown: self.unknown.len(),
            total: self.center.len() + self.south.len() + self.online.len() + self.unknown.len(),
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct CampusSortResult {
    pub header_row: usize,
    pub semester_code: String,
    pub partitions: CampusRows,
    /// One result for each of Center, South and Online that has rows.
    pub processed: Vec<(Campus, ProcessingResult)>,
    pub counts: CampusCounts,
}

impl CampusSortResult {
    pub fn campus(&self, campus: Campus) -> Option<&ProcessingResult> {
        self.processed
            .iter()
            .find(|(c, _)| *c == campus)
            .map(|(_, r)| r)
    }
}

/// Errors that prevent a sheet from being processed.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum SelectionError {
    /// No row among the first `scanned` rows looks like a header.
    HeaderNotFound { scanned: usize },
    /// The header row was found but a required column is not in it.
    MissingRequiredColumn { column: String },
}

impl Error for SelectionError {}

impl Display for SelectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionError::HeaderNotFound { scanned } => write!(
                f,
                "Could not detect header row in the first {} rows",
                scanned
            ),
            SelectionError::MissingRequiredColumn { column } => {
                write!(f, "Could not find {} column", column)
            }
        }
    }
}

// ********* Configuration **********

pub const HEADER_SCAN_ROWS: usize = 20;
pub const HEADER_KEYWORD_THRESHOLD: usize = 3;
/// Maximum distance in days between the start dates of bundled sections.
pub const DATE_ALIGNMENT_DAYS: i64 = 14;
/// Maximum difference between the sequence numbers of bundled sections.
pub const SEQUENCE_PROXIMITY: u32 = 2;
/// Satellite and split sections must have a capacity strictly below this value.
pub const SATELLITE_CAPACITY_LIMIT: u32 = 26;
pub const STANDARD_CAPACITY_MAX: u32 = 28;
pub const ANCHOR_CAPACITY_MAX: u32 = 10;
/// Accepted distance, in hours per week, between scheduled and expected hours.
pub const HOURS_TOLERANCE: f64 = 0.5;
/// Length of a regular term. Also the default when the weeks cannot be read.
pub const DEFAULT_WEEKS: u32 = 16;
pub const DEFAULT_CREDIT_HOURS: u32 = 3;

pub const HEADER_KEYWORDS: [&str; 14] = [
    "Section ID",
    "Dept",
    "Section Name",
    "Start Date",
    "End Date",
    "Bldg",
    "Room",
    "Days",
    "Start Time",
    "End Time",
    "# of Weeks",
    "Section Capacity",
    "Primary Faculty Name",
    "Instr Method",
];

/// The courses and departments the heuristics know about.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CourseCatalog {
    /// The low capacity corequisite course (e.g. `ENGL 1170`).
    pub anchor: String,
    /// The course each anchor section is paired with (e.g. `ENGL 1181`).
    pub satellite: String,
    pub sequence_first: String,
    pub sequence_second: String,
    /// Courses held to the standard capacity maximum.
    pub standard_courses: Vec<String>,
    pub credit_hours: BTreeMap<String, u32>,
    pub equated_hours: BTreeMap<String, u32>,
    pub default_credit_hours: u32,
    /// Department codes of hybrid sections taught at each campus.
    pub center_department: String,
    pub south_department: String,
    /// Subjects sorted by campus in the campus variant.
    pub campus_subjects: Vec<String>,
    /// Subjects that go on the selection sheets of the campus variant.
    pub selection_subjects: Vec<String>,
}

impl CourseCatalog {
    /// Credit hours of a course. Unmapped courses, 2000-level ones included,
    /// get the default.
    pub fn credit_hours(&self, course: &str) -> u32 {
        self.credit_hours
            .get(course)
            .cloned()
            .unwrap_or(self.default_credit_hours)
    }

    pub fn equated_hours(&self, course: &str) -> Option<u32> {
        self.equated_hours.get(course).cloned()
    }

    pub fn is_standard(&self, course: &str) -> bool {
        self.standard_courses.iter().any(|c| c == course)
    }

    /// The campus of a department code, compared trimmed and upper case.
    pub fn campus_of_department(&self, dept: &str) -> Option<Campus> {
        let dept = dept.trim().to_uppercase();
        if dept == self.center_department {
            Some(Campus::Center)
        } else if dept == self.south_department {
            Some(Campus::South)
        } else {
            None
        }
    }
}

fn course_table(entries: &[(&str, u32)]) -> BTreeMap<String, u32> {
    entries
        .iter()
        .map(|(course, hours)| (course.to_string(), *hours))
        .collect()
}

impl Default for CourseCatalog {
    fn default() -> CourseCatalog {
        CourseCatalog {
            anchor: "ENGL 1170".to_string(),
            satellite: "ENGL 1181".to_string(),
            sequence_first: "ENGL 2410".to_string(),
            sequence_second: "ENGL 2420".to_string(),
            standard_courses: [
                "ENGL 1181",
                "ENGL 1190",
                "ENGL 1191",
                "ENGL 1210",
                "ENGL 1220",
                "ENGL 1211",
                "ENGL 1221",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            credit_hours: course_table(&[
                ("ENGL 1170", 1),
                ("ENGL 1181", 4),
                ("ENGL 1190", 4),
                ("ENGL 1191", 4),
                ("ENGL 1210", 3),
                ("ENGL 1220", 3),
                ("ENGL 1211", 3),
                ("ENGL 1221", 3),
                ("ENGL 1730", 3),
                ("ENGL 2410", 3),
                ("ENGL 2420", 3),
                ("ENGL 2740", 3),
            ]),
            equated_hours: course_table(&[
                ("ENGL 1170", 2),
                ("ENGL 1181", 5),
                ("ENGL 1190", 5),
                ("ENGL 1191", 5),
                ("ENGL 1210", 4),
                ("ENGL 1220", 4),
                ("ENGL 1211", 4),
                ("ENGL 1221", 4),
            ]),
            default_credit_hours: DEFAULT_CREDIT_HOURS,
            center_department: "COMMC".to_string(),
            south_department: "COMMS".to_string(),
            campus_subjects: vec!["ENGL".to_string(), "EAPP".to_string()],
            selection_subjects: vec!["ENGL".to_string()],
        }
    }
}

/// The policy applied when processing a sheet.
///
/// The defaults are the named constants of this module.
#[derive(PartialEq, Debug, Clone)]
pub struct SelectionRules {
    pub header_keywords: Vec<String>,
    pub header_scan_rows: usize,
    pub header_keyword_threshold: usize,
    pub date_alignment_days: i64,
    pub sequence_proximity: u32,
    pub satellite_capacity_limit: u32,
    pub standard_capacity_max: u32,
    pub anchor_capacity_max: u32,
    pub hours_tolerance: f64,
    pub default_weeks: u32,
    pub catalog: CourseCatalog,
}

impl Default for SelectionRules {
    fn default() -> SelectionRules {
        SelectionRules {
            header_keywords: HEADER_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            header_scan_rows: HEADER_SCAN_ROWS,
            header_keyword_threshold: HEADER_KEYWORD_THRESHOLD,
            date_alignment_days: DATE_ALIGNMENT_DAYS,
            sequence_proximity: SEQUENCE_PROXIMITY,
            satellite_capacity_limit: SATELLITE_CAPACITY_LIMIT,
            standard_capacity_max: STANDARD_CAPACITY_MAX,
            anchor_capacity_max: ANCHOR_CAPACITY_MAX,
            hours_tolerance: HOURS_TOLERANCE,
            default_weeks: DEFAULT_WEEKS,
            catalog: CourseCatalog::default(),
        }
    }
}

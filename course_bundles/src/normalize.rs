//! Turning raw rows into [Section] values.

use std::collections::HashMap;

use log::debug;

use crate::config::*;
use crate::header::{cell_at, ColumnMap};
use crate::schedule::{format_date, format_time_range, to_minutes};

/// The parts of a section name such as `ENGL-1181-C02`.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SectionName {
    pub subject: String,
    pub course_num: String,
    pub mode_code: ModeCode,
    pub sequence: String,
}

/// Parses `<LETTERS>-<DIGITS>-<LETTER><DIGITS>`, ignoring case and
/// surrounding whitespace. The subject is returned in upper case.
pub fn parse_section_name(name: &str) -> Option<SectionName> {
    let parts: Vec<&str> = name.trim().split('-').collect();
    let (subject, course_num, section) = match parts.as_slice() {
        [a, b, c] => (*a, *b, *c),
        _ => return None,
    };
    if subject.is_empty() || !subject.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    if course_num.is_empty() || !course_num.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let mut section_chars = section.chars();
    let letter = section_chars.next().filter(|c| c.is_ascii_alphabetic())?;
    let sequence = section_chars.as_str();
    if sequence.is_empty() || !sequence.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(SectionName {
        subject: subject.to_ascii_uppercase(),
        course_num: course_num.to_string(),
        mode_code: ModeCode::from_letter(letter),
        sequence: sequence.to_string(),
    })
}

/// Campus of a section. Hybrid sections are placed by their department.
pub fn campus_of(code: ModeCode, dept: &str, catalog: &CourseCatalog) -> Campus {
    match code {
        ModeCode::CenterInPerson => Campus::Center,
        ModeCode::SouthInPerson => Campus::South,
        ModeCode::Online | ModeCode::Remote => Campus::Online,
        ModeCode::Hybrid => catalog
            .campus_of_department(dept)
            .unwrap_or(Campus::Unknown),
        ModeCode::Other(_) => Campus::Unknown,
    }
}

fn trimmed(cell: &Cell) -> String {
    cell.text().trim().to_string()
}

/// Builds the section of one data row, or `None` if its section name does
/// not parse.
pub fn normalize_row(
    id: SectionId,
    row: &[Cell],
    columns: &ColumnMap,
    rules: &SelectionRules,
) -> Option<Section> {
    let name = trimmed(cell_at(row, Some(columns.section_name)));
    let parsed = parse_section_name(&name)?;

    let dept = trimmed(cell_at(row, columns.dept));
    let start_time = to_minutes(cell_at(row, columns.start_time));
    let end_time = to_minutes(cell_at(row, columns.end_time));
    let start_date = format_date(cell_at(row, columns.start_date));
    let end_date = format_date(cell_at(row, columns.end_date));
    let date_range = if !start_date.is_empty() && !end_date.is_empty() {
        format!("{} - {}", start_date, end_date)
    } else {
        String::new()
    };
    let capacity = cell_at(row, columns.capacity)
        .leading_int()
        .filter(|c| *c > 0)
        .and_then(|c| u32::try_from(c).ok())
        .unwrap_or(0);
    let weeks = cell_at(row, columns.weeks)
        .leading_int()
        .filter(|w| *w > 0)
        .and_then(|w| u32::try_from(w).ok())
        .unwrap_or(rules.default_weeks);

    let letter = parsed.mode_code.letter();
    Some(Section {
        id,
        name,
        course: format!("{} {}", parsed.subject, parsed.course_num),
        section: format!("{}{}", letter, parsed.sequence),
        mode: parsed.mode_code.mode(),
        campus: campus_of(parsed.mode_code, &dept, &rules.catalog),
        subject: parsed.subject,
        course_num: parsed.course_num,
        mode_code: parsed.mode_code,
        sequence: parsed.sequence,
        dept,
        days: trimmed(cell_at(row, columns.days)),
        start_time,
        end_time,
        time_range: format_time_range(start_time, end_time),
        building: trimmed(cell_at(row, columns.building)),
        room: trimmed(cell_at(row, columns.room)),
        start_date,
        end_date,
        date_range,
        capacity,
        weeks,
        primary_faculty: trimmed(cell_at(row, columns.primary_faculty)),
    })
}

/// Normalizes the data rows that follow a header. The id of a section is the
/// position of its row among the data rows, skipped rows included.
pub fn normalize_rows(
    data_rows: &[Vec<Cell>],
    columns: &ColumnMap,
    rules: &SelectionRules,
) -> Vec<Section> {
    let sections: Vec<Section> = data_rows
        .iter()
        .enumerate()
        .filter_map(|(id, row)| normalize_row(id, row, columns, rules))
        .collect();
    debug!(
        "normalize_rows: {} sections out of {} rows",
        sections.len(),
        data_rows.len()
    );
    sections
}

/// Keeps a single row for each hybrid section listed on several rows.
///
/// The kept row is the first one with both days and a time range (or the
/// first row of the group), placed where the group first appears. Other
/// sections keep all their rows, which may describe a split schedule.
pub fn collapse_hybrid_duplicates(sections: Vec<Section>) -> Vec<Section> {
    let mut groups: HashMap<(String, String), Vec<usize>> = HashMap::new();
    for (idx, s) in sections.iter().enumerate() {
        groups
            .entry((s.course.clone(), s.section.clone()))
            .or_insert_with(Vec::new)
            .push(idx);
    }

    let mut keep: Vec<usize> = Vec::with_capacity(sections.len());
    let mut done: Vec<(String, String)> = Vec::new();
    for (idx, s) in sections.iter().enumerate() {
        let key = (s.course.clone(), s.section.clone());
        if done.contains(&key) {
            continue;
        }
        let group = match groups.get(&key) {
            Some(g) => g,
            None => continue,
        };
        if group.len() > 1 && s.mode_code == ModeCode::Hybrid {
            let chosen = group
                .iter()
                .find(|i| !sections[**i].days.is_empty() && !sections[**i].time_range.is_empty())
                .unwrap_or(&idx);
            debug!(
                "collapse_hybrid_duplicates: {} {} keeps 1 of {} rows",
                s.course,
                s.section,
                group.len()
            );
            keep.push(*chosen);
        } else {
            keep.extend(group.iter().cloned());
        }
        done.push(key);
    }

    let mut slots: Vec<Option<Section>> = sections.into_iter().map(Some).collect();
    keep.iter().filter_map(|idx| slots[*idx].take()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn columns() -> ColumnMap {
        let header: Vec<Cell> = [
            "Section Name",
            "Dept",
            "Days",
            "Start Time",
            "End Time",
            "Bldg",
            "Room",
            "Start Date",
            "End Date",
            "Section Capacity",
            "# of Weeks",
            "Primary Faculty Name",
        ]
        .iter()
        .map(|s| text(s))
        .collect();
        ColumnMap::from_header(&header).unwrap()
    }

    #[test]
    fn section_names() {
        let p = parse_section_name(" engl-1181-c02 ").unwrap();
        assert_eq!(p.subject, "ENGL");
        assert_eq!(p.course_num, "1181");
        assert_eq!(p.mode_code, ModeCode::CenterInPerson);
        assert_eq!(p.sequence, "02");
        assert_eq!(parse_section_name("ENGL-1181-X7").unwrap().mode_code, ModeCode::Other('X'));
        assert_eq!(parse_section_name("ENGL 1181 C02"), None);
        assert_eq!(parse_section_name("ENGL-1181-02"), None);
        assert_eq!(parse_section_name("ENGL-11A1-C02"), None);
        assert_eq!(parse_section_name("ENGL-1181-C"), None);
        assert_eq!(parse_section_name(""), None);
    }

    #[test]
    fn campuses() {
        let catalog = CourseCatalog::default();
        assert_eq!(campus_of(ModeCode::Remote, "", &catalog), Campus::Online);
        assert_eq!(campus_of(ModeCode::Hybrid, " commc ", &catalog), Campus::Center);
        assert_eq!(campus_of(ModeCode::Hybrid, "COMMS", &catalog), Campus::South);
        assert_eq!(campus_of(ModeCode::Hybrid, "ARTS", &catalog), Campus::Unknown);
        assert_eq!(campus_of(ModeCode::Other('Z'), "COMMC", &catalog), Campus::Unknown);
    }

    #[test]
    fn full_row() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 13).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let row = vec![
            text("ENGL-1181-C02"),
            text("COMMC"),
            text("MW"),
            Cell::Number(0.375),
            Cell::Number(0.4270833333),
            text("CC"),
            text("101"),
            Cell::Date(start),
            text("5/9/25"),
            Cell::Number(24.0),
            Cell::Empty,
            text("Smith, J"),
        ];
        let s = normalize_row(4, &row, &columns(), &SelectionRules::default()).unwrap();
        assert_eq!(s.id, 4);
        assert_eq!(s.course, "ENGL 1181");
        assert_eq!(s.section, "C02");
        assert_eq!(s.mode, Mode::InPerson);
        assert_eq!(s.campus, Campus::Center);
        assert_eq!(s.time_range, "9 AM - 10:15 AM");
        assert_eq!(s.date_range, "1/13/25 - 5/9/25");
        assert_eq!(s.capacity, 24);
        assert_eq!(s.weeks, 16);
        assert_eq!(s.primary_faculty, "Smith, J");
    }

    #[test]
    fn lenient_numbers() {
        let mut row = vec![Cell::Empty; 12];
        row[0] = text("ENGL-1170-O01");
        row[9] = text("-4");
        row[10] = text("8 wks");
        let s = normalize_row(0, &row, &columns(), &SelectionRules::default()).unwrap();
        assert_eq!(s.capacity, 0);
        assert_eq!(s.weeks, 8);
        assert_eq!(s.time_range, "");
        assert_eq!(s.date_range, "");

        row[10] = Cell::Number(0.0);
        let s = normalize_row(0, &row, &columns(), &SelectionRules::default()).unwrap();
        assert_eq!(s.weeks, 16);
    }

    #[test]
    fn oversized_numbers_fall_back() {
        let mut row = vec![Cell::Empty; 12];
        row[0] = text("ENGL-1181-O03");
        row[9] = text("5000000000");
        row[10] = Cell::Number(5e9);
        let s = normalize_row(0, &row, &columns(), &SelectionRules::default()).unwrap();
        assert_eq!(s.capacity, 0);
        assert_eq!(s.weeks, 16);
    }

    #[test]
    fn unreadable_times_leave_the_range_empty() {
        let mut row = vec![Cell::Empty; 12];
        row[0] = text("ENGL-1181-C04");
        row[2] = text("MW");
        row[3] = text("99999999:00");
        row[4] = text("10:15");
        let s = normalize_row(0, &row, &columns(), &SelectionRules::default()).unwrap();
        assert_eq!(s.start_time, None);
        assert_eq!(s.end_time, Some(615));
        assert_eq!(s.time_range, "");
    }

    #[test]
    fn ids_skip_dropped_rows() {
        let mut rows = vec![vec![Cell::Empty; 12]; 3];
        rows[0][0] = text("ENGL-1181-C01");
        rows[1][0] = text("Subtotal");
        rows[2][0] = text("ENGL-1181-C02");
        let sections = normalize_rows(&rows, &columns(), &SelectionRules::default());
        let ids: Vec<SectionId> = sections.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![0, 2]);
    }

    #[test]
    fn hybrid_duplicates_collapse() {
        let mut rows = vec![vec![Cell::Empty; 12]; 4];
        rows[0][0] = text("ENGL-1210-H01");
        rows[1][0] = text("ENGL-1181-C01");
        rows[2][0] = text("ENGL-1210-H01");
        rows[2][2] = text("T");
        rows[2][3] = text("13:00");
        rows[2][4] = text("14:15");
        rows[3][0] = text("ENGL-1181-C01");
        let sections = normalize_rows(&rows, &columns(), &SelectionRules::default());
        let collapsed = collapse_hybrid_duplicates(sections);
        let ids: Vec<SectionId> = collapsed.iter().map(|s| s.id).collect();
        // The hybrid keeps its row with a meeting time, at the first position.
        assert_eq!(ids, vec![2, 1, 3]);

        let again = collapse_hybrid_duplicates(collapsed.clone());
        assert_eq!(again, collapsed);
    }

    #[test]
    fn hybrid_duplicates_without_meeting_time_keep_first_row() {
        let mut rows = vec![vec![Cell::Empty; 12]; 3];
        rows[0][0] = text("ENGL-1210-H02");
        rows[0][2] = text("T");
        rows[1][0] = text("ENGL-1181-C01");
        rows[2][0] = text("ENGL-1210-H02");
        rows[2][3] = text("13:00");
        rows[2][4] = text("14:15");
        let sections = normalize_rows(&rows, &columns(), &SelectionRules::default());
        let collapsed = collapse_hybrid_duplicates(sections);
        let ids: Vec<SectionId> = collapsed.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![0, 1]);
        assert_eq!(collapsed[0].days, "T");
    }
}

use log::{debug, info, warn};

use course_bundles::layout::{campus_filename, ALL_CAMPUSES_LABEL};
use course_bundles::*;
use snafu::{prelude::*, Snafu};

use std::collections::HashMap;
use std::fs;

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::sheet::config_reader::*;
use crate::sheet::io_common::{resolve_path, simplify_file_name};
use crate::sheet::io_excel::read_excel_sheet;

mod config_reader;
mod io_common;
mod io_excel;

#[derive(Debug, Snafu)]
pub enum SheetError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::Error,
        path: String,
    },
    #[snafu(display("The workbook {path} has no worksheet"))]
    EmptyExcel { path: String },
    #[snafu(display("The workbook {path} has no worksheet named {worksheet}"))]
    MissingWorksheet { path: String, worksheet: String },
    #[snafu(display("Error reading file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the JSON content of {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error producing the JSON summary"))]
    WritingJson { source: serde_json::Error },
    #[snafu(display("Error processing {path}"))]
    Selection {
        source: SelectionError,
        path: String,
    },
    #[snafu(display("Error writing the summary to {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type SheetResult<T> = Result<T, SheetError>;

/// The outcome of one sheet: the whole sheet, and each campus when sorting
/// by campus.
type SheetOutcome = (ProcessingResult, Option<CampusSortResult>);

fn section_js(s: &Section) -> JSValue {
    json!({
        "id": s.id,
        "name": s.name,
        "course": s.course,
        "section": s.section,
        "mode": s.mode.label(),
        "campus": s.campus.label(),
        "dept": s.dept,
        "days": s.days,
        "time": s.time_range,
        "building": s.building,
        "room": s.room,
        "dates": s.date_range,
        "capacity": s.capacity,
        "weeks": s.weeks,
        "faculty": s.primary_faculty,
    })
}

fn section_name(result: &ProcessingResult, id: SectionId) -> String {
    result
        .section(id)
        .map(|s| s.name.clone())
        .unwrap_or_else(|| id.to_string())
}

fn layout_js(layout: &SheetLayout) -> JSValue {
    let columns: Vec<&str> = layout.columns.iter().map(|c| c.label).collect();
    let rows: Vec<JSValue> = layout
        .rows
        .iter()
        .map(|r| {
            json!({
                "values": r.values,
                "bundle": r.bundle_id,
                "fill": r.fill,
                "border": r.border,
                "firstInBundle": r.first_in_bundle,
                "lastInBundle": r.last_in_bundle,
                "height": r.height,
            })
        })
        .collect();
    let greyed: Vec<usize> = layout
        .original
        .fills
        .iter()
        .enumerate()
        .filter(|(_, f)| f.is_some())
        .map(|(idx, _)| idx)
        .collect();
    json!({
        "fileName": layout.file_name,
        "columns": columns,
        "rows": rows,
        "original": {
            "rows": layout.original.rows.len(),
            "widths": layout.original.widths,
            "greyedRows": greyed,
        },
    })
}

fn result_js(result: &ProcessingResult, layout: &SheetLayout) -> JSValue {
    let sections: Vec<JSValue> = result.sections.iter().map(section_js).collect();
    let bundles: Vec<JSValue> = result
        .bundles
        .iter()
        .map(|b| {
            let members: Vec<String> = b.sections.iter().map(|id| section_name(result, *id)).collect();
            json!({"id": b.id, "kind": b.kind.label(), "sections": members})
        })
        .collect();
    let flags: Vec<JSValue> = result
        .flags
        .iter()
        .map(|f| json!({"section": section_name(result, f.section_id), "message": f.message}))
        .collect();
    json!({
        "semester": result.semester_code,
        "campus": result.campus_name,
        "headerRow": result.header_row,
        "sections": sections,
        "bundles": bundles,
        "flags": flags,
        "layout": layout_js(layout),
    })
}

fn campus_sort_js(
    whole: &ProcessingResult,
    sort: &CampusSortResult,
    catalog: &CourseCatalog,
) -> JSValue {
    let campuses: Vec<JSValue> = sort
        .processed
        .iter()
        .filter_map(|(campus, result)| {
            layout_campus_sheet(sort, *campus, catalog).map(|layout| result_js(result, &layout))
        })
        .collect();
    let mut all_campuses = layout_selection_sheet(whole, catalog);
    all_campuses.file_name = campus_filename(&sort.semester_code, ALL_CAMPUSES_LABEL);
    json!({
        "semester": sort.semester_code,
        "headerRow": sort.header_row,
        "counts": {
            "center": sort.counts.center,
            "south": sort.counts.south,
            "online": sort.counts.online,
            "unknown": sort.counts.unknown,
            "total": sort.counts.total,
        },
        "campuses": campuses,
        "allCampuses": layout_js(&all_campuses),
    })
}

/// The summary of all the files of a session, in the order they were first
/// processed.
fn build_summary_js(
    session: &Session,
    campus_sorts: &HashMap<String, CampusSortResult>,
    rules: &SelectionRules,
) -> JSValue {
    let files: Vec<JSValue> = session
        .entries()
        .iter()
        .map(|(name, result)| {
            let layout = layout_selection_sheet(result, &rules.catalog);
            let mut js = result_js(result, &layout);
            js["file"] = json!(name);
            if let Some(sort) = campus_sorts.get(name) {
                js["campusSort"] = campus_sort_js(result, sort, &rules.catalog);
            }
            js
        })
        .collect();
    json!({ "files": files })
}

fn process_sheet(
    input: &SheetInput,
    rules: &SelectionRules,
    campus_sort: bool,
) -> Result<SheetOutcome, SelectionError> {
    let result = run_selection(input, rules)?;
    let sort = if campus_sort {
        Some(run_campus_sort(input, rules)?)
    } else {
        None
    };
    Ok((result, sort))
}

fn process_file(
    path: &str,
    worksheet_name: &Option<String>,
    rules: &SelectionRules,
    campus_sort: bool,
) -> SheetResult<SheetOutcome> {
    info!("Attempting to read schedule file {:?}", path);
    let input = read_excel_sheet(path, worksheet_name)?;
    process_sheet(&input, rules, campus_sort).context(SelectionSnafu { path })
}

fn check_reference(summary: &JSValue, reference: &JSValue) -> SheetResult<()> {
    let pretty_summary = serde_json::to_string_pretty(summary).context(WritingJsonSnafu {})?;
    let pretty_reference = serde_json::to_string_pretty(reference).context(WritingJsonSnafu {})?;
    if pretty_reference != pretty_summary {
        warn!("Found differences with the reference summary");
        print_diff(pretty_reference.as_str(), pretty_summary.as_str(), "\n");
        whatever!("Difference detected between produced summary and reference summary")
    }
    Ok(())
}

fn write_summary(summary: &JSValue, out: &Option<String>) -> SheetResult<()> {
    let pretty = serde_json::to_string_pretty(summary).context(WritingJsonSnafu {})?;
    match out.as_deref() {
        None | Some("stdout") => println!("{}", pretty),
        Some("") => debug!("write_summary: no output requested"),
        Some(path) => {
            fs::write(path, pretty).context(WritingOutputSnafu { path })?;
            info!("Summary written to {}", path);
        }
    }
    Ok(())
}

/// Processes every input file in turn and writes the summary.
///
/// A file that cannot be processed is reported and skipped. The run fails at
/// the end if any file failed.
pub fn run_files(args: &Args) -> SheetResult<()> {
    let config = match &args.config {
        Some(path) => read_config(path)?,
        None => SheetConfig::default(),
    };
    let rules = validate_rules(&config)?;
    let campus_sort = args.campus_sort || config.output_settings.campus_sort.unwrap_or(false);

    let mut sources: Vec<(String, Option<String>)> = Vec::new();
    if let Some(config_path) = &args.config {
        for source in config.input_files.iter() {
            sources.push((
                resolve_path(config_path, &source.file_path),
                source.excel_worksheet_name.clone(),
            ));
        }
    }
    sources.extend(args.input.iter().map(|p| (p.clone(), None)));
    if sources.is_empty() {
        whatever!("No input file: pass --input or list the files in the rules file");
    }

    let mut session = Session::new();
    let mut campus_sorts: HashMap<String, CampusSortResult> = HashMap::new();
    let mut failures = 0;
    for (path, worksheet_name) in sources.iter() {
        let worksheet_name = args
            .excel_worksheet_name
            .clone()
            .or_else(|| worksheet_name.clone());
        match process_file(path, &worksheet_name, &rules, campus_sort) {
            Ok((result, sort)) => {
                let name = simplify_file_name(path);
                match sort {
                    Some(sort) => {
                        campus_sorts.insert(name.clone(), sort);
                    }
                    None => {
                        campus_sorts.remove(&name);
                    }
                }
                session.upsert(&name, result);
            }
            Err(e) => {
                failures += 1;
                warn!("run_files: {:?}", e);
                eprintln!("Could not process {}: {}", path, e);
                if let Some(source) = std::error::Error::source(&e) {
                    eprintln!("  caused by: {}", source);
                }
            }
        }
    }
    info!(
        "run_files: {} files processed, {} failed",
        session.len(),
        failures
    );

    let summary = build_summary_js(&session, &campus_sorts, &rules);
    let out = args
        .out
        .clone()
        .or_else(|| config.output_settings.output_path.clone());
    write_summary(&summary, &out)?;

    if let Some(reference_path) = &args.reference {
        let reference = read_summary(reference_path)?;
        check_reference(&summary, &reference)?;
    }

    if failures > 0 {
        whatever!("{} of {} files could not be processed", failures, sources.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        if s.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }

    fn sheet(data: &[(&str, &str, &str, &str, f64)]) -> SheetInput {
        let mut rows = vec![
            vec![text("Course schedule")],
            ["Section Name", "Dept", "Bldg", "Room", "Start Date", "End Date", "Section Capacity"]
                .iter()
                .map(|h| text(h))
                .collect::<Vec<Cell>>(),
        ];
        for (name, dept, bldg, room, capacity) in data {
            rows.push(vec![
                text(name),
                text(dept),
                text(bldg),
                text(room),
                text("1/13/25"),
                text("5/9/25"),
                Cell::Number(*capacity),
            ]);
        }
        SheetInput::from_cells(rows)
    }

    fn corequisite_sheet() -> SheetInput {
        sheet(&[
            ("ENGL-1170-C01", "COMMC", "A", "100", 8.0),
            ("ENGL-1181-C02", "COMMC", "A", "100", 20.0),
            ("ENGL-1181-C03", "COMMC", "A", "100", 22.0),
            ("ENGL-1210-C04", "COMMC", "A", "204", 30.0),
        ])
    }

    #[test]
    fn summary_of_a_sheet() {
        let rules = SelectionRules::default();
        let (result, sort) = process_sheet(&corequisite_sheet(), &rules, false).unwrap();
        assert!(sort.is_none());
        let mut session = Session::new();
        session.upsert("w25.xlsx", result);
        let js = build_summary_js(&session, &HashMap::new(), &rules);

        let file = &js["files"][0];
        assert_eq!(file["file"], json!("w25.xlsx"));
        assert_eq!(file["semester"], json!("W25"));
        assert_eq!(file["campus"], json!("Center"));
        assert_eq!(
            file["bundles"],
            json!([{
                "id": "Bundle-01",
                "kind": "paired-corequisite",
                "sections": ["ENGL-1170-C01", "ENGL-1181-C02", "ENGL-1181-C03"],
            }])
        );
        assert_eq!(
            file["flags"],
            json!([{
                "section": "ENGL-1210-C04",
                "message": "Capacity 30 exceeds max of 28 for writing courses",
            }])
        );
        assert_eq!(
            file["layout"]["fileName"],
            json!("W25_Center_Faculty_Selection_Sheet.xlsx")
        );
        assert_eq!(file["layout"]["rows"][0]["firstInBundle"], json!(true));
        assert_eq!(file["layout"]["rows"][2]["lastInBundle"], json!(true));
        assert_eq!(file["layout"]["rows"][0]["border"], json!("FF4472C4"));
        assert_eq!(file["layout"]["rows"][3]["border"], json!(null));
        assert!(file.get("campusSort").is_none());
    }

    #[test]
    fn summary_of_a_campus_sort() {
        let rules = SelectionRules::default();
        let input = sheet(&[
            ("ENGL-1181-S01", "COMMS", "B", "10", 24.0),
            ("EAPP-0950-S02", "COMMS", "B", "12", 18.0),
            ("ENGL-1210-O03", "", "", "", 24.0),
        ]);
        let (result, sort) = process_sheet(&input, &rules, true).unwrap();
        let mut campus_sorts = HashMap::new();
        campus_sorts.insert("all.xlsx".to_string(), sort.unwrap());
        let mut session = Session::new();
        session.upsert("all.xlsx", result);
        let js = build_summary_js(&session, &campus_sorts, &rules);

        let sort_js = &js["files"][0]["campusSort"];
        assert_eq!(sort_js["counts"]["south"], json!(2));
        assert_eq!(sort_js["counts"]["total"], json!(3));
        let files: Vec<&str> = sort_js["campuses"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["layout"]["fileName"].as_str().unwrap())
            .collect();
        assert_eq!(
            files,
            vec![
                "W25_South_Campus_Selection_Schedule.xlsx",
                "W25_Online_Selection_Schedule.xlsx"
            ]
        );
        assert_eq!(sort_js["campuses"][0]["layout"]["original"]["greyedRows"], json!([2]));
        assert_eq!(
            sort_js["allCampuses"]["fileName"],
            json!("W25_All_Campuses_Selection_Schedule.xlsx")
        );
    }

    #[test]
    fn reprocessed_file_replaces_its_summary() {
        let rules = SelectionRules::default();
        let mut session = Session::new();
        let (first, _) = process_sheet(&corequisite_sheet(), &rules, false).unwrap();
        session.upsert("w25.xlsx", first);
        let (second, _) = process_sheet(
            &sheet(&[("ENGL-1210-C01", "COMMC", "A", "1", 20.0)]),
            &rules,
            false,
        )
        .unwrap();
        session.upsert("w25.xlsx", second);
        let js = build_summary_js(&session, &HashMap::new(), &rules);
        assert_eq!(js["files"].as_array().unwrap().len(), 1);
        assert_eq!(js["files"][0]["sections"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn selection_errors() {
        let input = SheetInput::from_cells(vec![vec![text("no header here")]]);
        let res = process_sheet(&input, &SelectionRules::default(), false);
        assert_eq!(res.err(), Some(SelectionError::HeaderNotFound { scanned: 1 }));
    }

    #[test]
    fn reference_comparison() {
        let summary = json!({"files": [{"file": "w25.xlsx", "semester": "W25"}]});
        assert!(check_reference(&summary, &summary.clone()).is_ok());
        let reference = json!({"files": [{"file": "w25.xlsx", "semester": "F25"}]});
        assert!(matches!(
            check_reference(&summary, &reference),
            Err(SheetError::Whatever { .. })
        ));
    }
}

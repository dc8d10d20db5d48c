use calamine::{open_workbook_auto, DataType, Range, Reader};
use chrono::{Duration, NaiveDate, NaiveDateTime};

use course_bundles::schedule::{format_time, to_minutes};

use crate::sheet::*;

/// Reads one worksheet of a workbook, with its cells and their display text.
pub fn read_excel_sheet(path: &str, worksheet_name: &Option<String>) -> SheetResult<SheetInput> {
    let wrange = get_range(path, worksheet_name)?;
    debug!(
        "read_excel_sheet: path: {:?} size: {:?} start: {:?}",
        path,
        wrange.get_size(),
        wrange.start()
    );
    let mut rows = Vec::with_capacity(wrange.height());
    let mut display_rows = Vec::with_capacity(wrange.height());
    for row in wrange.rows() {
        let (cells, display): (Vec<Cell>, Vec<String>) = row.iter().map(convert_cell).unzip();
        rows.push(cells);
        display_rows.push(display);
    }
    info!("read_excel_sheet: {} rows read from {}", rows.len(), path);
    Ok(SheetInput { rows, display_rows })
}

fn get_range(path: &str, worksheet_name: &Option<String>) -> SheetResult<Range<DataType>> {
    let mut workbook = open_workbook_auto(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet) = worksheet_name {
        let wrange = workbook
            .worksheet_range(worksheet)
            .context(MissingWorksheetSnafu { path, worksheet })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    } else {
        let wrange = workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    }
}

/// Excel counts days from 1899-12-30, fractions of a day being the time.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial.abs() > 3_000_000.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let seconds = (serial * 86_400.0).round() as i64;
    epoch.checked_add_signed(Duration::seconds(seconds))
}

/// Converts a cell to the model of the library, along with the text shown for
/// it in the original data.
///
/// Date cells below one day hold a time of day: they are kept as a fraction
/// of a day.
pub fn convert_cell(cell: &DataType) -> (Cell, String) {
    match cell {
        DataType::Empty => (Cell::Empty, String::new()),
        DataType::String(s) => (Cell::Text(s.clone()), s.clone()),
        DataType::Float(f) => {
            let c = Cell::Number(*f);
            let display = c.text();
            (c, display)
        }
        DataType::Int(i) => (Cell::Number(*i as f64), i.to_string()),
        DataType::Bool(b) => (Cell::Text(b.to_string().to_uppercase()), b.to_string().to_uppercase()),
        DataType::DateTime(f) if *f >= 0.0 && *f < 1.0 => {
            let c = Cell::Number(*f);
            let display = to_minutes(&c).map(format_time).unwrap_or_default();
            (c, display)
        }
        DataType::DateTime(f) => match excel_serial_to_datetime(*f) {
            Some(dt) => {
                let c = Cell::Date(dt);
                let display = c.text();
                (c, display)
            }
            None => (Cell::Number(*f), f.to_string()),
        },
        _ => {
            debug!("convert_cell: unreadable cell {:?}", cell);
            (Cell::Empty, String::new())
        }
    }
}

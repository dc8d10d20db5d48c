use crate::sheet::*;

use std::collections::BTreeMap;

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
    #[serde(rename = "campusSort")]
    pub campus_sort: Option<bool>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesSettings {
    #[serde(rename = "headerKeywords")]
    pub header_keywords: Option<Vec<String>>,
    #[serde(rename = "headerScanRows")]
    pub header_scan_rows: Option<usize>,
    #[serde(rename = "headerKeywordThreshold")]
    pub header_keyword_threshold: Option<usize>,
    #[serde(rename = "dateAlignmentDays")]
    pub date_alignment_days: Option<i64>,
    #[serde(rename = "sequenceProximity")]
    pub sequence_proximity: Option<u32>,
    #[serde(rename = "satelliteCapacityLimit")]
    pub satellite_capacity_limit: Option<u32>,
    #[serde(rename = "standardCapacityMax")]
    pub standard_capacity_max: Option<u32>,
    #[serde(rename = "anchorCapacityMax")]
    pub anchor_capacity_max: Option<u32>,
    #[serde(rename = "hoursTolerance")]
    pub hours_tolerance: Option<f64>,
    #[serde(rename = "defaultWeeks")]
    pub default_weeks: Option<u32>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSettings {
    pub anchor: Option<String>,
    pub satellite: Option<String>,
    #[serde(rename = "sequenceFirst")]
    pub sequence_first: Option<String>,
    #[serde(rename = "sequenceSecond")]
    pub sequence_second: Option<String>,
    #[serde(rename = "standardCourses")]
    pub standard_courses: Option<Vec<String>>,
    #[serde(rename = "creditHours")]
    pub credit_hours: Option<BTreeMap<String, u32>>,
    #[serde(rename = "equatedHours")]
    pub equated_hours: Option<BTreeMap<String, u32>>,
    #[serde(rename = "defaultCreditHours")]
    pub default_credit_hours: Option<u32>,
    #[serde(rename = "centerDepartment")]
    pub center_department: Option<String>,
    #[serde(rename = "southDepartment")]
    pub south_department: Option<String>,
    #[serde(rename = "campusSubjects")]
    pub campus_subjects: Option<Vec<String>>,
    #[serde(rename = "selectionSubjects")]
    pub selection_subjects: Option<Vec<String>>,
}

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct SheetConfig {
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
    #[serde(rename = "inputFiles", default)]
    pub input_files: Vec<FileSource>,
    #[serde(default)]
    pub rules: RulesSettings,
    #[serde(default)]
    pub catalog: CatalogSettings,
}

pub fn read_config(path: &str) -> SheetResult<SheetConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    parse_config(&contents, path)
}

pub fn parse_config(contents: &str, path: &str) -> SheetResult<SheetConfig> {
    let config: SheetConfig = serde_json::from_str(contents).context(ParsingJsonSnafu { path })?;
    debug!("parse_config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: &str) -> SheetResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    Ok(js)
}

fn course_list(courses: &[String]) -> Vec<String> {
    courses.iter().map(|c| c.trim().to_uppercase()).collect()
}

fn department(code: &str) -> SheetResult<String> {
    let code = code.trim().to_uppercase();
    if code.is_empty() {
        whatever!("department codes may not be empty");
    }
    Ok(code)
}

fn validate_catalog(settings: &CatalogSettings) -> SheetResult<CourseCatalog> {
    let mut catalog = CourseCatalog::default();
    if let Some(x) = &settings.anchor {
        catalog.anchor = x.trim().to_uppercase();
    }
    if let Some(x) = &settings.satellite {
        catalog.satellite = x.trim().to_uppercase();
    }
    if let Some(x) = &settings.sequence_first {
        catalog.sequence_first = x.trim().to_uppercase();
    }
    if let Some(x) = &settings.sequence_second {
        catalog.sequence_second = x.trim().to_uppercase();
    }
    if catalog.anchor == catalog.satellite {
        whatever!(
            "the anchor and satellite courses must differ, both are {}",
            catalog.anchor
        );
    }
    if let Some(x) = &settings.standard_courses {
        catalog.standard_courses = course_list(x);
    }
    // The course tables are merged into the defaults.
    if let Some(x) = &settings.credit_hours {
        for (course, hours) in x.iter() {
            catalog
                .credit_hours
                .insert(course.trim().to_uppercase(), *hours);
        }
    }
    if let Some(x) = &settings.equated_hours {
        for (course, hours) in x.iter() {
            catalog
                .equated_hours
                .insert(course.trim().to_uppercase(), *hours);
        }
    }
    if let Some(x) = settings.default_credit_hours {
        catalog.default_credit_hours = x;
    }
    if let Some(x) = &settings.center_department {
        catalog.center_department = department(x)?;
    }
    if let Some(x) = &settings.south_department {
        catalog.south_department = department(x)?;
    }
    if catalog.center_department == catalog.south_department {
        whatever!(
            "the campus departments must differ, both are {}",
            catalog.center_department
        );
    }
    if let Some(x) = &settings.campus_subjects {
        catalog.campus_subjects = course_list(x);
    }
    if let Some(x) = &settings.selection_subjects {
        catalog.selection_subjects = course_list(x);
    }
    Ok(catalog)
}

/// Turns the rules file into the rules of the library. Missing values take
/// their default.
pub fn validate_rules(config: &SheetConfig) -> SheetResult<SelectionRules> {
    let settings = &config.rules;
    let mut rules = SelectionRules {
        catalog: validate_catalog(&config.catalog)?,
        ..SelectionRules::default()
    };
    if let Some(x) = &settings.header_keywords {
        if x.is_empty() {
            whatever!("headerKeywords may not be empty");
        }
        rules.header_keywords = x.clone();
    }
    if let Some(x) = settings.header_scan_rows {
        if x == 0 {
            whatever!("headerScanRows must be positive");
        }
        rules.header_scan_rows = x;
    }
    match settings.header_keyword_threshold {
        Some(0) => whatever!("headerKeywordThreshold must be positive"),
        Some(x) if x > rules.header_keywords.len() => whatever!(
            "headerKeywordThreshold {} is above the number of header keywords ({})",
            x,
            rules.header_keywords.len()
        ),
        Some(x) => rules.header_keyword_threshold = x,
        None => {}
    }
    if let Some(x) = settings.date_alignment_days {
        if x < 0 {
            whatever!("dateAlignmentDays may not be negative: {}", x);
        }
        rules.date_alignment_days = x;
    }
    if let Some(x) = settings.sequence_proximity {
        rules.sequence_proximity = x;
    }
    if let Some(x) = settings.satellite_capacity_limit {
        rules.satellite_capacity_limit = x;
    }
    if let Some(x) = settings.standard_capacity_max {
        rules.standard_capacity_max = x;
    }
    if let Some(x) = settings.anchor_capacity_max {
        rules.anchor_capacity_max = x;
    }
    if let Some(x) = settings.hours_tolerance {
        if !x.is_finite() || x < 0.0 {
            whatever!("hoursTolerance must be a non-negative number: {}", x);
        }
        rules.hours_tolerance = x;
    }
    if let Some(x) = settings.default_weeks {
        if x == 0 {
            whatever!("defaultWeeks must be positive");
        }
        rules.default_weeks = x;
    }
    debug!("validate_rules: {:?}", rules);
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_gives_defaults() {
        let config = parse_config("{}", "rules.json").unwrap();
        assert!(config.input_files.is_empty());
        assert_eq!(config.output_settings, OutputSettings::default());
        assert_eq!(validate_rules(&config).unwrap(), SelectionRules::default());
    }

    #[test]
    fn overrides() {
        let config = parse_config(
            r#"{
                "outputSettings": { "outputPath": "summary.json", "campusSort": true },
                "inputFiles": [ { "filePath": "w25.xlsx", "excelWorksheetName": "Export" } ],
                "rules": { "hoursTolerance": 1.0, "standardCapacityMax": 25 },
                "catalog": {
                    "creditHours": { "engl 2740 ": 4 },
                    "southDepartment": " comms2"
                }
            }"#,
            "rules.json",
        )
        .unwrap();
        assert_eq!(config.output_settings.campus_sort, Some(true));
        assert_eq!(config.input_files[0].file_path, "w25.xlsx");
        assert_eq!(
            config.input_files[0].excel_worksheet_name,
            Some("Export".to_string())
        );

        let rules = validate_rules(&config).unwrap();
        assert_eq!(rules.hours_tolerance, 1.0);
        assert_eq!(rules.standard_capacity_max, 25);
        assert_eq!(rules.anchor_capacity_max, ANCHOR_CAPACITY_MAX);
        assert_eq!(rules.catalog.credit_hours("ENGL 2740"), 4);
        assert_eq!(rules.catalog.credit_hours("ENGL 1181"), 4);
        assert_eq!(rules.catalog.south_department, "COMMS2");
        assert_eq!(rules.catalog.anchor, "ENGL 1170");
    }

    #[test]
    fn invalid_rules() {
        let read = |s: &str| validate_rules(&parse_config(s, "rules.json").unwrap());
        assert!(read(r#"{ "rules": { "defaultWeeks": 0 } }"#).is_err());
        assert!(read(r#"{ "rules": { "hoursTolerance": -0.5 } }"#).is_err());
        assert!(read(r#"{ "rules": { "headerKeywordThreshold": 15 } }"#).is_err());
        assert!(read(r#"{ "catalog": { "southDepartment": "COMMC" } }"#).is_err());
        assert!(read(r#"{ "catalog": { "satellite": "engl 1170" } }"#).is_err());
    }

    #[test]
    fn malformed_json() {
        let res = parse_config(r#"{ "rules": { "defaultWeeks": "sixteen" } }"#, "rules.json");
        assert!(matches!(res, Err(SheetError::ParsingJson { .. })));
    }
}

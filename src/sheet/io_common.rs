use std::path::{Path, PathBuf};

/// The name of a file without its directories.
pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
        .unwrap_or_else(|| path.to_string())
}

/// A path read from a rules file, relative to the directory of that file.
pub fn resolve_path(config_path: &str, file_path: &str) -> String {
    if Path::new(file_path).is_absolute() {
        return file_path.to_string();
    }
    let root = Path::new(config_path)
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_default();
    let p: PathBuf = root.join(file_path);
    p.as_path().display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names() {
        assert_eq!(simplify_file_name("exports/W25 center.xlsx"), "W25 center.xlsx");
        assert_eq!(simplify_file_name("south.xls"), "south.xls");
        assert_eq!(simplify_file_name(""), "");
    }

    #[test]
    fn relative_paths() {
        assert_eq!(resolve_path("conf/rules.json", "w25.xlsx"), "conf/w25.xlsx");
        assert_eq!(resolve_path("rules.json", "w25.xlsx"), "w25.xlsx");
        assert_eq!(resolve_path("conf/rules.json", "/data/w25.xlsx"), "/data/w25.xlsx");
    }
}

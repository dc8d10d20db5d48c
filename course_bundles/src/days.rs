//! Meeting-day strings such as `MWF`, `TTH` or `TR`.

/// Known patterns and their number of meeting days.
const DAY_PATTERNS: [(&str, u32); 28] = [
    ("MTWTHF", 5),
    ("MTWRF", 5),
    ("MTWHF", 5),
    ("MTWTH", 4),
    ("MTWF", 4),
    ("MTWR", 4),
    ("MWRF", 4),
    ("MWF", 3),
    ("TWR", 3),
    ("TWF", 3),
    ("MTW", 3),
    ("WRF", 3),
    ("MW", 2),
    ("TTH", 2),
    ("TR", 2),
    ("MF", 2),
    ("WF", 2),
    ("TW", 2),
    ("MR", 2),
    ("WTH", 2),
    ("M", 1),
    ("T", 1),
    ("W", 1),
    ("R", 1),
    ("F", 1),
    ("TH", 1),
    ("S", 1),
    ("U", 1),
];

/// Number of meeting days per week of a day string.
///
/// Unknown patterns are counted letter by letter, with a minimum of one day.
/// An empty string has no meeting days.
pub fn count_meeting_days(days: &str) -> u32 {
    let days = days.trim().to_uppercase();
    if days.is_empty() {
        return 0;
    }
    if let Some((_, n)) = DAY_PATTERNS.iter().find(|(p, _)| *p == days) {
        return *n;
    }

    let mut count = 0;
    for letter in ['M', 'W', 'F', 'U', 'R'] {
        if days.contains(letter) {
            count += 1;
        }
    }
    if days.contains('S') && !days.contains("SU") {
        count += 1;
    }
    if days.contains("TH") && !days.contains('R') {
        count += 1;
    }
    if days.replace("TH", "").contains('T') {
        count += 1;
    }
    count.max(1)
}

/// True if two day strings have a meeting day in common.
///
/// `M`, `W`, `F`, `S` and `U` are compared by letter, Thursday by the `TH`
/// token and Tuesday by a `T` left over once `TH` is removed. `R` is not
/// read as Thursday here.
pub fn share_meeting_day(a: &str, b: &str) -> bool {
    let a = a.to_uppercase();
    let b = b.to_uppercase();
    if ['M', 'W', 'F', 'S', 'U']
        .iter()
        .any(|d| a.contains(*d) && b.contains(*d))
    {
        return true;
    }
    if a.contains("TH") && b.contains("TH") {
        return true;
    }
    a.replace("TH", "").contains('T') && b.replace("TH", "").contains('T')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_patterns() {
        assert_eq!(count_meeting_days("MWF"), 3);
        assert_eq!(count_meeting_days("tth"), 2);
        assert_eq!(count_meeting_days("MTWTHF"), 5);
        assert_eq!(count_meeting_days("R"), 1);
        assert_eq!(count_meeting_days(""), 0);
    }

    #[test]
    fn fallback_counting() {
        // Not in the table.
        assert_eq!(count_meeting_days("MTHF"), 3);
        assert_eq!(count_meeting_days("SU"), 1);
        assert_eq!(count_meeting_days("MWS"), 3);
        assert_eq!(count_meeting_days("X"), 1);
    }

    #[test]
    fn shared_days() {
        assert!(!share_meeting_day("TTH", "MWF"));
        assert!(share_meeting_day("TTH", "T"));
        assert!(share_meeting_day("TTH", "TH"));
        assert!(share_meeting_day("MW", "WF"));
        assert!(!share_meeting_day("TH", "T"));
        // Thursday written as R is not matched.
        assert!(!share_meeting_day("TR", "R"));
    }
}

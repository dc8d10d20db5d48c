//! Checks that flag sections for review: double booked rooms, capacities
//! above policy and meeting times that do not add up to the credit hours.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::bundles::BundleDetection;
use crate::config::*;
use crate::days::{count_meeting_days, share_meeting_day};
use crate::schedule::parse_short_date;

fn dates_overlap(a: &Section, b: &Section) -> bool {
    let dates = (
        parse_short_date(&a.start_date),
        parse_short_date(&a.end_date),
        parse_short_date(&b.start_date),
        parse_short_date(&b.end_date),
    );
    match dates {
        (Some(s1), Some(e1), Some(s2), Some(e2)) => s1 <= e2 && s2 <= e1,
        _ => false,
    }
}

fn times_overlap(a: &Section, b: &Section) -> bool {
    match (a.start_time, a.end_time, b.start_time, b.end_time) {
        (Some(s1), Some(e1), Some(s2), Some(e2)) => s1 < e2 && s2 < e1,
        _ => false,
    }
}

/// Flags the in-person sections booked in the same room at the same time.
///
/// Two rows of the same section code are reported as duplicate rows rather
/// than as a conflict. Sections of the same bundle are never compared.
pub fn room_conflicts(sections: &[Section], detection: &BundleDetection) -> Vec<Flag> {
    let in_person: Vec<&Section> = sections
        .iter()
        .filter(|s| {
            s.mode_code.is_in_person()
                && !s.building.is_empty()
                && !s.room.is_empty()
                && !s.days.is_empty()
        })
        .collect();

    let mut flags = Vec::new();
    let mut seen: HashSet<(SectionId, SectionId)> = HashSet::new();
    for (i, s1) in in_person.iter().enumerate() {
        for s2 in in_person.iter().skip(i + 1) {
            let bundle1 = detection.bundle_index(s1.id);
            if bundle1.is_some() && bundle1 == detection.bundle_index(s2.id) {
                continue;
            }
            if s1.building != s2.building
                || s1.room != s2.room
                || !times_overlap(s1, s2)
                || !dates_overlap(s1, s2)
            {
                continue;
            }
            if !seen.insert((s1.id.min(s2.id), s1.id.max(s2.id))) {
                continue;
            }
            if s1.section == s2.section {
                flags.push(Flag {
                    section_id: s1.id,
                    message: format!(
                        "Same section appears on multiple rows ({}) - please review/consolidate",
                        s2.days
                    ),
                });
                flags.push(Flag {
                    section_id: s2.id,
                    message: format!(
                        "Same section appears on multiple rows ({}) - please review/consolidate",
                        s1.days
                    ),
                });
            } else if share_meeting_day(&s1.days, &s2.days) {
                debug!("room_conflicts: {} and {}", s1.name, s2.name);
                flags.push(Flag {
                    section_id: s1.id,
                    message: format!(
                        "Room conflict with {} ({} {})",
                        s2.name, s2.days, s2.time_range
                    ),
                });
                flags.push(Flag {
                    section_id: s2.id,
                    message: format!(
                        "Room conflict with {} ({} {})",
                        s1.name, s1.days, s1.time_range
                    ),
                });
            }
        }
    }
    flags
}

/// Flags the sections whose capacity is above the policy of their course.
pub fn capacity_violations(sections: &[Section], rules: &SelectionRules) -> Vec<Flag> {
    let catalog = &rules.catalog;
    let mut flags = Vec::new();
    for s in sections {
        if catalog.is_standard(&s.course) && s.capacity > rules.standard_capacity_max {
            flags.push(Flag {
                section_id: s.id,
                message: format!(
                    "Capacity {} exceeds max of {} for writing courses",
                    s.capacity, rules.standard_capacity_max
                ),
            });
        }
        if s.course == catalog.anchor && s.capacity > rules.anchor_capacity_max {
            flags.push(Flag {
                section_id: s.id,
                message: format!(
                    "Capacity {} exceeds max of {} for {}",
                    s.capacity, rules.anchor_capacity_max, catalog.anchor
                ),
            });
        }
    }
    flags
}

/// Flags the sections whose weekly meeting hours are off from what their
/// credit hours call for.
///
/// Only sections meeting at set times (in person or remote) are checked. A
/// section code found on several rows has a split schedule and is skipped.
pub fn hours_mismatches(sections: &[Section], rules: &SelectionRules) -> Vec<Flag> {
    let checked: Vec<&Section> = sections
        .iter()
        .filter(|s| {
            (s.mode_code.is_in_person() || s.mode_code == ModeCode::Remote)
                && s.start_time.is_some()
                && s.end_time.is_some()
                && !s.days.is_empty()
        })
        .collect();

    let mut rows_per_code: HashMap<&str, usize> = HashMap::new();
    for s in checked.iter() {
        *rows_per_code.entry(s.section.as_str()).or_insert(0) += 1;
    }

    let mut flags = Vec::new();
    for s in checked {
        if rows_per_code.get(s.section.as_str()).cloned().unwrap_or(0) > 1 {
            continue;
        }
        let (start, end) = match (s.start_time, s.end_time) {
            (Some(start), Some(end)) if end > start => (start, end),
            _ => continue,
        };
        let days = count_meeting_days(&s.days);
        if days == 0 || s.weeks == 0 {
            continue;
        }
        let hours = ((end - start) * days) as f64 / 60.0;
        let credits = rules.catalog.credit_hours(&s.course);
        let expected = credits as f64 * (rules.default_weeks as f64 / s.weeks as f64);
        // A difference of exactly the tolerance is flagged.
        if (hours - expected).abs() >= rules.hours_tolerance {
            flags.push(Flag {
                section_id: s.id,
                message: format!(
                    "Scheduled {:.1} hrs/wk, expected ~{:.1} hrs/wk for {}-credit {}-week course",
                    hours, expected, credits, s.weeks
                ),
            });
        }
    }
    flags
}

/// Runs the three checks, in order.
pub fn detect_flags(
    sections: &[Section],
    detection: &BundleDetection,
    rules: &SelectionRules,
) -> Vec<Flag> {
    let mut flags = room_conflicts(sections, detection);
    flags.extend(capacity_violations(sections, rules));
    flags.extend(hours_mismatches(sections, rules));
    debug!("detect_flags: {} flags", flags.len());
    flags
}

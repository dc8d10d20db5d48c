//! Detection of the sections that are meant to be offered together.
//!
//! Detection runs three passes in a fixed order. Each pass receives the set of
//! sections already assigned to a bundle and returns its own bundles, its
//! flags and the updated set. A section never joins more than one bundle.

use std::collections::HashSet;

use log::{debug, info};

use crate::config::*;
use crate::schedule::days_apart;

/// The rows a detection run is restricted to.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Scope {
    /// All the rows of a sheet.
    Sheet,
    /// The rows of one campus partition.
    Campus(Campus),
}

impl Scope {
    /// True if two sections may be bundled within this scope.
    ///
    /// The Center and South partitions only bundle sections of their own
    /// campus. The online partition and the whole sheet accept any pair.
    pub fn admits(&self, a: &Section, b: &Section) -> bool {
        match self {
            Scope::Sheet | Scope::Campus(Campus::Online) => true,
            Scope::Campus(c) => a.campus == *c && b.campus == *c,
        }
    }

    /// Online satellite sections are only paired with each other when the
    /// online sections are in scope.
    pub fn pairs_online_satellites(&self) -> bool {
        matches!(self, Scope::Sheet | Scope::Campus(Campus::Online))
    }
}

/// What one pass found.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct PassOutcome {
    pub groups: Vec<(BundleKind, Vec<SectionId>)>,
    pub flags: Vec<Flag>,
    /// All the assigned sections after the pass, earlier passes included.
    pub assigned: HashSet<SectionId>,
}

type Pass = fn(&[Section], &SelectionRules, Scope, &HashSet<SectionId>) -> PassOutcome;

/// The result of bundle detection.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct BundleDetection {
    pub bundles: Vec<Bundle>,
    pub flags: Vec<Flag>,
    pub assigned: HashSet<SectionId>,
}

impl BundleDetection {
    /// Index of the bundle of a section, in detection order.
    pub fn bundle_index(&self, id: SectionId) -> Option<usize> {
        self.bundles.iter().position(|b| b.contains(id))
    }
}

fn dates_align(a: &Section, b: &Section, rules: &SelectionRules) -> bool {
    days_apart(&a.start_date, &b.start_date)
        .map(|d| d <= rules.date_alignment_days)
        .unwrap_or(false)
}

fn sequences_close(a: &Section, b: &Section, rules: &SelectionRules) -> bool {
    match (a.sequence_number(), b.sequence_number()) {
        (Some(x), Some(y)) => x.max(y) - x.min(y) <= rules.sequence_proximity,
        _ => false,
    }
}

/// Sections of different mode letters may only be bundled if they are not
/// in person at two different campuses.
fn compatible_delivery(a: &Section, b: &Section) -> bool {
    a.mode_code == b.mode_code
        || !(a.mode_code.is_in_person() && b.mode_code.is_in_person())
}

fn same_room(a: &Section, b: &Section) -> bool {
    !a.building.is_empty()
        && !a.room.is_empty()
        && a.building == b.building
        && a.room == b.room
}

fn names_other(a: &Section, b: &Section) -> bool {
    (!a.primary_faculty.is_empty() && a.primary_faculty.contains(&b.name))
        || (!b.primary_faculty.is_empty() && b.primary_faculty.contains(&a.name))
}

fn is_satellite_candidate(
    anchor: &Section,
    sat: &Section,
    rules: &SelectionRules,
    scope: Scope,
) -> bool {
    if sat.capacity >= rules.satellite_capacity_limit
        || !scope.admits(anchor, sat)
        || !compatible_delivery(anchor, sat)
        || anchor.weeks != sat.weeks
        || !dates_align(anchor, sat, rules)
    {
        return false;
    }
    (sat.mode_code.is_in_person() && same_room(anchor, sat))
        || names_other(anchor, sat)
        || (sat.mode_code == anchor.mode_code
            && sat.weeks == anchor.weeks
            && sequences_close(anchor, sat, rules))
}

/// Pairs each anchor section with the first two satellite sections that fit.
pub fn pair_corequisites(
    sections: &[Section],
    rules: &SelectionRules,
    scope: Scope,
    assigned: &HashSet<SectionId>,
) -> PassOutcome {
    let catalog = &rules.catalog;
    let mut assigned = assigned.clone();
    let mut groups = Vec::new();
    for anchor in sections.iter().filter(|s| s.course == catalog.anchor) {
        if assigned.contains(&anchor.id) {
            continue;
        }
        let candidates: Vec<SectionId> = sections
            .iter()
            .filter(|s| s.course == catalog.satellite && !assigned.contains(&s.id))
            .filter(|s| is_satellite_candidate(anchor, s, rules, scope))
            .map(|s| s.id)
            .take(2)
            .collect();
        if candidates.len() == 2 {
            debug!(
                "pair_corequisites: {} with {:?}",
                anchor.name, candidates
            );
            let mut members = vec![anchor.id];
            members.extend(candidates);
            assigned.extend(members.iter().cloned());
            groups.push((BundleKind::PairedCorequisite, members));
        }
    }
    PassOutcome {
        groups,
        flags: Vec::new(),
        assigned,
    }
}

fn is_sequence_partner(
    first: &Section,
    second: &Section,
    rules: &SelectionRules,
    scope: Scope,
) -> bool {
    if !scope.admits(first, second)
        || first.mode_code != second.mode_code
        || first.weeks != second.weeks
        || !dates_align(first, second, rules)
    {
        return false;
    }
    if first.mode_code.is_in_person() {
        first.building == second.building && first.room == second.room && first.days == second.days
    } else {
        first.capacity < rules.satellite_capacity_limit
            && second.capacity < rules.satellite_capacity_limit
            && sequences_close(first, second, rules)
    }
}

/// Pairs each section of the first course of a sequence with the first
/// matching section of the second course.
pub fn pair_linked_sequences(
    sections: &[Section],
    rules: &SelectionRules,
    scope: Scope,
    assigned: &HashSet<SectionId>,
) -> PassOutcome {
    let catalog = &rules.catalog;
    let mut assigned = assigned.clone();
    let mut groups = Vec::new();
    for first in sections.iter().filter(|s| s.course == catalog.sequence_first) {
        if assigned.contains(&first.id) {
            continue;
        }
        let partner = sections.iter().find(|s| {
            s.course == catalog.sequence_second
                && !assigned.contains(&s.id)
                && is_sequence_partner(first, s, rules, scope)
        });
        if let Some(second) = partner {
            debug!("pair_linked_sequences: {} with {}", first.name, second.name);
            assigned.insert(first.id);
            assigned.insert(second.id);
            groups.push((BundleKind::PairedSplit, vec![first.id, second.id]));
        }
    }
    PassOutcome {
        groups,
        flags: Vec::new(),
        assigned,
    }
}

fn is_low_capacity(s: &Section, rules: &SelectionRules) -> bool {
    s.capacity > 0 && s.capacity < rules.satellite_capacity_limit
}

/// Pairs low capacity online satellite sections with each other.
///
/// Both members of each pair are flagged: the pairing is a guess made when
/// no anchor section was found.
pub fn pair_online_satellites(
    sections: &[Section],
    rules: &SelectionRules,
    scope: Scope,
    assigned: &HashSet<SectionId>,
) -> PassOutcome {
    let mut outcome = PassOutcome {
        assigned: assigned.clone(),
        ..Default::default()
    };
    if !scope.pairs_online_satellites() {
        return outcome;
    }
    let catalog = &rules.catalog;
    let pool: Vec<&Section> = sections
        .iter()
        .filter(|s| {
            s.course == catalog.satellite
                && s.mode_code == ModeCode::Online
                && is_low_capacity(s, rules)
                && !assigned.contains(&s.id)
        })
        .collect();

    let mut paired: HashSet<SectionId> = HashSet::new();
    for (i, s1) in pool.iter().enumerate() {
        if paired.contains(&s1.id) {
            continue;
        }
        let partner = pool.iter().enumerate().find(|(j, s2)| {
            i != *j
                && !paired.contains(&s2.id)
                && s1.weeks == s2.weeks
                && dates_align(s1, s2, rules)
                && sequences_close(s1, s2, rules)
        });
        if let Some((_, s2)) = partner {
            debug!("pair_online_satellites: {} with {}", s1.name, s2.name);
            paired.insert(s1.id);
            paired.insert(s2.id);
            outcome.assigned.insert(s1.id);
            outcome.assigned.insert(s2.id);
            let message = format!(
                "Appears bundled with in-person {} - please verify",
                catalog.anchor
            );
            outcome.flags.push(Flag {
                section_id: s1.id,
                message: message.clone(),
            });
            outcome.flags.push(Flag {
                section_id: s2.id,
                message,
            });
            outcome
                .groups
                .push((BundleKind::PairedOnlineLowCapacity, vec![s1.id, s2.id]));
        }
    }
    outcome
}

/// Flags the satellite and anchor sections left out of every bundle.
fn leftover_flags(
    sections: &[Section],
    rules: &SelectionRules,
    assigned: &HashSet<SectionId>,
) -> Vec<Flag> {
    let catalog = &rules.catalog;
    let satellites = sections
        .iter()
        .filter(|s| s.course == catalog.satellite && !assigned.contains(&s.id))
        .filter(|s| is_low_capacity(s, rules))
        .map(|s| Flag {
            section_id: s.id,
            message: format!(
                "Capacity suggests co-req but no matching {} found",
                catalog.anchor
            ),
        });
    let anchors = sections
        .iter()
        .filter(|s| s.course == catalog.anchor && !assigned.contains(&s.id))
        .map(|s| Flag {
            section_id: s.id,
            message: format!("Missing paired {} sections - needs review", catalog.satellite),
        });
    satellites.chain(anchors).collect()
}

/// Runs the three passes over the sections and numbers the bundles found.
pub fn detect_bundles(sections: &[Section], rules: &SelectionRules, scope: Scope) -> BundleDetection {
    let passes: [Pass; 3] = [
        pair_corequisites,
        pair_linked_sequences,
        pair_online_satellites,
    ];
    let (groups, mut flags, assigned) = passes.iter().fold(
        (Vec::new(), Vec::new(), HashSet::new()),
        |(mut groups, mut flags, assigned), pass| {
            let outcome = pass(sections, rules, scope, &assigned);
            groups.extend(outcome.groups);
            flags.extend(outcome.flags);
            (groups, flags, outcome.assigned)
        },
    );
    flags.extend(leftover_flags(sections, rules, &assigned));

    let bundles: Vec<Bundle> = groups
        .into_iter()
        .enumerate()
        .map(|(idx, (kind, members))| Bundle {
            id: format!("Bundle-{:02}", idx + 1),
            kind,
            sections: members,
        })
        .collect();
    info!(
        "detect_bundles: {} bundles, {} sections assigned, {} flags",
        bundles.len(),
        assigned.len(),
        flags.len()
    );
    BundleDetection {
        bundles,
        flags,
        assigned,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A section with the fields the heuristics look at.
    pub(crate) fn section(id: SectionId, name: &str) -> Section {
        let parts: Vec<&str> = name.split('-').collect();
        let code = ModeCode::from_letter(parts[2].chars().next().unwrap());
        Section {
            id,
            name: name.to_string(),
            subject: parts[0].to_string(),
            course_num: parts[1].to_string(),
            mode_code: code,
            sequence: parts[2][1..].to_string(),
            section: parts[2].to_string(),
            course: format!("{} {}", parts[0], parts[1]),
            mode: code.mode(),
            campus: crate::normalize::campus_of(code, "", &CourseCatalog::default()),
            dept: String::new(),
            days: String::new(),
            start_time: None,
            end_time: None,
            time_range: String::new(),
            building: String::new(),
            room: String::new(),
            start_date: "1/13/25".to_string(),
            end_date: "5/9/25".to_string(),
            date_range: "1/13/25 - 5/9/25".to_string(),
            capacity: 20,
            weeks: 16,
            primary_faculty: String::new(),
        }
    }

    fn in_room(mut s: Section, capacity: u32) -> Section {
        s.building = "A".to_string();
        s.room = "100".to_string();
        s.capacity = capacity;
        s
    }

    fn messages(d: &BundleDetection, id: SectionId) -> Vec<String> {
        d.flags
            .iter()
            .filter(|f| f.section_id == id)
            .map(|f| f.message.clone())
            .collect()
    }

    #[test]
    fn corequisite_bundle() {
        let sections = vec![
            in_room(section(0, "ENGL-1170-C01"), 8),
            in_room(section(1, "ENGL-1181-C02"), 20),
            in_room(section(2, "ENGL-1181-C03"), 22),
        ];
        let d = detect_bundles(&sections, &SelectionRules::default(), Scope::Sheet);
        assert_eq!(d.bundles.len(), 1);
        assert_eq!(d.bundles[0].id, "Bundle-01");
        assert_eq!(d.bundles[0].kind, BundleKind::PairedCorequisite);
        assert_eq!(d.bundles[0].sections, vec![0, 1, 2]);
        assert!(d.flags.is_empty());
    }

    #[test]
    fn third_candidate_left_out() {
        let sections = vec![
            in_room(section(0, "ENGL-1170-C01"), 8),
            in_room(section(1, "ENGL-1181-C02"), 20),
            in_room(section(2, "ENGL-1181-C03"), 22),
            in_room(section(3, "ENGL-1181-C04"), 18),
        ];
        let d = detect_bundles(&sections, &SelectionRules::default(), Scope::Sheet);
        assert_eq!(d.bundles.len(), 1);
        assert_eq!(d.bundles[0].sections, vec![0, 1, 2]);
        assert!(!d.assigned.contains(&3));
        assert_eq!(
            messages(&d, 3),
            vec!["Capacity suggests co-req but no matching ENGL 1170 found".to_string()]
        );
    }

    #[test]
    fn anchor_needs_two_satellites() {
        let sections = vec![
            in_room(section(0, "ENGL-1170-C01"), 8),
            in_room(section(1, "ENGL-1181-C02"), 20),
            // Too large to be a satellite.
            in_room(section(2, "ENGL-1181-C03"), 26),
        ];
        let d = detect_bundles(&sections, &SelectionRules::default(), Scope::Sheet);
        assert!(d.bundles.is_empty());
        assert_eq!(
            messages(&d, 0),
            vec!["Missing paired ENGL 1181 sections - needs review".to_string()]
        );
        assert_eq!(messages(&d, 1).len(), 1);
        assert!(messages(&d, 2).is_empty());
    }

    #[test]
    fn dates_must_align() {
        let mut late = in_room(section(2, "ENGL-1181-C03"), 22);
        late.start_date = "1/28/25".to_string();
        let sections = vec![
            in_room(section(0, "ENGL-1170-C01"), 8),
            in_room(section(1, "ENGL-1181-C02"), 20),
            late,
        ];
        let d = detect_bundles(&sections, &SelectionRules::default(), Scope::Sheet);
        assert!(d.bundles.is_empty());

        let mut rules = SelectionRules::default();
        rules.date_alignment_days = 15;
        let d = detect_bundles(&sections, &rules, Scope::Sheet);
        assert_eq!(d.bundles.len(), 1);
    }

    #[test]
    fn faculty_field_links_sections() {
        let mut anchor = section(0, "ENGL-1170-O01");
        anchor.primary_faculty = "Smith (see ENGL-1181-H07 ENGL-1181-R09)".to_string();
        let sections = vec![
            anchor,
            section(1, "ENGL-1181-H07"),
            section(2, "ENGL-1181-R09"),
        ];
        let d = detect_bundles(&sections, &SelectionRules::default(), Scope::Sheet);
        assert_eq!(d.bundles.len(), 1);
        assert_eq!(d.bundles[0].sections, vec![0, 1, 2]);
    }

    #[test]
    fn campuses_do_not_mix() {
        let sections = vec![
            in_room(section(0, "ENGL-1170-C01"), 8),
            in_room(section(1, "ENGL-1181-S02"), 20),
            in_room(section(2, "ENGL-1181-S03"), 22),
        ];
        let d = detect_bundles(&sections, &SelectionRules::default(), Scope::Sheet);
        assert!(d.bundles.is_empty());
    }

    #[test]
    fn campus_scope() {
        let sections = vec![
            section(0, "ENGL-1170-O01"),
            section(1, "ENGL-1181-O02"),
            section(2, "ENGL-1181-O03"),
        ];
        let rules = SelectionRules::default();
        let online = detect_bundles(&sections, &rules, Scope::Campus(Campus::Online));
        assert_eq!(online.bundles.len(), 1);
        let center = detect_bundles(&sections, &rules, Scope::Campus(Campus::Center));
        assert!(center.bundles.is_empty());
    }

    #[test]
    fn linked_sequence_in_person() {
        let mut first = in_room(section(0, "ENGL-2410-C01"), 30);
        first.days = "TTH".to_string();
        let mut other_room = in_room(section(1, "ENGL-2420-C01"), 30);
        other_room.room = "200".to_string();
        other_room.days = "TTH".to_string();
        let mut second = in_room(section(2, "ENGL-2420-C05"), 30);
        second.days = "TTH".to_string();
        let d = detect_bundles(
            &[first, other_room, second],
            &SelectionRules::default(),
            Scope::Sheet,
        );
        assert_eq!(d.bundles.len(), 1);
        assert_eq!(d.bundles[0].kind, BundleKind::PairedSplit);
        assert_eq!(d.bundles[0].sections, vec![0, 2]);
    }

    #[test]
    fn linked_sequence_online() {
        let sections = vec![
            section(0, "ENGL-2410-O01"),
            section(1, "ENGL-2420-O04"),
            section(2, "ENGL-2420-O02"),
        ];
        let d = detect_bundles(&sections, &SelectionRules::default(), Scope::Sheet);
        assert_eq!(d.bundles.len(), 1);
        assert_eq!(d.bundles[0].sections, vec![0, 2]);
    }

    #[test]
    fn online_satellite_pairs() {
        let mut big = section(3, "ENGL-1181-O04");
        big.capacity = 28;
        let sections = vec![
            section(0, "ENGL-1181-O01"),
            section(1, "ENGL-1181-O02"),
            section(2, "ENGL-1181-O03"),
            big,
        ];
        let rules = SelectionRules::default();
        let d = detect_bundles(&sections, &rules, Scope::Sheet);
        assert_eq!(d.bundles.len(), 1);
        assert_eq!(d.bundles[0].kind, BundleKind::PairedOnlineLowCapacity);
        assert_eq!(d.bundles[0].sections, vec![0, 1]);
        assert_eq!(
            messages(&d, 0),
            vec!["Appears bundled with in-person ENGL 1170 - please verify".to_string()]
        );
        assert_eq!(messages(&d, 2).len(), 1);
        assert!(messages(&d, 3).is_empty());

        let south = detect_bundles(&sections, &rules, Scope::Campus(Campus::South));
        assert!(south.bundles.is_empty());
    }

    #[test]
    fn ids_are_sequential_and_exclusive() {
        let sections = vec![
            in_room(section(0, "ENGL-1170-C01"), 8),
            in_room(section(1, "ENGL-1181-C02"), 20),
            in_room(section(2, "ENGL-1181-C03"), 22),
            section(3, "ENGL-2410-O01"),
            section(4, "ENGL-2420-O02"),
            section(5, "ENGL-1181-O05"),
            section(6, "ENGL-1181-O06"),
        ];
        let rules = SelectionRules::default();
        let d = detect_bundles(&sections, &rules, Scope::Sheet);
        let ids: Vec<&str> = d.bundles.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["Bundle-01", "Bundle-02", "Bundle-03"]);
        let mut members: Vec<SectionId> =
            d.bundles.iter().flat_map(|b| b.sections.clone()).collect();
        let count = members.len();
        members.sort_unstable();
        members.dedup();
        assert_eq!(members.len(), count);
        assert_eq!(d.bundle_index(4), Some(1));

        assert_eq!(detect_bundles(&sections, &rules, Scope::Sheet), d);
    }
}

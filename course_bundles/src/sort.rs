//! Display order of the sections.

use std::cmp::Ordering;

use crate::config::*;

fn mode_rank(mode: Mode) -> u32 {
    match mode {
        Mode::Online => 0,
        Mode::Hybrid => 1,
        Mode::Remote => 2,
        Mode::InPerson => 3,
        Mode::Unknown => 99,
    }
}

/// Position of a course within its bundle: satellite sections are listed
/// before their anchor, and the first course of a sequence before the second.
fn member_rank(course: &str, catalog: &CourseCatalog) -> u32 {
    if course == catalog.anchor || course == catalog.sequence_second {
        1
    } else {
        0
    }
}

fn compare_sections(
    a: &Section,
    b: &Section,
    bundle_a: Option<usize>,
    bundle_b: Option<usize>,
    catalog: &CourseCatalog,
) -> Ordering {
    match (bundle_a, bundle_b) {
        (Some(x), Some(y)) => x
            .cmp(&y)
            .then_with(|| member_rank(&a.course, catalog).cmp(&member_rank(&b.course, catalog)))
            .then_with(|| a.id.cmp(&b.id)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => mode_rank(a.mode)
            .cmp(&mode_rank(b.mode))
            .then_with(|| a.weeks.cmp(&b.weeks))
            .then_with(|| a.course.cmp(&b.course))
            .then_with(|| a.section.cmp(&b.section)),
    }
}

/// Sorts the sections for display.
///
/// Bundled sections come first, grouped by bundle in detection order. The
/// other sections are ordered by mode (online first), weeks, course and
/// section code. Ties keep their input order.
pub fn sort_sections(
    mut sections: Vec<Section>,
    bundles: &[Bundle],
    catalog: &CourseCatalog,
) -> Vec<Section> {
    let bundle_of = |id: SectionId| bundles.iter().position(|b| b.contains(id));
    sections.sort_by(|a, b| compare_sections(a, b, bundle_of(a.id), bundle_of(b.id), catalog));
    sections
}

//! Tool selection for web escalation

use crate::tools::ToolId;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ACADEMIC_INTENT: Regex = Regex::new(
        r"(?i)\b(papers?|stud(y|ies)|arxiv|preprints?|research|journals?|publications?|peer[- ]reviewed|survey|article scientifique|recherche|étude)\b"
    )
    .unwrap();
}

/// Whether the query asks for scholarly material
pub fn has_academic_intent(query: &str) -> bool {
    ACADEMIC_INTENT.is_match(query)
}

/// Ordered tools to try for this query at this escalation attempt.
///
/// Pure: the same `(query, prior_attempts)` always yields the same order.
/// The encyclopedia is always last; the first attempt skips the preprint
/// server unless the query is academic.
pub fn select_tools(query: &str, prior_attempts: u32) -> Vec<ToolId> {
    let academic = has_academic_intent(query);

    match (prior_attempts, academic) {
        (_, true) => vec![
            ToolId::AcademicPreprint,
            ToolId::GeneralWebSearch,
            ToolId::Encyclopedia,
        ],
        (0, false) => vec![ToolId::GeneralWebSearch, ToolId::Encyclopedia],
        (_, false) => vec![
            ToolId::GeneralWebSearch,
            ToolId::AcademicPreprint,
            ToolId::Encyclopedia,
        ],
    }
}

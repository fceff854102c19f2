//! JSON output formatter

use agentrag_core::{RunOutcome, TextFragment};
use serde::Serialize;

fn pretty<T: Serialize + ?Sized>(value: &T, fallback: &str) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| fallback.to_string()) + "\n"
}

pub fn format_outcome(outcome: &RunOutcome) -> String {
    pretty(outcome, "{}")
}

pub fn format_fragments(fragments: &[TextFragment]) -> String {
    pretty(fragments, "[]")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragments_are_json_array() {
        let fragments = vec![TextFragment::local("Agents plan.", "post", 0.8)];
        let value: serde_json::Value = serde_json::from_str(&format_fragments(&fragments)).unwrap();
        assert_eq!(value[0]["source_id"], "post");
        assert_eq!(value[0]["origin"], "local");
    }

    #[test]
    fn test_empty_fragments() {
        assert_eq!(format_fragments(&[]).trim(), "[]");
    }
}

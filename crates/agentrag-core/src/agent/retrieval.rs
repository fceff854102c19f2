//! Local retrieval step

use super::state::TextFragment;
use crate::index::Retriever;

/// Trim and collapse internal whitespace
pub fn normalize_query(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Query the index and shape hits into local fragments.
///
/// Hits under `min_similarity` are dropped. An index failure is logged and
/// yields no fragments, which the grader reads as insufficient.
pub async fn retrieve_local(
    retriever: &dyn Retriever,
    query: &str,
    top_k: usize,
    min_similarity: f32,
) -> Vec<TextFragment> {
    let query = normalize_query(query);
    if query.is_empty() {
        return Vec::new();
    }

    let hits = match retriever.retrieve(&query, top_k).await {
        Ok(hits) => hits,
        Err(e) => {
            tracing::warn!("Local retrieval failed, continuing without corpus: {}", e);
            return Vec::new();
        }
    };

    let total = hits.len();
    let fragments: Vec<TextFragment> = hits
        .into_iter()
        .filter(|hit| hit.score >= min_similarity)
        .map(|hit| {
            let source_id = hit.chunk.id();
            TextFragment::local(hit.chunk.text, source_id, hit.score)
        })
        .collect();

    tracing::debug!(
        "Retrieved {} local fragment(s), {} under the {:.2} floor",
        fragments.len(),
        total - fragments.len(),
        min_similarity
    );

    fragments
}

//! Okapi BM25 keyword scoring over chunk text

use std::cmp::Ordering;
use std::collections::HashMap;

const K1: f32 = 1.5;
const B: f32 = 0.75;

/// Lowercased alphanumeric terms
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Inverted index over a fixed list of documents
#[derive(Debug, Default)]
pub struct Bm25Index {
    /// term -> (document, term frequency), documents ascending
    postings: HashMap<String, Vec<(usize, u32)>>,
    doc_lengths: Vec<u32>,
    avg_length: f32,
}

impl Bm25Index {
    pub fn build<'a>(texts: impl IntoIterator<Item = &'a str>) -> Self {
        let mut postings: HashMap<String, Vec<(usize, u32)>> = HashMap::new();
        let mut doc_lengths = Vec::new();

        for (doc, text) in texts.into_iter().enumerate() {
            let tokens = tokenize(text);
            doc_lengths.push(tokens.len() as u32);

            let mut counts: HashMap<String, u32> = HashMap::new();
            for token in tokens {
                *counts.entry(token).or_default() += 1;
            }
            for (term, tf) in counts {
                postings.entry(term).or_default().push((doc, tf));
            }
        }

        let total: u64 = doc_lengths.iter().map(|&len| len as u64).sum();
        let avg_length = if doc_lengths.is_empty() {
            0.0
        } else {
            total as f32 / doc_lengths.len() as f32
        };

        Self {
            postings,
            doc_lengths,
            avg_length,
        }
    }

    pub fn len(&self) -> usize {
        self.doc_lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_lengths.is_empty()
    }

    /// Documents sharing at least one term with `query`, best first.
    /// Equal scores keep document order.
    pub fn search(&self, query: &str) -> Vec<(usize, f32)> {
        let n = self.doc_lengths.len() as f32;
        let mut terms = tokenize(query);
        terms.sort_unstable();
        terms.dedup();

        let mut scores: HashMap<usize, f32> = HashMap::new();
        for term in &terms {
            let Some(postings) = self.postings.get(term) else {
                continue;
            };

            let df = postings.len() as f32;
            let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();

            for &(doc, tf) in postings {
                let tf = tf as f32;
                let length_ratio = if self.avg_length > 0.0 {
                    self.doc_lengths[doc] as f32 / self.avg_length
                } else {
                    1.0
                };
                *scores.entry(doc).or_default() +=
                    idf * tf * (K1 + 1.0) / (tf + K1 * (1.0 - B + B * length_ratio));
            }
        }

        let mut ranked: Vec<(usize, f32)> = scores.into_iter().collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("Chain-of-Thought, step 2!"),
            vec!["chain", "of", "thought", "step", "2"]
        );
        assert!(tokenize(" ... ").is_empty());
    }

    #[test]
    fn test_rare_term_outweighs_common_term() {
        let index = Bm25Index::build([
            "agents use tools",
            "agents plan tasks",
            "agents reflect with reflexion",
        ]);

        let ranked = index.search("agents reflexion");
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].0, 2);
    }

    #[test]
    fn test_no_shared_terms_is_empty() {
        let index = Bm25Index::build(["alpha beta", "gamma"]);
        assert!(index.search("delta").is_empty());
        assert!(index.search("").is_empty());
    }

    #[test]
    fn test_equal_scores_keep_document_order() {
        let index = Bm25Index::build(["memory notes", "other", "memory notes"]);
        let ranked = index.search("memory");
        let docs: Vec<usize> = ranked.iter().map(|(doc, _)| *doc).collect();
        assert_eq!(docs, vec![0, 2]);
    }

    #[test]
    fn test_empty_index() {
        let index = Bm25Index::build(Vec::<&str>::new());
        assert!(index.is_empty());
        assert!(index.search("anything").is_empty());
    }
}

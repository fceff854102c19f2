//! HNSW approximate nearest neighbor pre-selection

use super::cosine_similarity;
use instant_distance::{Builder, HnswMap, Search};

/// Minimum embedding count to justify building an ANN index.
/// Below this threshold, brute-force is fast enough.
pub const ANN_THRESHOLD: usize = 1000;

#[derive(Clone)]
struct EmbeddingPoint {
    values: Vec<f32>,
}

impl instant_distance::Point for EmbeddingPoint {
    fn distance(&self, other: &Self) -> f32 {
        1.0 - cosine_similarity(&self.values, &other.values)
    }
}

/// HNSW map from embedding to chunk position, built once
pub struct AnnIndex {
    map: Option<HnswMap<EmbeddingPoint, usize>>,
    count: usize,
}

impl AnnIndex {
    /// Build over `embeddings`, keyed by their position.
    /// Skips building if fewer than ANN_THRESHOLD embeddings.
    pub fn build(embeddings: &[Vec<f32>]) -> Self {
        let count = embeddings.len();
        if count < ANN_THRESHOLD {
            tracing::debug!(
                "Skipping ANN index build: {} embeddings < {} threshold",
                count,
                ANN_THRESHOLD
            );
            return Self { map: None, count };
        }

        let points: Vec<EmbeddingPoint> = embeddings
            .iter()
            .map(|values| EmbeddingPoint {
                values: values.clone(),
            })
            .collect();
        let keys: Vec<usize> = (0..count).collect();

        let map = Builder::default().build(points, keys);
        tracing::info!("Built ANN index with {} embeddings", count);

        Self {
            map: Some(map),
            count,
        }
    }

    /// Positions of (approximately) the `k` nearest embeddings.
    /// Returns empty vec if the index was not built.
    pub fn candidates(&self, query: &[f32], k: usize) -> Vec<usize> {
        let Some(map) = self.map.as_ref() else {
            return Vec::new();
        };

        let query_point = EmbeddingPoint {
            values: query.to_vec(),
        };
        let mut search = Search::default();

        map.search(&query_point, &mut search)
            .take(k)
            .map(|item| *item.value)
            .collect()
    }

    pub fn is_built(&self) -> bool {
        self.map.is_some()
    }

    /// Number of embeddings seen (even if the index wasn't built)
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embeddings(count: usize) -> Vec<Vec<f32>> {
        (0..count)
            .map(|i| {
                let x = i as f32;
                vec![x.sin(), x.cos(), (x * 0.5).sin(), (x * 0.5).cos()]
            })
            .collect()
    }

    #[test]
    fn test_build_below_threshold() {
        let ann = AnnIndex::build(&embeddings(10));
        assert!(!ann.is_built());
        assert_eq!(ann.len(), 10);
        assert!(ann.candidates(&[0.5, 0.5, 0.5, 0.5], 5).is_empty());
    }

    #[test]
    fn test_build_and_search() {
        let ann = AnnIndex::build(&embeddings(ANN_THRESHOLD + 10));
        assert!(ann.is_built());
        assert_eq!(ann.len(), ANN_THRESHOLD + 10);

        let found = ann.candidates(&[1.0, 0.0, 0.5, 0.5], 5);
        assert_eq!(found.len(), 5);
        assert!(found.iter().all(|&i| i < ANN_THRESHOLD + 10));
    }

    #[test]
    fn test_empty_index() {
        let ann = AnnIndex::build(&[]);
        assert!(ann.is_empty());
        assert!(ann.candidates(&[1.0, 0.0], 5).is_empty());
    }
}

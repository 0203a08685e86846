// In-process cosine-similarity vector index with JSON snapshot persistence.

use crate::rag::types::ScoredMatch;
use crate::rag::{RagError, RagResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// One vector to store, with the chunk text it represents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: String,
    pub vector: Vec<f32>,
    pub text: String,
}

/// Vector index operations used by the query pipeline.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert vectors, replacing any entry that shares an id.
    async fn upsert(&self, entries: Vec<IndexEntry>) -> RagResult<()>;

    /// Return up to `top_k` entries by descending cosine similarity.
    async fn query(&self, vector: &[f32], top_k: usize) -> RagResult<Vec<ScoredMatch>>;

    /// Number of stored vectors.
    async fn len(&self) -> usize;
}

#[derive(Debug, Serialize, Deserialize)]
struct IndexData {
    entries: Vec<IndexEntry>,
    saved_at: DateTime<Utc>,
    #[serde(skip)]
    by_id: HashMap<String, usize>,
}

impl Default for IndexData {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            saved_at: Utc::now(),
            by_id: HashMap::new(),
        }
    }
}

impl IndexData {
    fn rebuild_id_map(&mut self) {
        self.by_id = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id.clone(), i))
            .collect();
    }
}

/// In-memory index that snapshots itself to a JSON file after writes.
///
/// Vectors are L2-normalized on insert, so the inner product of stored
/// vectors and a normalized query is their cosine similarity.
pub struct MemoryVectorIndex {
    name: String,
    dimension: usize,
    snapshot_path: PathBuf,
    inner: RwLock<IndexData>,
}

impl MemoryVectorIndex {
    /// Open an index, loading a previous snapshot when one exists.
    pub async fn open(data_dir: &Path, name: &str, dimension: usize) -> RagResult<Self> {
        let snapshot_path = data_dir.join(format!("{}.index.json", name));

        let mut data = if snapshot_path.exists() {
            let raw = tokio::fs::read(&snapshot_path)
                .await
                .map_err(|e| RagError::Index(format!("failed to read snapshot: {}", e)))?;
            serde_json::from_slice::<IndexData>(&raw)
                .map_err(|e| RagError::Index(format!("corrupt snapshot {:?}: {}", snapshot_path, e)))?
        } else {
            IndexData::default()
        };
        data.rebuild_id_map();

        if let Some(entry) = data.entries.iter().find(|e| e.vector.len() != dimension) {
            return Err(RagError::Index(format!(
                "snapshot vector {} has dimension {}, index expects {}",
                entry.id,
                entry.vector.len(),
                dimension
            )));
        }

        tracing::debug!(
            index = %name,
            vectors = data.entries.len(),
            "opened vector index"
        );

        Ok(Self {
            name: name.to_string(),
            dimension,
            snapshot_path,
            inner: RwLock::new(data),
        })
    }

    async fn save(&self, data: &IndexData) -> RagResult<()> {
        if let Some(parent) = self.snapshot_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| RagError::Index(format!("failed to create data dir: {}", e)))?;
        }
        let raw = serde_json::to_vec(data)
            .map_err(|e| RagError::Index(format!("failed to encode snapshot: {}", e)))?;
        tokio::fs::write(&self.snapshot_path, raw)
            .await
            .map_err(|e| RagError::Index(format!("failed to write snapshot: {}", e)))?;
        Ok(())
    }

    fn check_dimension(&self, vector: &[f32], context: &str) -> RagResult<()> {
        if vector.len() != self.dimension {
            return Err(RagError::Index(format!(
                "{} vector has dimension {}, index expects {}",
                context,
                vector.len(),
                self.dimension
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl VectorIndex for MemoryVectorIndex {
    async fn upsert(&self, entries: Vec<IndexEntry>) -> RagResult<()> {
        if entries.is_empty() {
            return Ok(());
        }
        for entry in &entries {
            self.check_dimension(&entry.vector, "upserted")?;
        }

        let mut data = self.inner.write().await;
        data.saved_at = Utc::now();
        for mut entry in entries {
            normalize(&mut entry.vector);
            match data.by_id.get(&entry.id).copied() {
                Some(pos) => data.entries[pos] = entry,
                None => {
                    let pos = data.entries.len();
                    data.by_id.insert(entry.id.clone(), pos);
                    data.entries.push(entry);
                }
            }
        }

        self.save(&data).await
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> RagResult<Vec<ScoredMatch>> {
        self.check_dimension(vector, "query")?;

        let data = self.inner.read().await;
        if data.entries.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let mut query = vector.to_vec();
        normalize(&mut query);

        let mut matches: Vec<ScoredMatch> = data
            .entries
            .iter()
            .map(|entry| ScoredMatch {
                id: entry.id.clone(),
                score: dot(&entry.vector, &query),
                text: entry.text.clone(),
            })
            .collect();

        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(top_k);
        Ok(matches)
    }

    async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }
}

fn normalize(vector: &mut [f32]) {
    let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if magnitude > 0.0 {
        for value in vector.iter_mut() {
            *value /= magnitude;
        }
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(id: &str, vector: Vec<f32>, text: &str) -> IndexEntry {
        IndexEntry {
            id: id.to_string(),
            vector,
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn query_orders_by_cosine_similarity() {
        let dir = TempDir::new().unwrap();
        let index = MemoryVectorIndex::open(dir.path(), "t", 3).await.unwrap();

        index
            .upsert(vec![
                entry("a", vec![1.0, 0.0, 0.0], "east"),
                entry("b", vec![0.0, 1.0, 0.0], "north"),
                entry("c", vec![10.0, 1.0, 0.0], "mostly east"),
            ])
            .await
            .unwrap();

        let matches = index.query(&[1.0, 0.0, 0.0], 2).await.unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].id, "a");
        assert_eq!(matches[1].id, "c");
        assert!(matches[0].score > matches[1].score);
        assert!((matches[0].score - 1.0).abs() < 1e-6);
        assert_eq!(matches[0].text, "east");
    }

    #[tokio::test]
    async fn magnitude_does_not_affect_similarity() {
        let dir = TempDir::new().unwrap();
        let index = MemoryVectorIndex::open(dir.path(), "t", 2).await.unwrap();

        index
            .upsert(vec![
                entry("small", vec![0.1, 0.0], "x"),
                entry("large", vec![100.0, 0.0], "y"),
            ])
            .await
            .unwrap();

        let matches = index.query(&[1.0, 0.0], 2).await.unwrap();
        assert!((matches[0].score - matches[1].score).abs() < 1e-6);
    }

    #[tokio::test]
    async fn upsert_replaces_existing_id() {
        let dir = TempDir::new().unwrap();
        let index = MemoryVectorIndex::open(dir.path(), "t", 2).await.unwrap();

        index
            .upsert(vec![entry("a", vec![1.0, 0.0], "old")])
            .await
            .unwrap();
        index
            .upsert(vec![entry("a", vec![0.0, 1.0], "new")])
            .await
            .unwrap();

        assert_eq!(index.len().await, 1);
        let matches = index.query(&[0.0, 1.0], 1).await.unwrap();
        assert_eq!(matches[0].text, "new");
        assert!((matches[0].score - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn dimension_mismatch_is_an_error() {
        let dir = TempDir::new().unwrap();
        let index = MemoryVectorIndex::open(dir.path(), "t", 3).await.unwrap();

        let err = index
            .upsert(vec![entry("a", vec![1.0, 0.0], "short")])
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::Index(_)));

        let err = index.query(&[1.0], 5).await.unwrap_err();
        assert!(matches!(err, RagError::Index(_)));
    }

    #[tokio::test]
    async fn snapshot_round_trips_through_disk() {
        let dir = TempDir::new().unwrap();
        {
            let index = MemoryVectorIndex::open(dir.path(), "persist", 2)
                .await
                .unwrap();
            index
                .upsert(vec![
                    entry("a", vec![1.0, 0.0], "alpha"),
                    entry("b", vec![0.0, 1.0], "beta"),
                ])
                .await
                .unwrap();
        }

        let reopened = MemoryVectorIndex::open(dir.path(), "persist", 2)
            .await
            .unwrap();
        assert_eq!(reopened.len().await, 2);
        let matches = reopened.query(&[0.0, 1.0], 1).await.unwrap();
        assert_eq!(matches[0].id, "b");
        assert_eq!(matches[0].text, "beta");
    }

    #[tokio::test]
    async fn empty_index_returns_no_matches() {
        let dir = TempDir::new().unwrap();
        let index = MemoryVectorIndex::open(dir.path(), "t", 2).await.unwrap();
        assert!(index.query(&[1.0, 0.0], 5).await.unwrap().is_empty());
    }
}

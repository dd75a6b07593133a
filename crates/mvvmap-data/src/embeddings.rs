use std::path::Path;

use indexmap::IndexMap;
use mvvmap_layout::{Entity, TextFeatures};

use crate::error::{Error, Result};
use crate::profile::CompanyProfile;

/// Embedding vectors keyed by profile id, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbeddingIndex {
    vectors: IndexMap<String, Vec<f64>>,
}

impl EmbeddingIndex {
    /// Parses a JSON object of `id -> [f64, ...]`. Empty vectors are rejected.
    pub fn from_json(text: &str) -> Result<Self> {
        let vectors: IndexMap<String, Vec<f64>> = serde_json::from_str(text)?;
        if let Some((id, _)) = vectors.iter().find(|(_, v)| v.is_empty()) {
            return Err(Error::EmptyEmbedding { id: id.clone() });
        }
        Ok(Self { vectors })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_json(&text)
    }

    pub fn get(&self, id: &str) -> Option<&[f64]> {
        self.vectors.get(id).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

/// Layout entities for `profiles`, in profile order. Profiles without an indexed embedding keep
/// `embedding: None` and are filtered out by the layout pipeline.
pub fn to_entities(profiles: &[CompanyProfile], index: &EmbeddingIndex) -> Vec<Entity> {
    let entities: Vec<Entity> = profiles
        .iter()
        .map(|p| Entity {
            id: p.id.clone(),
            name: p.name.clone(),
            category: Some(p.category.clone()).filter(|c| !c.trim().is_empty()),
            embedding: index.get(&p.id).map(<[f64]>::to_vec),
        })
        .collect();
    let missing = entities.iter().filter(|e| e.embedding.is_none()).count();
    if missing > 0 {
        tracing::warn!(missing, total = entities.len(), "profiles without an embedding");
    }
    entities
}

pub fn text_features(profiles: &[CompanyProfile]) -> Vec<TextFeatures> {
    profiles.iter().map(CompanyProfile::text_features).collect()
}

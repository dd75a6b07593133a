use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Category label used for entities that carry no (or a blank) category.
pub const UNCLASSIFIED: &str = "Unclassified";

/// An organization fed into the layout pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub embedding: Option<Vec<f64>>,
}

impl Entity {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: None,
            embedding: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_embedding(mut self, embedding: Vec<f64>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Category with blanks folded into [`UNCLASSIFIED`].
    pub fn category_or_default(&self) -> &str {
        match self.category.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => c,
            _ => UNCLASSIFIED,
        }
    }

    pub fn has_embedding(&self) -> bool {
        self.embedding.as_ref().is_some_and(|e| !e.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A laid-out entity, as handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub id: String,
    pub name: String,
    pub category: String,
    pub x: f64,
    pub y: f64,
    pub uniqueness_score: f64,
    pub cluster_id: usize,
}

impl Position {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterGroup {
    pub id: usize,
    pub category: String,
    pub centroid_x: f64,
    pub centroid_y: f64,
    pub color: String,
    pub member_ids: IndexSet<String>,
}

/// Output of one pipeline invocation. Immutable once returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapLayout {
    pub positions: Vec<Position>,
    pub clusters: Vec<ClusterGroup>,
    /// Set when relaxation collapsed and the circular placement was used instead.
    pub fallback_applied: bool,
}

impl MapLayout {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn position(&self, id: &str) -> Option<&Position> {
        self.positions.iter().find(|p| p.id == id)
    }

    pub fn cluster(&self, id: usize) -> Option<&ClusterGroup> {
        self.clusters.iter().find(|c| c.id == id)
    }
}

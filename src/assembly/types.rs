use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicWeight {
    pub topic_id: String,
    pub weight: f64,
}

impl TopicWeight {
    pub fn new(topic_id: impl Into<String>, weight: f64) -> Self {
        Self {
            topic_id: topic_id.into(),
            weight,
        }
    }
}

/// Editorial target distribution for a form. Weights are proportions and are
/// kept in input order, which is the tie-break order everywhere downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blueprint {
    pub id: String,
    pub weights: Vec<TopicWeight>,
}

impl Blueprint {
    pub fn new(id: impl Into<String>, weights: Vec<TopicWeight>) -> Self {
        Self {
            id: id.into(),
            weights,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum ItemStatus {
    #[default]
    Draft,
    Review,
    Published,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Review => "review",
            Self::Published => "published",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPoolEntry {
    pub id: String,
    pub topics: BTreeSet<String>,
    #[serde(default)]
    pub status: ItemStatus,
}

impl ItemPoolEntry {
    pub fn new<I, S>(id: impl Into<String>, topics: I, status: ItemStatus) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            topics: topics.into_iter().map(Into::into).collect(),
            status,
        }
    }

    pub fn covers(&self, topic_id: &str) -> bool {
        self.topics.contains(topic_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicTarget {
    pub topic_id: String,
    pub required: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicCoverage {
    pub topic_id: String,
    pub required: usize,
    pub delivered: usize,
    pub available: usize,
}

/// Which slice of the pool a form was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolScope {
    PublishedOnly,
    FullPool,
    BestEffort,
}

impl PoolScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PublishedOnly => "published_only",
            Self::FullPool => "full_pool",
            Self::BestEffort => "best_effort",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormRequest {
    pub blueprint: Blueprint,
    pub pool: Vec<ItemPoolEntry>,
    pub length: usize,
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_prefer_published")]
    pub prefer_published_only: bool,
}

fn default_prefer_published() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamForm {
    pub id: String,
    pub blueprint_id: String,
    pub length: usize,
    pub seed: u64,
    pub items: Vec<String>,
    pub coverage: Vec<TopicCoverage>,
    pub warnings: Vec<String>,
    pub scope: PoolScope,
    /// Set when even the full pool could not satisfy the blueprint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deficits: Option<Vec<String>>,
}

impl ExamForm {
    pub fn is_feasible(&self) -> bool {
        self.deficits.is_none()
    }

    /// Turns a best-effort form into an error for callers that treat
    /// infeasibility as fatal.
    pub fn into_strict(self) -> Result<Self, AssemblyError> {
        match self.deficits {
            Some(deficits) => Err(AssemblyError::Infeasible { deficits }),
            None => Ok(self),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssemblyError {
    #[error("form length must be a positive integer, got {0}")]
    InvalidLength(usize),
    #[error("blueprint has no topic weights")]
    EmptyBlueprint,
    #[error("malformed blueprint: {0}")]
    MalformedBlueprint(String),
    #[error("item pool cannot satisfy blueprint: {}", deficits.join("; "))]
    Infeasible { deficits: Vec<String> },
}

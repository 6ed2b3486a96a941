//! Content intelligence: what stage 4 (content analysis) and stage 5
//! (intelligence/embedding) derive from a tool result.

use serde::{Deserialize, Serialize};

/// The inferred shape of a tool result's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Text,
    Code,
    Json,
    Html,
    Markdown,
    ApiResponse,
    Documentation,
    Unknown,
}

impl Default for ContentType {
    fn default() -> Self {
        ContentType::Unknown
    }
}

/// A sensitivity tier. Ordered: `Public < Internal < Confidential < Restricted`,
/// and classification is always the maximum over every rule that matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataClassification {
    Public,
    Internal,
    Confidential,
    Restricted,
}

impl Default for DataClassification {
    fn default() -> Self {
        DataClassification::Public
    }
}

/// What stage 4 hands to the gating function and to stage 5. This is the
/// `ContentAnalysis` the `ContentAnalyzer` capability returns, not the final
/// persisted intelligence record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentAnalysis {
    pub content_type: ContentType,
    pub size: usize,
    pub has_pii: bool,
    pub has_secrets: bool,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub entity_type: String,
    pub value: String,
    /// `[0, 1]`
    pub confidence: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub name: String,
    pub score: f32,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sentiment {
    /// `[-1, 1]`
    pub polarity: f32,
    /// `[0, 1]`
    pub subjectivity: f32,
    /// `[0, 1]`
    pub confidence: f32,
}

/// The combined intelligence record attached to a response and persisted
/// alongside the execution history row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntelligenceMetadata {
    pub content_type: ContentType,
    pub entities: Vec<Entity>,
    pub topics: Vec<Topic>,
    pub keywords: Vec<String>,
    pub summary: Option<String>,
    pub sentiment: Option<Sentiment>,
    pub language: Option<String>,
    pub classification: DataClassification,
}

impl IntelligenceMetadata {
    /// The minimal default synthesised when a non-fatal stage fails.
    pub fn minimal(content_type: ContentType) -> Self {
        Self {
            content_type,
            ..Default::default()
        }
    }

    pub fn from_analysis(analysis: &ContentAnalysis, classification: DataClassification) -> Self {
        Self {
            content_type: analysis.content_type,
            language: analysis.language.clone(),
            classification,
            ..Default::default()
        }
    }
}

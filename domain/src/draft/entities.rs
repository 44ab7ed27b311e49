//! Draft entities

use crate::core::error::DomainError;
use crate::core::ids::DraftId;
use crate::core::text;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_TONE: &str = "professional";
pub const DEFAULT_TARGET_LENGTH: usize = 800;

/// Metadata key carrying the content category (e.g. "health", "finance")
const CATEGORY_KEY: &str = "category";

/// A request for content, as submitted by the caller of `start_workflow`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftRequest {
    pub topic: String,
    pub keywords: Vec<String>,
    pub tone: String,
    /// Target length in words
    pub target_length: usize,
    /// Forwarded verbatim to every draft version
    pub metadata: BTreeMap<String, String>,
}

impl DraftRequest {
    pub fn new(topic: impl Into<String>, keywords: Vec<String>) -> Result<Self, DomainError> {
        let topic = topic.into();
        if topic.trim().is_empty() {
            return Err(DomainError::InvalidRequest(
                "topic cannot be empty".to_string(),
            ));
        }
        let keywords = keywords
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        Ok(Self {
            topic,
            keywords,
            tone: DEFAULT_TONE.to_string(),
            target_length: DEFAULT_TARGET_LENGTH,
            metadata: BTreeMap::new(),
        })
    }

    pub fn with_tone(mut self, tone: impl Into<String>) -> Self {
        self.tone = tone.into();
        self
    }

    pub fn with_target_length(mut self, words: usize) -> Self {
        self.target_length = words;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_category(self, category: impl Into<String>) -> Self {
        self.with_metadata(CATEGORY_KEY, category)
    }

    pub fn category(&self) -> Option<&str> {
        self.metadata.get(CATEGORY_KEY).map(String::as_str)
    }
}

/// Raw generated content returned by a draft generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftContent {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub meta_description: Option<String>,
}

impl DraftContent {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            meta_description: None,
        }
    }

    pub fn with_meta_description(mut self, meta: impl Into<String>) -> Self {
        self.meta_description = Some(meta.into());
        self
    }
}

/// One immutable, versioned unit of content under review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentDraft {
    draft_id: DraftId,
    version: u32,
    title: String,
    body: String,
    meta_description: Option<String>,
    keywords: Vec<String>,
    metadata: BTreeMap<String, String>,
    created_by: String,
    created_at: DateTime<Utc>,
    /// Combined reviewer feedback this version was written against
    feedback_applied: Option<String>,
}

impl ContentDraft {
    /// First version of a workflow's content
    pub fn initial(
        request: &DraftRequest,
        content: DraftContent,
        created_by: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            draft_id: DraftId::generate(),
            version: 1,
            title: content.title,
            body: content.body,
            meta_description: content.meta_description,
            keywords: request.keywords.clone(),
            metadata: request.metadata.clone(),
            created_by: created_by.into(),
            created_at,
            feedback_applied: None,
        }
    }

    /// Next version, carrying over keywords and metadata
    pub fn revise(
        &self,
        content: DraftContent,
        created_by: impl Into<String>,
        feedback: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            draft_id: DraftId::generate(),
            version: self.version + 1,
            title: content.title,
            body: content.body,
            meta_description: content.meta_description,
            keywords: self.keywords.clone(),
            metadata: self.metadata.clone(),
            created_by: created_by.into(),
            created_at,
            feedback_applied: Some(feedback.into()),
        }
    }

    pub fn draft_id(&self) -> &DraftId {
        &self.draft_id
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn meta_description(&self) -> Option<&str> {
        self.meta_description.as_deref()
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    pub fn category(&self) -> Option<&str> {
        self.metadata.get(CATEGORY_KEY).map(String::as_str)
    }

    pub fn created_by(&self) -> &str {
        &self.created_by
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn feedback_applied(&self) -> Option<&str> {
        self.feedback_applied.as_deref()
    }

    pub fn word_count(&self) -> usize {
        text::word_count(&self.body)
    }

    /// Title, meta description and body joined for whole-document scans
    pub fn full_text(&self) -> String {
        let mut out = String::with_capacity(self.title.len() + self.body.len() + 256);
        out.push_str(&self.title);
        out.push('\n');
        if let Some(meta) = &self.meta_description {
            out.push_str(meta);
            out.push('\n');
        }
        out.push_str(&self.body);
        out
    }
}

//! Content classification pre-check.
//!
//! Classifiers are external. This module only defines the seam and the fail-closed
//! interpretation of their answers.

use async_trait::async_trait;
use photoguard_core::AppError;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModerationVerdict {
    pub safe: bool,
    /// Per-category scores in `[0, 1]`, as reported by the classifier.
    pub scores: BTreeMap<String, f32>,
}

impl ModerationVerdict {
    pub fn safe() -> Self {
        Self {
            safe: true,
            scores: BTreeMap::new(),
        }
    }

    pub fn unsafe_with(category: &str, score: f32) -> Self {
        let mut scores = BTreeMap::new();
        scores.insert(category.to_string(), score);
        Self {
            safe: false,
            scores,
        }
    }

    /// Category with the highest score.
    pub fn top_category(&self) -> Option<(&str, f32)> {
        self.scores
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(k, v)| (k.as_str(), *v))
    }
}

#[async_trait]
pub trait ContentModerator: Send + Sync {
    async fn classify(&self, bytes: &[u8], content_type: &str)
        -> Result<ModerationVerdict, AppError>;
}

/// Run the classifier. Unsafe content and classifier failures both reject.
pub async fn check_content(
    moderator: &dyn ContentModerator,
    bytes: &[u8],
    content_type: &str,
) -> Result<(), AppError> {
    let verdict = match moderator.classify(bytes, content_type).await {
        Ok(verdict) => verdict,
        Err(e) => {
            tracing::warn!(error = %e, "Content classifier failed; rejecting upload");
            return Err(AppError::ContentRejected(
                "content could not be classified".to_string(),
            ));
        }
    };

    if verdict.safe {
        return Ok(());
    }

    let reason = match verdict.top_category() {
        Some((category, score)) => format!("flagged as {category} ({score:.2})"),
        None => "flagged as unsafe".to_string(),
    };
    tracing::info!(reason = %reason, "Upload rejected by content classifier");
    Err(AppError::ContentRejected(reason))
}

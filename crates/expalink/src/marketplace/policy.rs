use serde::{Deserialize, Serialize};

use super::completion::PLAN_COMPLETION_THRESHOLD;
use super::reviews::MIN_TESTIMONY_CHARS;
use super::verification::MAX_DOCUMENTS;

/// Tunable thresholds applied by the marketplace service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketplacePolicy {
    pub plan_completion_threshold: u8,
    pub max_verification_documents: usize,
    pub min_testimony_chars: usize,
}

impl Default for MarketplacePolicy {
    fn default() -> Self {
        Self {
            plan_completion_threshold: PLAN_COMPLETION_THRESHOLD,
            max_verification_documents: MAX_DOCUMENTS,
            min_testimony_chars: MIN_TESTIMONY_CHARS,
        }
    }
}

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{AccountId, ProfessionalId, Review, ReviewId, ReviewStatus, Unlock};

/// Author label shown for anonymous reviews.
pub const ANONYMOUS_AUTHOR: &str = "Anonymous expat";

pub const MIN_TESTIMONY_CHARS: usize = 20;

/// Review as submitted by an expat, before an id or status is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewDraft {
    pub professional_id: ProfessionalId,
    pub stars: u8,
    pub testimony: String,
    #[serde(default)]
    pub service_type: Option<String>,
    #[serde(default)]
    pub anonymous: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationDecision {
    Verify,
    Reject,
}

impl ModerationDecision {
    pub const fn target(self) -> ReviewStatus {
        match self {
            ModerationDecision::Verify => ReviewStatus::Verified,
            ModerationDecision::Reject => ReviewStatus::Rejected,
        }
    }
}

/// Pending and Verified reviews block another submission for the same pair.
pub fn is_active(review: &Review) -> bool {
    review.status != ReviewStatus::Rejected
}

/// Content checks independent of the unlock and existing-review state.
pub fn validate_draft(draft: &ReviewDraft, min_testimony_chars: usize) -> Result<(), ReviewError> {
    if !(1..=5).contains(&draft.stars) {
        return Err(ReviewError::InvalidRating { stars: draft.stars });
    }
    let length = draft.testimony.trim().chars().count();
    if length < min_testimony_chars {
        return Err(ReviewError::TestimonyTooShort {
            length,
            min: min_testimony_chars,
        });
    }
    Ok(())
}

/// Build a Pending review from a validated draft.
pub fn open_review(
    id: ReviewId,
    author: AccountId,
    draft: ReviewDraft,
    default_service_type: &str,
    now: DateTime<Utc>,
) -> Review {
    let service_type = draft
        .service_type
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default_service_type.to_string());

    Review {
        id,
        author_id: author,
        professional_id: draft.professional_id,
        stars: draft.stars,
        testimony: draft.testimony.trim().to_string(),
        service_type,
        anonymous: draft.anonymous,
        status: ReviewStatus::Pending,
        submitted_at: now,
        moderated_at: None,
    }
}

pub fn moderate(
    review: &mut Review,
    decision: ModerationDecision,
    now: DateTime<Utc>,
) -> Result<(), ReviewError> {
    if review.status != ReviewStatus::Pending {
        return Err(ReviewError::NotPending {
            status: review.status,
        });
    }
    review.status = decision.target();
    review.moderated_at = Some(now);
    Ok(())
}

/// Unlocked professionals the account has not yet reviewed (rejected reviews do not count).
pub fn awaiting_review(
    account: &AccountId,
    unlocks: &[Unlock],
    reviews: &[Review],
) -> Vec<ProfessionalId> {
    let reviewed: HashSet<&ProfessionalId> = reviews
        .iter()
        .filter(|review| &review.author_id == account && is_active(review))
        .map(|review| &review.professional_id)
        .collect();

    unlocks
        .iter()
        .filter(|unlock| &unlock.account_id == account)
        .filter(|unlock| !reviewed.contains(&unlock.professional_id))
        .map(|unlock| unlock.professional_id.clone())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RatingSummary {
    pub rating: Option<f32>,
    pub review_count: u32,
}

/// Mean stars over Verified reviews, rounded to one decimal.
pub fn summarize(reviews: &[Review]) -> RatingSummary {
    let stars: Vec<u32> = reviews
        .iter()
        .filter(|review| review.status == ReviewStatus::Verified)
        .map(|review| u32::from(review.stars))
        .collect();

    if stars.is_empty() {
        return RatingSummary::default();
    }

    let count = stars.len() as u32;
    let mean = stars.iter().sum::<u32>() as f32 / count as f32;
    RatingSummary {
        rating: Some((mean * 10.0).round() / 10.0),
        review_count: count,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicReview {
    pub id: ReviewId,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_id: Option<AccountId>,
    pub stars: u8,
    pub testimony: String,
    pub service_type: String,
    pub status: ReviewStatus,
    pub submitted_at: DateTime<Utc>,
}

impl PublicReview {
    fn from_review(review: &Review) -> Self {
        let (author, author_id) = if review.anonymous {
            (ANONYMOUS_AUTHOR.to_string(), None)
        } else {
            (review.author_id.0.clone(), Some(review.author_id.clone()))
        };
        Self {
            id: review.id.clone(),
            author,
            author_id,
            stars: review.stars,
            testimony: review.testimony.clone(),
            service_type: review.service_type.clone(),
            status: review.status,
            submitted_at: review.submitted_at,
        }
    }
}

/// Reviews about one professional, newest first. The owner also sees unmoderated ones.
pub fn visible_reviews(reviews: &[Review], viewer_is_owner: bool) -> Vec<PublicReview> {
    let mut visible: Vec<&Review> = reviews
        .iter()
        .filter(|review| viewer_is_owner || review.status == ReviewStatus::Verified)
        .collect();
    visible.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
    visible.into_iter().map(PublicReview::from_review).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReviewError {
    #[error("only expats who unlocked this professional can review them")]
    NotUnlocked,
    #[error("rating must be between 1 and 5 stars (got {stars})")]
    InvalidRating { stars: u8 },
    #[error("testimony has {length} characters; at least {min} are required")]
    TestimonyTooShort { length: usize, min: usize },
    #[error("a review for this professional is already pending or published")]
    AlreadyActive,
    #[error("review is {}, not pending", .status.label())]
    NotPending { status: ReviewStatus },
}

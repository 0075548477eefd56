//! Credit-gated unlocks and visibility entitlements for the expat/professional marketplace.
//!
//! Expats browse redacted professional cards and spend one credit to permanently unlock a
//! professional's identity and contact details. Pros pay for plans that control placement
//! and badges, and admins moderate reviews and identity documents.

pub mod completion;
pub mod domain;
pub mod geo;
pub mod ledger;
pub mod memory;
pub mod plan;
mod policy;
pub mod repository;
pub mod reviews;
pub mod router;
pub mod service;
pub mod translation;
pub mod verification;
pub mod visibility;

#[cfg(test)]
mod tests;

pub use completion::{CompletionCheck, CompletionReport};
pub use domain::{
    Account, AccountId, ContactDetails, Coordinates, Expertise, Gender, LocalizedContent,
    ProfessionalId, ProfessionalIdentity, ProfessionalProfile, ProfileStats, Review, ReviewId,
    ReviewStatus, Role, Unlock,
};
pub use ledger::{CreditLedger, LedgerError, UnlockCheck, UnlockOutcome, UnlockReceipt};
pub use memory::InMemoryStore;
pub use plan::{FeaturedChange, PlanError, PlanStatus, PlanSubscription, PlanTier};
pub use policy::MarketplacePolicy;
pub use repository::{
    Entity, LedgerStore, MarketplaceStore, Repository, RepositoryError, UnlockCommand,
    UnlockWrite,
};
pub use reviews::{ModerationDecision, PublicReview, RatingSummary, ReviewDraft, ReviewError};
pub use router::{marketplace_router, ACCOUNT_HEADER};
pub use service::{ErrorKind, MarketplaceError, MarketplaceService, SearchQuery};
pub use translation::{TextGenerator, TranslationError};
pub use verification::{
    VerificationError, VerificationRequest, VerificationStatus, VerificationVerdict,
};
pub use visibility::{Access, AvatarView, ProfessionalView};

//! Subscription tiers and the featured add-on.
//!
//! A pro selects a tier once the profile is complete enough, may schedule cancellation at
//! the end of the paid period, and can take it back before the period ends. Featured
//! placement is bundled with Annual, purchasable with Monthly, and unavailable on Founding.

use std::str::FromStr;

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Founding,
    Monthly,
    Annual,
}

impl PlanTier {
    pub const fn term_months(self) -> u32 {
        match self {
            PlanTier::Founding => 6,
            PlanTier::Monthly => 1,
            PlanTier::Annual => 12,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            PlanTier::Founding => "founding",
            PlanTier::Monthly => "monthly",
            PlanTier::Annual => "annual",
        }
    }
}

impl FromStr for PlanTier {
    type Err = PlanError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "founding" => Ok(PlanTier::Founding),
            "monthly" => Ok(PlanTier::Monthly),
            "annual" => Ok(PlanTier::Annual),
            other => Err(PlanError::UnknownTier(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    #[default]
    Inactive,
    Active,
    /// Still entitled; will not renew at `ends_at`.
    Cancelling,
}

impl PlanStatus {
    pub const fn label(self) -> &'static str {
        match self {
            PlanStatus::Inactive => "inactive",
            PlanStatus::Active => "active",
            PlanStatus::Cancelling => "cancelling",
        }
    }
}

/// Result of a featured toggle, so callers can tell a real change from a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeaturedChange {
    Enabled,
    Disabled,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlanSubscription {
    pub tier: Option<PlanTier>,
    pub status: PlanStatus,
    pub activated_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub featured_addon: bool,
}

impl PlanSubscription {
    /// Activate `tier` starting at `now`. Re-selecting restarts the term.
    pub fn select(
        &mut self,
        tier: PlanTier,
        completion_score: u8,
        threshold: u8,
        now: DateTime<Utc>,
    ) -> Result<(), PlanError> {
        if completion_score < threshold {
            return Err(PlanError::ProfileIncomplete {
                score: completion_score,
                required: threshold,
            });
        }

        let ends_at = now
            .checked_add_months(Months::new(tier.term_months()))
            .ok_or(PlanError::TermOutOfRange)?;

        self.tier = Some(tier);
        self.status = PlanStatus::Active;
        self.activated_at = Some(now);
        self.ends_at = Some(ends_at);
        if tier == PlanTier::Founding {
            self.featured_addon = false;
        }
        Ok(())
    }

    /// Schedule cancellation at the end of the current term.
    pub fn cancel(&mut self) -> Result<(), PlanError> {
        match self.status {
            PlanStatus::Active => {
                self.status = PlanStatus::Cancelling;
                Ok(())
            }
            PlanStatus::Cancelling => Ok(()),
            PlanStatus::Inactive => Err(PlanError::NoActivePlan),
        }
    }

    pub fn reactivate(&mut self) -> Result<(), PlanError> {
        if self.status != PlanStatus::Cancelling {
            return Err(PlanError::NotCancelling {
                status: self.status,
            });
        }
        self.status = PlanStatus::Active;
        Ok(())
    }

    /// Toggle the featured add-on. Turning it on needs a selected plan that is not inactive.
    pub fn set_featured(&mut self, enabled: bool) -> Result<FeaturedChange, PlanError> {
        if enabled && !self.is_active() {
            return Err(PlanError::NoActivePlan);
        }
        match (self.tier, enabled) {
            (Some(PlanTier::Annual), true) => Ok(FeaturedChange::Unchanged),
            (Some(PlanTier::Annual), false) => Err(PlanError::IncludedNotRemovable),
            (Some(PlanTier::Founding), true) => Err(PlanError::PlanForbids {
                tier: PlanTier::Founding,
            }),
            (_, enabled) if enabled == self.featured_addon => Ok(FeaturedChange::Unchanged),
            (_, true) => {
                self.featured_addon = true;
                Ok(FeaturedChange::Enabled)
            }
            (_, false) => {
                self.featured_addon = false;
                Ok(FeaturedChange::Disabled)
            }
        }
    }

    /// A tier is selected and the subscription is running, possibly until period end.
    pub fn is_active(&self) -> bool {
        self.tier.is_some() && self.status != PlanStatus::Inactive
    }

    pub fn cancel_at_period_end(&self) -> bool {
        self.status == PlanStatus::Cancelling
    }

    /// Featured placement: never on Founding, always on Annual, otherwise the add-on.
    pub fn is_featured(&self) -> bool {
        if !self.is_active() {
            return false;
        }
        match self.tier {
            Some(PlanTier::Founding) => false,
            Some(PlanTier::Annual) => true,
            _ => self.featured_addon,
        }
    }

    pub fn is_early_member(&self) -> bool {
        self.tier == Some(PlanTier::Founding)
    }

    /// Whether the paid period has run out. Display only; entitlements are not revoked.
    pub fn term_elapsed(&self, now: DateTime<Utc>) -> bool {
        self.ends_at.is_some_and(|ends_at| ends_at <= now)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    #[error("profile is {score}% complete; {required}% is required to purchase a plan")]
    ProfileIncomplete { score: u8, required: u8 },
    #[error("the {} plan does not allow featured placement", .tier.label())]
    PlanForbids { tier: PlanTier },
    #[error("no active plan")]
    NoActivePlan,
    #[error("plan is {}, not scheduled for cancellation", .status.label())]
    NotCancelling { status: PlanStatus },
    #[error("featured placement is included in the annual plan and cannot be removed")]
    IncludedNotRemovable,
    #[error("unknown plan '{0}'")]
    UnknownTier(String),
    #[error("plan term end is out of range")]
    TermOutOfRange,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 10, 0, 0).unwrap()
    }

    fn active(tier: PlanTier) -> PlanSubscription {
        let mut plan = PlanSubscription::default();
        plan.select(tier, 100, 85, at(2025, 1, 15)).unwrap();
        plan
    }

    #[test]
    fn select_requires_completion_threshold() {
        let mut plan = PlanSubscription::default();
        let error = plan
            .select(PlanTier::Monthly, 84, 85, at(2025, 1, 15))
            .unwrap_err();
        assert_eq!(
            error,
            PlanError::ProfileIncomplete {
                score: 84,
                required: 85
            }
        );
        assert_eq!(plan, PlanSubscription::default());
    }

    #[test]
    fn select_computes_calendar_terms() {
        assert_eq!(active(PlanTier::Founding).ends_at, Some(at(2025, 7, 15)));
        assert_eq!(active(PlanTier::Monthly).ends_at, Some(at(2025, 2, 15)));
        assert_eq!(active(PlanTier::Annual).ends_at, Some(at(2026, 1, 15)));
    }

    #[test]
    fn month_end_clamps_to_last_day() {
        let mut plan = PlanSubscription::default();
        plan.select(PlanTier::Monthly, 90, 85, at(2025, 1, 31))
            .unwrap();
        assert_eq!(plan.ends_at, Some(at(2025, 2, 28)));
    }

    #[test]
    fn cancel_then_reactivate_round_trips_status() {
        let mut plan = active(PlanTier::Monthly);
        plan.cancel().unwrap();
        assert!(plan.cancel_at_period_end());
        assert_eq!(plan.status, PlanStatus::Cancelling);

        plan.reactivate().unwrap();
        assert_eq!(plan.status, PlanStatus::Active);
        assert!(!plan.cancel_at_period_end());
    }

    #[test]
    fn cancel_without_plan_fails() {
        let mut plan = PlanSubscription::default();
        assert_eq!(plan.cancel(), Err(PlanError::NoActivePlan));
    }

    #[test]
    fn reactivate_requires_cancelling() {
        let mut plan = active(PlanTier::Annual);
        assert_eq!(
            plan.reactivate(),
            Err(PlanError::NotCancelling {
                status: PlanStatus::Active
            })
        );
    }

    #[test]
    fn founding_forbids_featured_and_clears_addon() {
        let mut plan = active(PlanTier::Monthly);
        assert_eq!(plan.set_featured(true), Ok(FeaturedChange::Enabled));
        assert!(plan.is_featured());

        plan.select(PlanTier::Founding, 100, 85, at(2025, 3, 1))
            .unwrap();
        assert!(!plan.featured_addon);
        assert!(!plan.is_featured());
        assert!(plan.is_early_member());
        assert_eq!(
            plan.set_featured(true),
            Err(PlanError::PlanForbids {
                tier: PlanTier::Founding
            })
        );
        assert_eq!(plan.set_featured(false), Ok(FeaturedChange::Unchanged));
    }

    #[test]
    fn featured_requires_an_active_plan() {
        let mut plan = PlanSubscription::default();
        assert_eq!(plan.set_featured(true), Err(PlanError::NoActivePlan));
        assert!(!plan.featured_addon);
        assert!(!plan.is_featured());
        assert_eq!(plan.set_featured(false), Ok(FeaturedChange::Unchanged));

        plan.featured_addon = true;
        assert!(!plan.is_featured());
    }

    #[test]
    fn cancelling_plan_keeps_featured_until_period_end() {
        let mut plan = active(PlanTier::Monthly);
        plan.cancel().unwrap();
        assert_eq!(plan.set_featured(true), Ok(FeaturedChange::Enabled));
        assert!(plan.is_featured());
    }

    #[test]
    fn annual_includes_featured() {
        let mut plan = active(PlanTier::Annual);
        assert!(plan.is_featured());
        assert_eq!(plan.set_featured(true), Ok(FeaturedChange::Unchanged));
        assert_eq!(plan.set_featured(false), Err(PlanError::IncludedNotRemovable));
        assert!(plan.is_featured());
    }

    #[test]
    fn entitlements_survive_term_end() {
        let plan = active(PlanTier::Annual);
        assert!(plan.term_elapsed(at(2026, 2, 1)));
        assert!(plan.is_featured());
        assert_eq!(plan.status, PlanStatus::Active);
    }

    #[test]
    fn tiers_parse_case_insensitively() {
        assert_eq!("Annual".parse::<PlanTier>(), Ok(PlanTier::Annual));
        assert!(matches!(
            "weekly".parse::<PlanTier>(),
            Err(PlanError::UnknownTier(_))
        ));
    }
}

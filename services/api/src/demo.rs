use crate::infra::{seed_marketplace, OfflineTranslator, DEMO_ADMIN};
use chrono::Utc;
use clap::Args;
use expalink::error::AppError;
use expalink::marketplace::{
    Account, AccountId, InMemoryStore, MarketplacePolicy, MarketplaceService, ModerationDecision,
    ProfessionalId, ReviewDraft, Role,
};
use serde::Serialize;
use std::sync::Arc;

const WALKTHROUGH_EXPAT: &str = "expat-walkthrough";
const WALKTHROUGH_PRO: &str = "pro-lucia";

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Credits granted to the demo expat before the first unlock.
    #[arg(long, default_value_t = 2)]
    pub(crate) credits: u64,
    /// Language used for translated bios (en, fr, es, it, nl, ru, uk).
    #[arg(long)]
    pub(crate) locale: Option<String>,
    /// Print the steps as JSON instead of text.
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct DemoStep {
    pub(crate) step: &'static str,
    pub(crate) detail: String,
}

impl DemoStep {
    fn new(step: &'static str, detail: impl Into<String>) -> Self {
        Self {
            step,
            detail: detail.into(),
        }
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let json = args.json;
    let steps = run_scenario(&args)?;

    if json {
        let rendered = serde_json::to_string_pretty(&steps).map_err(std::io::Error::from)?;
        println!("{rendered}");
        return Ok(());
    }

    println!("ExpaLink unlock walkthrough");
    for (index, step) in steps.iter().enumerate() {
        println!("{:>2}. {:<18} {}", index + 1, step.step, step.detail);
    }
    Ok(())
}

/// Unlock a professional, review them twice and moderate both reviews.
pub(crate) fn run_scenario(args: &DemoArgs) -> Result<Vec<DemoStep>, AppError> {
    let service = MarketplaceService::new(
        Arc::new(InMemoryStore::new()),
        Arc::new(OfflineTranslator),
        MarketplacePolicy::default(),
    );
    seed_marketplace(&service)?;

    let now = Utc::now();
    let mut expat = Account::new(WALKTHROUGH_EXPAT, Role::Expat, now);
    expat.credits = args.credits;
    service.register_account(expat)?;

    let expat = AccountId(WALKTHROUGH_EXPAT.to_string());
    let admin = AccountId(DEMO_ADMIN.to_string());
    let pro = ProfessionalId(WALKTHROUGH_PRO.to_string());
    let locale = args.locale.as_deref();
    let mut steps = Vec::new();

    steps.push(DemoStep::new(
        "balance",
        format!("{} credits", service.balance(&expat)?),
    ));

    let card = service.view_profile(Some(&expat), &pro, None, locale)?;
    steps.push(DemoStep::new(
        "redacted profile",
        format!(
            "{} / phone {}",
            card.display_name,
            card.phone.unwrap_or_default()
        ),
    ));

    let receipt = service.confirm_unlock(&expat, &pro, now)?;
    steps.push(DemoStep::new(
        "unlock",
        format!("{:?}, {} credits left", receipt.outcome, receipt.balance),
    ));

    let card = service.view_profile(Some(&expat), &pro, None, locale)?;
    steps.push(DemoStep::new(
        "unlocked profile",
        format!(
            "{} / phone {} / email {}",
            card.display_name,
            card.phone.unwrap_or_default(),
            card.email.unwrap_or_default()
        ),
    ));

    let repeat = service.confirm_unlock(&expat, &pro, Utc::now())?;
    steps.push(DemoStep::new(
        "repeat unlock",
        format!("{:?}, {} credits left", repeat.outcome, repeat.balance),
    ));

    let first = service.submit_review(
        &expat,
        ReviewDraft {
            professional_id: pro.clone(),
            stars: 4,
            testimony: "Sorted my NIE in a week!!".to_string(),
            service_type: None,
            anonymous: false,
        },
        Utc::now(),
    )?;
    steps.push(DemoStep::new(
        "review submitted",
        format!("{} stars, {}", first.stars, first.status.label()),
    ));

    let rejected =
        service.moderate_review(&admin, &first.id, ModerationDecision::Reject, Utc::now())?;
    let waiting = service.pros_waiting_for_review(&expat)?;
    steps.push(DemoStep::new(
        "review rejected",
        format!(
            "{}; awaiting review: {}",
            rejected.status.label(),
            waiting
                .iter()
                .map(|id| id.0.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ),
    ));

    let second = service.submit_review(
        &expat,
        ReviewDraft {
            professional_id: pro.clone(),
            stars: 5,
            testimony: "Quick, friendly, fair pricing.".to_string(),
            service_type: None,
            anonymous: true,
        },
        Utc::now(),
    )?;
    steps.push(DemoStep::new(
        "review resubmitted",
        format!("{} stars, {}", second.stars, second.status.label()),
    ));

    service.moderate_review(&admin, &second.id, ModerationDecision::Verify, Utc::now())?;
    let card = service.view_profile(None, &pro, None, locale)?;
    steps.push(DemoStep::new(
        "review verified",
        format!(
            "rating {} from {} review(s)",
            card.rating
                .map(|rating| format!("{rating:.1}"))
                .unwrap_or_else(|| "n/a".to_string()),
            card.review_count
        ),
    ));

    Ok(steps)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(credits: u64) -> DemoArgs {
        DemoArgs {
            credits,
            locale: None,
            json: false,
        }
    }

    #[test]
    fn scenario_spends_one_credit_and_publishes_rating() {
        let steps = run_scenario(&args(2)).expect("scenario completes");
        assert_eq!(steps.len(), 9);
        assert_eq!(steps[0].detail, "2 credits");
        assert_eq!(steps[1].detail, "L. / phone +34 ••• ••• •••");
        assert_eq!(steps[2].detail, "Unlocked, 1 credits left");
        assert_eq!(steps[4].detail, "AlreadyUnlocked, 1 credits left");
        assert_eq!(steps[5].detail, "4 stars, pending");
        assert_eq!(steps[6].detail, "rejected; awaiting review: pro-lucia");
        assert_eq!(steps[8].detail, "rating 5.0 from 1 review(s)");
    }

    #[test]
    fn scenario_without_credits_stops_at_unlock() {
        let error = run_scenario(&args(0)).expect_err("unlock fails");
        assert!(matches!(error, AppError::Marketplace(_)));
    }
}

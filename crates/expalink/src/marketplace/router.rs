use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use super::domain::{AccountId, Coordinates, ProfessionalId, ReviewId, Role};
use super::plan::PlanTier;
use super::repository::MarketplaceStore;
use super::reviews::{ModerationDecision, ReviewDraft};
use super::service::{ErrorKind, MarketplaceError, MarketplaceService, SearchQuery};
use super::translation::TextGenerator;
use super::verification::VerificationVerdict;

/// Header carrying the caller's account id, resolved upstream by the identity provider.
pub const ACCOUNT_HEADER: &str = "x-account-id";

type SharedService<S, T> = Arc<MarketplaceService<S, T>>;

/// Router builder exposing the marketplace over HTTP.
pub fn marketplace_router<S, T>(service: SharedService<S, T>) -> Router
where
    S: MarketplaceStore + 'static,
    T: TextGenerator + 'static,
{
    Router::new()
        .route("/api/v1/professionals", get(search_handler::<S, T>))
        .route(
            "/api/v1/professionals/:professional_id",
            get(profile_handler::<S, T>),
        )
        .route(
            "/api/v1/professionals/:professional_id/reviews",
            get(reviews_handler::<S, T>),
        )
        .route(
            "/api/v1/professionals/:professional_id/unlock",
            get(can_unlock_handler::<S, T>),
        )
        .route(
            "/api/v1/unlocks",
            get(unlocked_handler::<S, T>).post(unlock_handler::<S, T>),
        )
        .route(
            "/api/v1/credits",
            get(balance_handler::<S, T>).post(add_credits_handler::<S, T>),
        )
        .route("/api/v1/reviews", post(submit_review_handler::<S, T>))
        .route(
            "/api/v1/reviews/awaiting",
            get(awaiting_review_handler::<S, T>),
        )
        .route("/api/v1/reviews/mine", get(my_reviews_handler::<S, T>))
        .route(
            "/api/v1/reviews/:review_id/moderation",
            post(moderate_review_handler::<S, T>),
        )
        .route("/api/v1/plan", post(select_plan_handler::<S, T>))
        .route("/api/v1/plan/cancel", post(cancel_plan_handler::<S, T>))
        .route(
            "/api/v1/plan/reactivate",
            post(reactivate_plan_handler::<S, T>),
        )
        .route("/api/v1/plan/featured", put(featured_handler::<S, T>))
        .route(
            "/api/v1/verification/documents",
            post(submit_documents_handler::<S, T>),
        )
        .route(
            "/api/v1/verification/:professional_id/decision",
            post(decide_verification_handler::<S, T>),
        )
        .route(
            "/api/v1/profile/completion",
            get(completion_handler::<S, T>),
        )
        .route("/api/v1/profile/online", put(online_handler::<S, T>))
        .route(
            "/api/v1/profile/translations",
            post(translations_handler::<S, T>),
        )
        .route(
            "/api/v1/account",
            axum::routing::delete(deletion_handler::<S, T>),
        )
        .route("/api/v1/account/role", put(role_handler::<S, T>))
        .route(
            "/api/v1/admin/reviews",
            get(pending_reviews_handler::<S, T>),
        )
        .route(
            "/api/v1/admin/verifications",
            get(pending_verifications_handler::<S, T>),
        )
        .with_state(service)
}

fn viewer(headers: &HeaderMap) -> Option<AccountId> {
    headers
        .get(ACCOUNT_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| AccountId(value.to_string()))
}

fn unauthenticated() -> Response {
    let payload = json!({
        "error": format!("missing {ACCOUNT_HEADER} header"),
        "kind": "unauthenticated",
        "action": "sign in and try again",
    });
    (StatusCode::UNAUTHORIZED, Json(payload)).into_response()
}

pub(crate) fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::StaleState => StatusCode::CONFLICT,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::Infrastructure => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for MarketplaceError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        if kind == ErrorKind::Infrastructure {
            warn!(error = %self, "marketplace request not applied");
        }
        let payload = json!({
            "error": self.to_string(),
            "kind": kind.label(),
            "action": self.action(),
        });
        (status_for(kind), Json(payload)).into_response()
    }
}

fn respond<V: Serialize>(result: Result<V, MarketplaceError>) -> Response {
    match result {
        Ok(value) => (StatusCode::OK, Json(value)).into_response(),
        Err(error) => error.into_response(),
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListingParams {
    pub profession: Option<String>,
    pub language: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub locale: Option<String>,
}

impl ListingParams {
    fn origin(&self) -> Option<Coordinates> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct UnlockRequest {
    pub professional_id: ProfessionalId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreditRequest {
    pub amount: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ModerationRequest {
    pub decision: ModerationDecision,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlanRequest {
    pub plan: PlanTier,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FeaturedRequest {
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DocumentsRequest {
    pub documents: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VerdictRequest {
    pub verdict: VerificationVerdict,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OnlineRequest {
    pub online: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RoleRequest {
    pub role: Role,
}

pub(crate) async fn search_handler<S, T>(
    State(service): State<SharedService<S, T>>,
    headers: HeaderMap,
    Query(params): Query<ListingParams>,
) -> Response
where
    S: MarketplaceStore + 'static,
    T: TextGenerator + 'static,
{
    let query = SearchQuery {
        origin: params.origin(),
        profession: params.profession,
        language: params.language,
        locale: params.locale,
    };
    respond(service.search(viewer(&headers).as_ref(), &query))
}

pub(crate) async fn profile_handler<S, T>(
    State(service): State<SharedService<S, T>>,
    headers: HeaderMap,
    Path(professional_id): Path<String>,
    Query(params): Query<ListingParams>,
) -> Response
where
    S: MarketplaceStore + 'static,
    T: TextGenerator + 'static,
{
    respond(service.view_profile(
        viewer(&headers).as_ref(),
        &ProfessionalId(professional_id),
        params.origin(),
        params.locale.as_deref(),
    ))
}

pub(crate) async fn reviews_handler<S, T>(
    State(service): State<SharedService<S, T>>,
    headers: HeaderMap,
    Path(professional_id): Path<String>,
) -> Response
where
    S: MarketplaceStore + 'static,
    T: TextGenerator + 'static,
{
    respond(service.public_reviews(viewer(&headers).as_ref(), &ProfessionalId(professional_id)))
}

pub(crate) async fn can_unlock_handler<S, T>(
    State(service): State<SharedService<S, T>>,
    headers: HeaderMap,
    Path(professional_id): Path<String>,
) -> Response
where
    S: MarketplaceStore + 'static,
    T: TextGenerator + 'static,
{
    let Some(actor) = viewer(&headers) else {
        return unauthenticated();
    };
    respond(
        service
            .can_unlock(&actor, &ProfessionalId(professional_id))
            .map(|check| json!({ "check": check })),
    )
}

pub(crate) async fn unlock_handler<S, T>(
    State(service): State<SharedService<S, T>>,
    headers: HeaderMap,
    Json(request): Json<UnlockRequest>,
) -> Response
where
    S: MarketplaceStore + 'static,
    T: TextGenerator + 'static,
{
    let Some(actor) = viewer(&headers) else {
        return unauthenticated();
    };
    respond(service.confirm_unlock(&actor, &request.professional_id, Utc::now()))
}

pub(crate) async fn unlocked_handler<S, T>(
    State(service): State<SharedService<S, T>>,
    headers: HeaderMap,
    Query(params): Query<ListingParams>,
) -> Response
where
    S: MarketplaceStore + 'static,
    T: TextGenerator + 'static,
{
    let Some(actor) = viewer(&headers) else {
        return unauthenticated();
    };
    respond(service.unlocked_professionals(&actor, params.locale.as_deref()))
}

pub(crate) async fn balance_handler<S, T>(
    State(service): State<SharedService<S, T>>,
    headers: HeaderMap,
) -> Response
where
    S: MarketplaceStore + 'static,
    T: TextGenerator + 'static,
{
    let Some(actor) = viewer(&headers) else {
        return unauthenticated();
    };
    respond(
        service
            .balance(&actor)
            .map(|balance| json!({ "balance": balance })),
    )
}

pub(crate) async fn add_credits_handler<S, T>(
    State(service): State<SharedService<S, T>>,
    headers: HeaderMap,
    Json(request): Json<CreditRequest>,
) -> Response
where
    S: MarketplaceStore + 'static,
    T: TextGenerator + 'static,
{
    let Some(actor) = viewer(&headers) else {
        return unauthenticated();
    };
    respond(
        service
            .add_credits(&actor, request.amount)
            .map(|balance| json!({ "balance": balance })),
    )
}

pub(crate) async fn submit_review_handler<S, T>(
    State(service): State<SharedService<S, T>>,
    headers: HeaderMap,
    Json(draft): Json<ReviewDraft>,
) -> Response
where
    S: MarketplaceStore + 'static,
    T: TextGenerator + 'static,
{
    let Some(actor) = viewer(&headers) else {
        return unauthenticated();
    };
    match service.submit_review(&actor, draft, Utc::now()) {
        Ok(review) => (StatusCode::CREATED, Json(review)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn awaiting_review_handler<S, T>(
    State(service): State<SharedService<S, T>>,
    headers: HeaderMap,
) -> Response
where
    S: MarketplaceStore + 'static,
    T: TextGenerator + 'static,
{
    let Some(actor) = viewer(&headers) else {
        return unauthenticated();
    };
    respond(
        service
            .pros_waiting_for_review(&actor)
            .map(|professionals| json!({ "professionals": professionals })),
    )
}

pub(crate) async fn my_reviews_handler<S, T>(
    State(service): State<SharedService<S, T>>,
    headers: HeaderMap,
) -> Response
where
    S: MarketplaceStore + 'static,
    T: TextGenerator + 'static,
{
    let Some(actor) = viewer(&headers) else {
        return unauthenticated();
    };
    respond(service.my_reviews(&actor))
}

pub(crate) async fn pending_reviews_handler<S, T>(
    State(service): State<SharedService<S, T>>,
    headers: HeaderMap,
) -> Response
where
    S: MarketplaceStore + 'static,
    T: TextGenerator + 'static,
{
    let Some(actor) = viewer(&headers) else {
        return unauthenticated();
    };
    respond(service.pending_reviews(&actor))
}

pub(crate) async fn moderate_review_handler<S, T>(
    State(service): State<SharedService<S, T>>,
    headers: HeaderMap,
    Path(review_id): Path<String>,
    Json(request): Json<ModerationRequest>,
) -> Response
where
    S: MarketplaceStore + 'static,
    T: TextGenerator + 'static,
{
    let Some(actor) = viewer(&headers) else {
        return unauthenticated();
    };
    respond(service.moderate_review(
        &actor,
        &ReviewId(review_id),
        request.decision,
        Utc::now(),
    ))
}

pub(crate) async fn select_plan_handler<S, T>(
    State(service): State<SharedService<S, T>>,
    headers: HeaderMap,
    Json(request): Json<PlanRequest>,
) -> Response
where
    S: MarketplaceStore + 'static,
    T: TextGenerator + 'static,
{
    let Some(actor) = viewer(&headers) else {
        return unauthenticated();
    };
    respond(service.select_plan(&actor, request.plan, Utc::now()))
}

pub(crate) async fn cancel_plan_handler<S, T>(
    State(service): State<SharedService<S, T>>,
    headers: HeaderMap,
) -> Response
where
    S: MarketplaceStore + 'static,
    T: TextGenerator + 'static,
{
    let Some(actor) = viewer(&headers) else {
        return unauthenticated();
    };
    respond(service.cancel_plan(&actor))
}

pub(crate) async fn reactivate_plan_handler<S, T>(
    State(service): State<SharedService<S, T>>,
    headers: HeaderMap,
) -> Response
where
    S: MarketplaceStore + 'static,
    T: TextGenerator + 'static,
{
    let Some(actor) = viewer(&headers) else {
        return unauthenticated();
    };
    respond(service.reactivate_plan(&actor))
}

pub(crate) async fn featured_handler<S, T>(
    State(service): State<SharedService<S, T>>,
    headers: HeaderMap,
    Json(request): Json<FeaturedRequest>,
) -> Response
where
    S: MarketplaceStore + 'static,
    T: TextGenerator + 'static,
{
    let Some(actor) = viewer(&headers) else {
        return unauthenticated();
    };
    respond(service.set_featured(&actor, request.enabled))
}

pub(crate) async fn submit_documents_handler<S, T>(
    State(service): State<SharedService<S, T>>,
    headers: HeaderMap,
    Json(request): Json<DocumentsRequest>,
) -> Response
where
    S: MarketplaceStore + 'static,
    T: TextGenerator + 'static,
{
    let Some(actor) = viewer(&headers) else {
        return unauthenticated();
    };
    respond(service.submit_documents(&actor, request.documents, Utc::now()))
}

pub(crate) async fn pending_verifications_handler<S, T>(
    State(service): State<SharedService<S, T>>,
    headers: HeaderMap,
) -> Response
where
    S: MarketplaceStore + 'static,
    T: TextGenerator + 'static,
{
    let Some(actor) = viewer(&headers) else {
        return unauthenticated();
    };
    respond(service.pending_verifications(&actor))
}

pub(crate) async fn decide_verification_handler<S, T>(
    State(service): State<SharedService<S, T>>,
    headers: HeaderMap,
    Path(professional_id): Path<String>,
    Json(request): Json<VerdictRequest>,
) -> Response
where
    S: MarketplaceStore + 'static,
    T: TextGenerator + 'static,
{
    let Some(actor) = viewer(&headers) else {
        return unauthenticated();
    };
    respond(service.decide_verification(
        &actor,
        &ProfessionalId(professional_id),
        request.verdict,
        Utc::now(),
    ))
}

pub(crate) async fn completion_handler<S, T>(
    State(service): State<SharedService<S, T>>,
    headers: HeaderMap,
) -> Response
where
    S: MarketplaceStore + 'static,
    T: TextGenerator + 'static,
{
    let Some(actor) = viewer(&headers) else {
        return unauthenticated();
    };
    respond(service.completion(&actor))
}

pub(crate) async fn online_handler<S, T>(
    State(service): State<SharedService<S, T>>,
    headers: HeaderMap,
    Json(request): Json<OnlineRequest>,
) -> Response
where
    S: MarketplaceStore + 'static,
    T: TextGenerator + 'static,
{
    let Some(actor) = viewer(&headers) else {
        return unauthenticated();
    };
    respond(
        service
            .set_profile_online(&actor, request.online)
            .map(|profile| json!({ "professional_id": profile.id, "online": profile.is_online })),
    )
}

pub(crate) async fn translations_handler<S, T>(
    State(service): State<SharedService<S, T>>,
    headers: HeaderMap,
) -> Response
where
    S: MarketplaceStore + 'static,
    T: TextGenerator + 'static,
{
    let Some(actor) = viewer(&headers) else {
        return unauthenticated();
    };
    respond(service.refresh_translations(&actor))
}

pub(crate) async fn deletion_handler<S, T>(
    State(service): State<SharedService<S, T>>,
    headers: HeaderMap,
) -> Response
where
    S: MarketplaceStore + 'static,
    T: TextGenerator + 'static,
{
    let Some(actor) = viewer(&headers) else {
        return unauthenticated();
    };
    match service.request_deletion(&actor, Utc::now()) {
        Ok(account) => (StatusCode::ACCEPTED, Json(account)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn role_handler<S, T>(
    State(service): State<SharedService<S, T>>,
    headers: HeaderMap,
    Json(request): Json<RoleRequest>,
) -> Response
where
    S: MarketplaceStore + 'static,
    T: TextGenerator + 'static,
{
    let Some(actor) = viewer(&headers) else {
        return unauthenticated();
    };
    respond(service.switch_role(&actor, request.role))
}

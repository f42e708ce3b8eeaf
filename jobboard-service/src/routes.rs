//! Router assembly
//!
//! Every resource gets the same collection and item routes. Nested listings
//! and narrow updates are added per resource.

use axum::{
    extract::{Path, State},
    routing::{get, put, MethodRouter},
    Router,
};

use crate::{
    handlers::resource,
    health::{health, readiness},
    models::{
        Application, Candidate, CandidateSkill, Company, Job, JobCategory, JobSkill, Recruiter,
        Resume, Skill, User,
    },
    repository::Resource,
    state::AppState,
};

/// Build the complete application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(readiness))
        .merge(collection::<User>("/users"))
        .merge(collection::<Company>("/companies"))
        .merge(collection::<Recruiter>("/recruiters"))
        .merge(collection::<Candidate>("/candidates"))
        .merge(collection::<Job>("/jobs"))
        .merge(collection::<Skill>("/skills"))
        .merge(collection::<JobCategory>("/jobcategories"))
        .merge(collection::<Resume>("/resumes"))
        .merge(updatable::<Application>("/applications"))
        .merge(updatable::<CandidateSkill>("/candidateskills"))
        .merge(updatable::<JobSkill>("/jobskills"))
        .route("/companies/{id}/jobs", related::<Job>("company_id"))
        .route("/companies/{id}/recruiters", related::<Recruiter>("company_id"))
        .route("/jobs/{id}/applications", related::<Application>("job_id"))
        .route("/jobs/{id}/skills", related::<JobSkill>("job_id"))
        .route("/candidates/{id}/applications", related::<Application>("candidate_id"))
        .route("/candidates/{id}/skills", related::<CandidateSkill>("candidate_id"))
        .route("/candidates/{id}/resumes", related::<Resume>("candidate_id"))
        .with_state(state)
}

/// `GET`/`POST` on the collection, `GET`/`DELETE` on the item
fn collection<E: Resource>(path: &str) -> Router<AppState> {
    with_item_routes::<E>(path, item::<E>())
}

/// [`collection`] plus `PUT` on the item for the resource's updatable field
fn updatable<E: Resource>(path: &str) -> Router<AppState> {
    with_item_routes::<E>(path, item::<E>().merge(put(resource::update_field::<E>)))
}

fn item<E: Resource>() -> MethodRouter<AppState> {
    get(resource::get::<E>).delete(resource::delete::<E>)
}

fn with_item_routes<E: Resource>(path: &str, item: MethodRouter<AppState>) -> Router<AppState> {
    Router::new()
        .route(path, get(resource::list::<E>).post(resource::create::<E>))
        .route(&format!("{}/{{id}}", path), item)
}

/// Unpaginated children of the parent named by the `{id}` segment
fn related<E: Resource>(field: &'static str) -> MethodRouter<AppState> {
    get(
        move |State(state): State<AppState>, Path(parent_id): Path<String>| {
            resource::list_related::<E>(state, parent_id, field)
        },
    )
}

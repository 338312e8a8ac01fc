//! API route handlers.
//!
//! Response shapes follow the original surface: records as JSON objects with
//! an `id` field (events instead carry their `title` natural key), failures
//! as `{"detail": ...}` with 404 for a missing identity and 422 for invalid
//! authoring input.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use cyberclub_core::error::ClubError;
use cyberclub_core::types::{
    Event, EventPatch, Fact, FactPatch, Joke, JokePatch, QuizItem, QuizPatch, Quote, QuotePatch,
};

use crate::about;
use crate::server::AppState;

/// ClubError adapter for axum responses.
#[derive(Debug)]
pub struct ApiError(ClubError);

impl From<ClubError> for ApiError {
    fn from(err: ClubError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self.0 {
            ClubError::NotFound(what) => (StatusCode::NOT_FOUND, format!("Not found: {what}")),
            ClubError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            err => {
                tracing::error!("Request failed: {err}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".into())
            }
        };
        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

/// Health check endpoint.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "cyberclub-gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.start_time.elapsed().as_secs(),
    }))
}

/// Static club profile.
pub async fn get_about() -> Json<serde_json::Value> {
    Json(about::club_profile())
}

// ── Events ──────────────────────────────────────────────

pub async fn list_events(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Event>> {
    Ok(Json(state.store.list_events()?))
}

pub async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(title): Path<String>,
) -> ApiResult<Event> {
    Ok(Json(state.store.get_event(&title)?))
}

pub async fn create_event(
    State(state): State<Arc<AppState>>,
    Json(event): Json<Event>,
) -> ApiResult<Event> {
    Ok(Json(state.store.create_event(&event)?))
}

pub async fn update_event(
    State(state): State<Arc<AppState>>,
    Path(title): Path<String>,
    Json(patch): Json<EventPatch>,
) -> ApiResult<Event> {
    Ok(Json(state.store.update_event(&title, &patch)?))
}

pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    Path(title): Path<String>,
) -> ApiResult<serde_json::Value> {
    state.store.delete_event(&title)?;
    Ok(Json(serde_json::json!({ "detail": "Event deleted" })))
}

// ── Facts ───────────────────────────────────────────────

pub async fn list_facts(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Fact>> {
    Ok(Json(state.store.list_facts()?))
}

pub async fn get_fact(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Fact> {
    Ok(Json(state.store.get_fact(&id)?))
}

pub async fn create_fact(
    State(state): State<Arc<AppState>>,
    Json(fact): Json<Fact>,
) -> ApiResult<Fact> {
    Ok(Json(state.store.create_fact(&fact)?))
}

pub async fn update_fact(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<FactPatch>,
) -> ApiResult<Fact> {
    Ok(Json(state.store.update_fact(&id, &patch)?))
}

pub async fn delete_fact(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<serde_json::Value> {
    state.store.delete_fact(&id)?;
    Ok(Json(serde_json::json!({ "detail": "Fact deleted" })))
}

// ── Jokes ───────────────────────────────────────────────

pub async fn list_jokes(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Joke>> {
    Ok(Json(state.store.list_jokes()?))
}

pub async fn get_joke(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Joke> {
    Ok(Json(state.store.get_joke(&id)?))
}

pub async fn create_joke(
    State(state): State<Arc<AppState>>,
    Json(joke): Json<Joke>,
) -> ApiResult<Joke> {
    Ok(Json(state.store.create_joke(&joke)?))
}

pub async fn update_joke(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<JokePatch>,
) -> ApiResult<Joke> {
    Ok(Json(state.store.update_joke(&id, &patch)?))
}

pub async fn delete_joke(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<serde_json::Value> {
    state.store.delete_joke(&id)?;
    Ok(Json(serde_json::json!({ "detail": "Joke deleted" })))
}

// ── Quotes ──────────────────────────────────────────────

pub async fn list_quotes(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Quote>> {
    Ok(Json(state.store.list_quotes()?))
}

pub async fn get_quote(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Quote> {
    Ok(Json(state.store.get_quote(&id)?))
}

pub async fn create_quote(
    State(state): State<Arc<AppState>>,
    Json(quote): Json<Quote>,
) -> ApiResult<Quote> {
    Ok(Json(state.store.create_quote(&quote)?))
}

pub async fn update_quote(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<QuotePatch>,
) -> ApiResult<Quote> {
    Ok(Json(state.store.update_quote(&id, &patch)?))
}

pub async fn delete_quote(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<serde_json::Value> {
    state.store.delete_quote(&id)?;
    Ok(Json(serde_json::json!({ "detail": "Quote deleted" })))
}

// ── Quizzes ─────────────────────────────────────────────

pub async fn list_quizzes(State(state): State<Arc<AppState>>) -> ApiResult<Vec<QuizItem>> {
    Ok(Json(state.store.list_quizzes()?))
}

pub async fn get_quiz(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<QuizItem> {
    Ok(Json(state.store.get_quiz(&id)?))
}

/// Quiz creation validates shape before anything reaches the store.
pub async fn create_quiz(
    State(state): State<Arc<AppState>>,
    Json(quiz): Json<QuizItem>,
) -> ApiResult<QuizItem> {
    quiz.validate()?;
    Ok(Json(state.store.create_quiz(&quiz)?))
}

pub async fn update_quiz(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<QuizPatch>,
) -> ApiResult<QuizItem> {
    Ok(Json(state.store.update_quiz(&id, &patch)?))
}

pub async fn delete_quiz(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<serde_json::Value> {
    state.store.delete_quiz(&id)?;
    Ok(Json(serde_json::json!({ "detail": "Quiz deleted" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cyberclub_core::config::GatewayConfig;
    use cyberclub_store::ContentStore;

    fn test_state() -> State<Arc<AppState>> {
        let store = Arc::new(ContentStore::open_in_memory().expect("store"));
        State(AppState::new(store, GatewayConfig::default()))
    }

    fn sample_event() -> Event {
        Event {
            title: "CTF Night".into(),
            date: "2026-04-01T20:00:00".into(),
            description: "Jeopardy-style practice round".into(),
            location: "Lab 2".into(),
        }
    }

    #[tokio::test]
    async fn test_health_check() {
        let result = health_check(test_state()).await;
        assert_eq!(result.0["status"], "ok");
    }

    #[tokio::test]
    async fn test_about_has_profile_fields() {
        let result = get_about().await;
        assert!(result.0["name"].is_string());
        assert!(result.0["departments"].is_array());
    }

    #[tokio::test]
    async fn test_event_create_then_get_by_title() {
        let state = test_state();
        create_event(state.clone(), Json(sample_event())).await.expect("create");

        let fetched = get_event(state, Path("CTF Night".into())).await.expect("get");
        assert_eq!(fetched.0.location, "Lab 2");
    }

    #[tokio::test]
    async fn test_get_missing_event_maps_to_404() {
        let err = get_event(test_state(), Path("Ghost".into()))
            .await
            .expect_err("absent");
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_event_partial_update() {
        let state = test_state();
        create_event(state.clone(), Json(sample_event())).await.expect("create");

        let patch = EventPatch { location: Some("Amphi A".into()), ..Default::default() };
        let updated = update_event(state.clone(), Path("CTF Night".into()), Json(patch))
            .await
            .expect("update");
        assert_eq!(updated.0.location, "Amphi A");
        assert_eq!(updated.0.description, "Jeopardy-style practice round");
    }

    #[tokio::test]
    async fn test_fact_crud_by_id() {
        let state = test_state();
        let created = create_fact(state.clone(), Json(Fact::new("AES dates to 2001")))
            .await
            .expect("create");
        let id = created.0.id.clone().expect("id");

        let fetched = get_fact(state.clone(), Path(id.clone())).await.expect("get");
        assert_eq!(fetched.0.content, "AES dates to 2001");

        delete_fact(state.clone(), Path(id.clone())).await.expect("delete");
        let err = delete_fact(state, Path(id)).await.expect_err("second delete");
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_quiz_rejects_bad_shape() {
        let state = test_state();
        let quiz = QuizItem {
            id: None,
            question: "Q".into(),
            options: vec!["only".into()],
            correct_option: 0,
        };
        let err = create_quiz(state.clone(), Json(quiz)).await.expect_err("invalid");
        assert_eq!(
            err.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert!(list_quizzes(state).await.expect("list").0.is_empty());
    }
}

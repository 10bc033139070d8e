//! People route handlers.

use axum::{
    Json,
    extract::{FromRequest, Path, State},
    http::StatusCode,
};
use tracing::instrument;

use people_core::PersonId;

use crate::error::{AppError, Result};
use crate::models::{
    CreatePersonInput, PersonDetail, SearchRequest, SearchResult, UpdatePersonInput,
};
use crate::state::AppState;

/// JSON request body whose rejections become `400 Bad Request`.
///
/// Axum's own `Json` answers 415/422 for some failures; the API reports every
/// unreadable body as a validation error.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Search people by name prefix, one page at a time.
///
/// Paging is validated before the database is touched.
#[instrument(skip_all)]
pub async fn search(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<SearchRequest>,
) -> Result<Json<SearchResult>> {
    let (filter, page) = request.validate(state.config().max_page_size)?;

    let (total_count, people) = state
        .people()
        .search(&filter, page)
        .await
        .map_err(AppError::repository("Error searching for people"))?;

    tracing::debug!(total_count, returned = people.len(), "Search complete");

    Ok(Json(SearchResult {
        people,
        total_count,
        total_pages: page.total_pages(total_count),
    }))
}

/// Get one person with all child collections.
#[instrument(skip_all, fields(person_id = %id))]
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<PersonId>,
) -> Result<Json<PersonDetail>> {
    state
        .people()
        .get_detail(id)
        .await
        .map_err(AppError::repository("Error getting person"))?
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// Apply a partial update to a person.
#[instrument(skip_all, fields(person_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<PersonId>,
    JsonBody(input): JsonBody<UpdatePersonInput>,
) -> Result<StatusCode> {
    let outcome = state
        .people()
        .update(id, &input)
        .await
        .map_err(AppError::repository("Error updating person"))?;

    tracing::info!(?outcome, "Person updated");
    Ok(StatusCode::OK)
}

/// Create a person.
///
/// The ID in the path is ignored; the database assigns one.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreatePersonInput>,
) -> Result<StatusCode> {
    let id = state
        .people()
        .create(&input)
        .await
        .map_err(AppError::repository("Error creating person"))?;

    tracing::info!(person_id = %id, "Person created");
    Ok(StatusCode::OK)
}

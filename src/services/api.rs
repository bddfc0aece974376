//! HTTP CRUD over the repository port.
//!
//! Handlers are thin pass-throughs: no bot side effects (status messages,
//! reminders) are triggered from here.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;

use crate::database::models::{Game, PageRequest, PagedList, Player, RecordId, Team};
use crate::database::repository::{Record, Repository, Storage};

#[derive(Debug)]
pub enum ApiError {
    NotFound,
    BadRequest(String),
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Internal(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "not found".to_string()),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Internal(e) => {
                tracing::error!("API request failed: {:#}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// A record type exposed over HTTP.
pub trait Resource: Record + Serialize + DeserializeOwned {
    fn repository(storage: &dyn Storage) -> &dyn Repository<Self>;
}

impl Resource for Player {
    fn repository(storage: &dyn Storage) -> &dyn Repository<Self> {
        storage.players()
    }
}

impl Resource for Game {
    fn repository(storage: &dyn Storage) -> &dyn Repository<Self> {
        storage.games()
    }
}

impl Resource for Team {
    fn repository(storage: &dyn Storage) -> &dyn Repository<Self> {
        storage.teams()
    }
}

#[derive(Clone)]
pub struct ApiState {
    storage: Arc<dyn Storage>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl From<PageQuery> for PageRequest {
    fn from(query: PageQuery) -> Self {
        PageRequest { page: query.page.unwrap_or(1), page_size: query.page_size }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Created {
    pub id: RecordId,
}

fn parse_id(raw: &str) -> ApiResult<RecordId> {
    raw.parse().map_err(|_| ApiError::BadRequest(format!("invalid id '{raw}'")))
}

async fn list<R>(
    State(state): State<ApiState>,
    Query(page): Query<PageQuery>,
    Query(filter): Query<R::Filter>,
) -> ApiResult<Json<PagedList<R>>>
where
    R: Resource,
    R::Filter: DeserializeOwned,
{
    let records = R::repository(state.storage.as_ref()).find(&filter, page.into()).await?;
    Ok(Json(records))
}

async fn get_one<R: Resource>(State(state): State<ApiState>, Path(id): Path<String>) -> ApiResult<Json<R>> {
    let id = parse_id(&id)?;
    R::repository(state.storage.as_ref())
        .get(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

async fn add<R: Resource>(State(state): State<ApiState>, Json(record): Json<R>) -> ApiResult<(StatusCode, Json<Created>)> {
    let id = R::repository(state.storage.as_ref()).add(record).await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

async fn replace<R: Resource>(State(state): State<ApiState>, Json(record): Json<R>) -> ApiResult<Json<R>> {
    R::repository(state.storage.as_ref()).replace(&record).await?;
    Ok(Json(record))
}

async fn remove<R: Resource>(State(state): State<ApiState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    let id = parse_id(&id)?;
    let repository = R::repository(state.storage.as_ref());
    if repository.get(id).await?.is_none() {
        return Err(ApiError::NotFound);
    }
    repository.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn resource_routes<R>(plural: &str, singular: &str) -> Router<ApiState>
where
    R: Resource,
    R::Filter: DeserializeOwned,
{
    Router::new()
        .route(&format!("/{plural}"), get(list::<R>))
        .route(&format!("/{plural}/:id"), get(get_one::<R>))
        .route(&format!("/{singular}"), post(add::<R>).put(replace::<R>))
        .route(&format!("/{singular}/:id"), delete(remove::<R>))
}

pub fn router(storage: Arc<dyn Storage>) -> Router {
    Router::new()
        .merge(resource_routes::<Game>("games", "game"))
        .merge(resource_routes::<Player>("players", "player"))
        .merge(resource_routes::<Team>("teams", "team"))
        .with_state(ApiState { storage })
}

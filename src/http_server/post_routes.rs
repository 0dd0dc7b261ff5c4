//! Post HTTP Routes
//!
//! JSON endpoints over [`PostService`]. Handlers stamp creation and
//! modification times; everything else is the service's business.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::kv::KeyValueStore;
use crate::posts::{now, DirectoryEntry, Post, PostEdit, PostError, PostService};

// ==================
// Request/Response Types
// ==================

#[derive(Debug, Deserialize)]
pub struct PostRequest {
    pub key: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct KeyResponse {
    pub key: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<T, ApiError>;

fn error_response(err: PostError) -> ApiError {
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ErrorResponse {
            code: err.code().to_string(),
            message: err.to_string(),
        }),
    )
}

// ==================
// Routes
// ==================

/// Create the `/post` router
pub fn post_routes<S: KeyValueStore + 'static>(service: Arc<PostService<S>>) -> Router {
    Router::new()
        .route("/post", get(list_posts::<S>).post(create_post::<S>))
        .route(
            "/post/:key",
            get(get_post::<S>).put(update_post::<S>).delete(delete_post::<S>),
        )
        .with_state(service)
}

// ==================
// Handlers
// ==================

async fn create_post<S: KeyValueStore + 'static>(
    State(service): State<Arc<PostService<S>>>,
    Json(req): Json<PostRequest>,
) -> ApiResult<(StatusCode, Json<KeyResponse>)> {
    let post = Post::new(req.key, req.content, now());
    let key = post.key.clone();

    service.insert(post).await.map_err(error_response)?;

    Ok((StatusCode::CREATED, Json(KeyResponse { key })))
}

async fn list_posts<S: KeyValueStore + 'static>(
    State(service): State<Arc<PostService<S>>>,
) -> ApiResult<Json<Vec<DirectoryEntry>>> {
    let entries = service.list().await.map_err(error_response)?;
    Ok(Json(entries))
}

async fn get_post<S: KeyValueStore + 'static>(
    State(service): State<Arc<PostService<S>>>,
    Path(key): Path<String>,
) -> ApiResult<Json<Post>> {
    match service.select(&key).await.map_err(error_response)? {
        Some(post) => Ok(Json(post)),
        None => Err(error_response(PostError::NotFound(key))),
    }
}

async fn update_post<S: KeyValueStore + 'static>(
    State(service): State<Arc<PostService<S>>>,
    Path(old_key): Path<String>,
    Json(req): Json<PostRequest>,
) -> ApiResult<Json<KeyResponse>> {
    let edit = PostEdit::new(req.key, req.content, now());
    let key = edit.key.clone();

    service.update(&old_key, edit).await.map_err(error_response)?;

    Ok(Json(KeyResponse { key }))
}

async fn delete_post<S: KeyValueStore + 'static>(
    State(service): State<Arc<PostService<S>>>,
    Path(key): Path<String>,
) -> ApiResult<Json<KeyResponse>> {
    service.remove(&key).await.map_err(error_response)?;
    Ok(Json(KeyResponse { key }))
}

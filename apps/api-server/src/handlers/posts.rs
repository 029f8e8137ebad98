//! Post handlers: public reads and authenticated writes.

use std::collections::HashMap;
use std::time::Duration;

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::domain::{Post, PostFields, PostStatus};
use quill_shared::dto::{AuthorSummary, DeleteResponse, ListPostsQuery, PostPayload, PostResponse};

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Anonymous reads are cached this long, or until a post changes.
const PUBLIC_CACHE_TTL: Duration = Duration::from_secs(60);
const CACHE_PREFIX: &str = "posts:";

fn list_cache_key() -> String {
    format!("{CACHE_PREFIX}list")
}

fn item_cache_key(key: &str) -> String {
    format!("{CACHE_PREFIX}item:{key}")
}

fn cached_json(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/json")
        .insert_header(("X-Cache", "HIT"))
        .body(body)
}

/// Serialize, remember for anonymous readers, respond. `generation` is the
/// cache generation observed before the body's data was loaded.
async fn respond_public<T: serde::Serialize>(
    state: &AppState,
    cache_key: Option<String>,
    generation: u64,
    body: &T,
) -> AppResult<HttpResponse> {
    let json = serde_json::to_string(body).map_err(|e| AppError::Internal(e.to_string()))?;
    if let Some(key) = cache_key {
        state
            .cache
            .store(&key, &json, PUBLIC_CACHE_TTL, generation)
            .await;
    }
    Ok(HttpResponse::Ok().content_type("application/json").body(json))
}

async fn invalidate(state: &AppState) {
    state.cache.invalidate(CACHE_PREFIX).await;
}

/// Attach author summaries, loading every author in one query.
async fn with_authors(state: &AppState, posts: Vec<Post>) -> AppResult<Vec<PostResponse>> {
    let mut ids: Vec<Uuid> = posts.iter().map(|p| p.author_id).collect();
    ids.sort_unstable();
    ids.dedup();

    let authors: HashMap<Uuid, AuthorSummary> = state
        .users
        .find_by_ids(&ids)
        .await?
        .iter()
        .map(|u| (u.id, AuthorSummary::from(u)))
        .collect();

    Ok(posts
        .into_iter()
        .map(|post| {
            let author = authors.get(&post.author_id).cloned();
            PostResponse::from_post(post, author)
        })
        .collect())
}

fn parse_fields(payload: PostPayload) -> AppResult<PostFields> {
    PostFields::try_from(payload).map_err(AppError::BadRequest)
}

/// GET /api/posts?status=&includeAll=
pub async fn list(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    query: web::Query<ListPostsQuery>,
) -> AppResult<HttpResponse> {
    let actor = viewer.actor();
    let cache_key = actor.is_none().then(list_cache_key);

    if let Some(key) = &cache_key {
        if let Some(hit) = state.cache.get(key).await {
            return Ok(cached_json(hit));
        }
    }
    let generation = state.cache.generation();

    let query = query.into_inner();
    let status = query
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::parse::<PostStatus>)
        .transpose()
        .map_err(AppError::BadRequest)?;

    let posts = state
        .posts
        .list(actor.as_ref(), status, query.include_all)
        .await?;
    let body = with_authors(&state, posts).await?;

    respond_public(&state, cache_key, generation, &body).await
}

/// GET /api/posts/{idOrSlug}
pub async fn get(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let key = path.into_inner();
    let actor = viewer.actor();
    let cache_key = actor.is_none().then(|| item_cache_key(&key));

    if let Some(ck) = &cache_key {
        if let Some(hit) = state.cache.get(ck).await {
            return Ok(cached_json(hit));
        }
    }
    let generation = state.cache.generation();

    let post = state.posts.get(&key, actor.as_ref()).await?;
    let author = state
        .users
        .find_by_id(post.author_id)
        .await?
        .as_ref()
        .map(AuthorSummary::from);
    let body = PostResponse::from_post(post, author);

    respond_public(&state, cache_key, generation, &body).await
}

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<PostPayload>,
) -> AppResult<HttpResponse> {
    let fields = parse_fields(body.into_inner())?;
    let post = state.posts.create(&identity.actor(), fields).await?;
    invalidate(&state).await;

    Ok(HttpResponse::Created().json(PostResponse::from_post(post, None)))
}

/// PUT /api/posts/{id}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<PostPayload>,
) -> AppResult<HttpResponse> {
    let fields = parse_fields(body.into_inner())?;
    let post = state
        .posts
        .update(&identity.actor(), path.into_inner(), fields)
        .await?;
    invalidate(&state).await;

    Ok(HttpResponse::Ok().json(PostResponse::from_post(post, None)))
}

/// DELETE /api/posts/{id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .posts
        .delete(&identity.actor(), path.into_inner())
        .await?;
    invalidate(&state).await;

    Ok(HttpResponse::Ok().json(DeleteResponse { success: true }))
}

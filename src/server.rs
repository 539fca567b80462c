//! HTTP surface: the snippet API, localized page routes and `/health`.
//!
//! Page handlers resolve the locale from the path, fetch its messages and
//! return the `PageContext` as JSON for the rendering layer.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::AppError;
use crate::i18n::{Locale, MessageCache, MessageFetcher, MessageSource};
use crate::pages::{Page, PageContext, Project, Section};
use crate::snippets::SnippetStore;

/// Shared, request-independent state.
///
/// The message cache lives inside the fetcher and is owned here, not in a
/// global, so each `AppState` (and each test) has its own.
#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<MessageFetcher>,
    pub snippets: Arc<SnippetStore>,
}

impl AppState {
    pub fn new(fetcher: MessageFetcher, snippets: SnippetStore) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            snippets: Arc::new(snippets),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let cache = config.message_cache_ttl.map(|ttl| {
            info!("Message cache enabled (TTL {:?})", ttl);
            Arc::new(MessageCache::new(ttl))
        });
        if cache.is_none() {
            info!("Message cache disabled");
        }

        let source = match &config.messages_dir {
            Some(dir) => MessageSource::bundled(dir.clone()),
            None => MessageSource::remote(reqwest::Client::new(), config.messages_base_url.clone()),
        };
        info!("Message source: {} ({})", source.location(), source.kind());

        let fetcher = MessageFetcher::new(source, cache);
        Self::new(fetcher, SnippetStore::new(config.snippets_dir.clone()))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/snippets", get(get_snippet))
        .route("/", get(redirect_to_default_locale))
        .route("/:locale", get(home_page))
        .route("/:locale/:section", get(section_page))
        .route("/:locale/projects/:project", get(project_page))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ==================== Handlers ====================

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let cached_locales = match state.fetcher.cache() {
        Some(cache) => Some(cache.len().await),
        None => None,
    };

    Json(json!({
        "status": "ok",
        "source": state.fetcher.source().kind(),
        "messages": state.fetcher.metrics().report(),
        "cached_locales": cached_locales,
    }))
}

#[derive(Debug, Deserialize)]
struct SnippetQuery {
    project: Option<String>,
    filename: Option<String>,
}

async fn get_snippet(
    State(state): State<AppState>,
    Query(query): Query<SnippetQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let code = state
        .snippets
        .read(query.project.as_deref(), query.filename.as_deref())
        .await?;
    Ok(Json(json!({ "code": code })))
}

async fn redirect_to_default_locale() -> Redirect {
    Redirect::temporary(&format!("/{}", Locale::default()))
}

async fn home_page(
    State(state): State<AppState>,
    Path(locale): Path<String>,
) -> Result<Response, AppError> {
    render_page(&state, &locale, Page::Home).await
}

async fn section_page(
    State(state): State<AppState>,
    Path((locale, section)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let page = Page::Section(Section::from_slug(&section)?);
    render_page(&state, &locale, page).await
}

async fn project_page(
    State(state): State<AppState>,
    Path((locale, project)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let page = Page::Project(Project::from_slug(&project)?);
    render_page(&state, &locale, page).await
}

/// Resolve the locale, fetch its messages and hand both to the renderer.
async fn render_page(state: &AppState, requested: &str, page: Page) -> Result<Response, AppError> {
    let locale = Locale::resolve(Some(requested));
    debug!("Rendering {:?} for '{}' (requested '{}')", page, locale, requested);

    let messages = state.fetcher.fetch(locale).await?;
    Ok(Json(PageContext::new(locale, page, &messages)).into_response())
}

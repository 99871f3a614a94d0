//! HTTP annotation workbench for Gloss.
//!
//! Exposes an axum [`Router`] over any [`AnnotationStore`]: entry
//! assignment, the annotation editor, save/complete form handling, and the
//! JSON endpoints the editor's page viewer uses. All routes require HTTP
//! Basic auth against the store's user table.

pub mod api;
pub mod auth;
pub mod error;
pub mod html;
pub mod pages;
pub mod refcache;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use gloss_core::{factory::AnnotationMode, store::AnnotationStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use refcache::ReferenceCache;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` with
/// `GLOSS_` environment overrides.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,

  /// What annotators in this deployment are doing; decides the initial
  /// text of new annotations.
  #[serde(default)]
  pub annotation_mode:           AnnotationMode,
  /// Disable the desynchronising character deletions.
  #[serde(default)]
  pub preserve_text:             bool,
  /// How many annotators an entry accumulates before assignment stops.
  #[serde(default = "default_max_concurrent_annotators")]
  pub max_concurrent_annotators: u32,
  #[serde(default = "default_reference_cache_ttl_secs")]
  pub reference_cache_ttl_secs:  u64,
  /// URL prefix under which the external static layer serves page images.
  #[serde(default = "default_static_url_prefix")]
  pub static_url_prefix:         String,
}

fn default_max_concurrent_annotators() -> u32 { 2 }
fn default_reference_cache_ttl_secs() -> u64 { 3600 }
fn default_static_url_prefix() -> String { "/static".to_string() }

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: AnnotationStore> {
  pub store:      Arc<S>,
  pub config:     Arc<ServerConfig>,
  pub references: Arc<ReferenceCache>,
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the annotation workbench.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: AnnotationStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    .route("/",                        get(pages::index::<S>))
    .route("/new",                     get(pages::new_annotation::<S>))
    .route("/thank-you",               get(pages::thank_you::<S>))
    .route("/save",                    post(pages::save::<S>))
    .route("/complete",                post(pages::complete::<S>))
    .route("/{id}",                    get(pages::editor::<S>))
    .route("/api/entries/{entry_id}",  get(api::entry_contents::<S>))
    .route("/api/me/statistics",       get(api::statistics::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use std::time::Duration;

  use axum::body::Body;
  use axum::http::{Request, StatusCode, header};
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as B64;
  use gloss_core::entry::NewEntry;
  use gloss_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  async fn make_state() -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let hash = auth::hash_password("secret").unwrap();
    store.add_user("ana", &hash).await.unwrap();

    let config = ServerConfig {
      host:                      "127.0.0.1".to_string(),
      port:                      8080,
      store_path:                PathBuf::from(":memory:"),
      annotation_mode:           AnnotationMode::default(),
      preserve_text:             false,
      max_concurrent_annotators: 2,
      reference_cache_ttl_secs:  3600,
      static_url_prefix:         "/static".to_string(),
    };
    AppState {
      store:      Arc::new(store),
      config:     Arc::new(config),
      references: Arc::new(ReferenceCache::new(Duration::from_secs(3600))),
    }
  }

  /// One entry linked to page 1 of a fresh volume.
  async fn seed_entry(store: &SqliteStore, text: &str) -> i64 {
    let vol = store.get_or_create_volume("A-B").await.unwrap();
    let page =
      store.get_or_create_page(vol.volume_id, 1, "ab/1.png").await.unwrap();
    let entry = store.add_entry(NewEntry::from_text(text)).await.unwrap();
    store.link_entry_page(entry.entry_id, page.page_id).await.unwrap();
    entry.entry_id
  }

  fn basic() -> String {
    format!("Basic {}", B64.encode("ana:secret"))
  }

  async fn send(
    state: AppState<SqliteStore>,
    method: &str,
    uri: &str,
    form_body: Option<&str>,
  ) -> axum::response::Response {
    let mut builder = Request::builder()
      .method(method)
      .uri(uri)
      .header(header::AUTHORIZATION, basic());
    if form_body.is_some() {
      builder =
        builder.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    }
    let req = builder
      .body(Body::from(form_body.unwrap_or("").to_string()))
      .unwrap();
    router(state).oneshot(req).await.unwrap()
  }

  fn location(resp: &axum::response::Response) -> String {
    resp
      .headers()
      .get(header::LOCATION)
      .unwrap()
      .to_str()
      .unwrap()
      .to_string()
  }

  async fn body_string(resp: axum::response::Response) -> String {
    let bytes =
      axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
  }

  #[tokio::test]
  async fn unauthenticated_requests_return_401() {
    let state = make_state().await;
    let req = Request::builder().uri("/").body(Body::empty()).unwrap();
    let resp = router(state).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
  }

  #[tokio::test]
  async fn index_with_no_work_redirects_to_thank_you() {
    let state = make_state().await;
    let resp = send(state, "GET", "/", None).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/thank-you");
  }

  #[tokio::test]
  async fn thank_you_renders() {
    let state = make_state().await;
    let resp = send(state, "GET", "/thank-you", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_string(resp).await;
    assert!(body.contains("no entries left"));
  }

  #[tokio::test]
  async fn new_assigns_an_entry_and_the_editor_renders() {
    let state = make_state().await;
    seed_entry(state.store.as_ref(), "**CAL**\ncorp de text.").await;

    let resp = send(state.clone(), "GET", "/new", None).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let editor_uri = location(&resp);
    assert!(editor_uri.starts_with('/'), "location: {editor_uri}");

    let resp = send(state, "GET", &editor_uri, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_string(resp).await;
    // default mode pre-fills only the formatted title word
    assert!(body.contains("**CAL**"), "body: {body}");
    assert!(body.contains("entry-id"), "body: {body}");
  }

  #[tokio::test]
  async fn index_resumes_the_in_progress_annotation() {
    let state = make_state().await;
    seed_entry(state.store.as_ref(), "**CAL**\ncorp de text.").await;

    let assigned = send(state.clone(), "GET", "/new", None).await;
    let editor_uri = location(&assigned);

    let resp = send(state, "GET", "/", None).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), editor_uri);
  }

  #[tokio::test]
  async fn editor_for_unknown_annotation_redirects_home() {
    let state = make_state().await;
    let resp = send(state, "GET", "/999", None).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
  }

  #[tokio::test]
  async fn save_persists_and_redirects_to_the_editor() {
    let state = make_state().await;
    let entry_id =
      seed_entry(state.store.as_ref(), "**CAL**\ncorp de text.").await;

    let assigned = send(state.clone(), "GET", "/new", None).await;
    let editor_uri = location(&assigned);

    let form = format!("entry-id={entry_id}&text=**CAL**-schita-de-text");
    let resp = send(state.clone(), "POST", "/save", Some(&form)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), editor_uri);

    let resp = send(state, "GET", &editor_uri, None).await;
    let body = body_string(resp).await;
    assert!(body.contains("**CAL**-schita-de-text"), "body: {body}");
  }

  #[tokio::test]
  async fn save_without_an_in_progress_annotation_returns_404() {
    let state = make_state().await;
    let entry_id =
      seed_entry(state.store.as_ref(), "**CAL**\ncorp de text.").await;

    let form = format!("entry-id={entry_id}&text=**CAL**-ceva");
    let resp = send(state, "POST", "/save", Some(&form)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn complete_with_short_text_returns_422_with_the_editor() {
    let state = make_state().await;
    let entry_id =
      seed_entry(state.store.as_ref(), "**CAL**\ncorp de text.").await;
    send(state.clone(), "GET", "/new", None).await;

    let form = format!("entry-id={entry_id}&text=**CAL**");
    let resp = send(state, "POST", "/complete", Some(&form)).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_string(resp).await;
    assert!(body.contains("needs more text"), "body: {body}");
    assert!(body.contains("textarea"), "body: {body}");
  }

  #[tokio::test]
  async fn complete_finishes_the_annotation_and_redirects_home() {
    let state = make_state().await;
    let entry_id =
      seed_entry(state.store.as_ref(), "**CAL**\ncorp de text.").await;
    send(state.clone(), "GET", "/new", None).await;

    let form = format!("entry-id={entry_id}&text=**CAL**-text-complet-aici");
    let resp = send(state.clone(), "POST", "/complete", Some(&form)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");

    // the only entry is now off-limits for this user
    let resp = send(state, "GET", "/", None).await;
    assert_eq!(location(&resp), "/thank-you");
  }

  #[tokio::test]
  async fn entry_contents_returns_text_and_page_urls() {
    let state = make_state().await;
    let entry_id =
      seed_entry(state.store.as_ref(), "**CAL**\ncorp de text.").await;
    send(state.clone(), "GET", "/new", None).await;

    let resp =
      send(state, "GET", &format!("/api/entries/{entry_id}"), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_string(resp).await;
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["contents"], "**CAL**");
    assert_eq!(json["current_page"], "/static/ab/1.png");
    assert!(json["previous_page"].is_null());
    assert!(json["next_page"].is_null());
  }

  #[tokio::test]
  async fn entry_contents_for_unassigned_entry_returns_404() {
    let state = make_state().await;
    let entry_id =
      seed_entry(state.store.as_ref(), "**CAL**\ncorp de text.").await;

    let resp =
      send(state, "GET", &format!("/api/entries/{entry_id}"), None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn statistics_counts_the_completed_annotation() {
    let state = make_state().await;
    let entry_id =
      seed_entry(state.store.as_ref(), "**CAL**\ncorp de text.").await;
    send(state.clone(), "GET", "/new", None).await;
    let form = format!("entry-id={entry_id}&text=**CAL**-text-complet-aici");
    send(state.clone(), "POST", "/complete", Some(&form)).await;

    let resp = send(state, "GET", "/api/me/statistics", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_string(resp).await;
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["grand_total"]["num_annotations"], 1);
    assert!(json["grand_total"]["num_symbols"].as_i64().unwrap() > 0);
  }
}

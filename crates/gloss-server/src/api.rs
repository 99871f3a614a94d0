//! JSON API handlers.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/api/entries/{entry_id}` | Editor data for the caller's annotation |
//! | `GET`  | `/api/me/statistics` | The caller's dashboard numbers |

use axum::{
  Json,
  extract::{Path, State},
};
use chrono::Utc;
use gloss_core::{
  entry::{EntryId, Page},
  stats::{self, UserStatistics},
  store::AnnotationStore,
};
use serde::Serialize;

use crate::{AppState, auth::CurrentUser, error::Error};

/// Response body for `GET /api/entries/{entry_id}`. Page values are URLs
/// under the static prefix; the images themselves are served externally.
#[derive(Debug, Serialize)]
pub struct EntryContents {
  pub contents:      String,
  pub current_page:  String,
  pub previous_page: Option<String>,
  pub next_page:     Option<String>,
}

/// `GET /api/entries/{entry_id}` — the caller's annotation text plus the
/// entry's first page image and its neighbours in the same volume.
pub async fn entry_contents<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Path(entry_id): Path<EntryId>,
) -> Result<Json<EntryContents>, Error>
where
  S: AnnotationStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let store = state.store.as_ref();

  store
    .get_entry(entry_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::NotFound)?;
  let annotation = store
    .annotation_for_entry_and_user(entry_id, user.user_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::NotFound)?;

  let pages = store.pages_for_entry(entry_id).await.map_err(Error::store)?;
  let current = pages.first().ok_or(Error::NotFound)?;

  let previous = match current.page_no.checked_sub(1) {
    Some(no) => store
      .page_in_volume(current.volume_id, no)
      .await
      .map_err(Error::store)?,
    None => None,
  };
  let next = store
    .page_in_volume(current.volume_id, current.page_no + 1)
    .await
    .map_err(Error::store)?;

  let prefix = state.config.static_url_prefix.as_str();
  Ok(Json(EntryContents {
    contents:      annotation.text,
    current_page:  image_url(prefix, current),
    previous_page: previous.as_ref().map(|p| image_url(prefix, p)),
    next_page:     next.as_ref().map(|p| image_url(prefix, p)),
  }))
}

fn image_url(prefix: &str, page: &Page) -> String {
  format!("{}/{}", prefix.trim_end_matches('/'), page.image_path)
}

/// `GET /api/me/statistics` — the caller's dashboard numbers: grand total,
/// per-status buckets, and the evaluation interval containing today.
pub async fn statistics<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
) -> Result<Json<UserStatistics>, Error>
where
  S: AnnotationStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let annotations = state
    .store
    .annotations_for_user(user.user_id)
    .await
    .map_err(Error::store)?;
  let interval = state
    .store
    .interval_containing(Utc::now().date_naive())
    .await
    .map_err(Error::store)?;

  Ok(Json(stats::user_statistics(&annotations, interval.as_ref())))
}

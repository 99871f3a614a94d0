//! HTML page handlers: assignment, the editor, and the save/complete
//! form posts.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/` | Resume in-progress work or assign a new entry |
//! | `GET`  | `/new` | Always assign a new entry |
//! | `GET`  | `/{id}` | Editor; non-owned or finished ids redirect to `/` |
//! | `POST` | `/save` | Form: `entry-id`, `text` |
//! | `POST` | `/complete` | Form: `entry-id`, `text`; 422 re-renders |
//! | `GET`  | `/thank-you` | No work available |

use axum::{
  Form,
  extract::{Path, State},
  http::StatusCode,
  response::{Html, IntoResponse, Redirect, Response},
};
use gloss_core::{
  annotation::AnnotationId,
  assign,
  completion::{self, CompletionError},
  entry::EntryId,
  factory::{self, AnnotationMode},
  store::AnnotationStore,
  text::extract_title_word,
  user::User,
};
use serde::Deserialize;

use crate::{AppState, auth::CurrentUser, error::Error, html};

/// Form body shared by `/save` and `/complete`.
#[derive(Debug, Deserialize)]
pub struct AnnotationForm {
  #[serde(rename = "entry-id")]
  pub entry_id: EntryId,
  pub text:     String,
}

/// `GET /` — resume the caller's oldest in-progress annotation, or assign
/// a new entry.
pub async fn index<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
) -> Result<Response, Error>
where
  S: AnnotationStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let resumed = state
    .store
    .first_in_progress_for_user(user.user_id)
    .await
    .map_err(Error::store)?;
  if let Some(annotation) = resumed {
    return Ok(
      Redirect::to(&format!("/{}", annotation.annotation_id)).into_response(),
    );
  }
  assign_next(&state, &user).await
}

/// `GET /new` — force-assign a new entry even when in-progress work exists.
pub async fn new_annotation<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
) -> Result<Response, Error>
where
  S: AnnotationStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  assign_next(&state, &user).await
}

/// Pick the next entry for `user`, create their annotation, and redirect to
/// its editor; `/thank-you` when no work is available.
async fn assign_next<S>(
  state: &AppState<S>,
  user: &User,
) -> Result<Response, Error>
where
  S: AnnotationStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let cap = state.config.max_concurrent_annotators;
  let Some(entry) = assign::next_entry(state.store.as_ref(), user.user_id, cap)
    .await
    .map_err(Error::store)?
  else {
    return Ok(Redirect::to("/thank-you").into_response());
  };

  // The reference annotator only applies when correcting annotated entries.
  let annotator = match state.config.annotation_mode {
    AnnotationMode::CorrectAnnotatedEntries => Some(
      state
        .references
        .annotator(state.store.as_ref())
        .await
        .map_err(Error::store)?,
    ),
    _ => None,
  };

  let new = {
    let mut rng = rand::rng();
    factory::new_annotation(
      user.user_id,
      &entry,
      state.config.annotation_mode,
      state.config.preserve_text,
      annotator.as_deref(),
      &mut rng,
    )
  };

  let annotation =
    state.store.insert_annotation(new).await.map_err(Error::store)?;
  tracing::info!(
    annotation_id = annotation.annotation_id,
    entry_id = entry.entry_id,
    user = %user.username,
    "assigned entry"
  );
  Ok(Redirect::to(&format!("/{}", annotation.annotation_id)).into_response())
}

/// `GET /{id}` — the editor for an in-progress annotation owned by the
/// caller; anything else redirects to `/`.
pub async fn editor<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<AnnotationId>,
) -> Result<Response, Error>
where
  S: AnnotationStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let annotation = state
    .store
    .in_progress_annotation_by_id(user.user_id, id)
    .await
    .map_err(Error::store)?;
  match annotation {
    Some(a) => Ok(
      Html(html::editor(a.annotation_id, a.entry_id, &a.title_word, &a.text, None))
        .into_response(),
    ),
    None => Ok(Redirect::to("/").into_response()),
  }
}

/// `POST /save` — persist the text without changing status.
pub async fn save<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Form(form): Form<AnnotationForm>,
) -> Result<Response, Error>
where
  S: AnnotationStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let mut annotation = state
    .store
    .in_progress_annotation(user.user_id, form.entry_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::NotFound)?;

  annotation.set_text(&form.text);
  state
    .store
    .update_annotation(&annotation)
    .await
    .map_err(Error::store)?;

  Ok(Redirect::to(&format!("/{}", annotation.annotation_id)).into_response())
}

/// `POST /complete` — run the completion and conflict engine. Validation
/// failure re-renders the editor with the submitted text and a message.
pub async fn complete<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Form(form): Form<AnnotationForm>,
) -> Result<Response, Error>
where
  S: AnnotationStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let cap = state.config.max_concurrent_annotators;
  let result = completion::mark_complete(
    state.store.as_ref(),
    form.entry_id,
    &form.text,
    user.user_id,
    cap,
  )
  .await;

  match result {
    Ok(_) => Ok(Redirect::to("/").into_response()),
    Err(CompletionError::TextTooShort { annotation_id }) => {
      let title = extract_title_word(&form.text);
      let page = html::editor(
        annotation_id,
        form.entry_id,
        &title,
        &form.text,
        Some("The annotation needs more text than the title word alone."),
      );
      Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response())
    }
    Err(CompletionError::NoInProgress { .. }) => Err(Error::NotFound),
    Err(CompletionError::Store(e)) => Err(Error::store(e)),
  }
}

/// `GET /thank-you` — static no-work-available page.
pub async fn thank_you<S>(
  State(_state): State<AppState<S>>,
  _user: CurrentUser,
) -> Html<String>
where
  S: AnnotationStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Html(html::thank_you())
}

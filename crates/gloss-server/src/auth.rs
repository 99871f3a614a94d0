//! HTTP Basic-auth extractor backed by the user table.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use gloss_core::{store::AnnotationStore, user::User};
use rand_core::OsRng;

use crate::{AppState, error::Error};

/// The authenticated caller. Present in a handler's arguments means the
/// request carried valid credentials for an existing account.
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<AppState<S>> for CurrentUser
where
  S: AnnotationStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let header_val = parts
      .headers
      .get(axum::http::header::AUTHORIZATION)
      .and_then(|v| v.to_str().ok())
      .ok_or(Error::Unauthorized)?;

    let encoded = header_val
      .strip_prefix("Basic ")
      .ok_or(Error::Unauthorized)?;

    let decoded = B64.decode(encoded).map_err(|_| Error::Unauthorized)?;
    let creds = std::str::from_utf8(&decoded).map_err(|_| Error::Unauthorized)?;

    let (username, password) =
      creds.split_once(':').ok_or(Error::Unauthorized)?;

    let user = state
      .store
      .user_by_name(username)
      .await
      .map_err(Error::store)?
      .ok_or(Error::Unauthorized)?;

    let parsed_hash = PasswordHash::new(&user.password_hash)
      .map_err(|_| Error::Unauthorized)?;

    Argon2::default()
      .verify_password(password.as_bytes(), &parsed_hash)
      .map_err(|_| Error::Unauthorized)?;

    Ok(CurrentUser(user))
  }
}

/// Hash a password into an argon2 PHC string, as stored in the user table.
pub fn hash_password(
  password: &str,
) -> Result<String, argon2::password_hash::Error> {
  let salt = SaltString::generate(&mut OsRng);
  Ok(
    Argon2::default()
      .hash_password(password.as_bytes(), &salt)?
      .to_string(),
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::{path::PathBuf, sync::Arc, time::Duration};

  use axum::http::{Request, header};
  use gloss_store_sqlite::SqliteStore;

  use crate::{ServerConfig, refcache::ReferenceCache};

  async fn make_state(password: &str) -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let hash = hash_password(password).unwrap();
    store.add_user("ana", &hash).await.unwrap();

    AppState {
      store:      Arc::new(store),
      config:     Arc::new(ServerConfig {
        host:                      "127.0.0.1".to_string(),
        port:                      8080,
        store_path:                PathBuf::from(":memory:"),
        annotation_mode:           Default::default(),
        preserve_text:             false,
        max_concurrent_annotators: 2,
        reference_cache_ttl_secs:  3600,
        static_url_prefix:         "/static".to_string(),
      }),
      references: Arc::new(ReferenceCache::new(Duration::from_secs(3600))),
    }
  }

  async fn extract(
    req: Request<axum::body::Body>,
    state: &AppState<SqliteStore>,
  ) -> Result<CurrentUser, Error> {
    let (mut parts, _) = req.into_parts();
    CurrentUser::from_request_parts(&mut parts, state).await
  }

  fn basic(user: &str, pass: &str) -> String {
    let encoded = B64.encode(format!("{user}:{pass}"));
    format!("Basic {encoded}")
  }

  #[tokio::test]
  async fn correct_credentials_resolve_the_user() {
    let state = make_state("secret").await;
    let req = Request::builder()
      .header(header::AUTHORIZATION, basic("ana", "secret"))
      .body(axum::body::Body::empty())
      .unwrap();
    let CurrentUser(user) = extract(req, &state).await.unwrap();
    assert_eq!(user.username, "ana");
  }

  #[tokio::test]
  async fn wrong_password() {
    let state = make_state("secret").await;
    let req = Request::builder()
      .header(header::AUTHORIZATION, basic("ana", "wrong"))
      .body(axum::body::Body::empty())
      .unwrap();
    assert!(matches!(extract(req, &state).await, Err(Error::Unauthorized)));
  }

  #[tokio::test]
  async fn unknown_user() {
    let state = make_state("secret").await;
    let req = Request::builder()
      .header(header::AUTHORIZATION, basic("ghost", "secret"))
      .body(axum::body::Body::empty())
      .unwrap();
    assert!(matches!(extract(req, &state).await, Err(Error::Unauthorized)));
  }

  #[tokio::test]
  async fn missing_header() {
    let state = make_state("secret").await;
    let req = Request::builder().body(axum::body::Body::empty()).unwrap();
    assert!(matches!(extract(req, &state).await, Err(Error::Unauthorized)));
  }

  #[tokio::test]
  async fn invalid_base64() {
    let state = make_state("secret").await;
    let req = Request::builder()
      .header(header::AUTHORIZATION, "Basic !!!not-base64!!!")
      .body(axum::body::Body::empty())
      .unwrap();
    assert!(matches!(extract(req, &state).await, Err(Error::Unauthorized)));
  }
}

//! Process-wide cache of the built [`ReferenceAnnotator`].
//!
//! Building the Aho-Corasick automaton is linear in the total pattern
//! length, so it is rebuilt at most once per TTL rather than per request.
//! Staleness up to the TTL is accepted.

use std::{
  sync::Arc,
  time::{Duration, Instant},
};

use gloss_core::{annotate::ReferenceAnnotator, store::AnnotationStore};
use tokio::sync::Mutex;

pub struct ReferenceCache {
  ttl:  Duration,
  slot: Mutex<Option<(Instant, Arc<ReferenceAnnotator>)>>,
}

impl ReferenceCache {
  pub fn new(ttl: Duration) -> Self {
    Self { ttl, slot: Mutex::new(None) }
  }

  /// The cached annotator, rebuilt from the store's approved references
  /// when missing or older than the TTL.
  pub async fn annotator<S>(
    &self,
    store: &S,
  ) -> Result<Arc<ReferenceAnnotator>, S::Error>
  where
    S: AnnotationStore,
  {
    let mut slot = self.slot.lock().await;
    if let Some((built, annotator)) = slot.as_ref()
      && built.elapsed() < self.ttl
    {
      return Ok(annotator.clone());
    }

    let texts = store.approved_reference_texts().await?;
    let annotator = Arc::new(ReferenceAnnotator::new(&texts));
    *slot = Some((Instant::now(), annotator.clone()));
    Ok(annotator)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use gloss_store_sqlite::SqliteStore;

  #[tokio::test]
  async fn annotator_is_reused_within_the_ttl() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    store.add_reference("DLR", true).await.unwrap();

    let cache = ReferenceCache::new(Duration::from_secs(3600));
    let first = cache.annotator(&store).await.unwrap();
    let second = cache.annotator(&store).await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.annotate("see DLR"), "see @DLR@");
  }

  #[tokio::test]
  async fn expired_cache_picks_up_new_references() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let cache = ReferenceCache::new(Duration::ZERO);

    let stale = cache.annotator(&store).await.unwrap();
    assert_eq!(stale.annotate("see DLR"), "see DLR");

    store.add_reference("DLR", true).await.unwrap();
    let fresh = cache.annotator(&store).await.unwrap();
    assert_eq!(fresh.annotate("see DLR"), "see @DLR@");
  }
}

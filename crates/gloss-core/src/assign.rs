//! The assignment engine — which entry should an annotator work on next.

use std::collections::HashSet;

use crate::entry::Entry;
use crate::store::AnnotationStore;
use crate::user::UserId;

/// Pick the next entry for `user_id`, or `None` when no work is available.
///
/// Policy, in order:
/// 1. Entries with at least one annotation but fewer than `cap`, ascending
///    by id, skipping entries the user has already annotated.
/// 2. Otherwise the lowest-id entry that has page associations and no
///    annotations at all.
/// 3. Otherwise `None`.
///
/// Best-effort under concurrency: two simultaneous requests can both pick
/// the same under-assigned entry and push it past `cap`. There is no
/// locking around the read-then-write sequence; the cap is a policy, not an
/// invariant.
pub async fn next_entry<S: AnnotationStore>(
  store: &S,
  user_id: UserId,
  cap: u32,
) -> Result<Option<Entry>, S::Error> {
  let under_assigned = store.under_assigned_entry_ids(cap).await?;
  let already_annotated: HashSet<_> =
    store.entry_ids_annotated_by(user_id).await?.into_iter().collect();

  for entry_id in under_assigned {
    if already_annotated.contains(&entry_id) {
      continue;
    }
    if let Some(entry) = store.get_entry(entry_id).await? {
      return Ok(Some(entry));
    }
  }

  store.first_unannotated_entry_with_pages().await
}

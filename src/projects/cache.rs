//! In-memory cache state for project queries.

use std::collections::HashMap;

use crate::cache::{Slot, SlotSnapshot};

use super::types::{Project, ProjectPatch};

/// Cache entries for the project resource.
///
/// List pages are keyed by offset; each offset is cached independently, so
/// a page only ever knows its own length. Detail entries are keyed by
/// project id; the total count has its own slot.
#[derive(Default)]
pub(crate) struct ProjectCache {
  lists: HashMap<usize, Slot<Vec<Project>>>,
  details: HashMap<String, Slot<Project>>,
  count: Slot<usize>,
}

/// Everything an optimistic patch may touch, captured before patching.
pub(crate) struct CacheSnapshot {
  lists: Vec<(usize, SlotSnapshot<Vec<Project>>)>,
  detail: Option<(String, SlotSnapshot<Project>)>,
}

impl ProjectCache {
  pub fn list_slot(&mut self, offset: usize) -> &mut Slot<Vec<Project>> {
    self.lists.entry(offset).or_default()
  }

  pub fn detail_slot(&mut self, id: &str) -> &mut Slot<Project> {
    self.details.entry(id.to_string()).or_default()
  }

  pub fn count_slot(&mut self) -> &mut Slot<usize> {
    &mut self.count
  }

  /// Cached page for an offset, regardless of staleness.
  pub fn list_value(&self, offset: usize) -> Option<Vec<Project>> {
    self.lists.get(&offset).and_then(|s| s.value().cloned())
  }

  /// Cached detail record, regardless of staleness.
  pub fn detail_value(&self, id: &str) -> Option<Project> {
    self.details.get(id).and_then(|s| s.value().cloned())
  }

  /// Detach every in-flight list fetch so a late resolution cannot
  /// overwrite an optimistic patch.
  pub fn cancel_lists(&mut self) {
    for slot in self.lists.values_mut() {
      slot.cancel();
    }
  }

  /// Expire every list page and the count. Values stay around to be served
  /// while the next access revalidates.
  pub fn invalidate_lists(&mut self) {
    for slot in self.lists.values_mut() {
      slot.invalidate();
    }
    self.count.invalidate();
  }

  /// Capture the state of everything `apply_patch` would touch for the
  /// given id: all cached list pages, plus the detail entry if present.
  pub fn snapshot_for(&self, id: &str) -> CacheSnapshot {
    CacheSnapshot {
      lists: self
        .lists
        .iter()
        .map(|(offset, slot)| (*offset, slot.snapshot()))
        .collect(),
      detail: self.details.get(id).map(|slot| (id.to_string(), slot.snapshot())),
    }
  }

  /// Merge the patch into the matching record of every cached page, and
  /// into the detail entry if one is cached.
  pub fn apply_patch(&mut self, patch: &ProjectPatch) {
    for slot in self.lists.values_mut() {
      if let Some(page) = slot.value() {
        let mut page = page.clone();
        for project in page.iter_mut().filter(|p| p.id == patch.id) {
          patch.apply_to(project);
        }
        slot.put(page);
      }
    }

    if let Some(slot) = self.details.get_mut(&patch.id) {
      if let Some(project) = slot.value() {
        let mut project = project.clone();
        patch.apply_to(&mut project);
        slot.put(project);
      }
    }
  }

  /// Put every snapshotted slot back exactly as captured.
  pub fn restore(&mut self, snapshot: CacheSnapshot) {
    for (offset, slot_snapshot) in snapshot.lists {
      self.lists.entry(offset).or_default().restore(slot_snapshot);
    }
    if let Some((id, slot_snapshot)) = snapshot.detail {
      self.details.entry(id).or_default().restore(slot_snapshot);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::projects::ProjectDraft;
  use std::time::Duration;

  const WINDOW: Duration = Duration::from_secs(300);

  fn project(name: &str) -> Project {
    Project::from_draft(ProjectDraft {
      name: name.to_string(),
      description: String::new(),
      start_date: "2024-01-01".parse().unwrap(),
      end_date: "2024-12-31".parse().unwrap(),
      manager: "Ada".to_string(),
    })
  }

  #[test]
  fn patch_updates_every_cached_page_and_the_detail_entry() {
    let mut cache = ProjectCache::default();
    let target = project("Target");
    let other = project("Other");

    cache.list_slot(0).install(vec![target.clone(), other.clone()]);
    cache.list_slot(10).install(vec![target.clone()]);
    cache.detail_slot(&target.id).install(target.clone());

    cache.apply_patch(&ProjectPatch::favorite(&target.id, true));

    for offset in [0, 10] {
      let page = cache.list_value(offset).unwrap();
      assert!(page.iter().find(|p| p.id == target.id).unwrap().is_favorite);
    }
    assert!(cache.detail_value(&target.id).unwrap().is_favorite);
    // untouched record stays untouched
    let page = cache.list_value(0).unwrap();
    assert!(!page.iter().find(|p| p.id == other.id).unwrap().is_favorite);
  }

  #[test]
  fn patch_skips_uncached_detail() {
    let mut cache = ProjectCache::default();
    let target = project("Target");
    cache.list_slot(0).install(vec![target.clone()]);

    cache.apply_patch(&ProjectPatch::favorite(&target.id, true));
    assert!(cache.detail_value(&target.id).is_none());
  }

  #[test]
  fn snapshot_then_restore_undoes_a_patch_exactly() {
    let mut cache = ProjectCache::default();
    let target = project("Target");
    cache.list_slot(0).install(vec![target.clone()]);
    cache.detail_slot(&target.id).install(target.clone());

    let snapshot = cache.snapshot_for(&target.id);
    cache.apply_patch(&ProjectPatch::favorite(&target.id, true));
    cache.restore(snapshot);

    let page = cache.list_value(0).unwrap();
    assert!(!page[0].is_favorite);
    assert!(!cache.detail_value(&target.id).unwrap().is_favorite);
    // freshness came back with the snapshot
    assert!(cache.list_slot(0).fresh(WINDOW).is_some());
  }

  #[test]
  fn invalidate_expires_pages_and_count_but_keeps_values() {
    let mut cache = ProjectCache::default();
    cache.list_slot(0).install(vec![project("A")]);
    cache.count_slot().install(1);

    cache.invalidate_lists();

    assert!(cache.list_slot(0).fresh(WINDOW).is_none());
    assert!(cache.count_slot().fresh(WINDOW).is_none());
    assert!(cache.list_value(0).is_some());
    assert_eq!(cache.count_slot().value(), Some(&1));
  }

  #[test]
  fn cancel_lists_bumps_every_page_generation() {
    let mut cache = ProjectCache::default();
    cache.list_slot(0).install(vec![]);
    cache.list_slot(10).install(vec![]);
    let before: Vec<u64> = [0, 10].iter().map(|o| cache.list_slot(*o).generation()).collect();

    cache.cancel_lists();

    for (i, offset) in [0, 10].iter().enumerate() {
      assert_eq!(cache.list_slot(*offset).generation(), before[i] + 1);
    }
  }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A project record as it is persisted and served.
///
/// Field names serialize in camelCase to match the persisted blob layout
/// (`startDate`, `isFavorite`, ...). Dates round-trip as ISO-8601
/// `YYYY-MM-DD` strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
  /// Opaque unique identifier, assigned at creation and immutable.
  pub id: String,
  pub name: String,
  pub description: String,
  pub start_date: NaiveDate,
  pub end_date: NaiveDate,
  /// Responsible person
  pub manager: String,
  pub is_favorite: bool,
}

impl Project {
  /// Materialize a new record from a draft: fresh unique id, never a
  /// favorite at birth.
  pub fn from_draft(draft: ProjectDraft) -> Self {
    Self {
      id: Uuid::new_v4().to_string(),
      name: draft.name,
      description: draft.description,
      start_date: draft.start_date,
      end_date: draft.end_date,
      manager: draft.manager,
      is_favorite: false,
    }
  }
}

/// Input for creating a project: everything except the generated id and the
/// favorite flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDraft {
  pub name: String,
  pub description: String,
  pub start_date: NaiveDate,
  pub end_date: NaiveDate,
  pub manager: String,
}

/// Partial update for an existing project, addressed by id.
///
/// Only supplied fields are merged into the target record; `None` fields are
/// left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPatch {
  pub id: String,
  pub name: Option<String>,
  pub description: Option<String>,
  pub start_date: Option<NaiveDate>,
  pub end_date: Option<NaiveDate>,
  pub manager: Option<String>,
  pub is_favorite: Option<bool>,
}

impl ProjectPatch {
  /// An empty patch for the given id.
  pub fn new(id: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      ..Self::default()
    }
  }

  /// Patch that only toggles the favorite flag.
  pub fn favorite(id: impl Into<String>, is_favorite: bool) -> Self {
    Self {
      id: id.into(),
      is_favorite: Some(is_favorite),
      ..Self::default()
    }
  }

  /// Whether this patch changes the favorite flag. Favorite changes take the
  /// optimistic update path in the cached client.
  pub fn touches_favorite(&self) -> bool {
    self.is_favorite.is_some()
  }

  /// Merge the supplied fields into `project`. The id is never changed.
  pub fn apply_to(&self, project: &mut Project) {
    if let Some(name) = &self.name {
      project.name = name.clone();
    }
    if let Some(description) = &self.description {
      project.description = description.clone();
    }
    if let Some(start_date) = self.start_date {
      project.start_date = start_date;
    }
    if let Some(end_date) = self.end_date {
      project.end_date = end_date;
    }
    if let Some(manager) = &self.manager {
      project.manager = manager.clone();
    }
    if let Some(is_favorite) = self.is_favorite {
      project.is_favorite = is_favorite;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
  }

  fn sample_draft() -> ProjectDraft {
    ProjectDraft {
      name: "Apollo".to_string(),
      description: "Lunar program".to_string(),
      start_date: date("2024-01-15"),
      end_date: date("2024-06-30"),
      manager: "Margaret".to_string(),
    }
  }

  #[test]
  fn from_draft_assigns_unique_ids_and_clears_favorite() {
    let a = Project::from_draft(sample_draft());
    let b = Project::from_draft(sample_draft());

    assert_ne!(a.id, b.id);
    assert!(!a.is_favorite);
    assert!(!b.is_favorite);
    assert_eq!(a.name, "Apollo");
  }

  #[test]
  fn serializes_with_camel_case_fields_and_plain_dates() {
    let project = Project {
      id: "p-1".to_string(),
      name: "Apollo".to_string(),
      description: "Lunar program".to_string(),
      start_date: date("2024-01-15"),
      end_date: date("2024-06-30"),
      manager: "Margaret".to_string(),
      is_favorite: true,
    };

    let json = serde_json::to_value(&project).unwrap();
    assert_eq!(json["startDate"], "2024-01-15");
    assert_eq!(json["endDate"], "2024-06-30");
    assert_eq!(json["isFavorite"], true);
    assert_eq!(json["manager"], "Margaret");

    let back: Project = serde_json::from_value(json).unwrap();
    assert_eq!(back, project);
  }

  #[test]
  fn patch_merges_only_supplied_fields() {
    let mut project = Project::from_draft(sample_draft());
    let original = project.clone();

    let patch = ProjectPatch {
      id: project.id.clone(),
      name: Some("Artemis".to_string()),
      end_date: Some(date("2025-01-01")),
      ..ProjectPatch::default()
    };
    patch.apply_to(&mut project);

    assert_eq!(project.name, "Artemis");
    assert_eq!(project.end_date, date("2025-01-01"));
    assert_eq!(project.description, original.description);
    assert_eq!(project.start_date, original.start_date);
    assert_eq!(project.manager, original.manager);
    assert_eq!(project.is_favorite, original.is_favorite);
  }

  #[test]
  fn favorite_patch_touches_favorite() {
    assert!(ProjectPatch::favorite("p-1", true).touches_favorite());
    assert!(!ProjectPatch::new("p-1").touches_favorite());
  }
}

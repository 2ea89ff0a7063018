use crate::config::DuplicatePolicy;
use crate::error::{CanvasError, Result};
use crate::types::SceneRect;

/// One outstanding generation request, materialized as a placeholder.
#[derive(Clone, Debug, PartialEq)]
pub struct GhostEntry {
    /// Correlation id shared with the placeholder shape and the completion event
    pub id: String,
    pub scene_x: f64,
    pub scene_y: f64,
    pub width: f64,
    pub height: f64,
    pub prompt: Option<String>,
    /// Milliseconds since the Unix epoch
    pub created_at: f64,
}

impl GhostEntry {
    pub fn new(id: impl Into<String>, rect: SceneRect, prompt: Option<String>, created_at: f64) -> Self {
        Self {
            id: id.into(),
            scene_x: rect.x,
            scene_y: rect.y,
            width: rect.width,
            height: rect.height,
            prompt,
            created_at,
        }
    }

    pub fn rect(&self) -> SceneRect {
        SceneRect::new(self.scene_x, self.scene_y, self.width, self.height)
    }
}

/// Fields of a pending ghost that may change. Geometry is fixed at creation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GhostPatch {
    pub prompt: Option<String>,
}

/// Pending ghosts keyed by id, kept in insertion order.
#[derive(Clone, Debug, Default)]
pub struct GhostRegistry {
    entries: Vec<GhostEntry>,
    policy: DuplicatePolicy,
}

impl GhostRegistry {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            entries: Vec::new(),
            policy,
        }
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Insert an entry. A duplicate id is rejected or overwritten in place
    /// depending on the policy; the returned entry is the one replaced, if any.
    pub fn add(&mut self, entry: GhostEntry) -> Result<Option<GhostEntry>> {
        match self.entries.iter().position(|e| e.id == entry.id) {
            None => {
                self.entries.push(entry);
                Ok(None)
            }
            Some(_) if self.policy == DuplicatePolicy::Reject => {
                Err(CanvasError::DuplicateGhost(entry.id))
            }
            Some(pos) => Ok(Some(std::mem::replace(&mut self.entries[pos], entry))),
        }
    }

    /// Remove an entry; absent ids are a no-op
    pub fn remove(&mut self, id: &str) -> Option<GhostEntry> {
        let pos = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(pos))
    }

    /// Merge a patch into an existing entry; returns whether anything matched
    pub fn update(&mut self, id: &str, patch: GhostPatch) -> bool {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                if let Some(prompt) = patch.prompt {
                    entry.prompt = Some(prompt);
                }
                true
            }
            None => false,
        }
    }

    /// Snapshot for rendering
    pub fn list(&self) -> Vec<GhostEntry> {
        self.entries.clone()
    }

    pub fn get(&self, id: &str) -> Option<&GhostEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry, returning them
    pub fn clear(&mut self) -> Vec<GhostEntry> {
        std::mem::take(&mut self.entries)
    }

    /// Entries created strictly before `cutoff` (ms)
    pub fn older_than(&self, cutoff: f64) -> Vec<GhostEntry> {
        self.entries
            .iter()
            .filter(|e| e.created_at < cutoff)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, created_at: f64) -> GhostEntry {
        GhostEntry::new(
            id,
            SceneRect::new(100.0, 100.0, 512.0, 512.0),
            Some("a red fox".to_string()),
            created_at,
        )
    }

    #[test]
    fn test_add_and_get() {
        let mut registry = GhostRegistry::default();
        assert!(registry.add(entry("g1", 0.0)).unwrap().is_none());

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("g1").unwrap().rect(), SceneRect::new(100.0, 100.0, 512.0, 512.0));
    }

    #[test]
    fn test_duplicate_rejected_by_default() {
        let mut registry = GhostRegistry::default();
        registry.add(entry("g1", 0.0)).unwrap();

        let err = registry.add(entry("g1", 5.0)).unwrap_err();
        assert!(matches!(err, CanvasError::DuplicateGhost(id) if id == "g1"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("g1").unwrap().created_at, 0.0);
    }

    #[test]
    fn test_duplicate_overwrite_keeps_position() {
        let mut registry = GhostRegistry::new(DuplicatePolicy::Overwrite);
        registry.add(entry("g1", 0.0)).unwrap();
        registry.add(entry("g2", 1.0)).unwrap();

        let replaced = registry.add(entry("g1", 9.0)).unwrap();
        assert_eq!(replaced.unwrap().created_at, 0.0);

        let ids: Vec<_> = registry.list().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["g1", "g2"]);
        assert_eq!(registry.get("g1").unwrap().created_at, 9.0);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut registry = GhostRegistry::default();
        registry.add(entry("g1", 0.0)).unwrap();

        assert!(registry.remove("missing").is_none());
        assert!(registry.remove("g1").is_some());
        assert!(registry.remove("g1").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_update_merges_prompt_only() {
        let mut registry = GhostRegistry::default();
        registry.add(entry("g1", 0.0)).unwrap();

        assert!(registry.update(
            "g1",
            GhostPatch {
                prompt: Some("a blue fox".to_string())
            }
        ));
        assert!(!registry.update("missing", GhostPatch::default()));

        let g1 = registry.get("g1").unwrap();
        assert_eq!(g1.prompt.as_deref(), Some("a blue fox"));
        assert_eq!(g1.width, 512.0);
    }

    #[test]
    fn test_list_is_a_snapshot() {
        let mut registry = GhostRegistry::default();
        registry.add(entry("g1", 0.0)).unwrap();

        let mut snapshot = registry.list();
        snapshot.clear();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_older_than_and_clear() {
        let mut registry = GhostRegistry::default();
        registry.add(entry("old", 10.0)).unwrap();
        registry.add(entry("new", 100.0)).unwrap();

        let stale = registry.older_than(50.0);
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].id, "old");

        assert_eq!(registry.clear().len(), 2);
        assert!(registry.is_empty());
    }
}

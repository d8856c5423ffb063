use serde::{Deserialize, Serialize};

/// A short text entry with zero or more tags attached by the service.
///
/// Notes are immutable once loaded; a list fetch replaces them
/// wholesale and a successful create prepends the returned record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub text: String,
    pub tags: Vec<String>,
}

/// The active set of tags restricting which notes are fetched.
///
/// Order-preserving with insert-if-absent semantics: the first
/// insertion of a tag fixes its position and later insertions of the
/// same tag are no-ops. An empty filter means no restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFilter {
    tags: Vec<String>,
}

impl TagFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `tag` if absent. Returns whether the filter changed.
    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if self.tags.iter().any(|existing| *existing == tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    /// Removes every occurrence of `tag`. Returns whether the filter
    /// changed.
    pub fn remove(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|existing| existing != tag);
        self.tags.len() != before
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|existing| existing == tag)
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Tags in first-insertion order.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_preserves_first_insertion_order() {
        let mut filter = TagFilter::new();
        assert!(filter.insert("work"));
        assert!(filter.insert("home"));
        assert!(filter.insert("errands"));
        assert_eq!(filter.tags(), ["work", "home", "errands"]);
    }

    #[test]
    fn insert_of_present_tag_is_a_noop() {
        let mut filter = TagFilter::new();
        assert!(filter.insert("work"));
        assert!(!filter.insert("work"));
        assert_eq!(filter.tags(), ["work"]);
    }

    #[test]
    fn remove_reports_whether_anything_changed() {
        let mut filter = TagFilter::new();
        filter.insert("work");
        filter.insert("home");
        assert!(filter.remove("work"));
        assert!(!filter.remove("work"));
        assert_eq!(filter.tags(), ["home"]);
    }

    #[test]
    fn empty_filter_contains_nothing() {
        let filter = TagFilter::new();
        assert!(filter.is_empty());
        assert!(!filter.contains("work"));
    }
}

use super::{Coordinate, TreeNode};
use std::collections::HashMap;

/// Coordinate -> resolved node, filled lazily while the projection descends.
///
/// Invariant: entries are inserted root-down, so whenever a coordinate is
/// cached all of its ancestors are cached too. `insert` checks this in
/// debug builds.
#[derive(Debug, Default)]
pub struct PathCache {
    entries: HashMap<Coordinate, TreeNode>,
}

impl PathCache {
    pub fn get(&self, coord: &Coordinate) -> Option<&TreeNode> {
        self.entries.get(coord)
    }

    pub fn contains(&self, coord: &Coordinate) -> bool {
        self.entries.contains_key(coord)
    }

    /// Insert without replacing an existing entry
    pub fn insert(&mut self, coord: Coordinate, node: TreeNode) {
        debug_assert!(
            coord
                .parent()
                .map(|p| p.is_root() || self.entries.contains_key(&p))
                .unwrap_or(false),
            "path cache populated with a gap at {}",
            coord
        );
        self.entries.entry(coord).or_insert(node);
    }

    /// Replace a cached node in place, e.g. after hydrating a page
    pub fn replace(&mut self, coord: &Coordinate, node: TreeNode) {
        if let Some(entry) = self.entries.get_mut(coord) {
            *entry = node;
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Page id -> the coordinates the page currently appears at (one per tag it
/// carries, or one under the untagged bucket). Only valid between flush
/// points; any index mutation clears it together with the path cache.
#[derive(Debug, Default)]
pub struct ReverseCache {
    entries: HashMap<i64, Vec<Coordinate>>,
}

impl ReverseCache {
    pub fn get(&self, page_id: i64) -> Option<&Vec<Coordinate>> {
        self.entries.get(&page_id)
    }

    pub fn insert(&mut self, page_id: i64, coords: Vec<Coordinate>) {
        self.entries.entry(page_id).or_insert(coords);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{timestamp_to_datetime, Tag};

    fn tag_node(id: i64, name: &str) -> TreeNode {
        TreeNode::Tag(Tag {
            id,
            name: name.to_string(),
            created_at: timestamp_to_datetime(0),
        })
    }

    #[test]
    fn test_insert_keeps_first_entry() {
        let mut cache = PathCache::default();
        let coord = Coordinate::new(vec![1]);
        cache.insert(coord.clone(), tag_node(1, "work"));
        cache.insert(coord.clone(), tag_node(2, "home"));

        assert_eq!(cache.get(&coord), Some(&tag_node(1, "work")));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut cache = PathCache::default();
        cache.insert(Coordinate::new(vec![0]), TreeNode::Untagged);
        assert!(!cache.is_empty());
        cache.clear();
        assert!(cache.is_empty());

        let mut reverse = ReverseCache::default();
        reverse.insert(7, vec![Coordinate::new(vec![0, 0])]);
        assert!(!reverse.is_empty());
        reverse.clear();
        assert!(reverse.is_empty());
    }

    #[test]
    fn test_replace_only_touches_existing() {
        let mut cache = PathCache::default();
        let coord = Coordinate::new(vec![1]);
        cache.replace(&coord, tag_node(1, "work"));
        assert!(cache.is_empty());

        cache.insert(coord.clone(), tag_node(1, "work"));
        cache.replace(&coord, tag_node(1, "renamed"));
        assert_eq!(cache.get(&coord), Some(&tag_node(1, "renamed")));
    }
}

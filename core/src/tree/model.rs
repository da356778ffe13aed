use super::cache::{PathCache, ReverseCache};
use super::sync::{PendingDelete, TreeEdit};
use super::{Coordinate, DisplayAttrs, TextColor, TextEmphasis, TreeNode, UNTAGGED_LABEL};
use crate::index::Index;
use crate::models::{Page, PagePath};
use crate::Result;

/// Window of consecutive siblings loaded per cache miss
pub const PAGE_WINDOW: usize = 20;

/// Lazy two-level projection of the index: tags (plus the untagged bucket)
/// at the top, tagged pages below them, then each page's own sub-hierarchy.
///
/// Rows are computed on demand from index queries and cached per coordinate.
/// The caches are transient: populating reads schedule a flush that the host
/// runs at its next idle point, and every structural index event flushes
/// them immediately (see `sync`).
pub struct TagTreeModel {
    pub(super) path_cache: PathCache,
    pub(super) reverse_cache: ReverseCache,
    pub(super) flush_scheduled: bool,
    pub(super) pending_delete: Option<PendingDelete>,
    pub(super) edits: Vec<TreeEdit>,
}

impl Default for TagTreeModel {
    fn default() -> Self {
        Self::new()
    }
}

impl TagTreeModel {
    pub fn new() -> Self {
        Self {
            path_cache: PathCache::default(),
            reverse_cache: ReverseCache::default(),
            flush_scheduled: false,
            pending_delete: None,
            edits: Vec::new(),
        }
    }

    /// Resolve a coordinate to a node, descending one segment at a time and
    /// filling the path cache with a window of siblings per miss. Returns
    /// None for the root, for offsets past the end, and for coordinates
    /// whose ancestor chain no longer exists.
    pub fn resolve(&mut self, index: &Index, coord: &Coordinate) -> Result<Option<TreeNode>> {
        if coord.is_root() {
            return Ok(None);
        }

        if !self.path_cache.contains(coord) {
            for depth in 1..=coord.depth() {
                let prefix = coord.prefix(depth);
                if self.path_cache.contains(&prefix) {
                    continue;
                }
                let parent_coord = coord.prefix(depth - 1);
                let offset = match prefix.last() {
                    Some(offset) => offset,
                    None => break,
                };
                self.load_window(index, &parent_coord, offset)?;
                if !self.path_cache.contains(&prefix) {
                    self.schedule_flush();
                    return Ok(None);
                }
            }
        }

        self.schedule_flush();
        Ok(self.path_cache.get(coord).cloned())
    }

    /// Load up to `PAGE_WINDOW` children of `parent_coord` into the path
    /// cache, starting at or just below `offset`.
    fn load_window(
        &mut self,
        index: &Index,
        parent_coord: &Coordinate,
        offset: usize,
    ) -> Result<()> {
        let parent = if parent_coord.is_root() {
            None
        } else {
            match self.path_cache.get(parent_coord) {
                Some(node) => Some(node.clone()),
                // Broken ancestor chain; the caller reports absent
                None => return Ok(()),
            }
        };

        let (start, nodes): (usize, Vec<TreeNode>) = match parent {
            None => {
                // The first tree level are tags, with the untagged bucket
                // occupying offset 0
                if offset == 0 {
                    let mut nodes = vec![TreeNode::Untagged];
                    nodes.extend(
                        index
                            .list_tags(None, 0, Some(PAGE_WINDOW))?
                            .into_iter()
                            .map(TreeNode::Tag),
                    );
                    (0, nodes)
                } else {
                    let tags = index.list_tags(None, offset - 1, Some(PAGE_WINDOW))?;
                    (offset, tags.into_iter().map(TreeNode::Tag).collect())
                }
            }
            Some(TreeNode::Untagged) => (
                offset,
                index
                    .list_untagged(offset, Some(PAGE_WINDOW))?
                    .into_iter()
                    .map(TreeNode::Page)
                    .collect(),
            ),
            Some(TreeNode::Tag(tag)) => (
                offset,
                index
                    .list_tagged(&tag, offset, Some(PAGE_WINDOW))?
                    .into_iter()
                    .map(TreeNode::Page)
                    .collect(),
            ),
            Some(TreeNode::Page(page)) => {
                let page = self.hydrated(index, parent_coord, page)?;
                (
                    offset,
                    index
                        .list_pages(Some(&page), offset, Some(PAGE_WINDOW))?
                        .into_iter()
                        .map(TreeNode::Page)
                        .collect(),
                )
            }
        };

        for (j, node) in nodes.into_iter().enumerate() {
            self.path_cache.insert(parent_coord.child(start + j), node);
        }
        Ok(())
    }

    /// Hydrate a cached page before descending into its children
    fn hydrated(&mut self, index: &Index, coord: &Coordinate, page: Page) -> Result<Page> {
        if page.has_data {
            return Ok(page);
        }
        let page = index.lookup_data(page)?;
        self.path_cache.replace(coord, TreeNode::Page(page.clone()));
        Ok(page)
    }

    /// Number of children of a node; None asks for the root, which counts
    /// all tags plus the untagged bucket
    pub fn child_count(&self, index: &Index, node: Option<&TreeNode>) -> Result<usize> {
        match node {
            None => Ok(index.n_list_tags(None)? + 1),
            Some(TreeNode::Untagged) => index.n_list_untagged(),
            Some(TreeNode::Tag(tag)) => index.n_list_tagged(tag),
            Some(TreeNode::Page(page)) => index.n_list_pages(Some(page)),
        }
    }

    pub fn has_children(&self, index: &Index, node: &TreeNode) -> Result<bool> {
        match node {
            TreeNode::Untagged => Ok(index.n_list_untagged()? > 0),
            TreeNode::Tag(tag) => Ok(index.n_list_tagged(tag)? > 0),
            TreeNode::Page(page) => {
                if page.has_data {
                    Ok(page.has_children)
                } else {
                    Ok(index.n_list_pages(Some(page))? > 0)
                }
            }
        }
    }

    pub fn display_attributes(&self, node: &TreeNode) -> DisplayAttrs {
        match node {
            TreeNode::Untagged => DisplayAttrs {
                label: UNTAGGED_LABEL.to_string(),
                key: String::new(),
                is_empty_marker: true,
                emphasis: TextEmphasis::Italic,
                color: TextColor::Muted,
            },
            TreeNode::Tag(tag) => DisplayAttrs {
                label: tag.name.clone(),
                key: tag.name.clone(),
                is_empty_marker: false,
                emphasis: TextEmphasis::Normal,
                color: TextColor::Normal,
            },
            TreeNode::Page(page) => DisplayAttrs {
                label: page.basename().to_string(),
                key: page.path.as_str().to_string(),
                is_empty_marker: false,
                emphasis: TextEmphasis::Normal,
                color: TextColor::Normal,
            },
        }
    }

    /// All coordinates a page currently appears at. Walks the page and each
    /// of its ancestors up to (excluding) the root: every tag an ancestor
    /// carries contributes one coordinate, an untagged ancestor contributes
    /// one under the untagged bucket. Returns None for unknown pages and
    /// for the root namespace.
    pub fn reverse_lookup(
        &mut self,
        index: &Index,
        path: &PagePath,
    ) -> Result<Option<Vec<Coordinate>>> {
        if path.is_root() {
            return Ok(None);
        }
        let page = match index.lookup_path(path)? {
            Some(page) => page,
            None => return Ok(None),
        };
        if let Some(coords) = self.reverse_cache.get(page.id) {
            return Ok(Some(coords.clone()));
        }

        let all_tags = index.list_tags(None, 0, None)?;
        // Offsets from the ancestor currently visited down to the page
        let mut child_offsets: Vec<usize> = Vec::new();
        let mut coords: Vec<Coordinate> = Vec::new();
        let mut child: Option<Page> = None;

        for segment_path in page.path.self_and_parents() {
            let segment = match &child {
                None => page.clone(),
                Some(_) => match index.lookup_path(&segment_path)? {
                    Some(p) => p,
                    None => return Ok(None),
                },
            };

            if let Some(c) = &child {
                let siblings = index.list_pages(Some(&segment), 0, None)?;
                match siblings.iter().position(|s| s.id == c.id) {
                    Some(offset) => child_offsets.insert(0, offset),
                    None => return Ok(None),
                }
            }

            let tags = index.list_tags(Some(&segment), 0, None)?;
            if tags.is_empty() {
                let untagged = index.list_untagged(0, None)?;
                match untagged.iter().position(|p| p.id == segment.id) {
                    Some(pos) => coords.push(Coordinate::new(vec![0, pos]).join(&child_offsets)),
                    None => return Ok(None),
                }
            } else {
                for tag in &tags {
                    let tag_index = match all_tags.iter().position(|t| t.id == tag.id) {
                        Some(i) => i,
                        None => return Ok(None),
                    };
                    let tagged = index.list_tagged(tag, 0, None)?;
                    match tagged.iter().position(|p| p.id == segment.id) {
                        Some(pos) => coords
                            .push(Coordinate::new(vec![tag_index + 1, pos]).join(&child_offsets)),
                        None => return Ok(None),
                    }
                }
            }

            child = Some(segment);
        }

        self.reverse_cache.insert(page.id, coords.clone());
        self.schedule_flush();
        Ok(Some(coords))
    }

    /// Drain the structural edits produced by index notifications
    pub fn take_edits(&mut self) -> Vec<TreeEdit> {
        std::mem::take(&mut self.edits)
    }

    /// Clear both caches immediately
    pub fn flush(&mut self) {
        self.path_cache.clear();
        self.reverse_cache.clear();
        self.flush_scheduled = false;
    }

    pub(super) fn schedule_flush(&mut self) {
        self.flush_scheduled = true;
    }

    pub fn flush_is_scheduled(&self) -> bool {
        self.flush_scheduled
    }

    /// Run the deferred flush. The host calls this once its event-loop turn
    /// is over, so a flush never lands in the middle of a multi-segment
    /// resolution or between the halves of a two-phase index event.
    pub fn idle_flush(&mut self) {
        if self.flush_scheduled && self.pending_delete.is_none() {
            self.flush();
        }
    }
}

use std::cell::RefCell;
use std::collections::HashSet;
use std::path::Path;
use std::rc::Rc;

use tagtree_core::index::Index;
use tagtree_core::models::{Page, PagePath};
use tagtree_core::storage::Database;
use tagtree_core::tree::{Coordinate, TagTreeModel, TreeNode};
use tagtree_core::Result;

/// One row of the flattened, currently-visible tree.
#[derive(Clone, Debug)]
pub struct TreeRow {
    pub coord: Coordinate,
    pub node: TreeNode,
    pub depth: usize,
    pub has_children: bool,
    pub expanded: bool,
}

pub struct App {
    pub index: Index,
    pub model: Rc<RefCell<TagTreeModel>>,
    pub rows: Vec<TreeRow>,
    pub selected: usize,
    pub expanded: HashSet<Coordinate>,
    pub status: String,
    pub last_activated: Option<Page>,
    pub should_quit: bool,
}

impl App {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let database = Database::new(db_path);
        let conn = database.get_or_create()?;
        let mut index = Index::new(conn);

        let model = Rc::new(RefCell::new(TagTreeModel::new()));
        index.connect(model.clone());

        let mut app = Self {
            index,
            model,
            rows: Vec::new(),
            selected: 0,
            expanded: HashSet::new(),
            status: "ready".to_string(),
            last_activated: None,
            should_quit: false,
        };
        app.rebuild_rows()?;
        Ok(app)
    }

    /// Seed a small notebook on first run so the tree has something to show.
    pub fn initialize_sample_data(&mut self) -> Result<()> {
        if self.index.n_list_pages(None)? > 0 {
            return Ok(());
        }

        for path in [
            "projects:alpha",
            "projects:beta",
            "journal:2026:august",
            "inbox",
        ] {
            self.index.touch_page(&PagePath::new(path))?;
        }
        self.index.add_tag(&PagePath::new("projects:alpha"), "work")?;
        self.index.add_tag(&PagePath::new("projects:beta"), "work")?;
        self.index.add_tag(&PagePath::new("journal:2026:august"), "home")?;

        // Seeding is not an interactive mutation, drop its edit stream.
        self.model.borrow_mut().take_edits();
        self.model.borrow_mut().idle_flush();
        self.rebuild_rows()?;
        Ok(())
    }

    /// Recompute the visible rows from the projection, honoring expansion state.
    pub fn rebuild_rows(&mut self) -> Result<()> {
        let mut rows = Vec::new();
        {
            let mut model = self.model.borrow_mut();
            let top = model.child_count(&self.index, None)?;
            for i in 0..top {
                Self::collect_rows(
                    &mut model,
                    &self.index,
                    &self.expanded,
                    Coordinate::root().child(i),
                    0,
                    &mut rows,
                )?;
            }
        }
        self.rows = rows;
        if self.selected >= self.rows.len() {
            self.selected = self.rows.len().saturating_sub(1);
        }
        Ok(())
    }

    fn collect_rows(
        model: &mut TagTreeModel,
        index: &Index,
        expanded: &HashSet<Coordinate>,
        coord: Coordinate,
        depth: usize,
        rows: &mut Vec<TreeRow>,
    ) -> Result<()> {
        let Some(node) = model.resolve(index, &coord)? else {
            return Ok(());
        };
        let has_children = model.has_children(index, &node)?;
        let is_expanded = has_children && expanded.contains(&coord);
        rows.push(TreeRow {
            coord: coord.clone(),
            node: node.clone(),
            depth,
            has_children,
            expanded: is_expanded,
        });
        if is_expanded {
            let count = model.child_count(index, Some(&node))?;
            for i in 0..count {
                Self::collect_rows(model, index, expanded, coord.child(i), depth + 1, rows)?;
            }
        }
        Ok(())
    }

    pub fn selected_row(&self) -> Option<&TreeRow> {
        self.rows.get(self.selected)
    }

    pub fn select_up(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    pub fn select_down(&mut self) {
        if self.selected + 1 < self.rows.len() {
            self.selected += 1;
        }
    }

    pub fn expand_selected(&mut self) -> Result<()> {
        if let Some(row) = self.rows.get(self.selected) {
            if row.has_children && !row.expanded {
                self.expanded.insert(row.coord.clone());
                self.rebuild_rows()?;
            }
        }
        Ok(())
    }

    pub fn collapse_selected(&mut self) -> Result<()> {
        if let Some(row) = self.rows.get(self.selected) {
            if row.expanded {
                self.expanded.remove(&row.coord);
                self.rebuild_rows()?;
            } else if let Some(parent) = row.coord.parent() {
                if !parent.is_root() {
                    if let Some(pos) = self.rows.iter().position(|r| r.coord == parent) {
                        self.selected = pos;
                    }
                }
            }
        }
        Ok(())
    }

    /// Enter on a page row activates it; on a tag row it toggles expansion.
    pub fn activate_selected(&mut self) -> Result<Option<Page>> {
        let Some(row) = self.rows.get(self.selected) else {
            return Ok(None);
        };
        if row.coord.depth() >= 2 {
            if let Some(page) = row.node.as_page() {
                let page = page.clone();
                self.status = format!("activated {}", page.path);
                self.last_activated = Some(page.clone());
                return Ok(Some(page));
            }
        }
        if row.expanded {
            self.collapse_selected()?;
        } else {
            self.expand_selected()?;
        }
        Ok(None)
    }

    /// Attach `tag` to the selected page and refresh from the edit stream.
    pub fn tag_selected(&mut self, tag: &str) -> Result<()> {
        let Some(path) = self.selected_page_path() else {
            self.status = "select a page row to tag".to_string();
            return Ok(());
        };
        self.index.add_tag(&path, tag)?;
        self.after_mutation(&format!("tagged {} with {}", path, tag))
    }

    /// Detach `tag` from the selected page.
    pub fn untag_selected(&mut self, tag: &str) -> Result<()> {
        let Some(path) = self.selected_page_path() else {
            self.status = "select a page row to untag".to_string();
            return Ok(());
        };
        match self.index.remove_tag(&path, tag) {
            Ok(()) => self.after_mutation(&format!("removed {} from {}", tag, path)),
            Err(tagtree_core::Error::NotFound(_)) => {
                self.status = format!("{} is not tagged {}", path, tag);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn selected_page_path(&self) -> Option<PagePath> {
        self.rows
            .get(self.selected)
            .and_then(|row| row.node.as_page())
            .map(|page| page.path.clone())
    }

    fn after_mutation(&mut self, what: &str) -> Result<()> {
        let edits = self.model.borrow_mut().take_edits();
        self.status = format!("{} ({} tree edits)", what, edits.len());
        self.rebuild_rows()
    }

    /// Called once per main-loop turn; the projection's idle point.
    pub fn on_tick(&mut self) {
        self.model.borrow_mut().idle_flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagtree_core::tree::UNTAGGED_LABEL;
    use tempfile::tempdir;

    fn test_app() -> (App, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let app = App::new(dir.path().join("tagtree.db")).unwrap();
        (app, dir)
    }

    #[test]
    fn test_empty_notebook_shows_only_untagged() {
        let (app, _dir) = test_app();
        assert_eq!(app.rows.len(), 1);
        let model = app.model.borrow();
        let attrs = model.display_attributes(&app.rows[0].node);
        assert_eq!(attrs.label, UNTAGGED_LABEL);
        assert!(!app.rows[0].has_children);
    }

    #[test]
    fn test_sample_data_rows() {
        let (mut app, _dir) = test_app();
        app.initialize_sample_data().unwrap();

        // untagged bucket plus tags in creation order
        let labels: Vec<String> = {
            let model = app.model.borrow();
            app.rows
                .iter()
                .map(|r| model.display_attributes(&r.node).label)
                .collect()
        };
        assert_eq!(labels, vec![UNTAGGED_LABEL, "work", "home"]);
        assert!(app.rows.iter().all(|r| r.depth == 0));
    }

    #[test]
    fn test_expand_tag_lists_tagged_pages() {
        let (mut app, _dir) = test_app();
        app.initialize_sample_data().unwrap();

        app.selected = 1; // "work"
        app.expand_selected().unwrap();

        let pages: Vec<String> = app
            .rows
            .iter()
            .filter(|r| r.depth == 1)
            .map(|r| r.node.as_page().unwrap().path.to_string())
            .collect();
        assert_eq!(pages, vec!["projects:alpha", "projects:beta"]);
    }

    #[test]
    fn test_collapse_jumps_to_parent() {
        let (mut app, _dir) = test_app();
        app.initialize_sample_data().unwrap();

        app.selected = 1;
        app.expand_selected().unwrap();
        app.selected = 2; // first child of "work"
        app.collapse_selected().unwrap();
        assert_eq!(app.selected, 1);
    }

    #[test]
    fn test_activate_page_row() {
        let (mut app, _dir) = test_app();
        app.initialize_sample_data().unwrap();

        app.selected = 1;
        app.expand_selected().unwrap();
        app.selected = 2;
        let page = app.activate_selected().unwrap().unwrap();
        assert_eq!(page.path.as_str(), "projects:alpha");
        assert!(app.last_activated.is_some());
    }

    #[test]
    fn test_activate_tag_row_toggles() {
        let (mut app, _dir) = test_app();
        app.initialize_sample_data().unwrap();

        app.selected = 1;
        assert!(app.activate_selected().unwrap().is_none());
        assert!(app.rows[1].expanded);
        assert!(app.activate_selected().unwrap().is_none());
        assert!(!app.rows[1].expanded);
    }

    #[test]
    fn test_tag_and_untag_selected() {
        let (mut app, _dir) = test_app();
        app.initialize_sample_data().unwrap();

        // expand the untagged bucket and star a page in it
        app.selected = 0;
        app.expand_selected().unwrap();
        app.selected = 1;
        app.tag_selected("starred").unwrap();
        app.on_tick();

        assert_eq!(app.index.n_list_tags(None).unwrap(), 3);

        // the starred page now sits under the new tag
        app.expanded.clear();
        app.rebuild_rows().unwrap();
        app.selected = 3; // "starred"
        app.expand_selected().unwrap();
        app.selected = 4;
        let path = app.selected_page_path().unwrap();
        app.untag_selected("starred").unwrap();
        app.on_tick();
        assert_eq!(app.index.n_list_tags(None).unwrap(), 2);
        assert!(app.index.lookup_path(&path).unwrap().is_some());
    }

    #[test]
    fn test_untag_untagged_page_is_reported() {
        let (mut app, _dir) = test_app();
        app.initialize_sample_data().unwrap();

        app.selected = 0;
        app.expand_selected().unwrap();
        app.selected = 1;
        app.untag_selected("starred").unwrap();
        assert!(app.status.contains("not tagged"));
    }
}

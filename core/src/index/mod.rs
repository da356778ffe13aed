mod events;

pub use events::{IndexEvent, IndexObserver};

use crate::models::{Page, PagePath, Tag};
use crate::storage::{Connection, PageRepository, TagRepository};
use crate::{Error, Result};
use std::cell::RefCell;
use std::rc::Rc;

/// Query and mutation facade over the page/tag store.
///
/// All queries take `&self`; mutations also take `&self` (SQLite handles the
/// writes) and emit `IndexEvent`s to connected observers synchronously,
/// interleaved with the commit so that `ToBe` halves see pre-mutation state.
pub struct Index {
    conn: Connection,
    observers: Vec<Rc<RefCell<dyn IndexObserver>>>,
}

impl Index {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            observers: Vec::new(),
        }
    }

    /// Register an observer for index notifications
    pub fn connect(&mut self, observer: Rc<RefCell<dyn IndexObserver>>) {
        self.observers.push(observer);
    }

    fn emit(&self, event: IndexEvent) -> Result<()> {
        for observer in &self.observers {
            observer.borrow_mut().on_index_event(self, &event)?;
        }
        Ok(())
    }

    // ---- queries ----

    /// List tags: all tags in canonical (creation) order when `page` is
    /// None, otherwise the tags carried by that page
    pub fn list_tags(
        &self,
        page: Option<&Page>,
        offset: usize,
        limit: Option<usize>,
    ) -> Result<Vec<Tag>> {
        match page {
            Some(p) => TagRepository::list_for_page(&self.conn, p.id, offset, limit),
            None => TagRepository::list_all(&self.conn, offset, limit),
        }
    }

    pub fn n_list_tags(&self, page: Option<&Page>) -> Result<usize> {
        match page {
            Some(p) => TagRepository::n_for_page(&self.conn, p.id),
            None => TagRepository::n_all(&self.conn),
        }
    }

    /// List the pages carrying a tag, in canonical (path) order
    pub fn list_tagged(&self, tag: &Tag, offset: usize, limit: Option<usize>) -> Result<Vec<Page>> {
        TagRepository::list_tagged(&self.conn, tag.id, offset, limit)
    }

    pub fn n_list_tagged(&self, tag: &Tag) -> Result<usize> {
        TagRepository::n_tagged(&self.conn, tag.id)
    }

    /// List the pages carrying no tags, in canonical (path) order
    pub fn list_untagged(&self, offset: usize, limit: Option<usize>) -> Result<Vec<Page>> {
        TagRepository::list_untagged(&self.conn, offset, limit)
    }

    pub fn n_list_untagged(&self) -> Result<usize> {
        TagRepository::n_untagged(&self.conn)
    }

    /// List the children of a page (None = root namespace), in canonical
    /// (basename) order
    pub fn list_pages(
        &self,
        parent: Option<&Page>,
        offset: usize,
        limit: Option<usize>,
    ) -> Result<Vec<Page>> {
        PageRepository::list_children(&self.conn, parent.map(|p| p.id), offset, limit)
    }

    pub fn n_list_pages(&self, parent: Option<&Page>) -> Result<usize> {
        PageRepository::n_children(&self.conn, parent.map(|p| p.id))
    }

    /// Look up a page by path. The returned row is bare; `lookup_data`
    /// hydrates it.
    pub fn lookup_path(&self, path: &PagePath) -> Result<Option<Page>> {
        PageRepository::lookup_by_path(&self.conn, path)
    }

    /// Fill in a page's `has_children` flag if it is not loaded yet
    pub fn lookup_data(&self, page: Page) -> Result<Page> {
        PageRepository::hydrate(&self.conn, page)
    }

    // ---- mutations ----

    /// Ensure a page exists, creating it and any missing ancestors.
    /// Emits `PageInserted` per created page, plus `PageHasChildrenToggled`
    /// on a parent gaining its first child.
    pub fn touch_page(&self, path: &PagePath) -> Result<Page> {
        if path.is_root() {
            return Err(Error::InvalidInput(
                "Cannot create a page at the root namespace".to_string(),
            ));
        }

        let mut chain = path.self_and_parents();
        chain.reverse();

        let mut parent: Option<Page> = None;
        let mut current: Option<Page> = None;
        for segment in chain {
            let page = match self.lookup_path(&segment)? {
                Some(existing) => existing,
                None => {
                    let parent_was_leaf = match &parent {
                        Some(p) => self.n_list_pages(Some(p))? == 0,
                        None => false,
                    };
                    let id = PageRepository::create(
                        &self.conn,
                        parent.as_ref().map(|p| p.id),
                        &segment,
                    )?;
                    let created = PageRepository::get_by_id(&self.conn, id)?;
                    self.emit(IndexEvent::PageInserted(created.clone()))?;
                    if parent_was_leaf {
                        if let Some(p) = &parent {
                            let refreshed = PageRepository::get_by_id(&self.conn, p.id)?;
                            self.emit(IndexEvent::PageHasChildrenToggled(refreshed))?;
                        }
                    }
                    created
                }
            };
            parent = Some(page.clone());
            current = Some(page);
        }

        current.ok_or_else(|| Error::InvalidInput("Empty page path".to_string()))
    }

    /// Record a content change on an existing page and emit `PageUpdated`
    pub fn update_page(&self, path: &PagePath) -> Result<Page> {
        let page = self
            .lookup_path(path)?
            .ok_or_else(|| Error::NotFound(format!("Page not found: {}", path)))?;
        PageRepository::touch_modified(&self.conn, page.id)?;
        let page = PageRepository::get_by_id(&self.conn, page.id)?;
        self.emit(IndexEvent::PageUpdated(page.clone()))?;
        Ok(page)
    }

    /// Delete a page and its subtree. Children are removed depth-first and
    /// tag associations are dropped through the normal removal path, so
    /// every row gets its own event pair before `PageToBeDeleted` /
    /// `PageDeleted` fire for this page.
    pub fn delete_page(&self, path: &PagePath) -> Result<()> {
        let page = self
            .lookup_path(path)?
            .ok_or_else(|| Error::NotFound(format!("Page not found: {}", path)))?;

        for child in self.list_pages(Some(&page), 0, None)? {
            self.delete_page(&child.path)?;
        }
        for tag in self.list_tags(Some(&page), 0, None)? {
            self.remove_tag(&page.path, &tag.name)?;
        }

        let parent = match page.path.parent() {
            Some(p) if !p.is_root() => self.lookup_path(&p)?,
            _ => None,
        };

        let page = PageRepository::get_by_id(&self.conn, page.id)?;
        self.emit(IndexEvent::PageToBeDeleted(page.clone()))?;
        PageRepository::delete(&self.conn, page.id)?;
        self.emit(IndexEvent::PageDeleted(page))?;

        if let Some(p) = parent {
            if self.n_list_pages(Some(&p))? == 0 {
                let refreshed = PageRepository::get_by_id(&self.conn, p.id)?;
                self.emit(IndexEvent::PageHasChildrenToggled(refreshed))?;
            }
        }

        Ok(())
    }

    /// Create a tag row without attaching it to any page. Emits
    /// `TagCreated` for a new name; a no-op for an existing one.
    pub fn create_tag(&self, name: &str) -> Result<Tag> {
        let name = Tag::normalize_name(name);
        if !Tag::is_valid_name(&name) {
            return Err(Error::InvalidInput(format!("Invalid tag name: {:?}", name)));
        }
        let (tag, created) = TagRepository::get_or_create(&self.conn, &name)?;
        if created {
            self.emit(IndexEvent::TagCreated(tag.clone()))?;
        }
        Ok(tag)
    }

    /// Attach a tag to a page, creating the tag row on first use.
    /// A no-op (without events) when the page already carries the tag.
    pub fn add_tag(&self, path: &PagePath, name: &str) -> Result<Tag> {
        let name = Tag::normalize_name(name);
        if !Tag::is_valid_name(&name) {
            return Err(Error::InvalidInput(format!("Invalid tag name: {:?}", name)));
        }
        let page = self
            .lookup_path(path)?
            .ok_or_else(|| Error::NotFound(format!("Page not found: {}", path)))?;

        let (tag, created) = TagRepository::get_or_create(&self.conn, &name)?;
        let already_tagged = self
            .list_tags(Some(&page), 0, None)?
            .iter()
            .any(|t| t.id == tag.id);
        if already_tagged {
            return Ok(tag);
        }

        if created {
            self.emit(IndexEvent::TagCreated(tag.clone()))?;
        }

        let first = TagRepository::n_for_page(&self.conn, page.id)? == 0;
        self.emit(IndexEvent::TagToBeInserted {
            tag: tag.clone(),
            page: page.clone(),
            first,
        })?;
        TagRepository::add_to_page(&self.conn, page.id, tag.id)?;
        self.emit(IndexEvent::TagInserted {
            tag: tag.clone(),
            page,
            first,
        })?;

        Ok(tag)
    }

    /// Detach a tag from a page. Drops the tag row (after `TagToBeDeleted`)
    /// when its last use disappears.
    pub fn remove_tag(&self, path: &PagePath, name: &str) -> Result<()> {
        let name = Tag::normalize_name(name);
        let page = self
            .lookup_path(path)?
            .ok_or_else(|| Error::NotFound(format!("Page not found: {}", path)))?;
        let tag = match TagRepository::get_by_name(&self.conn, &name) {
            Ok(tag) => tag,
            Err(Error::Database(rusqlite::Error::QueryReturnedNoRows)) => {
                return Err(Error::NotFound(format!("Tag not found: {}", name)))
            }
            Err(e) => return Err(e),
        };

        let last = TagRepository::n_for_page(&self.conn, page.id)? == 1;
        self.emit(IndexEvent::TagToBeRemoved {
            tag: tag.clone(),
            page: page.clone(),
            last,
        })?;
        TagRepository::remove_from_page(&self.conn, page.id, tag.id)?;
        self.emit(IndexEvent::TagRemoved {
            tag: tag.clone(),
            page,
            last,
        })?;

        if TagRepository::n_tagged(&self.conn, tag.id)? == 0 {
            self.emit(IndexEvent::TagToBeDeleted(tag.clone()))?;
            TagRepository::delete(&self.conn, tag.id)?;
        }

        Ok(())
    }

    /// Delete a tag outright. Still-tagged pages are detached one by one
    /// through the normal removal path, which drops the tag row after the
    /// last one; a tag without pages is dropped directly after
    /// `TagToBeDeleted`.
    pub fn delete_tag(&self, name: &str) -> Result<()> {
        let name = Tag::normalize_name(name);
        let tag = match TagRepository::get_by_name(&self.conn, &name) {
            Ok(tag) => tag,
            Err(Error::Database(rusqlite::Error::QueryReturnedNoRows)) => {
                return Err(Error::NotFound(format!("Tag not found: {}", name)))
            }
            Err(e) => return Err(e),
        };

        for page in self.list_tagged(&tag, 0, None)? {
            self.remove_tag(&page.path, &tag.name)?;
        }

        if let Ok(tag) = TagRepository::get_by_name(&self.conn, &name) {
            self.emit(IndexEvent::TagToBeDeleted(tag.clone()))?;
            TagRepository::delete(&self.conn, tag.id)?;
        }

        Ok(())
    }
}

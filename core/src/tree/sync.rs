use super::model::TagTreeModel;
use super::Coordinate;
use crate::index::{Index, IndexEvent, IndexObserver};
use crate::models::{Page, Tag};
use crate::{Error, Result};

/// Structural change to the projected tree, consumed by the presentation
/// layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEdit {
    RowInserted(Coordinate),
    RowDeleted(Coordinate),
    RowChanged(Coordinate),
    RowHasChildrenToggled(Coordinate),
}

/// Coordinates captured at `PageToBeDeleted` time, consumed at
/// `PageDeleted`. The page's position is unrecoverable once the delete
/// commits, so the prepare half carries it over explicitly.
#[derive(Debug)]
pub(super) struct PendingDelete {
    pub(super) page_id: i64,
    pub(super) coords: Vec<Coordinate>,
}

impl TagTreeModel {
    fn push(&mut self, edit: TreeEdit) {
        self.edits.push(edit);
    }

    /// Offset of a tag within the canonical tag list
    fn tag_position(&self, index: &Index, tag: &Tag) -> Result<usize> {
        index
            .list_tags(None, 0, None)?
            .iter()
            .position(|t| t.id == tag.id)
            .ok_or_else(|| Error::InconsistentIndex(format!("Tag not listed: {}", tag.name)))
    }

    /// Offset of a page within a tag's page list
    fn tagged_position(&self, index: &Index, tag: &Tag, page: &Page) -> Result<usize> {
        index
            .list_tagged(tag, 0, None)?
            .iter()
            .position(|p| p.id == page.id)
            .ok_or_else(|| {
                Error::InconsistentIndex(format!("Page {} not tagged {}", page.path, tag.name))
            })
    }

    /// Offset of a page within the untagged bucket
    fn untagged_position(&self, index: &Index, page: &Page) -> Result<usize> {
        index
            .list_untagged(0, None)?
            .iter()
            .position(|p| p.id == page.id)
            .ok_or_else(|| {
                Error::InconsistentIndex(format!("Page {} not untagged", page.path))
            })
    }

    /// Flush, then re-emit the given edit at every coordinate the page now
    /// appears at
    fn page_rows_changed(
        &mut self,
        index: &Index,
        page: &Page,
        edit: fn(Coordinate) -> TreeEdit,
    ) -> Result<()> {
        self.flush();
        if let Some(coords) = self.reverse_lookup(index, &page.path)? {
            for coord in coords {
                self.push(edit(coord));
            }
        }
        Ok(())
    }
}

impl IndexObserver for TagTreeModel {
    fn on_index_event(&mut self, index: &Index, event: &IndexEvent) -> Result<()> {
        match event {
            IndexEvent::PageInserted(page) => {
                self.page_rows_changed(index, page, TreeEdit::RowInserted)
            }
            IndexEvent::PageUpdated(page) => {
                self.page_rows_changed(index, page, TreeEdit::RowChanged)
            }
            IndexEvent::PageHasChildrenToggled(page) => {
                self.page_rows_changed(index, page, TreeEdit::RowHasChildrenToggled)
            }

            IndexEvent::PageToBeDeleted(page) => {
                // Capture the page's rows while they are still computable
                let coords = self
                    .reverse_lookup(index, &page.path)?
                    .unwrap_or_default();
                self.pending_delete = Some(PendingDelete {
                    page_id: page.id,
                    coords,
                });
                Ok(())
            }
            IndexEvent::PageDeleted(page) => {
                if let Some(pending) = self.pending_delete.take() {
                    if pending.page_id == page.id {
                        for coord in pending.coords {
                            self.push(TreeEdit::RowDeleted(coord));
                        }
                    }
                }
                self.flush();
                Ok(())
            }

            IndexEvent::TagCreated(tag) => {
                self.flush();
                let position = self.tag_position(index, tag)?;
                self.push(TreeEdit::RowInserted(Coordinate::new(vec![position + 1])));
                Ok(())
            }

            IndexEvent::TagToBeInserted { page, first, .. } => {
                if *first {
                    // The page is about to leave the untagged bucket
                    let position = self.untagged_position(index, page)?;
                    self.push(TreeEdit::RowDeleted(Coordinate::new(vec![0, position])));
                    self.flush();
                }
                Ok(())
            }
            IndexEvent::TagInserted { tag, page, first } => {
                if *first && index.n_list_untagged()? == 0 {
                    self.push(TreeEdit::RowHasChildrenToggled(Coordinate::new(vec![0])));
                }

                self.flush();
                let tag_index = self.tag_position(index, tag)?;
                let position = self.tagged_position(index, tag, page)?;
                let coord = Coordinate::new(vec![tag_index + 1, position]);
                self.push(TreeEdit::RowInserted(coord.clone()));

                let page = index.lookup_data(page.clone())?;
                if page.has_children {
                    self.push(TreeEdit::RowHasChildrenToggled(coord));
                }
                Ok(())
            }

            IndexEvent::TagToBeRemoved { tag, page, .. } => {
                let tag_index = self.tag_position(index, tag)?;
                let position = self.tagged_position(index, tag, page)?;
                self.push(TreeEdit::RowDeleted(Coordinate::new(vec![
                    tag_index + 1,
                    position,
                ])));
                self.flush();
                Ok(())
            }
            IndexEvent::TagRemoved { page, last, .. } => {
                if *last {
                    // The page is back in the untagged bucket
                    let untagged = index.list_untagged(0, None)?;
                    let position = untagged
                        .iter()
                        .position(|p| p.id == page.id)
                        .ok_or_else(|| {
                            Error::InconsistentIndex(format!("Page {} not untagged", page.path))
                        })?;
                    if untagged.len() == 1 {
                        self.push(TreeEdit::RowHasChildrenToggled(Coordinate::new(vec![0])));
                    }
                    self.push(TreeEdit::RowInserted(Coordinate::new(vec![0, position])));
                }
                Ok(())
            }

            IndexEvent::TagToBeDeleted(tag) => {
                let position = self.tag_position(index, tag)?;
                self.push(TreeEdit::RowDeleted(Coordinate::new(vec![position + 1])));
                self.flush();
                Ok(())
            }
        }
    }
}

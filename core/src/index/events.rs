use super::Index;
use crate::models::{Page, Tag};
use crate::Result;

/// Change notifications emitted by the index.
///
/// Structural mutations come in two halves: the `ToBe` event fires before
/// the change is committed, while the paired completion event fires after.
/// Observers that need pre-mutation state (a page's current position, for
/// instance) must capture it in the `ToBe` half; it is unrecoverable by the
/// time the completion half arrives.
#[derive(Debug, Clone)]
pub enum IndexEvent {
    PageInserted(Page),
    PageUpdated(Page),
    PageHasChildrenToggled(Page),
    PageToBeDeleted(Page),
    PageDeleted(Page),
    /// A brand new tag row exists (no association yet)
    TagCreated(Tag),
    /// `first` is true when the page carried no tags before this insert
    TagToBeInserted { tag: Tag, page: Page, first: bool },
    TagInserted { tag: Tag, page: Page, first: bool },
    /// `last` is true when this removal leaves the page untagged
    TagToBeRemoved { tag: Tag, page: Page, last: bool },
    TagRemoved { tag: Tag, page: Page, last: bool },
    /// The tag has no uses left and its row is about to be dropped
    TagToBeDeleted(Tag),
}

/// Receiver for index notifications.
///
/// Dispatch is synchronous and happens mid-mutation, so the observer can
/// query the index for pre-commit state during `ToBe` events. Everything is
/// single threaded; an observer must not mutate the index from its handler.
pub trait IndexObserver {
    fn on_index_event(&mut self, index: &Index, event: &IndexEvent) -> Result<()>;
}

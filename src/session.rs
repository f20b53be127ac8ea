//! Per-conversation navigation state.

use crate::format::Renderer;
use crate::types::{Page, Record};

/// The record a user is looking at and how they got to the current page.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    pub record: Option<Record>,
    pub identifier: String,
    pub page: Page,
    pub history: Vec<Page>,
}

impl ConversationState {
    /// Start over with a freshly fetched record on its card.
    pub fn open(&mut self, identifier: impl Into<String>, record: Record) {
        self.record = Some(record);
        self.identifier = identifier.into();
        self.page = Page::Card;
        self.history.clear();
    }

    /// Move to `page`; the current page goes on the history stack.
    pub fn navigate(&mut self, page: Page) {
        if page != self.page {
            self.history.push(self.page);
            self.page = page;
        }
    }

    /// Return to the previous page. `false` when there is none.
    pub fn back(&mut self) -> bool {
        match self.history.pop() {
            Some(page) => {
                self.page = page;
                true
            }
            None => false,
        }
    }

    /// Jump to the card and forget the history.
    pub fn home(&mut self) {
        self.page = Page::Card;
        self.history.clear();
    }

    /// Current page text, or `None` if no record is open.
    pub fn render(&self, renderer: &Renderer<'_>) -> Option<String> {
        self.record
            .as_ref()
            .map(|record| renderer.render(record, self.page))
    }
}

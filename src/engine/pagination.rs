use crate::types::PageIndex;

/// Next page to request in "all transactions" mode. `None` means there is nothing more to load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationCursor {
    next: Option<PageIndex>
}

impl PaginationCursor {
    pub fn has_more(&self) -> bool {
        self.next.is_some()
    }

    pub fn next_page(&self) -> Option<PageIndex> {
        self.next
    }

    pub(crate) fn advance(&mut self, next: Option<PageIndex>) {
        self.next = next;
    }

    pub(crate) fn reset(&mut self) {
        self.next = None;
    }
}

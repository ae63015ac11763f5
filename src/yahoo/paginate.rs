//! Pagination over collection resources.
//!
//! A [`PageCursor`] is an explicit state machine: each [`next_page`] call
//! fetches at most one page, and the cursor never outlives the sequence that
//! created it. Calling [`paginate`] again starts over at offset 0.
//!
//! [`next_page`]: PageCursor::next_page

use tracing::{debug, info, warn};

use super::endpoints::{clamp_page_size, EndpointClient, PageParams, RawPayload, Resource};
use super::shape;
use crate::core::session::SessionProvider;
use crate::{HoopsError, Result};


/// One fetched page and where it sits in the collection.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPage {
    pub offset: u32,
    pub count: u32,
    pub payload: RawPayload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    Active { offset: u32 },
    /// Last page emitted; the total is checked on the next call.
    Exhausted,
    Finished,
    Failed,
}

pub struct PageCursor<'c, S> {
    client: &'c mut EndpointClient<S>,
    resource: Resource,
    page_size: u32,
    state: CursorState,
    received: usize,
    pages: usize,
    reported_total: Option<usize>,
    expected_total: Option<usize>,
}

/// Start a fresh cursor over `resource` at offset 0.
pub fn paginate<S: SessionProvider>(
    client: &mut EndpointClient<S>,
    resource: Resource,
    page_size: u32,
) -> PageCursor<'_, S> {
    PageCursor {
        client,
        resource,
        page_size: clamp_page_size(page_size),
        state: CursorState::Active { offset: 0 },
        received: 0,
        pages: 0,
        reported_total: None,
        expected_total: None,
    }
}

/// Drain a cursor. Any error discards every page fetched so far.
pub async fn collect_pages<S: SessionProvider>(mut cursor: PageCursor<'_, S>) -> Result<Vec<RawPage>> {
    let mut pages = Vec::new();
    while let Some(page) = cursor.next_page().await? {
        pages.push(page);
    }
    Ok(pages)
}

impl<'c, S: SessionProvider> PageCursor<'c, S> {
    /// Total to verify against when the collection does not report its own.
    pub fn with_expected_total(mut self, total: usize) -> Self {
        self.expected_total = Some(total);
        self
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    /// Items received across all pages so far.
    pub fn received(&self) -> usize {
        self.received
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    /// Fetch the next page, `Ok(None)` once the collection is exhausted and
    /// its total checks out.
    pub async fn next_page(&mut self) -> Result<Option<RawPage>> {
        let offset = match self.state {
            CursorState::Active { offset } => offset,
            CursorState::Exhausted => return self.finish().map(|_| None),
            CursorState::Finished | CursorState::Failed => return Ok(None),
        };

        let Some((plural, singular)) = self.resource.collection_keys() else {
            self.state = CursorState::Failed;
            return Err(HoopsError::InvalidRequest {
                resource: self.resource.to_string(),
                status: 0,
                message: "resource is not a paginated collection".to_string(),
            });
        };

        let params = PageParams::new(offset, self.page_size);
        let payload = match self.client.fetch_with_reauth(&self.resource, Some(params)).await {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Aborting pagination of {} at offset {}: {}", self.resource, offset, e);
                self.state = CursorState::Failed;
                return Err(e);
            }
        };

        let collection = shape::find_key(&payload, plural);
        let count = collection
            .map(|c| shape::reported_count(c).unwrap_or_else(|| shape::collection(c, singular).len()))
            .unwrap_or(0);
        if let Some(total) = collection.and_then(shape::reported_total) {
            self.reported_total = Some(total);
        }

        self.received += count;
        self.pages += 1;
        debug!(
            "{}: page at offset {} returned {} items ({} so far)",
            self.resource, offset, count, self.received
        );

        let short_page = count < self.page_size as usize;
        let reached_total = self.total().is_some_and(|t| self.received >= t);
        self.state = if short_page || reached_total {
            CursorState::Exhausted
        } else {
            CursorState::Active {
                offset: offset + count as u32,
            }
        };

        Ok(Some(RawPage {
            offset,
            count: count as u32,
            payload,
        }))
    }

    fn total(&self) -> Option<usize> {
        self.reported_total.or(self.expected_total)
    }

    fn finish(&mut self) -> Result<()> {
        match self.total() {
            Some(expected) if expected != self.received => {
                self.state = CursorState::Failed;
                warn!(
                    "{}: expected {} items, received {}",
                    self.resource, expected, self.received
                );
                Err(HoopsError::IncompletePagination {
                    resource: self.resource.to_string(),
                    expected,
                    received: self.received,
                })
            }
            _ => {
                self.state = CursorState::Finished;
                info!(
                    "{}: {} items in {} pages",
                    self.resource, self.received, self.pages
                );
                Ok(())
            }
        }
    }
}

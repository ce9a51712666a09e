//! Fetch orchestration for the paginated bus list.
//!
//! # Design
//! `DirectoryState` is the single mutable "current page" slot. Every load
//! takes a `Ticket` carrying a sequence number; a completed load is applied
//! only when its ticket is still the latest one issued, so overlapping page
//! changes resolve to the most recently initiated request regardless of the
//! order responses arrive in.
//!
//! Display policy: starting a load clears the previous error but keeps the
//! previously displayed page in place until the new result lands. A failure
//! leaves that page in place and records the error; nothing partial is ever
//! shown.
//!
//! `FleetDirectory` drives the state through `FleetApi`. The lock is taken
//! only around `begin` and `complete` and never held across an await.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::api::FleetApi;
use crate::error::RequestError;
use crate::pagination::PaginationControl;
use crate::transport::Transport;
use crate::types::{BusFilter, BusPage, BusRecord, FleetStats, PageMetadata};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Idle,
    Loading,
}

/// Page and size of a load. Zero-based page; sizes below one are raised to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery {
    pub page: u32,
    pub size: u32,
}

impl PageQuery {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size: size.max(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub seq: u64,
    pub query: PageQuery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// A later load was started before this one finished.
    Discarded,
}

/// A successfully fetched page, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    pub query: PageQuery,
    pub records: Vec<BusRecord>,
    pub metadata: PageMetadata,
    pub control: Option<PaginationControl>,
}

impl PageView {
    pub fn new(query: PageQuery, page: BusPage) -> Self {
        let control = PaginationControl::for_page(&page.metadata);
        Self {
            query,
            records: page.records,
            metadata: page.metadata,
            control,
        }
    }

    pub fn visible(&self, filter: BusFilter) -> Vec<&BusRecord> {
        filter.apply(&self.records)
    }

    /// Counts over the records of this page.
    pub fn stats(&self) -> FleetStats {
        FleetStats::from_records(&self.records)
    }
}

#[derive(Debug, Clone)]
pub struct DirectoryState {
    phase: LoadPhase,
    latest_seq: u64,
    last_query: Option<PageQuery>,
    view: Option<PageView>,
    error: Option<RequestError>,
    filter: BusFilter,
}

impl Default for DirectoryState {
    fn default() -> Self {
        Self {
            phase: LoadPhase::Idle,
            latest_seq: 0,
            last_query: None,
            view: None,
            error: None,
            filter: BusFilter::All,
        }
    }
}

impl DirectoryState {
    pub fn begin(&mut self, query: PageQuery) -> Ticket {
        self.latest_seq += 1;
        self.phase = LoadPhase::Loading;
        self.error = None;
        self.last_query = Some(query);
        Ticket {
            seq: self.latest_seq,
            query,
        }
    }

    pub fn complete(
        &mut self,
        ticket: Ticket,
        result: Result<BusPage, RequestError>,
    ) -> Completion {
        if ticket.seq != self.latest_seq {
            tracing::debug!(
                seq = ticket.seq,
                latest = self.latest_seq,
                page = ticket.query.page,
                "Discarding stale response"
            );
            return Completion::Discarded;
        }
        self.phase = LoadPhase::Idle;
        match result {
            Ok(page) => {
                self.view = Some(PageView::new(ticket.query, page));
                self.error = None;
            }
            Err(err) => {
                self.error = Some(err);
            }
        }
        Completion::Applied
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn view(&self) -> Option<&PageView> {
        self.view.as_ref()
    }

    pub fn error(&self) -> Option<&RequestError> {
        self.error.as_ref()
    }

    pub fn last_query(&self) -> Option<PageQuery> {
        self.last_query
    }

    pub fn filter(&self) -> BusFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: BusFilter) {
        self.filter = filter;
    }
}

pub struct FleetDirectory<T> {
    api: FleetApi<T>,
    default_page_size: u32,
    state: Mutex<DirectoryState>,
}

impl<T: Transport> FleetDirectory<T> {
    pub fn new(api: FleetApi<T>, default_page_size: u32) -> Self {
        Self {
            api,
            default_page_size: default_page_size.max(1),
            state: Mutex::new(DirectoryState::default()),
        }
    }

    pub fn api(&self) -> &FleetApi<T> {
        &self.api
    }

    /// Copy of the current state for rendering.
    pub fn snapshot(&self) -> DirectoryState {
        self.state().clone()
    }

    pub fn set_filter(&self, filter: BusFilter) {
        self.state().set_filter(filter);
    }

    pub async fn load(&self, query: PageQuery) -> Completion {
        let ticket = self.state().begin(query);
        tracing::debug!(seq = ticket.seq, page = query.page, size = query.size, "Loading page");

        let result = self.api.list_page(query.page, query.size).await;
        if let Err(err) = &result {
            tracing::warn!(seq = ticket.seq, page = query.page, error = %err, "Page load failed");
        }
        self.state().complete(ticket, result)
    }

    /// Load `page` at the current size. When a page is already displayed the
    /// index is clamped to its page count.
    pub async fn go_to_page(&self, page: u32) -> Completion {
        let (size, page) = {
            let state = self.state();
            let size = state.last_query.map(|q| q.size).unwrap_or(self.default_page_size);
            let page = match state.view.as_ref() {
                Some(view) if view.metadata.total_pages > 0 => page.min(view.metadata.total_pages - 1),
                _ => page,
            };
            (size, page)
        };
        self.load(PageQuery::new(page, size)).await
    }

    /// `None` when the displayed page is already the last.
    pub async fn next_page(&self) -> Option<Completion> {
        let target = {
            let state = self.state();
            let view = state.view.as_ref()?;
            if !view.metadata.has_next() {
                return None;
            }
            view.metadata.page + 1
        };
        Some(self.go_to_page(target).await)
    }

    /// `None` when the displayed page is already the first.
    pub async fn previous_page(&self) -> Option<Completion> {
        let target = {
            let state = self.state();
            let view = state.view.as_ref()?;
            if !view.metadata.has_previous() {
                return None;
            }
            view.metadata.page - 1
        };
        Some(self.go_to_page(target).await)
    }

    /// Change the page size and go back to the first page.
    pub async fn set_page_size(&self, size: u32) -> Completion {
        self.load(PageQuery::new(0, size)).await
    }

    /// Re-issue the last requested query. `None` if nothing was requested yet.
    pub async fn retry(&self) -> Option<Completion> {
        let query = self.state().last_query?;
        Some(self.load(query).await)
    }

    /// Counts across the whole fleet, from the unpaginated listing.
    pub async fn fleet_stats(&self) -> Result<FleetStats, RequestError> {
        let listing = self.api.list_buses().await?;
        Ok(FleetStats::from_records(listing.buses()))
    }

    fn state(&self) -> MutexGuard<'_, DirectoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

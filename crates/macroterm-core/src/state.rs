//! View-state controller.
//!
//! `ViewState` owns everything the dashboard shows: the current snapshot,
//! the last error, the loading flag and the selected tab. Loads are split
//! into `begin_load` and `finish_load` so the fetch itself can run on a
//! background task; every load gets a generation number and only the
//! newest one is allowed to land.

use tracing::debug;

use crate::api::{LoadError, Loaded};
use crate::cache::ResponseSource;
use crate::models::{Dashboard, Region};

/// Fixed tab id for the overview panel
pub const OVERVIEW_TAB: &str = "OVERVIEW";

/// Fixed tab id for the geo panel
pub const GEO_TAB: &str = "GEO";

/// A dashboard tab: one of the two fixed tabs or a region id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TabId {
    Overview,
    Region(String),
    Geo,
}

impl TabId {
    pub fn from_id(id: &str) -> Self {
        match id {
            OVERVIEW_TAB => TabId::Overview,
            GEO_TAB => TabId::Geo,
            other => TabId::Region(other.to_string()),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            TabId::Overview => OVERVIEW_TAB,
            TabId::Geo => GEO_TAB,
            TabId::Region(id) => id,
        }
    }

    /// Get the display title for this tab.
    pub fn title(&self) -> &str {
        match self {
            TabId::Overview => "Overview",
            TabId::Geo => "Geo",
            TabId::Region(id) => id,
        }
    }
}

/// Identifies one `begin_load` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

/// What `finish_load` did with a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// New snapshot installed.
    Snapshot,
    /// Error message recorded.
    Failed,
    /// Load was cancelled; nothing recorded.
    Cancelled,
    /// A newer load has started; result discarded.
    Stale,
}

#[derive(Debug, Clone)]
pub struct ViewState {
    snapshot: Option<Dashboard>,
    source: Option<ResponseSource>,
    error: Option<String>,
    loading: bool,
    selected: TabId,
    generation: u64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self {
            snapshot: None,
            source: None,
            error: None,
            loading: false,
            selected: TabId::Overview,
            generation: 0,
        }
    }

    pub fn snapshot(&self) -> Option<&Dashboard> {
        self.snapshot.as_ref()
    }

    /// Where the current snapshot came from.
    pub fn source(&self) -> Option<ResponseSource> {
        self.source
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn selected(&self) -> &TabId {
        &self.selected
    }

    /// Start a load: sets loading, clears the error.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.loading = true;
        self.error = None;
        LoadTicket {
            generation: self.generation,
        }
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Apply the result of the load identified by `ticket`.
    pub fn finish_load(&mut self, ticket: LoadTicket, result: Result<Loaded, LoadError>) -> Applied {
        if !self.is_current(ticket) {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                "Discarding result of superseded load"
            );
            return Applied::Stale;
        }

        self.loading = false;

        match result {
            Ok(loaded) => {
                self.snapshot = Some(loaded.dashboard);
                self.source = Some(loaded.source);
                self.revalidate_selection();
                Applied::Snapshot
            }
            Err(e) if e.is_abort() => Applied::Cancelled,
            Err(e) => {
                self.error = Some(e.to_string());
                Applied::Failed
            }
        }
    }

    /// A region tab whose region vanished from the new snapshot falls back
    /// to the overview.
    fn revalidate_selection(&mut self) {
        if let TabId::Region(id) = &self.selected {
            let present = self
                .snapshot
                .as_ref()
                .map(|s| s.region(id).is_some())
                .unwrap_or(false);
            if !present {
                debug!(region = %id, "Selected region no longer in snapshot");
                self.selected = TabId::Overview;
            }
        }
    }

    /// Select a tab. The id is not checked against the current tabs.
    pub fn select_tab(&mut self, tab: TabId) {
        self.selected = tab;
    }

    /// Overview, one tab per region in snapshot order, then geo.
    pub fn tabs(&self) -> Vec<TabId> {
        let mut tabs = vec![TabId::Overview];
        if let Some(snapshot) = &self.snapshot {
            tabs.extend(snapshot.regions.iter().map(|r| TabId::Region(r.id.clone())));
        }
        tabs.push(TabId::Geo);
        tabs
    }

    pub fn selected_region(&self) -> Option<&Region> {
        match &self.selected {
            TabId::Region(id) => self.snapshot.as_ref()?.region(id),
            _ => None,
        }
    }

    /// Select the next tab (wrapping around)
    pub fn next_tab(&mut self) {
        self.step_tab(1);
    }

    /// Select the previous tab (wrapping around)
    pub fn prev_tab(&mut self) {
        self.step_tab(-1);
    }

    fn step_tab(&mut self, delta: isize) {
        let tabs = self.tabs();
        let len = tabs.len() as isize;
        let next = match tabs.iter().position(|t| *t == self.selected) {
            Some(i) => (i as isize + delta).rem_euclid(len),
            // Unknown selection: start from the overview
            None => 0,
        };
        self.selected = tabs[next as usize].clone();
    }
}

// ============================================================================
// Tests
// ============================================================================

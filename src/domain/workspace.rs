//! The single shared workspace: current upload, editor sheet and price view.
//!
//! An upload replaces everything at once. Edits are last-writer-wins.

use std::sync::{Arc, PoisonError, RwLock};

use super::dataset::Dataset;
use super::error::DashboardError;
use super::table::Table;
use super::views::{PriceView, editor_sheet};

#[derive(Default)]
struct WorkspaceState {
    dataset: Option<Arc<Dataset>>,
    sheet: Option<Table>,
    prices: Option<PriceView>,
}

#[derive(Default)]
pub struct Workspace {
    state: RwLock<WorkspaceState>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a new dataset, resetting the editor sheet and dropping any
    /// price view derived from the previous one.
    pub fn replace(&self, dataset: Dataset) {
        let sheet = editor_sheet(&dataset);
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.dataset = Some(Arc::new(dataset));
        state.sheet = Some(sheet);
        state.prices = None;
    }

    pub fn dataset(&self) -> Result<Arc<Dataset>, DashboardError> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.dataset.clone().ok_or(DashboardError::NoDataset)
    }

    pub fn has_dataset(&self) -> bool {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.dataset.is_some()
    }

    pub fn sheet(&self) -> Result<Table, DashboardError> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.sheet.clone().ok_or(DashboardError::NoDataset)
    }

    /// Apply `f` to the editor sheet under the write lock.
    pub fn edit_sheet<R, F>(&self, f: F) -> Result<R, DashboardError>
    where
        F: FnOnce(&mut Table) -> Result<R, DashboardError>,
    {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let sheet = state.sheet.as_mut().ok_or(DashboardError::NoDataset)?;
        f(sheet)
    }

    /// Store a price view computed from `source`. The view is dropped and
    /// `false` returned when another upload replaced `source` meanwhile.
    pub fn set_prices(&self, source: &Arc<Dataset>, view: PriceView) -> bool {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        match &state.dataset {
            Some(current) if Arc::ptr_eq(current, source) => {
                state.prices = Some(view);
                true
            }
            _ => false,
        }
    }

    pub fn prices(&self) -> Option<PriceView> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.prices.clone()
    }

    /// Apply `f` to the current price view. Fails when no range has been
    /// selected since the last upload.
    pub fn edit_prices<R, F>(&self, f: F) -> Result<R, DashboardError>
    where
        F: FnOnce(&mut PriceView) -> Result<R, DashboardError>,
    {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.dataset.is_none() {
            return Err(DashboardError::NoDataset);
        }
        let view = state
            .prices
            .as_mut()
            .ok_or_else(|| DashboardError::invalid("select a date range first"))?;
        f(view)
    }
}

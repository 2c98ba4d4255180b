use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sales_lens::data::aggregate::Summary;
use sales_lens::data::cache::DatasetCache;
use sales_lens::data::export::write_csv;
use sales_lens::data::filter::{DateRange, FilterCriteria, FilteredView, filtered_indices};
use sales_lens::data::loader::Source;
use sales_lens::data::model::Dataset;

use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// One dashboard session, independent of rendering.
pub struct AppState {
    /// Dataset used when nothing was uploaded.
    pub default_source: Option<PathBuf>,

    /// Session-local cache of the parsed source.
    cache: DatasetCache,

    /// Loaded dataset (None until a source loads successfully).
    pub dataset: Option<Arc<Dataset>>,

    /// Where `dataset` came from, for the status line.
    pub source_label: Option<String>,

    /// Current region / item / date selection.
    pub criteria: Option<FilterCriteria>,

    /// Indices of records passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Aggregates over the visible records, recomputed on every filter change.
    pub summary: Option<Summary>,

    pub region_colors: ColorMap,
    pub item_colors: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(default_source: Option<PathBuf>) -> Self {
        Self {
            default_source,
            cache: DatasetCache::new(),
            dataset: None,
            source_label: None,
            criteria: None,
            visible_indices: Vec::new(),
            summary: None,
            region_colors: ColorMap::default(),
            item_colors: ColorMap::default(),
            status_message: None,
        }
    }

    /// Load the configured default source, if there is one.
    pub fn load_default(&mut self) {
        let Some(path) = self.default_source.clone() else {
            return;
        };
        self.load_source(Source::Path(path));
    }

    /// Load (or reuse from cache) a source and make it current. Failures are
    /// logged and shown in the status line; the previous dataset stays.
    pub fn load_source(&mut self, source: Source) {
        match self.cache.get_or_load(&source) {
            Ok(dataset) => {
                self.source_label = Some(source.label());
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", source.label());
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Accept an uploaded file: drop whatever the cache held, then load it.
    pub fn upload(&mut self, name: String, bytes: Vec<u8>) {
        self.cache.invalidate();
        self.load_source(Source::bytes(name, bytes));
    }

    /// Ingest a newly loaded dataset and reset filters to "everything".
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        self.criteria = Some(FilterCriteria::all(&dataset));
        self.region_colors = ColorMap::new(&dataset.regions);
        self.item_colors = ColorMap::new(&dataset.items);
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refilter();
    }

    /// Recompute `visible_indices` and the summary after a filter change.
    pub fn refilter(&mut self) {
        let (Some(ds), Some(criteria)) = (&self.dataset, &self.criteria) else {
            self.visible_indices.clear();
            self.summary = None;
            return;
        };
        self.visible_indices = filtered_indices(ds, criteria);
        let view = FilteredView::from_indices(ds, &self.visible_indices);
        if view.is_empty() {
            log::warn!("Current selection matches no rows");
        }
        self.summary = Some(Summary::compute(&view));
    }

    /// The records currently passing the filters.
    pub fn view(&self) -> Option<FilteredView<'_>> {
        self.dataset
            .as_deref()
            .map(|ds| FilteredView::from_indices(ds, &self.visible_indices))
    }

    pub fn reset_filters(&mut self) {
        if let Some(ds) = &self.dataset {
            self.criteria = Some(FilterCriteria::all(ds));
            self.refilter();
        }
    }

    /// Toggle a region in or out of the selection.
    pub fn toggle_region(&mut self, region: &str) {
        if let Some(criteria) = &mut self.criteria {
            toggle(&mut criteria.regions, region);
            self.refilter();
        }
    }

    /// Toggle an item in or out of the selection.
    pub fn toggle_item(&mut self, item: &str) {
        if let Some(criteria) = &mut self.criteria {
            toggle(&mut criteria.items, item);
            self.refilter();
        }
    }

    pub fn select_all_regions(&mut self, all: bool) {
        if let (Some(ds), Some(criteria)) = (&self.dataset, &mut self.criteria) {
            criteria.regions = if all { ds.regions.clone() } else { Default::default() };
            self.refilter();
        }
    }

    pub fn select_all_items(&mut self, all: bool) {
        if let (Some(ds), Some(criteria)) = (&self.dataset, &mut self.criteria) {
            criteria.items = if all { ds.items.clone() } else { Default::default() };
            self.refilter();
        }
    }

    /// Apply a new date range. An inverted range is rejected and the previous
    /// one kept.
    pub fn set_date_range(&mut self, start: NaiveDate, end: NaiveDate) {
        let Some(criteria) = &mut self.criteria else {
            return;
        };
        match DateRange::new(start, end) {
            Ok(range) => {
                criteria.date_range = range;
                self.status_message = None;
                self.refilter();
            }
            Err(e) => {
                log::warn!("Rejected date range: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Write the filtered rows to `path`.
    pub fn export_to(&self, path: &Path) -> Result<()> {
        let view = self.view().context("no dataset loaded")?;
        write_csv(&view, path).with_context(|| format!("exporting to {}", path.display()))
    }
}

fn toggle(set: &mut std::collections::BTreeSet<String>, value: &str) {
    if !set.remove(value) {
        set.insert(value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
Region,Item,OrderDate,Units,Unit Price
East,Pen,2023-01-05,10,1.5
West,Pen,2023-01-20,5,1.5
East,Desk,2023-02-01,2,50.0
";

    fn loaded() -> AppState {
        let mut state = AppState::new(None);
        state.upload("sales.csv".into(), CSV.into());
        state
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn upload_selects_everything() {
        let state = loaded();
        assert_eq!(state.visible_indices, [0, 1, 2]);
        assert_eq!(state.summary.as_ref().unwrap().rows, 3);
        assert!(state.status_message.is_none());
    }

    #[test]
    fn toggling_refilters() {
        let mut state = loaded();
        state.toggle_region("West");
        assert_eq!(state.visible_indices, [0, 2]);
        let summary = state.summary.as_ref().unwrap();
        assert_eq!(summary.regional_totals["East"], 12);

        state.toggle_region("West");
        assert_eq!(state.visible_indices, [0, 1, 2]);
    }

    #[test]
    fn deselecting_all_items_empties_the_view() {
        let mut state = loaded();
        state.select_all_items(false);
        assert!(state.visible_indices.is_empty());
        assert!(state.summary.as_ref().unwrap().regional_totals.is_empty());
        state.select_all_items(true);
        assert_eq!(state.visible_indices.len(), 3);
    }

    #[test]
    fn inverted_date_range_keeps_previous() {
        let mut state = loaded();
        state.set_date_range(date(2023, 2, 1), date(2023, 1, 1));
        assert!(state.status_message.is_some());
        assert_eq!(state.visible_indices.len(), 3);

        state.set_date_range(date(2023, 1, 10), date(2023, 2, 1));
        assert!(state.status_message.is_none());
        assert_eq!(state.visible_indices, [1, 2]);
    }

    #[test]
    fn bad_upload_keeps_previous_dataset() {
        let mut state = loaded();
        state.upload("broken.csv".into(), b"Region,Item\nEast,Pen\n".to_vec());
        assert!(state.status_message.is_some());
        assert_eq!(state.dataset.as_ref().unwrap().len(), 3);
    }
}

use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::error::FilterError;
use super::model::{Dataset, Record};

// ---------------------------------------------------------------------------
// DateRange – inclusive order-date bounds
// ---------------------------------------------------------------------------

/// Inclusive `[start, end]` range. Always satisfies `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, FilterError> {
        if start > end {
            return Err(FilterError::InvalidDateRange { start, end });
        }
        Ok(DateRange { start, end })
    }

    /// Every representable date.
    pub fn unbounded() -> Self {
        DateRange {
            start: NaiveDate::MIN,
            end: NaiveDate::MAX,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

// ---------------------------------------------------------------------------
// FilterCriteria – the user's current selection
// ---------------------------------------------------------------------------

/// Region set, item set and date range. An empty region or item set selects
/// nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub regions: BTreeSet<String>,
    pub items: BTreeSet<String>,
    pub date_range: DateRange,
}

impl FilterCriteria {
    /// Default selection: every region, every item, the dataset's full date
    /// span. An empty dataset gets an unbounded range.
    pub fn all(dataset: &Dataset) -> Self {
        let date_range = dataset
            .date_span
            .map(|(start, end)| DateRange { start, end })
            .unwrap_or_else(DateRange::unbounded);
        FilterCriteria {
            regions: dataset.regions.clone(),
            items: dataset.items.clone(),
            date_range,
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.regions.contains(&record.region)
            && self.items.contains(&record.item)
            && self.date_range.contains(record.order_date)
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Return indices of records that pass all three predicates, in source order.
pub fn filtered_indices(dataset: &Dataset, criteria: &FilterCriteria) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| criteria.matches(rec))
        .map(|(i, _)| i)
        .collect()
}

/// The records of a dataset that match a [`FilterCriteria`].
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    records: Vec<&'a Record>,
}

impl<'a> FilteredView<'a> {
    /// Build a view from precomputed row indices (see [`filtered_indices`]).
    /// Out-of-range indices are skipped.
    pub fn from_indices(dataset: &'a Dataset, indices: &[usize]) -> Self {
        FilteredView {
            records: indices
                .iter()
                .filter_map(|&i| dataset.records.get(i))
                .collect(),
        }
    }

    /// A view over every record of the dataset.
    pub fn all(dataset: &'a Dataset) -> Self {
        FilteredView {
            records: dataset.records.iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + '_ {
        self.records.iter().copied()
    }

    pub fn get(&self, i: usize) -> Option<&'a Record> {
        self.records.get(i).copied()
    }

    /// Saturates at the `i64` bounds.
    pub fn total_units(&self) -> i64 {
        self.iter().fold(0i64, |acc, r| acc.saturating_add(r.units))
    }
}

/// Narrow `dataset` to the rows matching `criteria`.
pub fn filter<'a>(dataset: &'a Dataset, criteria: &FilterCriteria) -> FilteredView<'a> {
    let view = FilteredView {
        records: dataset
            .records
            .iter()
            .filter(|rec| criteria.matches(rec))
            .collect(),
    };
    if view.is_empty() {
        log::warn!("Filter selection matched no rows");
    } else {
        log::debug!("Filter kept {} of {} rows", view.len(), dataset.len());
    }
    view
}

//! Summaries over a [`FilteredView`].
//!
//! Every function here is total: an empty view yields empty maps, zero
//! counts and [`Correlation::NotComputable`], never an error.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};

use super::filter::FilteredView;

// ---------------------------------------------------------------------------
// Regional and monthly totals
// ---------------------------------------------------------------------------

/// Sum of `Units` per region, keyed in sorted region order. Totals saturate
/// at the `i64` bounds.
pub fn regional_totals(view: &FilteredView<'_>) -> BTreeMap<String, i64> {
    let mut totals = BTreeMap::new();
    for rec in view.iter() {
        let total: &mut i64 = totals.entry(rec.region.clone()).or_insert(0);
        *total = total.saturating_add(rec.units);
    }
    totals
}

/// A calendar month. Orders chronologically and displays as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        YearMonth { year, month }
    }

    pub fn of(date: NaiveDate) -> Self {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Months since year 0, used as a continuous x coordinate when plotting.
    pub fn ordinal(&self) -> i64 {
        self.year as i64 * 12 + (self.month as i64 - 1)
    }

    pub fn from_ordinal(ordinal: i64) -> Self {
        YearMonth {
            year: ordinal.div_euclid(12) as i32,
            month: ordinal.rem_euclid(12) as u32 + 1,
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Sum of `Units` per calendar month of `OrderDate`, chronologically.
pub fn monthly_totals(view: &FilteredView<'_>) -> BTreeMap<YearMonth, i64> {
    let mut totals = BTreeMap::new();
    for rec in view.iter() {
        let total: &mut i64 = totals.entry(YearMonth::of(rec.order_date)).or_insert(0);
        *total = total.saturating_add(rec.units);
    }
    totals
}

// ---------------------------------------------------------------------------
// Item distribution
// ---------------------------------------------------------------------------

/// Row count per item and the share each item takes of the view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemDistribution {
    pub counts: BTreeMap<String, usize>,
    pub total: usize,
}

impl ItemDistribution {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Percentage (0–100) of rows carrying `item`.
    pub fn share(&self, item: &str) -> f64 {
        match (self.counts.get(item), self.total) {
            (Some(&n), total) if total > 0 => n as f64 * 100.0 / total as f64,
            _ => 0.0,
        }
    }

    /// Items by count descending, ties broken by name.
    pub fn ranked(&self) -> Vec<(&str, usize)> {
        let mut ranked: Vec<(&str, usize)> = self
            .counts
            .iter()
            .map(|(item, &n)| (item.as_str(), n))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
    }
}

pub fn item_distribution(view: &FilteredView<'_>) -> ItemDistribution {
    let mut counts = BTreeMap::new();
    for rec in view.iter() {
        *counts.entry(rec.item.clone()).or_insert(0) += 1;
    }
    ItemDistribution {
        counts,
        total: view.len(),
    }
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Why a correlation matrix could not be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotComputable {
    /// Fewer than two rows.
    InsufficientRows,
    /// `Units` or `Unit Price` is constant across the view.
    ZeroVariance,
}

impl fmt::Display for NotComputable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotComputable::InsufficientRows => write!(f, "fewer than two rows selected"),
            NotComputable::ZeroVariance => write!(f, "a column has zero variance"),
        }
    }
}

/// Pearson correlation between `Units` and `Unit Price`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Correlation {
    /// Row/column order is `[Units, Unit Price]`.
    Matrix([[f64; 2]; 2]),
    NotComputable(NotComputable),
}

impl Correlation {
    pub const LABELS: [&'static str; 2] = ["Units", "Unit Price"];

    /// The off-diagonal coefficient, when defined.
    pub fn coefficient(&self) -> Option<f64> {
        match self {
            Correlation::Matrix(m) => Some(m[0][1]),
            Correlation::NotComputable(_) => None,
        }
    }
}

pub fn correlation(view: &FilteredView<'_>) -> Correlation {
    let n = view.len();
    if n < 2 {
        return Correlation::NotComputable(NotComputable::InsufficientRows);
    }

    let xs: Vec<f64> = view.iter().map(|r| r.units as f64).collect();
    let ys: Vec<f64> = view.iter().map(|r| r.unit_price).collect();

    // Checked on the raw values: the rounded mean of a constant decimal
    // column leaves a tiny nonzero sum of squares.
    if is_constant(&xs) || is_constant(&ys) {
        log::warn!("Correlation undefined: zero variance over {n} rows");
        return Correlation::NotComputable(NotComputable::ZeroVariance);
    }

    let mean_x = mean(&xs);
    let mean_y = mean(&ys);

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(&ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let r = (sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0);
    Correlation::Matrix([[1.0, r], [r, 1.0]])
}

// ---------------------------------------------------------------------------
// Descriptive statistics
// ---------------------------------------------------------------------------

/// count / mean / std / min / quartiles / max for one numeric column.
/// Values are `None` where they are not defined for the row count.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ColumnStats {
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (n − 1 denominator).
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub q50: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl ColumnStats {
    pub const ROW_LABELS: [&'static str; 8] =
        ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

    pub fn from_values(values: &[f64]) -> Self {
        let count = values.len();
        if count == 0 {
            return ColumnStats::default();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let m = mean(&sorted);
        let std = (count > 1).then(|| {
            let ss: f64 = sorted.iter().map(|v| (v - m).powi(2)).sum();
            (ss / (count - 1) as f64).sqrt()
        });

        ColumnStats {
            count,
            mean: Some(m),
            std,
            min: sorted.first().copied(),
            q25: Some(percentile(&sorted, 0.25)),
            q50: Some(percentile(&sorted, 0.50)),
            q75: Some(percentile(&sorted, 0.75)),
            max: sorted.last().copied(),
        }
    }

    /// Values in [`Self::ROW_LABELS`] order.
    pub fn rows(&self) -> [Option<f64>; 8] {
        [
            Some(self.count as f64),
            self.mean,
            self.std,
            self.min,
            self.q25,
            self.q50,
            self.q75,
            self.max,
        ]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Describe {
    pub units: ColumnStats,
    pub unit_price: ColumnStats,
}

pub fn describe(view: &FilteredView<'_>) -> Describe {
    let units: Vec<f64> = view.iter().map(|r| r.units as f64).collect();
    let prices: Vec<f64> = view.iter().map(|r| r.unit_price).collect();
    Describe {
        units: ColumnStats::from_values(&units),
        unit_price: ColumnStats::from_values(&prices),
    }
}

fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Linear interpolation between closest ranks. `sorted` must be non-empty.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let idx = p * (sorted.len() - 1) as f64;
    let lo = idx.floor() as usize;
    let hi = idx.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = idx - lo as f64;
        sorted[lo] * (1.0 - frac) + sorted[hi] * frac
    }
}

// ---------------------------------------------------------------------------
// Summary – everything the dashboard renders for one filter pass
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub rows: usize,
    pub regional_totals: BTreeMap<String, i64>,
    pub monthly_totals: BTreeMap<YearMonth, i64>,
    pub item_distribution: ItemDistribution,
    pub correlation: Correlation,
    pub describe: Describe,
}

impl Summary {
    pub fn compute(view: &FilteredView<'_>) -> Self {
        Summary {
            rows: view.len(),
            regional_totals: regional_totals(view),
            monthly_totals: monthly_totals(view),
            item_distribution: item_distribution(view),
            correlation: correlation(view),
            describe: describe(view),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{DateRange, FilterCriteria, filter};
    use crate::data::model::{Dataset, Record};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Dataset {
        Dataset::from_records(vec![
            Record::new("East", "Pen", date(2023, 1, 5), 10, 1.5),
            Record::new("West", "Pen", date(2023, 1, 20), 5, 1.5),
            Record::new("East", "Desk", date(2023, 2, 1), 2, 50.0),
        ])
    }

    #[test]
    fn east_only_scenario() {
        let ds = sample();
        let criteria = FilterCriteria {
            regions: ["East".to_string()].into(),
            items: ["Pen".to_string(), "Desk".to_string()].into(),
            date_range: DateRange::new(date(2023, 1, 1), date(2023, 2, 28)).unwrap(),
        };
        let view = filter(&ds, &criteria);
        assert_eq!(view.len(), 2);

        let regional = regional_totals(&view);
        assert_eq!(regional.len(), 1);
        assert_eq!(regional["East"], 12);

        let monthly: Vec<(String, i64)> = monthly_totals(&view)
            .into_iter()
            .map(|(m, u)| (m.to_string(), u))
            .collect();
        assert_eq!(
            monthly,
            [("2023-01".to_string(), 10), ("2023-02".to_string(), 2)]
        );
    }

    #[test]
    fn regional_totals_sum_to_view_units() {
        let ds = sample();
        let view = FilteredView::all(&ds);
        let totals = regional_totals(&view);
        assert_eq!(totals["East"], 12);
        assert_eq!(totals["West"], 5);
        assert_eq!(totals.values().sum::<i64>(), view.total_units());
    }

    #[test]
    fn months_sort_across_year_boundary() {
        let ds = Dataset::from_records(vec![
            Record::new("East", "Pen", date(2024, 1, 3), 1, 1.0),
            Record::new("East", "Pen", date(2023, 12, 30), 2, 1.0),
            Record::new("East", "Pen", date(2023, 2, 1), 3, 1.0),
        ]);
        let keys: Vec<YearMonth> = monthly_totals(&FilteredView::all(&ds))
            .into_keys()
            .collect();
        assert_eq!(
            keys,
            [
                YearMonth::new(2023, 2),
                YearMonth::new(2023, 12),
                YearMonth::new(2024, 1)
            ]
        );
    }

    #[test]
    fn year_month_ordinal_round_trips() {
        let ym = YearMonth::new(2023, 12);
        assert_eq!(YearMonth::from_ordinal(ym.ordinal()), ym);
        assert_eq!(YearMonth::from_ordinal(ym.ordinal() + 1), YearMonth::new(2024, 1));
    }

    #[test]
    fn item_shares() {
        let ds = sample();
        let dist = item_distribution(&FilteredView::all(&ds));
        assert_eq!(dist.total, 3);
        assert_eq!(dist.counts["Pen"], 2);
        assert!((dist.share("Pen") - 200.0 / 3.0).abs() < 1e-9);
        let total: f64 = dist.counts.keys().map(|item| dist.share(item)).sum();
        assert!((total - 100.0).abs() < 1e-9);
        assert_eq!(dist.ranked(), [("Pen", 2), ("Desk", 1)]);
        assert_eq!(dist.share("Stapler"), 0.0);
    }

    #[test]
    fn empty_view_degrades_gracefully() {
        let ds = sample();
        let mut criteria = FilterCriteria::all(&ds);
        criteria.regions.clear();
        let view = filter(&ds, &criteria);

        assert!(regional_totals(&view).is_empty());
        assert!(monthly_totals(&view).is_empty());
        assert!(item_distribution(&view).counts.is_empty());
        assert_eq!(
            correlation(&view),
            Correlation::NotComputable(NotComputable::InsufficientRows)
        );

        let stats = describe(&view);
        assert_eq!(stats.units.count, 0);
        assert!(stats.units.mean.is_none());
        assert!(stats.unit_price.max.is_none());
    }

    #[test]
    fn single_row_is_not_computable() {
        let ds = sample();
        let view = FilteredView::from_indices(&ds, &[0]);
        assert_eq!(
            correlation(&view),
            Correlation::NotComputable(NotComputable::InsufficientRows)
        );
        let stats = describe(&view);
        assert_eq!(stats.units.mean, Some(10.0));
        assert!(stats.units.std.is_none());
    }

    #[test]
    fn constant_column_is_not_computable() {
        let ds = sample();
        // Both Pen rows share a unit price.
        let view = FilteredView::from_indices(&ds, &[0, 1]);
        assert_eq!(
            correlation(&view),
            Correlation::NotComputable(NotComputable::ZeroVariance)
        );
    }

    #[test]
    fn constant_decimal_price_is_not_computable() {
        // 0.1 and 0.3 have no exact binary form, so their means drift.
        for price in [0.1, 0.3] {
            let ds = Dataset::from_records(vec![
                Record::new("East", "Pencil", date(2023, 1, 6), 95, price),
                Record::new("East", "Pencil", date(2023, 1, 23), 50, price),
                Record::new("East", "Pencil", date(2023, 2, 9), 36, price),
            ]);
            assert_eq!(
                correlation(&FilteredView::all(&ds)),
                Correlation::NotComputable(NotComputable::ZeroVariance),
                "price {price}"
            );
        }
    }

    #[test]
    fn constant_units_are_not_computable() {
        let ds = Dataset::from_records(vec![
            Record::new("East", "Pen", date(2023, 1, 5), 7, 1.99),
            Record::new("West", "Pen", date(2023, 1, 20), 7, 4.99),
            Record::new("East", "Desk", date(2023, 2, 1), 7, 125.0),
        ]);
        assert_eq!(
            correlation(&FilteredView::all(&ds)),
            Correlation::NotComputable(NotComputable::ZeroVariance)
        );
    }

    #[test]
    fn unit_totals_saturate_instead_of_overflowing() {
        let ds = Dataset::from_records(vec![
            Record::new("East", "Pen", date(2023, 1, 5), i64::MAX, 1.0),
            Record::new("East", "Pen", date(2023, 1, 6), 1, 1.0),
            Record::new("West", "Pen", date(2023, 2, 1), 3, 1.0),
        ]);
        let view = FilteredView::all(&ds);
        assert_eq!(regional_totals(&view)["East"], i64::MAX);
        assert_eq!(regional_totals(&view)["West"], 3);
        assert_eq!(monthly_totals(&view)[&YearMonth::new(2023, 1)], i64::MAX);
        assert_eq!(view.total_units(), i64::MAX);
    }

    #[test]
    fn pearson_matrix() {
        let ds = sample();
        let corr = correlation(&FilteredView::all(&ds));
        let Correlation::Matrix(m) = corr else {
            panic!("expected a matrix, got {corr:?}");
        };
        assert_eq!(m[0][0], 1.0);
        assert_eq!(m[1][1], 1.0);
        assert_eq!(m[0][1], m[1][0]);
        // units [10, 5, 2] vs price [1.5, 1.5, 50.0]
        assert!((m[0][1] - (-0.7857142857142857)).abs() < 1e-9);
        assert_eq!(corr.coefficient(), Some(m[0][1]));
    }

    #[test]
    fn perfectly_linear_columns() {
        let ds = Dataset::from_records(
            (1..=4)
                .map(|i| Record::new("East", "Pen", date(2023, 1, i), i as i64, 2.0 * i as f64))
                .collect(),
        );
        let r = correlation(&FilteredView::all(&ds)).coefficient().unwrap();
        assert!((r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn describe_matches_interpolated_quartiles() {
        let stats = ColumnStats::from_values(&[4.0, 1.0, 3.0, 2.0]);
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean, Some(2.5));
        assert_eq!(stats.min, Some(1.0));
        assert_eq!(stats.q25, Some(1.75));
        assert_eq!(stats.q50, Some(2.5));
        assert_eq!(stats.q75, Some(3.25));
        assert_eq!(stats.max, Some(4.0));
        let std = stats.std.unwrap();
        assert!((std - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert_eq!(stats.rows()[0], Some(4.0));
    }

    #[test]
    fn summary_bundles_everything() {
        let ds = sample();
        let view = FilteredView::all(&ds);
        let summary = Summary::compute(&view);
        assert_eq!(summary.rows, 3);
        assert_eq!(summary.regional_totals, regional_totals(&view));
        assert_eq!(summary.item_distribution.total, 3);
        assert_eq!(summary.describe.units.count, 3);
    }
}

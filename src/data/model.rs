use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Column names – the fixed sales schema
// ---------------------------------------------------------------------------

pub const REGION: &str = "Region";
pub const ITEM: &str = "Item";
pub const ORDER_DATE: &str = "OrderDate";
pub const UNITS: &str = "Units";
pub const UNIT_PRICE: &str = "Unit Price";
/// Spelling used by the OfficeSupplies sample dataset.
pub const UNIT_COST: &str = "Unit Cost";

/// Export / display column order.
pub const COLUMNS: [&str; 5] = [REGION, ITEM, ORDER_DATE, UNITS, UNIT_PRICE];

// ---------------------------------------------------------------------------
// Record – one sales transaction
// ---------------------------------------------------------------------------

/// A single transaction row. Field order matches [`COLUMNS`], which the CSV
/// writer relies on for the header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "Item")]
    pub item: String,
    #[serde(rename = "OrderDate")]
    pub order_date: NaiveDate,
    #[serde(rename = "Units")]
    pub units: i64,
    #[serde(rename = "Unit Price")]
    pub unit_price: f64,
}

impl Record {
    pub fn new(
        region: impl Into<String>,
        item: impl Into<String>,
        order_date: NaiveDate,
        units: i64,
        unit_price: f64,
    ) -> Self {
        Record {
            region: region.into(),
            item: item.into(),
            order_date,
            units,
            unit_price,
        }
    }

    /// Render a single cell as text for table display.
    pub fn cell(&self, column: usize) -> String {
        match column {
            0 => self.region.clone(),
            1 => self.item.clone(),
            2 => self.order_date.format("%Y-%m-%d").to_string(),
            3 => self.units.to_string(),
            4 => format!("{:.2}", self.unit_price),
            _ => String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed column indices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    /// All records in source order.
    pub records: Vec<Record>,
    /// Sorted distinct values of `Region`.
    pub regions: BTreeSet<String>,
    /// Sorted distinct values of `Item`.
    pub items: BTreeSet<String>,
    /// Earliest and latest `OrderDate` (None when there are no rows).
    pub date_span: Option<(NaiveDate, NaiveDate)>,
}

impl Dataset {
    /// Build column indices from the loaded records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut regions = BTreeSet::new();
        let mut items = BTreeSet::new();
        let mut date_span: Option<(NaiveDate, NaiveDate)> = None;

        for rec in &records {
            regions.insert(rec.region.clone());
            items.insert(rec.item.clone());
            date_span = Some(match date_span {
                None => (rec.order_date, rec.order_date),
                Some((lo, hi)) => (lo.min(rec.order_date), hi.max(rec.order_date)),
            });
        }

        Dataset {
            records,
            regions,
            items,
            date_span,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Days, NaiveDate};
use parquet::arrow::ArrowWriter;
use sales_lens::data::export::to_csv;
use sales_lens::data::filter::FilteredView;
use sales_lens::data::model::{Dataset, ITEM, ORDER_DATE, REGION, Record, UNIT_PRICE, UNITS};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    /// Uniform integer in `0..n`.
    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len() as u64) as usize]
    }
}

const REGIONS: [&str; 3] = ["East", "Central", "West"];

/// Item name and list price.
const ITEMS: [(&str, f64); 5] = [
    ("Pencil", 1.99),
    ("Binder", 19.99),
    ("Pen", 4.99),
    ("Desk", 275.0),
    ("Pen Set", 15.99),
];

fn generate(rows: usize, rng: &mut SimpleRng) -> Result<Vec<Record>> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).context("invalid start date")?;
    let span_days = 730;

    let mut records = Vec::with_capacity(rows);
    for _ in 0..rows {
        let region = rng.pick(&REGIONS);
        let &(item, list_price) = rng.pick(&ITEMS);
        let order_date = start
            .checked_add_days(Days::new(rng.below(span_days)))
            .context("date out of range")?;
        // Bulkier orders for cheap items, a few units for desks.
        let max_units = if list_price > 100.0 { 5 } else { 96 };
        let units = 1 + rng.below(max_units) as i64;
        // Up to ±10% around list price, rounded to cents.
        let jitter = (rng.below(21) as f64 - 10.0) / 100.0;
        let unit_price = (list_price * (1.0 + jitter) * 100.0).round() / 100.0;

        records.push(Record::new(*region, item, order_date, units, unit_price));
    }
    records.sort_by_key(|r| r.order_date);
    Ok(records)
}

fn write_parquet(dataset: &Dataset, path: &str) -> Result<()> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).context("invalid epoch")?;
    let recs = &dataset.records;

    let schema = Arc::new(Schema::new(vec![
        Field::new(REGION, DataType::Utf8, false),
        Field::new(ITEM, DataType::Utf8, false),
        Field::new(ORDER_DATE, DataType::Date32, false),
        Field::new(UNITS, DataType::Int64, false),
        Field::new(UNIT_PRICE, DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from_iter_values(recs.iter().map(|r| r.region.as_str()))),
            Arc::new(StringArray::from_iter_values(recs.iter().map(|r| r.item.as_str()))),
            Arc::new(Date32Array::from_iter_values(
                recs.iter()
                    .map(|r| (r.order_date - epoch).num_days() as i32),
            )),
            Arc::new(Int64Array::from_iter_values(recs.iter().map(|r| r.units))),
            Arc::new(Float64Array::from_iter_values(recs.iter().map(|r| r.unit_price))),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let dataset = Dataset::from_records(generate(500, &mut rng)?);

    let csv_path = "sample_sales.csv";
    let bytes = to_csv(&FilteredView::all(&dataset)).context("serialising CSV")?;
    std::fs::write(csv_path, bytes).with_context(|| format!("writing {csv_path}"))?;

    let parquet_path = "sample_sales.parquet";
    write_parquet(&dataset, parquet_path)?;

    println!(
        "Wrote {} sales records ({} regions, {} items) to {csv_path} and {parquet_path}",
        dataset.len(),
        dataset.regions.len(),
        dataset.items.len()
    );
    Ok(())
}

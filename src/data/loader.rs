use std::borrow::Cow;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Date32Type, Float64Type, Int64Type};
use chrono::{NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;

use super::error::LoadError;
use super::model::{
    Dataset, ITEM, ORDER_DATE, REGION, Record, UNIT_COST, UNIT_PRICE, UNITS,
};

// ---------------------------------------------------------------------------
// Source – where a dataset comes from
// ---------------------------------------------------------------------------

/// A dataset source: a local file or an uploaded byte stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Path(PathBuf),
    /// Uploaded content. `name` is the original file name and picks the format.
    Bytes { name: String, bytes: Vec<u8> },
}

impl Source {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Source::Path(path.into())
    }

    pub fn bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Source::Bytes {
            name: name.into(),
            bytes,
        }
    }

    /// Raw content of the source. Path sources are read from disk.
    pub fn read_bytes(&self) -> std::io::Result<Cow<'_, [u8]>> {
        match self {
            Source::Path(path) => std::fs::read(path).map(Cow::Owned),
            Source::Bytes { bytes, .. } => Ok(Cow::Borrowed(bytes)),
        }
    }

    /// Human-readable name for status lines and logs.
    pub fn label(&self) -> String {
        match self {
            Source::Path(path) => path.display().to_string(),
            Source::Bytes { name, .. } => format!("{name} (uploaded)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a dataset from any [`Source`].
pub fn load(source: &Source) -> Result<Dataset, LoadError> {
    let dataset = match source {
        Source::Path(path) => load_file(path)?,
        Source::Bytes { name, bytes } => load_bytes(name, bytes)?,
    };
    log::info!(
        "Loaded {} records from {} ({} regions, {} items)",
        dataset.len(),
        source.label(),
        dataset.regions.len(),
        dataset.items.len()
    );
    Ok(dataset)
}

/// Load a sales dataset from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row `Region,Item,OrderDate,Units,Unit Price`
/// * `.json`    – `[{ "Region": "East", "Item": "Pen", "OrderDate": "2023-01-05", ... }, ...]`
/// * `.parquet` – one column per field; `OrderDate` as date, timestamp or text
pub fn load_file(path: &Path) -> Result<Dataset, LoadError> {
    match extension(path).as_str() {
        "csv" | "" => load_csv(File::open(path)?),
        "json" => load_json(File::open(path)?),
        "parquet" | "pq" => load_parquet(File::open(path)?),
        other => Err(LoadError::UnsupportedFormat(other.to_string())),
    }
}

/// Load uploaded content. Anything not named `.json` is read as CSV.
/// Parquet uploads are rejected: the reader needs a seekable file.
pub fn load_bytes(name: &str, bytes: &[u8]) -> Result<Dataset, LoadError> {
    let ext = extension(Path::new(name));
    match ext.as_str() {
        "json" => load_json(bytes),
        "parquet" | "pq" => Err(LoadError::UnsupportedFormat(format!("{ext} (upload)"))),
        _ => load_csv(bytes),
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, matched by name. Extra columns
/// (e.g. `Rep`, `Total`) are ignored.
pub fn load_csv<R: Read>(reader: R) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = reader.headers()?.clone();

    let column = |name: &'static str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or(LoadError::MissingColumn(name))
    };
    let region_idx = column(REGION)?;
    let item_idx = column(ITEM)?;
    let date_idx = column(ORDER_DATE)?;
    let units_idx = column(UNITS)?;
    let price_idx = column(UNIT_PRICE)
        .or_else(|_| column(UNIT_COST))
        .map_err(|_| LoadError::MissingColumn(UNIT_PRICE))?;

    let mut records = Vec::new();

    for (i, result) in reader.records().enumerate() {
        let row = i + 1;
        let record = result?;
        let field = |idx: usize, name: &'static str| {
            record
                .get(idx)
                .filter(|s| !s.is_empty())
                .ok_or(LoadError::MissingValue { row, column: name })
        };

        let raw_date = field(date_idx, ORDER_DATE)?;
        let order_date = parse_order_date(raw_date).ok_or_else(|| LoadError::InvalidDate {
            row,
            column: ORDER_DATE,
            value: raw_date.to_string(),
        })?;

        records.push(Record {
            region: field(region_idx, REGION)?.to_string(),
            item: field(item_idx, ITEM)?.to_string(),
            order_date,
            units: parse_units(field(units_idx, UNITS)?, row)?,
            unit_price: parse_price(field(price_idx, UNIT_PRICE)?, row)?,
        });
    }

    Ok(Dataset::from_records(records))
}

fn parse_units(s: &str, row: usize) -> Result<i64, LoadError> {
    if let Ok(i) = s.parse::<i64>() {
        return Ok(i);
    }
    // Integer columns round-tripped through float tooling come back as "12.0".
    s.parse::<f64>()
        .ok()
        .and_then(whole_units)
        .ok_or_else(|| LoadError::InvalidNumber {
            row,
            column: UNITS,
            value: s.to_string(),
        })
}

/// `f` as a unit count: finite, integral and inside the `i64` range.
fn whole_units(f: f64) -> Option<i64> {
    // 2^63; `i64::MAX as f64` rounds up to this.
    const BOUND: f64 = 9_223_372_036_854_775_808.0;
    (f.is_finite() && f.fract() == 0.0 && (-BOUND..BOUND).contains(&f)).then(|| f as i64)
}

fn parse_price(s: &str, row: usize) -> Result<f64, LoadError> {
    s.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .ok_or_else(|| LoadError::InvalidNumber {
            row,
            column: UNIT_PRICE,
            value: s.to_string(),
        })
}

// ---------------------------------------------------------------------------
// Date coercion
// ---------------------------------------------------------------------------

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse an order date. Accepts ISO dates and datetimes (time dropped),
/// `M/D/YYYY`, `M/D/YY`, `D-Mon-YYYY` and `D-Mon-YY`. Slash dates are
/// month-first.
pub fn parse_order_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    let is_sep = |c: char| c == '/' || c == '-';
    let leading = s.split(is_sep).next().map_or(0, str::len);
    let trailing = s.rsplit(is_sep).next().map_or(0, str::len);

    // Pick the format family from the field shape so that `%Y` never
    // swallows a two-digit year.
    let formats: &[&str] = if leading == 4 {
        &["%Y-%m-%d", "%Y/%m/%d"]
    } else if trailing == 2 {
        &["%m/%d/%y", "%d-%b-%y"]
    } else {
        &["%m/%d/%Y", "%d-%b-%Y"]
    };

    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON (the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Region": "East", "Item": "Pen", "OrderDate": "2023-01-05",
///     "Units": 10, "Unit Price": 1.5 },
///   ...
/// ]
/// ```
#[derive(Deserialize)]
struct JsonRow {
    #[serde(rename = "Region")]
    region: String,
    #[serde(rename = "Item")]
    item: String,
    #[serde(rename = "OrderDate")]
    order_date: String,
    #[serde(rename = "Units")]
    units: i64,
    #[serde(rename = "Unit Price", alias = "Unit Cost")]
    unit_price: f64,
}

fn load_json<R: Read>(reader: R) -> Result<Dataset, LoadError> {
    let rows: Vec<JsonRow> = serde_json::from_reader(reader)?;

    let records = rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            let order_date =
                parse_order_date(&row.order_date).ok_or_else(|| LoadError::InvalidDate {
                    row: i + 1,
                    column: ORDER_DATE,
                    value: row.order_date.clone(),
                })?;
            Ok(Record {
                region: row.region,
                item: row.item,
                order_date,
                units: row.units,
                unit_price: row.unit_price,
            })
        })
        .collect::<Result<Vec<_>, LoadError>>()?;

    Ok(Dataset::from_records(records))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one column per field.
///
/// Works with files written by **Pandas** (`df.to_parquet()`), **Polars** and
/// the bundled `generate_sample` binary. Columns are normalised with Arrow
/// casts, so dictionary-encoded strings and Int32 units load too.
fn load_parquet(file: File) -> Result<Dataset, LoadError> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result?;
        let schema = batch.schema();
        let column = |name: &'static str| -> Result<ArrayRef, LoadError> {
            schema
                .index_of(name)
                .map(|i| batch.column(i).clone())
                .map_err(|_| LoadError::MissingColumn(name))
        };

        let regions = cast(&column(REGION)?, &DataType::Utf8)?;
        let items = cast(&column(ITEM)?, &DataType::Utf8)?;
        let units = UnitCounts::from_column(column(UNITS)?)?;
        let prices = match column(UNIT_PRICE) {
            Ok(col) => col,
            Err(_) => column(UNIT_COST)?,
        };
        let prices = cast(&prices, &DataType::Float64)?;
        let dates = OrderDates::from_column(column(ORDER_DATE)?)?;

        let regions = regions.as_string::<i32>();
        let items = items.as_string::<i32>();
        let prices = prices.as_primitive::<Float64Type>();

        let offset = records.len();
        for i in 0..batch.num_rows() {
            let row = offset + i + 1;
            let present = |arr: &dyn Array, name: &'static str| {
                if arr.is_null(i) {
                    Err(LoadError::MissingValue { row, column: name })
                } else {
                    Ok(())
                }
            };
            present(regions, REGION)?;
            present(items, ITEM)?;
            present(prices, UNIT_PRICE)?;

            records.push(Record {
                region: regions.value(i).to_string(),
                item: items.value(i).to_string(),
                order_date: dates.get(i, row)?,
                units: units.get(i, row)?,
                unit_price: prices.value(i),
            });
        }
    }

    Ok(Dataset::from_records(records))
}

/// `Units` column normalised to integers or floats. Float columns must hold
/// whole numbers, as in the CSV reader.
enum UnitCounts {
    Int(ArrayRef),
    Float(ArrayRef),
}

impl UnitCounts {
    fn from_column(col: ArrayRef) -> Result<Self, LoadError> {
        if col.data_type().is_floating() {
            Ok(UnitCounts::Float(cast(&col, &DataType::Float64)?))
        } else {
            Ok(UnitCounts::Int(cast(&col, &DataType::Int64)?))
        }
    }

    fn get(&self, i: usize, row: usize) -> Result<i64, LoadError> {
        let arr = match self {
            UnitCounts::Int(arr) | UnitCounts::Float(arr) => arr,
        };
        if arr.is_null(i) {
            return Err(LoadError::MissingValue { row, column: UNITS });
        }
        match self {
            UnitCounts::Int(arr) => Ok(arr.as_primitive::<Int64Type>().value(i)),
            UnitCounts::Float(arr) => {
                let f = arr.as_primitive::<Float64Type>().value(i);
                whole_units(f).ok_or_else(|| LoadError::InvalidNumber {
                    row,
                    column: UNITS,
                    value: f.to_string(),
                })
            }
        }
    }
}

/// `OrderDate` column normalised to either native dates or text.
enum OrderDates {
    Native(ArrayRef),
    Text(ArrayRef),
}

impl OrderDates {
    fn from_column(col: ArrayRef) -> Result<Self, LoadError> {
        match col.data_type() {
            DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => {
                Ok(OrderDates::Native(cast(&col, &DataType::Date32)?))
            }
            DataType::Utf8 | DataType::LargeUtf8 | DataType::Dictionary(_, _) => {
                Ok(OrderDates::Text(cast(&col, &DataType::Utf8)?))
            }
            other => Err(LoadError::UnsupportedColumnType {
                column: ORDER_DATE,
                data_type: other.to_string(),
            }),
        }
    }

    fn get(&self, i: usize, row: usize) -> Result<NaiveDate, LoadError> {
        let missing = || LoadError::MissingValue {
            row,
            column: ORDER_DATE,
        };
        match self {
            OrderDates::Native(arr) => {
                if arr.is_null(i) {
                    return Err(missing());
                }
                let dates = arr.as_primitive::<Date32Type>();
                dates.value_as_date(i).ok_or_else(|| LoadError::InvalidDate {
                    row,
                    column: ORDER_DATE,
                    value: dates.value(i).to_string(),
                })
            }
            OrderDates::Text(arr) => {
                if arr.is_null(i) {
                    return Err(missing());
                }
                let raw = arr.as_string::<i32>().value(i);
                parse_order_date(raw).ok_or_else(|| LoadError::InvalidDate {
                    row,
                    column: ORDER_DATE,
                    value: raw.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const SAMPLE: &str = "\
Region,Item,OrderDate,Units,Unit Price
East,Pen,2023-01-05,10,1.5
West,Pen,2023-01-20,5,1.5
East,Desk,2023-02-01,2,50.0
";

    #[test]
    fn csv_rows_load_in_order() {
        let ds = load_csv(SAMPLE.as_bytes()).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(
            ds.records[0],
            Record::new("East", "Pen", date(2023, 1, 5), 10, 1.5)
        );
        assert_eq!(ds.records[2].item, "Desk");
        assert_eq!(ds.date_span, Some((date(2023, 1, 5), date(2023, 2, 1))));
    }

    #[test]
    fn office_supplies_layout_is_accepted() {
        let csv = "\
OrderDate,Region,Rep,Item,Units,Unit Cost,Total
1/6/14,East,Jones,Pencil,95,1.99,189.05
1/23/2014,Central,Kivell,Binder,50,19.99,999.50
";
        let ds = load_csv(csv.as_bytes()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].order_date, date(2014, 1, 6));
        assert_eq!(ds.records[1].order_date, date(2014, 1, 23));
        assert!((ds.records[1].unit_price - 19.99).abs() < 1e-12);
    }

    #[test]
    fn unparsable_date_is_fatal_and_names_the_row() {
        let csv = "Region,Item,OrderDate,Units,Unit Price\nEast,Pen,2023-01-05,1,1.0\nEast,Pen,soon,1,1.0\n";
        match load_csv(csv.as_bytes()) {
            Err(LoadError::InvalidDate { row, value, .. }) => {
                assert_eq!(row, 2);
                assert_eq!(value, "soon");
            }
            other => panic!("expected InvalidDate, got {other:?}"),
        }
    }

    #[test]
    fn missing_column_is_reported() {
        let csv = "Region,Item,Units,Unit Price\nEast,Pen,1,1.0\n";
        assert!(matches!(
            load_csv(csv.as_bytes()),
            Err(LoadError::MissingColumn(ORDER_DATE))
        ));
    }

    #[test]
    fn bad_units_are_rejected() {
        let csv = "Region,Item,OrderDate,Units,Unit Price\nEast,Pen,2023-01-05,ten,1.0\n";
        assert!(matches!(
            load_csv(csv.as_bytes()),
            Err(LoadError::InvalidNumber { row: 1, column: UNITS, .. })
        ));
    }

    #[test]
    fn ragged_csv_is_malformed() {
        let csv = "Region,Item,OrderDate,Units,Unit Price\nEast,Pen,2023-01-05\n";
        assert!(matches!(load_csv(csv.as_bytes()), Err(LoadError::Csv(_))));
    }

    #[test]
    fn float_formatted_units_load() {
        assert_eq!(parse_units("12.0", 1).unwrap(), 12);
        assert!(parse_units("12.5", 1).is_err());
    }

    #[test]
    fn out_of_range_units_are_rejected() {
        assert!(matches!(
            parse_units("1e30", 3),
            Err(LoadError::InvalidNumber { row: 3, column: UNITS, .. })
        ));
        assert!(parse_units("-1e30", 1).is_err());
        assert!(parse_units("9223372036854775808", 1).is_err());
        assert_eq!(parse_units("9223372036854775807", 1).unwrap(), i64::MAX);
        assert_eq!(parse_units("-4096.0", 1).unwrap(), -4096);
    }

    #[test]
    fn date_formats() {
        let d = date(2023, 1, 5);
        assert_eq!(parse_order_date("2023-01-05"), Some(d));
        assert_eq!(parse_order_date("2023/01/05"), Some(d));
        assert_eq!(parse_order_date("1/5/2023"), Some(d));
        assert_eq!(parse_order_date("01/05/23"), Some(d));
        assert_eq!(parse_order_date("5-Jan-2023"), Some(d));
        assert_eq!(parse_order_date("5-Jan-23"), Some(d));
        assert_eq!(parse_order_date("2023-01-05 13:45:00"), Some(d));
        assert_eq!(parse_order_date("2023-01-05T00:00:00"), Some(d));
        assert_eq!(parse_order_date("2023-02-30"), None);
        assert_eq!(parse_order_date(""), None);
    }

    #[test]
    fn json_records_load() {
        let json = r#"[
            {"Region": "East", "Item": "Pen", "OrderDate": "2023-01-05", "Units": 10, "Unit Price": 1.5},
            {"Region": "West", "Item": "Desk", "OrderDate": "2/1/2023", "Units": 2, "Unit Cost": 50.0}
        ]"#;
        let ds = load_bytes("sales.json", json.as_bytes()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[1].order_date, date(2023, 2, 1));
        assert!((ds.records[1].unit_price - 50.0).abs() < 1e-12);
    }

    #[test]
    fn uploads_default_to_csv() {
        let ds = load(&Source::bytes("upload", SAMPLE.as_bytes().to_vec())).unwrap();
        assert_eq!(ds.len(), 3);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_file(Path::new("sales.xlsx")).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat(ext) if ext == "xlsx"));
    }
}

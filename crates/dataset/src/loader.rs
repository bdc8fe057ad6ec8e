use crate::error::DatasetError;
use chrono::NaiveDateTime;
use core_types::{OrderRecord, RecordSet};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// Columns the pre-joined export must carry. Checked against the header
/// before any row is parsed, so a truncated or mis-joined export fails fast
/// with the missing column named.
const REQUIRED_COLUMNS: [&str; 9] = [
    "order_id",
    "order_item_id",
    "order_purchase_timestamp",
    "price",
    "product_category_name_english",
    "review_score",
    "customer_id",
    "customer_state",
    "payment_type",
];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The raw shape of one CSV row. Numeric fields come in as strings because
/// the export writes them inconsistently (integers sometimes carry a trailing
/// `.0`); conversion and validation happen in `parse_record`.
#[derive(Debug, Deserialize)]
struct RawRecord {
    order_id: String,
    order_item_id: String,
    order_purchase_timestamp: String,
    price: String,
    #[serde(rename = "product_category_name_english")]
    product_category: Option<String>,
    review_score: Option<String>,
    customer_id: String,
    customer_state: Option<String>,
    payment_type: Option<String>,
}

/// Loads the sales export from a file path.
pub fn load_csv(path: &Path) -> Result<RecordSet, DatasetError> {
    let file = File::open(path)?;
    let record_set = load_records(file)?;
    match record_set.time_span() {
        Some(span) => tracing::info!(
            rows = record_set.len(),
            start = %span.start,
            end = %span.end,
            "Loaded sales record set."
        ),
        None => tracing::warn!(path = %path.display(), "Loaded an empty sales record set."),
    }
    Ok(record_set)
}

/// Loads the sales export from any reader into a time-sorted `RecordSet`.
///
/// Fails fast on a missing required column; afterwards every malformed value
/// is reported with its row and column rather than being silently dropped.
pub fn load_records<R: Read>(reader: R) -> Result<RecordSet, DatasetError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    validate_header(csv_reader.headers()?)?;

    let mut records = Vec::new();
    for (index, raw) in csv_reader.deserialize::<RawRecord>().enumerate() {
        // Row numbers are 1-based and skip the header line.
        let row = index + 2;
        records.push(parse_record(raw?, row)?);
    }
    Ok(RecordSet::new(records))
}

fn validate_header(header: &csv::StringRecord) -> Result<(), DatasetError> {
    for column in REQUIRED_COLUMNS {
        if !header.iter().any(|h| h == column) {
            return Err(DatasetError::MissingColumn(column.to_string()));
        }
    }
    Ok(())
}

fn parse_record(raw: RawRecord, row: usize) -> Result<OrderRecord, DatasetError> {
    let order_purchase_timestamp =
        NaiveDateTime::parse_from_str(&raw.order_purchase_timestamp, TIMESTAMP_FORMAT)
            .map_err(|e| DatasetError::InvalidValue {
                row,
                column: "order_purchase_timestamp",
                value: raw.order_purchase_timestamp.clone(),
                reason: e.to_string(),
            })?
            .and_utc();

    let order_item_id = parse_lenient_integer(&raw.order_item_id).ok_or_else(|| {
        DatasetError::InvalidValue {
            row,
            column: "order_item_id",
            value: raw.order_item_id.clone(),
            reason: "expected a positive integer".to_string(),
        }
    })? as u32;

    let price = Decimal::from_str(&raw.price).map_err(|e| DatasetError::InvalidValue {
        row,
        column: "price",
        value: raw.price.clone(),
        reason: e.to_string(),
    })?;

    let review_score = match raw.review_score.as_deref().filter(|s| !s.is_empty()) {
        Some(value) => Some(parse_review_score(value).ok_or_else(|| {
            DatasetError::InvalidValue {
                row,
                column: "review_score",
                value: value.to_string(),
                reason: "expected an integer between 1 and 5".to_string(),
            }
        })?),
        None => None,
    };

    Ok(OrderRecord {
        order_id: raw.order_id,
        order_item_id,
        order_purchase_timestamp,
        price,
        product_category: raw.product_category.filter(|s| !s.is_empty()),
        review_score,
        customer_id: raw.customer_id,
        customer_state: raw.customer_state.filter(|s| !s.is_empty()),
        payment_type: raw.payment_type.filter(|s| !s.is_empty()),
    })
}

/// Accepts both "3" and "3.0", which the export mixes freely.
fn parse_lenient_integer(value: &str) -> Option<u64> {
    if let Ok(n) = value.parse::<u64>() {
        return Some(n);
    }
    let float = value.parse::<f64>().ok()?;
    if float.fract() == 0.0 && float >= 0.0 {
        Some(float as u64)
    } else {
        None
    }
}

fn parse_review_score(value: &str) -> Option<u8> {
    let score = parse_lenient_integer(value)?;
    if (1..=5).contains(&score) {
        Some(score as u8)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const HEADER: &str = "order_id,order_item_id,order_purchase_timestamp,price,\
product_category_name_english,review_score,customer_id,customer_state,payment_type";

    fn csv_bytes(rows: &[&str]) -> Vec<u8> {
        let mut out = String::from(HEADER);
        for row in rows {
            out.push('\n');
            out.push_str(row);
        }
        out.into_bytes()
    }

    #[test]
    fn loads_and_sorts_by_purchase_timestamp() {
        let input = csv_bytes(&[
            "o2,1,2018-03-05 14:00:00,25.50,toys,4.0,c2,SP,credit_card",
            "o1,1,2018-03-01 09:30:00,10.00,books,5,c1,RJ,boleto",
        ]);
        let set = load_records(&input[..]).unwrap();
        assert_eq!(set.len(), 2);

        let records = set.records();
        assert_eq!(records[0].order_id, "o1");
        assert_eq!(records[0].price, dec!(10.00));
        assert_eq!(records[0].review_score, Some(5));
        assert_eq!(records[1].review_score, Some(4));
        assert_eq!(records[1].product_category.as_deref(), Some("toys"));
    }

    #[test]
    fn missing_column_is_named_before_any_row_parses() {
        let input = b"order_id,price\no1,10.00".to_vec();
        let err = load_records(&input[..]).unwrap_err();
        match err {
            DatasetError::MissingColumn(column) => assert_eq!(column, "order_item_id"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn empty_optional_fields_become_none() {
        let input = csv_bytes(&["o1,1,2018-03-01 09:30:00,10.00,,,c1,,"]);
        let set = load_records(&input[..]).unwrap();
        let record = &set.records()[0];
        assert_eq!(record.product_category, None);
        assert_eq!(record.review_score, None);
        assert_eq!(record.customer_state, None);
        assert_eq!(record.payment_type, None);
    }

    #[test]
    fn out_of_range_review_score_reports_row_and_column() {
        let input = csv_bytes(&["o1,1,2018-03-01 09:30:00,10.00,toys,9,c1,SP,boleto"]);
        let err = load_records(&input[..]).unwrap_err();
        match err {
            DatasetError::InvalidValue { row, column, .. } => {
                assert_eq!(row, 2);
                assert_eq!(column, "review_score");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn unparseable_timestamp_is_rejected() {
        let input = csv_bytes(&["o1,1,yesterday,10.00,toys,4,c1,SP,boleto"]);
        let err = load_records(&input[..]).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::InvalidValue {
                column: "order_purchase_timestamp",
                ..
            }
        ));
    }

    #[test]
    fn empty_file_with_valid_header_yields_empty_set() {
        let input = csv_bytes(&[]);
        let set = load_records(&input[..]).unwrap();
        assert!(set.is_empty());
        assert_eq!(set.time_span(), None);
    }
}

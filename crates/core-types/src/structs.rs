use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single order line item from the pre-joined sales export.
///
/// One physical order may span several of these rows (one per item), so any
/// order-level aggregate must count distinct `order_id`s, and any
/// customer-level aggregate must deduplicate on `customer_id` first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: String,
    /// Line-item sequence number within the order (1-based).
    pub order_item_id: u32,
    pub order_purchase_timestamp: DateTime<Utc>,
    /// Revenue contribution of this line item.
    pub price: Decimal,
    /// English product category name. Absent for uncategorized products.
    pub product_category: Option<String>,
    /// Review score for the order, 1 through 5. Absent when no review exists.
    pub review_score: Option<u8>,
    pub customer_id: String,
    /// Two-letter state code of the customer. Absent for incomplete addresses.
    pub customer_state: Option<String>,
    pub payment_type: Option<String>,
}

impl OrderRecord {
    /// Calendar day of the purchase, used for daily bucketing and filtering.
    pub fn purchase_date(&self) -> NaiveDate {
        self.order_purchase_timestamp.date_naive()
    }
}

/// An inclusive calendar date range with fully-typed boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range, swapping the boundaries if they arrive reversed.
    /// A reversed user selection is corrected, never rejected.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }.normalized()
    }

    /// Returns the range with `start <= end` guaranteed.
    pub fn normalized(self) -> Self {
        if self.start > self.end {
            Self {
                start: self.end,
                end: self.start,
            }
        } else {
            self
        }
    }

    /// Intersects this range with another, typically the available data span.
    ///
    /// Returns `None` when the two ranges do not overlap at all, which is the
    /// signal for "the requested window holds no data".
    pub fn intersect(self, other: DateRange) -> Option<DateRange> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if start > end {
            None
        } else {
            Some(DateRange { start, end })
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// The immutable in-memory record set that feeds every derived view.
///
/// Rows are sorted ascending by purchase timestamp at construction, which
/// makes date-range filtering a binary search for a contiguous sub-slice
/// rather than a full scan.
#[derive(Debug, Clone)]
pub struct RecordSet {
    records: Vec<OrderRecord>,
}

impl RecordSet {
    pub fn new(mut records: Vec<OrderRecord>) -> Self {
        records.sort_by_key(|r| r.order_purchase_timestamp);
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[OrderRecord] {
        &self.records
    }

    /// The calendar span covered by the data, `None` for an empty set.
    pub fn time_span(&self) -> Option<DateRange> {
        let first = self.records.first()?;
        let last = self.records.last()?;
        Some(DateRange {
            start: first.purchase_date(),
            end: last.purchase_date(),
        })
    }

    /// Resolves a requested filter range against the available data span.
    ///
    /// A missing request means "everything". A reversed request is swapped,
    /// and the result is clamped to the span; `None` means the request lies
    /// entirely outside the data.
    pub fn effective_range(&self, requested: Option<DateRange>) -> Option<DateRange> {
        let span = self.time_span()?;
        match requested {
            Some(range) => range.normalized().intersect(span),
            None => Some(span),
        }
    }

    /// The contiguous sub-slice of records whose purchase date falls inside
    /// the inclusive range.
    pub fn slice(&self, range: DateRange) -> &[OrderRecord] {
        let range = range.normalized();
        let lo = self
            .records
            .partition_point(|r| r.purchase_date() < range.start);
        let hi = self
            .records
            .partition_point(|r| r.purchase_date() <= range.end);
        &self.records[lo..hi]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn record(day: u32, hour: u32) -> OrderRecord {
        OrderRecord {
            order_id: format!("o-{day}-{hour}"),
            order_item_id: 1,
            order_purchase_timestamp: Utc.with_ymd_and_hms(2018, 3, day, hour, 0, 0).unwrap(),
            price: dec!(10),
            product_category: None,
            review_score: None,
            customer_id: format!("c-{day}-{hour}"),
            customer_state: None,
            payment_type: None,
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2018, 3, day).unwrap()
    }

    #[test]
    fn reversed_range_is_swapped() {
        let range = DateRange::new(date(20), date(5));
        assert_eq!(range.start, date(5));
        assert_eq!(range.end, date(20));
    }

    #[test]
    fn disjoint_ranges_do_not_intersect() {
        let span = DateRange::new(date(1), date(10));
        let outside = DateRange::new(date(20), date(25));
        assert_eq!(outside.intersect(span), None);
    }

    #[test]
    fn intersection_clamps_to_span() {
        let span = DateRange::new(date(5), date(10));
        let wide = DateRange::new(date(1), date(31));
        assert_eq!(wide.intersect(span), Some(span));
    }

    #[test]
    fn slice_returns_inclusive_date_window() {
        let set = RecordSet::new(vec![record(3, 8), record(5, 12), record(5, 23), record(9, 1)]);
        let rows = set.slice(DateRange::new(date(5), date(5)));
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.purchase_date() == date(5)));
    }

    #[test]
    fn effective_range_defaults_to_full_span() {
        let set = RecordSet::new(vec![record(3, 8), record(9, 1)]);
        assert_eq!(
            set.effective_range(None),
            Some(DateRange::new(date(3), date(9)))
        );
    }

    #[test]
    fn effective_range_outside_data_is_none() {
        let set = RecordSet::new(vec![record(3, 8), record(9, 1)]);
        let requested = Some(DateRange::new(date(20), date(28)));
        assert_eq!(set.effective_range(requested), None);
    }
}

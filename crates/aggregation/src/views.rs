use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One calendar-day bucket of the order/revenue trend.
///
/// `order_count` counts distinct orders, not line items; `revenue` is the sum
/// of line-item prices purchased that day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyOrders {
    pub day: NaiveDate,
    pub order_count: usize,
    pub revenue: Decimal,
}

/// A product category with its mean review score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRating {
    pub category: String,
    pub mean_rating: Decimal,
}

/// A product category with the number of line items sold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryVolume {
    pub category: String,
    pub items_sold: usize,
}

/// A customer state with its mean review score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateRating {
    pub state: String,
    pub mean_rating: Decimal,
}

/// A customer state with its summed revenue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateRevenue {
    pub state: String,
    pub revenue: Decimal,
}

/// A payment type with the number of distinct customers using it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentTypeCount {
    pub payment_type: String,
    pub customers: usize,
}

/// A customer state with the number of distinct customers living there,
/// ordered by count for the distribution widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateCustomerCount {
    pub state: String,
    pub customers: usize,
}

/// A `(region_code, count)` pair for the choropleth map. The region code is
/// the state code the boundary GeoJSON keys its features on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionCount {
    pub region_code: String,
    pub customers: usize,
}

/// The scalar header block of the dashboard for one filtered range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Distinct orders in the range.
    pub order_count: usize,
    /// Total revenue in the range.
    pub revenue: Decimal,
    /// Mean review score across all rated records; `None` when the range
    /// holds no rated records at all.
    pub mean_rating: Option<Decimal>,
}

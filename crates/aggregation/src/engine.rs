use crate::views::{
    CategoryRating, CategoryVolume, DailyOrders, PaymentTypeCount, RegionCount, StateCustomerCount,
    StateRating, StateRevenue, Summary,
};
use chrono::NaiveDate;
use core_types::{OrderRecord, RatingDirection};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap, HashSet};

/// A stateless calculator that derives every dashboard view from a filtered
/// slice of order records.
///
/// Rows missing the grouping key of a view (category, state, payment type)
/// are excluded from that view only; rows without a review score are excluded
/// from rating means. Nothing here mutates the input.
#[derive(Debug, Default)]
pub struct AggregationEngine {}

impl AggregationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buckets records by purchase day and computes distinct-order counts and
    /// summed revenue per bucket, ascending by day. Days with no records are
    /// simply absent; there is no forward-filling.
    pub fn daily_orders(&self, records: &[OrderRecord]) -> Vec<DailyOrders> {
        let mut buckets: BTreeMap<NaiveDate, (HashSet<&str>, Decimal)> = BTreeMap::new();
        for record in records {
            let (orders, revenue) = buckets.entry(record.purchase_date()).or_default();
            orders.insert(record.order_id.as_str());
            *revenue += record.price;
        }
        buckets
            .into_iter()
            .map(|(day, (orders, revenue))| DailyOrders {
                day,
                order_count: orders.len(),
                revenue,
            })
            .collect()
    }

    /// The top-`k` (or bottom-`k`) product categories by mean review score.
    ///
    /// Ties keep first-encountered category order, because the sort is stable
    /// over the grouping's insertion order. Categories with no rated records
    /// have no mean and are excluded.
    pub fn category_rating_extremes(
        &self,
        records: &[OrderRecord],
        k: usize,
        direction: RatingDirection,
    ) -> Vec<CategoryRating> {
        let mut ratings: Vec<CategoryRating> =
            grouped_by(records, |r| r.product_category.as_deref())
                .into_iter()
                .filter_map(|(category, rows)| {
                    Some(CategoryRating {
                        category: category.to_string(),
                        mean_rating: mean_score(&rows)?,
                    })
                })
                .collect();
        match direction {
            RatingDirection::Best => ratings.sort_by(|a, b| b.mean_rating.cmp(&a.mean_rating)),
            RatingDirection::Worst => ratings.sort_by(|a, b| a.mean_rating.cmp(&b.mean_rating)),
        }
        ratings.truncate(k);
        ratings
    }

    /// Arithmetic mean of the review score across all rated records.
    /// `None` when no record in the slice carries a score.
    pub fn overall_mean_rating(&self, records: &[OrderRecord]) -> Option<Decimal> {
        let scores: Vec<&OrderRecord> = records.iter().collect();
        mean_score(&scores)
    }

    /// The top-`k` product categories by number of line items sold.
    pub fn top_categories_by_volume(&self, records: &[OrderRecord], k: usize) -> Vec<CategoryVolume> {
        let mut volumes: Vec<CategoryVolume> =
            grouped_by(records, |r| r.product_category.as_deref())
                .into_iter()
                .map(|(category, rows)| CategoryVolume {
                    category: category.to_string(),
                    items_sold: rows.len(),
                })
                .collect();
        volumes.sort_by(|a, b| b.items_sold.cmp(&a.items_sold));
        volumes.truncate(k);
        volumes
    }

    /// Mean review score per customer state, descending, untruncated.
    pub fn state_mean_rating(&self, records: &[OrderRecord]) -> Vec<StateRating> {
        let mut ratings: Vec<StateRating> = grouped_by(records, |r| r.customer_state.as_deref())
            .into_iter()
            .filter_map(|(state, rows)| {
                Some(StateRating {
                    state: state.to_string(),
                    mean_rating: mean_score(&rows)?,
                })
            })
            .collect();
        ratings.sort_by(|a, b| b.mean_rating.cmp(&a.mean_rating));
        ratings
    }

    /// Summed revenue per customer state, descending, untruncated.
    pub fn state_revenue(&self, records: &[OrderRecord]) -> Vec<StateRevenue> {
        let mut revenues: Vec<StateRevenue> = grouped_by(records, |r| r.customer_state.as_deref())
            .into_iter()
            .map(|(state, rows)| StateRevenue {
                state: state.to_string(),
                revenue: rows.iter().map(|r| r.price).sum(),
            })
            .collect();
        revenues.sort_by(|a, b| b.revenue.cmp(&a.revenue));
        revenues
    }

    /// Distinct customers per payment type, descending.
    ///
    /// Customers are deduplicated first, keeping the first-encountered row,
    /// so a customer with several orders counts once under the payment type
    /// of that first row.
    pub fn customer_payment_mix(&self, records: &[OrderRecord]) -> Vec<PaymentTypeCount> {
        let customers = dedup_customers(records);
        let mut mix: Vec<PaymentTypeCount> =
            grouped_by_ref(&customers, |r| r.payment_type.as_deref())
                .into_iter()
                .map(|(payment_type, rows)| PaymentTypeCount {
                    payment_type: payment_type.to_string(),
                    customers: rows.len(),
                })
                .collect();
        mix.sort_by(|a, b| b.customers.cmp(&a.customers));
        mix
    }

    /// Distinct customers per state, descending. Same deduplication rule as
    /// the payment mix.
    pub fn customer_state_distribution(&self, records: &[OrderRecord]) -> Vec<StateCustomerCount> {
        let customers = dedup_customers(records);
        let mut distribution: Vec<StateCustomerCount> =
            grouped_by_ref(&customers, |r| r.customer_state.as_deref())
                .into_iter()
                .map(|(state, rows)| StateCustomerCount {
                    state: state.to_string(),
                    customers: rows.len(),
                })
                .collect();
        distribution.sort_by(|a, b| b.customers.cmp(&a.customers));
        distribution
    }

    /// Distinct customers per state as `(region_code, count)` pairs for the
    /// choropleth, sorted by region code so the output is deterministic. The
    /// join against the boundary GeoJSON happens in the consumer.
    pub fn customer_totals_by_state(&self, records: &[OrderRecord]) -> Vec<RegionCount> {
        let customers = dedup_customers(records);
        let mut totals: Vec<RegionCount> =
            grouped_by_ref(&customers, |r| r.customer_state.as_deref())
                .into_iter()
                .map(|(state, rows)| RegionCount {
                    region_code: state.to_string(),
                    customers: rows.len(),
                })
                .collect();
        totals.sort_by(|a, b| a.region_code.cmp(&b.region_code));
        totals
    }

    /// The scalar header block: distinct orders, total revenue, overall mean
    /// rating for the filtered range.
    pub fn summary(&self, records: &[OrderRecord]) -> Summary {
        let orders: HashSet<&str> = records.iter().map(|r| r.order_id.as_str()).collect();
        Summary {
            order_count: orders.len(),
            revenue: records.iter().map(|r| r.price).sum(),
            mean_rating: self.overall_mean_rating(records),
        }
    }
}

/// Partitions records by a grouping key, preserving first-encountered group
/// order. Rows where the key is absent are skipped.
fn grouped_by<'a, F>(records: &'a [OrderRecord], key: F) -> Vec<(&'a str, Vec<&'a OrderRecord>)>
where
    F: Fn(&'a OrderRecord) -> Option<&'a str>,
{
    grouped_by_iter(records.iter(), key)
}

/// Same as `grouped_by`, over an already-collected set of record references.
fn grouped_by_ref<'a, F>(records: &[&'a OrderRecord], key: F) -> Vec<(&'a str, Vec<&'a OrderRecord>)>
where
    F: Fn(&'a OrderRecord) -> Option<&'a str>,
{
    grouped_by_iter(records.iter().copied(), key)
}

fn grouped_by_iter<'a, I, F>(records: I, key: F) -> Vec<(&'a str, Vec<&'a OrderRecord>)>
where
    I: Iterator<Item = &'a OrderRecord>,
    F: Fn(&'a OrderRecord) -> Option<&'a str>,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<&OrderRecord>)> = Vec::new();
    for record in records {
        let Some(group_key) = key(record) else {
            continue;
        };
        let slot = *index.entry(group_key).or_insert_with(|| {
            groups.push((group_key, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(record);
    }
    groups
}

/// Mean review score over the rated records in a group, `None` when the group
/// holds no rated records.
fn mean_score(records: &[&OrderRecord]) -> Option<Decimal> {
    let mut sum: u64 = 0;
    let mut count: u64 = 0;
    for record in records {
        if let Some(score) = record.review_score {
            sum += u64::from(score);
            count += 1;
        }
    }
    if count == 0 {
        None
    } else {
        Some(Decimal::from(sum) / Decimal::from(count))
    }
}

/// Keeps the first-encountered row per `customer_id`.
fn dedup_customers(records: &[OrderRecord]) -> Vec<&OrderRecord> {
    let mut seen: HashSet<&str> = HashSet::new();
    records
        .iter()
        .filter(|r| seen.insert(r.customer_id.as_str()))
        .collect()
}

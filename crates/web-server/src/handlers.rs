use crate::cache::{CacheKey, ViewKind};
use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use core_types::{DateRange, OrderRecord, RatingDirection, RecordSet};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// The date-range filter every view endpoint accepts. Missing boundaries
/// default to the edge of the available data; a reversed pair is swapped.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RangeQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryRatingsQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub k: Option<usize>,
    pub direction: Option<RatingDirection>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryVolumeQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub k: Option<usize>,
}

/// Resolves the requested range against the data span. `None` means the
/// request lies entirely outside the data, so every view must come back
/// empty.
fn effective_range(record_set: &RecordSet, query: RangeQuery) -> Option<DateRange> {
    let span = record_set.time_span()?;
    let requested = match (query.start, query.end) {
        (None, None) => None,
        (start, end) => Some(DateRange::new(
            start.unwrap_or(span.start),
            end.unwrap_or(span.end),
        )),
    };
    record_set.effective_range(requested)
}

/// Runs one derived-view computation through the memoization cache.
///
/// The cache key is the effective range plus whatever parameters the caller
/// adds via `decorate`, so two requests that clamp to the same window share
/// one computation.
fn compute_view<D, F>(
    state: &AppState,
    query: RangeQuery,
    view: ViewKind,
    decorate: D,
    compute: F,
) -> Value
where
    D: FnOnce(CacheKey) -> CacheKey,
    F: FnOnce(&[OrderRecord]) -> Value,
{
    let record_set = state.record_set.read().expect("record set lock poisoned");
    let range = effective_range(&record_set, query);
    let key = decorate(CacheKey::new(view, range));
    state.cache.get_or_compute(key, || {
        let rows = range.map(|r| record_set.slice(r)).unwrap_or(&[]);
        compute(rows)
    })
}

/// # GET /api/summary
/// The scalar header block: distinct orders, total revenue, mean rating.
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RangeQuery>,
) -> Json<Value> {
    Json(compute_view(&state, query, ViewKind::Summary, |k| k, |rows| {
        json!(state.engine.summary(rows))
    }))
}

/// # GET /api/views/daily-orders
pub async fn get_daily_orders(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RangeQuery>,
) -> Json<Value> {
    Json(compute_view(&state, query, ViewKind::DailyOrders, |k| k, |rows| {
        json!(state.engine.daily_orders(rows))
    }))
}

/// # GET /api/views/category-ratings?k=5&direction=best|worst
pub async fn get_category_ratings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CategoryRatingsQuery>,
) -> Json<Value> {
    let range = RangeQuery {
        start: query.start,
        end: query.end,
    };
    let k = query.k.unwrap_or(state.settings.views.rating_extremes_k);
    let direction = query.direction.unwrap_or(RatingDirection::Best);
    Json(compute_view(
        &state,
        range,
        ViewKind::CategoryRatings,
        |key| key.with_k(k).with_direction(direction),
        |rows| json!(state.engine.category_rating_extremes(rows, k, direction)),
    ))
}

/// # GET /api/views/category-volume?k=10
pub async fn get_category_volume(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CategoryVolumeQuery>,
) -> Json<Value> {
    let range = RangeQuery {
        start: query.start,
        end: query.end,
    };
    let k = query.k.unwrap_or(state.settings.views.category_volume_k);
    Json(compute_view(
        &state,
        range,
        ViewKind::CategoryVolume,
        |key| key.with_k(k),
        |rows| json!(state.engine.top_categories_by_volume(rows, k)),
    ))
}

/// # GET /api/views/state-ratings
pub async fn get_state_ratings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RangeQuery>,
) -> Json<Value> {
    Json(compute_view(&state, query, ViewKind::StateRatings, |k| k, |rows| {
        json!(state.engine.state_mean_rating(rows))
    }))
}

/// # GET /api/views/state-revenue
pub async fn get_state_revenue(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RangeQuery>,
) -> Json<Value> {
    Json(compute_view(&state, query, ViewKind::StateRevenue, |k| k, |rows| {
        json!(state.engine.state_revenue(rows))
    }))
}

/// # GET /api/views/payment-mix
pub async fn get_payment_mix(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RangeQuery>,
) -> Json<Value> {
    Json(compute_view(&state, query, ViewKind::PaymentMix, |k| k, |rows| {
        json!(state.engine.customer_payment_mix(rows))
    }))
}

/// # GET /api/views/customer-states
pub async fn get_customer_states(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RangeQuery>,
) -> Json<Value> {
    Json(compute_view(&state, query, ViewKind::CustomerStates, |k| k, |rows| {
        json!(state.engine.customer_state_distribution(rows))
    }))
}

/// # GET /api/views/customer-map
/// Per-state customer counts plus the boundary GeoJSON, ready for a
/// choropleth renderer. Only the counts depend on the filter; the boundary
/// document is static for the life of the process.
pub async fn get_customer_map(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RangeQuery>,
) -> Json<Value> {
    let counts = compute_view(&state, query, ViewKind::CustomerMap, |k| k, |rows| {
        let totals = state.engine.customer_totals_by_state(rows);
        for total in &totals {
            if !state.boundaries.contains(&total.region_code) {
                tracing::warn!(
                    region = %total.region_code,
                    "No boundary feature for region code; it will not render on the map."
                );
            }
        }
        json!(totals)
    });
    Json(json!({
        "counts": counts,
        "regions": state.boundaries.geojson(),
    }))
}

/// # POST /api/reload
/// Re-reads the sales export from disk, swaps it in, and invalidates every
/// memoized view.
pub async fn reload_dataset(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, AppError> {
    let fresh = dataset::load_csv(&state.settings.dataset.orders_path)?;
    let rows = fresh.len();
    *state.record_set.write().expect("record set lock poisoned") = fresh;
    state.cache.invalidate();
    Ok(Json(json!({ "rows": rows })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    fn record(day: u32) -> OrderRecord {
        OrderRecord {
            order_id: format!("o-{day}"),
            order_item_id: 1,
            order_purchase_timestamp: Utc.with_ymd_and_hms(2018, 3, day, 12, 0, 0).unwrap(),
            price: Decimal::ZERO,
            product_category: None,
            review_score: None,
            customer_id: format!("c-{day}"),
            customer_state: None,
            payment_type: None,
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2018, 3, day).unwrap()
    }

    #[test]
    fn missing_boundaries_default_to_the_data_span() {
        let set = RecordSet::new(vec![record(3), record(9)]);
        let query = RangeQuery {
            start: None,
            end: Some(date(5)),
        };
        assert_eq!(
            effective_range(&set, query),
            Some(DateRange::new(date(3), date(5)))
        );
    }

    #[test]
    fn reversed_boundaries_are_swapped_not_rejected() {
        let set = RecordSet::new(vec![record(3), record(9)]);
        let query = RangeQuery {
            start: Some(date(8)),
            end: Some(date(4)),
        };
        assert_eq!(
            effective_range(&set, query),
            Some(DateRange::new(date(4), date(8)))
        );
    }

    #[test]
    fn range_outside_the_data_resolves_to_none() {
        let set = RecordSet::new(vec![record(3), record(9)]);
        let query = RangeQuery {
            start: Some(date(20)),
            end: Some(date(25)),
        };
        assert_eq!(effective_range(&set, query), None);
    }
}

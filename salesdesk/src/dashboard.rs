//! Dashboard aggregator: sales, DSR, stock and region reads reduced into
//! summary metrics and chart series. Recomputed per request.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::entity::region;
use crate::gateway::{CountedTable, Gateway, GatewayResult, SaleRow, StockRow};

/// Regions shown on the sales-by-region chart.
pub const REGION_CHART_LIMIT: usize = 6;

pub const NO_STOCK_LABEL: &str = "No Stock";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardMetrics {
    pub total_sales: u64,
    pub total_revenue: f64,
    pub total_dsrs: u64,
    pub stock_in_hand: u64,
    pub total_stock: u64,
    pub approved_sales: u64,
    pub pending_sales: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    pub name: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionSales {
    /// Region code.
    pub name: String,
    pub sales: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub metrics: DashboardMetrics,
    pub stock_by_type: Vec<ChartPoint>,
    pub sales_by_region: Vec<RegionSales>,
}

fn or_empty<T: Default>(result: GatewayResult<T>, read: &'static str) -> T {
    result.unwrap_or_else(|e| {
        tracing::warn!(read, error = %e, "dashboard read failed");
        T::default()
    })
}

/// Issue the four dashboard reads concurrently and reduce them. A failed read
/// contributes nothing; the rest of the snapshot is still computed.
pub async fn snapshot(gateway: &dyn Gateway) -> DashboardSnapshot {
    let (sales, dsrs, stock, regions) = tokio::join!(
        gateway.list_sales(),
        gateway.count_rows(CountedTable::Dsrs),
        gateway.list_stock(),
        gateway.list_regions(),
    );

    let sales = or_empty(sales, "sales");
    let dsrs = or_empty(dsrs, "dsrs");
    let stock = or_empty(stock, "stock");
    let regions = or_empty(regions, "regions");

    DashboardSnapshot {
        metrics: summarize(&sales, dsrs, &stock),
        stock_by_type: stock_by_type(&stock),
        sales_by_region: region_sales(&regions, &sales),
    }
}

pub fn summarize(sales: &[SaleRow], total_dsrs: u64, stock: &[StockRow]) -> DashboardMetrics {
    let total_sales = sales.len() as u64;
    let approved_sales = sales.iter().filter(|s| s.admin_approved).count() as u64;

    DashboardMetrics {
        total_sales,
        total_revenue: sales.iter().map(|s| coerce_price(&s.sale_price)).sum(),
        total_dsrs,
        stock_in_hand: stock_in_hand(stock),
        total_stock: stock.len() as u64,
        approved_sales,
        pending_sales: total_sales - approved_sales,
    }
}

/// Numeric value of a sale price payload. Numbers pass through, numeric
/// strings parse (surrounding whitespace ignored, empty is zero), booleans
/// count as 1/0. Anything else, and any non-finite result, is zero.
pub fn coerce_price(value: &Value) -> f64 {
    let n = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                s.parse::<f64>().unwrap_or(0.0)
            }
        }
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Null | Value::Array(_) | Value::Object(_) => 0.0,
    };
    if n.is_finite() { n } else { 0.0 }
}

/// Stock rows whose status does not start with `sold`.
pub fn stock_in_hand(stock: &[StockRow]) -> u64 {
    stock.iter().filter(|s| !s.status.starts_with("sold")).count() as u64
}

/// Stock count per type, in the order each type first appears.
pub fn stock_by_type(stock: &[StockRow]) -> Vec<ChartPoint> {
    let mut points: Vec<ChartPoint> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for row in stock {
        match index.get(row.stock_type.as_str()) {
            Some(&i) => points[i].value += 1,
            None => {
                index.insert(&row.stock_type, points.len());
                points.push(ChartPoint {
                    name: row.stock_type.clone(),
                    value: 1,
                });
            }
        }
    }

    if points.is_empty() {
        points.push(ChartPoint {
            name: NO_STOCK_LABEL.to_string(),
            value: 0,
        });
    }
    points
}

/// Sales per region for the first [`REGION_CHART_LIMIT`] regions, in the
/// order given. Sales without a region are not counted.
pub fn region_sales(regions: &[region::Model], sales: &[SaleRow]) -> Vec<RegionSales> {
    let mut per_region: HashMap<uuid::Uuid, u64> = HashMap::new();
    for id in sales.iter().filter_map(|s| s.region_id) {
        *per_region.entry(id).or_default() += 1;
    }

    regions
        .iter()
        .take(REGION_CHART_LIMIT)
        .map(|r| RegionSales {
            name: r.code.clone(),
            sales: per_region.get(&r.id).copied().unwrap_or(0),
        })
        .collect()
}

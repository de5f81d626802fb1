//! Report aggregation over the canonical table.
//!
//! One entry point, [`aggregate`], dispatches over the closed
//! [`ReportKind`] set. Every report is a pure read: group, aggregate, order,
//! and emit an ordered [`Summary`] whose row order *is* the report's
//! contract. Nothing here mutates the table or touches IO.
//!
//! Ordering discipline: groups are materialized in ascending key order and
//! every metric sort on top is stable, so metric ties always break by
//! ascending group key. Drill-down filters are exact matches applied before
//! grouping.

use std::collections::BTreeMap;

use crate::domain::{
    ReportKind, RowFilter, SalesRecord, Summary, SummaryRow, WEEKDAY_ORDER, weekday_name,
};
use crate::error::AppError;

pub mod format;

/// Number of rows kept by the "top" reports.
const TOP_LIMIT: usize = 10;

/// Rows kept on each side of the top/bottom states report.
const STATE_SPLIT: usize = 5;

/// Compute one report over the table, optionally restricted by an
/// exact-match row filter.
///
/// Reports that require at least one result row fail with an empty-result
/// error when the filtered set yields none; every other report simply
/// returns an empty summary.
pub fn aggregate(
    records: &[SalesRecord],
    kind: ReportKind,
    filter: Option<&RowFilter>,
) -> Result<Summary, AppError> {
    let rows: Vec<&SalesRecord> = match filter {
        Some(f) => records.iter().filter(|r| f.matches(r)).collect(),
        None => records.iter().collect(),
    };

    let summary = match kind {
        ReportKind::TopProducts => top_products(&rows),
        ReportKind::SalesByStore => sales_by_store(&rows),
        ReportKind::TopPromoStores => top_promo_stores(&rows),
        ReportKind::AvgSalesByWeekday => avg_sales_by_weekday(&rows),
        ReportKind::AvgSalesByWeek => avg_sales_by_week(&rows),
        ReportKind::AvgSalesByMonth => avg_sales_by_month(&rows),
        ReportKind::StoreYearlySales => store_yearly_sales(&rows),
        ReportKind::StateYearlyTransactions => state_yearly_transactions(&rows),
        ReportKind::StoreRankingByState => store_ranking_by_state(&rows),
        ReportKind::TopProductByState => top_product_by_state(&rows)?,
        ReportKind::SalesByCity => sales_by_city(&rows),
        ReportKind::SalesByFamily => sales_by_family(&rows),
        ReportKind::Top5Bottom5States => top5_bottom5_states(&rows),
        ReportKind::ParetoStoreConcentration => pareto_store_concentration(&rows),
        ReportKind::PromoVsNonpromoAvg => promo_vs_nonpromo_avg(&rows),
        ReportKind::YearlyGrowth => yearly_growth(&rows),
    };

    Ok(summary)
}

// ---------------------------------------------------------------------------
// Grouping helpers
// ---------------------------------------------------------------------------

/// Sum `metric` per group; groups come out in ascending key order.
///
/// Absent metric values contribute nothing; a group whose rows all lack the
/// metric still appears, with a 0 sum.
fn sum_by<K, F, M>(rows: &[&SalesRecord], key: F, metric: M) -> Vec<(K, f64)>
where
    K: Ord,
    F: Fn(&SalesRecord) -> K,
    M: Fn(&SalesRecord) -> Option<f64>,
{
    let mut groups: BTreeMap<K, f64> = BTreeMap::new();
    for r in rows {
        let entry = groups.entry(key(r)).or_insert(0.0);
        if let Some(v) = metric(r) {
            *entry += v;
        }
    }
    groups.into_iter().collect()
}

/// Mean of `sales` per group; groups come out in ascending key order.
fn mean_sales_by<K, F>(rows: &[&SalesRecord], key: F) -> Vec<(K, f64)>
where
    K: Ord,
    F: Fn(&SalesRecord) -> K,
{
    let mut groups: BTreeMap<K, (f64, usize)> = BTreeMap::new();
    for r in rows {
        let entry = groups.entry(key(r)).or_insert((0.0, 0));
        entry.0 += r.sales;
        entry.1 += 1;
    }
    groups
        .into_iter()
        .map(|(k, (sum, n))| (k, sum / n as f64))
        .collect()
}

/// Stable descending sort by metric; ties keep ascending key order.
fn sort_value_desc<K>(groups: &mut [(K, f64)]) {
    groups.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
}

/// Stable ascending sort by metric; ties keep their current order.
fn sort_value_asc<K>(groups: &mut [(K, f64)]) {
    groups.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
}

fn rows_from<K: ToString>(groups: Vec<(K, f64)>) -> Vec<SummaryRow> {
    groups
        .into_iter()
        .map(|(k, v)| SummaryRow::new(k.to_string(), v))
        .collect()
}

fn total_sales(r: &SalesRecord) -> Option<f64> {
    Some(r.sales)
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

fn top_products(rows: &[&SalesRecord]) -> Summary {
    let mut groups = sum_by(rows, |r| r.family.clone(), total_sales);
    sort_value_desc(&mut groups);
    groups.truncate(TOP_LIMIT);
    Summary::with_rows(ReportKind::TopProducts, rows_from(groups))
}

fn sales_by_store(rows: &[&SalesRecord]) -> Summary {
    let mut groups = sum_by(rows, |r| r.store_nbr, total_sales);
    sort_value_desc(&mut groups);
    Summary::with_rows(ReportKind::SalesByStore, rows_from(groups))
}

/// Top stores by sales on promoted rows only; the ten best are selected
/// descending, then re-sorted ascending so a horizontal bar chart reads
/// best-at-top. Ranks follow the ascending order.
fn top_promo_stores(rows: &[&SalesRecord]) -> Summary {
    let promo: Vec<&SalesRecord> = rows
        .iter()
        .filter(|r| r.onpromotion > 0)
        .copied()
        .collect();

    let mut groups = sum_by(&promo, |r| r.store_nbr, total_sales);
    sort_value_desc(&mut groups);
    groups.truncate(TOP_LIMIT);
    sort_value_asc(&mut groups);

    let rows = groups
        .into_iter()
        .enumerate()
        .map(|(i, (store, v))| SummaryRow::new(store.to_string(), v).with_rank(i + 1))
        .collect();
    Summary::with_rows(ReportKind::TopPromoStores, rows)
}

/// Always emits exactly seven rows, Monday through Sunday; a weekday with no
/// source rows keeps its slot with an absent value.
fn avg_sales_by_weekday(rows: &[&SalesRecord]) -> Summary {
    let means: BTreeMap<u32, f64> =
        mean_sales_by(rows, |r| r.weekday.num_days_from_monday())
            .into_iter()
            .collect();

    let rows = WEEKDAY_ORDER
        .iter()
        .map(|day| match means.get(&day.num_days_from_monday()) {
            Some(v) => SummaryRow::new(weekday_name(*day), *v),
            None => SummaryRow::missing(weekday_name(*day)),
        })
        .collect();
    Summary::with_rows(ReportKind::AvgSalesByWeekday, rows)
}

fn avg_sales_by_week(rows: &[&SalesRecord]) -> Summary {
    let groups = mean_sales_by(rows, |r| r.week);
    Summary::with_rows(ReportKind::AvgSalesByWeek, rows_from(groups))
}

fn avg_sales_by_month(rows: &[&SalesRecord]) -> Summary {
    let groups = mean_sales_by(rows, |r| r.month);
    Summary::with_rows(ReportKind::AvgSalesByMonth, rows_from(groups))
}

fn store_yearly_sales(rows: &[&SalesRecord]) -> Summary {
    let groups = sum_by(rows, |r| r.year, total_sales);
    Summary::with_rows(ReportKind::StoreYearlySales, rows_from(groups))
}

fn state_yearly_transactions(rows: &[&SalesRecord]) -> Summary {
    let groups = sum_by(rows, |r| r.year, |r| r.transactions.map(|t| t as f64));
    Summary::with_rows(ReportKind::StateYearlyTransactions, rows_from(groups))
}

fn store_ranking_by_state(rows: &[&SalesRecord]) -> Summary {
    let mut groups = sum_by(rows, |r| r.store_nbr, total_sales);
    sort_value_desc(&mut groups);

    let rows = groups
        .into_iter()
        .enumerate()
        .map(|(i, (store, v))| SummaryRow::new(store.to_string(), v).with_rank(i + 1))
        .collect();
    Summary::with_rows(ReportKind::StoreRankingByState, rows)
}

fn top_product_by_state(rows: &[&SalesRecord]) -> Result<Summary, AppError> {
    let mut groups = sum_by(rows, |r| r.family.clone(), total_sales);
    sort_value_desc(&mut groups);

    let (family, v) = groups.into_iter().next().ok_or_else(|| {
        AppError::empty_result("No rows matched the filter; cannot pick a top product.")
    })?;
    Ok(Summary::with_rows(
        ReportKind::TopProductByState,
        vec![SummaryRow::new(family, v)],
    ))
}

fn sales_by_city(rows: &[&SalesRecord]) -> Summary {
    let groups = sum_by(rows, |r| r.city.clone(), total_sales);
    Summary::with_rows(ReportKind::SalesByCity, rows_from(groups))
}

fn sales_by_family(rows: &[&SalesRecord]) -> Summary {
    let groups = sum_by(rows, |r| r.family.clone(), total_sales);
    Summary::with_rows(ReportKind::SalesByFamily, rows_from(groups))
}

/// Head-5 and tail-5 of the descending state ordering. With fewer than ten
/// states the two slices overlap, exactly as head/tail slicing behaves;
/// ranks are positions in the full ordering either way.
fn top5_bottom5_states(rows: &[&SalesRecord]) -> Summary {
    let mut groups = sum_by(rows, |r| r.state.clone(), total_sales);
    sort_value_desc(&mut groups);

    let ranked: Vec<SummaryRow> = groups
        .into_iter()
        .enumerate()
        .map(|(i, (state, v))| SummaryRow::new(state, v).with_rank(i + 1))
        .collect();

    let head = ranked.iter().take(STATE_SPLIT).cloned();
    let tail_start = ranked.len().saturating_sub(STATE_SPLIT);
    let tail = ranked.iter().skip(tail_start).cloned();

    Summary::with_rows(ReportKind::Top5Bottom5States, head.chain(tail).collect())
}

/// Stores descending by sales with a running share of the grand total.
/// The grand total covers exactly the ranked store set; a zero total yields
/// an empty summary instead of dividing by zero.
fn pareto_store_concentration(rows: &[&SalesRecord]) -> Summary {
    let mut groups = sum_by(rows, |r| r.store_nbr, total_sales);
    sort_value_desc(&mut groups);

    let grand_total: f64 = groups.iter().map(|(_, v)| v).sum();
    if grand_total == 0.0 {
        return Summary::new(ReportKind::ParetoStoreConcentration);
    }

    let mut cumulative = 0.0;
    let rows = groups
        .into_iter()
        .enumerate()
        .map(|(i, (store, v))| {
            cumulative += v;
            SummaryRow::new(store.to_string(), v)
                .with_rank(i + 1)
                .with_derived(cumulative / grand_total * 100.0)
        })
        .collect();
    Summary::with_rows(ReportKind::ParetoStoreConcentration, rows)
}

/// Mean sales for promoted vs non-promoted rows, promo group first. A side
/// with no rows is omitted rather than reported as zero.
fn promo_vs_nonpromo_avg(rows: &[&SalesRecord]) -> Summary {
    let mut promo = (0.0, 0usize);
    let mut plain = (0.0, 0usize);
    for r in rows {
        let side = if r.onpromotion > 0 { &mut promo } else { &mut plain };
        side.0 += r.sales;
        side.1 += 1;
    }

    let mut out = Vec::new();
    if promo.1 > 0 {
        out.push(SummaryRow::new("promo", promo.0 / promo.1 as f64));
    }
    if plain.1 > 0 {
        out.push(SummaryRow::new("non-promo", plain.0 / plain.1 as f64));
    }
    Summary::with_rows(ReportKind::PromoVsNonpromoAvg, out)
}

/// Total sales per year with year-over-year growth. The first year's growth
/// is absent, not zero; growth against a zero prior year is likewise absent.
fn yearly_growth(rows: &[&SalesRecord]) -> Summary {
    let groups = sum_by(rows, |r| r.year, total_sales);

    let mut prev: Option<f64> = None;
    let rows = groups
        .into_iter()
        .map(|(year, v)| {
            let mut row = SummaryRow::new(year.to_string(), v);
            if let Some(p) = prev {
                if p != 0.0 {
                    row = row.with_derived((v - p) / p * 100.0);
                }
            }
            prev = Some(v);
            row
        })
        .collect();
    Summary::with_rows(ReportKind::YearlyGrowth, rows)
}

//! Shared domain types.
//!
//! These types are intentionally lightweight and serializable so they can be:
//!
//! - held in memory as the session's canonical table
//! - handed to the terminal formatter as report summaries
//! - exported to CSV/JSON for downstream tooling

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Weekdays in fixed calendar order, Monday through Sunday.
///
/// Weekday-keyed reports emit exactly these seven rows in this order,
/// regardless of which weekdays actually occur in the data.
pub const WEEKDAY_ORDER: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Full English weekday name (`chrono`'s `Display` abbreviates).
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// One row of the canonical sales table.
///
/// Calendar attributes (`year`, `month`, `week`, `weekday`) are derived from
/// `date` exactly once, at normalization time; reports never re-derive them.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRecord {
    pub date: NaiveDate,
    pub store_nbr: u32,
    pub family: String,
    pub sales: f64,
    /// Count of promoted items on the row; absent inputs coerce to 0.
    pub onpromotion: u32,
    pub state: String,
    pub city: String,
    /// Transaction count; genuinely absent for some rows in the raw data.
    pub transactions: Option<u64>,

    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u32,
    /// ISO week number, 1-53.
    pub week: u32,
    pub weekday: Weekday,
}

impl SalesRecord {
    /// Build a record from its raw fields, deriving the calendar attributes.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        date: NaiveDate,
        store_nbr: u32,
        family: String,
        sales: f64,
        onpromotion: u32,
        state: String,
        city: String,
        transactions: Option<u64>,
    ) -> Self {
        Self {
            date,
            store_nbr,
            family,
            sales,
            onpromotion,
            state,
            city,
            transactions,
            year: date.year(),
            month: date.month(),
            week: date.iso_week().week(),
            weekday: date.weekday(),
        }
    }
}

/// Exact-match row predicate supplied by the caller of a drill-down report.
///
/// Matching is on the raw identifier: store numbers compare as integers,
/// state names as case-sensitive full strings. No partial matching.
#[derive(Debug, Clone, PartialEq)]
pub enum RowFilter {
    Store(u32),
    State(String),
}

impl RowFilter {
    pub fn matches(&self, record: &SalesRecord) -> bool {
        match self {
            RowFilter::Store(nbr) => record.store_nbr == *nbr,
            RowFilter::State(state) => record.state == *state,
        }
    }
}

/// Dataset-level figures shown as overview KPIs.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetStats {
    pub rows: usize,
    pub stores: usize,
    pub families: usize,
    pub states: usize,
    pub years: usize,
    /// First month covered by the data, `YYYY-MM`.
    pub first_month: String,
    /// Last month covered by the data, `YYYY-MM`.
    pub last_month: String,
}

/// The closed set of report kinds the aggregator can compute.
///
/// Each variant carries its grouping key, metric, and ordering rule via the
/// metadata methods below; `aggregate` dispatches on the variant. Adding a
/// report means adding a variant here and an arm there, nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    TopProducts,
    SalesByStore,
    TopPromoStores,
    AvgSalesByWeekday,
    AvgSalesByWeek,
    AvgSalesByMonth,
    StoreYearlySales,
    StateYearlyTransactions,
    StoreRankingByState,
    TopProductByState,
    SalesByCity,
    SalesByFamily,
    Top5Bottom5States,
    ParetoStoreConcentration,
    PromoVsNonpromoAvg,
    YearlyGrowth,
}

impl ReportKind {
    pub const ALL: [ReportKind; 16] = [
        ReportKind::TopProducts,
        ReportKind::SalesByStore,
        ReportKind::TopPromoStores,
        ReportKind::AvgSalesByWeekday,
        ReportKind::AvgSalesByWeek,
        ReportKind::AvgSalesByMonth,
        ReportKind::StoreYearlySales,
        ReportKind::StateYearlyTransactions,
        ReportKind::StoreRankingByState,
        ReportKind::TopProductByState,
        ReportKind::SalesByCity,
        ReportKind::SalesByFamily,
        ReportKind::Top5Bottom5States,
        ReportKind::ParetoStoreConcentration,
        ReportKind::PromoVsNonpromoAvg,
        ReportKind::YearlyGrowth,
    ];

    /// Stable machine name, used on the CLI and in export headers.
    pub fn name(self) -> &'static str {
        match self {
            ReportKind::TopProducts => "top_products",
            ReportKind::SalesByStore => "sales_by_store",
            ReportKind::TopPromoStores => "top_promo_stores",
            ReportKind::AvgSalesByWeekday => "avg_sales_by_weekday",
            ReportKind::AvgSalesByWeek => "avg_sales_by_week",
            ReportKind::AvgSalesByMonth => "avg_sales_by_month",
            ReportKind::StoreYearlySales => "store_yearly_sales",
            ReportKind::StateYearlyTransactions => "state_yearly_transactions",
            ReportKind::StoreRankingByState => "store_ranking_by_state",
            ReportKind::TopProductByState => "top_product_by_state",
            ReportKind::SalesByCity => "sales_by_city",
            ReportKind::SalesByFamily => "sales_by_family",
            ReportKind::Top5Bottom5States => "top5_bottom5_states",
            ReportKind::ParetoStoreConcentration => "pareto_store_concentration",
            ReportKind::PromoVsNonpromoAvg => "promo_vs_nonpromo_avg",
            ReportKind::YearlyGrowth => "yearly_growth",
        }
    }

    /// Resolve a user-supplied report name.
    ///
    /// Accepts any casing and `-` for `_`; anything else is an unknown-report
    /// error rather than a silent fallback.
    pub fn from_name(name: &str) -> Result<Self, AppError> {
        let wanted = name.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| AppError::unknown_report(name))
    }

    /// Human-readable title for terminal output.
    pub fn title(self) -> &'static str {
        match self {
            ReportKind::TopProducts => "Top 10 product families by sales",
            ReportKind::SalesByStore => "Sales by store",
            ReportKind::TopPromoStores => "Top 10 stores by promoted sales",
            ReportKind::AvgSalesByWeekday => "Average sales by weekday",
            ReportKind::AvgSalesByWeek => "Average sales by week of year",
            ReportKind::AvgSalesByMonth => "Average sales by month",
            ReportKind::StoreYearlySales => "Yearly sales",
            ReportKind::StateYearlyTransactions => "Yearly transactions",
            ReportKind::StoreRankingByState => "Store ranking by sales",
            ReportKind::TopProductByState => "Best-selling product family",
            ReportKind::SalesByCity => "Sales by city",
            ReportKind::SalesByFamily => "Sales by product family",
            ReportKind::Top5Bottom5States => "Top and bottom states by sales",
            ReportKind::ParetoStoreConcentration => "Store sales concentration (80/20)",
            ReportKind::PromoVsNonpromoAvg => "Average sales with and without promotion",
            ReportKind::YearlyGrowth => "Yearly sales and growth",
        }
    }

    /// Name of the grouping-key column, for table headers and exports.
    pub fn key_column(self) -> &'static str {
        match self {
            ReportKind::TopProducts
            | ReportKind::TopProductByState
            | ReportKind::SalesByFamily => "family",
            ReportKind::SalesByStore
            | ReportKind::TopPromoStores
            | ReportKind::StoreRankingByState
            | ReportKind::ParetoStoreConcentration => "store_nbr",
            ReportKind::AvgSalesByWeekday => "day_of_week",
            ReportKind::AvgSalesByWeek => "week",
            ReportKind::AvgSalesByMonth => "month",
            ReportKind::StoreYearlySales
            | ReportKind::StateYearlyTransactions
            | ReportKind::YearlyGrowth => "year",
            ReportKind::SalesByCity => "city",
            ReportKind::Top5Bottom5States => "state",
            ReportKind::PromoVsNonpromoAvg => "promo",
        }
    }

    /// Name of the metric column, for table headers and exports.
    pub fn value_column(self) -> &'static str {
        match self {
            ReportKind::AvgSalesByWeekday
            | ReportKind::AvgSalesByWeek
            | ReportKind::AvgSalesByMonth
            | ReportKind::PromoVsNonpromoAvg => "avg_sales",
            ReportKind::StateYearlyTransactions => "total_transactions",
            _ => "total_sales",
        }
    }

    /// Name of the secondary derived column, where the report has one.
    pub fn derived_column(self) -> Option<&'static str> {
        match self {
            ReportKind::ParetoStoreConcentration => Some("cumulative_pct"),
            ReportKind::YearlyGrowth => Some("growth_pct"),
            _ => None,
        }
    }

    /// One-line description for the report catalog.
    pub fn description(self) -> &'static str {
        match self {
            ReportKind::TopProducts => "ten best-selling product families, descending",
            ReportKind::SalesByStore => "total sales per store, descending",
            ReportKind::TopPromoStores => {
                "ten best stores by sales on promoted rows, ascending for chart order"
            }
            ReportKind::AvgSalesByWeekday => "mean sales per weekday, Monday through Sunday",
            ReportKind::AvgSalesByWeek => "mean sales per ISO week number, ascending",
            ReportKind::AvgSalesByMonth => "mean sales per calendar month, ascending",
            ReportKind::StoreYearlySales => "total sales per year; combine with --store",
            ReportKind::StateYearlyTransactions => {
                "total transactions per year; combine with --state"
            }
            ReportKind::StoreRankingByState => {
                "stores ranked 1..N by total sales; combine with --state"
            }
            ReportKind::TopProductByState => {
                "single best-selling product family; combine with --state"
            }
            ReportKind::SalesByCity => "total sales per city",
            ReportKind::SalesByFamily => "total sales per product family",
            ReportKind::Top5Bottom5States => "five best and five worst states by total sales",
            ReportKind::ParetoStoreConcentration => {
                "cumulative share of sales across stores, best first"
            }
            ReportKind::PromoVsNonpromoAvg => "mean sales for promoted vs non-promoted rows",
            ReportKind::YearlyGrowth => "total sales per year with year-over-year growth",
        }
    }
}

/// One row of a report summary.
///
/// Row order within a [`Summary`] is the report's ordering contract; a
/// renderer must display rows in the order given, never re-sort.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    /// Group label: store number, family, state, weekday name, ...
    pub label: String,
    /// Position assigned by the report's ordering rule, where it defines one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<usize>,
    /// Primary metric. Absent when the group has no contributing rows.
    pub value: Option<f64>,
    /// Secondary metric (cumulative share, growth percentage). Absent where
    /// the report defines none or the value is undefined.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub derived: Option<f64>,
}

impl SummaryRow {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            rank: None,
            value: Some(value),
            derived: None,
        }
    }

    /// A row whose group has no contributing source rows.
    pub fn missing(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            rank: None,
            value: None,
            derived: None,
        }
    }

    pub fn with_rank(mut self, rank: usize) -> Self {
        self.rank = Some(rank);
        self
    }

    pub fn with_derived(mut self, derived: f64) -> Self {
        self.derived = Some(derived);
        self
    }
}

/// The named result of one aggregation, consumed by rendering or export.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub report: ReportKind,
    pub rows: Vec<SummaryRow>,
}

impl Summary {
    pub fn new(report: ReportKind) -> Self {
        Self {
            report,
            rows: Vec::new(),
        }
    }

    pub fn with_rows(report: ReportKind, rows: Vec<SummaryRow>) -> Self {
        Self { report, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn calendar_fields_derive_from_date() {
        // 2023-01-02 is a Monday in ISO week 1.
        let date = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let record = SalesRecord::new(
            date,
            14,
            "GROCERY I".to_string(),
            10.0,
            0,
            "Pichincha".to_string(),
            "Quito".to_string(),
            None,
        );
        assert_eq!(record.year, 2023);
        assert_eq!(record.month, 1);
        assert_eq!(record.week, 1);
        assert_eq!(record.weekday, Weekday::Mon);
    }

    #[test]
    fn iso_week_of_early_january_belongs_to_prior_iso_year() {
        // 2023-01-01 is a Sunday, still ISO week 52 of 2022.
        let date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let record = SalesRecord::new(
            date,
            1,
            "A".to_string(),
            1.0,
            0,
            "X".to_string(),
            "C".to_string(),
            None,
        );
        assert_eq!(record.week, 52);
        assert_eq!(record.weekday, Weekday::Sun);
    }

    #[test]
    fn from_name_round_trips_every_kind() {
        for kind in ReportKind::ALL {
            assert_eq!(ReportKind::from_name(kind.name()).unwrap(), kind);
        }
    }

    #[test]
    fn from_name_accepts_dashes_and_case() {
        assert_eq!(
            ReportKind::from_name("Top-Products").unwrap(),
            ReportKind::TopProducts
        );
    }

    #[test]
    fn from_name_rejects_unknown() {
        let err = ReportKind::from_name("nonexistent").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownReport);
    }

    #[test]
    fn filters_match_exactly() {
        let record = SalesRecord::new(
            NaiveDate::from_ymd_opt(2023, 5, 1).unwrap(),
            14,
            "DAIRY".to_string(),
            5.0,
            1,
            "Guayas".to_string(),
            "Guayaquil".to_string(),
            Some(100),
        );
        assert!(RowFilter::Store(14).matches(&record));
        assert!(!RowFilter::Store(15).matches(&record));
        assert!(RowFilter::State("Guayas".to_string()).matches(&record));
        // Case-sensitive, no partial match.
        assert!(!RowFilter::State("guayas".to_string()).matches(&record));
        assert!(!RowFilter::State("Guay".to_string()).matches(&record));
    }

    #[test]
    fn weekday_order_starts_monday_ends_sunday() {
        assert_eq!(weekday_name(WEEKDAY_ORDER[0]), "Monday");
        assert_eq!(weekday_name(WEEKDAY_ORDER[6]), "Sunday");
    }
}

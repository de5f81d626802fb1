//! Shared session and view pipeline used by every subcommand.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! fetch sources -> normalize -> aggregate per view
//!
//! The CLI front-end then focuses on presentation (printing vs exporting).

use crate::data::SourceProvider;
use crate::domain::{ReportKind, RowFilter, Summary};
use crate::error::AppError;
use crate::io::ingest::{Dataset, normalize};
use crate::report::aggregate;

/// Session-scoped handle on the canonical table.
///
/// The dataset is built once when the session opens and is read-only from
/// then on; every view below is a pure read. Refreshing the data is an
/// explicit [`Session::reload`], never an implicit cache.
pub struct Session {
    dataset: Dataset,
}

impl Session {
    /// Fetch all sources from the provider and normalize them.
    pub fn open(provider: &dyn SourceProvider) -> Result<Self, AppError> {
        let sources = provider.fetch()?;
        let dataset = normalize(&sources)?;
        Ok(Self { dataset })
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Rebuild the canonical table from the provider.
    ///
    /// On failure the existing dataset is left untouched.
    pub fn reload(&mut self, provider: &dyn SourceProvider) -> Result<(), AppError> {
        let sources = provider.fetch()?;
        self.dataset = normalize(&sources)?;
        Ok(())
    }
}

/// The global overview: six reports over the whole table.
pub struct OverviewView {
    pub top_products: Summary,
    pub sales_by_store: Summary,
    pub top_promo_stores: Summary,
    pub weekday: Summary,
    pub weekly: Summary,
    pub monthly: Summary,
}

pub fn overview(dataset: &Dataset) -> Result<OverviewView, AppError> {
    let records = dataset.records();
    Ok(OverviewView {
        top_products: aggregate(records, ReportKind::TopProducts, None)?,
        sales_by_store: aggregate(records, ReportKind::SalesByStore, None)?,
        top_promo_stores: aggregate(records, ReportKind::TopPromoStores, None)?,
        weekday: aggregate(records, ReportKind::AvgSalesByWeekday, None)?,
        weekly: aggregate(records, ReportKind::AvgSalesByWeek, None)?,
        monthly: aggregate(records, ReportKind::AvgSalesByMonth, None)?,
    })
}

/// One store's drill-down: its record counts and yearly sales.
pub struct StoreView {
    pub store_nbr: u32,
    /// Rows for this store in the canonical table.
    pub records: usize,
    /// Rows for this store with at least one promoted item.
    pub promo_records: usize,
    pub yearly_sales: Summary,
}

pub fn store_view(dataset: &Dataset, store_nbr: u32) -> Result<StoreView, AppError> {
    let filter = RowFilter::Store(store_nbr);
    let records = dataset
        .records()
        .iter()
        .filter(|r| filter.matches(r))
        .count();
    let promo_records = dataset
        .records()
        .iter()
        .filter(|r| filter.matches(r) && r.onpromotion > 0)
        .count();

    Ok(StoreView {
        store_nbr,
        records,
        promo_records,
        yearly_sales: aggregate(dataset.records(), ReportKind::StoreYearlySales, Some(&filter))?,
    })
}

/// One state's drill-down.
#[derive(Debug)]
pub struct StateView {
    pub state: String,
    pub yearly_transactions: Summary,
    pub store_ranking: Summary,
    pub top_product: Summary,
    pub sales_by_family: Summary,
}

pub fn state_view(dataset: &Dataset, state: &str) -> Result<StateView, AppError> {
    let filter = RowFilter::State(state.to_string());
    let records = dataset.records();
    Ok(StateView {
        state: state.to_string(),
        yearly_transactions: aggregate(
            records,
            ReportKind::StateYearlyTransactions,
            Some(&filter),
        )?,
        store_ranking: aggregate(records, ReportKind::StoreRankingByState, Some(&filter))?,
        top_product: aggregate(records, ReportKind::TopProductByState, Some(&filter))?,
        sales_by_family: aggregate(records, ReportKind::SalesByFamily, Some(&filter))?,
    })
}

/// The executive view: concentration, promotions, growth.
pub struct InsightsView {
    pub sales_by_city: Summary,
    pub top_bottom_states: Summary,
    pub pareto: Summary,
    pub promo_split: Summary,
    pub yearly_growth: Summary,
}

pub fn insights(dataset: &Dataset) -> Result<InsightsView, AppError> {
    let records = dataset.records();
    Ok(InsightsView {
        sales_by_city: aggregate(records, ReportKind::SalesByCity, None)?,
        top_bottom_states: aggregate(records, ReportKind::Top5Bottom5States, None)?,
        pareto: aggregate(records, ReportKind::ParetoStoreConcentration, None)?,
        promo_split: aggregate(records, ReportKind::PromoVsNonpromoAvg, None)?,
        yearly_growth: aggregate(records, ReportKind::YearlyGrowth, None)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RawTable;
    use crate::error::ErrorKind;

    struct FixedTables(Vec<RawTable>);

    impl SourceProvider for FixedTables {
        fn describe(&self) -> String {
            "fixed tables".to_string()
        }

        fn fetch(&self) -> Result<Vec<RawTable>, AppError> {
            Ok(self.0.clone())
        }
    }

    fn sample_provider() -> FixedTables {
        let headers = [
            "date",
            "store_nbr",
            "family",
            "sales",
            "onpromotion",
            "state",
            "city",
            "transactions",
        ];
        let rows: Vec<Vec<String>> = vec![
            vec!["2022-05-02", "1", "BREAD", "10", "0", "Azuay", "Cuenca", "50"],
            vec!["2022-05-03", "1", "DAIRY", "30", "2", "Azuay", "Cuenca", "60"],
            vec!["2023-05-02", "2", "BREAD", "20", "0", "Guayas", "Guayaquil", ""],
        ]
        .into_iter()
        .map(|row| row.into_iter().map(str::to_string).collect())
        .collect();

        FixedTables(vec![RawTable {
            name: "sample.csv".to_string(),
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows,
            bad_records: Vec::new(),
        }])
    }

    #[test]
    fn session_opens_and_reloads() {
        let provider = sample_provider();
        let mut session = Session::open(&provider).unwrap();
        assert_eq!(session.dataset().records().len(), 3);

        session.reload(&provider).unwrap();
        assert_eq!(session.dataset().records().len(), 3);
    }

    #[test]
    fn overview_covers_all_six_reports() {
        let session = Session::open(&sample_provider()).unwrap();
        let view = overview(session.dataset()).unwrap();
        assert_eq!(view.top_products.report, ReportKind::TopProducts);
        assert_eq!(view.weekday.len(), 7);
        assert!(!view.sales_by_store.is_empty());
        assert!(!view.top_promo_stores.is_empty());
        assert!(!view.weekly.is_empty());
        assert!(!view.monthly.is_empty());
    }

    #[test]
    fn store_view_counts_rows_and_promotions() {
        let session = Session::open(&sample_provider()).unwrap();
        let view = store_view(session.dataset(), 1).unwrap();
        assert_eq!(view.records, 2);
        assert_eq!(view.promo_records, 1);
        assert_eq!(view.yearly_sales.rows[0].value, Some(40.0));
    }

    #[test]
    fn state_view_bundles_the_four_reports() {
        let session = Session::open(&sample_provider()).unwrap();
        let view = state_view(session.dataset(), "Azuay").unwrap();
        assert_eq!(view.top_product.rows[0].label, "DAIRY");
        assert_eq!(view.store_ranking.len(), 1);
        assert_eq!(view.yearly_transactions.rows[0].value, Some(110.0));
        assert_eq!(view.sales_by_family.len(), 2);
    }

    #[test]
    fn state_view_for_unknown_state_surfaces_empty_result() {
        let session = Session::open(&sample_provider()).unwrap();
        let err = state_view(session.dataset(), "Nowhere").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyResult);
    }

    #[test]
    fn insights_cover_the_executive_reports() {
        let session = Session::open(&sample_provider()).unwrap();
        let view = insights(session.dataset()).unwrap();
        assert_eq!(view.sales_by_city.len(), 2);
        assert_eq!(view.yearly_growth.rows[0].derived, None);
        assert!(!view.pareto.is_empty());
        assert!(!view.promo_split.is_empty());
        assert!(!view.top_bottom_states.is_empty());
    }
}

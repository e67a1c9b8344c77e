//! End-to-end tests over the domain pipeline: CSV in, workspace, derived
//! views, editor sheet and CSV out.

mod common;

use approx::assert_relative_eq;
use common::*;
use indexdash::adapters::csv_adapter::CsvAdapter;
use indexdash::domain::config::DashboardConfig;
use indexdash::domain::error::DashboardError;
use indexdash::domain::index::{DEFAULT_SUMMARY_INDEX, default_returns_column, returns_columns};
use indexdash::domain::views::{correlation_view, price_view, summary_view};
use indexdash::domain::workspace::Workspace;
use indexdash::ports::table_port::{TableReader, TableWriter};

fn price_columns() -> Vec<String> {
    DashboardConfig::default().price_columns
}

mod upload_pipeline {
    use super::*;

    #[test]
    fn blank_index_header_is_named() {
        let ds = sample_dataset();
        assert_eq!(ds.table.headers()[0], "Unnamed: 0");
        assert_eq!(ds.table.len(), SAMPLE_ROWS);
    }

    #[test]
    fn years_and_span() {
        let ds = sample_dataset();
        assert_eq!(ds.years(), vec![2019, 2020]);
        assert_eq!(ds.date_span(), Some((date(2019, 1, 2), date(2020, 1, 6))));
    }

    #[test]
    fn returns_options_known_first() {
        let ds = sample_dataset();
        let columns: Vec<String> = returns_columns(&ds.table).into_iter().map(|o| o.column).collect();
        assert_eq!(
            columns,
            vec!["Nifty 50 Returns", "Dow Jones Index Returns", "DAX Returns"]
        );
    }

    #[test]
    fn workspace_holds_uploaded_dataset() {
        let ws = Workspace::new();
        assert!(matches!(ws.dataset(), Err(DashboardError::NoDataset)));
        ws.replace(sample_dataset());
        assert_eq!(ws.dataset().unwrap().name, "indices.csv");
    }
}

mod summary {
    use super::*;

    #[test]
    fn default_index_year_summary() {
        let ds = sample_dataset();
        let index = default_returns_column(&ds.table, DEFAULT_SUMMARY_INDEX).unwrap();
        let year = ds.years()[0];
        let view = summary_view(&ds, &index, year).unwrap();

        assert_eq!(view.title(), "Nifty 50 Returns (2019)");
        assert_eq!(view.describe.count, 4);
        assert_relative_eq!(view.describe.mean, 2.5);
        assert_relative_eq!(view.describe.min, -10.0);
        assert_relative_eq!(view.describe.median, 5.0);
        assert_relative_eq!(view.describe.max, 10.0);
        assert_eq!(view.split.positive, 2);
        assert_eq!(view.split.negative, 1);
        assert!(view.box_stats.is_some());
    }

    #[test]
    fn year_without_rows_is_empty_summary() {
        let ds = sample_dataset();
        let view = summary_view(&ds, "DAX Returns", 1999).unwrap();
        assert_eq!(view.describe.count, 0);
        assert!(view.box_stats.is_none());
        assert_eq!(view.split.total(), 0);
    }

    #[test]
    fn unknown_index_is_missing_column() {
        let ds = sample_dataset();
        let err = summary_view(&ds, "FTSE Returns", 2019).unwrap_err();
        assert!(matches!(err, DashboardError::MissingColumn { column } if column == "FTSE Returns"));
    }
}

mod correlation {
    use super::*;

    #[test]
    fn matrix_is_symmetric_with_unit_diagonal() {
        let ds = sample_dataset();
        let m = correlation_view(&ds, &["Nifty 50 Returns", "DAX Returns", "Dow Jones Index Returns"]).unwrap();
        assert_eq!(m.labels.len(), 3);
        for i in 0..3 {
            assert_relative_eq!(m.values[i][i], 1.0);
            for j in 0..3 {
                assert_relative_eq!(m.values[i][j], m.values[j][i]);
                assert!((-1.0..=1.0).contains(&m.values[i][j]));
            }
        }
    }

    #[test]
    fn similar_series_correlate_strongly() {
        let ds = sample_dataset();
        let m = correlation_view(&ds, &["DAX Returns", "Dow Jones Index Returns"]).unwrap();
        // Identical in 2019, close in 2020.
        assert!(m.get("DAX Returns", "Dow Jones Index Returns").unwrap() > 0.9);
    }

    #[test]
    fn single_index_is_rejected() {
        let ds = sample_dataset();
        let err = correlation_view(&ds, &["DAX Returns"]).unwrap_err();
        assert!(matches!(err, DashboardError::InvalidInput { .. }));
    }
}

mod prices {
    use super::*;

    #[test]
    fn range_selects_prices_and_returns() {
        let ds = sample_dataset();
        let view = price_view(&ds, &price_columns(), date(2019, 1, 2), date(2019, 1, 4)).unwrap();

        assert_eq!(view.prices.len(), 3);
        assert_eq!(
            view.returns.headers(),
            &[
                "Date",
                "Nifty 50 Returns",
                "Dow Jones Index Returns",
                "Nasdaq Returns",
                "Hang Seng Returns"
            ]
        );
        let nifty = view.returns.numeric_column("Nifty 50 Returns").unwrap();
        assert!(nifty[0].is_nan());
        assert_relative_eq!(nifty[1], 25.0, epsilon = 1e-9);
        assert_relative_eq!(nifty[2], -20.0, epsilon = 1e-9);

        let hang_seng = view.returns.numeric_column("Hang Seng Returns").unwrap();
        assert_relative_eq!(hang_seng[1], 0.0, epsilon = 1e-9);
        assert_relative_eq!(hang_seng[2], 10.0, epsilon = 1e-9);
    }

    #[test]
    fn reversed_range_is_empty() {
        let ds = sample_dataset();
        let view = price_view(&ds, &price_columns(), date(2020, 1, 1), date(2019, 1, 1)).unwrap();
        assert!(view.prices.is_empty());
        assert!(view.returns.is_empty());
    }

    #[test]
    fn edit_recomputes_returns_through_workspace() {
        let ws = Workspace::new();
        ws.replace(sample_dataset());
        let ds = ws.dataset().unwrap();
        assert!(ws.set_prices(&ds, price_view(&ds, &price_columns(), date(2019, 1, 2), date(2019, 1, 4)).unwrap()));

        let returns = ws
            .edit_prices(|view| {
                view.edit_price(1, 1, "150")?;
                Ok(view.returns.clone())
            })
            .unwrap();
        let nifty = returns.numeric_column("Nifty 50 Returns").unwrap();
        assert_relative_eq!(nifty[1], 50.0, epsilon = 1e-9);
        assert_relative_eq!(nifty[2], (100.0 / 150.0 - 1.0) * 100.0, epsilon = 1e-9);

        // The stored view keeps the edit.
        let stored = ws.prices().unwrap();
        assert_eq!(stored.prices.cell(1, 1).and_then(|c| c.as_f64()), Some(150.0));
    }

    #[test]
    fn upload_clears_price_view() {
        let ws = Workspace::new();
        ws.replace(sample_dataset());
        let ds = ws.dataset().unwrap();
        assert!(ws.set_prices(&ds, price_view(&ds, &price_columns(), date(2019, 1, 1), date(2019, 12, 31)).unwrap()));
        ws.replace(sample_dataset());
        assert!(ws.prices().is_none());
    }

    #[test]
    fn dataset_without_price_columns() {
        let table = CsvAdapter::new()
            .read_table(b"Date,Gold\n2020-01-01,1\n")
            .unwrap();
        let ds = indexdash::domain::dataset::Dataset::new("gold.csv", table);
        let err = price_view(&ds, &price_columns(), date(2020, 1, 1), date(2020, 1, 2)).unwrap_err();
        assert!(matches!(err, DashboardError::MissingColumn { column } if column == "Nifty 50 Adj Close"));
    }
}

mod editor {
    use super::*;

    #[test]
    fn sheet_drops_index_and_year() {
        let ws = Workspace::new();
        ws.replace(sample_dataset());
        let sheet = ws.sheet().unwrap();
        assert_eq!(sheet.headers()[0], "Date");
        assert!(!sheet.has_column("Year"));
        assert!(!sheet.has_column("Unnamed: 0"));
        assert_eq!(sheet.len(), SAMPLE_ROWS);
    }

    #[test]
    fn edits_survive_export() {
        let ws = Workspace::new();
        ws.replace(sample_dataset());
        ws.edit_sheet(|sheet| {
            sheet.add_column("Notes")?;
            let row = sheet.add_row();
            let notes = sheet.require_column("Notes")?;
            sheet.set_cell(row, notes, "holiday")?;
            sheet.rename_column("Date", "Day")
        })
        .unwrap();

        let adapter = CsvAdapter::new();
        let bytes = adapter.write_table(&ws.sheet().unwrap()).unwrap();
        let back = adapter.read_table(&bytes).unwrap();
        assert_eq!(back.headers()[0], "Day");
        assert_eq!(back.len(), SAMPLE_ROWS + 1);
        let notes = back.require_column("Notes").unwrap();
        assert_eq!(back.cell(SAMPLE_ROWS, notes).and_then(|c| c.as_text()), Some("holiday"));
    }

    #[test]
    fn sheet_edit_does_not_touch_dataset() {
        let ws = Workspace::new();
        ws.replace(sample_dataset());
        ws.edit_sheet(|sheet| sheet.delete_row(0).map(|_| ())).unwrap();
        assert_eq!(ws.sheet().unwrap().len(), SAMPLE_ROWS - 1);
        assert_eq!(ws.dataset().unwrap().table.len(), SAMPLE_ROWS);
    }
}

//! Command line interface of the dashboard binary.

use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use log::LevelFilter;

use sales_dashboard::data::aggregate::DEFAULT_TOP_N;

/// Data file opened when none is given.
pub const DEFAULT_DATA_FILE: &str = "Sales Transaction v.4a.csv";

/// sales-dashboard: interactive sales reporting.
///
/// Loads a CSV of transactions (columns Date, Price, Quantity, Country and
/// ProductName; dates as MM/DD/YYYY) and shows filterable metrics and charts.
#[derive(Debug, Parser, Clone)]
#[command(version, about)]
pub struct Args {
    /// CSV or JSON file with sales transactions.
    #[arg(long, env = "SALES_DASHBOARD_DATA", default_value = DEFAULT_DATA_FILE)]
    data: PathBuf,

    /// Page layout.
    #[arg(long, value_enum, default_value_t = Layout::Tabbed)]
    layout: Layout,

    /// How many products the "top products" chart shows.
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    top_n: usize,

    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG. See the env_logger crate for instructions.
    #[arg(long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,
}

impl Args {
    pub fn data(&self) -> &Path {
        &self.data
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }
}

/// The two page layouts. Both render the same report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Layout {
    /// One scrolling page; multi-select country and product filters.
    Classic,
    /// Tabs for metrics, charts and download; single-select filters plus
    /// price and quantity ranges.
    #[default]
    Tabbed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["sales-dashboard"]).unwrap();
        assert_eq!(args.layout(), Layout::Tabbed);
        assert_eq!(args.top_n(), 10);
        assert_eq!(args.log_level(), LevelFilter::Info);
    }

    #[test]
    fn explicit_values() {
        let args = Args::try_parse_from([
            "sales-dashboard",
            "--data",
            "q3.csv",
            "--layout",
            "classic",
            "--top-n",
            "5",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.data(), Path::new("q3.csv"));
        assert_eq!(args.layout(), Layout::Classic);
        assert_eq!(args.top_n(), 5);
        assert_eq!(args.log_level(), LevelFilter::Debug);
    }
}

//! Command implementations for the CPC regions CLI.
//!
//! Provides subcommands for listing catalog schemes and for weighted
//! aggregation of region data read from CSV files.

use clap::Subcommand;
use cpc_regions::CatalogScheme;

pub mod aggregate;
pub mod load;
pub mod names;

#[derive(Subcommand)]
pub enum Command {
    /// Print the ID and name table of a catalog scheme
    Names {
        /// census-divisions, climate-divisions, forecast-divisions, states or states-conus
        scheme: CatalogScheme,
    },

    /// Weighted average of fine-grained data into a coarser catalog scheme
    Aggregate {
        /// Headerless `id,value` CSV of data in the fine scheme
        #[arg(short = 'd', long)]
        data_csv: String,

        /// Headerless `id,value` CSV of weights in the fine scheme
        #[arg(short = 'w', long)]
        weights_csv: String,

        /// Fine scheme of the data and weights
        #[arg(long)]
        from: CatalogScheme,

        /// Coarse scheme of the result
        #[arg(long)]
        to: CatalogScheme,

        /// Value that marks missing data in the input files
        #[arg(short = 'm', long)]
        missing: Option<String>,

        /// Zero out Alaska and Hawaii before aggregating (states data only)
        #[arg(long)]
        conus: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Weighted average of all regions into one number
    Average {
        /// Headerless `id,value` CSV of data
        #[arg(short = 'd', long)]
        data_csv: String,

        /// Headerless `id,value` CSV of weights (omit for a plain mean)
        #[arg(short = 'w', long)]
        weights_csv: Option<String>,

        /// Catalog scheme of the data
        #[arg(long, conflicts_with = "reference")]
        scheme: Option<CatalogScheme>,

        /// Pipe-delimited `ID|Name` station reference file defining the scheme
        #[arg(short = 'r', long)]
        reference: Option<String>,

        /// Value that marks missing data in the input files
        #[arg(short = 'm', long)]
        missing: Option<String>,

        /// Average over the contiguous states only
        #[arg(long)]
        conus: bool,
    },
}

pub fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Names { scheme } => names::run_names(scheme),
        Command::Aggregate {
            data_csv,
            weights_csv,
            from,
            to,
            missing,
            conus,
            json,
        } => aggregate::run_aggregate(&aggregate::AggregateArgs {
            data_csv: &data_csv,
            weights_csv: &weights_csv,
            from,
            to,
            missing: missing.as_deref(),
            conus,
            json,
        }),
        Command::Average {
            data_csv,
            weights_csv,
            scheme,
            reference,
            missing,
            conus,
        } => aggregate::run_average(&aggregate::AverageArgs {
            data_csv: &data_csv,
            weights_csv: weights_csv.as_deref(),
            scheme,
            reference: reference.as_deref(),
            missing: missing.as_deref(),
            conus,
        }),
    }
}

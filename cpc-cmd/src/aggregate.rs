//! Weighted aggregation commands.

use cpc_regions::{catalog, CatalogScheme, RegionSet, Scheme};
use cpc_weights::weights::uniform_weights;
use cpc_weights::{weighted_average, weighted_average_conus, weighted_average_scalar, weighted_average_scalar_conus};
use log::info;
use std::sync::Arc;

use crate::load::load_region_csv;

pub struct AggregateArgs<'a> {
    pub data_csv: &'a str,
    pub weights_csv: &'a str,
    pub from: CatalogScheme,
    pub to: CatalogScheme,
    pub missing: Option<&'a str>,
    pub conus: bool,
    pub json: bool,
}

pub struct AverageArgs<'a> {
    pub data_csv: &'a str,
    pub weights_csv: Option<&'a str>,
    pub scheme: Option<CatalogScheme>,
    pub reference: Option<&'a str>,
    pub missing: Option<&'a str>,
    pub conus: bool,
}

/// Aggregate a fine catalog scheme into a coarse one.
pub fn aggregate(args: &AggregateArgs) -> anyhow::Result<RegionSet> {
    let fine = args.from.scheme();
    let data = load_region_csv(args.data_csv, fine.clone(), args.missing)?;
    let weights = load_region_csv(args.weights_csv, fine, args.missing)?;
    let cross_reference = catalog::cross_reference(args.from, args.to)?;

    info!(
        "Aggregating {} into {}{}",
        args.from,
        args.to,
        if args.conus { " (contiguous U.S.)" } else { "" }
    );
    let result = if args.conus {
        weighted_average_conus(&data, &weights, &cross_reference)?
    } else {
        weighted_average(&data, &weights, &cross_reference)?
    };
    Ok(result)
}

pub fn run_aggregate(args: &AggregateArgs) -> anyhow::Result<()> {
    let result = aggregate(args)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&result.snapshot())?);
    } else {
        print!("{}", result.render_table(Some(("ID", "VALUE"))));
    }
    Ok(())
}

fn average_scheme(args: &AverageArgs) -> anyhow::Result<Arc<Scheme>> {
    match (args.scheme, args.reference) {
        (Some(scheme), None) => Ok(scheme.scheme()),
        (None, Some(path)) => Ok(Scheme::from_reference_file(path)?),
        (Some(_), Some(_)) => anyhow::bail!("Give either --scheme or --reference, not both"),
        (None, None) => anyhow::bail!("One of --scheme or --reference is required"),
    }
}

/// Weighted average of a whole data file into one number.
pub fn average(args: &AverageArgs) -> anyhow::Result<Option<f64>> {
    let scheme = average_scheme(args)?;
    let data = load_region_csv(args.data_csv, scheme.clone(), args.missing)?;
    let weights = match args.weights_csv {
        Some(path) => load_region_csv(path, scheme, args.missing)?,
        None => uniform_weights(scheme),
    };
    let value = if args.conus {
        weighted_average_scalar_conus(&data, &weights)?
    } else {
        weighted_average_scalar(&data, &weights)?
    };
    Ok(value)
}

pub fn run_average(args: &AverageArgs) -> anyhow::Result<()> {
    match average(args)? {
        Some(value) => println!("{}", value),
        None => println!("(absent)"),
    }
    Ok(())
}

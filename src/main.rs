// CitiBike trip analysis - batch executable

use anyhow::Context;
use clap::{App, Arg};
use log::info;

use citibike_trip_analysis::{
    analysis,
    data::{load_months, trip_schema},
    report::render_table,
    utils::{init_logging, Config},
};

fn main() -> anyhow::Result<()> {
    let matches = App::new("CitiBike Trip Analysis")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Summary statistics over monthly bike-share trip CSVs")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Sets a custom config file")
                .takes_value(true),
        )
        .arg(
            Arg::new("files")
                .value_name("CSV")
                .help("Monthly trip CSV files, in order")
                .required(true)
                .multiple_values(true),
        )
        .get_matches();

    let config = match matches.value_of("config") {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading config file {}", path))?,
        None => Config::default(),
    };

    if let Err(err) = init_logging(config.log_level_filter()) {
        eprintln!("Error initializing logger: {}", err);
    }

    let paths: Vec<&str> = matches
        .values_of("files")
        .map(|v| v.collect())
        .unwrap_or_default();

    let raw = load_months(&paths, &trip_schema()).context("loading trip files")?;
    info!("loaded {} trips from {} files", raw.len(), paths.len());

    let trips = analysis::prepare(&raw, &config.analysis).context("deriving columns")?;
    let reports = analysis::reports(&trips, &config.analysis).context("running queries")?;

    for report in reports {
        println!("\n{}\n", report.title);
        print!("{}", render_table(&report.table));
    }

    Ok(())
}

//! Longhaul demo entry point.
//!
//! Loads a small in-memory catalog, generates route statistics, and pages
//! through routes with the selected filters applied.

use std::env;
use std::process::ExitCode;

use longhaul_filter::FilterKey;
use longhaul_foundation::Value;
use longhaul_model::{Airline, AirlineDraft, Airport, AirportDraft, Route, RouteDraft};
use longhaul_runtime::{Catalog, CatalogConfig, LogConfig, init_tracing};
use longhaul_storage::SortOrder;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// CLI configuration parsed from arguments.
#[derive(Default)]
struct CliConfig {
    show_help: bool,
    show_version: bool,
    json_logs: bool,
    page_size: Option<usize>,
    seed: u64,
    sources: Vec<String>,
}

const AIRPORTS: &[(&str, &str, &str, &str, f64, f64)] = &[
    ("Auckland", "New Zealand", "AKL", "NZAA", -37.008, 174.792),
    ("Wellington", "New Zealand", "WLG", "NZWN", -41.327, 174.805),
    ("Christchurch", "New Zealand", "CHC", "NZCH", -43.489, 172.532),
    ("Sydney", "Australia", "SYD", "YSSY", -33.946, 151.177),
    ("Melbourne", "Australia", "MEL", "YMML", -37.673, 144.843),
    ("Brisbane", "Australia", "BNE", "YBBN", -27.384, 153.117),
];

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn parse_args(args: Vec<String>) -> Result<CliConfig, Box<dyn std::error::Error>> {
    let mut config = CliConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => config.show_help = true,
            "-V" | "--version" => config.show_version = true,
            "--json" => config.json_logs = true,
            "--page-size" | "--seed" => {
                let flag = args[i].clone();
                i += 1;
                let Some(value) = args.get(i) else {
                    return Err(format!("{flag} requires a value").into());
                };
                if flag == "--seed" {
                    config.seed = value
                        .parse()
                        .map_err(|_| format!("invalid --seed value: {value}"))?;
                } else {
                    config.page_size = Some(
                        value
                            .parse()
                            .map_err(|_| format!("invalid --page-size value: {value}"))?,
                    );
                }
            }
            arg if arg.starts_with('-') => {
                return Err(format!("unknown option: {arg}").into());
            }
            code => config.sources.push(code.to_ascii_uppercase()),
        }
        i += 1;
    }

    Ok(config)
}

fn run(args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let cli = parse_args(args)?;

    if cli.show_help {
        print_help();
        return Ok(());
    }
    if cli.show_version {
        println!("longhaul {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = CatalogConfig::default()
        .with_default_page_size(cli.page_size.unwrap_or(4))
        .with_log(LogConfig::default().with_json(cli.json_logs));
    init_tracing(&config.log)?;

    let catalog = Catalog::new(config)?;
    seed(&catalog)?;
    let mut rng = StdRng::seed_from_u64(cli.seed);
    catalog.fill_generated_route_stats(&mut rng)?;

    let registry = catalog.registry();
    let sources: Vec<Value> = cli.sources.iter().map(Value::text).collect();
    registry.set_selected(FilterKey::RouteSource, sources)?;

    let view = catalog.view(catalog.routes(), None)?;
    view.set_sort(Some(SortOrder::ascending("Price")))?;
    let mut page = 1;
    loop {
        println!("-- page {page} (offset {}) --", view.offset());
        for route in view.items() {
            println!(
                "{:<16} {:>5} min  ${:<5} {} takeoffs",
                route.key().to_string(),
                route.duration(),
                route.price(),
                route.takeoff_times().len()
            );
        }
        if !view.next()? {
            break;
        }
        page += 1;
    }

    drop(view);
    catalog.shutdown();
    Ok(())
}

fn seed(catalog: &Catalog) -> longhaul_foundation::Result<()> {
    catalog.airlines().save_all([
        Airline::new(
            AirlineDraft::default()
                .with_name("Air New Zealand")
                .with_iata("NZ")
                .with_icao("ANZ")
                .with_country("New Zealand"),
        )?,
        Airline::new(
            AirlineDraft::default()
                .with_name("Qantas")
                .with_iata("QF")
                .with_icao("QFA")
                .with_country("Australia"),
        )?,
    ])?;

    let mut airports = Vec::new();
    for &(name, country, iata, icao, latitude, longitude) in AIRPORTS {
        airports.push(Airport::new(
            AirportDraft::default()
                .with_name(name)
                .with_city(name)
                .with_country(country)
                .with_iata(iata)
                .with_icao(icao)
                .with_position(latitude, longitude),
        )?);
    }
    catalog.airports().save_all(airports)?;

    let mut routes = Vec::new();
    for (i, from) in AIRPORTS.iter().enumerate() {
        for (j, to) in AIRPORTS.iter().enumerate() {
            if i != j {
                let airline = if from.1 == "Australia" { "QF" } else { "NZ" };
                routes.push(Route::new(RouteDraft::new(airline, from.2, to.2))?);
            }
        }
    }
    catalog.routes().save_all(routes)?;
    Ok(())
}

fn print_help() {
    println!(
        "longhaul {}

Pages through a demo route catalog.

USAGE:
    longhaul [OPTIONS] [SOURCE_CODES...]

OPTIONS:
    -h, --help           Print help information
    -V, --version        Print version information
    --json               Log as JSON
    --page-size <N>      Rows per page (default: 4)
    --seed <N>           Seed for generated prices and schedules

EXAMPLES:
    longhaul                     All routes
    longhaul akl syd             Routes departing Auckland or Sydney
    RUST_LOG=debug longhaul      Show store and view activity",
        env!("CARGO_PKG_VERSION")
    );
}

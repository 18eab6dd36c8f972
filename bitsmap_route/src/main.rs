// CLI entry point for BitsMap directions.
//
// Compiles a route description into a venue, then answers one query:
// turn-by-turn directions between two POIs, a POI search, or a venue
// summary. Logs go to stderr through `tracing-subscriber` (filter from
// RUST_LOG, else from -v); results go to stdout.
//
// Exit codes: 0 on success, 1 on any error, 2 when no route exists.
//
// See also: `cli.rs` for the argument definitions.

mod cli;

use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use bitsmap_nav::{
    NavConfig, Narrator, PointOfInterest, RouteError, Venue, compile_venue_file,
    route_between_pois,
};
use clap::Parser;
use cli::{Cli, Commands};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => NavConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => NavConfig::default(),
    };
    let venue = compile_venue_file(&cli.venue, &config)
        .with_context(|| format!("compiling {}", cli.venue.display()))?;
    info!(venue = %cli.venue.display(), "venue ready");

    match cli.command {
        Commands::Directions {
            from,
            to,
            wheelchair,
            json,
        } => directions(&venue, &config, &from, &to, wheelchair, json),
        Commands::Search { query } => {
            for poi in venue.search(&query) {
                println!("{}", poi.search_label());
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Summary => {
            let s = venue.summary();
            println!("nodes:          {}", s.nodes);
            println!("edges:          {}", s.edges);
            println!("pois:           {}", s.pois);
            println!("floor-changers: {}", s.floor_changers);
            println!("labels:         {}", s.labels);
            println!("floors:         {:?}", s.floors);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn directions(
    venue: &Venue,
    config: &NavConfig,
    from: &str,
    to: &str,
    wheelchair: bool,
    json: bool,
) -> Result<ExitCode> {
    let start = resolve_poi(venue, from)?;
    let destination = resolve_poi(venue, to)?;
    debug!(start = %start.search_label(), destination = %destination.search_label(), wheelchair);

    let route = match route_between_pois(venue, start.id, destination.id, wheelchair) {
        Ok(route) => route,
        Err(e @ RouteError::NoPathFound { .. }) => {
            eprintln!(
                "{e}: {} -> {}",
                start.search_label(),
                destination.search_label()
            );
            return Ok(ExitCode::from(2));
        }
        Err(e) => return Err(e.into()),
    };

    let instructions = Narrator::new(venue, config).narrate_all(&route)?;

    if json {
        let positions: Vec<_> = route.nodes.iter().map(|&n| venue.position(n)).collect();
        let out = serde_json::json!({
            "from": start.search_label(),
            "to": destination.search_label(),
            "wheelchair": wheelchair,
            "route": route,
            "positions": positions,
            "instructions": instructions,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("From: {}", start.search_label());
    println!("To:   {}", destination.search_label());
    println!(
        "Distance: {:.1}{}",
        route.total_cost,
        if wheelchair { " (step-free)" } else { "" }
    );
    for (i, step) in instructions.iter().enumerate() {
        println!("{:>3}. {}", i + 1, step.text);
    }
    Ok(ExitCode::SUCCESS)
}

/// Exact name match first, then the first search hit.
fn resolve_poi<'a>(venue: &'a Venue, query: &str) -> Result<&'a PointOfInterest> {
    if let Some(poi) = venue.pois().iter().find(|p| p.name == query) {
        return Ok(poi);
    }
    match venue.search(query).first() {
        Some(poi) => Ok(*poi),
        None => bail!("no point of interest matches '{query}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitsmap_nav::compile_venue;

    #[test]
    fn exact_name_beats_earlier_substring() {
        let venue = compile_venue("U Room Lab 2\nR 5\nU Room Lab\n").unwrap();
        assert_eq!(resolve_poi(&venue, "Lab").unwrap().name, "Lab");
        assert_eq!(resolve_poi(&venue, "lab").unwrap().name, "Lab 2");
    }

    #[test]
    fn unknown_poi_is_an_error() {
        let venue = compile_venue("U Room Lab\n").unwrap();
        assert!(resolve_poi(&venue, "Gym").is_err());
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line pipeline over the beer review exports.
//!
//! Each subcommand reads the platform's CSV exports (or the artifact
//! of an earlier stage) and writes one CSV artifact: resolved
//! coordinates, cached pairwise distances, a state adjacency matrix, a
//! monthly series, a provenance decomposition, brewery opening counts,
//! or the country breakdown behind the `World` column.

mod output;

use std::path::PathBuf;
use std::time::Instant;

use brew_map_distance::DistanceCache;
use brew_map_geocoder::nominatim::NominatimClient;
use brew_map_geocoder::{resolve, service};
use brew_map_geography_models::{CountryCodes, StateCodes};
use brew_map_provenance::{
    Metric, adjacency, monthly, rank, sort_by_diagonal, summarize, summarize_series,
};
use brew_map_review::ReviewError;
use brew_map_review::load::{load_breweries, load_ratings, load_us_users};
use brew_map_review::merge::{
    location_vocabulary, merge_reviews, state_pairs, world_review_countries,
};
use brew_map_review::openings::{first_review_month, monthly_new_breweries};
use brew_map_review_models::{MonthKey, StateReview};
use clap::{Args, Parser, Subcommand};

/// Exploratory analysis pipeline over beer review exports.
#[derive(Parser)]
#[command(name = "brew_map_cli", about = "Exploratory analysis over beer review exports")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// The three platform exports every review-level analysis starts from.
#[derive(Args)]
struct InputArgs {
    /// Ratings export with `user_id,beer_id,brewery_id,date` columns
    #[arg(long)]
    ratings: PathBuf,
    /// Users export with `user_id,location` columns
    #[arg(long)]
    users: PathBuf,
    /// Breweries export with `id,name,location` columns
    #[arg(long)]
    breweries: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Geocode every distinct user and brewery location
    Resolve {
        /// Users export with `user_id,location` columns
        #[arg(long)]
        users: PathBuf,
        /// Breweries export with `id,name,location` columns
        #[arg(long)]
        breweries: PathBuf,
        /// Destination for the `location,address,latitude,longitude` table
        #[arg(long)]
        out: PathBuf,
    },
    /// Cache great-circle distances for every reviewed state pair
    Distances {
        #[command(flatten)]
        inputs: InputArgs,
        /// Resolved-location table produced by `resolve`
        #[arg(long)]
        locations: PathBuf,
        /// Destination for the distance cache
        #[arg(long)]
        out: PathBuf,
        /// Extend the cache already at the destination instead of rebuilding it
        #[arg(long)]
        append: bool,
    },
    /// Build the reviewer-state by brewery-state review matrix
    Adjacency {
        #[command(flatten)]
        inputs: InputArgs,
        /// Destination for the matrix
        #[arg(long)]
        out: PathBuf,
        /// Divide each row by its total instead of writing raw counts
        #[arg(long)]
        ratio: bool,
        /// Append a `World` column for breweries outside the state set
        #[arg(long)]
        world: bool,
        /// Order rows and columns by same-state review count
        #[arg(long)]
        sort_diagonal: bool,
        /// Sort ascending instead of descending
        #[arg(long)]
        ascending: bool,
        /// Include a postal-code column
        #[arg(long)]
        codes: bool,
    },
    /// Write one adjacency matrix per calendar month
    Monthly {
        #[command(flatten)]
        inputs: InputArgs,
        /// Destination for the long-format series
        #[arg(long)]
        out: PathBuf,
        /// First month of the window, as `YYYY-MM`
        #[arg(long)]
        start: Option<MonthKey>,
        /// Last month of the window, as `YYYY-MM`
        #[arg(long)]
        end: Option<MonthKey>,
        /// Accumulate counts across months instead of monthly snapshots
        #[arg(long)]
        cumulative: bool,
    },
    /// Split each state's reviews into local, national, and foreign
    Provenance {
        #[command(flatten)]
        inputs: InputArgs,
        /// Destination for the per-state breakdown
        #[arg(long)]
        out: PathBuf,
        /// Express the three buckets as shares of each state's total
        #[arg(long)]
        ratio: bool,
        /// Keep only the leading states after ranking
        #[arg(long)]
        top_k: Option<usize>,
        /// Metric to rank by: `local_count`, `national_count`, or `foreign_count`
        #[arg(long)]
        by: Option<Metric>,
        /// Rank ascending instead of descending
        #[arg(long)]
        ascending: bool,
        /// Include a postal-code column
        #[arg(long)]
        codes: bool,
    },
    /// Track the local/national/foreign mix month by month
    Trend {
        #[command(flatten)]
        inputs: InputArgs,
        /// Destination for the monthly breakdown
        #[arg(long)]
        out: PathBuf,
        /// First month of the window, as `YYYY-MM`
        #[arg(long)]
        start: Option<MonthKey>,
        /// Last month of the window, as `YYYY-MM`
        #[arg(long)]
        end: Option<MonthKey>,
        /// Accumulate counts across months instead of monthly snapshots
        #[arg(long)]
        cumulative: bool,
        /// Express the three buckets as shares of each month's total
        #[arg(long)]
        ratio: bool,
    },
    /// Count breweries by the month of their first review
    Openings {
        /// Ratings export with `user_id,beer_id,brewery_id,date` columns
        #[arg(long)]
        ratings: PathBuf,
        /// Destination for the `month,count,cumulative` series
        #[arg(long)]
        out: PathBuf,
    },
    /// Break the `World` column down by brewery country
    Countries {
        #[command(flatten)]
        inputs: InputArgs,
        /// Destination for the `country,code,reviews` table
        #[arg(long)]
        out: PathBuf,
    },
}

/// Loads the three exports and joins them into state-level reviews.
fn merged_reviews(inputs: &InputArgs) -> Result<Vec<StateReview>, ReviewError> {
    let ratings = load_ratings(&inputs.ratings)?;
    let users = load_us_users(&inputs.users)?;
    let breweries = load_breweries(&inputs.breweries)?;
    Ok(merge_reviews(&ratings, &users, &breweries).reviews)
}

#[allow(clippy::too_many_lines)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve {
            users,
            breweries,
            out,
        } => {
            let users = load_us_users(&users)?;
            let breweries = load_breweries(&breweries)?;
            let vocabulary = location_vocabulary(&users, &breweries);
            log::info!("Resolving {} distinct locations...", vocabulary.len());

            let client = NominatimClient::new(service::nominatim_service())?;
            let start = Instant::now();
            let resolved = resolve(&client, &vocabulary).await;
            let elapsed = start.elapsed();

            output::write_locations(&out, &resolved.records)?;
            log::info!(
                "Resolved {} locations ({} skipped) in {:.1}s",
                resolved.records.len(),
                resolved.skipped.len(),
                elapsed.as_secs_f64()
            );
        }
        Commands::Distances {
            inputs,
            locations,
            out,
            append,
        } => {
            let reviews = merged_reviews(&inputs)?;
            let pairs: Vec<(String, String)> = state_pairs(&reviews).into_iter().collect();
            let resolved = output::read_locations(&locations)?;

            let cache = if append && out.exists() {
                let loaded = DistanceCache::read_csv(&out)?;
                log::info!(
                    "Extending {} cached distances from {}",
                    loaded.cache.len(),
                    out.display()
                );
                loaded.cache
            } else {
                DistanceCache::default()
            };

            let start = Instant::now();
            let outcome = cache.extend(&resolved, &pairs);
            let elapsed = start.elapsed();

            outcome.cache.write_csv(&out)?;
            log::info!(
                "Cached {} distances ({} pairs skipped) in {:.1}s",
                outcome.cache.len(),
                outcome.skipped.len(),
                elapsed.as_secs_f64()
            );
        }
        Commands::Adjacency {
            inputs,
            out,
            ratio,
            world,
            sort_diagonal,
            ascending,
            codes,
        } => {
            let reviews = merged_reviews(&inputs)?;
            let state_codes = StateCodes::us_states();
            let mut matrix = adjacency(&reviews, &state_codes.names(), ratio, world);
            if sort_diagonal {
                matrix = sort_by_diagonal(&matrix, ascending);
            }

            output::write_matrix(&out, &matrix, codes.then_some(&state_codes))?;
            log::info!(
                "Wrote a {}x{} matrix to {}",
                matrix.states().len(),
                matrix.width(),
                out.display()
            );
        }
        Commands::Monthly {
            inputs,
            out,
            start,
            end,
            cumulative,
        } => {
            let reviews = merged_reviews(&inputs)?;
            let states = StateCodes::us_states().names();
            let months = monthly(&reviews, &states, start, end, cumulative);

            output::write_monthly(&out, &months)?;
            log::info!("Wrote {} monthly matrices to {}", months.len(), out.display());
        }
        Commands::Provenance {
            inputs,
            out,
            ratio,
            top_k,
            by,
            ascending,
            codes,
        } => {
            let reviews = merged_reviews(&inputs)?;
            let state_codes = StateCodes::us_states();
            let matrix = adjacency(&reviews, &state_codes.names(), false, true);

            let mut rows = summarize(&matrix, ratio)?;
            if by.is_some() || top_k.is_some() {
                let metric = by.unwrap_or(Metric::LocalCount);
                rows = rank(&rows, metric, top_k.unwrap_or(rows.len()), ascending);
            }

            output::write_counts(&out, "state", &rows, codes.then_some(&state_codes))?;
            log::info!(
                "Wrote provenance for {} states to {}",
                rows.len(),
                out.display()
            );
        }
        Commands::Trend {
            inputs,
            out,
            start,
            end,
            cumulative,
            ratio,
        } => {
            let reviews = merged_reviews(&inputs)?;
            let states = StateCodes::us_states().names();
            let months = monthly(&reviews, &states, start, end, cumulative);
            let rows = summarize_series(&months, ratio)?;

            output::write_counts(&out, "month", &rows, None)?;
            log::info!(
                "Wrote {} monthly provenance rows to {}",
                rows.len(),
                out.display()
            );
        }
        Commands::Openings { ratings, out } => {
            let ratings = load_ratings(&ratings)?;
            let first_months = first_review_month(&ratings);
            let counts = monthly_new_breweries(&first_months);

            output::write_openings(&out, &counts)?;
            log::info!(
                "Wrote opening counts for {} months to {}",
                counts.len(),
                out.display()
            );
        }
        Commands::Countries { inputs, out } => {
            let ratings = load_ratings(&inputs.ratings)?;
            let users = load_us_users(&inputs.users)?;
            let breweries = load_breweries(&inputs.breweries)?;
            let states = StateCodes::us_states().names();
            let counts = world_review_countries(&ratings, &users, &breweries, &states);

            output::write_countries(&out, &counts, &CountryCodes::world())?;
            log::info!("Wrote {} countries to {}", counts.len(), out.display());
        }
    }

    Ok(())
}

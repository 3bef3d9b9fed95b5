//! Contract lookup CLI
//!
//! Operator tool over the contract core. Prints JSON to stdout.
//!
//! Usage:
//!   cargo run --features cli --bin contract_lookup -- contract "Smith:SVC42"
//!   cargo run --features cli --bin contract_lookup -- company "ACME LIMITED" --number 03075427
//!   cargo run --features cli --bin contract_lookup -- validate 03075427 "ACME LIMITED" --director "Jane Smith"
//!   cargo run --features cli --bin contract_lookup -- duration 01/01/2024 15/03/2025
//!   cargo run --features cli --bin contract_lookup -- suggest smi
//!
//! Credentials come from the environment (or `.env`): C7_KEY, C7_USERID,
//! CH_KEY and optionally NAMEAPI_KEY.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use placement_contracts::cache::QueryCache;
use placement_contracts::companies_house::CompaniesHouseClient;
use placement_contracts::duration::duration_between_display_dates;
use placement_contracts::name_matching::{JaroWinklerMatcher, NameApiMatcher, NameMatcher};
use placement_contracts::placement_registry::PlacementRegistryClient;
use placement_contracts::{
    CompanyResolver, ContractAggregator, ContractConfig, DirectorValidator,
};

#[derive(Parser, Debug)]
#[command(name = "contract_lookup")]
#[command(about = "Look up placement contracts and validate limited companies")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Pretty-print JSON output
    #[arg(long, short = 'p', global = true)]
    pretty: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Aggregate the contract for a candidate id, SURNAME:TAG or surname
    Contract {
        identifier: String,
        /// Print the document merge fields instead of the record
        #[arg(long)]
        fields: bool,
    },
    /// Resolve a company's registered address and jurisdiction
    Company {
        name: String,
        #[arg(long, short = 'n')]
        number: Option<String>,
    },
    /// Validate a company and optionally one of its directors
    Validate {
        number: String,
        name: String,
        #[arg(long, short = 'd')]
        director: Option<String>,
    },
    /// Duration between two DD/MM/YYYY dates (offline)
    Duration { start: String, end: String },
    /// Candidate suggestions for a surname prefix
    Suggest { query: String },
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Command::Duration { start, end } = &args.command {
        let duration = duration_between_display_dates(start, end)?;
        return print_json(&duration, args.pretty);
    }

    let config = ContractConfig::from_env().context("loading configuration")?;
    let registry = Arc::new(
        CompaniesHouseClient::new(&config.companies_house, config.request_timeout)
            .context("building companies registry client")?,
    );
    let resolver = CompanyResolver::new(registry)
        .with_search_cache(Arc::new(QueryCache::new(config.search_cache_ttl)));

    match args.command {
        Command::Contract { identifier, fields } => {
            let aggregator = aggregator(&config, resolver)?;
            match aggregator.aggregate_contract(&identifier).await? {
                Some(record) if fields => print_json(&record.merge_fields(), args.pretty),
                Some(record) => print_json(&record, args.pretty),
                None => {
                    eprintln!("No candidate matched '{}'", identifier);
                    std::process::exit(1);
                }
            }
        }
        Command::Company { name, number } => {
            let resolved = resolver.resolve_company(&name, number.as_deref()).await?;
            print_json(&resolved, args.pretty)
        }
        Command::Validate {
            number,
            name,
            director,
        } => {
            let matcher: Arc<dyn NameMatcher> = match &config.name_matcher.api_key {
                Some(key) => Arc::new(NameApiMatcher::new(
                    &config.name_matcher,
                    key.clone(),
                    config.request_timeout,
                )?),
                None => Arc::new(JaroWinklerMatcher::new()),
            };
            let validator = DirectorValidator::new(resolver, matcher, config.director_match);
            let result = validator
                .validate_company_and_director(&number, &name, director.as_deref())
                .await?;
            print_json(&result, args.pretty)
        }
        Command::Suggest { query } => {
            let suggestions = aggregator(&config, resolver)?
                .suggest_candidates(&query)
                .await?;
            print_json(&suggestions, args.pretty)
        }
        Command::Duration { .. } => Ok(()),
    }
}

fn aggregator(config: &ContractConfig, resolver: CompanyResolver) -> Result<ContractAggregator> {
    let placements = PlacementRegistryClient::new(&config.placement_registry, config.request_timeout)
        .context("building placement registry client")?;
    Ok(ContractAggregator::new(Arc::new(placements), resolver)
        .with_suggestion_cache(Arc::new(QueryCache::new(config.search_cache_ttl))))
}

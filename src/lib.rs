//! Placement contracts - contract data aggregation core
//!
//! Pulls a candidate's current or upcoming placement out of the placement
//! registry, enriches it with the client company's registered details from
//! the companies registry, and hands back one canonical [`ContractRecord`]
//! for document generation. Also validates that a limited company exists,
//! is active, and lists a named person among its directors.
//!
//! ## Call chain
//! candidate lookup -> experience -> contact -> company -> companies registry
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use placement_contracts::companies_house::CompaniesHouseClient;
//! use placement_contracts::placement_registry::PlacementRegistryClient;
//! use placement_contracts::{CompanyResolver, ContractAggregator, ContractConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ContractConfig::from_env()?;
//! let registry = CompaniesHouseClient::new(&config.companies_house, config.request_timeout)?;
//! let placements =
//!     PlacementRegistryClient::new(&config.placement_registry, config.request_timeout)?;
//!
//! let aggregator = ContractAggregator::new(
//!     Arc::new(placements),
//!     CompanyResolver::new(Arc::new(registry)),
//! );
//! if let Some(contract) = aggregator.aggregate_contract("Smith:SVC42").await? {
//!     println!("{} starts {}", contract.candidate.display_name, contract.start_date);
//! }
//! # Ok(())
//! # }
//! ```

// Core error handling
pub mod error;

// Canonical records and configuration
pub mod config;
pub mod models;

// Pure helpers
pub mod duration;
pub mod normalize;

// Injected TTL cache
pub mod cache;

// Upstream services
pub mod companies_house;
pub mod name_matching;
pub mod placement_registry;

// Contract core
pub mod aggregator;
pub mod resolution;
pub mod validation;

pub use aggregator::{ContractAggregator, ContractIdentifier};
pub use cache::QueryCache;
pub use config::ContractConfig;
pub use duration::compute_duration;
pub use error::{ConfigError, ContractError, DataFormatError, RegistryError, Result};
pub use models::{ContractRecord, DirectorValidationResult, RegisteredCompany};
pub use name_matching::{DirectorMatchPolicy, NameMatchType, NameMatcher};
pub use resolution::CompanyResolver;
pub use validation::DirectorValidator;

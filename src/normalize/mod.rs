//! Normalization of ragged registry text
//!
//! Addresses arrive as up to six nullable fragments and names arrive in the
//! registry's `"Surname[:Tag], Forename"` convention. Nothing in here fails:
//! malformed input degrades to the best partial output available.

pub mod address;
pub mod name;

pub use address::normalize_address;
pub use name::{format_display_name, format_officer_name, split_person_name};

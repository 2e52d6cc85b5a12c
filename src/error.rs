use thiserror::Error;

use crate::secdef::{ProductMode, Venue};

/// One instrument could not be normalized. The record is dropped with a diagnostic and
/// the venue continues; this never aborts a run.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum RecordSkip {
	#[error("cannot split symbol {0:?} into base/quote currencies")]
	AmbiguousSymbol(String),
	#[error("missing or malformed field {0:?}")]
	MissingField(&'static str),
	#[error("min qty {min_qty} is not an integral number of {lot_size} lots")]
	NonIntegralMinLots { min_qty: f64, lot_size: f64 },
	#[error("unknown contract-type token {0:?}")]
	UnknownTenor(String),
	#[error("unsupported product type {0:?}")]
	UnsupportedProduct(String),
	#[error("record violates an invariant: {0}")]
	Invariant(String),
}

/// The venue's whole document is unusable. Aborts that venue only; other venues in the
/// same run are unaffected.
#[derive(Debug, Error)]
pub enum VenueError {
	#[error("document is not in the expected shape: {0}")]
	Document(String),
	#[error("failed to decode document: {0}")]
	Decode(String),
	#[error("normalization task aborted: {0}")]
	Task(String),
	#[error("csv: {0}")]
	Csv(#[from] csv::Error),
	#[error(transparent)]
	Io(#[from] std::io::Error),
	#[error(transparent)]
	Http(#[from] reqwest::Error),
}

impl VenueError {
	/// Decode failure with the `serde_path_to_error` path to the offending field.
	pub fn decode(e: serde_path_to_error::Error<serde_json::Error>) -> Self {
		Self::Decode(format!("{} (at {})", e.inner(), e.path()))
	}
}

/// Rejected before any adapter runs.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
	#[error("venue {venue} does not support product mode {mode}")]
	UnsupportedMode { venue: Venue, mode: ProductMode },
	#[error("venue {venue} serves multiple product types; an explicit mode is required")]
	ModeRequired { venue: Venue },
	#[error("venue {venue} has no default endpoint; a snapshot file is required")]
	SourceRequired { venue: Venue },
	#[error("{0}")]
	Invalid(String),
}

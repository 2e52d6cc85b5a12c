use std::{path::PathBuf, str::FromStr};

use color_eyre::eyre::{Context, Result};
use serde::Deserialize;
use url::Url;

use crate::{
	adapters::Adapter,
	error::ConfigError,
	fetch::SnapshotSource,
	pipeline::VenueJob,
	secdef::{ProductMode, Venue},
};

#[derive(Clone, Debug, Default, Deserialize)]
pub struct AppConfig {
	#[serde(default)]
	pub jobs: Vec<JobConfig>,
}

/// One configured venue. `mode` is required for multi-endpoint venues; the source
/// defaults to the venue's public endpoint when neither `file` nor `url` is given.
#[derive(Clone, Debug, Deserialize)]
pub struct JobConfig {
	pub venue: Venue,
	#[serde(default)]
	pub mode: Option<ProductMode>,
	#[serde(default)]
	pub file: Option<PathBuf>,
	#[serde(default)]
	pub url: Option<Url>,
}

impl JobConfig {
	pub fn resolve(&self) -> Result<VenueJob, ConfigError> {
		let adapter = Adapter::new(self.venue, self.mode)?;
		let source = match (&self.file, &self.url) {
			(Some(path), _) => SnapshotSource::File(path.clone()),
			(None, Some(url)) => SnapshotSource::Http(url.clone()),
			(None, None) => adapter
				.default_url()
				.map(SnapshotSource::Http)
				.ok_or(ConfigError::SourceRequired { venue: self.venue })?,
		};
		Ok(VenueJob::new(adapter, source))
	}
}

impl AppConfig {
	pub fn try_build(path: Option<PathBuf>) -> Result<Self> {
		let mut builder = config::Config::builder();
		builder = match path {
			Some(path) => builder.add_source(config::File::from(path)),
			None => builder.add_source(config::File::with_name("mk_secdefs").required(false)),
		};
		let raw = builder.build().wrap_err("Failed to read config")?;
		let settings: Self = raw.try_deserialize().wrap_err("Failed to interpret config")?;
		Ok(settings)
	}
}

/// CLI shorthand for a job: `venue[:mode][=snapshot-file]`, eg `huobi:coin_swap`,
/// `binance:spot=./exchangeInfo.json`, `bitmex`.
#[derive(Clone, Debug)]
pub struct JobSpec(pub JobConfig);

impl FromStr for JobSpec {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let (head, file) = match s.split_once('=') {
			Some((head, file)) if !file.is_empty() => (head, Some(PathBuf::from(file))),
			Some(_) => return Err(format!("empty snapshot path in job spec {s:?}")),
			None => (s, None),
		};
		let (venue, mode) = match head.split_once(':') {
			Some((venue, mode)) => (venue.parse::<Venue>()?, Some(mode.parse::<ProductMode>()?)),
			None => (head.parse::<Venue>()?, None),
		};
		Ok(Self(JobConfig { venue, mode, file, url: None }))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn job_spec_parsing() {
		let spec: JobSpec = "huobi:coin_swap".parse().unwrap();
		assert_eq!(spec.0.venue, Venue::Huobi);
		assert_eq!(spec.0.mode, Some(ProductMode::CoinSwap));
		assert_eq!(spec.0.file, None);

		let spec: JobSpec = "binance:spot=./snap.json".parse().unwrap();
		assert_eq!(spec.0.venue, Venue::Binance);
		assert_eq!(spec.0.file, Some(PathBuf::from("./snap.json")));

		let spec: JobSpec = "bitmex".parse().unwrap();
		assert_eq!(spec.0.venue, Venue::BitMex);
		assert_eq!(spec.0.mode, None);

		assert!("ftx".parse::<JobSpec>().is_err());
		assert!("binance:weekly".parse::<JobSpec>().is_err());
	}

	#[test]
	fn resolution_fills_in_default_endpoint() {
		let job = JobSpec::from_str("kraken").unwrap().0.resolve().unwrap();
		assert_eq!(job.adapter, Adapter::KrakenSpot);
		assert!(matches!(job.source, SnapshotSource::Http(_)));
	}

	#[test]
	fn lmax_without_file_is_a_config_error() {
		let err = JobSpec::from_str("lmax").unwrap().0.resolve().unwrap_err();
		assert_eq!(err, ConfigError::SourceRequired { venue: Venue::Lmax });
	}

	#[test]
	fn unsupported_mode_fails_fast() {
		let err = JobSpec::from_str("okex:coin_swap").unwrap().0.resolve().unwrap_err();
		assert_eq!(
			err,
			ConfigError::UnsupportedMode {
				venue: Venue::Okex,
				mode: ProductMode::CoinSwap
			}
		);
	}
}

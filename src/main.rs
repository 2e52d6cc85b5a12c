pub mod adapters;
pub mod config;
pub mod error;
pub mod fetch;
pub mod output;
pub mod pipeline;
pub mod secdef;
pub mod utils;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{bail, Result};
use config::{AppConfig, JobSpec};
use output::{JsonLinesSink, OutputSink};
use secdef::{ProductMode, Venue};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Commands,
	#[arg(long)]
	config: Option<PathBuf>,
	/// Write logs to a file instead of stderr
	#[arg(long)]
	log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
	/// Normalize the configured venues into canonical secdef records
	Run(RunArgs),
	/// List supported venues, their product modes and default endpoints
	Venues,
}

#[derive(Args, Clone, Debug)]
struct RunArgs {
	/// Jobs as `venue[:mode][=snapshot-file]`, eg `huobi:coin_swap` or
	/// `binance:spot=./exchangeInfo.json`. Falls back to the config file when omitted.
	#[arg(short, long)]
	job: Vec<JobSpec>,
	/// Output file; stdout when omitted
	#[arg(short, long)]
	out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	let cli = Cli::parse();
	utils::init_subscriber(cli.log_file.clone().map(PathBuf::into_boxed_path));

	match cli.command {
		Commands::Venues => {
			list_venues();
			Ok(())
		}
		Commands::Run(args) => run(cli.config, args).await,
	}
}

async fn run(config_path: Option<PathBuf>, args: RunArgs) -> Result<()> {
	let job_configs = match args.job.is_empty() {
		false => args.job.into_iter().map(|spec| spec.0).collect(),
		true => {
			let settings = AppConfig::try_build(config_path)?;
			if settings.jobs.is_empty() {
				bail!("No jobs: pass --job or list them in the config file");
			}
			settings.jobs
		}
	};

	// all (venue, mode, source) combinations are checked before any adapter runs
	let jobs = job_configs.iter().map(|j| j.resolve()).collect::<Result<Vec<_>, _>>()?;

	let report = pipeline::run(jobs).await;

	match args.out {
		Some(path) => JsonLinesSink::new(std::fs::File::create(path)?).write_all(&report.records)?,
		None => JsonLinesSink::new(std::io::stdout().lock()).write_all(&report.records)?,
	}

	if !report.failures.is_empty() {
		bail!(
			"{} venue(s) failed: {}",
			report.failures.len(),
			report.failures.iter().map(|f| f.adapter.to_string()).collect::<Vec<_>>().join(", ")
		);
	}
	Ok(())
}

fn list_venues() {
	for venue in Venue::ALL {
		let modes: &[Option<ProductMode>] = match venue {
			Venue::Binance => &[Some(ProductMode::Spot), Some(ProductMode::UsdtFutures), Some(ProductMode::CoinFutures)],
			Venue::Huobi => &[
				Some(ProductMode::Spot),
				Some(ProductMode::Futures),
				Some(ProductMode::CoinSwap),
				Some(ProductMode::UsdtSwap),
			],
			Venue::Okex => &[Some(ProductMode::Spot), Some(ProductMode::Futures), Some(ProductMode::Swap)],
			_ => &[None],
		};
		for mode in modes {
			let adapter = adapters::Adapter::new(venue, *mode).expect("mode table matches the adapter table");
			let endpoint = adapter.default_url().map(|u| u.to_string()).unwrap_or_else(|| "(snapshot file required)".to_owned());
			println!("{adapter}\t{endpoint}");
		}
	}
}

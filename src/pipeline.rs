use derive_new::new;
use tokio::task::JoinSet;
use tracing::{error, info, instrument};

use crate::{adapters::Adapter, error::VenueError, fetch::SnapshotSource, secdef::CanonicalSecDef};

/// One unit of work: a fully-resolved adapter plus the snapshot it normalizes.
#[derive(Clone, Debug, PartialEq, new)]
pub struct VenueJob {
	pub adapter: Adapter,
	pub source: SnapshotSource,
}

#[derive(Debug, Default)]
pub struct RunReport {
	/// Successful venues' records, concatenated in job order.
	pub records: Vec<CanonicalSecDef>,
	pub failures: Vec<VenueFailure>,
}

#[derive(Debug)]
pub struct VenueFailure {
	pub adapter: Adapter,
	pub error: VenueError,
}

/// Shields the run from a panicking normalization: the work goes onto its own task, and
/// a panic there comes back as a venue failure instead of going unreported.
async fn guarded<F>(work: F) -> Result<Vec<CanonicalSecDef>, VenueError>
where
	F: std::future::Future<Output = Result<Vec<CanonicalSecDef>, VenueError>> + Send + 'static,
{
	match tokio::spawn(work).await {
		Ok(result) => result,
		Err(e) => Err(VenueError::Task(e.to_string())),
	}
}

/// Runs every job concurrently (adapters are stateless and share nothing), then
/// reassembles results in job order so that identical snapshots always produce an
/// identical sequence. A failed venue is reported and never cancels the others.
#[instrument(skip(jobs), fields(n_jobs = jobs.len()))]
pub async fn run(jobs: Vec<VenueJob>) -> RunReport {
	let n = jobs.len();
	let mut set = JoinSet::new();
	for (i, job) in jobs.into_iter().enumerate() {
		let adapter = job.adapter;
		set.spawn(async move {
			let result = guarded(async move {
				let doc = job.source.load(adapter.is_tabular()).await?;
				adapter.run(doc)
			})
			.await;
			(i, adapter, result)
		});
	}

	let mut slots: Vec<Option<(Adapter, Result<Vec<CanonicalSecDef>, VenueError>)>> = (0..n).map(|_| None).collect();
	while let Some(joined) = set.join_next().await {
		match joined {
			Ok((i, adapter, result)) => slots[i] = Some((adapter, result)),
			Err(e) => error!(error = %e, "normalization task aborted"),
		}
	}

	let mut report = RunReport::default();
	for slot in slots.into_iter().flatten() {
		match slot {
			(adapter, Ok(mut records)) => {
				info!(adapter = %adapter, n_records = records.len(), "venue normalized");
				report.records.append(&mut records);
			}
			(adapter, Err(error)) => {
				error!(adapter = %adapter, error = %error, "venue failed");
				report.failures.push(VenueFailure { adapter, error });
			}
		}
	}
	report
}

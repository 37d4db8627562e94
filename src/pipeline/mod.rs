mod queue;
mod reader;
mod shutdown;
mod worker;
mod writer;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::io::AsyncWrite;
use tokio::task::JoinSet;
use tokio::time::Instant;

use crate::alignment::AlignmentSource;
use crate::error;
use crate::pileup::{PileupComputer, ReadFilter};
use crate::pipeline::worker::Worker;
use crate::position::PositionSource;
use crate::reference::ReferenceSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage
{
	Reader,
	Worker,
	Writer,
}

impl fmt::Display for Stage
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
	{
		let name = match self
		{
			Stage::Reader => "reader",
			Stage::Worker => "worker",
			Stage::Writer => "writer",
		};
		write!(f, "{}", name)
	}
}

#[derive(Debug, Clone)]
pub struct PipelineConfig
{
	pub workers: usize,
	/// Capacity of each queue. Producers wait while a queue is this full.
	pub high_water_mark: usize,
	pub poll_interval: Duration,
	pub timeout: Duration,
	pub filter: ReadFilter,
}

impl Default for PipelineConfig
{
	fn default() -> Self
	{
		PipelineConfig {
			workers: 1,
			high_water_mark: 100_000,
			poll_interval: Duration::from_millis(20),
			timeout: Duration::from_secs(60 * 60 * 60),
			filter: ReadFilter::default(),
		}
	}
}

impl PipelineConfig
{
	pub fn set_workers(&mut self, workers: usize) -> &mut Self
	{
		self.workers = workers.max(1);
		self
	}

	pub fn set_high_water_mark(&mut self, high_water_mark: usize) -> &mut Self
	{
		self.high_water_mark = high_water_mark.max(1);
		self
	}

	pub fn set_poll_interval(&mut self, poll_interval: Duration) -> &mut Self
	{
		self.poll_interval = poll_interval;
		self
	}

	pub fn set_timeout(&mut self, timeout: Duration) -> &mut Self
	{
		self.timeout = timeout;
		self
	}

	pub fn set_filter(&mut self, filter: ReadFilter) -> &mut Self
	{
		self.filter = filter;
		self
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineSummary
{
	pub positions: u64,
	pub results: u64,
	pub workers: usize,
}

/// Reader, workers and writer joined by two bounded queues.
pub struct Pipeline
{
	config: PipelineConfig,
	sources: Vec<Arc<dyn AlignmentSource>>,
	reference: Option<Arc<dyn ReferenceSource>>,
}

impl Pipeline
{
	pub fn new(config: PipelineConfig) -> Self
	{
		Pipeline {
			config,
			sources: Vec::new(),
			reference: None,
		}
	}

	pub fn config(&self) -> &PipelineConfig
	{
		&self.config
	}

	pub fn add_source(&mut self, source: Arc<dyn AlignmentSource>) -> &mut Self
	{
		self.sources.push(source);
		self
	}

	pub fn set_reference(&mut self, reference: Arc<dyn ReferenceSource>) -> &mut Self
	{
		self.reference = Some(reference);
		self
	}

	/// Runs every stage to completion and reports the first failure, if any.
	pub async fn run<P, W>(&self, positions: P, sink: W) -> error::Result<PipelineSummary>
	where
		P: PositionSource + 'static,
		W: AsyncWrite + Send + Unpin + 'static,
	{
		if self.sources.is_empty()
		{
			warn!("No alignment sources; only the header will be written");
		}

		let workers = self.config.workers.max(1);
		let (position_tx, position_rx) = queue::bounded(self.config.high_water_mark);
		let (result_tx, result_rx) = queue::bounded(self.config.high_water_mark);
		let (trigger, shutdown) = shutdown::channel();

		let mut stages: JoinSet<(Stage, error::Result<u64>)> = JoinSet::new();

		let stage_shutdown = shutdown.clone();
		stages.spawn(async move {
			(
				Stage::Reader,
				reader::read_positions(positions, position_tx, stage_shutdown).await,
			)
		});

		let sources = Arc::new(self.sources.clone());
		for id in 0..workers
		{
			let worker = Worker::new(
				id,
				Arc::clone(&sources),
				self.reference.clone(),
				PileupComputer::new(self.config.filter.clone()),
			);
			let (positions, results, stage_shutdown) =
				(position_rx.clone(), result_tx.clone(), shutdown.clone());

			stages.spawn(async move { (Stage::Worker, worker.run(positions, results, stage_shutdown).await) });
		}
		drop(result_tx);

		let results = result_rx.clone();
		stages.spawn(async move { (Stage::Writer, writer::write_results(sink, results, shutdown).await) });

		info!("Pipeline started with {} workers over {} sources", workers, self.sources.len());

		let deadline = deadline(self.config.timeout);
		let mut heartbeat = tokio::time::interval(self.config.poll_interval.max(Duration::from_millis(1)));
		let mut failure: Option<error::Error> = None;
		let mut summary = PipelineSummary {
			workers,
			..PipelineSummary::default()
		};

		loop
		{
			tokio::select! {
				joined = stages.join_next() =>
				{
					let outcome = match joined
					{
						None => break,
						Some(Ok((stage, Ok(count)))) =>
						{
							debug!("{} stage done ({})", stage, count);
							match stage
							{
								Stage::Reader => summary.positions = count,
								Stage::Writer => summary.results = count,
								Stage::Worker => {}
							}
							continue;
						}
						Some(Ok((stage, Err(err)))) => (stage.to_string(), err),
						Some(Err(err)) => ("unknown".to_string(), error::Error::StagePanic(err.to_string())),
					};

					let (stage, err) = outcome;
					record_failure(&mut failure, &stage, err);
					trigger.trigger();
				}
				_ = heartbeat.tick() =>
				{
					debug!(
						"queues: positions = {:?}, results = {:?}",
						position_rx.try_len(),
						result_rx.try_len()
					);
				}
				_ = tokio::time::sleep_until(deadline) =>
				{
					error!("Pipeline exceeded {:?}, stopping", self.config.timeout);
					trigger.trigger();
					stages.abort_all();
					while stages.join_next().await.is_some() {}
					failure.get_or_insert(error::Error::Timeout(self.config.timeout));
					break;
				}
			}
		}

		if let Some(err) = failure
		{
			return Err(err);
		}

		let (positions_left, results_left) = (position_rx.len().await, result_rx.len().await);
		if positions_left > 0 || results_left > 0
		{
			return Err(error::Error::Undrained {
				positions: positions_left,
				results: results_left,
			});
		}

		info!(
			"Pipeline finished: {} positions, {} lines",
			summary.positions, summary.results
		);

		Ok(summary)
	}
}

// sleeps past this are as good as forever
const LONGEST_WAIT: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 30);

fn deadline(timeout: Duration) -> Instant
{
	Instant::now() + timeout.min(LONGEST_WAIT)
}

// cancellations never displace an earlier cause
fn record_failure(failure: &mut Option<error::Error>, stage: &str, err: error::Error)
{
	let is_stop = matches!(err, error::Error::Cancelled | error::Error::OwnerGone);

	if is_stop
	{
		debug!("{} stage stopped: {}", stage, err);
	}
	else
	{
		error!("{} stage failed: {}", stage, err);
	}

	match failure
	{
		None => *failure = Some(err),
		Some(error::Error::Cancelled | error::Error::OwnerGone) if !is_stop => *failure = Some(err),
		Some(_) =>
		{}
	}
}

use std::sync::Arc;

use log::{debug, info};
use tokio::sync::mpsc;

use crate::alignment::AlignmentSource;
use crate::error;
use crate::pileup::PileupComputer;
use crate::pipeline::queue::SharedReceiver;
use crate::pipeline::shutdown::Shutdown;
use crate::pipeline::Stage;
use crate::position::QueryPosition;
use crate::reference::ReferenceSource;
use crate::window::WindowManager;

pub(crate) struct Worker
{
	id: usize,
	sources: Arc<Vec<Arc<dyn AlignmentSource>>>,
	reference: Option<Arc<dyn ReferenceSource>>,
	computer: PileupComputer,
}

impl Worker
{
	pub fn new(
		id: usize,
		sources: Arc<Vec<Arc<dyn AlignmentSource>>>,
		reference: Option<Arc<dyn ReferenceSource>>,
		computer: PileupComputer,
	) -> Self
	{
		Worker {
			id,
			sources,
			reference,
			computer,
		}
	}

	pub async fn run(
		self,
		positions: SharedReceiver<QueryPosition>,
		results: mpsc::Sender<String>,
		mut shutdown: Shutdown,
	) -> error::Result<u64>
	{
		let mut windows: Vec<Option<WindowManager>> = self.sources.iter().map(|_| None).collect();
		let mut count = 0u64;

		loop
		{
			let position = tokio::select! {
				biased;
				reason = shutdown.stopped() => return Err(reason),
				position = positions.recv() => position,
			};

			let position = match position
			{
				Some(position) => position,
				None => break,
			};

			let reference_bases = self.reference.as_ref().and_then(|reference| {
				reference.bases(&position.reference, position.start, position.last())
			});

			for (source, slot) in self.sources.iter().zip(windows.iter_mut())
			{
				if shutdown.is_triggered()
				{
					return Err(error::Error::Cancelled);
				}

				if slot
					.as_ref()
					.is_some_and(|window| window.reference() != position.reference)
				{
					slot.take();
				}

				let window = slot.get_or_insert_with(|| {
					debug!("worker {} opening {} on {}", self.id, position.reference, source.name());
					let records = source.overlapping(&position.reference, position.start, u32::MAX);
					WindowManager::new(position.reference.clone(), records)
				});

				tokio::select! {
					biased;
					reason = shutdown.stopped() => return Err(reason),
					advanced = window.advance(&position) =>
					{
						advanced.map_err(|err| error::Error::Worker {
							worker: self.id,
							alignments: source.name().to_string(),
							position: position.to_string(),
							error: Box::new(err),
						})?;
					}
				}

				let line = self
					.computer
					.compute(&position, window.current(), reference_bases)
					.to_line(source.name());

				tokio::select! {
					biased;
					reason = shutdown.stopped() => return Err(reason),
					sent = results.send(line) =>
					{
						sent.map_err(|_| error::Error::QueueClosed(Stage::Worker))?;
					}
				}

				count += 1;
			}
		}

		info!("Worker {} produced {} results", self.id, count);

		Ok(count)
	}
}

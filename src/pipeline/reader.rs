use futures::TryStreamExt;
use log::{debug, info};
use rustc_hash::FxHashMap;
use tokio::sync::mpsc;

use crate::error;
use crate::pipeline::shutdown::Shutdown;
use crate::pipeline::Stage;
use crate::position::{PositionSource, QueryPosition};

pub(crate) async fn read_positions<P>(
	mut positions: P,
	sender: mpsc::Sender<QueryPosition>,
	mut shutdown: Shutdown,
) -> error::Result<u64>
where
	P: PositionSource,
{
	let mut last_start: FxHashMap<String, u32> = FxHashMap::default();
	let mut count = 0u64;

	while let Some(position) = positions.try_next().await?
	{
		match last_start.get_mut(&position.reference)
		{
			Some(previous) if position.start < *previous =>
			{
				return Err(error::Error::PositionOrder {
					reference: position.reference,
					previous: *previous,
					current: position.start,
				});
			}
			Some(previous) => *previous = position.start,
			None =>
			{
				debug!("reader entering {}", position.reference);
				last_start.insert(position.reference.clone(), position.start);
			}
		}

		tokio::select! {
			biased;
			reason = shutdown.stopped() => return Err(reason),
			sent = sender.send(position) =>
			{
				sent.map_err(|_| error::Error::QueueClosed(Stage::Reader))?;
			}
		}

		count += 1;
	}

	info!("Reader queued {} positions on {} references", count, last_start.len());

	Ok(count)
}

use log::info;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error;
use crate::pileup::output_header;
use crate::pipeline::queue::SharedReceiver;
use crate::pipeline::shutdown::Shutdown;

pub(crate) async fn write_results<W>(
	mut sink: W,
	results: SharedReceiver<String>,
	mut shutdown: Shutdown,
) -> error::Result<u64>
where
	W: AsyncWrite + Unpin,
{
	sink.write_all(output_header().as_bytes()).await?;

	let mut count = 0u64;

	loop
	{
		let line = tokio::select! {
			biased;
			reason = shutdown.stopped() => return Err(reason),
			line = results.recv() => line,
		};

		match line
		{
			Some(line) =>
			{
				sink.write_all(line.as_bytes()).await?;
				count += 1;
			}
			None => break,
		}
	}

	sink.flush().await?;
	info!("Writer wrote {} lines", count);

	Ok(count)
}

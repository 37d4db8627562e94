use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

pub(crate) struct SharedReceiver<T>
{
	inner: Arc<Mutex<mpsc::Receiver<T>>>,
}

impl<T> Clone for SharedReceiver<T>
{
	fn clone(&self) -> Self
	{
		SharedReceiver {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<T> SharedReceiver<T>
{
	pub async fn recv(&self) -> Option<T>
	{
		self.inner.lock().await.recv().await
	}

	pub async fn len(&self) -> usize
	{
		self.inner.lock().await.len()
	}

	pub fn try_len(&self) -> Option<usize>
	{
		self.inner.try_lock().map(|receiver| receiver.len()).ok()
	}
}

pub(crate) fn bounded<T>(capacity: usize) -> (mpsc::Sender<T>, SharedReceiver<T>)
{
	let (sender, receiver) = mpsc::channel(capacity.max(1));

	(
		sender,
		SharedReceiver {
			inner: Arc::new(Mutex::new(receiver)),
		},
	)
}

#[cfg(test)]
mod tests
{
	use super::*;

	#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
	async fn consumers_share_items_once()
	{
		let (sender, receiver) = bounded::<u32>(4);

		let mut consumers = tokio::task::JoinSet::new();
		for _ in 0..3
		{
			let receiver = receiver.clone();
			consumers.spawn(async move {
				let mut seen = Vec::new();
				while let Some(item) = receiver.recv().await
				{
					seen.push(item);
				}
				seen
			});
		}

		for item in 0..100
		{
			sender.send(item).await.unwrap();
		}
		drop(sender);

		let mut all = Vec::new();
		while let Some(seen) = consumers.join_next().await
		{
			all.extend(seen.unwrap());
		}
		all.sort_unstable();

		assert_eq!(all, (0..100).collect::<Vec<_>>());
		assert_eq!(receiver.len().await, 0);
	}

	#[tokio::test]
	async fn full_queue_holds_back_sender()
	{
		let (sender, receiver) = bounded::<u32>(2);
		sender.send(1).await.unwrap();
		sender.send(2).await.unwrap();

		assert!(sender.try_send(3).is_err());
		assert_eq!(receiver.try_len(), Some(2));

		assert_eq!(receiver.recv().await, Some(1));
		assert!(sender.try_send(3).is_ok());
	}
}

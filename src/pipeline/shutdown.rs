use tokio::sync::watch;

use crate::error;

pub(crate) struct ShutdownTrigger
{
	sender: watch::Sender<bool>,
}

impl ShutdownTrigger
{
	pub fn trigger(&self)
	{
		self.sender.send_replace(true);
	}
}

#[derive(Clone)]
pub(crate) struct Shutdown
{
	receiver: watch::Receiver<bool>,
}

impl Shutdown
{
	pub fn is_triggered(&self) -> bool
	{
		*self.receiver.borrow()
	}

	pub async fn stopped(&mut self) -> error::Error
	{
		loop
		{
			if *self.receiver.borrow_and_update()
			{
				return error::Error::Cancelled;
			}

			if self.receiver.changed().await.is_err()
			{
				return error::Error::OwnerGone;
			}
		}
	}
}

pub(crate) fn channel() -> (ShutdownTrigger, Shutdown)
{
	let (sender, receiver) = watch::channel(false);

	(ShutdownTrigger { sender }, Shutdown { receiver })
}

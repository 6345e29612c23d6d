//! Broadcast channel for receiver events.

use gauntlet_types::GauntletEvent;
use tokio::sync::broadcast;

/// Fan-out bus for [`GauntletEvent`]s.
///
/// Cloning the bus shares the underlying channel. Publishing with no
/// subscribers returns an error which callers are free to ignore.
#[derive(Clone)]
pub struct EventBus {
	sender: broadcast::Sender<GauntletEvent>,
}

impl EventBus {
	/// Creates a bus that buffers up to `capacity` events per subscriber.
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	pub fn subscribe(&self) -> broadcast::Receiver<GauntletEvent> {
		self.sender.subscribe()
	}

	pub fn publish(
		&self,
		event: GauntletEvent,
	) -> Result<(), broadcast::error::SendError<GauntletEvent>> {
		self.sender.send(event)?;
		Ok(())
	}
}

//! Observer backed by a websocket client's outgoing channel

use shared::ObserverUpdate;
use tokio::sync::mpsc;
use webserver::ClientId;

use crate::error::{SchedulerError, SchedulerResult};
use crate::traits::Observer;

/// Pushes updates into the send queue of one connected client
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    client_id: ClientId,
    updates: mpsc::UnboundedSender<ObserverUpdate>,
}

impl ChannelObserver {
    pub fn new(client_id: ClientId, updates: mpsc::UnboundedSender<ObserverUpdate>) -> Self {
        Self { client_id, updates }
    }

    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }
}

impl Observer for ChannelObserver {
    fn publish(&self, update: ObserverUpdate) -> SchedulerResult<()> {
        self.updates
            .send(update)
            .map_err(|_| SchedulerError::ObserverClosed {
                client_id: self.client_id.to_string(),
            })
    }
}

use crate::connection::ConnectionEvent;
use std::collections::HashMap;
use system::ConnectionId;
use tokio::sync::mpsc::error::TrySendError;

pub type ConnectionTx = tokio::sync::mpsc::Sender<ConnectionEvent>;

pub struct ConnectionTxStorage {
    connection_txs: HashMap<ConnectionId, ConnectionTx>,
}

impl ConnectionTxStorage {
    pub fn new() -> Self {
        Self {
            connection_txs: HashMap::new(),
        }
    }

    pub fn insert(&mut self, connection_id: ConnectionId, tx: ConnectionTx) {
        self.connection_txs.insert(connection_id, tx);
    }

    /// Never waits: a full channel drops the event. Returns false once the
    /// connection's receiving side is gone, so the caller can retire it.
    pub fn send(&mut self, to: &ConnectionId, message: ConnectionEvent) -> bool {
        if let Some(tx) = self.connection_txs.get_mut(to) {
            match tx.try_send(message) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    log::warn!("Connection {} is lagging, dropping event", to);
                    true
                }
                Err(TrySendError::Closed(_)) => {
                    log::debug!("Connection {} is closed", to);
                    false
                }
            }
        } else {
            log::warn!("Tried to send to unknown connection {}", to);
            true
        }
    }

    pub fn remove(&mut self, connection_id: &ConnectionId) -> Option<ConnectionTx> {
        self.connection_txs.remove(connection_id)
    }
}

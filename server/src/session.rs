use system::ConnectionId;

/// Membership of one live session. Strokes live in the registry and outlive this.
pub struct Session {
    pub connections: Vec<ConnectionId>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            connections: Vec::new(),
        }
    }

    pub fn add(&mut self, connection_id: ConnectionId) {
        if !self.connections.contains(&connection_id) {
            self.connections.push(connection_id);
        }
    }

    pub fn remove(&mut self, connection_id: &ConnectionId) {
        self.connections.retain(|c| c != connection_id);
    }
}

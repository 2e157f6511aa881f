pub type ConnectionId = u32;
pub type SessionId = String;
pub type StrokeId = String;

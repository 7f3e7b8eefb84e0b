//! WebSocket wire protocol for the daily-report realtime channel

use serde::{Deserialize, Serialize};

use crate::reports::models::DailyReportDto;

/// Messages exchanged over the realtime channel, JSON with a `type` tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    // Client → Server
    JoinDateRoom { date: String },
    LeaveDateRoom { date: String },
    Ping,

    // Server → Client
    Connected { user_id: String },
    ReportUpdated { report: DailyReportDto },
    Pong,
    Error { code: String, message: String },
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One append-only audit log entry. Never edited, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub date: DateTime<Utc>,
    /// Who performed the action (a user or tool name).
    pub actor: String,
    pub text: String,
}

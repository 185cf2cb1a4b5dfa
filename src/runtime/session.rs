use crate::client::{AlvaApi, CreatedSession};
use crate::error::DashboardError;
use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// One invocation of the tool, as parsed from the command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunRequest {
    /// Natural-language request; words are joined with spaces.
    pub message: Vec<String>,
    pub session: Option<String>,
    pub refresh: bool,
    pub output: Option<PathBuf>,
    /// Overrides the configured creation timeout.
    pub timeout: Option<Duration>,
}

/// Where the session for this run comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionPlan {
    Create { message: String },
    Reuse { session_id: String },
}

impl RunRequest {
    pub fn message_text(&self) -> Option<String> {
        let text = self.message.join(" ");
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    /// An existing session wins over a message; `--refresh` only makes sense with one.
    pub fn plan(&self) -> Result<SessionPlan, DashboardError> {
        let session = self.session.as_deref().map(str::trim).filter(|s| !s.is_empty());
        if self.refresh && session.is_none() {
            return Err(DashboardError::Usage("--refresh requires --session <id>".to_string()));
        }
        if let Some(id) = session {
            return Ok(SessionPlan::Reuse { session_id: id.to_string() });
        }
        match self.message_text() {
            Some(message) => Ok(SessionPlan::Create { message }),
            None => Err(DashboardError::Usage(
                "dashboard <message> | dashboard --session <id> [--refresh]".to_string(),
            )),
        }
    }
}

/// Resolve the plan into a concrete session, creating one remotely if needed.
pub async fn bootstrap_session(api: &dyn AlvaApi, plan: &SessionPlan, timeout: Duration) -> Result<CreatedSession> {
    match plan {
        SessionPlan::Reuse { session_id } => {
            info!("♻️ Reusing session {}", session_id);
            Ok(CreatedSession { session_id: session_id.clone(), session_name: None })
        }
        SessionPlan::Create { message } => {
            debug!(timeout_secs = timeout.as_secs(), "Requesting new dashboard");
            api.create_dashboard(message, timeout).await
        }
    }
}

use log::{debug, info};

/// Stage-scoped logger; records go to the `dispersecore` target with the
/// stage name as a message prefix.
#[derive(Debug, Clone, Copy)]
pub struct LogManager {
    stage: &'static str,
}

impl LogManager {
    pub const fn for_stage(stage: &'static str) -> Self {
        Self { stage }
    }

    fn line(&self, message: &str) -> String {
        format!("[{}] {}", self.stage, message)
    }

    pub fn record(&self, message: &str) {
        info!(target: "dispersecore", "{}", self.line(message));
    }

    pub fn detail(&self, message: &str) {
        debug!(target: "dispersecore", "{}", self.line(message));
    }
}

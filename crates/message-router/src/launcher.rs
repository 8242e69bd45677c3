use tokio::task::JoinHandle;

use tabpilot_core_types::RunId;

use crate::error::RouterError;

/// Handle on a run started in the background.
#[derive(Debug)]
pub struct RunHandle {
    id: RunId,
    task: JoinHandle<()>,
}

impl RunHandle {
    pub fn new(id: RunId, task: JoinHandle<()>) -> Self {
        Self { id, task }
    }

    pub fn id(&self) -> &RunId {
        &self.id
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub async fn join(self) -> Result<(), RouterError> {
        self.task
            .await
            .map_err(|err| RouterError::Join(err.to_string()))
    }
}

/// Starts agent runs on behalf of the router.
pub trait RunLauncher: Send + Sync {
    /// Spawn a run for `prompt` without waiting for it.
    fn launch(&self, prompt: String) -> RunHandle;
}

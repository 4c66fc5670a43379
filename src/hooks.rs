//! Post-update hooks
//!
//! A host registers listeners once at startup and fires them after every
//! successful workspace update.

use tracing::debug;

use crate::integration::IntegrationError;

/// Something to run after the workspace was updated
pub trait UpdateListener {
    fn name(&self) -> &str;

    fn on_workspace_updated(&mut self) -> Result<(), IntegrationError>;
}

/// A listener failure, tagged with the listener name
#[derive(Debug, thiserror::Error)]
#[error("{listener}: {source}")]
pub struct HookError {
    pub listener: String,
    #[source]
    pub source: IntegrationError,
}

/// Ordered set of post-update listeners
#[derive(Default)]
pub struct PostUpdateHooks {
    listeners: Vec<Box<dyn UpdateListener>>,
}

impl PostUpdateHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, listener: Box<dyn UpdateListener>) {
        self.listeners.push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Run every listener in registration order, stopping at the first error
    pub fn fire(&mut self) -> Result<(), HookError> {
        for listener in &mut self.listeners {
            debug!(listener = listener.name(), "Running post-update hook");
            listener
                .on_workspace_updated()
                .map_err(|source| HookError {
                    listener: listener.name().to_string(),
                    source,
                })?;
        }
        Ok(())
    }
}

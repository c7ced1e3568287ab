//! The resource lifecycle contract.

use async_trait::async_trait;
use deploy_adapter_core::{Command, Result, State};

/// Capability contract implemented by every resource type.
///
/// Each operation either completes and leaves the handler's state updated,
/// or fails and leaves the state exactly as it was before the call.
#[async_trait]
pub trait Resource: Send {
    /// Create the remote resource from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is missing, the resource is already
    /// present, or the API call fails.
    async fn create(&mut self) -> Result<()>;

    /// Refresh state from the remote resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource is absent or the API call fails.
    async fn read(&mut self) -> Result<()>;

    /// Push configuration to the existing remote resource.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is missing, the resource is absent,
    /// or the API call fails.
    async fn update(&mut self) -> Result<()>;

    /// Remove the remote resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource is absent or the API call fails.
    async fn delete(&mut self) -> Result<()>;

    /// Borrow the current state.
    fn state(&self) -> &State;

    /// Consume the handler, yielding its state.
    fn into_state(self: Box<Self>) -> State;
}

/// Invoke exactly one lifecycle operation on `resource`.
///
/// # Errors
///
/// Propagates the operation's error.
pub async fn apply(resource: &mut dyn Resource, command: Command) -> Result<()> {
    match command {
        Command::Create => resource.create().await,
        Command::Read => resource.read().await,
        Command::Update => resource.update().await,
        Command::Delete => resource.delete().await,
    }
}

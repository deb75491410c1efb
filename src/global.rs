//! Optional process-wide container handle.
//!
//! The container itself is an explicit value; installing one here is how a
//! process opts into the one-container-per-process convention. There is no
//! way to uninstall: the handle lives for the process.

use once_cell::sync::OnceCell;

use crate::container::Container;
use crate::error::WiringError;

static GLOBAL: OnceCell<Container> = OnceCell::new();

/// Install the process-wide container and return its handle.
///
/// Fails with [WiringError::AlreadyInitialized] when a container has been
/// installed before.
pub fn init(container: Container) -> Result<Container, WiringError> {
    let handle = container.clone();
    GLOBAL
        .set(container)
        .map_err(|_| WiringError::AlreadyInitialized)?;
    Ok(handle)
}

/// The installed container.
///
/// Fails with [WiringError::NotInitialized] until [init] has been called.
pub fn instance() -> Result<Container, WiringError> {
    GLOBAL.get().cloned().ok_or(WiringError::NotInitialized)
}

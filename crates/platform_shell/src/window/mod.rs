//! Native window ownership and message dispatch

pub mod events;
pub mod glfw_shell;
pub mod shell;

use thiserror::Error;

/// Window shell errors
#[derive(Error, Debug)]
pub enum ShellError {
    /// The window system could not register this application
    #[error("window class registration failed: {0}")]
    ClassRegistrationFailed(String),

    /// Window creation was rejected by the platform
    #[error("window creation failed: {0}")]
    WindowCreationFailed(String),

    /// A window-system query or operation failed after creation
    #[error("window system error: {0}")]
    Platform(String),
}

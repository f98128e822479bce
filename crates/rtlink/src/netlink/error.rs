//! Error types for kernel-facing operations.

use std::io;

/// Result type for netlink and ioctl operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the kernel.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error from socket operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A SIOC* request or one of its supporting syscalls failed.
    /// `operation` names the failing call, the way perror would.
    #[error("{operation}: {source}")]
    Ioctl {
        /// The request or syscall that failed (e.g. "SIOCSIFMTU").
        operation: &'static str,
        /// The underlying OS error.
        source: io::Error,
    },

    /// Kernel rejected a netlink request.
    #[error("kernel error: {message} (errno {errno})")]
    Kernel {
        /// The errno value from the kernel.
        errno: i32,
        /// Human-readable error message.
        message: String,
    },

    /// Message was truncated.
    #[error("message truncated: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Expected message length.
        expected: usize,
        /// Actual bytes received.
        actual: usize,
    },

    /// Invalid message format.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Invalid attribute format.
    #[error("invalid attribute: {0}")]
    InvalidAttribute(String),

    /// Interface not found.
    #[error("interface not found: {name}")]
    InterfaceNotFound {
        /// The interface name that was not found.
        name: String,
    },
}

impl Error {
    /// Create a kernel error from a negative errno value.
    pub fn from_errno(errno: i32) -> Self {
        let message = io::Error::from_raw_os_error(-errno).to_string();
        Self::Kernel {
            errno: -errno,
            message,
        }
    }

    /// Create an ioctl error naming the failing request.
    pub fn ioctl(operation: &'static str, source: io::Error) -> Self {
        Self::Ioctl { operation, source }
    }

    /// Create an ioctl error from the current `errno`.
    pub fn last_ioctl(operation: &'static str) -> Self {
        Self::ioctl(operation, io::Error::last_os_error())
    }

    /// Get the errno value if this wraps a kernel or OS error.
    pub fn errno(&self) -> Option<i32> {
        match self {
            Self::Kernel { errno, .. } => Some(*errno),
            Self::Ioctl { source, .. } => source.raw_os_error(),
            Self::Io(source) => source.raw_os_error(),
            _ => None,
        }
    }

    /// Check if this is a "not found" error (ENOENT, ENODEV).
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::InterfaceNotFound { .. } => true,
            other => matches!(other.errno(), Some(2 | 19)),
        }
    }
}

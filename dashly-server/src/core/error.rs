use thiserror::Error;

/// Startup/runtime failures of the server itself
///
/// Request-level failures use [`crate::AppError`]; this type only covers
/// what can go wrong before or outside request handling.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        source: std::io::Error,
    },

    #[error("server terminated: {0}")]
    Serve(#[from] std::io::Error),

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

/// Result alias for server lifecycle code
pub type Result<T> = std::result::Result<T, ServerError>;

//! Error types for the sandbox core

use glam::Vec2;
use thiserror::Error;

use crate::physics::BodyKind;

/// Errors raised by the simulation core.
///
/// Construction errors (`InvalidParameter`, `OutOfBounds`) are contract
/// violations by the caller. Backend errors (`SpaceTornDown`, `MissingBody`)
/// are fatal for the operation that hit them and stop the physics worker.
#[derive(Error, Debug)]
pub enum SandboxError {
    /// A constructor received a value it cannot accept
    #[error("invalid {what}: {value}")]
    InvalidParameter { what: &'static str, value: f32 },

    /// A body was requested outside the world rectangle
    #[error("position {position} lies outside the world bounds")]
    OutOfBounds { position: Vec2 },

    /// The physics space was torn down and can no longer be used
    #[error("physics space has been torn down")]
    SpaceTornDown,

    /// A handle no longer resolves to a backend body
    #[error("{0:?} has no body in the physics space")]
    MissingBody(BodyKind),

    /// The backend thread pool could not be created
    #[error("failed to build physics thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// The physics worker thread could not be started
    #[error("failed to start physics worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    /// The physics worker thread panicked
    #[error("physics worker panicked")]
    WorkerPanicked,
}

impl SandboxError {
    /// Reject a non-positive or non-finite value
    pub(crate) fn require_positive(what: &'static str, value: f32) -> Result<f32> {
        if value.is_finite() && value > 0.0 {
            Ok(value)
        } else {
            Err(SandboxError::InvalidParameter { what, value })
        }
    }
}

pub type Result<T> = std::result::Result<T, SandboxError>;

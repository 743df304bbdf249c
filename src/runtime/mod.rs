//! Runtime - the two timelines and the state they share

mod session;
mod shared;
mod ticker;
mod worker;

pub use session::{scripted_pan, HeadlessSession, SessionSummary};
pub use shared::Simulation;
pub use ticker::Ticker;
pub use worker::PhysicsWorker;

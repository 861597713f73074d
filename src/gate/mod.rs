pub mod session;
pub mod state;

pub use session::GateSession;
pub use state::{ExemptReason, GateState};

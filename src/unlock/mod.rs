pub mod config;
pub mod policy;

pub use config::UnlockConfig;
pub use policy::{UnlockDecision, UnlockPolicy, VelocityViolation};

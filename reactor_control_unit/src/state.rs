//! Cross-tick state owned by the tick loop.

pub mod controller;
pub mod history;
pub mod mode;

pub use controller::ControllerState;

#![cfg_attr(not(feature = "simulator"), no_std)]

pub mod actuator;
pub mod app;
pub mod hold;
pub mod indicator;
pub mod input;

pub use actuator::{Action, Actions, ActuatorController, LockState};
pub use app::NodeApp;
pub use hold::{HoldTracker, ReleaseTimer};
pub use indicator::BindingIndicator;
pub use input::{Button, ButtonEdge, Level};

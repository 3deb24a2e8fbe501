pub mod bytes;
pub mod hex;
pub mod line_buffer;

pub use line_buffer::{Line, LineBuffer};

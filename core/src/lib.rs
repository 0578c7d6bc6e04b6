pub mod error;
pub mod frame;
pub mod keys;
pub mod message;
pub mod session;

pub use error::Error;
pub use message::{Coordinates, ServerMessage};

pub const PORT: u16 = 8080;

//! Application state module

mod forms;
mod notification;
mod session;

pub use forms::*;
pub use notification::*;
pub use session::*;

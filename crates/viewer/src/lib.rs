pub mod config;
pub mod panel;
pub mod session;

pub use config::*;
pub use panel::*;
pub use session::*;

pub mod event_bus;
pub mod frame;
pub mod metrics;
pub mod requests;
pub mod rotation;

pub use event_bus::*;
pub use frame::*;
pub use metrics::*;
pub use requests::*;
pub use rotation::*;

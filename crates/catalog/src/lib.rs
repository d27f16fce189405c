pub mod content;
pub mod image;
pub mod record;
pub mod store;

pub use content::*;
pub use image::*;
pub use record::*;
pub use store::*;

pub mod camera;
pub mod identifier;
pub mod index;
pub mod input;
pub mod mesh;
pub mod picking;
pub mod selection;
pub mod spatial;
pub mod style;

pub use camera::*;
pub use identifier::*;
pub use index::*;
pub use input::*;
pub use mesh::*;
pub use picking::*;
pub use selection::*;
pub use style::*;

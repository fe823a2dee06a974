//! Family tree diagram: layout engine, canvas renderer and the component
//! that ties them to the page.

mod component;
pub mod error;
pub mod layout;
pub mod load;
mod render;
pub mod state;
pub mod style;
pub mod types;

pub use component::FamilyTreeCanvas;
pub use error::{LoadError, TreeError};
pub use layout::{LayoutConfig, layout};
pub use types::{FamilyMember, Person, TreeDocument, TreeLayout};

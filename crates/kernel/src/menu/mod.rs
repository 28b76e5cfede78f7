//! Navigation menu.
//!
//! - [`MasterMenu`]: the validated, declared-once catalogue of pages
//! - [`MenuProjector`]: the per-role filtered copy the shell renders

mod definition;
mod projector;

pub use definition::{MasterMenu, MenuError, MenuGroup, MenuLeaf, MenuNode};
pub use projector::MenuProjector;

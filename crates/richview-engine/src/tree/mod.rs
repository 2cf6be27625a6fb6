//! Tree-position bookkeeping: paths, path resolution, identity keys and the
//! per-pass position index.

pub mod identity;
pub mod path;
pub mod position;
pub mod resolver;

pub use identity::{IdentityRegistry, Key};
pub use path::Path;
pub use position::{Position, PositionIndex};
pub use resolver::{PathResolver, resolve_path};

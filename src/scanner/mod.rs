//! Filesystem integrity checks for content directories.
//!
//! Two hazards are detected: symlinks whose targets have disappeared, and
//! names with uppercase letters that have no lowercase twin. The latter break
//! game servers that look files up by lowercased path. [`repair`] fixes both.

/// Case collision detection.
pub mod case;

/// Dangling symlink detection.
pub mod links;

/// Repair of detected problems.
pub mod repair;

pub use case::find_case_collisions;
pub use links::find_dangling_links;
pub use repair::{RepairError, RepairReport, repair};

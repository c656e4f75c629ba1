//! Parsing of `tsconfig.json` project files and root-file resolution.
//!
//! [`load_config`] reads a project file from the virtual file system into a
//! [`ProjectConfig`] with every path made absolute. [`resolve_root_files`]
//! expands `files`, `include` and `exclude` into the ordered list of root
//! files, remembering why each file was picked up.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, resolve_config_path};
pub use resolve::{effective_root_dir, resolve_root_files, InclusionReason, RootFile};
pub use types::*;

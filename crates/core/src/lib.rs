pub mod config;
pub mod content;
pub mod error;
pub mod nav;
pub mod redirects;
pub mod types;

pub use config::{CONFIG_FILE_NAME, load, load_str};
pub use content::{ContentEntry, ContentIndex};
pub use error::{
    Error, MissingDirectoryError, Problem, RedirectCollisionError, Result, ValidationError,
    ValidationErrors,
};
pub use nav::{NavResolver, ResolvedGroup, ResolvedNavNode, ResolvedNavTree, resolve_autogen_nodes};
pub use redirects::{RedirectRule, RedirectTable};
pub use types::*;


//! Ownership headers and named section markers for path-sync.
//!
//! Two marker kinds live in synced files, both written in the comment syntax
//! of the destination file type:
//!
//! ## Ownership header
//!
//! A single line naming the sync configuration that manages the file:
//!
//! ```text
//! # path-sync copy -n python-template
//! ```
//!
//! Removing the line detaches the file from sync.
//!
//! ## Sections
//!
//! Named blocks whose content the source controls. Everything outside them
//! belongs to the destination:
//!
//! ```text
//! # === DO_NOT_EDIT: path-sync standard ===
//! managed content
//! # === OK_EDIT: path-sync standard ===
//! ```
//!
//! A section id may appear several times. The parts are one logical section
//! and the text between them stays destination-owned.

pub mod error;
pub mod header;
pub mod parser;
pub mod syntax;
pub mod writer;

pub use error::{Error, Result};
pub use header::{TOOL_NAME, config_name, file_config_name, has_marker, stamp, strip};
pub use parser::{Section, SectionPart, has_sections, parse_sections, section_map};
pub use syntax::{CommentStyle, CommentTable};
pub use writer::{
    SYNCED_SECTION_ID, build_sections, changed_sections, replace_sections, wrap_section,
};

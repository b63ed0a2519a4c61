//! File outputs for the command-line collaborator.
//!
//! # Submodules
//!
//! - [`json`]: writes a feed snapshot to a JSON file
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     ├── everything.json
//!     └── climate-change.json
//! ```

pub mod json;

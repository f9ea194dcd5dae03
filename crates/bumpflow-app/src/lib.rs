//! Bumpflow application shell.
//!
//! Stands in for the toolbar, canvas and context menu of an interactive
//! host: a session script drives the editor, and the result is exported as
//! JSON and optionally rendered to SVG.

pub mod cli;
pub mod script;

pub use cli::{Args, load_config, run, run_with};
pub use script::{ScriptError, SessionReport, Step, parse_script, replay};

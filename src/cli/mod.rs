//! CLI module - argument parsing and the interactive applicant form

mod args;
mod prompts;

pub use args::{Cli, Commands};
pub use prompts::*;

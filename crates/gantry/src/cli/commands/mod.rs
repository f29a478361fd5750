//! CLI commands

mod bundle;
mod check;
mod completions;

pub use bundle::BundleCommand;
pub use check::CheckCommand;
pub use completions::CompletionsCommand;

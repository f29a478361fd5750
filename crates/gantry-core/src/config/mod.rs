//! Build layout resolution for React Router projects

pub mod defaults;
mod extract;
mod resolver;
mod types;

pub use defaults::*;
pub use extract::*;
pub use resolver::*;
pub use types::*;

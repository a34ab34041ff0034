pub mod commands;
pub mod context;
pub mod logging;
pub mod repl;

pub use commands::respond;
pub use context::CliContext;
pub use repl::readline;

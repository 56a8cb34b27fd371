//! ykman process boundary
//!
//! Everything that knows about ykman's command line and its stderr messages.

pub mod args;
pub mod classifier;
pub mod invoker;
pub mod runner;

// Public re-exports
pub use args::{build_args, Request, Scope};
pub use classifier::{classify, Outcome};
pub use invoker::Invoker;
pub use runner::{CommandRunner, RawOutput, Termination, YkmanRunner};

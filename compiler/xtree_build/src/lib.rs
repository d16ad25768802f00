//! Fluent builders and normalizing visitors for xtree trees.
//!
//! Trees are assembled from typed [`Node`] handles:
//!
//! - [`BlockBuilder`], [`ConditionBuilder`], [`SwitchBuilder`] and
//!   [`TryCatchFinallyBuilder`] build the structured statements, and
//!   [`using`] wraps a body so a resource is disposed on every exit path;
//! - closure bodies describing calls, constructions and member reads are
//!   normalized by the [`Extractor`], which substitutes parameters through
//!   the [`ParameterReplacer`] and folds what is known at build time;
//! - the [`shortcuts`] module is the short free-function entry point to all
//!   of the above.
//!
//! Construction errors are reported as [`BuildError`] from the finishing
//! call of each builder. Finished trees go to `xtree_eval::compile`.

mod block;
pub mod capture;
mod condition;
mod error;
pub mod extract;
mod node;
mod replace;
pub mod shortcuts;
mod switch;
mod try_catch;

pub use block::BlockBuilder;
pub use capture::{closure, thunk, Captures, Env};
pub use condition::ConditionBuilder;
pub use error::{BuildError, BuildErrorKind, BuildResult};
pub use extract::{ExtractOptions, Extractor, MemberAccess};
pub use node::{
    ArgumentException, Disposable, Dynamic, Exception, HostType, HostValue,
    InvalidOperationException, Node, Task,
};
pub use replace::{replace_parameters, ParameterReplacer};
pub use shortcuts::LoopControl;
pub use switch::SwitchBuilder;
pub use try_catch::{using, TryCatchFinallyBuilder};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Enable with `RUST_LOG=xtree_build=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            // Another subscriber may already be installed by the host.
            let _ = tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .try_init();
        }
    });
}

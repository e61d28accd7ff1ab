//! The statement build reactor.
//!
//! A [`BuildSession`] drives a batch of sources through
//! [`ModelPhase`]s with a barrier between phases:
//!
//! ```text
//! REGISTERED → SOURCE_LINKAGE → STATEMENT_DEFINITION → FULL_DECLARATION → EFFECTIVE_MODEL
//! ```
//!
//! Every phase replays each source through the statement emitter into a
//! [`ContextTreeBuilder`]. The full declaration is merged into a shared
//! [`ContextArena`], where `uses`, include, `augment` and `deviation`
//! processing runs before the arena is frozen.

mod builder;
mod config;
mod context;
mod error;
mod inference;
mod linkage;
mod phase;
mod session;

pub use builder::{ContextTreeBuilder, FragmentNode, StatementFragment};
pub use config::{DEFAULT_MAX_INFERENCE_ROUNDS, ReactorConfig};
pub use context::{ContextArena, ContextId, CopyKind, StatementContext};
pub use error::{LinkageError, ReactorError};
pub use phase::ModelPhase;
pub use session::{BuildSession, SourceId, StatementReactor};

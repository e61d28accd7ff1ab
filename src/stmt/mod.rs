//! Statement vocabulary and the statement event stream
//!
//! The emitters turn a source tree into `start / argument / end` events for
//! a [`StatementWriter`]. Which keywords pass through is decided by the
//! [`StatementDefinitionRegistry`] of the current build phase.

mod definition;
mod emitter;
mod error;
mod prefix;
mod stream;
mod writer;

pub use definition::{
    ArgumentDefinition, BUILTIN_STATEMENTS, DEFINITION_STATEMENTS, DefinitionKind, LINKAGE_STATEMENTS,
    StatementDefinition, StatementDefinitionRegistry, is_valid,
};
pub use emitter::StatementEmitter;
pub use error::EmissionError;
pub use prefix::PrefixToModule;
pub use stream::StatementStreamSource;
pub use writer::{EventRecorder, StatementEvent, StatementWriter};

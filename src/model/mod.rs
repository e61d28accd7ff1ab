//! Declared and effective statements, and the model a reactor run produces.
//!
//! A [`DeclaredStatement`] echoes what the author wrote and is shared by
//! every copy of the same canonical context. An [`EffectiveStatement`] is
//! built per context and holds its declared counterpart.

mod build;
mod declared;
mod effective;
mod error;
mod schema;

pub use declared::DeclaredStatement;
pub use effective::EffectiveStatement;
pub use error::{ContextIdentity, DeclarationError, EffectiveBuildError};
pub use schema::{EffectiveModel, Module, Submodule};

pub(crate) use schema::ModelSource;

pub mod reactor_helpers;
pub mod source_fixtures;

//! Helpers for driving build sessions and walking effective trees.

use std::sync::Arc;

use yangtree::model::EffectiveStatement;
use yangtree::reactor::{BuildSession, ReactorConfig, ReactorError, SourceId, StatementReactor};
use yangtree::source::AstSchemaSource;
use yangtree::{EffectiveModel, SourceIdentifier};

/// Parses a YANG source, panicking on syntax or extraction errors.
pub fn ast(name: &str, text: &str) -> Arc<AstSchemaSource> {
    let name: Arc<str> = Arc::from(name);
    Arc::new(
        AstSchemaSource::parse(&name, text).unwrap_or_else(|e| panic!("failed to parse '{}': {}", name, e)),
    )
}

/// Creates a session with every source registered, in order.
pub fn session_with(sources: &[(&str, &str)], config: ReactorConfig) -> (BuildSession, Vec<SourceId>) {
    let mut session = StatementReactor::new(config).new_build();
    let ids = sources
        .iter()
        .map(|(name, text)| session.add_source(*name, ast(name, text)).unwrap())
        .collect();
    (session, ids)
}

/// Builds a batch with the given configuration.
pub fn try_build_with(sources: &[(&str, &str)], config: ReactorConfig) -> Result<EffectiveModel, ReactorError> {
    let (session, _) = session_with(sources, config);
    session.build()
}

/// Builds a batch sequentially with the default configuration.
pub fn try_build(sources: &[(&str, &str)]) -> Result<EffectiveModel, ReactorError> {
    try_build_with(sources, ReactorConfig::default().with_parallel(false))
}

/// Builds a batch, panicking with the reactor error on failure.
pub fn build(sources: &[(&str, &str)]) -> EffectiveModel {
    try_build(sources).unwrap_or_else(|e| panic!("build failed: {}", e))
}

/// The root statement of the unrevisioned source `name`.
pub fn root<'a>(model: &'a EffectiveModel, name: &str) -> &'a Arc<EffectiveStatement> {
    model
        .get(&SourceIdentifier::new(name, None))
        .unwrap_or_else(|| panic!("Expected source '{}' in the model", name))
}

/// The substatement with built-in keyword `keyword` and argument `argument`.
pub fn child(statement: &EffectiveStatement, keyword: &str, argument: &str) -> Arc<EffectiveStatement> {
    find_child(statement, keyword, argument).unwrap_or_else(|| {
        panic!(
            "Expected '{} {}' below '{}', found {:?}",
            keyword,
            argument,
            statement.keyword(),
            names(statement)
        )
    })
}

pub fn find_child(statement: &EffectiveStatement, keyword: &str, argument: &str) -> Option<Arc<EffectiveStatement>> {
    statement
        .find_all(keyword)
        .find(|s| s.argument() == Some(argument))
        .cloned()
}

/// `keyword argument` of every known substatement.
pub fn names(statement: &EffectiveStatement) -> Vec<String> {
    statement
        .substatements()
        .iter()
        .map(|s| match s.argument() {
            Some(argument) => format!("{} {}", s.keyword().local_name(), argument),
            None => s.keyword().local_name().to_string(),
        })
        .collect()
}

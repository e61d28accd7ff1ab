use crate::source::{AstSchemaSource, DependencyInfo, SourceError, YinDomSource};

use super::definition::StatementDefinitionRegistry;
use super::emitter::StatementEmitter;
use super::prefix::PrefixToModule;
use super::writer::StatementWriter;

/// A source the reactor can replay as a statement event stream, once per
/// phase, with that phase's vocabulary.
pub trait StatementStreamSource: Send + Sync {
    fn dependency_info(&self) -> Result<DependencyInfo, SourceError>;

    fn write_statements(
        &self,
        writer: &mut dyn StatementWriter,
        definitions: &StatementDefinitionRegistry,
        prefixes: Option<&PrefixToModule>,
    ) -> Result<(), SourceError>;
}

impl StatementStreamSource for AstSchemaSource {
    fn dependency_info(&self) -> Result<DependencyInfo, SourceError> {
        Ok(AstSchemaSource::dependency_info(self).clone())
    }

    fn write_statements(
        &self,
        writer: &mut dyn StatementWriter,
        definitions: &StatementDefinitionRegistry,
        prefixes: Option<&PrefixToModule>,
    ) -> Result<(), SourceError> {
        StatementEmitter::new(definitions, prefixes).emit_yang(
            self.name(),
            &self.source_file(),
            self.line_index(),
            writer,
        );
        Ok(())
    }
}

impl StatementStreamSource for YinDomSource {
    fn dependency_info(&self) -> Result<DependencyInfo, SourceError> {
        let document = self.document()?;
        DependencyInfo::from_yin(self.name(), &document)
    }

    fn write_statements(
        &self,
        writer: &mut dyn StatementWriter,
        definitions: &StatementDefinitionRegistry,
        prefixes: Option<&PrefixToModule>,
    ) -> Result<(), SourceError> {
        let document = self.document()?;
        StatementEmitter::new(definitions, prefixes).emit_yin(self.name(), &document, writer);
        Ok(())
    }
}

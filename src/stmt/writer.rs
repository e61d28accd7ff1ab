use crate::base::{QName, StatementSourceReference};

use super::error::EmissionError;

/// Sink for the statement event stream produced by the emitters.
///
/// Events arrive depth-first: `start_statement`, at most one
/// `argument_value`, the children, then `end_statement`.
pub trait StatementWriter {
    fn start_statement(
        &mut self,
        keyword: QName,
        reference: StatementSourceReference,
    ) -> Result<(), EmissionError>;

    fn argument_value(
        &mut self,
        value: String,
        reference: StatementSourceReference,
    ) -> Result<(), EmissionError>;

    fn end_statement(&mut self, reference: StatementSourceReference) -> Result<(), EmissionError>;
}

/// One writer event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementEvent {
    Start(QName),
    Argument(String),
    End,
}

/// A writer that only records the events it receives.
#[derive(Debug, Default)]
pub struct EventRecorder {
    events: Vec<StatementEvent>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[StatementEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<StatementEvent> {
        self.events
    }
}

impl StatementWriter for EventRecorder {
    fn start_statement(&mut self, keyword: QName, _: StatementSourceReference) -> Result<(), EmissionError> {
        self.events.push(StatementEvent::Start(keyword));
        Ok(())
    }

    fn argument_value(&mut self, value: String, _: StatementSourceReference) -> Result<(), EmissionError> {
        self.events.push(StatementEvent::Argument(value));
        Ok(())
    }

    fn end_statement(&mut self, _: StatementSourceReference) -> Result<(), EmissionError> {
        self.events.push(StatementEvent::End);
        Ok(())
    }
}

use std::fmt;

/// Build phases, in execution order. A source "is at" a phase once it has
/// completed that phase's work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ModelPhase {
    Registered,
    SourceLinkage,
    StatementDefinition,
    FullDeclaration,
    EffectiveModel,
}

impl ModelPhase {
    pub const ALL: [ModelPhase; 5] = [
        Self::Registered,
        Self::SourceLinkage,
        Self::StatementDefinition,
        Self::FullDeclaration,
        Self::EffectiveModel,
    ];

    pub fn next(self) -> Option<ModelPhase> {
        match self {
            Self::Registered => Some(Self::SourceLinkage),
            Self::SourceLinkage => Some(Self::StatementDefinition),
            Self::StatementDefinition => Some(Self::FullDeclaration),
            Self::FullDeclaration => Some(Self::EffectiveModel),
            Self::EffectiveModel => None,
        }
    }

    pub fn previous(self) -> Option<ModelPhase> {
        match self {
            Self::Registered => None,
            Self::SourceLinkage => Some(Self::Registered),
            Self::StatementDefinition => Some(Self::SourceLinkage),
            Self::FullDeclaration => Some(Self::StatementDefinition),
            Self::EffectiveModel => Some(Self::FullDeclaration),
        }
    }
}

impl fmt::Display for ModelPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Registered => "REGISTERED",
            Self::SourceLinkage => "SOURCE_LINKAGE",
            Self::StatementDefinition => "STATEMENT_DEFINITION",
            Self::FullDeclaration => "FULL_DECLARATION",
            Self::EffectiveModel => "EFFECTIVE_MODEL",
        };
        f.write_str(name)
    }
}

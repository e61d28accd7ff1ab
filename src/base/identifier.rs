use std::fmt;

use smol_str::SmolStr;
use thiserror::Error;

use super::constants::REVISION_SEPARATOR;

/// A module revision in `YYYY-MM-DD` form.
///
/// Ordering follows the calendar, so the latest revision of a module is
/// simply the maximum.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Revision {
    year: u16,
    month: u8,
    day: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid revision '{0}': expected YYYY-MM-DD")]
pub struct RevisionError(pub String);

impl Revision {
    pub fn parse(text: &str) -> Result<Self, RevisionError> {
        let invalid = || RevisionError(text.to_string());
        let bytes = text.as_bytes();
        if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
            return Err(invalid());
        }
        let year: u16 = text[0..4].parse().map_err(|_| invalid())?;
        let month: u8 = text[5..7].parse().map_err(|_| invalid())?;
        let day: u8 = text[8..10].parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(invalid());
        }
        Ok(Self { year, month, day })
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Stable key for a module or submodule source across every representation.
///
/// Two representations of the same logical source (text, tree, YIN) compare
/// equal as long as they agree on name and revision.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceIdentifier {
    name: SmolStr,
    revision: Option<Revision>,
}

impl SourceIdentifier {
    pub fn new(name: impl Into<SmolStr>, revision: Option<Revision>) -> Self {
        Self {
            name: name.into(),
            revision,
        }
    }

    /// Parse an identifier from a conventional file name such as
    /// `ietf-inet-types@2013-07-15.yang`. The extension is optional.
    pub fn from_file_name(file_name: &str) -> Result<Self, RevisionError> {
        let stem = file_name
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(file_name);
        match stem.split_once(REVISION_SEPARATOR) {
            Some((name, revision)) => Ok(Self::new(name, Some(Revision::parse(revision)?))),
            None => Ok(Self::new(stem, None)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn revision(&self) -> Option<&Revision> {
        self.revision.as_ref()
    }

    /// Revision rendered as text, if present.
    pub fn formatted_revision(&self) -> Option<String> {
        self.revision.as_ref().map(Revision::to_string)
    }
}

impl fmt::Display for SourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.revision {
            Some(revision) => write!(f, "{}{}{}", self.name, REVISION_SEPARATOR, revision),
            None => f.write_str(&self.name),
        }
    }
}

//! At-most-once computation of derived representations.

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::base::SourceIdentifier;

use super::error::SourceError;

/// A derived form computed on first access and published exactly once.
///
/// Concurrent first callers block on the cell while one of them runs the
/// computation; everyone then observes the same published outcome. A failed
/// computation is published too, wrapped as [`SourceError::Transform`], so a
/// broken instance never re-runs expensive work.
pub(crate) struct Memoized<T> {
    cell: OnceLock<Result<Arc<T>, SourceError>>,
}

impl<T> Memoized<T> {
    pub(crate) fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// A cell already holding `value`.
    pub(crate) fn with_value(value: Arc<T>) -> Self {
        Self {
            cell: OnceLock::from(Ok(value)),
        }
    }

    pub(crate) fn get_or_compute(
        &self,
        identifier: &SourceIdentifier,
        compute: impl FnOnce() -> Result<T, SourceError>,
    ) -> Result<Arc<T>, SourceError> {
        self.cell
            .get_or_init(|| {
                compute()
                    .map(Arc::new)
                    .map_err(|cause| SourceError::transform(identifier, cause))
            })
            .clone()
    }

    pub(crate) fn is_computed(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T> fmt::Debug for Memoized<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.cell.get() {
            None => "pending",
            Some(Ok(_)) => "computed",
            Some(Err(_)) => "failed",
        };
        f.write_str(state)
    }
}

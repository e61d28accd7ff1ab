//! Reading schema source files from disk.

use std::path::{Path, PathBuf};

use crate::base::SourceIdentifier;
use crate::base::constants::{SUPPORTED_EXTENSIONS, YANG_FILE_EXTENSION, YIN_FILE_EXTENSION};
use crate::source::{DependencyInfo, SchemaSource, SourceError, YangTextSource, YinDocument, YinDomSource};

/// Recursively collect every `.yang` and `.yin` file below `dir`, sorted.
pub fn collect_file_paths(dir: &Path) -> Result<Vec<PathBuf>, SourceError> {
    let mut paths = Vec::new();
    collect_recursive(dir, &mut paths)?;
    paths.sort();
    Ok(paths)
}

fn collect_recursive(dir: &Path, paths: &mut Vec<PathBuf>) -> Result<(), SourceError> {
    let entries = std::fs::read_dir(dir).map_err(|e| SourceError::io(dir.display().to_string(), &e))?;
    for entry in entries {
        let entry = entry.map_err(|e| SourceError::io(dir.display().to_string(), &e))?;
        let path = entry.path();
        if path.is_dir() {
            collect_recursive(&path, paths)?;
        } else if path.is_file() && validate_extension(&path).is_ok() {
            paths.push(path);
        }
    }
    Ok(())
}

pub fn get_extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|e| e.to_str())
}

/// The extension of `path` if it is a supported schema source extension.
pub fn validate_extension(path: &Path) -> Result<&str, SourceError> {
    let name = path.display().to_string();
    let extension = get_extension(path).ok_or_else(|| SourceError::extraction(&name, "no file extension"))?;
    if SUPPORTED_EXTENSIONS.contains(&extension) {
        Ok(extension)
    } else {
        Err(SourceError::extraction(
            name,
            format!("unsupported file extension '.{extension}'"),
        ))
    }
}

/// Read and parse one file.
pub fn load_source(path: &Path) -> Result<SchemaSource, SourceError> {
    let content = std::fs::read_to_string(path).map_err(|e| SourceError::io(path.display().to_string(), &e))?;
    parse_content(&content, path)
}

/// Parse in-memory content as the kind of source `path` names.
///
/// The identifier comes from the source header. A file name in
/// `name@revision` form that disagrees with it is only warned about.
pub fn parse_content(content: &str, path: &Path) -> Result<SchemaSource, SourceError> {
    let name = path.display().to_string();
    let source = match validate_extension(path)? {
        YANG_FILE_EXTENSION => SchemaSource::from(YangTextSource::from_text(name.as_str(), content)?),
        YIN_FILE_EXTENSION => {
            let document = YinDocument::parse(&name, content)?;
            let identifier = DependencyInfo::from_yin(&name, &document)?.source_identifier();
            SchemaSource::from(YinDomSource::create(identifier, name.as_str(), document))
        }
        other => {
            return Err(SourceError::extraction(
                name,
                format!("unsupported file extension '.{other}'"),
            ));
        }
    };
    check_file_name(path, source.identifier());
    Ok(source)
}

fn check_file_name(path: &Path, identifier: &SourceIdentifier) {
    let Some(file_name) = path.file_name().and_then(|s| s.to_str()) else {
        return;
    };
    match SourceIdentifier::from_file_name(file_name) {
        Ok(expected) if expected.name() != identifier.name() => {
            tracing::warn!(
                "{}: file name suggests module '{}' but source declares '{}'",
                path.display(),
                expected.name(),
                identifier.name()
            );
        }
        Ok(expected) if expected.revision().is_some() && expected.revision() != identifier.revision() => {
            tracing::warn!(
                "{}: file name revision does not match source revision {}",
                path.display(),
                identifier.formatted_revision().unwrap_or_default()
            );
        }
        Ok(_) => {}
        Err(e) => tracing::warn!("{}: {}", path.display(), e),
    }
}

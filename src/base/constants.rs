//! Domain constants shared across layers.

/// Namespace of all built-in RFC 6020 statements (the YIN namespace).
pub const YIN_NAMESPACE: &str = "urn:ietf:params:xml:ns:yang:yin:1";

/// File extension of YANG text sources.
pub const YANG_FILE_EXTENSION: &str = "yang";

/// File extension of YIN (XML) sources.
pub const YIN_FILE_EXTENSION: &str = "yin";

/// Separator between module name and revision in conventional file names.
pub const REVISION_SEPARATOR: char = '@';

/// Supported file extensions for schema sources.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[YANG_FILE_EXTENSION, YIN_FILE_EXTENSION];

/// Fallback source name used when provenance is unknown.
pub const UNKNOWN_SOURCE: &str = "<unknown>";

use serde::{Deserialize, Serialize};

use crate::resolver::ResolvedModule;
use crate::span::SourceSpan;

/// Export declaration kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExportKind {
    Named,
    Default,
    /// `export { x } from './module'` or `export * as ns from './module'`.
    ReExport,
    /// Star re-export: `export * from './module'`.
    ///
    /// Forwards all named exports from the source module except `default`.
    StarReExport,
}

/// One export declaration from a single file.
///
/// Files produce an ordered sequence of these; order matters for duplicate
/// detection and for `export *` first-writer-wins merging, and is irrelevant
/// for name lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRecord {
    /// Exported name; `"default"` for default exports, `"*"` for star
    /// re-exports.
    pub name: String,
    pub kind: ExportKind,
    pub type_only: bool,
    /// Source specifier for re-exports (`export ... from 'source'`).
    pub source: Option<String>,
    /// For `export { a as b } from`, the name as known to the source module
    /// (`a`). `"*"` for `export * as ns from`.
    pub imported_name: Option<String>,
    /// Resolution outcome for `source`; populated during the walk.
    pub resolved_source: Option<ResolvedModule>,
    /// True if the export was recovered from CommonJS assignments
    /// (`module.exports` / `exports.x`).
    pub from_commonjs: bool,
    pub span: SourceSpan,
}

impl ExportRecord {
    /// A locally-defined named or default export.
    pub fn local(name: impl Into<String>, kind: ExportKind, type_only: bool, span: SourceSpan) -> Self {
        Self {
            name: name.into(),
            kind,
            type_only,
            source: None,
            imported_name: None,
            resolved_source: None,
            from_commonjs: false,
            span,
        }
    }

    /// A named re-export: `export { imported as name } from 'source'`.
    pub fn re_export(
        name: impl Into<String>,
        imported: impl Into<String>,
        source: impl Into<String>,
        type_only: bool,
        span: SourceSpan,
    ) -> Self {
        Self {
            name: name.into(),
            kind: ExportKind::ReExport,
            type_only,
            source: Some(source.into()),
            imported_name: Some(imported.into()),
            resolved_source: None,
            from_commonjs: false,
            span,
        }
    }

    /// A star re-export: `export * from 'source'`.
    pub fn star(source: impl Into<String>, type_only: bool, span: SourceSpan) -> Self {
        Self {
            name: "*".to_string(),
            kind: ExportKind::StarReExport,
            type_only,
            source: Some(source.into()),
            imported_name: None,
            resolved_source: None,
            from_commonjs: false,
            span,
        }
    }

    /// Convenience check for default exports.
    pub fn is_default(&self) -> bool {
        matches!(self.kind, ExportKind::Default)
    }

    /// Returns true if the export's value originates from another module.
    pub fn is_re_export(&self) -> bool {
        matches!(self.kind, ExportKind::ReExport | ExportKind::StarReExport)
    }

    /// Returns true for `export * from` declarations.
    pub fn is_star_re_export(&self) -> bool {
        matches!(self.kind, ExportKind::StarReExport)
    }

    /// Returns true for `export * as ns from` declarations.
    pub fn is_namespace_re_export(&self) -> bool {
        matches!(self.kind, ExportKind::ReExport)
            && self.imported_name.as_deref() == Some("*")
    }
}

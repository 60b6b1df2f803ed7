//! Module parser adapter.
//!
//! Wraps the OXC parser to extract one file's import/export facts: every
//! import declaration (static, dynamic with a literal specifier, CommonJS
//! `require`) and every export declaration (named, default, re-export, star
//! re-export, type-only), in source order.
//!
//! Parse failures never crash the engine: the returned [`ModuleFacts`]
//! carries a [`ParseDiagnostic`] and empty record lists, and dependents treat
//! the file as unresolved-equivalent for export-map purposes.

mod visitor;

use std::path::Path;

use oxc_allocator::Allocator;
use oxc_ast_visit::Visit;
use oxc_parser::Parser;
use serde::{Deserialize, Serialize};

use crate::export::ExportRecord;
use crate::import::ImportRecord;
use crate::module_id::ModuleId;
use crate::span::SourceSpan;

/// Source dialect derived from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    JavaScript,
    TypeScript,
    Jsx,
    Tsx,
    Json,
    Unknown,
}

impl SourceKind {
    /// Derive the source kind from a file extension string.
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "js" | "mjs" | "cjs" => Self::JavaScript,
            "ts" | "mts" | "cts" => Self::TypeScript,
            "jsx" => Self::Jsx,
            "tsx" => Self::Tsx,
            "json" => Self::Json,
            _ => Self::Unknown,
        }
    }

    /// Attempt to infer the source kind from a file path.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map_or(Self::Unknown, Self::from_extension)
    }

    /// Returns true if the file is JavaScript/TypeScript based.
    pub fn is_javascript_like(&self) -> bool {
        matches!(
            self,
            Self::JavaScript | Self::TypeScript | Self::Jsx | Self::Tsx
        )
    }
}

/// Parse failure surfaced as a file-level diagnostic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseDiagnostic {
    pub message: String,
    pub span: SourceSpan,
}

/// Import/export facts for one parsed file.
///
/// Immutable once built; owned by the module graph cache.
#[derive(Debug, Clone)]
pub struct ModuleFacts {
    pub module: ModuleId,
    pub source_kind: SourceKind,
    /// Import records in source order.
    pub imports: Vec<ImportRecord>,
    /// Export records in source order.
    pub exports: Vec<ExportRecord>,
    /// Present when the file failed to parse; records are empty then.
    pub parse_error: Option<ParseDiagnostic>,
}

impl ModuleFacts {
    /// Facts for a file excluded from the graph by a parse failure.
    pub fn parse_failed(module: ModuleId, source_kind: SourceKind, diag: ParseDiagnostic) -> Self {
        Self {
            module,
            source_kind,
            imports: Vec::new(),
            exports: Vec::new(),
            parse_error: Some(diag),
        }
    }

    /// Returns true when the file was excluded by a parse failure.
    pub fn is_parse_failed(&self) -> bool {
        self.parse_error.is_some()
    }

    /// True when the file has any star re-export.
    pub fn has_star_exports(&self) -> bool {
        self.exports.iter().any(ExportRecord::is_star_re_export)
    }
}

/// Extract import/export facts from one file's source text.
///
/// JSON modules produce a single synthetic `default` export and no imports.
pub fn parse_module_facts(module: &ModuleId, source_text: &str) -> ModuleFacts {
    let source_kind = SourceKind::from_path(module.as_path());

    if source_kind == SourceKind::Json {
        return visitor::json_module_facts(module.clone(), source_text);
    }

    let source_type = oxc_span::SourceType::from_path(module.as_path())
        .unwrap_or_else(|_| oxc_span::SourceType::ts());

    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source_text, source_type).parse();

    if ret.panicked || !ret.errors.is_empty() {
        let message = ret
            .errors
            .first()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "failed to parse module".to_string());

        return ModuleFacts::parse_failed(
            module.clone(),
            source_kind,
            ParseDiagnostic {
                message,
                span: SourceSpan::new(module.as_path(), 0, 0, 1, 1),
            },
        );
    }

    let mut collector = visitor::FactsVisitor::new(module.as_path(), source_text);
    collector.visit_program(&ret.program);

    let (imports, exports) = collector.finish();

    ModuleFacts {
        module: module.clone(),
        source_kind,
        imports,
        exports,
        parse_error: None,
    }
}

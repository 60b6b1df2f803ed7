use serde::{Deserialize, Serialize};

use crate::resolver::ResolvedModule;
use crate::span::SourceSpan;

/// Individual imported binding within one import statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImportedName {
    /// `import { foo as bar } from 'mod'` — `imported` is the exporter's
    /// name, `local` the binding in the importing file.
    Named {
        imported: String,
        local: String,
        type_only: bool,
    },
    /// `import foo from 'mod'`
    Default { local: String },
    /// `import * as foo from 'mod'`
    Namespace { local: String },
}

impl ImportedName {
    /// The name looked up in the target module's export map, if any.
    ///
    /// Namespace imports have no single name: they reference the whole map.
    pub fn imported_name(&self) -> Option<&str> {
        match self {
            Self::Named { imported, .. } => Some(imported),
            Self::Default { .. } => Some("default"),
            Self::Namespace { .. } => None,
        }
    }

    /// The local binding introduced in the importing file.
    pub fn local_name(&self) -> &str {
        match self {
            Self::Named { local, .. }
            | Self::Default { local }
            | Self::Namespace { local } => local,
        }
    }

    pub fn is_namespace(&self) -> bool {
        matches!(self, Self::Namespace { .. })
    }

    pub fn is_type_only(&self) -> bool {
        matches!(self, Self::Named { type_only: true, .. })
    }
}

/// Mechanism used to load the dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImportKind {
    /// Static `import` declaration.
    Static,
    /// Dynamic `import()` expression with a literal specifier.
    Dynamic,
    /// CommonJS `require()` call.
    Require,
    /// TypeScript `import type` declaration, erased at runtime.
    TypeOnly,
}

impl ImportKind {
    /// Returns `true` for imports that execute at runtime.
    pub fn is_runtime(&self) -> bool {
        !matches!(self, Self::TypeOnly)
    }

    /// Returns `true` for static, eagerly-resolved imports.
    pub fn is_static(&self) -> bool {
        matches!(self, Self::Static | Self::Require | Self::TypeOnly)
    }
}

/// One import statement: specifier, bindings, and resolution outcome.
///
/// Records are created fresh per parse of one file and immutable once built.
/// Duplicate imports of the same module stay separate records in source
/// order; duplicate detection is a rule's job, not the parser's.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRecord {
    /// The specifier string exactly as written in source.
    pub source: String,
    pub kind: ImportKind,
    pub names: Vec<ImportedName>,
    /// Populated during the walk; `None` before resolution ran.
    pub resolved: Option<ResolvedModule>,
    pub span: SourceSpan,
}

impl ImportRecord {
    pub fn new(
        source: impl Into<String>,
        kind: ImportKind,
        names: Vec<ImportedName>,
        span: SourceSpan,
    ) -> Self {
        Self {
            source: source.into(),
            kind,
            names,
            resolved: None,
            span,
        }
    }

    /// Returns `true` for side-effect-only imports (`import 'polyfill'`).
    pub fn is_side_effect_only(&self) -> bool {
        self.names.is_empty() && self.kind.is_runtime()
    }

    /// Returns `true` if the import only contributes types.
    pub fn is_type_only(&self) -> bool {
        matches!(self.kind, ImportKind::TypeOnly)
            || (!self.names.is_empty() && self.names.iter().all(ImportedName::is_type_only))
    }

    /// Check if this is a namespace import (`import * as foo`).
    pub fn is_namespace_import(&self) -> bool {
        self.names.iter().any(ImportedName::is_namespace)
    }
}

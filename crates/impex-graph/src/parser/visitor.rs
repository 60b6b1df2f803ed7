//! AST visitor that collects import/export records.

use std::path::Path;

use oxc_ast::ast::{
    Argument, AssignmentExpression, AssignmentTarget, BindingPattern, BindingPatternKind,
    CallExpression, Declaration, ExportAllDeclaration, ExportDefaultDeclaration,
    ExportNamedDeclaration, Expression, ImportDeclaration, ImportDeclarationSpecifier,
    ImportExpression, ModuleExportName, ObjectPropertyKind, PropertyKey, StaticMemberExpression,
};
use oxc_ast_visit::{walk, Visit};

use crate::export::{ExportKind, ExportRecord};
use crate::import::{ImportKind, ImportRecord, ImportedName};
use crate::module_id::ModuleId;
use crate::parser::{ModuleFacts, SourceKind};
use crate::span::SourceSpan;

pub(super) struct FactsVisitor<'a> {
    file: &'a Path,
    source: &'a str,
    imports: Vec<ImportRecord>,
    exports: Vec<ExportRecord>,
}

impl<'a> FactsVisitor<'a> {
    pub(super) fn new(file: &'a Path, source: &'a str) -> Self {
        Self {
            file,
            source,
            imports: Vec::new(),
            exports: Vec::new(),
        }
    }

    pub(super) fn finish(self) -> (Vec<ImportRecord>, Vec<ExportRecord>) {
        (self.imports, self.exports)
    }

    fn span(&self, span: oxc_span::Span) -> SourceSpan {
        SourceSpan::from_source(self.file, self.source, span.start, span.end)
    }

    /// Collect every identifier bound by a (possibly destructuring) pattern.
    fn collect_binding_names(pattern: &BindingPattern<'_>, out: &mut Vec<String>) {
        match &pattern.kind {
            BindingPatternKind::BindingIdentifier(ident) => {
                out.push(ident.name.to_string());
            }
            BindingPatternKind::ObjectPattern(object) => {
                for prop in &object.properties {
                    Self::collect_binding_names(&prop.value, out);
                }
                if let Some(rest) = &object.rest {
                    Self::collect_binding_names(&rest.argument, out);
                }
            }
            BindingPatternKind::ArrayPattern(array) => {
                for element in array.elements.iter().flatten() {
                    Self::collect_binding_names(element, out);
                }
                if let Some(rest) = &array.rest {
                    Self::collect_binding_names(&rest.argument, out);
                }
            }
            BindingPatternKind::AssignmentPattern(assignment) => {
                Self::collect_binding_names(&assignment.left, out);
            }
        }
    }

    fn declaration_names(decl: &Declaration<'_>) -> (Vec<String>, bool) {
        let mut names = Vec::new();
        let mut type_only = false;

        match decl {
            Declaration::VariableDeclaration(var) => {
                for declarator in &var.declarations {
                    Self::collect_binding_names(&declarator.id, &mut names);
                }
            }
            Declaration::FunctionDeclaration(func) => {
                if let Some(id) = &func.id {
                    names.push(id.name.to_string());
                }
            }
            Declaration::ClassDeclaration(class) => {
                if let Some(id) = &class.id {
                    names.push(id.name.to_string());
                }
            }
            Declaration::TSTypeAliasDeclaration(alias) => {
                names.push(alias.id.name.to_string());
                type_only = true;
            }
            Declaration::TSInterfaceDeclaration(interface) => {
                names.push(interface.id.name.to_string());
                type_only = true;
            }
            Declaration::TSEnumDeclaration(ts_enum) => {
                names.push(ts_enum.id.name.to_string());
            }
            _ => {}
        }

        (names, type_only)
    }

    /// CommonJS export target, if the assignment writes to one.
    fn cjs_target(target: &AssignmentTarget<'_>) -> Option<CjsTarget> {
        let AssignmentTarget::StaticMemberExpression(member) = target else {
            return None;
        };

        if Self::is_module_exports(member) {
            return Some(CjsTarget::ModuleExports);
        }

        // `exports.foo = ...` or `module.exports.foo = ...`
        let writes_through_exports = match &member.object {
            Expression::Identifier(ident) => ident.name == "exports",
            Expression::StaticMemberExpression(inner) => Self::is_module_exports(inner),
            _ => false,
        };

        if writes_through_exports {
            return Some(CjsTarget::Named(member.property.name.to_string()));
        }

        None
    }

    fn is_module_exports(member: &StaticMemberExpression<'_>) -> bool {
        matches!(&member.object, Expression::Identifier(ident) if ident.name == "module")
            && member.property.name == "exports"
    }
}

enum CjsTarget {
    /// `module.exports = ...`
    ModuleExports,
    /// `exports.name = ...` / `module.exports.name = ...`
    Named(String),
}

fn export_name(name: &ModuleExportName<'_>) -> String {
    match name {
        ModuleExportName::IdentifierName(ident) => ident.name.to_string(),
        ModuleExportName::IdentifierReference(ident) => ident.name.to_string(),
        ModuleExportName::StringLiteral(lit) => lit.value.to_string(),
    }
}

impl<'a, 'ast> Visit<'ast> for FactsVisitor<'a> {
    fn visit_import_declaration(&mut self, decl: &ImportDeclaration<'ast>) {
        let statement_type_only = decl.import_kind.is_type();
        let mut names = Vec::new();

        if let Some(specifiers) = &decl.specifiers {
            for spec in specifiers {
                match spec {
                    ImportDeclarationSpecifier::ImportDefaultSpecifier(default_spec) => {
                        names.push(ImportedName::Default {
                            local: default_spec.local.name.to_string(),
                        });
                    }
                    ImportDeclarationSpecifier::ImportNamespaceSpecifier(ns_spec) => {
                        names.push(ImportedName::Namespace {
                            local: ns_spec.local.name.to_string(),
                        });
                    }
                    ImportDeclarationSpecifier::ImportSpecifier(named_spec) => {
                        names.push(ImportedName::Named {
                            imported: export_name(&named_spec.imported),
                            local: named_spec.local.name.to_string(),
                            type_only: statement_type_only || named_spec.import_kind.is_type(),
                        });
                    }
                }
            }
        }

        let kind = if statement_type_only {
            ImportKind::TypeOnly
        } else {
            ImportKind::Static
        };

        self.imports.push(ImportRecord::new(
            decl.source.value.to_string(),
            kind,
            names,
            self.span(decl.span),
        ));
    }

    fn visit_export_named_declaration(&mut self, decl: &ExportNamedDeclaration<'ast>) {
        let statement_type_only = decl.export_kind.is_type();
        let span = self.span(decl.span);

        if let Some(declaration) = &decl.declaration {
            let (names, decl_type_only) = Self::declaration_names(declaration);
            for name in names {
                self.exports.push(ExportRecord::local(
                    name,
                    ExportKind::Named,
                    statement_type_only || decl_type_only,
                    span.clone(),
                ));
            }
        }

        match &decl.source {
            Some(source) => {
                // `export { a, b as c } from './mod'`
                for spec in &decl.specifiers {
                    self.exports.push(ExportRecord::re_export(
                        export_name(&spec.exported),
                        export_name(&spec.local),
                        source.value.to_string(),
                        statement_type_only || spec.export_kind.is_type(),
                        self.span(spec.span),
                    ));
                }
            }
            None => {
                // `export { a, b as c }` referencing local bindings
                for spec in &decl.specifiers {
                    let exported = export_name(&spec.exported);
                    let kind = if exported == "default" {
                        ExportKind::Default
                    } else {
                        ExportKind::Named
                    };
                    self.exports.push(ExportRecord::local(
                        exported,
                        kind,
                        statement_type_only || spec.export_kind.is_type(),
                        self.span(spec.span),
                    ));
                }
            }
        }

        walk::walk_export_named_declaration(self, decl);
    }

    fn visit_export_default_declaration(&mut self, decl: &ExportDefaultDeclaration<'ast>) {
        self.exports.push(ExportRecord::local(
            "default",
            ExportKind::Default,
            false,
            self.span(decl.span),
        ));
        walk::walk_export_default_declaration(self, decl);
    }

    fn visit_export_all_declaration(&mut self, decl: &ExportAllDeclaration<'ast>) {
        let type_only = decl.export_kind.is_type();
        let span = self.span(decl.span);

        match &decl.exported {
            // `export * as ns from './mod'` exposes a single namespace name.
            Some(exported) => self.exports.push(ExportRecord::re_export(
                export_name(exported),
                "*",
                decl.source.value.to_string(),
                type_only,
                span,
            )),
            None => self.exports.push(ExportRecord::star(
                decl.source.value.to_string(),
                type_only,
                span,
            )),
        }
    }

    fn visit_import_expression(&mut self, expr: &ImportExpression<'ast>) {
        // Only literal specifiers are resolvable.
        if let Expression::StringLiteral(lit) = &expr.source {
            self.imports.push(ImportRecord::new(
                lit.value.to_string(),
                ImportKind::Dynamic,
                Vec::new(),
                self.span(expr.span),
            ));
        }
        walk::walk_import_expression(self, expr);
    }

    fn visit_call_expression(&mut self, call: &CallExpression<'ast>) {
        if let Expression::Identifier(callee) = &call.callee {
            if callee.name == "require" {
                if let Some(Argument::StringLiteral(lit)) = call.arguments.first() {
                    self.imports.push(ImportRecord::new(
                        lit.value.to_string(),
                        ImportKind::Require,
                        Vec::new(),
                        self.span(call.span),
                    ));
                }
            }
        }
        walk::walk_call_expression(self, call);
    }

    fn visit_assignment_expression(&mut self, assignment: &AssignmentExpression<'ast>) {
        match Self::cjs_target(&assignment.left) {
            Some(CjsTarget::ModuleExports) => {
                let span = self.span(assignment.span);
                let mut record =
                    ExportRecord::local("default", ExportKind::Default, false, span.clone());
                record.from_commonjs = true;
                self.exports.push(record);

                // `module.exports = { a, b }` also exposes the object's keys.
                if let Expression::ObjectExpression(object) = &assignment.right {
                    for prop in &object.properties {
                        if let ObjectPropertyKind::ObjectProperty(prop) = prop {
                            let name = match &prop.key {
                                PropertyKey::StaticIdentifier(ident) => {
                                    Some(ident.name.to_string())
                                }
                                PropertyKey::StringLiteral(lit) => Some(lit.value.to_string()),
                                _ => None,
                            };
                            if let Some(name) = name {
                                let mut record = ExportRecord::local(
                                    name,
                                    ExportKind::Named,
                                    false,
                                    span.clone(),
                                );
                                record.from_commonjs = true;
                                self.exports.push(record);
                            }
                        }
                    }
                }
            }
            Some(CjsTarget::Named(name)) => {
                let mut record = ExportRecord::local(
                    name,
                    ExportKind::Named,
                    false,
                    self.span(assignment.span),
                );
                record.from_commonjs = true;
                self.exports.push(record);
            }
            None => {}
        }
        walk::walk_assignment_expression(self, assignment);
    }
}

/// JSON modules expose a single synthetic `default` export.
pub(super) fn json_module_facts(module: ModuleId, source_text: &str) -> ModuleFacts {
    let path = module.as_path().to_path_buf();
    let span = SourceSpan::new(&path, 0, source_text.len() as u32, 1, 1);

    ModuleFacts {
        module,
        source_kind: SourceKind::Json,
        imports: Vec::new(),
        exports: vec![ExportRecord::local(
            "default",
            ExportKind::Default,
            false,
            span,
        )],
        parse_error: None,
    }
}

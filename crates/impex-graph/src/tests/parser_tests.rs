use crate::parser::parse_module_facts;
use crate::{ExportKind, ImportKind, ImportedName, SourceKind};

use super::module;

fn parse(path: &str, source: &str) -> crate::ModuleFacts {
    parse_module_facts(&module(path), source)
}

#[test]
fn collects_static_import_forms() {
    let facts = parse(
        "/w/app.ts",
        r#"
import defaultThing, { named, orig as renamed } from './lib';
import * as ns from './ns';
import './polyfill';
"#,
    );

    assert_eq!(facts.imports.len(), 3);

    let first = &facts.imports[0];
    assert_eq!(first.source, "./lib");
    assert_eq!(first.kind, ImportKind::Static);
    assert_eq!(first.names.len(), 3);
    assert!(matches!(&first.names[0], ImportedName::Default { local } if local == "defaultThing"));
    assert!(matches!(
        &first.names[2],
        ImportedName::Named { imported, local, .. } if imported == "orig" && local == "renamed"
    ));

    assert!(facts.imports[1].is_namespace_import());
    assert!(facts.imports[2].is_side_effect_only());
}

#[test]
fn dynamic_import_needs_a_literal_specifier() {
    let facts = parse(
        "/w/app.ts",
        r#"
const a = import('./lazy');
const b = import(somePath);
"#,
    );

    assert_eq!(facts.imports.len(), 1);
    assert_eq!(facts.imports[0].source, "./lazy");
    assert_eq!(facts.imports[0].kind, ImportKind::Dynamic);
}

#[test]
fn require_calls_are_recorded() {
    let facts = parse(
        "/w/app.js",
        r#"
const lib = require('./lib');
const dyn = require(name);
"#,
    );

    assert_eq!(facts.imports.len(), 1);
    assert_eq!(facts.imports[0].kind, ImportKind::Require);
    assert!(facts.imports[0].names.is_empty());
}

#[test]
fn type_only_imports_are_flagged() {
    let facts = parse(
        "/w/app.ts",
        r#"
import type { Props } from './types';
import { type Inline, value } from './mixed';
"#,
    );

    assert_eq!(facts.imports[0].kind, ImportKind::TypeOnly);
    assert!(facts.imports[0].is_type_only());

    let mixed = &facts.imports[1];
    assert_eq!(mixed.kind, ImportKind::Static);
    assert!(matches!(
        &mixed.names[0],
        ImportedName::Named { type_only: true, .. }
    ));
    assert!(matches!(
        &mixed.names[1],
        ImportedName::Named { type_only: false, .. }
    ));
}

#[test]
fn collects_declaration_exports() {
    let facts = parse(
        "/w/lib.ts",
        r#"
export const one = 1;
export const { a, b: renamed } = pair;
export function helper() {}
export class Widget {}
export default helper;
"#,
    );

    let names: Vec<&str> = facts.exports.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["one", "a", "renamed", "helper", "Widget", "default"]);
    assert!(facts.exports.last().unwrap().is_default());
}

#[test]
fn collects_type_declaration_exports() {
    let facts = parse(
        "/w/types.ts",
        r#"
export interface Props { x: number }
export type Alias = string;
export enum Mode { On, Off }
"#,
    );

    assert!(facts.exports[0].type_only);
    assert!(facts.exports[1].type_only);
    assert!(!facts.exports[2].type_only);
}

#[test]
fn collects_re_export_forms() {
    let facts = parse(
        "/w/barrel.ts",
        r#"
export { plain, orig as renamed } from './a';
export * from './b';
export * as grouped from './c';
export { localThing };
"#,
    );

    assert_eq!(facts.exports.len(), 5);

    let renamed = &facts.exports[1];
    assert_eq!(renamed.name, "renamed");
    assert_eq!(renamed.imported_name.as_deref(), Some("orig"));
    assert_eq!(renamed.source.as_deref(), Some("./a"));
    assert_eq!(renamed.kind, ExportKind::ReExport);

    let star = &facts.exports[2];
    assert!(star.is_star_re_export());
    assert_eq!(star.source.as_deref(), Some("./b"));

    let grouped = &facts.exports[3];
    assert!(grouped.is_namespace_re_export());
    assert_eq!(grouped.name, "grouped");

    let local = &facts.exports[4];
    assert_eq!(local.name, "localThing");
    assert!(local.source.is_none());
}

#[test]
fn recovers_commonjs_exports() {
    let facts = parse(
        "/w/legacy.js",
        r#"
module.exports = { alpha, beta: 2 };
exports.gamma = () => {};
module.exports.delta = 4;
"#,
    );

    let names: Vec<&str> = facts.exports.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["default", "alpha", "beta", "gamma", "delta"]);
    assert!(facts.exports.iter().all(|e| e.from_commonjs));
}

#[test]
fn json_module_has_synthetic_default() {
    let facts = parse("/w/data.json", r#"{ "key": "value" }"#);

    assert_eq!(facts.source_kind, SourceKind::Json);
    assert_eq!(facts.exports.len(), 1);
    assert!(facts.exports[0].is_default());
    assert!(facts.imports.is_empty());
}

#[test]
fn parse_failure_yields_diagnostic_and_no_records() {
    let facts = parse("/w/broken.ts", "import { from ;;; <<<");

    assert!(facts.is_parse_failed());
    assert!(facts.imports.is_empty());
    assert!(facts.exports.is_empty());
    let diag = facts.parse_error.unwrap();
    assert!(!diag.message.is_empty());
}

#[test]
fn records_keep_source_order() {
    let facts = parse(
        "/w/order.ts",
        r#"
export const first = 1;
export * from './stars';
export const second = 2;
"#,
    );

    let names: Vec<&str> = facts.exports.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["first", "*", "second"]);
    assert!(facts.exports[0].span.line < facts.exports[2].span.line);
}

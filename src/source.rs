//! Shared oxc parsing entry points and span-splice helpers.

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    Class, Declaration, Decorator, ExportDefaultDeclarationKind, Expression, ObjectExpression,
    Program, Statement, TSModuleBlock, TSModuleDeclaration, TSModuleDeclarationBody,
};
use oxc_parser::Parser;
use oxc_span::SourceType;

use crate::error::{ApiError, Result};

/// A pending text edit: `(start, end, replacement)` in byte offsets of the original text.
pub type Replacement = (u32, u32, String);

pub fn source_type() -> SourceType {
    SourceType::default()
        .with_module(true)
        .with_typescript(true)
}

/// Parses a declaration file, failing with the first diagnostic.
pub fn parse_program<'a>(allocator: &'a Allocator, code: &'a str, file: &str) -> Result<Program<'a>> {
    let ret = Parser::new(allocator, code, source_type()).parse();
    if ret.panicked || !ret.errors.is_empty() {
        let message = ret
            .errors
            .first()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "parser aborted".to_string());
        return Err(ApiError::parse(file, message));
    }
    Ok(ret.program)
}

/// Applies replacements back to front so earlier offsets stay valid.
pub fn apply_replacements(code: &str, mut replacements: Vec<Replacement>) -> String {
    // Sort reverse to apply safely; equal starts keep insertion order when spliced.
    replacements.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));

    let mut result = code.to_string();
    for (start, end, replacement) in replacements {
        result.replace_range((start as usize)..(end as usize), &replacement);
    }
    result
}

/// Widens `[start, end)` to swallow the indentation before it and the line break after it,
/// so deleting a member does not leave a hole of whitespace behind.
pub fn line_extent(code: &str, start: u32, end: u32) -> (u32, u32) {
    let bytes = code.as_bytes();
    let mut s = start as usize;
    while s > 0 && matches!(bytes[s - 1], b' ' | b'\t') {
        s -= 1;
    }
    let mut e = end as usize;
    while e < bytes.len() && matches!(bytes[e], b' ' | b'\t' | b';') {
        e += 1;
    }
    if e < bytes.len() && bytes[e] == b'\n' {
        e += 1;
    } else if e + 1 < bytes.len() && bytes[e] == b'\r' && bytes[e + 1] == b'\n' {
        e += 2;
    }
    (s as u32, e as u32)
}

// ═══════════════════════════════════════════════════════════════════════════════
// CLASS DISCOVERY
// ═══════════════════════════════════════════════════════════════════════════════

/// A class declaration found at the top level or inside (nested) namespaces.
pub struct ClassSite<'b, 'a> {
    pub class: &'b Class<'a>,
    /// Start of the whole statement, including decorators and `export`.
    pub start: u32,
    pub end: u32,
}

impl<'b, 'a> ClassSite<'b, 'a> {
    pub fn name(&self) -> Option<&'a str> {
        self.class.id.as_ref().map(|id| id.name.as_str())
    }

    /// Name of the extended class: `ViewComponent` for both `ViewComponent` and
    /// `nasl.ui.ViewComponent`.
    pub fn super_name(&self) -> Option<&'a str> {
        match self.class.super_class.as_ref()? {
            Expression::Identifier(id) => Some(id.name.as_str()),
            Expression::StaticMemberExpression(member) => Some(member.property.name.as_str()),
            _ => None,
        }
    }
}

/// Every class declaration in source order.
pub fn class_sites<'b, 'a>(program: &'b Program<'a>) -> Vec<ClassSite<'b, 'a>> {
    let mut out = Vec::new();
    collect_class_sites(&program.body, &mut out);
    out
}

fn collect_class_sites<'b, 'a>(stmts: &'b [Statement<'a>], out: &mut Vec<ClassSite<'b, 'a>>) {
    for stmt in stmts {
        match stmt {
            Statement::ClassDeclaration(class) => out.push(site(class, class.span.start, class.span.end)),
            Statement::ExportNamedDeclaration(export) => {
                if let Some(Declaration::ClassDeclaration(class)) = &export.declaration {
                    out.push(site(class, export.span.start, export.span.end));
                }
            }
            Statement::ExportDefaultDeclaration(export) => {
                if let ExportDefaultDeclarationKind::ClassDeclaration(class) = &export.declaration {
                    out.push(site(class, export.span.start, export.span.end));
                }
            }
            Statement::TSModuleDeclaration(module) => {
                if let Some(block) = module_block(module) {
                    collect_class_sites(&block.body, out);
                }
            }
            _ => {}
        }
    }
}

fn site<'b, 'a>(class: &'b Class<'a>, start: u32, end: u32) -> ClassSite<'b, 'a> {
    // `@Dec export class X` starts the export after its decorators.
    let start = class
        .decorators
        .first()
        .map(|d| d.span.start.min(start))
        .unwrap_or(start);
    ClassSite { class, start, end }
}

/// Follows `namespace a.b.c { ... }` down to the block that holds the statements.
pub fn module_block<'b, 'a>(module: &'b TSModuleDeclaration<'a>) -> Option<&'b TSModuleBlock<'a>> {
    match module.body.as_ref()? {
        TSModuleDeclarationBody::TSModuleBlock(block) => Some(block),
        TSModuleDeclarationBody::TSModuleDeclaration(inner) => module_block(inner),
    }
}

/// The innermost block of the first namespace declared in the file.
pub fn first_module_block<'b, 'a>(program: &'b Program<'a>) -> Option<&'b TSModuleBlock<'a>> {
    program.body.iter().find_map(|stmt| match stmt {
        Statement::TSModuleDeclaration(module) => module_block(module),
        _ => None,
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// DECORATORS
// ═══════════════════════════════════════════════════════════════════════════════

/// Name of a decorator written as `@Name` or `@Name(...)`.
pub fn decorator_name<'a>(decorator: &Decorator<'a>) -> Option<&'a str> {
    match &decorator.expression {
        Expression::Identifier(id) => Some(id.name.as_str()),
        Expression::CallExpression(call) => match &call.callee {
            Expression::Identifier(id) => Some(id.name.as_str()),
            _ => None,
        },
        _ => None,
    }
}

/// The object literal passed as first argument, `@Name({ ... })`.
pub fn decorator_object<'b, 'a>(decorator: &'b Decorator<'a>) -> Option<&'b ObjectExpression<'a>> {
    let Expression::CallExpression(call) = &decorator.expression else {
        return None;
    };
    match call.arguments.first()?.as_expression()? {
        Expression::ObjectExpression(obj) => Some(obj),
        _ => None,
    }
}

pub fn find_decorator<'b, 'a>(decorators: &'b [Decorator<'a>], name: &str) -> Option<&'b Decorator<'a>> {
    decorators
        .iter()
        .find(|d| decorator_name(d) == Some(name))
}

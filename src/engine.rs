//! Edit engine.
//!
//! Applies a batch of [`EditAction`]s to the text of one declaration file. Every step
//! re-parses the current text, collects `(start, end, replacement)` splices against the
//! fresh spans and applies them back to front. The file is read once and written once,
//! after the whole batch succeeded and the result re-parsed.

use std::path::Path;

use oxc_allocator::Allocator;
use oxc_ast::ast::{ClassElement, Decorator, MethodDefinitionKind, ObjectPropertyKind, Statement, TSType};
use oxc_span::GetSpan;
use serde_json::Value;
use tracing::{debug, info};

use crate::edit::{AddAction, EditAction, OrderAction, RemoveAction, UpdateAction};
use crate::error::{ApiError, Result};
use crate::format::{serialize, FormatOptions};
use crate::fs::FileSystem;
use crate::kind::{MemberKind, Module, Scope, Shape};
use crate::naming::{gen_title, is_identifier, is_slot_name, normalize_string, slot_sibling_name, upper_first};
use crate::project::SourceSchema;
use crate::sem_type::{parse_type_text, with_type_text};
use crate::source::{
    apply_replacements, class_sites, decorator_name, decorator_object, first_module_block,
    line_extent, parse_program, Replacement,
};
use crate::templates::{method_body, sub_component_code, MemberSeed, SubComponentSeed};

/// Option keys whose string values are code, not text.
pub const RAW_CODE_KEYS: [&str; 4] = ["onChange", "if", "disabledIf", "setter"];

/// Component-level keys that live on `@Component(...)`.
pub const COMPONENT_INFO_KEYS: [&str; 4] = ["title", "group", "icon", "description"];

/// Everything a batch needs besides the file text.
#[derive(Debug, Clone, Default)]
pub struct EditContext {
    pub file: String,
    /// Loaded before the batch when a sub-component is seeded from the source schema.
    pub schema: Option<SourceSchema>,
    pub format: FormatOptions,
}

// ═══════════════════════════════════════════════════════════════════════════════
// FILE-LEVEL OPERATION
// ═══════════════════════════════════════════════════════════════════════════════

/// SHA-256 of the file text, the optimistic concurrency token.
pub fn content_hash(code: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Reads `path`, applies `actions`, formats and writes the file once.
///
/// When `expected_hash` is given, the file must still hash to it when read and right
/// before the write; otherwise the batch fails with [`ApiError::Conflict`].
pub fn apply_edits(
    fs: &dyn FileSystem,
    path: &Path,
    actions: &[EditAction],
    ctx: &EditContext,
    expected_hash: Option<&str>,
) -> Result<bool> {
    let file = path.display().to_string();
    if fs.stat(path)?.is_none() {
        return Err(ApiError::NotFound(format!("file `{}`", file)));
    }

    let code = fs.read_file(path)?;
    let initial_hash = content_hash(&code);
    if let Some(expected) = expected_hash {
        check_hash(&file, expected, &initial_hash)?;
    }

    let edited = apply_actions(&code, actions, ctx)?;
    let output = serialize(&edited, &ctx.format, &file)?;

    if expected_hash.is_some() {
        let current = content_hash(&fs.read_file(path)?);
        check_hash(&file, &initial_hash, &current)?;
    }

    fs.write_file(path, &output)?;
    info!(path = %file, actions = actions.len(), "api file updated");
    Ok(true)
}

fn check_hash(path: &str, expected: &str, actual: &str) -> Result<()> {
    if expected != actual {
        return Err(ApiError::Conflict {
            path: path.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        });
    }
    Ok(())
}

/// Applies every action in order and returns the unformatted result.
pub fn apply_actions(code: &str, actions: &[EditAction], ctx: &EditContext) -> Result<String> {
    let mut code = code.to_string();
    for action in actions {
        debug!(op = action.op(), component = action.component(), "applying edit");
        code = apply_action(&code, action, ctx)?;
    }
    Ok(code)
}

pub fn apply_action(code: &str, action: &EditAction, ctx: &EditContext) -> Result<String> {
    match action {
        EditAction::Add(add) => match add.module {
            Module::SubComponent => add_sub_component(code, add, ctx),
            Module::Info => Err(ApiError::Validation("add of component info".to_string())),
            module => add_member(code, add, member_kind(module)?, ctx),
        },
        EditAction::Update(update) => match update.module {
            Module::Info => update_info(code, update, ctx),
            Module::SubComponent => Err(ApiError::Validation(
                "update of a sub-component, edit its members instead".to_string(),
            )),
            module => update_member(code, update, member_kind(module)?, ctx),
        },
        EditAction::Remove(remove) => match remove.module {
            Module::SubComponent => remove_sub_component(code, remove, ctx),
            Module::Info => Err(ApiError::Validation("remove of component info".to_string())),
            module => remove_member(code, remove, member_kind(module)?, ctx),
        },
        EditAction::Order(order) => order_members(code, order, ctx),
    }
}

fn member_kind(module: Module) -> Result<MemberKind> {
    module
        .member_kind()
        .ok_or_else(|| ApiError::Validation(format!("module {:?}", module)))
}

// ═══════════════════════════════════════════════════════════════════════════════
// SNAPSHOT: OWNED SPANS OF THE CURRENT TEXT
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
struct Entry {
    key: String,
    start: u32,
    end: u32,
}

#[derive(Debug, Clone)]
struct ObjectSpans {
    start: u32,
    entries: Vec<Entry>,
}

#[derive(Debug, Clone)]
struct Decor {
    name: String,
    start: u32,
    end: u32,
    object: Option<ObjectSpans>,
}

#[derive(Debug, Clone)]
struct Member {
    name: Option<String>,
    shape: Option<Shape>,
    decorators: Vec<Decor>,
    start: u32,
    end: u32,
    key: (u32, u32),
    type_annotation: Option<(u32, u32)>,
    value: Option<(u32, u32)>,
    params: Option<(u32, u32)>,
    return_annotation: Option<(u32, u32)>,
    body: Option<(u32, u32)>,
}

impl Member {
    fn has_decorator(&self, name: &str) -> bool {
        self.decorators.iter().any(|d| d.name == name)
    }

    fn decorator(&self, name: &str) -> Option<&Decor> {
        self.decorators.iter().find(|d| d.name == name)
    }

    fn is(&self, kind: MemberKind, name: &str) -> bool {
        let rule = kind.rule();
        self.name.as_deref() == Some(name)
            && self.shape == Some(rule.shape)
            && (rule.shape == Shape::Method || self.has_decorator(rule.decorator))
    }
}

#[derive(Debug, Clone)]
struct ClassSpans {
    name: String,
    start: u32,
    end: u32,
    body: (u32, u32),
    decorators: Vec<Decor>,
    members: Vec<Member>,
}

impl ClassSpans {
    fn member(&self, kind: MemberKind, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.is(kind, name))
    }

    fn has_member_named(&self, name: &str) -> bool {
        self.members.iter().any(|m| m.name.as_deref() == Some(name))
    }

    fn decorator(&self, name: &str) -> Option<&Decor> {
        self.decorators.iter().find(|d| d.name == name)
    }
}

#[derive(Debug, Clone)]
struct Snapshot {
    classes: Vec<ClassSpans>,
    /// `{ ... }` of the innermost namespace block, if the file has one.
    namespace_body: Option<(u32, u32)>,
}

impl Snapshot {
    fn take(code: &str, file: &str) -> Result<Snapshot> {
        let allocator = Allocator::default();
        let program = parse_program(&allocator, code, file)?;

        let classes = class_sites(&program)
            .iter()
            .filter_map(|site| {
                let name = site.name()?.to_string();
                Some(ClassSpans {
                    name,
                    start: site.start,
                    end: site.end,
                    body: (site.class.body.span.start, site.class.body.span.end),
                    decorators: decors(&site.class.decorators),
                    members: site
                        .class
                        .body
                        .body
                        .iter()
                        .map(|el| member_spans(el, code))
                        .collect(),
                })
            })
            .collect();

        let namespace_body = first_module_block(&program).map(|b| (b.span.start, b.span.end));
        Ok(Snapshot {
            classes,
            namespace_body,
        })
    }

    fn class(&self, name: &str) -> Result<&ClassSpans> {
        self.classes
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| ApiError::NotFound(format!("class `{}`", name)))
    }
}

fn decors(decorators: &[Decorator]) -> Vec<Decor> {
    decorators
        .iter()
        .map(|d| Decor {
            name: decorator_name(d).unwrap_or_default().to_string(),
            start: d.span.start,
            end: d.span.end,
            object: decorator_object(d).map(|obj| ObjectSpans {
                start: obj.span.start,
                entries: obj
                    .properties
                    .iter()
                    .filter_map(|p| match p {
                        ObjectPropertyKind::ObjectProperty(prop) => Some(Entry {
                            key: prop.key.static_name()?.to_string(),
                            start: prop.span.start,
                            end: prop.span.end,
                        }),
                        ObjectPropertyKind::SpreadProperty(_) => None,
                    })
                    .collect(),
            }),
        })
        .collect()
}

/// Extends a member end over a trailing `;` so the separator travels with the member.
fn end_with_semicolon(code: &str, end: u32) -> u32 {
    let bytes = code.as_bytes();
    let mut e = end as usize;
    while e < bytes.len() && matches!(bytes[e], b' ' | b'\t') {
        e += 1;
    }
    if e < bytes.len() && bytes[e] == b';' {
        (e + 1) as u32
    } else {
        end
    }
}

fn span_of(span: oxc_span::Span) -> (u32, u32) {
    (span.start, span.end)
}

fn member_start(span_start: u32, decorators: &[Decorator]) -> u32 {
    decorators
        .first()
        .map(|d| d.span.start.min(span_start))
        .unwrap_or(span_start)
}

fn member_spans(element: &ClassElement, code: &str) -> Member {
    match element {
        ClassElement::PropertyDefinition(prop) => Member {
            name: prop.key.static_name().map(|n| n.to_string()),
            shape: Some(Shape::Property),
            decorators: decors(&prop.decorators),
            start: member_start(prop.span.start, &prop.decorators),
            end: end_with_semicolon(code, prop.span.end),
            key: span_of(prop.key.span()),
            type_annotation: prop.type_annotation.as_ref().map(|t| span_of(t.span)),
            value: prop.value.as_ref().map(|v| span_of(v.span())),
            params: None,
            return_annotation: None,
            body: None,
        },
        ClassElement::MethodDefinition(method) => {
            let is_method = method.kind == MethodDefinitionKind::Method;
            Member {
                name: method.key.static_name().map(|n| n.to_string()),
                shape: is_method.then_some(Shape::Method),
                decorators: decors(&method.decorators),
                start: member_start(method.span.start, &method.decorators),
                end: end_with_semicolon(code, method.span.end),
                key: span_of(method.key.span()),
                type_annotation: None,
                value: None,
                params: Some(span_of(method.value.params.span)),
                return_annotation: method.value.return_type.as_ref().map(|r| span_of(r.span)),
                body: method.value.body.as_ref().map(|b| span_of(b.span)),
            }
        }
        other => {
            let span = other.span();
            Member {
                name: other.static_name().map(|n| n.to_string()),
                shape: None,
                decorators: vec![],
                start: span.start,
                end: end_with_semicolon(code, span.end),
                key: (span.start, span.start),
                type_annotation: None,
                value: None,
                params: None,
                return_annotation: None,
                body: None,
            }
        }
    }
}

fn splice(code: &str, replacements: Vec<Replacement>, file: &str) -> Result<String> {
    let out = apply_replacements(code, replacements);
    // Each step must leave the text parseable so the next one can re-read its spans.
    let allocator = Allocator::default();
    parse_program(&allocator, &out, file)?;
    Ok(out)
}

fn not_found(kind: MemberKind, name: &str, class: &str) -> ApiError {
    ApiError::NotFound(format!("{} `{}` in class `{}`", kind, name, class))
}

fn validate_member_name(kind: MemberKind, name: &str) -> Result<()> {
    let valid = match kind {
        MemberKind::Slot => is_slot_name(name),
        _ => is_identifier(name),
    };
    if valid {
        Ok(())
    } else {
        Err(ApiError::Validation(format!("{} name `{}`", kind, name)))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ADD MEMBER
// ═══════════════════════════════════════════════════════════════════════════════

fn add_member(code: &str, action: &AddAction, kind: MemberKind, ctx: &EditContext) -> Result<String> {
    let raw = action
        .data
        .name
        .as_deref()
        .or_else(|| action.data.schema.as_ref().and_then(|s| s.name.as_deref()))
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::Validation(format!("{} without a name", kind)))?;
    let name = kind.normalize(raw);
    validate_member_name(kind, &name)?;

    let class_name = kind.class_name(&action.name);
    let members = kind.template(&MemberSeed {
        name: &name,
        group: action.data.group.as_deref(),
        import: action.data.schema.as_ref(),
    });

    {
        let snapshot = Snapshot::take(code, &ctx.file)?;
        let class = snapshot.class(&class_name)?;
        for (member_name, _) in &members {
            if class.has_member_named(member_name) {
                return Err(ApiError::Duplicate(format!(
                    "{} `{}` in class `{}`",
                    kind, member_name, class_name
                )));
            }
        }
    }

    let mut code = code.to_string();
    for (_, member_code) in &members {
        code = insert_member(&code, &class_name, kind, member_code, &ctx.file)?;
    }
    Ok(code)
}

/// Inserts after the last member of the same kind, or at the end of the class body.
fn insert_member(code: &str, class_name: &str, kind: MemberKind, member_code: &str, file: &str) -> Result<String> {
    let snapshot = Snapshot::take(code, file)?;
    let class = snapshot.class(class_name)?;
    let rule = kind.rule();

    let last_same_kind = class
        .members
        .iter()
        .filter(|m| m.shape == Some(rule.shape) && m.has_decorator(rule.decorator))
        .last();

    let replacement = match last_same_kind {
        Some(last) => (last.end, last.end, format!("\n\n{}", member_code.trim_end())),
        None => {
            let close = class.body.1 - 1;
            (close, close, format!("\n{}\n", member_code.trim_end()))
        }
    };
    splice(code, vec![replacement], file)
}

// ═══════════════════════════════════════════════════════════════════════════════
// SUB-COMPONENTS
// ═══════════════════════════════════════════════════════════════════════════════

fn sub_component_seed(action: &AddAction, ctx: &EditContext) -> Result<SubComponentSeed> {
    let data = &action.data;

    if let Some(source_name) = data.source_name.as_deref().filter(|s| !s.is_empty()) {
        let schema = ctx
            .schema
            .as_ref()
            .ok_or_else(|| ApiError::NotFound("source schema of the project".to_string()))?;
        let source = schema.component(source_name).ok_or_else(|| {
            ApiError::NotFound(format!("component `{}` in the source schema", source_name))
        })?;

        let prefix = schema
            .write
            .as_ref()
            .and_then(|w| w.prefix.as_deref())
            .unwrap_or_default();
        let platform = schema
            .write
            .as_ref()
            .and_then(|w| w.platform.clone())
            .or_else(|| data.platform.clone())
            .unwrap_or_else(|| "pc".to_string());

        return Ok(SubComponentSeed {
            name: format!("{}{}", upper_first(prefix), source_name),
            title: gen_title(source_name),
            description: source.description.clone().unwrap_or_default(),
            platform,
            source_name: Some(source_name.to_string()),
        });
    }

    let name = data
        .name
        .clone()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::Validation("sub-component without a name".to_string()))?;
    Ok(SubComponentSeed {
        name,
        title: data.title.clone().unwrap_or_default(),
        description: data.description.clone().unwrap_or_default(),
        platform: data.platform.clone().unwrap_or_else(|| "pc".to_string()),
        source_name: None,
    })
}

fn add_sub_component(code: &str, action: &AddAction, ctx: &EditContext) -> Result<String> {
    let seed = sub_component_seed(action, ctx)?;
    if !is_identifier(&seed.name) {
        return Err(ApiError::Validation(format!("component name `{}`", seed.name)));
    }

    let snapshot = Snapshot::take(code, &ctx.file)?;
    let options_name = Scope::Options.class_name(&seed.name);
    for taken in [&seed.name, &options_name] {
        if snapshot.classes.iter().any(|c| &c.name == taken) {
            return Err(ApiError::Duplicate(format!("class `{}`", taken)));
        }
    }

    let text = sub_component_code(&seed);
    let replacement = match snapshot.namespace_body {
        Some((_, end)) => (end - 1, end - 1, format!("\n{}", text)),
        None => {
            let end = code.len() as u32;
            (end, end, format!("\n{}", text))
        }
    };
    splice(code, vec![replacement], &ctx.file)
}

fn remove_sub_component(code: &str, action: &RemoveAction, ctx: &EditContext) -> Result<String> {
    let name = action
        .data
        .as_ref()
        .and_then(|d| d.name.as_deref())
        .or(action.prop_name.as_deref())
        .ok_or_else(|| ApiError::Validation("sub-component removal without a name".to_string()))?;

    let snapshot = Snapshot::take(code, &ctx.file)?;
    let options_name = Scope::Options.class_name(name);
    let replacements: Vec<Replacement> = snapshot
        .classes
        .iter()
        .filter(|c| c.name == name || c.name == options_name)
        .map(|c| {
            let (s, e) = line_extent(code, c.start, c.end);
            (s, e, String::new())
        })
        .collect();

    if replacements.is_empty() {
        return Err(ApiError::NotFound(format!("sub-component `{}`", name)));
    }
    splice(code, replacements, &ctx.file)
}

// ═══════════════════════════════════════════════════════════════════════════════
// REMOVE MEMBER
// ═══════════════════════════════════════════════════════════════════════════════

fn remove_member(code: &str, action: &RemoveAction, kind: MemberKind, ctx: &EditContext) -> Result<String> {
    let raw = action
        .prop_name
        .as_deref()
        .or_else(|| action.data.as_ref().and_then(|d| d.name.as_deref()))
        .ok_or_else(|| ApiError::Validation(format!("{} removal without a name", kind)))?;
    let name = kind.normalize(raw);
    let class_name = kind.class_name(&action.name);

    let snapshot = Snapshot::take(code, &ctx.file)?;
    let class = snapshot.class(&class_name)?;
    let member = class
        .member(kind, &name)
        .ok_or_else(|| not_found(kind, &name, &class_name))?;

    let mut replacements = vec![removal(code, member)];

    if kind == MemberKind::Slot {
        if let Some(twin) = slot_twin(class, &name) {
            replacements.push(removal(code, twin));
        }
    }

    splice(code, replacements, &ctx.file)
}

/// The other half of a hyphenated slot pair, looked up from either name.
fn slot_twin<'c>(class: &'c ClassSpans, name: &str) -> Option<&'c Member> {
    let mut properties = class
        .members
        .iter()
        .filter(|m| m.shape == Some(Shape::Property));
    match slot_sibling_name(name) {
        // The camel-cased twin may predate decorated siblings, so match by name only.
        Some(sibling) => properties.find(|m| m.name.as_deref() == Some(sibling.as_str())),
        None => properties
            .filter(|m| m.has_decorator(MemberKind::Slot.rule().decorator))
            .find(|m| {
                m.name
                    .as_deref()
                    .and_then(slot_sibling_name)
                    .map(|camel| camel == name)
                    .unwrap_or(false)
            }),
    }
}

fn removal(code: &str, member: &Member) -> Replacement {
    let (s, e) = line_extent(code, member.start, member.end);
    (s, e, String::new())
}

// ═══════════════════════════════════════════════════════════════════════════════
// UPDATE MEMBER
// ═══════════════════════════════════════════════════════════════════════════════

fn update_member(code: &str, action: &UpdateAction, kind: MemberKind, ctx: &EditContext) -> Result<String> {
    let raw = action
        .prop_name
        .as_deref()
        .ok_or_else(|| ApiError::Validation(format!("{} update without propName", kind)))?;
    let name = kind.normalize(raw);
    let class_name = kind.class_name(&action.name);

    {
        let snapshot = Snapshot::take(code, &ctx.file)?;
        snapshot
            .class(&class_name)?
            .member(kind, &name)
            .ok_or_else(|| not_found(kind, &name, &class_name))?;
    }

    let mut code = code.to_string();
    let target = Target {
        kind,
        class_name: &class_name,
        file: &ctx.file,
    };

    for (key, value) in &action.data {
        if matches!(key.as_str(), "name" | "tsType" | "defaultValue") {
            continue;
        }
        code = target.set_option(&code, &name, key, value)?;
    }

    if let Some(value) = action.data.get("defaultValue") {
        code = target.set_default_value(&code, &name, value)?;
    }

    if let Some(ts_type) = action.data.get("tsType").and_then(Value::as_str).filter(|t| !t.trim().is_empty()) {
        code = target.set_type(&code, &name, ts_type)?;
    }

    if let Some(new_name) = action.data.get("name").and_then(Value::as_str).filter(|n| !n.is_empty()) {
        code = target.rename(&code, &name, new_name)?;
    }

    Ok(code)
}

/// One member kind inside one class.
struct Target<'t> {
    kind: MemberKind,
    class_name: &'t str,
    file: &'t str,
}

impl<'t> Target<'t> {
    fn with_member<F>(&self, code: &str, name: &str, f: F) -> Result<String>
    where
        F: FnOnce(&ClassSpans, &Member) -> Result<Vec<Replacement>>,
    {
        let snapshot = Snapshot::take(code, self.file)?;
        let class = snapshot.class(self.class_name)?;
        let member = class
            .member(self.kind, name)
            .ok_or_else(|| not_found(self.kind, name, self.class_name))?;
        let replacements = f(class, member)?;
        splice(code, replacements, self.file)
    }

    fn set_option(&self, code: &str, name: &str, key: &str, value: &Value) -> Result<String> {
        let decorator = self.kind.rule().decorator;
        self.with_member(code, name, |_, member| {
            let decor = member
                .decorator(decorator)
                .ok_or_else(|| ApiError::NotFound(format!("@{} on `{}`", decorator, name)))?;
            Ok(option_edit(code, decor, key, value))
        })
    }

    fn set_default_value(&self, code: &str, name: &str, value: &Value) -> Result<String> {
        let text = match value {
            Value::Null => return Ok(code.to_string()),
            Value::String(s) => s.trim().trim_end_matches(';').trim().to_string(),
            other => js_literal(other),
        };
        if !text.is_empty() && !is_expression(&text) {
            return Err(ApiError::Validation(format!("default value `{}` of `{}`", text, name)));
        }

        self.with_member(code, name, |_, member| {
            if member.shape != Some(Shape::Property) {
                return Err(ApiError::Validation(format!(
                    "default value on {} `{}`",
                    self.kind, name
                )));
            }
            let anchor = member
                .type_annotation
                .map(|t| t.1)
                .unwrap_or_else(|| key_end(code, member));
            Ok(match (member.value, text.is_empty()) {
                (Some((_, end)), true) => vec![(anchor, end, String::new())],
                (Some((start, end)), false) => vec![(start, end, text)],
                (None, true) => vec![],
                (None, false) => vec![(anchor, anchor, format!(" = {}", text))],
            })
        })
    }

    fn set_type(&self, code: &str, name: &str, ts_type: &str) -> Result<String> {
        match self.kind {
            MemberKind::Method => {
                let signature = parse_signature(ts_type)?;
                self.with_member(code, name, |_, member| {
                    let params = member
                        .params
                        .ok_or_else(|| not_found(self.kind, name, self.class_name))?;
                    let mut out = vec![(params.0, params.1, format!("({})", signature.params))];
                    let ret = format!(": {}", signature.return_type);
                    match member.return_annotation {
                        Some((s, e)) => out.push((s, e, ret)),
                        None => out.push((params.1, params.1, ret)),
                    }
                    if let Some((s, e)) = member.body {
                        let body = method_body(signature.returns_value);
                        out.push((s, e, format!("{{\n{}}}", body)));
                    }
                    Ok(out)
                })
            }
            kind => {
                validate_property_type(kind, ts_type)?;
                let text = ts_type.trim().to_string();
                self.with_member(code, name, |_, member| {
                    Ok(match member.type_annotation {
                        Some((s, e)) => vec![(s, e, format!(": {}", text))],
                        None => {
                            let at = key_end(code, member);
                            vec![(at, at, format!(": {}", text))]
                        }
                    })
                })
            }
        }
    }

    fn rename(&self, code: &str, name: &str, new_name: &str) -> Result<String> {
        let new_name = self.kind.normalize(new_name);
        if new_name == name {
            return Ok(code.to_string());
        }
        validate_member_name(self.kind, &new_name)?;

        self.with_member(code, name, |class, member| {
            if class.has_member_named(&new_name) {
                return Err(ApiError::Duplicate(format!(
                    "{} `{}` in class `{}`",
                    self.kind, new_name, self.class_name
                )));
            }
            let key = if is_identifier(&new_name) {
                new_name.clone()
            } else {
                format!("'{}'", normalize_string(&new_name))
            };
            Ok(vec![(member.key.0, member.key.1, key)])
        })
    }
}

/// End of the key, past an optional `?` marker.
fn key_end(code: &str, member: &Member) -> u32 {
    let end = member.key.1;
    if code.as_bytes().get(end as usize) == Some(&b'?') {
        end + 1
    } else {
        end
    }
}

fn validate_property_type(kind: MemberKind, ts_type: &str) -> Result<()> {
    if kind != MemberKind::Slot {
        parse_type_text(ts_type)?;
        return Ok(());
    }
    // Slots return `Array<nasl.ui.ViewComponent>`; only the scope parameter is typed.
    with_type_text(ts_type, |ty, source| {
        let TSType::TSFunctionType(func) = ty else {
            return Err(ApiError::Validation(format!("slot type `{}` is not a function", ts_type)));
        };
        if let Some(param) = func.params.items.first() {
            let scope = match &param.type_annotation {
                Some(ann) => crate::sem_type::from_source_syntax(&ann.type_annotation, source)?,
                None => return Ok(()),
            };
            if !scope.is_struct() {
                return Err(ApiError::Validation(format!(
                    "slot scope `{}` must be a struct",
                    scope
                )));
            }
        }
        Ok(())
    })
}

struct Signature {
    params: String,
    return_type: String,
    returns_value: bool,
}

/// Reads a method signature written as a function type, `(a: T) => R`.
fn parse_signature(ts_type: &str) -> Result<Signature> {
    with_type_text(ts_type, |ty, source| {
        let TSType::TSFunctionType(func) = ty else {
            return Err(ApiError::Validation(format!("method type `{}` is not a function", ts_type)));
        };
        for param in &func.params.items {
            if let Some(ann) = &param.type_annotation {
                crate::sem_type::from_source_syntax(&ann.type_annotation, source)?;
            }
        }
        let (return_type, _) =
            crate::sem_type::return_type_of(&func.return_type.type_annotation, source)?;
        let params = func
            .params
            .items
            .iter()
            .map(|p| p.span.source_text(source).to_string())
            .collect::<Vec<_>>()
            .join(", ");
        Ok(Signature {
            params,
            return_type: func.return_type.type_annotation.span().source_text(source).to_string(),
            returns_value: return_type.is_some(),
        })
    })
}

/// True when `text` is a single expression.
fn is_expression(text: &str) -> bool {
    let code = format!("const __value = {};", text);
    let allocator = Allocator::default();
    match parse_program(&allocator, &code, "<default>") {
        Ok(program) => {
            program.body.len() == 1 && matches!(program.body.first(), Some(Statement::VariableDeclaration(_)))
        }
        Err(_) => false,
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DECORATOR OPTIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Splices that set (or with `null`, delete) `key` inside a decorator's options object.
fn option_edit(code: &str, decor: &Decor, key: &str, value: &Value) -> Vec<Replacement> {
    let Some(object) = &decor.object else {
        if value.is_null() {
            return vec![];
        }
        return vec![(
            decor.start,
            decor.end,
            format!("@{}({{\n{}: {},\n}})", decor.name, object_key(key), option_value(key, value)),
        )];
    };

    let position = object.entries.iter().position(|e| e.key == key);
    match (position, value.is_null()) {
        (None, true) => vec![],
        (Some(i), false) => {
            let entry = &object.entries[i];
            vec![(entry.start, entry.end, format!("{}: {}", object_key(key), option_value(key, value)))]
        }
        (None, false) => {
            let text = format!("{}: {}", object_key(key), option_value(key, value));
            match object.entries.last() {
                Some(last) => vec![(last.end, last.end, format!(",\n{}", text))],
                None => vec![(object.start + 1, object.start + 1, format!("\n{},\n", text))],
            }
        }
        (Some(i), true) => {
            let entry = &object.entries[i];
            if let Some(next) = object.entries.get(i + 1) {
                vec![(entry.start, next.start, String::new())]
            } else if i > 0 {
                vec![(object.entries[i - 1].end, entry.end, String::new())]
            } else {
                vec![(entry.start, skip_comma(code, entry.end), String::new())]
            }
        }
    }
}

fn skip_comma(code: &str, end: u32) -> u32 {
    let bytes = code.as_bytes();
    let mut e = end as usize;
    while e < bytes.len() && bytes[e].is_ascii_whitespace() {
        e += 1;
    }
    if e < bytes.len() && bytes[e] == b',' {
        (e + 1) as u32
    } else {
        end
    }
}

fn object_key(key: &str) -> String {
    if is_identifier(key) {
        key.to_string()
    } else {
        format!("'{}'", normalize_string(key))
    }
}

fn option_value(key: &str, value: &Value) -> String {
    match value {
        Value::String(code) if RAW_CODE_KEYS.contains(&key) => code.clone(),
        other => js_literal(other),
    }
}

/// JSON value as a TypeScript literal with single-quoted strings.
pub fn js_literal(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("'{}'", normalize_string(s)),
        Value::Array(items) => format!(
            "[{}]",
            items.iter().map(js_literal).collect::<Vec<_>>().join(", ")
        ),
        Value::Object(map) if map.is_empty() => "{}".to_string(),
        Value::Object(map) => format!(
            "{{ {} }}",
            map.iter()
                .map(|(k, v)| format!("{}: {}", object_key(k), js_literal(v)))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPONENT INFO
// ═══════════════════════════════════════════════════════════════════════════════

fn update_info(code: &str, action: &UpdateAction, ctx: &EditContext) -> Result<String> {
    let mut code = code.to_string();
    for (key, value) in &action.data {
        let targets: &[&str] = if COMPONENT_INFO_KEYS.contains(&key.as_str()) {
            &["Component"]
        } else {
            &["ExtensionComponent", "IDEExtraInfo"]
        };

        let snapshot = Snapshot::take(&code, &ctx.file)?;
        let class = snapshot.class(&action.name)?;
        let present: Vec<&Decor> = targets.iter().filter_map(|t| class.decorator(t)).collect();

        code = if present.is_empty() {
            if value.is_null() {
                continue;
            }
            let decorator = format!(
                "@{}({{\n{}: {},\n}})\n",
                targets[0],
                object_key(key),
                option_value(key, value)
            );
            splice(&code, vec![(class.start, class.start, decorator)], &ctx.file)?
        } else {
            let mut next = code.clone();
            // Edit one decorator at a time; spans shift after each splice.
            for name in targets {
                let snapshot = Snapshot::take(&next, &ctx.file)?;
                let class = snapshot.class(&action.name)?;
                if let Some(decor) = class.decorator(name) {
                    let replacements = option_edit(&next, decor, key, value);
                    next = splice(&next, replacements, &ctx.file)?;
                }
            }
            next
        };
    }
    Ok(code)
}

// ═══════════════════════════════════════════════════════════════════════════════
// ORDER
// ═══════════════════════════════════════════════════════════════════════════════

fn order_members(code: &str, action: &OrderAction, ctx: &EditContext) -> Result<String> {
    let scope = if action.data.is_options {
        Scope::Options
    } else {
        Scope::Instance
    };
    let class_name = scope.class_name(&action.name);

    let snapshot = Snapshot::take(code, &ctx.file)?;
    let class = snapshot.class(&class_name)?;
    let Some(last) = class.members.last() else {
        return Ok(code.to_string());
    };

    // Each chunk carries the whitespace and comments that precede its member.
    let mut chunk_start = class.body.0 + 1;
    let mut chunks: Vec<(usize, &str)> = Vec::with_capacity(class.members.len());
    for member in &class.members {
        let rank = member
            .name
            .as_deref()
            .and_then(|n| action.data.names.iter().position(|x| x == n))
            .unwrap_or(usize::MAX);
        chunks.push((rank, &code[chunk_start as usize..member.end as usize]));
        chunk_start = member.end;
    }
    chunks.sort_by_key(|(rank, _)| *rank);

    let body: String = chunks.iter().map(|(_, text)| *text).collect();
    splice(code, vec![(class.body.0 + 1, last.end, body)], &ctx.file)
}

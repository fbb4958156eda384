//! Declaration reader.
//!
//! Finds the classes extending `ViewComponent`, reads their decorators and the members of
//! each class and its `<Name>Options` companion, and derives a [`SemType`] per member.

use std::collections::BTreeMap;

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    ArrayExpressionElement, ClassElement, Decorator, Expression, FormalParameter,
    MethodDefinition, MethodDefinitionKind, ObjectExpression, ObjectPropertyKind,
    PropertyDefinition, TSType,
};
use oxc_span::GetSpan;
use oxc_syntax::operator::UnaryOperator;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::annotation::{self, TypeAnnotation};
use crate::error::Result;
use crate::sem_type::{from_source_syntax, return_type_of, Field, SemType};
use crate::source::{class_sites, decorator_name, decorator_object, find_decorator, parse_program, ClassSite};

pub const VIEW_COMPONENT: &str = "ViewComponent";
pub const OPTIONS_SUFFIX: &str = "Options";

/// Class decorators that carry component-level settings.
pub const COMPONENT_DECORATORS: [&str; 3] = ["Component", "ExtensionComponent", "IDEExtraInfo"];

// ═══════════════════════════════════════════════════════════════════════════════
// DECLARATION TYPES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDeclaration {
    pub name: String,
    pub title: String,
    pub description: String,
    /// Target platform tag: `pc`, `h5` or `both`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ideusage: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub props: Vec<PropDeclaration>,
    pub events: Vec<EventDeclaration>,
    pub slots: Vec<SlotDeclaration>,
    pub methods: Vec<MethodDeclaration>,
    pub readable_props: Vec<ReadablePropDeclaration>,
    pub children: Vec<ComponentDeclaration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_map: Option<TypeMap>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropDeclaration {
    pub name: String,
    pub title: String,
    pub description: String,
    pub ts_type: Option<String>,
    pub sem_type: SemType,
    pub type_annotation: Option<TypeAnnotation>,
    pub default_value: Option<String>,
    pub sync: bool,
    pub settable: bool,
    pub bind_hide: bool,
    pub bind_open: bool,
    pub group: Option<String>,
    pub setter: Option<Value>,
    /// Remaining `@Prop({...})` entries, evaluated.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDeclaration {
    pub name: String,
    pub title: String,
    pub description: String,
    pub ts_type: Option<String>,
    pub payload: SemType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotDeclaration {
    pub name: String,
    pub title: String,
    pub description: String,
    pub ts_type: Option<String>,
    pub scope: Option<SemType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodParam {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: SemType,
    pub default_value: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodDeclaration {
    pub name: String,
    pub title: String,
    pub description: String,
    /// Signature as written, `(a: T) => R`.
    pub ts_type: String,
    pub params: Vec<MethodParam>,
    /// `None` is `void`.
    pub return_type: Option<SemType>,
    pub sync: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadablePropDeclaration {
    pub name: String,
    pub title: String,
    pub description: String,
    pub ts_type: Option<String>,
    pub sem_type: SemType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodType {
    pub params: Vec<Field>,
    pub return_type: Option<SemType>,
}

/// Per-member types keyed by member name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeMap {
    pub prop: BTreeMap<String, SemType>,
    pub event: BTreeMap<String, SemType>,
    pub slot: BTreeMap<String, Option<SemType>>,
    pub method: BTreeMap<String, MethodType>,
    pub readable_prop: BTreeMap<String, SemType>,
}

impl TypeMap {
    pub fn of(component: &ComponentDeclaration) -> Self {
        TypeMap {
            prop: component
                .props
                .iter()
                .map(|p| (p.name.clone(), p.sem_type.clone()))
                .collect(),
            event: component
                .events
                .iter()
                .map(|e| (e.name.clone(), e.payload.clone()))
                .collect(),
            slot: component
                .slots
                .iter()
                .map(|s| (s.name.clone(), s.scope.clone()))
                .collect(),
            method: component
                .methods
                .iter()
                .map(|m| {
                    let params = m
                        .params
                        .iter()
                        .map(|p| Field::new(p.name.clone(), p.ty.clone()))
                        .collect();
                    (
                        m.name.clone(),
                        MethodType {
                            params,
                            return_type: m.return_type.clone(),
                        },
                    )
                })
                .collect(),
            readable_prop: component
                .readable_props
                .iter()
                .map(|p| (p.name.clone(), p.sem_type.clone()))
                .collect(),
        }
    }
}

impl ComponentDeclaration {
    /// Attaches a [`TypeMap`] to this component and every child.
    pub fn attach_type_maps(&mut self) {
        self.type_map = Some(TypeMap::of(self));
        for child in &mut self.children {
            child.attach_type_maps();
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// READ ENTRY POINTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Reads the component declarations of one file. The first component class is the
/// primary one; the following ones become its children.
pub fn read_declaration(code: &str, file: &str) -> Result<Vec<ComponentDeclaration>> {
    let allocator = Allocator::default();
    let program = parse_program(&allocator, code, file)?;
    let sites = class_sites(&program);

    let mut primary: Option<ComponentDeclaration> = None;
    for site in sites.iter().filter(|s| is_component_site(s)) {
        let component = read_component(site, &sites, code)?;
        match primary.as_mut() {
            Some(p) => p.children.push(component),
            None => primary = Some(component),
        }
    }

    Ok(primary.into_iter().collect())
}

/// Same as [`read_declaration`] with a [`TypeMap`] attached to every component.
pub fn read_declaration_with_types(code: &str, file: &str) -> Result<Vec<ComponentDeclaration>> {
    let mut components = read_declaration(code, file)?;
    for component in &mut components {
        component.attach_type_maps();
    }
    Ok(components)
}

pub fn is_component_site(site: &ClassSite) -> bool {
    site.name().is_some() && site.super_name() == Some(VIEW_COMPONENT)
}

/// Decorator fields shared by declarations and the metadata scan.
#[derive(Debug, Default)]
pub struct ComponentHeader {
    pub config: Map<String, Value>,
}

impl ComponentHeader {
    pub fn read(decorators: &[Decorator], code: &str) -> Self {
        let mut config = Map::new();
        for decorator in decorators {
            let is_component = decorator_name(decorator)
                .map(|n| COMPONENT_DECORATORS.contains(&n))
                .unwrap_or(false);
            if !is_component {
                continue;
            }
            if let Some(obj) = decorator_object(decorator) {
                for (key, value) in eval_object(obj, code) {
                    if !value.is_null() {
                        config.insert(key, value);
                    }
                }
            }
        }
        ComponentHeader { config }
    }

    pub fn string(&self, key: &str) -> Option<String> {
        self.config.get(key).and_then(Value::as_str).map(str::to_string)
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        self.config.get(key).and_then(Value::as_bool)
    }
}

fn read_component(site: &ClassSite, sites: &[ClassSite], code: &str) -> Result<ComponentDeclaration> {
    let name = site.name().unwrap_or_default().to_string();
    let header = ComponentHeader::read(&site.class.decorators, code);

    let mut component = ComponentDeclaration {
        title: header.string("title").unwrap_or_default(),
        description: header.string("description").unwrap_or_default(),
        platform: header.string("type"),
        ideusage: header.config.get("ideusage").cloned(),
        source_name: header.string("sourceName"),
        show: header.bool("show"),
        group: header.string("group"),
        icon: header.string("icon"),
        name,
        ..Default::default()
    };

    for element in &site.class.body.body {
        match element {
            ClassElement::MethodDefinition(method)
                if method.kind == MethodDefinitionKind::Method
                    && has_decorator(&method.decorators, "Method") =>
            {
                component.methods.push(read_method(method, code)?);
            }
            ClassElement::PropertyDefinition(prop) if has_decorator(&prop.decorators, "Prop") => {
                component.readable_props.push(read_readable_prop(prop, code)?);
            }
            _ => {}
        }
    }

    let options_name = format!("{}{}", component.name, OPTIONS_SUFFIX);
    if let Some(options) = sites.iter().find(|s| s.name() == Some(options_name.as_str())) {
        for element in &options.class.body.body {
            let ClassElement::PropertyDefinition(prop) = element else {
                continue;
            };
            if has_decorator(&prop.decorators, "Prop") {
                component.props.push(read_prop(prop, code)?);
            } else if has_decorator(&prop.decorators, "Event") {
                component.events.push(read_event(prop, code)?);
            } else if has_decorator(&prop.decorators, "Slot") {
                component.slots.push(read_slot(prop, code)?);
            }
        }
    }

    Ok(component)
}

fn has_decorator(decorators: &[Decorator], name: &str) -> bool {
    find_decorator(decorators, name).is_some()
}

// ═══════════════════════════════════════════════════════════════════════════════
// MEMBERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Evaluated `@Name({...})` options of a member.
fn member_options(decorators: &[Decorator], name: &str, code: &str) -> Map<String, Value> {
    find_decorator(decorators, name)
        .and_then(decorator_object)
        .map(|obj| eval_object(obj, code))
        .unwrap_or_default()
}

fn take_string(options: &mut Map<String, Value>, key: &str) -> Option<String> {
    match options.remove(key)? {
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn take_bool(options: &mut Map<String, Value>, key: &str) -> bool {
    options.remove(key).and_then(|v| v.as_bool()).unwrap_or(false)
}

fn key_name(prop: &PropertyDefinition) -> String {
    prop.key
        .static_name()
        .map(|n| n.to_string())
        .unwrap_or_default()
}

fn annotation_text<'c>(prop: &PropertyDefinition, code: &'c str) -> Option<&'c str> {
    prop.type_annotation
        .as_ref()
        .map(|ann| ann.type_annotation.span().source_text(code))
}

fn property_type(prop: &PropertyDefinition, code: &str) -> Result<SemType> {
    match &prop.type_annotation {
        Some(ann) => from_source_syntax(&ann.type_annotation, code),
        None => Ok(SemType::Any),
    }
}

fn read_prop(prop: &PropertyDefinition, code: &str) -> Result<PropDeclaration> {
    let mut options = member_options(&prop.decorators, "Prop", code);
    let sem_type = property_type(prop, code)?;

    Ok(PropDeclaration {
        name: key_name(prop),
        title: take_string(&mut options, "title").unwrap_or_default(),
        description: take_string(&mut options, "description").unwrap_or_default(),
        ts_type: annotation_text(prop, code).map(str::to_string),
        type_annotation: annotation::from_sem_type(&sem_type),
        sem_type,
        default_value: prop
            .value
            .as_ref()
            .map(|v| v.span().source_text(code).to_string()),
        sync: take_bool(&mut options, "sync"),
        settable: take_bool(&mut options, "settable"),
        bind_hide: take_bool(&mut options, "bindHide"),
        bind_open: take_bool(&mut options, "bindOpen"),
        group: take_string(&mut options, "group"),
        setter: options.remove("setter"),
        extra: options,
    })
}

/// First parameter type of a function-typed member, if any.
fn first_param_type(prop: &PropertyDefinition, code: &str) -> Result<Option<SemType>> {
    let Some(ann) = &prop.type_annotation else {
        return Ok(None);
    };
    let TSType::TSFunctionType(func) = &ann.type_annotation else {
        return Ok(None);
    };
    match func.params.items.first().and_then(|p| p.type_annotation.as_ref()) {
        Some(param) => from_source_syntax(&param.type_annotation, code).map(Some),
        None => Ok(None),
    }
}

fn read_event(prop: &PropertyDefinition, code: &str) -> Result<EventDeclaration> {
    let mut options = member_options(&prop.decorators, "Event", code);
    Ok(EventDeclaration {
        name: key_name(prop),
        title: take_string(&mut options, "title").unwrap_or_default(),
        description: take_string(&mut options, "description").unwrap_or_default(),
        ts_type: annotation_text(prop, code).map(str::to_string),
        payload: first_param_type(prop, code)?.unwrap_or_else(SemType::empty_struct),
    })
}

fn read_slot(prop: &PropertyDefinition, code: &str) -> Result<SlotDeclaration> {
    let mut options = member_options(&prop.decorators, "Slot", code);
    Ok(SlotDeclaration {
        name: key_name(prop),
        title: take_string(&mut options, "title").unwrap_or_default(),
        description: take_string(&mut options, "description").unwrap_or_default(),
        ts_type: annotation_text(prop, code).map(str::to_string),
        scope: first_param_type(prop, code)?,
    })
}

fn read_readable_prop(prop: &PropertyDefinition, code: &str) -> Result<ReadablePropDeclaration> {
    let mut options = member_options(&prop.decorators, "Prop", code);
    Ok(ReadablePropDeclaration {
        name: key_name(prop),
        title: take_string(&mut options, "title").unwrap_or_default(),
        description: take_string(&mut options, "description").unwrap_or_default(),
        ts_type: annotation_text(prop, code).map(str::to_string),
        sem_type: property_type(prop, code)?,
    })
}

fn read_param(param: &FormalParameter, code: &str) -> Result<MethodParam> {
    let mut options = member_options(&param.decorators, "Param", code);
    let ty = match &param.type_annotation {
        Some(ann) => from_source_syntax(&ann.type_annotation, code)?,
        None => SemType::Any,
    };
    Ok(MethodParam {
        name: param
            .pattern
            .get_identifier_name()
            .map(|n| n.to_string())
            .unwrap_or_default(),
        ty,
        default_value: param
            .initializer
            .as_ref()
            .map(|v| v.span().source_text(code).to_string()),
        title: take_string(&mut options, "title"),
        description: take_string(&mut options, "description"),
    })
}

fn read_method(method: &MethodDefinition, code: &str) -> Result<MethodDeclaration> {
    let mut options = member_options(&method.decorators, "Method", code);
    let func = &method.value;

    let params = func
        .params
        .items
        .iter()
        .map(|p| read_param(p, code))
        .collect::<Result<Vec<_>>>()?;

    let (return_type, sync) = match &func.return_type {
        Some(ann) => return_type_of(&ann.type_annotation, code)?,
        None => (None, true),
    };

    let signature_params = func
        .params
        .items
        .iter()
        .map(|p| {
            let name = p
                .pattern
                .get_identifier_name()
                .map(|n| n.to_string())
                .unwrap_or_default();
            match &p.type_annotation {
                Some(ann) => format!("{}: {}", name, ann.type_annotation.span().source_text(code)),
                None => name,
            }
        })
        .collect::<Vec<_>>()
        .join(", ");
    let signature_return = func
        .return_type
        .as_ref()
        .map(|ann| ann.type_annotation.span().source_text(code))
        .unwrap_or("void");

    Ok(MethodDeclaration {
        name: method
            .key
            .static_name()
            .map(|n| n.to_string())
            .unwrap_or_default(),
        title: take_string(&mut options, "title").unwrap_or_default(),
        description: take_string(&mut options, "description").unwrap_or_default(),
        ts_type: format!("({}) => {}", signature_params, signature_return),
        params,
        return_type,
        sync,
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// STATIC EVALUATION OF DECORATOR OPTIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Evaluates an options object literal to JSON. Anything that is not a plain literal
/// (functions, identifiers, calls) is kept as its source text.
pub fn eval_object(obj: &ObjectExpression, code: &str) -> Map<String, Value> {
    let mut map = Map::new();
    for property in &obj.properties {
        let ObjectPropertyKind::ObjectProperty(prop) = property else {
            continue;
        };
        if prop.computed {
            continue;
        }
        let Some(key) = prop.key.static_name() else {
            continue;
        };
        map.insert(key.to_string(), eval_expression(&prop.value, code));
    }
    map
}

pub fn eval_expression(expr: &Expression, code: &str) -> Value {
    match expr {
        Expression::StringLiteral(lit) => Value::String(lit.value.to_string()),
        Expression::BooleanLiteral(lit) => Value::Bool(lit.value),
        Expression::NullLiteral(_) => Value::Null,
        Expression::NumericLiteral(lit) => number(lit.value),
        Expression::Identifier(id) if id.name == "undefined" => Value::Null,
        Expression::ParenthesizedExpression(p) => eval_expression(&p.expression, code),
        Expression::UnaryExpression(unary)
            if unary.operator == UnaryOperator::UnaryNegation =>
        {
            match &unary.argument {
                Expression::NumericLiteral(lit) => number(-lit.value),
                _ => source_value(expr, code),
            }
        }
        Expression::TemplateLiteral(tpl) if tpl.expressions.is_empty() => {
            let text: String = tpl
                .quasis
                .iter()
                .map(|q| {
                    q.value
                        .cooked
                        .as_ref()
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| q.value.raw.to_string())
                })
                .collect();
            Value::String(text)
        }
        Expression::ArrayExpression(arr) => Value::Array(
            arr.elements
                .iter()
                .map(|el| match el {
                    ArrayExpressionElement::Elision(_) => Value::Null,
                    other => match other.as_expression() {
                        Some(e) => eval_expression(e, code),
                        None => Value::String(other.span().source_text(code).to_string()),
                    },
                })
                .collect(),
        ),
        Expression::ObjectExpression(obj) => Value::Object(eval_object(obj, code)),
        _ => source_value(expr, code),
    }
}

fn number(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

fn source_value(expr: &Expression, code: &str) -> Value {
    Value::String(expr.span().source_text(code).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const API: &str = r#"/// <reference types="@nasl/types" />
namespace nasl.ui {
  @ExtensionComponent({
    type: 'pc',
    ideusage: { idetype: 'element' },
  })
  @Component({
    title: '按钮',
    description: 'A button',
    group: 'Basic',
  })
  export class MyButton extends ViewComponent {
    @Prop({ title: 'Loading' })
    loading: nasl.core.Boolean;

    @Method({ title: 'Focus', description: 'focus it' })
    focus(@Param({ title: 'Delay' }) delay: nasl.core.Integer = 0, label: nasl.core.String = ''): Promise<nasl.core.Boolean> {
      return null as any;
    }

    constructor(options?: Partial<MyButtonOptions>) {
      super();
    }
  }

  export class MyButtonOptions extends ViewComponentOptions {
    @Prop({
      group: '主要属性',
      title: 'Text',
      sync: true,
      setter: { concept: 'InputSetter' },
      min: -1,
      onChange: (v) => v,
    })
    text: nasl.core.String = 'OK';

    @Event({ title: 'On Click' })
    onClick: (event: { x: nasl.core.Decimal }) => any;

    @Slot({ title: 'Default' })
    slotDefault: () => Array<nasl.ui.ViewComponent>;

    @Slot({ title: 'Item' })
    slotItem: (current: { index: nasl.core.Integer }) => Array<nasl.ui.ViewComponent>;
  }

  @Component({ title: 'Item' })
  export class MyButtonItem extends ViewComponent {
    constructor(options?: Partial<MyButtonItemOptions>) {
      super();
    }
  }

  export class MyButtonItemOptions extends ViewComponentOptions {
    @Prop({ title: 'Value' })
    value: nasl.collection.List<nasl.core.String>;
  }
}
"#;

    #[test]
    fn test_reads_primary_and_children() {
        let components = read_declaration(API, "api.ts").unwrap();
        assert_eq!(components.len(), 1);
        let button = &components[0];
        assert_eq!(button.name, "MyButton");
        assert_eq!(button.title, "按钮");
        assert_eq!(button.platform.as_deref(), Some("pc"));
        assert_eq!(button.group.as_deref(), Some("Basic"));
        assert_eq!(button.ideusage, Some(serde_json::json!({ "idetype": "element" })));
        assert_eq!(button.children.len(), 1);
        assert_eq!(button.children[0].name, "MyButtonItem");
        assert_eq!(button.children[0].props[0].sem_type, SemType::array(SemType::String));
    }

    #[test]
    fn test_reads_props() {
        let components = read_declaration(API, "api.ts").unwrap();
        let text = &components[0].props[0];
        assert_eq!(text.name, "text");
        assert_eq!(text.title, "Text");
        assert!(text.sync);
        assert!(!text.settable);
        assert_eq!(text.group.as_deref(), Some("主要属性"));
        assert_eq!(text.default_value.as_deref(), Some("'OK'"));
        assert_eq!(text.ts_type.as_deref(), Some("nasl.core.String"));
        assert_eq!(text.setter, Some(serde_json::json!({ "concept": "InputSetter" })));
        assert_eq!(text.extra.get("min"), Some(&serde_json::json!(-1)));
        assert_eq!(text.extra.get("onChange"), Some(&serde_json::json!("(v) => v")));
        assert_eq!(text.type_annotation.as_ref().unwrap().type_name, "String");
    }

    #[test]
    fn test_reads_events_and_slots() {
        let components = read_declaration(API, "api.ts").unwrap();
        let button = &components[0];
        assert_eq!(button.events[0].name, "onClick");
        assert_eq!(
            button.events[0].payload,
            SemType::Struct {
                fields: vec![Field::new("x", SemType::Decimal)]
            }
        );
        assert_eq!(button.slots.len(), 2);
        assert_eq!(button.slots[0].scope, None);
        assert_eq!(
            button.slots[1].scope,
            Some(SemType::Struct {
                fields: vec![Field::new("index", SemType::Integer)]
            })
        );
    }

    #[test]
    fn test_reads_methods_and_readable_props() {
        let components = read_declaration(API, "api.ts").unwrap();
        let button = &components[0];
        assert_eq!(button.readable_props[0].name, "loading");
        assert_eq!(button.readable_props[0].sem_type, SemType::Boolean);

        let focus = &button.methods[0];
        assert_eq!(focus.name, "focus");
        assert_eq!(focus.description, "focus it");
        assert_eq!(focus.params.len(), 2);
        assert_eq!(focus.params[0].title.as_deref(), Some("Delay"));
        assert_eq!(focus.params[0].default_value.as_deref(), Some("0"));
        assert_eq!(focus.return_type, Some(SemType::Boolean));
        assert!(!focus.sync);
        assert_eq!(
            focus.ts_type,
            "(delay: nasl.core.Integer, label: nasl.core.String) => Promise<nasl.core.Boolean>"
        );
    }

    #[test]
    fn test_type_maps() {
        let components = read_declaration_with_types(API, "api.ts").unwrap();
        let map = components[0].type_map.as_ref().unwrap();
        assert_eq!(map.prop.get("text"), Some(&SemType::String));
        assert_eq!(map.slot.get("slotDefault"), Some(&None));
        assert_eq!(map.method["focus"].return_type, Some(SemType::Boolean));
        assert!(components[0].children[0].type_map.is_some());
    }

    #[test]
    fn test_disallowed_member_type_fails_read() {
        let code = r#"
export class A extends ViewComponent {}
export class AOptions extends ViewComponentOptions {
  @Prop({ title: 'x' })
  x: String;
}
"#;
        assert!(read_declaration(code, "api.ts").unwrap_err().is_parse());
    }

    #[test]
    fn test_no_component_yields_empty() {
        assert!(read_declaration("export const a = 1;", "api.ts").unwrap().is_empty());
    }
}

//! Semantic type algebra.
//!
//! `SemType` is the platform-neutral description of a prop/event/slot/method type.
//! [`SemType::to_source_syntax`] prints the `nasl.*` TypeScript vocabulary and
//! [`from_source_syntax`] reads it back; printing then reading yields the same value.

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    BindingPattern, Statement, TSSignature, TSType, TSTypeName, TSTypeReference,
};
use oxc_span::GetSpan;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};
use crate::naming::is_identifier;
use crate::source::parse_program;

/// Host built-ins that must be written with the platform primitives instead.
pub const DISALLOWED_BUILTINS: [&str; 8] = [
    "String", "Number", "Array", "Object", "Boolean", "Symbol", "Function", "Date",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SemType {
    String,
    Integer,
    Decimal,
    Boolean,
    Date,
    Time,
    #[serde(rename = "datetime")]
    DateTime,
    Any,
    Array {
        value: Box<SemType>,
    },
    Struct {
        fields: Vec<Field>,
    },
    Map {
        key: Box<SemType>,
        value: Box<SemType>,
    },
    Union {
        #[serde(deserialize_with = "non_empty_variants")]
        variants: Vec<SemType>,
    },
    #[serde(rename_all = "camelCase")]
    Function {
        params: Vec<Field>,
        /// `None` is `void`.
        return_type: Option<Box<SemType>>,
        sync: bool,
    },
    Unknown {
        raw: String,
    },
}

fn non_empty_variants<'de, D>(deserializer: D) -> std::result::Result<Vec<SemType>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let variants = Vec::<SemType>::deserialize(deserializer)?;
    if variants.is_empty() {
        return Err(serde::de::Error::custom("a union needs at least one variant"));
    }
    Ok(variants)
}

/// A named struct field or function parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: SemType,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: SemType) -> Self {
        Field {
            name: name.into(),
            ty,
        }
    }
}

impl SemType {
    pub fn array(value: SemType) -> Self {
        SemType::Array {
            value: Box::new(value),
        }
    }

    pub fn map(key: SemType, value: SemType) -> Self {
        SemType::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn empty_struct() -> Self {
        SemType::Struct { fields: vec![] }
    }

    /// Builds a union. One variant is that variant and none is `any`.
    pub fn union(mut variants: Vec<SemType>) -> Self {
        match variants.len() {
            0 => SemType::Any,
            1 => variants.remove(0),
            _ => SemType::Union { variants },
        }
    }

    pub fn function(params: Vec<Field>, return_type: Option<SemType>, sync: bool) -> Self {
        SemType::Function {
            params,
            return_type: return_type.map(Box::new),
            sync,
        }
    }

    pub fn unknown(raw: impl Into<String>) -> Self {
        SemType::Unknown { raw: raw.into() }
    }

    /// `integer`, `decimal`, or a union made only of those (the `number` keyword).
    pub fn is_numeric(&self) -> bool {
        match self {
            SemType::Integer | SemType::Decimal => true,
            SemType::Union { variants } => {
                !variants.is_empty() && variants.iter().all(SemType::is_numeric)
            }
            _ => false,
        }
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, SemType::Boolean)
    }

    pub fn is_struct(&self) -> bool {
        matches!(self, SemType::Struct { .. })
    }

    pub fn to_source_syntax(&self) -> String {
        match self {
            SemType::String => "nasl.core.String".to_string(),
            SemType::Integer => "nasl.core.Integer".to_string(),
            SemType::Decimal => "nasl.core.Decimal".to_string(),
            SemType::Boolean => "nasl.core.Boolean".to_string(),
            SemType::Date => "nasl.core.Date".to_string(),
            SemType::Time => "nasl.core.Time".to_string(),
            SemType::DateTime => "nasl.core.DateTime".to_string(),
            SemType::Any => "any".to_string(),
            SemType::Array { value } => {
                format!("nasl.collection.List<{}>", value.to_source_syntax())
            }
            SemType::Map { key, value } => format!(
                "nasl.collection.Map<{}, {}>",
                key.to_source_syntax(),
                value.to_source_syntax()
            ),
            SemType::Struct { fields } => {
                if fields.is_empty() {
                    return "{}".to_string();
                }
                let body = fields
                    .iter()
                    .map(|f| format!("{}: {}", property_key(&f.name), f.ty.to_source_syntax()))
                    .collect::<Vec<_>>()
                    .join("; ");
                format!("{{ {} }}", body)
            }
            SemType::Union { variants } if variants.is_empty() => "any".to_string(),
            SemType::Union { variants } => variants
                .iter()
                .map(|v| {
                    if v.needs_parens_in_union() {
                        format!("({})", v.to_source_syntax())
                    } else {
                        v.to_source_syntax()
                    }
                })
                .collect::<Vec<_>>()
                .join(" | "),
            SemType::Function {
                params,
                return_type,
                sync,
            } => {
                let params = params
                    .iter()
                    .map(|p| format!("{}: {}", p.name, p.ty.to_source_syntax()))
                    .collect::<Vec<_>>()
                    .join(", ");
                let ret = return_type
                    .as_ref()
                    .map(|t| t.to_source_syntax())
                    .unwrap_or_else(|| "void".to_string());
                if *sync {
                    format!("({}) => {}", params, ret)
                } else {
                    format!("({}) => Promise<{}>", params, ret)
                }
            }
            SemType::Unknown { raw } => raw.clone(),
        }
    }

    fn needs_parens_in_union(&self) -> bool {
        match self {
            SemType::Union { .. } | SemType::Function { .. } => true,
            SemType::Unknown { raw } => raw.contains("=>"),
            _ => false,
        }
    }
}

impl std::fmt::Display for SemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_source_syntax())
    }
}

fn property_key(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\'', "\\'"))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SOURCE SYNTAX -> SEMTYPE
// ═══════════════════════════════════════════════════════════════════════════════

/// Reads a type node. Unrecognized forms become `unknown` with their source text;
/// only references to host built-ins fail.
pub fn from_source_syntax(ty: &TSType, source: &str) -> Result<SemType> {
    match ty {
        TSType::TSAnyKeyword(_) => Ok(SemType::Any),
        TSType::TSStringKeyword(_) => Ok(SemType::String),
        TSType::TSBooleanKeyword(_) => Ok(SemType::Boolean),
        TSType::TSNumberKeyword(_) => Ok(SemType::Union {
            variants: vec![SemType::Integer, SemType::Decimal],
        }),
        TSType::TSParenthesizedType(p) => from_source_syntax(&p.type_annotation, source),
        TSType::TSArrayType(a) => Ok(SemType::array(from_source_syntax(&a.element_type, source)?)),
        TSType::TSUnionType(u) => {
            let variants = u
                .types
                .iter()
                .map(|t| from_source_syntax(t, source))
                .collect::<Result<Vec<_>>>()?;
            Ok(SemType::Union { variants })
        }
        TSType::TSTypeLiteral(lit) => {
            let mut fields = Vec::new();
            for member in &lit.members {
                let TSSignature::TSPropertySignature(sig) = member else {
                    return Ok(raw(ty, source));
                };
                let Some(name) = sig.key.static_name() else {
                    return Ok(raw(ty, source));
                };
                let field_ty = match &sig.type_annotation {
                    Some(ann) => from_source_syntax(&ann.type_annotation, source)?,
                    None => SemType::Any,
                };
                fields.push(Field::new(name.to_string(), field_ty));
            }
            Ok(SemType::Struct { fields })
        }
        TSType::TSFunctionType(func) => {
            let mut params = Vec::new();
            for param in &func.params.items {
                let BindingPattern::BindingIdentifier(id) = &param.pattern else {
                    return Ok(raw(ty, source));
                };
                let param_ty = match &param.type_annotation {
                    Some(ann) => from_source_syntax(&ann.type_annotation, source)?,
                    None => SemType::Any,
                };
                params.push(Field::new(id.name.to_string(), param_ty));
            }
            if func.params.rest.is_some() {
                return Ok(raw(ty, source));
            }
            let (return_type, sync) = return_type_of(&func.return_type.type_annotation, source)?;
            Ok(SemType::Function {
                params,
                return_type: return_type.map(Box::new),
                sync,
            })
        }
        TSType::TSTypeReference(reference) => type_reference(reference, ty, source),
        _ => Ok(raw(ty, source)),
    }
}

/// Splits a return annotation into its unwrapped type (`None` for void) and the sync flag.
pub fn return_type_of(ty: &TSType, source: &str) -> Result<(Option<SemType>, bool)> {
    if let Some(inner) = promise_argument(ty) {
        return Ok((non_void(inner, source)?, false));
    }
    Ok((non_void(ty, source)?, true))
}

fn non_void(ty: &TSType, source: &str) -> Result<Option<SemType>> {
    match ty {
        TSType::TSVoidKeyword(_) => Ok(None),
        TSType::TSParenthesizedType(p) => non_void(&p.type_annotation, source),
        _ => from_source_syntax(ty, source).map(Some),
    }
}

fn promise_argument<'b, 'a>(ty: &'b TSType<'a>) -> Option<&'b TSType<'a>> {
    let TSType::TSTypeReference(reference) = ty else {
        return None;
    };
    let TSTypeName::IdentifierReference(id) = &reference.type_name else {
        return None;
    };
    if id.name != "Promise" {
        return None;
    }
    reference
        .type_arguments
        .as_ref()
        .and_then(|args| args.params.first())
}

fn type_reference(reference: &TSTypeReference, ty: &TSType, source: &str) -> Result<SemType> {
    let args: Vec<&TSType> = reference
        .type_arguments
        .as_ref()
        .map(|a| a.params.iter().collect())
        .unwrap_or_default();

    match &reference.type_name {
        TSTypeName::IdentifierReference(id) => {
            let name = id.name.as_str();
            if name == "Promise" {
                return match args.first() {
                    Some(TSType::TSVoidKeyword(_)) | None => Ok(raw(ty, source)),
                    Some(inner) => from_source_syntax(inner, source),
                };
            }
            if DISALLOWED_BUILTINS.contains(&name) {
                return Err(ApiError::UnsupportedType(name.to_string()));
            }
            Ok(raw(ty, source))
        }
        TSTypeName::QualifiedName(_) => {
            let qualified = qualified_name(&reference.type_name);
            let sem = match (qualified.as_str(), args.as_slice()) {
                ("nasl.core.String", []) => SemType::String,
                ("nasl.core.Integer", []) => SemType::Integer,
                ("nasl.core.Decimal", []) => SemType::Decimal,
                ("nasl.core.Boolean", []) => SemType::Boolean,
                ("nasl.core.Date", []) => SemType::Date,
                ("nasl.core.Time", []) => SemType::Time,
                ("nasl.core.DateTime", []) => SemType::DateTime,
                ("nasl.core.Any", []) => SemType::Any,
                ("nasl.collection.List", [value]) => {
                    SemType::array(from_source_syntax(value, source)?)
                }
                ("nasl.collection.Map", [key, value]) => SemType::map(
                    from_source_syntax(key, source)?,
                    from_source_syntax(value, source)?,
                ),
                _ => raw(ty, source),
            };
            Ok(sem)
        }
        TSTypeName::ThisExpression(_) => Ok(raw(ty, source)),
    }
}

pub fn qualified_name(name: &TSTypeName) -> String {
    match name {
        TSTypeName::IdentifierReference(id) => id.name.to_string(),
        TSTypeName::QualifiedName(q) => format!("{}.{}", qualified_name(&q.left), q.right.name),
        TSTypeName::ThisExpression(_) => "this".to_string(),
    }
}

fn raw(ty: &TSType, source: &str) -> SemType {
    SemType::Unknown {
        raw: ty.span().source_text(source).to_string(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// STANDALONE TYPE TEXT
// ═══════════════════════════════════════════════════════════════════════════════

const TYPE_ALIAS_PREFIX: &str = "type __SemType = ";

/// Parses a type written on its own, e.g. the payload of a `tsType` update.
pub fn parse_type_text(text: &str) -> Result<SemType> {
    with_type_text(text, from_source_syntax)
}

/// Parses `text` as a type and hands the node to `f` together with the wrapping source.
pub fn with_type_text<T>(text: &str, f: impl FnOnce(&TSType, &str) -> Result<T>) -> Result<T> {
    let code = format!("{}{};", TYPE_ALIAS_PREFIX, text.trim());
    let allocator = Allocator::default();
    let program = parse_program(&allocator, &code, "<type>")?;

    let mut body = program.body.iter();
    match (body.next(), body.next()) {
        (Some(Statement::TSTypeAliasDeclaration(alias)), None) => f(&alias.type_annotation, &code),
        _ => Err(ApiError::parse("<type>", format!("`{}` is not a single type", text))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_primitives_and_collections() {
        assert_eq!(parse_type_text("nasl.core.String").unwrap(), SemType::String);
        assert_eq!(parse_type_text("nasl.core.Integer").unwrap(), SemType::Integer);
        assert_eq!(
            parse_type_text("nasl.collection.List<nasl.core.Decimal>").unwrap(),
            SemType::array(SemType::Decimal)
        );
        assert_eq!(
            parse_type_text("nasl.collection.Map<nasl.core.String, any>").unwrap(),
            SemType::map(SemType::String, SemType::Any)
        );
        assert_eq!(
            parse_type_text("number").unwrap(),
            SemType::Union {
                variants: vec![SemType::Integer, SemType::Decimal]
            }
        );
    }

    #[test]
    fn test_struct_and_function() {
        let ty = parse_type_text("(event: { value: nasl.core.String; index?: nasl.core.Integer }) => void")
            .unwrap();
        assert_eq!(
            ty,
            SemType::function(
                vec![Field::new(
                    "event",
                    SemType::Struct {
                        fields: vec![
                            Field::new("value", SemType::String),
                            Field::new("index", SemType::Integer),
                        ]
                    }
                )],
                None,
                true,
            )
        );
    }

    #[test]
    fn test_promise_unwraps_and_marks_async() {
        assert_eq!(parse_type_text("Promise<nasl.core.Boolean>").unwrap(), SemType::Boolean);
        let ty = parse_type_text("() => Promise<nasl.core.String>").unwrap();
        assert_eq!(ty, SemType::function(vec![], Some(SemType::String), false));
        assert_eq!(ty.to_source_syntax(), "() => Promise<nasl.core.String>");
    }

    #[test]
    fn test_disallowed_builtins_fail() {
        let err = parse_type_text("String").unwrap_err();
        assert!(matches!(err, ApiError::UnsupportedType(ref n) if n == "String"));
        assert!(parse_type_text("nasl.collection.List<Array<any>>").is_err());
        assert!(parse_type_text("(cb: Function) => void").is_err());
    }

    #[test]
    fn test_unrecognized_forms_keep_text() {
        assert_eq!(
            parse_type_text("nasl.ui.ViewComponent").unwrap(),
            SemType::unknown("nasl.ui.ViewComponent")
        );
        assert_eq!(
            parse_type_text("'small' | 'large'").unwrap(),
            SemType::Union {
                variants: vec![SemType::unknown("'small'"), SemType::unknown("'large'")]
            }
        );
    }

    #[test]
    fn test_union_parenthesizes_functions() {
        let ty = SemType::Union {
            variants: vec![SemType::String, SemType::function(vec![], None, true)],
        };
        assert_eq!(ty.to_source_syntax(), "nasl.core.String | (() => void)");
        assert_eq!(parse_type_text(&ty.to_source_syntax()).unwrap(), ty);
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_value(SemType::array(SemType::DateTime)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "type": "array", "value": { "type": "datetime" } })
        );
        let back: SemType = serde_json::from_value(serde_json::json!({
            "type": "function",
            "params": [{ "name": "a", "type": { "type": "string" } }],
            "returnType": null,
            "sync": true
        }))
        .unwrap();
        assert_eq!(back, SemType::function(vec![Field::new("a", SemType::String)], None, true));
    }

    #[test]
    fn test_empty_union() {
        assert_eq!(SemType::union(vec![]), SemType::Any);
        assert_eq!(SemType::Union { variants: vec![] }.to_source_syntax(), "any");
        let err = serde_json::from_value::<SemType>(serde_json::json!({
            "type": "union",
            "variants": []
        }))
        .unwrap_err();
        assert!(err.to_string().contains("at least one variant"));
        let one: SemType = serde_json::from_value(serde_json::json!({
            "type": "union",
            "variants": [{ "type": "string" }]
        }))
        .unwrap();
        assert_eq!(one.to_source_syntax(), "nasl.core.String");
    }

    fn leaf() -> impl Strategy<Value = SemType> {
        prop_oneof![
            Just(SemType::String),
            Just(SemType::Integer),
            Just(SemType::Decimal),
            Just(SemType::Boolean),
            Just(SemType::Date),
            Just(SemType::Time),
            Just(SemType::DateTime),
            Just(SemType::Any),
            Just(SemType::unknown("nasl.ui.ViewComponent")),
            Just(SemType::unknown("'primary'")),
            Just(SemType::unknown("Current<nasl.core.String>")),
        ]
    }

    fn sem_type() -> impl Strategy<Value = SemType> {
        leaf().prop_recursive(4, 32, 4, |inner| {
            prop_oneof![
                inner.clone().prop_map(SemType::array),
                (inner.clone(), inner.clone()).prop_map(|(k, v)| SemType::map(k, v)),
                prop::collection::vec(("[a-z][a-zA-Z0-9]{0,6}", inner.clone()), 0..4).prop_map(
                    |fields| SemType::Struct {
                        fields: fields.into_iter().map(|(n, t)| Field::new(n, t)).collect(),
                    }
                ),
                prop::collection::vec(inner.clone(), 2..4)
                    .prop_map(|variants| SemType::Union { variants }),
                (
                    prop::collection::vec(inner.clone(), 0..3),
                    prop::option::of(inner),
                    any::<bool>()
                )
                    .prop_map(|(params, ret, sync)| {
                        let params = params
                            .into_iter()
                            .enumerate()
                            .map(|(i, t)| Field::new(format!("p{}", i), t))
                            .collect();
                        SemType::function(params, ret, sync)
                    }),
            ]
        })
    }

    proptest! {
        #[test]
        fn source_syntax_round_trips(ty in sem_type()) {
            let text = ty.to_source_syntax();
            let back = parse_type_text(&text).unwrap();
            prop_assert_eq!(back, ty);
        }
    }
}

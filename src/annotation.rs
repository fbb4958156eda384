//! The platform's declarative type vocabulary (`TypeAnnotation` nodes).

use serde::{Deserialize, Serialize};

use crate::sem_type::SemType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeKind {
    Primitive,
    Reference,
    Generic,
    Union,
    AnonymousStructure,
    Function,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureProperty {
    pub concept: String,
    pub name: String,
    pub type_annotation: TypeAnnotation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeAnnotation {
    pub concept: String,
    pub type_kind: TypeKind,
    pub type_namespace: String,
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_arguments: Vec<TypeAnnotation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<StructureProperty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<Box<TypeAnnotation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync: Option<bool>,
}

impl TypeAnnotation {
    fn new(kind: TypeKind, namespace: &str, name: &str) -> Self {
        TypeAnnotation {
            concept: "TypeAnnotation".to_string(),
            type_kind: kind,
            type_namespace: namespace.to_string(),
            type_name: name.to_string(),
            type_arguments: vec![],
            properties: vec![],
            return_type: None,
            sync: None,
        }
    }

    fn primitive(name: &str) -> Self {
        Self::new(TypeKind::Primitive, "nasl.core", name)
    }

    fn generic(namespace: &str, name: &str, args: Vec<TypeAnnotation>) -> Self {
        let mut ann = Self::new(TypeKind::Generic, namespace, name);
        ann.type_arguments = args;
        ann
    }

    /// `nasl.core.Long`, `nasl.collection.List<nasl.core.String>`, ...
    pub fn display_name(&self) -> String {
        match self.type_kind {
            TypeKind::Union => self
                .type_arguments
                .iter()
                .map(TypeAnnotation::display_name)
                .collect::<Vec<_>>()
                .join(" | "),
            TypeKind::AnonymousStructure => "{...}".to_string(),
            TypeKind::Function => "Function".to_string(),
            _ if self.type_arguments.is_empty() => {
                format!("{}.{}", self.type_namespace, self.type_name)
            }
            _ => format!(
                "{}.{}<{}>",
                self.type_namespace,
                self.type_name,
                self.type_arguments
                    .iter()
                    .map(TypeAnnotation::display_name)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }
}

/// Maps a `SemType` into the platform vocabulary. Integers are the platform's wide
/// integer (`nasl.core.Long`). `unknown` has no platform counterpart.
pub fn from_sem_type(ty: &SemType) -> Option<TypeAnnotation> {
    let ann = match ty {
        SemType::String => TypeAnnotation::primitive("String"),
        SemType::Integer => TypeAnnotation::primitive("Long"),
        SemType::Decimal => TypeAnnotation::primitive("Decimal"),
        SemType::Boolean => TypeAnnotation::primitive("Boolean"),
        SemType::Date => TypeAnnotation::primitive("Date"),
        SemType::Time => TypeAnnotation::primitive("Time"),
        SemType::DateTime => TypeAnnotation::primitive("DateTime"),
        SemType::Any => TypeAnnotation::primitive("Any"),
        SemType::Array { value } => {
            TypeAnnotation::generic("nasl.collection", "List", vec![from_sem_type(value)?])
        }
        SemType::Map { key, value } => TypeAnnotation::generic(
            "nasl.collection",
            "Map",
            vec![from_sem_type(key)?, from_sem_type(value)?],
        ),
        SemType::Union { variants } => {
            let mut ann = TypeAnnotation::new(TypeKind::Union, "", "");
            ann.type_arguments = variants.iter().filter_map(from_sem_type).collect();
            ann
        }
        SemType::Struct { fields } => {
            let mut ann = TypeAnnotation::new(TypeKind::AnonymousStructure, "", "");
            ann.properties = fields
                .iter()
                .filter_map(|f| {
                    from_sem_type(&f.ty).map(|type_annotation| StructureProperty {
                        concept: "StructureProperty".to_string(),
                        name: f.name.clone(),
                        type_annotation,
                    })
                })
                .collect();
            ann
        }
        SemType::Function {
            params,
            return_type,
            sync,
        } => {
            let mut ann = TypeAnnotation::new(TypeKind::Function, "", "");
            ann.type_arguments = params.iter().filter_map(|p| from_sem_type(&p.ty)).collect();
            ann.return_type = return_type
                .as_ref()
                .and_then(|r| from_sem_type(r))
                .map(Box::new);
            ann.sync = Some(*sync);
            ann
        }
        SemType::Unknown { .. } => return None,
    };
    Some(ann)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sem_type::Field;

    #[test]
    fn test_integer_is_wide() {
        let ann = from_sem_type(&SemType::Integer).unwrap();
        assert_eq!(ann.type_name, "Long");
        assert_eq!(ann.type_namespace, "nasl.core");
        assert_eq!(ann.type_kind, TypeKind::Primitive);
    }

    #[test]
    fn test_generic_display() {
        let ann = from_sem_type(&SemType::map(SemType::String, SemType::array(SemType::Integer)))
            .unwrap();
        assert_eq!(
            ann.display_name(),
            "nasl.collection.Map<nasl.core.String, nasl.collection.List<nasl.core.Long>>"
        );
    }

    #[test]
    fn test_function_keeps_sync() {
        let ty = SemType::function(vec![Field::new("id", SemType::String)], Some(SemType::Boolean), false);
        let ann = from_sem_type(&ty).unwrap();
        assert_eq!(ann.type_kind, TypeKind::Function);
        assert_eq!(ann.sync, Some(false));
        assert_eq!(ann.return_type.unwrap().type_name, "Boolean");
    }

    #[test]
    fn test_unknown_has_no_annotation() {
        assert!(from_sem_type(&SemType::unknown("nasl.ui.ViewComponent")).is_none());
        assert!(from_sem_type(&SemType::array(SemType::unknown("X"))).is_none());
    }
}

//! Source templates for new members and sub-components.
//!
//! Templates are emitted unindented; the formatter re-indents the whole file.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::naming::{gen_title, is_identifier, normalize_string};
use crate::sem_type::SemType;

pub const DEFAULT_PROP_GROUP: &str = "主要属性";
pub const VIEW_COMPONENT_LIST: &str = "Array<nasl.ui.ViewComponent>";

/// Attribute/event/slot/method descriptor produced by introspecting a third-party library.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportDescriptor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub ty: Option<SemType>,
    /// Code text when a string, otherwise a JSON literal.
    #[serde(default)]
    pub default_value: Option<Value>,
    #[serde(default)]
    pub options: Option<Vec<ImportOption>>,
    #[serde(default)]
    pub sync: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportOption {
    pub label: String,
    #[serde(default)]
    pub value: Option<Value>,
}

/// Everything a member template needs.
#[derive(Debug, Clone, Copy)]
pub struct MemberSeed<'s> {
    /// Already normalized for its kind.
    pub name: &'s str,
    pub group: Option<&'s str>,
    pub import: Option<&'s ImportDescriptor>,
}

impl<'s> MemberSeed<'s> {
    fn title(&self) -> String {
        gen_title(self.name)
    }

    fn description(&self) -> String {
        let title = self.title();
        let description = self
            .import
            .and_then(|i| i.description.as_deref())
            .filter(|d| !d.is_empty())
            .unwrap_or(&title);
        normalize_string(description)
    }

    fn import_type(&self) -> Option<&'s SemType> {
        self.import.and_then(|i| i.ty.as_ref())
    }
}

fn quoted_key(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        format!("'{}'", normalize_string(name))
    }
}

fn title_lines(seed: &MemberSeed) -> String {
    format!(
        "title: '{}',\ndescription: '{}',\n",
        normalize_string(&seed.title()),
        seed.description()
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// SETTER INFERENCE
// ═══════════════════════════════════════════════════════════════════════════════

/// Picks the editing widget for an imported attribute.
pub fn setter_concept(import: &ImportDescriptor) -> &'static str {
    if import.options.as_ref().map(|o| !o.is_empty()).unwrap_or(false) {
        return "EnumSelectSetter";
    }
    match &import.ty {
        Some(ty) if ty.is_numeric() => "NumberInputSetter",
        Some(ty) if ty.is_boolean() => "SwitchSetter",
        _ => "InputSetter",
    }
}

fn setter_code(import: Option<&ImportDescriptor>) -> String {
    let Some(import) = import else {
        return "setter: {\nconcept: 'InputSetter',\n},\n".to_string();
    };
    let concept = setter_concept(import);
    match (&import.options, concept) {
        (Some(options), "EnumSelectSetter") => {
            let options = options
                .iter()
                .map(|o| format!("{{ title: '{}' }}", normalize_string(&o.label)))
                .collect::<Vec<_>>()
                .join(", ");
            format!("setter: {{\nconcept: '{}',\noptions: [{}],\n}},\n", concept, options)
        }
        _ => format!("setter: {{\nconcept: '{}',\n}},\n", concept),
    }
}

fn default_value_code(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// MEMBER TEMPLATES
// ═══════════════════════════════════════════════════════════════════════════════

/// A generated member: its key and its source text.
pub type MemberCode = (String, String);

pub fn prop_code(seed: &MemberSeed) -> Vec<MemberCode> {
    let group = seed.group.unwrap_or(DEFAULT_PROP_GROUP);
    let mut options = format!("group: '{}',\n", normalize_string(group));
    options.push_str(&title_lines(seed));
    options.push_str(&setter_code(seed.import));
    if seed.import.and_then(|i| i.sync).unwrap_or(false) {
        options.push_str("sync: true,\n");
    }

    let ty = seed
        .import_type()
        .map(SemType::to_source_syntax)
        .unwrap_or_else(|| "any".to_string());
    let default = seed
        .import
        .and_then(|i| i.default_value.as_ref())
        .and_then(default_value_code)
        .map(|d| format!(" = {}", d))
        .unwrap_or_default();

    let code = format!("@Prop({{\n{}}})\n{}: {}{};\n", options, quoted_key(seed.name), ty, default);
    vec![(seed.name.to_string(), code)]
}

pub fn event_code(seed: &MemberSeed) -> Vec<MemberCode> {
    let payload = match seed.import_type() {
        Some(SemType::Function { params, .. }) => params
            .first()
            .map(|p| p.ty.to_source_syntax())
            .unwrap_or_else(|| "{}".to_string()),
        Some(ty @ SemType::Struct { .. }) => ty.to_source_syntax(),
        _ => "{}".to_string(),
    };
    let code = format!(
        "@Event({{\n{}}})\n{}: (event: {}) => any;\n",
        title_lines(seed),
        quoted_key(seed.name),
        payload
    );
    vec![(seed.name.to_string(), code)]
}

/// A hyphenated slot yields two members: `'slot-x'` and its camel-cased twin.
pub fn slot_code(seed: &MemberSeed) -> Vec<MemberCode> {
    let scope = match seed.import_type() {
        Some(SemType::Function { params, .. }) => params.first().map(|p| p.ty.to_source_syntax()),
        Some(ty @ SemType::Struct { .. }) => Some(ty.to_source_syntax()),
        _ => None,
    };

    let sibling = crate::naming::slot_sibling_name(seed.name);
    let params = match (&scope, &sibling) {
        (Some(s), _) => format!("current: {}", s),
        (None, Some(_)) => "current: {}".to_string(),
        (None, None) => String::new(),
    };

    let mut out = vec![(
        seed.name.to_string(),
        format!(
            "@Slot({{\n{}}})\n{}: ({}) => {};\n",
            title_lines(seed),
            quoted_key(seed.name),
            params,
            VIEW_COMPONENT_LIST
        ),
    )];

    if let Some(sibling) = sibling {
        let twin = MemberSeed {
            name: &sibling,
            ..*seed
        };
        out.push((
            sibling.clone(),
            format!(
                "@Slot({{\n{}}})\n{}: ({}) => {};\n",
                title_lines(&twin),
                sibling,
                params,
                VIEW_COMPONENT_LIST
            ),
        ));
    }
    out
}

pub fn readable_prop_code(seed: &MemberSeed) -> Vec<MemberCode> {
    let ty = seed
        .import_type()
        .map(SemType::to_source_syntax)
        .unwrap_or_else(|| "any".to_string());
    let code = format!("@Prop({{\n{}}})\n{}: {};\n", title_lines(seed), quoted_key(seed.name), ty);
    vec![(seed.name.to_string(), code)]
}

pub fn method_code(seed: &MemberSeed) -> Vec<MemberCode> {
    let (params, return_type, sync) = match seed.import_type() {
        Some(SemType::Function {
            params,
            return_type,
            sync,
        }) => (params.clone(), return_type.as_deref().cloned(), *sync),
        _ => (vec![], None, true),
    };
    let params = params
        .iter()
        .map(|p| format!("{}: {}", p.name, p.ty.to_source_syntax()))
        .collect::<Vec<_>>()
        .join(", ");
    let code = format!(
        "@Method({{\n{}}})\n{}({}): {} {{\n{}}}\n",
        title_lines(seed),
        seed.name,
        params,
        return_annotation(return_type.as_ref(), sync),
        method_body(return_type.is_some())
    );
    vec![(seed.name.to_string(), code)]
}

/// `void`, `R` or `Promise<R>`.
pub fn return_annotation(return_type: Option<&SemType>, sync: bool) -> String {
    let ret = return_type
        .map(SemType::to_source_syntax)
        .unwrap_or_else(|| "void".to_string());
    if sync {
        ret
    } else {
        format!("Promise<{}>", ret)
    }
}

pub fn method_body(returns_value: bool) -> &'static str {
    if returns_value {
        "return null as any;\n"
    } else {
        ""
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SUB-COMPONENT
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct SubComponentSeed {
    pub name: String,
    pub title: String,
    pub description: String,
    pub platform: String,
    pub source_name: Option<String>,
}

/// The instance class and its `Options` companion, ready to append to a namespace block.
pub fn sub_component_code(seed: &SubComponentSeed) -> String {
    let source_name = seed
        .source_name
        .as_ref()
        .map(|s| format!("sourceName: '{}',\n", normalize_string(s)))
        .unwrap_or_default();
    let description = if seed.description.is_empty() {
        &seed.title
    } else {
        &seed.description
    };
    format!(
        "@ExtensionComponent({{\n\
         type: '{platform}',\n\
         {source_name}\
         ideusage: {{\n\
         idetype: 'element',\n\
         }},\n\
         }})\n\
         @Component({{\n\
         title: '{title}',\n\
         description: '{description}',\n\
         }})\n\
         export class {name} extends ViewComponent {{\n\
         constructor(options?: Partial<{name}Options>) {{\n\
         super();\n\
         }}\n\
         }}\n\
         \n\
         export class {name}Options extends ViewComponentOptions {{\n\
         }}\n",
        platform = normalize_string(&seed.platform),
        source_name = source_name,
        title = normalize_string(&seed.title),
        description = normalize_string(description),
        name = seed.name,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sem_type::Field;

    fn seed<'s>(name: &'s str, import: Option<&'s ImportDescriptor>) -> MemberSeed<'s> {
        MemberSeed {
            name,
            group: None,
            import,
        }
    }

    #[test]
    fn test_default_prop() {
        let code = &prop_code(&seed("value", None))[0].1;
        assert!(code.contains("group: '主要属性',"));
        assert!(code.contains("title: 'Value',"));
        assert!(code.contains("concept: 'InputSetter',"));
        assert!(code.ends_with("value: any;\n"));
    }

    #[test]
    fn test_setter_inference() {
        let mut import = ImportDescriptor {
            ty: Some(SemType::Union {
                variants: vec![SemType::Integer, SemType::Decimal],
            }),
            ..Default::default()
        };
        assert_eq!(setter_concept(&import), "NumberInputSetter");
        import.ty = Some(SemType::Boolean);
        assert_eq!(setter_concept(&import), "SwitchSetter");
        import.ty = Some(SemType::String);
        assert_eq!(setter_concept(&import), "InputSetter");
        import.options = Some(vec![ImportOption {
            label: "Large".into(),
            value: None,
        }]);
        assert_eq!(setter_concept(&import), "EnumSelectSetter");
        let code = &prop_code(&seed("size", Some(&import)))[0].1;
        assert!(code.contains("options: [{ title: 'Large' }],"));
    }

    #[test]
    fn test_imported_prop_keeps_type_and_default() {
        let import = ImportDescriptor {
            description: Some("it's disabled".into()),
            ty: Some(SemType::Boolean),
            default_value: Some(Value::Bool(false)),
            sync: Some(true),
            ..Default::default()
        };
        let code = &prop_code(&seed("disabled", Some(&import)))[0].1;
        assert!(code.contains("description: 'it\\'s disabled',"));
        assert!(code.contains("sync: true,"));
        assert!(code.ends_with("disabled: nasl.core.Boolean = false;\n"));
    }

    #[test]
    fn test_hyphenated_slot_pair() {
        let members = slot_code(&seed("slot-sub-title", None));
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].0, "slot-sub-title");
        assert!(members[0].1.contains("'slot-sub-title': (current: {}) => Array<nasl.ui.ViewComponent>;"));
        assert_eq!(members[1].0, "slotSubTitle");
        assert!(members[1].1.contains("slotSubTitle: (current: {}) => Array<nasl.ui.ViewComponent>;"));
    }

    #[test]
    fn test_plain_slot_has_no_scope() {
        let members = slot_code(&seed("slotDefault", None));
        assert_eq!(members.len(), 1);
        assert!(members[0].1.contains("slotDefault: () => Array<nasl.ui.ViewComponent>;"));
    }

    #[test]
    fn test_imported_method() {
        let import = ImportDescriptor {
            ty: Some(SemType::function(
                vec![Field::new("id", SemType::String)],
                Some(SemType::Boolean),
                false,
            )),
            ..Default::default()
        };
        let code = &method_code(&seed("validate", Some(&import)))[0].1;
        assert!(code.contains("validate(id: nasl.core.String): Promise<nasl.core.Boolean> {\nreturn null as any;\n}"));

        let code = &method_code(&seed("reload", None))[0].1;
        assert!(code.contains("reload(): void {\n}"));
    }

    #[test]
    fn test_sub_component() {
        let code = sub_component_code(&SubComponentSeed {
            name: "MyTab".into(),
            title: "Tab".into(),
            description: String::new(),
            platform: "pc".into(),
            source_name: Some("Tab".into()),
        });
        assert!(code.contains("sourceName: 'Tab',"));
        assert!(code.contains("description: 'Tab',"));
        assert!(code.contains("export class MyTab extends ViewComponent {"));
        assert!(code.contains("constructor(options?: Partial<MyTabOptions>) {"));
        assert!(code.contains("export class MyTabOptions extends ViewComponentOptions {"));
    }
}

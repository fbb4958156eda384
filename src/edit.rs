//! Wire format of edit requests.
//!
//! ```json
//! { "type": "add", "module": "event", "name": "MyButton", "data": { "name": "click" } }
//! { "type": "update", "module": "prop", "name": "MyButton", "propName": "text", "data": { "title": "Label" } }
//! { "type": "order", "module": "prop", "name": "MyButton", "data": { "names": ["b", "a"], "isOptions": true } }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::kind::Module;
use crate::templates::ImportDescriptor;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EditAction {
    Add(AddAction),
    Update(UpdateAction),
    Remove(RemoveAction),
    Order(OrderAction),
}

impl EditAction {
    /// The component the action targets.
    pub fn component(&self) -> &str {
        match self {
            EditAction::Add(a) => &a.name,
            EditAction::Update(a) => &a.name,
            EditAction::Remove(a) => &a.name,
            EditAction::Order(a) => &a.name,
        }
    }

    pub fn op(&self) -> &'static str {
        match self {
            EditAction::Add(_) => "add",
            EditAction::Update(_) => "update",
            EditAction::Remove(_) => "remove",
            EditAction::Order(_) => "order",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddAction {
    pub module: Module,
    pub name: String,
    #[serde(default)]
    pub data: AddData,
}

/// Payload of `add`. Members use `name`, `group` and `schema`; sub-components use
/// `name` or `sourceName` plus `title`, `description` and `type`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub schema: Option<ImportDescriptor>,
    #[serde(default)]
    pub source_name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub platform: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAction {
    pub module: Module,
    pub name: String,
    #[serde(default)]
    pub prop_name: Option<String>,
    /// `name`, `tsType` and `defaultValue` are structural; every other key edits the
    /// decorator options (`null` deletes the entry).
    #[serde(default)]
    pub data: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveAction {
    pub module: Module,
    pub name: String,
    #[serde(default)]
    pub prop_name: Option<String>,
    #[serde(default)]
    pub data: Option<RemoveData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoveData {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAction {
    #[serde(default)]
    pub module: Option<Module>,
    pub name: String,
    pub data: OrderData,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderData {
    pub names: Vec<String>,
    /// Sort `<Name>Options` instead of `<Name>`.
    #[serde(default)]
    pub is_options: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_add_with_schema() {
        let action: EditAction = serde_json::from_value(json!({
            "type": "add",
            "module": "prop",
            "name": "MyButton",
            "data": {
                "name": "size",
                "schema": {
                    "name": "size",
                    "type": { "type": "string" },
                    "options": [{ "label": "Large", "value": "large" }]
                }
            }
        }))
        .unwrap();
        let EditAction::Add(add) = action else {
            panic!("expected add");
        };
        assert_eq!(add.module, Module::Prop);
        assert_eq!(add.data.name.as_deref(), Some("size"));
        assert_eq!(add.data.schema.unwrap().options.unwrap()[0].label, "Large");
    }

    #[test]
    fn test_deserialize_update_and_order() {
        let actions: Vec<EditAction> = serde_json::from_value(json!([
            { "type": "update", "module": "event", "name": "Foo", "propName": "click", "data": { "title": null } },
            { "type": "order", "name": "Foo", "data": { "names": ["b", "a"], "isOptions": true } },
            { "type": "remove", "module": "subComponent", "name": "Foo", "data": { "name": "Bar" } }
        ]))
        .unwrap();
        assert_eq!(actions.len(), 3);
        match &actions[0] {
            EditAction::Update(u) => {
                assert_eq!(u.prop_name.as_deref(), Some("click"));
                assert_eq!(u.data.get("title"), Some(&Value::Null));
            }
            other => panic!("unexpected {:?}", other),
        }
        match &actions[1] {
            EditAction::Order(o) => {
                assert!(o.data.is_options);
                assert_eq!(o.module, None);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(actions[2].op(), "remove");
        assert_eq!(actions[2].component(), "Foo");
    }

    #[test]
    fn test_unknown_op_is_rejected() {
        let result: Result<EditAction, _> =
            serde_json::from_value(json!({ "type": "rename", "module": "prop", "name": "Foo" }));
        assert!(result.is_err());
    }
}

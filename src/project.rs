//! Project configuration read from the component library's `package.json`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::Result;
use crate::fs::FileSystem;

const LCAP_UI: &str = "lcap-ui";
const LCAP_UI_MODULE_PATH: &str = ".lcap/lcap-ui/lcap-module.json";
const LCAP_UI_CONFIG_PATH: &str = ".lcap/lcap-ui/runtime/nasl.ui.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    Taro,
    React,
    Vue3,
    Vue2,
    Unknown,
}

/// Base UI library a component library extends.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibUiInfo {
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(rename = "type", default)]
    pub device: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub pkg_name: Option<String>,
    #[serde(default)]
    pub framework: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    pub framework: Framework,
    pub name: String,
    pub version: String,
    pub title: String,
    pub description: String,
    pub lib_ui_info: Option<LibUiInfo>,
    /// Absolute path of `lcap.schema`, if configured.
    pub schema_file_path: Option<PathBuf>,
}

fn peer_version<'v>(pkg: &'v Value, name: &str) -> Option<&'v str> {
    pkg.get("peerDependencies")?.get(name)?.as_str()
}

fn has_peer(pkg: &Value, name: &str) -> bool {
    pkg.get("peerDependencies")
        .and_then(Value::as_object)
        .map(|peers| peers.contains_key(name))
        .unwrap_or(false)
}

/// Detects the framework from `peerDependencies`.
pub fn resolve_framework(pkg: &Value) -> Framework {
    if has_peer(pkg, "@tarojs/taro") {
        return Framework::Taro;
    }
    if has_peer(pkg, "react") {
        return Framework::React;
    }
    match peer_version(pkg, "vue") {
        Some(v) if v.starts_with("3.") || v.starts_with("^3.") => Framework::Vue3,
        Some(v) if v.starts_with("2.") || v.starts_with("^2.") => Framework::Vue2,
        _ => Framework::Unknown,
    }
}

fn string_field(pkg: &Value, key: &str) -> String {
    pkg.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

pub fn project_info(fs: &dyn FileSystem, root: &Path) -> Result<ProjectInfo> {
    let pkg = fs.read_json(&root.join("package.json"))?;
    let lcap = pkg.get("lcap");

    let lib_ui_info = lcap
        .and_then(|l| l.get(LCAP_UI))
        .filter(|v| !v.is_null())
        .map(|v| serde_json::from_value::<LibUiInfo>(v.clone()))
        .transpose()?;
    let schema_file_path = lcap
        .and_then(|l| l.get("schema"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(|s| root.join(s));

    Ok(ProjectInfo {
        framework: resolve_framework(&pkg),
        name: string_field(&pkg, "name"),
        version: string_field(&pkg, "version"),
        title: string_field(&pkg, "title"),
        description: string_field(&pkg, "description"),
        lib_ui_info,
        schema_file_path,
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// SOURCE SCHEMA
// ═══════════════════════════════════════════════════════════════════════════════

/// One component of the third-party library a project wraps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceComponent {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Naming convention for components generated from the schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WriteConfig {
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(rename = "type", default)]
    pub platform: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceSchema {
    #[serde(default)]
    pub components: Vec<SourceComponent>,
    #[serde(default)]
    pub write: Option<WriteConfig>,
}

impl SourceSchema {
    pub fn component(&self, name: &str) -> Option<&SourceComponent> {
        self.components.iter().find(|c| c.name == name)
    }
}

/// The schema named by `lcap.schema`, `None` when unset or missing on disk.
pub fn source_schema(fs: &dyn FileSystem, root: &Path) -> Result<Option<SourceSchema>> {
    let Some(path) = project_info(fs, root)?.schema_file_path else {
        return Ok(None);
    };
    if !fs.exists(&path)? {
        return Ok(None);
    }
    let schema = serde_json::from_value(fs.read_json(&path)?)?;
    Ok(Some(schema))
}

/// Components of the base UI library, from its generated `nasl.ui.json`.
///
/// Entries with `show: false` are skipped; the list is sorted by name. Unreadable
/// configuration yields an empty list.
pub fn lcap_ui_component_list(fs: &dyn FileSystem, root: &Path) -> Result<Vec<Value>> {
    if project_info(fs, root)?.lib_ui_info.is_none() {
        return Ok(vec![]);
    }
    let module_path = root.join(LCAP_UI_MODULE_PATH);
    let config_path = root.join(LCAP_UI_CONFIG_PATH);
    if !fs.exists(&module_path)? || !fs.exists(&config_path)? {
        return Ok(vec![]);
    }

    let list = match fs.read_json(&config_path) {
        Ok(Value::Array(list)) => list,
        Ok(_) => return Ok(vec![]),
        Err(e) => {
            warn!(path = %config_path.display(), error = %e, "unreadable lcap-ui config");
            return Ok(vec![]);
        }
    };

    let mut list: Vec<Value> = list
        .into_iter()
        .filter(|c| c.get("show") != Some(&Value::Bool(false)))
        .collect();
    list.sort_by(|a, b| {
        let name = |v: &Value| v.get("name").and_then(Value::as_str).unwrap_or_default().to_string();
        name(a).cmp(&name(b))
    });
    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::NativeFileSystem;
    use serde_json::json;

    #[test]
    fn test_resolve_framework() {
        assert_eq!(resolve_framework(&json!({ "peerDependencies": { "@tarojs/taro": "*", "react": "*" } })), Framework::Taro);
        assert_eq!(resolve_framework(&json!({ "peerDependencies": { "react": "^18" } })), Framework::React);
        assert_eq!(resolve_framework(&json!({ "peerDependencies": { "vue": "^3.3.0" } })), Framework::Vue3);
        assert_eq!(resolve_framework(&json!({ "peerDependencies": { "vue": "2.7.14" } })), Framework::Vue2);
        assert_eq!(resolve_framework(&json!({ "peerDependencies": { "vue": "latest" } })), Framework::Unknown);
        assert_eq!(resolve_framework(&json!({})), Framework::Unknown);
    }

    #[test]
    fn test_project_info_and_schema() {
        let dir = tempfile::tempdir().unwrap();
        let fs = NativeFileSystem;
        fs.write_file(
            &dir.path().join("package.json"),
            &json!({
                "name": "my-lib",
                "version": "1.0.0",
                "title": "My Library",
                "peerDependencies": { "react": "^18" },
                "lcap": { "schema": "schema.json", "lcap-ui": { "pkgName": "@lcap/pc-react-ui", "type": "pc" } }
            })
            .to_string(),
        )
        .unwrap();

        let info = project_info(&fs, dir.path()).unwrap();
        assert_eq!(info.framework, Framework::React);
        assert_eq!(info.name, "my-lib");
        assert_eq!(info.description, "");
        assert_eq!(info.lib_ui_info.unwrap().pkg_name.as_deref(), Some("@lcap/pc-react-ui"));
        assert_eq!(info.schema_file_path, Some(dir.path().join("schema.json")));

        assert_eq!(source_schema(&fs, dir.path()).unwrap(), None);

        fs.write_file(
            &dir.path().join("schema.json"),
            &json!({
                "components": [{ "name": "Tab", "description": "A tab", "props": [] }],
                "write": { "prefix": "ant", "type": "pc" }
            })
            .to_string(),
        )
        .unwrap();
        let schema = source_schema(&fs, dir.path()).unwrap().unwrap();
        assert_eq!(schema.component("Tab").unwrap().description.as_deref(), Some("A tab"));
        assert!(schema.component("Tab").unwrap().extra.contains_key("props"));
        assert_eq!(schema.write.unwrap().prefix.as_deref(), Some("ant"));
    }

    #[test]
    fn test_lcap_ui_component_list() {
        let dir = tempfile::tempdir().unwrap();
        let fs = NativeFileSystem;
        fs.write_file(
            &dir.path().join("package.json"),
            &json!({ "name": "x", "lcap": { "lcap-ui": { "pkgName": "ui" } } }).to_string(),
        )
        .unwrap();
        assert!(lcap_ui_component_list(&fs, dir.path()).unwrap().is_empty());

        fs.write_file(&dir.path().join(LCAP_UI_MODULE_PATH), "{}").unwrap();
        fs.write_file(
            &dir.path().join(LCAP_UI_CONFIG_PATH),
            &json!([{ "name": "Select" }, { "name": "Hidden", "show": false }, { "name": "Button" }]).to_string(),
        )
        .unwrap();
        let list = lcap_ui_component_list(&fs, dir.path()).unwrap();
        let names: Vec<&str> = list.iter().filter_map(|c| c["name"].as_str()).collect();
        assert_eq!(names, vec!["Button", "Select"]);
    }
}

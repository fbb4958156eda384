//! # Component API Sync Engine
//!
//! Keeps the public contract of a low-code UI component (props, events, slots, methods and
//! readable props) in sync with its annotated `api.ts` declaration file.
//!
//! ## Invariants
//!
//! 1. **Scopes**: props, events and slots live on `<Name>Options`; methods and readable
//!    props live on `<Name>`, the class extending `ViewComponent`.
//!
//! 2. **Names**: event names are always `on` + capitalized identifier. Slot names are
//!    `slot` + capitalized identifier or the hyphenated `slot-x`, which always comes with
//!    its camel-cased twin `slotX`.
//!
//! 3. **Uniqueness**: a member name appears once per class. `add` and renames fail with
//!    `E-DUPLICATE` instead of shadowing.
//!
//! 4. **Batches**: a batch of edit actions is written once, after every action succeeded
//!    and the result re-parsed. A failed batch leaves the file untouched.
//!
//! 5. **Types**: `SemType` round-trips through source syntax. Host built-ins such as
//!    `String` or `Array` are rejected with `E-UNSUPPORTED-TYPE`.

#[cfg(feature = "napi")]
use napi_derive::napi;

pub mod annotation;
pub mod discovery;
pub mod edit;
pub mod engine;
pub mod error;
pub mod format;
pub mod fs;
pub mod kind;
pub mod naming;
pub mod project;
pub mod reader;
pub mod sem_type;
pub mod service;
pub mod source;
pub mod templates;
pub mod view;


pub use annotation::TypeAnnotation;
pub use discovery::{component_meta_list, ComponentMeta};
pub use edit::EditAction;
pub use engine::{apply_actions, apply_edits, content_hash, EditContext};
pub use error::{ApiError, ErrorReport, Result};
pub use format::{print_program, serialize, FormatOptions};
pub use fs::{FileStat, FileSystem, FileType, NativeFileSystem};
pub use project::{ProjectInfo, SourceSchema};
pub use reader::{read_declaration, read_declaration_with_types, ComponentDeclaration};
pub use sem_type::SemType;
pub use service::{DeclarationRead, ExtensionService, ServiceOptions};
pub use view::{ViewBlock, ViewComponent, ViewComponentOptions};

// ═══════════════════════════════════════════════════════════════════════════════
// NATIVE BINDINGS
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(feature = "napi")]
fn to_napi(err: ApiError) -> napi::Error {
    napi::Error::from_reason(format!("[{}] {}", err.code(), err))
}

#[cfg(feature = "napi")]
#[napi]
pub fn read_declaration_native(code: String, file_path: String) -> napi::Result<serde_json::Value> {
    let components = read_declaration_with_types(&code, &file_path).map_err(to_napi)?;
    serde_json::to_value(components).map_err(|e| napi::Error::from_reason(e.to_string()))
}

/// Applies a JSON array of edit actions to `ts_path`. `expected_hash` enables the conflict check.
#[cfg(feature = "napi")]
#[napi]
pub fn apply_edits_native(
    root_path: String,
    ts_path: String,
    actions: serde_json::Value,
    expected_hash: Option<String>,
) -> napi::Result<bool> {
    let actions: Vec<EditAction> = serde_json::from_value(actions)
        .map_err(|e| napi::Error::from_reason(format!("Invalid actions: {}", e)))?;
    let service = ExtensionService::native(root_path);
    let path = std::path::Path::new(&ts_path);
    match expected_hash {
        Some(hash) => service.apply_edits_checked(path, &actions, &hash),
        None => service.apply_edits(path, &actions),
    }
    .map_err(to_napi)
}

#[cfg(feature = "napi")]
#[napi]
pub fn component_meta_list_native(root_path: String, parse_api: bool) -> napi::Result<serde_json::Value> {
    let metas = ExtensionService::native(root_path)
        .component_meta_list(parse_api)
        .map_err(to_napi)?;
    serde_json::to_value(metas).map_err(|e| napi::Error::from_reason(e.to_string()))
}

#[cfg(feature = "napi")]
#[napi]
pub fn view_component_native(
    root_path: String,
    api_path: String,
    options: serde_json::Value,
) -> napi::Result<serde_json::Value> {
    let options: ViewComponentOptions = serde_json::from_value(options)
        .map_err(|e| napi::Error::from_reason(format!("Invalid options: {}", e)))?;
    let component = ExtensionService::native(root_path)
        .view_component(std::path::Path::new(&api_path), &options)
        .map_err(to_napi)?;
    serde_json::to_value(component).map_err(|e| napi::Error::from_reason(e.to_string()))
}

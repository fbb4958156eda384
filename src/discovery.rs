//! Component discovery.
//!
//! Scans a component library for `src/**/api.ts` declaration files and extracts the
//! header metadata of each component.

use std::path::{Path, PathBuf};

use oxc_allocator::Allocator;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::fs::FileSystem;
use crate::naming::{camel_case, kebab_name, upper_first};
use crate::reader::{is_component_site, ComponentHeader};
use crate::source::{class_sites, parse_program};

pub const API_GLOB: &str = "src/**/api.ts";

// ═══════════════════════════════════════════════════════════════════════════════
// METADATA TYPES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentMeta {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kebab_name: Option<String>,
    pub ts_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ComponentMeta>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCAN
// ═══════════════════════════════════════════════════════════════════════════════

/// Lists the components of the library at `root`.
///
/// Without `parse_api` each entry only carries a name derived from its folder. With it,
/// every `api.ts` is parsed in parallel; files that fail to parse or declare no component
/// are logged and left out.
pub fn component_meta_list(fs: &dyn FileSystem, root: &Path, parse_api: bool) -> Result<Vec<ComponentMeta>> {
    let files = fs.glob(API_GLOB, root)?;
    debug!(root = %root.display(), count = files.len(), "found api files");

    if !parse_api {
        return Ok(files.into_iter().map(folder_meta).collect());
    }

    let metas = files
        .par_iter()
        .filter_map(|path| match read_meta(fs, path) {
            Ok(Some(meta)) => Some(meta),
            Ok(None) => {
                debug!(path = %path.display(), "no component class");
                None
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to parse component api");
                None
            }
        })
        .collect();
    Ok(metas)
}

fn folder_meta(ts_path: PathBuf) -> ComponentMeta {
    let folder = ts_path
        .parent()
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    ComponentMeta {
        name: upper_first(&camel_case(&folder)),
        ts_path,
        ..Default::default()
    }
}

/// Metadata of the first component class in `path`, with the following ones as children.
pub fn read_meta(fs: &dyn FileSystem, path: &Path) -> Result<Option<ComponentMeta>> {
    let code = fs.read_file(path)?;
    let file = path.display().to_string();
    let allocator = Allocator::default();
    let program = parse_program(&allocator, &code, &file)?;

    let mut primary: Option<ComponentMeta> = None;
    for site in class_sites(&program).iter().filter(|s| is_component_site(s)) {
        let name = site.name().unwrap_or_default().to_string();
        let header = ComponentHeader::read(&site.class.decorators, &code);
        let meta = ComponentMeta {
            kebab_name: Some(kebab_name(&name)),
            name,
            ts_path: path.to_path_buf(),
            title: header.string("title"),
            show: header.bool("show"),
            group: header.string("group"),
            icon: header.string("icon"),
            platform: header.string("type"),
            source_name: header.string("sourceName"),
            children: vec![],
        };
        match primary.as_mut() {
            Some(p) => p.children.push(meta),
            None => primary = Some(meta),
        }
    }
    Ok(primary)
}

//! Editor view of one component: its declaration plus the preview assets found next to it.
//!
//! Assets live beside `api.ts`:
//! - `screenshots/` is listed only when it holds `0.png`
//! - `drawings/` is listed only when it holds `0.svg`
//! - `demos/blocks/BlocksDemo<N>.vue` become blocks, paired with the N-th screenshot and drawing

use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::fs::{FileSystem, FileType};
use crate::project::Framework;
use crate::reader::ComponentDeclaration;

const SCREENSHOTS: (&str, &str) = ("screenshots", "0.png");
const DRAWINGS: (&str, &str) = ("drawings", "0.svg");
const BLOCKS_DIR: &str = "demos/blocks";
const BLOCK_PREFIX: &str = "BlocksDemo";

lazy_static! {
    static ref HTML_COMMENT: Regex = Regex::new(r"<!--(.*?)-->").unwrap();
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewComponentOptions {
    /// Public URL prefix of the asset host.
    pub assets_public_path: String,
    /// `name@version`; defaults to the project's.
    pub lib_info: Option<String>,
    /// Defaults to the detected project framework.
    pub framework: Option<Framework>,
    /// Attach type maps, as the API editor needs them.
    pub with_types: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewComponent {
    #[serde(flatten)]
    pub declaration: ComponentDeclaration,
    pub lib_info: String,
    pub framework: Framework,
    pub screenshots: Vec<String>,
    pub drawings: Vec<String>,
    pub blocks: Vec<ViewBlock>,
}

/// A usage example shown in the component palette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewBlock {
    pub concept: String,
    pub title: String,
    pub description: String,
    pub code: String,
    pub screenshot: String,
    pub drawing: String,
}

/// URL prefix of a component's assets: `<public>/<lib_info>/<folder relative to root>`.
pub fn assets_path(public_path: &str, lib_info: &str, component_dir: &Path, root: &Path) -> String {
    let folder = component_dir
        .strip_prefix(root)
        .unwrap_or(component_dir)
        .to_string_lossy()
        .replace('\\', "/");
    [public_path, lib_info, folder.as_str()].join("/")
}

/// Leading decimal digits of a file name, the sort key for numbered assets.
fn leading_number(name: &str) -> Option<u64> {
    let digits: String = name.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

fn list_assets(fs: &dyn FileSystem, component_dir: &Path, (folder, marker): (&str, &str), assets: &str) -> Result<Vec<String>> {
    let dir = component_dir.join(folder);
    let has_marker = fs
        .stat(&dir.join(marker))?
        .map(|stat| stat.kind == FileType::File)
        .unwrap_or(false);
    if !has_marker {
        return Ok(vec![]);
    }

    let mut names: Vec<String> = fs
        .read_directory(&dir)?
        .into_iter()
        .map(|(name, _)| name)
        .filter(|name| !name.contains(".DS_Store"))
        .collect();
    names.sort_by_key(|name| (leading_number(name).unwrap_or(u64::MAX), name.clone()));
    Ok(names
        .into_iter()
        .map(|name| format!("{}/{}/{}", assets, folder, name))
        .collect())
}

/// Screenshot URLs; an unreadable folder is logged and yields none.
pub fn screenshots(fs: &dyn FileSystem, component_dir: &Path, assets: &str) -> Vec<String> {
    list_assets(fs, component_dir, SCREENSHOTS, assets).unwrap_or_else(|e| {
        warn!(dir = %component_dir.display(), error = %e, "screenshots not readable");
        vec![]
    })
}

/// Drawing URLs; an unreadable folder is logged and yields none.
pub fn drawings(fs: &dyn FileSystem, component_dir: &Path, assets: &str) -> Vec<String> {
    list_assets(fs, component_dir, DRAWINGS, assets).unwrap_or_else(|e| {
        warn!(dir = %component_dir.display(), error = %e, "drawings not readable");
        vec![]
    })
}

fn block_number(name: &str) -> Option<u64> {
    let stem = name.strip_prefix(BLOCK_PREFIX)?.strip_suffix(".vue")?;
    stem.parse().ok()
}

/// Title from the first `<!-- ... -->` comment, which is dropped from the code.
fn parse_block(content: &str) -> (String, String) {
    let (title, body) = match HTML_COMMENT.captures(content) {
        Some(caps) => (
            caps.get(1).map(|m| m.as_str().trim().to_string()).unwrap_or_default(),
            HTML_COMMENT.replace(content, "").to_string(),
        ),
        None => (String::new(), content.to_string()),
    };
    let code = body
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    (title, code)
}

/// Blocks from `demos/blocks/*.vue`, ordered by their number.
pub fn demo_blocks(fs: &dyn FileSystem, component_dir: &Path, screenshots: &[String], drawings: &[String]) -> Result<Vec<ViewBlock>> {
    let dir = component_dir.join(BLOCKS_DIR);
    if !fs.exists(&dir)? {
        return Ok(vec![]);
    }

    let mut files: Vec<String> = fs
        .read_directory(&dir)?
        .into_iter()
        .map(|(name, _)| name)
        .filter(|name| name.ends_with(".vue"))
        .collect();
    files.sort_by_key(|name| (block_number(name).unwrap_or(u64::MAX), name.clone()));

    files
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let (title, code) = parse_block(&fs.read_file(&dir.join(name))?);
            Ok(ViewBlock {
                concept: "ViewBlockWithImage".to_string(),
                title,
                description: String::new(),
                code,
                screenshot: screenshots.get(index).cloned().unwrap_or_default(),
                drawing: drawings.get(index).cloned().unwrap_or_default(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assets_path() {
        let path = assets_path(
            "https://cdn.example.com",
            "foo-lib@0.1.0",
            Path::new("/lib/src/components/foo"),
            Path::new("/lib"),
        );
        assert_eq!(path, "https://cdn.example.com/foo-lib@0.1.0/src/components/foo");
    }

    #[test]
    fn test_parse_block() {
        let (title, code) = parse_block("<!-- Basic usage -->\n<template>\n\n    <el-foo />\n</template>\n");
        assert_eq!(title, "Basic usage");
        assert_eq!(code, "<template>\n<el-foo />\n</template>");

        let (title, code) = parse_block("<el-foo />");
        assert_eq!(title, "");
        assert_eq!(code, "<el-foo />");
    }

    #[test]
    fn test_numbered_names() {
        assert_eq!(leading_number("10.png"), Some(10));
        assert_eq!(leading_number("cover.png"), None);
        assert_eq!(block_number("BlocksDemo3.vue"), Some(3));
        assert_eq!(block_number("Other.vue"), None);
    }
}

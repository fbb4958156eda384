//! Entry point used by host editors: one service per component library.

use std::path::{Path, PathBuf};

use oxc_allocator::Allocator;
use oxc_ast::ast::{ImportDeclarationSpecifier, Statement};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::discovery::{component_meta_list, ComponentMeta};
use crate::edit::EditAction;
use crate::engine::{self, content_hash, EditContext};
use crate::error::{ApiError, Result};
use crate::format::FormatOptions;
use crate::fs::{FileSystem, NativeFileSystem};
use crate::kind::Module;
use crate::project::{self, ProjectInfo, SourceSchema};
use crate::reader::{read_declaration, read_declaration_with_types, ComponentDeclaration};
use crate::source::{apply_replacements, line_extent, parse_program, Replacement};
use crate::templates::DEFAULT_PROP_GROUP;
use crate::view::{self, ViewComponent, ViewComponentOptions};

const EXPORT_FILES: [&str; 2] = ["index.ts", "index.js"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceOptions {
    pub root_path: PathBuf,
    pub format: FormatOptions,
    /// Group given to added props that do not name one.
    pub default_prop_group: String,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            root_path: PathBuf::from("."),
            format: FormatOptions::default(),
            default_prop_group: DEFAULT_PROP_GROUP.to_string(),
        }
    }
}

/// Declarations of one file together with the token for a checked edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclarationRead {
    pub components: Vec<ComponentDeclaration>,
    pub content_hash: String,
}

pub struct ExtensionService {
    options: ServiceOptions,
    fs: Box<dyn FileSystem>,
}

impl ExtensionService {
    pub fn new(options: ServiceOptions, fs: Box<dyn FileSystem>) -> Self {
        Self { options, fs }
    }

    /// Service over the local disk.
    pub fn native(root_path: impl Into<PathBuf>) -> Self {
        Self::new(
            ServiceOptions {
                root_path: root_path.into(),
                ..Default::default()
            },
            Box::new(NativeFileSystem),
        )
    }

    pub fn options(&self) -> &ServiceOptions {
        &self.options
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.options.root_path.join(path)
        }
    }

    pub fn project_info(&self) -> Result<ProjectInfo> {
        project::project_info(self.fs.as_ref(), &self.options.root_path)
    }

    pub fn source_schema(&self) -> Result<Option<SourceSchema>> {
        project::source_schema(self.fs.as_ref(), &self.options.root_path)
    }

    pub fn lcap_ui_component_list(&self) -> Result<Vec<Value>> {
        project::lcap_ui_component_list(self.fs.as_ref(), &self.options.root_path)
    }

    pub fn component_meta_list(&self, parse_api: bool) -> Result<Vec<ComponentMeta>> {
        component_meta_list(self.fs.as_ref(), &self.options.root_path, parse_api)
    }

    fn read_source(&self, path: &Path) -> Result<(String, String)> {
        let path = self.resolve(path);
        let file = path.display().to_string();
        if !self.fs.exists(&path)? {
            return Err(ApiError::NotFound(format!("file `{}`", file)));
        }
        Ok((self.fs.read_file(&path)?, file))
    }

    pub fn read_declaration(&self, path: &Path) -> Result<Vec<ComponentDeclaration>> {
        let (code, file) = self.read_source(path)?;
        read_declaration(&code, &file)
    }

    /// Declarations with type maps plus the content hash to pass to [`Self::apply_edits_checked`].
    pub fn read_declaration_with_types(&self, path: &Path) -> Result<DeclarationRead> {
        let (code, file) = self.read_source(path)?;
        Ok(DeclarationRead {
            components: read_declaration_with_types(&code, &file)?,
            content_hash: content_hash(&code),
        })
    }

    /// Primary component of `api_path` with its preview assets and demo blocks.
    pub fn view_component(&self, api_path: &Path, options: &ViewComponentOptions) -> Result<ViewComponent> {
        let path = self.resolve(api_path);
        let mut components = if options.with_types {
            self.read_declaration_with_types(&path)?.components
        } else {
            self.read_declaration(&path)?
        };
        if components.is_empty() {
            return Err(ApiError::NotFound(format!("component in `{}`", path.display())));
        }
        let declaration = components.remove(0);

        let info = self.project_info()?;
        let lib_info = options
            .lib_info
            .clone()
            .unwrap_or_else(|| format!("{}@{}", info.name, info.version));
        let framework = options.framework.unwrap_or(info.framework);

        let component_dir = path.parent().unwrap_or(Path::new("")).to_path_buf();
        let assets = view::assets_path(&options.assets_public_path, &lib_info, &component_dir, &self.options.root_path);
        let screenshots = view::screenshots(self.fs.as_ref(), &component_dir, &assets);
        let drawings = view::drawings(self.fs.as_ref(), &component_dir, &assets);
        let blocks = view::demo_blocks(self.fs.as_ref(), &component_dir, &screenshots, &drawings)?;
        debug!(component = %declaration.name, blocks = blocks.len(), "view component read");

        Ok(ViewComponent {
            declaration,
            lib_info,
            framework,
            screenshots,
            drawings,
            blocks,
        })
    }

    /// Applies a batch to one declaration file. Nothing is written unless every action succeeds.
    pub fn apply_edits(&self, path: &Path, actions: &[EditAction]) -> Result<bool> {
        self.run_edits(path, actions, None)
    }

    /// Like [`Self::apply_edits`], failing with [`ApiError::Conflict`] when the file no longer
    /// hashes to `expected_hash`.
    pub fn apply_edits_checked(&self, path: &Path, actions: &[EditAction], expected_hash: &str) -> Result<bool> {
        self.run_edits(path, actions, Some(expected_hash))
    }

    fn run_edits(&self, path: &Path, actions: &[EditAction], expected_hash: Option<&str>) -> Result<bool> {
        let path = self.resolve(path);
        let needs_schema = actions.iter().any(|a| {
            matches!(a, EditAction::Add(add) if add.module == Module::SubComponent && add.data.source_name.is_some())
        });

        let ctx = EditContext {
            file: path.display().to_string(),
            schema: if needs_schema { self.source_schema()? } else { None },
            format: self.options.format.clone(),
        };
        let actions = self.with_default_group(actions);
        engine::apply_edits(self.fs.as_ref(), &path, &actions, &ctx, expected_hash)
    }

    fn with_default_group(&self, actions: &[EditAction]) -> Vec<EditAction> {
        actions
            .iter()
            .cloned()
            .map(|mut action| {
                if let EditAction::Add(add) = &mut action {
                    if add.module == Module::Prop && add.data.group.is_none() {
                        add.data.group = Some(self.options.default_prop_group.clone());
                    }
                }
                action
            })
            .collect()
    }

    /// Deletes a component folder and drops its imports and exports from the sibling index file.
    pub fn remove_component(&self, name: &str) -> Result<()> {
        let metas = self.component_meta_list(true)?;
        let meta = metas
            .iter()
            .find(|m| m.name == name)
            .ok_or_else(|| ApiError::NotFound(format!("component `{}`", name)))?;

        let folder = meta
            .ts_path
            .parent()
            .ok_or_else(|| ApiError::NotFound(format!("folder of component `{}`", name)))?
            .to_path_buf();
        let folder_name = folder
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let mut index_file = None;
        if let Some(parent) = folder.parent() {
            for candidate in EXPORT_FILES {
                let path = parent.join(candidate);
                if self.fs.exists(&path)? {
                    index_file = Some(path);
                    break;
                }
            }
        }

        // Rewrite the index before deleting, so a parse failure leaves the library untouched.
        let rewritten = match &index_file {
            Some(path) => {
                let code = self.fs.read_file(path)?;
                let file = path.display().to_string();
                Some((path, strip_module_references(&code, &format!("./{}", folder_name), name, &file)?))
            }
            None => None,
        };

        self.fs.rm(&folder)?;
        if let Some((path, code)) = rewritten {
            self.fs.write_file(path, &code)?;
        }
        info!(component = name, folder = %folder.display(), "component removed");
        Ok(())
    }
}

/// Removes every import/export of `source` and every re-export of the names it provided.
pub fn strip_module_references(code: &str, source: &str, name: &str, file: &str) -> Result<String> {
    let allocator = Allocator::default();
    let program = parse_program(&allocator, code, file)?;

    let mut names = vec![name.to_string()];
    let mut replacements: Vec<Replacement> = Vec::new();
    let remove = |start: u32, end: u32, out: &mut Vec<Replacement>| {
        let (s, e) = line_extent(code, start, end);
        out.push((s, e, String::new()));
    };

    for stmt in &program.body {
        match stmt {
            Statement::ImportDeclaration(import) if import.source.value == source => {
                for specifier in import.specifiers.iter().flatten() {
                    let local = match specifier {
                        ImportDeclarationSpecifier::ImportSpecifier(s) => &s.local,
                        ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => &s.local,
                        ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => &s.local,
                    };
                    names.push(local.name.to_string());
                }
                remove(import.span.start, import.span.end, &mut replacements);
            }
            Statement::ExportAllDeclaration(export) if export.source.value == source => {
                remove(export.span.start, export.span.end, &mut replacements);
            }
            Statement::ExportNamedDeclaration(export)
                if export.source.as_ref().map(|s| s.value == source).unwrap_or(false) =>
            {
                remove(export.span.start, export.span.end, &mut replacements);
            }
            _ => {}
        }
    }

    for stmt in &program.body {
        let Statement::ExportNamedDeclaration(export) = stmt else {
            continue;
        };
        if export.source.is_some() || export.declaration.is_some() {
            continue;
        }
        let kept: Vec<&str> = export
            .specifiers
            .iter()
            .filter(|s| !names.iter().any(|n| n.as_str() == s.local.name().as_str()))
            .map(|s| s.span.source_text(code))
            .collect();
        if kept.len() == export.specifiers.len() {
            continue;
        }
        if kept.is_empty() {
            remove(export.span.start, export.span.end, &mut replacements);
        } else {
            replacements.push((
                export.span.start,
                export.span.end,
                format!("export {{ {} }};", kept.join(", ")),
            ));
        }
    }

    debug!(file, removed = replacements.len(), "stripped module references");
    Ok(apply_replacements(code, replacements))
}

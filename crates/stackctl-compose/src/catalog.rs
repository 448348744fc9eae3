//! Service catalog model and the lookup seam used by the resolver.
//!
//! The catalog is the source of truth for service definitions. The resolver
//! only sees it through [`CatalogLookup`], which the API client implements
//! against the remote server and [`InMemoryCatalog`] implements over
//! definitions loaded from disk.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use stackctl_common::error::{Result, StackctlError};
use stackctl_common::types::ServiceKey;

/// One declared relationship from a service to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// Key of the depended-upon service.
    #[serde(rename = "key")]
    pub target: ServiceKey,
    /// Whether the edge must always be satisfied.
    #[serde(default)]
    pub required: bool,
}

impl DependencyEdge {
    /// Creates a required edge to `target`.
    #[must_use]
    pub fn required(target: impl Into<String>) -> Self {
        Self {
            target: ServiceKey::new(target),
            required: true,
        }
    }

    /// Creates an optional edge to `target`.
    #[must_use]
    pub fn optional(target: impl Into<String>) -> Self {
        Self {
            target: ServiceKey::new(target),
            required: false,
        }
    }
}

/// Catalog entry for one service type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDefinition {
    /// Stable catalog key.
    pub key: ServiceKey,
    /// Human-readable label.
    #[serde(default)]
    pub label: String,
    /// Declared dependencies, in declaration order.
    #[serde(default, rename = "depends")]
    pub dependencies: Vec<DependencyEdge>,
}

impl ServiceDefinition {
    /// Creates a definition with no label.
    #[must_use]
    pub fn new(key: impl Into<String>, dependencies: Vec<DependencyEdge>) -> Self {
        Self {
            key: ServiceKey::new(key),
            label: String::new(),
            dependencies,
        }
    }

    /// Iterates over the targets of the `required` edges.
    pub fn required_targets(&self) -> impl Iterator<Item = &ServiceKey> {
        self.dependencies
            .iter()
            .filter(|edge| edge.required)
            .map(|edge| &edge.target)
    }

    /// Returns the label, or the key when no label is set.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.label.is_empty() {
            self.key.as_str()
        } else {
            &self.label
        }
    }
}

/// Looks up service definitions by key.
///
/// Implementations return `StackctlError::UnknownService` when the key has no
/// catalog entry. Any other error is passed through to the caller unchanged.
pub trait CatalogLookup {
    /// Fetches the definition for `key`.
    ///
    /// # Errors
    ///
    /// Returns `StackctlError::UnknownService` if the catalog has no such key.
    fn get_service(&self, key: &ServiceKey) -> Result<ServiceDefinition>;
}

impl<T: CatalogLookup + ?Sized> CatalogLookup for &T {
    fn get_service(&self, key: &ServiceKey) -> Result<ServiceDefinition> {
        (**self).get_service(key)
    }
}

/// Catalog held entirely in memory.
///
/// Records every lookup it serves, in order, so callers can see exactly which
/// keys a resolution touched.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    services: HashMap<ServiceKey, ServiceDefinition>,
    lookups: RefCell<Vec<ServiceKey>>,
}

impl InMemoryCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a definition.
    pub fn insert(&mut self, definition: ServiceDefinition) {
        let _ = self.services.insert(definition.key.clone(), definition);
    }

    /// Builder-style variant of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, definition: ServiceDefinition) -> Self {
        self.insert(definition);
        self
    }

    /// Loads every `.json` definition found under `dir`, recursively.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be walked or a definition
    /// file cannot be parsed.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut catalog = Self::new();
        for file in load_definitions_dir(dir)? {
            catalog.insert(file.definition);
        }
        tracing::info!(path = %dir.display(), services = catalog.len(), "loaded local catalog");
        Ok(catalog)
    }

    /// Returns the number of definitions held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Returns `true` if the catalog holds no definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Returns the keys looked up so far, in request order.
    #[must_use]
    pub fn lookups(&self) -> Vec<ServiceKey> {
        self.lookups.borrow().clone()
    }
}

impl CatalogLookup for InMemoryCatalog {
    fn get_service(&self, key: &ServiceKey) -> Result<ServiceDefinition> {
        self.lookups.borrow_mut().push(key.clone());
        self.services
            .get(key)
            .cloned()
            .ok_or_else(|| StackctlError::UnknownService {
                key: key.to_string(),
            })
    }
}

/// A service definition read from disk, with its original JSON document.
#[derive(Debug, Clone)]
pub struct DefinitionFile {
    /// File the definition was read from.
    pub path: PathBuf,
    /// The document as written, including fields the client does not model.
    pub raw: serde_json::Value,
    /// The parsed definition.
    pub definition: ServiceDefinition,
}

/// Returns `true` if `path` has the service definition extension.
#[must_use]
pub fn is_definition_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == stackctl_common::constants::DEFINITION_EXTENSION)
}

/// Reads one service definition file.
///
/// Returns `Ok(None)` for files without a `.json` extension.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid definition.
pub fn load_definition_file(path: &Path) -> Result<Option<DefinitionFile>> {
    if !is_definition_file(path) {
        tracing::warn!(path = %path.display(), "skipping file without .json extension");
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|e| StackctlError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let raw: serde_json::Value = serde_json::from_str(&content)?;
    let definition: ServiceDefinition = serde_json::from_value(raw.clone())?;
    Ok(Some(DefinitionFile {
        path: path.to_path_buf(),
        raw,
        definition,
    }))
}

/// Lists every file under `dir`, descending into subdirectories.
///
/// Entries are visited in file-name order so the result is reproducible.
/// Nothing is parsed, so callers can load each file on its own.
///
/// # Errors
///
/// Returns an error if a directory cannot be read.
pub fn definition_paths(dir: &Path) -> Result<Vec<PathBuf>> {
    let io_err = |e| StackctlError::Io {
        path: dir.to_path_buf(),
        source: e,
    };
    let mut entries = std::fs::read_dir(dir)
        .map_err(io_err)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(io_err)?;
    entries.sort();

    let mut paths = Vec::new();
    for path in entries {
        if path.is_dir() {
            paths.extend(definition_paths(&path)?);
        } else {
            paths.push(path);
        }
    }
    Ok(paths)
}

/// Reads every definition file under `dir`, descending into subdirectories.
///
/// # Errors
///
/// Returns an error if a directory cannot be read or any `.json` file fails
/// to parse.
pub fn load_definitions_dir(dir: &Path) -> Result<Vec<DefinitionFile>> {
    let mut files = Vec::new();
    for path in definition_paths(dir)? {
        if let Some(file) = load_definition_file(&path)? {
            files.push(file);
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definition_reads_wire_field_names() {
        let json = r#"{
            "key": "web",
            "label": "Web Frontend",
            "image": "ndslabs/web",
            "depends": [
                { "key": "db", "required": true },
                { "key": "cache" }
            ]
        }"#;
        let def: ServiceDefinition = serde_json::from_str(json).expect("parse");
        assert_eq!(def.key.as_str(), "web");
        assert_eq!(def.display_name(), "Web Frontend");
        assert_eq!(
            def.dependencies,
            vec![DependencyEdge::required("db"), DependencyEdge::optional("cache")]
        );
    }

    #[test]
    fn definition_without_depends_has_no_edges() {
        let def: ServiceDefinition = serde_json::from_str(r#"{"key": "db"}"#).expect("parse");
        assert!(def.dependencies.is_empty());
        assert_eq!(def.display_name(), "db");
    }

    #[test]
    fn required_targets_skips_optional_edges() {
        let def = ServiceDefinition::new(
            "web",
            vec![
                DependencyEdge::required("db"),
                DependencyEdge::optional("cache"),
                DependencyEdge::required("queue"),
            ],
        );
        let targets: Vec<_> = def.required_targets().map(ServiceKey::as_str).collect();
        assert_eq!(targets, vec!["db", "queue"]);
    }

    #[test]
    fn in_memory_catalog_reports_unknown_key() {
        let catalog = InMemoryCatalog::new().with(ServiceDefinition::new("db", vec![]));
        let err = catalog
            .get_service(&ServiceKey::new("nope"))
            .expect_err("should fail");
        assert!(matches!(err, StackctlError::UnknownService { ref key } if key == "nope"));
        assert_eq!(catalog.lookups(), vec![ServiceKey::new("nope")]);
    }

    #[test]
    fn load_dir_walks_subdirectories_and_skips_non_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("nested");
        std::fs::create_dir_all(&nested).expect("mkdir");
        std::fs::write(dir.path().join("db.json"), r#"{"key": "db"}"#).expect("write");
        std::fs::write(
            nested.join("web.json"),
            r#"{"key": "web", "depends": [{"key": "db", "required": true}]}"#,
        )
        .expect("write");
        std::fs::write(dir.path().join("README.md"), "not a definition").expect("write");

        let catalog = InMemoryCatalog::load_dir(dir.path()).expect("load");
        assert_eq!(catalog.len(), 2);
        let web = catalog.get_service(&ServiceKey::new("web")).expect("web");
        assert_eq!(web.dependencies, vec![DependencyEdge::required("db")]);
    }

    #[test]
    fn load_definition_file_keeps_unmodelled_fields() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("svc.json");
        std::fs::write(&path, r#"{"key": "svc", "image": "org/svc:1.0"}"#).expect("write");

        let file = load_definition_file(&path).expect("load").expect("json file");
        assert_eq!(file.raw["image"], "org/svc:1.0");
        assert_eq!(file.definition.key.as_str(), "svc");
    }

    #[test]
    fn load_definitions_dir_fails_on_bad_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("bad.json"), "{").expect("write");
        assert!(load_definitions_dir(dir.path()).is_err());
    }

    #[test]
    fn definition_paths_lists_nested_files_in_name_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("b");
        std::fs::create_dir_all(&nested).expect("mkdir");
        std::fs::write(dir.path().join("c.json"), "{").expect("write");
        std::fs::write(nested.join("a.json"), r#"{"key": "a"}"#).expect("write");
        std::fs::write(dir.path().join("a.txt"), "notes").expect("write");

        let paths = definition_paths(dir.path()).expect("list");
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.strip_prefix(dir.path()).expect("prefix").to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("a.txt"),
                PathBuf::from("b").join("a.json"),
                PathBuf::from("c.json"),
            ]
        );
        assert!(!is_definition_file(&paths[0]));
        assert!(is_definition_file(&paths[2]));
    }
}

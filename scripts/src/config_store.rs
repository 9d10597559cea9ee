//! The config store, a persisted JSON document recording where each contract is deployed
//!
//! Addresses live under dotted paths of the form `deployed.<network>.<contract>`.
//! Every write is a full read-merge-write of the backing document; there is no
//! locking, so two processes migrating against the same document may race.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use serde_json::{Map, Value};

use crate::{
    constants::{CONFIG_PATH_SEPARATOR, DEPLOYED_KEY},
    errors::ScriptError,
    types::DeploymentRecord,
};

/// Build the config path under which a contract's address on a network is recorded
pub fn deployment_key(network: &str, contract: &str) -> String {
    format!("{DEPLOYED_KEY}{CONFIG_PATH_SEPARATOR}{network}{CONFIG_PATH_SEPARATOR}{contract}")
}

/// Backing storage for the config document
pub trait ConfigRepository {
    /// Read the whole document
    fn load(&self) -> Result<Value, ScriptError>;
    /// Replace the whole document
    fn store(&self, document: &Value) -> Result<(), ScriptError>;
}

/// A config document stored as a JSON file on disk
#[derive(Clone, Debug)]
pub struct FileConfigRepository {
    /// The location of the document
    path: PathBuf,
}

impl FileConfigRepository {
    /// Create a repository backed by the file at `path`, which need not exist yet
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The location of the document
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigRepository for FileConfigRepository {
    fn load(&self) -> Result<Value, ScriptError> {
        // A document that was never written is empty
        if !self.path.exists() {
            return Ok(Value::Object(Map::new()));
        }

        let contents = fs::read_to_string(&self.path).map_err(|e| {
            ScriptError::ReadConfig(format!("{}: {}", self.path.display(), e))
        })?;
        if contents.trim().is_empty() {
            return Ok(Value::Object(Map::new()));
        }

        serde_json::from_str(&contents)
            .map_err(|e| ScriptError::ReadConfig(format!("{}: {}", self.path.display(), e)))
    }

    fn store(&self, document: &Value) -> Result<(), ScriptError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                ScriptError::WriteConfig(format!("{}: {}", parent.display(), e))
            })?;
        }

        let serialized =
            serde_json::to_string_pretty(document).map_err(|e| ScriptError::Serde(e.to_string()))?;
        fs::write(&self.path, serialized)
            .map_err(|e| ScriptError::WriteConfig(format!("{}: {}", self.path.display(), e)))
    }
}

/// A config document held in memory
#[derive(Debug)]
pub struct MemoryConfigRepository {
    /// The current document
    document: Mutex<Value>,
}

impl MemoryConfigRepository {
    /// Create an empty in-memory document
    pub fn new() -> Self {
        Self::with_document(Value::Object(Map::new()))
    }

    /// Create an in-memory repository seeded with `document`
    pub fn with_document(document: Value) -> Self {
        Self {
            document: Mutex::new(document),
        }
    }

    /// A copy of the current document
    pub fn document(&self) -> Value {
        match self.document.lock() {
            Ok(document) => document.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Default for MemoryConfigRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigRepository for MemoryConfigRepository {
    fn load(&self) -> Result<Value, ScriptError> {
        Ok(self.document())
    }

    fn store(&self, document: &Value) -> Result<(), ScriptError> {
        let mut current = self
            .document
            .lock()
            .map_err(|e| ScriptError::WriteConfig(e.to_string()))?;
        *current = document.clone();
        Ok(())
    }
}

/// A handle to the config document through an injected repository
#[derive(Debug)]
pub struct ConfigStore<R> {
    /// The backing repository
    repository: R,
}

impl<R: ConfigRepository> ConfigStore<R> {
    /// Create a store over the given repository
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// The backing repository
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Write `value` at the dotted `path`, creating intermediate levels as needed.
    ///
    /// Any existing value at `path` is overwritten, and an intermediate level
    /// holding a non-object value is replaced by an object.
    ///
    /// A document whose root is not an object is rejected and left untouched.
    pub fn set_config(&self, path: &str, value: &str) -> Result<(), ScriptError> {
        let mut document = self.repository.load()?;
        if !document.is_object() {
            return Err(ScriptError::ReadConfig(format!(
                "config document root must be an object, found {}",
                value_kind(&document)
            )));
        }

        set_path(&mut document, path, Value::String(value.to_string()))
            .ok_or_else(|| ScriptError::WriteConfig(format!("cannot set `{path}`")))?;
        self.repository.store(&document)
    }

    /// Read the string at the dotted `path`, if one is recorded there
    pub fn get_config(&self, path: &str) -> Result<Option<String>, ScriptError> {
        let document = self.repository.load()?;
        let value = path
            .split(CONFIG_PATH_SEPARATOR)
            .try_fold(&document, |node, segment| node.get(segment));

        Ok(value.and_then(Value::as_str).map(str::to_string))
    }

    /// Record a deployed contract's checksummed address
    pub fn record_deployment(&self, record: &DeploymentRecord) -> Result<(), ScriptError> {
        self.set_config(
            &deployment_key(&record.network, &record.contract_name),
            &record.checksummed_address(),
        )
    }

    /// All `(contract, address)` pairs recorded for `network`, ordered by contract name
    pub fn deployments(&self, network: &str) -> Result<Vec<(String, String)>, ScriptError> {
        let document = self.repository.load()?;
        let entries = document
            .get(DEPLOYED_KEY)
            .and_then(|deployed| deployed.get(network))
            .and_then(Value::as_object);

        let mut deployments: Vec<(String, String)> = entries
            .into_iter()
            .flatten()
            .filter_map(|(contract, address)| {
                address.as_str().map(|a| (contract.clone(), a.to_string()))
            })
            .collect();
        deployments.sort();

        Ok(deployments)
    }
}

/// The JSON kind of `value`, for error messages
fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Ensure `node` is an object, replacing it with an empty one otherwise
fn ensure_object(node: &mut Value) -> Option<&mut Map<String, Value>> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }

    node.as_object_mut()
}

/// Set `value` at the dotted `path` within `document`
fn set_path(document: &mut Value, path: &str, value: Value) -> Option<()> {
    let segments: Vec<&str> = path.split(CONFIG_PATH_SEPARATOR).collect();
    let (last, parents) = segments.split_last()?;

    let mut node = document;
    for segment in parents {
        node = ensure_object(node)?
            .entry(segment.to_string())
            .or_insert(Value::Null);
    }

    ensure_object(node)?.insert(last.to_string(), value);
    Some(())
}

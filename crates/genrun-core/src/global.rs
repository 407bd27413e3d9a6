//! Persistent cross-run variable store.
//!
//! Values written by the `GLOBAL` command survive across interpreter runs
//! in `~/.genrun/global.json`. The store is read fresh on every access so
//! concurrent runs see each other's writes at the file level; within one
//! run the executor also mirrors writes into the live [`Context`].
//!
//! The on-disk format is a single pretty-printed JSON object.

use std::path::PathBuf;

use serde_json::Value;

use crate::context::Context;

const GLOBAL_FILENAME: &str = "global.json";

/// Returns the genrun home directory (`~/.genrun`), creating it if needed.
pub fn genrun_dir() -> PathBuf {
    let dir = dirs::home_dir()
        .expect("Could not determine home directory")
        .join(".genrun");
    std::fs::create_dir_all(&dir).ok();
    dir
}

/// Handle to the persistent global-variable store.
#[derive(Debug, Clone)]
pub struct GlobalStore {
    path: PathBuf,
}

impl GlobalStore {
    /// Store at the default location, `~/.genrun/global.json`.
    pub fn new() -> Self {
        Self {
            path: genrun_dir().join(GLOBAL_FILENAME),
        }
    }

    /// Store backed by an explicit file, for tests and embedding.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Loads all globals. A missing or unreadable file yields an empty map.
    pub fn load(&self) -> serde_json::Map<String, Value> {
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    /// Writes one variable through to disk.
    pub fn set(&self, key: &str, value: Value) -> std::io::Result<()> {
        let mut globals = self.load();
        globals.insert(key.to_string(), value);
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&globals)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(&self.path, json)
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.load().remove(key)
    }

    /// Merges every stored variable into the given context.
    pub fn merge_into(&self, context: &mut Context) {
        for (key, value) in self.load() {
            context.set(key, value);
        }
    }
}

impl Default for GlobalStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_store(name: &str) -> GlobalStore {
        let path = std::env::temp_dir().join(format!(
            "genrun-global-{}-{}.json",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        GlobalStore::at(path)
    }

    #[test]
    fn test_missing_file_is_empty() {
        let store = temp_store("missing");
        assert!(store.load().is_empty());
        assert_eq!(store.get("anything"), None);
    }

    #[test]
    fn test_set_then_get() {
        let store = temp_store("set");
        store.set("name", json!("world")).unwrap();
        store.set("count", json!(3)).unwrap();
        assert_eq!(store.get("name"), Some(json!("world")));
        assert_eq!(store.get("count"), Some(json!(3)));
        let _ = std::fs::remove_file(store.path());
    }

    #[test]
    fn test_merge_into_context() {
        let store = temp_store("merge");
        store.set("model", json!("llama")).unwrap();
        let mut ctx = Context::new();
        ctx.set("model", json!("overwritten"));
        store.merge_into(&mut ctx);
        assert_eq!(ctx.get("model"), Some(&json!("llama")));
        let _ = std::fs::remove_file(store.path());
    }
}

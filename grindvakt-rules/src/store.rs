//! Ordered rule storage with first-match lookup and tiered persistence.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use tracing::{debug, info};

use grindvakt_core::Connection;

use crate::{Rule, RuleError};

/// The policy table shared by all packet workers.
///
/// Rules keep their insertion order and the first rule whose predicate is
/// satisfied wins, regardless of specificity. Appends take the write lock,
/// so a concurrent scan never observes a partially inserted rule.
pub struct RuleStore {
    path: PathBuf,
    rules: RwLock<Vec<Rule>>,
}

impl RuleStore {
    /// Load every `*.json` rule definition under `path`, sorted by file
    /// name. The directory is created when missing so a first run starts
    /// with an empty table.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RuleError> {
        let path = path.into();
        if !path.exists() {
            fs::create_dir_all(&path).map_err(|source| RuleError::Read {
                path: path.clone(),
                source,
            })?;
        }

        let mut files: Vec<PathBuf> = fs::read_dir(&path)
            .map_err(|source| RuleError::Read {
                path: path.clone(),
                source,
            })?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();

        let mut rules = Vec::with_capacity(files.len());
        for file in files {
            let body = fs::read(&file).map_err(|source| RuleError::Read {
                path: file.clone(),
                source,
            })?;
            let rule: Rule =
                serde_json::from_slice(&body).map_err(|source| RuleError::Parse {
                    path: file.clone(),
                    source,
                })?;
            debug!(rule = %rule.name, file = %file.display(), "loaded rule");
            rules.push(rule);
        }

        info!(count = rules.len(), path = %path.display(), "rule store loaded");
        Ok(Self {
            path,
            rules: RwLock::new(rules),
        })
    }

    pub fn len(&self) -> usize {
        self.rules.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.read().is_empty()
    }

    /// First rule, in insertion order, whose predicate is satisfied by the
    /// connection.
    pub fn find_first_match(&self, con: &Connection) -> Option<Rule> {
        self.rules.read().iter().find(|r| r.matches(con)).cloned()
    }

    /// Append a rule; with `persist`, also commit it to the rule directory
    /// before returning.
    ///
    /// The durable write happens under the same write lock as the append,
    /// so persisted rules hit the disk in insertion order and the
    /// confirmation the caller logs only happens after the commit.
    pub fn add(&self, rule: Rule, persist: bool) -> Result<(), RuleError> {
        let mut rules = self.rules.write();
        if persist {
            self.save(&rule)?;
        }
        rules.push(rule);
        Ok(())
    }

    /// Atomically write one rule definition as `<name>.json`.
    fn save(&self, rule: &Rule) -> Result<(), RuleError> {
        let body = serde_json::to_vec_pretty(rule).map_err(|source| RuleError::Encode {
            name: rule.name.clone(),
            source,
        })?;

        let target = self.path.join(format!("{}.json", rule.name));
        let staging = self.path.join(format!("{}.json.tmp", rule.name));
        fs::write(&staging, &body)
            .and_then(|_| fs::rename(&staging, &target))
            .map_err(|source| RuleError::Persist {
                name: rule.name.clone(),
                source,
            })
    }

    /// Path a persisted rule lands at, mainly useful for diagnostics.
    pub fn rule_path(&self, name: &str) -> PathBuf {
        self.path.join(format!("{name}.json"))
    }

    pub fn dir(&self) -> &Path {
        &self.path
    }
}

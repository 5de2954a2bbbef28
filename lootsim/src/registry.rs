use std::{
    collections::{HashMap, HashSet},
    fs,
    path::{Path, PathBuf},
};

use lootsim_engine::{
    LootLookup, LootTable,
    loot::condition::LootCondition,
};
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("couldn't read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("couldn't parse {path:?}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{0:?} has no data directory")]
    NotADatapack(PathBuf),
}

#[derive(Deserialize, Clone, Debug)]
struct TagFile {
    #[serde(default)]
    replace: bool,
    values: Vec<TagValue>,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(untagged)]
enum TagValue {
    Id(String),
    Entry {
        id: String,
        #[serde(default = "required_default")]
        required: bool,
    },
}

fn required_default() -> bool {
    true
}

impl TagValue {
    fn id(&self) -> &str {
        match self {
            TagValue::Id(id) | TagValue::Entry { id, .. } => id,
        }
    }

    fn required(&self) -> bool {
        match self {
            TagValue::Id(_) => true,
            TagValue::Entry { required, .. } => *required,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PredicateFile {
    Many(Vec<LootCondition>),
    One(LootCondition),
}

/// Everything a datapack can hand the engine: item tags, loot tables and predicates.
///
/// Tags keep their raw values and are flattened when looked up, so a tag may reference
/// tags that were loaded after it.
#[derive(Default)]
pub struct LootRegistry {
    tags: HashMap<String, Vec<TagValue>>,
    tables: HashMap<String, LootTable>,
    predicates: HashMap<String, Vec<LootCondition>>,
}

/// Adds the `minecraft` namespace to bare ids and strips a leading `#`.
pub fn normalize_id(id: &str) -> String {
    let id = id.strip_prefix('#').unwrap_or(id);
    if id.contains(':') {
        id.to_string()
    } else {
        format!("minecraft:{id}")
    }
}

impl LootRegistry {
    /// Loads a datapack. `root` is either the pack directory or its `data` directory.
    pub fn load(root: &Path) -> Result<Self, RegistryError> {
        let data = if root.join("data").is_dir() {
            root.join("data")
        } else if root.file_name().is_some_and(|name| name == "data") && root.is_dir() {
            root.to_path_buf()
        } else {
            return Err(RegistryError::NotADatapack(root.to_path_buf()));
        };

        let mut registry = Self::default();
        for namespace in sorted_entries(&data)? {
            if !namespace.is_dir() {
                continue;
            }
            let Some(ns) = namespace.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            for dir in ["tags/item", "tags/items"] {
                for (id, path) in json_files(&namespace.join(dir), ns)? {
                    let tag: TagFile = read_json(&path)?;
                    registry.add_tag(id, tag);
                }
            }
            for dir in ["loot_table", "loot_tables"] {
                for (id, path) in json_files(&namespace.join(dir), ns)? {
                    registry.tables.insert(id, read_json(&path)?);
                }
            }
            for dir in ["predicate", "predicates"] {
                for (id, path) in json_files(&namespace.join(dir), ns)? {
                    let conditions = match read_json::<PredicateFile>(&path)? {
                        PredicateFile::Many(conditions) => conditions,
                        PredicateFile::One(condition) => vec![condition],
                    };
                    registry.predicates.insert(id, conditions);
                }
            }
        }
        log::debug!(
            "Loaded {} tags, {} loot tables and {} predicates from {:?}",
            registry.tags.len(),
            registry.tables.len(),
            registry.predicates.len(),
            data
        );
        Ok(registry)
    }

    fn add_tag(&mut self, id: String, tag: TagFile) {
        let values = self.tags.entry(id).or_default();
        if tag.replace {
            values.clear();
        }
        values.extend(tag.values);
    }

    pub fn insert_tag(&mut self, id: &str, members: impl IntoIterator<Item = String>) {
        self.add_tag(
            normalize_id(id),
            TagFile {
                replace: true,
                values: members.into_iter().map(TagValue::Id).collect(),
            },
        );
    }

    pub fn insert_table(&mut self, id: &str, table: LootTable) {
        self.tables.insert(normalize_id(id), table);
    }

    pub fn insert_predicate(&mut self, id: &str, conditions: Vec<LootCondition>) {
        self.predicates.insert(normalize_id(id), conditions);
    }

    fn collect_tag(&self, id: &str, visited: &mut HashSet<String>, members: &mut Vec<String>) {
        if !visited.insert(id.to_string()) {
            log::warn!("Tag {id} references itself");
            return;
        }
        let Some(values) = self.tags.get(id) else {
            return;
        };
        for value in values {
            let raw = value.id();
            if raw.starts_with('#') {
                let nested = normalize_id(raw);
                if value.required() && !self.tags.contains_key(&nested) {
                    log::warn!("Tag {id} references missing tag {nested}");
                }
                self.collect_tag(&nested, visited, members);
            } else {
                let member = normalize_id(raw);
                if !members.contains(&member) {
                    members.push(member);
                }
            }
        }
    }
}

impl LootLookup for LootRegistry {
    fn item_tag(&self, tag: &str) -> Vec<String> {
        let mut members = Vec::new();
        self.collect_tag(&normalize_id(tag), &mut HashSet::new(), &mut members);
        members
    }

    fn loot_table(&self, id: &str) -> Option<LootTable> {
        self.tables.get(&normalize_id(id)).cloned()
    }

    fn predicate(&self, name: &str) -> Vec<LootCondition> {
        self.predicates
            .get(&normalize_id(name))
            .cloned()
            .unwrap_or_default()
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, RegistryError> {
    let content = fs::read_to_string(path).map_err(|source| RegistryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| RegistryError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, RegistryError> {
    let io_error = |source: std::io::Error| RegistryError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries = fs::read_dir(dir)
        .map_err(io_error)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_error)?;
    entries.sort();
    Ok(entries)
}

/// Every `.json` file below `dir` with its resource id, `namespace:sub/dir/name`.
fn json_files(dir: &Path, namespace: &str) -> Result<Vec<(String, PathBuf)>, RegistryError> {
    let mut files = Vec::new();
    if dir.is_dir() {
        walk(dir, dir, namespace, &mut files)?;
    }
    Ok(files)
}

fn walk(
    root: &Path,
    dir: &Path,
    namespace: &str,
    files: &mut Vec<(String, PathBuf)>,
) -> Result<(), RegistryError> {
    for path in sorted_entries(dir)? {
        if path.is_dir() {
            walk(root, &path, namespace, files)?;
        } else if path.extension().is_some_and(|ext| ext == "json") {
            let Ok(relative) = path.with_extension("").strip_prefix(root).map(Path::to_path_buf)
            else {
                continue;
            };
            let name = relative
                .components()
                .filter_map(|component| component.as_os_str().to_str())
                .collect::<Vec<_>>()
                .join("/");
            files.push((format!("{namespace}:{name}"), path));
        }
    }
    Ok(())
}

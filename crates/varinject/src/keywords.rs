//! rule set descriptor and keyword map
//!
//! The descriptor selects rule files by keyword:
//!
//! ```json
//! {
//!   "PORT": {},
//!   "CREDENTIALS": {},
//!   "CUSTOM": { "file-list": ["my_rules.json", "more_rules.yaml"] },
//!   "variable_file_name": "out/variables.properties"
//! }
//! ```
//!
//! Every keyword except `CUSTOM` is looked up in the keyword map, a flat mapping of
//! keyword to rule file name.
use crate::files::{self, LoadError};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

pub const CUSTOM_KEYWORD: &str = "CUSTOM";
pub const KEYWORD_FILES: &str = "file-list";
pub const VARIABLE_FILE_NAME_KEY: &str = "variable_file_name";

/// Top level rule set descriptor
#[derive(Debug, Default, Clone)]
pub struct InjectorDescriptor {
    entries: IndexMap<String, serde_yaml::Value>,
}

#[derive(Debug, serde::Deserialize)]
struct CustomKeyword {
    #[serde(rename = "file-list", default)]
    file_list: Option<FileList>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
enum FileList {
    Joined(String),
    List(Vec<String>),
}

impl FileList {
    fn into_names(self) -> Vec<String> {
        match self {
            FileList::Joined(joined) => joined
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(String::from)
                .collect(),
            FileList::List(list) => list,
        }
    }
}

impl InjectorDescriptor {
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let entries: Option<IndexMap<String, serde_yaml::Value>> = files::load_document(path)?;
        tracing::debug!(path=%path.display(), "injector descriptor loaded");
        Ok(Self {
            entries: entries.unwrap_or_default(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Remove and return the variable file location
    pub fn take_variable_file(&mut self) -> Option<PathBuf> {
        let value = self.entries.shift_remove(VARIABLE_FILE_NAME_KEY)?;
        match value.as_str() {
            Some(path) if !path.is_empty() => Some(PathBuf::from(path)),
            _ => {
                tracing::warn!(?value, "ignoring {VARIABLE_FILE_NAME_KEY} that is not a file name");
                None
            }
        }
    }

    /// Remove the custom keyword and return its file list
    pub fn take_custom_files(&mut self) -> Vec<PathBuf> {
        let Some(value) = self.entries.shift_remove(CUSTOM_KEYWORD) else {
            return vec![];
        };

        let file_list = serde_yaml::from_value::<CustomKeyword>(value)
            .ok()
            .and_then(|custom| custom.file_list);

        match file_list {
            Some(file_list) => file_list.into_names().into_iter().map(PathBuf::from).collect(),
            None => {
                tracing::info!("{CUSTOM_KEYWORD} keyword has no {KEYWORD_FILES}, ignored");
                vec![]
            }
        }
    }
}

impl<K: Into<String>> FromIterator<(K, serde_yaml::Value)> for InjectorDescriptor {
    fn from_iter<T: IntoIterator<Item = (K, serde_yaml::Value)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Keyword to rule file name
#[derive(Debug, Default, Clone)]
pub struct KeywordMap {
    entries: IndexMap<String, Option<String>>,
}

impl KeywordMap {
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let entries: Option<IndexMap<String, Option<String>>> = files::load_document(path)?;
        tracing::debug!(path=%path.display(), "keyword file loaded");
        Ok(Self {
            entries: entries.unwrap_or_default(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.entries.contains_key(keyword)
    }

    /// Rule file for `keyword`, `None` when unknown or unset
    pub fn file_name(&self, keyword: &str) -> Option<&str> {
        self.entries
            .get(keyword)
            .and_then(Option::as_deref)
            .filter(|name| !name.is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for KeywordMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), Some(v.into())))
                .collect(),
        }
    }
}

/// Rule files selected by `descriptor`
///
/// Consumes the custom keyword. Relative keyword file names are resolved against
/// `rule_dir`, custom file names are used as given. Each file is listed once.
pub fn resolve_rule_files(
    descriptor: &mut InjectorDescriptor,
    keywords: &KeywordMap,
    rule_dir: &Path,
) -> Vec<PathBuf> {
    let mut rule_files: Vec<PathBuf> = vec![];
    let mut add = |file: PathBuf| {
        if !rule_files.contains(&file) {
            rule_files.push(file);
        }
    };

    for file in descriptor.take_custom_files() {
        tracing::trace!(path=%file.display(), "custom rule file");
        add(file);
    }

    for keyword in descriptor.keywords() {
        if !keywords.contains(keyword) {
            tracing::warn!(%keyword, "unknown injector keyword, skipped");
            continue;
        }

        let Some(file_name) = keywords.file_name(keyword) else {
            tracing::debug!(%keyword, "keyword has no rule file");
            continue;
        };

        let file = Path::new(file_name);
        let file = if file.is_absolute() {
            file.to_path_buf()
        } else {
            rule_dir.join(file)
        };

        tracing::trace!(path=%file.display(), %keyword, "keyword rule file");
        add(file);
    }

    rule_files
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_descriptor(yaml: &str) -> InjectorDescriptor {
        let entries: IndexMap<String, serde_yaml::Value> = serde_yaml::from_str(yaml).unwrap();
        entries.into_iter().collect()
    }

    fn keyword_map() -> KeywordMap {
        [
            ("PORT", "port.json"),
            ("HOST", "host.json"),
            ("ALSO_PORT", "port.json"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn keywords_resolve_against_rule_dir() {
        let mut descriptor = parse_descriptor("PORT: {}\nHOST: {}\nALSO_PORT: {}");
        let files = resolve_rule_files(&mut descriptor, &keyword_map(), Path::new("/rules"));

        assert_eq!(
            files,
            vec![PathBuf::from("/rules/port.json"), PathBuf::from("/rules/host.json")]
        );
    }

    #[test]
    fn unknown_keyword_is_skipped() {
        let mut descriptor = parse_descriptor("NOPE: {}\nHOST: {}");
        let files = resolve_rule_files(&mut descriptor, &keyword_map(), Path::new("rules"));

        assert_eq!(files, vec![PathBuf::from("rules/host.json")]);
    }

    #[test]
    fn custom_file_list() {
        let mut descriptor = parse_descriptor("CUSTOM:\n  file-list: a.json, b.json\nPORT: {}");
        let files = resolve_rule_files(&mut descriptor, &keyword_map(), Path::new("rules"));

        assert_eq!(
            files,
            vec![
                PathBuf::from("a.json"),
                PathBuf::from("b.json"),
                PathBuf::from("rules/port.json")
            ]
        );
        assert_eq!(descriptor.keywords().collect::<Vec<_>>(), vec!["PORT"]);

        let mut descriptor = parse_descriptor("CUSTOM:\n  file-list: [c.json]");
        let files = resolve_rule_files(&mut descriptor, &keyword_map(), Path::new("rules"));
        assert_eq!(files, vec![PathBuf::from("c.json")]);
    }

    #[test]
    fn custom_without_file_list() {
        let mut descriptor = parse_descriptor("CUSTOM: {}");
        let files = resolve_rule_files(&mut descriptor, &keyword_map(), Path::new("rules"));

        assert!(files.is_empty());
        assert!(descriptor.is_empty());
    }

    #[test]
    fn variable_file_is_consumed() {
        let mut descriptor = parse_descriptor("variable_file_name: out/vars.properties\nPORT: {}");

        assert_eq!(
            descriptor.take_variable_file(),
            Some(PathBuf::from("out/vars.properties"))
        );
        assert_eq!(descriptor.take_variable_file(), None);
        assert_eq!(descriptor.keywords().collect::<Vec<_>>(), vec!["PORT"]);
    }
}

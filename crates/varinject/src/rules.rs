//! injector rules
//!
//! A rule names an attribute by its dotted folder path, `Server.SSL.ListenPort`, and
//! optionally a regular expression selecting the part of the value to extract.
//!
//! Rule files are json or yaml, either a list
//!
//! ```json
//! [
//!   "Server.ListenPort",
//!   { "Server.Notes": { "regexp": "[0-9]+", "suffix": "port" } }
//! ]
//! ```
//!
//! or a mapping of path to options
//!
//! ```yaml
//! Server.ListenPort: {}
//! Server.Notes:
//!   regexp: "[0-9]+"
//!   suffix: port
//! ```
use crate::files::{self, LoadError};
use indexmap::IndexMap;
use regex::Regex;
use std::path::{Path, PathBuf};

pub const PATH_SEP: char = '.';

#[derive(thiserror::Error, Debug)]
pub enum RuleError {
    #[error("rule path is empty")]
    EmptyPath,
    #[error("rule path {0:?} contains an empty segment")]
    EmptySegment(String),
    #[error("invalid regexp for rule {path:?}")]
    InvalidPattern {
        path: String,
        #[source]
        source: regex::Error,
    },
}

/// Options of a rule as written in a rule file
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct RuleOptions {
    #[serde(default)]
    pub regexp: Option<String>,
    #[serde(default)]
    pub suffix: Option<String>,
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Clone)]
pub enum RuleMode {
    /// Replace the whole value
    Attribute,
    /// Replace what the pattern matches
    Segment(SegmentRule),
}

#[derive(Debug, Clone)]
pub struct SegmentRule {
    pub pattern: Regex,
    pub suffix: Option<String>,
    /// `suffix` compiled as a regular expression, selects keys of mapping values
    pub key_pattern: Option<Regex>,
}

#[derive(Debug, Clone)]
pub struct InjectorRule {
    pub path: String,
    pub folders: Vec<String>,
    pub attribute: String,
    pub mode: RuleMode,
    /// carried along, not interpreted
    pub force: bool,
}

impl InjectorRule {
    pub fn new(path: &str, options: RuleOptions) -> Result<Self, RuleError> {
        if path.trim().is_empty() {
            return Err(RuleError::EmptyPath);
        }

        let mut folders: Vec<String> = path.split(PATH_SEP).map(|s| s.trim().to_string()).collect();
        if folders.iter().any(String::is_empty) {
            return Err(RuleError::EmptySegment(path.to_string()));
        }

        // split always yields at least one element
        let attribute = folders.pop().unwrap_or_default();

        let mode = match options.regexp {
            None => RuleMode::Attribute,
            Some(regexp) => {
                let pattern = Regex::new(&regexp).map_err(|source| RuleError::InvalidPattern {
                    path: path.to_string(),
                    source,
                })?;

                let key_pattern = options.suffix.as_deref().and_then(|suffix| {
                    Regex::new(suffix)
                        .map_err(|err| {
                            tracing::warn!(%path, %suffix, %err, "suffix is not a valid regexp, mapping values are not matched");
                        })
                        .ok()
                });

                RuleMode::Segment(SegmentRule {
                    pattern,
                    suffix: options.suffix,
                    key_pattern,
                })
            }
        };

        Ok(Self {
            path: path.to_string(),
            folders,
            attribute,
            mode,
            force: options.force,
        })
    }
}

impl std::str::FromStr for InjectorRule {
    type Err = RuleError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        Self::new(path, RuleOptions::default())
    }
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum RawRuleFile {
    List(Vec<RawRule>),
    Map(IndexMap<String, Option<RuleOptions>>),
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum RawRule {
    Path(String),
    Detailed(IndexMap<String, Option<RuleOptions>>),
}

/// Ordered rules of one rule file
#[derive(Debug, Default)]
pub struct RuleSet {
    pub source: Option<PathBuf>,
    pub rules: Vec<InjectorRule>,
}

impl RuleSet {
    /// Load a rule file
    ///
    /// Invalid rules are skipped with a warning.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let raw: RawRuleFile = files::load_document(path)?;
        let mut rule_set = Self::from_entries(flatten(raw));
        rule_set.source = Some(path.to_path_buf());

        tracing::debug!(path=%path.display(), rules = rule_set.rules.len(), "rule file loaded");
        Ok(rule_set)
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (String, RuleOptions)>) -> Self {
        let rules = entries
            .into_iter()
            .filter_map(|(path, options)| match InjectorRule::new(&path, options) {
                Ok(rule) => Some(rule),
                Err(err) => {
                    tracing::warn!(%path, error = %err, "skipping invalid rule");
                    None
                }
            })
            .collect();

        Self {
            source: None,
            rules,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InjectorRule> {
        self.rules.iter()
    }
}

impl FromIterator<InjectorRule> for RuleSet {
    fn from_iter<T: IntoIterator<Item = InjectorRule>>(iter: T) -> Self {
        Self {
            source: None,
            rules: iter.into_iter().collect(),
        }
    }
}

fn flatten(raw: RawRuleFile) -> Vec<(String, RuleOptions)> {
    let detailed = |map: IndexMap<String, Option<RuleOptions>>| {
        map.into_iter()
            .map(|(path, options)| (path, options.unwrap_or_default()))
    };

    match raw {
        RawRuleFile::Map(map) => detailed(map).collect(),
        RawRuleFile::List(list) => list
            .into_iter()
            .flat_map(|entry| match entry {
                RawRule::Path(path) => vec![(path, RuleOptions::default())],
                RawRule::Detailed(map) => detailed(map).collect(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::files::{parse_document, Format};
    use pretty_assertions::assert_eq;

    fn paths(rule_set: &RuleSet) -> Vec<&str> {
        rule_set.iter().map(|rule| rule.path.as_str()).collect()
    }

    #[test]
    fn split_path() {
        let rule: InjectorRule = "Server.SSL.ListenPort".parse().unwrap();
        assert_eq!(rule.folders, vec!["Server", "SSL"]);
        assert_eq!(rule.attribute, "ListenPort");
        assert!(matches!(rule.mode, RuleMode::Attribute));

        let rule: InjectorRule = "Name".parse().unwrap();
        assert!(rule.folders.is_empty());
        assert_eq!(rule.attribute, "Name");
    }

    #[test]
    fn reject_malformed_paths() {
        assert!(matches!("".parse::<InjectorRule>(), Err(RuleError::EmptyPath)));
        assert!(matches!("Server..Port".parse::<InjectorRule>(), Err(RuleError::EmptySegment(_))));
        assert!(matches!("Server.".parse::<InjectorRule>(), Err(RuleError::EmptySegment(_))));
    }

    #[test]
    fn segment_rule() {
        let options = RuleOptions {
            regexp: Some("[0-9]+".into()),
            suffix: Some("port".into()),
            force: true,
        };
        let rule = InjectorRule::new("Server.Notes", options).unwrap();
        let RuleMode::Segment(segment) = &rule.mode else {
            panic!("expected segment rule");
        };

        assert_eq!(segment.suffix.as_deref(), Some("port"));
        assert!(segment.key_pattern.is_some());
        assert!(rule.force);
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let options = RuleOptions {
            regexp: Some("[0-9".into()),
            ..Default::default()
        };
        assert!(matches!(
            InjectorRule::new("Server.Notes", options),
            Err(RuleError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn rule_file_as_list() {
        let raw: RawRuleFile = parse_document(
            r#"[
                "Server.ListenPort",
                { "Server.Notes": { "regexp": "[0-9]+", "suffix": "port" } },
                "Server..Broken",
                { "Machine.NodeManager.ListenAddress": null }
            ]"#,
            Format::Json,
        )
        .unwrap();
        let rule_set = RuleSet::from_entries(flatten(raw));

        assert_eq!(
            paths(&rule_set),
            vec!["Server.ListenPort", "Server.Notes", "Machine.NodeManager.ListenAddress"]
        );
    }

    #[test]
    fn load_remembers_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("port.json");
        std::fs::write(&path, r#"["Server.ListenPort", "Server.SSL.ListenPort"]"#).unwrap();

        let rule_set = RuleSet::load(&path).unwrap();
        assert_eq!(rule_set.source.as_deref(), Some(path.as_path()));
        assert_eq!(paths(&rule_set), vec!["Server.ListenPort", "Server.SSL.ListenPort"]);

        assert!(matches!(
            RuleSet::load(&dir.path().join("missing.json")),
            Err(LoadError::NotFound(_))
        ));
    }

    #[test]
    fn rule_file_as_mapping_keeps_order() {
        let raw: RawRuleFile = parse_document(
            "Server.Notes:\n  regexp: '[0-9]+'\nServer.ListenPort: {}\nCluster.Name:\n",
            Format::Yaml,
        )
        .unwrap();
        let rule_set = RuleSet::from_entries(flatten(raw));

        assert_eq!(paths(&rule_set), vec!["Server.Notes", "Server.ListenPort", "Cluster.Name"]);
    }
}

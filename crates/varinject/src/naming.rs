//! variable names and property tokens
//!
//! A variable name is the canonical folder path of a location joined with the attribute
//! name, e.g. `Server.AdminServer.SSL.ListenPort`. Values extracted by a regular expression
//! carry an additional suffix: `Server.AdminServer.Notes--port`.
//!
//! The placeholder written into the model is `@@PROP:<name>@@`.
use crate::location::Location;
use crate::schema::SchemaResolver;
use crate::value::Value;
use regex::Regex;
use std::sync::OnceLock;

pub const VARIABLE_SEP: char = '.';
pub const SUFFIX_SEP: &str = "--";
const FOLDER_SEP: char = '/';
const PATH_SEP: char = ':';

const PROPERTY_PREFIX: &str = "@@PROP:";
const PROPERTY_END: &str = "@@";

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum NameError {
    #[error("no usable model folder path for location {0}")]
    NoFolderPath(String),
}

pub fn format_as_property(name: &str) -> String {
    format!("{PROPERTY_PREFIX}{name}{PROPERTY_END}")
}

/// Does the value start with a property token
///
/// Values rewritten by a segment rule may carry text after the token, `@@PROP:x@@:7001`.
/// Those count as tokens as well and are not processed again.
pub fn is_property(value: &Value) -> bool {
    value.as_str().is_some_and(is_property_str)
}

pub fn is_property_str(value: &str) -> bool {
    value.starts_with(PROPERTY_PREFIX)
}

/// Matches property tokens embedded anywhere in a string
pub(crate) fn property_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"@@PROP:[^@]+@@").expect("property pattern is valid"))
}

/// Variable name for `attribute` at `location`
pub fn format_name(
    resolver: &dyn SchemaResolver,
    location: &Location,
    attribute: &str,
) -> Result<String, NameError> {
    let folder_path = resolver
        .model_folder_path(location)
        .and_then(|path| normalize_folder_path(&path))
        .ok_or_else(|| NameError::NoFolderPath(location.to_string()))?;

    Ok(format!("{folder_path}{VARIABLE_SEP}{attribute}"))
}

/// Variable name for a segment of `attribute` at `location`
///
/// Without a suffix this is the same as [format_name].
pub fn format_segment_name(
    resolver: &dyn SchemaResolver,
    location: &Location,
    attribute: &str,
    suffix: Option<&str>,
) -> Result<String, NameError> {
    let name = format_name(resolver, location, attribute)?;
    Ok(match suffix {
        Some(suffix) => format!("{name}{SUFFIX_SEP}{suffix}"),
        None => name,
    })
}

/// `topology:/Server/ms1/SSL` -> `Server.ms1.SSL`
fn normalize_folder_path(path: &str) -> Option<String> {
    let (_section, folders) = path.split_once(PATH_SEP)?;
    let folders = folders.trim_matches(FOLDER_SEP);
    if folders.is_empty() {
        return None;
    }

    Some(folders.replace(FOLDER_SEP, &VARIABLE_SEP.to_string()))
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    struct FixedPath(Option<&'static str>);

    impl SchemaResolver for FixedPath {
        fn model_folder_path(&self, _location: &Location) -> Option<String> {
            self.0.map(String::from)
        }

        fn supports_multiple_instances(&self, _location: &Location) -> bool {
            false
        }
    }

    #[test]
    fn property_tokens() {
        assert_eq!(format_as_property("a.b"), "@@PROP:a.b@@");
        assert!(is_property(&Value::from("@@PROP:a.b@@")));
        assert!(is_property(&Value::from("@@PROP:a.b--host@@:7001")));
        assert!(!is_property(&Value::from("x-@@PROP:a.b@@")));
        assert!(!is_property(&Value::from("@@PRO")));
        assert!(!is_property(&Value::Integer(1)));
    }

    #[test]
    fn names_from_folder_path() {
        let location = Location::default();
        let resolver = FixedPath(Some("topology:/Server/AdminServer/SSL"));

        assert_eq!(
            format_name(&resolver, &location, "ListenPort").unwrap(),
            "Server.AdminServer.SSL.ListenPort"
        );
        assert_eq!(
            format_segment_name(&resolver, &location, "Notes", Some("port")).unwrap(),
            "Server.AdminServer.SSL.Notes--port"
        );
        assert_eq!(
            format_segment_name(&resolver, &location, "Notes", None).unwrap(),
            "Server.AdminServer.SSL.Notes"
        );
    }

    #[test]
    fn degenerate_folder_path_is_rejected() {
        let location = Location::new(Some("topology".into()));

        for path in [None, Some("topology:/"), Some("no-section")] {
            assert_eq!(
                format_name(&FixedPath(path), &location, "Name"),
                Err(NameError::NoFolderPath("topology:/".into()))
            );
        }
    }
}

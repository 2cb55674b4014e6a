//! loading yaml and json documents from disk
//!
//! Files ending in `.json` are read with [serde_json], everything else with [serde_yaml].
use crate::value::Value;
use serde::de::DeserializeOwned;
use std::path::Path;

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("File not found: {0}")]
    NotFound(std::path::PathBuf),
    #[error("IO error")]
    IoError(#[from] std::io::Error),
    #[error("Unable to parse json file")]
    JsonParseFailed(#[from] serde_json::Error),
    #[error("Unable to parse yaml file")]
    YamlParseFailed(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Yaml,
        }
    }
}

pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    if !path.is_file() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    tracing::trace!(path=%path.display(), "loading file");
    let contents = std::fs::read_to_string(path)?;
    parse_document(&contents, Format::for_path(path))
}

pub fn parse_document<T: DeserializeOwned>(contents: &str, format: Format) -> Result<T, LoadError> {
    Ok(match format {
        Format::Json => serde_json::from_str(contents)?,
        Format::Yaml => serde_yaml::from_str(contents)?,
    })
}

/// Load a configuration model
pub fn load_model(path: &Path) -> Result<Value, LoadError> {
    let model: Value = match Format::for_path(path) {
        Format::Json => load_document::<serde_json::Value>(path)?.into(),
        Format::Yaml => load_document::<serde_yaml::Value>(path)?.into(),
    };
    tracing::info!(path=%path.display(), "model loaded");
    Ok(model)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn format_by_extension() {
        assert_eq!(Format::for_path(&PathBuf::from("a/b.json")), Format::Json);
        assert_eq!(Format::for_path(&PathBuf::from("a/b.JSON")), Format::Json);
        assert_eq!(Format::for_path(&PathBuf::from("a/b.yaml")), Format::Yaml);
        assert_eq!(Format::for_path(&PathBuf::from("a/b")), Format::Yaml);
    }

    #[test]
    fn missing_file() {
        let result = load_document::<serde_json::Value>(&PathBuf::from("does/not/exist.json"));
        assert!(matches!(result, Err(LoadError::NotFound(_))));
    }
}

//! persisting extracted variables
use crate::traverse::VariableMap;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error("Failed to write variable file {path}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Destination for the variables taken out of a model
pub trait VariableSink {
    fn write(&self, variables: &VariableMap, location: &Path) -> Result<(), SinkError>;
}

/// Writes `name=value` lines, sorted by name
#[derive(Debug, Default, Clone, Copy)]
pub struct PropertiesFileSink;

impl PropertiesFileSink {
    pub fn render(variables: &VariableMap) -> String {
        let mut entries: Vec<_> = variables.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        entries
            .into_iter()
            .map(|(name, value)| format!("{name}={value}\n"))
            .collect()
    }
}

impl VariableSink for PropertiesFileSink {
    fn write(&self, variables: &VariableMap, location: &Path) -> Result<(), SinkError> {
        let failed = |source| SinkError::WriteFailed {
            path: location.to_path_buf(),
            source,
        };

        if let Some(parent) = location.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(failed)?;
        }

        let mut file = std::fs::File::create(location).map_err(failed)?;
        file.write_all(Self::render(variables).as_bytes())
            .map_err(failed)?;

        tracing::debug!(path=%location.display(), count = variables.len(), "variable file written");
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sorted_lines() {
        let variables: VariableMap = [("b.Port", "7001"), ("a.Name", "x=y")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        assert_eq!(PropertiesFileSink::render(&variables), "a.Name=x=y\nb.Port=7001\n");
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/variables.properties");
        let variables: VariableMap = [("a".to_string(), "1".to_string())].into_iter().collect();

        PropertiesFileSink.write(&variables, &path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a=1\n");
    }
}

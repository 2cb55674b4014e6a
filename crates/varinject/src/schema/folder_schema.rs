use super::{FolderValidity, SchemaResolver};
use crate::files::{self, LoadError};
use crate::location::Location;
use indexmap::IndexMap;
use std::path::Path;

const DEFAULT_SECTION: &str = "model";

/// Declarative folder tree, loaded from yaml or json
///
/// ```yaml
/// section: topology
/// folders:
///   Server:
///     multiple: true
///     folders:
///       SSL: {}
///   JMSSystemResource:
///     multiple: true
///     token: JMS
/// ```
#[derive(Debug, Default, serde::Deserialize)]
pub struct FolderSchema {
    /// Section used for locations that do not name one
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub folders: IndexMap<String, FolderSpec>,
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct FolderSpec {
    #[serde(default)]
    pub multiple: bool,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub folders: IndexMap<String, FolderSpec>,
}

impl FolderSchema {
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let schema: Self = files::load_document(path)?;
        tracing::debug!(path=%path.display(), folders = schema.folders.len(), "schema loaded");
        Ok(schema)
    }

    /// Child folders at `location`, `None` when the location leaves the schema
    fn children(&self, location: &Location) -> Option<&IndexMap<String, FolderSpec>> {
        location
            .folders()
            .try_fold(&self.folders, |folders, name| {
                folders.get(name).map(|spec| &spec.folders)
            })
    }

    fn spec(&self, location: &Location) -> Option<&FolderSpec> {
        let (last, parents) = location.entries().split_last()?;
        let mut folders = &self.folders;
        for entry in parents {
            folders = &folders.get(&entry.folder)?.folders;
        }
        folders.get(&last.folder)
    }
}

impl SchemaResolver for FolderSchema {
    fn model_folder_path(&self, location: &Location) -> Option<String> {
        if !location.is_root() {
            self.spec(location)?;
        }

        let section = location
            .section()
            .or(self.section.as_deref())
            .unwrap_or(DEFAULT_SECTION);

        Some(format!("{section}:{}", location.folder_path()))
    }

    fn supports_multiple_instances(&self, location: &Location) -> bool {
        self.spec(location).is_some_and(|spec| spec.multiple)
    }

    fn name_token(&self, location: &Location) -> String {
        match self.spec(location).and_then(|spec| spec.token.clone()) {
            Some(token) => token,
            None => location
                .current_folder()
                .map(str::to_uppercase)
                .unwrap_or_else(|| "NAME".to_string()),
        }
    }

    fn validate_folder_name(&self, location: &Location, folder: &str) -> FolderValidity {
        match self.children(location) {
            Some(children) if children.contains_key(folder) => FolderValidity::Valid,
            _ => FolderValidity::Invalid,
        }
    }
}

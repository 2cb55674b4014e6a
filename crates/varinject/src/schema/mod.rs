//! schema queries needed while walking a model
//!
//! The injector does not know the shape of the configuration it works on. All structural
//! knowledge is asked from a [SchemaResolver] given the current [Location].
mod folder_schema;
pub use folder_schema::{FolderSchema, FolderSpec};

use crate::location::Location;

/// Result of checking a folder name against the schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderValidity {
    /// Known folder, possibly just absent from this model
    Valid,
    /// The schema has no such folder at this location
    Invalid,
}

pub trait SchemaResolver {
    /// Canonical external path of the folder at `location`
    ///
    /// Format: `<section>:/<Folder>/<instance>/...`. `None` when the location is unknown.
    fn model_folder_path(&self, location: &Location) -> Option<String>;

    /// Does the folder at `location` hold named instances
    fn supports_multiple_instances(&self, location: &Location) -> bool;

    /// Token naming instances of the folder at `location`
    fn name_token(&self, location: &Location) -> String {
        location
            .current_folder()
            .map(str::to_uppercase)
            .unwrap_or_else(|| "NAME".to_string())
    }

    /// Is `folder` a valid child folder of `location`
    fn validate_folder_name(&self, _location: &Location, _folder: &str) -> FolderValidity {
        FolderValidity::Valid
    }
}

impl<T: SchemaResolver + ?Sized> SchemaResolver for &T {
    fn model_folder_path(&self, location: &Location) -> Option<String> {
        (**self).model_folder_path(location)
    }

    fn supports_multiple_instances(&self, location: &Location) -> bool {
        (**self).supports_multiple_instances(location)
    }

    fn name_token(&self, location: &Location) -> String {
        (**self).name_token(location)
    }

    fn validate_folder_name(&self, location: &Location, folder: &str) -> FolderValidity {
        (**self).validate_folder_name(location, folder)
    }
}

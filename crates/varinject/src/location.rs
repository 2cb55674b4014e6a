//! current position inside a configuration model
//!
//! A [Location] is the stack of folders walked from the search root. Folders that hold
//! multiple named instances additionally carry the instance currently being visited.
//!
//! ```
//! # use varinject::location::Location;
//! let mut location = Location::new(Some("topology".to_string()));
//! location.push_folder("Server");
//! location.add_instance("SERVER", "AdminServer");
//! location.push_folder("SSL");
//!
//! assert_eq!(location.to_string(), "topology:/Server/AdminServer/SSL");
//! ```

/// One folder of a [Location]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationEntry {
    pub folder: String,
    pub instance: Option<Instance>,
}

/// The named instance of a multi-instance folder
#[derive(Debug, Clone, PartialEq, Eq, derive_new::new)]
pub struct Instance {
    /// token the schema uses for names of this folder
    pub token: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    section: Option<String>,
    entries: Vec<LocationEntry>,
}

impl Location {
    pub fn new(section: Option<String>) -> Self {
        Self {
            section,
            entries: Vec::new(),
        }
    }

    /// Top level model section this location is relative to
    pub fn section(&self) -> Option<&str> {
        self.section.as_deref()
    }

    pub fn entries(&self) -> &[LocationEntry] {
        &self.entries
    }

    pub fn folders(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.folder.as_str())
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn is_root(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn current_folder(&self) -> Option<&str> {
        self.entries.last().map(|entry| entry.folder.as_str())
    }

    pub fn push_folder(&mut self, folder: impl Into<String>) {
        self.entries.push(LocationEntry {
            folder: folder.into(),
            instance: None,
        });
    }

    pub fn pop_folder(&mut self) -> Option<LocationEntry> {
        self.entries.pop()
    }

    /// Name the instance of the innermost folder
    ///
    /// Ignored at the root, there is no folder to name.
    pub fn add_instance(&mut self, token: impl Into<String>, name: impl Into<String>) {
        match self.entries.last_mut() {
            Some(entry) => entry.instance = Some(Instance::new(token.into(), name.into())),
            None => tracing::debug!("instance name added at root location, ignored"),
        }
    }

    pub fn remove_instance(&mut self) -> Option<Instance> {
        self.entries
            .last_mut()
            .and_then(|entry| entry.instance.take())
    }

    /// Folder path without section, e.g. `/Server/AdminServer/SSL`
    pub fn folder_path(&self) -> String {
        let mut path = String::new();
        for entry in &self.entries {
            path.push('/');
            path.push_str(&entry.folder);
            if let Some(instance) = &entry.instance {
                path.push('/');
                path.push_str(&instance.name);
            }
        }

        if path.is_empty() {
            path.push('/');
        }

        path
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(section) = &self.section {
            write!(f, "{section}:")?;
        }
        f.write_str(&self.folder_path())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn push_and_pop_keep_depth() {
        let mut location = Location::default();
        location.push_folder("JDBCSystemResource");
        location.add_instance("DATASOURCE", "Generic1");
        location.push_folder("JdbcResource");
        assert_eq!(location.depth(), 2);
        assert_eq!(location.folder_path(), "/JDBCSystemResource/Generic1/JdbcResource");

        location.pop_folder();
        assert_eq!(location.remove_instance(), Some(Instance::new("DATASOURCE".into(), "Generic1".into())));
        assert_eq!(location.folder_path(), "/JDBCSystemResource");

        location.pop_folder();
        assert!(location.is_root());
        assert_eq!(location.to_string(), "/");
    }

    #[test]
    fn instance_at_root_is_ignored() {
        let mut location = Location::new(Some("resources".into()));
        location.add_instance("DOMAIN", "base_domain");

        assert!(location.is_root());
        assert_eq!(location.to_string(), "resources:/");
    }
}

//! walking the model along the folders of a rule
//!
//! Folders holding named instances fan out: the remaining path is followed below every
//! instance, so a single rule can produce one variable per instance.
use crate::location::Location;
use crate::rules::InjectorRule;
use crate::schema::{FolderValidity, SchemaResolver};
use crate::transform::ValueTransformer;
use crate::value::Value;
use indexmap::IndexMap;

/// Variable name to the literal value it replaced
pub type VariableMap = IndexMap<String, String>;

/// Apply `rule` to `root`
///
/// `location` is the location of `root`. Nothing in here fails, paths that do not lead
/// anywhere are logged and skipped.
pub fn traverse(
    root: &mut Value,
    rule: &InjectorRule,
    location: Location,
    resolver: &dyn SchemaResolver,
) -> VariableMap {
    let depth = location.depth();
    let mut traversal = Traversal {
        resolver,
        rule,
        location,
        variables: VariableMap::new(),
    };

    traversal.descend(root, &rule.folders);
    debug_assert_eq!(traversal.location.depth(), depth);

    traversal.variables
}

struct Traversal<'a> {
    resolver: &'a dyn SchemaResolver,
    rule: &'a InjectorRule,
    location: Location,
    variables: VariableMap,
}

impl<'a> Traversal<'a> {
    #[tracing::instrument(level = "trace", skip_all, fields(location = %self.location))]
    fn descend(&mut self, node: &mut Value, folders: &[String]) {
        let Some((folder, remaining)) = folders.split_first() else {
            self.apply(node);
            return;
        };

        let Some(child) = node.as_object_mut().and_then(|object| object.get_mut(folder)) else {
            self.folder_not_found(folder);
            return;
        };

        tracing::trace!(%folder, "folder found");
        self.location.push_folder(folder.as_str());

        if self.resolver.supports_multiple_instances(&self.location) {
            let token = self.resolver.name_token(&self.location);
            match child.as_object_mut() {
                Some(instances) => {
                    for (instance, instance_node) in instances.iter_mut() {
                        self.location.add_instance(token.as_str(), instance.as_str());
                        self.descend(instance_node, remaining);
                        self.location.remove_instance();
                    }
                }
                None => {
                    tracing::warn!(location = %self.location, rule = %self.rule.path, "expected named instances, skipped");
                }
            }
        } else {
            self.descend(child, remaining);
        }

        self.location.pop_folder();
    }

    fn folder_not_found(&self, folder: &str) {
        match self.resolver.validate_folder_name(&self.location, folder) {
            FolderValidity::Invalid => tracing::warn!(
                %folder,
                rule = %self.rule.path,
                location = %self.location,
                "invalid folder in injector rule"
            ),
            FolderValidity::Valid => tracing::trace!(
                %folder,
                rule = %self.rule.path,
                location = %self.location,
                "folder not present in model"
            ),
        }
    }

    fn apply(&mut self, node: &mut Value) {
        let attribute = self.rule.attribute.as_str();
        let Some(folder) = node
            .as_object_mut()
            .filter(|folder| folder.contains_key(attribute))
        else {
            tracing::debug!(%attribute, rule = %self.rule.path, location = %self.location, "attribute not present in model");
            return;
        };

        let transformer = ValueTransformer::new(self.resolver);
        match transformer.transform(folder, attribute, &self.location, self.rule) {
            Ok(Some(extraction)) => {
                tracing::trace!(name = %extraction.name, "variable injected");
                self.variables.insert(extraction.name, extraction.value);
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(%attribute, rule = %self.rule.path, error = %err, "cannot name variable, attribute skipped");
            }
        }
    }
}

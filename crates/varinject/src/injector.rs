//! driving injection from keyword and rule files
//!
//! 1. load the injector descriptor and the keyword map
//! 2. resolve keywords to rule files
//! 3. apply every rule of every rule file to the model
//! 4. hand the collected variables to a [VariableSink]
//!
//! The model is changed in place while rules are applied. An untouched copy is kept and
//! returned whenever the variables could not be persisted.
use crate::files::LoadError;
use crate::keywords::{self, InjectorDescriptor, KeywordMap};
use crate::location::Location;
use crate::rules::RuleSet;
use crate::schema::SchemaResolver;
use crate::sink::{PropertiesFileSink, VariableSink};
use crate::traverse::{self, VariableMap};
use crate::value::Value;
use std::path::{Path, PathBuf};

pub const VARIABLE_INJECTOR_FILE_NAME: &str = "model_variable_injector.json";
pub const VARIABLE_KEYWORDS_FILE_NAME: &str = "variable_keywords.json";
pub const DEFAULT_FILE_LOCATION: &str = "lib";
pub const HOME_ENV: &str = "VARINJECT_HOME";

/// Where to find injector files, all optional
#[derive(Debug, Clone, Default)]
pub struct InjectorOptions {
    /// Directory of the injector descriptor and of keyword rule files
    pub injector_dir: Option<PathBuf>,
    pub injector_file_name: Option<String>,
    pub keywords_dir: Option<PathBuf>,
    pub keywords_file_name: Option<String>,
    /// Used when the descriptor does not name a variable file
    pub variable_file: Option<PathBuf>,
    /// Top level model sections to search, the whole model when empty
    pub sections: Vec<String>,
}

impl InjectorOptions {
    pub fn with_injector_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.injector_dir = Some(dir.into());
        self
    }

    pub fn with_injector_file_name(mut self, name: impl Into<String>) -> Self {
        self.injector_file_name = Some(name.into());
        self
    }

    pub fn with_keywords_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.keywords_dir = Some(dir.into());
        self
    }

    pub fn with_keywords_file_name(mut self, name: impl Into<String>) -> Self {
        self.keywords_file_name = Some(name.into());
        self
    }

    pub fn with_variable_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.variable_file = Some(path.into());
        self
    }

    pub fn with_sections<S: Into<String>>(mut self, sections: impl IntoIterator<Item = S>) -> Self {
        self.sections = sections.into_iter().map(Into::into).collect();
        self
    }

    /// `$VARINJECT_HOME/lib`, or `lib` when unset
    pub fn default_dir() -> PathBuf {
        match std::env::var_os(HOME_ENV) {
            Some(home) => PathBuf::from(home).join(DEFAULT_FILE_LOCATION),
            None => PathBuf::from(DEFAULT_FILE_LOCATION),
        }
    }

    pub fn rule_dir(&self) -> PathBuf {
        self.injector_dir.clone().unwrap_or_else(Self::default_dir)
    }

    pub fn injector_file(&self) -> PathBuf {
        self.rule_dir().join(
            self.injector_file_name
                .as_deref()
                .unwrap_or(VARIABLE_INJECTOR_FILE_NAME),
        )
    }

    pub fn keywords_file(&self) -> PathBuf {
        self.keywords_dir
            .clone()
            .unwrap_or_else(Self::default_dir)
            .join(
                self.keywords_file_name
                    .as_deref()
                    .unwrap_or(VARIABLE_KEYWORDS_FILE_NAME),
            )
    }
}

/// Result of [VariableInjector::inject_variables_keyword_file]
#[derive(Debug)]
pub struct InjectionOutcome {
    /// Variables were injected and persisted
    pub injected: bool,
    /// The changed model when injected, the original model otherwise
    pub model: Value,
    pub variable_file: Option<PathBuf>,
    pub variables: VariableMap,
}

pub struct VariableInjector<R> {
    original: Value,
    model: Value,
    resolver: R,
    options: InjectorOptions,
}

impl<R: SchemaResolver> VariableInjector<R> {
    pub fn new(model: Value, resolver: R, options: InjectorOptions) -> Self {
        Self {
            original: model.clone(),
            model,
            resolver,
            options,
        }
    }

    /// The model, including all changes so far
    pub fn model(&self) -> &Value {
        &self.model
    }

    /// Inject using the files named by the options, writing a properties file
    pub fn inject_variables_keyword_file(self) -> InjectionOutcome {
        self.inject_with_sink(&PropertiesFileSink)
    }

    pub fn inject_with_sink(mut self, sink: &dyn VariableSink) -> InjectionOutcome {
        let injector_file = self.options.injector_file();
        let descriptor = loaded(InjectorDescriptor::load(&injector_file), &injector_file, "injector");
        let keywords_file = self.options.keywords_file();
        let keyword_map = loaded(KeywordMap::load(&keywords_file), &keywords_file, "keyword");

        let (Some(mut descriptor), Some(keyword_map)) = (descriptor, keyword_map) else {
            return self.not_injected();
        };

        if descriptor.is_empty() || keyword_map.is_empty() {
            tracing::info!(injector=%injector_file.display(), keywords=%keywords_file.display(), "nothing to inject");
            return self.not_injected();
        }

        let Some(variable_file) = descriptor
            .take_variable_file()
            .or_else(|| self.options.variable_file.clone())
        else {
            tracing::warn!(injector=%injector_file.display(), "no variable file configured, variables not injected");
            return self.not_injected();
        };

        let rule_files =
            keywords::resolve_rule_files(&mut descriptor, &keyword_map, &self.options.rule_dir());
        let variables = self.inject_rule_files(&rule_files);

        if variables.is_empty() {
            tracing::debug!("no variables injected");
            return self.not_injected();
        }

        if let Err(err) = sink.write(&variables, &variable_file) {
            tracing::warn!(path=%variable_file.display(), error=?err, "unable to write variables, model left unchanged");
            return self.not_injected();
        }

        tracing::info!(path=%variable_file.display(), count = variables.len(), "variables injected");
        InjectionOutcome {
            injected: true,
            model: self.model,
            variable_file: Some(variable_file),
            variables,
        }
    }

    /// Apply all rules of each rule file
    ///
    /// Files that fail to load are skipped.
    pub fn inject_rule_files(&mut self, rule_files: &[PathBuf]) -> VariableMap {
        let mut variables = VariableMap::new();
        for rule_file in rule_files {
            let Some(rule_set) = loaded(RuleSet::load(rule_file), rule_file, "rule") else {
                continue;
            };

            let entries = self.inject_variables(&rule_set);
            if !entries.is_empty() {
                tracing::trace!(path=%rule_file.display(), count = entries.len(), "rule file injected");
                variables.extend(entries);
            }
        }

        variables
    }

    /// Apply `rule_set` to the model
    ///
    /// Later rules overwrite variables of the same name.
    pub fn inject_variables(&mut self, rule_set: &RuleSet) -> VariableMap {
        let mut variables = VariableMap::new();

        for rule in rule_set.iter() {
            if self.options.sections.is_empty() {
                variables.extend(traverse::traverse(
                    &mut self.model,
                    rule,
                    Location::default(),
                    &self.resolver,
                ));
                continue;
            }

            for section in &self.options.sections {
                let Some(root) = self
                    .model
                    .as_object_mut()
                    .and_then(|model| model.get_mut(section))
                else {
                    tracing::trace!(%section, "section not in model");
                    continue;
                };

                variables.extend(traverse::traverse(
                    root,
                    rule,
                    Location::new(Some(section.clone())),
                    &self.resolver,
                ));
            }
        }

        variables
    }

    fn not_injected(self) -> InjectionOutcome {
        InjectionOutcome {
            injected: false,
            model: self.original,
            variable_file: None,
            variables: VariableMap::new(),
        }
    }
}

fn loaded<T>(result: Result<T, LoadError>, path: &Path, kind: &str) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(path=%path.display(), error=?err, "unable to load {kind} file");
            None
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::rules::InjectorRule;
    use pretty_assertions::assert_eq;

    #[test]
    fn option_paths() {
        let options = InjectorOptions::default()
            .with_injector_dir("/opt/inject")
            .with_keywords_dir("/opt/keywords")
            .with_keywords_file_name("kw.yaml");

        assert_eq!(options.rule_dir(), PathBuf::from("/opt/inject"));
        assert_eq!(
            options.injector_file(),
            PathBuf::from("/opt/inject/model_variable_injector.json")
        );
        assert_eq!(options.keywords_file(), PathBuf::from("/opt/keywords/kw.yaml"));
    }

    #[test]
    fn sections_limit_the_search() {
        struct Flat;
        impl SchemaResolver for Flat {
            fn model_folder_path(&self, location: &Location) -> Option<String> {
                Some(location.to_string())
            }
            fn supports_multiple_instances(&self, _location: &Location) -> bool {
                false
            }
        }

        let model: Value = serde_json::json!({
            "domainInfo": {"Admin": {"Password": "secret"}},
            "topology": {"Admin": {"Password": "other"}},
        })
        .into();
        let rule: InjectorRule = "Admin.Password".parse().unwrap();
        let rules: RuleSet = [rule].into_iter().collect();

        let options = InjectorOptions::default().with_sections(["topology", "resources"]);
        let mut injector = VariableInjector::new(model, Flat, options);
        let variables = injector.inject_variables(&rules);

        assert_eq!(variables.len(), 1);
        assert_eq!(variables["Admin.Password"], "other");
        assert_eq!(
            injector.model().pointer(&["domainInfo", "Admin", "Password"]),
            Some(&Value::from("secret"))
        );
    }
}

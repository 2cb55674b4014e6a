//! replacing attribute values with property tokens
//!
//! The attribute value is either replaced as a whole ([RuleMode::Attribute]) or only the
//! parts matching a regular expression are replaced ([RuleMode::Segment]). Segment rules
//! work on three shapes of values:
//!
//! - scalar: every match in the text is replaced, the first match is the extracted value
//! - list: each element is handled as a scalar
//! - mapping: entries whose *key* matches the rule suffix are replaced as a whole
//!
//! For lists and mappings all matches share one variable name. The value recorded for it is
//! the one of the last match.
use crate::location::Location;
use crate::naming::{self, NameError};
use crate::rules::{InjectorRule, RuleMode, SegmentRule};
use crate::schema::SchemaResolver;
use crate::value::{Object, Value};
use regex::{Captures, Regex};
use std::borrow::Cow;

/// A value moved out of the model
#[derive(Debug, Clone, PartialEq, Eq, derive_new::new)]
pub struct Extraction {
    pub name: String,
    pub value: String,
}

#[derive(derive_new::new)]
pub struct ValueTransformer<'r> {
    resolver: &'r dyn SchemaResolver,
}

impl<'r> ValueTransformer<'r> {
    /// Apply `rule` to `folder[attribute]`
    ///
    /// Returns `None` when nothing was replaced. A missing attribute is not replaced.
    pub fn transform(
        &self,
        folder: &mut Object,
        attribute: &str,
        location: &Location,
        rule: &InjectorRule,
    ) -> Result<Option<Extraction>, NameError> {
        let Some(value) = folder.get_mut(attribute) else {
            return Ok(None);
        };

        match &rule.mode {
            RuleMode::Attribute => self.replace_attribute(value, attribute, location),
            RuleMode::Segment(segment) => match value {
                Value::Array(list) => self.replace_in_list(list, attribute, location, segment),
                Value::Object(object) => {
                    self.replace_in_mapping(object, attribute, location, segment)
                }
                scalar => self.replace_in_scalar(scalar, attribute, location, segment),
            },
        }
    }

    fn replace_attribute(
        &self,
        value: &mut Value,
        attribute: &str,
        location: &Location,
    ) -> Result<Option<Extraction>, NameError> {
        if naming::is_property(value) {
            tracing::trace!(%attribute, %location, "already a property");
            return Ok(None);
        }

        let name = naming::format_name(self.resolver, location, attribute)?;
        let original = std::mem::replace(value, Value::String(naming::format_as_property(&name)));

        Ok(Some(Extraction::new(name, original.to_string())))
    }

    fn segment_name(
        &self,
        location: &Location,
        attribute: &str,
        segment: &SegmentRule,
    ) -> Result<String, NameError> {
        naming::format_segment_name(self.resolver, location, attribute, segment.suffix.as_deref())
    }

    fn replace_in_scalar(
        &self,
        value: &mut Value,
        attribute: &str,
        location: &Location,
        segment: &SegmentRule,
    ) -> Result<Option<Extraction>, NameError> {
        let extracted = self.replace_segment(value, &segment.pattern, || {
            self.segment_name(location, attribute, segment)
        })?;

        if extracted.is_none() {
            tracing::trace!(%attribute, %location, pattern = %segment.pattern, "no match");
        }

        Ok(extracted.map(|(name, value)| Extraction::new(name, value)))
    }

    fn replace_in_list(
        &self,
        list: &mut [Value],
        attribute: &str,
        location: &Location,
        segment: &SegmentRule,
    ) -> Result<Option<Extraction>, NameError> {
        let mut name: Option<String> = None;
        let mut last = None;

        for element in list.iter_mut() {
            if !element.is_scalar() {
                tracing::trace!(%attribute, %location, "skipping nested list element");
                continue;
            }

            let extracted = self.replace_segment(element, &segment.pattern, || {
                if name.is_none() {
                    name = Some(self.segment_name(location, attribute, segment)?);
                }
                Ok(name.clone().unwrap_or_default())
            })?;

            // every match is replaced, the last one is reported
            if extracted.is_some() {
                last = extracted;
            }
        }

        Ok(last.map(|(name, value)| Extraction::new(name, value)))
    }

    fn replace_in_mapping(
        &self,
        object: &mut Object,
        attribute: &str,
        location: &Location,
        segment: &SegmentRule,
    ) -> Result<Option<Extraction>, NameError> {
        let Some(key_pattern) = &segment.key_pattern else {
            tracing::warn!(%attribute, %location, "mapping value needs a valid suffix to select keys, skipped");
            return Ok(None);
        };

        let mut name: Option<String> = None;
        let mut last = None;

        for (key, entry) in object.iter_mut() {
            if naming::is_property(entry) || !key_pattern.is_match(key) {
                continue;
            }

            if name.is_none() {
                name = Some(self.segment_name(location, attribute, segment)?);
            }
            let variable = name.clone().unwrap_or_default();

            tracing::trace!(%attribute, %key, %variable, "replacing mapping entry");
            let original =
                std::mem::replace(entry, Value::String(naming::format_as_property(&variable)));
            last = Some(Extraction::new(variable, original.to_string()));
        }

        Ok(last)
    }

    /// Replace all matches of `pattern` in a scalar value
    ///
    /// `name` is only asked for once a match was found. Returns the variable name and the
    /// first matched text.
    fn replace_segment(
        &self,
        value: &mut Value,
        pattern: &Regex,
        name: impl FnOnce() -> Result<String, NameError>,
    ) -> Result<Option<(String, String)>, NameError> {
        if matches!(value, Value::Null) || naming::is_property(value) {
            return Ok(None);
        }

        let text = value.to_string();
        let Some(matched) = first_segment(&text, pattern) else {
            return Ok(None);
        };

        let name = name()?;
        let rewritten = replace_segments(&text, pattern, &naming::format_as_property(&name));
        tracing::trace!(%text, %rewritten, "segment replaced");

        let matched = matched.to_string();
        *value = Value::String(rewritten);
        Ok(Some((name, matched)))
    }
}

/// Split `text` into plain text and embedded property tokens
fn split_properties(text: &str) -> Vec<(&str, bool)> {
    let mut parts = vec![];
    let mut last = 0;

    for token in naming::property_pattern().find_iter(text) {
        if token.start() > last {
            parts.push((&text[last..token.start()], false));
        }
        parts.push((token.as_str(), true));
        last = token.end();
    }

    if last < text.len() {
        parts.push((&text[last..], false));
    }

    parts
}

/// First non-empty match of `pattern` outside of property tokens
fn first_segment<'t>(text: &'t str, pattern: &Regex) -> Option<&'t str> {
    split_properties(text)
        .into_iter()
        .filter(|(_, is_property)| !is_property)
        .find_map(|(part, _)| {
            pattern
                .find_iter(part)
                .find(|found| !found.as_str().is_empty())
                .map(|found| found.as_str())
        })
}

fn replace_segments(text: &str, pattern: &Regex, replacement: &str) -> String {
    split_properties(text)
        .into_iter()
        .map(|(part, is_property)| {
            if is_property {
                return Cow::Borrowed(part);
            }

            pattern.replace_all(part, |captures: &Captures| {
                if captures[0].is_empty() {
                    String::new()
                } else {
                    replacement.to_string()
                }
            })
        })
        .collect()
}

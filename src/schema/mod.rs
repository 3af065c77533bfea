//! Attribute schema of a provider resource.
//!
//! The schema is plain data: a tree of [Attribute]s keyed by their provider (snake_case) names,
//! each remembering the Kubernetes (camelCase) field it maps to. The same tree drives
//! configuration validation and the translation between provider-shaped values and Kubernetes
//! objects. Large subtrees are generated from a CRD's OpenAPI schema, see [generate].

pub mod generate;
mod validators;

use std::collections::BTreeMap;

use serde_json::Map;
use serde_json::Value as Json;

pub use validators::Validator;

use crate::diagnostics::Diagnostic;
use crate::diagnostics::Diagnostics;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requiredness {
    Required,
    Optional,
    /// Set by the provider only
    Computed,
    /// Either set in configuration or filled in by the provider
    OptionalComputed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanModifier {
    /// A change of the value destroys and recreates the resource
    RequiresReplace,
    /// Keep the prior state value instead of showing it as unknown during planning
    UseStateForUnknown,
}

#[derive(Debug, Clone)]
pub enum AttributeType {
    String,
    Bool,
    Int64,
    Number,
    /// Any JSON value, e.g. `x-kubernetes-int-or-string` fields
    Dynamic,
    List(Box<AttributeType>),
    Map(Box<AttributeType>),
    Object(BTreeMap<String, Attribute>),
}

#[derive(Debug, Clone)]
pub struct Attribute {
    pub json_name: String,
    pub type_: AttributeType,
    pub requiredness: Requiredness,
    pub description: Option<String>,
    pub validators: Vec<Validator>,
    pub plan_modifiers: Vec<PlanModifier>,
    pub default: Option<Json>,
}

impl Attribute {
    pub fn new(json_name: impl Into<String>, type_: AttributeType) -> Self {
        Self {
            json_name: json_name.into(),
            type_,
            requiredness: Requiredness::Optional,
            description: None,
            validators: Vec::new(),
            plan_modifiers: Vec::new(),
            default: None,
        }
    }

    pub fn string(json_name: impl Into<String>) -> Self {
        Self::new(json_name, AttributeType::String)
    }

    pub fn bool(json_name: impl Into<String>) -> Self {
        Self::new(json_name, AttributeType::Bool)
    }

    pub fn int64(json_name: impl Into<String>) -> Self {
        Self::new(json_name, AttributeType::Int64)
    }

    pub fn string_map(json_name: impl Into<String>) -> Self {
        Self::new(json_name, AttributeType::Map(Box::new(AttributeType::String)))
    }

    pub fn object(json_name: impl Into<String>, attributes: BTreeMap<String, Attribute>) -> Self {
        Self::new(json_name, AttributeType::Object(attributes))
    }

    pub fn list_of_objects(json_name: impl Into<String>, attributes: BTreeMap<String, Attribute>) -> Self {
        Self::new(
            json_name,
            AttributeType::List(Box::new(AttributeType::Object(attributes))),
        )
    }

    pub fn required(mut self) -> Self {
        self.requiredness = Requiredness::Required;
        self
    }

    pub fn computed(mut self) -> Self {
        self.requiredness = Requiredness::Computed;
        self
    }

    pub fn optional_computed(mut self) -> Self {
        self.requiredness = Requiredness::OptionalComputed;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn plan_modifier(mut self, modifier: PlanModifier) -> Self {
        self.plan_modifiers.push(modifier);
        self
    }

    pub fn default_value(mut self, default: Json) -> Self {
        self.default = Some(default);
        self
    }

    pub fn is_required(&self) -> bool {
        self.requiredness == Requiredness::Required
    }

    pub fn requires_replace(&self) -> bool {
        self.plan_modifiers.contains(&PlanModifier::RequiresReplace)
    }

    /// Nested attributes of an object, or of the elements of a list of objects.
    pub fn nested(&self) -> Option<&BTreeMap<String, Attribute>> {
        match &self.type_ {
            AttributeType::Object(attributes) => Some(attributes),
            AttributeType::List(element) | AttributeType::Map(element) => match element.as_ref() {
                AttributeType::Object(attributes) => Some(attributes),
                _ => None,
            },
            _ => None,
        }
    }

    fn validate(&self, path: &str, value: Option<&Json>, diagnostics: &mut Diagnostics) {
        let value = value.filter(|v| !v.is_null());
        match (self.requiredness, value) {
            (Requiredness::Required, None) => {
                diagnostics.push(
                    Diagnostic::error("Missing required argument", format!("The argument \"{path}\" is required"))
                        .at(path),
                );
            }
            (Requiredness::Computed, Some(_)) => {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid Configuration for Read-Only Attribute",
                        format!("Cannot set value for attribute \"{path}\", it is computed by the provider"),
                    )
                    .at(path),
                );
            }
            (_, Some(value)) => {
                if self.type_.validate(path, value, diagnostics) {
                    for validator in &self.validators {
                        if let Some(detail) = validator.check(value) {
                            diagnostics.push(Diagnostic::error("Invalid Attribute Value", detail).at(path));
                        }
                    }
                }
            }
            (_, None) => {}
        }
    }
}

impl AttributeType {
    /// Checks the shape of `value`, returning whether it matched so that validators can run.
    fn validate(&self, path: &str, value: &Json, diagnostics: &mut Diagnostics) -> bool {
        let matches = match (self, value) {
            (AttributeType::Dynamic, _) => true,
            (AttributeType::String, Json::String(_)) => true,
            (AttributeType::Bool, Json::Bool(_)) => true,
            (AttributeType::Int64, Json::Number(n)) => n.is_i64() || n.is_u64(),
            (AttributeType::Number, Json::Number(_)) => true,
            (AttributeType::List(element), Json::Array(items)) => {
                for (index, item) in items.iter().enumerate() {
                    element.validate(&format!("{path}[{index}]"), item, diagnostics);
                }
                true
            }
            (AttributeType::Map(element), Json::Object(entries)) => {
                for (key, item) in entries {
                    element.validate(&format!("{path}[\"{key}\"]"), item, diagnostics);
                }
                true
            }
            (AttributeType::Object(attributes), Json::Object(entries)) => {
                validate_object(path, attributes, entries, diagnostics);
                true
            }
            _ => false,
        };

        if !matches {
            diagnostics.push(
                Diagnostic::error(
                    "Incorrect attribute value type",
                    format!("Expected {} for \"{path}\", got: {value}", self.name()),
                )
                .at(path),
            );
        }
        matches
    }

    fn name(&self) -> &'static str {
        match self {
            AttributeType::String => "string",
            AttributeType::Bool => "bool",
            AttributeType::Int64 => "number (int64)",
            AttributeType::Number => "number",
            AttributeType::Dynamic => "dynamic",
            AttributeType::List(_) => "list",
            AttributeType::Map(_) => "map",
            AttributeType::Object(_) => "object",
        }
    }

    fn to_kubernetes(&self, value: &Json) -> Json {
        match (self, value) {
            (AttributeType::List(element), Json::Array(items)) => {
                Json::Array(items.iter().map(|item| element.to_kubernetes(item)).collect())
            }
            (AttributeType::Map(element), Json::Object(entries)) => Json::Object(
                entries
                    .iter()
                    .map(|(key, item)| (key.clone(), element.to_kubernetes(item)))
                    .collect(),
            ),
            (AttributeType::Object(attributes), Json::Object(entries)) => {
                Json::Object(object_to_kubernetes(attributes, entries))
            }
            _ => value.clone(),
        }
    }

    fn from_kubernetes(&self, value: &Json) -> Json {
        match (self, value) {
            (AttributeType::List(element), Json::Array(items)) => {
                Json::Array(items.iter().map(|item| element.from_kubernetes(item)).collect())
            }
            (AttributeType::Map(element), Json::Object(entries)) => Json::Object(
                entries
                    .iter()
                    .map(|(key, item)| (key.clone(), element.from_kubernetes(item)))
                    .collect(),
            ),
            (AttributeType::Object(attributes), Json::Object(entries)) => {
                Json::Object(object_from_kubernetes(attributes, entries))
            }
            _ => value.clone(),
        }
    }

    fn apply_defaults(&self, value: &mut Json) {
        match (self, value) {
            (AttributeType::List(element), Json::Array(items)) => {
                items.iter_mut().for_each(|item| element.apply_defaults(item));
            }
            (AttributeType::Map(element), Json::Object(entries)) => {
                entries.values_mut().for_each(|item| element.apply_defaults(item));
            }
            (AttributeType::Object(attributes), Json::Object(entries)) => {
                object_apply_defaults(attributes, entries);
            }
            _ => {}
        }
    }
}

fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_owned()
    } else {
        format!("{path}.{name}")
    }
}

fn validate_object(
    path: &str,
    attributes: &BTreeMap<String, Attribute>,
    entries: &Map<String, Json>,
    diagnostics: &mut Diagnostics,
) {
    for key in entries.keys().filter(|key| !attributes.contains_key(*key)) {
        let key_path = join(path, key);
        diagnostics.push(
            Diagnostic::error(
                "Unsupported argument",
                format!("An argument named \"{key_path}\" is not expected here"),
            )
            .at(key_path),
        );
    }
    for (name, attribute) in attributes {
        attribute.validate(&join(path, name), entries.get(name), diagnostics);
    }
}

fn object_to_kubernetes(attributes: &BTreeMap<String, Attribute>, entries: &Map<String, Json>) -> Map<String, Json> {
    attributes
        .iter()
        .filter_map(|(name, attribute)| {
            let value = entries.get(name).filter(|v| !v.is_null())?;
            Some((attribute.json_name.clone(), attribute.type_.to_kubernetes(value)))
        })
        .collect()
}

fn object_from_kubernetes(attributes: &BTreeMap<String, Attribute>, entries: &Map<String, Json>) -> Map<String, Json> {
    attributes
        .iter()
        .filter_map(|(name, attribute)| {
            let value = entries.get(&attribute.json_name).filter(|v| !v.is_null())?;
            Some((name.clone(), attribute.type_.from_kubernetes(value)))
        })
        .collect()
}

fn object_apply_defaults(attributes: &BTreeMap<String, Attribute>, entries: &mut Map<String, Json>) {
    for (name, attribute) in attributes {
        match entries.get_mut(name) {
            Some(value) if !value.is_null() => attribute.type_.apply_defaults(value),
            _ => {
                if let Some(default) = &attribute.default {
                    entries.insert(name.clone(), default.clone());
                }
            }
        }
    }
}

/// The full schema of one resource type.
#[derive(Debug, Clone)]
pub struct ResourceSchema {
    pub description: String,
    pub attributes: BTreeMap<String, Attribute>,
}

impl ResourceSchema {
    pub fn new(description: impl Into<String>, attributes: BTreeMap<String, Attribute>) -> Self {
        Self {
            description: description.into(),
            attributes,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Looks up a nested attribute by a dotted path such as `spec.storage.empty_dir`.
    pub fn attribute_at(&self, path: &str) -> Option<&Attribute> {
        let mut segments = path.split('.');
        let mut current = self.attributes.get(segments.next()?)?;
        for segment in segments {
            current = current.nested()?.get(segment)?;
        }
        Some(current)
    }

    /// Validates a provider-shaped configuration object and collects every finding.
    pub fn validate(&self, config: &Json) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        match config {
            Json::Object(entries) => validate_object("", &self.attributes, entries, &mut diagnostics),
            other => diagnostics.add_error(
                "Incorrect attribute value type",
                format!("Expected an object as resource configuration, got: {other}"),
            ),
        }
        diagnostics
    }

    /// Fills in declared defaults for attributes missing from `config`.
    ///
    /// Defaults only apply where the enclosing object is present.
    pub fn apply_defaults(&self, config: &mut Json) {
        if let Json::Object(entries) = config {
            object_apply_defaults(&self.attributes, entries);
        }
    }

    /// Translates the value of the top-level attribute `name` into its Kubernetes form.
    pub fn to_kubernetes(&self, name: &str, value: &Json) -> Option<Json> {
        let attribute = self.attributes.get(name)?;
        Some(attribute.type_.to_kubernetes(value))
    }

    /// Translates a Kubernetes field value into the shape of the top-level attribute `name`,
    /// dropping fields the schema does not know.
    pub fn from_kubernetes(&self, name: &str, value: &Json) -> Option<Json> {
        let attribute = self.attributes.get(name)?;
        Some(attribute.type_.from_kubernetes(value))
    }
}

//! Generates attribute trees from a CRD's OpenAPI v3 schema.

use std::collections::BTreeMap;

use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::JSONSchemaProps;
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::JSONSchemaPropsOrArray;
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::JSONSchemaPropsOrBool;

use super::Attribute;
use super::AttributeType;
use super::Requiredness;
use super::Validator;

/// Returns the OpenAPI schema of the top-level `property` (e.g. `spec`) of the CRD's `version`.
pub fn crd_property<'a>(crd: &'a CustomResourceDefinition, version: &str, property: &str) -> Option<&'a JSONSchemaProps> {
    crd.spec
        .versions
        .iter()
        .find(|v| v.name == version)?
        .schema
        .as_ref()?
        .open_api_v3_schema
        .as_ref()?
        .properties
        .as_ref()?
        .get(property)
}

/// Builds the attribute for an object schema such as a CRD's `spec`.
pub fn attribute(json_name: &str, props: &JSONSchemaProps, required: bool) -> Attribute {
    let mut attribute = Attribute::new(json_name, attribute_type(props));
    attribute.requiredness = if required {
        Requiredness::Required
    } else {
        Requiredness::Optional
    };
    attribute.description = props.description.clone();
    attribute.validators = validators(json_name, props);
    attribute
}

/// Attributes of all properties of an object schema, keyed by their snake_case names.
pub fn attributes(props: &JSONSchemaProps) -> BTreeMap<String, Attribute> {
    let props = unwrap_single_subschema(props);
    let required = props.required.clone().unwrap_or_default();
    props
        .properties
        .iter()
        .flatten()
        .map(|(json_name, child)| {
            let is_required = required.iter().any(|r| r == json_name);
            (to_snake_case(json_name), attribute(json_name, child, is_required))
        })
        .collect()
}

fn attribute_type(props: &JSONSchemaProps) -> AttributeType {
    let props = unwrap_single_subschema(props);
    if props.x_kubernetes_int_or_string == Some(true) {
        return AttributeType::Dynamic;
    }

    match props.type_.as_deref() {
        Some("string") => AttributeType::String,
        Some("boolean") => AttributeType::Bool,
        Some("integer") => AttributeType::Int64,
        Some("number") => AttributeType::Number,
        Some("array") => match &props.items {
            Some(JSONSchemaPropsOrArray::Schema(items)) => AttributeType::List(Box::new(attribute_type(items))),
            _ => AttributeType::List(Box::new(AttributeType::Dynamic)),
        },
        Some("object") => match (&props.properties, &props.additional_properties) {
            (Some(_), _) => AttributeType::Object(attributes(props)),
            (None, Some(JSONSchemaPropsOrBool::Schema(values))) => {
                AttributeType::Map(Box::new(attribute_type(values)))
            }
            _ => AttributeType::Map(Box::new(AttributeType::Dynamic)),
        },
        _ => AttributeType::Dynamic,
    }
}

/// `Option<T>` and newtype wrappers sometimes come out as a lone `allOf`/`anyOf` entry.
fn unwrap_single_subschema(props: &JSONSchemaProps) -> &JSONSchemaProps {
    if props.type_.is_some() || props.properties.is_some() {
        return props;
    }
    for subschemas in [&props.all_of, &props.any_of, &props.one_of].into_iter().flatten() {
        if let [single] = subschemas.as_slice() {
            return unwrap_single_subschema(single);
        }
    }
    props
}

fn validators(json_name: &str, props: &JSONSchemaProps) -> Vec<Validator> {
    let props = unwrap_single_subschema(props);
    let mut validators = Vec::new();

    if let Some(values) = &props.enum_ {
        let values: Vec<String> = values
            .iter()
            .filter_map(|value| value.0.as_str().map(ToOwned::to_owned))
            .collect();
        if !values.is_empty() {
            validators.push(Validator::OneOf(values));
        }
    }
    if let Some(pattern) = &props.pattern {
        match Validator::regex(pattern) {
            Ok(validator) => validators.push(validator),
            Err(error) => {
                log::warn!(field = json_name; "Skipping unsupported pattern {pattern:?}: {error}");
            }
        }
    }
    if let Some(min_length) = props.min_length.filter(|min| *min > 0) {
        validators.push(Validator::LengthAtLeast(min_length as usize));
    }
    if let Some(minimum) = props.minimum {
        validators.push(Validator::AtLeast(minimum.ceil() as i64));
    }

    validators
}

/// Converts a Kubernetes field name (`alertDropLabels`, `podIP`) to a provider attribute name
/// (`alert_drop_labels`, `pod_ip`).
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c == '-' || c == '.' || c == '$' {
            out.push('_');
            continue;
        }
        if c.is_ascii_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_ascii_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_ascii_uppercase() => next.is_some_and(|n| n.is_ascii_lowercase()),
                _ => false,
            };
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: serde_json::Value) -> JSONSchemaProps {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("alertDropLabels"), "alert_drop_labels");
        assert_eq!(to_snake_case("podIP"), "pod_ip");
        assert_eq!(to_snake_case("hostIPC"), "host_ipc");
        assert_eq!(to_snake_case("grpcServerTlsConfig"), "grpc_server_tls_config");
        assert_eq!(to_snake_case("URLPrefix"), "url_prefix");
        assert_eq!(to_snake_case("x-kubernetes-int-or-string"), "x_kubernetes_int_or_string");
        assert_eq!(to_snake_case("replicas"), "replicas");
    }

    #[test]
    fn test_object_properties_become_attributes() {
        // Given: An object schema with required, enum and nested fields
        let spec = props(json!({
            "type": "object",
            "required": ["image"],
            "properties": {
                "image": {"type": "string", "description": "Thanos container image URL."},
                "logFormat": {"type": "string", "enum": ["", "logfmt", "json"]},
                "minReadySeconds": {"type": "integer", "format": "int32", "minimum": 0},
                "nodeSelector": {"type": "object", "additionalProperties": {"type": "string"}},
                "tolerations": {
                    "type": "array",
                    "items": {"type": "object", "properties": {"key": {"type": "string"}}}
                },
                "resources": {
                    "type": "object",
                    "properties": {
                        "limits": {
                            "type": "object",
                            "additionalProperties": {"x-kubernetes-int-or-string": true}
                        }
                    }
                }
            }
        }));

        // When: Generating the attribute tree
        let attributes = attributes(&spec);

        // Then: Names, types, requiredness and validators follow the schema
        let image = &attributes["image"];
        assert!(image.is_required());
        assert_eq!(image.description.as_deref(), Some("Thanos container image URL."));

        let log_format = &attributes["log_format"];
        assert_eq!(log_format.json_name, "logFormat");
        assert!(matches!(&log_format.validators[..], [Validator::OneOf(values)] if values.len() == 3));

        assert!(matches!(
            &attributes["min_ready_seconds"].validators[..],
            [Validator::AtLeast(0)]
        ));
        assert!(matches!(
            &attributes["node_selector"].type_,
            AttributeType::Map(element) if matches!(element.as_ref(), AttributeType::String)
        ));
        assert!(attributes["tolerations"].nested().unwrap().contains_key("key"));
        let limits = &attributes["resources"].nested().unwrap()["limits"];
        assert!(matches!(
            &limits.type_,
            AttributeType::Map(element) if matches!(element.as_ref(), AttributeType::Dynamic)
        ));
    }

    #[test]
    fn test_single_all_of_is_unwrapped() {
        // Given: A nullable reference rendered as a lone allOf
        let wrapped = props(json!({
            "nullable": true,
            "allOf": [{"type": "object", "properties": {"name": {"type": "string"}}}]
        }));

        // When: Resolving its type
        let type_ = attribute_type(&wrapped);

        // Then: The inner object is used
        assert!(matches!(type_, AttributeType::Object(attributes) if attributes.contains_key("name")));
    }

    #[test]
    fn test_crd_property_lookup() {
        // Given: A minimal CRD
        let crd: CustomResourceDefinition = serde_json::from_value(json!({
            "apiVersion": "apiextensions.k8s.io/v1",
            "kind": "CustomResourceDefinition",
            "metadata": {"name": "thanosrulers.monitoring.coreos.com"},
            "spec": {
                "group": "monitoring.coreos.com",
                "names": {"kind": "ThanosRuler", "plural": "thanosrulers"},
                "scope": "Namespaced",
                "versions": [{
                    "name": "v1",
                    "served": true,
                    "storage": true,
                    "schema": {"openAPIV3Schema": {
                        "type": "object",
                        "properties": {"spec": {"type": "object", "properties": {"paused": {"type": "boolean"}}}}
                    }}
                }]
            }
        }))
        .unwrap();

        // Then: The spec schema is found for the served version only
        let spec = crd_property(&crd, "v1", "spec").unwrap();
        assert!(attributes(spec).contains_key("paused"));
        assert!(crd_property(&crd, "v2", "spec").is_none());
    }
}

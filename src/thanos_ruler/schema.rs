use std::collections::BTreeMap;
use std::sync::OnceLock;

use kube::CustomResourceExt;
use serde_json::json;

use super::types::ThanosRuler;
use crate::schema::generate;
use crate::schema::Attribute;
use crate::schema::AttributeType;
use crate::schema::PlanModifier;
use crate::schema::ResourceSchema;
use crate::schema::Validator;

const SPEC_DESCRIPTION: &str = "Specification of the desired behavior of the ThanosRuler cluster. More info: \
     https://github.com/kubernetes/community/blob/master/contributors/devel/sig-architecture/api-conventions.md#spec-and-status";

/// The provider schema of the resource, built once per process.
pub fn resource_schema() -> &'static ResourceSchema {
    static SCHEMA: OnceLock<ResourceSchema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        let mut attributes = bookkeeping_attributes();
        attributes.insert("metadata".to_owned(), metadata_attribute());
        attributes.insert("spec".to_owned(), spec_attribute());
        ResourceSchema::new("ThanosRuler defines a ThanosRuler deployment.", attributes)
    })
}

/// The schema of the manifest data source: the Kubernetes envelope plus the rendered YAML.
pub fn manifest_schema() -> &'static ResourceSchema {
    static SCHEMA: OnceLock<ResourceSchema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        let attributes = BTreeMap::from([
            (
                "id".to_owned(),
                Attribute::string("id")
                    .computed()
                    .description("Contains the value 'metadata.namespace/metadata.name'."),
            ),
            (
                "yaml".to_owned(),
                Attribute::string("yaml")
                    .computed()
                    .description("The generated manifest in YAML format."),
            ),
            ("metadata".to_owned(), metadata_attribute()),
            ("spec".to_owned(), spec_attribute()),
        ]);
        ResourceSchema::new(
            "ThanosRuler defines a ThanosRuler deployment, rendered as a manifest without cluster access.",
            attributes,
        )
    })
}

fn bookkeeping_attributes() -> BTreeMap<String, Attribute> {
    BTreeMap::from([
        (
            "id".to_owned(),
            Attribute::string("id")
                .computed()
                .plan_modifier(PlanModifier::UseStateForUnknown)
                .description("Contains the value 'metadata.namespace/metadata.name'."),
        ),
        (
            "force_conflicts".to_owned(),
            Attribute::bool("forceConflicts").optional_computed().description(
                "If 'true', server-side apply will force the changes against conflicts. If not specified, uses the \
                 provider configuration 'force_conflicts'.",
            ),
        ),
        (
            "field_manager".to_owned(),
            Attribute::string("fieldManager")
                .optional_computed()
                .validator(Validator::LengthAtLeast(1))
                .description(
                    "The name of the manager used to track field ownership. If not specified uses the value from \
                     the provider configuration.",
                ),
        ),
        (
            "deletion_propagation".to_owned(),
            Attribute::string("deletionPropagation")
                .optional_computed()
                .validator(Validator::one_of_case_insensitive(["Orphan", "Background", "Foreground"]))
                .description(
                    "Decides if a deletion will propagate to the dependents of the object, and how the garbage \
                     collector will handle the propagation.",
                ),
        ),
        (
            "wait_for_upsert".to_owned(),
            Attribute::list_of_objects("waitForUpsert", wait_for_upsert_attributes())
                .optional_computed()
                .description("Wait for the resource to reach the desired state after creation or update."),
        ),
        (
            "wait_for_delete".to_owned(),
            Attribute::object("waitForDelete", wait_timing_attributes())
                .optional_computed()
                .description("Wait for the resource to be deleted."),
        ),
    ])
}

fn wait_timing_attributes() -> BTreeMap<String, Attribute> {
    BTreeMap::from([
        (
            "timeout".to_owned(),
            Attribute::int64("timeout")
                .optional_computed()
                .default_value(json!(30))
                .validator(Validator::AtLeast(0))
                .description("The length of time to wait before giving up."),
        ),
        (
            "poll_interval".to_owned(),
            Attribute::int64("pollInterval")
                .optional_computed()
                .default_value(json!(5))
                .validator(Validator::AtLeast(0))
                .description("The length of time to wait before checking again."),
        ),
    ])
}

fn wait_for_upsert_attributes() -> BTreeMap<String, Attribute> {
    let mut attributes = wait_timing_attributes();
    attributes.insert(
        "jsonpath".to_owned(),
        Attribute::string("jsonpath")
            .required()
            .description("Relaxed JSONPath expression to use."),
    );
    attributes.insert(
        "value".to_owned(),
        Attribute::string("value")
            .optional_computed()
            .description("Value to wait for."),
    );
    attributes
}

fn metadata_attribute() -> Attribute {
    let attributes = BTreeMap::from([
        (
            "name".to_owned(),
            Attribute::string("name")
                .required()
                .validator(Validator::ObjectName)
                .validator(Validator::LengthAtLeast(1))
                .plan_modifier(PlanModifier::RequiresReplace)
                .description(
                    "Unique identifier for this object within its namespace. Changing this forces a new resource \
                     to be created.",
                ),
        ),
        (
            "namespace".to_owned(),
            Attribute::string("namespace")
                .required()
                .validator(Validator::ObjectName)
                .validator(Validator::LengthAtLeast(1))
                .plan_modifier(PlanModifier::RequiresReplace)
                .description(
                    "The namespace of the object. Changing this forces a new resource to be created.",
                ),
        ),
        (
            "labels".to_owned(),
            Attribute::string_map("labels")
                .optional_computed()
                .description("Map of string keys and values that can be used to organize and categorize objects."),
        ),
        (
            "annotations".to_owned(),
            Attribute::string_map("annotations").optional_computed().description(
                "Annotations is an unstructured key value map stored with a resource that may be set by external \
                 tools to store and retrieve arbitrary metadata.",
            ),
        ),
    ]);

    Attribute::object("metadata", attributes)
        .required()
        .description("Data that helps uniquely identify this object.")
}

fn spec_attribute() -> Attribute {
    let crd = ThanosRuler::crd();
    let attribute = match generate::crd_property(&crd, "v1", "spec") {
        Some(props) => generate::attribute("spec", props, false),
        None => {
            log::warn!(kind = "ThanosRuler"; "CRD schema has no spec, falling back to an untyped spec");
            Attribute::new("spec", AttributeType::Map(Box::new(AttributeType::Dynamic)))
        }
    };
    attribute.description(SPEC_DESCRIPTION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Requiredness;

    #[test]
    fn test_bookkeeping_attributes() {
        let schema = resource_schema();

        assert_eq!(schema.attribute("id").unwrap().requiredness, Requiredness::Computed);
        assert_eq!(
            schema.attribute("force_conflicts").unwrap().requiredness,
            Requiredness::OptionalComputed
        );
        assert!(schema.attribute_at("wait_for_upsert.jsonpath").unwrap().is_required());
        assert_eq!(
            schema.attribute_at("wait_for_delete.timeout").unwrap().default,
            Some(json!(30))
        );
    }

    #[test]
    fn test_metadata_name_and_namespace_require_replacement() {
        let schema = resource_schema();

        assert!(schema.attribute("metadata").unwrap().is_required());
        assert!(schema.attribute_at("metadata.name").unwrap().requires_replace());
        assert!(schema.attribute_at("metadata.namespace").unwrap().requires_replace());
        assert!(!schema.attribute_at("metadata.labels").unwrap().requires_replace());
    }

    #[test]
    fn test_spec_is_generated_from_the_crd() {
        let schema = resource_schema();

        let spec = schema.attribute("spec").unwrap();
        assert!(!spec.is_required());
        assert_eq!(spec.description.as_deref(), Some(SPEC_DESCRIPTION));

        let alert_drop_labels = schema.attribute_at("spec.alert_drop_labels").unwrap();
        assert_eq!(alert_drop_labels.json_name, "alertDropLabels");
        assert!(matches!(alert_drop_labels.type_, AttributeType::List(_)));

        assert!(schema.attribute_at("spec.affinity.node_affinity").is_some());
        assert!(schema.attribute_at("spec.tolerations.toleration_seconds").is_some());
        assert!(schema.attribute_at("spec.storage.volume_claim_template.spec").is_some());
        assert_eq!(
            schema.attribute_at("spec.grpc_server_tls_config").unwrap().json_name,
            "grpcServerTlsConfig"
        );

        assert!(schema.attribute_at("spec.enable_features").is_some());
        assert!(schema.attribute_at("spec.remote_write.url").unwrap().is_required());
        assert!(schema.attribute_at("spec.remote_write.queue_config.max_shards").is_some());
        let grace_period = schema.attribute_at("spec.rule_grace_period").unwrap();
        assert_eq!(grace_period.json_name, "ruleGracePeriod");
        assert!(matches!(&grace_period.validators[..], [Validator::RegexMatches(_)]));
        assert_eq!(
            schema
                .attribute_at("spec.web.http_config.headers.x_xss_protection")
                .unwrap()
                .json_name,
            "xXSSProtection"
        );
    }

    #[test]
    fn test_spec_validators_come_from_the_crd() {
        let schema = resource_schema();

        let retention = schema.attribute_at("spec.retention").unwrap();
        assert!(matches!(&retention.validators[..], [Validator::RegexMatches(_)]));

        let log_format = schema.attribute_at("spec.log_format").unwrap();
        assert!(log_format
            .validators
            .iter()
            .any(|v| matches!(v, Validator::OneOf(values) if values.contains(&"logfmt".to_string()))));
    }

    #[test]
    fn test_manifest_schema_has_yaml() {
        let schema = manifest_schema();

        assert_eq!(schema.attribute("yaml").unwrap().requiredness, Requiredness::Computed);
        assert!(schema.attribute("force_conflicts").is_none());
        assert!(schema.attribute_at("spec.replicas").is_some());
    }
}

//! Conversion between provider-shaped plan/state values and [ThanosRulerResourceData].
//!
//! Provider values use snake_case attribute names all the way down (`spec.alert_drop_labels`),
//! the record holds the Kubernetes shape. The attribute schema does the renaming.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use serde_json::Map;
use serde_json::Value as Json;

use super::schema::resource_schema;
use super::types::ResourceMetadata;
use super::types::ThanosRulerResourceData;
use super::types::ThanosRulerSpec;
use super::types::API_VERSION;
use super::types::KIND;
use crate::error::Error;
use crate::error::Result;
use crate::schema::ResourceSchema;
use crate::value::Value;

/// What an attribute missing from the input becomes.
#[derive(Clone, Copy)]
enum Absent {
    /// Optional computed attributes not set in configuration are unknown until applied
    Unknown,
    Null,
}

impl Absent {
    fn value<T>(self) -> Value<T> {
        match self {
            Absent::Unknown => Value::Unknown,
            Absent::Null => Value::Null,
        }
    }
}

impl ThanosRulerResourceData {
    /// Decodes a planned configuration, validating it and applying attribute defaults first.
    pub fn from_config(config: &Json) -> Result<Self> {
        let schema = resource_schema();
        schema.validate(config).into_result()?;

        let mut config = config.clone();
        schema.apply_defaults(&mut config);
        decode(schema, &config, Absent::Unknown)
    }

    /// Decodes previously stored state.
    pub fn from_state(state: &Json) -> Result<Self> {
        decode(resource_schema(), state, Absent::Null)
    }

    /// Encodes the record as provider state. Unknown values are stored as null.
    pub fn to_state(&self) -> Result<Json> {
        let (metadata, spec) = encode_envelope(resource_schema(), &self.metadata, self.spec.as_ref())?;

        Ok(json!({
            "id": state_value(&self.id)?,
            "force_conflicts": state_value(&self.force_conflicts)?,
            "field_manager": state_value(&self.field_manager)?,
            "deletion_propagation": state_value(&self.deletion_propagation)?,
            "wait_for_upsert": state_value(&self.wait_for_upsert)?,
            "wait_for_delete": state_value(&self.wait_for_delete)?,
            "metadata": metadata,
            "spec": spec,
        }))
    }
}

fn decode(schema: &ResourceSchema, value: &Json, absent: Absent) -> Result<ThanosRulerResourceData> {
    let empty = Map::new();
    let entries = value.as_object().unwrap_or(&empty);
    let (metadata, spec) = decode_envelope(schema, entries)?;

    Ok(ThanosRulerResourceData {
        id: attribute(entries, "id", absent)?,
        force_conflicts: attribute(entries, "force_conflicts", absent)?,
        field_manager: attribute(entries, "field_manager", absent)?,
        deletion_propagation: attribute(entries, "deletion_propagation", absent)?,
        wait_for_upsert: attribute(entries, "wait_for_upsert", absent)?,
        wait_for_delete: attribute(entries, "wait_for_delete", absent)?,
        api_version: API_VERSION.to_owned(),
        kind: KIND.to_owned(),
        metadata,
        spec,
    })
}

/// Decodes `metadata` and `spec` of a provider-shaped object.
pub(crate) fn decode_envelope(
    schema: &ResourceSchema,
    entries: &Map<String, Json>,
) -> Result<(ResourceMetadata, Option<ThanosRulerSpec>)> {
    let metadata = entries.get("metadata").cloned().unwrap_or(Json::Null);
    let metadata: ResourceMetadata = serde_json::from_value(metadata).map_err(Error::Unmarshal)?;

    let spec = match entries.get("spec").filter(|spec| !spec.is_null()) {
        Some(spec) => {
            let spec = schema.to_kubernetes("spec", spec).unwrap_or_else(|| spec.clone());
            Some(serde_json::from_value(spec).map_err(Error::Unmarshal)?)
        }
        None => None,
    };

    Ok((metadata, spec))
}

/// Encodes `metadata` and `spec` into their provider shape.
pub(crate) fn encode_envelope(
    schema: &ResourceSchema,
    metadata: &ResourceMetadata,
    spec: Option<&ThanosRulerSpec>,
) -> Result<(Json, Json)> {
    let metadata = serde_json::to_value(metadata).map_err(Error::Marshal)?;
    let spec = match spec {
        Some(spec) => {
            let spec = serde_json::to_value(spec).map_err(Error::Marshal)?;
            schema.from_kubernetes("spec", &spec).unwrap_or(spec)
        }
        None => Json::Null,
    };

    Ok((metadata, spec))
}

fn attribute<T: DeserializeOwned>(entries: &Map<String, Json>, name: &str, absent: Absent) -> Result<Value<T>> {
    match entries.get(name) {
        None | Some(Json::Null) => Ok(absent.value()),
        Some(value) => serde_json::from_value(value.clone())
            .map(Value::Known)
            .map_err(Error::Unmarshal),
    }
}

fn state_value<T: Serialize>(value: &Value<T>) -> Result<Json> {
    match value.known() {
        Some(value) => serde_json::to_value(value).map_err(Error::Marshal),
        None => Ok(Json::Null),
    }
}

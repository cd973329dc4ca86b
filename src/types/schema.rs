//! JSON schema types for structured outputs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Primitive types a schema property can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonSchemaType {
    /// Object
    Object,
    /// String
    String,
    /// Integer
    Integer,
    /// Number
    Number,
    /// Boolean
    Boolean,
}

/// A single schema property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonSchemaProperty {
    /// Property type.
    #[serde(rename = "type")]
    pub property_type: JsonSchemaType,
    /// Format hint, such as `date-time`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Allowed values.
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
}

impl JsonSchemaProperty {
    /// Creates a property of the given type.
    pub fn new(property_type: JsonSchemaType) -> Self {
        Self {
            property_type,
            format: None,
            description: None,
            enum_values: None,
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the format hint.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Restricts the property to a set of values.
    pub fn with_enum<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }
}

/// Top-level object parameters of a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonParameters {
    /// Parameter type, normally [`JsonSchemaType::Object`].
    #[serde(rename = "type")]
    pub parameter_type: JsonSchemaType,
    /// Named properties.
    pub properties: BTreeMap<String, JsonSchemaProperty>,
    /// Whether undeclared properties are allowed.
    #[serde(rename = "additionalProperties")]
    pub additional_properties: bool,
    /// Required property names.
    pub required: Vec<String>,
}

impl JsonParameters {
    /// Creates object parameters that reject undeclared properties.
    pub fn object(properties: BTreeMap<String, JsonSchemaProperty>, required: Vec<String>) -> Self {
        Self {
            parameter_type: JsonSchemaType::Object,
            properties,
            additional_properties: false,
            required,
        }
    }
}

/// A named schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonSchema {
    /// Schema name.
    pub name: String,
    /// Strict adherence.
    pub strict: bool,
    /// Schema body.
    pub schema: JsonParameters,
}

impl JsonSchema {
    /// Creates a strict schema.
    pub fn new(name: impl Into<String>, schema: JsonParameters) -> Self {
        Self {
            name: name.into(),
            strict: true,
            schema,
        }
    }
}

/// Structured output format for chat completions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    /// Output must match a JSON schema.
    JsonSchema {
        /// The schema.
        json_schema: JsonSchema,
    },
}

impl From<JsonSchema> for ResponseFormat {
    fn from(json_schema: JsonSchema) -> Self {
        ResponseFormat::JsonSchema { json_schema }
    }
}

//! Index field mappings
//!
//! A [`Mapping`] is one [`FieldType`] plus the parameters that type accepts.
//! [`Fields`] holds named child mappings (`properties`, multi-field
//! `fields`), and [`Mappings`] is the top-level document of an index:
//!
//! ```json
//! {"dynamic": "strict", "properties": {
//!     "title": {"type": "text", "analyzer": "english", "fields": {"raw": {"type": "keyword"}}},
//!     "embedding": {"type": "dense_vector", "dims": 384}
//! }}
//! ```
//!
//! Unlike query clauses, mapping construction and parsing collect every
//! problem into one [`MappingError`] instead of stopping at the first.

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::enums::{Dynamic, IndexOptions, Orientation, Similarity, TermVector};
use crate::error::{DslError, ErrorKind, MappingError};
use crate::input::Loose;
use crate::scalar::{Scalar, Strings};

mod params;
mod types;

use params::FieldParams;
pub use params::{
    validate_max_shingle_size, validate_meta, MAX_META_ENTRIES, MAX_META_KEY_LEN,
    MAX_META_VALUE_LEN,
};
pub use types::{FieldType, MappingParam};

// ============================================================================
// mapping
// ============================================================================

/// Mapping of a single field
#[derive(Debug, Clone, PartialEq)]
pub struct Mapping {
    field_type: FieldType,
    params: FieldParams,
}

/// Loose parameter record of a mapping; unset fields are left out
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingParams {
    pub analyzer: Option<String>,
    pub search_analyzer: Option<String>,
    pub search_quote_analyzer: Option<String>,
    pub normalizer: Option<String>,
    pub boost: Option<Loose>,
    pub coerce: Option<Loose>,
    pub copy_to: Option<Strings>,
    pub doc_values: Option<Loose>,
    pub dims: Option<Loose>,
    pub depth_limit: Option<Loose>,
    pub dynamic: Option<Loose>,
    pub eager_global_ordinals: Option<Loose>,
    pub enabled: Option<Loose>,
    pub fields: Option<Fields>,
    pub format: Option<String>,
    pub ignore_above: Option<Loose>,
    pub ignore_malformed: Option<Loose>,
    pub ignore_z_value: Option<Loose>,
    pub index: Option<Loose>,
    pub index_options: Option<Loose>,
    pub max_input_length: Option<Loose>,
    pub max_shingle_size: Option<Loose>,
    pub meta: Option<BTreeMap<String, String>>,
    pub norms: Option<Loose>,
    pub null_value: Option<Scalar>,
    pub orientation: Option<Loose>,
    pub path: Option<String>,
    pub position_increment_gap: Option<Loose>,
    pub positive_score_impact: Option<Loose>,
    pub preserve_position_increments: Option<Loose>,
    pub preserve_separators: Option<Loose>,
    pub properties: Option<Fields>,
    pub relations: Option<BTreeMap<String, Strings>>,
    pub scaling_factor: Option<Loose>,
    pub similarity: Option<Loose>,
    pub split_queries_on_whitespace: Option<Loose>,
    pub store: Option<Loose>,
    pub term_vector: Option<Loose>,
    pub value: Option<Scalar>,
}

fn loose_json(loose: Loose) -> Value {
    match loose {
        Loose::Bool(b) => Value::Bool(b),
        Loose::Int(i) => Value::from(i),
        Loose::Float(f) => Value::from(f),
        Loose::Str(s) => Value::String(s),
    }
}

impl MappingParams {
    /// Scalar and structured entries as `(param, json)` pairs
    fn into_entries(self) -> (Vec<(MappingParam, Value)>, Vec<(MappingParam, Fields)>) {
        let mut entries = Vec::new();
        let mut push = |param: MappingParam, value: Option<Value>| {
            if let Some(value) = value {
                entries.push((param, value));
            }
        };
        let text = |s: Option<String>| s.map(Value::String);
        let loose = |l: Option<Loose>| l.map(loose_json);

        push(MappingParam::Analyzer, text(self.analyzer));
        push(MappingParam::SearchAnalyzer, text(self.search_analyzer));
        push(MappingParam::SearchQuoteAnalyzer, text(self.search_quote_analyzer));
        push(MappingParam::Normalizer, text(self.normalizer));
        push(MappingParam::Boost, loose(self.boost));
        push(MappingParam::Coerce, loose(self.coerce));
        push(MappingParam::CopyTo, self.copy_to.map(|c| c.to_json()));
        push(MappingParam::DocValues, loose(self.doc_values));
        push(MappingParam::Dims, loose(self.dims));
        push(MappingParam::DepthLimit, loose(self.depth_limit));
        push(MappingParam::Dynamic, loose(self.dynamic));
        push(MappingParam::EagerGlobalOrdinals, loose(self.eager_global_ordinals));
        push(MappingParam::Enabled, loose(self.enabled));
        push(MappingParam::Format, text(self.format));
        push(MappingParam::IgnoreAbove, loose(self.ignore_above));
        push(MappingParam::IgnoreMalformed, loose(self.ignore_malformed));
        push(MappingParam::IgnoreZValue, loose(self.ignore_z_value));
        push(MappingParam::Index, loose(self.index));
        push(MappingParam::IndexOptions, loose(self.index_options));
        push(MappingParam::MaxInputLength, loose(self.max_input_length));
        push(MappingParam::MaxShingleSize, loose(self.max_shingle_size));
        push(
            MappingParam::Meta,
            self.meta.map(|m| {
                Value::Object(m.into_iter().map(|(k, v)| (k, Value::String(v))).collect())
            }),
        );
        push(MappingParam::Norms, loose(self.norms));
        push(MappingParam::NullValue, self.null_value.map(|v| v.to_json()));
        push(MappingParam::Orientation, loose(self.orientation));
        push(MappingParam::Path, text(self.path));
        push(MappingParam::PositionIncrementGap, loose(self.position_increment_gap));
        push(MappingParam::PositiveScoreImpact, loose(self.positive_score_impact));
        push(
            MappingParam::PreservePositionIncrements,
            loose(self.preserve_position_increments),
        );
        push(MappingParam::PreserveSeparators, loose(self.preserve_separators));
        push(
            MappingParam::Relations,
            self.relations.map(|r| {
                Value::Object(r.into_iter().map(|(k, v)| (k, v.to_json())).collect())
            }),
        );
        push(MappingParam::ScalingFactor, loose(self.scaling_factor));
        push(MappingParam::Similarity, loose(self.similarity));
        push(
            MappingParam::SplitQueriesOnWhitespace,
            loose(self.split_queries_on_whitespace),
        );
        push(MappingParam::Store, loose(self.store));
        push(MappingParam::TermVector, loose(self.term_vector));
        push(MappingParam::Value, self.value.map(|v| v.to_json()));

        let mut children = Vec::new();
        if let Some(fields) = self.fields {
            children.push((MappingParam::Fields, fields));
        }
        if let Some(properties) = self.properties {
            children.push((MappingParam::Properties, properties));
        }
        (entries, children)
    }
}

impl Mapping {
    /// A mapping with no parameters set
    ///
    /// Types with required parameters (`dense_vector`, `scaled_float`,
    /// `alias`) are only valid once those are set; see [`Mapping::validate`].
    pub fn new(field_type: FieldType) -> Self {
        Mapping {
            field_type,
            params: FieldParams::default(),
        }
    }

    /// Build a mapping from a parameter record, collecting every error
    pub fn build(field_type: FieldType, record: MappingParams) -> Result<Self, MappingError> {
        let mut mapping = Mapping::new(field_type);
        let mut errors = MappingError::new();
        let (entries, children) = record.into_entries();
        for (param, value) in entries {
            errors.merge(mapping.set(param, &value));
        }
        for (param, fields) in children {
            errors.collect(mapping.set_children(param, fields));
        }
        for err in mapping.missing_required() {
            errors.push(err);
        }
        errors.into_result(mapping)
    }

    pub fn text() -> Self {
        Mapping::new(FieldType::Text)
    }

    pub fn keyword() -> Self {
        Mapping::new(FieldType::Keyword)
    }

    /// `object` mapping holding the given children
    pub fn object(properties: Fields) -> Self {
        let mut mapping = Mapping::new(FieldType::Object);
        mapping.params.properties = properties;
        mapping
    }

    pub fn nested(properties: Fields) -> Self {
        let mut mapping = Mapping::new(FieldType::Nested);
        mapping.params.properties = properties;
        mapping
    }

    pub fn dense_vector(dims: i64) -> Result<Self, DslError> {
        let mut mapping = Mapping::new(FieldType::DenseVector);
        mapping
            .params
            .accept(MappingParam::Dims, &Value::from(dims))
            .map_err(|e| e.with_mapping(FieldType::DenseVector).with_param("dims"))?;
        Ok(mapping)
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Set one parameter from JSON, re-validating it against the type
    ///
    /// Null clears the parameter. Child mappings under `fields` or
    /// `properties` report every invalid child.
    pub fn set(&mut self, param: MappingParam, value: &Value) -> Result<(), MappingError> {
        let field_type = self.field_type;
        let tag = |e: DslError| e.with_mapping(field_type).with_param(param.key());
        if !field_type.supports(param) {
            return Err(tag(DslError::new(ErrorKind::InvalidParams)
                .with_detail(format!("{} does not accept {}", field_type, param)))
            .into());
        }
        match param {
            MappingParam::Fields | MappingParam::Properties => {
                let children = Fields::from_json(value).map_err(|inner| {
                    let mut errors = MappingError::new();
                    for err in inner.errors() {
                        errors.push(err.clone().with_mapping(field_type));
                    }
                    errors
                })?;
                Ok(self.set_children(param, children)?)
            }
            _ => Ok(self.params.accept(param, value).map_err(tag)?),
        }
    }

    /// Replace `fields` or `properties`
    pub fn set_children(&mut self, param: MappingParam, children: Fields) -> Result<(), DslError> {
        let field_type = self.field_type;
        if !field_type.supports(param) {
            return Err(DslError::new(ErrorKind::InvalidParams)
                .with_mapping(field_type)
                .with_param(param.key())
                .with_detail(format!("{} does not accept {}", field_type, param)));
        }
        match param {
            MappingParam::Fields => self.params.fields = children,
            MappingParam::Properties => self.params.properties = children,
            other => {
                return Err(DslError::new(ErrorKind::InvalidParams)
                    .with_mapping(field_type)
                    .with_param(other.key())
                    .with_detail("not a child mapping parameter"))
            }
        }
        Ok(())
    }

    /// Add one child under `properties`
    pub fn add_property(&mut self, name: impl Into<String>, child: Mapping) -> Result<(), DslError> {
        if !self.field_type.is_container() {
            return Err(DslError::new(ErrorKind::InvalidParams)
                .with_mapping(self.field_type)
                .with_param("properties"));
        }
        self.params.properties.insert(name, child);
        Ok(())
    }

    /// Add one multi-field under `fields`
    pub fn add_field(&mut self, name: impl Into<String>, child: Mapping) -> Result<(), DslError> {
        if !self.field_type.supports(MappingParam::Fields) {
            return Err(DslError::new(ErrorKind::InvalidParams)
                .with_mapping(self.field_type)
                .with_param("fields"));
        }
        self.params.fields.insert(name, child);
        Ok(())
    }

    pub fn clear_param(&mut self, param: MappingParam) {
        self.params.reset(param);
    }

    /// JSON of a parameter, `None` when unset
    pub fn param(&self, param: MappingParam) -> Option<Value> {
        self.params.emit(param)
    }

    pub fn is_set(&self, param: MappingParam) -> bool {
        self.params.is_set(param)
    }

    fn missing_required(&self) -> Vec<DslError> {
        let required = |kind: ErrorKind, param: MappingParam| {
            DslError::new(kind)
                .with_mapping(self.field_type)
                .with_param(param.key())
        };
        let mut errors = Vec::new();
        match self.field_type {
            FieldType::DenseVector if self.params.dims.is_none() => {
                errors.push(required(ErrorKind::DimsRequired, MappingParam::Dims))
            }
            FieldType::ScaledFloat if self.params.scaling_factor.is_none() => {
                errors.push(required(ErrorKind::ValueRequired, MappingParam::ScalingFactor))
            }
            FieldType::Alias if self.params.path.as_deref().map_or(true, str::is_empty) => {
                errors.push(required(ErrorKind::PathRequired, MappingParam::Path))
            }
            _ => {}
        }
        errors
    }

    /// Check required parameters of this mapping and all its children
    pub fn validate(&self) -> Result<(), MappingError> {
        let mut errors = MappingError::new();
        for err in self.missing_required() {
            errors.push(err);
        }
        for children in [&self.params.fields, &self.params.properties] {
            for (name, child) in children.iter() {
                if let Err(inner) = child.validate() {
                    errors.absorb(name, inner);
                }
            }
        }
        errors.into_result(())
    }

    pub fn analyzer(&self) -> Option<&str> {
        self.params.analyzer.as_deref()
    }

    pub fn search_analyzer(&self) -> Option<&str> {
        self.params.search_analyzer.as_deref()
    }

    pub fn normalizer(&self) -> Option<&str> {
        self.params.normalizer.as_deref()
    }

    pub fn format(&self) -> Option<&str> {
        self.params.format.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.params.path.as_deref()
    }

    pub fn boost(&self) -> Option<f64> {
        self.params.boost
    }

    pub fn doc_values(&self) -> Option<bool> {
        self.params.doc_values
    }

    pub fn index(&self) -> Option<bool> {
        self.params.index
    }

    pub fn store(&self) -> Option<bool> {
        self.params.store
    }

    pub fn enabled(&self) -> Option<bool> {
        self.params.enabled
    }

    pub fn dims(&self) -> Option<i64> {
        self.params.dims
    }

    pub fn ignore_above(&self) -> Option<i64> {
        self.params.ignore_above
    }

    pub fn max_shingle_size(&self) -> Option<i64> {
        self.params.max_shingle_size
    }

    pub fn scaling_factor(&self) -> Option<f64> {
        self.params.scaling_factor
    }

    pub fn dynamic(&self) -> Option<Dynamic> {
        self.params.dynamic
    }

    pub fn index_options(&self) -> Option<IndexOptions> {
        self.params.index_options
    }

    pub fn orientation(&self) -> Option<Orientation> {
        self.params.orientation
    }

    pub fn similarity(&self) -> Option<Similarity> {
        self.params.similarity
    }

    pub fn term_vector(&self) -> Option<TermVector> {
        self.params.term_vector
    }

    pub fn null_value(&self) -> Option<&Scalar> {
        self.params.null_value.as_ref()
    }

    pub fn value(&self) -> Option<&Scalar> {
        self.params.value.as_ref()
    }

    pub fn copy_to(&self) -> Option<&Strings> {
        self.params.copy_to.as_ref()
    }

    pub fn meta(&self) -> &BTreeMap<String, String> {
        &self.params.meta
    }

    pub fn relations(&self) -> &BTreeMap<String, Strings> {
        &self.params.relations
    }

    /// Multi-fields indexed from the same source value
    pub fn fields(&self) -> &Fields {
        &self.params.fields
    }

    pub fn properties(&self) -> &Fields {
        &self.params.properties
    }

    pub fn properties_mut(&mut self) -> &mut Fields {
        &mut self.params.properties
    }

    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("type".to_string(), Value::from(self.field_type.as_str()));
        for param in self.field_type.params() {
            if let Some(value) = self.params.emit(*param) {
                map.insert(param.key().to_string(), value);
            }
        }
        Value::Object(map)
    }

    /// Parse one field mapping, reporting every invalid parameter
    pub fn from_json(value: &Value) -> Result<Self, MappingError> {
        let map = value.as_object().ok_or_else(|| {
            MappingError::from(
                DslError::new(ErrorKind::InvalidParams)
                    .with_detail("expected a mapping object")
                    .with_json(value),
            )
        })?;
        let field_type = Self::read_type(map).map_err(|e| MappingError::from(e.with_json(value)))?;
        let mut mapping = Mapping::new(field_type);
        let mut errors = MappingError::new();
        for (key, raw) in map {
            if key == "type" {
                continue;
            }
            let Some(param) = MappingParam::from_key(key) else {
                tracing::debug!(
                    mapping = %field_type,
                    key = %key,
                    "ignoring unknown mapping parameter"
                );
                continue;
            };
            errors.merge(mapping.set(param, raw));
        }
        for err in mapping.missing_required() {
            errors.push(err);
        }
        errors.into_result(mapping)
    }

    fn read_type(map: &Map<String, Value>) -> Result<FieldType, DslError> {
        match map.get("type") {
            Some(Value::String(tag)) => tag.parse(),
            Some(other) => Err(DslError::new(ErrorKind::InvalidType).with_received(other)),
            None if map.contains_key("properties") => {
                tracing::warn!("mapping without type carries properties, treating it as object");
                Ok(FieldType::Object)
            }
            None => Err(DslError::new(ErrorKind::MissingType)),
        }
    }
}

impl Serialize for Mapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Mapping {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Mapping::from_json(&value).map_err(|e| D::Error::custom(e.to_string()))
    }
}

// ============================================================================
// fields
// ============================================================================

/// Named child mappings, kept sorted by name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields(BTreeMap<String, Mapping>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Fields::insert`]
    pub fn with(mut self, name: impl Into<String>, mapping: Mapping) -> Self {
        self.insert(name, mapping);
        self
    }

    /// Returns the mapping previously stored under the name
    pub fn insert(&mut self, name: impl Into<String>, mapping: Mapping) -> Option<Mapping> {
        self.0.insert(name.into(), mapping)
    }

    pub fn get(&self, name: &str) -> Option<&Mapping> {
        self.0.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Mapping> {
        self.0.get_mut(name)
    }

    /// Look up a dotted path through nested `properties`
    pub fn lookup(&self, path: &str) -> Option<&Mapping> {
        let mut parts = path.split('.');
        let mut current = self.0.get(parts.next()?)?;
        for part in parts {
            current = current
                .properties()
                .get(part)
                .or_else(|| current.fields().get(part))?;
        }
        Some(current)
    }

    pub fn remove(&mut self, name: &str) -> Option<Mapping> {
        self.0.remove(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::collections::btree_map::Iter<'_, String, Mapping> {
        self.0.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(name, mapping)| (name.clone(), mapping.to_json()))
                .collect(),
        )
    }

    /// Parse every child, collecting errors tagged with the child path
    pub fn from_json(value: &Value) -> Result<Self, MappingError> {
        let map = match value {
            Value::Null => return Ok(Fields::new()),
            Value::Object(map) => map,
            other => {
                return Err(MappingError::from(
                    DslError::new(ErrorKind::InvalidParams)
                        .with_param("properties")
                        .with_received(other),
                ))
            }
        };
        let mut fields = Fields::new();
        let mut errors = MappingError::new();
        for (name, child) in map {
            match Mapping::from_json(child) {
                Ok(mapping) => {
                    fields.insert(name.as_str(), mapping);
                }
                Err(inner) => errors.absorb(name, inner),
            }
        }
        errors.into_result(fields)
    }
}

impl<'a> IntoIterator for &'a Fields {
    type Item = (&'a String, &'a Mapping);
    type IntoIter = std::collections::btree_map::Iter<'a, String, Mapping>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, Mapping)> for Fields {
    fn from_iter<I: IntoIterator<Item = (String, Mapping)>>(iter: I) -> Self {
        Fields(iter.into_iter().collect())
    }
}

impl Serialize for Fields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Fields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Fields::from_json(&value).map_err(|e| D::Error::custom(e.to_string()))
    }
}

// ============================================================================
// mappings
// ============================================================================

/// Top-level mapping document of an index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mappings {
    pub dynamic: Option<Dynamic>,
    pub properties: Fields,
}

impl Mappings {
    pub fn new(properties: Fields) -> Self {
        Mappings {
            dynamic: None,
            properties,
        }
    }

    pub fn with_dynamic(mut self, dynamic: Dynamic) -> Self {
        self.dynamic = Some(dynamic);
        self
    }

    pub fn validate(&self) -> Result<(), MappingError> {
        let mut errors = MappingError::new();
        for (name, mapping) in self.properties.iter() {
            if let Err(inner) = mapping.validate() {
                errors.absorb(name, inner);
            }
        }
        errors.into_result(())
    }

    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        if let Some(dynamic) = self.dynamic {
            let value = match dynamic {
                Dynamic::True => Value::Bool(true),
                Dynamic::False => Value::Bool(false),
                other => Value::from(other.as_str()),
            };
            map.insert("dynamic".to_string(), value);
        }
        map.insert("properties".to_string(), self.properties.to_json());
        Value::Object(map)
    }

    pub fn from_json(value: &Value) -> Result<Self, MappingError> {
        let map = value.as_object().ok_or_else(|| {
            MappingError::from(
                DslError::new(ErrorKind::InvalidParams)
                    .with_detail("expected a mappings object")
                    .with_json(value),
            )
        })?;
        let mut errors = MappingError::new();
        let dynamic = match map.get("dynamic") {
            None | Some(Value::Null) => None,
            Some(raw) => errors.collect(
                Loose::from_json(raw)
                    .ok()
                    .flatten()
                    .ok_or_else(|| {
                        DslError::new(ErrorKind::InvalidDynamic)
                            .with_param("dynamic")
                            .with_received(raw)
                    })
                    .and_then(|loose| loose.to_text().parse::<Dynamic>()),
            ),
        };
        let properties = match map.get("properties") {
            None => Fields::new(),
            Some(raw) => match Fields::from_json(raw) {
                Ok(fields) => fields,
                Err(inner) => {
                    for err in inner.errors() {
                        errors.push(err.clone());
                    }
                    Fields::new()
                }
            },
        };
        for key in map.keys() {
            if key != "dynamic" && key != "properties" {
                tracing::debug!(key = %key, "ignoring unknown mappings key");
            }
        }
        errors.into_result(Mappings {
            dynamic,
            properties,
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self, MappingError> {
        let value: Value = serde_json::from_str(json).map_err(DslError::from)?;
        Self::from_json(&value)
    }

    /// Parse mappings written as YAML
    pub fn from_yaml_str(yaml: &str) -> Result<Self, MappingError> {
        let value: Value = serde_yaml::from_str(yaml).map_err(DslError::from)?;
        Self::from_json(&value)
    }
}

impl Serialize for Mappings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Mappings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Mappings::from_json(&value).map_err(|e| D::Error::custom(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ========================================================================
    // construction
    // ========================================================================

    #[test]
    fn test_build_text_mapping() {
        let mapping = Mapping::build(
            FieldType::Text,
            MappingParams {
                analyzer: Some("english".to_string()),
                index_options: Some("offsets".into()),
                fields: Some(Fields::new().with("raw", Mapping::keyword())),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(mapping.analyzer(), Some("english"));
        assert_eq!(mapping.index_options(), Some(IndexOptions::Offsets));
        assert_eq!(
            mapping.to_json(),
            json!({
                "type": "text",
                "analyzer": "english",
                "index_options": "offsets",
                "fields": {"raw": {"type": "keyword"}}
            })
        );
    }

    #[test]
    fn test_build_accumulates_every_error() {
        let err = Mapping::build(
            FieldType::SearchAsYouType,
            MappingParams {
                max_shingle_size: Some(5.into()),
                meta: Some((0..6).map(|i| (format!("k{}", i), "v".to_string())).collect()),
                dims: Some(3.into()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert_eq!(err.len(), 3);
        assert!(err.contains(ErrorKind::InvalidMaxShingleSize));
        assert!(err.contains(ErrorKind::MetaLimitExceeded));
        assert!(err.contains(ErrorKind::InvalidParams));
        assert!(err
            .errors()
            .iter()
            .all(|e| e.mapping() == Some(FieldType::SearchAsYouType)));
    }

    #[test]
    fn test_required_parameters() {
        let err = Mapping::build(FieldType::DenseVector, MappingParams::default()).unwrap_err();
        assert!(err.contains(ErrorKind::DimsRequired));

        let err = Mapping::build(FieldType::ScaledFloat, MappingParams::default()).unwrap_err();
        assert!(err.contains(ErrorKind::ValueRequired));

        let err = Mapping::build(FieldType::Alias, MappingParams::default()).unwrap_err();
        assert!(err.contains(ErrorKind::PathRequired));

        let err = Mapping::dense_vector(0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDims);
        assert_eq!(Mapping::dense_vector(384).unwrap().dims(), Some(384));
    }

    #[test]
    fn test_max_shingle_size_zero_is_default() {
        let mapping = Mapping::build(
            FieldType::SearchAsYouType,
            MappingParams {
                max_shingle_size: Some(0.into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(mapping.max_shingle_size(), None);
        assert_eq!(mapping.to_json(), json!({"type": "search_as_you_type"}));

        let err = Mapping::build(
            FieldType::SearchAsYouType,
            MappingParams {
                max_shingle_size: Some(1.into()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(err.contains(ErrorKind::InvalidMaxShingleSize));
    }

    #[test]
    fn test_set_revalidates() {
        let mut mapping = Mapping::keyword();
        mapping.set(MappingParam::IgnoreAbove, &json!(256)).unwrap();
        assert_eq!(mapping.ignore_above(), Some(256));
        let err = mapping.set(MappingParam::Analyzer, &json!("standard")).unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err.errors()[0].kind(), ErrorKind::InvalidParams);
        assert_eq!(err.errors()[0].param(), Some("analyzer"));
        mapping.set(MappingParam::IgnoreAbove, &Value::Null).unwrap();
        assert!(!mapping.is_set(MappingParam::IgnoreAbove));
    }

    #[test]
    fn test_set_properties_reports_every_child() {
        let mut object = Mapping::object(Fields::new());
        let err = object
            .set(
                MappingParam::Properties,
                &json!({
                    "a": {"type": "keyword", "dims": 3},
                    "b": {"type": "no_such_type"},
                    "c": {"type": "text"}
                }),
            )
            .unwrap_err();
        assert_eq!(err.len(), 2);
        assert!(err.contains(ErrorKind::InvalidParams));
        assert!(err.contains(ErrorKind::InvalidType));
        let dims = err.errors().iter().find(|e| e.kind() == ErrorKind::InvalidParams).unwrap();
        assert_eq!(dims.mapping(), Some(FieldType::Keyword));
        assert!(object.properties().is_empty());
    }

    #[test]
    fn test_add_property_requires_container() {
        let mut object = Mapping::object(Fields::new());
        object.add_property("name", Mapping::text()).unwrap();
        assert_eq!(object.properties().len(), 1);
        let err = Mapping::keyword().add_property("x", Mapping::text()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParams);
    }

    // ========================================================================
    // parsing
    // ========================================================================

    #[test]
    fn test_parse_recursive_properties() {
        let body = json!({
            "type": "nested",
            "dynamic": "strict",
            "properties": {
                "author": {"type": "object", "properties": {
                    "name": {"type": "text", "fields": {"raw": {"type": "keyword", "ignore_above": 256}}},
                    "tags": {"type": "keyword", "copy_to": "all_text"}
                }},
                "score": {"type": "scaled_float", "scaling_factor": 100.0}
            }
        });
        let mapping = Mapping::from_json(&body).unwrap();
        assert_eq!(mapping.field_type(), FieldType::Nested);
        assert_eq!(mapping.dynamic(), Some(Dynamic::Strict));
        let author = mapping.properties().get("author").unwrap();
        assert_eq!(author.field_type(), FieldType::Object);
        assert_eq!(
            mapping.properties().lookup("author.name.raw").unwrap().ignore_above(),
            Some(256)
        );
        assert_eq!(mapping.to_json(), body);
    }

    #[test]
    fn test_missing_and_unknown_type() {
        let err = Mapping::from_json(&json!({"analyzer": "english"})).unwrap_err();
        assert!(err.contains(ErrorKind::MissingType));

        let err = Mapping::from_json(&json!({"type": "strng"})).unwrap_err();
        assert!(err.contains(ErrorKind::InvalidType));
    }

    #[test]
    fn test_untyped_properties_inferred_as_object() {
        let mapping = Mapping::from_json(&json!({"properties": {"a": {"type": "long"}}})).unwrap();
        assert_eq!(mapping.field_type(), FieldType::Object);
        assert_eq!(
            mapping.to_json(),
            json!({"type": "object", "properties": {"a": {"type": "long"}}})
        );
    }

    #[test]
    fn test_parse_errors_carry_field_paths() {
        let err = Mappings::from_json(&json!({"properties": {
            "user": {"properties": {
                "embedding": {"type": "dense_vector"},
                "nick": {"type": "keyword", "meta": {"a_key_that_is_much_too_long": "v"}}
            }},
            "title": {"type": "txt"}
        }}))
        .unwrap_err();
        assert_eq!(err.len(), 3);
        let paths: Vec<_> = err.errors().iter().filter_map(|e| e.field()).collect();
        assert!(paths.contains(&"user.embedding"));
        assert!(paths.contains(&"user.nick"));
        assert!(paths.contains(&"title"));
    }

    #[test]
    fn test_mappings_yaml() {
        let yaml = r#"
dynamic: false
properties:
  title:
    type: text
    analyzer: english
  embedding:
    type: dense_vector
    dims: 384
  created:
    type: date
    format: strict_date_optional_time||epoch_millis
"#;
        let mappings = Mappings::from_yaml_str(yaml).unwrap();
        assert_eq!(mappings.dynamic, Some(Dynamic::False));
        assert_eq!(mappings.properties.len(), 3);
        assert_eq!(mappings.properties.get("embedding").unwrap().dims(), Some(384));
        assert_eq!(
            mappings.to_json(),
            json!({
                "dynamic": false,
                "properties": {
                    "title": {"type": "text", "analyzer": "english"},
                    "embedding": {"type": "dense_vector", "dims": 384},
                    "created": {"type": "date", "format": "strict_date_optional_time||epoch_millis"}
                }
            })
        );
    }

    #[test]
    fn test_invalid_json_and_yaml() {
        let err = Mappings::from_json_str("{").unwrap_err();
        assert!(err.contains(ErrorKind::InvalidJson));
        let err = Mappings::from_yaml_str("properties: [unclosed").unwrap_err();
        assert!(err.contains(ErrorKind::InvalidYaml));
    }

    #[test]
    fn test_mappings_serde() {
        let mappings = Mappings::new(
            Fields::new()
                .with("id", Mapping::keyword())
                .with("location", Mapping::new(FieldType::GeoPoint)),
        );
        let value = serde_json::to_value(&mappings).unwrap();
        let back: Mappings = serde_json::from_value(value).unwrap();
        assert_eq!(back, mappings);
    }
}

//! Typed storage of mapping parameters
//!
//! [`FieldParams`] keeps each parameter as explicitly given: a mapping that
//! says `"index": true` emits it back, unlike query parameters which elide
//! defaults. The one exception is `max_shingle_size: 0`, which means "engine
//! default" and is not stored.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::enums::{Dynamic, IndexOptions, Orientation, Similarity, TermVector};
use crate::error::{DslError, ErrorKind};
use crate::input::Loose;
use crate::scalar::{Scalar, Strings};

use super::types::MappingParam;
use super::Fields;

pub const MAX_META_ENTRIES: usize = 5;
pub const MAX_META_KEY_LEN: usize = 20;
pub const MAX_META_VALUE_LEN: usize = 50;

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct FieldParams {
    pub analyzer: Option<String>,
    pub search_analyzer: Option<String>,
    pub search_quote_analyzer: Option<String>,
    pub normalizer: Option<String>,
    pub boost: Option<f64>,
    pub coerce: Option<bool>,
    pub copy_to: Option<Strings>,
    pub doc_values: Option<bool>,
    pub dims: Option<i64>,
    pub depth_limit: Option<i64>,
    pub dynamic: Option<Dynamic>,
    pub eager_global_ordinals: Option<bool>,
    pub enabled: Option<bool>,
    pub fields: Fields,
    pub format: Option<String>,
    pub ignore_above: Option<i64>,
    pub ignore_malformed: Option<bool>,
    pub ignore_z_value: Option<bool>,
    pub index: Option<bool>,
    pub index_options: Option<IndexOptions>,
    pub max_input_length: Option<i64>,
    pub max_shingle_size: Option<i64>,
    pub meta: BTreeMap<String, String>,
    pub norms: Option<bool>,
    pub null_value: Option<Scalar>,
    pub orientation: Option<Orientation>,
    pub path: Option<String>,
    pub position_increment_gap: Option<i64>,
    pub positive_score_impact: Option<bool>,
    pub preserve_position_increments: Option<bool>,
    pub preserve_separators: Option<bool>,
    pub properties: Fields,
    pub relations: BTreeMap<String, Strings>,
    pub scaling_factor: Option<f64>,
    pub similarity: Option<Similarity>,
    pub split_queries_on_whitespace: Option<bool>,
    pub store: Option<bool>,
    pub term_vector: Option<TermVector>,
    pub value: Option<Scalar>,
}

/// Check the documented bounds of `meta`
pub fn validate_meta(meta: &BTreeMap<String, String>) -> Result<(), DslError> {
    let exceeded = |detail: String| {
        DslError::new(ErrorKind::MetaLimitExceeded)
            .with_param("meta")
            .with_detail(detail)
    };
    if meta.len() > MAX_META_ENTRIES {
        return Err(exceeded(format!(
            "{} entries, at most {} allowed",
            meta.len(),
            MAX_META_ENTRIES
        )));
    }
    for (key, value) in meta {
        if key.chars().count() > MAX_META_KEY_LEN {
            return Err(exceeded(format!(
                "key {:?} longer than {} characters",
                key, MAX_META_KEY_LEN
            )));
        }
        if value.chars().count() > MAX_META_VALUE_LEN {
            return Err(exceeded(format!(
                "value of {:?} longer than {} characters",
                key, MAX_META_VALUE_LEN
            )));
        }
    }
    Ok(())
}

/// `max_shingle_size` is 2, 3 or 4; 0 selects the engine default
pub fn validate_max_shingle_size(size: i64) -> Result<Option<i64>, DslError> {
    match size {
        0 => Ok(None),
        2..=4 => Ok(Some(size)),
        _ => Err(DslError::new(ErrorKind::InvalidMaxShingleSize)
            .with_param("max_shingle_size")
            .with_received(size)),
    }
}

/// Single-element lists are written as a bare string
fn strings_json(strings: &Strings) -> Value {
    match strings.as_slice() {
        [single] => Value::from(single.as_str()),
        _ => strings.to_json(),
    }
}

impl FieldParams {
    /// Store a scalar or structured parameter value; null clears it
    ///
    /// `fields` and `properties` are not handled here because their parse
    /// reports several errors at once.
    pub fn accept(&mut self, param: MappingParam, value: &Value) -> Result<(), DslError> {
        if value.is_null() {
            self.reset(param);
            return Ok(());
        }
        let invalid = |kind: ErrorKind| {
            DslError::new(kind)
                .with_param(param.key())
                .with_received(value)
        };
        let loose = || -> Result<Loose, DslError> {
            Loose::from_json(value)
                .ok()
                .flatten()
                .ok_or_else(|| invalid(ErrorKind::InvalidParams))
        };
        let text = || loose().map(|l| l.to_text());
        let flag = || {
            loose()?
                .to_bool()
                .ok_or_else(|| invalid(ErrorKind::InvalidParams))
        };
        let count = || {
            loose()?
                .to_i64()
                .filter(|v| *v >= 0)
                .ok_or_else(|| invalid(ErrorKind::InvalidParams))
        };
        let with_param = |e: DslError| e.with_param(param.key());

        match param {
            MappingParam::Analyzer => self.analyzer = Some(text()?),
            MappingParam::SearchAnalyzer => self.search_analyzer = Some(text()?),
            MappingParam::SearchQuoteAnalyzer => self.search_quote_analyzer = Some(text()?),
            MappingParam::Normalizer => self.normalizer = Some(text()?),
            MappingParam::Format => self.format = Some(text()?),
            MappingParam::Path => self.path = Some(text()?),
            MappingParam::Boost => {
                let boost = loose()?
                    .to_f64()
                    .filter(|b| *b >= 0.0)
                    .ok_or_else(|| invalid(ErrorKind::InvalidBoost))?;
                self.boost = Some(boost);
            }
            MappingParam::ScalingFactor => {
                let factor = loose()?
                    .to_f64()
                    .filter(|f| *f > 0.0)
                    .ok_or_else(|| invalid(ErrorKind::InvalidParams))?;
                self.scaling_factor = Some(factor);
            }
            MappingParam::Coerce => self.coerce = Some(flag()?),
            MappingParam::DocValues => self.doc_values = Some(flag()?),
            MappingParam::EagerGlobalOrdinals => self.eager_global_ordinals = Some(flag()?),
            MappingParam::Enabled => self.enabled = Some(flag()?),
            MappingParam::IgnoreMalformed => self.ignore_malformed = Some(flag()?),
            MappingParam::IgnoreZValue => self.ignore_z_value = Some(flag()?),
            MappingParam::Index => self.index = Some(flag()?),
            MappingParam::Norms => self.norms = Some(flag()?),
            MappingParam::PositiveScoreImpact => self.positive_score_impact = Some(flag()?),
            MappingParam::PreservePositionIncrements => {
                self.preserve_position_increments = Some(flag()?)
            }
            MappingParam::PreserveSeparators => self.preserve_separators = Some(flag()?),
            MappingParam::SplitQueriesOnWhitespace => {
                self.split_queries_on_whitespace = Some(flag()?)
            }
            MappingParam::Store => self.store = Some(flag()?),
            MappingParam::Dims => {
                let dims = loose()?
                    .to_i64()
                    .filter(|d| *d > 0)
                    .ok_or_else(|| invalid(ErrorKind::InvalidDims))?;
                self.dims = Some(dims);
            }
            MappingParam::DepthLimit => self.depth_limit = Some(count()?),
            MappingParam::IgnoreAbove => self.ignore_above = Some(count()?),
            MappingParam::MaxInputLength => self.max_input_length = Some(count()?),
            MappingParam::PositionIncrementGap => self.position_increment_gap = Some(count()?),
            MappingParam::MaxShingleSize => {
                let size = loose()?
                    .to_i64()
                    .ok_or_else(|| invalid(ErrorKind::InvalidMaxShingleSize))?;
                self.max_shingle_size = validate_max_shingle_size(size)?;
            }
            MappingParam::Dynamic => {
                self.dynamic = Some(text()?.parse().map_err(with_param)?);
            }
            MappingParam::IndexOptions => {
                self.index_options = Some(text()?.parse().map_err(with_param)?);
            }
            MappingParam::Orientation => {
                self.orientation = Some(text()?.parse().map_err(with_param)?);
            }
            MappingParam::Similarity => {
                self.similarity = Some(text()?.parse().map_err(with_param)?);
            }
            MappingParam::TermVector => {
                self.term_vector = Some(text()?.parse().map_err(with_param)?);
            }
            MappingParam::NullValue => {
                self.null_value =
                    Some(Scalar::from_json(value).ok_or_else(|| invalid(ErrorKind::InvalidParams))?);
            }
            MappingParam::Value => {
                self.value =
                    Some(Scalar::from_json(value).ok_or_else(|| invalid(ErrorKind::InvalidParams))?);
            }
            MappingParam::CopyTo => {
                self.copy_to =
                    Some(Strings::from_json(value).ok_or_else(|| invalid(ErrorKind::InvalidParams))?);
            }
            MappingParam::Meta => {
                let map = value
                    .as_object()
                    .ok_or_else(|| invalid(ErrorKind::InvalidParams))?;
                let meta = map
                    .iter()
                    .map(|(k, v)| match v {
                        Value::String(s) => Ok((k.clone(), s.clone())),
                        other => Err(DslError::new(ErrorKind::InvalidParams)
                            .with_param("meta")
                            .with_detail(format!("value of {:?} must be a string", k))
                            .with_received(other)),
                    })
                    .collect::<Result<BTreeMap<_, _>, _>>()?;
                validate_meta(&meta)?;
                self.meta = meta;
            }
            MappingParam::Relations => {
                let map = value
                    .as_object()
                    .ok_or_else(|| invalid(ErrorKind::InvalidParams))?;
                let relations = map
                    .iter()
                    .map(|(parent, children)| {
                        Strings::from_json(children)
                            .map(|c| (parent.clone(), c))
                            .ok_or_else(|| invalid(ErrorKind::InvalidParams))
                    })
                    .collect::<Result<BTreeMap<_, _>, _>>()?;
                self.relations = relations;
            }
            MappingParam::Fields | MappingParam::Properties => {
                return Err(invalid(ErrorKind::InvalidParams)
                    .with_detail("child mappings are parsed by the mapping itself"));
            }
        }
        Ok(())
    }

    pub fn reset(&mut self, param: MappingParam) {
        match param {
            MappingParam::Analyzer => self.analyzer = None,
            MappingParam::SearchAnalyzer => self.search_analyzer = None,
            MappingParam::SearchQuoteAnalyzer => self.search_quote_analyzer = None,
            MappingParam::Normalizer => self.normalizer = None,
            MappingParam::Boost => self.boost = None,
            MappingParam::Coerce => self.coerce = None,
            MappingParam::CopyTo => self.copy_to = None,
            MappingParam::DocValues => self.doc_values = None,
            MappingParam::Dims => self.dims = None,
            MappingParam::DepthLimit => self.depth_limit = None,
            MappingParam::Dynamic => self.dynamic = None,
            MappingParam::EagerGlobalOrdinals => self.eager_global_ordinals = None,
            MappingParam::Enabled => self.enabled = None,
            MappingParam::Fields => self.fields = Fields::new(),
            MappingParam::Format => self.format = None,
            MappingParam::IgnoreAbove => self.ignore_above = None,
            MappingParam::IgnoreMalformed => self.ignore_malformed = None,
            MappingParam::IgnoreZValue => self.ignore_z_value = None,
            MappingParam::Index => self.index = None,
            MappingParam::IndexOptions => self.index_options = None,
            MappingParam::MaxInputLength => self.max_input_length = None,
            MappingParam::MaxShingleSize => self.max_shingle_size = None,
            MappingParam::Meta => self.meta.clear(),
            MappingParam::Norms => self.norms = None,
            MappingParam::NullValue => self.null_value = None,
            MappingParam::Orientation => self.orientation = None,
            MappingParam::Path => self.path = None,
            MappingParam::PositionIncrementGap => self.position_increment_gap = None,
            MappingParam::PositiveScoreImpact => self.positive_score_impact = None,
            MappingParam::PreservePositionIncrements => self.preserve_position_increments = None,
            MappingParam::PreserveSeparators => self.preserve_separators = None,
            MappingParam::Properties => self.properties = Fields::new(),
            MappingParam::Relations => self.relations.clear(),
            MappingParam::ScalingFactor => self.scaling_factor = None,
            MappingParam::Similarity => self.similarity = None,
            MappingParam::SplitQueriesOnWhitespace => self.split_queries_on_whitespace = None,
            MappingParam::Store => self.store = None,
            MappingParam::TermVector => self.term_vector = None,
            MappingParam::Value => self.value = None,
        }
    }

    /// JSON of a parameter, `None` when it is not set
    pub fn emit(&self, param: MappingParam) -> Option<Value> {
        let text = |s: &Option<String>| s.as_deref().map(Value::from);
        match param {
            MappingParam::Analyzer => text(&self.analyzer),
            MappingParam::SearchAnalyzer => text(&self.search_analyzer),
            MappingParam::SearchQuoteAnalyzer => text(&self.search_quote_analyzer),
            MappingParam::Normalizer => text(&self.normalizer),
            MappingParam::Format => text(&self.format),
            MappingParam::Path => text(&self.path),
            MappingParam::Boost => self.boost.map(Value::from),
            MappingParam::ScalingFactor => self.scaling_factor.map(Value::from),
            MappingParam::Coerce => self.coerce.map(Value::Bool),
            MappingParam::DocValues => self.doc_values.map(Value::Bool),
            MappingParam::EagerGlobalOrdinals => self.eager_global_ordinals.map(Value::Bool),
            MappingParam::Enabled => self.enabled.map(Value::Bool),
            MappingParam::IgnoreMalformed => self.ignore_malformed.map(Value::Bool),
            MappingParam::IgnoreZValue => self.ignore_z_value.map(Value::Bool),
            MappingParam::Index => self.index.map(Value::Bool),
            MappingParam::Norms => self.norms.map(Value::Bool),
            MappingParam::PositiveScoreImpact => self.positive_score_impact.map(Value::Bool),
            MappingParam::PreservePositionIncrements => {
                self.preserve_position_increments.map(Value::Bool)
            }
            MappingParam::PreserveSeparators => self.preserve_separators.map(Value::Bool),
            MappingParam::SplitQueriesOnWhitespace => {
                self.split_queries_on_whitespace.map(Value::Bool)
            }
            MappingParam::Store => self.store.map(Value::Bool),
            MappingParam::Dims => self.dims.map(Value::from),
            MappingParam::DepthLimit => self.depth_limit.map(Value::from),
            MappingParam::IgnoreAbove => self.ignore_above.map(Value::from),
            MappingParam::MaxInputLength => self.max_input_length.map(Value::from),
            MappingParam::MaxShingleSize => self.max_shingle_size.map(Value::from),
            MappingParam::PositionIncrementGap => self.position_increment_gap.map(Value::from),
            MappingParam::Dynamic => self.dynamic.map(|d| match d {
                Dynamic::True => Value::Bool(true),
                Dynamic::False => Value::Bool(false),
                other => Value::from(other.as_str()),
            }),
            MappingParam::IndexOptions => self.index_options.map(|v| Value::from(v.as_str())),
            MappingParam::Orientation => self.orientation.map(|v| Value::from(v.as_str())),
            MappingParam::Similarity => self.similarity.map(|v| Value::from(v.as_str())),
            MappingParam::TermVector => self.term_vector.map(|v| Value::from(v.as_str())),
            MappingParam::NullValue => self.null_value.as_ref().map(Scalar::to_json),
            MappingParam::Value => self.value.as_ref().map(Scalar::to_json),
            MappingParam::CopyTo => self.copy_to.as_ref().map(strings_json),
            MappingParam::Meta => (!self.meta.is_empty()).then(|| {
                Value::Object(
                    self.meta
                        .iter()
                        .map(|(k, v)| (k.clone(), Value::from(v.as_str())))
                        .collect::<Map<_, _>>(),
                )
            }),
            MappingParam::Relations => (!self.relations.is_empty()).then(|| {
                Value::Object(
                    self.relations
                        .iter()
                        .map(|(k, v)| (k.clone(), strings_json(v)))
                        .collect::<Map<_, _>>(),
                )
            }),
            MappingParam::Fields => (!self.fields.is_empty()).then(|| self.fields.to_json()),
            MappingParam::Properties => {
                (!self.properties.is_empty()).then(|| self.properties.to_json())
            }
        }
    }

    pub fn is_set(&self, param: MappingParam) -> bool {
        self.emit(param).is_some()
    }
}

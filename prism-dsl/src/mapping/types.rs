//! Field types and the mapping parameters each one accepts

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{DslError, ErrorKind};

macro_rules! field_types {
    ($($variant:ident => $tag:literal),+ $(,)?) => {
        /// `type` discriminator of a field mapping
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum FieldType {
            $($variant),+
        }

        impl FieldType {
            pub const ALL: &'static [FieldType] = &[$(FieldType::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(FieldType::$variant => $tag),+
                }
            }
        }

        impl FromStr for FieldType {
            type Err = DslError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($tag => Ok(FieldType::$variant),)+
                    _ => Err(DslError::new(ErrorKind::InvalidType).with_received(format!("{:?}", s))),
                }
            }
        }
    };
}

field_types! {
    Text => "text",
    Keyword => "keyword",
    ConstantKeyword => "constant_keyword",
    Wildcard => "wildcard",
    Long => "long",
    Integer => "integer",
    Short => "short",
    Byte => "byte",
    Double => "double",
    Float => "float",
    HalfFloat => "half_float",
    ScaledFloat => "scaled_float",
    UnsignedLong => "unsigned_long",
    Date => "date",
    DateNanos => "date_nanos",
    Boolean => "boolean",
    Binary => "binary",
    Ip => "ip",
    GeoPoint => "geo_point",
    GeoShape => "geo_shape",
    Point => "point",
    Shape => "shape",
    Object => "object",
    Nested => "nested",
    Join => "join",
    Flattened => "flattened",
    DenseVector => "dense_vector",
    RankFeature => "rank_feature",
    RankFeatures => "rank_features",
    Completion => "completion",
    SearchAsYouType => "search_as_you_type",
    TokenCount => "token_count",
    IntegerRange => "integer_range",
    FloatRange => "float_range",
    LongRange => "long_range",
    DoubleRange => "double_range",
    DateRange => "date_range",
    IpRange => "ip_range",
    Histogram => "histogram",
    Alias => "alias",
    Percolator => "percolator",
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FieldType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        tag.parse().map_err(|e: DslError| D::Error::custom(e.to_string()))
    }
}

macro_rules! mapping_params {
    ($($variant:ident => $key:literal),+ $(,)?) => {
        /// One mapping parameter, identified by its JSON key
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum MappingParam {
            $($variant),+
        }

        impl MappingParam {
            pub const ALL: &'static [MappingParam] = &[$(MappingParam::$variant),+];

            pub fn key(&self) -> &'static str {
                match self {
                    $(MappingParam::$variant => $key),+
                }
            }

            pub fn from_key(key: &str) -> Option<MappingParam> {
                match key {
                    $($key => Some(MappingParam::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

mapping_params! {
    Analyzer => "analyzer",
    SearchAnalyzer => "search_analyzer",
    SearchQuoteAnalyzer => "search_quote_analyzer",
    Normalizer => "normalizer",
    Boost => "boost",
    Coerce => "coerce",
    CopyTo => "copy_to",
    DocValues => "doc_values",
    Dims => "dims",
    DepthLimit => "depth_limit",
    Dynamic => "dynamic",
    EagerGlobalOrdinals => "eager_global_ordinals",
    Enabled => "enabled",
    Fields => "fields",
    Format => "format",
    IgnoreAbove => "ignore_above",
    IgnoreMalformed => "ignore_malformed",
    IgnoreZValue => "ignore_z_value",
    Index => "index",
    IndexOptions => "index_options",
    MaxInputLength => "max_input_length",
    MaxShingleSize => "max_shingle_size",
    Meta => "meta",
    Norms => "norms",
    NullValue => "null_value",
    Orientation => "orientation",
    Path => "path",
    PositionIncrementGap => "position_increment_gap",
    PositiveScoreImpact => "positive_score_impact",
    PreservePositionIncrements => "preserve_position_increments",
    PreserveSeparators => "preserve_separators",
    Properties => "properties",
    Relations => "relations",
    ScalingFactor => "scaling_factor",
    Similarity => "similarity",
    SplitQueriesOnWhitespace => "split_queries_on_whitespace",
    Store => "store",
    TermVector => "term_vector",
    Value => "value",
}

impl fmt::Display for MappingParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

use MappingParam as P;

const TEXT: &[MappingParam] = &[
    P::Analyzer,
    P::SearchAnalyzer,
    P::SearchQuoteAnalyzer,
    P::Boost,
    P::CopyTo,
    P::EagerGlobalOrdinals,
    P::Fields,
    P::Index,
    P::IndexOptions,
    P::Norms,
    P::PositionIncrementGap,
    P::Similarity,
    P::Store,
    P::TermVector,
    P::Meta,
];

const KEYWORD: &[MappingParam] = &[
    P::Normalizer,
    P::Boost,
    P::CopyTo,
    P::DocValues,
    P::EagerGlobalOrdinals,
    P::Fields,
    P::IgnoreAbove,
    P::Index,
    P::IndexOptions,
    P::Norms,
    P::NullValue,
    P::Similarity,
    P::SplitQueriesOnWhitespace,
    P::Store,
    P::Meta,
];

const CONSTANT_KEYWORD: &[MappingParam] = &[P::Value, P::Meta];

const WILDCARD: &[MappingParam] = &[P::CopyTo, P::IgnoreAbove, P::NullValue, P::Fields];

const NUMERIC: &[MappingParam] = &[
    P::Coerce,
    P::Boost,
    P::CopyTo,
    P::DocValues,
    P::Fields,
    P::IgnoreMalformed,
    P::Index,
    P::NullValue,
    P::Store,
    P::Meta,
];

const SCALED_FLOAT: &[MappingParam] = &[
    P::ScalingFactor,
    P::Coerce,
    P::Boost,
    P::CopyTo,
    P::DocValues,
    P::Fields,
    P::IgnoreMalformed,
    P::Index,
    P::NullValue,
    P::Store,
    P::Meta,
];

const DATE: &[MappingParam] = &[
    P::Format,
    P::Boost,
    P::CopyTo,
    P::DocValues,
    P::Fields,
    P::IgnoreMalformed,
    P::Index,
    P::NullValue,
    P::Store,
    P::Meta,
];

const BOOLEAN: &[MappingParam] = &[
    P::Boost,
    P::CopyTo,
    P::DocValues,
    P::Fields,
    P::Index,
    P::NullValue,
    P::Store,
    P::Meta,
];

const BINARY: &[MappingParam] = &[P::DocValues, P::Store];

const IP: &[MappingParam] = &[
    P::Boost,
    P::CopyTo,
    P::DocValues,
    P::Fields,
    P::IgnoreMalformed,
    P::Index,
    P::NullValue,
    P::Store,
    P::Meta,
];

const GEO_POINT: &[MappingParam] = &[
    P::CopyTo,
    P::DocValues,
    P::IgnoreMalformed,
    P::IgnoreZValue,
    P::Index,
    P::NullValue,
    P::Meta,
];

const SHAPE: &[MappingParam] = &[
    P::Orientation,
    P::Coerce,
    P::IgnoreMalformed,
    P::IgnoreZValue,
    P::Meta,
];

const POINT: &[MappingParam] = &[P::IgnoreMalformed, P::IgnoreZValue, P::NullValue, P::Meta];

const OBJECT: &[MappingParam] = &[P::Dynamic, P::Enabled, P::Properties];

const NESTED: &[MappingParam] = &[P::Dynamic, P::Properties];

const JOIN: &[MappingParam] = &[P::Relations, P::EagerGlobalOrdinals];

const FLATTENED: &[MappingParam] = &[
    P::Boost,
    P::DepthLimit,
    P::DocValues,
    P::EagerGlobalOrdinals,
    P::IgnoreAbove,
    P::Index,
    P::IndexOptions,
    P::NullValue,
    P::Similarity,
    P::SplitQueriesOnWhitespace,
    P::Properties,
    P::Meta,
];

const DENSE_VECTOR: &[MappingParam] = &[P::Dims, P::Meta];

const RANK_FEATURE: &[MappingParam] = &[P::PositiveScoreImpact, P::Meta];

const COMPLETION: &[MappingParam] = &[
    P::Analyzer,
    P::SearchAnalyzer,
    P::PreserveSeparators,
    P::PreservePositionIncrements,
    P::MaxInputLength,
    P::Meta,
];

const SEARCH_AS_YOU_TYPE: &[MappingParam] = &[
    P::MaxShingleSize,
    P::Analyzer,
    P::SearchAnalyzer,
    P::SearchQuoteAnalyzer,
    P::CopyTo,
    P::Index,
    P::IndexOptions,
    P::Norms,
    P::Similarity,
    P::Store,
    P::TermVector,
    P::Meta,
];

const TOKEN_COUNT: &[MappingParam] = &[
    P::Analyzer,
    P::Boost,
    P::DocValues,
    P::Fields,
    P::Index,
    P::NullValue,
    P::Store,
    P::Meta,
];

const RANGE: &[MappingParam] = &[P::Coerce, P::Boost, P::DocValues, P::Index, P::Store, P::Meta];

const DATE_RANGE: &[MappingParam] = &[
    P::Format,
    P::Coerce,
    P::Boost,
    P::DocValues,
    P::Index,
    P::Store,
    P::Meta,
];

const HISTOGRAM: &[MappingParam] = &[P::Meta];

const ALIAS: &[MappingParam] = &[P::Path];

const PERCOLATOR: &[MappingParam] = &[];

impl FieldType {
    /// Parameters accepted by this type, in emit order
    pub fn params(&self) -> &'static [MappingParam] {
        match self {
            FieldType::Text => TEXT,
            FieldType::Keyword => KEYWORD,
            FieldType::ConstantKeyword => CONSTANT_KEYWORD,
            FieldType::Wildcard => WILDCARD,
            FieldType::Long
            | FieldType::Integer
            | FieldType::Short
            | FieldType::Byte
            | FieldType::Double
            | FieldType::Float
            | FieldType::HalfFloat
            | FieldType::UnsignedLong => NUMERIC,
            FieldType::ScaledFloat => SCALED_FLOAT,
            FieldType::Date | FieldType::DateNanos => DATE,
            FieldType::Boolean => BOOLEAN,
            FieldType::Binary => BINARY,
            FieldType::Ip => IP,
            FieldType::GeoPoint => GEO_POINT,
            FieldType::GeoShape | FieldType::Shape => SHAPE,
            FieldType::Point => POINT,
            FieldType::Object => OBJECT,
            FieldType::Nested => NESTED,
            FieldType::Join => JOIN,
            FieldType::Flattened => FLATTENED,
            FieldType::DenseVector => DENSE_VECTOR,
            FieldType::RankFeature | FieldType::RankFeatures => RANK_FEATURE,
            FieldType::Completion => COMPLETION,
            FieldType::SearchAsYouType => SEARCH_AS_YOU_TYPE,
            FieldType::TokenCount => TOKEN_COUNT,
            FieldType::IntegerRange
            | FieldType::FloatRange
            | FieldType::LongRange
            | FieldType::DoubleRange
            | FieldType::IpRange => RANGE,
            FieldType::DateRange => DATE_RANGE,
            FieldType::Histogram => HISTOGRAM,
            FieldType::Alias => ALIAS,
            FieldType::Percolator => PERCOLATOR,
        }
    }

    pub fn supports(&self, param: MappingParam) -> bool {
        self.params().contains(&param)
    }

    /// Types holding child mappings under `properties`
    pub fn is_container(&self) -> bool {
        self.supports(MappingParam::Properties)
    }
}

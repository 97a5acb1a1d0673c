//! Bounded enumeration tags of the DSL
//!
//! Every tag parses case-insensitively and is emitted in the canonical case
//! the engine expects: uppercase for [`Operator`] and [`Relation`], lowercase
//! for everything else.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{DslError, ErrorKind};
use crate::input::Loose;

macro_rules! tag_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $err:ident, default $default:ident {
            $($(#[$vmeta:meta])* $variant:ident => $tag:literal $(| $alias:literal)*),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $tag),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = DslError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let tag = s.trim();
                $(
                    if tag.eq_ignore_ascii_case($tag) $(|| tag.eq_ignore_ascii_case($alias))* {
                        return Ok($name::$variant);
                    }
                )+
                Err(DslError::new(ErrorKind::$err).with_received(format!("{:?}", s)))
            }
        }

        impl From<$name> for Loose {
            fn from(v: $name) -> Self {
                Loose::Str(v.as_str().to_string())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let loose = Loose::deserialize(deserializer)?;
                loose.to_text().parse().map_err(|e: DslError| D::Error::custom(e.to_string()))
            }
        }
    };
}

tag_enum! {
    /// How the terms of an analyzed query combine
    Operator, InvalidOperator, default Or {
        And => "AND",
        Or => "OR",
    }
}

tag_enum! {
    /// What a full-text query matches when the analyzer removes every token
    ZeroTerms, InvalidZeroTermQuery, default None {
        None => "none",
        All => "all",
    }
}

tag_enum! {
    /// Range-query inclusion mode for range fields
    Relation, InvalidRelation, default Intersects {
        Intersects => "INTERSECTS",
        Contains => "CONTAINS",
        Within => "WITHIN",
    }
}

tag_enum! {
    /// Scoring algorithm of a text field
    Similarity, InvalidSimilarity, default Bm25 {
        Bm25 => "BM25",
        Boolean => "boolean",
    }
}

tag_enum! {
    /// What a text field records in its inverted index
    IndexOptions, InvalidIndexOptions, default Positions {
        Docs => "docs",
        Freqs => "freqs",
        Positions => "positions",
        Offsets => "offsets",
    }
}

tag_enum! {
    /// Vertex order of polygons in geo_shape and shape fields
    Orientation, InvalidOrientation, default Right {
        Right => "right" | "ccw" | "counterclockwise",
        Left => "left" | "cw" | "clockwise",
    }
}

tag_enum! {
    /// Term vector storage of a text field
    TermVector, InvalidTermVector, default No {
        No => "no",
        Yes => "yes",
        WithPositions => "with_positions",
        WithOffsets => "with_offsets",
        WithPositionsOffsets => "with_positions_offsets",
        WithPositionsPayloads => "with_positions_payloads",
        WithPositionsOffsetsPayloads => "with_positions_offsets_payloads",
    }
}

tag_enum! {
    /// How function_score combines the query score with the function score
    BoostMode, InvalidBoostMode, default Multiply {
        Multiply => "multiply",
        Replace => "replace",
        Sum => "sum",
        Avg => "avg",
        Max => "max",
        Min => "min",
    }
}

tag_enum! {
    /// How function_score combines the scores of its functions
    ScoreMode, InvalidScoreMode, default Multiply {
        Multiply => "multiply",
        Sum => "sum",
        Avg => "avg",
        First => "first",
        Max => "max",
        Min => "min",
    }
}

tag_enum! {
    /// Function applied to a field value by field_value_factor
    Modifier, InvalidModifier, default None {
        None => "none",
        Log => "log",
        Log1p => "log1p",
        Log2p => "log2p",
        Ln => "ln",
        Ln1p => "ln1p",
        Ln2p => "ln2p",
        Square => "square",
        Sqrt => "sqrt",
        Reciprocal => "reciprocal",
    }
}

tag_enum! {
    /// Handling of unmapped fields in an object
    Dynamic, InvalidDynamic, default True {
        True => "true",
        False => "false",
        Strict => "strict",
        Runtime => "runtime",
    }
}

tag_enum! {
    /// Execution strategy of a multi_match query
    MultiMatchType, InvalidMultiMatchType, default BestFields {
        BestFields => "best_fields",
        MostFields => "most_fields",
        CrossFields => "cross_fields",
        Phrase => "phrase",
        PhrasePrefix => "phrase_prefix",
        BoolPrefix => "bool_prefix",
    }
}

tag_enum! {
    /// Spatial relation between a query shape and indexed shapes
    SpatialRelation, InvalidSpatialRelation, default Intersects {
        Intersects => "intersects",
        Disjoint => "disjoint",
        Within => "within",
        Contains => "contains",
    }
}

/// Multi-term rewrite method
///
/// The `top_terms*` variants carry the number of terms to keep, written as a
/// suffix on the wire (`top_terms_10`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rewrite {
    #[default]
    ConstantScore,
    ConstantScoreBoolean,
    ScoringBoolean,
    TopTermsBlendedFreqs(u32),
    TopTermsBoost(u32),
    TopTerms(u32),
}

impl Rewrite {
    pub fn as_string(&self) -> String {
        match self {
            Rewrite::ConstantScore => "constant_score".to_string(),
            Rewrite::ConstantScoreBoolean => "constant_score_boolean".to_string(),
            Rewrite::ScoringBoolean => "scoring_boolean".to_string(),
            Rewrite::TopTermsBlendedFreqs(n) => format!("top_terms_blended_freqs_{}", n),
            Rewrite::TopTermsBoost(n) => format!("top_terms_boost_{}", n),
            Rewrite::TopTerms(n) => format!("top_terms_{}", n),
        }
    }
}

impl fmt::Display for Rewrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

impl FromStr for Rewrite {
    type Err = DslError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DslError::new(ErrorKind::InvalidRewrite).with_received(format!("{:?}", s));
        let tag = s.trim().to_lowercase();
        let sized = |prefix: &str| -> Option<Result<u32, DslError>> {
            tag.strip_prefix(prefix)
                .map(|n| n.parse::<u32>().map_err(|_| invalid()))
        };
        match tag.as_str() {
            "constant_score" => Ok(Rewrite::ConstantScore),
            "constant_score_boolean" => Ok(Rewrite::ConstantScoreBoolean),
            "scoring_boolean" => Ok(Rewrite::ScoringBoolean),
            _ => {
                if let Some(n) = sized("top_terms_blended_freqs_") {
                    Ok(Rewrite::TopTermsBlendedFreqs(n?))
                } else if let Some(n) = sized("top_terms_boost_") {
                    Ok(Rewrite::TopTermsBoost(n?))
                } else if let Some(n) = sized("top_terms_") {
                    Ok(Rewrite::TopTerms(n?))
                } else {
                    Err(invalid())
                }
            }
        }
    }
}

impl From<Rewrite> for Loose {
    fn from(v: Rewrite) -> Self {
        Loose::Str(v.as_string())
    }
}

impl Serialize for Rewrite {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_string())
    }
}

impl<'de> Deserialize<'de> for Rewrite {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|e: DslError| D::Error::custom(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operator_case_insensitive_canonical_upper() {
        assert_eq!("and".parse::<Operator>().unwrap(), Operator::And);
        assert_eq!("Or".parse::<Operator>().unwrap(), Operator::Or);
        assert_eq!(Operator::And.to_string(), "AND");
        assert_eq!(Operator::default(), Operator::Or);
    }

    #[test]
    fn test_unknown_operator_rejected() {
        let err = "xor".parse::<Operator>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperator);
    }

    #[test]
    fn test_relation_canonical_upper() {
        assert_eq!("within".parse::<Relation>().unwrap(), Relation::Within);
        assert_eq!(Relation::Within.as_str(), "WITHIN");
        assert_eq!(
            "overlaps".parse::<Relation>().unwrap_err().kind(),
            ErrorKind::InvalidRelation
        );
    }

    #[test]
    fn test_similarity_keeps_engine_tags() {
        assert_eq!("bm25".parse::<Similarity>().unwrap(), Similarity::Bm25);
        assert_eq!(Similarity::Bm25.as_str(), "BM25");
        assert_eq!(Similarity::default(), Similarity::Bm25);
        assert_eq!("BOOLEAN".parse::<Similarity>().unwrap().as_str(), "boolean");
    }

    #[test]
    fn test_modifier_has_ten_tags() {
        assert_eq!(Modifier::ALL.len(), 10);
        assert_eq!("LOG1P".parse::<Modifier>().unwrap(), Modifier::Log1p);
        assert_eq!(
            "cube".parse::<Modifier>().unwrap_err().kind(),
            ErrorKind::InvalidModifier
        );
    }

    #[test]
    fn test_orientation_aliases() {
        assert_eq!("ccw".parse::<Orientation>().unwrap(), Orientation::Right);
        assert_eq!("clockwise".parse::<Orientation>().unwrap(), Orientation::Left);
    }

    #[test]
    fn test_dynamic_accepts_bool_json() {
        let d: Dynamic = serde_json::from_value(json!(false)).unwrap();
        assert_eq!(d, Dynamic::False);
        let d: Dynamic = serde_json::from_value(json!("STRICT")).unwrap();
        assert_eq!(serde_json::to_value(d).unwrap(), json!("strict"));
    }

    #[test]
    fn test_enum_errors_by_kind() {
        assert_eq!(
            "x".parse::<ScoreMode>().unwrap_err().kind(),
            ErrorKind::InvalidScoreMode
        );
        assert_eq!(
            "x".parse::<BoostMode>().unwrap_err().kind(),
            ErrorKind::InvalidBoostMode
        );
        assert_eq!(
            "x".parse::<TermVector>().unwrap_err().kind(),
            ErrorKind::InvalidTermVector
        );
        assert_eq!(
            "x".parse::<IndexOptions>().unwrap_err().kind(),
            ErrorKind::InvalidIndexOptions
        );
        assert_eq!(
            "x".parse::<ZeroTerms>().unwrap_err().kind(),
            ErrorKind::InvalidZeroTermQuery
        );
        assert_eq!(
            "x".parse::<SpatialRelation>().unwrap_err().kind(),
            ErrorKind::InvalidSpatialRelation
        );
    }

    #[test]
    fn test_rewrite_sized_variants() {
        assert_eq!(
            "top_terms_boost_10".parse::<Rewrite>().unwrap(),
            Rewrite::TopTermsBoost(10)
        );
        assert_eq!(
            "TOP_TERMS_5".parse::<Rewrite>().unwrap(),
            Rewrite::TopTerms(5)
        );
        assert_eq!(
            "top_terms_blended_freqs_3".parse::<Rewrite>().unwrap(),
            Rewrite::TopTermsBlendedFreqs(3)
        );
        assert_eq!(Rewrite::TopTerms(5).to_string(), "top_terms_5");
        assert_eq!(
            "top_terms_x".parse::<Rewrite>().unwrap_err().kind(),
            ErrorKind::InvalidRewrite
        );
        assert_eq!(
            "fastest".parse::<Rewrite>().unwrap_err().kind(),
            ErrorKind::InvalidRewrite
        );
    }
}

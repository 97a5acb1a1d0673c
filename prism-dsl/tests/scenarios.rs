//! End-to-end scenarios: parse engine JSON, inspect the typed tree, re-emit.

use prism_dsl::enums::Relation;
use prism_dsl::mapping::{FieldType, MappingParam};
use prism_dsl::prelude::*;
use prism_dsl::query::{
    BoolParams, BoostingParams, DecayParams, DisMaxParams, FunctionScoreParams, IdsParams,
    TermParams,
};
use prism_dsl::scalar::Scalar;
use prism_dsl::{ErrorKind, Mapping, MappingParams, Mappings, Query, QueryKind, Search};
use serde_json::json;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn text(s: &str) -> Scalar {
    Scalar::String(s.to_string())
}

// ---------------------------------------------------------------------------
// Worked scenarios
// ---------------------------------------------------------------------------

#[test]
fn test_term_object_form() {
    let body = json!({"term": {"user.id": {"value": "chanced", "boost": 0.2, "case_insensitive": true}}});
    let query = Query::from_json(&body).unwrap();
    let term = query.term().unwrap();
    assert_eq!(term.field(), "user.id");
    assert_eq!(term.value(), Some(&text("chanced")));
    assert_eq!(term.boost(), 0.2);
    assert!(term.case_insensitive());
    assert_eq!(query.to_json(), body);
}

#[test]
fn test_bool_compound() {
    init_tracing();
    let query = Query::from_json(&json!({"bool": {
        "must": {"term": {"user.id": "chanced"}},
        "filter": {"term": {"tags": "production"}},
        "should": [{"term": {"tags": "env1"}}, {"term": {"tags": "deployed"}}],
        "minimum_should_match": 1,
        "boost": 1.0
    }}))
    .unwrap();
    let bool_query = query.bool_query().unwrap();
    assert_eq!(bool_query.must().len(), 1);
    assert_eq!(bool_query.filter().len(), 1);
    assert_eq!(bool_query.should().len(), 2);
    assert_eq!(bool_query.must_not().len(), 0);
    assert_eq!(bool_query.minimum_should_match(), "1");
    assert_eq!(
        query.to_json(),
        json!({"bool": {
            "must": [{"term": {"user.id": {"value": "chanced"}}}],
            "filter": [{"term": {"tags": {"value": "production"}}}],
            "should": [{"term": {"tags": {"value": "env1"}}}, {"term": {"tags": {"value": "deployed"}}}],
            "minimum_should_match": "1"
        }})
    );
}

#[test]
fn test_boosting_validation() {
    let only_positive = BoostingParams {
        positive: Some(TermParams::new("text", "apple").into()),
        negative_boost: Some(0.5.into()),
        ..Default::default()
    };
    assert_eq!(only_positive.build().unwrap_err().kind(), ErrorKind::NegativeRequired);

    let only_negative = BoostingParams {
        negative: Some(TermParams::new("text", "pie").into()),
        negative_boost: Some(0.5.into()),
        ..Default::default()
    };
    assert_eq!(only_negative.build().unwrap_err().kind(), ErrorKind::PositiveRequired);

    let zero = BoostingParams::new(
        TermParams::new("text", "apple"),
        TermParams::new("text", "pie"),
        0,
    );
    assert_eq!(zero.build().unwrap_err().kind(), ErrorKind::InvalidNegativeBoost);

    let ok = BoostingParams::new(
        TermParams::new("text", "apple"),
        TermParams::new("text", "pie"),
        0.5,
    )
    .build()
    .unwrap();
    assert_eq!(ok.negative_boost(), 0.5);
}

#[test]
fn test_match_shortcut() {
    let query = Query::from_json(&json!({"match": {"message": "this is a test"}})).unwrap();
    let m = query.match_query().unwrap();
    assert_eq!(m.field(), "message");
    assert_eq!(m.query(), "this is a test");
    assert_eq!(m.boost(), 1.0);
    assert_eq!(
        query.to_json(),
        json!({"match": {"message": {"query": "this is a test"}}})
    );
}

#[test]
fn test_range_with_relation_and_time_zone() {
    let query = Query::from_json(&json!({"range": {"ts": {
        "gte": "2020-01-01",
        "lt": "now",
        "time_zone": "+01:00",
        "relation": "WITHIN",
        "boost": 2
    }}}))
    .unwrap();
    let range = query.range().unwrap();
    assert_eq!(range.gte(), Some(&text("2020-01-01")));
    assert_eq!(range.lt(), Some(&text("now")));
    assert_eq!(range.time_zone(), "+01:00");
    assert_eq!(range.relation(), Relation::Within);
    assert_eq!(range.boost(), 2.0);
    assert_eq!(
        query.to_json(),
        json!({"range": {"ts": {
            "gte": "2020-01-01",
            "lt": "now",
            "time_zone": "+01:00",
            "relation": "WITHIN",
            "boost": 2.0
        }}})
    );
}

#[test]
fn test_ids_keep_order() {
    let body = json!({"ids": {"values": ["1", "4", "100"]}});
    let query = Query::from_json(&body).unwrap();
    let ids: Vec<_> = query.ids().unwrap().values().iter().cloned().collect();
    assert_eq!(ids, vec!["1", "4", "100"]);
    assert_eq!(query.to_json(), body);
}

// ---------------------------------------------------------------------------
// Shape fidelity
// ---------------------------------------------------------------------------

#[test]
fn test_field_keyed_shortcut_for_leaf_clauses() {
    for kind in ["term", "prefix"] {
        let query = Query::from_json(&json!({ (kind): {"f": "v"} })).unwrap();
        let clause = query.get(kind.parse().unwrap()).unwrap();
        let emitted = clause.to_body();
        assert_eq!(emitted, json!({"f": {"value": "v"}}), "{}", kind);
    }
}

#[test]
fn test_defaults_elided() {
    let query = Query::from_json(&json!({"term": {"f": {"value": "v"}}})).unwrap();
    let term = query.term().unwrap();
    assert_eq!(term.boost(), 1.0);
    assert!(!term.case_insensitive());
    assert_eq!(query.to_json(), json!({"term": {"f": {"value": "v"}}}));
}

#[test]
fn test_unknown_kind_top_level_vs_list() {
    init_tracing();
    let err = Query::from_json(&json!({"percolate": {"field": "q"}})).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedKind);

    let query = Query::from_json(&json!({"bool": {"must": [
        {"percolate": {"field": "q"}},
        {"term": {"a": "b"}}
    ]}}))
    .unwrap();
    assert_eq!(query.bool_query().unwrap().must().len(), 1);
}

#[test]
fn test_tie_breaker_bounds() {
    for bad in [-0.1, 1.5] {
        let err = DisMaxParams {
            tie_breaker: Some(bad.into()),
            ..DisMaxParams::new().query(TermParams::new("a", "b"))
        }
        .build()
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTieBreaker);
    }
}

#[test]
fn test_nested_error_names_clause_and_role() {
    let err = Query::from_json(&json!({"bool": {"should": [
        {"term": {"a": "b"}},
        {"range": {"ts": {"gte": 1, "boost": "high"}}}
    ]}}))
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidBoost);
    assert_eq!(err.clause(), Some(QueryKind::Range));
    assert_eq!(err.role(), Some("should[1]"));
    assert_eq!(err.param(), Some("boost"));
    assert!(err.json().is_some());
}

#[test]
fn test_decay_requires_origin_and_scale() {
    let err = FunctionScoreParams::new()
        .function(DecayParams::gauss("date").scale("10d"))
        .build()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OriginRequired);
    let err = FunctionScoreParams::new()
        .function(DecayParams::gauss("date").origin("now"))
        .build()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ScaleRequired);
}

#[test]
fn test_function_score_shorthand_with_weight() {
    let query = Query::from_json(&json!({"function_score": {
        "query": {"match": {"title": "rust"}},
        "field_value_factor": {"field": "likes", "modifier": "log1p"},
        "weight": 3,
        "boost_mode": "sum"
    }}))
    .unwrap();
    assert_eq!(
        query.to_json(),
        json!({"function_score": {
            "query": {"match": {"title": {"query": "rust"}}},
            "functions": [{"field_value_factor": {"field": "likes", "modifier": "log1p"}, "weight": 3.0}],
            "boost_mode": "sum"
        }})
    );

    let bare = Query::from_json(&json!({"function_score": {
        "query": {"match_all": {}},
        "weight": 2
    }}))
    .unwrap();
    let functions = bare.function_score().unwrap().functions();
    assert_eq!(functions.len(), 1);
    assert_eq!(functions[0].weight(), Some(2.0));
    assert_eq!(
        bare.to_json(),
        json!({"function_score": {"query": {"match_all": {}}, "functions": [{"weight": 2.0}]}})
    );
}

// ---------------------------------------------------------------------------
// Builders into envelopes
// ---------------------------------------------------------------------------

#[test]
fn test_bool_preserves_insertion_order() {
    let query = BoolParams::new()
        .should(TermParams::new("tag", "c"))
        .should(TermParams::new("tag", "a"))
        .should(TermParams::new("tag", "b"))
        .build()
        .unwrap();
    let order: Vec<_> = query
        .should()
        .iter()
        .map(|c| c.to_body()["tag"]["value"].clone())
        .collect();
    assert_eq!(order, vec![json!("c"), json!("a"), json!("b")]);
}

#[test]
fn test_search_envelope() {
    let search = Search::from_json_str(
        r#"{
            "query": {"bool": {"must": [{"match": {"title": "rust"}}]}},
            "from": 0,
            "size": 25,
            "_source": ["title"]
        }"#,
    )
    .unwrap();
    assert_eq!(search.size, Some(25));
    assert_eq!(
        search.query.as_ref().unwrap().kinds().collect::<Vec<_>>(),
        vec![QueryKind::Bool]
    );

    let built = Search::new()
        .with_query_params(IdsParams::new(vec!["1", "2"]))
        .unwrap();
    assert_eq!(
        built.to_json().unwrap(),
        json!({"query": {"ids": {"values": ["1", "2"]}}})
    );

    let err = Search::from_json(&json!({"_source": 3})).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidSourceKind);
}

// ---------------------------------------------------------------------------
// Mappings
// ---------------------------------------------------------------------------

#[test]
fn test_mapping_limits() {
    let six: std::collections::BTreeMap<String, String> =
        (0..6).map(|i| (format!("key{}", i), "v".to_string())).collect();
    let err = Mapping::build(
        FieldType::Keyword,
        MappingParams {
            meta: Some(six),
            ..Default::default()
        },
    )
    .unwrap_err();
    assert!(err.contains(ErrorKind::MetaLimitExceeded));

    let mut mapping = Mapping::keyword();
    let err = mapping
        .set(MappingParam::Meta, &json!({ ("k".repeat(21)): "v" }))
        .unwrap_err();
    assert!(err.contains(ErrorKind::MetaLimitExceeded));

    for (size, ok) in [(0, true), (1, false), (2, true), (3, true), (4, true), (5, false)] {
        let result = Mapping::build(
            FieldType::SearchAsYouType,
            MappingParams {
                max_shingle_size: Some(size.into()),
                ..Default::default()
            },
        );
        assert_eq!(result.is_ok(), ok, "max_shingle_size {}", size);
    }
}

#[test]
fn test_mappings_document_round_trip() {
    let body = json!({
        "dynamic": "strict",
        "properties": {
            "title": {"type": "text", "analyzer": "english", "fields": {"raw": {"type": "keyword"}}},
            "embedding": {"type": "dense_vector", "dims": 384},
            "comments": {"type": "nested", "properties": {
                "author": {"type": "keyword", "meta": {"unit": "person"}},
                "posted": {"type": "date", "format": "epoch_millis"}
            }},
            "relation": {"type": "join", "relations": {"question": "answer"}}
        }
    });
    let mappings = Mappings::from_json(&body).unwrap();
    assert_eq!(mappings.properties.len(), 4);
    assert_eq!(
        mappings.properties.lookup("comments.author").unwrap().field_type(),
        FieldType::Keyword
    );
    assert_eq!(mappings.to_json(), body);
}

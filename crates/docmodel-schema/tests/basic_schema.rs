use docmodel_schema::{BasicSchema, PathKind, SchemaAdapter, SchemaRegistry, ValidationError};
use serde_json::json;

fn pet_schema() -> serde_json::Value {
    json!({
        "name": {"type": "String", "required": true},
        "website": "String",
        "likes": [{
            "thing": {"type": "String", "required": true},
            "level": {"type": "Number", "default": 5, "min": 0, "max": 10}
        }],
        "features": {
            "breed": {"type": "String", "required": true},
            "eyes": "String"
        },
        "owner": {"type": "Document", "schema": {
            "name": "String",
            "online": {"type": "Document", "schema": {
                "website": "String",
                "photoStreams": {"type": "Array", "of": "String"}
            }}
        }},
        "tags": {"type": "Array", "of": "String", "minItems": 1}
    })
}

#[test]
fn test_registry_selects_builtin_engine() {
    let registry = SchemaRegistry::with_defaults();
    assert!(registry.select(&pet_schema()).is_some());
    assert!(registry.select(&json!("not a schema")).is_none());
}

#[test]
fn test_path_enumeration_flattens_groupings() {
    let schema = pet_schema();
    let engine = BasicSchema::new();
    let bindings = engine.get_paths(&schema);
    let paths: Vec<&str> = bindings.iter().map(|b| b.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "name",
            "website",
            "likes",
            "features.breed",
            "features.eyes",
            "owner",
            "tags"
        ]
    );
    let kinds: Vec<PathKind> = bindings.iter().map(|b| b.kind).collect();
    assert_eq!(
        kinds,
        vec![
            PathKind::Scalar,
            PathKind::Scalar,
            PathKind::DocumentArray,
            PathKind::Scalar,
            PathKind::Scalar,
            PathKind::Document,
            PathKind::Array
        ]
    );
}

#[test]
fn test_each_path_visits_in_order() {
    let schema = pet_schema();
    let engine = BasicSchema::new();
    let mut seen = Vec::new();
    engine.each_path(&schema, &mut |path, _| seen.push(path.to_string()));
    assert_eq!(seen.len(), 7);
    assert_eq!(seen[0], "name");
    assert_eq!(seen[3], "features.breed");
}

#[test]
fn test_deep_lookup_through_nested_documents() {
    let schema = pet_schema();
    let engine = BasicSchema::new();
    let node = engine
        .get_path_schema("owner.online.photoStreams", &schema, None)
        .expect("path should resolve");
    assert_eq!(engine.kind(node), PathKind::Array);
}

#[test]
fn test_lookup_into_document_array_elements() {
    let schema = pet_schema();
    let engine = BasicSchema::new();
    let direct = engine.get_path_schema("likes.level", &schema, None);
    let indexed = engine.get_path_schema("likes[2].level", &schema, None);
    assert_eq!(direct, indexed);
    assert!(direct.is_some());
}

#[test]
fn test_base_path_fallback() {
    let schema = pet_schema();
    let engine = BasicSchema::new();
    assert!(engine.get_path_schema("breed", &schema, None).is_none());
    assert!(engine
        .get_path_schema("breed", &schema, Some("features."))
        .is_some());
}

#[test]
fn test_create_whole_document() {
    let schema = pet_schema();
    let engine = BasicSchema::new();
    let created = engine.create(None, &schema, None).expect("create");
    assert_eq!(created["likes"], json!([]));
    assert_eq!(created["tags"], json!([]));
    assert_eq!(created["features"], json!({}));
    assert!(created.get("name").is_none());
}

#[test]
fn test_create_scoped_to_base_path() {
    let schema = pet_schema();
    let engine = BasicSchema::new();
    let created = engine
        .create(None, &schema, Some("owner.online."))
        .expect("create");
    assert_eq!(created["photoStreams"], json!([]));
    assert!(created.get("website").is_none());
}

#[test]
fn test_create_document_array_element() {
    let schema = pet_schema();
    let engine = BasicSchema::new();
    let element = engine.create(Some("likes"), &schema, None);
    // `likes` is the array itself, so create yields its default
    assert_eq!(element.expect("create"), json!([]));
    let sub = engine
        .sub_schema(engine.get_path_schema("likes", &schema, None).expect("node"))
        .expect("element schema");
    let created = engine.create(None, sub, None).expect("create element");
    assert_eq!(created, json!({"level": 5}));
}

#[test]
fn test_create_unknown_path_errors() {
    let schema = pet_schema();
    let engine = BasicSchema::new();
    assert!(engine.create(Some("nope"), &schema, None).is_err());
}

#[test]
fn test_scalar_validation_catalogue() {
    let engine = BasicSchema::new();
    let schema = pet_schema();
    let name = engine.get_path_schema("name", &schema, None).expect("node");
    assert!(matches!(
        engine.validate_scalar(name, "name", None),
        Some(ValidationError::Required { .. })
    ));
    assert!(matches!(
        engine.validate_scalar(name, "name", Some(&json!(42))),
        Some(ValidationError::WrongType { .. })
    ));
    assert!(engine
        .validate_scalar(name, "name", Some(&json!("Tartar Sauce")))
        .is_none());

    let level = engine
        .get_path_schema("likes.level", &schema, None)
        .expect("node");
    assert!(matches!(
        engine.validate_scalar(level, "likes.level", Some(&json!(99))),
        Some(ValidationError::OutOfRange { .. })
    ));
    // optional scalars accept absence and null
    assert!(engine.validate_scalar(level, "likes.level", None).is_none());
    assert!(engine
        .validate_scalar(level, "likes.level", Some(&json!(null)))
        .is_none());
}

#[test]
fn test_array_validation() {
    let engine = BasicSchema::new();
    let schema = pet_schema();
    let tags = engine.get_path_schema("tags", &schema, None).expect("node");
    assert!(matches!(
        engine.validate_array(tags, "tags", Some(&[])),
        Some(ValidationError::OutOfRange { .. })
    ));
    assert!(engine
        .validate_array(tags, "tags", Some(&[json!("fluffy")]))
        .is_none());
    // absent and not required
    assert!(engine.validate_array(tags, "tags", None).is_none());
}

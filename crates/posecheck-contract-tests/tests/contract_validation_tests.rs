//! Validates contract fixtures against frozen JSON schemas and checks that the
//! client-side parser reads them the same way.

use posecheck_analysis_contract::{AnnotatedImage, parse_analysis_body, server_error_message};
use posecheck_contract_tests::{compile_validator, contract_path, load_json, load_raw};
use serde_json::json;

#[test]
fn contract_validation_tests_analysis_fixtures_match_schema() {
    let validator = compile_validator("analysis-response.schema.json");
    for fixture in [
        "fixtures/analysis-response.valid.json",
        "fixtures/analysis-response.clean.json",
    ] {
        assert!(
            validator.is_valid(&load_json(fixture)),
            "{fixture} should validate against schema"
        );
    }
}

#[test]
fn contract_validation_tests_analysis_schema_rejects_wrong_types() {
    let validator = compile_validator("analysis-response.schema.json");
    assert!(!validator.is_valid(&json!({"has_bad_posture": "yes"})));
    assert!(!validator.is_valid(&json!({"has_bad_posture": true, "issues": [1, 2]})));
    assert!(!validator.is_valid(&json!({"issues": []})));
}

#[test]
fn contract_validation_tests_error_fixture_matches_schema() {
    let validator = compile_validator("error-response.schema.json");
    assert!(validator.is_valid(&load_json("fixtures/error-response.valid.json")));
    assert!(validator.is_valid(&json!({"message": "bad frame"})));
    assert!(!validator.is_valid(&json!({"status": 500})));
}

#[test]
fn contract_validation_tests_parser_reads_analysis_fixture() {
    let result = parse_analysis_body(&load_raw("fixtures/analysis-response.valid.json"))
        .expect("fixture should parse");

    assert!(result.flagged());
    assert_eq!(result.issues().len(), 2);
    let image = AnnotatedImage::parse(result.annotated_image().expect("annotated image"));
    let bytes = image.decode_inline().expect("inline image decodes");
    assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
}

#[test]
fn contract_validation_tests_parser_reads_error_fixture() {
    assert_eq!(
        server_error_message(&load_raw("fixtures/error-response.valid.json")).as_deref(),
        Some("model overloaded")
    );
}

#[test]
fn contract_validation_tests_every_schema_compiles() {
    let mut schemas: Vec<String> = std::fs::read_dir(contract_path(""))
        .expect("contracts directory should be readable")
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.ends_with(".schema.json"))
        .collect();
    schemas.sort();

    assert_eq!(
        schemas,
        vec!["analysis-response.schema.json", "error-response.schema.json"]
    );
    for schema in &schemas {
        assert!(
            load_json(schema).get("$id").is_none(),
            "{schema} must not carry a relative $id"
        );
        compile_validator(schema);
    }
}

//! Integration tests for analysis body parsing and annotated image handling.

use posecheck_analysis_contract::{AnalysisContractError, AnnotatedImage, parse_analysis_body};
use serde_json::json;

#[test]
fn analysis_body_parsing_tests_keeps_documented_shape() {
    let raw = br#"{"has_bad_posture":true,"issues":["knees cave in","back rounded"],"annotated_image":"data:image/jpeg;base64,AAEC"}"#;
    let result = parse_analysis_body(raw).expect("body should parse");

    assert!(result.flagged());
    assert_eq!(result.issues(), vec!["knees cave in", "back rounded"]);
    assert_eq!(result.annotated_image(), Some("data:image/jpeg;base64,AAEC"));
}

#[test]
fn analysis_body_parsing_tests_passes_unknown_shape_verbatim() {
    let raw = br#"{"score":0.4,"frames":[1,2,3]}"#;
    let result = parse_analysis_body(raw).expect("body should parse");
    assert_eq!(result.body(), &json!({"score":0.4,"frames":[1,2,3]}));
}

#[test]
fn analysis_body_parsing_tests_keeps_plain_text_body() {
    let result = parse_analysis_body(b"ok").expect("text body should pass through");
    assert_eq!(result.body(), &json!("ok"));
}

#[test]
fn analysis_body_parsing_tests_rejects_empty_and_null_bodies() {
    let bodies: [&[u8]; 3] = [b"", b"   ", b"null"];
    for raw in bodies {
        assert!(matches!(
            parse_analysis_body(raw),
            Err(AnalysisContractError::EmptyBody)
        ));
    }
}

#[test]
fn analysis_body_parsing_tests_classifies_annotated_images() {
    let inline = AnnotatedImage::parse("data:image/png;base64,AAEC");
    assert_eq!(inline.decode_inline().expect("valid base64"), vec![0, 1, 2]);

    let remote = AnnotatedImage::parse("https://cdn.example.test/a.png");
    assert!(matches!(remote, AnnotatedImage::Url(_)));
    assert!(matches!(
        remote.decode_inline(),
        Err(AnalysisContractError::NotInline)
    ));

    assert!(matches!(
        AnnotatedImage::parse("/static/a.png"),
        AnnotatedImage::Other(_)
    ));
}

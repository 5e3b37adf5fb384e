//! Integration tests for media validation rules.

use posecheck_core::{MediaKind, MediaPolicy, validate_media};

#[test]
fn media_validation_tests_rejects_empty_file() {
    let result = validate_media(0, "image/png");
    assert!(!result.valid);
    assert!(result.reason.unwrap().to_lowercase().contains("empty"));
}

#[test]
fn media_validation_tests_rejects_oversized_file_with_limit() {
    let result = validate_media(60 * 1024 * 1024, "image/png");
    assert!(!result.valid);
    assert!(result.reason.unwrap().contains("50MB"));
}

#[test]
fn media_validation_tests_lists_accepted_formats_for_unknown_type() {
    let result = validate_media(1024, "application/pdf");
    assert!(!result.valid);
    let reason = result.reason.unwrap();
    for accepted in ["image/jpeg", "image/png", "image/webp", "video/mp4", "video/webm"] {
        assert!(reason.contains(accepted), "missing {accepted} in {reason}");
    }
}

#[test]
fn media_validation_tests_accepts_small_png() {
    let result = validate_media(1024, "image/png");
    assert!(result.valid);
    assert!(result.reason.is_none());
}

#[test]
fn media_validation_tests_is_deterministic() {
    let cases = [
        (0, "image/png"),
        (1, "image/jpeg"),
        (60 * 1024 * 1024, "video/webm"),
        (2048, "text/plain"),
    ];
    for (size, mime) in cases {
        assert_eq!(validate_media(size, mime), validate_media(size, mime));
    }
}

#[test]
fn media_validation_tests_classifies_kinds() {
    let policy = MediaPolicy::default();
    assert_eq!(policy.kind_of("image/webp"), Some(MediaKind::Image));
    assert_eq!(policy.kind_of("video/avi"), Some(MediaKind::Video));
    assert_eq!(policy.kind_of("audio/mpeg"), None);
}

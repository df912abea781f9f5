use super::*;

#[test]
fn exact_three_segment_query_is_valid_and_exact() {
    let result = analyze("myorg/myproj/myrepo", None);
    assert!(result.is_valid());
    assert!(result.is_exact);
    assert!(!result.is_pattern);
    assert!(!result.is_multi_provider);
    assert_eq!(result.org_segment, "myorg");
    assert_eq!(result.middle_segment, "myproj");
    assert_eq!(result.repo_segment, "myrepo");
}

#[test]
fn wildcard_without_explicit_provider_is_multi_provider() {
    let result = analyze("shared/*/*", None);
    assert!(result.is_valid());
    assert!(result.is_pattern);
    assert!(result.is_multi_provider);
    assert!(result.provider_segment.is_none());
}

#[test]
fn wildcard_with_explicit_provider_is_not_multi_provider() {
    let result = analyze("myorg/*/my-repo", Some("GH"));
    assert!(result.is_valid());
    assert!(result.is_pattern);
    assert!(!result.is_multi_provider);
    assert_eq!(result.provider_segment.as_deref(), Some("gh"));
}

#[test]
fn wildcard_only_in_first_position_is_still_multi_provider() {
    // Regression test: wildcard detection must check all three segments,
    // not just the first, or a query like `org/*/repo` would be wrongly
    // classified as single-provider.
    let result = analyze("*/proj/repo", None);
    assert!(result.is_multi_provider);

    let result = analyze("org/*/repo", None);
    assert!(result.is_multi_provider);

    let result = analyze("org/proj/*", None);
    assert!(result.is_multi_provider);
}

#[test]
fn empty_query_is_invalid_pattern_shape() {
    let result = analyze("", None);
    assert!(!result.is_valid());
    assert!(result
        .validation_errors
        .iter()
        .any(|e| matches!(e, PatternValidationError::InvalidPatternShape { .. })));
}

#[test]
fn wrong_segment_count_is_invalid() {
    let result = analyze("only/two", None);
    assert!(!result.is_valid());
    assert!(result
        .validation_errors
        .iter()
        .any(|e| matches!(e, PatternValidationError::InvalidPatternShape { segment_count: 2 })));

    let result = analyze("a/b/c/d", None);
    assert!(!result.is_valid());
    assert!(result
        .validation_errors
        .iter()
        .any(|e| matches!(e, PatternValidationError::InvalidPatternShape { segment_count: 4 })));
}

#[test]
fn empty_segment_is_reported() {
    let result = analyze("org//repo", None);
    assert!(!result.is_valid());
    assert!(result
        .validation_errors
        .iter()
        .any(|e| matches!(e, PatternValidationError::EmptySegment { position: 1 })));
}

#[test]
fn disallowed_characters_are_rejected() {
    for bad in ["org|bad/proj/repo", "org/proj/repo<bad>", "org/\"proj\"/repo"] {
        let result = analyze(bad, None);
        assert!(!result.is_valid(), "expected invalid for {bad}");
    }
}

#[test]
fn invalid_characters_error_carries_the_whole_segment() {
    let result = analyze("org|bad/proj/repo", None);
    let error = result
        .validation_errors
        .iter()
        .find(|e| matches!(e, PatternValidationError::InvalidCharacters { .. }))
        .expect("expected an InvalidCharacters error");
    match error {
        PatternValidationError::InvalidCharacters { position, segment } => {
            assert_eq!(*position, 0);
            assert_eq!(segment, "org|bad");
        }
        _ => unreachable!(),
    }
}

#[test]
fn spaces_are_preserved_in_project_segment() {
    let result = analyze("myorg/My Project/myrepo", None);
    assert!(result.is_valid());
    assert_eq!(result.middle_segment, "My Project");
}

#[test]
fn percent_sign_is_allowed() {
    let result = analyze("org/proj%20name/repo", None);
    assert!(result.is_valid());
}

#[test]
fn provider_names_are_lowercased_but_segments_preserve_case() {
    let result = analyze("MyOrg/MyProj/MyRepo", Some("GitHub"));
    assert_eq!(result.provider_segment.as_deref(), Some("github"));
    assert_eq!(result.org_segment, "MyOrg");
    assert_eq!(result.middle_segment, "MyProj");
    assert_eq!(result.repo_segment, "MyRepo");
}

#[test]
fn wildcard_all_segment_is_valid() {
    let result = analyze("*/*/*", None);
    assert!(result.is_valid());
    assert!(result.is_multi_provider);
}

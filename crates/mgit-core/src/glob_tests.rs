use super::*;

#[test]
fn exact_match_is_case_insensitive() {
    assert!(matches("MyRepo", "myrepo"));
    assert!(matches("myrepo", "MYREPO"));
    assert!(!matches("myrepo", "otherrepo"));
}

#[test]
fn star_matches_zero_or_more() {
    assert!(matches("*", "anything"));
    assert!(matches("*", ""));
    assert!(matches("my*", "my-repo"));
    assert!(matches("*-repo", "my-repo"));
    assert!(matches("my*repo", "my-cool-repo"));
    assert!(!matches("my*repo", "your-cool-repo"));
}

#[test]
fn question_mark_matches_exactly_one() {
    assert!(matches("repo?", "repo1"));
    assert!(!matches("repo?", "repo"));
    assert!(!matches("repo?", "repo12"));
}

#[test]
fn combined_wildcards() {
    assert!(matches("a*b?c", "a--b-c"));
    assert!(!matches("a*b?c", "a--b--c"));
}

#[test]
fn anchored_both_ends() {
    assert!(!matches("repo", "my-repo"));
    assert!(!matches("repo", "repository"));
}

#[test]
fn unicode_code_points() {
    assert!(matches("caf??", "café1"));
    assert!(matches("*\u{00e9}*", "caf\u{00e9}"));
}

#[test]
fn is_glob_detects_metacharacters() {
    assert!(is_glob("*"));
    assert!(is_glob("foo?"));
    assert!(!is_glob("exact-name"));
}

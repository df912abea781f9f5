use super::*;

fn outcome_with_stderr(stderr: &str) -> GitOutcome {
    GitOutcome {
        exit_code: Some(128),
        stdout: String::new(),
        stderr: stderr.to_string(),
        duration: Duration::from_millis(1),
    }
}

#[test]
fn classify_network_errors() {
    let outcome = outcome_with_stderr("fatal: unable to access: Could not resolve host: github.com");
    match GitExecutorError::classify("clone", &outcome) {
        GitExecutorError::NetworkError { .. } => {}
        other => panic!("expected NetworkError, got {other:?}"),
    }
}

#[test]
fn classify_auth_errors() {
    let outcome = outcome_with_stderr("remote: Authentication failed for 'https://...'");
    match GitExecutorError::classify("clone", &outcome) {
        GitExecutorError::AuthError { .. } => {}
        other => panic!("expected AuthError, got {other:?}"),
    }
}

#[test]
fn classify_merge_conflicts() {
    let outcome = outcome_with_stderr("fatal: Not possible to fast-forward, aborting.");
    match GitExecutorError::classify("pull --ff-only", &outcome) {
        GitExecutorError::MergeConflict { .. } => {}
        other => panic!("expected MergeConflict, got {other:?}"),
    }
}

#[test]
fn classify_unrecognized_falls_through() {
    let outcome = outcome_with_stderr("fatal: something truly novel happened");
    match GitExecutorError::classify("status", &outcome) {
        GitExecutorError::UnknownGitError { .. } => {}
        other => panic!("expected UnknownGitError, got {other:?}"),
    }
}

#[test]
fn bound_output_leaves_small_output_untouched() {
    let small = b"hello world".to_vec();
    assert_eq!(bound_output(small, OUTPUT_CAPTURE_LIMIT), "hello world");
}

#[test]
fn bound_output_truncates_large_output_keeping_head_and_tail() {
    let big = vec![b'x'; 200_000];
    let bounded = bound_output(big, 1024);
    assert!(bounded.len() < 200_000);
    assert!(bounded.contains("truncated"));
    assert!(bounded.starts_with('x'));
    assert!(bounded.ends_with('x'));
}

#[test]
fn tail_respects_char_boundaries_on_multibyte_input() {
    let text = "café".repeat(1000);
    let result = tail(&text, 10);
    assert!(std::str::from_utf8(result.as_bytes()).is_ok());
}

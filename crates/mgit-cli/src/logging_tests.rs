use super::*;
use serial_test::serial;

// Env vars are process-global, so these run serially to avoid racing other
// tests that read or write NO_COLOR/DEBUG.

#[test]
#[serial]
fn colors_enabled_by_default() {
    std::env::remove_var("NO_COLOR");
    assert!(colors_enabled());
}

#[test]
#[serial]
fn no_color_disables_colors() {
    std::env::set_var("NO_COLOR", "1");
    assert!(!colors_enabled());
    std::env::remove_var("NO_COLOR");
}

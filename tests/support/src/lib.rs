//! test-support: helpers for robust, nextest-friendly tests.
//!
//! Add as a dev-dependency in your top-level `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test_support = { path = "tests/support", features = ["serde"] }
//! ```
//!
//! Then in tests:
//! ```rust
//! use test_support::{init_tracing, fixture_path};
//!
//! #[test]
//! fn example() {
//!     init_tracing();
//!     let _dump = fixture_path("tickets.json");
//! }
//! ```

use once_cell::sync::Lazy;
use tracing_subscriber::{fmt, EnvFilter};

use std::path::{Path, PathBuf};

/// Binary under test.
pub const BIN: &str = "ticket-activity-report";

/// Fixed clock for reproducible week windows: Wednesday 2025-01-15 noon in Tokyo.
pub const NOW: &str = "2025-01-15T12:00:00+09:00";

/// Initialize `tracing` once, honoring `RUST_LOG` and writing via the test writer.
///
/// Safe to call from multiple tests; only the first call configures the global subscriber.
pub fn init_tracing() {
    static INIT: Lazy<()> = Lazy::new(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new("warn,test=info"))
            .unwrap();
        // with_test_writer() causes logs to appear alongside failing tests only (cargo/nextest)
        let _ = fmt().with_env_filter(filter).with_test_writer().try_init();
    });
    Lazy::force(&INIT);
}

/// Insta settings shared by snapshot tests.
///
/// - Centralizes snapshot files in `tests/snapshots`
/// - Omits `Expression:` in snapshot headers for cleaner diffs
/// - Names snapshot files after the snapshot alone (no module prefix)
/// - Sorts map keys so JSON snapshots do not depend on serde_json's map ordering
///
/// Bind per test with `insta_settings().bind(|| ...)` so every test thread sees them.
pub fn insta_settings() -> insta::Settings {
    let mut settings = insta::Settings::clone_current();
    settings.set_snapshot_path(tests_dir().join("snapshots"));
    settings.set_prepend_module_to_snapshot(false);
    settings.set_omit_expression(true);
    settings.set_sort_maps(true);
    settings
}

fn tests_dir() -> PathBuf {
    // <repo>/tests/support (manifest dir) → parent() is <repo>/tests
    let support_manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    support_manifest_dir
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or(support_manifest_dir)
}

/// Return the path to the repository's `tests/fixtures` directory.
///
/// Uses the package directory (where `Cargo.toml` lives), so it's stable regardless
/// of the runner's working directory (cargo vs nextest).
pub fn fixtures_dir() -> PathBuf {
    tests_dir().join("fixtures")
}

/// Absolute path of a fixture, as a string for CLI arguments.
pub fn fixture_path<P: AsRef<Path>>(rel_path: P) -> String {
    fixtures_dir().join(rel_path).to_string_lossy().to_string()
}

/// Return the path to the repository's `tests/schemas` directory.
pub fn schemas_dir() -> PathBuf {
    tests_dir().join("schemas")
}

/// Read a UTF-8 text fixture into a string.
pub fn read_fixture_text<P: AsRef<Path>>(rel_path: P) -> String {
    let path = fixtures_dir().join(rel_path);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
}

/// Deserialize a JSON fixture into `T` (enable `serde` feature).
#[cfg(feature = "serde")]
pub fn read_fixture_json<T, P>(rel_path: P) -> T
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = fixtures_dir().join(rel_path);
    let file = std::fs::File::open(&path)
        .unwrap_or_else(|e| panic!("failed to open fixture {}: {e}", path.display()));
    serde_json::from_reader::<_, T>(file)
        .unwrap_or_else(|e| panic!("failed to parse JSON fixture {}: {e}", path.display()))
}

/// Deserialize a JSON schema from `tests/schemas` (enable `serde` feature).
#[cfg(feature = "serde")]
pub fn read_schema(name: &str) -> serde_json::Value {
    let path = schemas_dir().join(name);
    let data = std::fs::read(&path)
        .unwrap_or_else(|e| panic!("failed to read schema {}: {e}", path.display()));
    serde_json::from_slice(&data)
        .unwrap_or_else(|e| panic!("failed to parse schema {}: {e}", path.display()))
}

/// Create a temp directory that deletes on drop.
pub fn tempdir() -> tempfile::TempDir {
    tempfile::tempdir().expect("create tempdir")
}

/// Run a binary target with `assert_cmd`, returning the ready-to-run `Command`.
///
/// Example:
/// ```no_run
/// use test_support::cmd_bin;
///
/// let mut cmd = cmd_bin("ticket-activity-report");
/// cmd.arg("--help").assert().success();
/// ```
pub fn cmd_bin(bin: &str) -> assert_cmd::Command {
    init_tracing();
    assert_cmd::Command::cargo_bin(bin).expect("binary target not found")
}

/// The report binary pinned to the fixed clock, reading `fixture`.
pub fn report_cmd(fixture: &str) -> assert_cmd::Command {
    let mut cmd = cmd_bin(BIN);
    cmd.args(["--input", &fixture_path(fixture), "--now-override", NOW]);
    cmd
}

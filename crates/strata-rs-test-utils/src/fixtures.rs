//! Bundled config fixtures mirroring a small application layout.

use strata_rs_config::StaticResources;

/// Default layer: base values plus an import of the `app` layer.
pub const DEFAULT_YAML: &str = "\
$import: [app]
testing: this
environment: DEV
service.host: localhost
service.url: http://+config~service.host
";

/// Imported by the default layer.
pub const APP_YAML: &str = "\
app: true
workers: \"4\"
";

/// Environment profile selected by `APP_ENV=test`.
pub const TEST_PROFILE_YAML: &str = "\
TestFile: true
environment: TEST
service.host: test.internal
";

/// Resources for the fixture application, in YAML form.
pub fn sample_resources() -> StaticResources {
    StaticResources::new()
        .with("config/default.yaml", DEFAULT_YAML)
        .with("config/app.yaml", APP_YAML)
        .with("config/test.yaml", TEST_PROFILE_YAML)
}

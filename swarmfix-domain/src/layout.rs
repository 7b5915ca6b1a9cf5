use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Named repo-relative paths read and written by the rules.
///
/// Every field can be overridden from the `[paths]` table of `swarmfix.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoLayout {
    /// Directory the project generator runs in.
    pub app_dir: Utf8PathBuf,
    /// Swift sources swept by the reference rewrites (non-recursive).
    pub sources_dir: Utf8PathBuf,
    /// Declarative project description consumed by the generator.
    pub generator_manifest: Utf8PathBuf,
    /// Generated project bundle(s), as a glob relative to the root.
    pub generated_project: Utf8PathBuf,

    pub shared_types: Utf8PathBuf,
    pub shared_types_ext: Utf8PathBuf,
    /// Legacy file that may still carry duplicate type definitions.
    pub legacy_types: Utf8PathBuf,
    /// Where the legacy file is moved. Kept outside `sources_dir` so it is not compiled.
    pub quarantine: Utf8PathBuf,
    pub bands_source: Utf8PathBuf,
    pub panel_source: Utf8PathBuf,
    pub audio_engine: Utf8PathBuf,

    pub plugin_dir: Utf8PathBuf,
    pub build_config: Utf8PathBuf,
    pub build_cache: Utf8PathBuf,

    pub workflow: Utf8PathBuf,
}

impl Default for RepoLayout {
    fn default() -> Self {
        Self {
            app_dir: "app".into(),
            sources_dir: "app/Sources".into(),
            generator_manifest: "app/project.yml".into(),
            generated_project: "app/*.xcodeproj".into(),
            shared_types: "app/Sources/SharedTypes.swift".into(),
            shared_types_ext: "app/Sources/ProcessorParams+Ext.swift".into(),
            legacy_types: "app/Sources/ProcessorParams.swift".into(),
            quarantine: "app/Quarantine/ProcessorParams_DEPRECATED.swift".into(),
            bands_source: "app/Sources/StealMojoSwift.swift".into(),
            panel_source: "app/Sources/StealMojoPanel_SwiftOnly.swift".into(),
            audio_engine: "app/Sources/AudioEngine.swift".into(),
            plugin_dir: "plugin".into(),
            build_config: "plugin/CMakeLists.txt".into(),
            build_cache: "plugin/build".into(),
            workflow: ".github/workflows/build_with_logs.yml".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_overrides_keep_defaults() {
        let layout: RepoLayout = from_json(r#"{"build_cache": "plugin/out"}"#);
        assert_eq!(layout.build_cache, Utf8PathBuf::from("plugin/out"));
        assert_eq!(layout.build_config, Utf8PathBuf::from("plugin/CMakeLists.txt"));
    }

    fn from_json(json: &str) -> RepoLayout {
        serde_json::from_str(json).expect("layout json")
    }
}

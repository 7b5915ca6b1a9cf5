//! Fixed file contents written by the rules.

/// Canonical shared type bundle; the single definition every other source refers to.
pub const SHARED_TYPES: &str = r#"import Foundation
public enum InterpMode: Int, Codable, CaseIterable, Identifiable {
    case liveHB4x = 0, hqSinc8x, transientSpline4x, adaptive, aiAnalogHook
    public var id: Int { rawValue }
}
public struct ProcessorParams: Codable, Equatable {
    public var input: Float = 0.0
    public var output: Float = 0.0
    public var drive: Float = 0.55
    public var character: Float = 0.50
    public var saturation: Float = 0.45
    public var presence: Float = 0.50
    public var mix: Float = 1.00
    public var interpMode: InterpMode = .liveHB4x
    public var mode: Int = 1
}
public struct MojoEQBand: Codable, Equatable { public var lo: Float; public var hi: Float; public var gain_dB: Float }
public struct MojoEQMatch: Codable, Equatable { public var bands: [MojoEQBand] }
"#;

pub const SHARED_TYPES_EXT: &str = r#"import Foundation
extension ProcessorParams {
    public var outputNormalized: Float { (output + 12) / 24 }
}
"#;

/// Button style that stands in for `.borderedProminent` on macOS 11.
pub const PROMINENT_STYLE: &str = r#"struct PMXProminent: ButtonStyle {
    func makeBody(configuration: Configuration) -> some View {
        configuration.label
            .padding(.horizontal, 12).padding(.vertical, 6)
            .background(LinearGradient(colors: [.pink, .purple, .orange],
                                       startPoint: .leading, endPoint: .trailing))
            .foregroundColor(.white)
            .clipShape(Capsule())
            .opacity(configuration.isPressed ? 0.8 : 1.0)
    }
}
"#;

pub const QUARANTINE_MARKER: &str = "// DEPRECATED duplicate removed";

/// Known-good plugin build configuration.
pub const BUILD_CONFIG: &str = r#"cmake_minimum_required(VERSION 3.15 FATAL_ERROR)
project(MoreMojoPlugin VERSION 0.1.0 LANGUAGES C CXX)
set(CMAKE_CXX_STANDARD 17)
set(CMAKE_CXX_STANDARD_REQUIRED ON)
set(CMAKE_OSX_DEPLOYMENT_TARGET "11.0" CACHE STRING "macOS deployment target" FORCE)
find_package(JUCE CONFIG REQUIRED)
set(MOJO_FORMATS "AU;VST3;Standalone" CACHE STRING "Plugin formats to build")
juce_add_plugin(MoreMojoPlugin
    COMPANY_NAME "Umbo Gumbo"
    FORMATS ${MOJO_FORMATS}
    PRODUCT_NAME "More Mojo by Umbo Gumbo"
    COPY_PLUGIN_AFTER_BUILD TRUE
    NEEDS_MIDI_INPUT FALSE
    NEEDS_MIDI_OUTPUT FALSE
    IS_MIDI_EFFECT FALSE
    IS_SYNTH FALSE)
target_sources(MoreMojoPlugin PRIVATE
    Source/PluginProcessor.cpp
    Source/PluginProcessor.h)
target_compile_definitions(MoreMojoPlugin PRIVATE
    JUCE_WEB_BROWSER=0
    JUCE_USE_CURL=0
    JUCE_VST3_CAN_REPLACE_VST2=0)
target_link_libraries(MoreMojoPlugin PRIVATE
    juce::juce_audio_utils
    juce::juce_dsp)
"#;

/// Workflow line the guard steps are inserted after.
pub const CHECKOUT_ANCHOR: &str = "steps:\n      - uses: actions/checkout@v4";

pub const SWIFTC_GUARD_MARKER: &str = "Guard against raw swiftc usage";

pub const SWIFTC_GUARD_STEP: &str = r#"
      - name: Guard against raw swiftc usage
        run: |
          set -euo pipefail
          if [ -f build_part4_swift.sh ]; then echo "❌ remove build_part4_swift.sh"; exit 1; fi
          BAD=$(grep -RIn --exclude-dir=.git --exclude-dir=plugin --include="*.sh" -E '^[[:space:]]*swiftc\b' || true)
          if [ -n "$BAD" ]; then echo "❌ Found swiftc: $BAD"; exit 1; fi"#;

pub const CMAKE_GUARD_MARKER: &str = "Guard CMake for forbidden commands";

pub const CMAKE_GUARD_STEP: &str = r#"
      - name: Guard CMake for forbidden commands
        run: |
          set -euo pipefail
          if grep -RIn '\$<TARGET_BUNDLE_DIR:MoreMojoPlugin>' plugin/CMakeLists.txt; then echo "❌ forbidden generator expression"; exit 1; fi"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_steps_carry_their_markers() {
        assert!(SWIFTC_GUARD_STEP.contains(SWIFTC_GUARD_MARKER));
        assert!(CMAKE_GUARD_STEP.contains(CMAKE_GUARD_MARKER));
    }

    #[test]
    fn build_config_avoids_bundle_dir_expression() {
        assert!(!BUILD_CONFIG.contains("TARGET_BUNDLE_DIR"));
    }

    #[test]
    fn shared_types_defines_the_duplicated_types() {
        assert!(SHARED_TYPES.contains("public struct ProcessorParams"));
        assert!(SHARED_TYPES.contains("public enum InterpMode"));
    }
}

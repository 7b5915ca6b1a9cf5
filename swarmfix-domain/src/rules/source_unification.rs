use super::templates::{PROMINENT_STYLE, QUARANTINE_MARKER, SHARED_TYPES, SHARED_TYPES_EXT};
use super::{Rule, RuleContext};
use crate::layout::RepoLayout;
use crate::triggers::TriggerSet;
use camino::Utf8PathBuf;
use regex::Regex;
use std::sync::LazyLock;
use swarmfix_edit::Workspace;
use swarmfix_types::Domain;
use swarmfix_types::decision::PatchResult;
use tracing::debug;

static LEGACY_DUPLICATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(struct|enum)\s+(ProcessorParams|InterpMode)\b")
        .expect("valid legacy duplicate regex")
});

static NESTED_INTERP_MODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"ProcessorParams\.InterpMode").expect("valid nested reference regex")
});
static APP_MEMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.app\b").expect("valid member regex"));
static STEAL_MEMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.steal\b").expect("valid member regex"));

static BANDS_DECLARATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:var|let)\s+bands\b").expect("valid bands regex"));

static AUDIO_ENGINE_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"((?:final\s+)?class\s+AudioEngine\b)(\s*:[^{]*)?\s*\{")
        .expect("valid class declaration regex")
});

static IMPORT_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^import [^\n]*$").expect("valid import regex"));

const BANDS_SHORTHAND: &str = "bands.append(.init(";
const BANDS_EXPLICIT: &str = "bands.append(MojoEQBand(";
const BANDS_DECL_LINE: &str = "var bands: [MojoEQBand] = []";

const PROMINENT_DEPRECATED: &str = ".buttonStyle(.borderedProminent)";
const PROMINENT_CUSTOM: &str = ".buttonStyle(PMXProminent())";
const PROMINENT_STYLE_DECL: &str = "struct PMXProminent";
const STYLE_ANCHOR_IMPORT: &str = "import AVFoundation";

/// Restores a single definition of the shared app types and repairs the sources that
/// drifted away from it.
pub struct SourceUnificationRule {
    triggers: TriggerSet,
}

impl SourceUnificationRule {
    pub const NAME: &'static str = "source-unification";

    pub fn new() -> Self {
        Self {
            triggers: TriggerSet::contains(&[
                "cannot find type 'ProcessorParams' in scope",
                "type 'MojoMacroMode' has no member 'app'",
                "buttonStyle(.borderedProminent)",
                "cannot infer contextual base in reference to member 'init'",
                "could not build Objective-C module 'CoreData'",
                "'Foundation/Foundation.h' file not found",
            ]),
        }
    }
}

impl Rule for SourceUnificationRule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn domain(&self) -> Domain {
        Domain::App
    }

    fn title(&self) -> &'static str {
        "Unify shared Swift types and repair drifted references"
    }

    fn description(&self) -> &'static str {
        "Rewrites the canonical shared-types file, quarantines a legacy duplicate definition, \
         ensures the extension file, collapses nested type references and renamed members \
         across the sources, spells out the band element type, swaps the deprecated button \
         style for a custom one and makes the audio engine observable."
    }

    fn triggers(&self) -> &TriggerSet {
        &self.triggers
    }

    fn owns(&self, layout: &RepoLayout) -> Vec<Utf8PathBuf> {
        vec![
            layout.sources_dir.clone(),
            layout.shared_types.clone(),
            layout.shared_types_ext.clone(),
            layout.legacy_types.clone(),
            layout.quarantine.clone(),
            layout.bands_source.clone(),
            layout.panel_source.clone(),
            layout.audio_engine.clone(),
        ]
    }

    fn run(&self, ctx: &RuleContext<'_>, ws: &mut Workspace) -> anyhow::Result<PatchResult> {
        let layout = ctx.layout;
        let mut result = PatchResult::UNCHANGED;

        result |= ws.write_if_changed(&layout.shared_types, SHARED_TYPES)?;

        if let Some(legacy) = ws.read_to_string(&layout.legacy_types)?
            && LEGACY_DUPLICATE.is_match(&legacy)
        {
            debug!(path = %layout.legacy_types, "legacy file redefines shared types");
            result |= ws.quarantine(&layout.legacy_types, &layout.quarantine, QUARANTINE_MARKER)?;
        }

        result |= ws.write_if_changed(&layout.shared_types_ext, SHARED_TYPES_EXT)?;

        for file in ws.list_files(&layout.sources_dir, "swift")? {
            result |= ws.rewrite(&file, |text| Some(collapse_references(text)))?;
        }

        result |= ws.rewrite(&layout.bands_source, spell_out_band_type)?;
        result |= ws.rewrite(&layout.panel_source, replace_prominent_style)?;
        result |= ws.rewrite(&layout.audio_engine, adopt_observable_object)?;

        Ok(result)
    }
}

/// Collapse `ProcessorParams.InterpMode` and apply the `.app`/`.steal` member renames.
pub(crate) fn collapse_references(text: &str) -> String {
    let text = NESTED_INTERP_MODE.replace_all(text, "InterpMode");
    let text = APP_MEMBER.replace_all(&text, ".appDecides");
    let text = STEAL_MEMBER.replace_all(&text, ".stealMacro");
    text.into_owned()
}

/// Replace the inferred `.init(` band shorthand with an explicit element type, declaring
/// the array before its first use when no declaration exists.
pub(crate) fn spell_out_band_type(text: &str) -> Option<String> {
    if !text.contains(BANDS_SHORTHAND) {
        return None;
    }
    let mut out = text.replace(BANDS_SHORTHAND, BANDS_EXPLICIT);
    if !BANDS_DECLARATION.is_match(&out)
        && let Some(first) = out.find(BANDS_EXPLICIT)
    {
        let line_start = out[..first].rfind('\n').map_or(0, |i| i + 1);
        let indent: String = out[line_start..first]
            .chars()
            .take_while(|c| c.is_whitespace())
            .collect();
        out.insert_str(line_start, &format!("{indent}{BANDS_DECL_LINE}\n"));
    }
    Some(out)
}

/// Swap the deprecated prominent button style for `PMXProminent`, defining it once after
/// the AVFoundation import.
pub(crate) fn replace_prominent_style(text: &str) -> Option<String> {
    if !text.contains(PROMINENT_DEPRECATED) {
        return None;
    }
    let mut out = text.replace(PROMINENT_DEPRECATED, PROMINENT_CUSTOM);
    if out.contains(PROMINENT_STYLE_DECL) {
        return Some(out);
    }

    let anchor = IMPORT_LINE
        .find_iter(&out)
        .find(|m| m.as_str().trim_end() == STYLE_ANCHOR_IMPORT)
        .or_else(|| IMPORT_LINE.find(&out))
        .map(|m| m.end());
    match anchor {
        Some(at) => out.insert_str(at, &format!("\n\n{}", PROMINENT_STYLE.trim_end())),
        None => out.insert_str(0, &format!("{PROMINENT_STYLE}\n")),
    }
    Some(out)
}

/// Add `ObservableObject` conformance to the `AudioEngine` class declaration.
pub(crate) fn adopt_observable_object(text: &str) -> Option<String> {
    if text.contains("ObservableObject") {
        return None;
    }
    let caps = AUDIO_ENGINE_DECL.captures(text)?;
    let whole = caps.get(0)?;
    let head = &caps[1];
    let declaration = match caps.get(2) {
        Some(inherits) => format!("{head}{}, ObservableObject {{", inherits.as_str().trim_end()),
        None => format!("{head}: ObservableObject {{"),
    };

    let mut out = String::with_capacity(text.len() + declaration.len());
    out.push_str(&text[..whole.start()]);
    out.push_str(&declaration);
    out.push_str(&text[whole.end()..]);
    Some(out)
}

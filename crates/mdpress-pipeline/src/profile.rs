//! Style and device profiles.
//!
//! A profile is a fixed, named bundle of layout parameters: base font size,
//! font scale, default page margins, target device resolution, the largest
//! diagram the page accepts, and the output kinds it can produce. The table
//! is closed; unknown names are a configuration error reported before any
//! document is processed.

use mdpress_assemble::SizingPolicy;
use mdpress_state::OutputKind;

/// A named layout profile.
#[derive(Debug)]
pub struct Profile {
    pub name: &'static str,
    pub display_name: &'static str,
    /// Base body font size in CSS pixels.
    pub base_font_size_px: f32,
    /// Multiplier applied on top of the base size.
    pub font_scale: f32,
    /// Default page margins, overridable per run.
    pub margins: &'static str,
    /// Target device resolution (width, height) in pixels.
    pub target_resolution: (u32, u32),
    /// Widest diagram image the page accepts, in pixels.
    pub diagram_max_width: u32,
    /// Tallest diagram image the page accepts, in pixels.
    pub diagram_max_height: u32,
    /// Output kinds this profile can produce.
    pub output_kinds: &'static [OutputKind],
    /// Drop hand-written "Table of contents" sections during assembly; set
    /// for profiles whose converter emits its own table of contents.
    pub strip_toc_sections: bool,
}

/// All known profiles. Paged (A4) profiles produce PDF; reflowable (Kindle)
/// profiles produce EPUB and MOBI.
pub const PROFILES: &[Profile] = &[
    Profile {
        name: "a4-print",
        display_name: "A4 Print",
        base_font_size_px: 12.0,
        font_scale: 1.0,
        margins: "1in 0.75in",
        target_resolution: (1654, 2339),
        diagram_max_width: 1680,
        diagram_max_height: 2240,
        output_kinds: &[OutputKind::Pdf],
        strip_toc_sections: true,
    },
    Profile {
        name: "a4-screen",
        display_name: "A4 Screen",
        base_font_size_px: 15.6,
        font_scale: 1.3,
        margins: "1in 0.75in",
        target_resolution: (1654, 2339),
        diagram_max_width: 1680,
        diagram_max_height: 2240,
        output_kinds: &[OutputKind::Pdf],
        strip_toc_sections: true,
    },
    Profile {
        name: "kindle-basic",
        display_name: "Kindle Basic",
        base_font_size_px: 12.0,
        font_scale: 1.0,
        margins: "0.3in",
        target_resolution: (600, 800),
        diagram_max_width: 1680,
        diagram_max_height: 2240,
        output_kinds: &[OutputKind::Epub, OutputKind::Mobi],
        strip_toc_sections: false,
    },
    Profile {
        name: "kindle-large",
        display_name: "Kindle Large Text",
        base_font_size_px: 14.0,
        font_scale: 1.2,
        margins: "0.3in",
        target_resolution: (1072, 1448),
        diagram_max_width: 1680,
        diagram_max_height: 2240,
        output_kinds: &[OutputKind::Epub, OutputKind::Mobi],
        strip_toc_sections: false,
    },
    Profile {
        name: "kindle-paperwhite-11",
        display_name: "Kindle Paperwhite 11th Gen",
        base_font_size_px: 13.0,
        font_scale: 1.1,
        margins: "0.3in",
        target_resolution: (1236, 1648),
        diagram_max_width: 1680,
        diagram_max_height: 2240,
        output_kinds: &[OutputKind::Epub, OutputKind::Mobi],
        strip_toc_sections: false,
    },
];

/// Global configuration error, raised before any document is processed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("unknown profile '{name}'; available: {available}")]
    UnknownProfile { name: String, available: String },
    #[error("profile '{profile}' does not produce {kind}; supported: {supported}")]
    UnsupportedOutput {
        profile: &'static str,
        kind: OutputKind,
        supported: String,
    },
}

impl Profile {
    /// Look up a profile by name.
    pub fn find(name: &str) -> Result<&'static Profile, ConfigurationError> {
        PROFILES.iter().find(|p| p.name == name).ok_or_else(|| {
            ConfigurationError::UnknownProfile {
                name: name.to_owned(),
                available: PROFILES
                    .iter()
                    .map(|p| p.name)
                    .collect::<Vec<_>>()
                    .join(", "),
            }
        })
    }

    #[must_use]
    pub fn supports(&self, kind: OutputKind) -> bool {
        self.output_kinds.contains(&kind)
    }

    /// Reject a profile/output pairing the profile cannot produce.
    pub fn require_support(&'static self, kind: OutputKind) -> Result<(), ConfigurationError> {
        if self.supports(kind) {
            return Ok(());
        }
        Err(ConfigurationError::UnsupportedOutput {
            profile: self.name,
            kind,
            supported: self
                .output_kinds
                .iter()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        })
    }

    /// Diagram sizing policy for this profile, with an optional per-run width
    /// override taking precedence over the profile cap.
    #[must_use]
    pub fn sizing_policy(&self, width: Option<mdpress_assemble::Dimension>) -> SizingPolicy {
        SizingPolicy {
            width,
            max_width: self.diagram_max_width,
            max_height: self.diagram_max_height,
        }
    }

    /// Effective body font size after scaling, in CSS pixels.
    #[must_use]
    pub fn effective_font_size_px(&self) -> f32 {
        self.base_font_size_px * self.font_scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_every_profile_found_by_name() {
        for profile in PROFILES {
            assert_eq!(Profile::find(profile.name).unwrap().name, profile.name);
        }
    }

    #[test]
    fn test_unknown_profile_lists_available() {
        let err = Profile::find("letter-print").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("letter-print"));
        assert!(msg.contains("a4-print"));
        assert!(msg.contains("kindle-paperwhite-11"));
    }

    #[test]
    fn test_paged_profiles_reject_reflowable_kinds() {
        let a4 = Profile::find("a4-print").unwrap();
        assert!(a4.require_support(OutputKind::Pdf).is_ok());
        assert!(a4.require_support(OutputKind::Epub).is_err());
        assert!(a4.require_support(OutputKind::Mobi).is_err());

        let kindle = Profile::find("kindle-basic").unwrap();
        assert!(kindle.require_support(OutputKind::Pdf).is_err());
        assert!(kindle.require_support(OutputKind::Mobi).is_ok());
    }

    #[test]
    fn test_only_paged_profiles_strip_toc_sections() {
        for profile in PROFILES {
            assert_eq!(profile.strip_toc_sections, profile.supports(OutputKind::Pdf));
        }
    }

    #[test]
    fn test_sizing_policy_carries_profile_caps() {
        let profile = Profile::find("a4-print").unwrap();
        let policy = profile.sizing_policy(None);
        assert_eq!(policy.max_width, 1680);
        assert_eq!(policy.max_height, 2240);
        assert_eq!(policy.width, None);
    }
}

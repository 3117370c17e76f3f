//! Image dimension values and the diagram sizing policy.

use mdpress_diagrams::BlockModifier;

/// A display dimension: absolute pixels or a percentage of the page width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Pixels(u32),
    Percent(u32),
}

/// Error parsing a dimension value.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum DimensionError {
    #[error("percentage cannot exceed 100% (got {0}%)")]
    PercentTooLarge(u32),
    #[error("invalid dimension value '{0}' (use pixels like '1680' or a percentage like '80%')")]
    Invalid(String),
}

impl Dimension {
    /// Parse `"1680"` (pixels) or `"80%"` (percentage, capped at 100).
    pub fn parse(s: &str) -> Result<Self, DimensionError> {
        let s = s.trim();
        if let Some(pct) = s.strip_suffix('%') {
            let value: u32 = pct
                .trim()
                .parse()
                .map_err(|_| DimensionError::Invalid(s.to_owned()))?;
            if value > 100 {
                return Err(DimensionError::PercentTooLarge(value));
            }
            return Ok(Self::Percent(value));
        }
        s.parse()
            .map(Self::Pixels)
            .map_err(|_| DimensionError::Invalid(s.to_owned()))
    }

    fn attr_value(self) -> String {
        match self {
            Self::Pixels(px) => format!("{px}px"),
            Self::Percent(pct) => format!("{pct}%"),
        }
    }
}

/// Sizing applied to substituted diagram images.
#[derive(Debug, Clone, Default)]
pub struct SizingPolicy {
    /// Explicit per-run width override.
    pub width: Option<Dimension>,
    /// Format default: widest image the target page accepts, in pixels.
    /// Zero disables the cap.
    pub max_width: u32,
    /// Format default: tallest image the target page accepts, in pixels.
    /// Zero disables the cap.
    pub max_height: u32,
}

/// Build the markdown image reference for a rendered diagram.
///
/// Precedence: block `no-resize` modifier > block scale modifiers > explicit
/// per-run width > format default cap against the actual image dimensions.
#[must_use]
pub fn image_reference(
    image_path: &str,
    modifier: Option<BlockModifier>,
    policy: &SizingPolicy,
    actual: Option<(u32, u32)>,
) -> String {
    let plain = format!("![]({image_path})");

    match modifier {
        Some(BlockModifier::NoResize) => return plain,
        Some(BlockModifier::Upscale(pct)) => {
            return format!("{plain}{{width={pct}%}}");
        }
        // Downscale targets must stay below the rendered size; anything else
        // is ignored and the block falls through to the default sizing.
        Some(BlockModifier::Downscale(pct)) => {
            if (1..=99).contains(&pct) {
                return format!("{plain}{{width={pct}%}}");
            }
            tracing::warn!(percent = pct, "downscale percentage must be 1-99%, ignoring modifier");
        }
        None => {}
    }

    if let Some(width) = policy.width {
        return format!("{plain}{{width={}}}", width.attr_value());
    }

    // Format default: cap oversized images, preserving aspect ratio.
    if let Some((width, height)) = actual {
        let too_wide = policy.max_width > 0 && width > policy.max_width;
        let too_tall = policy.max_height > 0 && height > policy.max_height;
        if too_wide || too_tall {
            let mut display = if too_wide { policy.max_width } else { width };
            if too_tall {
                let fitted = (u64::from(width) * u64::from(policy.max_height)
                    / u64::from(height.max(1))) as u32;
                display = display.min(fitted);
            }
            return format!("{plain}{{width={display}px}}");
        }
    }

    plain
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_pixels() {
        assert_eq!(Dimension::parse("1680"), Ok(Dimension::Pixels(1680)));
        assert_eq!(Dimension::parse(" 800 "), Ok(Dimension::Pixels(800)));
    }

    #[test]
    fn test_parse_percent() {
        assert_eq!(Dimension::parse("80%"), Ok(Dimension::Percent(80)));
        assert_eq!(Dimension::parse("100%"), Ok(Dimension::Percent(100)));
    }

    #[test]
    fn test_parse_rejects_oversized_percent() {
        assert_eq!(Dimension::parse("120%"), Err(DimensionError::PercentTooLarge(120)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(Dimension::parse("wide"), Err(DimensionError::Invalid(_))));
        assert!(matches!(Dimension::parse(""), Err(DimensionError::Invalid(_))));
        assert!(matches!(Dimension::parse("-5"), Err(DimensionError::Invalid(_))));
    }

    #[test]
    fn test_no_resize_wins_over_everything() {
        let policy = SizingPolicy {
            width: Some(Dimension::Percent(50)),
            max_width: 100,
            max_height: 100,
        };
        let actual = Some((5000, 5000));
        assert_eq!(
            image_reference("d.png", Some(BlockModifier::NoResize), &policy, actual),
            "![](d.png)"
        );
    }

    #[test]
    fn test_scale_modifiers_target_percent_of_rendered_size() {
        let policy = SizingPolicy::default();
        assert_eq!(
            image_reference("d.png", Some(BlockModifier::Upscale(150)), &policy, None),
            "![](d.png){width=150%}"
        );
        assert_eq!(
            image_reference("d.png", Some(BlockModifier::Downscale(67)), &policy, None),
            "![](d.png){width=67%}"
        );
    }

    #[test]
    fn test_out_of_range_downscale_ignored() {
        let policy = SizingPolicy {
            width: None,
            max_width: 1680,
            max_height: 2240,
        };
        // Invalid targets fall through to the default cap.
        assert_eq!(
            image_reference("d.png", Some(BlockModifier::Downscale(0)), &policy, Some((2000, 1000))),
            "![](d.png){width=1680px}"
        );
        assert_eq!(
            image_reference("d.png", Some(BlockModifier::Downscale(100)), &policy, Some((640, 480))),
            "![](d.png)"
        );
    }

    #[test]
    fn test_huge_upscale_passes_through() {
        let policy = SizingPolicy::default();
        assert_eq!(
            image_reference("d.png", Some(BlockModifier::Upscale(4_294_967_290)), &policy, None),
            "![](d.png){width=4294967290%}"
        );
    }

    #[test]
    fn test_explicit_width_beats_default_cap() {
        let policy = SizingPolicy {
            width: Some(Dimension::Percent(80)),
            max_width: 100,
            max_height: 100,
        };
        assert_eq!(
            image_reference("d.png", None, &policy, Some((5000, 5000))),
            "![](d.png){width=80%}"
        );
    }

    #[test]
    fn test_default_cap_applies_to_oversized() {
        let policy = SizingPolicy {
            width: None,
            max_width: 1680,
            max_height: 2240,
        };
        assert_eq!(
            image_reference("d.png", None, &policy, Some((2000, 1000))),
            "![](d.png){width=1680px}"
        );
    }

    #[test]
    fn test_default_cap_respects_height() {
        let policy = SizingPolicy {
            width: None,
            max_width: 1680,
            max_height: 1000,
        };
        // 800x2000 must shrink to 400 wide so height fits 1000
        assert_eq!(
            image_reference("d.png", None, &policy, Some((800, 2000))),
            "![](d.png){width=400px}"
        );
    }

    #[test]
    fn test_small_image_untouched() {
        let policy = SizingPolicy {
            width: None,
            max_width: 1680,
            max_height: 2240,
        };
        assert_eq!(image_reference("d.png", None, &policy, Some((640, 480))), "![](d.png)");
    }

    #[test]
    fn test_unknown_dimensions_untouched() {
        let policy = SizingPolicy {
            width: None,
            max_width: 100,
            max_height: 100,
        };
        assert_eq!(image_reference("d.png", None, &policy, None), "![](d.png)");
    }
}

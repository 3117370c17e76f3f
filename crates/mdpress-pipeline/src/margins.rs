//! Page margin parsing and validation.
//!
//! Margins come in as a CSS-like shorthand string: one value applies to all
//! four sides, two values pair top/bottom with right/left, four values go
//! top, right, bottom, left. Units are `in`, `cm`, `mm`, `pt`, `px`; a bare
//! number means inches. Each side must fall between 0 and 3 inches.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

static LENGTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)?)\s*(in|cm|mm|pt|px)?$").unwrap());

/// Largest margin accepted per side, in inches.
const MAX_INCHES: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Unit {
    In,
    Cm,
    Mm,
    Pt,
    Px,
}

impl Unit {
    fn as_str(self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Cm => "cm",
            Self::Mm => "mm",
            Self::Pt => "pt",
            Self::Px => "px",
        }
    }

    /// Inches per one unit.
    fn to_inches(self) -> f64 {
        match self {
            Self::In => 1.0,
            Self::Cm => 1.0 / 2.54,
            Self::Mm => 1.0 / 25.4,
            Self::Pt => 1.0 / 72.0,
            Self::Px => 1.0 / 96.0,
        }
    }
}

/// One margin value with its unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length {
    pub value: f64,
    pub unit: Unit,
}

impl Length {
    #[must_use]
    pub fn inches(&self) -> f64 {
        self.value * self.unit.to_inches()
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.as_str())
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MarginError {
    #[error("invalid margin value '{0}'; use forms like '1in', '2.5cm', '10mm'")]
    Format(String),
    #[error("margin '{0}' outside the 0-3 inch range")]
    OutOfRange(String),
    #[error("expected 1, 2, or 4 margin values, got {0}")]
    Count(usize),
}

/// Validated page margins, one length per side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: Length,
    pub right: Length,
    pub bottom: Length,
    pub left: Length,
}

fn parse_length(raw: &str) -> Result<Length, MarginError> {
    let caps = LENGTH_RE
        .captures(raw.trim())
        .ok_or_else(|| MarginError::Format(raw.to_owned()))?;
    let value: f64 = caps[1]
        .parse()
        .map_err(|_| MarginError::Format(raw.to_owned()))?;
    let unit = match caps.get(2).map(|m| m.as_str()) {
        Some("cm") => Unit::Cm,
        Some("mm") => Unit::Mm,
        Some("pt") => Unit::Pt,
        Some("px") => Unit::Px,
        _ => Unit::In,
    };

    let length = Length { value, unit };
    if length.inches() > MAX_INCHES {
        return Err(MarginError::OutOfRange(raw.trim().to_owned()));
    }
    Ok(length)
}

impl FromStr for Margins {
    type Err = MarginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<Length> = s
            .split_whitespace()
            .map(parse_length)
            .collect::<Result<_, _>>()?;

        match parts.as_slice() {
            [all] => Ok(Self {
                top: *all,
                right: *all,
                bottom: *all,
                left: *all,
            }),
            [vertical, horizontal] => Ok(Self {
                top: *vertical,
                right: *horizontal,
                bottom: *vertical,
                left: *horizontal,
            }),
            [top, right, bottom, left] => Ok(Self {
                top: *top,
                right: *right,
                bottom: *bottom,
                left: *left,
            }),
            other => Err(MarginError::Count(other.len())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_value_applies_to_all_sides() {
        let margins: Margins = "1in".parse().unwrap();
        assert_eq!(margins.top, margins.bottom);
        assert_eq!(margins.right, margins.left);
        assert_eq!(margins.top.to_string(), "1in");
    }

    #[test]
    fn test_two_values_pair_sides() {
        let margins: Margins = "1in 0.75in".parse().unwrap();
        assert_eq!(margins.top.to_string(), "1in");
        assert_eq!(margins.bottom.to_string(), "1in");
        assert_eq!(margins.right.to_string(), "0.75in");
        assert_eq!(margins.left.to_string(), "0.75in");
    }

    #[test]
    fn test_four_values_go_clockwise() {
        let margins: Margins = "1in 2cm 10mm 36pt".parse().unwrap();
        assert_eq!(margins.top.to_string(), "1in");
        assert_eq!(margins.right.to_string(), "2cm");
        assert_eq!(margins.bottom.to_string(), "10mm");
        assert_eq!(margins.left.to_string(), "36pt");
    }

    #[test]
    fn test_bare_number_means_inches() {
        let margins: Margins = "0.5".parse().unwrap();
        assert_eq!(margins.top.unit, Unit::In);
        assert!((margins.top.inches() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_unit_conversions() {
        assert!((parse_length("2.54cm").unwrap().inches() - 1.0).abs() < 1e-9);
        assert!((parse_length("25.4mm").unwrap().inches() - 1.0).abs() < 1e-9);
        assert!((parse_length("72pt").unwrap().inches() - 1.0).abs() < 1e-9);
        assert!((parse_length("96px").unwrap().inches() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_over_three_inches_rejected() {
        assert_eq!(
            "4in".parse::<Margins>(),
            Err(MarginError::OutOfRange("4in".to_owned()))
        );
        // 10cm is ~3.94in
        assert!(matches!(
            "10cm".parse::<Margins>(),
            Err(MarginError::OutOfRange(_))
        ));
        // 7.5cm is ~2.95in
        assert!("7.5cm".parse::<Margins>().is_ok());
    }

    #[test]
    fn test_negative_and_garbage_rejected() {
        assert!(matches!(
            "-1in".parse::<Margins>(),
            Err(MarginError::Format(_))
        ));
        assert!(matches!(
            "wide".parse::<Margins>(),
            Err(MarginError::Format(_))
        ));
        assert!(matches!(
            "1in 1em".parse::<Margins>(),
            Err(MarginError::Format(_))
        ));
    }

    #[test]
    fn test_three_values_rejected() {
        assert_eq!(
            "1in 1in 1in".parse::<Margins>(),
            Err(MarginError::Count(3))
        );
        assert_eq!("".parse::<Margins>(), Err(MarginError::Count(0)));
    }
}

use crate::error::SizeError;
use crate::units::{self, UnitFamily};

/// Base unit of a rendered size: bytes, or word-length bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseUnit {
    Bytes,
    Bits,
}

/// How a format spec selects the displayed denomination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleMode {
    /// `a`: largest fitting denomination across metric and IEC.
    AutoFull,
    /// `A`: legacy abbreviated family; the byte letter is omitted.
    AutoLegacy,
    /// `m`: metric denominations only.
    AutoMetric,
    /// `I`: IEC denominations only.
    AutoIec,
    /// An explicit unit token such as `GiB` or `kB`.
    Fixed {
        prefix: &'static str,
        multiplier: u128,
    },
}

/// A parsed format spec: `[fill][width][.precision][mode][b|B]`.
///
/// The width is the total rendered width including the unit suffix, so
/// columns of mixed-unit sizes line up.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatSpec {
    pub mode: ScaleMode,
    pub base: BaseUnit,
    pub fill: Option<char>,
    pub width: Option<usize>,
    pub precision: Option<usize>,
}

impl Default for FormatSpec {
    fn default() -> Self {
        Self {
            mode: ScaleMode::AutoFull,
            base: BaseUnit::Bytes,
            fill: None,
            width: None,
            precision: None,
        }
    }
}

impl FormatSpec {
    /// Parse a format spec, trailing-to-leading: base-unit letter, then
    /// auto-mode letter or fixed unit token, then fill/width/precision.
    pub fn parse(spec: &str) -> Result<Self, SizeError> {
        let mut rest = spec;

        let mut explicit_base = true;
        let base = if let Some(stripped) = rest.strip_suffix('b') {
            rest = stripped;
            BaseUnit::Bits
        } else if let Some(stripped) = rest.strip_suffix('B') {
            rest = stripped;
            BaseUnit::Bytes
        } else {
            explicit_base = false;
            BaseUnit::Bytes
        };

        let mode = if rest.is_empty() && !explicit_base {
            // the empty spec autoformats
            ScaleMode::AutoFull
        } else if let Some(stripped) = rest.strip_suffix('a') {
            rest = stripped;
            ScaleMode::AutoFull
        } else if let Some(stripped) = rest.strip_suffix('A') {
            rest = stripped;
            ScaleMode::AutoLegacy
        } else if let Some(stripped) = rest.strip_suffix('m') {
            // mode letters win over unit tokens, so `m` is metric-auto,
            // never the legacy mebi alias
            rest = stripped;
            ScaleMode::AutoMetric
        } else if let Some(stripped) = rest.strip_suffix('I') {
            rest = stripped;
            ScaleMode::AutoIec
        } else {
            match units::tokens_by_length_desc()
                .iter()
                .find(|(token, _)| rest.ends_with(token))
            {
                Some(&(token, multiplier)) => {
                    rest = &rest[..rest.len() - token.len()];
                    ScaleMode::Fixed {
                        prefix: token,
                        multiplier,
                    }
                }
                // a bare base unit, or padding only: plain bytes
                None => ScaleMode::Fixed {
                    prefix: "",
                    multiplier: 1,
                },
            }
        };

        let (fill, width, precision) = parse_padding(rest, spec)?;

        Ok(Self {
            mode,
            base,
            fill,
            width,
            precision,
        })
    }
}

// `[fill][width][.precision]` where an all-digit run is a width, a leading
// `0` before further digits means zero-fill, and any other leading
// non-digit is the fill character.
fn parse_padding(
    rest: &str,
    spec: &str,
) -> Result<(Option<char>, Option<usize>, Option<usize>), SizeError> {
    let bad = |reason: &str| SizeError::InvalidFormatSpec {
        spec: spec.to_string(),
        reason: reason.to_string(),
    };

    if rest.is_empty() {
        return Ok((None, None, None));
    }

    let (pad_part, precision) = match rest.split_once('.') {
        Some((pad_part, prec_part)) => {
            if prec_part.is_empty() || !prec_part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(bad("precision must be a run of digits"));
            }
            let precision = prec_part
                .parse()
                .map_err(|_| bad("precision out of range"))?;
            (pad_part, Some(precision))
        }
        None => (rest, None),
    };

    if pad_part.is_empty() {
        return Ok((None, None, precision));
    }

    let (fill, width_part) = if pad_part.bytes().all(|b| b.is_ascii_digit()) {
        if pad_part.len() > 1 && pad_part.starts_with('0') {
            (Some('0'), &pad_part[1..])
        } else {
            (None, pad_part)
        }
    } else {
        let fill = pad_part.chars().next().ok_or_else(|| bad("bad padding"))?;
        let width_part = &pad_part[fill.len_utf8()..];
        if width_part.is_empty() || !width_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad("padding must be a fill character and a width"));
        }
        (Some(fill), width_part)
    };

    let width = width_part.parse().map_err(|_| bad("width out of range"))?;
    Ok((fill, Some(width), precision))
}

/// Render a byte count under an already-parsed spec.
pub fn render(bytes: u128, word_length: u32, spec: &FormatSpec) -> String {
    let quantity = match spec.base {
        BaseUnit::Bits => bytes.saturating_mul(u128::from(word_length.max(1))) as f64,
        BaseUnit::Bytes => bytes as f64,
    };

    // Fixed denominations are taken as given; auto modes scan their family
    // for the largest denomination still >= 1, falling back to plain
    // bytes/bits. Auto suffixes are right-padded to the family's widest
    // suffix so columns align.
    let (denomination, prefix, suffix_pad) = match spec.mode {
        ScaleMode::Fixed { prefix, multiplier } => (multiplier, prefix, 0),
        ScaleMode::AutoFull => auto_select(quantity, units::full_scan_table(), 3),
        ScaleMode::AutoLegacy => auto_select(quantity, units::scan_table(UnitFamily::Legacy), 2),
        ScaleMode::AutoMetric => auto_select(quantity, units::scan_table(UnitFamily::Metric), 2),
        ScaleMode::AutoIec => auto_select(quantity, units::scan_table(UnitFamily::Iec), 3),
    };

    let base_letter = match (spec.mode, spec.base) {
        (ScaleMode::AutoLegacy, BaseUnit::Bytes) => "",
        (_, BaseUnit::Bytes) => "B",
        (_, BaseUnit::Bits) => "b",
    };

    let value = quantity / denomination as f64;

    // Whole multiples of the unit render without a decimal point no matter
    // the requested precision.
    let number = if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.*}", spec.precision.unwrap_or(0), value)
    };

    let suffix = format!("{}{}", prefix, base_letter);
    let suffix_pad = suffix_pad.max(suffix.len());
    let suffix = format!("{:<pad$}", suffix, pad = suffix_pad);

    let number = match spec.width {
        Some(width) => {
            let number_width = width.saturating_sub(suffix.len());
            if number.len() >= number_width {
                number
            } else {
                let fill = spec.fill.unwrap_or(' ');
                let mut padded = fill.to_string().repeat(number_width - number.len());
                padded.push_str(&number);
                padded
            }
        }
        None => number,
    };

    format!("{}{}", number, suffix)
}

/// Parse `spec` and render `bytes` under it.
pub fn format(bytes: u128, spec: &str, word_length: u32) -> Result<String, SizeError> {
    let spec = FormatSpec::parse(spec)?;
    Ok(render(bytes, word_length, &spec))
}

fn auto_select(
    quantity: f64,
    table: &[(u128, &'static str)],
    suffix_pad: usize,
) -> (u128, &'static str, usize) {
    table
        .iter()
        .find(|(multiplier, _)| quantity / *multiplier as f64 >= 1.0)
        .map(|&(multiplier, token)| (multiplier, token, suffix_pad))
        .unwrap_or((1, "", suffix_pad))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(bytes: u128, spec: &str) -> String {
        format(bytes, spec, 8).unwrap()
    }

    #[test]
    fn empty_spec_defaults_to_auto() {
        assert_eq!(FormatSpec::parse("").unwrap(), FormatSpec::default());
        assert_eq!(fmt(1024, ""), "1KiB");
        assert_eq!(fmt(2048, ""), "2KiB");
    }

    #[test]
    fn auto_full_prefers_the_largest_fitting_denomination() {
        assert_eq!(fmt(999, "a"), "999B  ");
        assert_eq!(fmt(1000, "a"), "1KB ");
        assert_eq!(fmt(1024, "a"), "1KiB");
        assert_eq!(fmt(1_000_000, "a"), "1MB ");
        assert_eq!(fmt(1_048_576, "a"), "1MiB");
    }

    #[test]
    fn auto_iec_and_metric_stay_in_family() {
        assert_eq!(fmt(1023, "I"), "1023B  ");
        assert_eq!(fmt(1024, "I"), "1KiB");
        assert_eq!(fmt(1500, ".1m"), "1.5KB");
        assert_eq!(fmt(999, "m"), "999B ");
    }

    #[test]
    fn auto_legacy_omits_the_byte_letter() {
        assert_eq!(fmt(5 * 1024 * 1024, "A"), "5M ");
        assert_eq!(fmt(1024, "A"), "1K ");
        assert_eq!(fmt(512, "A"), "512  ");
        // an explicit bit base survives
        assert_eq!(fmt(1024, "Ab"), "8Kb");
    }

    #[test]
    fn fixed_denominations_divide_directly() {
        assert_eq!(fmt(750_000_000_000, ".2GiB"), "698.49GiB");
        assert_eq!(fmt(750_000_000_000, "GB"), "750GB");
        assert_eq!(fmt(1000, "kB"), "1kB");
        assert_eq!(fmt(1536, ".1KiB"), "1.5KiB");
        assert_eq!(fmt(42, "B"), "42B");
    }

    #[test]
    fn bit_base_multiplies_by_word_length() {
        assert_eq!(fmt(1, "b"), "8b");
        assert_eq!(fmt(2000, "Kib"), "16Kib");
        assert_eq!(fmt(2000, ".3Kib"), "15.625Kib");
        assert_eq!(format(2000, "Kib", 4).unwrap(), "8Kib");
    }

    #[test]
    fn integer_values_suppress_precision() {
        assert_eq!(fmt(1024, ".4KiB"), "1KiB");
        assert_eq!(fmt(2 * 1024u128.pow(3), ".2GiB"), "2GiB");
        assert_eq!(fmt(1536, ".2KiB"), "1.50KiB");
    }

    #[test]
    fn zero_keeps_its_unit_suffix() {
        assert_eq!(fmt(0, "a"), "0B  ");
        assert_eq!(fmt(0, "B"), "0B");
        assert_eq!(fmt(0, "m"), "0B ");
        assert_eq!(fmt(0, "A"), "0  ");
    }

    #[test]
    fn width_covers_the_whole_rendered_string() {
        assert_eq!(fmt(1024, " 20.4a"), "                1KiB");
        assert_eq!(fmt(1024, " 20.4a").len(), 20);
        assert_eq!(fmt(2000, " 10.2a"), "   1.95KiB");
        assert_eq!(fmt(750_000_000_000, "010.2GiB"), "0698.49GiB");
        // width smaller than the output never truncates
        assert_eq!(fmt(750_000_000_000, "2.2GiB"), "698.49GiB");
    }

    #[test]
    fn mode_letters_win_over_unit_tokens() {
        // `m` is metric-auto, not the legacy mebi alias
        assert_eq!(FormatSpec::parse("m").unwrap().mode, ScaleMode::AutoMetric);
        assert_eq!(
            FormatSpec::parse("Mi").unwrap().mode,
            ScaleMode::Fixed {
                prefix: "Mi",
                multiplier: 1024 * 1024
            }
        );
    }

    #[test]
    fn longest_token_matches_first() {
        let spec = FormatSpec::parse("GiB").unwrap();
        assert_eq!(
            spec.mode,
            ScaleMode::Fixed {
                prefix: "Gi",
                multiplier: 1024u128.pow(3)
            }
        );
        let spec = FormatSpec::parse("GB").unwrap();
        assert_eq!(
            spec.mode,
            ScaleMode::Fixed {
                prefix: "G",
                multiplier: 1_000_000_000
            }
        );
    }

    #[test]
    fn padding_grammar() {
        let spec = FormatSpec::parse(" 20.4a").unwrap();
        assert_eq!(spec.fill, Some(' '));
        assert_eq!(spec.width, Some(20));
        assert_eq!(spec.precision, Some(4));

        let spec = FormatSpec::parse("08.2GiB").unwrap();
        assert_eq!(spec.fill, Some('0'));
        assert_eq!(spec.width, Some(8));
        assert_eq!(spec.precision, Some(2));

        let spec = FormatSpec::parse("12a").unwrap();
        assert_eq!(spec.fill, None);
        assert_eq!(spec.width, Some(12));
        assert_eq!(spec.precision, None);

        let spec = FormatSpec::parse(".3I").unwrap();
        assert_eq!(spec.width, None);
        assert_eq!(spec.precision, Some(3));
    }

    #[test]
    fn malformed_specs_are_rejected() {
        assert!(matches!(
            FormatSpec::parse("x.2a"),
            Err(SizeError::InvalidFormatSpec { .. })
        ));
        assert!(matches!(
            FormatSpec::parse("1.a"),
            Err(SizeError::InvalidFormatSpec { .. })
        ));
        assert!(matches!(
            FormatSpec::parse("QiB"),
            Err(SizeError::InvalidFormatSpec { .. })
        ));
        assert!(matches!(
            FormatSpec::parse("_a"),
            Err(SizeError::InvalidFormatSpec { .. })
        ));
    }

    #[test]
    fn chosen_denomination_is_monotonic() {
        let mut last = 0u128;
        for bytes in [1u128, 999, 1000, 1024, 500_000, 1_048_576, 1 << 40] {
            let (denomination, _, _) =
                auto_select(bytes as f64, crate::units::full_scan_table(), 3);
            assert!(denomination >= last);
            last = denomination;
        }
    }
}

//! Quantity parsing and size formatting
//!
//! Converts between the quantity strings found on Kubernetes objects and the
//! canonical units used by the accounting engine:
//! - memory in bytes (binary `Ki`..`Yi` and decimal `Kb`..`Yb` suffixes)
//! - CPU in cores (whole cores or `m` milli-cores)
//! - pod-slots as plain counts

use crate::error::{AccountingError, Result};
use tracing::debug;

pub const KI: f64 = 1024.0;
pub const KB: f64 = 1000.0;
pub const MI: f64 = KI * 1024.0;
pub const MB: f64 = KB * 1000.0;
pub const GI: f64 = MI * 1024.0;
pub const GB: f64 = MB * 1000.0;
pub const TI: f64 = GI * 1024.0;
pub const TB: f64 = GB * 1000.0;
pub const PI: f64 = TI * 1024.0;
pub const PB: f64 = TB * 1000.0;
pub const EI: f64 = PI * 1024.0;
pub const EB: f64 = PB * 1000.0;
pub const ZI: f64 = EI * 1024.0;
pub const ZB: f64 = EB * 1000.0;
pub const YI: f64 = ZI * 1024.0;
pub const YB: f64 = ZB * 1000.0;

/// Recognised size suffixes and their multipliers
const SIZE_SUFFIXES: &[(&str, f64)] = &[
    ("B", 1.0),
    ("Ki", KI),
    ("Kb", KB),
    ("Mi", MI),
    ("Mb", MB),
    ("Gi", GI),
    ("Gb", GB),
    ("Ti", TI),
    ("Tb", TB),
    ("Pi", PI),
    ("Pb", PB),
    ("Ei", EI),
    ("Eb", EB),
    ("Zi", ZI),
    ("Zb", ZB),
    ("Yi", YI),
    ("Yb", YB),
];

/// Binary units walked by `bytes_to_size_string` before falling back to `Yi`
const DISPLAY_LADDER: &[&str] = &["Ki", "Mi", "Gi", "Ti", "Pi", "Ei", "Zi"];

/// Render a byte count as a short size string, e.g. "102B", "5.0Ki" or
/// "98.3Ti".
pub fn bytes_to_size_string(bytes: f64) -> String {
    if bytes.abs() < KI {
        return format!("{}B", bytes as i64);
    }
    let mut scaled = bytes / KI;
    for unit in DISPLAY_LADDER {
        if scaled.abs() < KI {
            return format!("{:.1}{}", scaled, unit);
        }
        scaled /= KI;
    }
    format!("{:.1}Yi", scaled)
}

/// Parse a size string such as "102", "3B", "5Ki" or "98Tb" into bytes.
///
/// The magnitude may carry a fractional part so that strings produced by
/// [`bytes_to_size_string`] parse back. A suffix outside the known table is
/// ignored and the magnitude is returned unscaled.
pub fn size_string_to_bytes(s: &str) -> Result<f64> {
    let (magnitude, suffix) = split_magnitude(s);
    if magnitude.is_empty() {
        return Err(AccountingError::malformed(
            "memory",
            s,
            "expected leading digits",
        ));
    }
    let base: f64 = magnitude
        .parse()
        .map_err(|e| AccountingError::malformed("memory", s, format!("{}", e)))?;

    if suffix.is_empty() {
        return Ok(base);
    }
    match SIZE_SUFFIXES.iter().find(|(name, _)| *name == suffix) {
        Some((_, multiplier)) => Ok(base * multiplier),
        None => {
            debug!(
                quantity = %s,
                suffix = %suffix,
                "Unrecognised size suffix, using unscaled magnitude"
            );
            Ok(base)
        }
    }
}

/// Parse a CPU quantity: `<integer>` whole cores or `<integer>m` milli-cores
pub fn parse_cpu(s: &str) -> Result<f64> {
    let trimmed = s.trim();
    let (digits, millicores) = match trimmed.strip_suffix('m') {
        Some(stripped) => (stripped, true),
        None => (trimmed, false),
    };
    let amount = parse_integer("cpu", s, digits)?;
    if millicores {
        Ok(amount / 1000.0)
    } else {
        Ok(amount)
    }
}

/// Parse a live CPU usage reading into cores.
///
/// Metrics pipelines report usage at finer granularity than requests, so in
/// addition to the `m` suffix this accepts `u` (micro-cores) and `n`
/// (nano-cores).
pub fn parse_cpu_usage(s: &str) -> Result<f64> {
    let trimmed = s.trim();
    let (digits, divisor) = if let Some(stripped) = trimmed.strip_suffix('n') {
        (stripped, 1e9)
    } else if let Some(stripped) = trimmed.strip_suffix('u') {
        (stripped, 1e6)
    } else if let Some(stripped) = trimmed.strip_suffix('m') {
        (stripped, 1e3)
    } else {
        (trimmed, 1.0)
    };
    Ok(parse_integer("cpu", s, digits)? / divisor)
}

/// Parse a plain integer count (pod-slots)
pub fn parse_count(s: &str) -> Result<f64> {
    parse_integer("pods", s, s.trim())
}

fn parse_integer(kind: &'static str, original: &str, digits: &str) -> Result<f64> {
    if digits.is_empty() {
        return Err(AccountingError::malformed(kind, original, "empty quantity"));
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AccountingError::malformed(kind, original, "expected only digits"));
    }
    digits
        .parse::<u64>()
        .map(|v| v as f64)
        .map_err(|e| AccountingError::malformed(kind, original, format!("{}", e)))
}

/// Split a size string into its numeric magnitude (digits with an optional
/// fractional part) and the remaining suffix.
fn split_magnitude(s: &str) -> (&str, &str) {
    let int_end = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    if int_end == 0 {
        return ("", s);
    }
    let rest = &s[int_end..];
    if let Some(fraction) = rest.strip_prefix('.') {
        let frac_len = fraction
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(fraction.len());
        if frac_len > 0 {
            let end = int_end + 1 + frac_len;
            return (&s[..end], &s[end..]);
        }
    }
    (&s[..int_end], rest)
}

use super::*;

pub const SI_PREFIXES: &[(&str, f64)] = &[
    ("", 1.0),
    ("K", 1e3),
    ("M", 1e6),
    ("G", 1e9),
    ("T", 1e12),
    ("P", 1e15),
    ("E", 1e18),
    ("Z", 1e21),
    ("Y", 1e24),
];

pub fn format_si(value: f64, unit: &str, f: &mut Formatter<'_>) -> fmt::Result {
    if value == 0.0 {
        return if unit.is_empty() {
            write!(f, "0")
        } else {
            write!(f, "0 {unit}")
        };
    }

    let (prefix, divisor) = SI_PREFIXES
        .iter()
        .rev()
        .find(|(_, div)| value.abs() >= *div)
        .unwrap_or(&SI_PREFIXES[0]);

    let scaled = value / divisor;
    let precision = f.precision().unwrap_or(2);
    let s = format!("{scaled:.precision$}");
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');

    let suffix = format!("{prefix}{unit}");

    if suffix.is_empty() {
        write!(f, "{trimmed}")
    } else {
        write!(f, "{trimmed} {suffix}")
    }
}

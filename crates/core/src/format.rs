//! Human-readable rendering of usage counters for the landing page.

const BYTE_UNITS: [&str; 7] = ["Bytes", "KB", "MB", "GB", "TB", "PB", "EB"];

const COMPACT_TIERS: [(f64, &str); 4] = [(1e3, "K"), (1e6, "M"), (1e9, "B"), (1e12, "T")];

/// Format a byte count with binary prefixes (`1 KB` = 1024 bytes).
///
/// At most two fractional digits are kept and trailing zeros are dropped,
/// so `1536` renders as `1.5 KB`. Zero renders as `0 Bytes`.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{} {}", trim_fraction(format!("{value:.2}")), BYTE_UNITS[unit])
}

/// Format a count in en-US compact notation.
///
/// Values below 1000 are printed as-is; larger values are abbreviated with
/// `K`/`M`/`B`/`T` and at most one fractional digit (`12345` → `12.3K`).
pub fn format_compact(count: u64) -> String {
    if count < 1000 {
        return count.to_string();
    }

    let value = count as f64;
    let mut tier = COMPACT_TIERS
        .iter()
        .rposition(|(scale, _)| value >= *scale)
        .unwrap_or(0);

    let mut scaled = round_one_decimal(value / COMPACT_TIERS[tier].0);
    // 999_950 rounds to 1000K; carry into the next tier like Intl does.
    if scaled >= 1000.0 && tier + 1 < COMPACT_TIERS.len() {
        tier += 1;
        scaled = round_one_decimal(value / COMPACT_TIERS[tier].0);
    }

    let rendered = trim_fraction(format!("{scaled:.1}"));
    format!("{}{}", group_thousands(&rendered), COMPACT_TIERS[tier].1)
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn trim_fraction(rendered: String) -> String {
    if !rendered.contains('.') {
        return rendered;
    }
    rendered
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

fn group_thousands(rendered: &str) -> String {
    let (int_part, frac_part) = match rendered.split_once('.') {
        Some((int_part, frac)) => (int_part, Some(frac)),
        None => (rendered, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{grouped}.{frac}"),
        None => grouped,
    }
}

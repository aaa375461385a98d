#![forbid(unsafe_code)]

//! Compact count formatting for narrow panels.

/// Format an item count for display.
///
/// - `>= 1_000_000`: millions with up to three decimals, `M` suffix
/// - `>= 1_000`: thousands with up to three decimals, `K` suffix
/// - otherwise: integer with `,` thousands separators
///
/// ```
/// use autoasm_text::number::format_count;
///
/// assert_eq!(format_count(12_345), "12.345K");
/// assert_eq!(format_count(2_500_000), "2.5M");
/// assert_eq!(format_count(999), "999");
/// ```
#[must_use]
pub fn format_count(n: i64) -> String {
    if n >= 1_000_000 {
        scaled(n, 1_000_000, "M")
    } else if n >= 1_000 {
        scaled(n, 1_000, "K")
    } else {
        grouped(n)
    }
}

/// `n / divisor` rounded half away from zero to three decimals, zeros trimmed.
fn scaled(n: i64, divisor: i64, suffix: &str) -> String {
    let step = divisor / 1_000;
    let mut thousandths = n / step;
    if (n % step) * 2 >= step {
        thousandths += 1;
    }
    let whole = thousandths / 1_000;
    let frac = thousandths % 1_000;
    if frac == 0 {
        format!("{whole}{suffix}")
    } else {
        let digits = format!("{frac:03}");
        format!("{whole}.{}{suffix}", digits.trim_end_matches('0'))
    }
}

fn grouped(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

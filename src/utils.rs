//! Small formatting helpers shared across the container modules.

/// Format a float rounded to `maxdd` decimal digits, printing integral
/// values without a decimal point.
pub(crate) fn format_float(v: f64, maxdd: i32) -> String {
    // Past 17 significant digits rounding only loses precision; the
    // shortest representation already round-trips exactly.
    if !v.is_finite() || maxdd >= 17 {
        return format!("{v}");
    }
    let factor = 10f64.powi(maxdd.max(0));
    let r = (v * factor).round() / factor;
    if r == r.trunc() && r.abs() < 1e15 {
        format!("{}", r as i64)
    } else {
        format!("{r}")
    }
}

/// Round a float to `maxdd` decimal digits.
pub(crate) fn round_float(v: f64, maxdd: i32) -> f64 {
    let factor = 10f64.powi(maxdd.max(0));
    (v * factor).round() / factor
}

/// Quote a text value, escaping embedded quotes and backslashes.
pub(crate) fn quote_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Undo `quote_text` escapes on a captured quoted payload.
pub(crate) fn unescape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Capitalize the first letter of every alphanumeric run, lowercasing the
/// rest.
pub(crate) fn initcap(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphanumeric() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_output_drops_trailing_noise() {
        assert_eq!(format_float(1.0, 15), "1");
        assert_eq!(format_float(1.5, 15), "1.5");
        assert_eq!(format_float(2.675, 2), "2.68");
        assert_eq!(format_float(-0.0, 15), "0");
    }

    #[test]
    fn text_quoting_round_trips() {
        let s = "a \"quoted\" \\ value";
        let quoted = quote_text(s);
        assert_eq!(unescape_text(&quoted[1..quoted.len() - 1]), s);
    }

    #[test]
    fn initcap_capitalizes_words() {
        assert_eq!(initcap("hello WORLD, again"), "Hello World, Again");
    }
}

//! Lexer primitives over a text cursor.
//!
//! Tokenization is punctuation driven: every primitive skips leading
//! whitespace and, on success, advances the cursor. The only keywords are
//! the box prefixes, the dimension suffixes, `NPOINT`/`NSEGMENT`,
//! `SRID=…;` and `Interp=Step;`, all matched case-insensitively.

use crate::errors::{Error, Result};

/// Structural terminators that end a timestamp or an unquoted bound.
const BOUND_DELIMS: &[u8] = &[b',', b']', b'}', b')'];

#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(input: &'a str) -> Self {
        Cursor { input, pos: 0 }
    }

    /// Remaining input, unskipped.
    pub fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn bytes(&self) -> &'a [u8] {
        self.input.as_bytes()
    }

    pub fn skip_whitespace(&mut self) {
        while let Some(&b) = self.bytes().get(self.pos) {
            if b == b' ' || b == b'\n' || b == b'\r' || b == b'\t' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    /// First byte after whitespace, without consuming it.
    pub fn peek(&mut self) -> Option<u8> {
        self.skip_whitespace();
        self.bytes().get(self.pos).copied()
    }

    /// Consume `c` if it is the next non-whitespace byte.
    pub fn try_char(&mut self, c: u8) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub fn try_obrace(&mut self) -> bool {
        self.try_char(b'{')
    }

    pub fn try_cbrace(&mut self) -> bool {
        self.try_char(b'}')
    }

    pub fn try_obracket(&mut self) -> bool {
        self.try_char(b'[')
    }

    pub fn try_cbracket(&mut self) -> bool {
        self.try_char(b']')
    }

    pub fn try_oparen(&mut self) -> bool {
        self.try_char(b'(')
    }

    pub fn try_cparen(&mut self) -> bool {
        self.try_char(b')')
    }

    pub fn try_comma(&mut self) -> bool {
        self.try_char(b',')
    }

    pub fn expect_obrace(&mut self, type_name: &str) -> Result<()> {
        if self.try_obrace() {
            Ok(())
        } else {
            Err(Error::parse(type_name, "Missing opening brace"))
        }
    }

    pub fn expect_cbrace(&mut self, type_name: &str) -> Result<()> {
        if self.try_cbrace() {
            Ok(())
        } else {
            Err(Error::parse(type_name, "Missing closing brace"))
        }
    }

    pub fn expect_oparen(&mut self, type_name: &str) -> Result<()> {
        if self.try_oparen() {
            Ok(())
        } else {
            Err(Error::parse(type_name, "Missing opening parenthesis"))
        }
    }

    pub fn expect_cparen(&mut self, type_name: &str) -> Result<()> {
        if self.try_cparen() {
            Ok(())
        } else {
            Err(Error::parse(type_name, "Missing closing parenthesis"))
        }
    }

    pub fn expect_char(&mut self, c: u8, type_name: &str) -> Result<()> {
        if self.try_char(c) {
            Ok(())
        } else {
            Err(Error::parse(
                type_name,
                format!("Missing character '{}'", c as char),
            ))
        }
    }

    /// The remaining input, after whitespace, must be empty.
    pub fn expect_end(&mut self, type_name: &str) -> Result<()> {
        self.skip_whitespace();
        if self.pos < self.input.len() {
            return Err(Error::parse(
                type_name,
                "Extraneous characters at the end",
            ));
        }
        Ok(())
    }

    /// Case-insensitively match `keyword` and consume it.
    pub fn try_keyword(&mut self, keyword: &str) -> bool {
        self.skip_whitespace();
        let rest = self.rest();
        if rest.len() >= keyword.len() && rest[..keyword.len()].eq_ignore_ascii_case(keyword) {
            self.pos += keyword.len();
            true
        } else {
            false
        }
    }

    /// Scan an `SRID=<digits>[,;]` prefix. The trailing delimiter is
    /// gobbled so the value body never re-encounters it.
    pub fn parse_srid(&mut self) -> Result<Option<i32>> {
        if !self.try_keyword("SRID=") {
            return Ok(None);
        }
        let start = self.pos;
        while self.bytes().get(self.pos).is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(Error::text("Could not parse SRID: Missing number"));
        }
        let srid: i32 = self.input[start..self.pos]
            .parse()
            .map_err(|_| Error::text("Could not parse SRID: Number out of range"))?;
        match self.bytes().get(self.pos) {
            Some(b',') | Some(b';') => {
                self.pos += 1;
                Ok(Some(srid))
            }
            _ => Err(Error::text("Could not parse SRID: Missing delimiter ',' or ';'")),
        }
    }

    /// strtod-style scan: the longest numeric prefix is converted.
    pub fn parse_double(&mut self) -> Result<f64> {
        self.skip_whitespace();
        let bytes = self.bytes();
        let start = self.pos;
        let mut end = self.pos;
        if bytes.get(end).is_some_and(|&b| b == b'+' || b == b'-') {
            end += 1;
        }
        while bytes.get(end).is_some_and(|b| b.is_ascii_digit()) {
            end += 1;
        }
        if bytes.get(end) == Some(&b'.') {
            end += 1;
            while bytes.get(end).is_some_and(|b| b.is_ascii_digit()) {
                end += 1;
            }
        }
        if bytes.get(end).is_some_and(|&b| b == b'e' || b == b'E') {
            let mut exp = end + 1;
            if bytes.get(exp).is_some_and(|&b| b == b'+' || b == b'-') {
                exp += 1;
            }
            if bytes.get(exp).is_some_and(|b| b.is_ascii_digit()) {
                end = exp;
                while bytes.get(end).is_some_and(|b| b.is_ascii_digit()) {
                    end += 1;
                }
            }
        }
        let slice = &self.input[start..end];
        let value: f64 = slice
            .parse()
            .map_err(|_| Error::text("Invalid input syntax for type double"))?;
        self.pos = end;
        Ok(value)
    }

    /// Scan a timestamp literal: everything up to the first structural
    /// terminator (or the end of input).
    pub fn scan_timestamp(&mut self) -> &'a str {
        self.skip_whitespace();
        let start = self.pos;
        while let Some(&b) = self.bytes().get(self.pos) {
            if BOUND_DELIMS.contains(&b) {
                break;
            }
            self.pos += 1;
        }
        self.input[start..self.pos].trim_end()
    }

    /// Scan a span bound: up to `, ] } )` or the end of input. No quote
    /// handling; span bases are never quoted.
    pub fn scan_bound(&mut self) -> &'a str {
        self.scan_timestamp()
    }

    /// Scan a set element: a quoted string (both quotes consumed, capture
    /// excludes them) or an unquoted run up to `,` or `}`.
    pub fn scan_element(&mut self) -> Result<&'a str> {
        self.skip_whitespace();
        if self.bytes().get(self.pos) == Some(&b'"') {
            return self.scan_quoted();
        }
        let start = self.pos;
        while let Some(&b) = self.bytes().get(self.pos) {
            if b == b',' || b == b'}' {
                break;
            }
            self.pos += 1;
        }
        Ok(self.input[start..self.pos].trim_end())
    }

    /// Scan a base value delimited by `delim`: a quoted string or an
    /// unquoted run that must reach the delimiter before the input ends.
    /// The delimiter itself is not consumed.
    pub fn scan_base_value(&mut self, delim: u8) -> Result<&'a str> {
        self.skip_whitespace();
        let orig = self.rest();
        if self.bytes().get(self.pos) == Some(&b'"') {
            return self.scan_quoted();
        }
        let start = self.pos;
        while let Some(&b) = self.bytes().get(self.pos) {
            if b == delim {
                return Ok(self.input[start..self.pos].trim_end());
            }
            self.pos += 1;
        }
        Err(Error::text(format!(
            "Missing delimiter character '{}': {orig}",
            delim as char
        )))
    }

    /// Quoted scan: the opening quote is consumed, the capture runs to the
    /// next unescaped quote, which is consumed as well.
    fn scan_quoted(&mut self) -> Result<&'a str> {
        let orig = self.rest();
        self.pos += 1; // opening quote
        let start = self.pos;
        let bytes = self.bytes();
        while let Some(&b) = bytes.get(self.pos) {
            if b == b'"' && bytes.get(self.pos - 1) != Some(&b'\\') {
                let capture = &self.input[start..self.pos];
                self.pos += 1; // closing quote
                return Ok(capture);
            }
            self.pos += 1;
        }
        Err(Error::text(format!("Unterminated quoted string: {orig}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiters_skip_whitespace() {
        let mut cur = Cursor::new("  \t{ 1 }");
        assert!(cur.try_obrace());
        assert!(!cur.try_cbrace());
        assert_eq!(cur.scan_element().unwrap(), "1");
        assert!(cur.try_cbrace());
        assert!(cur.expect_end("intset").is_ok());
    }

    #[test]
    fn expect_end_flags_trailing_garbage() {
        let mut cur = Cursor::new("  x");
        let err = cur.expect_end("intspan").unwrap_err();
        assert!(err.to_string().contains("Extraneous characters"));
    }

    #[test]
    fn srid_prefix_gobbles_delimiter() {
        let mut cur = Cursor::new("SRID=4326;POINT(1 1)");
        assert_eq!(cur.parse_srid().unwrap(), Some(4326));
        assert_eq!(cur.rest(), "POINT(1 1)");
        let mut cur = Cursor::new("POINT(1 1)");
        assert_eq!(cur.parse_srid().unwrap(), None);
    }

    #[test]
    fn keyword_matching_is_case_insensitive() {
        let mut cur = Cursor::new("srid=5;x");
        assert_eq!(cur.parse_srid().unwrap(), Some(5));
        let mut cur = Cursor::new("interp=step;[");
        assert!(cur.try_keyword("Interp=Step;"));
    }

    #[test]
    fn double_scan_stops_at_structure() {
        let mut cur = Cursor::new("1.5e2,rest");
        assert_eq!(cur.parse_double().unwrap(), 150.0);
        assert!(cur.try_comma());
        let mut cur = Cursor::new("oops");
        assert!(cur.parse_double().is_err());
    }

    #[test]
    fn base_value_scan_requires_delimiter() {
        let mut cur = Cursor::new("10@2001-01-01");
        assert_eq!(cur.scan_base_value(b'@').unwrap(), "10");
        assert_eq!(cur.rest(), "@2001-01-01");
        let mut cur = Cursor::new("10");
        assert!(cur.scan_base_value(b'@').is_err());
    }

    #[test]
    fn quoted_scan_consumes_both_quotes() {
        let mut cur = Cursor::new("\"POINT(1 1)\"@2001-01-01");
        assert_eq!(cur.scan_base_value(b'@').unwrap(), "POINT(1 1)");
        assert_eq!(cur.rest(), "@2001-01-01");
    }

    #[test]
    fn quoted_scan_honors_escapes() {
        let mut cur = Cursor::new("\"a\\\"b\", rest");
        assert_eq!(cur.scan_element().unwrap(), "a\\\"b");
        assert!(cur.try_comma());
    }

    #[test]
    fn timestamp_scan_stops_at_terminators() {
        let mut cur = Cursor::new("2001-01-01 08:00:00+00, tail");
        assert_eq!(cur.scan_timestamp(), "2001-01-01 08:00:00+00");
        assert!(cur.try_comma());
        let mut cur = Cursor::new("2001-01-01]");
        assert_eq!(cur.scan_timestamp(), "2001-01-01");
        assert!(cur.try_cbracket());
    }
}

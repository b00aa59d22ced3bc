//! Translating spreadsheet date/time number formats into chrono patterns.
//!
//! Only the first section of a format (up to the first unquoted `;`) is
//! considered. Colour and locale brackets are dropped, elapsed-time brackets
//! (`[h]`, `[mm]`, `[ss]`) render as plain hours, minutes or seconds.
//!
//! A run of one or two `m` is ambiguous between month and minute. The run
//! takes the meaning of the nearest date letter (`d`, `y`) or time letter
//! (`h`, `s`) on either side. On a tie it is a month, unless the nearest
//! letter before it is an `h`.

use std::fmt::Write;

use ahash::AHashMap;
use chrono::format::{Item, StrftimeItems};
use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::error::{Error, Result};

/// Largest serial that is still a valid date (9999-12-31)
pub const MAX_DATE_SERIAL: f64 = 2_958_465.0;

/// Serial of 1900-02-29 in the 1900 system, a day the calendar never had
const PHANTOM_LEAP_DAY: f64 = 60.0;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    /// A run of one date/time letter, lowercased, with its length
    Run(char, usize),
    AmPm,
    /// Fractional seconds (`.0`, `.00`, ...)
    Fraction,
    Literal(String),
}

fn is_date_letter(c: char) -> bool {
    matches!(c, 'y' | 'm' | 'd' | 'h' | 's')
}

/// First section of a format, honouring quotes and escapes.
fn first_section(format: &str) -> &str {
    let mut quoted = false;
    let mut escaped = false;
    for (i, c) in format.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => quoted = !quoted,
            ';' if !quoted => return &format[..i],
            _ => {}
        }
    }
    format
}

fn tokenize(format: &str) -> Vec<Token> {
    let chars: Vec<char> = first_section(format).chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let lower = c.to_ascii_lowercase();
        match c {
            '"' => {
                let end = chars[i + 1..]
                    .iter()
                    .position(|&q| q == '"')
                    .map_or(chars.len(), |p| i + 1 + p);
                tokens.push(Token::Literal(chars[i + 1..end].iter().collect()));
                i = end + 1;
            }
            '\\' => {
                if let Some(&next) = chars.get(i + 1) {
                    tokens.push(Token::Literal(next.to_string()));
                }
                i += 2;
            }
            '_' => {
                // Padding to the width of the next character
                tokens.push(Token::Literal(" ".into()));
                i += 2;
            }
            '*' => i += 2,
            '[' => {
                let end = chars[i..]
                    .iter()
                    .position(|&b| b == ']')
                    .map_or(chars.len(), |p| i + p);
                let inner: String = chars[i + 1..end.min(chars.len())]
                    .iter()
                    .collect::<String>()
                    .to_ascii_lowercase();
                if let Some(first) = inner.chars().next() {
                    if matches!(first, 'h' | 'm' | 's') && inner.chars().all(|x| x == first) {
                        tokens.push(Token::Run(first, inner.len()));
                    }
                }
                i = end + 1;
            }
            _ if starts_with_ignore_case(&chars[i..], "am/pm") => {
                tokens.push(Token::AmPm);
                i += 5;
            }
            _ if starts_with_ignore_case(&chars[i..], "a/p") => {
                tokens.push(Token::AmPm);
                i += 3;
            }
            '.' if chars.get(i + 1) == Some(&'0')
                && matches!(tokens.last(), Some(Token::Run('s', _))) =>
            {
                i += 1;
                while chars.get(i) == Some(&'0') {
                    i += 1;
                }
                tokens.push(Token::Fraction);
            }
            _ if is_date_letter(lower) => {
                let mut len = 0;
                while chars
                    .get(i + len)
                    .map_or(false, |x| x.to_ascii_lowercase() == lower)
                {
                    len += 1;
                }
                tokens.push(Token::Run(lower, len));
                i += len;
            }
            _ => {
                tokens.push(Token::Literal(c.to_string()));
                i += 1;
            }
        }
    }
    tokens
}

fn starts_with_ignore_case(chars: &[char], needle: &str) -> bool {
    let mut it = chars.iter();
    needle
        .chars()
        .all(|n| it.next().map_or(false, |c| c.to_ascii_lowercase() == n))
}

/// Whether the `m` run at `pos` means minutes.
fn is_minute(tokens: &[Token], pos: usize) -> bool {
    let letter_at = |i: usize| match tokens[i] {
        Token::Run(c, _) => Some(c),
        _ => None,
    };

    let mut date_dist = usize::MAX;
    let mut time_dist = usize::MAX;
    let mut preceding = None;

    let mut dist = 0;
    for i in (0..pos).rev() {
        if let Some(c) = letter_at(i) {
            dist += 1;
            preceding.get_or_insert(c);
            match c {
                'd' | 'y' => date_dist = date_dist.min(dist),
                'h' | 's' => time_dist = time_dist.min(dist),
                _ => {}
            }
        }
    }
    dist = 0;
    for i in pos + 1..tokens.len() {
        if let Some(c) = letter_at(i) {
            dist += 1;
            match c {
                'd' | 'y' => date_dist = date_dist.min(dist),
                'h' | 's' => time_dist = time_dist.min(dist),
                _ => {}
            }
        }
    }

    match time_dist.cmp(&date_dist) {
        std::cmp::Ordering::Less => true,
        std::cmp::Ordering::Greater => false,
        std::cmp::Ordering::Equal => preceding == Some('h'),
    }
}

/// Whether a custom format displays a date or time.
pub fn is_date_pattern(format: &str) -> bool {
    tokenize(format)
        .iter()
        .any(|t| matches!(t, Token::Run(..) | Token::AmPm))
}

/// Translate a spreadsheet date/time format into a chrono `strftime` pattern.
pub fn to_chrono_pattern(format: &str) -> String {
    let tokens = tokenize(format);
    let twelve_hour = tokens.contains(&Token::AmPm);
    let mut out = String::new();

    for (pos, token) in tokens.iter().enumerate() {
        match token {
            Token::Run('y', n) if *n <= 2 => out.push_str("%y"),
            Token::Run('y', _) => out.push_str("%Y"),
            Token::Run('m', n) if *n <= 2 && is_minute(&tokens, pos) => {
                out.push_str(if *n == 1 { "%-M" } else { "%M" })
            }
            Token::Run('m', 1) => out.push_str("%-m"),
            Token::Run('m', 2) => out.push_str("%m"),
            Token::Run('m', 4) => out.push_str("%B"),
            Token::Run('m', _) => out.push_str("%b"),
            Token::Run('d', 1) => out.push_str("%-d"),
            Token::Run('d', 2) => out.push_str("%d"),
            Token::Run('d', 3) => out.push_str("%a"),
            Token::Run('d', _) => out.push_str("%A"),
            Token::Run('h', n) => out.push_str(match (twelve_hour, *n == 1) {
                (true, true) => "%-I",
                (true, false) => "%I",
                (false, true) => "%-H",
                (false, false) => "%H",
            }),
            Token::Run(_, 1) => out.push_str("%-S"),
            Token::Run(_, _) => out.push_str("%S"),
            Token::AmPm => out.push_str("%p"),
            Token::Fraction => out.push_str("%.3f"),
            Token::Literal(text) => out.push_str(&text.replace('%', "%%")),
        }
    }
    out
}

/// Memo of translated patterns, keyed by the source format string.
#[derive(Debug, Clone, Default)]
pub struct DatePatternCache {
    patterns: AHashMap<String, String>,
}

impl DatePatternCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// The chrono pattern for `format`, translating it on first use
    pub fn pattern(&mut self, format: &str) -> &str {
        if !self.patterns.contains_key(format) {
            self.patterns
                .insert(format.to_string(), to_chrono_pattern(format));
        }
        &self.patterns[format]
    }

    /// Number of cached translations
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether nothing has been translated yet
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Render a date serial through `format`
    pub fn format_serial(&mut self, serial: f64, format: &str, date1904: bool) -> Result<String> {
        if !is_date_pattern(format) {
            return Err(Error::NotADateFormat(format.to_string()));
        }
        if !date1904 && serial.trunc() == PHANTOM_LEAP_DAY {
            return render_phantom_leap_day(serial, self.pattern(format));
        }
        let datetime = serial_to_datetime(serial, date1904)
            .ok_or_else(|| Error::other(format!("date serial {} out of range", serial)))?;
        render(datetime, self.pattern(format))
    }
}

/// Convert a date serial into a calendar date and time.
///
/// The 1900 system counts 1900-02-29 as a real day, so serials below 61 count
/// from 1899-12-31 and later ones from 1899-12-30. Serial 60 itself has no
/// calendar date and converts to 1900-03-01; [`DatePatternCache::format_serial`]
/// renders it as 29 February 1900.
pub fn serial_to_datetime(serial: f64, date1904: bool) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 || serial > MAX_DATE_SERIAL {
        return None;
    }
    let epoch = if date1904 {
        NaiveDate::from_ymd_opt(1904, 1, 1)?
    } else if serial < PHANTOM_LEAP_DAY + 1.0 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    let days = serial.trunc() as i64;
    let millis = ((serial - serial.trunc()) * 86_400_000.0).round() as i64;
    epoch
        .and_hms_opt(0, 0, 0)?
        .checked_add_signed(Duration::days(days))?
        .checked_add_signed(Duration::milliseconds(millis))
}

/// Render serial 60 of the 1900 system on 2012-02-29, a Wednesday like the
/// spreadsheet's 1900-02-29, with the year written back as 1900.
fn render_phantom_leap_day(serial: f64, pattern: &str) -> Result<String> {
    let millis = ((serial - serial.trunc()) * 86_400_000.0).round() as i64;
    let stand_in = NaiveDate::from_ymd_opt(2012, 2, 29)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(|dt| dt.checked_add_signed(Duration::milliseconds(millis)))
        .ok_or_else(|| Error::other(format!("date serial {} out of range", serial)))?;
    let pattern = pattern.replace("%Y", "1900").replace("%y", "00");
    render(stand_in, &pattern)
}

fn render(datetime: NaiveDateTime, pattern: &str) -> Result<String> {
    let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(Error::other(format!("unsupported date pattern: {}", pattern)));
    }
    let mut out = String::new();
    write!(out, "{}", datetime.format_with_items(items.iter()))
        .map_err(|_| Error::other(format!("failed to render pattern: {}", pattern)))?;
    Ok(out)
}

use crate::protocol::{CRLF, find_crlf};
use crate::{Error, Result};
use std::collections::HashMap;
use std::collections::hash_map;

/// Header fields of a single request.
///
/// Names are stored lowercased. A repeated name is folded into the existing
/// entry as `first,second`, so every name maps to exactly one string.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Headers {
    headers: HashMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Looks up `name` and parses it as a non-negative integer.
    ///
    /// Returns `None` when the header is absent or its value is not a plain
    /// decimal number (this includes comma-folded duplicates such as `5,5`).
    pub fn get_usize(&self, name: &str) -> Option<usize> {
        self.get(name).and_then(|v| v.parse().ok())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.headers.contains_key(&name.to_ascii_lowercase())
    }

    /// Inserts a field, appending to an existing value with a comma.
    pub fn set(&mut self, name: &str, value: &str) {
        match self.headers.entry(name.to_ascii_lowercase()) {
            hash_map::Entry::Occupied(mut entry) => {
                let existing = entry.get_mut();
                existing.push(',');
                existing.push_str(value);
            }
            hash_map::Entry::Vacant(entry) => {
                entry.insert(value.to_owned());
            }
        }
    }

    /// Visits every `(name, value)` pair. Order is unspecified.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&str, &str),
    {
        for (name, value) in &self.headers {
            f(name, value);
        }
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.headers.iter(),
        }
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Parses as many complete field-lines from `data` as are available.
    ///
    /// Returns the number of bytes consumed and whether the blank line ending
    /// the header section was reached. Only whole lines are ever consumed; a
    /// trailing partial line is left for the next call. On error nothing is
    /// reported consumed, but fields parsed before the bad line stay in
    /// the collection.
    pub fn parse(&mut self, data: &[u8]) -> Result<(usize, bool)> {
        let mut read = 0;

        while let Some(idx) = find_crlf(&data[read..]) {
            if idx == 0 {
                read += CRLF.len();
                return Ok((read, true));
            }

            let (name, value) = parse_field_line(&data[read..read + idx])?;
            read += idx + CRLF.len();
            log::trace!("header {name}: {value}");
            self.set(&name, &value);
        }

        Ok((read, false))
    }
}

/// Iterator over the fields of [`Headers`].
#[derive(Debug)]
pub struct Iter<'a> {
    inner: hash_map::Iter<'a, String, String>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = (&'a str, &'a str);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Splits one field-line (terminator already stripped) into name and value.
///
/// The name is returned as sent; lowercasing happens in [`Headers::set`].
pub fn parse_field_line(line: &[u8]) -> Result<(String, String)> {
    let Some(colon) = memchr::memchr(b':', line) else {
        return Err(Error::MalformedFieldLine);
    };
    let (name, value) = (&line[..colon], &line[colon + 1..]);

    let lossy = || String::from_utf8_lossy(name).into_owned();
    if name.last().is_some_and(u8::is_ascii_whitespace) {
        return Err(Error::MalformedFieldName(lossy()));
    }
    if !is_token(name) {
        return Err(Error::MalformedFieldName(lossy()));
    }

    // is_token guarantees ASCII
    let name = String::from_utf8_lossy(name).into_owned();
    let value = std::str::from_utf8(value.trim_ascii()).map_err(|_| Error::MalformedFieldLine)?;
    Ok((name, value.to_owned()))
}

/// `token = 1*tchar` (RFC 9110 §5.6.2).
pub fn is_token(bytes: &[u8]) -> bool {
    !bytes.is_empty() && bytes.iter().all(|&b| is_tchar(b))
}

#[inline]
fn is_tchar(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^' | b'_' | b'`' | b'|' | b'~'
        )
}

#[test]
fn test_parse_field_line() {
    let (name, value) = parse_field_line(b"Host: localhost:42069").unwrap();
    assert_eq!(name, "Host");
    assert_eq!(value, "localhost:42069");

    let (name, value) = parse_field_line(b"X-Empty:").unwrap();
    assert_eq!(name, "X-Empty");
    assert_eq!(value, "");

    let (_, value) = parse_field_line(b"Accept:   */*   ").unwrap();
    assert_eq!(value, "*/*");

    let (name, _) = parse_field_line(b"a!#$%&'*+-.^_`|~9: v").unwrap();
    assert_eq!(name, "a!#$%&'*+-.^_`|~9");

    assert!(matches!(parse_field_line(b"Host localhost"), Err(Error::MalformedFieldLine)));
    assert!(matches!(parse_field_line(b"Host : localhost"), Err(Error::MalformedFieldName(_))));
    assert!(matches!(parse_field_line(b"Host\t: localhost"), Err(Error::MalformedFieldName(_))));
    assert!(matches!(parse_field_line(b"   Host: localhost"), Err(Error::MalformedFieldName(_))));
    assert!(matches!(parse_field_line(b"H\xc2\xa9st: localhost"), Err(Error::MalformedFieldName(_))));
    assert!(matches!(parse_field_line(b"H(ost): localhost"), Err(Error::MalformedFieldName(_))));
    assert!(matches!(parse_field_line(b": localhost"), Err(Error::MalformedFieldName(_))));
    assert!(matches!(parse_field_line(b"X-L: caf\xe9"), Err(Error::MalformedFieldLine)));

    let (_, value) = parse_field_line("X-L: caf\u{e9}".as_bytes()).unwrap();
    assert_eq!(value, "caf\u{e9}");
}

#[test]
fn test_headers_set_get() {
    let mut headers = Headers::new();
    assert!(headers.is_empty());

    headers.set("Content-Type", "text/plain");
    assert_eq!(headers.get("content-type"), Some("text/plain"));
    assert_eq!(headers.get("CONTENT-TYPE"), Some("text/plain"));
    assert!(headers.contains("Content-type"));

    headers.set("Accept", "text/html");
    headers.set("accept", "application/json");
    headers.set("ACCEPT", "*/*");
    assert_eq!(headers.get("Accept"), Some("text/html,application/json,*/*"));
    assert_eq!(headers.len(), 2);
    assert_eq!(headers.get("missing"), None);

    let mut seen = Vec::new();
    headers.for_each(|n, v| seen.push(format!("{n}={v}")));
    seen.sort();
    assert_eq!(seen, ["accept=text/html,application/json,*/*", "content-type=text/plain"]);
}

#[test]
fn test_headers_get_usize() {
    let mut headers = Headers::new();
    headers.set("Content-Length", "13");
    headers.set("X-Negative", "-1");
    headers.set("X-Text", "twelve");
    headers.set("X-Dup", "5");
    headers.set("X-Dup", "5");
    assert_eq!(headers.get_usize("content-length"), Some(13));
    assert_eq!(headers.get_usize("x-negative"), None);
    assert_eq!(headers.get_usize("x-text"), None);
    assert_eq!(headers.get_usize("x-dup"), None);
    assert_eq!(headers.get_usize("x-missing"), None);
}

#[test]
fn test_headers_parse() {
    let mut headers = Headers::new();
    let data = b"Host: localhost:42069\r\nUser-Agent: curl/8.5.0\r\n\r\nbody";
    let (n, done) = headers.parse(data).unwrap();
    assert!(done);
    assert_eq!(n, data.len() - 4);
    assert_eq!(headers.get("host"), Some("localhost:42069"));
    assert_eq!(headers.get("user-agent"), Some("curl/8.5.0"));

    // partial second line stays unconsumed
    let mut headers = Headers::new();
    let (n, done) = headers.parse(b"Host: localhost\r\nAcc").unwrap();
    assert!(!done);
    assert_eq!(n, 17);
    assert_eq!(headers.len(), 1);

    // nothing complete yet
    let (n, done) = Headers::new().parse(b"Host: local").unwrap();
    assert_eq!((n, done), (0, false));

    // blank line alone ends the section
    let (n, done) = Headers::new().parse(b"\r\n").unwrap();
    assert_eq!((n, done), (2, true));
}

#[test]
fn test_headers_parse_error_keeps_earlier_fields() {
    let mut headers = Headers::new();
    let result = headers.parse(b"Host: localhost\r\nBad Header : v\r\n\r\n");
    assert!(matches!(result, Err(Error::MalformedFieldName(_))));
    assert_eq!(headers.get("host"), Some("localhost"));
}

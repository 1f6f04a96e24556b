//! CSV building for the export endpoints (RFC 4180 quoting).

use std::borrow::Cow;

#[derive(Debug, Clone)]
pub struct CsvWriter {
    buf: String,
    columns: usize,
}

impl CsvWriter {
    /// Start a document with the given header row.
    pub fn new(header: &[&str]) -> Self {
        let mut writer = Self {
            buf: String::new(),
            columns: header.len(),
        };
        writer.push_row(header.iter().copied());
        writer
    }

    /// Append one record. Missing trailing fields are written empty so every
    /// line has as many fields as the header.
    pub fn push_row<I, S>(&mut self, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut written = 0;
        for field in fields {
            if written > 0 {
                self.buf.push(',');
            }
            self.buf.push_str(&escape_field(field.as_ref()));
            written += 1;
        }
        for _ in written..self.columns {
            self.buf.push(',');
        }
        self.buf.push_str("\r\n");
    }

    pub fn finish(self) -> String {
        self.buf
    }
}

/// Quote a field when it contains a delimiter, a quote, a line break or
/// surrounding whitespace.
pub fn escape_field(field: &str) -> Cow<'_, str> {
    let needs_quotes = field.contains([',', '"', '\n', '\r'])
        || field.starts_with(' ')
        || field.ends_with(' ');

    if needs_quotes {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

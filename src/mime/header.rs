//-
// Copyright (c) 2020, Jason Lingle
//
// This file is part of Postern.
//
// Postern is free software: you can  redistribute it and/or modify it under the
// terms of  the GNU General Public  License as published by  the Free Software
// Foundation, either version  3 of the License, or (at  your option) any later
// version.
//
// Postern is distributed  in the hope that  it will be useful,  but WITHOUT ANY
// WARRANTY; without  even the implied  warranty of MERCHANTABILITY  or FITNESS
// FOR  A PARTICULAR  PURPOSE.  See the  GNU General  Public  License for  more
// details.
//
// You should have received a copy of the GNU General Public License along with
// Postern. If not, see <http://www.gnu.org/licenses/>.

//! An ordered collection of RFC 822 header fields.

use std::fmt;

/// The header block of a message.
///
/// Field order is preserved, as is the spelling of each field name. Lookups
/// are case-insensitive.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Header {
    fields: Vec<(String, String)>,
}

impl Header {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Find the first field named `name`, ignoring ASCII case.
    ///
    /// Returns the field name as it is spelt in the header along with its
    /// value.
    pub fn find_key(&self, name: &str) -> Option<(&str, &str)> {
        self.iter().find(|&(k, _)| k.eq_ignore_ascii_case(name))
    }

    /// Render the full header block, terminated by the empty line which
    /// separates it from the body.
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Render only the fields in `names`, in the order requested, as a header
    /// block terminated by an empty line.
    ///
    /// Names not present in the header are skipped.
    pub fn render_fields<'a>(
        &self,
        names: impl IntoIterator<Item = &'a str>,
    ) -> String {
        let mut out = String::new();
        for name in names {
            if let Some((k, v)) = self.find_key(name) {
                push_field(&mut out, k, v);
            }
        }
        out.push_str("\r\n");
        out
    }

    /// Split raw message text into its header and body.
    ///
    /// The header ends at the first empty line; everything after that line is
    /// the body. Folded continuation lines are joined onto the field they
    /// continue. Text that does not open with a field is all body. Later lines
    /// which are neither fields nor continuations are ignored. Both CRLF and
    /// bare LF line endings are accepted.
    pub fn parse_message(raw: &str) -> (Header, String) {
        let mut header = Header::new();
        let mut rest = raw;

        loop {
            if rest.is_empty() {
                return (header, String::new());
            }

            let (line, after) = match rest.find('\n') {
                Some(ix) => (&rest[..ix], &rest[ix + 1..]),
                None => (rest, ""),
            };
            let line = line.strip_suffix('\r').unwrap_or(line);
            rest = after;

            if line.is_empty() {
                return (header, rest.to_owned());
            }

            if line.starts_with(' ') || line.starts_with('\t') {
                if let Some(last) = header.fields.last_mut() {
                    last.1.push(' ');
                    last.1.push_str(line.trim());
                }
                continue;
            }

            match line.find(':') {
                Some(colon) if !line[..colon].trim_end().is_empty() => {
                    header.push(
                        line[..colon].trim_end(),
                        line[colon + 1..].trim(),
                    );
                }
                _ if header.is_empty() => return (header, raw.to_owned()),
                _ => (),
            }
        }
    }
}

fn push_field(out: &mut String, name: &str, value: &str) {
    out.push_str(name);
    out.push_str(": ");
    out.push_str(value);
    out.push_str("\r\n");
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (k, v) in self.iter() {
            write!(f, "{}: {}\r\n", k, v)?;
        }
        write!(f, "\r\n")
    }
}

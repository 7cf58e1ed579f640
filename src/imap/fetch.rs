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

//! The FETCH attribute engine.
//!
//! An attribute list is split into tokens (spaces inside `[...]` do not
//! split), each token is matched against the registered attribute
//! definitions, and the resulting targets are rendered against one message
//! at a time.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::account::Message;
use crate::support::error::Error;

use super::syntax::{BodySection, FetchAtt};

/// A single parsed fetch attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchTarget {
    Uid,
    Flags,
    Rfc822Size,
    InternalDate,
    Body { section: BodySection, peek: bool },
}

type Matcher = fn(&Captures<'_>) -> FetchTarget;

pub struct AttributeRegistry {
    defs: Vec<(Regex, Matcher)>,
}

lazy_static! {
    static ref STANDARD: AttributeRegistry = AttributeRegistry::standard();
}

fn peek(c: &Captures<'_>) -> bool {
    c.name("peek").is_some()
}

impl AttributeRegistry {
    pub fn new() -> Self {
        AttributeRegistry { defs: Vec::new() }
    }

    /// The shared registry of every attribute the server understands.
    pub fn shared() -> &'static AttributeRegistry {
        &STANDARD
    }

    /// Register an attribute pattern. Patterns are anchored at both ends and
    /// matched case-insensitively.
    pub fn register(
        &mut self,
        pattern: &str,
        matcher: Matcher,
    ) -> Result<(), regex::Error> {
        let rx = Regex::new(&format!("^(?i:{})$", pattern))?;
        self.defs.push((rx, matcher));
        Ok(())
    }

    pub fn standard() -> Self {
        let mut r = AttributeRegistry::new();
        let mut add = |pattern: &str, matcher: Matcher| {
            r.register(pattern, matcher)
                .expect("Built-in fetch attribute pattern is invalid")
        };

        add("UID", |_| FetchTarget::Uid);
        add("FLAGS", |_| FetchTarget::Flags);
        add(r"RFC822\.SIZE", |_| FetchTarget::Rfc822Size);
        add("INTERNALDATE", |_| FetchTarget::InternalDate);
        add(r"BODY(?P<peek>\.PEEK)?\[HEADER\]", |c| FetchTarget::Body {
            section: BodySection::Header,
            peek: peek(c),
        });
        add(
            r"BODY(?P<peek>\.PEEK)?\[HEADER\.FIELDS \((?P<fields>[^()\]]*)\)\]",
            |c| FetchTarget::Body {
                section: BodySection::HeaderFields(
                    c.name("fields")
                        .map(|m| m.as_str())
                        .unwrap_or("")
                        .split_whitespace()
                        .map(|f| f.trim_matches('"').to_owned())
                        .collect(),
                ),
                peek: peek(c),
            },
        );
        add(r"BODY(?P<peek>\.PEEK)?\[TEXT\]", |c| FetchTarget::Body {
            section: BodySection::Text,
            peek: peek(c),
        });
        add(r"BODY(?P<peek>\.PEEK)?\[\]", |c| FetchTarget::Body {
            section: BodySection::Full,
            peek: peek(c),
        });

        r
    }

    /// Parse a whole attribute list (without enclosing parentheses).
    ///
    /// Any unrecognised token fails the whole list.
    pub fn parse(&self, atts: &str) -> Result<Vec<FetchTarget>, Error> {
        split_params(atts)
            .into_iter()
            .map(|token| self.parse_one(token))
            .collect()
    }

    fn parse_one(&self, token: &str) -> Result<FetchTarget, Error> {
        self.defs
            .iter()
            .find_map(|(rx, matcher)| rx.captures(token).map(|c| matcher(&c)))
            .ok_or_else(|| Error::UnrecognisedParameter(token.to_owned()))
    }
}

impl Default for AttributeRegistry {
    fn default() -> Self {
        AttributeRegistry::standard()
    }
}

/// Split an attribute list on spaces which are not inside brackets.
pub fn split_params(s: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0u32;
    let mut start = 0;

    for (ix, ch) in s.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            ' ' if 0 == depth => {
                if ix > start {
                    out.push(&s[start..ix]);
                }
                start = ix + 1;
            }
            _ => (),
        }
    }

    if s.len() > start {
        out.push(&s[start..]);
    }
    out
}

impl FetchTarget {
    /// Whether fetching this marks the message as seen.
    pub fn marks_seen(&self) -> bool {
        matches!(*self, FetchTarget::Body { peek: false, .. })
    }

    /// Render this attribute for `message`.
    pub fn render(&self, message: &Message) -> FetchAtt {
        match *self {
            FetchTarget::Uid => FetchAtt::Uid(message.uid),
            FetchTarget::Flags => {
                FetchAtt::Flags(message.flags, message.keywords.clone())
            }
            FetchTarget::Rfc822Size => FetchAtt::Rfc822Size(message.size()),
            FetchTarget::InternalDate => {
                FetchAtt::InternalDate(message.internal_date)
            }
            FetchTarget::Body { ref section, .. } => {
                let data = match *section {
                    BodySection::Full => message.full_text(),
                    BodySection::Header => message.header.render(),
                    BodySection::HeaderFields(ref names) => message
                        .header
                        .render_fields(names.iter().map(String::as_str)),
                    BodySection::Text => message.body.clone(),
                };
                FetchAtt::Body(section.clone(), data)
            }
        }
    }
}

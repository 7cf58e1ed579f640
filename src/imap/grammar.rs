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

//! Command line recognition.
//!
//! A `Registry` holds an ordered list of rules. Each rule is a regular
//! expression for the command body plus a builder which turns the captures
//! into a typed `Command`. Rules are tried in registration order and the first
//! one whose pattern matches and whose builder accepts the captures wins.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use super::syntax::*;

/// Characters permitted in a command tag.
const TAG: &str = r#"[^\x00-\x20\x7f(){%*"\\+\]]+"#;
/// A sequence set, validated properly once the command is dispatched.
const SEQUENCE_SET: &str = r"[0-9:*,]+";

lazy_static! {
    static ref RX_TAG_ONLY: Regex =
        Regex::new(&format!("^({}) ", TAG)).unwrap();
}

type Builder = fn(&Captures<'_>) -> Option<Command>;

struct Rule {
    rx: Regex,
    build: Builder,
}

/// A line which no rule recognised.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownCommand {
    /// The tag of the line, if one could be found.
    pub tag: Option<String>,
}

pub struct Registry {
    rules: Vec<Rule>,
}

/// Pattern for an astring (a quoted string or a bare atom) captured into the
/// groups `{name}_q` and `{name}_a`.
fn astring(name: &str) -> String {
    format!(
        r#"(?:"(?P<{0}_q>(?:[^"\\\r\n]|\\.)*)"|(?P<{0}_a>[^\s"(){{}}\\]+))"#,
        name
    )
}

/// Extract an astring matched by the pattern produced by `astring()`.
fn take_astring(c: &Captures<'_>, name: &str) -> Option<String> {
    if let Some(quoted) = c.name(&format!("{}_q", name)) {
        let mut out = String::with_capacity(quoted.as_str().len());
        let mut escaped = false;
        for ch in quoted.as_str().chars() {
            if escaped || '\\' != ch {
                out.push(ch);
                escaped = false;
            } else {
                escaped = true;
            }
        }
        Some(out)
    } else {
        c.name(&format!("{}_a", name)).map(|m| m.as_str().to_owned())
    }
}

fn take(c: &Captures<'_>, name: &str) -> Option<String> {
    c.name(name).map(|m| m.as_str().to_owned())
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Registry { rules: Vec::new() }
    }

    /// Add a rule matching a command body.
    ///
    /// `body` must not include the tag; every rule implicitly begins with a
    /// tag followed by a single space and must consume the whole line.
    pub fn register(
        &mut self,
        body: &str,
        build: Builder,
    ) -> Result<(), regex::Error> {
        let rx = Regex::new(&format!("^(?P<tag>{}) (?:{})$", TAG, body))?;
        self.rules.push(Rule { rx, build });
        Ok(())
    }

    /// The registry of every command the server understands.
    pub fn standard() -> Self {
        let mut r = Registry::new();
        let mut add = |body: &str, build: Builder| {
            r.register(body, build)
                .expect("Built-in command pattern is invalid")
        };

        add("(?i:CAPABILITY)", |_| Some(Command::Capability));
        add("(?i:NOOP)", |_| Some(Command::Noop));
        add("(?i:LOGOUT)", |_| Some(Command::LogOut));
        add("(?i:STARTTLS)", |_| Some(Command::StartTls));
        add(
            &format!(
                "(?i:LOGIN) {} {}",
                astring("userid"),
                astring("password")
            ),
            |c| {
                Some(Command::LogIn(LogInCommand {
                    userid: take_astring(c, "userid")?,
                    password: take_astring(c, "password")?,
                }))
            },
        );
        add("(?i:AUTHENTICATE) (?P<mechanism>[A-Za-z0-9_-]+)", |c| {
            Some(Command::Authenticate(AuthenticateCommand {
                mechanism: take(c, "mechanism")?,
            }))
        });
        add(
            &format!(
                "(?i:LIST) {} {}",
                astring("reference"),
                astring("pattern")
            ),
            |c| {
                Some(Command::List(ListCommand {
                    reference: take_astring(c, "reference")?,
                    pattern: take_astring(c, "pattern")?,
                }))
            },
        );
        add(
            &format!(
                "(?i:LSUB)(?: {} {})?",
                astring("reference"),
                astring("pattern")
            ),
            |c| {
                Some(Command::Lsub(ListCommand {
                    reference: take_astring(c, "reference").unwrap_or_default(),
                    pattern: take_astring(c, "pattern")
                        .unwrap_or_else(|| "*".to_owned()),
                }))
            },
        );
        add(&format!("(?i:SELECT) {}", astring("mailbox")), |c| {
            Some(Command::Select(SelectCommand {
                mailbox: take_astring(c, "mailbox")?,
            }))
        });
        add(&format!("(?i:EXAMINE) {}", astring("mailbox")), |c| {
            Some(Command::Examine(SelectCommand {
                mailbox: take_astring(c, "mailbox")?,
            }))
        });
        add(
            &format!(
                r"(?i:STATUS) {} \((?P<atts>[A-Za-z0-9 ]*)\)",
                astring("mailbox")
            ),
            |c| {
                let atts = c
                    .name("atts")?
                    .as_str()
                    .split_whitespace()
                    .map(StatusAtt::parse)
                    .collect::<Option<Vec<_>>>()?;
                Some(Command::Status(StatusCommand {
                    mailbox: take_astring(c, "mailbox")?,
                    atts,
                }))
            },
        );
        add("(?i:CLOSE)", |_| Some(Command::Close));
        add("(?i:EXPUNGE)", |_| Some(Command::Expunge));
        add(
            &format!(
                r"(?P<uid>(?i:UID) )?(?i:FETCH) (?P<messages>{}) (?P<atts>.+)",
                SEQUENCE_SET
            ),
            |c| {
                let atts = c.name("atts")?.as_str().trim();
                let atts = if atts.starts_with('(') && atts.ends_with(')') {
                    &atts[1..atts.len() - 1]
                } else {
                    atts
                };

                Some(Command::Fetch(FetchCommand {
                    uid: c.name("uid").is_some(),
                    messages: take(c, "messages")?,
                    atts: atts.trim().to_owned(),
                }))
            },
        );
        add(
            &format!(
                r"(?P<uid>(?i:UID) )?(?i:STORE) (?P<messages>{}) (?P<sign>[+-])?(?i:FLAGS)(?P<silent>(?i:\.SILENT))? (?P<flags>\([^()]*\)|[^\s()]+(?: [^\s()]+)*)",
                SEQUENCE_SET
            ),
            |c| {
                Some(Command::Store(StoreCommand {
                    uid: c.name("uid").is_some(),
                    messages: take(c, "messages")?,
                    typ: match c.name("sign").map(|m| m.as_str()) {
                        Some("+") => StoreCommandType::Plus,
                        Some(_) => StoreCommandType::Minus,
                        None => StoreCommandType::Eq,
                    },
                    silent: c.name("silent").is_some(),
                    flags: take(c, "flags")?,
                }))
            },
        );
        add(
            &format!(
                r"(?P<uid>(?i:UID) )?(?i:COPY) (?P<messages>{}) {}",
                SEQUENCE_SET,
                astring("dst")
            ),
            |c| {
                Some(Command::Copy(CopyCommand {
                    uid: c.name("uid").is_some(),
                    messages: take(c, "messages")?,
                    dst: take_astring(c, "dst")?,
                }))
            },
        );
        add(
            &format!(
                r#"(?i:APPEND) {}(?: \((?P<flags>[^()]*)\))?(?: "(?P<date>[^"]*)")? \{{(?P<size>[0-9]+)\}}"#,
                astring("mailbox")
            ),
            |c| {
                Some(Command::Append(AppendCommand {
                    mailbox: take_astring(c, "mailbox")?,
                    flags: take(c, "flags"),
                    date: take(c, "date"),
                    size: c.name("size")?.as_str().parse().ok()?,
                }))
            },
        );

        r
    }

    /// Recognise `line`, which must not include its line ending.
    pub fn parse(&self, line: &str) -> Result<CommandLine, UnknownCommand> {
        for rule in &self.rules {
            if let Some(captures) = rule.rx.captures(line) {
                if let Some(cmd) = (rule.build)(&captures) {
                    return Ok(CommandLine {
                        tag: captures["tag"].to_owned(),
                        cmd,
                    });
                }
            }
        }

        Err(UnknownCommand {
            tag: RX_TAG_ONLY
                .captures(line)
                .map(|c| c[1].to_owned()),
        })
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::standard()
    }
}

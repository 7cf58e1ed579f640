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

//! The command and response model.
//!
//! Commands are produced by the matchers in `grammar`; responses are built by
//! the command processor and serialised by their `Display` implementations.

use std::borrow::Cow;
use std::fmt;

use chrono::prelude::*;

use crate::account::model::Flags;

/// A parsed command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandLine {
    pub tag: String,
    pub cmd: Command,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Capability,
    Noop,
    LogOut,
    StartTls,
    LogIn(LogInCommand),
    Authenticate(AuthenticateCommand),
    List(ListCommand),
    Lsub(ListCommand),
    Select(SelectCommand),
    Examine(SelectCommand),
    Status(StatusCommand),
    Close,
    Expunge,
    Fetch(FetchCommand),
    Store(StoreCommand),
    Copy(CopyCommand),
    Append(AppendCommand),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogInCommand {
    pub userid: String,
    pub password: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticateCommand {
    pub mechanism: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListCommand {
    pub reference: String,
    pub pattern: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectCommand {
    pub mailbox: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusAtt {
    Messages,
    Recent,
    UidNext,
    UidValidity,
    Unseen,
}

impl StatusAtt {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "MESSAGES" => Some(StatusAtt::Messages),
            "RECENT" => Some(StatusAtt::Recent),
            "UIDNEXT" => Some(StatusAtt::UidNext),
            "UIDVALIDITY" => Some(StatusAtt::UidValidity),
            "UNSEEN" => Some(StatusAtt::Unseen),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            StatusAtt::Messages => "MESSAGES",
            StatusAtt::Recent => "RECENT",
            StatusAtt::UidNext => "UIDNEXT",
            StatusAtt::UidValidity => "UIDVALIDITY",
            StatusAtt::Unseen => "UNSEEN",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusCommand {
    pub mailbox: String,
    pub atts: Vec<StatusAtt>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchCommand {
    pub uid: bool,
    pub messages: String,
    /// The attribute list with any enclosing parentheses removed.
    pub atts: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreCommandType {
    Plus,
    Minus,
    Eq,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreCommand {
    pub uid: bool,
    pub messages: String,
    pub typ: StoreCommandType,
    pub silent: bool,
    pub flags: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CopyCommand {
    pub uid: bool,
    pub messages: String,
    pub dst: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppendCommand {
    pub mailbox: String,
    pub flags: Option<String>,
    pub date: Option<String>,
    pub size: u32,
}

/// A full response line. `tag` is `None` for untagged responses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponseLine {
    pub tag: Option<String>,
    pub response: Response,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    Cond(CondResponse),
    Capability(Vec<&'static str>),
    Exists(u32),
    Recent(u32),
    Expunge(u32),
    Flags(&'static [&'static str]),
    List(MailboxList),
    Lsub(MailboxList),
    Status(StatusResponse),
    Fetch(FetchResponse),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RespCondType {
    Ok,
    No,
    Bad,
    Bye,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RespTextCode {
    ReadOnly,
    ReadWrite,
    TryCreate,
    Unseen(u32),
    UidNext(u32),
    UidValidity(u32),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CondResponse {
    pub cond: RespCondType,
    pub code: Option<RespTextCode>,
    pub quip: Option<Cow<'static, str>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MailboxList {
    pub flags: Vec<&'static str>,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusResponse {
    pub mailbox: String,
    pub atts: Vec<(StatusAtt, u32)>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchResponse {
    pub seqnum: u32,
    pub atts: Vec<FetchAtt>,
}

/// The section of a `BODY[...]` fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BodySection {
    Full,
    Header,
    HeaderFields(Vec<String>),
    Text,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchAtt {
    Uid(u32),
    Flags(Flags, Vec<String>),
    Rfc822Size(usize),
    InternalDate(DateTime<FixedOffset>),
    Body(BodySection, String),
}

pub static HIERARCHY_DELIMITER: &str = "/";

fn write_quoted(f: &mut fmt::Formatter, s: &str) -> fmt::Result {
    write!(f, "\"")?;
    for c in s.chars() {
        if '"' == c || '\\' == c {
            write!(f, "\\")?;
        }
        write!(f, "{}", c)?;
    }
    write!(f, "\"")
}

/// Write `s` as an atom if it can be one, otherwise as a quoted string.
fn write_astring(f: &mut fmt::Formatter, s: &str) -> fmt::Result {
    let atom = !s.is_empty()
        && s.chars().all(|c| {
            c.is_ascii_graphic() && !"(){%*\"\\]".contains(c)
        });
    if atom {
        write!(f, "{}", s)
    } else {
        write_quoted(f, s)
    }
}

fn write_literal(f: &mut fmt::Formatter, data: &str) -> fmt::Result {
    write!(f, "{{{}}}\r\n{}", data.len(), data)
}

impl fmt::Display for ResponseLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.tag.as_deref().unwrap_or("*"), self.response)
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Response::Cond(ref cr) => write!(f, "{}", cr),
            Response::Capability(ref caps) => {
                write!(f, "CAPABILITY {}", caps.join(" "))
            }
            Response::Exists(n) => write!(f, "{} EXISTS", n),
            Response::Recent(n) => write!(f, "{} RECENT", n),
            Response::Expunge(n) => write!(f, "{} EXPUNGE", n),
            Response::Flags(flags) => write!(f, "FLAGS ({})", flags.join(" ")),
            Response::List(ref ml) => write!(f, "LIST {}", ml),
            Response::Lsub(ref ml) => write!(f, "LSUB {}", ml),
            Response::Status(ref sr) => {
                write!(f, "STATUS ")?;
                write_astring(f, &sr.mailbox)?;
                write!(f, " (")?;
                for (ix, &(att, value)) in sr.atts.iter().enumerate() {
                    if ix > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{} {}", att.name(), value)?;
                }
                write!(f, ")")
            }
            Response::Fetch(ref fr) => write!(f, "{}", fr),
        }
    }
}

impl fmt::Display for CondResponse {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self.cond {
                RespCondType::Ok => "OK",
                RespCondType::No => "NO",
                RespCondType::Bad => "BAD",
                RespCondType::Bye => "BYE",
            }
        )?;
        if let Some(ref code) = self.code {
            write!(f, " [{}]", code)?;
        }
        if let Some(ref quip) = self.quip {
            write!(f, " {}", quip)?;
        }
        Ok(())
    }
}

impl fmt::Display for RespTextCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            RespTextCode::ReadOnly => write!(f, "READ-ONLY"),
            RespTextCode::ReadWrite => write!(f, "READ-WRITE"),
            RespTextCode::TryCreate => write!(f, "TRYCREATE"),
            RespTextCode::Unseen(n) => write!(f, "UNSEEN {}", n),
            RespTextCode::UidNext(n) => write!(f, "UIDNEXT {}", n),
            RespTextCode::UidValidity(n) => write!(f, "UIDVALIDITY {}", n),
        }
    }
}

impl fmt::Display for MailboxList {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}) ", self.flags.join(" "))?;
        write_quoted(f, HIERARCHY_DELIMITER)?;
        write!(f, " ")?;
        write_quoted(f, &self.name)
    }
}

impl fmt::Display for FetchResponse {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} FETCH (", self.seqnum)?;
        for (ix, att) in self.atts.iter().enumerate() {
            if ix > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", att)?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for BodySection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            BodySection::Full => Ok(()),
            BodySection::Header => write!(f, "HEADER"),
            BodySection::Text => write!(f, "TEXT"),
            BodySection::HeaderFields(ref names) => {
                write!(f, "HEADER.FIELDS (")?;
                for (ix, name) in names.iter().enumerate() {
                    if ix > 0 {
                        write!(f, " ")?;
                    }
                    write_quoted(f, name)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for FetchAtt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            FetchAtt::Uid(uid) => write!(f, "UID {}", uid),
            FetchAtt::Flags(flags, ref keywords) => {
                let mut names: Vec<&str> = flags.names().collect();
                names.extend(keywords.iter().map(String::as_str));
                write!(f, "FLAGS ({})", names.join(" "))
            }
            FetchAtt::Rfc822Size(size) => write!(f, "RFC822.SIZE {}", size),
            FetchAtt::InternalDate(date) => write!(
                f,
                "INTERNALDATE \"{}\"",
                date.format("%d-%b-%Y %H:%M:%S %z")
            ),
            FetchAtt::Body(ref section, ref data) => {
                write!(f, "BODY[{}] ", section)?;
                write_literal(f, data)
            }
        }
    }
}

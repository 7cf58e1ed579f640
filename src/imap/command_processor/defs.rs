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

use std::borrow::Cow;
use std::sync::Arc;

use chrono::prelude::*;
use log::error;

use crate::account::{model::Flags, Mailbox, Mailstore};
use crate::imap::state::{Connection, State};
use crate::support::{
    error::Error, log_prefix::LogPrefix, system_config::SystemConfig,
};

pub(super) use crate::imap::syntax as s;

pub(super) static CAPABILITIES: &[&str] = &["IMAP4rev1", "AUTH=PLAIN"];

/// The flags advertised by `SELECT` and `EXAMINE`.
pub(super) static PERMANENT_FLAGS: &[&str] = &[
    "\\Answered",
    "\\Flagged",
    "\\Deleted",
    "\\Seen",
    "\\Draft",
];

/// Receives commands in the AST defined in the `syntax` module, and emits
/// responses in that same model.
///
/// It owns the connection state machine and talks to the message store only
/// through the traits in `account`. Commands that need more than one round
/// trip with the client (`AUTHENTICATE`, `APPEND`, `STARTTLS`) are split
/// into a start and a finish step which `Server` drives.
pub struct CommandProcessor {
    pub(super) log_prefix: LogPrefix,
    pub(super) system_config: Arc<SystemConfig>,
    pub(super) mailstore: Arc<dyn Mailstore>,
    pub(super) conn: Connection,

    /// Whether the server has what it needs to run STARTTLS.
    pub(super) tls_available: bool,
    pub(super) tls_active: bool,
}

/// Used just for the convenient `?` operator. We mostly don't distinguish `Ok`
/// from `Err`; the contained value is sent down the wire either way.
pub(super) type CmdResult = Result<s::Response, s::Response>;

/// Return value from an operation that can either succeed with a value, or
/// fail with an IMAP response.
pub(super) type PartialResult<T> = Result<T, s::Response>;

/// Callback used to send untagged responses ahead of the tagged one.
pub type SendResponse<'a> = &'a mut dyn FnMut(s::Response);

/// A validated `APPEND` waiting for its literal.
pub struct AppendRequest {
    pub(super) mailbox: Arc<dyn Mailbox>,
    pub(super) flags: Flags,
    pub(super) internal_date: Option<DateTime<FixedOffset>>,
}

impl CommandProcessor {
    pub fn new(
        log_prefix: LogPrefix,
        system_config: Arc<SystemConfig>,
        mailstore: Arc<dyn Mailstore>,
        tls_available: bool,
    ) -> Self {
        CommandProcessor {
            log_prefix,
            system_config,
            mailstore,
            conn: Connection::new(),
            tls_available,
            tls_active: false,
        }
    }

    pub fn logged_out(&self) -> bool {
        State::LoggedOut == self.conn.state()
    }

    pub fn log_prefix(&self) -> &LogPrefix {
        &self.log_prefix
    }

    /// Called when the transport reaches end-of-stream.
    pub fn transport_closed(&mut self) {
        self.conn.log_out();
    }
}

pub(super) fn cond(
    cond: s::RespCondType,
    code: Option<s::RespTextCode>,
    quip: impl Into<Cow<'static, str>>,
) -> s::Response {
    s::Response::Cond(s::CondResponse {
        cond,
        code,
        quip: Some(quip.into()),
    })
}

pub(super) fn success(quip: impl Into<Cow<'static, str>>) -> CmdResult {
    Ok(cond(s::RespCondType::Ok, None, quip))
}

pub(super) fn no(quip: impl Into<Cow<'static, str>>) -> s::Response {
    cond(s::RespCondType::No, None, quip)
}

pub(super) fn bad(quip: impl Into<Cow<'static, str>>) -> s::Response {
    cond(s::RespCondType::Bad, None, quip)
}

/// Convert an error from the store into a tagged `NO` carrying the error's
/// text.
pub(super) fn backend_error(
    log_prefix: &LogPrefix,
    e: Error,
    code: Option<s::RespTextCode>,
) -> s::Response {
    if let Error::Io(_) | Error::Ssl(_) = e {
        error!("{} Unhandled internal error: {}", log_prefix, e);
    }

    cond(s::RespCondType::No, code, e.to_string())
}

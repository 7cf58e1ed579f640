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

use chrono::prelude::*;
use log::info;

use super::defs::*;
use crate::account::model::Flags;
use crate::mime::header::Header;
use crate::support::error::Error;

impl CommandProcessor {
    pub(super) fn cmd_list(
        &mut self,
        cmd: s::ListCommand,
        sender: SendResponse<'_>,
    ) -> CmdResult {
        let user = self.conn.require_authenticated()?;

        if cmd.pattern.is_empty() {
            // Only asking for the hierarchy delimiter
            sender(s::Response::List(s::MailboxList {
                flags: vec!["\\Noselect"],
                name: String::new(),
            }));
        } else {
            let pattern = format!("{}{}", cmd.reference, cmd.pattern);
            let matcher = mailbox_name_matcher(&pattern);
            for mailbox in user.mailboxes() {
                if matcher(mailbox.name()) {
                    sender(s::Response::List(s::MailboxList {
                        flags: vec![],
                        name: mailbox.name().to_owned(),
                    }));
                }
            }
        }

        success("LIST completed")
    }

    pub(super) fn cmd_lsub(
        &mut self,
        cmd: s::ListCommand,
        sender: SendResponse<'_>,
    ) -> CmdResult {
        let user = self.conn.require_authenticated()?;

        // Every mailbox counts as subscribed.
        let pattern = format!("{}{}", cmd.reference, cmd.pattern);
        let matcher = mailbox_name_matcher(&pattern);
        for mailbox in user.mailboxes() {
            if matcher(mailbox.name()) {
                sender(s::Response::Lsub(s::MailboxList {
                    flags: vec![],
                    name: mailbox.name().to_owned(),
                }));
            }
        }

        success("LSUB Completed")
    }

    pub(super) fn cmd_select(
        &mut self,
        cmd: s::SelectCommand,
        sender: SendResponse<'_>,
    ) -> CmdResult {
        self.select(cmd, true, sender)?;
        Ok(cond(
            s::RespCondType::Ok,
            Some(s::RespTextCode::ReadWrite),
            "SELECT completed",
        ))
    }

    pub(super) fn cmd_examine(
        &mut self,
        cmd: s::SelectCommand,
        sender: SendResponse<'_>,
    ) -> CmdResult {
        self.select(cmd, false, sender)?;
        Ok(cond(
            s::RespCondType::Ok,
            Some(s::RespTextCode::ReadOnly),
            "EXAMINE completed",
        ))
    }

    fn select(
        &mut self,
        cmd: s::SelectCommand,
        writable: bool,
        sender: SendResponse<'_>,
    ) -> PartialResult<()> {
        let user = self.conn.require_authenticated()?;
        self.conn.unselect();

        let mailbox = user
            .mailbox_by_name(&cmd.mailbox)
            .map_err(map_error!(self))?;

        sender(s::Response::Exists(mailbox.messages()));
        sender(s::Response::Recent(mailbox.recent()));
        if let Some(unseen) = mailbox.first_unseen() {
            sender(untagged_ok(s::RespTextCode::Unseen(unseen)));
        }
        sender(untagged_ok(s::RespTextCode::UidNext(mailbox.next_uid())));
        sender(untagged_ok(s::RespTextCode::UidValidity(
            mailbox.uid_validity(),
        )));
        sender(s::Response::Flags(PERMANENT_FLAGS));

        info!(
            "{} Selected '{}' {}",
            self.log_prefix,
            mailbox.name(),
            if writable { "read-write" } else { "read-only" }
        );
        self.conn.select(mailbox, writable);
        Ok(())
    }

    pub(super) fn cmd_status(
        &mut self,
        cmd: s::StatusCommand,
        sender: SendResponse<'_>,
    ) -> CmdResult {
        let user = self.conn.require_authenticated()?;
        let mailbox = user
            .mailbox_by_name(&cmd.mailbox)
            .map_err(map_error!(self))?;

        let atts = cmd
            .atts
            .iter()
            .map(|&att| {
                let value = match att {
                    s::StatusAtt::Messages => mailbox.messages(),
                    s::StatusAtt::Recent => mailbox.recent(),
                    s::StatusAtt::UidNext => mailbox.next_uid(),
                    s::StatusAtt::UidValidity => mailbox.uid_validity(),
                    s::StatusAtt::Unseen => mailbox.unseen(),
                };
                (att, value)
            })
            .collect();

        sender(s::Response::Status(s::StatusResponse {
            mailbox: mailbox.name().to_owned(),
            atts,
        }));
        success("STATUS Completed")
    }

    pub(super) fn cmd_close(&mut self) -> CmdResult {
        let mailbox = self.conn.require_selected(false)?;
        if self.conn.writable() {
            // Implicit EXPUNGE, without the untagged responses
            mailbox.expunge_deleted().map_err(map_error!(self))?;
        }

        self.conn.unselect();
        success("CLOSE Completed")
    }

    pub(super) fn cmd_expunge(
        &mut self,
        sender: SendResponse<'_>,
    ) -> CmdResult {
        let mailbox = self.conn.require_selected(true)?;
        let expunged = mailbox.expunge_deleted().map_err(map_error!(self))?;

        // Each EXPUNGE renumbers everything after it, so later sequence
        // numbers shift down by the number already reported.
        for (ix, seqnum) in expunged.into_iter().enumerate() {
            sender(s::Response::Expunge(seqnum - ix as u32));
        }

        success("EXPUNGE completed")
    }

    /// Validate an `APPEND` before its literal is requested.
    ///
    /// On success, the server sends a continuation, reads the literal, and
    /// passes it to `append_finish`. On failure, the response is the final
    /// result and the literal is never requested.
    pub fn append_start(
        &mut self,
        cmd: &s::AppendCommand,
    ) -> PartialResult<AppendRequest> {
        let user = self.conn.require_authenticated()?;
        let mailbox = user.mailbox_by_name(&cmd.mailbox).map_err(map_error! {
            self,
            NxMailbox => Some(s::RespTextCode::TryCreate),
        })?;

        if 0 == cmd.size {
            return Err(bad("invalid length for message literal"));
        }

        if cmd.size > self.system_config.imap.max_append_size {
            return Err(no(Error::LiteralTooLarge.to_string()));
        }

        let flags = cmd
            .flags
            .as_ref()
            .map_or_else(Flags::empty, |f| Flags::parse_list(f));
        let internal_date = cmd
            .date
            .as_ref()
            .map(|date| parse_internal_date(date))
            .transpose()
            .map_err(|e| bad(e.to_string()))?;

        Ok(AppendRequest {
            mailbox,
            flags,
            internal_date,
        })
    }

    /// Store the literal of a validated `APPEND`.
    pub fn append_finish(
        &mut self,
        request: AppendRequest,
        data: &[u8],
    ) -> s::Response {
        match self.append(request, data) {
            Ok(r) => r,
            Err(r) => r,
        }
    }

    fn append(&mut self, request: AppendRequest, data: &[u8]) -> CmdResult {
        let (header, body) =
            Header::parse_message(&String::from_utf8_lossy(data));

        let mut message = request.mailbox.new_message();
        message.header = header;
        message.body = body;
        message.flags = request.flags | Flags::RECENT;
        if let Some(date) = request.internal_date {
            message.internal_date = date;
        }

        let message = request.mailbox.save(message).map_err(map_error!(self))?;
        info!(
            "{} Appended UID {} to '{}'",
            self.log_prefix,
            message.uid,
            request.mailbox.name()
        );
        success("APPEND completed")
    }
}

fn untagged_ok(code: s::RespTextCode) -> s::Response {
    s::Response::Cond(s::CondResponse {
        cond: s::RespCondType::Ok,
        code: Some(code),
        quip: None,
    })
}

/// Parse an IMAP `date-time`, e.g. `28-Oct-2014 00:09:00 +0700`.
///
/// Single-digit days may be space-padded.
fn parse_internal_date(s: &str) -> Result<DateTime<FixedOffset>, Error> {
    DateTime::parse_from_str(s.trim_start(), "%d-%b-%Y %H:%M:%S %z")
        .map_err(|_| Error::InvalidDate)
}

/// Build a predicate for a `LIST` pattern.
///
/// `*` matches anything; `%` matches anything but the hierarchy delimiter.
fn mailbox_name_matcher(pattern: &str) -> impl Fn(&str) -> bool {
    let mut rx = "^".to_owned();
    let mut start = 0;
    for (ix, wildcard) in pattern.match_indices(|c| '%' == c || '*' == c) {
        rx.push_str(&regex::escape(&pattern[start..ix]));
        rx.push_str(if "*" == wildcard { ".*" } else { "[^/]*" });
        start = ix + 1;
    }
    rx.push_str(&regex::escape(&pattern[start..]));
    rx.push('$');

    let rx = regex::Regex::new(&rx).expect("Built invalid regex?");
    move |s| rx.is_match(s)
}

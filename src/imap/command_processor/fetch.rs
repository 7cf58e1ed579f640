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

use super::defs::*;
use crate::account::model::{Flags, SeqSet};
use crate::imap::fetch::{AttributeRegistry, FetchTarget};

impl CommandProcessor {
    pub(super) fn cmd_fetch(
        &mut self,
        cmd: s::FetchCommand,
        sender: SendResponse<'_>,
    ) -> CmdResult {
        let mailbox = self.conn.require_selected(false)?;
        let set =
            SeqSet::parse(&cmd.messages).map_err(|e| no(e.to_string()))?;

        // Every attribute must be understood before anything is sent
        let mut targets = AttributeRegistry::shared()
            .parse(&cmd.atts)
            .map_err(|e| bad(e.to_string()))?;
        if cmd.uid && !targets.contains(&FetchTarget::Uid) {
            targets.push(FetchTarget::Uid);
        }

        let messages = if cmd.uid {
            mailbox.message_set_by_uid(&set)
        } else {
            mailbox.message_set_by_seqnum(&set)
        };

        let mark_seen = self.conn.writable()
            && targets.iter().any(FetchTarget::marks_seen);

        for message in messages {
            sender(s::Response::Fetch(s::FetchResponse {
                seqnum: message.seqnum,
                atts: targets.iter().map(|t| t.render(&message)).collect(),
            }));

            if mark_seen
                && (!message.has_flags(Flags::SEEN)
                    || message.has_flags(Flags::RECENT))
            {
                let message =
                    message.add_flags(Flags::SEEN).remove_flags(Flags::RECENT);
                mailbox.save(message).map_err(map_error!(self))?;
            }
        }

        success(if cmd.uid {
            "UID FETCH Completed"
        } else {
            "FETCH Completed"
        })
    }
}

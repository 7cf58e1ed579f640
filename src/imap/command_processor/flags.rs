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
use crate::imap::fetch::FetchTarget;

impl CommandProcessor {
    pub(super) fn cmd_store(
        &mut self,
        cmd: s::StoreCommand,
        sender: SendResponse<'_>,
    ) -> CmdResult {
        let mailbox = self.conn.require_selected(true)?;
        let set =
            SeqSet::parse(&cmd.messages).map_err(|e| no(e.to_string()))?;
        let flags = Flags::parse_list(&cmd.flags);

        let messages = if cmd.uid {
            mailbox.message_set_by_uid(&set)
        } else {
            mailbox.message_set_by_seqnum(&set)
        };

        // A failure part way through leaves earlier messages updated.
        for message in messages {
            let message = match cmd.typ {
                s::StoreCommandType::Plus => message.add_flags(flags),
                s::StoreCommandType::Minus => message.remove_flags(flags),
                s::StoreCommandType::Eq => message.overwrite_flags(flags),
            };
            let message = mailbox.save(message).map_err(map_error!(self))?;

            if !cmd.silent {
                sender(s::Response::Fetch(s::FetchResponse {
                    seqnum: message.seqnum,
                    atts: vec![FetchTarget::Flags.render(&message)],
                }));
            }
        }

        success("STORE Completed")
    }
}

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

use log::info;

use super::defs::*;
use crate::account::model::{Flags, SeqSet};
use crate::support::error::Error;

impl CommandProcessor {
    pub(super) fn cmd_copy(&mut self, cmd: s::CopyCommand) -> CmdResult {
        let src = self.conn.require_selected(false)?;
        let user = self.conn.require_authenticated()?;
        let dst = user.mailbox_by_name(&cmd.dst).map_err(map_error! {
            self,
            NxMailbox => Some(s::RespTextCode::TryCreate),
        })?;

        let set =
            SeqSet::parse(&cmd.messages).map_err(|e| no(e.to_string()))?;
        let messages = if cmd.uid {
            src.message_set_by_uid(&set)
        } else {
            src.message_set_by_seqnum(&set)
        };

        if messages.is_empty() {
            return Err(no("no messages found"));
        }

        for message in &messages {
            let mut copy = dst.new_message();
            copy.header = message.header.clone();
            copy.body = message.body.clone();
            copy.internal_date = message.internal_date;
            copy.flags = message.flags | Flags::RECENT;
            copy.keywords = message.keywords.clone();
            dst.save(copy).map_err(map_error!(self))?;
        }

        info!(
            "{} Copied {} message(s) from '{}' to '{}'",
            self.log_prefix,
            messages.len(),
            src.name(),
            dst.name()
        );

        success(if cmd.uid {
            "UID COPY Completed"
        } else {
            "COPY Completed"
        })
    }
}

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
use crate::support::error::Error;

impl CommandProcessor {
    /// Return the greeting line to send to the client.
    ///
    /// Fails if the greeting has already been sent on this connection.
    pub fn greet(&mut self) -> Result<s::ResponseLine, Error> {
        self.conn.greet()?;
        Ok(s::ResponseLine {
            tag: None,
            response: cond(
                s::RespCondType::Ok,
                None,
                "IMAP4rev1 Service Ready",
            ),
        })
    }

    /// Handles a regular command, i.e., one that the protocol level does not
    /// give special treatment to.
    ///
    /// `sender` is called with untagged responses as they are produced.
    ///
    /// Returns the final, tagged response.
    pub fn handle_command(
        &mut self,
        command_line: s::CommandLine,
        sender: SendResponse<'_>,
    ) -> s::ResponseLine {
        let res = match command_line.cmd {
            s::Command::Capability => self.cmd_capability(sender),
            s::Command::Noop => success("NOOP completed"),
            s::Command::LogOut => self.cmd_log_out(sender),
            s::Command::StartTls => self.cmd_start_tls(),
            s::Command::LogIn(cmd) => self.cmd_log_in(cmd),
            s::Command::List(cmd) => self.cmd_list(cmd, sender),
            s::Command::Lsub(cmd) => self.cmd_lsub(cmd, sender),
            s::Command::Select(cmd) => self.cmd_select(cmd, sender),
            s::Command::Examine(cmd) => self.cmd_examine(cmd, sender),
            s::Command::Status(cmd) => self.cmd_status(cmd, sender),
            s::Command::Close => self.cmd_close(),
            s::Command::Expunge => self.cmd_expunge(sender),
            s::Command::Fetch(cmd) => self.cmd_fetch(cmd, sender),
            s::Command::Store(cmd) => self.cmd_store(cmd, sender),
            s::Command::Copy(cmd) => self.cmd_copy(cmd),
            s::Command::Authenticate(..) => {
                panic!("AUTHENTICATE should be dispatched by server.rs")
            }
            s::Command::Append(..) => {
                panic!("APPEND should be dispatched by server.rs")
            }
        };

        let response = match res {
            Ok(r) => r,
            Err(r) => r,
        };

        s::ResponseLine {
            tag: Some(command_line.tag),
            response,
        }
    }

    fn cmd_capability(&mut self, sender: SendResponse<'_>) -> CmdResult {
        let mut caps = CAPABILITIES.to_vec();
        if self.tls_available && !self.tls_active {
            caps.push("STARTTLS");
        }

        sender(s::Response::Capability(caps));
        success("CAPABILITY completed")
    }

    fn cmd_log_out(&mut self, sender: SendResponse<'_>) -> CmdResult {
        info!("{} Logging out", self.log_prefix);
        sender(cond(
            s::RespCondType::Bye,
            None,
            "IMAP4rev1 server logging out",
        ));
        self.conn.log_out();
        success("LOGOUT completed")
    }

    fn cmd_start_tls(&mut self) -> CmdResult {
        if self.tls_active {
            return Err(bad("Already secure."));
        }

        if !self.tls_available {
            return Err(bad("STARTTLS not enabled."));
        }

        success("Begin TLS negotiation now")
    }

    /// Called once the TLS handshake following `STARTTLS` has succeeded.
    pub fn tls_started(&mut self) {
        self.tls_active = true;
        self.log_prefix.set_tls();
        info!("{} TLS established", self.log_prefix);
    }
}

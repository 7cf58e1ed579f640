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

use log::{info, warn};

use super::defs::*;
use crate::imap::state::State;
use crate::support::error::Error;

impl CommandProcessor {
    pub(super) fn cmd_log_in(&mut self, cmd: s::LogInCommand) -> CmdResult {
        match self.conn.state() {
            State::Authenticated | State::Selected => {
                return Err(bad("Already authenticated"))
            }
            _ => (),
        }

        let user = self
            .mailstore
            .authenticate(&cmd.userid, &cmd.password)
            .map_err(|e| {
                warn!(
                    "{} Rejected login for '{}': {}",
                    self.log_prefix, cmd.userid, e
                );
                no(e.to_string())
            })?;

        self.log_prefix.set_user(user.name().to_owned());
        info!("{} Login successful", self.log_prefix);
        self.conn.log_in(user);
        success("Authenticated")
    }

    /// Called when a line initiating an `AUTHENTICATE` is received.
    ///
    /// If this returns `Some`, that response is sent to the client as the
    /// final result. If it returns `None`, the server sends a continuation
    /// line to the client and the next line is fed to `authenticate_finish`.
    pub fn authenticate_start(
        &mut self,
        cmd: &s::AuthenticateCommand,
    ) -> Option<s::Response> {
        if let State::Authenticated | State::Selected = self.conn.state() {
            return Some(bad("Already authenticated"));
        }

        if "plain".eq_ignore_ascii_case(&cmd.mechanism) {
            None
        } else {
            Some(no("Unsupported authentication mechanism"))
        }
    }

    /// Complete a `PLAIN` exchange with the client's response line.
    pub fn authenticate_finish(&mut self, data: &[u8]) -> s::Response {
        if b"*" == data {
            return bad("AUTHENTICATE aborted");
        }

        let decoded = match base64::decode(data)
            .ok()
            .and_then(|decoded| String::from_utf8(decoded).ok())
        {
            Some(s) => s,
            None => return bad("Invalid auth details"),
        };

        // RFC 4616: [authzid] NUL authcid NUL passwd
        let mut parts = decoded.split('\x00');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(_), Some(userid), Some(password), None) => {
                match self.cmd_log_in(s::LogInCommand {
                    userid: userid.to_owned(),
                    password: password.to_owned(),
                }) {
                    Ok(r) => r,
                    Err(r) => r,
                }
            }
            _ => no(Error::BadCredentials.to_string()),
        }
    }
}

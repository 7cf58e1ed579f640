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

//! Connection lifecycle and the guards every command handler goes through.

use std::borrow::Cow;
use std::sync::Arc;

use crate::account::{Mailbox, User};
use crate::support::error::Error;

use super::syntax as s;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    /// Nothing has been sent yet.
    New,
    /// The greeting has been sent.
    NotAuthenticated,
    Authenticated,
    Selected,
    LoggedOut,
}

/// The per-connection protocol state.
///
/// `user` is present exactly when the state is `Authenticated` or `Selected`;
/// `selected` exactly when it is `Selected`. Entering any state clears
/// `writable`; only a read-write selection sets it again.
pub struct Connection {
    state: State,
    writable: bool,
    user: Option<Arc<dyn User>>,
    selected: Option<Arc<dyn Mailbox>>,
}

fn guard_failure(
    cond: s::RespCondType,
    quip: &'static str,
) -> s::Response {
    s::Response::Cond(s::CondResponse {
        cond,
        code: None,
        quip: Some(Cow::Borrowed(quip)),
    })
}

impl Connection {
    pub fn new() -> Self {
        Connection {
            state: State::New,
            writable: false,
            user: None,
            selected: None,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn writable(&self) -> bool {
        self.writable
    }

    fn set_state(&mut self, state: State) {
        self.state = state;
        self.writable = false;
    }

    /// Move out of `New`. This may only happen once.
    pub fn greet(&mut self) -> Result<(), Error> {
        if State::New != self.state {
            return Err(Error::GreetingAlreadySent);
        }

        self.set_state(State::NotAuthenticated);
        Ok(())
    }

    pub fn log_in(&mut self, user: Arc<dyn User>) {
        self.user = Some(user);
        self.selected = None;
        self.set_state(State::Authenticated);
    }

    pub fn select(&mut self, mailbox: Arc<dyn Mailbox>, writable: bool) {
        self.selected = Some(mailbox);
        self.set_state(State::Selected);
        self.writable = writable;
    }

    /// Drop any selected mailbox, returning to `Authenticated`.
    pub fn unselect(&mut self) {
        if State::Selected == self.state {
            self.selected = None;
            self.set_state(State::Authenticated);
        }
    }

    pub fn log_out(&mut self) {
        self.selected = None;
        self.user = None;
        self.set_state(State::LoggedOut);
    }

    /// Fail with `BAD not authenticated` unless a user is logged in.
    pub fn require_authenticated(
        &self,
    ) -> Result<Arc<dyn User>, s::Response> {
        match self.state {
            State::Authenticated | State::Selected => match self.user {
                Some(ref user) => Ok(Arc::clone(user)),
                None => panic!("In authenticated state but no user is set"),
            },
            _ => Err(guard_failure(
                s::RespCondType::Bad,
                "not authenticated",
            )),
        }
    }

    /// Fail unless a mailbox is selected and, if `need_write`, it was
    /// selected read-write.
    pub fn require_selected(
        &self,
        need_write: bool,
    ) -> Result<Arc<dyn Mailbox>, s::Response> {
        self.require_authenticated()?;
        if State::Selected != self.state {
            return Err(guard_failure(s::RespCondType::Bad, "not selected"));
        }

        let mailbox = match self.selected {
            Some(ref mailbox) => Arc::clone(mailbox),
            None => panic!("In selected state but no selected mailbox is set"),
        };

        if need_write && !self.writable {
            return Err(guard_failure(
                s::RespCondType::No,
                "Selected mailbox is read-only",
            ));
        }

        Ok(mailbox)
    }
}

impl Default for Connection {
    fn default() -> Self {
        Connection::new()
    }
}

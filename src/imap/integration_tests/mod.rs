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

//! The integration tests are "full-stack" tests which run the real server
//! over a real TCP socket and talk to it the way a mail client would.
//!
//! Every test starts its own listener on an ephemeral port, backed by a
//! fresh demonstration store, so tests are free to mutate their mailboxes
//! without coordinating with each other. The listener threads are never
//! stopped; they simply die with the test process.

mod defs;

mod bad_commands;
mod fetch;
mod literal;
mod mailboxes;
mod messages;
mod tls;

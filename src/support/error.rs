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

use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid sequence range string '{0}' specified")]
    InvalidSequenceRange(String),
    #[error("Invalid sequence set string '{0}' specified")]
    InvalidSequenceSet(String),
    #[error("Sequence number has no value")]
    NoSequenceValue,
    #[error("Unrecognised Parameter")]
    UnrecognisedParameter(String),
    #[error("Incorrect username/password")]
    BadCredentials,
    #[error("No such mailbox")]
    NxMailbox,
    #[error("No such message")]
    NxMessage,
    #[error("Invalid date-time")]
    InvalidDate,
    #[error("Literal too large")]
    LiteralTooLarge,
    #[error("Welcome already sent")]
    GreetingAlreadySent,
    #[error("TLS handshake failed: {0}")]
    TlsHandshake(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Ssl(#[from] openssl::error::ErrorStack),
}

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

#[test]
fn unknown_commands() {
    let mut client = ImapClient::new("bad_commands_unknown");

    client.expect("a1 XYZZY", "a1 BAD Command not understood");
    client.expect("a2 FETCH", "a2 BAD Command not understood");
    client.expect(
        "a3 STATUS INBOX (SIZE)",
        "a3 BAD Command not understood",
    );
    assert_eq!(
        vec!["* BAD Command not understood"],
        client.command("*")
    );

    // The connection is still usable afterwards
    client.expect("a4 NOOP", "a4 OK NOOP completed");
}

#[test]
fn state_guards() {
    let mut client = ImapClient::logged_in("bad_commands_state_guards");

    client.expect("a1 FETCH 1 FLAGS", "a1 BAD not selected");
    client.expect("a2 STORE 1 +FLAGS (\\Seen)", "a2 BAD not selected");
    client.expect("a3 COPY 1 Trash", "a3 BAD not selected");
    client.expect("a4 EXPUNGE", "a4 BAD not selected");
    client.expect("a5 CLOSE", "a5 BAD not selected");

    client.expect_like("a6 EXAMINE INBOX", "a6 OK [READ-ONLY]");
    client.expect("a7 EXPUNGE", "a7 NO Selected mailbox is read-only");
    client.expect(
        "a8 STORE 1 FLAGS (\\Seen)",
        "a8 NO Selected mailbox is read-only",
    );
}

#[test]
fn over_long_command_line() {
    let mut client = ImapClient::new("bad_commands_over_long_line");

    let line = format!("a1 NOOP {}\r\n", "x".repeat(70_000));
    client.write_line(&line);
    assert_eq!(
        vec!["* BAD Command line too long"],
        client.read_responses(None)
    );

    client.expect("a2 NOOP", "a2 OK NOOP completed");
}

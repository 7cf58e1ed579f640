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
fn fetch_simple_attributes() {
    let mut client = ImapClient::selected("fetch_simple_attributes");

    assert_eq!(
        vec![
            "* 1 FETCH (FLAGS (\\Recent) UID 10)",
            "* 2 FETCH (FLAGS (\\Recent) UID 11)",
            "* 3 FETCH (FLAGS (\\Recent) UID 12)",
            "a1 OK FETCH Completed"
        ],
        client.command("a1 FETCH 1:* (FLAGS UID)")
    );
    assert_eq!(
        vec!["* 3 FETCH (UID 12 RFC822.SIZE 131)", "a2 OK FETCH Completed"],
        client.command("a2 FETCH * (UID RFC822.SIZE)")
    );
    assert_eq!(
        vec![
            "* 2 FETCH (FLAGS (\\Recent) UID 11)",
            "a3 OK UID FETCH Completed"
        ],
        client.command("a3 UID FETCH 11 FLAGS")
    );
}

#[test]
fn fetch_literals() {
    let mut client = ImapClient::selected("fetch_literals");

    assert_eq!(
        vec![
            "* 3 FETCH (BODY[HEADER.FIELDS (\"Subject\")] \
             {23}\r\nSubject: Last email\r\n\r\n)",
            "a1 OK FETCH Completed"
        ],
        client.command("a1 FETCH 3 BODY.PEEK[HEADER.FIELDS (Subject)]")
    );
    assert_eq!(
        "* 1 FETCH (FLAGS (\\Recent))",
        client.command("a2 FETCH 1 FLAGS")[0]
    );

    assert_eq!(
        vec![
            "* 1 FETCH (BODY[TEXT] {24}\r\nTest email\r\nRegards,\r\nMe)",
            "a3 OK FETCH Completed"
        ],
        client.command("a3 FETCH 1 BODY[TEXT]")
    );
    assert_eq!(
        "* 1 FETCH (FLAGS (\\Seen))",
        client.command("a4 FETCH 1 FLAGS")[0]
    );
}

#[test]
fn fetch_errors() {
    let mut client = ImapClient::selected("fetch_errors");

    client.expect(
        "a1 FETCH 1 (UID BODYSTRUCTURE)",
        "a1 BAD Unrecognised Parameter",
    );
    client.expect(
        "a2 FETCH 1:2:3 UID",
        "a2 NO Invalid sequence set string '1:2:3' specified",
    );
    client.expect("a3 FETCH 4:* UID", "a3 OK FETCH Completed");
}

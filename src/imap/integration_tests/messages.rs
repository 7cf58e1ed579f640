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
fn store_flags() {
    let mut client = ImapClient::selected("messages_store_flags");

    assert_eq!(
        vec![
            "* 1 FETCH (FLAGS (\\Seen \\Flagged \\Recent))",
            "* 2 FETCH (FLAGS (\\Seen \\Flagged \\Recent))",
            "a1 OK STORE Completed"
        ],
        client.command("a1 STORE 1:2 +FLAGS (\\Seen \\Flagged)")
    );
    assert_eq!(
        vec![
            "* 2 FETCH (FLAGS (\\Flagged \\Recent))",
            "a2 OK STORE Completed"
        ],
        client.command("a2 UID STORE 11 -FLAGS (\\Seen)")
    );
    assert_eq!(
        vec!["* 3 FETCH (FLAGS (\\Answered))", "a3 OK STORE Completed"],
        client.command("a3 STORE 3 FLAGS (\\Answered)")
    );
    client.expect(
        "a4 STORE 1 FLAGS.SILENT (\\Draft)",
        "a4 OK STORE Completed",
    );
    assert_eq!(
        vec!["* 1 FETCH (FLAGS (\\Draft))", "a5 OK FETCH Completed"],
        client.command("a5 FETCH 1 FLAGS")
    );
}

#[test]
fn copy_messages() {
    let mut client = ImapClient::selected("messages_copy_messages");

    client.expect(
        "a1 STORE 2 +FLAGS.SILENT (\\Flagged)",
        "a1 OK STORE Completed",
    );
    client.expect("a2 COPY 1:2 Trash", "a2 OK COPY Completed");
    client.expect("a3 UID COPY 12 \"Trash\"", "a3 OK UID COPY Completed");
    client.expect("a4 COPY 1 Nowhere", "a4 NO [TRYCREATE] No such mailbox");
    client.expect("a5 UID COPY 1:9 Trash", "a5 NO no messages found");

    client.expect_like("a6 EXAMINE Trash", "a6 OK [READ-ONLY]");
    assert_eq!(
        vec![
            "* 1 FETCH (FLAGS (\\Recent) UID 1 \
             BODY[HEADER.FIELDS (\"Subject\")] \
             {23}\r\nSubject: Test email\r\n\r\n)",
            "* 2 FETCH (FLAGS (\\Flagged \\Recent) UID 2 \
             BODY[HEADER.FIELDS (\"Subject\")] \
             {31}\r\nSubject: Another test email\r\n\r\n)",
            "* 3 FETCH (FLAGS (\\Recent) UID 3 \
             BODY[HEADER.FIELDS (\"Subject\")] \
             {23}\r\nSubject: Last email\r\n\r\n)",
            "a7 OK FETCH Completed"
        ],
        client.command(
            "a7 FETCH 1:* (FLAGS UID BODY.PEEK[HEADER.FIELDS (Subject)])"
        )
    );
}

#[test]
fn copy_from_read_only_mailbox() {
    let mut client = ImapClient::logged_in("messages_copy_read_only");

    client.expect_like("a1 EXAMINE INBOX", "a1 OK [READ-ONLY]");
    client.expect("a2 COPY 1 Trash", "a2 OK COPY Completed");
    assert_eq!(
        vec!["* STATUS Trash (MESSAGES 1)", "a3 OK STATUS Completed"],
        client.command("a3 STATUS Trash (MESSAGES)")
    );
}

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
fn list_and_lsub() {
    let mut client = ImapClient::logged_in("mailboxes_list_and_lsub");

    assert_eq!(
        vec!["* LIST (\\Noselect) \"/\" \"\"", "a1 OK LIST completed"],
        client.command("a1 LIST \"\" \"\"")
    );
    assert_eq!(
        vec![
            "* LIST () \"/\" \"INBOX\"",
            "* LIST () \"/\" \"Trash\"",
            "a2 OK LIST completed"
        ],
        client.command("a2 LIST \"\" *")
    );
    assert_eq!(
        vec!["* LIST () \"/\" \"Trash\"", "a3 OK LIST completed"],
        client.command("a3 LIST \"\" T%")
    );
    assert_eq!(
        vec!["a4 OK LIST completed"],
        client.command("a4 LIST \"\" Nowhere")
    );
    assert_eq!(
        vec![
            "* LSUB () \"/\" \"INBOX\"",
            "* LSUB () \"/\" \"Trash\"",
            "a5 OK LSUB Completed"
        ],
        client.command("a5 LSUB \"\" *")
    );
}

#[test]
fn select_and_examine() {
    let mut client = ImapClient::logged_in("mailboxes_select_and_examine");

    assert_eq!(
        vec![
            "* 3 EXISTS",
            "* 3 RECENT",
            "* OK [UNSEEN 1]",
            "* OK [UIDNEXT 13]",
            "* OK [UIDVALIDITY 250]",
            "* FLAGS (\\Answered \\Flagged \\Deleted \\Seen \\Draft)",
            "a1 OK [READ-WRITE] SELECT completed"
        ],
        client.command("a1 SELECT INBOX")
    );

    let responses = client.command("a2 EXAMINE Trash");
    assert_eq!(
        vec![
            "* 0 EXISTS",
            "* 0 RECENT",
            "* OK [UIDNEXT 1]",
            "* OK [UIDVALIDITY 250]",
            "* FLAGS (\\Answered \\Flagged \\Deleted \\Seen \\Draft)",
            "a2 OK [READ-ONLY] EXAMINE completed"
        ],
        responses
    );

    client.expect(
        "a3 STORE 1 +FLAGS (\\Seen)",
        "a3 NO Selected mailbox is read-only",
    );
    client.expect_like("a4 SELECT Nowhere", "a4 NO");
    // A failed SELECT leaves no mailbox selected
    client.expect("a5 FETCH 1 FLAGS", "a5 BAD not selected");
}

#[test]
fn status() {
    let mut client = ImapClient::logged_in("mailboxes_status");

    assert_eq!(
        vec![
            "* STATUS INBOX (UNSEEN 3 UIDNEXT 13 MESSAGES 3)",
            "a1 OK STATUS Completed"
        ],
        client.command("a1 STATUS INBOX (UNSEEN UIDNEXT MESSAGES)")
    );
    assert_eq!(
        vec![
            "* STATUS Trash (RECENT 0 UIDVALIDITY 250)",
            "a2 OK STATUS Completed"
        ],
        client.command("a2 STATUS Trash (RECENT UIDVALIDITY)")
    );
    client.expect_like("a3 STATUS Nowhere (MESSAGES)", "a3 NO");
}

#[test]
fn expunge_and_close() {
    let mut client = ImapClient::selected("mailboxes_expunge_and_close");

    client.expect_like("a1 STORE 1:2 +FLAGS.SILENT (\\Deleted)", "a1 OK");
    assert_eq!(
        vec!["* 1 EXPUNGE", "* 1 EXPUNGE", "a2 OK EXPUNGE completed"],
        client.command("a2 EXPUNGE")
    );
    assert_eq!(
        vec!["* 1 FETCH (UID 12)", "a3 OK FETCH Completed"],
        client.command("a3 FETCH 1:* UID")
    );

    client.expect_like("a4 STORE 1 +FLAGS.SILENT (\\Deleted)", "a4 OK");
    client.expect("a5 CLOSE", "a5 OK CLOSE Completed");
    assert_eq!(
        vec!["* STATUS INBOX (MESSAGES 0)", "a6 OK STATUS Completed"],
        client.command("a6 STATUS INBOX (MESSAGES)")
    );
    client.expect("a7 CLOSE", "a7 BAD not selected");
}

#[test]
fn close_after_examine_keeps_deleted() {
    let mut client = ImapClient::selected("mailboxes_close_after_examine");

    client.expect_like("a1 STORE 1 +FLAGS.SILENT (\\Deleted)", "a1 OK");
    client.expect_like("a2 EXAMINE INBOX", "a2 OK [READ-ONLY]");
    client.expect("a3 CLOSE", "a3 OK CLOSE Completed");
    assert_eq!(
        vec!["* STATUS INBOX (MESSAGES 3)", "a4 OK STATUS Completed"],
        client.command("a4 STATUS INBOX (MESSAGES)")
    );
}

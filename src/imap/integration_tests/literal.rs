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

fn append(
    client: &mut ImapClient,
    tag: &str,
    prefix: &str,
    data: &str,
    suffix: &str,
) -> Vec<String> {
    let responses =
        client.command(&format!("{} {} {{{}}}", tag, prefix, data.len()));
    assert_eq!(vec!["+ Ready for literal data"], responses);

    client.write_raw(data.as_bytes());
    client.write_line(&format!("{}\r\n", suffix));
    client.read_responses(Some(tag))
}

#[test]
fn append_message() {
    let mut client = ImapClient::logged_in("literal_append_message");

    let data = "From: me@test.com\r\nSubject: Hi\r\n\r\nHello there";
    assert_eq!(
        vec!["a1 OK APPEND completed"],
        append(
            &mut client,
            "a1",
            "APPEND Trash (\\Seen) \"01-Feb-2020 10:11:12 +0100\"",
            data,
            ""
        )
    );

    let responses = client.command("a2 SELECT Trash");
    assert_eq!("* 1 EXISTS", responses[0]);
    assert_eq!("* 1 RECENT", responses[1]);
    assert!(!responses.iter().any(|r| r.contains("UNSEEN")));

    assert_eq!(
        vec![
            "* 1 FETCH (FLAGS (\\Seen \\Recent) \
             INTERNALDATE \"01-Feb-2020 10:11:12 +0100\" \
             BODY[HEADER.FIELDS (\"Subject\")] {15}\r\nSubject: Hi\r\n\r\n)",
            "a3 OK FETCH Completed"
        ],
        client.command(
            "a3 FETCH 1 (FLAGS INTERNALDATE BODY.PEEK[HEADER.FIELDS (Subject)])"
        )
    );
    assert_eq!(
        vec![
            format!("* 1 FETCH (BODY[] {{{}}}\r\n{})", data.len(), data),
            "a4 OK FETCH Completed".to_owned()
        ],
        client.command("a4 FETCH 1 BODY.PEEK[]")
    );
}

#[test]
fn append_without_options() {
    let mut client = ImapClient::logged_in("literal_append_without_options");

    assert_eq!(
        vec!["a1 OK APPEND completed"],
        append(&mut client, "a1", "APPEND INBOX", "Subject: x\r\n\r\ny", "")
    );
    assert_eq!(
        vec![
            "* STATUS INBOX (MESSAGES 4 UIDNEXT 14)",
            "a2 OK STATUS Completed"
        ],
        client.command("a2 STATUS INBOX (MESSAGES UIDNEXT)")
    );
}

#[test]
fn append_rejections() {
    let mut client = ImapClient::logged_in("literal_append_rejections");

    client.expect(
        "a1 APPEND Nowhere {5}",
        "a1 NO [TRYCREATE] No such mailbox",
    );
    client.expect(
        "a2 APPEND Trash {0}",
        "a2 BAD invalid length for message literal",
    );
    client.expect("a3 APPEND Trash {100000000}", "a3 NO Literal too large");
    client.expect(
        "a4 APPEND Trash \"yesterday\" {5}",
        "a4 BAD Invalid date-time",
    );

    assert_eq!(
        vec!["a5 BAD Unexpected data after APPEND literal"],
        append(&mut client, "a5", "APPEND Trash", "hello", " junk")
    );
    assert_eq!(
        vec!["* STATUS Trash (MESSAGES 0)", "a6 OK STATUS Completed"],
        client.command("a6 STATUS Trash (MESSAGES)")
    );
}

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
fn starttls_not_offered_without_tls() {
    let mut client = ImapClient::new("tls_not_offered");

    client.expect("a1 STARTTLS", "a1 BAD STARTTLS not enabled.");
    client.expect("a2 NOOP", "a2 OK NOOP completed");
}

#[test]
fn starttls_then_log_in() {
    let mut client = ImapClient::connect("tls_then_log_in", start_server(true));
    client.skip_greeting();

    assert_eq!(
        vec![
            "* CAPABILITY IMAP4rev1 AUTH=PLAIN STARTTLS",
            "a1 OK CAPABILITY completed"
        ],
        client.command("a1 CAPABILITY")
    );
    client.expect("a2 STARTTLS", "a2 OK Begin TLS negotiation now");
    client.start_tls();

    assert_eq!(
        vec!["* CAPABILITY IMAP4rev1 AUTH=PLAIN", "a3 OK CAPABILITY completed"],
        client.command("a3 CAPABILITY")
    );
    client.expect("a4 STARTTLS", "a4 BAD Already secure.");

    client.expect("a5 LOGIN username password", "a5 OK Authenticated");
    client.expect_like("a6 SELECT INBOX", "a6 OK [READ-WRITE]");
    assert_eq!(
        vec!["* 2 FETCH (UID 11)", "a7 OK FETCH Completed"],
        client.command("a7 FETCH 2 UID")
    );
}

#[test]
fn cleartext_pipelined_after_starttls_is_rejected() {
    let mut client =
        ImapClient::connect("tls_pipelined_cleartext", start_server(true));
    client.skip_greeting();

    client.write_line("a1 STARTTLS\r\na2 LOGIN username password\r\n");
    assert_eq!(
        "a1 OK Begin TLS negotiation now\r\n\
         * BYE Unexpected data after STARTTLS\r\n",
        client.read_to_eof()
    );
}

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

use std::io::{self, BufRead, Read, Write};
use std::mem;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use lazy_static::lazy_static;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::ssl::{SslAcceptor, SslConnector, SslMethod, SslVerifyMode};

use crate::account::memory::InMemoryStore;
use crate::cli::serve::serve_connections;
use crate::support::system_config::SystemConfig;

lazy_static! {
    static ref CERTIFICATE_PRIVATE_KEY: PKey<Private> =
        PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap();
    static ref CERTIFICATE: openssl::x509::X509 = {
        let mut builder = openssl::x509::X509Builder::new().unwrap();
        builder.set_pubkey(&CERTIFICATE_PRIVATE_KEY).unwrap();
        builder.set_version(2).unwrap();
        builder
            .set_not_before(&openssl::asn1::Asn1Time::from_unix(0).unwrap())
            .unwrap();
        builder
            .set_not_after(&openssl::asn1::Asn1Time::days_from_now(2).unwrap())
            .unwrap();
        builder
            .sign(
                &CERTIFICATE_PRIVATE_KEY,
                openssl::hash::MessageDigest::sha256(),
            )
            .unwrap();
        builder.build()
    };
}

fn ssl_acceptor() -> SslAcceptor {
    let mut ssl_acceptor =
        SslAcceptor::mozilla_intermediate_v5(SslMethod::tls_server()).unwrap();
    ssl_acceptor
        .set_private_key(&CERTIFICATE_PRIVATE_KEY)
        .unwrap();
    ssl_acceptor.set_certificate(&CERTIFICATE).unwrap();
    ssl_acceptor.build()
}

/// Start a server over a fresh demonstration store, returning the address
/// it listens on.
///
/// If `tls` is true, `STARTTLS` is offered with a throw-away self-signed
/// certificate.
pub fn start_server(tls: bool) -> SocketAddr {
    crate::init_test_log();

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let system_config = Arc::new(SystemConfig {
        demo: true,
        ..SystemConfig::default()
    });
    let mailstore =
        Arc::new(InMemoryStore::demo(system_config.imap.uid_validity));
    let ssl_acceptor = if tls {
        Some(Arc::new(ssl_acceptor()))
    } else {
        None
    };

    thread::spawn(move || {
        serve_connections(listener, system_config, mailstore, ssl_acceptor)
    });

    addr
}

pub trait ReadWrite: Read + Write {}
impl<T: Read + Write + ?Sized> ReadWrite for T {}

pub struct ImapClient {
    name: &'static str,
    io: Box<dyn ReadWrite>,
}

impl ImapClient {
    pub fn connect(name: &'static str, addr: SocketAddr) -> Self {
        Self {
            name,
            io: Box::new(TcpStream::connect(addr).unwrap()),
        }
    }

    /// Connect to a fresh plaintext server and consume the greeting.
    pub fn new(name: &'static str) -> Self {
        let mut client = Self::connect(name, start_server(false));
        client.skip_greeting();
        client
    }

    /// Like `new`, but also log in as the demonstration user.
    pub fn logged_in(name: &'static str) -> Self {
        let mut client = Self::new(name);
        client.expect("a0 LOGIN username password", "a0 OK Authenticated");
        client
    }

    /// Like `logged_in`, but also select `INBOX` read-write.
    pub fn selected(name: &'static str) -> Self {
        let mut client = Self::logged_in(name);
        client.expect_like("a0 SELECT INBOX", "a0 OK [READ-WRITE]");
        client
    }

    pub fn skip_greeting(&mut self) {
        let greeting = self.read_responses(None);
        assert_eq!(vec!["* OK IMAP4rev1 Service Ready"], greeting);
    }

    /// Read response lines up to and including the one with the given tag
    /// or a continuation request, or just one line if `tag` is `None`.
    ///
    /// Literals are read inline, so a response carrying a literal comes back
    /// as a single string with the literal's CRLFs embedded. The trailing
    /// CRLF of each line is removed.
    ///
    /// This creates a `BufReader` over `io` and will lose any data which was
    /// buffered after the last read line. This should be fine since we don't
    /// do pipelining here.
    pub fn read_responses(&mut self, tag: Option<&str>) -> Vec<String> {
        let mut ret = Vec::<String>::new();
        let mut r = io::BufReader::new(&mut self.io);

        loop {
            let mut response = Vec::<u8>::new();
            loop {
                let start = response.len();
                r.read_until(b'\n', &mut response).unwrap();
                if start == response.len() {
                    panic!("Unexpected EOF");
                }

                match literal_suffix(&response[start..]) {
                    None => break,
                    Some(len) => {
                        let mut literal = vec![0u8; len];
                        r.read_exact(&mut literal).unwrap();
                        response.extend_from_slice(&literal);
                    }
                }
            }

            let response = String::from_utf8(response).unwrap();
            println!("[{}] >> {:?}", self.name, response);
            let response = response.trim_end_matches("\r\n").to_owned();

            let last = match tag {
                None => true,
                Some(tag) => {
                    response.starts_with('+')
                        || response
                            .strip_prefix(tag)
                            .map_or(false, |rest| rest.starts_with(' '))
                }
            };
            ret.push(response);

            if last {
                break;
            }
        }

        ret
    }

    /// Writes the given complete line to the server.
    pub fn write_line(&mut self, s: &str) {
        assert!(s.ends_with('\n'));
        println!("[{}] << {:?}", self.name, s);
        self.io.write_all(s.as_bytes()).unwrap();
    }

    /// Writes the given raw data to the server.
    pub fn write_raw(&mut self, data: &[u8]) {
        println!("[{}] << [{} bytes]", self.name, data.len());
        self.io.write_all(data).unwrap();
    }

    /// Send `line` and return every response up to and including the
    /// tagged one (or a continuation request).
    pub fn command(&mut self, line: &str) -> Vec<String> {
        let tag = line.split(' ').next().unwrap().to_owned();
        self.write_line(&format!("{}\r\n", line));
        self.read_responses(Some(&tag))
    }

    /// Send a command which is expected to produce exactly one response,
    /// which must equal `expected`.
    pub fn expect(&mut self, line: &str, expected: &str) {
        let responses = self.command(line);
        assert_eq!(vec![expected.to_owned()], responses);
    }

    /// Send a command and assert that its final response starts with
    /// `prefix`. Returns all responses.
    pub fn expect_like(&mut self, line: &str, prefix: &str) -> Vec<String> {
        let responses = self.command(line);
        let last = responses.last().unwrap();
        assert!(
            last.starts_with(prefix),
            "Expected {:?} to start with {:?}",
            last,
            prefix
        );
        responses
    }

    /// Performs a TLS handshake on the connection.
    pub fn start_tls(&mut self) {
        let mut connector = SslConnector::builder(SslMethod::tls()).unwrap();
        connector.set_verify(SslVerifyMode::NONE);

        println!("[{}] <> Start TLS handshake", self.name);
        let cxn = mem::replace(&mut self.io, Box::new(io::empty()));
        let cxn = connector
            .build()
            .connect("localhost", cxn)
            .map_err(|_| "SSL handshake failed")
            .unwrap();
        println!("[{}] <> TLS handshake succeeded", self.name);
        self.io = Box::new(cxn);
    }

    /// Read until the server closes the connection, returning whatever it
    /// sent.
    pub fn read_to_eof(&mut self) -> String {
        let mut data = Vec::new();
        self.io.read_to_end(&mut data).unwrap();
        String::from_utf8(data).unwrap()
    }
}

/// If `line` ends with a literal prefix, return the literal's length.
fn literal_suffix(line: &[u8]) -> Option<usize> {
    let line = line.strip_suffix(b"\r\n")?;
    let line = line.strip_suffix(b"}")?;
    let open = line.iter().rposition(|&b| b'{' == b)?;
    std::str::from_utf8(&line[open + 1..]).ok()?.parse().ok()
}

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

//! Output to the client, and the transport shared with the reader thread.

use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex};

use log::trace;
use openssl::ssl::{HandshakeError, SslAcceptor};

use super::syntax as s;
use crate::support::error::Error;
use crate::support::log_prefix::LogPrefix;

/// A bidirectional byte stream a connection can run over.
pub trait Stream: Read + Write + Send {}
impl<T: Read + Write + Send> Stream for T {}

/// The connection's transport, shared between the reader thread and the
/// writer.
///
/// The command loop never reads and writes at the same time, so the two sides
/// never contend for the lock; it exists so that STARTTLS can replace the
/// stream between commands. After `close()`, reads see EOF and writes fail.
#[derive(Clone)]
pub struct SharedIo {
    inner: Arc<Mutex<Option<Box<dyn Stream>>>>,
}

impl SharedIo {
    pub fn new(stream: Box<dyn Stream>) -> Self {
        SharedIo {
            inner: Arc::new(Mutex::new(Some(stream))),
        }
    }

    /// Drop the underlying stream.
    pub fn close(&self) {
        self.inner.lock().unwrap().take();
    }

    /// Run a server-side TLS handshake over the current stream and continue
    /// over the encrypted stream.
    pub fn start_tls(&self, acceptor: &SslAcceptor) -> Result<(), Error> {
        let mut inner = self.inner.lock().unwrap();
        let plain = inner.take().ok_or_else(|| {
            Error::Io(io::Error::new(
                io::ErrorKind::NotConnected,
                "Connection already closed",
            ))
        })?;

        match acceptor.accept(plain) {
            Ok(tls) => {
                *inner = Some(Box::new(tls));
                Ok(())
            }
            Err(HandshakeError::SetupFailure(e)) => Err(Error::Ssl(e)),
            Err(HandshakeError::Failure(mid)) => {
                Err(Error::TlsHandshake(mid.error().to_string()))
            }
            Err(HandshakeError::WouldBlock(_)) => Err(Error::TlsHandshake(
                "Handshake interrupted".to_owned(),
            )),
        }
    }
}

impl Read for SharedIo {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match *self.inner.lock().unwrap() {
            Some(ref mut stream) => stream.read(buf),
            None => Ok(0),
        }
    }
}

impl Write for SharedIo {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match *self.inner.lock().unwrap() {
            Some(ref mut stream) => stream.write(buf),
            None => Err(io::ErrorKind::NotConnected.into()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match *self.inner.lock().unwrap() {
            Some(ref mut stream) => stream.flush(),
            None => Ok(()),
        }
    }
}

/// Buffers responses and writes them to the client on `flush()`.
pub struct ResponseWriter {
    io: SharedIo,
    text: Vec<u8>,
    log_prefix: LogPrefix,
}

impl ResponseWriter {
    pub fn new(io: SharedIo, log_prefix: LogPrefix) -> Self {
        ResponseWriter {
            io,
            text: Vec::new(),
            log_prefix,
        }
    }

    pub fn send(&mut self, line: &s::ResponseLine) {
        let line = line.to_string();
        trace!("{} S: {}", self.log_prefix, line);
        self.text.extend_from_slice(line.as_bytes());
        self.text.extend_from_slice(b"\r\n");
    }

    pub fn send_untagged(&mut self, response: s::Response) {
        self.send(&s::ResponseLine {
            tag: None,
            response,
        });
    }

    /// Send a continuation request and flush immediately.
    pub fn continuation(&mut self, prompt: &str) -> io::Result<()> {
        trace!("{} S: + {}", self.log_prefix, prompt);
        self.text.extend_from_slice(b"+ ");
        self.text.extend_from_slice(prompt.as_bytes());
        self.text.extend_from_slice(b"\r\n");
        self.flush()
    }

    pub fn flush(&mut self) -> io::Result<()> {
        if !self.text.is_empty() {
            let result = self.io.write_all(&self.text);
            self.text.clear();
            result?;
        }
        self.io.flush()
    }
}

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

//! Input from the client.
//!
//! A dedicated thread owns the read side of the transport. The command loop
//! asks it for one line or one literal at a time over a bounded channel and
//! blocks on the answer. When the transport reaches EOF or fails, the thread
//! exits and drops its end of the result channel, which the command loop
//! observes as end-of-stream.

use std::io::{self, BufRead, Read};
use std::thread;

use crossbeam::channel::{self, Receiver, Sender};
use log::{info, warn};

use crate::support::log_prefix::LogPrefix;

pub const MAX_CMDLINE: usize = 65536;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ReadRequest {
    Line,
    Literal(u32),
    DiscardBuffered,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum ReadResult {
    Line(Line),
    Literal(Vec<u8>),
    Discarded(usize),
}

/// A line received from the client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Line {
    /// A complete line, without its line ending.
    Text(Vec<u8>),
    /// The line exceeded `MAX_CMDLINE` and was discarded.
    TooLong,
}

pub struct RequestReader {
    requests: Sender<ReadRequest>,
    results: Receiver<ReadResult>,
}

impl RequestReader {
    /// Start the reader thread on `read`.
    pub fn spawn<R: Read + Send + 'static>(
        read: R,
        log_prefix: LogPrefix,
    ) -> io::Result<Self> {
        let (requests, request_rx) = channel::bounded(1);
        let (result_tx, results) = channel::bounded(1);

        thread::Builder::new()
            .name(format!("reader {}", log_prefix))
            .spawn(move || {
                match run(io::BufReader::new(read), request_rx, result_tx) {
                    Ok(()) => (),
                    Err(e) if io::ErrorKind::UnexpectedEof == e.kind() => {
                        info!("{} Client closed the connection", log_prefix)
                    }
                    Err(e) => warn!("{} Read failed: {}", log_prefix, e),
                }
            })?;

        Ok(RequestReader { requests, results })
    }

    fn request(&self, req: ReadRequest) -> Option<ReadResult> {
        self.requests.send(req).ok()?;
        self.results.recv().ok()
    }

    /// Read the next line. Returns `None` at end of stream.
    pub fn read_line(&self) -> Option<Line> {
        match self.request(ReadRequest::Line)? {
            ReadResult::Line(line) => Some(line),
            _ => None,
        }
    }

    /// Read exactly `len` bytes. Returns `None` at end of stream.
    pub fn read_literal(&self, len: u32) -> Option<Vec<u8>> {
        match self.request(ReadRequest::Literal(len))? {
            ReadResult::Literal(data) => Some(data),
            _ => None,
        }
    }

    /// Throw away anything the client sent which has been read from the
    /// transport but not yet consumed, returning how many bytes were dropped.
    ///
    /// Returns `None` at end of stream.
    pub fn discard_buffered(&self) -> Option<usize> {
        match self.request(ReadRequest::DiscardBuffered)? {
            ReadResult::Discarded(n) => Some(n),
            _ => None,
        }
    }
}

fn run<R: Read>(
    mut read: io::BufReader<R>,
    requests: Receiver<ReadRequest>,
    results: Sender<ReadResult>,
) -> io::Result<()> {
    for req in requests {
        let result = match req {
            ReadRequest::Line => ReadResult::Line(read_line(&mut read)?),
            ReadRequest::Literal(len) => {
                let mut data = Vec::with_capacity(len as usize);
                read.by_ref().take(len.into()).read_to_end(&mut data)?;
                if data.len() != len as usize {
                    return Err(io::ErrorKind::UnexpectedEof.into());
                }
                ReadResult::Literal(data)
            }
            ReadRequest::DiscardBuffered => {
                let n = read.buffer().len();
                read.consume(n);
                ReadResult::Discarded(n)
            }
        };

        if results.send(result).is_err() {
            break;
        }
    }

    Ok(())
}

/// Read one line, accepting both CRLF and bare LF endings.
fn read_line(read: &mut impl BufRead) -> io::Result<Line> {
    let mut line = Vec::new();
    read.by_ref()
        .take(MAX_CMDLINE as u64 + 1)
        .read_until(b'\n', &mut line)?;

    if line.ends_with(b"\n") {
        line.pop();
        if line.ends_with(b"\r") {
            line.pop();
        }
        return Ok(Line::Text(line));
    }

    if line.len() <= MAX_CMDLINE {
        return Err(io::ErrorKind::UnexpectedEof.into());
    }

    // Skip the rest of the over-long line
    loop {
        line.clear();
        let nread = read
            .by_ref()
            .take(MAX_CMDLINE as u64)
            .read_until(b'\n', &mut line)?;
        if 0 == nread {
            return Err(io::ErrorKind::UnexpectedEof.into());
        }
        if line.ends_with(b"\n") {
            return Ok(Line::TooLong);
        }
    }
}

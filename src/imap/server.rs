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

use std::borrow::Cow;
use std::sync::Arc;

use log::{info, trace, warn};
use openssl::ssl::SslAcceptor;

use super::command_processor::CommandProcessor;
use super::grammar::Registry;
use super::request_reader::{Line, RequestReader};
use super::response_writer::{ResponseWriter, SharedIo, Stream};
use super::syntax as s;
use crate::support::error::Error;
use crate::support::log_prefix::LogPrefix;

/// Runs one IMAP session over a stream.
///
/// Commands are strictly sequential: a line is read, dispatched to
/// completion, its responses flushed, and only then is the next line read.
pub struct Server {
    io: SharedIo,
    reader: RequestReader,
    writer: ResponseWriter,
    processor: CommandProcessor,
    registry: Arc<Registry>,
    ssl_acceptor: Option<Arc<SslAcceptor>>,
    log_prefix: LogPrefix,
}

impl Server {
    pub fn new(
        stream: Box<dyn Stream>,
        processor: CommandProcessor,
        registry: Arc<Registry>,
        ssl_acceptor: Option<Arc<SslAcceptor>>,
    ) -> Result<Self, Error> {
        let log_prefix = processor.log_prefix().clone();
        let io = SharedIo::new(stream);
        let reader = RequestReader::spawn(io.clone(), log_prefix.clone())?;
        let writer = ResponseWriter::new(io.clone(), log_prefix.clone());

        Ok(Server {
            io,
            reader,
            writer,
            processor,
            registry,
            ssl_acceptor,
            log_prefix,
        })
    }

    /// Run the server.
    ///
    /// Blocks until the client logs out, the transport is closed, or an
    /// error occurs.
    pub fn run(&mut self) -> Result<(), Error> {
        let greeting = self.processor.greet()?;
        self.writer.send(&greeting);
        self.writer.flush()?;

        while !self.processor.logged_out() {
            let line = match self.reader.read_line() {
                Some(Line::Text(line)) => line,
                Some(Line::TooLong) => {
                    warn!(
                        "{} Discarded over-long command line",
                        self.log_prefix
                    );
                    self.writer.send_untagged(bad("Command line too long"));
                    self.writer.flush()?;
                    continue;
                }
                None => {
                    info!("{} Connection closed", self.log_prefix);
                    self.processor.transport_closed();
                    break;
                }
            };

            let line = String::from_utf8_lossy(&line);
            trace!("{} C: {}", self.log_prefix, line);

            match self.registry.parse(&line) {
                Err(unknown) => self.writer.send(&s::ResponseLine {
                    tag: unknown.tag,
                    response: bad("Command not understood"),
                }),

                Ok(s::CommandLine {
                    tag,
                    cmd: s::Command::Authenticate(cmd),
                }) => self.handle_authenticate(tag, cmd)?,

                Ok(s::CommandLine {
                    tag,
                    cmd: s::Command::Append(cmd),
                }) => self.handle_append(tag, cmd)?,

                Ok(
                    command_line @ s::CommandLine {
                        cmd: s::Command::StartTls,
                        ..
                    },
                ) => self.handle_start_tls(command_line)?,

                Ok(command_line) => {
                    let writer = &mut self.writer;
                    let response = self
                        .processor
                        .handle_command(command_line, &mut |r| {
                            writer.send_untagged(r)
                        });
                    self.writer.send(&response);
                }
            }

            self.writer.flush()?;
        }

        self.io.close();
        Ok(())
    }

    /// Handle the full `AUTHENTICATE` flow.
    fn handle_authenticate(
        &mut self,
        tag: String,
        cmd: s::AuthenticateCommand,
    ) -> Result<(), Error> {
        let response = match self.processor.authenticate_start(&cmd) {
            Some(response) => response,
            None => {
                // The space after the + is mandatory, and there is no
                // challenge to send.
                self.writer.continuation("")?;
                match self.reader.read_line() {
                    Some(Line::Text(data)) => {
                        self.processor.authenticate_finish(&data)
                    }
                    Some(Line::TooLong) => bad("Invalid auth details"),
                    None => {
                        self.processor.transport_closed();
                        return Ok(());
                    }
                }
            }
        };

        self.writer.send(&s::ResponseLine {
            tag: Some(tag),
            response,
        });
        Ok(())
    }

    /// Handle `APPEND`, including reading its literal.
    fn handle_append(
        &mut self,
        tag: String,
        cmd: s::AppendCommand,
    ) -> Result<(), Error> {
        let request = match self.processor.append_start(&cmd) {
            Ok(request) => request,
            Err(response) => {
                self.writer.send(&s::ResponseLine {
                    tag: Some(tag),
                    response,
                });
                return Ok(());
            }
        };

        self.writer.continuation("Ready for literal data")?;

        let data = match self.reader.read_literal(cmd.size) {
            Some(data) => data,
            None => {
                self.processor.transport_closed();
                return Ok(());
            }
        };

        // The rest of the command line after the literal
        match self.reader.read_line() {
            Some(Line::Text(ref rest))
                if rest.iter().all(u8::is_ascii_whitespace) => {}
            Some(_) => {
                self.writer.send(&s::ResponseLine {
                    tag: Some(tag),
                    response: bad("Unexpected data after APPEND literal"),
                });
                return Ok(());
            }
            None => {
                self.processor.transport_closed();
                return Ok(());
            }
        }

        let response = self.processor.append_finish(request, &data);
        self.writer.send(&s::ResponseLine {
            tag: Some(tag),
            response,
        });
        Ok(())
    }

    /// Handle `STARTTLS`, performing the handshake if the processor accepts
    /// the command.
    fn handle_start_tls(
        &mut self,
        command_line: s::CommandLine,
    ) -> Result<(), Error> {
        let response =
            self.processor.handle_command(command_line, &mut |_| ());
        let accepted = matches!(
            response.response,
            s::Response::Cond(s::CondResponse {
                cond: s::RespCondType::Ok,
                ..
            })
        );
        self.writer.send(&response);
        self.writer.flush()?;

        if accepted {
            // Cleartext pipelined behind STARTTLS is never run inside the
            // TLS session
            match self.reader.discard_buffered() {
                Some(0) => (),
                Some(n) => {
                    warn!(
                        "{} Client sent {} bytes of cleartext after STARTTLS",
                        self.log_prefix, n
                    );
                    self.writer.send_untagged(s::Response::Cond(
                        s::CondResponse {
                            cond: s::RespCondType::Bye,
                            code: None,
                            quip: Some(Cow::Borrowed(
                                "Unexpected data after STARTTLS",
                            )),
                        },
                    ));
                    self.writer.flush()?;
                    self.processor.transport_closed();
                    return Ok(());
                }
                None => {
                    self.processor.transport_closed();
                    return Ok(());
                }
            }

            let acceptor = self.ssl_acceptor.as_ref().ok_or_else(|| {
                Error::TlsHandshake("No TLS configuration".to_owned())
            })?;
            self.io.start_tls(acceptor)?;
            self.processor.tls_started();
        }

        Ok(())
    }
}

fn bad(quip: &'static str) -> s::Response {
    s::Response::Cond(s::CondResponse {
        cond: s::RespCondType::Bad,
        code: None,
        quip: Some(Cow::Borrowed(quip)),
    })
}

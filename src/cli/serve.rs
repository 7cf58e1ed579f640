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

use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use log::{error, info, warn};
use openssl::ssl::{SslAcceptor, SslFiletype, SslMethod};

use crate::account::{memory::InMemoryStore, Mailstore};
use crate::imap::grammar::Registry;
use crate::imap::server::Server;
use crate::imap::CommandProcessor;
use crate::support::log_prefix::LogPrefix;
use crate::support::system_config::{SystemConfig, TlsConfig};

macro_rules! fatal {
    ($ex:ident, $($stuff:tt)*) => {{
        error!($($stuff)*);
        crate::support::sysexits::$ex.exit()
    }}
}

pub fn serve(system_config: SystemConfig, system_root: PathBuf) {
    let system_config = Arc::new(system_config);

    let ssl_acceptor = system_config
        .tls
        .as_ref()
        .map(|tls| Arc::new(create_ssl_acceptor(tls, &system_root)));
    let mailstore: Arc<dyn Mailstore> =
        Arc::new(InMemoryStore::from_config(&system_config));

    let listener = match TcpListener::bind(&system_config.imap.listen) {
        Ok(listener) => listener,
        Err(e) => fatal!(
            EX_UNAVAILABLE,
            "Unable to listen on '{}': {}",
            system_config.imap.listen,
            e
        ),
    };

    info!(
        "Listening on {}{}",
        system_config.imap.listen,
        if ssl_acceptor.is_some() {
            " with STARTTLS"
        } else {
            ""
        }
    );

    serve_connections(listener, system_config, mailstore, ssl_acceptor);
}

/// Accept connections from `listener` forever, running each session on its
/// own thread.
pub(crate) fn serve_connections(
    listener: TcpListener,
    system_config: Arc<SystemConfig>,
    mailstore: Arc<dyn Mailstore>,
    ssl_acceptor: Option<Arc<SslAcceptor>>,
) {
    let registry = Arc::new(Registry::standard());

    for stream in listener.incoming() {
        let stream = match stream {
            Ok(stream) => stream,
            Err(e) => {
                warn!("Failed to accept connection: {}", e);
                continue;
            }
        };

        let peer = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown".to_owned());
        let log_prefix = LogPrefix::new(peer);
        info!("{} Accepted connection", log_prefix);

        let processor = CommandProcessor::new(
            log_prefix.clone(),
            Arc::clone(&system_config),
            Arc::clone(&mailstore),
            ssl_acceptor.is_some(),
        );
        let mut server = match Server::new(
            Box::new(stream),
            processor,
            Arc::clone(&registry),
            ssl_acceptor.clone(),
        ) {
            Ok(server) => server,
            Err(e) => {
                error!("{} Failed to start session: {}", log_prefix, e);
                continue;
            }
        };

        thread::spawn(move || match server.run() {
            Ok(()) => info!("{} Connection closed normally", log_prefix),
            Err(e) => warn!("{} Connection error: {}", log_prefix, e),
        });
    }
}

fn create_ssl_acceptor(tls: &TlsConfig, system_root: &Path) -> SslAcceptor {
    let mut acceptor =
        match SslAcceptor::mozilla_intermediate_v5(SslMethod::tls_server()) {
            Ok(a) => a,
            Err(e) => fatal!(
                EX_SOFTWARE,
                "Failed to initialise OpenSSL acceptor: {}",
                e
            ),
        };

    let private_key_path = system_root.join(&tls.private_key);
    if let Err(e) =
        acceptor.set_private_key_file(&private_key_path, SslFiletype::PEM)
    {
        fatal!(
            EX_CONFIG,
            "Unable to load TLS private key from '{}': {}",
            private_key_path.display(),
            e
        );
    }

    let certificate_path = system_root.join(&tls.certificate_chain);
    if let Err(e) = acceptor.set_certificate_chain_file(&certificate_path) {
        fatal!(
            EX_CONFIG,
            "Unable to load TLS certificate chain from '{}': {}",
            certificate_path.display(),
            e
        );
    }

    if let Err(e) = acceptor.check_private_key() {
        fatal!(EX_CONFIG, "TLS key seems to be invalid: {}", e);
    }

    acceptor.build()
}

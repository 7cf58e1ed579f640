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

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// The system-wide configuration for Postern.
///
/// This is stored in a file named `postern.toml` under the Postern root, which
/// is given on the command line.
#[derive(Clone, Debug, Deserialize, Serialize, Default)]
pub struct SystemConfig {
    /// Options for the IMAP listener.
    #[serde(default)]
    pub imap: ImapConfig,

    /// Configuration for STARTTLS.
    ///
    /// If absent, STARTTLS is neither advertised nor accepted.
    #[serde(default)]
    pub tls: Option<TlsConfig>,

    /// If true, the store is seeded with the demonstration account
    /// (`username` / `password`) holding three messages in `INBOX` and an
    /// empty `Trash`.
    #[serde(default)]
    pub demo: bool,

    /// Accounts to create in the in-memory store at startup.
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ImapConfig {
    /// The address to listen on.
    pub listen: String,
    /// The UIDVALIDITY reported for every mailbox.
    pub uid_validity: u32,
    /// The largest message accepted by `APPEND`, in bytes.
    pub max_append_size: u32,
}

impl Default for ImapConfig {
    fn default() -> Self {
        ImapConfig {
            listen: "127.0.0.1:1143".to_owned(),
            uid_validity: 250,
            max_append_size: 64 * 1024 * 1024,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TlsConfig {
    /// The path to the TLS private key, which must be in PEM format.
    ///
    /// Relative paths are resolved against the Postern root.
    pub private_key: PathBuf,
    /// The path to the TLS certificate chain, which must be in PEM format.
    pub certificate_chain: PathBuf,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct UserConfig {
    pub name: String,
    pub password: String,
    /// Mailboxes to create for the user. `INBOX` is always created.
    #[serde(default)]
    pub mailboxes: Vec<String>,
}

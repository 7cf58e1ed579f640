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

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use structopt::StructOpt;

use crate::support::sysexits::*;
use crate::support::system_config::SystemConfig;

#[derive(StructOpt)]
#[structopt(max_term_width = 80)]
enum Command {
    /// Run the IMAP server.
    ///
    /// Postern listens on the address configured in `postern.toml` and
    /// serves each connection on its own thread. Mail lives in memory only;
    /// accounts come from the `[[users]]` table and, if `demo = true`, the
    /// demonstration account.
    Serve(ServeOptions),
    /// Load `postern.toml` and report any problems without serving.
    CheckConfig(ServerCommonOptions),
}

#[derive(StructOpt, Default)]
struct ServerCommonOptions {
    /// The directory containing `postern.toml` and optionally `logging.toml`
    /// [default: the current directory]
    #[structopt(long, parse(from_os_str))]
    root: Option<PathBuf>,
}

#[derive(StructOpt)]
struct ServeOptions {
    #[structopt(flatten)]
    common: ServerCommonOptions,

    /// Listen on this address instead of the one in `postern.toml`.
    #[structopt(long)]
    listen: Option<String>,
}

pub fn main() {
    // Clap exits with status 1 instead of EX_USAGE if we use the more concise
    // API
    let cmd = Command::from_clap(&match Command::clap().get_matches_safe() {
        Ok(matches) => matches,
        Err(
            e @ clap::Error {
                kind: clap::ErrorKind::HelpDisplayed,
                ..
            },
        )
        | Err(
            e @ clap::Error {
                kind: clap::ErrorKind::VersionDisplayed,
                ..
            },
        ) => {
            println!("{}", e.message);
            return;
        }
        Err(e) => {
            eprintln!("{}", e.message);
            EX_USAGE.exit()
        }
    });

    match cmd {
        Command::Serve(opts) => {
            let root = root_dir(opts.common);
            let mut system_config = load_system_config(&root);
            if let Some(listen) = opts.listen {
                system_config.imap.listen = listen;
            }

            init_logging(&root);
            super::serve::serve(system_config, root);
        }

        Command::CheckConfig(common) => {
            let root = root_dir(common);
            let system_config = load_system_config(&root);
            println!(
                "Configuration OK: listening on {}, {} user(s){}, STARTTLS {}",
                system_config.imap.listen,
                system_config.users.len(),
                if system_config.demo { " plus demo" } else { "" },
                if system_config.tls.is_some() {
                    "enabled"
                } else {
                    "disabled"
                },
            );
        }
    }
}

fn root_dir(common: ServerCommonOptions) -> PathBuf {
    common.root.unwrap_or_else(|| ".".to_owned().into())
}

fn load_system_config(root: &Path) -> SystemConfig {
    match read_system_config(root) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("{}", message);
            EX_CONFIG.exit()
        }
    }
}

fn read_system_config(root: &Path) -> Result<SystemConfig, String> {
    let system_config_path = root.join("postern.toml");
    let mut system_config_toml = Vec::new();
    fs::File::open(&system_config_path)
        .and_then(|mut f| f.read_to_end(&mut system_config_toml))
        .map_err(|e| {
            format!("Error reading '{}': {}", system_config_path.display(), e)
        })?;

    toml::from_slice(&system_config_toml).map_err(|e| {
        format!(
            "Error in config file at '{}': {}",
            system_config_path.display(),
            e
        )
    })
}

fn init_logging(root: &Path) {
    let log_config_file = root.join("logging.toml");
    if log_config_file.is_file() {
        if let Err(e) = log4rs::init_file(
            &log_config_file,
            log4rs::file::Deserializers::new(),
        ) {
            eprintln!(
                "Failed to initialise logging from '{}': {}",
                log_config_file.display(),
                e
            );
            EX_CONFIG.exit();
        }
    } else {
        crate::init_simple_log();
    }
}

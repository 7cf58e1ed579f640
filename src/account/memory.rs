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

//! A mail store held entirely in memory.

use std::sync::{Arc, Mutex};

use chrono::prelude::*;
use log::info;

use super::model::Flags;
use super::{Mailbox, Mailstore, Message, User};
use crate::mime::header::Header;
use crate::support::error::Error;
use crate::support::system_config::SystemConfig;

/// An in-memory `Mailstore`.
///
/// Every mailbox guards its contents with its own mutex, so any number of
/// connections may use the store concurrently.
pub struct InMemoryStore {
    users: Vec<Arc<MemoryUser>>,
    uid_validity: u32,
}

pub struct MemoryUser {
    name: String,
    password: String,
    mailboxes: Vec<Arc<MemoryMailbox>>,
}

pub struct MemoryMailbox {
    name: String,
    uid_validity: u32,
    state: Mutex<MailboxState>,
}

struct MailboxState {
    next_uid: u32,
    messages: Vec<Message>,
}

impl InMemoryStore {
    pub fn new(uid_validity: u32) -> Self {
        InMemoryStore {
            users: Vec::new(),
            uid_validity,
        }
    }

    /// Build the store described by `config`.
    pub fn from_config(config: &SystemConfig) -> Self {
        let mut store = if config.demo {
            InMemoryStore::demo(config.imap.uid_validity)
        } else {
            InMemoryStore::new(config.imap.uid_validity)
        };

        for user in &config.users {
            store.add_user(
                &user.name,
                &user.password,
                user.mailboxes.iter().map(String::as_str),
            );
        }

        store
    }

    /// A store holding the single demonstration account `username`, password
    /// `password`, with three messages in `INBOX` (UIDs 10 to 12) and an
    /// empty `Trash`.
    pub fn demo(uid_validity: u32) -> Self {
        let mut store = InMemoryStore::new(uid_validity);
        let user = store.add_user("username", "password", vec!["Trash"]);
        let inbox = &user.mailboxes[0];
        inbox.state.lock().unwrap().next_uid = 10;

        let date = FixedOffset::east(7 * 3600)
            .ymd(2014, 10, 28)
            .and_hms(0, 9, 0);
        for &(subject, body) in &[
            ("Test email", "Test email\r\nRegards,\r\nMe"),
            ("Another test email", "Another test email"),
            ("Last email", "Hello"),
        ] {
            inbox.add_demo_message(date, subject, body);
        }

        store
    }

    /// Add a user owning `INBOX` plus the named mailboxes.
    pub fn add_user<'a>(
        &mut self,
        name: &str,
        password: &str,
        mailboxes: impl IntoIterator<Item = &'a str>,
    ) -> Arc<MemoryUser> {
        let mut boxes = vec![Arc::new(MemoryMailbox::new(
            "INBOX".to_owned(),
            self.uid_validity,
        ))];
        for mailbox in mailboxes {
            if !boxes.iter().any(|b| b.name == mailbox) {
                boxes.push(Arc::new(MemoryMailbox::new(
                    mailbox.to_owned(),
                    self.uid_validity,
                )));
            }
        }

        let user = Arc::new(MemoryUser {
            name: name.to_owned(),
            password: password.to_owned(),
            mailboxes: boxes,
        });
        self.users.retain(|u| u.name != name);
        self.users.push(Arc::clone(&user));
        user
    }
}

impl Mailstore for InMemoryStore {
    fn authenticate(
        &self,
        user: &str,
        password: &str,
    ) -> Result<Arc<dyn User>, Error> {
        self.users
            .iter()
            .find(|u| u.name == user && u.password == password)
            .map(|u| Arc::clone(u) as Arc<dyn User>)
            .ok_or(Error::BadCredentials)
    }
}

impl User for MemoryUser {
    fn name(&self) -> &str {
        &self.name
    }

    fn mailboxes(&self) -> Vec<Arc<dyn Mailbox>> {
        self.mailboxes
            .iter()
            .map(|m| Arc::clone(m) as Arc<dyn Mailbox>)
            .collect()
    }

    fn mailbox_by_name(&self, name: &str) -> Result<Arc<dyn Mailbox>, Error> {
        self.mailboxes
            .iter()
            .find(|m| {
                m.name == name
                    || ("INBOX" == m.name && name.eq_ignore_ascii_case("INBOX"))
            })
            .map(|m| Arc::clone(m) as Arc<dyn Mailbox>)
            .ok_or(Error::NxMailbox)
    }
}

impl MemoryMailbox {
    fn new(name: String, uid_validity: u32) -> Self {
        MemoryMailbox {
            name,
            uid_validity,
            state: Mutex::new(MailboxState {
                next_uid: 1,
                messages: Vec::new(),
            }),
        }
    }

    fn add_demo_message(
        &self,
        date: DateTime<FixedOffset>,
        subject: &str,
        body: &str,
    ) {
        let mut state = self.state.lock().unwrap();
        let uid = state.next_uid;
        state.next_uid += 1;

        let mut header = Header::new();
        header.push("Date", date.to_rfc2822());
        header.push("To", "you@test.com");
        header.push("From", "me@test.com");
        header.push("Subject", subject);
        header.push("Message-ID", format!("<{}@test.com>", uid));

        state.messages.push(Message {
            uid,
            seqnum: 0,
            header,
            body: body.to_owned(),
            internal_date: date,
            flags: Flags::RECENT,
            keywords: Vec::new(),
        });
    }
}

impl Mailbox for MemoryMailbox {
    fn name(&self) -> &str {
        &self.name
    }

    fn uid_validity(&self) -> u32 {
        self.uid_validity
    }

    fn next_uid(&self) -> u32 {
        self.state.lock().unwrap().next_uid
    }

    fn snapshot(&self) -> Vec<Message> {
        let state = self.state.lock().unwrap();
        state
            .messages
            .iter()
            .zip(1..)
            .map(|(m, seqnum)| Message {
                seqnum,
                ..m.clone()
            })
            .collect()
    }

    fn save(&self, mut message: Message) -> Result<Message, Error> {
        let mut state = self.state.lock().unwrap();
        if 0 == message.uid {
            message.uid = state.next_uid;
            state.next_uid += 1;
            message.seqnum = state.messages.len() as u32 + 1;
            info!(
                "Saved new message UID {} in {}",
                message.uid, self.name
            );
            state.messages.push(message.clone());
            return Ok(message);
        }

        let ix = state
            .messages
            .iter()
            .position(|m| m.uid == message.uid)
            .ok_or(Error::NxMessage)?;
        message.seqnum = ix as u32 + 1;
        state.messages[ix] = message.clone();
        Ok(message)
    }

    fn expunge_deleted(&self) -> Result<Vec<u32>, Error> {
        let mut state = self.state.lock().unwrap();
        let removed = state
            .messages
            .iter()
            .zip(1..)
            .filter(|(m, _)| m.has_flags(Flags::DELETED))
            .map(|(_, seqnum)| seqnum)
            .collect::<Vec<u32>>();
        state.messages.retain(|m| !m.has_flags(Flags::DELETED));
        Ok(removed)
    }
}

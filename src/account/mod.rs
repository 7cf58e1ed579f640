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

//! The storage boundary.
//!
//! The protocol engine only ever talks to the traits in this module. The
//! in-memory implementation lives in `memory`.

use std::sync::Arc;

use chrono::prelude::*;

use crate::mime::header::Header;
use crate::support::error::Error;

pub mod memory;
pub mod model;

use self::model::{Flags, SeqSet};

/// Entry point to a message store.
pub trait Mailstore: Send + Sync {
    /// Verify the given credentials, returning the user they identify.
    fn authenticate(
        &self,
        user: &str,
        password: &str,
    ) -> Result<Arc<dyn User>, Error>;
}

/// An authenticated user.
pub trait User: Send + Sync {
    fn name(&self) -> &str;
    fn mailboxes(&self) -> Vec<Arc<dyn Mailbox>>;
    fn mailbox_by_name(&self, name: &str) -> Result<Arc<dyn Mailbox>, Error>;
}

/// A mailbox belonging to a user.
///
/// Implementations must serialise concurrent access themselves; the protocol
/// engine calls into them without any external locking.
pub trait Mailbox: Send + Sync {
    fn name(&self) -> &str;
    fn uid_validity(&self) -> u32;
    /// The UID the next new message will receive.
    fn next_uid(&self) -> u32;

    /// All messages currently in the mailbox, in sequence number order, with
    /// `seqnum` populated.
    fn snapshot(&self) -> Vec<Message>;

    /// Store `message`.
    ///
    /// A message with UID 0 is new and is assigned the next UID. Otherwise
    /// the existing message with the same UID is replaced. Returns the message
    /// as stored.
    fn save(&self, message: Message) -> Result<Message, Error>;

    /// Remove every message carrying `\Deleted`.
    ///
    /// Returns the sequence numbers the removed messages had before the
    /// removal, in ascending order.
    fn expunge_deleted(&self) -> Result<Vec<u32>, Error>;

    /// The UID of the last message, or 0 if the mailbox is empty.
    fn last_uid(&self) -> u32 {
        self.snapshot().last().map_or(0, |m| m.uid)
    }

    fn messages(&self) -> u32 {
        self.snapshot().len() as u32
    }

    fn recent(&self) -> u32 {
        self.count_where(|m| m.has_flags(Flags::RECENT))
    }

    fn unseen(&self) -> u32 {
        self.count_where(|m| !m.has_flags(Flags::SEEN))
    }

    /// The sequence number of the first message without `\Seen`.
    fn first_unseen(&self) -> Option<u32> {
        self.snapshot()
            .into_iter()
            .find(|m| !m.has_flags(Flags::SEEN))
            .map(|m| m.seqnum)
    }

    fn count_where(&self, pred: fn(&Message) -> bool) -> u32 {
        self.snapshot().iter().filter(|m| pred(m)).count() as u32
    }

    fn message_by_seqnum(&self, seqnum: u32) -> Option<Message> {
        self.snapshot().into_iter().find(|m| m.seqnum == seqnum)
    }

    fn message_by_uid(&self, uid: u32) -> Option<Message> {
        self.snapshot().into_iter().find(|m| m.uid == uid)
    }

    /// Resolve `set` against the UIDs of the current messages.
    fn message_set_by_uid(&self, set: &SeqSet) -> Vec<Message> {
        let snapshot = self.snapshot();
        set.resolve(&snapshot, |m| m.uid)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Resolve `set` against the sequence numbers of the current messages.
    fn message_set_by_seqnum(&self, set: &SeqSet) -> Vec<Message> {
        let snapshot = self.snapshot();
        set.resolve(&snapshot, |m| m.seqnum)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Create a new, unsaved message.
    fn new_message(&self) -> Message {
        Message::new()
    }
}

/// A message as seen by the protocol engine.
///
/// This is a plain value; changes only take effect once passed to
/// `Mailbox::save`.
#[derive(Clone, Debug)]
pub struct Message {
    pub uid: u32,
    pub seqnum: u32,
    pub header: Header,
    pub body: String,
    pub internal_date: DateTime<FixedOffset>,
    pub flags: Flags,
    pub keywords: Vec<String>,
}

impl Message {
    pub fn new() -> Self {
        let now = Local::now();
        Message {
            uid: 0,
            seqnum: 0,
            header: Header::new(),
            body: String::new(),
            internal_date: now.with_timezone(now.offset()),
            flags: Flags::empty(),
            keywords: Vec::new(),
        }
    }

    /// The full RFC 822 text of the message: the header block followed by
    /// the body.
    pub fn full_text(&self) -> String {
        let mut text = self.header.render();
        text.push_str(&self.body);
        text
    }

    pub fn size(&self) -> usize {
        self.header.render().len() + self.body.len()
    }

    pub fn has_flags(&self, flags: Flags) -> bool {
        self.flags.contains(flags)
    }

    pub fn add_flags(mut self, flags: Flags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn remove_flags(mut self, flags: Flags) -> Self {
        self.flags -= flags;
        self
    }

    pub fn overwrite_flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }
}

impl Default for Message {
    fn default() -> Self {
        Message::new()
    }
}

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

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use lazy_static::lazy_static;
use regex::Regex;

use crate::support::error::Error;

bitflags! {
    /// The system flags a message can carry.
    ///
    /// Keywords are not represented here; they are kept as strings alongside
    /// the flags on the message.
    pub struct Flags: u32 {
        const SEEN = 1 << 0;
        const ANSWERED = 1 << 1;
        const FLAGGED = 1 << 2;
        const DELETED = 1 << 3;
        const DRAFT = 1 << 4;
        const RECENT = 1 << 5;
    }
}

static FLAG_NAMES: &[(Flags, &str)] = &[
    (Flags::SEEN, "\\Seen"),
    (Flags::ANSWERED, "\\Answered"),
    (Flags::FLAGGED, "\\Flagged"),
    (Flags::DELETED, "\\Deleted"),
    (Flags::DRAFT, "\\Draft"),
    (Flags::RECENT, "\\Recent"),
];

impl Flags {
    /// Parse a flag list such as `(\Seen \Deleted)`.
    ///
    /// Surrounding parentheses are optional. Tokens are matched
    /// case-sensitively; unknown tokens are ignored.
    pub fn parse_list(s: &str) -> Self {
        let s = s.trim();
        let s = s.strip_prefix('(').unwrap_or(s);
        let s = s.strip_suffix(')').unwrap_or(s);

        s.split_whitespace()
            .filter_map(|token| {
                FLAG_NAMES
                    .iter()
                    .find(|&&(_, name)| name == token)
                    .map(|&(flag, _)| flag)
            })
            .fold(Flags::empty(), |acc, flag| acc | flag)
    }

    /// The protocol names of the flags in this set, in canonical order.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        FLAG_NAMES
            .iter()
            .filter(move |&&(flag, _)| self.contains(flag))
            .map(|&(_, name)| name)
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (ix, name) in self.names().enumerate() {
            if ix > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", name)?;
        }
        Ok(())
    }
}

/// One endpoint of a sequence range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeqNumber {
    /// A concrete identifier.
    Value(u32),
    /// `*`, the last message in the mailbox.
    Last,
    /// No endpoint given.
    Nil,
}

impl SeqNumber {
    pub fn is_last(self) -> bool {
        SeqNumber::Last == self
    }

    pub fn is_nil(self) -> bool {
        SeqNumber::Nil == self
    }

    pub fn has_value(self) -> bool {
        matches!(self, SeqNumber::Value(_))
    }

    /// The concrete value of this endpoint.
    ///
    /// Fails if this is `*` or absent.
    pub fn value(self) -> Result<u32, Error> {
        match self {
            SeqNumber::Value(v) => Ok(v),
            _ => Err(Error::NoSequenceValue),
        }
    }
}

impl FromStr for SeqNumber {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "" => Ok(SeqNumber::Nil),
            "*" => Ok(SeqNumber::Last),
            s if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => s
                .parse::<u32>()
                .map(SeqNumber::Value)
                .map_err(|_| Error::InvalidSequenceRange(s.to_owned())),
            s => Err(Error::InvalidSequenceRange(s.to_owned())),
        }
    }
}

impl fmt::Display for SeqNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            SeqNumber::Value(v) => write!(f, "{}", v),
            SeqNumber::Last => write!(f, "*"),
            SeqNumber::Nil => Ok(()),
        }
    }
}

lazy_static! {
    static ref RX_RANGE: Regex =
        Regex::new(r"^(\d{1,10}|\*)(?::(\d{1,10}|\*))?$").unwrap();
    static ref RX_SET: Regex = Regex::new(
        r"^(?:\d{1,10}|\*)(?::(?:\d{1,10}|\*))?(?:,(?:\d{1,10}|\*)(?::(?:\d{1,10}|\*))?)*$"
    )
    .unwrap();
}

/// A normalised range of identifiers.
///
/// After parsing, `min <= max` whenever both are concrete, a `*` endpoint is
/// always in `max` (unless both ends were `*`, in which case the range is just
/// `min = *`), and `max` is `Nil` when the range names a single identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeqRange {
    pub min: SeqNumber,
    pub max: SeqNumber,
}

impl SeqRange {
    pub fn single(n: SeqNumber) -> Self {
        SeqRange {
            min: n,
            max: SeqNumber::Nil,
        }
    }

    pub fn parse(s: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidSequenceRange(s.to_owned());
        let captures = RX_RANGE.captures(s).ok_or_else(invalid)?;

        let min = captures
            .get(1)
            .map_or(Ok(SeqNumber::Nil), |m| m.as_str().parse())
            .map_err(|_| invalid())?;
        let max = captures
            .get(2)
            .map_or(Ok(SeqNumber::Nil), |m| m.as_str().parse())
            .map_err(|_| invalid())?;

        Ok(match (min, max) {
            (SeqNumber::Last, SeqNumber::Last) => SeqRange::single(min),
            (SeqNumber::Last, SeqNumber::Value(_)) => SeqRange {
                min: max,
                max: min,
            },
            (SeqNumber::Value(a), SeqNumber::Value(b)) if a > b => SeqRange {
                min: max,
                max: min,
            },
            (min, max) => SeqRange { min, max },
        })
    }

    /// Select from `items` (which must be in ascending identifier order) the
    /// ones this range names. `id` extracts the identifier being addressed.
    fn select<'a, T>(
        &self,
        items: &'a [T],
        id: &impl Fn(&T) -> u32,
        out: &mut Vec<&'a T>,
    ) {
        match (self.min, self.max) {
            (SeqNumber::Last, _) => out.extend(items.last()),
            (SeqNumber::Value(v), SeqNumber::Nil) => {
                out.extend(items.iter().find(|it| id(*it) == v))
            }
            (SeqNumber::Value(v), SeqNumber::Last) => {
                out.extend(items.iter().filter(|it| id(*it) >= v))
            }
            (SeqNumber::Value(lo), SeqNumber::Value(hi)) => out.extend(
                items.iter().filter(|it| (lo..=hi).contains(&id(*it))),
            ),
            (SeqNumber::Nil, _) => (),
        }
    }
}

impl fmt::Display for SeqRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.max.is_nil() {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{}:{}", self.min, self.max)
        }
    }
}

/// A comma-separated list of sequence ranges, kept in the order given.
///
/// Overlapping ranges are neither merged nor deduplicated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeqSet {
    ranges: Vec<SeqRange>,
}

impl SeqSet {
    pub fn parse(s: &str) -> Result<Self, Error> {
        if !RX_SET.is_match(s) {
            return Err(Error::InvalidSequenceSet(s.to_owned()));
        }

        let ranges = s
            .split(',')
            .map(SeqRange::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SeqSet { ranges })
    }

    pub fn ranges(&self) -> &[SeqRange] {
        &self.ranges
    }

    /// Resolve this set against `items`, which must be sorted by ascending
    /// identifier.
    ///
    /// Ranges are walked in order, so overlapping ranges yield the same item
    /// more than once. Identifiers with no matching item are skipped.
    pub fn resolve<'a, T>(
        &self,
        items: &'a [T],
        id: impl Fn(&T) -> u32,
    ) -> Vec<&'a T> {
        let mut out = Vec::new();
        if items.is_empty() {
            return out;
        }

        for range in &self.ranges {
            range.select(items, &id, &mut out);
        }
        out
    }
}

impl fmt::Display for SeqSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (ix, range) in self.ranges.iter().enumerate() {
            if ix > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", range)?;
        }
        Ok(())
    }
}

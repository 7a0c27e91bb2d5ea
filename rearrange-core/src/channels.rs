// Rearrange
// Copyright (c) 2024 The Project Rearrange Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `channels` module defines channel positions and ordered channel layouts.

use std::fmt;

use bitflags::bitflags;
use smallvec::SmallVec;

bitflags! {
    /// A bitmask representing positional audio channels.
    ///
    /// The bit assigned to each position is identical to the channel mask in Microsoft's
    /// `WAVEFORMATEXTENSIBLE` structure. Only the positions Rearrange can produce are defined.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Position: u32 {
        /// Front-left (left) channel.
        const FRONT_LEFT   = 1 << 0;
        /// Front-right (right) channel.
        const FRONT_RIGHT  = 1 << 1;
        /// Front-center (center) channel.
        const FRONT_CENTER = 1 << 2;
        /// Low-frequency effects (LFE) channel.
        const LFE          = 1 << 3;
        /// Rear-left channel.
        const REAR_LEFT    = 1 << 4;
        /// Rear-right channel.
        const REAR_RIGHT   = 1 << 5;
        /// Side-left channel.
        const SIDE_LEFT    = 1 << 9;
        /// Side-right channel.
        const SIDE_RIGHT   = 1 << 10;
    }
}

const POSITION_NAMES: &[(Position, &str); 8] = &[
    (Position::FRONT_LEFT, "FL"),
    (Position::FRONT_RIGHT, "FR"),
    (Position::FRONT_CENTER, "FC"),
    (Position::LFE, "LFE"),
    (Position::REAR_LEFT, "RL"),
    (Position::REAR_RIGHT, "RR"),
    (Position::SIDE_LEFT, "SL"),
    (Position::SIDE_RIGHT, "SR"),
];

impl Position {
    fn name(&self) -> &'static str {
        POSITION_NAMES.iter().find(|(pos, _)| pos == self).map(|(_, name)| *name).unwrap_or("???")
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let list = self.iter().map(|pos| pos.name()).collect::<Vec<_>>().join(",");
        write!(f, "[{}]", list)
    }
}

/// The channel order of a rearranged stream.
///
/// Output channel `i` always carries `REARRANGE_ORDER[i]`. Channels are paired: front, rear,
/// center/LFE, then side.
pub const REARRANGE_ORDER: [Position; 8] = [
    Position::FRONT_LEFT,
    Position::FRONT_RIGHT,
    Position::REAR_LEFT,
    Position::REAR_RIGHT,
    Position::FRONT_CENTER,
    Position::LFE,
    Position::SIDE_LEFT,
    Position::SIDE_RIGHT,
];

/// An ordered assignment of channel positions to interleaved channel indicies.
///
/// Unlike a [`Position`] mask, a layout preserves the order in which the channels appear within a
/// frame. This is required because [`REARRANGE_ORDER`] is not the canonical bit order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChannelLayout {
    positions: SmallVec<[Position; 8]>,
}

impl ChannelLayout {
    /// Create a layout from an ordered list of single positions.
    ///
    /// # Panics
    ///
    /// Panics if any entry contains more than one position, or if a position is repeated.
    pub fn new(positions: &[Position]) -> Self {
        let mut seen = Position::empty();

        for pos in positions {
            assert!(pos.bits().count_ones() == 1, "more than one channel position specified");
            assert!(!seen.contains(*pos), "channel position specified twice");
            seen |= *pos;
        }

        ChannelLayout { positions: SmallVec::from_slice(positions) }
    }

    /// Get the layout of a rearranged stream with `count` channels: the first `count` entries of
    /// [`REARRANGE_ORDER`].
    ///
    /// Returns `None` if `count` exceeds 8.
    pub fn rearranged(count: usize) -> Option<Self> {
        REARRANGE_ORDER.get(..count).map(ChannelLayout::new)
    }

    /// Get the number of channels.
    pub fn count(&self) -> usize {
        self.positions.len()
    }

    /// Returns `true` if the layout has no channels.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Get the ordered positions.
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Get the mask of all positions in the layout.
    pub fn mask(&self) -> Position {
        self.positions.iter().fold(Position::empty(), |mask, pos| mask | *pos)
    }

    /// Get the interleaved index of a position within the layout.
    pub fn index_of(&self, pos: Position) -> Option<usize> {
        self.positions.iter().position(|p| *p == pos)
    }
}

impl fmt::Display for ChannelLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let list = self.positions.iter().map(|pos| pos.name()).collect::<Vec<_>>().join(",");
        write!(f, "[{}]", list)
    }
}

// Rearrange
// Copyright (c) 2024 The Project Rearrange Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Project Rearrange
//!
//! Rearrange moves the channels of a mono or stereo PCM stream into one channel pair (front, rear,
//! center/LFE, or side) of a 2, 4, 6, or 8 channel stream, and fills every other channel with
//! silence. This allows more than one stereo signal to be sent to a multichannel sound card.
//!
//! The [`element::Rearrange`] element is the entry point. The format resolution and remapping it
//! performs are also available directly from the [`resolve`] and [`remap`] modules.
//!
//! ## Logging
//!
//! Rearrange logs through the `log` facade with the target `"rearrange"`. Installing a logger is
//! left to the application.

pub mod buffer;
pub mod caps;
pub mod channels;
pub mod config;
pub mod element;
pub mod errors;
pub mod remap;
pub mod resolve;
pub mod sample;

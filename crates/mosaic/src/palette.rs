// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

//! Segment colours: caller-supplied or drawn from a bright reduced palette.

use crate::error::{ConfigError, ConfigResult};
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use tracing::warn;

/// Characters a random colour code is drawn from. Digits below 8 are left
/// out so random fills never come out dark.
pub const RANDOM_COLOR_ALPHABET: &[u8; 8] = b"ABCDEF89";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const GRAY: Rgb = Rgb::new(0x80, 0x80, 0x80);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(0xFF, 0xFF, 0xFF);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#RRGGBB` (the leading `#` is optional, hex digits are case
    /// insensitive).
    pub fn parse(value: &str) -> ConfigResult<Self> {
        let invalid = || ConfigError::InvalidColor {
            value: value.to_string(),
        };
        let hex = value.trim().strip_prefix('#').unwrap_or(value.trim());
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Rgb::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// A colour whose `#XXXXXX` code has every character drawn uniformly from
/// [`RANDOM_COLOR_ALPHABET`].
pub fn random_color<R: Rng + ?Sized>(rng: &mut R) -> Rgb {
    let mut channel = || {
        let hi = RANDOM_COLOR_ALPHABET[rng.gen_range(0..RANDOM_COLOR_ALPHABET.len())];
        let lo = RANDOM_COLOR_ALPHABET[rng.gen_range(0..RANDOM_COLOR_ALPHABET.len())];
        (hex_value(hi) << 4) | hex_value(lo)
    };
    let r = channel();
    let g = channel();
    let b = channel();
    Rgb::new(r, g, b)
}

fn hex_value(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'A'..=b'F' => c - b'A' + 10,
        _ => 0,
    }
}

/// One colour per row category, in table row order.
///
/// `fixed` is used as-is when it has exactly `count` entries. Any other
/// length is tolerated and replaced by random colours.
pub fn assign_colors<R: Rng + ?Sized>(fixed: &[Rgb], count: usize, rng: &mut R) -> Vec<Rgb> {
    if fixed.len() == count {
        return fixed.to_vec();
    }
    if !fixed.is_empty() {
        warn!(
            supplied = fixed.len(),
            expected = count,
            "fixed colour count does not match row categories, using random colours"
        );
    }
    (0..count).map(|_| random_color(rng)).collect()
}

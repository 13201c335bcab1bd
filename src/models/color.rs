// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! CSS colour strings used for annotation strokes.
//!
//! Annotation colours are stored as the CSS text they were given (`#e6194b`,
//! `red`, `rgb(0 128 255)`, ...). Painting resolves them through a
//! [`ColorCache`] so each string is parsed, and warned about, only once.

use std::collections::HashMap;

/// An 8-bit RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse any CSS colour: hex forms, named colours, `rgb()`, `hsl()` and friends.
    pub fn parse(text: &str) -> Option<Self> {
        let [r, g, b, a] = csscolorparser::parse(text.trim()).ok()?.to_rgba8();
        Some(Self { r, g, b, a })
    }

    /// Parse a colour, logging and falling back when it is not understood.
    pub fn parse_or(text: &str, fallback: Rgba) -> Self {
        Self::parse(text).unwrap_or_else(|| {
            log::warn!("Unrecognized colour '{}', using fallback", text);
            fallback
        })
    }
}

/// Resolved colours keyed by their CSS text.
#[derive(Debug, Default)]
pub struct ColorCache {
    resolved: HashMap<String, Rgba>,
}

impl ColorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `text`, falling back for unparsable input. The first lookup
    /// of a string decides its colour.
    pub fn resolve(&mut self, text: &str, fallback: Rgba) -> Rgba {
        if let Some(color) = self.resolved.get(text) {
            return *color;
        }
        let color = Rgba::parse_or(text, fallback);
        self.resolved.insert(text.to_string(), color);
        color
    }

    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }
}

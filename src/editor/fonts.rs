// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! System font resolution for text labels.
//!
//! Font families are requested by name (the text panel offers a fixed
//! list of common families); lookups go through font-kit and resolve to
//! `ab_glyph` fonts, cached per family. A family that cannot be found
//! falls back to the system sans-serif.

use ab_glyph::FontArc;
use font_kit::family_name::FamilyName;
use font_kit::properties::Properties;
use font_kit::source::SystemSource;
use std::collections::HashMap;

pub struct FontCache {
    /// `None` records a failed lookup so it is not retried every frame.
    fonts: HashMap<String, Option<FontArc>>,
    fallback: Option<FontArc>,
    fallback_resolved: bool,
}

impl FontCache {
    pub fn new() -> Self {
        Self {
            fonts: HashMap::new(),
            fallback: None,
            fallback_resolved: false,
        }
    }

    /// Resolve a font for `family`, falling back to sans-serif. Returns
    /// `None` only when no usable font exists on the system at all.
    pub fn get(&mut self, family: &str) -> Option<FontArc> {
        if !self.fonts.contains_key(family) {
            let loaded = load_family(&[FamilyName::Title(family.to_string())]);
            if loaded.is_none() {
                log::warn!("Font family '{}' not found, using fallback", family);
            }
            self.fonts.insert(family.to_string(), loaded);
        }

        match self.fonts.get(family) {
            Some(Some(font)) => Some(font.clone()),
            _ => self.fallback(),
        }
    }

    fn fallback(&mut self) -> Option<FontArc> {
        if !self.fallback_resolved {
            self.fallback = load_family(&[FamilyName::SansSerif]);
            self.fallback_resolved = true;
            if self.fallback.is_none() {
                log::error!("No system sans-serif font available; text labels will not render");
            }
        }
        self.fallback.clone()
    }
}

fn load_family(families: &[FamilyName]) -> Option<FontArc> {
    let handle = SystemSource::new()
        .select_best_match(families, &Properties::new())
        .ok()?;
    let font = handle.load().ok()?;
    let data = font.copy_font_data()?;
    FontArc::try_from_vec((*data).clone()).ok()
}

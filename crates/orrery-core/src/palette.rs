//! Top-level folder colors

use std::collections::HashMap;

use crate::model::Color;

/// Colors handed to top-level folders in order of first encounter.
pub const FOLDER_PALETTE: [Color; 8] = [
    Color(0x4e79a7),
    Color(0xf28e2b),
    Color(0xe15759),
    Color(0x76b7b2),
    Color(0x59a14f),
    Color(0xedc948),
    Color(0xb07aa1),
    Color(0xff9da7),
];

/// Root and top-level files.
pub const NEUTRAL: Color = Color(0x9aa0a6);

/// External packages.
pub const PACKAGE: Color = Color(0x6b6ecf);

/// Assigns palette entries to top-level folders, wrapping around after eight.
#[derive(Debug, Default, Clone)]
pub struct Palette {
    assigned: HashMap<String, Color>,
    next: usize,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Color for a top-level folder, assigning the next entry on first use.
    pub fn color_for(&mut self, top_level: &str) -> Color {
        if let Some(color) = self.assigned.get(top_level) {
            return *color;
        }
        let color = FOLDER_PALETTE[self.next % FOLDER_PALETTE.len()];
        self.next += 1;
        self.assigned.insert(top_level.to_string(), color);
        color
    }

    /// Color already given to a top-level folder, if any.
    pub fn get(&self, top_level: &str) -> Option<Color> {
        self.assigned.get(top_level).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_encounter_order() {
        let mut palette = Palette::new();
        assert_eq!(palette.color_for("src"), FOLDER_PALETTE[0]);
        assert_eq!(palette.color_for("lib"), FOLDER_PALETTE[1]);
        assert_eq!(palette.color_for("src"), FOLDER_PALETTE[0]);
    }

    #[test]
    fn test_wraps_after_eight() {
        let mut palette = Palette::new();
        for i in 0..8 {
            palette.color_for(&format!("f{i}"));
        }
        assert_eq!(palette.color_for("ninth"), FOLDER_PALETTE[0]);
        assert_eq!(palette.get("f3"), Some(FOLDER_PALETTE[3]));
    }
}

use crate::identifier::CountryCode;
use crate::index::CountryIndex;

/// 0xRRGGBB.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Rgb(pub u32);

impl Rgb {
    pub fn hex(self) -> String {
        format!("#{:06x}", self.0 & 0xFF_FFFF)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LineStyle {
    pub color: Rgb,
    pub opacity: f32,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FillStyle {
    pub color: Rgb,
    pub opacity: f32,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CountryVisual {
    pub border: LineStyle,
    pub fill: FillStyle,
}

impl CountryVisual {
    pub const DEFAULT: Self = Self {
        border: LineStyle {
            color: Rgb(0xFFFFFF),
            opacity: 0.5,
        },
        fill: FillStyle {
            color: Rgb(0x808080),
            opacity: 0.1,
        },
    };

    pub const HIGHLIGHT: Self = Self {
        border: LineStyle {
            color: Rgb(0xFFFF00),
            opacity: 1.0,
        },
        fill: FillStyle {
            color: Rgb(0xFFFF00),
            opacity: 0.3,
        },
    };

    pub fn is_highlighted(&self) -> bool {
        *self == Self::HIGHLIGHT
    }
}

impl Default for CountryVisual {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Render styles for every index slot, plus the code each slot answers to.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryVisuals {
    visuals: Vec<CountryVisual>,
    codes: Vec<Option<CountryCode>>,
}

impl CountryVisuals {
    pub fn for_index(index: &CountryIndex) -> Self {
        let mut visuals = Self {
            visuals: vec![CountryVisual::DEFAULT; index.len()],
            codes: Vec::new(),
        };
        visuals.refresh_codes(index);
        visuals
    }

    /// Re-reads which code each slot answers to. Needed after aliases are
    /// added to the index, since slots without their own alpha-3 code are
    /// matched through the alias table.
    pub fn refresh_codes(&mut self, index: &CountryIndex) {
        self.codes = (0..index.len()).map(|slot| index.slot_code(slot)).collect();
    }

    pub fn len(&self) -> usize {
        self.visuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visuals.is_empty()
    }

    pub fn get(&self, slot: usize) -> Option<&CountryVisual> {
        self.visuals.get(slot)
    }

    pub fn reset_all(&mut self) {
        self.visuals.fill(CountryVisual::DEFAULT);
    }

    /// Highlights every slot whose code equals `code`; returns how many.
    pub fn highlight_code(&mut self, code: &CountryCode) -> usize {
        let mut n = 0;
        for (visual, slot_code) in self.visuals.iter_mut().zip(&self.codes) {
            if slot_code.as_ref() == Some(code) {
                *visual = CountryVisual::HIGHLIGHT;
                n += 1;
            }
        }
        n
    }

    pub fn highlighted_slots(&self) -> Vec<usize> {
        self.visuals
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_highlighted())
            .map(|(slot, _)| slot)
            .collect()
    }
}

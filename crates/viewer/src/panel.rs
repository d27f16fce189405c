use catalog::{ContentKind, CountryRecord, DisplayImage, GeneratedBasicInfo, ImageKind, image_src};
use scene::CountryCode;

/// Resolved image sources for a shown country.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelImages {
    pub flag: String,
    pub currency: String,
    pub animal: String,
}

impl PanelImages {
    pub fn for_record(record: &CountryRecord, api_base: &str) -> Self {
        let src = |kind: ImageKind| image_src(record.image(kind), kind, api_base);
        Self {
            flag: src(ImageKind::Flag),
            currency: src(ImageKind::Currency),
            animal: src(ImageKind::Animal),
        }
    }

    pub fn src(&self, kind: ImageKind) -> &str {
        match kind {
            ImageKind::Flag => &self.flag,
            ImageKind::Currency => &self.currency,
            ImageKind::Animal => &self.animal,
        }
    }

    /// Slots showing their placeholder instead of a stored image.
    pub fn fallbacks(&self) -> usize {
        [
            (&self.flag, ImageKind::Flag),
            (&self.currency, ImageKind::Currency),
            (&self.animal, ImageKind::Animal),
        ]
        .into_iter()
        .filter(|(src, kind)| src.as_str() == kind.fallback_uri())
        .count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryPanel {
    pub record: CountryRecord,
    pub images: PanelImages,
    /// Pictures that finished loading, at most one per kind.
    loaded: Vec<(ImageKind, DisplayImage)>,
}

impl CountryPanel {
    pub fn new(record: CountryRecord, api_base: &str) -> Self {
        let images = PanelImages::for_record(&record, api_base);
        Self {
            record,
            images,
            loaded: Vec::new(),
        }
    }

    pub fn display(&self, kind: ImageKind) -> Option<&DisplayImage> {
        self.loaded.iter().find(|(k, _)| *k == kind).map(|(_, image)| image)
    }

    pub fn set_display(&mut self, kind: ImageKind, image: DisplayImage) {
        self.loaded.retain(|(k, _)| *k != kind);
        self.loaded.push((kind, image));
    }

    /// Content worth generating: blank basic fields, and pictures that are
    /// missing or failed to load.
    pub fn missing_content(&self) -> Vec<ContentKind> {
        let mut missing = Vec::new();
        let r = &self.record;
        if r.capital.is_none() || r.population.is_none() || r.area.is_none() {
            missing.push(ContentKind::BasicInfo);
        }
        for kind in [ImageKind::Flag, ImageKind::Currency, ImageKind::Animal] {
            let placeholder = self.images.src(kind) == kind.fallback_uri();
            let failed = self.display(kind).is_some_and(DisplayImage::is_fallback);
            if placeholder || failed {
                missing.push(ContentKind::Image(kind));
            }
        }
        missing
    }
}

/// What the info panel shows for the current selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PanelState {
    #[default]
    Hidden,
    /// Metadata requested, not yet arrived.
    Loading(CountryCode),
    Shown(Box<CountryPanel>),
    /// The catalog has no record for the country.
    Unknown(CountryCode),
    Error { code: CountryCode, message: String },
}

impl PanelState {
    /// The country the panel is about, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            PanelState::Hidden => None,
            PanelState::Loading(code) | PanelState::Unknown(code) | PanelState::Error { code, .. } => {
                Some(code.as_str())
            }
            PanelState::Shown(panel) => Some(panel.record.alpha3_code.as_str()),
        }
    }

    pub fn is_visible(&self) -> bool {
        !matches!(self, PanelState::Hidden)
    }

    pub fn missing_content(&self) -> Vec<ContentKind> {
        match self {
            PanelState::Shown(panel) => panel.missing_content(),
            _ => Vec::new(),
        }
    }

    /// Fills blank basic fields of a shown record from generated text.
    ///
    /// Returns how many fields were filled. Stored values are never overwritten.
    pub fn fill_generated(&mut self, code: &CountryCode, text: &str) -> usize {
        let PanelState::Shown(panel) = self else {
            return 0;
        };
        if panel.record.alpha3_code != code.as_str() {
            return 0;
        }
        let generated = GeneratedBasicInfo::parse(text);
        let record = &mut panel.record;
        let mut filled = 0;
        for (slot, value) in [
            (&mut record.capital, generated.capital),
            (&mut record.population, generated.population),
            (&mut record.area, generated.area),
        ] {
            if slot.is_none() && value.is_some() {
                *slot = value;
                filled += 1;
            }
        }
        filled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::Illustration;
    use pretty_assertions::assert_eq;

    #[test]
    fn images_resolve_or_fall_back() {
        let mut record = CountryRecord::new("CHN", "China");
        record.flag = Some(Illustration {
            image: Some("images/chn.png".into()),
            ..Illustration::default()
        });
        let images = PanelImages::for_record(&record, "http://api.test");
        assert_eq!(images.flag, "http://api.test/static/images/chn.png");
        assert_eq!(images.animal, ImageKind::Animal.fallback_uri());
        assert_eq!(images.fallbacks(), 2);
    }

    #[test]
    fn generated_text_fills_only_blanks() {
        let mut record = CountryRecord::new("CHN", "China");
        record.capital = Some("Beijing".into());
        let mut panel = PanelState::Shown(Box::new(CountryPanel::new(record, "")));

        let chn = CountryCode::new("CHN");
        assert_eq!(panel.fill_generated(&CountryCode::new("FRA"), "人口：6800万"), 0);
        assert_eq!(panel.fill_generated(&chn, "首都：北京；人口：约14亿；面积：960万"), 2);

        let PanelState::Shown(shown) = &panel else {
            panic!("panel should stay shown");
        };
        assert_eq!(shown.record.capital.as_deref(), Some("Beijing"));
        assert_eq!(shown.record.population.as_deref(), Some("约14亿"));
        assert_eq!(panel.code(), Some("CHN"));
    }

    #[test]
    fn missing_content_lists_blanks_and_failed_images() {
        let mut record = CountryRecord::new("CHN", "China");
        record.capital = Some("Beijing".into());
        record.set_image(ImageKind::Flag, "images/chn.png".into());
        record.set_image(ImageKind::Currency, "images/cny.png".into());
        let mut panel = CountryPanel::new(record, "http://api.test");
        assert_eq!(
            panel.missing_content(),
            vec![ContentKind::BasicInfo, ContentKind::Image(ImageKind::Animal)]
        );

        panel.set_display(ImageKind::Currency, DisplayImage::Fallback { src: ImageKind::Currency.fallback_uri() });
        panel.record.population = Some("14亿".into());
        panel.record.area = Some("960万".into());
        assert_eq!(
            panel.missing_content(),
            vec![ContentKind::Image(ImageKind::Currency), ContentKind::Image(ImageKind::Animal)]
        );
        assert!(PanelState::Hidden.missing_content().is_empty());
    }

    #[test]
    fn hidden_panel_ignores_generated_text() {
        let mut panel = PanelState::default();
        assert_eq!(panel.fill_generated(&CountryCode::new("CHN"), "首都：北京"), 0);
        assert!(!panel.is_visible());
        assert_eq!(panel.code(), None);
    }
}

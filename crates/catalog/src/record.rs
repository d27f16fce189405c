use serde::{Deserialize, Serialize};

use crate::image::ImageKind;

/// Named picture with a caption: a flag or a national animal.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Illustration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Any form accepted by [`crate::image::ImageRef::classify`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Metadata document for one country, keyed by alpha-3 code.
///
/// Population and area are free text ("14亿", "9,600,000 km²").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryRecord {
    pub alpha3_code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag: Option<Illustration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capital: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub famous_animal: Option<Illustration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
}

impl CountryRecord {
    pub fn new(alpha3_code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            alpha3_code: alpha3_code.into(),
            name: name.into(),
            flag: None,
            capital: None,
            population: None,
            area: None,
            famous_animal: None,
            currency: None,
        }
    }

    pub fn basic(&self) -> BasicInfo {
        BasicInfo {
            alpha3_code: self.alpha3_code.clone(),
            name: self.name.clone(),
            capital: self.capital.clone(),
            population: self.population.clone(),
            area: self.area.clone(),
        }
    }

    pub fn images(&self) -> ImageSet {
        ImageSet {
            flag: self.flag.clone(),
            currency: self.currency.clone(),
            famous_animal: self.famous_animal.clone(),
        }
    }

    /// Stored reference for one picture slot.
    pub fn image(&self, kind: ImageKind) -> Option<&str> {
        match kind {
            ImageKind::Flag => self.flag.as_ref().and_then(|i| i.image.as_deref()),
            ImageKind::Currency => self.currency.as_ref().and_then(|c| c.image.as_deref()),
            ImageKind::Animal => self.famous_animal.as_ref().and_then(|i| i.image.as_deref()),
        }
    }

    /// Replaces the picture of one slot, keeping its captions.
    pub fn set_image(&mut self, kind: ImageKind, image: String) {
        match kind {
            ImageKind::Flag => self.flag.get_or_insert_with(Illustration::default).image = Some(image),
            ImageKind::Currency => self.currency.get_or_insert_with(Currency::default).image = Some(image),
            ImageKind::Animal => {
                self.famous_animal.get_or_insert_with(Illustration::default).image = Some(image)
            }
        }
    }
}

/// Text-only projection served without image payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicInfo {
    pub alpha3_code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capital: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag: Option<Illustration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub famous_animal: Option<Illustration>,
}

/// Partial update. Present top-level fields replace the stored ones whole;
/// absent fields are kept.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub flag: Option<Illustration>,
    #[serde(default)]
    pub capital: Option<String>,
    #[serde(default)]
    pub population: Option<String>,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub famous_animal: Option<Illustration>,
    #[serde(default)]
    pub currency: Option<Currency>,
}

impl CountryPatch {
    pub fn apply(self, record: &mut CountryRecord) {
        if let Some(name) = self.name {
            record.name = name;
        }
        if self.flag.is_some() {
            record.flag = self.flag;
        }
        if self.capital.is_some() {
            record.capital = self.capital;
        }
        if self.population.is_some() {
            record.population = self.population;
        }
        if self.area.is_some() {
            record.area = self.area;
        }
        if self.famous_animal.is_some() {
            record.famous_animal = self.famous_animal;
        }
        if self.currency.is_some() {
            record.currency = self.currency;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn json_uses_camel_case_and_skips_missing() {
        let mut r = CountryRecord::new("CHN", "China");
        r.famous_animal = Some(Illustration {
            name: Some("Giant panda".into()),
            ..Illustration::default()
        });
        let json = serde_json::to_value(&r).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "alpha3Code": "CHN",
                "name": "China",
                "famousAnimal": { "name": "Giant panda" }
            })
        );
    }

    #[test]
    fn projections() {
        let mut r = CountryRecord::new("FRA", "France");
        r.capital = Some("Paris".into());
        r.flag = Some(Illustration {
            image: Some("images/fra.png".into()),
            ..Illustration::default()
        });
        let basic = r.basic();
        assert_eq!(basic.capital.as_deref(), Some("Paris"));
        let images = r.images();
        assert_eq!(images.flag, r.flag);
        assert_eq!(images.currency, None);
    }

    #[test]
    fn set_image_keeps_captions() {
        let mut r = CountryRecord::new("CHN", "China");
        r.famous_animal = Some(Illustration {
            name: Some("Giant panda".into()),
            ..Illustration::default()
        });
        r.set_image(ImageKind::Animal, "QUJD".into());
        r.set_image(ImageKind::Currency, "images/cny.png".into());

        assert_eq!(r.image(ImageKind::Animal), Some("QUJD"));
        assert_eq!(r.famous_animal.as_ref().and_then(|a| a.name.as_deref()), Some("Giant panda"));
        assert_eq!(r.image(ImageKind::Currency), Some("images/cny.png"));
        assert_eq!(r.image(ImageKind::Flag), None);
    }

    #[test]
    fn patch_keeps_absent_fields() {
        let mut r = CountryRecord::new("FRA", "France");
        r.capital = Some("Paris".into());
        let patch: CountryPatch =
            serde_json::from_str(r#"{"population": "68 million", "currency": {"code": "EUR"}}"#).expect("parse");
        patch.apply(&mut r);
        assert_eq!(r.capital.as_deref(), Some("Paris"));
        assert_eq!(r.population.as_deref(), Some("68 million"));
        assert_eq!(r.currency.and_then(|c| c.code).as_deref(), Some("EUR"));
    }
}

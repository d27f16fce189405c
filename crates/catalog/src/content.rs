use crate::image::ImageKind;

/// What the content generator is asked to produce for a country.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ContentKind {
    /// Short text with capital, population and area.
    BasicInfo,
    Image(ImageKind),
}

/// Fields extracted from generated basic-info text of the form
/// `首都：…；人口：…；面积：…`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GeneratedBasicInfo {
    pub capital: Option<String>,
    pub population: Option<String>,
    pub area: Option<String>,
}

impl GeneratedBasicInfo {
    pub fn parse(text: &str) -> Self {
        Self {
            capital: field_after(text, "首都："),
            population: field_after(text, "人口："),
            area: field_after(text, "面积："),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.capital.is_none() && self.population.is_none() && self.area.is_none()
    }
}

/// Text after the first `label`, up to the next full-width semicolon.
fn field_after(text: &str, label: &str) -> Option<String> {
    let (_, rest) = text.split_once(label)?;
    let value = rest.split('；').next().unwrap_or(rest).trim();
    if value.is_empty() {
        return None;
    }
    Some(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::GeneratedBasicInfo;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_all_fields() {
        let info = GeneratedBasicInfo::parse("首都：北京；人口：约14亿；面积：约960万平方公里。");
        assert_eq!(info.capital.as_deref(), Some("北京"));
        assert_eq!(info.population.as_deref(), Some("约14亿"));
        assert_eq!(info.area.as_deref(), Some("约960万平方公里。"));
    }

    #[test]
    fn missing_fields_stay_empty() {
        let info = GeneratedBasicInfo::parse("首都： 巴黎 ");
        assert_eq!(info.capital.as_deref(), Some("巴黎"));
        assert_eq!(info.population, None);
        assert!(GeneratedBasicInfo::parse("no structured data").is_empty());
    }
}

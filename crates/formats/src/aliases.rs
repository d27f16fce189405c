use serde_json::Value;

use crate::error::GeoDataError;
use crate::geo_feature::normalize_alpha3;

/// One preconfigured alias → alpha-3 pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedAlias {
    pub alias: String,
    pub code: String,
}

/// Parses a JSON object of `{ "alias": "ABC" }` pairs, in key order.
///
/// Values must be alpha-3 codes; anything else is rejected so a bad seed file
/// is noticed at startup rather than at selection time.
pub fn parse_alias_seed(payload: &str) -> Result<Vec<SeedAlias>, GeoDataError> {
    let value: Value = serde_json::from_str(payload).map_err(GeoDataError::Json)?;
    let obj = value.as_object().ok_or_else(|| GeoDataError::InvalidAlias {
        alias: String::new(),
        reason: "alias seed must be a JSON object".to_string(),
    })?;

    let mut out = Vec::with_capacity(obj.len());
    for (alias, code) in obj {
        let code = code
            .as_str()
            .and_then(normalize_alpha3)
            .ok_or_else(|| GeoDataError::InvalidAlias {
                alias: alias.clone(),
                reason: format!("expected an alpha-3 code, found {code}"),
            })?;
        out.push(SeedAlias {
            alias: alias.clone(),
            code,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{SeedAlias, parse_alias_seed};
    use crate::error::GeoDataError;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_pairs() {
        let seeds = parse_alias_seed(r#"{"156": "CHN", "Taiwan": "twn"}"#).expect("parse");
        assert_eq!(
            seeds,
            vec![
                SeedAlias { alias: "156".into(), code: "CHN".into() },
                SeedAlias { alias: "Taiwan".into(), code: "TWN".into() },
            ]
        );
    }

    #[test]
    fn rejects_non_codes() {
        assert!(matches!(
            parse_alias_seed(r#"{"156": 156}"#),
            Err(GeoDataError::InvalidAlias { .. })
        ));
        assert!(matches!(
            parse_alias_seed(r#"["CHN"]"#),
            Err(GeoDataError::InvalidAlias { .. })
        ));
    }
}

use std::collections::BTreeMap;

use foundation::bounds::Aabb3;
use formats::{GeoFeature, SeedAlias};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::identifier::{AliasKey, CountryCode, Identifier};
use crate::mesh::{BoundaryMesh, MeshIssue, MeshOptions, RegionMesh, build_country_mesh};
use crate::spatial::{Bvh, Item as BvhItem};

/// Identity attached to a country's meshes and reported by picking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshTag {
    /// Numeric id when the feature had one, else its alpha-3 code, else its name.
    pub country_id: Identifier,
    pub country_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountryEntry {
    pub slot: usize,
    pub tag: MeshTag,
    pub alpha3: Option<CountryCode>,
    pub boundary: BoundaryMesh,
    pub region: RegionMesh,
    pub bounds: Option<Aabb3>,
}

/// Totals gathered while building an index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub countries: usize,
    pub segments: usize,
    pub triangles: usize,
    pub degenerate_rings: usize,
    pub triangulation_failures: usize,
    /// Entries without an alpha-3 code; pickable but never highlighted.
    pub without_code: usize,
}

/// The fields linear resolution compares against, in feature order.
#[derive(Debug, Clone)]
struct FeatureKeys {
    numeric_id: Option<i64>,
    iso_code: Option<String>,
    name: String,
}

/// Country meshes plus the alias → alpha-3 resolution table.
///
/// Entries never change after `build`. The table grows as lookups discover
/// new aliases; one resolution holds the table lock from lookup to insert.
#[derive(Debug)]
pub struct CountryIndex {
    entries: Vec<CountryEntry>,
    keys: Vec<FeatureKeys>,
    table: Mutex<BTreeMap<AliasKey, CountryCode>>,
    bvh: Bvh,
    report: BuildReport,
}

impl CountryIndex {
    pub fn build(features: &[GeoFeature], opts: &MeshOptions) -> Self {
        let mut entries = Vec::with_capacity(features.len());
        let mut keys = Vec::with_capacity(features.len());
        let mut table = BTreeMap::new();
        let mut bvh_items = Vec::new();
        let mut report = BuildReport::default();

        for (slot, feature) in features.iter().enumerate() {
            let mesh = build_country_mesh(&feature.geometry, opts);
            for issue in &mesh.issues {
                debug!(slot, name = %feature.name, %issue, "mesh issue");
                match issue {
                    MeshIssue::DegenerateRing { .. } => report.degenerate_rings += 1,
                    MeshIssue::TriangulationFailed { .. } => report.triangulation_failures += 1,
                }
            }

            let alpha3 = feature.iso_code.as_deref().map(CountryCode::new);
            match &alpha3 {
                Some(code) => insert_feature_aliases(&mut table, feature, code),
                None => report.without_code += 1,
            }

            if let Some(bounds) = mesh.bounds {
                bvh_items.push(BvhItem { slot, bounds });
            }
            report.segments += mesh.boundary.segments.len();
            report.triangles += mesh.region.triangles.len();

            entries.push(CountryEntry {
                slot,
                tag: tag_for(feature),
                alpha3,
                boundary: mesh.boundary,
                region: mesh.region,
                bounds: mesh.bounds,
            });
            keys.push(FeatureKeys {
                numeric_id: feature.numeric_id,
                iso_code: feature.iso_code.clone(),
                name: feature.name.clone(),
            });
        }
        report.countries = entries.len();

        info!(
            countries = report.countries,
            segments = report.segments,
            triangles = report.triangles,
            degenerate_rings = report.degenerate_rings,
            triangulation = opts.triangulation.as_str(),
            "built country index"
        );

        Self {
            entries,
            keys,
            table: Mutex::new(table),
            bvh: Bvh::build(bvh_items),
            report,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[CountryEntry] {
        &self.entries
    }

    pub fn entry(&self, slot: usize) -> Option<&CountryEntry> {
        self.entries.get(slot)
    }

    /// Code a slot answers to: the feature's own alpha-3, else whatever its
    /// tag resolves to through the alias table.
    pub fn slot_code(&self, slot: usize) -> Option<CountryCode> {
        let entry = self.entries.get(slot)?;
        match &entry.alpha3 {
            Some(code) => Some(code.clone()),
            None => self.resolve(&entry.tag.country_id),
        }
    }

    /// Slots answering to `code`, ascending.
    pub fn slots_for(&self, code: &CountryCode) -> Vec<usize> {
        (0..self.entries.len())
            .filter(|&slot| self.slot_code(slot).as_ref() == Some(code))
            .collect()
    }

    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    pub(crate) fn bvh(&self) -> &Bvh {
        &self.bvh
    }

    pub fn table_len(&self) -> usize {
        self.table.lock().len()
    }

    /// Direct table lookup without any fallback.
    pub fn lookup(&self, key: &AliasKey) -> Option<CountryCode> {
        self.table.lock().get(key).cloned()
    }

    /// Inserts preconfigured aliases. Existing keys are overwritten.
    pub fn seed_aliases(&self, seeds: &[SeedAlias]) {
        let mut table = self.table.lock();
        for seed in seeds {
            let code = CountryCode::new(seed.code.as_str());
            table.insert(AliasKey::text(seed.alias.as_str()), code.clone());
            table.insert(AliasKey::from(&code), code);
        }
        debug!(count = seeds.len(), "seeded aliases");
    }

    /// Maps any identifier to its canonical alpha-3 code.
    ///
    /// Order: direct lookup; for numbers, lookup of the decimal string; a
    /// three-character code or name taken literally; a scan of features by
    /// numeric id, string id, alpha-3, then name. Every returned code is
    /// recorded as mapping to itself, so resolution is idempotent.
    pub fn resolve(&self, id: &Identifier) -> Option<CountryCode> {
        let mut table = self.table.lock();

        if let Some(code) = table.get(&id.key()).cloned() {
            table.entry(AliasKey::from(&code)).or_insert_with(|| code.clone());
            return Some(code);
        }

        let text = id.text();
        if id.is_numeric() {
            if let Some(code) = table.get(&AliasKey::Text(text.clone())).cloned() {
                table.insert(id.key(), code.clone());
                table.entry(AliasKey::from(&code)).or_insert_with(|| code.clone());
                return Some(code);
            }
        } else if text.chars().count() == 3 {
            let code = CountryCode::new(text);
            table.insert(AliasKey::from(&code), code.clone());
            return Some(code);
        }

        debug!(%id, "identifier not in table; scanning features");
        let found = self.keys.iter().find_map(|k| {
            let code = k.iso_code.as_deref()?;
            let matched = match id {
                Identifier::Numeric(n) => k.numeric_id == Some(*n),
                Identifier::Code(s) | Identifier::Name(s) => {
                    k.numeric_id.is_some_and(|n| n.to_string() == *s)
                        || code == s.as_str()
                        || k.name == *s
                }
            };
            matched.then(|| (k, CountryCode::new(code)))
        });

        let Some((keys, code)) = found else {
            debug!(%id, "identifier unresolved");
            return None;
        };

        table.insert(id.key(), code.clone());
        if let Some(n) = keys.numeric_id {
            table.insert(AliasKey::Numeric(n), code.clone());
            table.insert(AliasKey::Text(n.to_string()), code.clone());
        }
        if !keys.name.is_empty() {
            table.insert(AliasKey::Text(keys.name.clone()), code.clone());
        }
        table.insert(AliasKey::from(&code), code.clone());
        Some(code)
    }
}

fn tag_for(feature: &GeoFeature) -> MeshTag {
    let country_id = match (feature.numeric_id, &feature.iso_code) {
        (Some(n), _) => Identifier::Numeric(n),
        (None, Some(code)) => Identifier::Code(code.clone()),
        (None, None) => Identifier::Name(feature.name.clone()),
    };
    MeshTag {
        country_id,
        country_name: feature.name.clone(),
    }
}

fn insert_feature_aliases(
    table: &mut BTreeMap<AliasKey, CountryCode>,
    feature: &GeoFeature,
    code: &CountryCode,
) {
    if let Some(n) = feature.numeric_id {
        table.insert(AliasKey::Numeric(n), code.clone());
        table.insert(AliasKey::Text(n.to_string()), code.clone());
    }
    table.insert(AliasKey::from(code), code.clone());
    if !feature.name.is_empty() {
        table.insert(AliasKey::Text(feature.name.clone()), code.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formats::{GeoGeometry, parse_alias_seed};
    use foundation::math::LonLat;
    use pretty_assertions::assert_eq;

    fn square(lon: f64, lat: f64, size: f64) -> GeoGeometry {
        GeoGeometry::Polygon(vec![vec![
            LonLat::new(lon, lat),
            LonLat::new(lon + size, lat),
            LonLat::new(lon + size, lat + size),
            LonLat::new(lon, lat + size),
        ]])
    }

    fn sample() -> CountryIndex {
        let features = vec![
            GeoFeature::new("China", square(100.0, 25.0, 10.0))
                .with_numeric_id(156)
                .with_iso_code("CHN"),
            GeoFeature::new("France", square(0.0, 44.0, 5.0)).with_iso_code("FRA"),
            GeoFeature::new("Somaliland", square(45.0, 9.0, 2.0)).with_numeric_id(900),
        ];
        CountryIndex::build(&features, &MeshOptions::default())
    }

    #[test]
    fn china_aliases_agree() {
        let index = sample();
        let chn = Some(CountryCode::new("CHN"));
        assert_eq!(index.resolve(&Identifier::Numeric(156)), chn);
        assert_eq!(index.resolve(&Identifier::Name("156".into())), chn);
        assert_eq!(index.resolve(&Identifier::Code("CHN".into())), chn);
        assert_eq!(index.resolve(&Identifier::Name("China".into())), chn);
        assert_eq!(index.slots_for(&CountryCode::new("CHN")), vec![0]);
    }

    #[test]
    fn code_only_feature_gets_identity_and_name() {
        let index = sample();
        assert_eq!(index.lookup(&AliasKey::text("FRA")), Some(CountryCode::new("FRA")));
        assert_eq!(index.lookup(&AliasKey::text("France")), Some(CountryCode::new("FRA")));
        assert_eq!(index.entries()[1].tag.country_id, Identifier::Code("FRA".into()));
    }

    #[test]
    fn resolution_is_idempotent() {
        let index = sample();
        for id in [
            Identifier::Numeric(156),
            Identifier::Name("France".into()),
            Identifier::Code("XYZ".into()),
        ] {
            let code = index.resolve(&id).expect("resolves");
            assert_eq!(index.resolve(&Identifier::from(&code)), Some(code.clone()));
            assert_eq!(index.lookup(&AliasKey::from(&code)), Some(code));
        }
    }

    #[test]
    fn literal_three_character_codes_are_accepted() {
        let index = sample();
        assert_eq!(index.resolve(&Identifier::Code("DEU".into())), Some(CountryCode::new("DEU")));
        assert_eq!(index.lookup(&AliasKey::text("DEU")), Some(CountryCode::new("DEU")));
    }

    #[test]
    fn unknown_and_codeless_identifiers_do_not_resolve() {
        let index = sample();
        assert_eq!(index.resolve(&Identifier::Numeric(999)), None);
        assert_eq!(index.resolve(&Identifier::Name("Atlantis".into())), None);
        // Present in the data but has no alpha-3 code.
        assert_eq!(index.resolve(&Identifier::Numeric(900)), None);
        assert_eq!(index.report().without_code, 1);
    }

    #[test]
    fn scan_writes_through_all_aliases() {
        let features = vec![
            GeoFeature::new("Chile", square(-75.0, -40.0, 5.0))
                .with_numeric_id(152)
                .with_iso_code("CHL"),
        ];
        let index = CountryIndex::build(&features, &MeshOptions::default());
        // Clear the build-time mapping for the numeric id to force the scan.
        index.table.lock().clear();

        assert_eq!(index.resolve(&Identifier::Numeric(152)), Some(CountryCode::new("CHL")));
        assert_eq!(index.lookup(&AliasKey::text("152")), Some(CountryCode::new("CHL")));
        assert_eq!(index.lookup(&AliasKey::text("Chile")), Some(CountryCode::new("CHL")));
        assert_eq!(index.lookup(&AliasKey::text("CHL")), Some(CountryCode::new("CHL")));
    }

    #[test]
    fn seeded_aliases_resolve() {
        let index = sample();
        let seeds = parse_alias_seed(r#"{"People's Republic of China": "CHN", "250": "FRA"}"#).expect("seed");
        index.seed_aliases(&seeds);
        assert_eq!(
            index.resolve(&Identifier::Name("People's Republic of China".into())),
            Some(CountryCode::new("CHN"))
        );
        assert_eq!(index.resolve(&Identifier::Numeric(250)), Some(CountryCode::new("FRA")));
        assert_eq!(index.lookup(&AliasKey::Numeric(250)), Some(CountryCode::new("FRA")));
    }

    #[test]
    fn numeric_only_slots_answer_to_seeded_codes() {
        let index = sample();
        assert_eq!(index.slot_code(2), None);
        assert!(index.slots_for(&CountryCode::new("SOL")).is_empty());

        index.seed_aliases(&parse_alias_seed(r#"{"900": "SOL"}"#).expect("seed"));
        assert_eq!(index.slot_code(2), Some(CountryCode::new("SOL")));
        assert_eq!(index.slots_for(&CountryCode::new("SOL")), vec![2]);
        assert_eq!(index.slot_code(1), Some(CountryCode::new("FRA")));
    }

    #[test]
    fn report_counts_meshes() {
        let index = sample();
        let report = index.report();
        assert_eq!(report.countries, 3);
        assert_eq!(report.segments, 9);
        assert_eq!(report.triangles, 6);
        assert_eq!(report.degenerate_rings, 0);
    }

    #[test]
    fn concurrent_resolvers_agree() {
        let index = std::sync::Arc::new(sample());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let index = index.clone();
                std::thread::spawn(move || index.resolve(&Identifier::Name("China".into())))
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().expect("join"), Some(CountryCode::new("CHN")));
        }
    }
}

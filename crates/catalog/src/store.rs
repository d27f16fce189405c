use std::collections::BTreeMap;

use crate::record::{CountryPatch, CountryRecord};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    NotFound,
    Invalid(String),
    Corrupt(String),
    Io(String),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::NotFound => write!(f, "country record not found"),
            CatalogError::Invalid(msg) => write!(f, "invalid country record: {msg}"),
            CatalogError::Corrupt(msg) => write!(f, "catalog data corrupt: {msg}"),
            CatalogError::Io(msg) => write!(f, "catalog storage error: {msg}"),
        }
    }
}

impl std::error::Error for CatalogError {}

/// Country metadata keyed by alpha-3 code.
pub trait CatalogStore {
    fn list(&self) -> Result<Vec<CountryRecord>, CatalogError>;
    fn get(&self, code: &str) -> Result<Option<CountryRecord>, CatalogError>;
    fn upsert(&mut self, record: CountryRecord) -> Result<(), CatalogError>;
    fn delete(&mut self, code: &str) -> Result<bool, CatalogError>;

    /// Applies `patch` to the stored record, creating it when absent.
    ///
    /// A new record needs a name; the path code always wins over any code
    /// in the body.
    fn upsert_patch(&mut self, code: &str, patch: CountryPatch) -> Result<CountryRecord, CatalogError> {
        validate_code(code)?;
        let mut record = match self.get(code)? {
            Some(existing) => existing,
            None => {
                let name = patch
                    .name
                    .clone()
                    .filter(|n| !n.trim().is_empty())
                    .ok_or_else(|| CatalogError::Invalid("name is required".to_string()))?;
                CountryRecord::new(code, name)
            }
        };
        patch.apply(&mut record);
        self.upsert(record.clone())?;
        Ok(record)
    }
}

fn validate_code(code: &str) -> Result<(), CatalogError> {
    if code.trim().is_empty() {
        return Err(CatalogError::Invalid("alpha-3 code is empty".to_string()));
    }
    Ok(())
}

#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    records: BTreeMap<String, CountryRecord>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads records from a JSON array of country documents.
    pub fn from_json_records(payload: &str) -> Result<Self, CatalogError> {
        let records: Vec<CountryRecord> =
            serde_json::from_str(payload).map_err(|e| CatalogError::Corrupt(e.to_string()))?;
        let mut store = Self::new();
        for record in records {
            store.upsert(record)?;
        }
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl CatalogStore for InMemoryCatalogStore {
    fn list(&self) -> Result<Vec<CountryRecord>, CatalogError> {
        Ok(self.records.values().cloned().collect())
    }

    fn get(&self, code: &str) -> Result<Option<CountryRecord>, CatalogError> {
        Ok(self.records.get(code).cloned())
    }

    fn upsert(&mut self, record: CountryRecord) -> Result<(), CatalogError> {
        validate_code(&record.alpha3_code)?;
        self.records.insert(record.alpha3_code.clone(), record);
        Ok(())
    }

    fn delete(&mut self, code: &str) -> Result<bool, CatalogError> {
        Ok(self.records.remove(code).is_some())
    }
}

//! Cached data types.

use std::collections::BTreeMap;

use es_core::{Configuration, FieldKind};
use serde::{Deserialize, Serialize};

use crate::key::CacheKey;

/// Form field name to value, as typed into (or selected on) the form.
pub type FieldMap = BTreeMap<String, String>;

/// On-disk representation of one cached snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: CacheKey,
    /// RFC 3339 time of the save. Informational only.
    pub saved_at: String,
    pub fields: FieldMap,
}

/// Write the six cached dropdown selections of `config` into `fields`.
pub fn merge_selections(fields: &mut FieldMap, config: &Configuration) {
    for kind in FieldKind::CACHED_SELECTIONS {
        fields.insert(kind.form_name().to_string(), config.get(kind).to_string());
    }
}

/// Overlay every selection of `config`, including the independent variable.
///
/// Applied to snapshots read back from the cache so the current selection
/// always wins over whatever was cached.
pub fn overlay_config(fields: &mut FieldMap, config: &Configuration) {
    for (name, value) in config.selections() {
        fields.insert(name.to_string(), value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use es_core::Propellant;

    #[test]
    fn merge_adds_six_selections() {
        let mut fields = FieldMap::new();
        fields.insert("V".to_string(), "1500".to_string());
        merge_selections(&mut fields, &Configuration::default());

        assert_eq!(fields.len(), 7);
        assert_eq!(fields["propellant"], "EMI-BF4,Ionic Liquid");
        assert!(!fields.contains_key("independentVariable"));
    }

    #[test]
    fn overlay_replaces_stale_selections() {
        let mut fields = FieldMap::new();
        fields.insert("propellant".to_string(), "Gallium,Liquid Metal".to_string());

        let mut config = Configuration::default();
        config.set_propellant(Propellant::EmiTfsi);
        overlay_config(&mut fields, &config);

        assert_eq!(fields["propellant"], "EMI-TFSI,Ionic Liquid");
        assert_eq!(fields["independentVariable"], "V");
    }
}

//! Field-name tables for the address collections.
//!
//! The two collections in the store do not share a layout: the national
//! `BLPU` export keeps its attributes at the top level while the south-west
//! regional import nests them under `properties`. Each collection gets its own
//! named table instead of one unified schema so either layout can change
//! without touching the other.

use serde::{Deserialize, Serialize};

/// Field names used to filter one collection. Dotted names address nested
/// fields (`properties.POSTCODE`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CollectionSchema {
    pub collection: String,
    pub postcode_field: String,
    pub easting_field: String,
    pub northing_field: String,
}

impl CollectionSchema {
    /// National address-base points (`BLPU`), flat layout.
    pub fn address() -> Self {
        Self {
            collection: "BLPU".to_string(),
            postcode_field: "POSTCODE_LOCATOR".to_string(),
            easting_field: "X_COORDINATE".to_string(),
            northing_field: "Y_COORDINATE".to_string(),
        }
    }

    /// South-west regional import, GeoJSON-style `properties` layout.
    pub fn south_west() -> Self {
        Self {
            collection: "southwest".to_string(),
            postcode_field: "properties.POSTCODE".to_string(),
            easting_field: "properties.X_COORDINATE".to_string(),
            northing_field: "properties.Y_COORDINATE".to_string(),
        }
    }

    /// Name of the first empty field, if any.
    pub(crate) fn first_blank(&self) -> Option<&'static str> {
        [
            ("collection", &self.collection),
            ("postcode_field", &self.postcode_field),
            ("easting_field", &self.easting_field),
            ("northing_field", &self.northing_field),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
    }
}

/// Selects one of the configured schema tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaTable {
    #[default]
    Address,
    SouthWest,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_keep_their_own_layout() {
        let address = CollectionSchema::address();
        let south_west = CollectionSchema::south_west();

        assert_eq!(address.easting_field, "X_COORDINATE");
        assert_eq!(south_west.easting_field, "properties.X_COORDINATE");
        assert_ne!(address.collection, south_west.collection);
    }

    #[test]
    fn first_blank_reports_field_name() {
        let mut schema = CollectionSchema::address();
        assert_eq!(schema.first_blank(), None);

        schema.northing_field = "  ".to_string();
        assert_eq!(schema.first_blank(), Some("northing_field"));
    }

    #[test]
    fn schema_table_uses_snake_case() {
        let table: SchemaTable = serde_json::from_str("\"south_west\"").unwrap();
        assert_eq!(table, SchemaTable::SouthWest);
    }
}

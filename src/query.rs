//! Lookup queries: an immutable filter plus a result cap.
//!
//! Filters are built with [`FilterBuilder`] from a closed set of
//! [`Condition`]s and translated into a store-native query only at the
//! backend boundary.
//!
//! ```rust
//! use ordnance::{Filter, LookupQuery};
//!
//! let filter = Filter::builder()
//!     .around("X_COORDINATE", 2000.0, 5.0)
//!     .around("Y_COORDINATE", 1000.0, 5.0)
//!     .build();
//! let query = LookupQuery::new("BLPU", filter, 2);
//!
//! assert_eq!(query.filter().conditions().len(), 2);
//! assert_eq!(query.cap(), 2);
//! ```

use serde_json::Value;

/// A document returned by the record store. Only filtered fields are ever
/// interpreted by the core.
pub type Record = Value;

/// One field condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Field equals the given string exactly.
    Equals { field: String, value: String },
    /// Numeric field lies in `[min, max]`, both ends inclusive.
    Range { field: String, min: f64, max: f64 },
}

impl Condition {
    pub fn field(&self) -> &str {
        match self {
            Condition::Equals { field, .. } | Condition::Range { field, .. } => field,
        }
    }

    /// Evaluate the condition against a record. Missing fields and values of
    /// the wrong type never match.
    pub fn matches(&self, record: &Record) -> bool {
        let Some(found) = field_value(record, self.field()) else {
            return false;
        };

        match self {
            Condition::Equals { value, .. } => found.as_str() == Some(value.as_str()),
            Condition::Range { min, max, .. } => found
                .as_f64()
                .is_some_and(|number| *min <= number && number <= *max),
        }
    }
}

/// Resolve a dotted field path (`properties.POSTCODE`) inside a record.
pub fn field_value<'a>(record: &'a Record, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(record, |current, segment| current.as_object()?.get(segment))
}

/// Conjunction of conditions, at most one per field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn builder() -> FilterBuilder {
        FilterBuilder::default()
    }

    /// A filter that matches every record.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.conditions.iter().all(|condition| condition.matches(record))
    }
}

#[derive(Debug, Default)]
pub struct FilterBuilder {
    conditions: Vec<Condition>,
}

impl FilterBuilder {
    pub fn equals(self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(Condition::Equals {
            field: field.into(),
            value: value.into(),
        })
    }

    pub fn range(self, field: impl Into<String>, min: f64, max: f64) -> Self {
        self.push(Condition::Range {
            field: field.into(),
            min,
            max,
        })
    }

    /// Inclusive range `[center - tolerance, center + tolerance]`.
    pub fn around(self, field: impl Into<String>, center: f64, tolerance: f64) -> Self {
        self.range(field, center - tolerance, center + tolerance)
    }

    pub fn build(self) -> Filter {
        Filter {
            conditions: self.conditions,
        }
    }

    // A later condition on the same field replaces the earlier one, which is
    // what a store-native document keyed by field name would do anyway.
    fn push(mut self, condition: Condition) -> Self {
        self.conditions
            .retain(|existing| existing.field() != condition.field());
        self.conditions.push(condition);
        self
    }
}

/// A bounded find against one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupQuery {
    collection: String,
    filter: Filter,
    cap: usize,
}

impl LookupQuery {
    pub fn new(collection: impl Into<String>, filter: Filter, cap: usize) -> Self {
        Self {
            collection: collection.into(),
            filter,
            cap,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn cap(&self) -> usize {
        self.cap
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn equals_matches_exact_string_only() {
        let filter = Filter::builder().equals("POSTCODE_LOCATOR", "EX4 4QJ").build();

        assert!(filter.matches(&json!({ "POSTCODE_LOCATOR": "EX4 4QJ" })));
        assert!(!filter.matches(&json!({ "POSTCODE_LOCATOR": "ex4 4qj" })));
        assert!(!filter.matches(&json!({ "POSTCODE_LOCATOR": 44 })));
        assert!(!filter.matches(&json!({ "OTHER": "EX4 4QJ" })));
    }

    #[test]
    fn range_is_inclusive_on_both_ends() {
        let filter = Filter::builder().around("X", 2000.0, 5.0).build();

        assert!(filter.matches(&json!({ "X": 1995 })));
        assert!(filter.matches(&json!({ "X": 2005.0 })));
        assert!(!filter.matches(&json!({ "X": 1994.99 })));
        assert!(!filter.matches(&json!({ "X": 2005.01 })));
        assert!(!filter.matches(&json!({ "X": "2000" })));
    }

    #[test]
    fn zero_tolerance_matches_the_point_only() {
        let filter = Filter::builder().around("X", 10.0, 0.0).build();
        assert!(filter.matches(&json!({ "X": 10 })));
        assert!(!filter.matches(&json!({ "X": 11 })));
    }

    #[test]
    fn dotted_paths_reach_nested_fields() {
        let record = json!({ "properties": { "POSTCODE": "TR1 1AA", "X_COORDINATE": 182000.0 } });

        assert_eq!(
            field_value(&record, "properties.POSTCODE"),
            Some(&json!("TR1 1AA"))
        );
        assert_eq!(field_value(&record, "properties.MISSING"), None);
        assert_eq!(field_value(&record, "properties.POSTCODE.deeper"), None);
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = Filter::all();
        assert!(filter.is_empty());
        assert!(filter.matches(&json!({})));
    }

    #[test]
    fn later_condition_replaces_earlier_on_same_field() {
        let filter = Filter::builder()
            .equals("POSTCODE_LOCATOR", "A")
            .equals("POSTCODE_LOCATOR", "B")
            .build();

        assert_eq!(
            filter.conditions(),
            &[Condition::Equals {
                field: "POSTCODE_LOCATOR".into(),
                value: "B".into()
            }]
        );
    }
}

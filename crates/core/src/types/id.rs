//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types. Placeholder data uses
//! short string identifiers (`r1`, `m3`), so the wrappers hold a `String`.

use chrono::{DateTime, Utc};

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`
/// - `From<&str>`, `From<String>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use foodapp_core::define_id;
/// define_id!(CourierId);
/// define_id!(ZoneId);
///
/// let courier = CourierId::new("c1");
/// let zone = ZoneId::new("c1");
///
/// // These are different types, so this won't compile:
/// // let _: CourierId = zone;
/// assert_eq!(courier.as_str(), zone.as_str());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(RestaurantId);
define_id!(MenuItemId);
define_id!(OrderId);

impl OrderId {
    /// Prefix of client-synthesized order identifiers.
    pub const PREFIX: &'static str = "ORD-";

    /// Synthesize an order identifier from a timestamp (`ORD-<unix millis>`).
    ///
    /// No uniqueness is guaranteed beyond millisecond resolution; there is no
    /// authority to allocate identifiers against.
    #[must_use]
    pub fn from_timestamp(at: DateTime<Utc>) -> Self {
        Self(format!("{}{}", Self::PREFIX, at.timestamp_millis()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_order_id_from_timestamp() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(OrderId::from_timestamp(at).as_str(), "ORD-1700000000123");
    }

    #[test]
    fn test_ids_serialize_transparently() {
        let id = MenuItemId::new("m1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"m1\"");

        let parsed: RestaurantId = serde_json::from_str("\"r4\"").unwrap();
        assert_eq!(parsed, RestaurantId::from("r4"));
    }

    #[test]
    fn test_display_matches_inner_value() {
        assert_eq!(RestaurantId::new("r1").to_string(), "r1");
    }
}

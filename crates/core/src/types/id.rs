//! Newtype IDs for type-safe entity references.
//!
//! Every identifier handed out by the remote API is opaque to the client, so
//! IDs wrap a `String`. Use the `define_id!` macro to create wrappers that
//! prevent accidentally mixing IDs from different entity types.
//!
//! The remote API is not consistent about the field an identifier lives in:
//! locally built payloads use `id`, wishlist rows use `productId`, and
//! documents straight from the database use `_id`. [`IdFields`] captures all
//! three and [`IdFields::resolve`] is the one place the fallback is decided.

use serde::{Deserialize, Deserializer, Serialize};

/// Raw identifier as it may appear on the wire.
///
/// Some endpoints emit numeric IDs, others strings.
#[doc(hidden)]
#[derive(Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

impl RawId {
    #[doc(hidden)]
    #[must_use]
    pub fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Signed(n) => n.to_string(),
            Self::Unsigned(n) => n.to_string(),
        }
    }
}

/// Deserialize an identifier from either a JSON string or a JSON integer.
///
/// # Errors
///
/// Returns an error if the value is neither a string nor an integer.
#[doc(hidden)]
pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(RawId::into_string)
}

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize` as a plain string, `Deserialize` from a string or an integer
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`
/// - `From<String>`, `From<&str>` and `AsRef<str>` implementations
///
/// # Example
///
/// ```rust
/// # use mirrorcraft_core::define_id;
/// define_id!(UserId);
/// define_id!(OrderId);
///
/// let user_id = UserId::new("u-1");
/// let order_id = OrderId::new("u-1");
///
/// // These are different types, so this won't compile:
/// // let _: UserId = order_id;
/// assert_eq!(user_id.as_str(), order_id.as_str());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, ::serde::Serialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying identifier.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                $crate::types::id::deserialize_lenient(deserializer).map(Self)
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Define standard entity IDs
define_id!(ProductId);
define_id!(CategoryId);
define_id!(OrderId);
define_id!(UserId);
define_id!(BlogId);

/// The three field names an entity identifier can arrive under.
///
/// Flatten this into any remote payload that carries an identifier and call
/// [`resolve`](Self::resolve) to get the canonical value. Resolution order is
/// `productId`, then `id`, then `_id`: a wishlist row's `_id` names the row
/// itself, so the product reference wins whenever it is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "I: Deserialize<'de>"))]
pub struct IdFields<I> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<I>,
    #[serde(
        default,
        rename = "productId",
        skip_serializing_if = "Option::is_none"
    )]
    pub product_id: Option<I>,
    #[serde(default, rename = "_id", skip_serializing_if = "Option::is_none")]
    pub object_id: Option<I>,
}

impl<I> Default for IdFields<I> {
    fn default() -> Self {
        Self {
            id: None,
            product_id: None,
            object_id: None,
        }
    }
}

impl<I> IdFields<I> {
    /// Build from a single `id` value.
    #[must_use]
    pub const fn from_id(id: I) -> Self {
        Self {
            id: Some(id),
            product_id: None,
            object_id: None,
        }
    }

    /// The canonical identifier, if any of the three fields is set.
    #[must_use]
    pub fn resolve(&self) -> Option<&I> {
        self.product_id
            .as_ref()
            .or(self.id.as_ref())
            .or(self.object_id.as_ref())
    }

    /// Consume and return the canonical identifier.
    #[must_use]
    pub fn into_resolved(self) -> Option<I> {
        self.product_id.or(self.id).or(self.object_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_deserializes_from_string_and_number() {
        let from_str: ProductId = serde_json::from_str("\"abc-1\"").unwrap();
        assert_eq!(from_str.as_str(), "abc-1");

        let from_num: ProductId = serde_json::from_str("42").unwrap();
        assert_eq!(from_num.as_str(), "42");
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = OrderId::new("ord_9");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"ord_9\"");
        assert_eq!(id.to_string(), "ord_9");
    }

    #[test]
    fn test_id_rejects_non_scalar() {
        let result: Result<ProductId, _> = serde_json::from_str("{\"x\":1}");
        assert!(result.is_err());
    }

    #[test]
    fn test_id_fields_prefers_product_id() {
        let fields: IdFields<ProductId> =
            serde_json::from_str(r#"{"_id":"row-1","productId":"p-7","id":"p-x"}"#).unwrap();
        assert_eq!(fields.resolve().unwrap().as_str(), "p-7");
    }

    #[test]
    fn test_id_fields_falls_back_to_id_then_object_id() {
        let fields: IdFields<ProductId> =
            serde_json::from_str(r#"{"_id":"mongo-1","id":"local-1"}"#).unwrap();
        assert_eq!(fields.resolve().unwrap().as_str(), "local-1");

        let fields: IdFields<ProductId> = serde_json::from_str(r#"{"_id":"mongo-1"}"#).unwrap();
        assert_eq!(fields.into_resolved().unwrap().as_str(), "mongo-1");
    }

    #[test]
    fn test_id_fields_empty() {
        let fields: IdFields<ProductId> = serde_json::from_str("{}").unwrap();
        assert!(fields.resolve().is_none());
    }
}

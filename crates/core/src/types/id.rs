//! Newtype IDs for type-safe entity references.
//!
//! Every table keys its rows by a UUID. The `define_id!` macro creates
//! wrappers that prevent accidentally mixing IDs from different entity types.
//!
//! Products additionally carry a [`DisplayId`], a small number derived from
//! the UUID for display purposes only. It is not unique and must never be
//! used to look anything up.

use serde::{Deserialize, Serialize};

/// Macro to define a type-safe UUID wrapper.
///
/// Creates a newtype wrapper around `uuid::Uuid` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_uuid()`, `generate()`
/// - `From<Uuid>`, `Into<Uuid>` and `FromStr`
/// - `sqlx` `Type`, `Encode`, and `Decode` implementations (with `postgres` feature)
///
/// # Example
///
/// ```rust
/// # use essence_core::define_id;
/// define_id!(UserId);
/// define_id!(OrderId);
///
/// let user_id = UserId::generate();
/// let order_id = OrderId::new(user_id.as_uuid());
///
/// // These are different types, so this won't compile:
/// // let _: UserId = order_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(::uuid::Uuid);

        impl $name {
            /// Wrap an existing UUID.
            #[must_use]
            pub const fn new(id: ::uuid::Uuid) -> Self {
                Self(id)
            }

            /// Generate a fresh random (v4) ID.
            #[must_use]
            pub fn generate() -> Self {
                Self(::uuid::Uuid::new_v4())
            }

            /// Get the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> ::uuid::Uuid {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::uuid::Error;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                ::uuid::Uuid::parse_str(s).map(Self)
            }
        }

        impl From<::uuid::Uuid> for $name {
            fn from(id: ::uuid::Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for ::uuid::Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <::uuid::Uuid as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <::uuid::Uuid as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
                let id = <::uuid::Uuid as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
                Ok(Self(id))
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <::uuid::Uuid as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

// Define standard entity IDs
define_id!(UserId);
define_id!(ProductId);
define_id!(CartItemId);
define_id!(OrderId);
define_id!(OrderItemId);
define_id!(AddressId);
define_id!(ReviewId);

impl OrderId {
    /// Short order reference shown to customers (first 8 characters).
    #[must_use]
    pub fn short_ref(&self) -> String {
        self.0.simple().to_string().chars().take(8).collect()
    }
}

/// Number of UUID characters that feed the display hash.
const DISPLAY_KEY_LEN: usize = 8;

/// Numeric product identifier for display.
///
/// Derived from the product UUID: the first eight characters of the
/// hyphen-free UUID string are folded with `a = (a << 5) - a + c` in wrapping
/// 32-bit arithmetic and the absolute value is taken. A zero hash falls back to
/// the product's 1-based position in the list being rendered.
///
/// Distinct products can share a display id. Cart, wishlist and order
/// operations always go through [`ProductId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayId(u32);

impl DisplayId {
    /// Derive the display id for a product at `index` in a listing.
    #[must_use]
    pub fn derive(product_id: ProductId, index: usize) -> Self {
        let key = product_id.as_uuid().simple().to_string();
        Self::from_key(&key, index)
    }

    /// Hash an arbitrary key, falling back to `index + 1` on a zero hash.
    #[must_use]
    pub fn from_key(key: &str, index: usize) -> Self {
        let hash = key
            .chars()
            .take(DISPLAY_KEY_LEN)
            .fold(0_i32, |acc, c| {
                acc.wrapping_shl(5)
                    .wrapping_sub(acc)
                    .wrapping_add(i32::try_from(u32::from(c)).unwrap_or(i32::MAX))
            })
            .unsigned_abs();

        if hash == 0 {
            Self(u32::try_from(index.saturating_add(1)).unwrap_or(u32::MAX))
        } else {
            Self(hash)
        }
    }

    /// Get the numeric value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl ::core::fmt::Display for DisplayId {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(s: &str) -> ProductId {
        s.parse().unwrap()
    }

    #[test]
    fn test_display_id_known_values() {
        let id = product("550e8400-e29b-41d4-a716-446655440000");
        assert_eq!(DisplayId::derive(id, 0).get(), 858_083_247);

        let id = product("ffffffff-ffff-ffff-ffff-ffffffffffff");
        assert_eq!(DisplayId::derive(id, 0).get(), 726_602_496);
    }

    #[test]
    fn test_display_id_is_deterministic() {
        let id = product("a1b2c3d4-0000-0000-0000-000000000000");
        assert_eq!(DisplayId::derive(id, 0), DisplayId::derive(id, 7));
    }

    #[test]
    fn test_display_id_collides_on_shared_prefix() {
        let a = product("a1b2c3d4-0000-0000-0000-000000000000");
        let b = product("a1b2c3d4-1111-2222-3333-444444444444");
        assert_ne!(a, b);
        assert_eq!(DisplayId::derive(a, 0), DisplayId::derive(b, 1));
        assert_eq!(DisplayId::derive(a, 0).get(), 646_752_384);
    }

    #[test]
    fn test_display_id_zero_hash_falls_back_to_position() {
        assert_eq!(DisplayId::from_key("", 0).get(), 1);
        assert_eq!(DisplayId::from_key("", 4).get(), 5);

        let id = product("f5a5a608-0000-4000-8000-000000000000");
        assert_eq!(DisplayId::derive(id, 2).get(), 3);
    }

    #[test]
    fn test_display_id_serializes_as_number() {
        let json = serde_json::to_string(&DisplayId::from_key("", 2)).unwrap();
        assert_eq!(json, "3");
    }

    #[test]
    fn test_order_short_ref() {
        let id: OrderId = "9f1c2b3a-0000-4000-8000-000000000000".parse().unwrap();
        assert_eq!(id.short_ref(), "9f1c2b3a");
    }

    #[test]
    fn test_id_parse_rejects_garbage() {
        assert!("not-a-uuid".parse::<ProductId>().is_err());
    }
}

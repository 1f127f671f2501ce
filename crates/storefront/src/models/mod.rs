//! Domain and response models for the storefront.
//!
//! Row types live next to their repositories in `db`; the types here are what
//! services return and handlers serialize.

pub mod address;
pub mod cart;
pub mod notice;
pub mod order;
pub mod product;
pub mod review;
pub mod session;
pub mod user;

pub use address::{Address, AddressError, NewAddress};
pub use cart::{CartItemView, CartView};
pub use notice::Notice;
pub use order::{Order, OrderItem, ShippingAddress};
pub use product::{ProductError, ProductInput, ProductView, ValidProduct};
pub use review::{NewReview, RatingBucket, Review, ReviewError, ReviewSummary};
pub use session::{CurrentUser, keys as session_keys};
pub use user::{Profile, UserWithRole};

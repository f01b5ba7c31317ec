//! # Courier Clients
//!
//! Booking and lookup against the two delivery partners. Both go through
//! PHP proxies on the storefront host, which hold no state of their own:
//! credentials come from the settings store on every call.
//!
//! ```text
//! ┌──────────────────┐  Api-Key / Secret-Key   ┌──────────────┐
//! │ SteadfastClient  │────────────────────────►│ courier.php  │──► Steadfast
//! └────────┬─────────┘                         └──────────────┘
//!          │
//! ┌────────┴─────────┐  {config, endpoint,     ┌──────────────────┐
//! │  PathaoClient    │───method, data}────────►│ pathao_proxy.php │──► Pathao
//! └────────┬─────────┘                         └──────────────────┘
//!          │
//!          ▼  on a booked consignment
//!   TrackingRepository::save  (local_tracking.php)
//! ```
//!
//! Saved tracking is what the next refresh overlays onto orders, so a
//! booking shows up in the order list without a platform write.

pub mod pathao;
pub mod steadfast;

pub use pathao::{DeliveryLocation, PathaoClient};
pub use steadfast::{Consignment, SteadfastClient};

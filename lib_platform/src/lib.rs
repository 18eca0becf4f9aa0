// Declare the modules to re-export
pub mod access;
pub mod models;
pub mod monetization;
pub mod store;

// Re-export the most commonly used items
pub use access::{AccessState, evaluate_access, parse_cookie_header, validity_label};
pub use monetization::MonetizationConfig;
pub use store::{Store, StoreError};

// Typed endpoint methods
//
// One file per backend area, each adding inherent methods to `ApiClient`.
// All paths are relative to the client's base URL.

pub mod auth;
pub mod codes;
pub mod consent;
pub mod contexts;
pub mod notifications;
pub mod profile;
pub mod redemptions;
pub mod search;

pub use codes::ConsentRequired;

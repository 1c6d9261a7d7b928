//! Reactive data layer between `sharename-api` and host applications.
//!
//! - **[`fetch`]**: [`Resource`], [`MultiResource`], and [`Mutation`] hold
//!   loading/error state for API calls and publish it over `watch`
//!   channels.
//! - **[`guard`]**: [`SessionGuard`] listens for session expiry from the
//!   pipeline and redirects through a host-supplied [`Navigator`].
//! - **[`dashboard`]**: keyed endpoint sets for the individual and company
//!   dashboards, with typed views over the results.

pub mod dashboard;
pub mod fetch;
pub mod guard;

pub use dashboard::{CompanyDashboard, IndividualDashboard};
pub use fetch::{
    FetchState, MultiResource, MultiState, Mutation, MutationState, Optimistic, OptimisticUpdate,
    Resource, SharedError,
};
pub use guard::{LOGIN_PATH, Navigator, SIGNUP_PATH, SessionGuard};

// sharename-api: Async client for the sharename contact-sharing backend
//
// Layers, leaves first: `envelope` decodes response shapes, `error`
// classifies failures, `client` runs the authenticated request pipeline on
// top of an injected `SessionStore`, and `endpoints` adds typed methods.

pub mod client;
pub mod endpoints;
pub mod envelope;
pub mod error;
pub mod models;
pub mod session;
pub mod transport;

pub use client::{ApiClient, ApiResponse, PUBLIC_ENDPOINTS, RequestDescriptor, is_public_endpoint};
pub use endpoints::ConsentRequired;
pub use envelope::{Envelope, Pagination, Payload};
pub use error::{Error, ErrorInfo, ErrorKind};
pub use session::{
    MemorySessionStore, Role, Session, SessionEvent, SessionKey, SessionStore, is_authenticated,
};
pub use transport::{TlsMode, TransportConfig};

//! Core module: errors, auth, response envelope, events and money

pub mod auth;
pub mod error;
pub mod events;
pub mod extractors;
pub mod money;
pub mod response;

pub use auth::{AuthContext, AuthPolicy, AuthProvider, NoAuthProvider, StaticTokenAuthProvider};
pub use error::{ErrorResponse, StoreError, StoreResult};
pub use events::{DomainEvent, EventBus, EventEnvelope, OrderEvent, ProductEvent};
pub use extractors::{Caller, ValidatedJson};
pub use money::{PriceBreakdown, PricingPolicy};
pub use response::ApiResponse;

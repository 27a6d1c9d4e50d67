//! Read access to listing tables on the hosted backend.
//!
//! [`StoreClient`] talks to the backend's REST table interface; [`MemorySource`]
//! evaluates the same [`Select`] queries over in-memory rows. Both implement
//! [`RowSource`], the seam resolvers are generic over.

mod client;
mod error;
mod memory;
mod query;
mod retry;
mod source;

pub use client::{StoreClient, StoreSettings};
pub use error::StoreError;
pub use memory::MemorySource;
pub use query::{Filter, IsValue, Join, Order, Scalar, Select};
pub use source::RowSource;

//! The search widget's client side: filter state, address-bar sync, and the
//! calls to the search endpoint.

pub mod api;
pub mod controller;
pub mod history;
pub mod state;
pub mod view;

pub use api::{HttpSearchApi, SearchApi, SearchRequest};
pub use controller::{Phase, PendingSearch, SearchController};
pub use history::{History, MemoryHistory};
pub use state::{Action, ClientSearchState};

//! The in-memory network store.
//!
//! The [`Catalogue`] owns every stop, route, and inter-stop distance, and
//! answers the metric queries derived from them. It is populated once, during
//! the build phase or during snapshot restore, and is read-only afterwards.

mod store;

pub use store::{Catalogue, CatalogueError, RouteStats};

//! The JSON boundary of the engine.
//!
//! Request DTOs mirror the ingestion document, response DTOs mirror the
//! reply payloads; [`QueryHandler`] maps stat requests onto the core and
//! turns every absence sentinel into the uniform "not found" reply.

mod handler;
mod requests;
mod responses;

pub use handler::QueryHandler;
pub use requests::{
    BaseRequest, BuildDocument, BusRequest, SerializationSettings, ServeDocument, StatRequest,
    StopRequest, build_catalogue,
};
pub use responses::{ItineraryItem, StatResponse};

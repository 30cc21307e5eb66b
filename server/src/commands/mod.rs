//! Command Layer
//!
//! The protocol surface the client crate talks to. Handlers are thin: they
//! parse ids, delegate to the store/repositories, and log at the boundary.

mod payment_cmd;
mod selection_cmd;

pub use payment_cmd::{count_payments, search_payments};
pub use selection_cmd::{
    apply_selection, create_selection, update_selection, ApplySelectionRequest,
    CreateSelectionRequest, SelectionResponse,
};

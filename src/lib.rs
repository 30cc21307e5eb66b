//! Payselect Client
//!
//! Client-side core of the bulk payment selection app:
//! - models: wire types mirroring the backend
//! - api: the backend command seam (`SelectionApi`)
//! - store: the render-facing selection state
//! - sync: debounced, single-flight update coordination
//! - session: one handle per live selection
//! - bridge: `SelectionApi` over the in-process backend

pub mod api;
pub mod bridge;
pub mod models;
pub mod session;
pub mod store;
pub mod sync;

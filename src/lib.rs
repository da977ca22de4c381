//! Live collection views for the Cyber Ranger awareness site.
//!
//! Documents live in a file-backed [`store::Store`] and reach pages as full
//! snapshots through a [`source::LiveSource`] subscription. A
//! [`view::LiveView`] normalizes each snapshot, appends it to the page's seed
//! content, applies the active filter and hands the result to a
//! [`render::Reconciler`]. The `ranger serve` binary exposes the store over
//! HTTP and a WebSocket push channel.

pub mod chatbot;
pub mod config;
pub mod error;
pub mod filter;
pub mod markers;
pub mod merge;
pub mod normalize;
pub mod password;
pub mod record;
pub mod remote;
pub mod render;
pub mod seed;
pub mod server;
pub mod source;
pub mod store;
pub mod submit;
pub mod view;
pub mod ws;

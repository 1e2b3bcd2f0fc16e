//! # gd-lists
//!
//! List screen lifecycle for Go.Data RS.
//!
//! A [`ListController`] owns the request builder of one list screen. Filter,
//! sort and page changes mark the list dirty; a background worker coalesces
//! the burst and fetches the page and the record count once through a
//! [`ListDataService`].

pub mod service;
pub mod endpoint;
pub mod controller;

pub use service::ListDataService;
pub use endpoint::ListEndpoint;
pub use controller::{ListController, ListSnapshot};

//! `nooryx-client`
//!
//! **Responsibility:** client-side controller for the Nooryx inventory API.
//!
//! This crate provides:
//! - The remote accessor (`HttpInventoryApi`) with single-flight session refresh
//! - A debounced, URL-syncable list controller over paginated inventory
//! - A presentation model of the inventory table
//! - The barcode scanning workflow
//!
//! The backend stays the authority; nothing here writes inventory directly.

pub mod api;
pub mod barcode;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod http;
pub mod list_state;
pub mod preferences;
pub mod session;
pub mod view;

pub use api::{BarcodeRegistry, InventoryApi, SkuMatch, SkuSnapshot, TrendPeriod, TrendPoint};
pub use barcode::{BarcodeError, BarcodeWorkflow, CameraStream, ScanContext, WorkflowState};
pub use config::{ClientConfig, ConfigError};
pub use controller::{ControllerSettings, ControllerUpdate, ListController};
pub use error::ApiError;
pub use http::HttpInventoryApi;
pub use list_state::{FetchState, ListState, RequestId};
pub use preferences::{FilePreferenceStore, MemoryPreferenceStore, PreferenceStore, Preferences};
pub use view::TableView;

//! # State Module
//!
//! State owned by the host shell for one run.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────────────────┐   ┌──────────────────────────────┐   │
//! │  │          AppConfig           │   │           DbState            │   │
//! │  │                              │   │                              │   │
//! │  │  storage backend + paths     │──►│  LifecycleController         │   │
//! │  │  legacy dump                 │   │   └── live Database          │   │
//! │  │  selected company            │   │                              │   │
//! │  └──────────────────────────────┘   └──────────────────────────────┘   │
//! │                                                                         │
//! │  • AppConfig: read-only after load                                     │
//! │  • DbState: the controller's RwLock guards the live handle             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod db;

pub use config::{AppConfig, ConfigError, LegacySettings, SessionSettings, StorageSettings};
pub use db::DbState;

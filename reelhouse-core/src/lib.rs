//! # Reelhouse Core
//!
//! Media ingestion and playback bookkeeping for the Reelhouse catalogue of
//! independent films.
//!
//! ## Overview
//!
//! - **Uploads**: stream a picked video or poster to the media hosts while
//!   reporting synthetic progress ([`upload`], [`media_host`])
//! - **Registration**: turn uploaded assets plus form fields into a content
//!   record that waits for moderation ([`registration`])
//! - **Catalogue**: published content by shelf, search and creator
//!   ([`catalog`])
//! - **Watch progress**: one row per viewer and title, continue-watching and
//!   history views, periodic checkpoints during playback ([`watch`])
//! - **My list**: titles saved for later ([`my_list`])
//!
//! ## Feature Flags
//!
//! - `database` (default): Postgres adapters and embedded migrations via SQLx
//!
//! ## Example
//!
//! ```no_run
//! use reelhouse_core::{
//!     application::{AppServices, AppUnitOfWork},
//!     config::Config,
//!     database::PostgresDatabase,
//!     media_host::{ImagesClient, StreamClient},
//!     upload::UploadPipeline,
//! };
//! use std::sync::Arc;
//!
//! async fn wire() -> reelhouse_core::Result<AppServices> {
//!     let config = Config::from_env()?;
//!     let db = PostgresDatabase::connect(&config.database).await?;
//!     let uploads = UploadPipeline::new(
//!         Arc::new(StreamClient::new(&config.stream)?),
//!         Arc::new(ImagesClient::new(&config.images)?),
//!         config.upload,
//!     );
//!     Ok(AppServices::new(&AppUnitOfWork::from_postgres(&db), uploads, config.watch))
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]

pub mod application;
pub mod catalog;
pub mod config;
pub mod database;
pub mod error;
pub mod media_host;
pub mod my_list;
pub mod registration;
pub mod session;
pub mod upload;
pub mod watch;

pub use reelhouse_model as model;

#[cfg(feature = "database")]
pub use database::infrastructure::postgres::MIGRATOR;

pub use error::{
    CoreError, OrphanedAsset, RegistrationError, Result, StoreError, UploadError,
};

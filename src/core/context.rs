//! # Application Context
//!
//! Everything the screens need, built once in `main` and lent to every menu
//! action by reference.
//!
//! ```text
//! AppContext
//! ├── config: ResolvedConfig          // settings after all overrides
//! ├── retrieval: DataRetrievalService // Atlas API boundary
//! ├── exporter: FileSaveService       // writes under data_dir/generated
//! └── catalog: ProductCatalog         // products, loaded at startup
//! ```

use std::io;

use log::info;
use tokio::runtime::Handle;

use crate::atlas::{AtlasClient, ProductCatalog};
use crate::core::config::ResolvedConfig;
use crate::services::{DataRetrievalService, FileSaveService, Service};

pub struct AppContext {
    pub config: ResolvedConfig,
    pub retrieval: DataRetrievalService,
    pub exporter: FileSaveService,
    pub catalog: ProductCatalog,
}

impl AppContext {
    pub fn new(
        config: ResolvedConfig,
        client: AtlasClient,
        runtime: Handle,
        catalog: ProductCatalog,
    ) -> Self {
        let exporter = FileSaveService::new(config.data_dir.clone());
        Self {
            retrieval: DataRetrievalService::new(client, runtime),
            exporter,
            catalog,
            config,
        }
    }

    pub fn startup(&mut self) -> io::Result<()> {
        self.retrieval.startup()?;
        self.exporter.startup()?;
        info!(
            "Services ready: {}; {} products in catalog",
            [self.retrieval.docs(), self.exporter.docs()].join(" "),
            self.catalog.len()
        );
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        self.exporter.cleanup()?;
        self.retrieval.cleanup()
    }
}

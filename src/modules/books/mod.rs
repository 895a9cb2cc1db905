pub mod models;
pub mod routes;
pub mod service;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{InitCtx, Module};
use utoipa::OpenApi;

use crate::utils;
use models::BookInput;
use service::CatalogService;

/// Book catalog module: owns the catalog service and exposes it over HTTP
pub struct BooksModule {
    service: Arc<CatalogService>,
}

impl BooksModule {
    pub fn new(service: Arc<CatalogService>) -> Self {
        Self { service }
    }

    /// Shared handle to the catalog this module serves
    pub fn service(&self) -> &Arc<CatalogService> {
        &self.service
    }
}

impl Default for BooksModule {
    fn default() -> Self {
        Self::new(Arc::new(CatalogService::in_memory()))
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let prefix = utils::log_prefix(self.name());

        for seed in &ctx.settings.catalog.seed {
            let book = self.service.add_book(BookInput::new(
                seed.title.as_str(),
                seed.author.as_str(),
                seed.isbn.as_str(),
            ))?;
            tracing::debug!(%prefix, book_id = book.id, "seeded book");
        }

        tracing::info!(
            %prefix,
            module = self.name(),
            environment = ?ctx.settings.environment,
            seeded = ctx.settings.catalog.seed.len(),
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(Arc::clone(&self.service))
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        match serde_json::to_value(routes::BooksApi::openapi()) {
            Ok(spec) => Some(spec),
            Err(err) => {
                tracing::warn!(module = self.name(), error = %err, "failed to render OpenAPI fragment");
                None
            }
        }
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            books = self.service.count()?,
            "books module started"
        );
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            books = self.service.count()?,
            "books module stopped; catalog contents are discarded"
        );
        Ok(())
    }
}

/// Create a new instance of the books module with an empty in-memory catalog
pub fn create_module() -> Arc<dyn Module> {
    Arc::new(BooksModule::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookshelf_kernel::settings::{SeedBook, Settings};

    #[tokio::test]
    async fn init_adds_seed_books_in_order() {
        let module = BooksModule::default();
        let mut settings = Settings::default();
        settings.catalog.seed = vec![
            SeedBook {
                title: "Dune".to_string(),
                author: "Frank Herbert".to_string(),
                isbn: String::new(),
            },
            SeedBook {
                title: "Emma".to_string(),
                author: "Jane Austen".to_string(),
                isbn: "1".to_string(),
            },
        ];

        module
            .init(&InitCtx {
                settings: &settings,
            })
            .await
            .unwrap();

        let books = module.service().get_all_books().unwrap();
        assert_eq!(books.len(), 2);
        assert_eq!(books[0].id, 1);
        assert_eq!(books[1].title, "Emma");
    }

    #[tokio::test]
    async fn init_rejects_blank_seed() {
        let module = BooksModule::default();
        let mut settings = Settings::default();
        settings.catalog.seed = vec![SeedBook {
            title: String::new(),
            author: "Nobody".to_string(),
            isbn: String::new(),
        }];

        let result = module
            .init(&InitCtx {
                settings: &settings,
            })
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn openapi_fragment_is_present() {
        let spec = BooksModule::default().openapi().unwrap();
        assert!(spec["paths"]["/{id}/borrow"]["put"].is_object());
    }
}

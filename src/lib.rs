//! Bookshelf application library
//!
//! Wires the application modules into a registry and runs them behind the
//! HTTP server.

pub mod modules;
pub mod utils;

use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

/// Re-export commonly used types
pub use modules::*;

/// Registry holding every application module
pub fn build_registry() -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry);
    registry
}

/// Initialize and start all modules, serve HTTP until shutdown, then stop
/// the modules in reverse order.
pub async fn run(settings: &Settings) -> anyhow::Result<()> {
    let registry = build_registry();
    let ctx = InitCtx { settings };

    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    let served = bookshelf_http::start_server(&registry, settings).await;
    if let Err(err) = &served {
        tracing::error!(error = %format!("{err:#}"), "HTTP server exited with error");
    }

    registry.stop_modules().await?;
    served
}

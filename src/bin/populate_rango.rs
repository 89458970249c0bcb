//! Fill the database with the starter categories and pages.

use rango::core::config::Config;
use rango::core::database;
use rango::features::categories::CategoryService;
use rango::features::pages::PageService;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    let pool = database::create_pool(&config.database).await?;
    database::run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    tracing::info!("Starting Rango population script...");

    let category_service = CategoryService::new(pool.clone());
    let page_service = PageService::new(pool);

    let seeded = rango::seed::populate(&category_service, &page_service).await?;
    for (category, pages) in &seeded {
        for page in pages {
            tracing::info!("- {} - {}", category.name, page.title);
        }
    }

    Ok(())
}

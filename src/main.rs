use rusty_bookstore_client::{
    adapters::http::{BASE_URL_ENV, HttpBookstoreApi, HttpConfig},
    application::{SessionStatus, SessionStore},
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rusty_bookstore_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = HttpConfig::from_env();
    tracing::info!("Bookstore API base URL ({}): {}", BASE_URL_ENV, config.base_url);

    let api = Arc::new(HttpBookstoreApi::new(config).expect("Failed to build HTTP client"));
    let mut store = SessionStore::new(api);

    // Check session; log in with env credentials when provided
    if store.check_session().await == SessionStatus::Unauthenticated {
        let username = std::env::var("BOOKSTORE_USERNAME").ok();
        let password = std::env::var("BOOKSTORE_PASSWORD").ok();
        match (username, password) {
            (Some(username), Some(password)) => {
                match store.login(&username, &password).await {
                    Ok(customer) => tracing::info!("Logged in as {}", customer.name),
                    Err(err) => {
                        tracing::error!("Login failed: {}", err);
                        return;
                    }
                }
            }
            _ => {
                tracing::warn!(
                    "Not authenticated; set BOOKSTORE_USERNAME and BOOKSTORE_PASSWORD to log in"
                );
                return;
            }
        }
    }

    // Fetch the catalog and show the first page
    match store.catalog.refresh().await {
        Ok(count) => tracing::info!("Catalog loaded: {} books", count),
        Err(err) => {
            tracing::error!("Failed to fetch books: {}", err);
            return;
        }
    }

    for book in store.catalog.displayed() {
        tracing::info!(
            "{} — {} (${:.2}, {} in stock)",
            book.title,
            book.author,
            book.price,
            book.available_quantity
        );
    }
    if store.catalog.has_more() {
        tracing::info!(
            "...and {} more",
            store.catalog.view().filtered_count() - store.catalog.displayed().len()
        );
    }

    // Show order history for the logged-in customer
    match store.refresh_orders().await {
        Ok(count) => tracing::info!("Order history: {} orders", count),
        Err(err) => tracing::warn!("Failed to fetch orders: {}", err.user_message()),
    }
}

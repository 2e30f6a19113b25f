use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use delivery_orders::clock::SystemClock;
use delivery_orders::config::{ServiceConfig, StoreBackend, CONFIG_ENV_VAR};
use delivery_orders::domain::client::{ClientCommandHandler, NewClient};
use delivery_orders::domain::commerce::{CommerceCommandHandler, NewCommerce};
use delivery_orders::domain::delivery_agent::{DeliveryAgentCommandHandler, NewDeliveryAgent};
use delivery_orders::domain::order::{
    NewOrder, OrderCommandHandler, OrderError, OrderPatch, OrderState, ACTIVE_STATES,
};
use delivery_orders::metrics;
use delivery_orders::store::{EntityStore, MemoryStore, OrderFilter, Page, PostgresStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::load()?;

    // Initialize structured logging with environment-based filtering
    // RUST_LOG wins over the configured filter
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_filter()))
        )
        .init();

    tracing::info!("🚀 Starting delivery order service");
    match std::env::var(CONFIG_ENV_VAR) {
        Ok(path) if !std::path::Path::new(path.trim()).exists() => {
            tracing::warn!(path = %path, "Config file not found, using defaults")
        }
        Ok(path) => tracing::info!(path = %path, "Config file loaded"),
        Err(_) => tracing::info!("{} not set, using defaults", CONFIG_ENV_VAR),
    }
    tracing::info!(
        admission_mode = ?config.orders.admission_mode,
        terminal_cancel = ?config.orders.terminal_cancel,
        backend = ?config.store.backend,
        "Configuration loaded"
    );

    // === 1. Entity store ===
    let store: Arc<dyn EntityStore> = match config.store.backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory store");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::Postgres => {
            let url = config.store.url.as_deref().unwrap_or_default();
            tracing::info!("Connecting to PostgreSQL...");
            let pg = PostgresStore::connect(url).await?;
            pg.ensure_schema().await?;
            Arc::new(pg)
        }
    };

    // === 2. Initialize Prometheus metrics ===
    tracing::info!("Initializing metrics");
    let metrics = Arc::new(metrics::Metrics::new()?);

    if config.metrics.enabled {
        // Start metrics HTTP server in background thread
        let metrics_registry = Arc::new(metrics.registry().clone());
        let port = config.metrics.port;
        std::thread::spawn(move || {
            let rt = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    tracing::error!("Metrics runtime error: {}", e);
                    return;
                }
            };
            rt.block_on(async {
                if let Err(e) = metrics::start_metrics_server(metrics_registry, port).await {
                    tracing::error!("Metrics server error: {}", e);
                }
            });
        });
    }

    // === 3. Command handlers ===
    let commerces = CommerceCommandHandler::new(store.clone());
    let clients = ClientCommandHandler::new(store.clone());
    let agents = DeliveryAgentCommandHandler::new(store.clone());
    let orders = OrderCommandHandler::new(
        store.clone(),
        Arc::new(SystemClock),
        config.orders,
        metrics.clone(),
    );

    // === 4. Demonstrate admission against a capacity of one ===
    tracing::info!("📝 Demonstrating capacity admission and order lifecycle");

    let commerce = commerces.create(NewCommerce::new("Corner Pizzeria", 1)).await?;
    let client = clients.create(NewClient::new("Ana", "Calle Falsa 123")).await?;
    let agent = agents.create(NewDeliveryAgent::new("Luis", "bike")).await?;

    let new_order = |detail: &str| NewOrder {
        client_id: client.id,
        commerce_id: commerce.id,
        delivery_agent_id: agent.id,
        detail: detail.to_string(),
    };

    let first = orders.admit(new_order("1 large margherita")).await?;
    tracing::info!(
        "✅ Order {} admitted, promised for {}",
        first.id,
        first.promised_delivery_at
    );

    match orders.admit(new_order("2 calzones")).await {
        Err(OrderError::CommerceAtCapacity { active, max, .. }) => {
            tracing::info!("⛔ Second order rejected: {}/{} active", active, max);
        }
        other => anyhow::bail!("expected capacity rejection, got {:?}", other),
    }

    orders.transition(first.id, true).await?;
    let delivered = orders.transition(first.id, true).await?;
    tracing::info!("✅ Order {} is now {}", delivered.id, delivered.state);

    let second = orders.admit(new_order("2 calzones")).await?;
    tracing::info!("✅ Order {} admitted once capacity freed up", second.id);

    let second = orders
        .edit(second.id, OrderPatch::default().with_detail("2 calzones, extra cheese"))
        .await?;
    tracing::info!("✏️ Order {} edited while created: {}", second.id, second.detail);

    match orders
        .edit(delivered.id, OrderPatch::default().with_detail("too late"))
        .await
    {
        Err(e) => tracing::info!(kind = ?e.kind(), "⛔ Edit of delivered order rejected: {}", e),
        Ok(order) => anyhow::bail!("delivered order {} accepted an edit", order.id),
    }

    let active = store
        .count_orders(&OrderFilter::for_commerce(commerce.id).with_states(&ACTIVE_STATES))
        .await?;
    let delivered_page = orders.list_by_state(OrderState::Delivered, Page::default()).await?;
    tracing::info!(
        commerce_id = %commerce.id,
        active,
        delivered = delivered_page.total,
        "📊 Commerce load after demo"
    );

    tracing::info!("🎉 Demo complete!");

    if config.metrics.enabled {
        // Keep /metrics scrapeable until the operator stops the process
        tracing::info!(
            "📊 Serving metrics on :{}, press Ctrl-C to exit",
            config.metrics.port
        );
        tokio::signal::ctrl_c().await?;
        tracing::info!("Shutting down");
    }

    Ok(())
}

use anyhow::{anyhow, Context};
use std::sync::Arc;
use tracing::{debug, info, warn};

use saham_dashboard::app::create_app;
use saham_dashboard::config::DashboardConfig;
use saham_dashboard::logging::{init_logging, LoggingConfig};
use saham_dashboard::services::reveal::ViewportObserver;
use saham_dashboard::services::view_state::ViewPhase;

/// Headless stand-in for the browser's intersection observer.
struct TracingObserver;

impl ViewportObserver for TracingObserver {
    fn observe(&self, element: &str) {
        debug!("observing {}", element);
    }

    fn unobserve(&self, element: &str) {
        debug!("stopped observing {}", element);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    init_logging(LoggingConfig::from_env()).map_err(|e| anyhow!("failed to initialize logging: {e}"))?;

    let config = DashboardConfig::from_env().context("invalid dashboard configuration")?;
    let state = create_app(config);

    let preview = state.news_preview();
    preview.load().await;
    info!("Dashboard preview: {} articles", preview.items().len());

    let mut news = state.news_screen(Arc::new(TracingObserver));
    news.load().await;
    if let Some(featured) = news.featured() {
        info!("Featured: {} ({})", featured.title, featured.published_at);
    }
    if let Some(sentinel) = news.sentinel().map(str::to_string) {
        news.on_intersect(&sentinel);
    }
    info!("News page lists {} articles", news.listed().len());
    if let Some(message) = news.message() {
        warn!("News page message: {}", message);
    }

    let mut prediction = state.prediction_screen();
    prediction.submit().await;
    prediction.controller().with_state(|s| match s.phase() {
        ViewPhase::Populated { visible, notice, .. } => {
            for snapshot in visible {
                info!(
                    "{} {}: {:.2} ({:+.2}%), {} predicted points",
                    snapshot.symbol,
                    snapshot.name,
                    snapshot.current_price,
                    snapshot.change_percent,
                    snapshot.prediction_points.len()
                );
            }
            if let Some(notice) = notice {
                warn!("Prediction page notice: {}", notice);
            }
        }
        ViewPhase::Failed { message } => warn!("Prediction page failed: {}", message),
        other => debug!("Prediction page phase: {:?}", other),
    });

    let question = format!("How is {} doing?", prediction.search_value());
    if let Some(reply) = prediction.send_chat(&question).await {
        info!("Advisor: {}", reply.content);
    }

    Ok(())
}

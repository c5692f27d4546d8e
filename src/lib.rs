pub mod config;
pub mod controllers;
pub mod engine;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;

use std::sync::Arc;
use tracing::info;

use engine::ReservationEngine;
use models::VenueLayout;
use services::payment::{PaymentGatewayClient, PaymentProcessor, SimulatedPayment};

// Shared state для всего приложения
pub struct AppState {
    pub engine: ReservationEngine,
    pub payment: Arc<dyn PaymentProcessor>,
    pub config: config::Config,
}

impl AppState {
    pub fn new(config: config::Config) -> anyhow::Result<Arc<Self>> {
        let layout = match &config.venue.layout_path {
            Some(path) => VenueLayout::from_file(path)?,
            None => {
                info!("VENUE_LAYOUT_PATH not set, provisioning demo venue");
                VenueLayout::demo()
            }
        };
        layout.validate()?;

        let engine = ReservationEngine::new(layout);

        let payment: Arc<dyn PaymentProcessor> = match config.payment.mode.as_str() {
            "gateway" => {
                info!("payment mode: gateway at {}", config.payment.gateway_url);
                Arc::new(PaymentGatewayClient::from_config(&config.payment))
            }
            _ => {
                info!(
                    "payment mode: simulated (approval rate {})",
                    config.payment.approval_rate
                );
                Arc::new(SimulatedPayment::new(config.payment.approval_rate))
            }
        };

        Ok(Arc::new(Self { engine, payment, config }))
    }
}

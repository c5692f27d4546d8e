use serde::Deserialize;
use std::env;

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub venue: VenueConfig,
    pub payment: PaymentConfig,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
}

// Настройки зала
#[derive(Debug, Clone, Deserialize)]
pub struct VenueConfig {
    /// JSON-файл с планом зала; без него поднимается демо-зал.
    pub layout_path: Option<String>,
    /// Цена места в минимальных единицах валюты.
    pub seat_price: i64,
}

// Настройки платёжного коллаборатора
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// "simulated" или "gateway".
    pub mode: String,
    pub approval_rate: f64,
    pub merchant_id: String,
    pub merchant_password: String,
    pub gateway_url: String,
    pub currency: String,
    pub circuit_breaker_failures: u32,
    pub circuit_breaker_timeout_seconds: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            app: AppConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "8000".to_string())
                    .parse()
                    .expect("PORT must be a valid number"),
                environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
                rust_log: env::var("RUST_LOG")
                    .unwrap_or_else(|_| "seat_engine=debug,tower_http=debug".to_string()),
            },
            venue: VenueConfig {
                layout_path: env::var("VENUE_LAYOUT_PATH").ok(),
                seat_price: env::var("VENUE_SEAT_PRICE")
                    .unwrap_or_else(|_| "1500".to_string())
                    .parse()
                    .expect("VENUE_SEAT_PRICE must be a valid number"),
            },
            payment: PaymentConfig {
                mode: env::var("PAYMENT_MODE").unwrap_or_else(|_| "simulated".to_string()),
                approval_rate: env::var("PAYMENT_APPROVAL_RATE")
                    .unwrap_or_else(|_| "0.5".to_string())
                    .parse()
                    .expect("PAYMENT_APPROVAL_RATE must be a valid number"),
                merchant_id: env::var("MERCHANT_ID").unwrap_or_else(|_| "demo".to_string()),
                merchant_password: env::var("MERCHANT_PASSWORD")
                    .unwrap_or_else(|_| "demo".to_string()),
                gateway_url: env::var("PAYMENT_GATEWAY_URL")
                    .unwrap_or_else(|_| "https://gateway.example.com".to_string()),
                currency: env::var("PAYMENT_CURRENCY").unwrap_or_else(|_| "KZT".to_string()),
                circuit_breaker_failures: env::var("CIRCUIT_BREAKER_FAILURE_THRESHOLD")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .expect("CIRCUIT_BREAKER_FAILURE_THRESHOLD must be a valid number"),
                circuit_breaker_timeout_seconds: env::var("CIRCUIT_BREAKER_TIMEOUT_SECONDS")
                    .unwrap_or_else(|_| "60".to_string())
                    .parse()
                    .expect("CIRCUIT_BREAKER_TIMEOUT_SECONDS must be a valid number"),
            },
        }
    }
}

//! payment.rs
//!
//! Платёжный коллаборатор непрозрачен для движка: на набор удержанных
//! мест и сумму он отвечает ровно одним из двух исходов — Approved или
//! Declined. Ровно две реализации:
//!
//! 1. **SimulatedPayment** — случайный исход для разработки и тестов.
//!    Случайность живёт здесь, в заглушке, и никогда в движке.
//! 2. **PaymentGatewayClient** — HTTP-клиент реального шлюза с
//!    SHA-256-токеном запроса и Circuit Breaker'ом поверх сети.

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, RwLock};
use tokio::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::config::PaymentConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentOutcome {
    Approved,
    Declined,
}

#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Единственная способность коллаборатора. Сетевые и прочие сбои
    /// схлопываются в Declined: для движка "не оплачено" — это один исход.
    async fn attempt_payment(&self, order_id: &str, amount: i64) -> PaymentOutcome;
}

/* ---------- симуляция ---------- */

/// Симулятор карточного платежа: approve с заданной вероятностью.
pub struct SimulatedPayment {
    approval_rate: f64,
}

impl SimulatedPayment {
    pub fn new(approval_rate: f64) -> Self {
        Self { approval_rate: approval_rate.clamp(0.0, 1.0) }
    }
}

#[async_trait]
impl PaymentProcessor for SimulatedPayment {
    async fn attempt_payment(&self, order_id: &str, amount: i64) -> PaymentOutcome {
        let approved = rand::thread_rng().gen_bool(self.approval_rate);
        info!(order_id, amount, approved, "simulated payment resolved");
        if approved {
            PaymentOutcome::Approved
        } else {
            PaymentOutcome::Declined
        }
    }
}

/* ---------- circuit breaker ---------- */

/// Состояния "Автоматического выключателя".
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CircuitState {
    /// Нормальный режим, запросы разрешены.
    Closed,
    /// Шлюз признан недоступным, запросы блокируются до таймаута.
    Open,
    /// После таймаута разрешается один пробный запрос.
    HalfOpen,
}

pub struct CircuitBreaker {
    state: RwLock<CircuitState>,
    failure_count: AtomicU32,
    last_failure: Mutex<Option<Instant>>,
    failure_threshold: u32,
    timeout: Duration,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, timeout_seconds: u64) -> Self {
        Self {
            state: RwLock::new(CircuitState::Closed),
            failure_count: AtomicU32::new(0),
            last_failure: Mutex::new(None),
            failure_threshold,
            timeout: Duration::from_secs(timeout_seconds),
        }
    }

    pub fn can_execute(&self) -> bool {
        let state = *self.state.read().unwrap();
        match state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let expired = self
                    .last_failure
                    .lock()
                    .unwrap()
                    .map(|at| at.elapsed() >= self.timeout)
                    .unwrap_or(true);
                if expired {
                    *self.state.write().unwrap() = CircuitState::HalfOpen;
                    info!("circuit breaker transitioning to HalfOpen");
                }
                expired
            }
        }
    }

    pub fn record_success(&self) {
        let mut state = self.state.write().unwrap();
        if *state == CircuitState::HalfOpen {
            info!("circuit breaker recovered, closing");
        }
        *state = CircuitState::Closed;
        self.failure_count.store(0, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        let failures = self.failure_count.fetch_add(1, Ordering::Relaxed) + 1;
        *self.last_failure.lock().unwrap() = Some(Instant::now());

        let mut state = self.state.write().unwrap();
        match *state {
            CircuitState::Closed if failures >= self.failure_threshold => {
                *state = CircuitState::Open;
                error!(failures, threshold = self.failure_threshold, "circuit breaker OPENED");
            }
            CircuitState::HalfOpen => {
                *state = CircuitState::Open;
                warn!("circuit breaker probe failed, reopening");
            }
            _ => {}
        }
    }

    pub fn state(&self) -> CircuitState {
        *self.state.read().unwrap()
    }
}

/* ---------- реальный шлюз ---------- */

#[derive(Debug, Serialize)]
struct ChargeRequest {
    #[serde(rename = "teamSlug")]
    team_slug: String,
    token: String,
    amount: i64,
    #[serde(rename = "orderId")]
    order_id: String,
    currency: String,
}

#[derive(Debug, Deserialize)]
struct ChargeResponse {
    success: bool,
    status: Option<String>,
    message: Option<String>,
}

/// Клиент платёжного шлюза. Все сетевые вызовы идут через Circuit
/// Breaker; недоступный шлюз означает Declined, а не зависший заказ.
pub struct PaymentGatewayClient {
    team_slug: String,
    password: String,
    base_url: String,
    currency: String,
    http_client: reqwest::Client,
    circuit_breaker: CircuitBreaker,
}

impl PaymentGatewayClient {
    pub fn from_config(config: &PaymentConfig) -> Self {
        Self {
            team_slug: config.merchant_id.clone(),
            password: config.merchant_password.clone(),
            base_url: config.gateway_url.clone(),
            currency: config.currency.clone(),
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
            circuit_breaker: CircuitBreaker::new(
                config.circuit_breaker_failures,
                config.circuit_breaker_timeout_seconds,
            ),
        }
    }

    /// Токен запроса: SHA-256 от конкатенации полей и пароля мерчанта.
    fn generate_token(&self, amount: i64, order_id: &str) -> String {
        let token_string = format!(
            "{}{}{}{}{}",
            amount, self.currency, order_id, self.password, self.team_slug
        );
        let mut hasher = Sha256::new();
        hasher.update(token_string.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    async fn charge(&self, order_id: &str, amount: i64) -> Result<ChargeResponse, reqwest::Error> {
        let request = ChargeRequest {
            team_slug: self.team_slug.clone(),
            token: self.generate_token(amount, order_id),
            amount,
            order_id: order_id.to_string(),
            currency: self.currency.clone(),
        };

        self.http_client
            .post(format!("{}/api/v1/PaymentCharge/charge", self.base_url))
            .json(&request)
            .send()
            .await?
            .json::<ChargeResponse>()
            .await
    }
}

#[async_trait]
impl PaymentProcessor for PaymentGatewayClient {
    async fn attempt_payment(&self, order_id: &str, amount: i64) -> PaymentOutcome {
        if !self.circuit_breaker.can_execute() {
            warn!(order_id, "circuit breaker is OPEN - declining without gateway call");
            return PaymentOutcome::Declined;
        }

        match self.charge(order_id, amount).await {
            Ok(response) => {
                self.circuit_breaker.record_success();
                let status = response.status.as_deref().unwrap_or_default();
                if response.success && matches!(status, "CONFIRMED" | "AUTHORIZED") {
                    info!(order_id, amount, "payment approved by gateway");
                    PaymentOutcome::Approved
                } else {
                    info!(
                        order_id,
                        status,
                        message = response.message.as_deref().unwrap_or_default(),
                        "payment declined by gateway"
                    );
                    PaymentOutcome::Declined
                }
            }
            Err(e) => {
                error!(order_id, "payment gateway request failed: {:?}", e);
                self.circuit_breaker.record_failure();
                PaymentOutcome::Declined
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn simulated_payment_is_deterministic_at_extremes() {
        let always = SimulatedPayment::new(1.0);
        let never = SimulatedPayment::new(0.0);
        for _ in 0..20 {
            assert_eq!(always.attempt_payment("o-1", 100).await, PaymentOutcome::Approved);
            assert_eq!(never.attempt_payment("o-2", 100).await, PaymentOutcome::Declined);
        }
    }

    #[test]
    fn breaker_opens_after_threshold_and_recovers() {
        let breaker = CircuitBreaker::new(3, 60);
        assert!(breaker.can_execute());

        breaker.record_failure();
        breaker.record_failure();
        assert_eq!(breaker.state(), CircuitState::Closed);
        breaker.record_failure();
        assert_eq!(breaker.state(), CircuitState::Open);
        assert!(!breaker.can_execute());

        // Успех после пробного запроса замыкает цепь обратно.
        breaker.record_success();
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert!(breaker.can_execute());
    }

    #[test]
    fn open_breaker_allows_probe_after_timeout() {
        let breaker = CircuitBreaker::new(1, 0);
        breaker.record_failure();
        assert_eq!(breaker.state(), CircuitState::Open);
        // Нулевой таймаут: следующий вызов сразу HalfOpen.
        assert!(breaker.can_execute());
        assert_eq!(breaker.state(), CircuitState::HalfOpen);

        breaker.record_failure();
        assert_eq!(breaker.state(), CircuitState::Open);
    }
}

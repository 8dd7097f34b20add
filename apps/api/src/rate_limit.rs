use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tokio::sync::Mutex;
use tracing::warn;

use crate::errors::AppError;
use crate::state::AppState;

/// Process-wide token bucket: `rps` tokens per second, burst of `rps`.
#[derive(Clone)]
pub struct RateLimiter {
    rps: u32,
    bucket: Arc<Mutex<Bucket>>,
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last: Instant,
}

impl RateLimiter {
    /// `None` when `rps` is zero.
    pub fn new(rps: u32) -> Option<Self> {
        if rps == 0 {
            return None;
        }
        Some(Self {
            rps,
            bucket: Arc::new(Mutex::new(Bucket {
                tokens: rps as f64,
                last: Instant::now(),
            })),
        })
    }

    pub async fn check(&self) -> Result<(), AppError> {
        let mut bucket = self.bucket.lock().await;
        let now = Instant::now();
        let elapsed = now.duration_since(bucket.last);
        bucket.last = now;

        let rate = self.rps as f64;
        bucket.tokens = (bucket.tokens + elapsed.as_secs_f64() * rate).min(rate);

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            return Ok(());
        }

        let wait = Duration::from_secs_f64((1.0 - bucket.tokens) / rate);
        Err(AppError::RateLimited(format!(
            "요청이 너무 많습니다. 약 {}ms 후 다시 시도해주세요.",
            wait.as_millis()
        )))
    }
}

/// Rejects `/api` requests with 429 once the bucket is empty. A no-op when
/// `RATE_LIMIT_RPS` is unset.
pub async fn limit_requests(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(limiter) = &state.rate_limiter {
        if let Err(e) = limiter.check().await {
            warn!("Rate limit hit on {}", request.uri().path());
            return Err(e);
        }
    }
    Ok(next.run(request).await)
}

use once_cell::sync::Lazy;
use prometheus::{register_int_counter, Encoder, IntCounter, TextEncoder};

// Prometheus metrics (default registry)
pub static LISTS_CREATED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "wishlist_lists_created_total",
        "Total gift lists created"
    )
    .expect("register lists_created_total")
});

pub static LISTS_UPDATED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "wishlist_lists_updated_total",
        "Total successful list mutations"
    )
    .expect("register lists_updated_total")
});

pub static ITEMS_CLAIMED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "wishlist_items_claimed_total",
        "Total items claimed through the claim endpoint"
    )
    .expect("register items_claimed_total")
});

pub static CLAIM_CONFLICTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "wishlist_claim_conflicts_total",
        "Claims rejected because the item was already taken"
    )
    .expect("register claim_conflicts_total")
});

pub static STORE_WRITE_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "wishlist_store_write_failures_total",
        "Total failed writes of the lists document"
    )
    .expect("register store_write_failures_total")
});

pub fn encode_metrics() -> (axum::http::StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (
        axum::http::StatusCode::OK,
        String::from_utf8(buffer).unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_show_up_in_encoded_output() {
        LISTS_CREATED_TOTAL.inc();
        let (status, body) = encode_metrics();
        assert_eq!(status, axum::http::StatusCode::OK);
        assert!(body.contains("wishlist_lists_created_total"));
    }
}

use lazy_static::lazy_static;
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

lazy_static! {
    pub static ref FAILURES_TRANSLATED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "failures_translated_total",
        "Total request failures converted into error responses",
        &["code"]  // code: 00001 (validation), 00009 (unhandled)
    )
    .unwrap();

    pub static ref FAILURE_RESPONSE_WRITE_ERRORS_TOTAL: IntCounter = register_int_counter!(
        "failure_response_write_errors_total",
        "Total errors while writing a translated error response"
    )
    .unwrap();
}

/// Initialize all metrics (called on startup)
pub fn init_metrics() {
    // Force lazy_static initialization
    lazy_static::initialize(&FAILURES_TRANSLATED_TOTAL);
    lazy_static::initialize(&FAILURE_RESPONSE_WRITE_ERRORS_TOTAL);
}

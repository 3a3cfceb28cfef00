//! WebAssembly module for the E-Commerce Admin Platform
//!
//! Provides client-side computation for the dashboard:
//! - Canonical total stock and stock value
//! - Stock status classification
//! - Consistency pre-checks before a sync is requested
//! - Offline validation of variant option input

use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Canonical total stock from a manual quantity and a JSON array of variant stocks
#[wasm_bindgen]
pub fn calculate_total_stock(manual_stock: i32, variant_stocks_json: &str) -> Result<f64, JsValue> {
    let variant_stocks: Vec<i32> = serde_json::from_str(variant_stocks_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid variant stocks JSON: {}", e)))?;

    Ok(total_stock(manual_stock, &variant_stocks) as f64)
}

/// Classify stock level for display ("In Stock" / "Low Stock" / "Out of Stock")
#[wasm_bindgen]
pub fn classify_stock_level(total: f64, low_stock_threshold: i32) -> String {
    let status = classify_stock_status(total as i64, low_stock_threshold);
    format!("{}", status)
}

/// Full derived stock summary as JSON for the product detail screen
#[wasm_bindgen]
pub fn stock_summary_json(
    manual_stock: i32,
    variant_stocks_json: &str,
    price: f64,
    cost: Option<f64>,
    low_stock_threshold: i32,
) -> Result<String, JsValue> {
    let variant_stocks: Vec<i32> = serde_json::from_str(variant_stocks_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid variant stocks JSON: {}", e)))?;

    let price = Decimal::try_from(price).unwrap_or(Decimal::ZERO);
    let cost = cost.and_then(|c| Decimal::try_from(c).ok());

    let summary = summarize_stock(
        manual_stock,
        &variant_stocks,
        price,
        cost,
        low_stock_threshold,
    );

    serde_json::to_string(&summary)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Whether a product's stored manual stock violates the variant rule
#[wasm_bindgen]
pub fn has_stock_inconsistency(manual_stock: i32, variant_count: i32) -> bool {
    manual_stock_violation(manual_stock, variant_count as i64)
}

/// Validate variant option input before submitting the form
#[wasm_bindgen]
pub fn validate_options(options_json: &str) -> bool {
    let options: VariantOptions = match serde_json::from_str(options_json) {
        Ok(o) => o,
        Err(_) => return false,
    };

    validate_variant_options(&options).is_ok()
}

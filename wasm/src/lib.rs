//! WebAssembly module for the Textile Production Ledger
//!
//! Provides client-side computation for:
//! - Running cash balance over a transaction listing
//! - Monthly income and expense series
//! - Production request checks before submission
//!
//! Inputs and outputs are JSON strings in the same shape the HTTP API uses.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

use shared::ledger::{cash_balance, compute_running_balance, monthly_cash_flow};
use shared::validation::{exceeds_snapshot, validate_production};
use shared::{CashTransaction, CreateProductionInput};

fn parse_transactions(json: &str) -> Result<Vec<CashTransaction>, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid transactions JSON: {}", e))
}

fn running_balance_json(transactions_json: &str) -> Result<String, String> {
    let entries = compute_running_balance(parse_transactions(transactions_json)?);
    serde_json::to_string(&entries).map_err(|e| e.to_string())
}

fn balance_string(transactions_json: &str) -> Result<String, String> {
    let transactions = parse_transactions(transactions_json)?;
    Ok(cash_balance(&transactions).to_string())
}

fn cash_flow_json(transactions_json: &str, today: &str, months: u32) -> Result<String, String> {
    let transactions = parse_transactions(transactions_json)?;
    let today = NaiveDate::parse_from_str(today, "%Y-%m-%d")
        .map_err(|e| format!("Invalid date '{}': {}", today, e))?;
    let series = monthly_cash_flow(&transactions, today, months);
    serde_json::to_string(&series).map_err(|e| e.to_string())
}

/// Empty string when the request may be submitted, otherwise the English reason
fn production_problem(input_json: &str) -> Result<String, String> {
    let input: CreateProductionInput =
        serde_json::from_str(input_json).map_err(|e| format!("Invalid production JSON: {}", e))?;
    if let Err(e) = validate_production(&input) {
        return Ok(e.to_string());
    }
    if exceeds_snapshot(&input) {
        let available = input.current_material_quantity.unwrap_or(Decimal::ZERO);
        return Ok(format!(
            "material_used: only {} available, {} requested",
            available, input.material_used
        ));
    }
    Ok(String::new())
}

/// Attach running balances to a transaction listing; result is most recent first
#[wasm_bindgen]
pub fn running_balance(transactions_json: &str) -> Result<String, JsValue> {
    running_balance_json(transactions_json).map_err(|e| JsValue::from_str(&e))
}

/// Final cash balance as a decimal string
#[wasm_bindgen]
pub fn ledger_balance(transactions_json: &str) -> Result<String, JsValue> {
    balance_string(transactions_json).map_err(|e| JsValue::from_str(&e))
}

/// Income and expenses per month, oldest first; `today` is `YYYY-MM-DD`
#[wasm_bindgen]
pub fn cash_flow_by_month(
    transactions_json: &str,
    today: &str,
    months: u32,
) -> Result<String, JsValue> {
    cash_flow_json(transactions_json, today, months).map_err(|e| JsValue::from_str(&e))
}

/// Check a production request before sending it
#[wasm_bindgen]
pub fn check_production(input_json: &str) -> Result<String, JsValue> {
    production_problem(input_json).map_err(|e| JsValue::from_str(&e))
}

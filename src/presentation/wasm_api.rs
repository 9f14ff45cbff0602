//! JavaScript entry points. Minimal logic: parse the host's arguments and
//! hand over to the Leptos component.

use wasm_bindgen::prelude::*;

use crate::{
    app::HybridChartView,
    config::EngineConfig,
    domain::{
        logging::{LogComponent, get_logger, init_logger},
        market_data::Symbol,
    },
    infrastructure::services::ConsoleLogger,
};

const COMPONENT: LogComponent = LogComponent::Presentation("WasmApi");

/// Parse an optional JSON config; absent means defaults.
pub fn parse_engine_config(config_json: Option<&str>) -> Result<EngineConfig, String> {
    match config_json.map(str::trim).filter(|json| !json.is_empty()) {
        Some(json) => EngineConfig::from_json(json).map_err(|e| e.to_string()),
        None => Ok(EngineConfig::default()),
    }
}

/// Mount a chart for `symbol` into the document body.
///
/// The first mounted chart decides the console log level for the page.
#[wasm_bindgen(js_name = mountHybridChart)]
pub fn mount_hybrid_chart(symbol: String, config_json: Option<String>) -> Result<(), JsValue> {
    let config = parse_engine_config(config_json.as_deref()).map_err(|e| JsValue::from_str(&e))?;
    let symbol = Symbol::new(symbol).map_err(|e| JsValue::from_str(&e))?;

    init_logger(Box::new(ConsoleLogger::new(config.min_log_level())));
    get_logger().info(COMPONENT, &format!("mounting chart for {symbol}"));

    leptos::mount_to_body(move || leptos::view! { <HybridChartView symbol=symbol config=config /> });
    Ok(())
}

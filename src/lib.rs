//! Weapon-shop landing page effects.
//!
//! Every interactive behavior of the page (visitor counter, navigation,
//! counters, contact form, theme toggle and its hidden catching mini-game)
//! lives here and is wired up by `init_page()` once the DOM is ready.

use wasm_bindgen::prelude::*;

pub mod bubble;
pub mod config;
pub mod contact;
pub mod counter;
mod dom;
pub mod easter_egg;
pub mod game;
pub mod nav;
pub mod outside;
pub mod particles;
pub mod reveal;
pub mod scope;
pub mod store;
pub mod tally;
pub mod theme;
pub mod visitor;

use config::PageConfig;
use store::Records;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    // init_page may raise the filter to Debug.
    let _ = console_log::init_with_level(log::Level::Debug);
    log::set_max_level(log::LevelFilter::Info);
}

/// A component that fails to wire up is logged and skipped.
fn step(name: &str, result: Result<(), JsValue>) {
    if let Err(err) = result {
        log::error!("{name}: init failed: {err:?}");
    }
}

/// Wire every page component. `config_json` is an optional JSON object, see
/// [`PageConfig`].
#[wasm_bindgen]
pub fn init_page(config_json: Option<String>) -> Result<(), JsValue> {
    let config = PageConfig::from_json(config_json.as_deref());
    if config.debug_logging {
        log::set_max_level(log::LevelFilter::Debug);
    }
    let doc = dom::document()?;
    let records = Records::browser_or_memory(&config.storage_prefix);

    step("visitor counter", visitor::init(&doc, &records, &config));
    step("mobile menu", nav::init_mobile_menu(&doc));
    step("smooth scroll", nav::init_smooth_scroll(&doc));
    step("stats counter", reveal::init_stats_counter(&doc, &config));
    step("contact form", contact::init(&doc, &records, &config));
    step("card reveal", reveal::init_card_reveal(&doc));
    step("header scroll", nav::init_header_scroll(&doc));
    step("tool tracking", tally::init(&doc, &records));
    step("easter egg", easter_egg::init(&doc, &records));
    step("scroll to top", nav::init_scroll_to_top(&doc));
    step("theme toggle", theme::init(&doc, &records));
    step("shopkeeper", bubble::init(&doc));
    if config.particles {
        step("particles", particles::init(&doc));
    }

    log::info!("AI WEAPON SHOP initialized");
    Ok(())
}

/// Open the mini-game without going through the theme unlock.
#[wasm_bindgen]
pub fn test_mini_game() -> Result<(), JsValue> {
    game::launch()
}

#[wasm_bindgen]
pub fn close_mini_game() {
    game::close();
}

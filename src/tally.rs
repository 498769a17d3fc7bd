//! Tool link click tracking.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;
use web_sys::{Document, MouseEvent};

use crate::dom;
use crate::store::{Records, keys};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolClickTally(BTreeMap<String, u64>);

impl ToolClickTally {
    pub fn record(&mut self, tool: &str) -> u64 {
        let count = self.0.entry(tool.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    pub fn count(&self, tool: &str) -> u64 {
        self.0.get(tool).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }
}

pub fn init(doc: &Document, records: &Records) -> Result<(), JsValue> {
    for card in dom::query_all(doc, ".tool-card") {
        let Some(link) = dom::query_in::<web_sys::Element>(&card, ".card-link") else {
            continue;
        };
        let records = records.clone();
        dom::listen(&link, "click", move |_evt: MouseEvent| {
            let Some(title) = dom::query_in::<web_sys::Element>(&card, ".card-title") else {
                return;
            };
            let name = title.text_content().unwrap_or_default();
            let name = name.trim();
            let mut tally: ToolClickTally = records.load(keys::TOOL_CLICKS).unwrap_or_default();
            let count = tally.record(name);
            records.save(keys::TOOL_CLICKS, &tally);
            log::debug!("tool click: {name} ({count})");
        })?;
    }
    Ok(())
}

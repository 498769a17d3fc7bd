//! Visitor counter.
//!
//! Shows the visitor's rank (the number they were assigned on first visit)
//! and keeps a per-day visit tally in the preference store.
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;
use web_sys::Document;

use crate::config::PageConfig;
use crate::store::{Records, keys};
use crate::{counter, dom};

pub const STARTING_COUNT: u64 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorRecord {
    pub displayed_count: u64,
    pub first_visit: bool,
    pub visit_streak_days: u32,
    pub last_visit_date: String,
}

impl VisitorRecord {
    pub fn first(today: &str) -> Self {
        Self {
            displayed_count: STARTING_COUNT,
            first_visit: true,
            visit_streak_days: 1,
            last_visit_date: today.to_string(),
        }
    }
}

/// Apply today's visit. Returns the record and whether it must be persisted.
pub fn register_visit(existing: Option<VisitorRecord>, today: &str) -> (VisitorRecord, bool) {
    match existing {
        None => (VisitorRecord::first(today), true),
        Some(rec) if rec.last_visit_date == today => (rec, false),
        Some(mut rec) => {
            rec.visit_streak_days = rec.visit_streak_days.saturating_add(1);
            rec.first_visit = false;
            rec.last_visit_date = today.to_string();
            (rec, true)
        }
    }
}

pub fn calendar_date(year: u32, month: u32, day: u32) -> String {
    format!("{year:04}-{month:02}-{day:02}")
}

pub fn init(doc: &Document, records: &Records, config: &PageConfig) -> Result<(), JsValue> {
    let Some(display) = doc.get_element_by_id("visitorCount") else {
        return Ok(());
    };
    display.set_text_content(Some("---"));

    let (record, dirty) = register_visit(records.load(keys::VISITOR), &dom::today());
    if dirty {
        records.save(keys::VISITOR, &record);
    }
    records.save(keys::VISITED_BEFORE, &true);
    log::debug!(
        "visitor #{} (visit day {})",
        record.displayed_count,
        record.visit_streak_days
    );

    counter::animate(
        &display,
        0,
        record.displayed_count as i64,
        config.visitor_counter_ms,
    );
    Ok(())
}

//! Contact form bridge.
//!
//! Submissions go to the configured endpoint as a `no-cors` POST (the
//! response is opaque). If that throws, one image-pixel GET is attempted.
//! Without an endpoint the submission is appended to the local log instead.
use std::fmt;

use serde::{Deserialize, Serialize};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Document, Event, Headers, HtmlButtonElement, HtmlFormElement, HtmlImageElement, Request,
    RequestCache, RequestInit, RequestMode, UrlSearchParams,
};

use crate::config::PageConfig;
use crate::dom;
use crate::store::{Records, keys};

pub const SUCCESS_TEXT: &str = "✅ お問い合わせありがとうございます！\n\n内容を確認次第、ご連絡させていただきます。\n\n緊急の場合は公式LINEからもお問い合わせいただけます。";
pub const FALLBACK_SUCCESS_TEXT: &str =
    "✅ お問い合わせありがとうございます！\n\n内容を確認次第、ご連絡させていただきます。";
pub const FAILURE_TEXT: &str =
    "❌ 送信に失敗しました。\n\nお手数ですが、公式LINEからお問い合わせください。";
const SENDING_LABEL: &str = "⏳ 送信中...";
/// Oldest entries are dropped beyond this many logged submissions.
pub const SUBMISSION_LOG_LIMIT: usize = 100;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub category: String,
    pub message: String,
    pub timestamp: String,
}

impl ContactSubmission {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Field pairs in form order, for query-string encoding.
    pub fn pairs(&self) -> [(&'static str, &str); 5] {
        [
            ("name", &self.name),
            ("email", &self.email),
            ("category", &self.category),
            ("message", &self.message),
            ("timestamp", &self.timestamp),
        ]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    Primary,
    Fallback,
    LocalLog,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notice {
    Sent(Delivery),
    Failed,
}

impl Notice {
    pub fn text(&self) -> &'static str {
        match self {
            Notice::Sent(Delivery::Fallback) => FALLBACK_SUCCESS_TEXT,
            Notice::Sent(_) => SUCCESS_TEXT,
            Notice::Failed => FAILURE_TEXT,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Notice::Sent(_))
    }
}

/// Decide the user-facing outcome: the fallback runs only if the primary
/// transport failed, and only once.
pub fn settle<E1, E2>(primary: Result<(), E1>, fallback: impl FnOnce() -> Result<(), E2>) -> Notice
where
    E1: fmt::Debug,
    E2: fmt::Debug,
{
    match primary {
        Ok(()) => Notice::Sent(Delivery::Primary),
        Err(err) => {
            log::error!("contact form send failed: {err:?}");
            match fallback() {
                Ok(()) => {
                    log::info!("contact form sent through the fallback");
                    Notice::Sent(Delivery::Fallback)
                }
                Err(err) => {
                    log::error!("contact form fallback failed: {err:?}");
                    Notice::Failed
                }
            }
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionLog(Vec<ContactSubmission>);

impl SubmissionLog {
    pub fn push(&mut self, submission: ContactSubmission) {
        self.0.push(submission);
        if self.0.len() > SUBMISSION_LOG_LIMIT {
            let excess = self.0.len() - SUBMISSION_LOG_LIMIT;
            self.0.drain(..excess);
        }
    }

    pub fn entries(&self) -> &[ContactSubmission] {
        &self.0
    }
}

async fn post(url: &str, submission: &ContactSubmission) -> Result<(), JsValue> {
    let body = submission
        .to_json()
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let headers = Headers::new()?;
    headers.set("Content-Type", "text/plain")?;
    let init = RequestInit::new();
    init.set_method("POST");
    init.set_mode(RequestMode::NoCors);
    init.set_cache(RequestCache::NoCache);
    init.set_headers(&headers);
    init.set_body(&JsValue::from_str(&body));
    let request = Request::new_with_str_and_init(url, &init)?;
    JsFuture::from(dom::window()?.fetch_with_request(&request)).await?;
    Ok(())
}

fn pixel(url: &str, submission: &ContactSubmission) -> Result<(), JsValue> {
    let params = UrlSearchParams::new()?;
    for (key, value) in submission.pairs() {
        params.append(key, value);
    }
    let query: String = params.to_string().into();
    let img = HtmlImageElement::new()?;
    img.set_src(&format!("{url}?{query}"));
    Ok(())
}

fn field(form: &HtmlFormElement, name: &str) -> String {
    form.query_selector(&format!("[name=\"{name}\"]"))
        .ok()
        .flatten()
        .and_then(|el| js_sys::Reflect::get(&el, &JsValue::from_str("value")).ok())
        .and_then(|v| v.as_string())
        .unwrap_or_default()
}

async fn submit(form: HtmlFormElement, records: Records, endpoint: Option<String>) {
    let button: Option<HtmlButtonElement> = form
        .query_selector("button[type=\"submit\"]")
        .ok()
        .flatten()
        .and_then(|b| b.dyn_into().ok());
    let idle_label = button.as_ref().map(|b| b.inner_html());
    if let Some(b) = &button {
        b.set_disabled(true);
        b.set_inner_html(SENDING_LABEL);
    }

    let submission = ContactSubmission {
        name: field(&form, "name"),
        email: field(&form, "email"),
        category: field(&form, "category"),
        message: field(&form, "message"),
        timestamp: dom::iso_timestamp(),
    };

    let notice = match endpoint {
        Some(url) => {
            log::info!("contact form: sending ({})", submission.category);
            let primary = post(&url, &submission).await;
            settle(primary, || pixel(&url, &submission))
        }
        None => {
            let mut journal: SubmissionLog = records.load(keys::SUBMISSIONS).unwrap_or_default();
            journal.push(submission);
            match records.set(keys::SUBMISSIONS, &journal) {
                Ok(()) => Notice::Sent(Delivery::LocalLog),
                Err(err) => {
                    log::error!("contact form could not be logged: {err}");
                    Notice::Failed
                }
            }
        }
    };

    dom::notify(notice.text());
    if notice.is_success() {
        form.reset();
    }
    if let (Some(b), Some(label)) = (button, idle_label) {
        b.set_disabled(false);
        b.set_inner_html(&label);
    }
}

pub fn init(doc: &Document, records: &Records, config: &PageConfig) -> Result<(), JsValue> {
    let Some(form) = dom::by_id::<HtmlFormElement>(doc, "contactForm") else {
        return Ok(());
    };
    let records = records.clone();
    let endpoint = config.form_endpoint.clone();
    let target = form.clone();
    dom::listen(&form, "submit", move |evt: Event| {
        evt.prevent_default();
        wasm_bindgen_futures::spawn_local(submit(
            target.clone(),
            records.clone(),
            endpoint.clone(),
        ));
    })
}

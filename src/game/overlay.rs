//! Full-screen overlay that runs one [`GameSession`].
//!
//! Everything the overlay starts (spawn timer, per-sprite polls, effect
//! timeouts, input listeners) is registered in the overlay's [`Scope`].
//! Leaving `Running` releases the spawner and sprite groups; closing the
//! overlay drops the whole scope together with the injected DOM and styles.
use std::cell::RefCell;

use gloo_events::{EventListener, EventListenerOptions};
use gloo_timers::callback::{Interval, Timeout};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, HtmlElement, HtmlImageElement, MouseEvent, TouchEvent};

use super::assets::{SpriteArt, SpriteFace};
use super::session::{
    self, GameSession, Outcome, Phase, Probe, SpriteId, START_LIVES, WIN_CATCHES,
};
use crate::dom;
use crate::scope::Scope;

const OVERLAY_ID: &str = "secretMiniGame";
const STYLE_ID: &str = "secretMiniGameStyles";
const CATCH_EFFECT_MS: u32 = 500;
const MISS_CUE_MS: u32 = 300;
const CONFETTI_PIECES: u32 = 50;
const CONFETTI_STAGGER_MS: u32 = 80;
const CONFETTI_LIFETIME_MS: u32 = 5000;
const CONFETTI: [&str; 6] = ["🎉", "✨", "🌟", "💫", "🎊", "⭐"];
const CATCHER_GLOW: &str = "drop-shadow(0 0 10px rgba(255, 51, 102, 0.8))";
const CATCHER_HURT: &str = "drop-shadow(0 0 20px red)";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum TaskKey {
    Controls,
    Spawner,
    Sprite(SpriteId),
    Effect(u32),
}

// Variants are held for their Drop, which cancels the timer or listener.
#[allow(dead_code)]
enum Task {
    Interval(Interval),
    Timeout(Timeout),
    Listener(EventListener),
}

impl From<Interval> for Task {
    fn from(i: Interval) -> Self {
        Task::Interval(i)
    }
}

impl From<Timeout> for Task {
    fn from(t: Timeout) -> Self {
        Task::Timeout(t)
    }
}

impl From<EventListener> for Task {
    fn from(l: EventListener) -> Self {
        Task::Listener(l)
    }
}

struct Overlay {
    session: GameSession,
    art: SpriteArt,
    scope: Scope<TaskKey, Task>,
    root: Element,
    style: Element,
    area: HtmlElement,
    catcher: HtmlElement,
    catch_count: Element,
    lives_count: Element,
    message: Element,
    next_effect: u32,
    opened_ms: f64,
}

thread_local! {
    static OVERLAY: RefCell<Option<Overlay>> = RefCell::new(None);
}

/// Run `f` against the open overlay. Whatever `f` returns is dropped by the
/// caller after the borrow ends, so returning released tasks is safe.
fn with_overlay<R>(f: impl FnOnce(&mut Overlay) -> R) -> Option<R> {
    OVERLAY.with(|cell| {
        let mut guard = cell.try_borrow_mut().ok()?;
        guard.as_mut().map(f)
    })
}

pub fn is_open() -> bool {
    OVERLAY.with(|cell| cell.try_borrow().map(|g| g.is_some()).unwrap_or(true))
}

fn missing(what: &str) -> JsValue {
    JsValue::from_str(&format!("mini-game markup is missing {what}"))
}

/// Open the overlay and start a fresh session. No-op if one is already open.
pub fn launch() -> Result<(), JsValue> {
    if is_open() {
        log::debug!("mini-game already open");
        return Ok(());
    }
    let doc = dom::document()?;
    let head = doc.head().ok_or_else(|| missing("<head>"))?;
    let body = doc.body().ok_or_else(|| missing("<body>"))?;

    let style = doc.create_element("style")?;
    style.set_id(STYLE_ID);
    style.set_text_content(Some(GAME_CSS));

    let root = doc.create_element("div")?;
    root.set_id(OVERLAY_ID);
    root.set_inner_html(&format!(
        r#"<div class="game-container">
    <button class="game-close-btn">×</button>
    <div class="game-header">
        <h2>🎮 裏ステージ 🎮</h2>
        <p>赤いパンツで店主をキャッチ！</p>
        <div class="game-stats">
            <span class="game-score">キャッチ: <span id="catchCount">0</span>/{WIN_CATCHES}</span>
            <span class="game-lives">❤️ <span id="livesCount">{START_LIVES}</span></span>
        </div>
    </div>
    <div class="game-area" id="gameArea">
        <div class="catcher" id="catcher"><div class="pants-catcher"></div></div>
    </div>
    <div class="game-message" id="gameMessage"></div>
</div>"#
    ));

    let area: HtmlElement = dom::query_in(&root, "#gameArea").ok_or_else(|| missing("#gameArea"))?;
    let catcher: HtmlElement = dom::query_in(&root, "#catcher").ok_or_else(|| missing("#catcher"))?;
    let catch_count: Element =
        dom::query_in(&root, "#catchCount").ok_or_else(|| missing("#catchCount"))?;
    let lives_count: Element =
        dom::query_in(&root, "#livesCount").ok_or_else(|| missing("#livesCount"))?;
    let message: Element =
        dom::query_in(&root, "#gameMessage").ok_or_else(|| missing("#gameMessage"))?;
    let close_btn: Element =
        dom::query_in(&root, ".game-close-btn").ok_or_else(|| missing("close button"))?;

    head.append_child(&style)?;
    body.append_child(&root)?;

    let on_close = EventListener::new(&close_btn, "click", |_| close());
    let on_mouse = EventListener::new(&area, "mousemove", |evt| {
        if let Some(m) = evt.dyn_ref::<MouseEvent>() {
            track_pointer(m.client_x() as f64);
        }
    });
    let on_touch = EventListener::new_with_options(
        &area,
        "touchmove",
        EventListenerOptions::enable_prevent_default(),
        |evt| {
            let Some(touch) = evt
                .dyn_ref::<TouchEvent>()
                .and_then(|t| t.touches().get(0))
            else {
                return;
            };
            if with_overlay(|o| o.session.is_running()) == Some(true) {
                evt.prevent_default();
                track_pointer(touch.client_x() as f64);
            }
        },
    );
    let start = Timeout::new(session::START_DELAY_MS, start_spawning);

    let mut overlay = Overlay {
        session: GameSession::new(),
        art: SpriteArt::default(),
        scope: Scope::new(),
        root,
        style,
        area,
        catcher,
        catch_count,
        lives_count,
        message,
        next_effect: 0,
        opened_ms: dom::now_ms(),
    };
    overlay.track(TaskKey::Controls, on_close.into());
    overlay.track(TaskKey::Controls, on_mouse.into());
    overlay.track(TaskKey::Controls, on_touch.into());
    overlay.track(TaskKey::Spawner, start.into());
    OVERLAY.with(|cell| cell.replace(Some(overlay)));

    log::info!("mini-game started");
    Ok(())
}

/// Close the overlay, stopping every timer it owns.
pub fn close() {
    let taken = OVERLAY.with(|cell| cell.try_borrow_mut().ok().and_then(|mut g| g.take()));
    drop(taken);
}

fn start_spawning() {
    let spawner = Interval::new(session::SPAWN_PERIOD_MS, spawn_tick);
    with_overlay(move |o| o.track(TaskKey::Spawner, spawner.into()));
}

fn spawn_tick() {
    if let Some(Err(err)) = with_overlay(|o| o.spawn_sprite()) {
        log::warn!("mini-game spawn failed: {err:?}");
    }
}

fn track_pointer(client_x: f64) {
    with_overlay(|o| {
        if !o.session.is_running() {
            return;
        }
        let area = dom::rect_of(&o.area);
        let x = o
            .session
            .move_catcher(client_x - area.left, area.right - area.left);
        dom::set_style(&o.catcher, "left", &format!("{x}px"));
    });
}

/// Forget a one-shot effect once its timeout has fired.
fn release_effect(key: TaskKey) {
    let fired = with_overlay(|o| o.scope.release(&key));
    drop(fired);
}

fn reload_page() {
    if let Err(err) = dom::window().and_then(|w| w.location().reload()) {
        log::warn!("reload failed: {err:?}");
    }
}

impl Overlay {
    fn track(&mut self, key: TaskKey, task: Task) {
        // a rejected task is dropped here, which stops it
        let _ = self.scope.register(key, task);
    }

    fn effect_key(&mut self) -> TaskKey {
        self.next_effect += 1;
        TaskKey::Effect(self.next_effect)
    }

    fn spawn_sprite(&mut self) -> Result<(), JsValue> {
        let width = self.area.client_width() as f64;
        let Some(plan) = self.session.spawn(width, dom::random(), dom::random()) else {
            return Ok(());
        };
        let key = TaskKey::Sprite(plan.id);
        let doc = dom::document()?;
        let sprite: HtmlElement = doc.create_element("div")?.dyn_into()?;
        sprite.set_class_name("falling-character");

        match self.art.pick(dom::random()) {
            SpriteFace::Image { src, index } => {
                let img: HtmlImageElement = doc.create_element("img")?.dyn_into()?;
                img.set_src(src);
                img.set_alt("店主");
                let holder = sprite.clone();
                let on_error = EventListener::once(&img, "error", move |_| {
                    if with_overlay(|o| o.art.degrade()).is_some() {
                        log::warn!("sprite image failed to load, switching to emoji");
                    }
                    holder.set_text_content(Some(SpriteArt::fallback_for(index)));
                    dom::set_style(&holder, "font-size", "50px");
                });
                sprite.append_child(&img)?;
                self.track(key, on_error.into());
            }
            SpriteFace::Emoji(face) => {
                sprite.set_text_content(Some(face));
                dom::set_style(&sprite, "font-size", "50px");
            }
        }
        dom::set_style(&sprite, "left", &format!("{}px", plan.left));
        dom::set_style(
            &sprite,
            "animation-duration",
            &format!("{}s", plan.fall_seconds),
        );
        self.area.append_child(&sprite)?;

        let id = plan.id;
        let polled = sprite.clone();
        let poll = Interval::new(session::POLL_PERIOD_MS, move || {
            let released = with_overlay(|o| o.poll_sprite(id, &polled));
            drop(released);
        });
        let expiring = sprite.clone();
        let on_end = EventListener::once(&sprite, "animationend", move |_| {
            let released = with_overlay(|o| o.expire_sprite(id, &expiring));
            drop(released);
        });
        self.track(key, poll.into());
        self.track(key, on_end.into());
        Ok(())
    }

    fn poll_sprite(&mut self, id: SpriteId, sprite: &HtmlElement) -> Vec<Task> {
        let key = TaskKey::Sprite(id);
        if !self.session.is_running() {
            sprite.remove();
            return self.scope.release(&key);
        }
        let sprite_rect = dom::rect_of(sprite);
        let catcher_rect = dom::rect_of(&self.catcher);
        let area_rect = dom::rect_of(&self.area);
        let outcome = match session::probe(&sprite_rect, &catcher_rect, area_rect.bottom) {
            Probe::Pending => return Vec::new(),
            Probe::Catch => Outcome::Caught,
            Probe::Miss => Outcome::Missed,
        };

        sprite.remove();
        let mut released = self.scope.release(&key);
        let Some(res) = self.session.resolve(id, outcome) else {
            return released;
        };
        match outcome {
            Outcome::Caught => {
                self.catch_count
                    .set_text_content(Some(&res.catches.to_string()));
                self.catch_effect(
                    sprite_rect.left - area_rect.left,
                    catcher_rect.top - area_rect.top,
                );
            }
            Outcome::Missed => {
                self.lives_count.set_text_content(Some(&res.lives.to_string()));
                self.miss_cue();
            }
            Outcome::Expired => {}
        }
        if let Some(phase) = res.ended {
            released.extend(self.finish(phase));
        }
        released
    }

    fn expire_sprite(&mut self, id: SpriteId, sprite: &HtmlElement) -> Vec<Task> {
        sprite.remove();
        self.session.resolve(id, Outcome::Expired);
        self.scope.release(&TaskKey::Sprite(id))
    }

    fn catch_effect(&mut self, x: f64, y: f64) {
        let Ok(effect) = dom::document().and_then(|d| d.create_element("div")) else {
            return;
        };
        effect.set_class_name("catch-effect");
        effect.set_text_content(Some("✨"));
        effect
            .set_attribute("style", &format!("left:{x}px; top:{y}px;"))
            .ok();
        if self.area.append_child(&effect).is_err() {
            return;
        }
        let key = self.effect_key();
        let fade = Timeout::new(CATCH_EFFECT_MS, move || {
            effect.remove();
            release_effect(key);
        });
        self.track(key, fade.into());
    }

    fn miss_cue(&mut self) {
        dom::set_style(&self.catcher, "filter", CATCHER_HURT);
        let catcher = self.catcher.clone();
        let key = self.effect_key();
        let restore = Timeout::new(MISS_CUE_MS, move || {
            dom::set_style(&catcher, "filter", CATCHER_GLOW);
            release_effect(key);
        });
        self.track(key, restore.into());
    }

    /// Leave `Running`: stop spawning and polling, then show the end screen.
    fn finish(&mut self, phase: Phase) -> Vec<Task> {
        let released = self
            .scope
            .release_where(|k| matches!(k, TaskKey::Spawner | TaskKey::Sprite(_)));
        for el in dom::query_all_in(&self.area, ".falling-character") {
            el.remove();
        }
        let shown = match phase {
            Phase::Won => {
                log::info!("mini-game cleared with {} lives left", self.session.lives());
                let shown = self.show_message(
                    r#"<div style="font-size: 2.5rem;">🎊 CLEAR! 🎊</div>
<div style="font-size: 1.2rem; margin-top: 15px; color: #00FF88;">店主を全員キャッチ！</div>
<div style="font-size: 0.9rem; margin-top: 10px; color: #FFD700;">🏆 裏ボス撃破 🏆</div>
<button id="gameReturn">HPに戻る</button>"#,
                );
                self.confetti();
                shown
            }
            Phase::Lost => {
                log::info!("mini-game over after {} catches", self.session.catches());
                self.show_message(&format!(
                    r#"<div style="font-size: 2rem; color: #FF3366;">💔 GAME OVER 💔</div>
<div style="font-size: 1rem; margin-top: 15px;">キャッチ数: {}/{WIN_CATCHES}</div>
<div style="font-size: 0.8rem; margin-top: 5px; color: #888;">店主が逃げてしまった...</div>
<button id="gameRetry">リトライ</button>
<button id="gameReturn" style="background: #666;">HPに戻る</button>"#,
                    self.session.catches()
                ))
            }
            Phase::Running => Ok(()),
        };
        if let Err(err) = shown {
            log::warn!("mini-game end screen failed: {err:?}");
        }
        released
    }

    fn show_message(&mut self, html: &str) -> Result<(), JsValue> {
        self.message.set_inner_html(html);
        self.message.class_list().add_1("show")?;
        if let Some(back) = dom::query_in::<Element>(&self.message, "#gameReturn") {
            let on_back = EventListener::new(&back, "click", |_| close());
            self.track(TaskKey::Controls, on_back.into());
        }
        if let Some(retry) = dom::query_in::<Element>(&self.message, "#gameRetry") {
            let on_retry = EventListener::new(&retry, "click", |_| reload_page());
            self.track(TaskKey::Controls, on_retry.into());
        }
        Ok(())
    }

    fn confetti(&mut self) {
        for i in 0..CONFETTI_PIECES {
            let key = self.effect_key();
            let throw = Timeout::new(i * CONFETTI_STAGGER_MS, move || {
                with_overlay(|o| o.drop_confetti());
                release_effect(key);
            });
            self.track(key, throw.into());
        }
    }

    fn drop_confetti(&mut self) {
        let Ok(piece) = dom::document().and_then(|d| d.create_element("div")) else {
            return;
        };
        let glyph = CONFETTI[super::assets::roll_index(dom::random(), CONFETTI.len())];
        piece.set_text_content(Some(glyph));
        piece
            .set_attribute(
                "style",
                &format!(
                    "position:absolute; font-size:{:.0}px; left:{:.1}%; top:-50px; animation: fall {:.2}s linear forwards; pointer-events:none;",
                    20.0 + dom::random() * 20.0,
                    dom::random() * 100.0,
                    3.0 + dom::random() * 2.0
                ),
            )
            .ok();
        if self.area.append_child(&piece).is_err() {
            return;
        }
        let key = self.effect_key();
        let sweep = Timeout::new(CONFETTI_LIFETIME_MS, move || {
            piece.remove();
            release_effect(key);
        });
        self.track(key, sweep.into());
    }
}

impl Drop for Overlay {
    fn drop(&mut self) {
        drop(self.scope.cancel());
        self.root.remove();
        self.style.remove();
        log::info!(
            "mini-game closed after {:.1}s ({} caught, {} lives left)",
            (dom::now_ms() - self.opened_ms) / 1000.0,
            self.session.catches(),
            self.session.lives()
        );
    }
}

const GAME_CSS: &str = r#"
#secretMiniGame {
    position: fixed; top: 0; left: 0; width: 100%; height: 100%;
    background: rgba(0, 0, 0, 0.95); z-index: 10000;
    display: flex; justify-content: center; align-items: center;
    animation: fadeIn 0.5s ease;
}
.game-container {
    width: 90%; max-width: 500px; height: 80vh; max-height: 700px;
    background: linear-gradient(180deg, #1a1a2e 0%, #16213e 100%);
    border: 4px solid #FFD700; border-radius: 20px;
    position: relative; overflow: hidden;
    box-shadow: 0 0 50px rgba(255, 215, 0, 0.3);
}
.game-close-btn {
    position: absolute; top: 10px; right: 10px; width: 40px; height: 40px;
    background: #FF3366; border: none; border-radius: 50%;
    color: white; font-size: 24px; cursor: pointer; z-index: 100;
    transition: all 0.3s ease;
}
.game-close-btn:hover { background: #FF0044; transform: scale(1.1); }
.game-header {
    text-align: center; padding: 15px;
    background: linear-gradient(135deg, rgba(255, 215, 0, 0.2) 0%, rgba(157, 78, 221, 0.2) 100%);
    border-bottom: 2px solid #FFD700;
}
.game-header h2 { color: #FFD700; margin: 0; font-size: 1.5rem; text-shadow: 0 0 10px rgba(255, 215, 0, 0.5); }
.game-header p { color: #fff; margin: 5px 0 0; font-size: 0.9rem; }
.game-stats { display: flex; justify-content: space-around; margin-top: 10px; color: #fff; font-size: 1rem; }
.game-score { color: #00FF88; }
.game-lives { color: #FF3366; }
.game-area {
    position: relative; width: 100%; height: calc(100% - 120px);
    background:
        radial-gradient(circle at 30% 70%, rgba(157, 78, 221, 0.1) 0%, transparent 50%),
        radial-gradient(circle at 70% 30%, rgba(0, 212, 255, 0.1) 0%, transparent 50%);
    cursor: none;
}
.catcher {
    position: absolute; bottom: 20px; left: 50%; transform: translateX(-50%);
    transition: left 0.05s ease-out; user-select: none;
    filter: drop-shadow(0 0 10px rgba(255, 51, 102, 0.8));
}
.pants-catcher {
    width: 100px; height: 40px;
    background: linear-gradient(180deg, #CC2233 0%, #FF3344 50%, #CC2233 100%);
    border: 3px solid #AA1122; border-radius: 0 0 30px 30px;
    box-shadow: 0 5px 15px rgba(255, 51, 102, 0.5), inset 0 -5px 10px rgba(0,0,0,0.3), inset 0 5px 10px rgba(255,255,255,0.2);
    position: relative;
}
.pants-catcher::before {
    content: ''; position: absolute; top: -8px; left: 50%; transform: translateX(-50%);
    width: 110px; height: 15px;
    background: linear-gradient(180deg, #8B4513 0%, #654321 100%);
    border: 2px solid #5C3A21; border-radius: 3px;
}
.falling-character {
    position: absolute; animation: fall linear forwards; user-select: none;
    filter: drop-shadow(0 0 8px rgba(255, 255, 255, 0.6));
}
.falling-character img { width: 70px; height: auto; image-rendering: pixelated; }
@keyframes fall {
    0% { top: -100px; transform: rotate(0deg) scale(1); }
    25% { transform: rotate(15deg) scale(1.05); }
    50% { transform: rotate(-15deg) scale(1); }
    75% { transform: rotate(10deg) scale(1.05); }
    100% { top: calc(100% + 100px); transform: rotate(-5deg) scale(1); }
}
.catch-effect { position: absolute; font-size: 30px; animation: catchPop 0.5s ease-out forwards; pointer-events: none; }
@keyframes catchPop {
    0% { transform: scale(1); opacity: 1; }
    100% { transform: scale(2) translateY(-30px); opacity: 0; }
}
.game-message {
    position: absolute; top: 50%; left: 50%; transform: translate(-50%, -50%);
    text-align: center; color: #FFD700; font-size: 2rem; font-weight: bold;
    text-shadow: 0 0 20px rgba(255, 215, 0, 0.8); z-index: 50; display: none;
}
.game-message.show { display: block; animation: messageAppear 0.5s ease; }
@keyframes messageAppear {
    0% { transform: translate(-50%, -50%) scale(0); }
    50% { transform: translate(-50%, -50%) scale(1.2); }
    100% { transform: translate(-50%, -50%) scale(1); }
}
.game-message button {
    display: block; margin: 20px auto 0; padding: 10px 30px;
    background: linear-gradient(135deg, #FFD700, #FFA500);
    border: none; border-radius: 25px; color: #1a1a2e;
    font-size: 1rem; font-weight: bold; cursor: pointer; transition: all 0.3s ease;
}
.game-message button:hover { transform: scale(1.1); box-shadow: 0 0 20px rgba(255, 215, 0, 0.5); }
"#;

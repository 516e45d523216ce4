//! Pesca Braba entry point
//!
//! In the browser: wires pointer, touch and keyboard input into the
//! simulation, plays audio cues, updates the DOM HUD and draws a Canvas2D
//! view. Natively: runs one headless session with a simple autopilot.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        CanvasRenderingContext2d, Document, HtmlCanvasElement, KeyboardEvent, MouseEvent,
        TouchEvent,
    };

    use pesca_braba::audio::{AudioManager, SoundCue};
    use pesca_braba::consts::*;
    use pesca_braba::settings::Settings;
    use pesca_braba::sim::{
        EntityKind, GameEvent, GamePhase, GameState, SessionConfig, Snapshot, TickInput, Viewport,
        snapshot, tick,
    };

    /// How long "-1" / "+50" labels float above the player
    const FLOATING_TEXT_MS: f32 = 1000.0;
    const FLOATING_TEXT_RISE: f32 = 40.0;
    /// How long the treasure and last-30-seconds banners stay up
    const BANNER_MS: f32 = 2000.0;
    const HURRY_UP_TEXT: &str = "ÚLTIMOS 30 SEGUNDOS!";

    struct FloatingText {
        text: String,
        pos: Vec2,
        color: &'static str,
        age_ms: f32,
    }

    /// Game instance holding all state
    struct Game {
        state: GameState,
        input: TickInput,
        last_time: f64,
        settings: Settings,
        audio: AudioManager,
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
        floating: Vec<FloatingText>,
        /// DOM banners on screen, with the time they have left
        banners: Vec<(&'static str, f32)>,
    }

    impl Game {
        fn new(seed: u64, canvas: HtmlCanvasElement, ctx: CanvasRenderingContext2d) -> Self {
            let settings = Settings::load();
            let viewport = Viewport::new(canvas.width() as f32, canvas.height() as f32);
            let state = GameState::new(&SessionConfig {
                seed,
                viewport,
                previous_track: None,
            });
            Self {
                state,
                input: TickInput::default(),
                last_time: 0.0,
                audio: AudioManager::new(&settings, seed),
                settings,
                canvas,
                ctx,
                floating: Vec::new(),
                banners: Vec::new(),
            }
        }

        /// Pointer position in canvas space
        fn canvas_point(&self, client_x: f64, client_y: f64) -> Vec2 {
            let rect = self.canvas.get_bounding_client_rect();
            Vec2::new(
                (client_x - rect.left()) as f32,
                (client_y - rect.top()) as f32,
            )
        }

        /// Click, tap or Space: restarts once the session is over
        fn press(&mut self) {
            self.audio.resume();
            if self.state.is_ended() {
                self.input.restart = true;
            }
        }

        fn toggle_mute(&mut self) {
            let muted = self.settings.toggle_mute();
            self.audio.set_muted(muted);
            self.settings.save();
            log::info!("Muted: {muted}");
        }

        /// Run one simulation step for this frame
        fn update(&mut self, dt: f32) {
            let dt = dt.min(MAX_FRAME_DT);
            let input = self.input.clone();
            tick(&mut self.state, &input, dt);

            // Clear one-shot inputs after processing
            self.input.pause = false;
            self.input.restart = false;

            for event in self.state.drain_events() {
                self.handle_event(&event);
            }

            let dt_ms = dt * 1000.0;
            for text in &mut self.floating {
                text.age_ms += dt_ms;
            }
            self.floating.retain(|t| t.age_ms < FLOATING_TEXT_MS);

            for (id, left_ms) in &mut self.banners {
                *left_ms -= dt_ms;
                if *left_ms <= 0.0 {
                    hide_banner(*id);
                }
            }
            self.banners.retain(|(_, left_ms)| *left_ms > 0.0);
        }

        fn show_banner(&mut self, id: &'static str, text: &str) {
            if let Some(el) = document().and_then(|d| d.get_element_by_id(id)) {
                el.set_text_content(Some(text));
                let _ = el.set_attribute("class", "show");
            }
            self.banners.retain(|(shown, _)| *shown != id);
            self.banners.push((id, BANNER_MS));
        }

        fn handle_event(&mut self, event: &GameEvent) {
            if let Some(cue) = SoundCue::for_event(event) {
                self.audio.play(cue);
            }
            match event {
                GameEvent::SessionStarted { track } => {
                    self.floating.clear();
                    for (id, _) in self.banners.drain(..) {
                        hide_banner(id);
                    }
                    self.audio.play_music(*track);
                }
                GameEvent::Damaged { .. } => self.floating.push(FloatingText {
                    text: "-1".to_string(),
                    pos: self.state.player,
                    color: "#ff4040",
                    age_ms: 0.0,
                }),
                GameEvent::TreasureCollected { sprite, value, .. } => {
                    self.floating.push(FloatingText {
                        text: format!("+{value}"),
                        pos: self.state.player,
                        color: "#ffd700",
                        age_ms: 0.0,
                    });
                    self.show_banner("treasure-banner", &format!("Tesouro resgatado: {sprite}"));
                }
                GameEvent::HurryUp => self.show_banner("hurry-banner", HURRY_UP_TEXT),
                GameEvent::Ended { .. } => self.audio.stop_music(),
                _ => {}
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self, snap: &Snapshot) {
            let Some(document) = document() else {
                return;
            };

            if let Some(el) = document.get_element_by_id("hud-score") {
                el.set_text_content(Some(&snap.score_text));
            }
            if let Some(el) = document.get_element_by_id("hud-time") {
                el.set_text_content(Some(&snap.clock_text));
                let class = if snap.urgent { "hud-item urgent" } else { "hud-item" };
                let _ = el.set_attribute("class", class);
            }
            if let Some(el) = document.get_element_by_id("hud-lives") {
                el.set_text_content(Some(&"♥".repeat(snap.lives as usize)));
            }
            if let Some(el) = document.get_element_by_id("mute-button") {
                let label = if self.audio.is_muted() { "🔇" } else { "🔊" };
                el.set_text_content(Some(label));
            }
        }

        /// Debug view: boxes and lines, no sprites
        fn render(&self, snap: &Snapshot) {
            let ctx = &self.ctx;
            let w = self.canvas.width() as f64;
            let h = self.canvas.height() as f64;
            let waterline = snap.player.y as f64 + 20.0;

            ctx.set_global_alpha(1.0);
            ctx.set_fill_style_str("#87ceeb");
            ctx.fill_rect(0.0, 0.0, w, waterline);
            ctx.set_fill_style_str("#1e5799");
            ctx.fill_rect(0.0, waterline, w, h - waterline);

            for entity in &snap.entities {
                let color = match entity.kind {
                    EntityKind::Fish => "#ff8c00",
                    EntityKind::Whale => "#2f4f4f",
                    EntityKind::Treasure => "#ffd700",
                };
                ctx.set_fill_style_str(color);
                fill_box(ctx, entity.bounds.min, entity.bounds.max);
                if self.settings.show_hitboxes {
                    ctx.set_stroke_style_str("#ff00ff");
                    stroke_box(ctx, entity.bounds.min, entity.bounds.max);
                }
            }

            // Fisherman
            ctx.set_global_alpha(snap.player_alpha as f64);
            ctx.set_fill_style_str("#8b4513");
            fill_box(ctx, snap.player - Vec2::new(16.0, 32.0), snap.player + Vec2::new(16.0, 16.0));
            ctx.set_global_alpha(1.0);

            // Line and hook
            ctx.set_stroke_style_str("#ffffff");
            ctx.begin_path();
            ctx.move_to(snap.rod_tip.x as f64, snap.rod_tip.y as f64);
            ctx.line_to(snap.hook.x as f64, snap.hook.y as f64);
            ctx.stroke();
            ctx.set_fill_style_str("#c0c0c0");
            fill_box(ctx, snap.hook_bounds.min, snap.hook_bounds.max);

            ctx.set_font("bold 24px sans-serif");
            ctx.set_text_align("center");
            for text in &self.floating {
                let t = text.age_ms / FLOATING_TEXT_MS;
                ctx.set_global_alpha((1.0 - t) as f64);
                ctx.set_fill_style_str(text.color);
                let _ = ctx.fill_text(
                    &text.text,
                    text.pos.x as f64,
                    (text.pos.y - 40.0 - FLOATING_TEXT_RISE * t) as f64,
                );
            }
            ctx.set_global_alpha(1.0);

            if snap.paused {
                ctx.set_fill_style_str("#ffffff");
                let _ = ctx.fill_text("PAUSADO", w / 2.0, h / 2.0);
            }

            if let Some(banner) = &snap.banner {
                ctx.set_fill_style_str("rgba(0, 0, 0, 0.7)");
                ctx.fill_rect(0.0, 0.0, w, h);
                ctx.set_fill_style_str("#ffffff");
                ctx.set_font("bold 36px sans-serif");
                let _ = ctx.fill_text(banner.title, w / 2.0, h / 3.0);
                ctx.set_font("20px sans-serif");
                for (i, line) in banner.message.lines().enumerate() {
                    let _ = ctx.fill_text(line.trim(), w / 2.0, h / 3.0 + 50.0 + i as f64 * 26.0);
                }
            }
        }
    }

    fn document() -> Option<Document> {
        web_sys::window().and_then(|w| w.document())
    }

    fn fill_box(ctx: &CanvasRenderingContext2d, min: Vec2, max: Vec2) {
        ctx.fill_rect(
            min.x as f64,
            min.y as f64,
            (max.x - min.x) as f64,
            (max.y - min.y) as f64,
        );
    }

    fn stroke_box(ctx: &CanvasRenderingContext2d, min: Vec2, max: Vec2) {
        ctx.stroke_rect(
            min.x as f64,
            min.y as f64,
            (max.x - min.x) as f64,
            (max.y - min.y) as f64,
        );
    }

    fn hide_banner(id: &str) {
        if let Some(el) = document().and_then(|d| d.get_element_by_id(id)) {
            let _ = el.set_attribute("class", "hidden");
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Logger init failed: {e}").into());
        }

        log::info!("Pesca Braba starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;
        canvas.set_width(canvas.client_width().max(1) as u32);
        canvas.set_height(canvas.client_height().max(1) as u32);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("2d context unavailable")?
            .dyn_into()?;

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, canvas.clone(), ctx)));

        setup_input_handlers(&canvas, game.clone())?;
        setup_auto_pause(game.clone())?;

        request_animation_frame(game);
        log::info!("Pesca Braba running!");
        Ok(())
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        // Mouse move
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                let pos = g.canvas_point(event.client_x() as f64, event.client_y() as f64);
                g.input.pointer = Some(pos);
            });
            canvas.add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Mouse click
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().press();
            });
            canvas.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Touch start / move
        for name in ["touchstart", "touchmove"] {
            let game = game.clone();
            let is_start = name == "touchstart";
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                if is_start {
                    g.press();
                }
                if let Some(touch) = event.touches().get(0) {
                    let pos = g.canvas_point(touch.client_x() as f64, touch.client_y() as f64);
                    g.input.pointer = Some(pos);
                }
            });
            canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Keyboard
        {
            let game = game.clone();
            let window = web_sys::window().ok_or("no window")?;
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    " " => g.press(),
                    "Escape" | "p" | "P" => g.input.pause = true,
                    "m" | "M" => g.toggle_mute(),
                    "h" | "H" => {
                        g.settings.show_hitboxes = !g.settings.show_hitboxes;
                        g.settings.save();
                    }
                    _ => {}
                }
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Pause button
        if let Some(btn) = document().and_then(|d| d.get_element_by_id("pause-button")) {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                event.stop_propagation();
                game.borrow_mut().input.pause = true;
            });
            btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Mute button
        if let Some(btn) = document().and_then(|d| d.get_element_by_id("mute-button")) {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                event.stop_propagation();
                game.borrow_mut().toggle_mute();
            });
            btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        if let Err(e) = window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            log::error!("requestAnimationFrame failed: {e:?}");
        }
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                FRAME_DT
            };
            g.last_time = time;

            g.update(dt);
            let snap = snapshot(&g.state);
            g.render(&snap);
            g.update_hud(&snap);
        }

        request_animation_frame(game);
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    if g.settings.pause_on_blur && g.state.phase == GamePhase::Playing {
                        g.input.pause = true;
                        log::info!("Auto-paused (tab hidden)");
                    }
                }
            });
            document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            )?;
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.settings.pause_on_blur && g.state.phase == GamePhase::Playing {
                    g.input.pause = true;
                    log::info!("Auto-paused (window blur)");
                }
            });
            window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    use pesca_braba::Tuning;
    use pesca_braba::consts::FRAME_DT;
    use pesca_braba::sim::{GameState, SessionConfig, TickInput, snapshot, tick};

    env_logger::init();
    log::info!("Pesca Braba (native) starting...");

    // Usage: pesca-braba [seed] [tuning.json]
    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);
    let tuning = match args.next() {
        Some(path) => match std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|json| Tuning::from_json(&json).map_err(|e| e.to_string()))
        {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("Could not load tuning from {path}: {e}");
                return std::process::ExitCode::FAILURE;
            }
        },
        None => Tuning::default(),
    };
    if let Err(e) = tuning.validate() {
        log::error!("Invalid tuning: {e}");
        return std::process::ExitCode::FAILURE;
    }

    let mut state = GameState::with_tuning(
        &SessionConfig {
            seed,
            ..Default::default()
        },
        tuning,
    );

    while !state.is_ended() {
        let input = TickInput {
            pointer: Some(autopilot(&state)),
            ..Default::default()
        };
        tick(&mut state, &input, FRAME_DT);
        state.drain_events();
    }

    let snap = snapshot(&state);
    if let Some(banner) = snap.banner {
        println!("{}", banner.title);
        println!("{}", banner.message);
    }
    println!("{} | {} | lives {}", snap.score_text, snap.clock_text, snap.lives);
    std::process::ExitCode::SUCCESS
}

/// Chase the nearest free treasure, reel in once one is hooked
#[cfg(not(target_arch = "wasm32"))]
fn autopilot(state: &pesca_braba::sim::GameState) -> glam::Vec2 {
    use pesca_braba::distance;
    use pesca_braba::sim::EntityKind;

    if state.caught_treasure.is_some() {
        return state.player;
    }
    state
        .entities
        .iter()
        .filter(|e| e.kind == EntityKind::Treasure && !e.caught)
        .min_by(|a, b| {
            distance(a.pos, state.hook.pos).total_cmp(&distance(b.pos, state.hook.pos))
        })
        .map(|e| e.pos)
        .unwrap_or(state.hook.pos)
}

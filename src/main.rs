//! Typhoon entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use wasm_bindgen::Clamped;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        CanvasRenderingContext2d, HtmlCanvasElement, ImageData, KeyboardEvent, MouseEvent,
        TouchEvent,
    };

    use typhoon::audio::{AudioManager, SoundEffect};
    use typhoon::consts::*;
    use typhoon::highscores::format_date;
    use typhoon::renderer::Frame;
    use typhoon::sim::{GameEvent, GameState, Scene, TickInput, tick};
    use typhoon::{HighScores, Settings};

    /// Edge length of the display canvas (the map scaled up)
    const DISPLAY_SIZE: f64 = (MAP_SIZE * DISPLAY_SCALE) as f64;
    /// Pointer dead zone around the storm center, in display pixels
    const POINTER_DEAD_ZONE: f32 = 16.0;

    /// Pressed state for the four steering directions
    #[derive(Debug, Default, Clone, Copy)]
    struct KeyState {
        left: bool,
        right: bool,
        up: bool,
        down: bool,
    }

    impl KeyState {
        fn steer(&self) -> Vec2 {
            Vec2::new(
                (self.right as i8 - self.left as i8) as f32,
                (self.down as i8 - self.up as i8) as f32,
            )
        }
    }

    /// Game instance holding all state
    struct Game {
        state: GameState,
        frame: Frame,
        settings: Settings,
        highscores: HighScores,
        audio: AudioManager,
        input: TickInput,
        keys: KeyState,
        mouse_press: bool,
        /// Jitter for the spiral overlay; separate from the sim RNG so
        /// rendering never perturbs a replayed run
        overlay_rng: Pcg32,
        display_ctx: CanvasRenderingContext2d,
        map_canvas: HtmlCanvasElement,
        map_ctx: CanvasRenderingContext2d,
        accumulator: f32,
        last_time: f64,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn new(
            seed: u64,
            display_ctx: CanvasRenderingContext2d,
            map_canvas: HtmlCanvasElement,
            map_ctx: CanvasRenderingContext2d,
        ) -> Self {
            let settings = Settings::load();
            let mut audio = AudioManager::new();
            audio.set_master_volume(settings.master_volume);
            audio.set_sfx_volume(settings.sfx_volume);

            Self {
                state: GameState::new(seed),
                frame: Frame::new(),
                settings,
                highscores: HighScores::load(),
                audio,
                input: TickInput::default(),
                keys: KeyState::default(),
                mouse_press: false,
                overlay_rng: Pcg32::seed_from_u64(seed ^ 0x9e37_79b9),
                display_ctx,
                map_canvas,
                map_ctx,
                accumulator: 0.0,
                last_time: 0.0,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32, time: f64) {
            let dt = dt.min(0.25);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = self.input;
                let events = tick(&mut self.state, &input);
                self.handle_events(&events);
                self.accumulator -= SIM_DT;
                substeps += 1;

                // Clear one-shot inputs after processing
                self.input.start = false;
                self.input.pause = false;
            }

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest = self.frame_times[self.frame_index];
            if oldest > 0.0 {
                let elapsed = time - oldest;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }
        }

        fn handle_events(&mut self, events: &[GameEvent]) {
            for event in events {
                match *event {
                    GameEvent::RunStarted => self.audio.play(SoundEffect::Surge),
                    GameEvent::Scream { variant } => {
                        self.audio.play(SoundEffect::scream(variant))
                    }
                    GameEvent::StormDied {
                        casualty,
                        lowest_pressure,
                    } => {
                        self.audio.play(SoundEffect::GameOver);
                        if let Some(rank) = self.highscores.add_score(
                            casualty,
                            lowest_pressure,
                            js_sys::Date::now(),
                        ) {
                            log::info!("run ranked #{rank} ({casualty} casualties)");
                            self.highscores.save();
                        }
                    }
                }
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            if let Err(e) = self.blit_playfield() {
                log::warn!("Render error: {e:?}");
                return;
            }
            self.draw_hud();
        }

        /// Compose the 64x64 frame and scale it onto the display canvas
        fn blit_playfield(&mut self) -> Result<(), JsValue> {
            self.frame.blit_terrain(&self.state.map);

            let show_storm = matches!(self.state.scene, Scene::Playing | Scene::Paused)
                && self.state.storm.is_alive();
            if show_storm {
                let storm = &self.state.storm;
                if self.settings.reduced_motion {
                    // Re-seed per phase: the spiral still rotates but the
                    // per-frame flicker is gone
                    let mut rng = Pcg32::seed_from_u64(storm.phase() as u64);
                    self.frame
                        .draw_storm(storm.pos(), storm.radius_px(), storm.phase(), &mut rng);
                } else {
                    self.frame.draw_storm(
                        storm.pos(),
                        storm.radius_px(),
                        storm.phase(),
                        &mut self.overlay_rng,
                    );
                }
            }

            let data = ImageData::new_with_u8_clamped_array_and_sh(
                Clamped(self.frame.rgba()),
                MAP_SIZE as u32,
                MAP_SIZE as u32,
            )?;
            self.map_ctx.put_image_data(&data, 0.0, 0.0)?;
            self.display_ctx
                .draw_image_with_html_canvas_element_and_dw_and_dh(
                    &self.map_canvas,
                    0.0,
                    0.0,
                    DISPLAY_SIZE,
                    DISPLAY_SIZE,
                )?;
            Ok(())
        }

        fn draw_hud(&self) {
            let ctx = &self.display_ctx;
            ctx.set_font("12px monospace");

            match self.state.scene {
                Scene::Title => {
                    let mut lines = vec![
                        "TYPHOON".to_string(),
                        "YOU ARE THE STORM".to_string(),
                        String::new(),
                        "ARROWS OR DRAG TO STEER".to_string(),
                        "PRESS ANY KEY TO START".to_string(),
                    ];
                    if let Some(best) = self.highscores.entries.first() {
                        lines.push(String::new());
                        lines.push(format!(
                            "BEST RUN: {} - {}",
                            best.casualty,
                            format_date(best.timestamp)
                        ));
                    }
                    self.draw_card(&lines);
                }

                Scene::Playing | Scene::Paused => {
                    let storm = &self.state.storm;
                    ctx.set_text_align("left");
                    self.shadow_text(&format!("PRESSURE: {}mb", storm.pressure_mb()), 8.0, 18.0);
                    self.shadow_text(&format!("MAX WIND: {}mph", storm.wind_mph()), 8.0, 32.0);
                    self.shadow_text(&format!("CASUALTY: {}", storm.casualty()), 8.0, 46.0);

                    if self.state.scene == Scene::Paused {
                        self.draw_card(&["PAUSED".to_string()]);
                    } else if storm.steer() != Vec2::ZERO {
                        self.draw_steer_arrow(storm.steer());
                    }
                }

                Scene::GameOver { .. } => {
                    let storm = &self.state.storm;
                    let mut lines = vec![
                        "GAME OVER".to_string(),
                        String::new(),
                        format!("{} PEOPLE KILLED", storm.casualty()),
                    ];
                    if let Some(best) = self.highscores.top_score() {
                        lines.push(format!("BEST RUN: {best}"));
                    }
                    self.draw_card(&lines);
                }
            }

            if self.settings.show_fps {
                ctx.set_text_align("right");
                self.shadow_text(&format!("{} FPS", self.fps), DISPLAY_SIZE - 8.0, 14.0);
            }
        }

        /// Centered block of text lines
        fn draw_card(&self, lines: &[String]) {
            let ctx = &self.display_ctx;
            ctx.set_text_align("center");
            let line_height = 16.0;
            let top = DISPLAY_SIZE / 2.0 - line_height * (lines.len() as f64 - 1.0) / 2.0;
            for (i, line) in lines.iter().enumerate() {
                if !line.is_empty() {
                    self.shadow_text(line, DISPLAY_SIZE / 2.0, top + line_height * i as f64);
                }
            }
        }

        fn shadow_text(&self, text: &str, x: f64, y: f64) {
            let ctx = &self.display_ctx;
            ctx.set_fill_style_str("rgba(0,0,0,0.8)");
            ctx.fill_text(text, x + 1.0, y + 1.0).ok();
            ctx.set_fill_style_str(if self.settings.high_contrast {
                "yellow"
            } else {
                "white"
            });
            ctx.fill_text(text, x, y).ok();
        }

        /// Corner indicator showing the current steering intent
        fn draw_steer_arrow(&self, v: Vec2) {
            let ctx = &self.display_ctx;
            let d = if v.x == 0.0 || v.y == 0.0 { 10.0 } else { 7.0 };
            ctx.set_fill_style_str("black");
            self.fill_arrow(222.0, 222.0, v, d, d);
            ctx.set_fill_style_str("yellow");
            self.fill_arrow(220.0, 220.0, v, d, d);
        }

        /// Arrow polygon: forward (v.x, v.y), left (+v.y, -v.x), right
        /// (-v.y, +v.x)
        fn fill_arrow(&self, px: f64, py: f64, v: Vec2, d: f64, r: f64) {
            let ctx = &self.display_ctx;
            let (vx, vy) = (v.x as f64, v.y as f64);
            ctx.begin_path();
            ctx.move_to(px - r * (vx + vy), py + r * (vx - vy));
            ctx.line_to(px - r * vy + d * vx, py + r * vx + d * vy);
            ctx.line_to(px - 2.0 * r * vy + d * vx, py + 2.0 * r * vx + d * vy);
            ctx.line_to(px + (d + 2.0 * r) * vx, py + (d + 2.0 * r) * vy);
            ctx.line_to(px + 2.0 * r * vy + d * vx, py - 2.0 * r * vx + d * vy);
            ctx.line_to(px + r * vy + d * vx, py - r * vx + d * vy);
            ctx.line_to(px + r * (vy - vx), py - r * (vy + vx));
            ctx.close_path();
            ctx.fill();
        }

        /// Convert a pointer position (display pixels) to a steering intent:
        /// the per-axis sign of the offset from the storm, with a dead zone.
        fn pointer_steer(&self, x: f32, y: f32) -> Vec2 {
            let v = Vec2::new(x, y) - self.state.storm.pos() * DISPLAY_SCALE as f32;
            let axis = |c: f32| if c.abs() < POINTER_DEAD_ZONE { 0.0 } else { c.signum() };
            Vec2::new(axis(v.x), axis(v.y))
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Typhoon starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");
        canvas.set_width(DISPLAY_SIZE as u32);
        canvas.set_height(DISPLAY_SIZE as u32);

        let display_ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .expect("no 2d context")
            .dyn_into()
            .expect("not a 2d context");
        // Keep the chunky pixels when scaling the playfield up
        display_ctx.set_image_smoothing_enabled(false);

        // Offscreen canvas holding the raw 64x64 frame
        let map_canvas: HtmlCanvasElement = document
            .create_element("canvas")
            .expect("create canvas failed")
            .dyn_into()
            .expect("not a canvas");
        map_canvas.set_width(MAP_SIZE as u32);
        map_canvas.set_height(MAP_SIZE as u32);
        let map_ctx: CanvasRenderingContext2d = map_canvas
            .get_context("2d")
            .ok()
            .flatten()
            .expect("no 2d context")
            .dyn_into()
            .expect("not a 2d context");

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(
            seed,
            display_ctx,
            map_canvas,
            map_ctx,
        )));
        log::info!("Session initialized with seed: {seed}");

        setup_input_handlers(&canvas, game.clone());
        setup_auto_pause(game.clone());

        request_animation_frame(game);

        log::info!("Typhoon running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();

        // Keyboard down - steer, pause, and "any key starts"
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                g.audio.resume();
                match event.key().as_str() {
                    "ArrowLeft" | "a" | "A" => g.keys.left = true,
                    "ArrowRight" | "d" | "D" => g.keys.right = true,
                    "ArrowUp" | "w" | "W" => g.keys.up = true,
                    "ArrowDown" | "s" | "S" => g.keys.down = true,
                    "Escape" => g.input.pause = true,
                    "f" | "F" => {
                        g.settings.show_fps = !g.settings.show_fps;
                        g.settings.save();
                    }
                    _ => {}
                }
                g.input.start = true;
                g.input.steer = g.keys.steer();
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard up
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "ArrowLeft" | "a" | "A" => g.keys.left = false,
                    "ArrowRight" | "d" | "D" => g.keys.right = false,
                    "ArrowUp" | "w" | "W" => g.keys.up = false,
                    "ArrowDown" | "s" | "S" => g.keys.down = false,
                    _ => {}
                }
                g.input.steer = g.keys.steer();
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse down - start/steer toward the pointer
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                g.audio.resume();
                g.input.start = true;
                g.mouse_press = true;
                g.input.steer =
                    g.pointer_steer(event.offset_x() as f32, event.offset_y() as f32);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse move - steer while held
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                if g.mouse_press {
                    g.input.steer =
                        g.pointer_steer(event.offset_x() as f32, event.offset_y() as f32);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse up - release steering back to the keyboard state
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                g.mouse_press = false;
                g.input.steer = g.keys.steer();
            });
            let _ = window
                .add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                g.audio.resume();
                g.input.start = true;
                if let Some(touch) = event.touches().get(0) {
                    let rect = canvas_clone.get_bounding_client_rect();
                    let x = touch.client_x() as f32 - rect.left() as f32;
                    let y = touch.client_y() as f32 - rect.top() as f32;
                    g.input.steer = g.pointer_steer(x, y);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch move
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                if let Some(touch) = event.touches().get(0) {
                    let rect = canvas_clone.get_bounding_client_rect();
                    let x = touch.client_x() as f32 - rect.left() as f32;
                    let y = touch.client_y() as f32 - rect.top() as f32;
                    g.input.steer = g.pointer_steer(x, y);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch end - release steering
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                g.input.steer = g.keys.steer();
            });
            let _ = canvas
                .add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    if g.state.scene == Scene::Playing {
                        g.input.pause = true;
                        log::info!("Auto-paused (tab hidden)");
                    }
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.state.scene == Scene::Playing {
                    g.input.pause = true;
                    log::info!("Auto-paused (window blur)");
                }
                if g.settings.mute_on_blur {
                    g.audio.set_muted(true);
                }
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Window focus - restore audio
        {
            let window_clone = window.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().audio.set_muted(false);
            });
            let _ = window_clone
                .add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt, time);
            g.render();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use typhoon::sim::{GameEvent, GameState, TickInput, tick};

    env_logger::init();
    log::info!("Typhoon (native) starting...");
    log::info!("The interactive game is the wasm build - serve it with `trunk serve`");

    // Headless demo: let the drift field carry a storm across the built-in
    // level and log what happens to it.
    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(1);
    let mut state = GameState::new(seed);

    let start = TickInput {
        start: true,
        ..Default::default()
    };
    tick(&mut state, &start);

    let coast = TickInput::default();
    for step in 0..10_000u32 {
        let events = tick(&mut state, &coast);
        if step % 15 == 0 {
            log::info!(
                "t={:>4} pos=({:5.1},{:5.1}) pressure={}mb wind={}mph casualty={}",
                step,
                state.storm.pos().x,
                state.storm.pos().y,
                state.storm.pressure_mb(),
                state.storm.wind_mph(),
                state.storm.casualty(),
            );
        }
        if events
            .iter()
            .any(|e| matches!(e, GameEvent::StormDied { .. }))
        {
            println!(
                "Storm over after {} ticks: {} casualties, lowest pressure {}mb (seed {})",
                step,
                state.storm.casualty(),
                state.storm.lowest_pressure_mb(),
                seed,
            );
            break;
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

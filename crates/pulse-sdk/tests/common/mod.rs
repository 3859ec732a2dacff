// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Recording collaborators shared by the integration tests.

#![allow(dead_code)]

use pulse_core::platform::window::{CloseCallback, InputCallback, ResizeCallback};
use pulse_core::{
    Clock, DrawEvents, DrawPool, DrawPoolType, GraphicsBackend, HostDriver, ManualTime, Size,
    Subsystem, SubsystemError, UiHost, Window,
};
use pulse_infra::{
    HeadlessDrawPool, HeadlessGraphics, HeadlessUi, HeadlessWindow, HeadlessWindowBuilder,
    LoggingScriptHost,
};
use pulse_sdk::{AppConfig, GraphicalApplication, Services};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};

/// Ordered record of bring-up and teardown calls.
pub type Journal = Arc<Mutex<Vec<String>>>;

fn note(journal: &Journal, entry: String) {
    journal.lock().unwrap().push(entry);
}

pub struct JournalSubsystem {
    name: String,
    journal: Journal,
    pub polls: AtomicUsize,
}

impl JournalSubsystem {
    pub fn new(name: &str, journal: &Journal) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            journal: journal.clone(),
            polls: AtomicUsize::new(0),
        })
    }
}

impl Subsystem for JournalSubsystem {
    fn name(&self) -> &str {
        &self.name
    }
    fn init(&self) -> Result<(), SubsystemError> {
        note(&self.journal, format!("init {}", self.name));
        Ok(())
    }
    fn poll(&self) {
        self.polls.fetch_add(1, Ordering::SeqCst);
    }
    fn terminate(&self) {
        note(&self.journal, format!("terminate {}", self.name));
    }
}

pub struct JournalUi {
    pub inner: HeadlessUi,
    journal: Journal,
    pub panic_on_input: AtomicBool,
}

impl Subsystem for JournalUi {
    fn name(&self) -> &str {
        "ui"
    }
    fn init(&self) -> Result<(), SubsystemError> {
        note(&self.journal, "init ui".into());
        Ok(())
    }
    fn terminate(&self) {
        note(&self.journal, "terminate ui".into());
    }
}

impl UiHost for JournalUi {
    fn resize(&self, size: Size) {
        self.inner.resize(size);
    }
    fn input_event(&self, event: &pulse_core::InputEvent) {
        if self.panic_on_input.load(Ordering::SeqCst) {
            panic!("ui rejected {event:?}");
        }
        self.inner.input_event(event);
    }
}

pub struct JournalGraphics {
    pub inner: HeadlessGraphics,
    journal: Journal,
}

impl Subsystem for JournalGraphics {
    fn name(&self) -> &str {
        "graphics"
    }
    fn init(&self) -> Result<(), SubsystemError> {
        self.inner.init()?;
        note(&self.journal, "init graphics".into());
        Ok(())
    }
    fn terminate(&self) {
        note(&self.journal, "terminate graphics".into());
        self.inner.terminate();
    }
}

impl GraphicsBackend for JournalGraphics {
    fn resize(&self, size: Size) {
        self.inner.resize(size);
    }
    fn viewport_size(&self) -> Size {
        self.inner.viewport_size()
    }
    fn read_pixels(&self) -> Vec<u8> {
        self.inner.read_pixels()
    }
}

pub struct JournalDrawPool {
    pub inner: HeadlessDrawPool,
    journal: Journal,
    pub composite_threads: Mutex<Vec<ThreadId>>,
}

impl DrawPool for JournalDrawPool {
    fn init(&self, sprite_size: u32) -> Result<(), SubsystemError> {
        self.inner.init(sprite_size)?;
        note(&self.journal, "init draw pool".into());
        Ok(())
    }
    fn terminate(&self) {
        note(&self.journal, "terminate draw pool".into());
        self.inner.terminate();
    }
    fn draw(&self) {
        self.composite_threads
            .lock()
            .unwrap()
            .push(thread::current().id());
        self.inner.draw();
    }
    fn set_foreground_framebuffer(&self, size: Size) {
        self.inner.set_foreground_framebuffer(size);
    }
}

pub struct JournalWindow {
    pub inner: Arc<HeadlessWindow>,
    journal: Journal,
    pub swap_threads: Mutex<Vec<ThreadId>>,
}

impl Window for JournalWindow {
    fn init(&self) -> Result<(), SubsystemError> {
        self.inner.init()?;
        note(&self.journal, "init window".into());
        Ok(())
    }
    fn terminate(&self) {
        note(&self.journal, "terminate window".into());
        self.inner.terminate();
    }
    fn show(&self) {
        self.inner.show();
    }
    fn hide(&self) {
        self.inner.hide();
    }
    fn poll(&self) {
        self.inner.poll();
    }
    fn is_visible(&self) -> bool {
        self.inner.is_visible()
    }
    fn swap_buffers(&self) {
        self.swap_threads.lock().unwrap().push(thread::current().id());
        self.inner.swap_buffers();
    }
    fn size(&self) -> Size {
        self.inner.size()
    }
    fn vsync_enabled(&self) -> bool {
        self.inner.vsync_enabled()
    }
    fn display_density(&self) -> f32 {
        self.inner.display_density()
    }
    fn set_display_density(&self, density: f32) {
        self.inner.set_display_density(density);
    }
    fn set_on_resize(&self, callback: ResizeCallback) {
        self.inner.set_on_resize(callback);
    }
    fn set_on_input_event(&self, callback: InputCallback) {
        self.inner.set_on_input_event(callback);
    }
    fn set_on_close(&self, callback: CloseCallback) {
        self.inner.set_on_close(callback);
    }
}

type MapHook = Box<dyn Fn(usize) + Send + Sync>;

/// A render consumer that records every scheduler call.
#[derive(Default)]
pub struct Scene {
    eligible: Mutex<Vec<DrawPoolType>>,
    draws: Mutex<HashMap<DrawPoolType, usize>>,
    pub pre_loads: AtomicUsize,
    map_threads: Mutex<Vec<ThreadId>>,
    on_map: Mutex<Option<MapHook>>,
    pub map_screenshots: Mutex<Vec<String>>,
}

impl Scene {
    pub fn with_eligible(passes: &[DrawPoolType]) -> Arc<Self> {
        let scene = Self::default();
        *scene.eligible.lock().unwrap() = passes.to_vec();
        Arc::new(scene)
    }

    pub fn set_eligible(&self, passes: &[DrawPoolType]) {
        *self.eligible.lock().unwrap() = passes.to_vec();
    }

    /// Called after every MAP draw with the running MAP count.
    pub fn on_map_draw(&self, hook: impl Fn(usize) + Send + Sync + 'static) {
        *self.on_map.lock().unwrap() = Some(Box::new(hook));
    }

    pub fn draws(&self, pass: DrawPoolType) -> usize {
        self.draws.lock().unwrap().get(&pass).copied().unwrap_or(0)
    }

    pub fn map_threads(&self) -> Vec<ThreadId> {
        self.map_threads.lock().unwrap().clone()
    }
}

impl DrawEvents for Scene {
    fn can_draw(&self, pass: DrawPoolType) -> bool {
        self.eligible.lock().unwrap().contains(&pass)
    }

    fn pre_load(&self) {
        self.pre_loads.fetch_add(1, Ordering::SeqCst);
    }

    fn draw(&self, pass: DrawPoolType) {
        let count = {
            let mut draws = self.draws.lock().unwrap();
            let count = draws.entry(pass).or_insert(0);
            *count += 1;
            *count
        };
        if pass == DrawPoolType::Map {
            self.map_threads.lock().unwrap().push(thread::current().id());
            if let Some(hook) = self.on_map.lock().unwrap().as_ref() {
                hook(count);
            }
        }
    }

    fn do_map_screenshot(&self, file: &str) {
        self.map_screenshots.lock().unwrap().push(file.to_string());
    }
}

/// An application wired to recording collaborators.
pub struct Harness {
    pub app: GraphicalApplication,
    pub window: Arc<HeadlessWindow>,
    pub journal_window: Arc<JournalWindow>,
    pub scene: Arc<Scene>,
    pub script: Arc<LoggingScriptHost>,
    pub ui: Arc<JournalUi>,
    pub graphics: Arc<JournalGraphics>,
    pub draw_pool: Arc<JournalDrawPool>,
    pub overlays: Arc<JournalSubsystem>,
    pub audio: Arc<JournalSubsystem>,
    pub journal: Journal,
    pub time: Arc<ManualTime>,
}

impl Harness {
    pub fn new(config: AppConfig) -> Self {
        Self::with_window(config, HeadlessWindowBuilder::new().with_dimensions(320, 240))
    }

    pub fn with_window(config: AppConfig, window: HeadlessWindowBuilder) -> Self {
        Self::build(config, window, None)
    }

    pub fn with_host(config: AppConfig, host: Arc<dyn HostDriver>) -> Self {
        Self::build(
            config,
            HeadlessWindowBuilder::new().with_dimensions(320, 240),
            Some(host),
        )
    }

    fn build(
        config: AppConfig,
        window: HeadlessWindowBuilder,
        host: Option<Arc<dyn HostDriver>>,
    ) -> Self {
        let journal: Journal = Arc::default();
        let window = Arc::new(window.build());
        let journal_window = Arc::new(JournalWindow {
            inner: window.clone(),
            journal: journal.clone(),
            swap_threads: Mutex::default(),
        });
        let scene = Scene::with_eligible(&DrawPoolType::ALL);
        let script = Arc::new(LoggingScriptHost::new());
        let ui = Arc::new(JournalUi {
            inner: HeadlessUi::new(),
            journal: journal.clone(),
            panic_on_input: AtomicBool::new(false),
        });
        let graphics = Arc::new(JournalGraphics {
            inner: HeadlessGraphics::new(window.size()),
            journal: journal.clone(),
        });
        let draw_pool = Arc::new(JournalDrawPool {
            inner: HeadlessDrawPool::new(),
            journal: journal.clone(),
            composite_threads: Mutex::default(),
        });
        let overlays = JournalSubsystem::new("overlays", &journal);
        let audio = JournalSubsystem::new("audio", &journal);
        let time = Arc::new(ManualTime::new());

        let mut services = Services::builder(scene.clone())
            .with_window(journal_window.clone())
            .with_input(JournalSubsystem::new("input", &journal))
            .with_ui(ui.clone())
            .with_graphics(graphics.clone())
            .with_draw_pool(draw_pool.clone())
            .with_audio(audio.clone())
            .with_particles(JournalSubsystem::new("particles", &journal))
            .with_overlays(overlays.clone())
            .with_textures(JournalSubsystem::new("textures", &journal))
            .with_script(script.clone())
            .with_clock(Arc::new(Clock::with_source(time.clone())));
        if let Some(host) = host {
            services = services.with_host(host);
        }

        Self {
            app: GraphicalApplication::new(config, services.build()),
            window,
            journal_window,
            scene,
            script,
            ui,
            graphics,
            draw_pool,
            overlays,
            audio,
            journal,
            time,
        }
    }

    pub fn journal(&self) -> Vec<String> {
        self.journal.lock().unwrap().clone()
    }
}

/// Config for the externally driven strategy, with a small pool.
pub fn single_thread_config() -> AppConfig {
    AppConfig {
        strategy: Some(pulse_sdk::StrategyKind::CooperativeSingleThread),
        worker_threads: 2,
        ..AppConfig::default()
    }
}

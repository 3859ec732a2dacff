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

//! The graphical application: lifecycle, frame loop and user-facing settings.

use crate::config::AppConfig;
use crate::error::LifecycleError;
use crate::lifecycle::{ApplicationState, LifecycleFlags};
use crate::screenshot::{save_screenshot, DEFAULT_SCREENSHOT_FILE};
use crate::services::Services;
use pulse_control::{
    build_strategy, DrawPassCoordinator, ExecutionStrategy, FrameLoop, FrameOutcome,
    InlineExecutor, PassExecutor, RunOutcome, StepOutcome, StrategyKind, TaskPool,
};
use pulse_core::{
    AppCommand, DispatcherHandle, InputEvent, MainDispatcher, ScriptValue, Size, Subsystem,
};
use pulse_telemetry::{FpsPolicy, FrameTelemetry};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

const SCRIPT_GLOBAL: &str = "g_app";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn bring_up<S: Subsystem + ?Sized>(subsystem: &S) -> Result<(), LifecycleError> {
    log::debug!("Bringing up '{}'.", subsystem.name());
    subsystem.init()?;
    Ok(())
}

/// The client runtime.
///
/// Cloning yields another handle to the same application, so platform threads
/// and tests can request a stop while the loop runs.
#[derive(Clone)]
pub struct GraphicalApplication {
    core: Arc<AppCore>,
}

struct AppCore {
    config: AppConfig,
    services: Services,
    flags: LifecycleFlags,
    dispatcher: MainDispatcher,
    telemetry: Mutex<FrameTelemetry>,
    pool: Mutex<Option<Arc<TaskPool>>>,
    coordinator: Mutex<Option<Arc<DrawPassCoordinator>>>,
    strategy: Mutex<Option<Arc<dyn ExecutionStrategy>>>,
    audio_active: AtomicBool,
    loading_async_texture: AtomicBool,
    max_fps: AtomicU32,
    target_fps: AtomicU32,
    was_visible: AtomicBool,
}

impl GraphicalApplication {
    /// Creates an application over `services`. Nothing is brought up yet.
    pub fn new(config: AppConfig, services: Services) -> Self {
        let telemetry = FrameTelemetry::new(config.measurement_window());
        let core = AppCore {
            max_fps: AtomicU32::new(config.max_fps),
            target_fps: AtomicU32::new(config.target_fps),
            config,
            services,
            flags: LifecycleFlags::new(),
            dispatcher: MainDispatcher::new(),
            telemetry: Mutex::new(telemetry),
            pool: Mutex::new(None),
            coordinator: Mutex::new(None),
            strategy: Mutex::new(None),
            audio_active: AtomicBool::new(false),
            loading_async_texture: AtomicBool::new(false),
            was_visible: AtomicBool::new(false),
        };
        Self {
            core: Arc::new(core),
        }
    }

    /// Brings every subsystem up and binds the window callbacks.
    ///
    /// Order: texture, particle and overlay managers, then window, input, UI,
    /// graphics backend, draw pool, and audio when configured. Any failure is
    /// fatal and returned as [`LifecycleError::Init`].
    pub fn init(&self) -> Result<(), LifecycleError> {
        let core = &self.core;
        core.flags
            .transition(ApplicationState::Uninitialized, ApplicationState::Initializing)
            .map_err(|state| LifecycleError::InvalidState {
                operation: "init",
                state,
            })?;
        core.config.validate()?;

        log::info!("Initializing '{}'...", core.config.name);
        let services = &core.services;

        bring_up(&*services.textures)?;
        bring_up(&*services.particles)?;
        bring_up(&*services.overlays)?;

        services.window.init()?;
        services.window.hide();
        self.bind_window_callbacks();

        bring_up(&*services.input)?;
        bring_up(&*services.ui)?;
        bring_up(&*services.graphics)?;
        services.draw_pool.init(core.config.sprite_size)?;

        core.resize(services.window.size());

        if core.config.audio {
            match &services.audio {
                Some(audio) => {
                    bring_up(&**audio)?;
                    core.audio_active.store(true, Ordering::SeqCst);
                }
                None => log::warn!("Audio requested but no audio subsystem was provided."),
            }
        }

        let pool = TaskPool::new(core.config.resolved_worker_threads())?;
        *lock(&core.pool) = Some(Arc::new(pool));

        let now = services.clock.update();
        lock(&core.telemetry).init(now);

        log::info!("'{}' initialized.", core.config.name);
        Ok(())
    }

    /// Platform callbacks arriving before the loop runs execute in place;
    /// afterwards they are queued on the Main Dispatcher. Close is always
    /// queued.
    fn bind_window_callbacks(&self) {
        let window = &self.core.services.window;

        let weak = Arc::downgrade(&self.core);
        let handle = self.core.dispatcher.handle();
        window.set_on_resize(Box::new(move |size: Size| {
            let Some(core) = weak.upgrade() else { return };
            if core.flags.is_running() {
                handle.add_command(AppCommand::Resize(size));
            } else {
                core.resize(size);
            }
        }));

        let weak = Arc::downgrade(&self.core);
        let handle = self.core.dispatcher.handle();
        window.set_on_input_event(Box::new(move |event: InputEvent| {
            let Some(core) = weak.upgrade() else { return };
            if core.flags.is_running() {
                handle.add_command(AppCommand::Input(event));
            } else {
                core.input_event(&event);
            }
        }));

        let handle = self.core.dispatcher.handle();
        window.set_on_close(Box::new(move || handle.add_command(AppCommand::Close)));
    }

    /// Runs two warm-up polls, shows the window, notifies `onRun` and starts
    /// the frame loop.
    ///
    /// With the multi-thread strategy this blocks until the loop has stopped
    /// and the secondary thread has joined. The cooperative strategies return
    /// [`RunOutcome::HandedToHost`] once the loop is registered.
    pub fn run(&self) -> Result<RunOutcome, LifecycleError> {
        let core = &self.core;
        let state = core.flags.state();
        if state != ApplicationState::Initializing || lock(&core.strategy).is_some() {
            return Err(LifecycleError::InvalidState {
                operation: "run",
                state,
            });
        }

        core.main_poll();
        core.poll();
        log::info!("First warm-up poll done.");

        core.services.window.show();

        core.main_poll();
        core.poll();
        log::info!("Second warm-up poll done.");

        core.services
            .script
            .call_global_field(SCRIPT_GLOBAL, "onRun", &[]);

        let kind = core.config.strategy_kind();
        let strategy: Arc<dyn ExecutionStrategy> =
            Arc::from(build_strategy(kind, core.services.host.clone())?);
        *lock(&core.coordinator) = Some(Arc::new(core.build_coordinator(kind)));
        *lock(&core.strategy) = Some(Arc::clone(&strategy));

        log::info!("Starting the frame loop with the {} strategy.", kind);
        core.flags.start_running();

        let frame_loop: Arc<dyn FrameLoop> = self.core.clone();
        strategy.run(frame_loop).map_err(|err| {
            core.finish();
            LifecycleError::from(err)
        })
    }

    /// Runs one iteration for an externally driven loop.
    ///
    /// Returns [`StepOutcome::Stopped`] once `stopping` is observed; the run is
    /// then finalised and further calls keep returning `Stopped`.
    pub fn main_loop(&self) -> StepOutcome {
        let core = &self.core;
        let Some(strategy) = lock(&core.strategy).clone() else {
            log::warn!("main_loop() called before run().");
            return StepOutcome::Stopped;
        };
        if !core.flags.is_running() {
            return StepOutcome::Stopped;
        }

        let outcome = strategy.step(&**core);
        if outcome == StepOutcome::Stopped {
            core.finish();
        }
        outcome
    }

    /// Asks the scripting host whether to close; unless `g_app.onClose`
    /// answers `true`, requests a stop.
    pub fn close(&self) {
        self.core.close();
    }

    /// Requests a cooperative stop. The current frame finishes first.
    pub fn exit(&self) {
        self.core.exit();
    }

    /// Hides the window and shuts the Main Dispatcher down.
    pub fn deinit(&self) {
        self.core.services.window.hide();
        self.core.dispatcher.shutdown();
        log::info!("Application deinitialized.");
    }

    /// Tears down everything `init` brought up, in reverse dependency order.
    ///
    /// Fails with [`LifecycleError::StillRunning`] while the loop runs. A
    /// second call logs a warning and does nothing.
    pub fn terminate(&self) -> Result<(), LifecycleError> {
        let core = &self.core;
        if core.flags.is_running() {
            return Err(LifecycleError::StillRunning);
        }
        if core.flags.is_terminated() {
            log::warn!("terminate() called on a terminated application; ignoring.");
            return Ok(());
        }
        let state = core.flags.state();
        if state == ApplicationState::Uninitialized {
            return Err(LifecycleError::InvalidState {
                operation: "terminate",
                state,
            });
        }

        let services = &core.services;
        services.particles.terminate();
        services.ui.terminate();
        services.overlays.terminate();
        services.textures.terminate();
        if core.audio_active.swap(false, Ordering::SeqCst) {
            if let Some(audio) = &services.audio {
                audio.terminate();
            }
        }
        services.input.terminate();
        services.draw_pool.terminate();
        services.graphics.terminate();
        services.window.terminate();

        lock(&core.strategy).take();
        lock(&core.coordinator).take();
        // Joins the workers once queued screenshot jobs are done.
        lock(&core.pool).take();

        core.flags.mark_terminated();
        log::info!("'{}' terminated.", core.config.name);
        Ok(())
    }

    /// Applies a new physical surface size.
    pub fn resize(&self, size: Size) {
        self.core.resize(size);
    }

    /// Delivers an input event to the UI.
    pub fn input_event(&self, event: &InputEvent) {
        self.core.input_event(event);
    }

    /// Captures the viewport to `file` on the owning thread's next drain.
    /// An empty name becomes `screenshot.png`.
    pub fn do_screenshot(&self, file: &str) {
        let file = if file.is_empty() {
            DEFAULT_SCREENSHOT_FILE
        } else {
            file
        };
        self.core
            .dispatcher
            .add_command(AppCommand::Screenshot(PathBuf::from(file)));
    }

    /// Asks the render consumer for a map screenshot.
    pub fn do_map_screenshot(&self, file: &str) {
        self.core.services.draw_events.do_map_screenshot(file);
    }

    /// The HUD scale, i.e. the window display density.
    pub fn hud_scale(&self) -> f32 {
        self.core.services.window.display_density()
    }

    /// Sets the HUD scale and re-lays out at the current viewport size.
    pub fn set_hud_scale(&self, scale: f32) {
        self.core.services.window.set_display_density(scale);
        self.core.resize(self.core.services.graphics.viewport_size());
    }

    /// Whether the HUD is scaled.
    pub fn is_scaled(&self) -> bool {
        self.hud_scale() != 1.0
    }

    /// Stores the async-texture-loading preference.
    ///
    /// Forced on when the render consumer uses protobuf assets, forced off
    /// when content is encrypted. The render consumer is notified of the
    /// stored value.
    pub fn set_loading_async_texture(&self, enabled: bool) {
        let core = &self.core;
        let enabled = if core.services.draw_events.is_using_protobuf() {
            true
        } else if core.config.encrypted {
            false
        } else {
            enabled
        };
        core.loading_async_texture.store(enabled, Ordering::SeqCst);
        core.services
            .draw_events
            .on_loading_async_texture_changed(enabled);
    }

    /// Whether textures load asynchronously.
    pub fn is_loading_async_texture(&self) -> bool {
        self.core.loading_async_texture.load(Ordering::SeqCst)
            || self.core.services.draw_events.is_loading_async_texture()
    }

    /// Sets the user max-FPS setting.
    pub fn set_max_fps(&self, fps: u32) {
        self.core.max_fps.store(fps, Ordering::SeqCst);
    }

    /// The user max-FPS setting.
    pub fn max_fps(&self) -> u32 {
        self.core.max_fps.load(Ordering::SeqCst)
    }

    /// Sets the user target-FPS setting.
    pub fn set_target_fps(&self, fps: u32) {
        self.core.target_fps.store(fps, Ordering::SeqCst);
    }

    /// The user target-FPS setting.
    pub fn target_fps(&self) -> u32 {
        self.core.target_fps.load(Ordering::SeqCst)
    }

    /// Measured presentation rate.
    pub fn fps(&self) -> u32 {
        lock(&self.core.telemetry).graphics().fps()
    }

    /// Measured map-processing rate.
    pub fn map_fps(&self) -> u32 {
        lock(&self.core.telemetry).map_fps()
    }

    /// Target of the map-processing counter.
    pub fn map_target_fps(&self) -> u32 {
        lock(&self.core.telemetry).map_counter().lock().target_fps()
    }

    /// Owning-thread poll: clock, Main Dispatcher, window, textures.
    pub fn main_poll(&self) {
        self.core.main_poll();
    }

    /// Event-side poll: particles, audio, and overlays while hidden.
    pub fn poll(&self) {
        self.core.poll();
    }

    /// The lifecycle state.
    pub fn state(&self) -> ApplicationState {
        self.core.flags.state()
    }

    /// Whether the frame loop is running.
    pub fn is_running(&self) -> bool {
        self.core.flags.is_running()
    }

    /// Whether a stop is pending.
    pub fn is_stopping(&self) -> bool {
        self.core.flags.is_stopping()
    }

    /// Whether teardown completed.
    pub fn is_terminated(&self) -> bool {
        self.core.flags.is_terminated()
    }

    /// Whether UI input is being delivered right now.
    pub fn is_on_input_event(&self) -> bool {
        self.core.flags.is_on_input_event()
    }

    /// The strategy chosen by `run`, if it ran.
    pub fn strategy_kind(&self) -> Option<StrategyKind> {
        lock(&self.core.strategy).as_ref().map(|s| s.kind())
    }

    /// The configuration.
    pub fn config(&self) -> &AppConfig {
        &self.core.config
    }

    /// The collaborators.
    pub fn services(&self) -> &Services {
        &self.core.services
    }

    /// The Main Dispatcher.
    pub fn dispatcher(&self) -> &MainDispatcher {
        &self.core.dispatcher
    }

    /// A sender for the Main Dispatcher usable from any thread.
    pub fn dispatcher_handle(&self) -> DispatcherHandle {
        self.core.dispatcher.handle()
    }
}

impl std::fmt::Debug for GraphicalApplication {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphicalApplication")
            .field("name", &self.core.config.name)
            .field("state", &self.core.flags.state())
            .finish_non_exhaustive()
    }
}

impl AppCore {
    fn build_coordinator(&self, kind: StrategyKind) -> DrawPassCoordinator {
        let pool = lock(&self.pool).clone();
        let executor: Arc<dyn PassExecutor> = match pool {
            Some(pool) if kind.parallel_passes() => pool as Arc<dyn PassExecutor>,
            _ => Arc::new(InlineExecutor) as Arc<dyn PassExecutor>,
        };
        let map_counter = lock(&self.telemetry).map_counter();
        DrawPassCoordinator::new(
            Arc::clone(&self.services.draw_events),
            executor,
            map_counter,
            Arc::clone(&self.services.clock),
        )
    }

    fn fps_policy(&self) -> FpsPolicy {
        FpsPolicy {
            vsync: self.config.vsync || self.services.window.vsync_enabled(),
            max_fps: self.max_fps.load(Ordering::SeqCst),
            target_fps: self.target_fps.load(Ordering::SeqCst),
            ceiling: self.config.fps_ceiling,
        }
    }

    fn handle_command(&self, command: AppCommand) {
        match command {
            AppCommand::Resize(size) => self.resize(size),
            AppCommand::Input(event) => self.input_event(&event),
            AppCommand::Close => self.close(),
            AppCommand::FpsReport(fps) => {
                self.services.script.call_global_field(
                    SCRIPT_GLOBAL,
                    "onFps",
                    &[ScriptValue::Integer(i64::from(fps))],
                );
            }
            AppCommand::UpdateForegroundFramebuffer(size) => {
                self.services.draw_pool.set_foreground_framebuffer(size);
            }
            AppCommand::Screenshot(path) => self.capture_screenshot(path),
        }
    }

    fn resize(&self, size: Size) {
        let scale = self.services.window.display_density();
        self.services.graphics.resize(size);

        let scaled = size.scaled_down(scale);
        self.flags.with_input_guard(|| self.services.ui.resize(scaled));

        self.dispatcher
            .add_command(AppCommand::UpdateForegroundFramebuffer(scaled));
    }

    fn input_event(&self, event: &InputEvent) {
        self.flags
            .with_input_guard(|| self.services.ui.input_event(event));
    }

    fn close(&self) {
        self.flags.with_input_guard(|| {
            let veto = self
                .services
                .script
                .call_global_field(SCRIPT_GLOBAL, "onClose", &[]);
            if veto.is_true() {
                log::info!("Close vetoed by the script host.");
            } else {
                self.exit();
            }
        });
    }

    fn exit(&self) {
        if self.flags.request_stop() {
            log::info!("Exiting application...");
        }
    }

    fn capture_screenshot(&self, path: PathBuf) {
        let size = self.services.graphics.viewport_size();
        let pixels = self.services.graphics.read_pixels();

        let Some(pool) = lock(&self.pool).clone() else {
            log::warn!("Screenshot requested without a task pool; skipped.");
            return;
        };
        pool.detach(move || {
            if let Err(err) = save_screenshot(&path, size, pixels) {
                log::error!("Can't do screenshot: {}", err);
            }
        });
    }
}

impl FrameLoop for AppCore {
    fn is_stopping(&self) -> bool {
        self.flags.is_stopping()
    }

    fn is_visible(&self) -> bool {
        let visible = self.services.window.is_visible();
        if self.was_visible.swap(visible, Ordering::SeqCst) != visible {
            log::info!(
                "Window visibility changed: {}.",
                if visible { "visible" } else { "hidden" }
            );
        }
        visible
    }

    fn main_poll(&self) {
        self.services.clock.update();
        self.dispatcher
            .poll(&mut |command: AppCommand| self.handle_command(command));
        self.services.window.poll();
        self.services.textures.poll();
    }

    fn poll(&self) {
        self.services.particles.poll();
        if self.audio_active.load(Ordering::SeqCst) {
            if let Some(audio) = &self.services.audio {
                audio.poll();
            }
        }
        if !self.services.window.is_visible() {
            self.services.overlays.poll();
        }
    }

    fn draw_passes(&self) -> FrameOutcome {
        match lock(&self.coordinator).clone() {
            Some(coordinator) => coordinator.step(),
            None => FrameOutcome::Idle,
        }
    }

    fn present(&self) {
        self.services.draw_pool.draw();
        self.services.window.swap_buffers();

        let policy = self.fps_policy();
        let now = self.services.clock.elapsed();
        let report = lock(&self.telemetry).graphics_frame(now, &policy);
        if let Some(fps) = report {
            self.dispatcher.add_command(AppCommand::FpsReport(fps));
        }
    }

    fn finish(&self) {
        if self.flags.finish_run() {
            log::info!("Frame loop finished.");
        }
    }

    fn throttle_interval(&self) -> Duration {
        self.config.throttle_interval()
    }
}

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

//! The composition root: every collaborator the application drives.

use pulse_core::{
    Clock, DrawEvents, DrawPool, GraphicsBackend, HostDriver, ScriptHost, Subsystem, UiHost,
    Window,
};
use pulse_infra::{
    HeadlessDrawPool, HeadlessGraphics, HeadlessUi, HeadlessWindowBuilder, LoggingScriptHost,
    NullSubsystem,
};
use std::sync::Arc;

/// The collaborators of a [`GraphicalApplication`](crate::GraphicalApplication).
///
/// Built once and handed to the application; nothing is reached through
/// process-wide globals.
pub struct Services {
    /// Platform window.
    pub window: Arc<dyn Window>,
    /// Mouse/keyboard state.
    pub input: Arc<dyn Subsystem>,
    /// UI root.
    pub ui: Arc<dyn UiHost>,
    /// Graphics context owner.
    pub graphics: Arc<dyn GraphicsBackend>,
    /// Frame compositor.
    pub draw_pool: Arc<dyn DrawPool>,
    /// Sound, brought up only when configured.
    pub audio: Option<Arc<dyn Subsystem>>,
    /// Particle effects.
    pub particles: Arc<dyn Subsystem>,
    /// Text and HTML overlays, polled only while the window is hidden.
    pub overlays: Arc<dyn Subsystem>,
    /// Texture manager.
    pub textures: Arc<dyn Subsystem>,
    /// The render consumer.
    pub draw_events: Arc<dyn DrawEvents>,
    /// Scripting host.
    pub script: Arc<dyn ScriptHost>,
    /// Host scheduler, needed by the cooperative-yield strategy.
    pub host: Option<Arc<dyn HostDriver>>,
    /// Time source for frame pacing.
    pub clock: Arc<Clock>,
}

impl Services {
    /// Starts a builder with headless defaults around `draw_events`.
    pub fn builder(draw_events: Arc<dyn DrawEvents>) -> ServicesBuilder {
        ServicesBuilder::new(draw_events)
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("window_size", &self.window.size())
            .field("audio", &self.audio.is_some())
            .field("host", &self.host.is_some())
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

/// Builds [`Services`], defaulting every collaborator to its headless
/// implementation.
pub struct ServicesBuilder {
    services: Services,
}

impl ServicesBuilder {
    fn new(draw_events: Arc<dyn DrawEvents>) -> Self {
        let window = HeadlessWindowBuilder::new().build();
        let graphics = HeadlessGraphics::new(window.size());
        Self {
            services: Services {
                window: Arc::new(window),
                input: Arc::new(NullSubsystem::new("input")),
                ui: Arc::new(HeadlessUi::new()),
                graphics: Arc::new(graphics),
                draw_pool: Arc::new(HeadlessDrawPool::new()),
                audio: None,
                particles: Arc::new(NullSubsystem::new("particles")),
                overlays: Arc::new(NullSubsystem::new("overlays")),
                textures: Arc::new(NullSubsystem::new("textures")),
                draw_events,
                script: Arc::new(LoggingScriptHost::new()),
                host: None,
                clock: Arc::new(Clock::new()),
            },
        }
    }

    /// Uses `window`.
    pub fn with_window(mut self, window: Arc<dyn Window>) -> Self {
        self.services.window = window;
        self
    }

    /// Uses `input`.
    pub fn with_input(mut self, input: Arc<dyn Subsystem>) -> Self {
        self.services.input = input;
        self
    }

    /// Uses `ui`.
    pub fn with_ui(mut self, ui: Arc<dyn UiHost>) -> Self {
        self.services.ui = ui;
        self
    }

    /// Uses `graphics`.
    pub fn with_graphics(mut self, graphics: Arc<dyn GraphicsBackend>) -> Self {
        self.services.graphics = graphics;
        self
    }

    /// Uses `draw_pool`.
    pub fn with_draw_pool(mut self, draw_pool: Arc<dyn DrawPool>) -> Self {
        self.services.draw_pool = draw_pool;
        self
    }

    /// Provides an audio subsystem.
    pub fn with_audio(mut self, audio: Arc<dyn Subsystem>) -> Self {
        self.services.audio = Some(audio);
        self
    }

    /// Uses `particles`.
    pub fn with_particles(mut self, particles: Arc<dyn Subsystem>) -> Self {
        self.services.particles = particles;
        self
    }

    /// Uses `overlays`.
    pub fn with_overlays(mut self, overlays: Arc<dyn Subsystem>) -> Self {
        self.services.overlays = overlays;
        self
    }

    /// Uses `textures`.
    pub fn with_textures(mut self, textures: Arc<dyn Subsystem>) -> Self {
        self.services.textures = textures;
        self
    }

    /// Uses `script`.
    pub fn with_script(mut self, script: Arc<dyn ScriptHost>) -> Self {
        self.services.script = script;
        self
    }

    /// Provides a host scheduler.
    pub fn with_host(mut self, host: Arc<dyn HostDriver>) -> Self {
        self.services.host = Some(host);
        self
    }

    /// Uses `clock`.
    pub fn with_clock(mut self, clock: Arc<Clock>) -> Self {
        self.services.clock = clock;
        self
    }

    /// Finishes the composition root.
    pub fn build(self) -> Services {
        self.services
    }
}

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

//! Headless Pulse runtime.
//!
//! Usage: `pulse-runtime [config.json]`. The config path may also come from
//! `PULSE_CONFIG`; `PULSE_FRAMES` bounds the demo run (default 300 frames).

mod scene;

use anyhow::{Context, Result};
use env_logger::{Builder, Env};
use pulse_core::Window;
use pulse_infra::{HeadlessGraphics, HeadlessWindowBuilder, ManualHostDriver};
use pulse_sdk::{AppConfig, GraphicalApplication, RunOutcome, Services, StepOutcome};
use scene::DemoScene;
use std::sync::Arc;

const DEFAULT_FRAME_LIMIT: u64 = 300;

fn load_config() -> Result<AppConfig> {
    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("PULSE_CONFIG").ok());
    match path {
        Some(path) => AppConfig::load(&path).with_context(|| format!("loading {}", path)),
        None => {
            log::info!("No config given; using defaults.");
            Ok(AppConfig::default())
        }
    }
}

fn frame_limit() -> Result<u64> {
    match std::env::var("PULSE_FRAMES") {
        Ok(value) => value
            .parse()
            .with_context(|| format!("PULSE_FRAMES is not a frame count: {}", value)),
        Err(_) => Ok(DEFAULT_FRAME_LIMIT),
    }
}

fn main() -> Result<()> {
    Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = load_config()?;
    let window = Arc::new(
        HeadlessWindowBuilder::new()
            .with_title(config.name.clone())
            .with_vsync(config.vsync)
            .build(),
    );
    let graphics = Arc::new(HeadlessGraphics::new(window.size()));
    let scene = Arc::new(DemoScene::new(
        graphics.clone(),
        window.clone(),
        frame_limit()?,
    ));
    let host = Arc::new(ManualHostDriver::new());

    let services = Services::builder(scene.clone())
        .with_window(window)
        .with_graphics(graphics)
        .with_host(host.clone())
        .build();
    let app = GraphicalApplication::new(config, services);

    if let Err(err) = app.init() {
        log::error!("{}", err);
        std::process::exit(1);
    }

    match app.run()? {
        RunOutcome::Finished => {}
        RunOutcome::HandedToHost if host.is_registered() => {
            let slots = host.run_until_released(usize::MAX);
            log::info!("Host fired {} scheduling slots.", slots);
        }
        RunOutcome::HandedToHost => while app.main_loop() != StepOutcome::Stopped {},
    }

    log::info!(
        "Run complete: {} map frames, {} foreground frames, {} fps.",
        scene.map_frames(),
        scene.foreground_frames(),
        app.fps()
    );

    app.deinit();
    app.terminate()?;
    Ok(())
}

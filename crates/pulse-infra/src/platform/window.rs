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

//! A window with no native surface, driven by injected platform events.

use pulse_core::platform::window::{CloseCallback, InputCallback, ResizeCallback};
use pulse_core::{InputEvent, Size, SubsystemError, Window};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
enum PlatformEvent {
    Resize(Size),
    Input(InputEvent),
    Close,
}

#[derive(Default)]
struct Callbacks {
    on_resize: Option<ResizeCallback>,
    on_input: Option<InputCallback>,
    on_close: Option<CloseCallback>,
}

/// A headless implementation of [`Window`].
///
/// Platform events queued with [`push_resize`](Self::push_resize),
/// [`push_input`](Self::push_input) and [`request_close`](Self::request_close)
/// are delivered to the registered callbacks on the next [`Window::poll`],
/// the same way a native event pump would deliver them.
pub struct HeadlessWindow {
    title: String,
    size: Mutex<Size>,
    density: Mutex<f32>,
    vsync: bool,
    visible: AtomicBool,
    created: AtomicBool,
    fail_init: bool,
    pending: Mutex<VecDeque<PlatformEvent>>,
    callbacks: Mutex<Callbacks>,
    polls: AtomicU64,
    swaps: AtomicU64,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl HeadlessWindow {
    /// The window title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Queues a platform resize; the surface takes the new size on delivery.
    pub fn push_resize(&self, size: Size) {
        lock(&self.pending).push_back(PlatformEvent::Resize(size));
    }

    /// Queues an input event.
    pub fn push_input(&self, event: InputEvent) {
        lock(&self.pending).push_back(PlatformEvent::Input(event));
    }

    /// Queues a close request, as if the user clicked the close button.
    pub fn request_close(&self) {
        lock(&self.pending).push_back(PlatformEvent::Close);
    }

    /// Minimises or restores the window immediately.
    pub fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::SeqCst);
    }

    /// Number of `poll` calls so far.
    pub fn poll_count(&self) -> u64 {
        self.polls.load(Ordering::SeqCst)
    }

    /// Number of presented frames so far.
    pub fn swap_count(&self) -> u64 {
        self.swaps.load(Ordering::SeqCst)
    }

    /// Whether the surface currently exists.
    pub fn is_created(&self) -> bool {
        self.created.load(Ordering::SeqCst)
    }

    fn deliver(&self, event: PlatformEvent) {
        let callbacks = lock(&self.callbacks);
        match event {
            PlatformEvent::Resize(size) => {
                *lock(&self.size) = size;
                if let Some(on_resize) = &callbacks.on_resize {
                    on_resize(size);
                }
            }
            PlatformEvent::Input(event) => {
                if let Some(on_input) = &callbacks.on_input {
                    on_input(event);
                }
            }
            PlatformEvent::Close => {
                if let Some(on_close) = &callbacks.on_close {
                    on_close();
                }
            }
        }
    }
}

impl Window for HeadlessWindow {
    fn init(&self) -> Result<(), SubsystemError> {
        if self.fail_init {
            return Err(SubsystemError::init_failed("window", "no display available"));
        }
        self.created.store(true, Ordering::SeqCst);
        log::info!(
            "Headless window '{}' created ({}).",
            self.title,
            self.size()
        );
        Ok(())
    }

    fn terminate(&self) {
        self.created.store(false, Ordering::SeqCst);
        self.visible.store(false, Ordering::SeqCst);
        log::debug!("Headless window '{}' destroyed.", self.title);
    }

    fn show(&self) {
        self.visible.store(true, Ordering::SeqCst);
    }

    fn hide(&self) {
        self.visible.store(false, Ordering::SeqCst);
    }

    fn poll(&self) {
        self.polls.fetch_add(1, Ordering::SeqCst);
        // Take the queue first so callbacks may queue further events.
        let events: Vec<PlatformEvent> = lock(&self.pending).drain(..).collect();
        for event in events {
            self.deliver(event);
        }
    }

    fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    fn swap_buffers(&self) {
        self.swaps.fetch_add(1, Ordering::SeqCst);
    }

    fn size(&self) -> Size {
        *lock(&self.size)
    }

    fn vsync_enabled(&self) -> bool {
        self.vsync
    }

    fn display_density(&self) -> f32 {
        *lock(&self.density)
    }

    fn set_display_density(&self, density: f32) {
        *lock(&self.density) = density;
    }

    fn set_on_resize(&self, callback: ResizeCallback) {
        lock(&self.callbacks).on_resize = Some(callback);
    }

    fn set_on_input_event(&self, callback: InputCallback) {
        lock(&self.callbacks).on_input = Some(callback);
    }

    fn set_on_close(&self, callback: CloseCallback) {
        lock(&self.callbacks).on_close = Some(callback);
    }
}

impl std::fmt::Debug for HeadlessWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadlessWindow")
            .field("title", &self.title)
            .field("size", &self.size())
            .field("visible", &self.is_visible())
            .finish_non_exhaustive()
    }
}

/// A builder for [`HeadlessWindow`].
#[derive(Debug, Clone)]
pub struct HeadlessWindowBuilder {
    title: String,
    width: u32,
    height: u32,
    density: f32,
    vsync: bool,
    fail_init: bool,
}

impl HeadlessWindowBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self {
            title: "Pulse".to_string(),
            width: 1024,
            height: 768,
            density: 1.0,
            vsync: false,
            fail_init: false,
        }
    }

    /// Sets the window title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the initial physical size.
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Sets the initial display density.
    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    /// Reports presentation as vsync-limited.
    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    /// Makes `init` fail, to exercise bring-up error paths.
    pub fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    /// Builds the window. It starts hidden, like a native window before `show`.
    pub fn build(self) -> HeadlessWindow {
        HeadlessWindow {
            title: self.title,
            size: Mutex::new(Size::new(self.width, self.height)),
            density: Mutex::new(self.density),
            vsync: self.vsync,
            visible: AtomicBool::new(false),
            created: AtomicBool::new(false),
            fail_init: self.fail_init,
            pending: Mutex::new(VecDeque::new()),
            callbacks: Mutex::new(Callbacks::default()),
            polls: AtomicU64::new(0),
            swaps: AtomicU64::new(0),
        }
    }
}

impl Default for HeadlessWindowBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::MouseButton;
    use std::sync::Arc;

    #[test]
    fn builder_applies_settings() {
        let window = HeadlessWindowBuilder::new()
            .with_title("demo")
            .with_dimensions(640, 480)
            .with_density(2.0)
            .with_vsync(true)
            .build();

        assert_eq!(window.title(), "demo");
        assert_eq!(window.size(), Size::new(640, 480));
        assert_eq!(window.display_density(), 2.0);
        assert!(window.vsync_enabled());
        assert!(!window.is_visible());
    }

    #[test]
    fn events_are_delivered_on_poll_in_order() {
        let window = HeadlessWindowBuilder::new().build();
        let log = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&log);
        window.set_on_resize(Box::new(move |size: Size| {
            sink.lock().unwrap().push(format!("resize {size}"))
        }));
        let sink = Arc::clone(&log);
        window.set_on_input_event(Box::new(move |event: InputEvent| {
            sink.lock().unwrap().push(format!("{event:?}"))
        }));
        let sink = Arc::clone(&log);
        window.set_on_close(Box::new(move || {
            sink.lock().unwrap().push("close".to_string())
        }));

        window.push_resize(Size::new(800, 600));
        window.push_input(InputEvent::MouseButtonPressed {
            button: MouseButton::Left,
        });
        window.request_close();
        assert!(log.lock().unwrap().is_empty());

        window.poll();

        let log = log.lock().unwrap();
        assert_eq!(log.len(), 3);
        assert_eq!(log[0], "resize 800x600");
        assert!(log[1].starts_with("MouseButtonPressed"));
        assert_eq!(log[2], "close");
        assert_eq!(window.size(), Size::new(800, 600));
        assert_eq!(window.poll_count(), 1);
    }

    #[test]
    fn failing_init_reports_the_window_subsystem() {
        let window = HeadlessWindowBuilder::new().failing_init().build();
        let err = window.init().unwrap_err();
        assert_eq!(err.subsystem(), "window");
        assert!(!window.is_created());
    }

    #[test]
    fn visibility_and_swaps() {
        let window = HeadlessWindowBuilder::new().build();
        window.init().unwrap();
        window.show();
        assert!(window.is_visible());
        window.swap_buffers();
        window.swap_buffers();
        assert_eq!(window.swap_count(), 2);
        window.set_visible(false);
        assert!(!window.is_visible());
        window.terminate();
        assert!(!window.is_created());
    }
}

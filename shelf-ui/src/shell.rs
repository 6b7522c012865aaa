//! Window shell: a winit window with a wgpu surface, driven by pumping the
//! event loop from inside the list's blocking display loop.

use std::sync::Arc;
use std::time::Duration;

use shelf::{Color, CursorIcon, EventSource, InputEvent, Key, LoadError, MouseButton, NamedKey, Pixmap, Rect, Size};
use thiserror::Error;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard;
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowId};

use crate::gpu::{GpuTexture, QuadPipeline};

/// Upper bound on waiting for the window system to hand us a window.
const STARTUP_PUMPS: usize = 500;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("failed to find a suitable GPU adapter")]
    NoAdapter,

    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface supports no texture formats")]
    NoSurfaceFormat,

    #[error("window closed before it was ready")]
    Closed,
}

/// Window parameters.
#[derive(Debug, Clone)]
pub struct ShellOptions {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: QuadPipeline,
}

impl Gpu {
    fn new(event_loop: &ActiveEventLoop, options: &ShellOptions) -> Result<Self, ShellError> {
        let window_attributes = Window::default_attributes()
            .with_title(options.title.clone())
            .with_inner_size(LogicalSize::new(options.width, options.height));
        let window = Arc::new(event_loop.create_window(window_attributes)?);
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or(ShellError::NoAdapter)?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("Shelf Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits()),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or(ShellError::NoSurfaceFormat)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: caps.alpha_modes.first().copied().unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let pipeline = QuadPipeline::new(&device, &queue, format);

        tracing::info!(
            width = config.width,
            height = config.height,
            scale = window.scale_factor(),
            ?format,
            adapter = %adapter.get_info().name,
            "window ready"
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            pipeline,
        })
    }

    fn scale(&self) -> f64 {
        self.window.scale_factor()
    }

    fn logical_size(&self) -> Size {
        let size: LogicalSize<f32> = PhysicalSize::new(self.config.width, self.config.height).to_logical(self.scale());
        Size::new(size.width, size.height)
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
        tracing::debug!(width = size.width, height = size.height, "surface resized");
    }

    /// Submit the frame built since the last clear. Returns false when the
    /// device can no longer render.
    fn present(&mut self) -> bool {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return true;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                tracing::error!("out of GPU memory");
                return false;
            }
            Err(e) => {
                tracing::warn!(error = %e, "surface error, skipping frame");
                return true;
            }
        };

        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Shelf Frame Encoder"),
        });

        let viewport = self.logical_size();
        self.pipeline.prepare(&self.device, &self.queue, &mut encoder, viewport);
        self.pipeline.render(&mut encoder, &view);
        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        self.pipeline.after_frame();
        true
    }
}

/// Event-loop side of the shell.
struct ShellState {
    options: ShellOptions,
    gpu: Option<Gpu>,
    init_error: Option<ShellError>,
    pending: Vec<InputEvent>,
    /// Last pointer position in logical pixels.
    pointer: Option<(f32, f32)>,
    closed: bool,
}

impl ShellState {
    fn push_quit(&mut self) {
        if !self.closed {
            self.closed = true;
            self.pending.push(InputEvent::Quit);
        }
    }
}

impl ApplicationHandler for ShellState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() || self.init_error.is_some() {
            return;
        }
        match Gpu::new(event_loop, &self.options) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(e) => {
                tracing::error!(error = %e, "failed to open window");
                self.init_error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.push_quit();
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(size);
                }
            }

            WindowEvent::KeyboardInput {
                event,
                is_synthetic: false,
                ..
            } if event.state == ElementState::Pressed => {
                if let Some(key) = map_key(&event.logical_key) {
                    self.pending.push(InputEvent::KeyDown(key));
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                if let Some(gpu) = &self.gpu {
                    let (x, y) = to_logical(position, gpu.scale());
                    self.pointer = Some((x, y));
                    self.pending.push(InputEvent::PointerMove { x, y });
                }
            }

            WindowEvent::CursorLeft { .. } => {
                self.pointer = None;
            }

            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button,
                ..
            } => {
                if let Some((x, y)) = self.pointer {
                    self.pending.push(InputEvent::PointerDown {
                        x,
                        y,
                        button: map_button(button),
                    });
                }
            }

            _ => {}
        }
    }
}

/// A window the list engine draws into and reads input from.
pub struct WindowShell {
    event_loop: EventLoop<()>,
    state: ShellState,
}

impl WindowShell {
    /// Open the window and bring up the GPU device.
    pub fn open(options: ShellOptions) -> Result<Self, ShellError> {
        let mut event_loop = EventLoop::new()?;
        let mut state = ShellState {
            options,
            gpu: None,
            init_error: None,
            pending: Vec::new(),
            pointer: None,
            closed: false,
        };

        for _ in 0..STARTUP_PUMPS {
            let status = event_loop.pump_app_events(Some(Duration::from_millis(10)), &mut state);
            if let Some(e) = state.init_error.take() {
                return Err(e);
            }
            if state.gpu.is_some() {
                break;
            }
            if let PumpStatus::Exit(_) = status {
                return Err(ShellError::Closed);
            }
        }
        if state.gpu.is_none() {
            return Err(ShellError::Closed);
        }

        Ok(Self { event_loop, state })
    }

    fn gpu_mut(&mut self) -> Option<&mut Gpu> {
        self.state.gpu.as_mut()
    }
}

impl shelf::Surface for WindowShell {
    type Texture = GpuTexture;

    fn viewport(&self) -> Size {
        self.state.gpu.as_ref().map(Gpu::logical_size).unwrap_or(Size::ZERO)
    }

    fn create_texture(&self, pixels: &Pixmap) -> Result<GpuTexture, LoadError> {
        let gpu = self
            .state
            .gpu
            .as_ref()
            .ok_or_else(|| LoadError::Upload("window is not open".to_string()))?;
        gpu.pipeline.create_texture(&gpu.device, &gpu.queue, pixels)
    }

    fn clear(&mut self, color: Color) {
        if let Some(gpu) = self.gpu_mut() {
            gpu.pipeline.begin_frame(color);
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        if let Some(gpu) = self.gpu_mut() {
            gpu.pipeline.fill_rect(rect, color);
        }
    }

    fn draw_texture(&mut self, texture: &GpuTexture, dest: Rect) {
        if let Some(gpu) = self.gpu_mut() {
            gpu.pipeline.draw_texture(texture, dest);
        }
    }

    fn set_cursor(&mut self, icon: CursorIcon) {
        if let Some(gpu) = &self.state.gpu {
            gpu.window.set_cursor(map_cursor(icon));
        }
    }

    fn present(&mut self) {
        let healthy = self.gpu_mut().is_none_or(Gpu::present);
        if !healthy {
            self.state.push_quit();
        }
    }
}

impl EventSource for WindowShell {
    fn poll_events(&mut self, events: &mut Vec<InputEvent>) {
        if !self.state.closed {
            let status = self.event_loop.pump_app_events(Some(Duration::ZERO), &mut self.state);
            if let PumpStatus::Exit(code) = status {
                tracing::debug!(code, "event loop exited");
                self.state.push_quit();
            }
        }
        events.append(&mut self.state.pending);
        if self.state.closed && events.is_empty() {
            events.push(InputEvent::Quit);
        }
    }
}

fn map_key(key: &keyboard::Key) -> Option<Key> {
    match key {
        keyboard::Key::Named(named) => {
            let named = match named {
                keyboard::NamedKey::ArrowUp => NamedKey::ArrowUp,
                keyboard::NamedKey::ArrowDown => NamedKey::ArrowDown,
                keyboard::NamedKey::ArrowLeft => NamedKey::ArrowLeft,
                keyboard::NamedKey::ArrowRight => NamedKey::ArrowRight,
                keyboard::NamedKey::Enter => NamedKey::Enter,
                keyboard::NamedKey::Escape => NamedKey::Escape,
                keyboard::NamedKey::Tab => NamedKey::Tab,
                keyboard::NamedKey::Space => NamedKey::Space,
                _ => return None,
            };
            Some(Key::Named(named))
        }
        keyboard::Key::Character(text) => Some(Key::Character(text.to_string())),
        _ => None,
    }
}

fn map_button(button: winit::event::MouseButton) -> MouseButton {
    match button {
        winit::event::MouseButton::Left => MouseButton::Left,
        winit::event::MouseButton::Right => MouseButton::Right,
        winit::event::MouseButton::Middle => MouseButton::Middle,
        winit::event::MouseButton::Back => MouseButton::Other(3),
        winit::event::MouseButton::Forward => MouseButton::Other(4),
        winit::event::MouseButton::Other(n) => MouseButton::Other(n),
    }
}

fn map_cursor(icon: CursorIcon) -> winit::window::CursorIcon {
    match icon {
        CursorIcon::Arrow => winit::window::CursorIcon::Default,
        CursorIcon::Pointer => winit::window::CursorIcon::Pointer,
    }
}

fn to_logical(position: PhysicalPosition<f64>, scale: f64) -> (f32, f32) {
    let logical = position.to_logical::<f64>(scale);
    (logical.x as f32, logical.y as f32)
}

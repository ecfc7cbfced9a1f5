use anyhow::{Context, Result};
use clap::Parser;
use simworld_input::{Key, KeyCode as SimKey, KeyEvent as SimKeyEvent};
use simworld_sandbox::scenario::{ActorTraceHooks, mouse_world};
use simworld_sandbox::{Sandbox, SandboxConfig};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};
use winit::window::{Fullscreen, Window, WindowId};

#[derive(Parser)]
#[command(name = "simworld-desktop", about = "MouseWorld in a window")]
struct Cli {
    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    /// YAML sandbox config (window, models dir, speeds, keys)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write a per-frame trace of the actor to this file
    #[arg(short, long)]
    trace: Option<PathBuf>,
}

/// Frames longer than this are clamped so a stalled window does not make
/// the actor jump.
const MAX_FRAME_SECONDS: f64 = 0.1;

struct DesktopApp {
    sandbox: Sandbox,
    window: Option<Window>,
    modifiers: ModifiersState,
    last_frame: Instant,
    help_shown: bool,
}

impl DesktopApp {
    fn new(sandbox: Sandbox) -> Self {
        Self {
            sandbox,
            window: None,
            modifiers: ModifiersState::empty(),
            last_frame: Instant::now(),
            help_shown: false,
        }
    }

    fn handle_key(&mut self, event: &KeyEvent) {
        if event.repeat {
            return;
        }
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        let Some(code) = translate_key(code) else {
            return;
        };
        let key = if self.modifiers.control_key() {
            Key::control(code)
        } else {
            Key::new(code)
        };
        self.sandbox.push_key(match event.state {
            ElementState::Pressed => SimKeyEvent::pressed(key),
            ElementState::Released => SimKeyEvent::released(key),
        });
    }

    /// Run one sandbox frame and mirror its state into the window title.
    fn step(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f64().min(MAX_FRAME_SECONDS);
        self.last_frame = now;

        if !self.sandbox.frame(dt) {
            event_loop.exit();
            return;
        }

        let help = self.sandbox.help();
        if help.is_visible() && !self.help_shown {
            println!("{}", help.text());
        }
        self.help_shown = help.is_visible();

        if let Some(window) = &self.window {
            window.set_title(&self.title());
        }
    }

    fn title(&self) -> String {
        let mut title = self.sandbox.config().window.title.clone();
        if let Some(s) = self.sandbox.snapshot() {
            title.push_str(&format!(
                " | {} ({:.1}, {:.1}) h={:.0} v={:.1}",
                s.name,
                s.position.x,
                s.position.y,
                s.heading,
                s.speed()
            ));
        }
        let notice = self.sandbox.notice();
        if notice.is_visible() {
            title.push_str(" | ");
            title.push_str(notice.text());
        }
        title
    }
}

impl ApplicationHandler for DesktopApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let props = &self.sandbox.config().window;
        let mut attrs = Window::default_attributes()
            .with_title(props.title.clone())
            .with_inner_size(PhysicalSize::new(props.width, props.height));
        if props.fullscreen {
            attrs = attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }
        match event_loop.create_window(attrs) {
            Ok(window) => {
                let size = window.inner_size();
                self.sandbox.resize(size.width, size.height);
                self.window = Some(window);
                self.last_frame = Instant::now();
            }
            Err(error) => {
                tracing::error!(%error, "failed to create window");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                if self.sandbox.is_running() {
                    self.sandbox.shutdown();
                }
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                self.sandbox.resize(size.width.max(1), size.height.max(1));
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers.state();
            }
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(&event),
            WindowEvent::RedrawRequested => {
                self.step(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Map a physical key to the sandbox's key names. Unmapped keys are dropped.
fn translate_key(code: KeyCode) -> Option<SimKey> {
    let key = match code {
        KeyCode::ArrowUp => SimKey::ArrowUp,
        KeyCode::ArrowDown => SimKey::ArrowDown,
        KeyCode::ArrowLeft => SimKey::ArrowLeft,
        KeyCode::ArrowRight => SimKey::ArrowRight,
        KeyCode::Escape => SimKey::Escape,
        KeyCode::Space => SimKey::Space,
        KeyCode::Enter => SimKey::Enter,
        KeyCode::Tab => SimKey::Tab,
        KeyCode::Backspace => SimKey::Backspace,
        KeyCode::Delete => SimKey::Delete,
        KeyCode::F1 => SimKey::F(1),
        KeyCode::F2 => SimKey::F(2),
        KeyCode::F3 => SimKey::F(3),
        KeyCode::F4 => SimKey::F(4),
        KeyCode::F5 => SimKey::F(5),
        KeyCode::F6 => SimKey::F(6),
        KeyCode::F7 => SimKey::F(7),
        KeyCode::F8 => SimKey::F(8),
        KeyCode::F9 => SimKey::F(9),
        KeyCode::F10 => SimKey::F(10),
        KeyCode::F11 => SimKey::F(11),
        KeyCode::F12 => SimKey::F(12),
        KeyCode::Backquote => SimKey::Char('`'),
        KeyCode::Minus => SimKey::Char('-'),
        KeyCode::Equal => SimKey::Char('='),
        KeyCode::Comma => SimKey::Char(','),
        KeyCode::Period => SimKey::Char('.'),
        KeyCode::Slash => SimKey::Char('/'),
        other => return letter_or_digit(other).map(SimKey::Char),
    };
    Some(key)
}

fn letter_or_digit(code: KeyCode) -> Option<char> {
    const LETTERS: [KeyCode; 26] = [
        KeyCode::KeyA, KeyCode::KeyB, KeyCode::KeyC, KeyCode::KeyD, KeyCode::KeyE,
        KeyCode::KeyF, KeyCode::KeyG, KeyCode::KeyH, KeyCode::KeyI, KeyCode::KeyJ,
        KeyCode::KeyK, KeyCode::KeyL, KeyCode::KeyM, KeyCode::KeyN, KeyCode::KeyO,
        KeyCode::KeyP, KeyCode::KeyQ, KeyCode::KeyR, KeyCode::KeyS, KeyCode::KeyT,
        KeyCode::KeyU, KeyCode::KeyV, KeyCode::KeyW, KeyCode::KeyX, KeyCode::KeyY,
        KeyCode::KeyZ,
    ];
    const DIGITS: [KeyCode; 10] = [
        KeyCode::Digit0, KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3, KeyCode::Digit4,
        KeyCode::Digit5, KeyCode::Digit6, KeyCode::Digit7, KeyCode::Digit8, KeyCode::Digit9,
    ];
    if let Some(i) = LETTERS.iter().position(|k| *k == code) {
        return char::from_u32('a' as u32 + i as u32);
    }
    DIGITS
        .iter()
        .position(|k| *k == code)
        .and_then(|i| char::from_digit(i as u32, 10))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("simworld-desktop starting");

    let config = SandboxConfig::load_or_default(cli.config.as_deref())
        .context("loading sandbox config")?;
    let mut sandbox = Sandbox::new(config)?.with_hooks(ActorTraceHooks);
    mouse_world(&mut sandbox, cli.trace.as_deref()).context("building MouseWorld")?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = DesktopApp::new(sandbox);
    event_loop.run_app(&mut app)?;
    if app.sandbox.is_running() {
        app.sandbox.shutdown();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_and_digits_translate() {
        assert_eq!(translate_key(KeyCode::KeyL), Some(SimKey::Char('l')));
        assert_eq!(translate_key(KeyCode::KeyZ), Some(SimKey::Char('z')));
        assert_eq!(translate_key(KeyCode::Digit7), Some(SimKey::Char('7')));
        assert_eq!(translate_key(KeyCode::Backquote), Some(SimKey::Char('`')));
        assert_eq!(translate_key(KeyCode::F1), Some(SimKey::F(1)));
        assert_eq!(translate_key(KeyCode::CapsLock), None);
    }
}

use crate::backend::{OverlayText, TerminalBackend};
use crate::binding::BindingLayer;
use crate::config::{Config, RendererMode};
use crate::driver::FrameDriver;
use crate::panel::TerminalPanel;
use crate::params::ParameterStore;
use crate::preset::PresetLibrary;
use crate::render::{AsciiRenderer, HalfBlockRenderer, OverlayAnchor, Renderer};
use crate::terminal::TerminalGuard;
use anyhow::Context;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseEventKind};
use std::io::{BufWriter, Stdout};
use std::time::{Duration, Instant};

type Driver = FrameDriver<TerminalBackend<BufWriter<Stdout>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    None,
    Quit,
    TogglePanel,
    ToggleHelp,
    StepPreset(i32),
}

pub fn run(cfg: Config) -> anyhow::Result<()> {
    let presets = PresetLibrary::builtin();
    if let Some(name) = cfg.preset.as_deref() {
        presets
            .resolve(name)
            .with_context(|| format!("--preset {name}"))?;
    }

    let mut store = ParameterStore::new();
    let mut panel = TerminalPanel::new();
    let mut layer = BindingLayer::install(&mut store, &mut panel, &presets, cfg.tile)?;
    if let Some(name) = cfg.preset.as_deref() {
        layer.select_preset(&mut store, &mut panel, &presets, name)?;
    }

    let _term = TerminalGuard::new()?;
    let out = BufWriter::new(TerminalGuard::stdout());

    let renderer: Box<dyn Renderer> = match cfg.renderer {
        RendererMode::HalfBlock => Box::new(HalfBlockRenderer::new()),
        RendererMode::Ascii => Box::new(AsciiRenderer::new()),
    };
    let mut driver = FrameDriver::new(TerminalBackend::new(renderer, out, cfg.sync_updates));
    driver.set_pixel_ratio(cfg.samples as f32);

    let mut last_size = crossterm::terminal::size().context("get terminal size")?;
    if last_size.1 < 2 || last_size.0 < 4 {
        return Err(anyhow::anyhow!(
            "terminal too small (need at least 4x2, got {}x{})",
            last_size.0,
            last_size.1
        ));
    }
    driver.resize(last_size.0, last_size.1);
    tracing::info!(
        cols = last_size.0,
        rows = last_size.1,
        renderer = driver.backend().renderer_name(),
        "sandbox started"
    );

    let start = Instant::now();
    let mut fps = FpsCounter::new();
    let mut show_help = false;

    while driver.is_running() {
        let now = Instant::now();

        // Drain input events (non-blocking).
        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(k) if k.kind != KeyEventKind::Release => {
                    match handle_key(k.code, k.modifiers, &mut panel) {
                        Action::Quit => driver.stop(),
                        Action::TogglePanel => panel.toggle(),
                        Action::ToggleHelp => show_help = !show_help,
                        Action::StepPreset(dir) => {
                            let next = stepped_preset(&presets, store.choice("preset")?, dir);
                            layer.select_preset(&mut store, &mut panel, &presets, next)?;
                        }
                        Action::None => {}
                    }
                }
                Event::Mouse(m) if matches!(m.kind, MouseEventKind::Moved | MouseEventKind::Drag(_)) => {
                    let pos = driver.backend().normalize_pointer(m.column, m.row);
                    driver.pointer_moved(pos);
                }
                Event::Resize(c, r) => {
                    last_size = (c, r);
                    driver.resize(c, r);
                }
                _ => {}
            }
        }

        // Resize events can be missed in some terminals.
        let sz = crossterm::terminal::size()?;
        if sz != last_size {
            last_size = sz;
            driver.resize(sz.0, sz.1);
        }

        let changed = layer.sync_from_panel(&mut store, &mut panel);
        if changed.iter().any(|n| n == "preset") {
            layer.apply_selected(&mut store, &mut panel, &presets)?;
        }

        let hud = build_hud(&store, &driver, fps.fps());
        let overlay = if show_help {
            Some(OverlayText {
                text: help_popup_text().to_string(),
                anchor: OverlayAnchor::Center,
                highlight: None,
            })
        } else if panel.visible() {
            Some(OverlayText {
                text: panel.text(),
                anchor: OverlayAnchor::TopRight,
                highlight: Some(panel.cursor() + 1),
            })
        } else {
            None
        };
        driver.backend_mut().set_hud(hud);
        driver.backend_mut().set_overlay(overlay);

        driver.tick(&store, start.elapsed().as_secs_f32())?;
        fps.tick();

        // Frame pacing.
        let target = Duration::from_secs_f32(1.0 / cfg.fps.max(1) as f32);
        let elapsed = now.elapsed();
        if elapsed < target {
            std::thread::sleep(target - elapsed);
        }
    }

    tracing::info!(frames = driver.frames(), "sandbox stopped");
    Ok(())
}

fn handle_key(code: KeyCode, mods: KeyModifiers, panel: &mut TerminalPanel) -> Action {
    if mods.contains(KeyModifiers::CONTROL) && matches!(code, KeyCode::Char('c')) {
        return Action::Quit;
    }

    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Action::Quit,
        KeyCode::Tab => Action::TogglePanel,
        KeyCode::Char('?') | KeyCode::Char('h') | KeyCode::F(1) => Action::ToggleHelp,
        KeyCode::Char('[') => Action::StepPreset(-1),
        KeyCode::Char(']') => Action::StepPreset(1),
        KeyCode::Up if panel.visible() => {
            panel.select_prev();
            Action::None
        }
        KeyCode::Down if panel.visible() => {
            panel.select_next();
            Action::None
        }
        KeyCode::Enter if panel.visible() => {
            panel.activate();
            Action::None
        }
        KeyCode::Left if panel.visible() => {
            panel.nudge(-1);
            Action::None
        }
        KeyCode::Right if panel.visible() => {
            panel.nudge(1);
            Action::None
        }
        _ => Action::None,
    }
}

fn stepped_preset<'a>(presets: &'a PresetLibrary, current: &str, dir: i32) -> &'a str {
    let names = presets.names();
    let n = names.len() as i32;
    let idx = names.iter().position(|p| *p == current).unwrap_or(0) as i32;
    names[(idx + dir).rem_euclid(n) as usize]
}

fn build_hud(store: &ParameterStore, driver: &Driver, fps: f32) -> String {
    let preset = store.choice("preset").unwrap_or("?");
    let tile = store.float("tile").unwrap_or(0.0);
    let u = driver.uniforms();
    format!(
        "Preset: {} | Tile: {:.2} | Mouse: {:.2},{:.2} | FPS: {:>4.1} | Renderer: {} x{} | Keys: tab panel | [/] preset | ? help | q quit",
        preset,
        tile,
        u.mouse.x,
        u.mouse.y,
        fps,
        driver.backend().renderer_name(),
        driver.backend().pixel_ratio(),
    )
}

fn help_popup_text() -> &'static str {
    "SDF Sandbox Hotkeys\n\
tab  show/hide parameter panel\n\
up/down  select panel row\n\
left/right  adjust selected row (preset row cycles presets)\n\
enter  open/close the color picker\n\
[ / ]  previous/next preset\n\
? or h or F1  toggle this help\n\
q or esc  quit"
}

struct FpsCounter {
    last: Instant,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            last: Instant::now(),
            frames: 0,
            fps: 0.0,
        }
    }

    fn tick(&mut self) {
        self.frames += 1;
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        if dt >= 0.5 {
            self.fps = (self.frames as f32) / dt;
            self.frames = 0;
            self.last = now;
        }
    }

    fn fps(&self) -> f32 {
        self.fps
    }
}

// SPDX-License-Identifier: GPL-3.0-only

//! Terminal front end
//!
//! Renders the application screens with ratatui. Boundary calls run on a
//! tokio runtime in the background and post their completion back to the UI
//! loop through a channel; the loop itself is the only place the model is
//! mutated. The captured photo's inline preview is drawn with Unicode
//! half-block characters for improved vertical resolution.

use crate::app::{AppModel, Message, NotificationKind, Screen, Task};
use crate::backends::Capabilities;
use crate::constants;
use crate::errors::{AppError, AppResult};
use crate::session::{CameraFacing, CapturedPhoto, Control, SourceHandle};
use crate::storage;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};
use std::io::{self, stdout};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Run the interactive terminal UI
pub fn run(capabilities: Capabilities) -> AppResult<()> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| AppError::Other(format!("Failed to start runtime: {}", e)))?;

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let result = run_app(&mut terminal, &runtime, capabilities);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn spawn(runtime: &tokio::runtime::Runtime, sender: &mpsc::UnboundedSender<Message>, task: Task) {
    let sender = sender.clone();
    runtime.spawn(async move {
        let message = task.await;
        if sender.send(message).is_err() {
            warn!("UI loop gone, dropping message");
        }
    });
}

/// Map a key to the control it triggers
pub fn control_for_key(code: KeyCode) -> Option<Control> {
    match code {
        KeyCode::Char('f') => Some(Control::ToggleFacing),
        KeyCode::Char(' ') | KeyCode::Char('p') => Some(Control::Capture),
        KeyCode::Char('s') => Some(Control::Share),
        KeyCode::Char('g') => Some(Control::Save),
        KeyCode::Char('d') | KeyCode::Esc => Some(Control::Discard),
        _ => None,
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    runtime: &tokio::runtime::Runtime,
    capabilities: Capabilities,
) -> AppResult<()> {
    let (sender, mut receiver) = mpsc::unbounded_channel::<Message>();

    let (mut model, startup) = AppModel::new(capabilities);
    if let Some(task) = startup {
        spawn(runtime, &sender, task);
    }

    let mut preview = PreviewCache::default();
    let mut show_help = false;

    loop {
        // Apply every completed background call before drawing
        while let Ok(message) = receiver.try_recv() {
            if let Some(task) = model.update(message) {
                spawn(runtime, &sender, task);
            }
        }

        let screen = model.screen();
        if let Screen::Reviewing { photo, .. } = &screen {
            preview.update(photo);
        } else {
            preview.clear();
        }

        let status = match model.notification() {
            Some(notification) => StatusBar {
                message: notification.message.clone(),
                error: notification.kind == NotificationKind::Error,
            },
            None => StatusBar {
                message: if show_help {
                    build_help_message(&screen)
                } else {
                    build_status_message(&screen)
                },
                error: false,
            },
        };

        terminal.draw(|f| {
            let area = f.area();

            // Reserve bottom line for status
            let main_area = Rect {
                x: area.x,
                y: area.y,
                width: area.width,
                height: area.height.saturating_sub(1),
            };
            let status_area = Rect {
                x: area.x,
                y: area.y + area.height.saturating_sub(1),
                width: area.width,
                height: 1,
            };

            match &screen {
                Screen::ResolvingPermissions => {
                    f.render_widget(CenteredText("Requesting permissions..."), main_area);
                }
                Screen::CameraDenied => {
                    f.render_widget(
                        CenteredText("Permission for camera not granted. Please accept it in settings"),
                        main_area,
                    );
                }
                Screen::Live { facing, busy, .. } => {
                    f.render_widget(Viewfinder { facing: *facing, busy: *busy }, main_area);
                }
                Screen::Reviewing { .. } => {
                    f.render_widget(&preview, main_area);
                }
            }

            f.render_widget(&status, status_area);
        })?;

        // Handle input with timeout for background completions
        if event::poll(Duration::from_millis(constants::UI_POLL_MS))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            // Ctrl+C to quit
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                break;
            }

            // 'q' also quits
            if key.code == KeyCode::Char('q') {
                break;
            }

            // 'h' to toggle help
            if key.code == KeyCode::Char('h') {
                show_help = !show_help;
                continue;
            }

            if let Some(control) = control_for_key(key.code) {
                show_help = false;
                // Keys for controls that are not offered do nothing
                if !screen.offers(control) {
                    continue;
                }
                let message = Message::for_control(control);
                if model.notification().is_some() {
                    model.update(Message::DismissNotification);
                }
                if let Some(task) = model.update(message) {
                    spawn(runtime, &sender, task);
                }
            }
        }
    }

    info!("Terminal UI closed");
    Ok(())
}

fn control_hint(control: Control) -> &'static str {
    match control {
        Control::ToggleFacing => "'f' flip",
        Control::Capture => "'space' capture",
        Control::Share => "'s' share",
        Control::Save => "'g' save",
        Control::Discard => "'d' discard",
    }
}

fn build_status_message(screen: &Screen<'_>) -> String {
    let busy = matches!(
        screen,
        Screen::Live { busy: true, .. } | Screen::Reviewing { busy: true, .. }
    );
    if busy {
        return "Working...".to_string();
    }

    let mut parts: Vec<&str> = screen.controls().iter().map(|c| control_hint(*c)).collect();
    parts.push("'h' help");
    parts.push("'q' quit");
    parts.join(" | ")
}

fn build_help_message(screen: &Screen<'_>) -> String {
    let mut msg = String::new();
    for control in screen.controls() {
        let line = match control {
            Control::ToggleFacing => "f: Switch front/back camera | ",
            Control::Capture => "space/p: Take picture | ",
            Control::Share => "s: Share photo | ",
            Control::Save => "g: Save to gallery | ",
            Control::Discard => "d/Esc: Discard photo | ",
        };
        msg.push_str(line);
    }
    msg.push_str("h: Toggle help | q/Ctrl+C: Quit");
    msg
}

/// Decoded preview of the photo under review
///
/// Decoding happens once per photo, not once per frame.
#[derive(Default)]
struct PreviewCache {
    source: Option<SourceHandle>,
    image: Option<image::RgbImage>,
}

impl PreviewCache {
    fn update(&mut self, photo: &CapturedPhoto) {
        if self.source.as_ref() == Some(&photo.source) {
            return;
        }

        self.source = Some(photo.source.clone());
        self.image = match &photo.preview {
            Some(encoded) => match storage::decode_preview(encoded) {
                Ok(image) => Some(image),
                Err(e) => {
                    error!(error = %e, "Failed to decode inline preview");
                    None
                }
            },
            None => None,
        };
    }

    fn clear(&mut self) {
        self.source = None;
        self.image = None;
    }
}

/// Single line of text centered in the area
struct CenteredText(&'static str);

impl Widget for CenteredText {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let msg = self.0;
        let x = area.x + (area.width.saturating_sub(msg.len() as u16)) / 2;
        let y = area.y + area.height / 2;
        if y < area.y + area.height && x < area.x + area.width {
            let max = (area.x + area.width - x) as usize;
            let text = if msg.len() > max { &msg[..max] } else { msg };
            buf.set_string(x, y, text, Style::default());
        }
    }
}

/// Viewfinder placeholder; the live feed itself belongs to the camera
struct Viewfinder {
    facing: CameraFacing,
    busy: bool,
}

impl Widget for Viewfinder {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 2 || area.height < 2 {
            return;
        }

        // Frame corners
        let right = area.x + area.width - 1;
        let bottom = area.y + area.height - 1;
        let style = Style::default().fg(Color::Gray);
        for (x, y, c) in [
            (area.x, area.y, '┌'),
            (right, area.y, '┐'),
            (area.x, bottom, '└'),
            (right, bottom, '┘'),
        ] {
            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.set_char(c);
                cell.set_style(style);
            }
        }

        let label = if self.busy {
            format!("● capturing with {} camera...", self.facing)
        } else {
            format!("● LIVE  {} camera", self.facing)
        };
        let x = area.x + (area.width.saturating_sub(label.chars().count() as u16)) / 2;
        let y = area.y + area.height / 2;
        buf.set_string(x, y, &label, Style::default().fg(Color::Red));
    }
}

impl Widget for &PreviewCache {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(frame) = &self.image else {
            CenteredText("Preview unavailable").render(area, buf);
            return;
        };

        if frame.width() == 0 || frame.height() == 0 || area.width == 0 || area.height == 0 {
            return;
        }

        // Calculate display dimensions maintaining aspect ratio
        // Each terminal cell displays 2 vertical pixels using half-block characters
        let frame_aspect = frame.width() as f64 / frame.height() as f64;
        let term_width = area.width as f64;
        let term_height = (area.height * 2) as f64; // *2 because half-blocks

        let (display_width, display_height) = if term_width / term_height > frame_aspect {
            // Terminal is wider - fit to height
            let h = term_height;
            let w = h * frame_aspect;
            (w as u16, (h / 2.0) as u16)
        } else {
            // Terminal is taller - fit to width
            let w = term_width;
            let h = w / frame_aspect;
            (w as u16, (h / 2.0) as u16)
        };

        if display_width == 0 || display_height == 0 {
            return;
        }

        // Center the image
        let x_offset = area.x + (area.width.saturating_sub(display_width)) / 2;
        let y_offset = area.y + (area.height.saturating_sub(display_height)) / 2;

        // Scale factors
        let x_scale = frame.width() as f64 / display_width as f64;
        let y_scale = frame.height() as f64 / (display_height * 2) as f64;

        for ty in 0..display_height {
            for tx in 0..display_width {
                let term_x = x_offset + tx;
                let term_y = y_offset + ty;

                if term_x >= area.x + area.width || term_y >= area.y + area.height {
                    continue;
                }

                let src_x = (tx as f64 * x_scale) as u32;
                let src_y_top = (ty as f64 * 2.0 * y_scale) as u32;
                let src_y_bottom = ((ty as f64 * 2.0 + 1.0) * y_scale) as u32;

                let top_color = sample_pixel(frame, src_x, src_y_top);
                let bottom_color = sample_pixel(frame, src_x, src_y_bottom);

                if let Some(cell) = buf.cell_mut((term_x, term_y)) {
                    cell.set_char('▀');
                    cell.set_fg(top_color);
                    cell.set_bg(bottom_color);
                }
            }
        }
    }
}

fn sample_pixel(frame: &image::RgbImage, x: u32, y: u32) -> Color {
    let x = x.min(frame.width() - 1);
    let y = y.min(frame.height() - 1);
    let [r, g, b] = frame.get_pixel(x, y).0;
    Color::Rgb(r, g, b)
}

/// Status bar widget
struct StatusBar {
    message: String,
    error: bool,
}

impl Widget for &StatusBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bg = if self.error { Color::Red } else { Color::DarkGray };

        // Fill background
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_bg(bg);
            }
        }

        // Render text
        let text: String = self.message.chars().take(area.width as usize).collect();

        buf.set_string(area.x, area.y, text, Style::default().fg(Color::White).bg(bg));
    }
}

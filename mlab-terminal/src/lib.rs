/// Terminal front end for the linear-algebra lab
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use mlab_core::{
    map_mouse_to_arcball, parse_command, ArcballEvent, Control, Lab, Step, Viewport,
};
use std::collections::VecDeque;
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub mod panel;
pub mod renderer;

pub use renderer::Canvas;

/// Width over height of one character cell
pub const CELL_ASPECT: f32 = 0.5;

/// Rows reserved for the header and the status/console line
const CHROME_ROWS: u16 = 2;

const HELP: &str = "a/d focal  w/s dist  arrows yaw/pitch  [/] fov  z/x y  f/g plane  \
o/p l/k camera  9/0 axis  c lookat  v proj  r reset  m panel  t trace  : cmd  q quit";

/// Held-key action for a key code
pub fn control_for(code: KeyCode) -> Option<Control> {
    use Step::{Decrease, Increase};
    let control = match code {
        KeyCode::Char('a') => Control::FocalLength(Decrease),
        KeyCode::Char('d') => Control::FocalLength(Increase),
        KeyCode::Char('w') => Control::Distance(Decrease),
        KeyCode::Char('s') => Control::Distance(Increase),
        KeyCode::Left => Control::Yaw(Decrease),
        KeyCode::Right => Control::Yaw(Increase),
        KeyCode::Up => Control::Pitch(Increase),
        KeyCode::Down => Control::Pitch(Decrease),
        KeyCode::Char('[') => Control::Fov(Decrease),
        KeyCode::Char(']') => Control::Fov(Increase),
        KeyCode::Char('z') => Control::YTranslate(Decrease),
        KeyCode::Char('x') => Control::YTranslate(Increase),
        KeyCode::Char('f') => Control::PlanePitch(Decrease),
        KeyCode::Char('g') => Control::PlanePitch(Increase),
        KeyCode::Char('o') => Control::CameraYaw(Decrease),
        KeyCode::Char('p') => Control::CameraYaw(Increase),
        KeyCode::Char('k') => Control::CameraPitch(Decrease),
        KeyCode::Char('l') => Control::CameraPitch(Increase),
        KeyCode::Char('9') => Control::AxisAngle(Decrease),
        KeyCode::Char('0') => Control::AxisAngle(Increase),
        KeyCode::Char('-') => Control::OrthoSize(Decrease),
        KeyCode::Char('=') => Control::OrthoSize(Increase),
        KeyCode::Char('c') => Control::ToggleLookAt,
        KeyCode::Char('v') => Control::ToggleProjection,
        KeyCode::Char('r') => Control::ResetTransform,
        KeyCode::Char('b') => Control::ResetArcball,
        _ => return None,
    };
    Some(control)
}

/// Queue a pointer event, merging consecutive drags so only the latest
/// position is kept.
pub fn enqueue_pointer(queue: &mut VecDeque<ArcballEvent>, event: ArcballEvent) {
    if let (Some(ArcballEvent::Drag(_)), ArcballEvent::Drag(_)) = (queue.back(), event) {
        queue.pop_back();
    }
    queue.push_back(event);
}

/// Main application struct for the terminal lab
pub struct LabApp {
    lab: Lab,
    canvas: Canvas,
    pointer_events: VecDeque<ArcballEvent>,
    /// Command line being typed, when the console is open
    console: Option<String>,
    status: String,
    show_panel: bool,
    traced: usize,
    target_fps: u32,
    running: bool,
    last_tick: Instant,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl LabApp {
    pub fn new(lab: Lab, target_fps: u32) -> io::Result<Self> {
        let (width, height) = terminal::size()?;

        Ok(Self {
            lab,
            canvas: Canvas::new(width as usize, height.saturating_sub(CHROME_ROWS) as usize),
            pointer_events: VecDeque::new(),
            console: None,
            status: String::new(),
            show_panel: true,
            traced: 6,
            target_fps: target_fps.max(1),
            running: true,
            last_tick: Instant::now(),
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide
        )?;
        info!(fps = self.target_fps, "terminal lab started");

        let result = self.main_loop();

        // Cleanup
        execute!(
            stdout(),
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        )?;
        terminal::disable_raw_mode()?;
        info!("terminal lab stopped");

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_secs_f32(1.0 / self.target_fps as f32);

        while self.running {
            let frame_start = Instant::now();

            // Handle input
            while event::poll(Duration::ZERO)? {
                let event = event::read()?;
                self.handle_event(event, target_frame_time.as_secs_f32());
            }

            // Update
            let dt = self.last_tick.elapsed().as_secs_f32();
            self.last_tick = Instant::now();
            self.lab.tick(self.pointer_events.pop_front(), dt);

            // Render
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event, key_dt: f32) {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                if self.console.is_some() {
                    self.handle_console_key(key);
                } else {
                    self.handle_key(key, key_dt);
                }
            }
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(width, height) => {
                debug!(width, height, "terminal resized");
                self.canvas
                    .resize(width as usize, height.saturating_sub(CHROME_ROWS) as usize);
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent, dt: f32) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.running = false
            }
            KeyCode::Char(':') => self.console = Some(String::new()),
            KeyCode::Char('m') => self.show_panel = !self.show_panel,
            KeyCode::Char('t') => self.traced = (self.traced + 1) % panel::VECTOR_LABELS.len(),
            code => {
                if let Some(control) = control_for(code) {
                    control.apply(&mut self.lab, dt);
                }
            }
        }
    }

    fn handle_console_key(&mut self, key: KeyEvent) {
        let Some(line) = self.console.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.console = None,
            KeyCode::Backspace => {
                line.pop();
            }
            KeyCode::Char(c) => line.push(c),
            KeyCode::Enter => {
                let input = std::mem::take(line);
                self.console = None;
                self.run_command(&input);
            }
            _ => {}
        }
    }

    fn run_command(&mut self, input: &str) {
        match parse_command(input) {
            Ok(command) => {
                self.lab.execute(command);
                self.status = format!("ok: {}", input.trim());
            }
            Err(err) => {
                warn!(%err, "rejected console command");
                self.status = err.to_string();
            }
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        // The canvas starts one row below the header.
        let x = mouse.column as f32 + 0.5;
        let y = mouse.row as f32 - 0.5;
        let point = || {
            map_mouse_to_arcball(
                x,
                y,
                self.canvas.width().max(1) as f32,
                self.canvas.height().max(1) as f32,
            )
        };

        let event = match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => ArcballEvent::Press(point()),
            MouseEventKind::Drag(MouseButton::Left) => ArcballEvent::Drag(point()),
            MouseEventKind::Up(MouseButton::Left) => ArcballEvent::Release,
            _ => return,
        };
        enqueue_pointer(&mut self.pointer_events, event);
    }

    fn viewport(&self) -> Viewport {
        Viewport::new(self.canvas.width() as u32, self.canvas.height() as u32)
            .with_pixel_aspect(CELL_ASPECT)
    }

    fn render(&mut self) -> io::Result<()> {
        let frame = self.lab.frame(&self.viewport());

        // Clear canvas
        self.canvas.clear();

        // Rasterize the draw lists back to front
        for primitive in &frame.primitives {
            self.canvas.draw_primitive(primitive);
        }

        // Output to terminal
        let mut stdout = stdout();
        self.canvas.draw(&mut stdout, 1)?;

        if self.show_panel {
            let left = self.canvas.width().saturating_sub(panel::PANEL_WIDTH) as u16;
            queue!(stdout, SetForegroundColor(Color::Yellow))?;
            for (row, line) in panel::panel_lines(&self.lab, &frame, self.traced)
                .iter()
                .take(self.canvas.height())
                .enumerate()
            {
                queue!(
                    stdout,
                    cursor::MoveTo(left, 1 + row as u16),
                    Print(format!("{line:<width$}", width = panel::PANEL_WIDTH))
                )?;
            }
        }

        // Header and status line
        let (_, height) = terminal::size()?;
        let status = match &self.console {
            Some(line) => format!(":{line}"),
            None => self.status.clone(),
        };
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            terminal::Clear(ClearType::CurrentLine),
            SetForegroundColor(Color::Yellow),
            Print(format!("MLab | FPS: {:.1} | {HELP}", self.fps)),
            cursor::MoveTo(0, height.saturating_sub(1)),
            terminal::Clear(ClearType::CurrentLine),
            SetForegroundColor(Color::White),
            Print(status),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

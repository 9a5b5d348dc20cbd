use crate::chip::{
    chip8::{Chip8, FrameBuffer},
    Chip, ChipWithCursiveDisplay, ExecutionState,
};

use cursive::{
    theme::{BaseColor, Color, ColorStyle},
    view::View,
    CbSink, Cursive, Printer, Vec2,
};

/// Two display rows are folded into one terminal row using half blocks.
const TERMINAL_ROWS: usize = FrameBuffer::HEIGHT / 2;

/// Represents the display of the CHIP-8 together with a status line.
pub struct Display {
    framebuffer: FrameBuffer,
    sound: bool,
    status: String,
}

impl Display {
    /// Creates a new display from a snapshot of the framebuffer.
    pub fn new(framebuffer: FrameBuffer, sound: bool, status: String) -> Self {
        Display {
            framebuffer,
            sound,
            status,
        }
    }

    /// The glyph showing the pixels at (`x`, `2 * row`) and (`x`, `2 * row + 1`).
    fn cell(&self, x: usize, row: usize) -> &'static str {
        match (
            self.framebuffer.pixel(x, 2 * row),
            self.framebuffer.pixel(x, 2 * row + 1),
        ) {
            (true, true) => "█",
            (true, false) => "▀",
            (false, true) => "▄",
            (false, false) => " ",
        }
    }
}

impl Default for Display {
    fn default() -> Self {
        Self::new(FrameBuffer::new(), false, String::new())
    }
}

/// Implements cursive::view::View for Display to enable drawing it
/// as a View out of the box.
impl View for Display {
    fn draw(&self, printer: &Printer) {
        printer.with_color(
            ColorStyle::new(Color::Light(BaseColor::White), Color::Dark(BaseColor::Black)),
            |printer| {
                for row in 0..TERMINAL_ROWS {
                    let line: String = (0..FrameBuffer::WIDTH).map(|x| self.cell(x, row)).collect();
                    printer.print((0, row), &line);
                }
            },
        );

        let sound = if self.sound { "♪" } else { " " };
        printer.print((0, TERMINAL_ROWS), &format!("{} {}", sound, self.status));
    }

    fn required_size(&mut self, _: Vec2) -> Vec2 {
        Vec2::new(FrameBuffer::WIDTH, TERMINAL_ROWS + 1)
    }
}

fn status_text(state: &ExecutionState) -> String {
    match state {
        ExecutionState::Running => "running".to_string(),
        ExecutionState::AwaitingKey => "waiting for key".to_string(),
        ExecutionState::Faulted(error) => format!("halted: {}", error),
    }
}

impl ChipWithCursiveDisplay for Chip8 {
    fn update_ui(&mut self, gfx_sink: &CbSink) -> bool {
        if !self.take_draw_flag() {
            return true;
        }

        let display = Display::new(
            *self.framebuffer(),
            self.sound_active(),
            status_text(&self.execution_state()),
        );
        gfx_sink
            .send(Box::new(move |s: &mut Cursive| {
                s.pop_layer();
                s.add_layer(display);
            }))
            .is_ok()
    }
}

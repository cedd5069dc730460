use crate::machine::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crossterm::cursor;
use crossterm::execute;
use log::debug;
use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders, Paragraph};
use tui::Terminal;

/// Display is used by the driver to put frames on the screen. It should
/// abstract the implementation details, so a variety of kinds of screen would
/// work.
pub trait Display {
    /// wipe whatever was on the output before the first frame
    fn clear(&mut self) -> Result<(), io::Error>;

    /// draw one frame of shades, with a line of text under it
    fn draw(&mut self, screen: &[u8], hint: &str) -> Result<(), io::Error>;
}

// width and height of the machine screen, in pixels
struct Resolution(usize, usize);

impl Resolution {
    fn pixel_count(&self) -> usize {
        self.0 * self.1
    }

    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.0 - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.1 - 1) as f64, 0.0]
    }

    /// x, y coords of every pixel of one shade, suitable for a TUI canvas
    fn points_of_shade<'a>(
        &self,
        data: &'a [u8],
        shade: u8,
    ) -> impl std::iter::Iterator<Item = (f64, f64)> + 'a {
        let mut count = self.pixel_count().min(data.len());
        let w = self.0;
        std::iter::from_fn(move || {
            while count > 0 {
                count -= 1;
                if data[count] == shade {
                    return Some((
                        (count % w) as f64,        // x
                        -1.0 * (count / w) as f64, // y
                    ));
                }
            }
            None
        })
    }
}

// darkest shade (3) is left as the background
const SHADE_COLOURS: [(u8, Color); 3] = [(0, Color::White), (1, Color::Gray), (2, Color::DarkGray)];

/// four-shade display in a terminal, rendered using TUI and crossterm
pub struct TermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    resolution: Resolution,
    title: String,
}

impl TermDisplay {
    pub fn new(title: &str) -> Result<TermDisplay, io::Error> {
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;
        terminal.hide_cursor()?;
        Ok(TermDisplay {
            terminal,
            resolution: Resolution(SCREEN_WIDTH, SCREEN_HEIGHT),
            title: title.to_string(),
        })
    }
}

impl Drop for TermDisplay {
    fn drop(&mut self) {
        if let Err(e) = execute!(io::stdout(), cursor::Show) {
            debug!("couldn't show the cursor again: {}", e);
        }
    }
}

impl Display for TermDisplay {
    fn clear(&mut self) -> Result<(), io::Error> {
        self.terminal.clear()
    }

    fn draw(&mut self, screen: &[u8], hint: &str) -> Result<(), io::Error> {
        assert_eq!(
            screen.len(),
            self.resolution.pixel_count(),
            "TermDisplay must have correct-sized data to draw"
        );

        let resolution = &self.resolution;
        let title = self.title.as_str();
        self.terminal.draw(|f| {
            // braille packs 2x4 pixels into each cell
            let area = f.size();
            let size = Rect::new(
                0,
                0,
                (2 + resolution.0 as u16 / 2).min(area.width),
                (2 + resolution.1 as u16 / 4).min(area.height.saturating_sub(1)),
            );

            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title(title)
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(resolution.x_bounds())
                .y_bounds(resolution.y_bounds())
                .marker(Marker::Braille)
                .paint(|ctx| {
                    for (shade, colour) in SHADE_COLOURS {
                        ctx.draw(&Points {
                            coords: &resolution.points_of_shade(screen, shade).collect::<Vec<_>>(),
                            color: colour,
                        });
                    }
                });
            f.render_widget(canvas, size);

            if area.height > size.height {
                let hint_area = Rect::new(0, size.height, area.width, 1);
                f.render_widget(Paragraph::new(hint), hint_area);
            }
        })?;
        Ok(())
    }
}

/// useful for testing non-display routines
#[derive(Default)]
pub struct DummyDisplay {
    pub clears: usize,
    pub frames: usize,
    pub last_hint: String,
    pub last_screen: Vec<u8>,
}

impl DummyDisplay {
    pub fn new() -> DummyDisplay {
        DummyDisplay::default()
    }
}

impl Display for DummyDisplay {
    fn clear(&mut self) -> Result<(), io::Error> {
        self.clears += 1;
        Ok(())
    }

    fn draw(&mut self, screen: &[u8], hint: &str) -> Result<(), io::Error> {
        self.frames += 1;
        self.last_hint = hint.to_string();
        self.last_screen = screen.to_vec();
        Ok(())
    }
}

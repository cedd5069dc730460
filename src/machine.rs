use crate::latch::ButtonLatch;
use anyhow::{bail, Context};
use std::fs::File;
use std::io;
use std::path::Path;

/// native clock of the DMG, in clock units per real second
pub const CPU_CLOCK_FREQUENCY: u64 = 4_194_304;

/// LCD resolution
pub const SCREEN_WIDTH: usize = 160;
pub const SCREEN_HEIGHT: usize = 144;

/// clock units the LCD takes to draw one whole frame, vblank included
pub const TICKS_PER_LCD_FRAME: u64 = 70_224;

/// The joypad buttons a machine understands. Quitting is not one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    A,
    B,
    Start,
    Select,
    Up,
    Down,
    Left,
    Right,
}

impl Button {
    pub const ALL: [Button; 8] = [
        Button::A,
        Button::B,
        Button::Start,
        Button::Select,
        Button::Up,
        Button::Down,
        Button::Left,
        Button::Right,
    ];
}

/// Machine is what the driver paces. It is built once from a cartridge and
/// then only ever stepped and looked at.
pub trait Machine {
    /// advance one clock unit, with `joypad` holding the buttons asserted for
    /// this frame. an error means the machine state is unusable
    fn step(&mut self, joypad: &ButtonLatch) -> anyhow::Result<()>;

    /// one shade (0 lightest ..= 3 darkest) per pixel, row major,
    /// SCREEN_WIDTH * SCREEN_HEIGHT long
    fn screen(&self) -> &[u8];
}

// cartridge header layout
const TITLE_START: usize = 0x0134;
const TITLE_END: usize = 0x0144;

/// An immutable ROM image.
#[derive(Debug, Clone)]
pub struct Cartridge {
    rom: Vec<u8>,
}

impl Cartridge {
    /// read the whole ROM image from a file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut f = File::open(path)
            .with_context(|| format!("Could not open ROM file \"{}\"", path.display()))?;
        Self::from_reader(&mut f)
            .with_context(|| format!("Could not open ROM file \"{}\"", path.display()))
    }

    pub fn from_reader(reader: &mut impl io::Read) -> anyhow::Result<Self> {
        let mut rom = Vec::new();
        reader.read_to_end(&mut rom)?;
        Self::from_bytes(rom)
    }

    pub fn from_bytes(rom: Vec<u8>) -> anyhow::Result<Self> {
        if rom.is_empty() {
            bail!("ROM image is empty");
        }
        Ok(Cartridge { rom })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.rom
    }

    /// the game title from the header, if there is a readable one
    pub fn title(&self) -> Option<String> {
        let raw = self.rom.get(TITLE_START..TITLE_END)?;
        let title: String = raw
            .iter()
            .take_while(|b| **b != 0)
            .filter(|b| b.is_ascii_graphic() || **b == b' ')
            .map(|b| *b as char)
            .collect();
        let title = title.trim();
        if title.is_empty() {
            None
        } else {
            Some(title.to_string())
        }
    }
}

const TILE_SIZE: usize = 8;
const TILE_BYTES: usize = 16;
const TILES_ACROSS: usize = SCREEN_WIDTH / TILE_SIZE;
const TILES_DOWN: usize = SCREEN_HEIGHT / TILE_SIZE;

/// Stand-in machine that shows the cartridge as 2bpp tile data.
///
/// It doesn't execute anything. It keeps time in clock units like a real
/// core would and presents a new picture once per LCD frame. Up/Down scroll
/// a tile row, Left/Right scroll a page, and any of the action buttons
/// inverts the palette for that LCD frame.
pub struct TileViewer {
    cartridge: Cartridge,
    screen: Box<[u8]>,
    ticks: u64,
    top_row: usize,
    inverted: bool,
    // buttons seen at any point during the current LCD frame
    seen: ButtonLatch,
}

impl TileViewer {
    pub fn new(cartridge: Cartridge) -> Self {
        let mut v = TileViewer {
            cartridge,
            screen: vec![0u8; SCREEN_WIDTH * SCREEN_HEIGHT].into_boxed_slice(),
            ticks: 0,
            top_row: 0,
            inverted: false,
            seen: ButtonLatch::new(),
        };
        v.present();
        v
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// first tile row on screen
    pub fn top_row(&self) -> usize {
        self.top_row
    }

    fn tile_rows(&self) -> usize {
        let row_bytes = TILE_BYTES * TILES_ACROSS;
        ((self.cartridge.bytes().len() + row_bytes - 1) / row_bytes).max(1)
    }

    fn vblank(&mut self) {
        let last_row = self.tile_rows() - 1;
        if self.seen.is_pressed(Button::Up) {
            self.top_row = self.top_row.saturating_sub(1);
        }
        if self.seen.is_pressed(Button::Down) {
            self.top_row = (self.top_row + 1).min(last_row);
        }
        if self.seen.is_pressed(Button::Left) {
            self.top_row = self.top_row.saturating_sub(TILES_DOWN);
        }
        if self.seen.is_pressed(Button::Right) {
            self.top_row = (self.top_row + TILES_DOWN).min(last_row);
        }
        self.inverted = [Button::A, Button::B, Button::Start, Button::Select]
            .iter()
            .any(|b| self.seen.is_pressed(*b));
        self.seen.clear();
        self.present();
    }

    fn present(&mut self) {
        let rom = self.cartridge.bytes();
        for ty in 0..TILES_DOWN {
            for tx in 0..TILES_ACROSS {
                let base = ((self.top_row + ty) * TILES_ACROSS + tx) * TILE_BYTES;
                for row in 0..TILE_SIZE {
                    // each tile row is a low bitplane byte then a high one
                    let lo = rom.get(base + 2 * row).copied().unwrap_or(0);
                    let hi = rom.get(base + 2 * row + 1).copied().unwrap_or(0);
                    for col in 0..TILE_SIZE {
                        let bit = 7 - col;
                        let shade = (((hi >> bit) & 1) << 1) | ((lo >> bit) & 1);
                        let px = (ty * TILE_SIZE + row) * SCREEN_WIDTH + tx * TILE_SIZE + col;
                        self.screen[px] = if self.inverted { 3 - shade } else { shade };
                    }
                }
            }
        }
    }
}

impl Machine for TileViewer {
    fn step(&mut self, joypad: &ButtonLatch) -> anyhow::Result<()> {
        if !joypad.is_empty() {
            for b in joypad.iter() {
                self.seen.press(b);
            }
        }
        self.ticks += 1;
        if self.ticks % TICKS_PER_LCD_FRAME == 0 {
            self.vblank();
        }
        Ok(())
    }

    fn screen(&self) -> &[u8] {
        &self.screen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rom_with_title(title: &[u8]) -> Vec<u8> {
        let mut rom = vec![0u8; 0x8000];
        rom[TITLE_START..TITLE_START + title.len()].copy_from_slice(title);
        rom
    }

    fn run_lcd_frame(m: &mut TileViewer, joypad: &ButtonLatch) -> anyhow::Result<()> {
        for _ in 0..TICKS_PER_LCD_FRAME {
            m.step(joypad)?;
        }
        Ok(())
    }

    #[test]
    fn test_empty_rom_rejected() {
        assert!(Cartridge::from_bytes(Vec::new()).is_err());
    }

    #[test]
    fn test_missing_rom_file_rejected() {
        let err = Cartridge::load(Path::new("/definitely/not/a/rom.gb")).unwrap_err();
        assert!(format!("{}", err).starts_with("Could not open ROM file"));
    }

    #[test]
    fn test_rom_from_reader() -> anyhow::Result<()> {
        let mut src: &[u8] = &[0x00, 0xc3, 0x50, 0x01];
        let c = Cartridge::from_reader(&mut src)?;
        assert_eq!(c.bytes(), &[0x00, 0xc3, 0x50, 0x01]);
        Ok(())
    }

    #[test]
    fn test_title_read_from_header() -> anyhow::Result<()> {
        let c = Cartridge::from_bytes(rom_with_title(b"TETRIS"))?;
        assert_eq!(c.title().as_deref(), Some("TETRIS"));
        Ok(())
    }

    #[test]
    fn test_no_title_in_short_or_blank_rom() -> anyhow::Result<()> {
        assert_eq!(Cartridge::from_bytes(vec![1, 2, 3])?.title(), None);
        assert_eq!(Cartridge::from_bytes(vec![0; 0x8000])?.title(), None);
        Ok(())
    }

    #[test]
    fn test_tile_decoding() -> anyhow::Result<()> {
        // first row of tile 0: lo = 0b1010_0000, hi = 0b1100_0000
        let mut rom = vec![0u8; 0x8000];
        rom[0] = 0b1010_0000;
        rom[1] = 0b1100_0000;
        let v = TileViewer::new(Cartridge::from_bytes(rom)?);
        assert_eq!(&v.screen()[..4], &[3, 2, 1, 0]);
        assert_eq!(v.screen().len(), SCREEN_WIDTH * SCREEN_HEIGHT);
        Ok(())
    }

    #[test]
    fn test_short_rom_pads_with_blank_tiles() -> anyhow::Result<()> {
        let v = TileViewer::new(Cartridge::from_bytes(vec![0xff, 0xff])?);
        assert_eq!(&v.screen()[..8], &[3; 8]);
        assert!(v.screen()[8..].iter().all(|s| *s == 0));
        Ok(())
    }

    #[test]
    fn test_step_counts_ticks() -> anyhow::Result<()> {
        let mut v = TileViewer::new(Cartridge::from_bytes(vec![0; 0x8000])?);
        let joypad = ButtonLatch::new();
        for _ in 0..10 {
            v.step(&joypad)?;
        }
        assert_eq!(v.ticks(), 10);
        Ok(())
    }

    #[test]
    fn test_down_scrolls_at_vblank() -> anyhow::Result<()> {
        let mut v = TileViewer::new(Cartridge::from_bytes(vec![0; 0x8000])?);
        let mut joypad = ButtonLatch::new();
        joypad.press(Button::Down);
        // a single step inside the LCD frame is enough to be seen
        v.step(&joypad)?;
        assert_eq!(v.top_row(), 0);
        run_lcd_frame(&mut v, &ButtonLatch::new())?;
        assert_eq!(v.top_row(), 1);
        run_lcd_frame(&mut v, &ButtonLatch::new())?;
        assert_eq!(v.top_row(), 1);
        Ok(())
    }

    #[test]
    fn test_scroll_is_clamped() -> anyhow::Result<()> {
        // 0x8000 bytes / 320 bytes per tile row = 103 rows (last partial)
        let mut v = TileViewer::new(Cartridge::from_bytes(vec![0; 0x8000])?);
        let mut joypad = ButtonLatch::new();
        joypad.press(Button::Up);
        run_lcd_frame(&mut v, &joypad)?;
        assert_eq!(v.top_row(), 0);
        let mut joypad = ButtonLatch::new();
        joypad.press(Button::Right);
        for _ in 0..10 {
            run_lcd_frame(&mut v, &joypad)?;
        }
        assert_eq!(v.top_row(), 102);
        Ok(())
    }

    #[test]
    fn test_action_button_inverts_for_one_lcd_frame() -> anyhow::Result<()> {
        let mut v = TileViewer::new(Cartridge::from_bytes(vec![0; 0x8000])?);
        let mut joypad = ButtonLatch::new();
        joypad.press(Button::A);
        run_lcd_frame(&mut v, &joypad)?;
        assert!(v.screen().iter().all(|s| *s == 3));
        run_lcd_frame(&mut v, &ButtonLatch::new())?;
        assert!(v.screen().iter().all(|s| *s == 0));
        Ok(())
    }
}

use anyhow::{anyhow, Result};
use embedded_graphics::{
    mono_font::{ascii::FONT_10X20, MonoTextStyleBuilder},
    pixelcolor::Rgb565,
    prelude::*,
    text::Text,
};
use esp_idf_svc::hal::{
    delay::Ets,
    gpio::{AnyOutputPin, Output, PinDriver},
    spi::{SpiDeviceDriver, SpiDriver},
};
use log::*;
use mipidsi::{
    interface::SpiInterface,
    models::ILI9342CRgb565,
    options::{ColorInversion, ColorOrder},
    Builder, Display,
};

use control::DisplaySink;

const DISPLAY_WIDTH: u16 = 320;
const DISPLAY_HEIGHT: u16 = 240;
const LINE_HEIGHT: i32 = 24;
const DOT_ADVANCE: i32 = 10;
// Readings start mid-screen, below the boot log area
const READING_ORIGIN_Y: i32 = 100;

// Amber alarm background, rgb565 from (200, 120, 0)
const ALARM_BG: Rgb565 = Rgb565::new(25, 30, 0);

type LcdSpi<'d> = SpiDeviceDriver<'d, &'d SpiDriver<'d>>;
type Lcd<'d> = Display<
    SpiInterface<'static, LcdSpi<'d>, PinDriver<'d, AnyOutputPin, Output>>,
    ILI9342CRgb565,
    PinDriver<'d, AnyOutputPin, Output>,
>;

/// The local LCD. Rendering is fire-and-forget: draw failures are logged
/// and never surface into the polling loop.
pub struct Panel<'d> {
    display: Lcd<'d>,
    _backlight: PinDriver<'d, AnyOutputPin, Output>,
    cursor_y: i32,
    dot_x: i32,
}

impl<'d> Panel<'d> {
    pub fn new(
        spi: LcdSpi<'d>,
        dc: AnyOutputPin,
        rst: AnyOutputPin,
        backlight: AnyOutputPin,
    ) -> Result<Panel<'d>> {
        let dc = PinDriver::output(dc)?;
        let rst = PinDriver::output(rst)?;
        let mut backlight = PinDriver::output(backlight)?;
        backlight.set_high()?;

        let buffer = Box::leak(Box::new([0u8; 512]));
        let di = SpiInterface::new(spi, dc, buffer);
        let mut display = Builder::new(ILI9342CRgb565, di)
            .reset_pin(rst)
            .display_size(DISPLAY_WIDTH, DISPLAY_HEIGHT)
            .color_order(ColorOrder::Bgr)
            .invert_colors(ColorInversion::Inverted)
            .init(&mut Ets)
            .map_err(|err| anyhow!("Failed to initialize display: {err:?}"))?;
        display
            .clear(Rgb565::BLACK)
            .map_err(|err| anyhow!("Failed to clear display: {err:?}"))?;

        Ok(Panel {
            display,
            _backlight: backlight,
            cursor_y: LINE_HEIGHT,
            dot_x: 0,
        })
    }

    fn draw_text(&mut self, text: &str, origin: Point, bg: Rgb565) {
        let style = MonoTextStyleBuilder::new()
            .font(&FONT_10X20)
            .text_color(Rgb565::WHITE)
            .background_color(bg)
            .build();
        if let Err(err) = Text::new(text, origin, style).draw(&mut self.display) {
            warn!("Display draw failed: {err:?}");
        }
    }

    /// Writes one line of boot progress text and advances the cursor.
    pub fn print_line(&mut self, text: &str) {
        if self.dot_x > 0 {
            self.cursor_y += LINE_HEIGHT;
            self.dot_x = 0;
        }
        self.draw_text(text, Point::new(0, self.cursor_y), Rgb565::BLACK);
        self.cursor_y += LINE_HEIGHT;
    }

    /// Liveness indicator while waiting on the network association.
    pub fn print_progress_dot(&mut self) {
        self.draw_text(".", Point::new(self.dot_x, self.cursor_y), Rgb565::BLACK);
        self.dot_x += DOT_ADVANCE;
        if self.dot_x >= DISPLAY_WIDTH as i32 {
            self.dot_x = 0;
            self.cursor_y += LINE_HEIGHT;
        }
    }
}

impl DisplaySink for Panel<'_> {
    fn show_reading(&mut self, co2: u16, tvoc: u16, alarm: bool) {
        let bg = if alarm { ALARM_BG } else { Rgb565::BLACK };
        if let Err(err) = self.display.clear(bg) {
            warn!("Display clear failed: {err:?}");
            return;
        }
        self.draw_text(
            &format!("CO2  : {co2} ppm"),
            Point::new(0, READING_ORIGIN_Y),
            bg,
        );
        self.draw_text(
            &format!("TVOC : {tvoc} ppb"),
            Point::new(0, READING_ORIGIN_Y + LINE_HEIGHT),
            bg,
        );
        // The boot log area is gone after the first full-screen refresh
        self.cursor_y = LINE_HEIGHT;
        self.dot_x = 0;
    }
}

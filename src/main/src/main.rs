use std::time::Instant;

use anyhow::Result;
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    fs::fatfs::{Fatfs, MountedFatfs},
    hal::{
        delay::FreeRtos,
        gpio::{AnyIOPin, AnyOutputPin},
        i2c::{I2cConfig, I2cDriver},
        prelude::{FromValueType, Peripherals},
        sd::{spi::SdSpiHostDriver, SdCardConfiguration, SdCardDriver},
        spi::{config::Config as SpiConfig, SpiDeviceDriver, SpiDriver, SpiDriverConfig},
    },
    io::vfs::MountedEventfs,
};
use log::*;

mod ccs811;
mod config;
mod display;
mod notify;
mod wifi;

use ccs811::Ccs811;
use control::Monitor;
use display::Panel;
use notify::LineNotifier;

const WIFI_CONF_PATH: &str = "/sdcard/wifi.txt";
const POLL_INTERVAL_MS: u32 = 5_000;

type SdStorage<'d> = MountedFatfs<Fatfs<SdCardDriver<SdSpiHostDriver<'d, &'d SpiDriver<'d>>>>>;

/// Deliberate halt-and-report: the fatal boot failures leave the device
/// with nothing useful to do, so park the task instead of panicking.
fn halt() -> ! {
    loop {
        FreeRtos::delay_ms(1_000);
    }
}

fn mount_storage<'d>(spi: &'d SpiDriver<'d>, cs: AnyOutputPin) -> Result<SdStorage<'d>> {
    let host = SdSpiHostDriver::new(
        spi,
        Some(cs),
        AnyIOPin::none(),
        AnyIOPin::none(),
        AnyIOPin::none(),
        #[cfg(not(any(
            esp_idf_version_major = "4",
            all(esp_idf_version_major = "5", esp_idf_version_minor = "0"),
            all(esp_idf_version_major = "5", esp_idf_version_minor = "1"),
        )))]
        None,
    )?;
    let card = SdCardDriver::new_spi(host, &SdCardConfiguration::new())?;
    let mounted = MountedFatfs::mount(Fatfs::new_sdcard(0, card)?, "/sdcard", 4)?;
    Ok(mounted)
}

fn main() -> Result<()> {
    // It is necessary to call this function once. Otherwise some patches to the runtime
    // implemented by esp-idf-sys might not link properly. See https://github.com/esp-rs/esp-idf-template/issues/71
    esp_idf_svc::sys::link_patches();

    // Bind the log crate to the ESP Logging facilities
    esp_idf_svc::log::EspLogger::initialize_default();

    let peripherals = Peripherals::take().unwrap();
    let sysloop = EspSystemEventLoop::take()?;
    let _eventfs = MountedEventfs::mount(5)?;

    // LCD and SD card share the SPI bus on separate chip selects
    let spi_driver = SpiDriver::new(
        peripherals.spi3,
        peripherals.pins.gpio18,
        peripherals.pins.gpio23,
        Some(peripherals.pins.gpio19),
        &SpiDriverConfig::new(),
    )?;

    let lcd_spi = SpiDeviceDriver::new(
        &spi_driver,
        Some(peripherals.pins.gpio14),
        &SpiConfig::new().baudrate(26.MHz().into()),
    )?;
    let mut panel = Panel::new(
        lcd_spi,
        peripherals.pins.gpio27.into(),
        peripherals.pins.gpio33.into(),
        peripherals.pins.gpio32.into(),
    )?;

    let _storage = match mount_storage(&spi_driver, peripherals.pins.gpio4.into()) {
        Ok(storage) => storage,
        Err(err) => {
            error!("SD Card Mount Failed: {err:?}");
            panel.print_line("SD Card Mount Failed");
            halt();
        }
    };

    let boot_config = match config::load(WIFI_CONF_PATH) {
        Ok(boot_config) => boot_config,
        Err(err) => {
            error!("{err}");
            panel.print_line("Failed to read wifi.txt");
            halt();
        }
    };

    let _wifi = wifi::connect(peripherals.modem, sysloop, &boot_config, &mut panel)?;

    let i2c_config = I2cConfig::new().baudrate(100.kHz().into());
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio21,
        peripherals.pins.gpio22,
        &i2c_config,
    )?;
    let mut sensor = Ccs811::new(i2c, ccs811::CCS811_ADDR);
    if let Err(err) = sensor.begin() {
        error!("CCS811 error. Please check wiring. Freezing...: {err:?}");
        panel.print_line("CCS811 error. Please check wiring. Freezing...");
        halt();
    }

    let notifier = LineNotifier::new(boot_config.notify_host.clone());
    let mut monitor = Monitor::new(sensor, panel, notifier);

    let boot = Instant::now();
    info!("Entering monitoring loop");
    loop {
        monitor.poll_once(boot.elapsed().as_secs());
        FreeRtos::delay_ms(POLL_INTERVAL_MS);
    }
}

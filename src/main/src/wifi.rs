use anyhow::Result;
use esp_idf_svc::hal::{delay::FreeRtos, modem::WifiModemPeripheral, peripheral::Peripheral};
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi},
};
use log::*;

use control::BootConfig;

use crate::display::Panel;

const STATUS_POLL_INTERVAL_MS: u32 = 500;

/// Associates with the configured access point and blocks until the link
/// is up, drawing a progress dot on the panel per status poll. There is no
/// timeout and no abort path; a device that cannot connect has nothing
/// else to do.
pub fn connect<'d>(
    modem: impl Peripheral<P = impl WifiModemPeripheral + 'd> + 'd,
    sysloop: EspSystemEventLoop,
    config: &BootConfig,
    panel: &mut Panel<'_>,
) -> Result<EspWifi<'d>> {
    let mut wifi = EspWifi::new(modem, sysloop, None)?;

    if config.passphrase.is_empty() {
        wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid: config
                .ssid
                .as_str()
                .try_into()
                .expect("Could not parse SSID"),
            auth_method: AuthMethod::None,
            ..Default::default()
        }))?;
    } else {
        wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid: config
                .ssid
                .as_str()
                .try_into()
                .expect("Could not parse SSID into Wifi config"),
            password: config
                .passphrase
                .as_str()
                .try_into()
                .expect("Could not parse passphrase into Wifi config"),
            auth_method: AuthMethod::WPA2Personal,
            ..Default::default()
        }))?;
    }

    wifi.start()?;
    wifi.connect()?;

    loop {
        FreeRtos::delay_ms(STATUS_POLL_INTERVAL_MS);
        if wifi.is_up()? {
            break;
        }
        panel.print_progress_dot();
    }

    info!("Connected to wifi");
    let ip = wifi.sta_netif().get_ip_info()?.ip;
    info!("IP address = {ip}");
    panel.print_line("WiFi connected");
    panel.print_line(&format!("IP address = {ip}"));

    Ok(wifi)
}

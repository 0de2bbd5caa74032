use anyhow::{bail, Result};
use esp_idf_svc::hal::{delay, i2c::I2cDriver};
use log::*;

use control::{AirQualitySensor, ErrorRegister, SensorEvent};

/// Default I2C address (ADDR pin low; 0x5A with the pin high)
pub const CCS811_ADDR: u8 = 0x5B;

// Register map
const REG_STATUS: u8 = 0x00;
const REG_MEAS_MODE: u8 = 0x01;
const REG_ALG_RESULT_DATA: u8 = 0x02;
const REG_HW_ID: u8 = 0x20;
const REG_ERROR_ID: u8 = 0xE0;
const REG_APP_START: u8 = 0xF4;

const HW_ID_CODE: u8 = 0x81;
const STATUS_ERROR: u8 = 1 << 0;
const STATUS_DATA_READY: u8 = 1 << 3;
const STATUS_APP_VALID: u8 = 1 << 4;
// Constant power mode, one measurement per second
const DRIVE_MODE_1SEC: u8 = 0b0001_0000;
const ERROR_ID_COMM_FAILURE: u8 = 0xFF;

/// Thin register-level wrapper for the CCS811 gas sensor. Holds the last
/// latched algorithm results.
pub struct Ccs811<'d> {
    i2c: I2cDriver<'d>,
    address: u8,
    co2: u16,
    tvoc: u16,
}

impl<'d> Ccs811<'d> {
    pub fn new(i2c: I2cDriver<'d>, address: u8) -> Self {
        Self {
            i2c,
            address,
            co2: 0,
            tvoc: 0,
        }
    }

    /// Verifies the hardware id, starts the application firmware and
    /// selects the one-second drive mode.
    pub fn begin(&mut self) -> Result<()> {
        let mut hw_id = [0u8; 1];
        self.i2c
            .write_read(self.address, &[REG_HW_ID], &mut hw_id, delay::BLOCK)?;
        if hw_id[0] != HW_ID_CODE {
            bail!("unexpected CCS811 hardware id 0x{:02x}", hw_id[0]);
        }

        if self.status()? & STATUS_APP_VALID == 0 {
            bail!("CCS811 application firmware is not valid");
        }
        self.i2c
            .write(self.address, &[REG_APP_START], delay::BLOCK)?;
        self.i2c
            .write(self.address, &[REG_MEAS_MODE, DRIVE_MODE_1SEC], delay::BLOCK)?;

        Ok(())
    }

    fn status(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.address, &[REG_STATUS], &mut buf, delay::BLOCK)?;
        Ok(buf[0])
    }

    /// True when fresh algorithm results are waiting. A bus error reads as
    /// "no data"; the status-error path picks it up on the next poll.
    pub fn data_available(&mut self) -> bool {
        self.status()
            .map(|status| status & STATUS_DATA_READY != 0)
            .unwrap_or(false)
    }

    pub fn check_for_status_error(&mut self) -> bool {
        self.status()
            .map(|status| status & STATUS_ERROR != 0)
            .unwrap_or(false)
    }

    /// Latches the current eCO2/TVOC readings. On a bus error the previous
    /// values are kept.
    pub fn read_algorithm_results(&mut self) {
        let mut buf = [0u8; 4];
        match self
            .i2c
            .write_read(self.address, &[REG_ALG_RESULT_DATA], &mut buf, delay::BLOCK)
        {
            Ok(()) => {
                self.co2 = u16::from_be_bytes([buf[0], buf[1]]);
                self.tvoc = u16::from_be_bytes([buf[2], buf[3]]);
            }
            Err(err) => warn!("Failed to read algorithm results: {err}"),
        }
    }

    pub fn co2(&self) -> u16 {
        self.co2
    }

    pub fn tvoc(&self) -> u16 {
        self.tvoc
    }

    /// Raw ERROR_ID register; 0xFF stands in for a failed register read,
    /// the same sentinel the decoder distinguishes.
    pub fn error_register(&mut self) -> u8 {
        let mut buf = [0u8; 1];
        match self
            .i2c
            .write_read(self.address, &[REG_ERROR_ID], &mut buf, delay::BLOCK)
        {
            Ok(()) => buf[0],
            Err(_) => ERROR_ID_COMM_FAILURE,
        }
    }
}

impl AirQualitySensor for Ccs811<'_> {
    fn poll(&mut self) -> SensorEvent {
        if self.data_available() {
            self.read_algorithm_results();
            SensorEvent::Reading {
                co2: self.co2(),
                tvoc: self.tvoc(),
            }
        } else if self.check_for_status_error() {
            SensorEvent::Fault(ErrorRegister::decode(self.error_register()))
        } else {
            SensorEvent::Idle
        }
    }
}

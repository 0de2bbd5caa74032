use core::fmt;

// CCS811 ERROR_ID bit positions
const HEATER_SUPPLY: u8 = 1 << 5;
const HEATER_FAULT: u8 = 1 << 4;
const MAX_RESISTANCE: u8 = 1 << 3;
const MEAS_MODE_INVALID: u8 = 1 << 2;
const READ_REG_INVALID: u8 = 1 << 1;
const MSG_INVALID: u8 = 1 << 0;

/// Decoded CCS811 ERROR_ID register.
///
/// The driver returns `0xFF` when the register itself could not be read
/// over the bus; any other value is a set of independent fault flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorRegister {
    CommFailure,
    Faults(ErrorFlags),
}

impl ErrorRegister {
    pub fn decode(raw: u8) -> ErrorRegister {
        if raw == 0xFF {
            ErrorRegister::CommFailure
        } else {
            ErrorRegister::Faults(ErrorFlags(raw))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorFlags(u8);

impl ErrorFlags {
    pub fn heater_supply(&self) -> bool {
        self.0 & HEATER_SUPPLY != 0
    }

    pub fn heater_fault(&self) -> bool {
        self.0 & HEATER_FAULT != 0
    }

    pub fn max_resistance(&self) -> bool {
        self.0 & MAX_RESISTANCE != 0
    }

    pub fn meas_mode_invalid(&self) -> bool {
        self.0 & MEAS_MODE_INVALID != 0
    }

    pub fn read_reg_invalid(&self) -> bool {
        self.0 & READ_REG_INVALID != 0
    }

    pub fn msg_invalid(&self) -> bool {
        self.0 & MSG_INVALID != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 & 0x3F == 0
    }
}

impl fmt::Display for ErrorFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (HEATER_SUPPLY, "HeaterSupply"),
            (HEATER_FAULT, "HeaterFault"),
            (MAX_RESISTANCE, "MaxResistance"),
            (MEAS_MODE_INVALID, "MeasModeInvalid"),
            (READ_REG_INVALID, "ReadRegInvalid"),
            (MSG_INVALID, "MsgInvalid"),
        ];
        let mut first = true;
        for (bit, name) in names {
            if self.0 & bit != 0 {
                if !first {
                    f.write_str(" ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    #[test]
    fn test_decode_flags() {
        let decoded = ErrorRegister::decode(0b0010_0100);
        let flags = match decoded {
            ErrorRegister::Faults(flags) => flags,
            other => panic!("expected fault flags, got {:?}", other),
        };
        assert!(flags.heater_supply());
        assert!(flags.meas_mode_invalid());
        assert!(!flags.heater_fault());
        assert!(!flags.max_resistance());
        assert!(!flags.read_reg_invalid());
        assert!(!flags.msg_invalid());
    }

    #[test]
    fn test_decode_max_resistance_and_read_reg() {
        let decoded = ErrorRegister::decode((1 << 3) | (1 << 1));
        let flags = match decoded {
            ErrorRegister::Faults(flags) => flags,
            other => panic!("expected fault flags, got {:?}", other),
        };
        assert!(flags.max_resistance());
        assert!(flags.read_reg_invalid());
        assert!(!flags.heater_supply());
        assert!(!flags.heater_fault());
        assert!(!flags.meas_mode_invalid());
        assert!(!flags.msg_invalid());
    }

    #[test]
    fn test_decode_comm_failure_sentinel() {
        assert_eq!(ErrorRegister::decode(0xFF), ErrorRegister::CommFailure);
    }

    #[test]
    fn test_decode_clean_register() {
        match ErrorRegister::decode(0x00) {
            ErrorRegister::Faults(flags) => assert!(flags.is_empty()),
            other => panic!("expected empty fault flags, got {:?}", other),
        }
    }

    #[test]
    fn test_display_lists_set_flags() {
        let flags = match ErrorRegister::decode(0b0011_0000) {
            ErrorRegister::Faults(flags) => flags,
            other => panic!("expected fault flags, got {:?}", other),
        };
        assert_eq!(format!("{}", flags), "HeaterSupply HeaterFault");
    }
}

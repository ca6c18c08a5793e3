//! Driver for the Grove Two Sound I2C sound sensor
//!
//! The sensor sleeps between transfers, so every bus access is preceded by a
//! short pulse on a dedicated wake pin. [`interface::i2c::I2cInterface`]
//! takes care of that; [`GroveTwoSound`] turns the device's command set into
//! typed calls.
//!
//! ```ignore
//! let iface = I2cInterface::new(i2c, wake_pin, delay);
//! let mut sound = GroveTwoSound::create(iface);
//!
//! sound.set_threshold_0(DEFAULT_THRESHOLD_0)?;
//! sound.set_threshold_1(DEFAULT_THRESHOLD_1)?;
//! loop {
//!     sound.run()?;
//!     if sound.is(EventLevel::AboveThreshold1) {
//!         // loud
//!     }
//! }
//! ```

#![cfg_attr(not(test), no_std)]
// #![deny(missing_debug_implementations)]
#![deny(warnings)]
#![allow(missing_docs)]
#![deny(missing_copy_implementations)]
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]
#![deny(unsafe_code)]
#![deny(unstable_features)]
#![deny(unused_import_braces)]
#![deny(unused_qualifications)]

extern crate embedded_hal as hal;

use bit_field::BitField;

use crate::interface::SoundInterface;

pub mod interface;


/// Factory I2C address of the sensor
pub const DEFAULT_ADDRESS: u8 = 0x06;
/// Vendor ID reported by the sensor
pub const VENDOR_ID: u16 = 0x2886;
/// Product ID reported by the sensor
pub const PRODUCT_ID: u16 = 0x0006;
/// Power-on value of threshold 0
pub const DEFAULT_THRESHOLD_0: u16 = 50;
/// Power-on value of threshold 1
pub const DEFAULT_THRESHOLD_1: u16 = 200;

/// Errors in this crate
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<CommE, PinE> {
    /// Communication error
    Comm(CommE),
    /// Wake pin setting error
    Pin(PinE),
}

/// Threshold slots of the sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Threshold {
    /// Boundary between `BelowThreshold0` and `BetweenThresholds`
    Level0 = 0,
    /// Boundary between `BetweenThresholds` and `AboveThreshold1`
    Level1 = 1,
}

impl Threshold {
    pub fn default_value(self) -> u16 {
        match self {
            Threshold::Level0 => DEFAULT_THRESHOLD_0,
            Threshold::Level1 => DEFAULT_THRESHOLD_1,
        }
    }
}

/// Sound level relative to the two thresholds, as reported by the sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventLevel {
    /// sound < threshold 0
    BelowThreshold0,
    /// threshold 0 <= sound < threshold 1
    BetweenThresholds,
    /// sound >= threshold 1
    AboveThreshold1,
    /// Event code the protocol does not define
    Unknown(u8),
}

impl EventLevel {
    /// The event code as sent on the wire
    pub fn raw(self) -> u8 {
        match self {
            EventLevel::BelowThreshold0 => 1,
            EventLevel::BetweenThresholds => 2,
            EventLevel::AboveThreshold1 => 3,
            EventLevel::Unknown(raw) => raw,
        }
    }
}

impl From<u8> for EventLevel {
    fn from(val: u8) -> EventLevel {
        match val {
            1 => EventLevel::BelowThreshold0,
            2 => EventLevel::BetweenThresholds,
            3 => EventLevel::AboveThreshold1,
            raw => EventLevel::Unknown(raw),
        }
    }
}

/// Vendor and product ID, read in one transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceId {
    pub vendor_id: u16,
    pub product_id: u16,
}

impl DeviceId {
    /// Whether the IDs are the ones a Grove Two Sound reports
    pub fn is_grove_two_sound(&self) -> bool {
        self.vendor_id == VENDOR_ID && self.product_id == PRODUCT_ID
    }
}

/// Commands available for the Sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Read vendor and product ID (4 byte response)
    GetDeviceId,
    /// Read the event status (4 byte response, only the first is used)
    GetEvent,
    /// Read the raw sound value (2 byte response)
    GetSoundValue,
    /// Store a threshold level
    SetThreshold { slot: Threshold, value: u16 },
    /// Turn on the indicator LED flash mode
    LedOn,
    /// Turn off the indicator LED flash mode
    LedOff,
    /// Let the device go to sleep on its own
    AutoSleepOn,
    /// Keep the device awake (power-on default)
    AutoSleepOff,
    /// Move the device to a new I2C address
    SetAddress(u8),
    /// Move the device back to its factory I2C address
    ResetAddress,
}

impl Command {
    /// Longest encoded command, `SetThreshold`
    pub const MAX_LEN: usize = 4;

    pub fn opcode(self) -> u8 {
        match self {
            Command::GetDeviceId => 0x00,
            Command::GetEvent => 0x01,
            Command::GetSoundValue => 0x02,
            Command::SetThreshold { .. } => 0x03,
            Command::LedOn => 0xB0,
            Command::LedOff => 0xB1,
            Command::AutoSleepOn => 0xB2,
            Command::AutoSleepOff => 0xB3,
            Command::SetAddress(_) => 0xC0,
            Command::ResetAddress => 0xC1,
        }
    }

    /// Number of bytes the device answers with, 0 for write-only commands
    pub fn response_len(self) -> usize {
        match self {
            Command::GetDeviceId | Command::GetEvent => 4,
            Command::GetSoundValue => 2,
            _ => 0,
        }
    }

    /// Serialize into a fixed size buffer and the real length for sending
    pub fn encode(self) -> ([u8; Command::MAX_LEN], usize) {
        let opcode = self.opcode();
        match self {
            Command::SetThreshold { slot, value } => (
                [
                    opcode,
                    slot as u8,
                    value.get_bits(0..8) as u8,
                    value.get_bits(8..16) as u8,
                ],
                4,
            ),
            Command::SetAddress(address) => ([opcode, address, 0, 0], 2),
            _ => ([opcode, 0, 0, 0], 1),
        }
    }

    pub fn send<SI>(self, iface: &mut SI, address: u8) -> Result<(), SI::Error>
    where
        SI: SoundInterface,
    {
        let (data, len) = self.encode();
        if len == 1 {
            iface.send_byte(address, data[0])
        } else {
            iface.send_bytes(address, &data[..len])
        }
    }
}

fn le_u16(lo: u8, hi: u8) -> u16 {
    let mut value = 0u16;
    value.set_bits(0..8, u16::from(lo));
    value.set_bits(8..16, u16::from(hi));
    value
}

/// Grove Two Sound sensor bound to one I2C address
pub struct GroveTwoSound<SI> {
    iface: SI,
    address: u8,
    last_event: Option<EventLevel>,
}

impl<SI> GroveTwoSound<SI>
where
    SI: SoundInterface,
{
    /// Bind to the sensor at `address`. Does not touch the bus.
    pub fn new(iface: SI, address: u8) -> Self {
        Self {
            iface,
            address,
            last_event: None,
        }
    }

    /// Bind to the sensor at [`DEFAULT_ADDRESS`]
    pub fn create(iface: SI) -> Self {
        Self::new(iface, DEFAULT_ADDRESS)
    }

    /// Address all following commands go to
    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn release(self) -> SI {
        self.iface
    }

    fn command(&mut self, cmd: Command) -> Result<(), SI::Error> {
        cmd.send(&mut self.iface, self.address)
    }

    /// Send `cmd` and read back its response into `buf`
    fn query(&mut self, cmd: Command, buf: &mut [u8]) -> Result<(), SI::Error> {
        debug_assert_eq!(buf.len(), cmd.response_len());
        self.command(cmd)?;
        self.iface.receive_bytes(self.address, buf)
    }

    pub fn device_id(&mut self) -> Result<DeviceId, SI::Error> {
        let mut data = [0u8; 4];
        self.query(Command::GetDeviceId, &mut data)?;
        Ok(DeviceId {
            vendor_id: le_u16(data[0], data[1]),
            product_id: le_u16(data[2], data[3]),
        })
    }

    pub fn vendor_id(&mut self) -> Result<u16, SI::Error> {
        Ok(self.device_id()?.vendor_id)
    }

    pub fn product_id(&mut self) -> Result<u16, SI::Error> {
        Ok(self.device_id()?.product_id)
    }

    /// Move the device to `new_address`.
    ///
    /// The command goes to the current address; the handle follows the
    /// device only once the command was sent.
    pub fn change_address(&mut self, new_address: u8) -> Result<(), SI::Error> {
        self.command(Command::SetAddress(new_address))?;
        self.address = new_address;
        Ok(())
    }

    /// Ask the device to go back to its factory address.
    ///
    /// The handle keeps its current address: use [`GroveTwoSound::new`] (or
    /// [`GroveTwoSound::create`]) to talk to the device afterwards.
    pub fn reset_address(&mut self) -> Result<(), SI::Error> {
        self.command(Command::ResetAddress)
    }

    pub fn turn_on_led_flash(&mut self) -> Result<(), SI::Error> {
        self.command(Command::LedOn)
    }

    pub fn turn_off_led_flash(&mut self) -> Result<(), SI::Error> {
        self.command(Command::LedOff)
    }

    pub fn enable_auto_sleep(&mut self) -> Result<(), SI::Error> {
        self.command(Command::AutoSleepOn)
    }

    pub fn disable_auto_sleep(&mut self) -> Result<(), SI::Error> {
        self.command(Command::AutoSleepOff)
    }

    /// Read the current event status straight from the device
    pub fn event_status(&mut self) -> Result<EventLevel, SI::Error> {
        let mut data = [0u8; 4];
        self.query(Command::GetEvent, &mut data)?;
        // bytes 1..=3 are reserved
        Ok(EventLevel::from(data[0]))
    }

    /// Poll the event status and keep it for [`GroveTwoSound::is`]
    pub fn run(&mut self) -> Result<(), SI::Error> {
        self.last_event = Some(self.event_status()?);
        Ok(())
    }

    /// Compare against the level stored by the last [`GroveTwoSound::run`].
    /// Never touches the bus; false until the first successful poll.
    pub fn is(&self, level: EventLevel) -> bool {
        self.last_event == Some(level)
    }

    pub fn last_event(&self) -> Option<EventLevel> {
        self.last_event
    }

    pub fn sound_value(&mut self) -> Result<u16, SI::Error> {
        let mut data = [0u8; 2];
        self.query(Command::GetSoundValue, &mut data)?;
        Ok(le_u16(data[0], data[1]))
    }

    pub fn set_threshold(&mut self, slot: Threshold, value: u16) -> Result<(), SI::Error> {
        self.command(Command::SetThreshold { slot, value })
    }

    pub fn set_threshold_0(&mut self, value: u16) -> Result<(), SI::Error> {
        self.set_threshold(Threshold::Level0, value)
    }

    pub fn set_threshold_1(&mut self, value: u16) -> Result<(), SI::Error> {
        self.set_threshold(Threshold::Level1, value)
    }
}

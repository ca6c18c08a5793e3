pub mod i2c;

/// Length of each half of the wake pulse, in microseconds.
pub const WAKE_PULSE_US: u8 = 25;

/// Raw transport to the sensor.
///
/// Every transfer is preceded by a wake pulse on the sensor's wake pin, so
/// implementations call [`SoundInterface::wake`] themselves before touching
/// the bus.
pub trait SoundInterface {
    type Error;

    /// Pulse the wake pin: low for 25 µs, then high for 25 µs.
    fn wake(&mut self) -> Result<(), Self::Error>;

    fn send_byte(&mut self, address: u8, byte: u8) -> Result<(), Self::Error> {
        self.send_bytes(address, &[byte])
    }

    fn send_bytes(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error>;

    fn receive_byte(&mut self, address: u8) -> Result<u8, Self::Error> {
        let mut buf = [0u8; 1];
        self.receive_bytes(address, &mut buf)?;
        Ok(buf[0])
    }

    /// Fill `buf` with exactly `buf.len()` bytes read from `address`.
    fn receive_bytes(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error>;
}

use crate::interface::{SoundInterface, WAKE_PULSE_US};
use crate::Error;
use hal::blocking::delay::DelayUs;
use hal::blocking::i2c::{Read, Write};
use hal::digital::v2::OutputPin;

/// I2C transport with a dedicated wake pin
pub struct I2cInterface<I2C, PIN, DELAY> {
    i2c: I2C,
    wake_pin: PIN,
    delay: DELAY,
}

impl<I2C, PIN, DELAY> I2cInterface<I2C, PIN, DELAY> {
    /// Create new Grove Two Sound I2C interface
    pub fn new(i2c: I2C, wake_pin: PIN, delay: DELAY) -> Self {
        Self {
            i2c,
            wake_pin,
            delay,
        }
    }

    /// Give back the bus, the wake pin and the delay provider
    pub fn release(self) -> (I2C, PIN, DELAY) {
        (self.i2c, self.wake_pin, self.delay)
    }
}

impl<I2C, PIN, DELAY, CommE, PinE> SoundInterface for I2cInterface<I2C, PIN, DELAY>
where
    I2C: Write<Error = CommE> + Read<Error = CommE>,
    PIN: OutputPin<Error = PinE>,
    DELAY: DelayUs<u8>,
{
    type Error = Error<CommE, PinE>;

    fn wake(&mut self) -> Result<(), Self::Error> {
        self.wake_pin.set_low().map_err(Error::Pin)?;
        self.delay.delay_us(WAKE_PULSE_US);
        self.wake_pin.set_high().map_err(Error::Pin)?;
        self.delay.delay_us(WAKE_PULSE_US);
        Ok(())
    }

    fn send_bytes(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        self.wake()?;
        #[cfg(feature = "defmt")]
        defmt::trace!("i2c write {=u8:#x}: {=[u8]:#x}", address, bytes);

        self.i2c.write(address, bytes).map_err(Error::Comm)
    }

    fn receive_bytes(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.wake()?;
        self.i2c.read(address, buf).map_err(Error::Comm)?;

        #[cfg(feature = "defmt")]
        defmt::trace!("i2c read {=u8:#x}: {=[u8]:#x}", address, &buf[..]);
        Ok(())
    }
}

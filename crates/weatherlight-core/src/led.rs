//! Heartbeat LED.

use embedded_hal::digital::OutputPin;

/// An active-high LED that remembers what it was last driven to.
pub struct StatusLed<P> {
    pin: P,
    on: bool,
}

impl<P: OutputPin> StatusLed<P> {
    /// Takes the pin and drives it low.
    pub fn new(mut pin: P) -> Result<Self, P::Error> {
        pin.set_low()?;
        Ok(Self { pin, on: false })
    }

    pub fn on(&mut self) -> Result<(), P::Error> {
        self.pin.set_high()?;
        self.on = true;
        Ok(())
    }

    pub fn off(&mut self) -> Result<(), P::Error> {
        self.pin.set_low()?;
        self.on = false;
        Ok(())
    }

    /// Flips the LED and returns the new level.
    pub fn toggle(&mut self) -> Result<bool, P::Error> {
        if self.on { self.off()? } else { self.on()? }
        Ok(self.on)
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn release(self) -> P {
        self.pin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    #[derive(Default)]
    struct TracePin {
        levels: Vec<bool>,
    }

    impl ErrorType for TracePin {
        type Error = Infallible;
    }

    impl OutputPin for TracePin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.levels.push(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.levels.push(true);
            Ok(())
        }
    }

    #[test]
    fn test_starts_off() {
        let led = StatusLed::new(TracePin::default()).unwrap();
        assert!(!led.is_on());
        assert_eq!(led.release().levels, [false]);
    }

    #[test]
    fn test_toggle_alternates() {
        let mut led = StatusLed::new(TracePin::default()).unwrap();
        assert!(led.toggle().unwrap());
        assert!(!led.toggle().unwrap());
        assert!(led.toggle().unwrap());
        assert_eq!(led.release().levels, [false, true, false, true]);
    }

    #[test]
    fn test_explicit_on_off() {
        let mut led = StatusLed::new(TracePin::default()).unwrap();
        led.on().unwrap();
        assert!(led.is_on());
        led.off().unwrap();
        assert!(!led.is_on());
    }
}

//! Digital I/O over the pin table
//!
//! Arduino-style operations: each call resolves the pin through the
//! compile-time table and performs one read-modify-write on the port's
//! TRIS, LAT or a read of PORT.

use core::convert::Infallible;
use core::marker::PhantomData;

use picduino_hal::gpio::{BitOrder, Level, PinMode};
use picduino_hal::regs::Registers;

use crate::map::RegisterMap;
use crate::pins::Pin;

/// Digital I/O on chip `M` through register file `R`
pub struct Gpio<R, M> {
    regs: R,
    _map: PhantomData<fn() -> M>,
}

impl<R: Registers, M: RegisterMap> Gpio<R, M> {
    pub fn new(regs: R) -> Self {
        Self {
            regs,
            _map: PhantomData,
        }
    }

    /// Set the pin direction
    pub fn pin_mode(&self, pin: Pin<M>, mode: PinMode) {
        let d = pin.descriptor();
        match mode {
            PinMode::Input => self.regs.set_bits(d.regs.tris, d.mask),
            PinMode::Output => self.regs.clear_bits(d.regs.tris, d.mask),
        }
    }

    /// Drive the output latch
    pub fn digital_write(&self, pin: Pin<M>, level: Level) {
        let d = pin.descriptor();
        match level {
            Level::Low => self.regs.clear_bits(d.regs.lat, d.mask),
            Level::High => self.regs.set_bits(d.regs.lat, d.mask),
        }
    }

    /// Sample the pin
    pub fn digital_read(&self, pin: Pin<M>) -> Level {
        let d = pin.descriptor();
        Level::from(self.regs.read(d.regs.port) & d.mask != 0)
    }

    /// Invert the output latch
    pub fn pin_flip(&self, pin: Pin<M>) {
        let d = pin.descriptor();
        self.regs.toggle_bits(d.regs.lat, d.mask);
    }

    /// Current output latch state, as opposed to the sampled pin level
    pub fn latch(&self, pin: Pin<M>) -> Level {
        let d = pin.descriptor();
        Level::from(self.regs.read(d.regs.lat) & d.mask != 0)
    }

    /// Clock a byte out on `data`, one bit per rising edge of `clock`
    pub fn shift_out(&self, data: Pin<M>, clock: Pin<M>, order: BitOrder, value: u8) {
        for i in 0..8 {
            let bit = match order {
                BitOrder::LsbFirst => value & (1 << i),
                BitOrder::MsbFirst => value & (0x80 >> i),
            };
            self.digital_write(data, Level::from(bit != 0));
            self.digital_write(clock, Level::High);
            self.digital_write(clock, Level::Low);
        }
    }

    /// Clock a byte in from `data`, sampling while `clock` is high
    pub fn shift_in(&self, data: Pin<M>, clock: Pin<M>, order: BitOrder) -> u8 {
        let mut value = 0u8;
        for i in 0..8 {
            self.digital_write(clock, Level::High);
            if self.digital_read(data).is_high() {
                value |= match order {
                    BitOrder::LsbFirst => 1 << i,
                    BitOrder::MsbFirst => 0x80 >> i,
                };
            }
            self.digital_write(clock, Level::Low);
        }
        value
    }

    /// Borrow a single pin as a trait object-friendly handle
    pub fn pin(&self, pin: Pin<M>) -> DigitalPin<'_, R, M> {
        DigitalPin { gpio: self, pin }
    }

    pub fn regs(&self) -> &R {
        &self.regs
    }
}

/// Handle to one pin
///
/// Implements the picduino pin traits and the `embedded-hal` digital
/// traits so drivers written against either can use it.
pub struct DigitalPin<'a, R, M> {
    gpio: &'a Gpio<R, M>,
    pin: Pin<M>,
}

impl<R: Registers, M: RegisterMap> DigitalPin<'_, R, M> {
    pub fn id(&self) -> Pin<M> {
        self.pin
    }

    pub fn set_mode(&mut self, mode: PinMode) {
        self.gpio.pin_mode(self.pin, mode);
    }
}

impl<R: Registers, M: RegisterMap> picduino_hal::gpio::OutputPin for DigitalPin<'_, R, M> {
    fn set_high(&mut self) {
        self.gpio.digital_write(self.pin, Level::High);
    }

    fn set_low(&mut self) {
        self.gpio.digital_write(self.pin, Level::Low);
    }

    fn toggle(&mut self) {
        self.gpio.pin_flip(self.pin);
    }

    fn is_set_high(&self) -> bool {
        self.gpio.latch(self.pin).is_high()
    }
}

impl<R: Registers, M: RegisterMap> picduino_hal::gpio::InputPin for DigitalPin<'_, R, M> {
    fn is_high(&self) -> bool {
        self.gpio.digital_read(self.pin).is_high()
    }
}

impl<R, M> embedded_hal::digital::ErrorType for DigitalPin<'_, R, M> {
    type Error = Infallible;
}

impl<R: Registers, M: RegisterMap> embedded_hal::digital::OutputPin for DigitalPin<'_, R, M> {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.gpio.digital_write(self.pin, Level::Low);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.gpio.digital_write(self.pin, Level::High);
        Ok(())
    }
}

impl<R: Registers, M: RegisterMap> embedded_hal::digital::StatefulOutputPin
    for DigitalPin<'_, R, M>
{
    fn is_set_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.gpio.latch(self.pin).is_high())
    }

    fn is_set_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.gpio.latch(self.pin).is_high())
    }

    fn toggle(&mut self) -> Result<(), Infallible> {
        self.gpio.pin_flip(self.pin);
        Ok(())
    }
}

impl<R: Registers, M: RegisterMap> embedded_hal::digital::InputPin for DigitalPin<'_, R, M> {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.gpio.digital_read(self.pin).is_high())
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.gpio.digital_read(self.pin).is_high())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::PortRegs;
    use crate::map::Port;
    use crate::sim::{SimChip, SimRegisters};
    use core::cell::RefCell;
    use heapless::Vec;
    use picduino_hal::regs::Reg;

    type P = Pin<SimChip>;

    /// Records the data line on every rising edge of the clock line,
    /// both on port A
    struct EdgeRecorder<'a> {
        sim: &'a SimRegisters,
        data: u16,
        clock: u16,
        sampled: RefCell<Vec<bool, 16>>,
    }

    impl Registers for EdgeRecorder<'_> {
        fn read(&self, reg: Reg) -> u16 {
            self.sim.read(reg)
        }

        fn write(&self, reg: Reg, value: u16) {
            if reg == PortRegs::of(Port::A).lat {
                let rising = self.sim.get(reg) & self.clock == 0 && value & self.clock != 0;
                if rising {
                    self.sampled.borrow_mut().push(value & self.data != 0).unwrap();
                }
            }
            self.sim.write(reg, value);
        }
    }

    fn recorder(sim: &SimRegisters) -> EdgeRecorder<'_> {
        EdgeRecorder {
            sim,
            data: P::PA1.descriptor().mask,
            clock: P::PA2.descriptor().mask,
            sampled: RefCell::new(Vec::new()),
        }
    }

    fn looped() -> SimRegisters {
        let sim = SimRegisters::new();
        for port in [Port::A, Port::B, Port::C] {
            let regs = PortRegs::of(port);
            sim.mirror(regs.lat, regs.port);
        }
        sim
    }

    #[test]
    fn test_pin_mode_sets_tris() {
        let sim = SimRegisters::new();
        let gpio: Gpio<_, SimChip> = Gpio::new(&sim);
        sim.set(PortRegs::of(Port::B).tris, 0x0000);

        gpio.pin_mode(P::PB5, PinMode::Input);
        assert_eq!(sim.get(PortRegs::of(Port::B).tris), 1 << 5);

        gpio.pin_mode(P::PB5, PinMode::Output);
        assert_eq!(sim.get(PortRegs::of(Port::B).tris), 0);
    }

    #[test]
    fn test_write_touches_only_own_bit() {
        let sim = looped();
        let gpio: Gpio<_, SimChip> = Gpio::new(&sim);
        sim.set(PortRegs::of(Port::A).lat, 0x00F0);

        gpio.digital_write(P::PA0, Level::High);
        gpio.digital_write(P::PA4, Level::Low);
        assert_eq!(sim.get(PortRegs::of(Port::A).lat), 0x00E1);
    }

    #[test]
    fn test_loopback_round_trip() {
        let sim = looped();
        let gpio: Gpio<_, SimChip> = Gpio::new(&sim);
        gpio.pin_mode(P::PB5, PinMode::Output);

        gpio.digital_write(P::PB5, Level::High);
        assert_eq!(gpio.digital_read(P::PB5), Level::High);

        gpio.pin_flip(P::PB5);
        assert_eq!(gpio.digital_read(P::PB5), Level::Low);
    }

    #[test]
    fn test_shift_out_bit_order() {
        let sim = SimRegisters::new();
        let wire = recorder(&sim);
        let gpio: Gpio<_, SimChip> = Gpio::new(&wire);

        gpio.shift_out(P::PA1, P::PA2, BitOrder::MsbFirst, 0b1011_0010);
        assert_eq!(
            wire.sampled.borrow().as_slice(),
            &[true, false, true, true, false, false, true, false]
        );
        assert_eq!(gpio.latch(P::PA2), Level::Low);

        wire.sampled.borrow_mut().clear();
        gpio.shift_out(P::PA1, P::PA2, BitOrder::LsbFirst, 0b1011_0010);
        assert_eq!(
            wire.sampled.borrow().as_slice(),
            &[false, true, false, false, true, true, false, true]
        );
    }

    // PORTA as sampled at each clock: PA1 reads 1, 0, 1, 1, 0, 0, 1, 0
    const LINE: &[u16] = &[0x0002, 0x0000, 0x0002, 0x0002, 0x0000, 0x0000, 0x0002, 0x0000];

    #[test]
    fn test_shift_in_bit_order() {
        let sim = SimRegisters::new();
        let port = PortRegs::of(Port::A).port;

        sim.feed(port, LINE);
        let wire = recorder(&sim);
        let gpio: Gpio<_, SimChip> = Gpio::new(&wire);
        assert_eq!(gpio.shift_in(P::PA1, P::PA2, BitOrder::MsbFirst), 0b1011_0010);
        // One clock pulse per bit
        assert_eq!(wire.sampled.borrow().len(), 8);

        sim.feed(port, LINE);
        assert_eq!(gpio.shift_in(P::PA1, P::PA2, BitOrder::LsbFirst), 0b0100_1101);
    }

    #[test]
    fn test_digital_pin_traits() {
        use embedded_hal::digital::{InputPin as _, StatefulOutputPin as _};

        let sim = looped();
        let gpio: Gpio<_, SimChip> = Gpio::new(&sim);
        let mut led = gpio.pin(P::PB5);
        led.set_mode(PinMode::Output);

        picduino_hal::gpio::OutputPin::set_high(&mut led);
        assert_eq!(led.is_high(), Ok(true));
        assert_eq!(led.toggle(), Ok(()));
        assert_eq!(led.is_set_low(), Ok(true));
    }
}

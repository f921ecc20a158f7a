//! Chip register maps
//!
//! The PIC24FJ GA00x, GA10x and GB00x families share most of their SFR
//! layout. They differ in the output compare, input capture and CRC
//! blocks, in whether a fourth PMD register exists, and in which ports a
//! package bonds out. [`RegisterMap`] captures exactly those differences
//! as required items; the shared layout is provided by default methods.
//!
//! Implementations are zero-sized types selected by the chip crate, so
//! every lookup here is resolved at compile time.

use picduino_hal::regs::{Bit, Field, Reg};

use crate::interrupt::{Channel, ExtInt, InterruptSource, TimerId};
use crate::pins::PinDescriptor;

/// I/O port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Port {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl Port {
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn letter(self) -> char {
        match self {
            Port::A => 'A',
            Port::B => 'B',
            Port::C => 'C',
            Port::D => 'D',
            Port::E => 'E',
            Port::F => 'F',
            Port::G => 'G',
        }
    }
}

/// Register block of one port group
///
/// Four consecutive registers: direction, input, output latch and
/// open-drain control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PortRegs {
    pub tris: Reg,
    pub port: Reg,
    pub lat: Reg,
    pub odc: Reg,
}

/// TRISA address; later ports follow at an 8-byte stride
const TRISA: u16 = 0x02C0;

impl PortRegs {
    pub const fn of(port: Port) -> Self {
        let tris = Reg(TRISA + 8 * port.index() as u16);
        Self {
            tris,
            port: tris.offset(2),
            lat: tris.offset(4),
            odc: tris.offset(6),
        }
    }
}

/// Flag, enable and priority lines of an interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IrqLines {
    /// Pending flag in an IFSx register
    pub flag: Bit,
    /// Enable bit in an IECx register
    pub enable: Bit,
    /// Three-bit priority field in an IPCx register
    pub priority: Field,
}

const IFS0: u16 = 0x0084;
const IEC0: u16 = 0x0094;
const IPC0: u16 = 0x00A4;

impl IrqLines {
    /// Lines for vector bit `bit` of IFS/IEC word `word`, priority in
    /// IPC register `ipc` at nibble `slot`
    pub const fn at(word: u16, bit: u8, ipc: u16, slot: u8) -> Self {
        Self {
            flag: Bit::new(Reg(IFS0 + 2 * word), bit),
            enable: Bit::new(Reg(IEC0 + 2 * word), bit),
            priority: Field::new(Reg(IPC0 + 2 * ipc), 4 * slot, 3),
        }
    }
}

/// 16-bit timer registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerRegs {
    pub tmr: Reg,
    pub pr: Reg,
    pub con: Reg,
    /// Module disable bit in PMD1
    pub power: Bit,
}

/// Output compare registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutputCompareRegs {
    /// OCxCON (GA00x) or OCxCON1
    pub con: Reg,
    /// OCxCON2 where the family has one
    pub con2: Option<Reg>,
    /// Compare value
    pub r: Reg,
    /// Secondary compare value
    pub rs: Reg,
    pub power: Bit,
}

/// Input capture registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputCaptureRegs {
    /// ICxCON (GA00x) or ICxCON1
    pub con: Reg,
    pub con2: Option<Reg>,
    /// Capture FIFO head
    pub buf: Reg,
    pub power: Bit,
    /// Control bits selecting Timer2 as the capture time base
    pub timer2_select: u16,
}

/// Change notification enable and pull-up registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChangeNotificationRegs {
    pub cnen1: Reg,
    pub cnen2: Reg,
    pub cnpu1: Reg,
    pub cnpu2: Reg,
}

/// UART instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartId {
    Uart1,
    Uart2,
}

/// UART registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartRegs {
    pub mode: Reg,
    pub sta: Reg,
    pub txreg: Reg,
    pub rxreg: Reg,
    pub brg: Reg,
    pub power: Bit,
    pub tx_irq: IrqLines,
    pub rx_irq: IrqLines,
}

/// CRC control register arrangement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CrcControl {
    /// GA00x: one CRCCON with a 4-bit PLEN
    Single { con: Reg },
    /// GA10x/GB00x: CRCCON1 for status, CRCCON2 for lengths
    Split { con1: Reg, con2: Reg },
}

/// CRC engine registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CrcRegs {
    pub control: CrcControl,
    /// Polynomial (low word on split layouts)
    pub xor: Reg,
    /// Polynomial high word on split layouts
    pub xor_high: Option<Reg>,
    /// Data input FIFO (low word)
    pub dat: Reg,
    /// Result/working word (low word)
    pub wdat: Reg,
    pub power: Bit,
    pub irq: IrqLines,
}

/// ADC registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdcRegs {
    pub con1: Reg,
    pub con2: Reg,
    pub con3: Reg,
    pub chs: Reg,
    pub pcfg: Reg,
    pub cssl: Reg,
    pub buf0: Reg,
    pub power: Bit,
}

/// Oscillator control registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OscRegs {
    pub osccon: Reg,
    pub clkdiv: Reg,
}

pub const PMD1: Reg = Reg(0x0770);
pub const PMD2: Reg = Reg(0x0772);
pub const PMD3: Reg = Reg(0x0774);

/// PMD bit controlling power to output compare `ch`
pub const fn oc_power(ch: Channel) -> Bit {
    Bit::new(PMD2, ch.index() as u8)
}

/// PMD bit controlling power to input capture `ch`
pub const fn ic_power(ch: Channel) -> Bit {
    Bit::new(PMD2, 8 + ch.index() as u8)
}

/// PMD bit controlling power to the CRC engine
pub const CRC_POWER: Bit = Bit::new(PMD3, 7);

/// CRC interrupt lines, shared by all families
pub const CRC_IRQ: IrqLines = IrqLines::at(4, 3, 16, 3);

/// Register layout of one chip family
pub trait RegisterMap: 'static {
    /// Family name for diagnostics
    const NAME: &'static str;

    /// Digital pins in index order. Must begin with all of port A and
    /// then port B; every PIC24FJ package bonds both out.
    const PIN_TABLE: &'static [PinDescriptor];

    /// Peripheral module disable registers
    const PMD: &'static [Reg];

    fn output_compare(ch: Channel) -> OutputCompareRegs;

    fn input_capture(ch: Channel) -> InputCaptureRegs;

    fn crc() -> CrcRegs;

    fn timer(id: TimerId) -> TimerRegs {
        let (tmr, pr, con) = match id {
            TimerId::T1 => (0x0100, 0x0102, 0x0104),
            TimerId::T2 => (0x0106, 0x010C, 0x0110),
            TimerId::T3 => (0x010A, 0x010E, 0x0112),
            TimerId::T4 => (0x0114, 0x011A, 0x011E),
            TimerId::T5 => (0x0118, 0x011C, 0x0120),
        };
        TimerRegs {
            tmr: Reg(tmr),
            pr: Reg(pr),
            con: Reg(con),
            power: Bit::new(PMD1, 11 + id.index() as u8),
        }
    }

    fn irq(source: InterruptSource) -> IrqLines {
        match source {
            InterruptSource::Timer(TimerId::T1) => IrqLines::at(0, 3, 0, 3),
            InterruptSource::Timer(TimerId::T2) => IrqLines::at(0, 7, 1, 3),
            InterruptSource::Timer(TimerId::T3) => IrqLines::at(0, 8, 2, 0),
            InterruptSource::Timer(TimerId::T4) => IrqLines::at(1, 11, 6, 3),
            InterruptSource::Timer(TimerId::T5) => IrqLines::at(1, 12, 7, 0),
            InterruptSource::OutputCompare(Channel::Ch1) => IrqLines::at(0, 2, 0, 2),
            InterruptSource::OutputCompare(Channel::Ch2) => IrqLines::at(0, 6, 1, 2),
            InterruptSource::OutputCompare(Channel::Ch3) => IrqLines::at(1, 9, 6, 1),
            InterruptSource::OutputCompare(Channel::Ch4) => IrqLines::at(1, 10, 6, 2),
            InterruptSource::OutputCompare(Channel::Ch5) => IrqLines::at(2, 9, 10, 1),
            InterruptSource::InputCapture(Channel::Ch1) => IrqLines::at(0, 1, 0, 1),
            InterruptSource::InputCapture(Channel::Ch2) => IrqLines::at(0, 5, 1, 1),
            InterruptSource::InputCapture(Channel::Ch3) => IrqLines::at(2, 5, 9, 1),
            InterruptSource::InputCapture(Channel::Ch4) => IrqLines::at(2, 6, 9, 2),
            InterruptSource::InputCapture(Channel::Ch5) => IrqLines::at(2, 7, 9, 3),
            InterruptSource::External(ExtInt::Int0) => IrqLines::at(0, 0, 0, 0),
            InterruptSource::External(ExtInt::Int1) => IrqLines::at(1, 4, 5, 0),
            InterruptSource::External(ExtInt::Int2) => IrqLines::at(1, 13, 7, 1),
            InterruptSource::ChangeNotification => IrqLines::at(1, 3, 4, 3),
        }
    }

    /// INTCON2, holding the external interrupt edge bits
    fn intcon2() -> Reg {
        Reg(0x0082)
    }

    fn change_notification() -> ChangeNotificationRegs {
        ChangeNotificationRegs {
            cnen1: Reg(0x0060),
            cnen2: Reg(0x0062),
            cnpu1: Reg(0x0068),
            cnpu2: Reg(0x006A),
        }
    }

    fn uart(id: UartId) -> UartRegs {
        match id {
            UartId::Uart1 => UartRegs {
                mode: Reg(0x0220),
                sta: Reg(0x0222),
                txreg: Reg(0x0224),
                rxreg: Reg(0x0226),
                brg: Reg(0x0228),
                power: Bit::new(PMD1, 5),
                tx_irq: IrqLines::at(0, 12, 3, 0),
                rx_irq: IrqLines::at(0, 11, 2, 3),
            },
            UartId::Uart2 => UartRegs {
                mode: Reg(0x0230),
                sta: Reg(0x0232),
                txreg: Reg(0x0234),
                rxreg: Reg(0x0236),
                brg: Reg(0x0238),
                power: Bit::new(PMD1, 6),
                tx_irq: IrqLines::at(1, 15, 7, 3),
                rx_irq: IrqLines::at(1, 14, 7, 2),
            },
        }
    }

    fn adc() -> AdcRegs {
        AdcRegs {
            con1: Reg(0x0320),
            con2: Reg(0x0322),
            con3: Reg(0x0324),
            chs: Reg(0x0328),
            pcfg: Reg(0x032C),
            cssl: Reg(0x0330),
            buf0: Reg(0x0300),
            power: Bit::new(PMD1, 0),
        }
    }

    fn osc() -> OscRegs {
        OscRegs {
            osccon: Reg(0x0742),
            clkdiv: Reg(0x0744),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_block_layout() {
        let b = PortRegs::of(Port::B);
        assert_eq!(b.tris, Reg(0x02C8));
        assert_eq!(b.port, Reg(0x02CA));
        assert_eq!(b.lat, Reg(0x02CC));
        assert_eq!(b.odc, Reg(0x02CE));
    }

    #[test]
    fn test_irq_line_addresses() {
        let t2 = IrqLines::at(0, 7, 1, 3);
        assert_eq!(t2.flag, Bit::new(Reg(0x0084), 7));
        assert_eq!(t2.enable, Bit::new(Reg(0x0094), 7));
        assert_eq!(t2.priority.reg, Reg(0x00A6));
        assert_eq!(t2.priority.mask(), 0x7000);
    }

    #[test]
    fn test_power_bits() {
        assert_eq!(oc_power(Channel::Ch3), Bit::new(PMD2, 2));
        assert_eq!(ic_power(Channel::Ch1), Bit::new(PMD2, 8));
    }
}

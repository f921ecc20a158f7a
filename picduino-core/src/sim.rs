//! Simulated register file
//!
//! A host-side stand-in for the PIC24 SFR space. Writes are stored,
//! reads return the stored value, and a handful of hooks model the
//! hardware behaviour the core depends on:
//!
//! - `mirror`: writes to one register appear in another (LAT looped
//!   back to PORT)
//! - `stick`: a bit reads as a fixed value regardless of writes (a stuck
//!   FULL flag, a DONE bit that is always set)
//! - `free_run`: a counter that advances on every read
//! - `pending_reads`: a status bit that stays set until a FIFO register
//!   has been read a number of times
//! - `feed`: a register that returns a scripted sequence of values, one
//!   per read, before falling back to its stored value
//!
//! [`SimChip`] is a small GA00x-style register map with ports A to C.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Vec;
use picduino_hal::regs::{Bit, Reg, Registers};

use crate::interrupt::Channel;
use crate::map::{
    ic_power, oc_power, CrcControl, CrcRegs, InputCaptureRegs, OutputCompareRegs, Port,
    RegisterMap, CRC_IRQ, CRC_POWER, PMD1, PMD2, PMD3,
};
use crate::pins::{pin_table, PinDescriptor};

/// Words in the SFR space (0x0000..0x07FF)
const SFR_WORDS: usize = 0x0800 / 2;

#[derive(Debug, Clone, Copy)]
struct Countdown {
    status: Bit,
    fifo: Reg,
    remaining: u16,
}

struct SimState {
    words: [u16; SFR_WORDS],
    mirrors: Vec<(Reg, Reg), 8>,
    stuck: Vec<(Bit, bool), 16>,
    counters: Vec<(Reg, u16), 4>,
    countdowns: Vec<Countdown, 4>,
    feeds: Vec<(Reg, &'static [u16]), 4>,
}

impl SimState {
    fn slot(&mut self, reg: Reg) -> Option<&mut u16> {
        self.words.get_mut(usize::from(reg.0 / 2))
    }

    fn load(&self, reg: Reg) -> u16 {
        self.words.get(usize::from(reg.0 / 2)).copied().unwrap_or(0)
    }

    fn store(&mut self, reg: Reg, value: u16) {
        if let Some(word) = self.slot(reg) {
            *word = value;
        }
    }
}

/// Simulated SFR space
pub struct SimRegisters {
    state: Mutex<RefCell<SimState>>,
}

impl Default for SimRegisters {
    fn default() -> Self {
        Self::new()
    }
}

impl SimRegisters {
    /// All registers zero, no hooks
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(RefCell::new(SimState {
                words: [0; SFR_WORDS],
                mirrors: Vec::new(),
                stuck: Vec::new(),
                counters: Vec::new(),
                countdowns: Vec::new(),
                feeds: Vec::new(),
            })),
        }
    }

    fn with<T>(&self, f: impl FnOnce(&mut SimState) -> T) -> T {
        critical_section::with(|cs| f(&mut self.state.borrow_ref_mut(cs)))
    }

    /// Store a value without running hooks
    pub fn set(&self, reg: Reg, value: u16) {
        self.with(|s| s.store(reg, value));
    }

    /// Stored value, ignoring stuck bits and counters
    pub fn get(&self, reg: Reg) -> u16 {
        self.with(|s| s.load(reg))
    }

    /// Stored state of one bit
    pub fn bit(&self, bit: Bit) -> bool {
        self.get(bit.reg) & bit.mask() != 0
    }

    /// Copy every write of `from` into `to`
    pub fn mirror(&self, from: Reg, to: Reg) {
        self.with(|s| {
            if s.mirrors.push((from, to)).is_err() {
                panic!("simulated mirror table full");
            }
        });
    }

    /// Force `bit` to read as `value`
    pub fn stick(&self, bit: Bit, value: bool) {
        self.with(|s| {
            s.stuck.retain(|(b, _)| *b != bit);
            if s.stuck.push((bit, value)).is_err() {
                panic!("simulated stuck-bit table full");
            }
        });
    }

    /// Let `bit` read its stored value again
    pub fn release(&self, bit: Bit) {
        self.with(|s| s.stuck.retain(|(b, _)| *b != bit));
    }

    /// Advance `reg` by `step` after every read
    pub fn free_run(&self, reg: Reg, step: u16) {
        self.with(|s| {
            s.counters.retain(|(r, _)| *r != reg);
            if s.counters.push((reg, step)).is_err() {
                panic!("simulated counter table full");
            }
        });
    }

    /// Hold `status` set until `fifo` has been read `entries` times
    pub fn pending_reads(&self, status: Bit, fifo: Reg, entries: u16) {
        self.with(|s| {
            let countdown = Countdown {
                status,
                fifo,
                remaining: entries,
            };
            if s.countdowns.push(countdown).is_err() {
                panic!("simulated fifo table full");
            }
        });
    }

    /// Return `values` from the next reads of `reg`, one per read
    pub fn feed(&self, reg: Reg, values: &'static [u16]) {
        self.with(|s| {
            s.feeds.retain(|(r, _)| *r != reg);
            if s.feeds.push((reg, values)).is_err() {
                panic!("simulated feed table full");
            }
        });
    }

    /// Entries left in a `pending_reads` FIFO
    pub fn remaining_reads(&self, fifo: Reg) -> u16 {
        self.with(|s| {
            s.countdowns
                .iter()
                .filter(|c| c.fifo == fifo)
                .map(|c| c.remaining)
                .sum()
        })
    }
}

impl Registers for SimRegisters {
    fn read(&self, reg: Reg) -> u16 {
        self.with(|s| {
            let mut value = s.load(reg);

            for (r, values) in s.feeds.iter_mut() {
                let script: &'static [u16] = *values;
                if *r == reg {
                    if let Some((&first, rest)) = script.split_first() {
                        value = first;
                        *values = rest;
                    }
                }
            }

            for countdown in s.countdowns.iter() {
                if countdown.status.reg == reg {
                    if countdown.remaining > 0 {
                        value |= countdown.status.mask();
                    } else {
                        value &= !countdown.status.mask();
                    }
                }
            }
            for countdown in s.countdowns.iter_mut() {
                if countdown.fifo == reg && countdown.remaining > 0 {
                    countdown.remaining -= 1;
                }
            }

            for &(bit, forced) in s.stuck.iter() {
                if bit.reg == reg {
                    if forced {
                        value |= bit.mask();
                    } else {
                        value &= !bit.mask();
                    }
                }
            }

            let step = s
                .counters
                .iter()
                .find(|(r, _)| *r == reg)
                .map(|(_, step)| *step);
            if let Some(step) = step {
                let next = s.load(reg).wrapping_add(step);
                s.store(reg, next);
            }

            value
        })
    }

    fn write(&self, reg: Reg, value: u16) {
        self.with(|s| {
            s.store(reg, value);
            let targets: Vec<Reg, 8> = s
                .mirrors
                .iter()
                .filter(|(from, _)| *from == reg)
                .map(|(_, to)| *to)
                .collect();
            for to in targets {
                s.store(to, value);
            }
        });
    }
}

/// Register map used by host tests
///
/// GA00x-style single-register OC, IC and CRC blocks, ports A to C.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimChip;

const SIM_PINS: [PinDescriptor; 48] = pin_table(&[Port::A, Port::B, Port::C]);

impl RegisterMap for SimChip {
    const NAME: &'static str = "sim";
    const PIN_TABLE: &'static [PinDescriptor] = &SIM_PINS;
    const PMD: &'static [Reg] = &[PMD1, PMD2, PMD3];

    fn output_compare(ch: Channel) -> OutputCompareRegs {
        let base = 0x0180 + 6 * ch.index() as u16;
        OutputCompareRegs {
            rs: Reg(base),
            r: Reg(base + 2),
            con: Reg(base + 4),
            con2: None,
            power: oc_power(ch),
        }
    }

    fn input_capture(ch: Channel) -> InputCaptureRegs {
        let base = 0x0140 + 4 * ch.index() as u16;
        InputCaptureRegs {
            buf: Reg(base),
            con: Reg(base + 2),
            con2: None,
            power: ic_power(ch),
            timer2_select: 1 << 7,
        }
    }

    fn crc() -> CrcRegs {
        CrcRegs {
            control: CrcControl::Single { con: Reg(0x0640) },
            xor: Reg(0x0642),
            xor_high: None,
            dat: Reg(0x0644),
            wdat: Reg(0x0646),
            power: CRC_POWER,
            irq: CRC_IRQ,
        }
    }
}

//! Interrupt source identifiers

/// 16-bit timer instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerId {
    T1,
    T2,
    T3,
    T4,
    T5,
}

impl TimerId {
    pub const ALL: [TimerId; 5] = [TimerId::T1, TimerId::T2, TimerId::T3, TimerId::T4, TimerId::T5];

    /// Zero-based instance index
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Output compare or input capture channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    Ch1,
    Ch2,
    Ch3,
    Ch4,
    Ch5,
}

impl Channel {
    pub const ALL: [Channel; 5] = [Channel::Ch1, Channel::Ch2, Channel::Ch3, Channel::Ch4, Channel::Ch5];

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// External interrupt pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExtInt {
    Int0,
    Int1,
    Int2,
}

impl ExtInt {
    pub const ALL: [ExtInt; 3] = [ExtInt::Int0, ExtInt::Int1, ExtInt::Int2];

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Interrupt source with a callback slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterruptSource {
    Timer(TimerId),
    OutputCompare(Channel),
    InputCapture(Channel),
    External(ExtInt),
    ChangeNotification,
}

impl InterruptSource {
    /// Number of sources, and so of callback slots
    pub const COUNT: usize = 19;

    const OC_BASE: usize = 5;
    const IC_BASE: usize = 10;
    const EXT_BASE: usize = 15;
    const CN_INDEX: usize = 18;

    /// Every source in slot order
    pub const ALL: [InterruptSource; Self::COUNT] = {
        let mut all = [InterruptSource::ChangeNotification; Self::COUNT];
        let mut i = 0;
        while i < 5 {
            all[i] = InterruptSource::Timer(TimerId::ALL[i]);
            all[Self::OC_BASE + i] = InterruptSource::OutputCompare(Channel::ALL[i]);
            all[Self::IC_BASE + i] = InterruptSource::InputCapture(Channel::ALL[i]);
            i += 1;
        }
        let mut e = 0;
        while e < 3 {
            all[Self::EXT_BASE + e] = InterruptSource::External(ExtInt::ALL[e]);
            e += 1;
        }
        all
    };

    /// Stable slot index in `0..COUNT`
    pub const fn index(self) -> usize {
        match self {
            InterruptSource::Timer(t) => t.index(),
            InterruptSource::OutputCompare(ch) => Self::OC_BASE + ch.index(),
            InterruptSource::InputCapture(ch) => Self::IC_BASE + ch.index(),
            InterruptSource::External(int) => Self::EXT_BASE + int.index(),
            InterruptSource::ChangeNotification => Self::CN_INDEX,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl From<TimerId> for InterruptSource {
    fn from(t: TimerId) -> Self {
        InterruptSource::Timer(t)
    }
}

impl From<ExtInt> for InterruptSource {
    fn from(int: ExtInt) -> Self {
        InterruptSource::External(int)
    }
}

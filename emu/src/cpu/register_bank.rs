//! # Register Banking Table
//!
//! Banking is a pure lookup: `(logical register, mode) -> physical slot`.
//! The register file is a flat array of 37 slots laid out as:
//!
//! ```text
//! ┌────────┬──────────────────────────────────────┐
//! │ Slots  │ Contents                             │
//! ├────────┼──────────────────────────────────────┤
//! │  0-15  │ R0-R14 of User/System, R15 (PC)      │
//! │ 16-22  │ R8_fiq - R14_fiq                     │
//! │ 23-24  │ R13_irq, R14_irq                     │
//! │ 25-26  │ R13_svc, R14_svc                     │
//! │ 27-28  │ R13_abt, R14_abt                     │
//! │ 29-30  │ R13_und, R14_und                     │
//! │   31   │ CPSR                                 │
//! │ 32-36  │ SPSR_fiq, _irq, _svc, _abt, _und     │
//! └────────┴──────────────────────────────────────┘
//! ```

/// Number of physical 32-bit slots.
pub const PHYSICAL_SLOTS: usize = 37;

/// Physical slot holding the CPSR.
pub const CPSR_SLOT: usize = 31;

/// Rows are logical registers, columns are [`Mode::bank_index`](super::cpu_modes::Mode::bank_index):
/// User, FIQ, IRQ, Supervisor, Abort, Undefined, System.
#[rustfmt::skip]
pub const BANK_MAP: [[usize; 7]; 16] = [
    [ 0,  0,  0,  0,  0,  0,  0],
    [ 1,  1,  1,  1,  1,  1,  1],
    [ 2,  2,  2,  2,  2,  2,  2],
    [ 3,  3,  3,  3,  3,  3,  3],
    [ 4,  4,  4,  4,  4,  4,  4],
    [ 5,  5,  5,  5,  5,  5,  5],
    [ 6,  6,  6,  6,  6,  6,  6],
    [ 7,  7,  7,  7,  7,  7,  7],
    [ 8, 16,  8,  8,  8,  8,  8],
    [ 9, 17,  9,  9,  9,  9,  9],
    [10, 18, 10, 10, 10, 10, 10],
    [11, 19, 11, 11, 11, 11, 11],
    [12, 20, 12, 12, 12, 12, 12],
    [13, 21, 23, 25, 27, 29, 13],
    [14, 22, 24, 26, 28, 30, 14],
    [15, 15, 15, 15, 15, 15, 15],
];

/// SPSR slot per bank index, `None` for User and System.
pub const SPSR_SLOTS: [Option<usize>; 7] = [None, Some(32), Some(33), Some(34), Some(35), Some(36), None];

use emu::cpu::CpuError;
use emu::cpu::psr::CpuState;
use emu::gba::Gba;
use emu::memory::MemoryError;
use pretty_assertions::assert_eq;

const ENTRY: u32 = 0x0800_0000;

fn arm(words: &[u32]) -> Gba {
    let image: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
    Gba::new(&image)
}

fn thumb(half_words: &[u16]) -> Gba {
    let image: Vec<u8> = half_words.iter().flat_map(|h| h.to_le_bytes()).collect();
    let mut gba = Gba::new(&image);
    gba.cpu.registers.set_cpu_state(CpuState::Thumb);
    gba
}

#[test]
fn move_then_add() {
    let mut gba = arm(&[
        0xE3A0_0005, // MOV R0, #5
        0xE3A0_1007, // MOV R1, #7
        0xE080_2001, // ADD R2, R0, R1
    ]);

    gba.run_for(3).unwrap();

    let snapshot = gba.snapshot();
    assert_eq!(&snapshot.registers[0..3], &[5, 7, 12]);
    assert_eq!(snapshot.registers[15], ENTRY + 12);
}

#[test]
fn skipped_instruction_has_no_effect() {
    let mut gba = arm(&[
        0xE3B0_0000, // MOVS R0, #0
        0x1240_0001, // SUBNE R0, R0, #1
    ]);

    gba.step().unwrap();
    assert_eq!(gba.step(), Ok(()));

    let snapshot = gba.snapshot();
    assert_eq!(snapshot.registers[0], 0);
    assert_eq!(snapshot.registers[15], ENTRY + 8);
}

#[test]
fn adds_sets_every_flag_but_sign() {
    let mut gba = arm(&[
        0xE3A0_0102, // MOV R0, #0x80000000
        0xE090_1000, // ADDS R1, R0, R0
    ]);

    gba.run_for(2).unwrap();

    let registers = &gba.cpu.registers;
    assert_eq!(registers.register_at(1), 0);
    assert!(!registers.sign_flag());
    assert!(registers.zero_flag());
    assert!(registers.carry_flag());
    assert!(registers.overflow_flag());
}

#[test]
fn program_counter_reads_ahead() {
    let mut gba = arm(&[
        0xE1A0_000F, // MOV R0, PC
        0xE28F_1000, // ADD R1, PC, #0
    ]);

    gba.run_for(2).unwrap();

    assert_eq!(gba.cpu.registers.register_at(0), ENTRY + 8);
    assert_eq!(gba.cpu.registers.register_at(1), ENTRY + 12);
}

#[test]
fn branch_with_link_backwards() {
    let mut gba = arm(&[
        0xE3A0_0001, // MOV R0, #1
        0xE3A0_1002, // MOV R1, #2
        0xEBFF_FFFC, // BL to the first instruction
    ]);

    gba.run_for(3).unwrap();
    assert_eq!(gba.cpu.registers.program_counter(), ENTRY);
    assert_eq!(gba.cpu.registers.link_register(), ENTRY + 16);

    // Back at the top, the program runs again from scratch.
    gba.step().unwrap();
    assert_eq!(gba.cpu.registers.program_counter(), ENTRY + 4);
}

#[test]
fn branch_and_exchange_into_thumb() {
    let mut gba = arm(&[
        0xE28F_0001, // ADD R0, PC, #1
        0xE12F_FF10, // BX R0
        0x0000_212A, // MOV R1, #42 (Thumb)
    ]);

    gba.run_for(2).unwrap();
    assert_eq!(gba.cpu.registers.cpu_state(), CpuState::Thumb);
    assert_eq!(gba.cpu.registers.program_counter(), ENTRY + 8);

    gba.step().unwrap();
    assert_eq!(gba.cpu.registers.register_at(1), 42);
    assert_eq!(gba.cpu.registers.program_counter(), ENTRY + 10);
}

#[test]
fn thumb_store_then_load_multiple() {
    let mut gba = thumb(&[
        0x2101, // MOV R1, #1
        0x2202, // MOV R2, #2
        0x2303, // MOV R3, #3
        0xC00E, // STMIA R0!, {R1-R3}
        0x380C, // SUB R0, #12
        0xC811, // LDMIA R0!, {R0, R4}
    ]);
    gba.cpu.registers.set_register_at(0, 0x0300_0000);

    gba.run_for(4).unwrap();
    for (i, expected) in [1, 2, 3].into_iter().enumerate() {
        let address = 0x0300_0000 + 4 * i as u32;
        assert_eq!(gba.cpu.memory.read_word(address).unwrap(), expected);
    }
    assert_eq!(gba.cpu.registers.register_at(0), 0x0300_000C);

    gba.run_for(2).unwrap();
    assert_eq!(gba.cpu.registers.register_at(0), 1);
    assert_eq!(gba.cpu.registers.register_at(4), 2);
}

#[test]
fn status_register_round_trip() {
    let mut gba = arm(&[
        0xE328_F20F, // MSR CPSR_f, #0xF0000000
        0xE10F_0000, // MRS R0, CPSR
    ]);

    gba.run_for(2).unwrap();

    assert_eq!(gba.cpu.registers.register_at(0), 0xF000_00D3);
    assert!(gba.cpu.registers.overflow_flag());
}

#[test]
fn software_interrupt_is_unimplemented() {
    let mut gba = arm(&[0xEF00_0000]);

    assert_eq!(
        gba.run(),
        CpuError::UnimplementedInstruction {
            raw: 0xEF00_0000,
            pc: ENTRY,
            class: "software interrupt",
        }
    );
}

#[test]
fn reserved_condition_is_a_violation() {
    let mut gba = arm(&[0xF3A0_0005]);

    let e = gba.step().unwrap_err();
    assert!(matches!(e, CpuError::ArchitecturalViolation { pc: ENTRY, .. }), "{e}");
}

#[test]
fn cartridge_is_read_only() {
    let mut gba = arm(&[
        0xE3A0_1408, // MOV R1, #0x08000000
        0xE581_0000, // STR R0, [R1]
    ]);

    gba.step().unwrap();
    assert_eq!(
        gba.step(),
        Err(CpuError::Memory(MemoryError::ReadOnlyViolation { address: ENTRY }))
    );
}

#[test]
fn runs_are_deterministic() {
    let mut program: Vec<u32> = (0..8_u32)
        .map(|rd| 0xE3A0_0000 | (rd << 12) | u32::from(rand::random::<u8>()))
        .collect();
    // ADDS R8, R0, R1 ... ADDS R11, R6, R7
    program.extend((0..4_u32).map(|i| 0xE090_0000 | ((2 * i) << 16) | ((8 + i) << 12) | (2 * i + 1)));

    let mut first = arm(&program);
    let mut second = arm(&program);

    for _ in 0..program.len() {
        first.step().unwrap();
        second.step().unwrap();
        assert_eq!(first.snapshot(), second.snapshot());
    }
}

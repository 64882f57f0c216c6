//! Instruction behaviour and cycle counts, one instruction at a time.

mod common;

use common::{Machine, PROGRAM, STACK};
use cpu_m68k::{C, N, X, Z};
use emu_core::{Observable, Value};

#[test]
fn test_reset_state() {
    let m = Machine::new(&[0x4E71]);
    assert_eq!(m.cpu.get_pc(), PROGRAM);
    assert_eq!(m.cpu.regs.a[7], STACK);
    assert_eq!(m.cpu.regs.sr(), 0x2700);
    assert_eq!(m.cpu.query("flags.s"), Some(Value::Bool(true)));
    assert_eq!(m.cpu.query("int_mask"), Some(Value::U8(7)));
}

#[test]
fn test_nop_timing() {
    let mut m = Machine::new(&[0x4E71; 10]);
    assert_eq!(m.cpu.emulate(40), 40);
    assert_eq!(m.cpu.get_pc(), PROGRAM + 20);
    assert_eq!(m.cpu.cycles_counter(), 40);
}

#[test]
fn test_last_instruction_may_overrun() {
    // MOVE.L (A0),D0 costs 12
    let mut m = Machine::new(&[0x2010, 0x2010]);
    m.cpu.regs.a[0] = 0x2000;
    assert_eq!(m.cpu.emulate(13), 24);
}

#[test]
fn test_moveq_negative() {
    let mut m = Machine::new(&[0x70FF]);
    assert_eq!(m.cpu.step(), 4);
    assert_eq!(m.cpu.regs.d[0], 0xFFFF_FFFF);
    assert_eq!(m.cpu.regs.sr() & (N | Z), N);
}

#[test]
fn test_move_long_postincrement_to_predecrement() {
    // MOVE.L (A0)+,-(A1)
    let mut m = Machine::new(&[0x2318]);
    m.cpu.regs.a[0] = 0x2000;
    m.cpu.regs.a[1] = 0x3000;
    m.poke_long(0x2000, 0x1234_5678);

    assert_eq!(m.cpu.step(), 20);
    assert_eq!(m.cpu.regs.a[0], 0x2004);
    assert_eq!(m.cpu.regs.a[1], 0x2FFC);
    assert_eq!(m.peek_long(0x2FFC), 0x1234_5678);
}

#[test]
fn test_byte_postincrement_through_a7_keeps_stack_even() {
    // MOVE.B (A7)+,D0
    let mut m = Machine::new(&[0x101F]);
    m.cpu.regs.a[7] = 0x4000;
    m.poke_byte(0x4000, 0xAB);

    assert_eq!(m.cpu.step(), 8);
    assert_eq!(m.cpu.regs.a[7], 0x4002);
    assert_eq!(m.cpu.regs.d[0] & 0xFF, 0xAB);
}

#[test]
fn test_add_long_carry_out() {
    // ADD.L D1,D0
    let mut m = Machine::new(&[0xD081]);
    m.cpu.regs.d[0] = 1;
    m.cpu.regs.d[1] = 0xFFFF_FFFF;

    assert_eq!(m.cpu.step(), 8);
    assert_eq!(m.cpu.regs.d[0], 0);
    assert_eq!(m.cpu.regs.sr() & (X | N | Z | C), X | Z | C);
}

#[test]
fn test_addq_to_address_register_leaves_flags() {
    // ADDQ.L #1,A0
    let mut m = Machine::new(&[0x5288]);
    m.cpu.regs.a[0] = 0xFFFF_FFFF;
    let sr = m.cpu.regs.sr();

    assert_eq!(m.cpu.step(), 8);
    assert_eq!(m.cpu.regs.a[0], 0);
    assert_eq!(m.cpu.regs.sr(), sr);
}

#[test]
fn test_subq_word_borrow() {
    // SUBQ.W #1,D0
    let mut m = Machine::new(&[0x5340]);
    m.cpu.regs.d[0] = 0xAAAA_0000;

    assert_eq!(m.cpu.step(), 4);
    assert_eq!(m.cpu.regs.d[0], 0xAAAA_FFFF);
    assert_eq!(m.cpu.regs.sr() & (X | N | Z | C), X | N | C);
}

#[test]
fn test_clr_word_keeps_upper_half() {
    let mut m = Machine::new(&[0x4240]);
    m.cpu.regs.d[0] = 0x1234_5678;

    assert_eq!(m.cpu.step(), 4);
    assert_eq!(m.cpu.regs.d[0], 0x1234_0000);
    assert_ne!(m.cpu.regs.sr() & Z, 0);
}

#[test]
fn test_swap_and_ext() {
    // SWAP D0; EXT.W D1; EXT.L D2
    let mut m = Machine::new(&[0x4840, 0x4881, 0x48C2]);
    m.cpu.regs.d[0] = 0x1234_5678;
    m.cpu.regs.d[1] = 0x0000_0080;
    m.cpu.regs.d[2] = 0x0000_8000;

    assert_eq!(m.cpu.step(), 4);
    assert_eq!(m.cpu.step(), 4);
    assert_eq!(m.cpu.step(), 4);
    assert_eq!(m.cpu.regs.d[0], 0x5678_1234);
    assert_eq!(m.cpu.regs.d[1], 0x0000_FF80);
    assert_eq!(m.cpu.regs.d[2], 0xFFFF_8000);
}

#[test]
fn test_lea_displacement() {
    // LEA 8(A0),A1
    let mut m = Machine::new(&[0x43E8, 0x0008]);
    m.cpu.regs.a[0] = 0x2000;

    assert_eq!(m.cpu.step(), 8);
    assert_eq!(m.cpu.regs.a[1], 0x2008);
    assert_eq!(m.cpu.get_pc(), PROGRAM + 4);
}

#[test]
fn test_dbf_loop() {
    // MOVEQ #3,D0; loop: DBF D0,loop
    let mut m = Machine::new(&[0x7003, 0x51C8, 0xFFFE]);

    let cycles: u32 = (0..5).map(|_| m.cpu.step()).sum();
    assert_eq!(cycles, 4 + 10 + 10 + 10 + 14);
    assert_eq!(m.cpu.regs.d[0], 0x0000_FFFF);
    assert_eq!(m.cpu.get_pc(), PROGRAM + 6);
}

#[test]
fn test_branch_not_taken_word_skips_extension() {
    // BEQ.W +16 with Z clear
    let mut m = Machine::new(&[0x6700, 0x0010]);
    assert_eq!(m.cpu.step(), 12);
    assert_eq!(m.cpu.get_pc(), PROGRAM + 4);
}

#[test]
fn test_bra_short_taken() {
    let mut m = Machine::new(&[0x6004]);
    assert_eq!(m.cpu.step(), 10);
    assert_eq!(m.cpu.get_pc(), PROGRAM + 6);
}

#[test]
fn test_bsr_and_rts() {
    // BSR.S +4; NOP; NOP; RTS
    let mut m = Machine::new(&[0x6104, 0x4E71, 0x4E71, 0x4E75]);

    assert_eq!(m.cpu.step(), 18);
    assert_eq!(m.cpu.get_pc(), PROGRAM + 6);
    assert_eq!(m.cpu.regs.a[7], STACK - 4);
    assert_eq!(m.peek_long(STACK - 4), PROGRAM + 2);

    assert_eq!(m.cpu.step(), 16);
    assert_eq!(m.cpu.get_pc(), PROGRAM + 2);
    assert_eq!(m.cpu.regs.a[7], STACK);
}

#[test]
fn test_seq_sets_byte() {
    // MOVEQ #0,D1 sets Z; SEQ D0
    let mut m = Machine::new(&[0x7200, 0x57C0]);
    m.cpu.regs.d[0] = 0x1234_5600;
    m.cpu.step();

    assert_eq!(m.cpu.step(), 6);
    assert_eq!(m.cpu.regs.d[0], 0x1234_56FF);
}

#[test]
fn test_mulu_timing_follows_source_bits() {
    // MULU D1,D0
    let mut m = Machine::new(&[0xC0C1]);
    m.cpu.regs.d[0] = 300;
    m.cpu.regs.d[1] = 200;

    assert_eq!(m.cpu.step(), 38 + 2 * 3);
    assert_eq!(m.cpu.regs.d[0], 60_000);
}

#[test]
fn test_divu_quotient_and_remainder() {
    // DIVU D1,D0
    let mut m = Machine::new(&[0x80C1]);
    m.cpu.regs.d[0] = 100_001;
    m.cpu.regs.d[1] = 10;

    m.cpu.step();
    assert_eq!(m.cpu.regs.d[0], 0x0001_2710);
    assert_eq!(m.cpu.regs.sr() & (N | Z | C), 0);
}

#[test]
fn test_divu_overflow_leaves_register() {
    let mut m = Machine::new(&[0x80C1]);
    m.cpu.regs.d[0] = 0x0010_0000;
    m.cpu.regs.d[1] = 1;

    m.cpu.step();
    assert_eq!(m.cpu.regs.d[0], 0x0010_0000);
    assert_ne!(m.cpu.regs.sr() & cpu_m68k::V, 0);
}

#[test]
fn test_abcd_register() {
    // ABCD D1,D0
    let mut m = Machine::new(&[0xC101]);
    m.cpu.regs.d[0] = 0x45;
    m.cpu.regs.d[1] = 0x38;

    assert_eq!(m.cpu.step(), 6);
    assert_eq!(m.cpu.regs.d[0], 0x83);
}

#[test]
fn test_lsl_word_immediate() {
    // LSL.W #4,D0
    let mut m = Machine::new(&[0xE948]);
    m.cpu.regs.d[0] = 0x1234;

    assert_eq!(m.cpu.step(), 6 + 2 * 4);
    assert_eq!(m.cpu.regs.d[0], 0x2340);
    assert_eq!(m.cpu.regs.sr() & (X | C), X | C);
}

#[test]
fn test_rol_byte_keeps_extend() {
    // ROL.B #1,D0
    let mut m = Machine::new(&[0xE318]);
    m.cpu.regs.d[0] = 0x81;

    assert_eq!(m.cpu.step(), 8);
    assert_eq!(m.cpu.regs.d[0], 0x03);
    assert_eq!(m.cpu.regs.sr() & (X | C), C);
}

#[test]
fn test_movem_predecrement_and_restore() {
    // MOVEM.L D0-D1/A0,-(A7); MOVEM.L (A7)+,D2-D3/A1
    let mut m = Machine::new(&[0x48E7, 0xC080, 0x4CDF, 0x020C]);
    m.cpu.regs.d[0] = 0x1111_1111;
    m.cpu.regs.d[1] = 0x2222_2222;
    m.cpu.regs.a[0] = 0x3333_3333;

    assert_eq!(m.cpu.step(), 8 + 3 * 8);
    assert_eq!(m.cpu.regs.a[7], STACK - 12);
    assert_eq!(m.peek_long(STACK - 12), 0x1111_1111);
    assert_eq!(m.peek_long(STACK - 8), 0x2222_2222);
    assert_eq!(m.peek_long(STACK - 4), 0x3333_3333);

    assert_eq!(m.cpu.step(), 12 + 3 * 8);
    assert_eq!(m.cpu.regs.a[7], STACK);
    assert_eq!(m.cpu.regs.d[2], 0x1111_1111);
    assert_eq!(m.cpu.regs.d[3], 0x2222_2222);
    assert_eq!(m.cpu.regs.a[1], 0x3333_3333);
}

#[test]
fn test_link_and_unlk() {
    // LINK A6,#-8; UNLK A6
    let mut m = Machine::new(&[0x4E56, 0xFFF8, 0x4E5E]);
    m.cpu.regs.a[6] = 0xCAFE_0000;

    assert_eq!(m.cpu.step(), 16);
    assert_eq!(m.cpu.regs.a[6], STACK - 4);
    assert_eq!(m.cpu.regs.a[7], STACK - 12);
    assert_eq!(m.peek_long(STACK - 4), 0xCAFE_0000);

    assert_eq!(m.cpu.step(), 12);
    assert_eq!(m.cpu.regs.a[6], 0xCAFE_0000);
    assert_eq!(m.cpu.regs.a[7], STACK);
}

#[test]
fn test_exg_data_and_address() {
    // EXG D0,A1
    let mut m = Machine::new(&[0xC189]);
    m.cpu.regs.d[0] = 1;
    m.cpu.regs.a[1] = 2;

    assert_eq!(m.cpu.step(), 6);
    assert_eq!(m.cpu.regs.d[0], 2);
    assert_eq!(m.cpu.regs.a[1], 1);
}

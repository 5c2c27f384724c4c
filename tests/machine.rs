use chip8vm::{interpreter::Interpreter, Error, FONT_START, MAX_ROM_SIZE, START_ROM};
use claim::{assert_matches, assert_ok};
use quickcheck_macros::quickcheck;

#[test]
fn test_clear_and_jump_to_self() {
    let rom: &[u8] = &[0x00, 0xE0, 0x12, 0x02];
    let mut interpreter = Interpreter::with_rom(rom).unwrap();

    assert_ok!(interpreter.step());
    assert_eq!(interpreter.pc(), 0x202);

    for _ in 0..100 {
        assert_ok!(interpreter.step());
        assert_eq!(interpreter.pc(), 0x202);
    }

    assert!(interpreter.display().pixels().iter().all(|p| !*p));
}

#[test]
fn test_jump_back_to_start() {
    let rom: &[u8] = &[0x00, 0xE0, 0x12, 0x00];
    let mut interpreter = Interpreter::with_rom(rom).unwrap();

    for _ in 0..50 {
        assert_ok!(interpreter.step());
        assert_ok!(interpreter.step());
        assert_eq!(interpreter.pc(), 0x200);
    }

    assert!(interpreter.display().pixels().iter().all(|p| !*p));
}

#[quickcheck]
fn prop_load_places_rom(bytes: Vec<u8>) -> bool {
    let bytes: Vec<u8> = bytes.into_iter().take(MAX_ROM_SIZE).collect();

    let mut interpreter = Interpreter::new();
    let pristine = Interpreter::new();

    if interpreter.load(&bytes).is_err() {
        return false;
    }

    let memory = interpreter.memory();
    let end = START_ROM + bytes.len();

    memory[START_ROM..end] == bytes[..]
        && memory[..START_ROM] == pristine.memory()[..START_ROM]
        && memory[end..].iter().all(|b| *b == 0)
}

#[test]
fn test_load_too_large() {
    let mut interpreter = Interpreter::new();

    let result = interpreter.load(&vec![0x12; MAX_ROM_SIZE + 1]);

    assert_matches!(result, Err(Error::RomTooLarge { .. }));
    assert!(interpreter.memory()[START_ROM..].iter().all(|b| *b == 0));
}

#[test]
fn test_load_file() {
    let path = std::env::temp_dir().join(format!("chip8vm-test-{}.ch8", std::process::id()));
    std::fs::write(&path, [0x6A, 0x42]).unwrap();

    let mut interpreter = Interpreter::new();
    let result = interpreter.load_file(&path);
    std::fs::remove_file(&path).unwrap();

    assert_ok!(result);
    assert_ok!(interpreter.step());
    assert_eq!(interpreter.register(0xA), 0x42);
}

#[test]
fn test_load_file_unreadable() {
    let mut interpreter = Interpreter::new();

    let error = interpreter.load_file("does/not/exist.ch8").unwrap_err();

    assert!(!error.is_fatal());
    assert_matches!(error, Error::RomUnreadable { .. });
}

#[test]
fn test_call_then_return() {
    // CALL 0x206; (skipped); (skipped); RET
    let rom: &[u8] = &[0x22, 0x06, 0x00, 0xE0, 0x00, 0xE0, 0x00, 0xEE];
    let mut interpreter = Interpreter::with_rom(rom).unwrap();

    assert_ok!(interpreter.step());
    assert_eq!(interpreter.pc(), 0x206);

    assert_ok!(interpreter.step());
    assert_eq!(interpreter.pc(), 0x202);

    // A second return has nothing left to pop
    let rom: &[u8] = &[0x00, 0xEE];
    let mut interpreter = Interpreter::with_rom(rom).unwrap();
    let error = interpreter.step().unwrap_err();

    assert!(error.is_fatal());
    assert_eq!(interpreter.pc(), 0x200);
}

#[test]
fn test_draw_glyph_twice() {
    // LD V0, 0x0A; LD F, V0; DRW V1, V2, 5; DRW V1, V2, 5
    let rom: &[u8] = &[0x60, 0x0A, 0xF0, 0x29, 0xD1, 0x25, 0xD1, 0x25];
    let mut interpreter = Interpreter::with_rom(rom).unwrap();

    assert_ok!(interpreter.step());
    assert_ok!(interpreter.step());
    assert_eq!(interpreter.index() as usize, FONT_START + 5 * 10);

    assert_ok!(interpreter.step());
    assert_eq!(interpreter.register(0xF), 0);
    // "A" is 0xF0 0x90 0xF0 0x90 0x90
    assert!(interpreter.display().pixel(0, 0));
    assert!(interpreter.display().pixel(3, 4));
    assert!(!interpreter.display().pixel(1, 4));

    assert_ok!(interpreter.step());
    assert_eq!(interpreter.register(0xF), 1);
    assert!(interpreter.display().pixels().iter().all(|p| !*p));
}

#[test]
fn test_store_bcd() {
    // LD V5, 234; LD I, 0x300; LD B, V5; LD V2, [I]
    let rom: &[u8] = &[0x65, 0xEA, 0xA3, 0x00, 0xF5, 0x33, 0xF2, 0x65];
    let mut interpreter = Interpreter::with_rom(rom).unwrap();

    for _ in 0..4 {
        assert_ok!(interpreter.step());
    }

    assert_eq!(interpreter.memory()[0x300..0x303], [2, 3, 4]);
    assert_eq!((interpreter.register(0), interpreter.register(1), interpreter.register(2)), (2, 3, 4));
}

#[test]
fn test_wait_for_key_then_skip() {
    // LD V3, K; SKP V3; JP 0x200; JP 0x206
    let rom: &[u8] = &[0xF3, 0x0A, 0xE3, 0x9E, 0x12, 0x00, 0x12, 0x06];
    let mut interpreter = Interpreter::with_rom(rom).unwrap();

    assert_ok!(interpreter.step());
    assert_eq!(interpreter.pc(), 0x200);

    interpreter.keyboard_mut().press_key(0x5);

    assert_ok!(interpreter.step());
    assert_eq!(interpreter.register(3), 0x5);

    assert_ok!(interpreter.step());
    assert_eq!(interpreter.pc(), 0x206);
}

#[test]
fn test_sound_timer_counts_down() {
    // LD V0, 3; LD ST, V0; JP 0x204
    let rom: &[u8] = &[0x60, 0x03, 0xF0, 0x18, 0x12, 0x04];
    let mut interpreter = Interpreter::with_rom(rom).unwrap();

    assert_ok!(interpreter.step());
    assert_ok!(interpreter.step());
    assert_eq!(interpreter.sound_timer(), 2);

    assert_ok!(interpreter.step());
    assert_ok!(interpreter.step());
    assert_eq!(interpreter.sound_timer(), 0);

    assert_ok!(interpreter.step());
    assert_eq!(interpreter.sound_timer(), 0);
    assert_eq!(interpreter.delay_timer(), 0);
}

#[test]
fn test_unknown_opcode_is_recoverable() {
    let rom: &[u8] = &[0x80, 0x1F];
    let mut interpreter = Interpreter::with_rom(rom).unwrap();

    let error = interpreter.step().unwrap_err();

    assert!(!error.is_fatal());
    assert_matches!(error, Error::UnknownOpcode { opcode: 0x801F, address: 0x200 });

    interpreter.reset();
    assert_ok!(interpreter.load(&[0x60, 0x01]));
    assert_ok!(interpreter.step());
    assert_eq!(interpreter.register(0), 1);
}

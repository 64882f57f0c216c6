//! Data-driven instruction scenarios from `tests/data/*.json`.
//!
//! Each file holds a list of scenarios: a program loaded at 0x1000, an
//! initial register and memory state, a number of instructions to step,
//! and the expected state and total cycle count afterwards. Values are
//! hex strings.

mod common;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use common::{init_logging, Machine};
use cpu_m68k::Register;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Scenario {
    name: String,
    program: Vec<String>,
    #[serde(default = "one")]
    steps: usize,
    cycles: Option<u32>,
    #[serde(default)]
    initial: State,
    expected: State,
}

#[derive(Debug, Default, Deserialize)]
struct State {
    #[serde(default)]
    registers: BTreeMap<String, String>,
    #[serde(default)]
    memory: Vec<Block>,
}

#[derive(Debug, Deserialize)]
struct Block {
    address: String,
    bytes: String,
}

const fn one() -> usize {
    1
}

fn hex(s: &str) -> u32 {
    u32::from_str_radix(s, 16).unwrap_or_else(|e| panic!("bad hex {s:?}: {e}"))
}

fn bytes(s: &str) -> Vec<u8> {
    (0..s.len())
        .step_by(2)
        .map(|i| hex(&s[i..i + 2]) as u8)
        .collect()
}

fn register(name: &str) -> Register {
    let index = match name {
        "pc" => return Register::Pc,
        "sr" => return Register::Sr,
        _ if name.starts_with('d') => hex(&name[1..]),
        _ if name.starts_with('a') => 8 + hex(&name[1..]),
        _ => panic!("unknown register {name}"),
    };
    Register::try_from(index).unwrap_or_else(|e| panic!("{name}: {e}"))
}

fn run(scenario: &Scenario) -> Result<(), String> {
    let program: Vec<u16> = scenario.program.iter().map(|w| hex(w) as u16).collect();
    let mut m = Machine::new(&program);

    for block in &scenario.initial.memory {
        for (i, byte) in bytes(&block.bytes).into_iter().enumerate() {
            m.poke_byte(hex(&block.address) + i as u32, byte);
        }
    }
    for (name, value) in &scenario.initial.registers {
        m.cpu.set_register(register(name), hex(value));
    }

    let cycles: u32 = (0..scenario.steps).map(|_| m.cpu.step()).sum();

    let mut errors = Vec::new();
    if let Some(expected) = scenario.cycles.filter(|&c| c != cycles) {
        errors.push(format!("cycles: expected {expected}, got {cycles}"));
    }
    for (name, value) in &scenario.expected.registers {
        let actual = m.cpu.get_register(register(name));
        if actual != hex(value) {
            errors.push(format!("{name}: expected {value}, got {actual:08X}"));
        }
    }
    for block in &scenario.expected.memory {
        let base = hex(&block.address);
        for (i, byte) in bytes(&block.bytes).into_iter().enumerate() {
            let address = base + i as u32;
            let actual = m.peek_byte(address);
            if actual != byte {
                errors.push(format!("[{address:06X}]: expected {byte:02X}, got {actual:02X}"));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join(", "))
    }
}

#[test]
fn json_scenarios() {
    init_logging();
    let pattern = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/*.json");
    let mut total = 0;
    let mut failures = Vec::new();

    for path in glob::glob(pattern).expect("valid glob pattern").flatten() {
        let scenarios = load(&path);
        for scenario in &scenarios {
            total += 1;
            if let Err(e) = run(scenario) {
                failures.push(format!("{}: {}: {e}", path.display(), scenario.name));
            }
        }
    }

    assert!(total > 0, "no scenarios found under tests/data");
    assert!(failures.is_empty(), "{} of {total} failed:\n{}", failures.len(), failures.join("\n"));
}

fn load(path: &Path) -> Vec<Scenario> {
    let text = fs::read_to_string(path).unwrap_or_else(|e| panic!("{}: {e}", path.display()));
    serde_json::from_str(&text).unwrap_or_else(|e| panic!("{}: {e}", path.display()))
}

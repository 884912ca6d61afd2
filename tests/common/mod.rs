#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use stream_bf::{Engine, Render};

/// Final state of a program run: visited cells, pointer, and output lines.
#[derive(Debug, PartialEq, Eq)]
pub struct Outcome {
    pub cells: BTreeMap<i64, u8>,
    pub pointer: i64,
    pub output: Vec<String>,
}

/// Run `code` through the streaming engine, rendering `.` as decimal.
pub fn stream(code: &str) -> anyhow::Result<Outcome> {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let sink = lines.clone();

    let mut engine = Engine::new();
    engine.set_render(Render::Decimal);
    engine.set_output_sink(move |line| sink.lock().unwrap().push(line.to_string()));

    for &byte in code.as_bytes() {
        engine.process(byte)?;
    }
    engine.finish()?;

    let output = lines.lock().unwrap().clone();
    Ok(Outcome {
        cells: engine.tape().cells().collect(),
        pointer: engine.tape().pointer(),
        output,
    })
}

/// Classic jump-table interpreter over the whole program, used as the
/// reference the streaming engine must agree with.
pub fn reference(code: &str) -> Outcome {
    let program: Vec<u8> = code
        .bytes()
        .filter(|b| b"+-<>[].".contains(b))
        .collect();

    let mut jumps = vec![0usize; program.len()];
    let mut stack = Vec::new();
    for (i, &b) in program.iter().enumerate() {
        match b {
            b'[' => stack.push(i),
            b']' => {
                let open = stack.pop().expect("balanced test program");
                jumps[open] = i;
                jumps[i] = open;
            }
            _ => {}
        }
    }
    assert!(stack.is_empty(), "balanced test program");

    let mut cells = BTreeMap::from([(0i64, 0u8)]);
    let mut pointer = 0i64;
    let mut output = Vec::new();
    let mut ip = 0;

    while ip < program.len() {
        let cell = cells.entry(pointer).or_insert(0);
        match program[ip] {
            b'+' => *cell = cell.wrapping_add(1),
            b'-' => *cell = cell.wrapping_sub(1),
            b'>' => {
                pointer += 1;
                cells.entry(pointer).or_insert(0);
            }
            b'<' => {
                pointer = (pointer - 1).max(0);
            }
            b'.' => output.push(cell.to_string()),
            b'[' if *cell == 0 => ip = jumps[ip],
            b']' if *cell != 0 => ip = jumps[ip],
            _ => {}
        }
        ip += 1;
    }

    Outcome {
        cells,
        pointer,
        output,
    }
}

pub const HELLO_WORLD: &str = "++++++++++
[
>+++++++
>++++++++++
>+++
<<<-
]
>++.
>+.
+++++++..
+++.
>++.
<<+++++++++++++++.
>.
+++.
------.
--------.
>+.
";

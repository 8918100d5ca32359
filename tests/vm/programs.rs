//! Larger programs exercising control flow, calls, and output together.

use lantern_foundation::{Tag, Value};
use lantern_storage::{ProgramBuilder, ProgramStore};
use lantern_vm::{BufferSink, CodeBuilder, Opcode, run};

/// Emits `Push32 JumpTarget 0` and returns its position for patching.
fn forward_jump(code: &mut CodeBuilder, op: Opcode) -> usize {
    let at = code.position();
    code.push_wide(Tag::JumpTarget, 0).op(op);
    at
}

fn here(code: &CodeBuilder) -> i32 {
    i32::try_from(code.position()).unwrap()
}

/// `fact(n)` computed recursively, printed by main.
fn factorial(n: i32) -> ProgramStore {
    let mut main = CodeBuilder::new();
    main.push(Tag::Integer, n)
        .push(Tag::Integer, 1)
        .push(Tag::Node, 1)
        .op(Opcode::Call)
        .op(Opcode::StackDup)
        .op(Opcode::Say)
        .op(Opcode::Return);

    // fact(n): if n <= 1 return 1 else return n * fact(n - 1)
    let mut fact = CodeBuilder::new();
    fact.push(Tag::LocalVar, 0)
        .push(Tag::Integer, 1)
        .op(Opcode::Compare);
    let base = forward_jump(&mut fact, Opcode::JumpLessThanEqual);
    fact.push(Tag::LocalVar, 0)
        .push(Tag::LocalVar, 0)
        .push(Tag::Integer, 1)
        .op(Opcode::Sub)
        .push(Tag::Integer, 1)
        .push(Tag::Node, 1)
        .op(Opcode::Call)
        .op(Opcode::Mult)
        .op(Opcode::Return);
    let target = here(&fact);
    fact.patch_wide(base, target);
    fact.push(Tag::Integer, 1).op(Opcode::Return);

    ProgramBuilder::new()
        .function_body(0, 0, 0, main.as_bytes())
        .function_body(1, 1, 0, fact.as_bytes())
        .build()
}

#[test]
fn recursive_factorial() {
    let store = factorial(6);
    let mut sink = BufferSink::new();
    assert_eq!(run(&store, &mut sink).unwrap(), Value::integer(720));
    assert_eq!(sink.output(), "720");
}

#[test]
fn factorial_survives_encoding() {
    let store = factorial(5);
    let loaded = lantern_storage::load(&store.encode().unwrap()).unwrap();
    assert_eq!(run(&loaded, BufferSink::new()).unwrap(), Value::integer(120));
}

#[test]
fn loop_prints_a_countdown() {
    let mut builder = ProgramBuilder::new();
    let sep = builder.string(", ");
    let done = builder.string("liftoff!");

    // local 0 = 3; while local 0 > 0 { say local 0; say ", "; local 0 -= 1 }
    let mut code = CodeBuilder::new();
    code.push(Tag::Integer, 3)
        .push(Tag::LocalVar, 0)
        .op(Opcode::Store);
    let top = here(&code);
    code.push(Tag::LocalVar, 0);
    let exit = forward_jump(&mut code, Opcode::JumpLessThanEqual);
    code.push(Tag::LocalVar, 0)
        .op(Opcode::Say)
        .push(Tag::String, sep)
        .op(Opcode::Say)
        .push(Tag::LocalVar, 0)
        .push(Tag::Integer, 1)
        .op(Opcode::Sub)
        .push(Tag::LocalVar, 0)
        .op(Opcode::Store)
        .push(Tag::JumpTarget, top)
        .op(Opcode::Jump);
    let end = here(&code);
    code.patch_wide(exit, end);
    code.push(Tag::String, done).op(Opcode::Say).op(Opcode::Return);

    // Padding function first so the loop does not start at position 0.
    let store = builder
        .main_function(1)
        .function_body(0, 0, 0, &[0, 0, 0, 0, 0])
        .function_body(1, 0, 1, code.as_bytes())
        .build();
    let mut sink = BufferSink::new();
    run(&store, &mut sink).unwrap();
    assert_eq!(sink.output(), "3, 2, 1, liftoff!");
}

#[test]
fn compare_types_drives_branching() {
    // Prints "same" if the two values share a tag, otherwise "different".
    fn classify(a: Value, b: Value) -> String {
        let mut builder = ProgramBuilder::new();
        let same = builder.string("same");
        let different = builder.string("different");
        let mut code = CodeBuilder::new();
        code.push(a.tag(), a.payload())
            .push(b.tag(), b.payload())
            .op(Opcode::CompareTypes);
        let jump = forward_jump(&mut code, Opcode::JumpNotZero);
        code.push(Tag::String, same).op(Opcode::Say).op(Opcode::Return);
        let target = here(&code);
        code.patch_wide(jump, target);
        code.push(Tag::String, different)
            .op(Opcode::Say)
            .op(Opcode::Return);
        let store = builder.function_body(0, 0, 0, code.as_bytes()).build();
        let mut sink = BufferSink::new();
        run(&store, &mut sink).unwrap();
        sink.take_output()
    }

    assert_eq!(classify(Value::integer(1), Value::integer(2)), "same");
    assert_eq!(
        classify(Value::integer(1), Value::new(Tag::Object, 1)),
        "different"
    );
}

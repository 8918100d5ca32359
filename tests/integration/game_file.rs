//! End-to-end tests over encoded game files.

use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::path::PathBuf;

use lantern::foundation::{Result, Tag, Value};
use lantern::runtime::{ConsoleSink, LineEditor, ReadResult, write_dump};
use lantern::storage::{ProgramBuilder, ProgramStore, load};
use lantern::vm::{CodeBuilder, Opcode, Vm, format_value};
use proptest::prelude::*;

/// Editor that replays scripted lines, then reports EOF.
struct Script(VecDeque<String>);

impl Script {
    fn new(lines: &[&str]) -> Self {
        Self(lines.iter().map(|line| (*line).to_string()).collect())
    }
}

impl LineEditor for Script {
    fn read_line(&mut self, _prompt: &str) -> Result<ReadResult> {
        Ok(self.0.pop_front().map_or(ReadResult::Eof, ReadResult::Line))
    }
}

/// Asks a yes/no question, then describes the room's object accordingly.
fn story() -> ProgramStore {
    let mut builder = ProgramBuilder::new();
    let question = builder.string("Open the mailbox? ");
    let opened = builder.string("Opening the small mailbox reveals a leaflet.");
    let closed = builder.string("The mailbox stays shut.");
    let leaflet = builder.string("leaflet");

    builder.object(
        1,
        BTreeMap::from([(1, Value::new(Tag::String, leaflet))]),
    );

    let mut code = CodeBuilder::new();
    code.push(Tag::String, question)
        .op(Opcode::Say)
        .op(Opcode::WaitKey)
        .push(Tag::Integer, i32::from(b'y'))
        .op(Opcode::Compare);
    let at = code.position();
    code.push_wide(Tag::JumpTarget, 0)
        .op(Opcode::JumpNotZero)
        .push(Tag::String, opened)
        .op(Opcode::Say)
        .push(Tag::Property, 1)
        .push(Tag::Object, 1)
        .op(Opcode::GetProp)
        .op(Opcode::Return);
    let target = i32::try_from(code.position()).unwrap();
    code.patch_wide(at, target);
    code.push(Tag::String, closed)
        .op(Opcode::Say)
        .op(Opcode::Return);

    builder
        .main_function(0)
        .function_body(0, 0, 0, code.as_bytes())
        .build()
}

fn write_game(name: &str, store: &ProgramStore) -> PathBuf {
    let file = format!("lantern-{}-{name}.bin", std::process::id());
    let path = std::env::temp_dir().join(file);
    fs::write(&path, store.encode().unwrap()).unwrap();
    path
}

fn play(store: &ProgramStore, input: &[&str]) -> (Value, String) {
    let mut console = ConsoleSink::new(Script::new(input), Vec::new());
    let result = Vm::new(store, &mut console).run().unwrap();
    let (_, out) = console.into_parts();
    (result, String::from_utf8(out).unwrap())
}

#[test]
fn game_file_runs_from_disk() {
    let path = write_game("mailbox", &story());
    let store = load(&fs::read(&path).unwrap()).unwrap();
    fs::remove_file(&path).ok();

    let (result, out) = play(&store, &["yes"]);
    assert_eq!(
        out,
        "Open the mailbox? Opening the small mailbox reveals a leaflet."
    );
    assert_eq!(format_value(&store, &result).unwrap(), "leaflet");
}

#[test]
fn other_answers_take_the_other_branch() {
    let store = story();
    let (result, out) = play(&store, &["", "no"]);
    assert_eq!(out, "Open the mailbox? The mailbox stays shut.");
    assert_eq!(result, Value::integer(0));
}

#[test]
fn eof_reads_as_none_and_fails_compare() {
    let store = story();
    let mut console = ConsoleSink::new(Script::new(&[]), Vec::new());
    let err = Vm::new(&store, &mut console).run().unwrap_err();
    assert_eq!(
        err.to_string(),
        "tried to compare values of different types (Integer and None)"
    );
}

#[test]
fn dump_lists_the_story() {
    let mut out = Vec::new();
    write_dump(&story(), &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("[0] ~Open the mailbox? ~"));
    assert!(text.contains("[1] { (1, <String 3>) }"));
    assert!(text.contains("[0] args: 0 locals: 0 position: 0"));
}

proptest! {
    #[test]
    fn any_answer_terminates(answer in "[a-z]{1,8}") {
        let store = story();
        let (result, out) = play(&store, &[answer.as_str()]);
        prop_assert!(out.starts_with("Open the mailbox? "));
        if answer.starts_with('y') {
            prop_assert_eq!(result, Value::new(Tag::String, 3));
        } else {
            prop_assert_eq!(result, Value::integer(0));
        }
    }
}

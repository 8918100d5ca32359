//! Integration tests for the binary loader
//!
//! Builds images byte by byte and checks what the loader makes of them.

use lantern_foundation::{ErrorKind, Table, Tag, Value};
use lantern_storage::{FORMAT_VERSION, LoadError, MAGIC, ProgramStore, load};

/// Little-endian image writer for hand-built fixtures.
#[derive(Default)]
struct Image(Vec<u8>);

impl Image {
    fn header(main: u32) -> Self {
        let mut image = Self::default();
        image.u32(MAGIC).u32(FORMAT_VERSION).u32(main);
        image
    }

    fn u8(&mut self, v: u8) -> &mut Self {
        self.0.push(v);
        self
    }

    fn u16(&mut self, v: u16) -> &mut Self {
        self.0.extend(v.to_le_bytes());
        self
    }

    fn u32(&mut self, v: u32) -> &mut Self {
        self.0.extend(v.to_le_bytes());
        self
    }

    fn bytes(&mut self, v: &[u8]) -> &mut Self {
        self.0.extend_from_slice(v);
        self
    }
}

/// One of each table entry and a three-byte code stream.
fn sample() -> Vec<u8> {
    let mut image = Image::header(1);
    // strings
    image.u32(2).u16(5).bytes(b"Hello").u16(0);
    // lists: id 3, [Integer 7, Object -1]
    image.u32(1).u32(3).u16(2).u8(1).u32(7).u8(6).u32(u32::MAX);
    // maps: id 4, {Property 1 => String 0}
    image.u32(1).u32(4).u16(1).u8(7).u32(1).u8(2).u32(0);
    // objects: id 5, {prop 9 => Node 1}
    image.u32(1).u32(5).u16(1).u16(9).u8(5).u32(1);
    // functions: id 1, 0 args, 2 locals, position 0
    image.u32(1).u32(1).u16(0).u16(2).u32(0);
    // code
    image.u32(3).bytes(&[1, 1, 0]);
    image.0
}

#[test]
fn loads_every_table() {
    let store = load(&sample()).unwrap();

    assert_eq!(store.main_function(), 1);
    assert_eq!(store.string(0).unwrap().text, "Hello");
    assert_eq!(store.string(1).unwrap().text, "");
    assert_eq!(
        store.list(3).unwrap().items,
        vec![Value::integer(7), Value::new(Tag::Object, -1)]
    );
    assert_eq!(
        store.map(4).unwrap().lookup(&Value::new(Tag::Property, 1)),
        Some(&Value::new(Tag::String, 0))
    );
    assert_eq!(
        store.object(5).unwrap().property(9),
        Some(&Value::new(Tag::Node, 1))
    );
    let function = store.function(1).unwrap();
    assert_eq!(
        (function.arg_count, function.local_count, function.position),
        (0, 2, 0)
    );
    assert_eq!(store.code(), &[1, 1, 0]);
}

#[test]
fn trailing_bytes_are_ignored() {
    let mut bytes = sample();
    bytes.extend([0xAA, 0xBB]);
    assert_eq!(load(&bytes).unwrap(), load(&sample()).unwrap());
}

#[test]
fn missing_ids_are_not_found() {
    let store = load(&sample()).unwrap();
    let err = store.function(2).unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::NotFound { table: Table::Function, id: 2 }
    ));
    assert!(store.string(2).is_err());
    assert!(store.object(4).is_err());
    assert!(store.list(4).is_err());
    assert!(store.map(3).is_err());
}

#[test]
fn bad_magic() {
    let mut bytes = sample();
    bytes[0] ^= 0xFF;
    assert!(matches!(load(&bytes), Err(LoadError::BadMagic { .. })));
}

#[test]
fn unsupported_version() {
    let mut bytes = sample();
    bytes[4] = 1;
    assert_eq!(
        load(&bytes),
        Err(LoadError::UnsupportedVersion { found: 1 })
    );
}

#[test]
fn truncated_code_fails() {
    let mut bytes = sample();
    bytes.pop();
    assert!(matches!(
        load(&bytes),
        Err(LoadError::Truncated { section: "code", .. })
    ));
}

#[test]
fn empty_input_fails() {
    assert!(matches!(
        load(&[]),
        Err(LoadError::Truncated { section: "header", offset: 0, .. })
    ));
}

#[test]
fn unknown_constant_tag_fails() {
    let mut image = Image::header(0);
    image.u32(0);
    image.u32(1).u32(0).u16(1).u8(42).u32(0);
    assert!(matches!(
        load(&image.0),
        Err(LoadError::InvalidTag { byte: 42, .. })
    ));
}

#[test]
fn invalid_utf8_is_replaced() {
    let mut image = Image::header(0);
    image.u32(1).u16(2).bytes(&[b'a', 0xFF]);
    image.u32(0).u32(0).u32(0).u32(0).u32(0);
    let store = ProgramStore::load(&image.0).unwrap();
    assert_eq!(store.string(0).unwrap().text, "a\u{FFFD}");
}

#[test]
fn duplicate_entries_keep_the_first() {
    let mut image = Image::header(0);
    image.u32(0).u32(0).u32(0);
    // object 4, property 3 declared twice
    image.u32(1).u32(4).u16(2);
    image.u16(3).u8(Tag::Integer.as_u8()).u32(10);
    image.u16(3).u8(Tag::Integer.as_u8()).u32(20);
    // function 1 declared twice
    image.u32(2);
    image.u32(1).u16(0).u16(0).u32(0);
    image.u32(1).u16(2).u16(5).u32(7);
    image.u32(0);
    let store = ProgramStore::load(&image.0).unwrap();
    let object = store.object(4).unwrap();
    assert_eq!(object.property(3), Some(&Value::integer(10)));
    let function = store.function(1).unwrap();
    assert_eq!((function.arg_count, function.local_count, function.position), (0, 0, 0));
}

#[test]
fn error_messages() {
    let err = LoadError::UnsupportedVersion { found: 3 };
    assert!(err.to_string().contains("version 3"));
    let err = LoadError::Truncated {
        section: "maps",
        offset: 40,
        needed: 4,
    };
    assert!(err.to_string().contains("maps"));
}

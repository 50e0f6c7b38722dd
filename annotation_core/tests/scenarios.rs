//! End-to-end scenarios through the session hooks.

use annotation_core::markers::{END_TOKEN, START_TOKEN};
use annotation_core::{
    classify, parse_slots, Category, Config, Hook, Policy, RosterLocator, RosterWriter, Session,
};
use record_store::{MemoryRecordStore, Record, RecordStore};

fn empty_slots(record: &Record) -> usize {
    parse_slots(&record.primary).iter().filter(|s| s.is_empty()).count()
}

#[test]
fn test_butler_annotation_scenario() {
    let mut session = Session::new(MemoryRecordStore::new());
    let text = "The evening begins. #-- The butler James serves tea --#";

    assert_eq!(classify("The butler James serves tea"), Category::Servants);
    let out = session.on_output(text);
    assert_eq!(out, "The evening begins. ");

    let rosters = session.roster_records();
    assert_eq!(rosters.len(), 1);
    let slots = parse_slots(&rosters[0].primary);
    assert_eq!(slots[0].word, "Servant");
    assert_eq!(slots[0].value, "James");
    assert_eq!(empty_slots(rosters[0]), 9);

    let james = session.profile("James").expect("profile for James");
    assert!(james.primary.contains("The butler James serves tea"));

    // The same annotation again is not reprocessed, but is still stripped.
    let before = session.store().clone();
    let out = session.on_output(text);
    assert_eq!(out, "The evening begins. ");
    assert!(!out.contains(START_TOKEN) && !out.contains(END_TOKEN));
    assert_eq!(session.store().all(), before.all());
}

#[test]
fn test_sheet_bulk_init_scenario() {
    let mut store = MemoryRecordStore::new();
    store.add(
        Record::new("Elena", "text")
            .with_primary("Name: Elena\nGender: Female\nSubordinate(s): Anna, Marco\n"),
    );
    let mut session = Session::new(store);

    session.on_context("", false);

    assert!(session.state().initialized_from_sheet);
    let rosters = session.roster_records();
    assert_eq!(rosters.len(), 1);
    let slots = parse_slots(&rosters[0].primary);
    assert_eq!((slots[0].number, slots[0].value), (1, "Anna"));
    assert_eq!((slots[1].number, slots[1].value), (2, "Marco"));

    for name in ["Anna", "Marco"] {
        let profile = session.profile(name).expect("profile");
        assert!(profile.primary.contains("Servant of Elena"));
    }

    let count = session.store().len();
    session.on_context("", false);
    assert_eq!(session.store().len(), count);
    assert_eq!(session.profile_names(), vec!["Anna", "Marco"]);
}

#[test]
fn test_bulk_init_survives_reload() {
    let mut store = MemoryRecordStore::new();
    store.add(Record::new("Sheet", "Character Sheet").with_primary("Subordinate(s): Anna"));
    let mut session = Session::new(store);
    session.on_context("", false);

    let store = session.into_store();
    let count = store.len();
    let mut session = Session::load(store, Policy::default());
    assert!(session.state().initialized_from_sheet);

    session.on_context("", false);
    assert_eq!(session.store().len(), count);
}

#[test]
fn test_slot_fill_overflow_scenario() {
    let config = Config::default();
    let policy = Policy::default();
    let locator = RosterLocator::new(&config, &policy);
    let writer = RosterWriter::new(&config, &policy);
    let mut store = MemoryRecordStore::new();

    let first = locator.locate(&mut store, "servants").unwrap();
    let names: Vec<String> = (1..=11).map(|n| format!("Servant{n:02}")).collect();
    let mut last = first;
    for name in &names {
        last = writer.write(&mut store, first, name).unwrap().record;
    }

    assert_eq!(store.len(), 2);
    assert_ne!(last, first);
    assert_eq!(empty_slots(store.find(first).unwrap()), 0);
    assert!(!store.find(first).unwrap().primary.contains("Servant11"));
    let continuation = store.find(last).unwrap();
    assert_eq!(continuation.title, "Servants List 2");
    assert_eq!(parse_slots(&continuation.primary)[0].value, "Servant11");
}

#[test]
fn test_many_annotations_stay_within_capacity() {
    let mut session = Session::new(MemoryRecordStore::new());
    session.set_config(Config {
        capacity_limit: 150,
        ..Config::default()
    });

    for n in 0..30 {
        session.on_output(&format!("#-- The old place number {n} has a hidden door --#"));
    }

    let rosters = session.roster_records();
    assert!(rosters.len() > 1);
    assert!(rosters.iter().all(|r| r.char_len() <= 150));
    assert!(rosters.iter().all(|r| r.title.starts_with("Locations List ")));
}

#[test]
fn test_disable_via_command_then_reenable() {
    let mut session = Session::new(MemoryRecordStore::new());

    let (input, _) = session.handle(Hook::Input, "Wait. /annotate disable", false);
    assert_eq!(input, "Wait. ");
    let (out, _) = session.handle(Hook::Output, "#-- The maid Rosa --#", false);
    assert_eq!(out, "#-- The maid Rosa --#");
    assert!(session.store().is_empty());

    session.handle(Hook::Input, "/annotate enable", false);
    let (out, _) = session.handle(Hook::Output, "#-- The maid Rosa --#", false);
    assert_eq!(out, "");
    assert!(session.profile("Rosa").is_some());
}

#[test]
fn test_duplicate_lines_removed_after_batch() {
    let mut store = MemoryRecordStore::new();
    store.add(Record::new("Items List 1", "Lists").with_primary("Items List (continued)\n\n• sword\n• sword\n"));
    let mut session = Session::new(store);

    session.on_output("#-- A rusty weapon --#");

    let items = session.store().find_by_title("Items List 1").unwrap();
    assert_eq!(items.primary, "Items List (continued)\n\n• sword\n• A rusty weapon\n");
}

#[test]
fn test_character_then_butler_files_into_separate_rosters() {
    let mut session = Session::new(MemoryRecordStore::new());

    session.on_output("#-- A new NPC named Bob --#");
    session.on_output("#-- The butler James serves tea --#");

    let characters = session.store().find_by_title("Characters List 1").unwrap();
    assert!(characters.primary.contains("• A new NPC named Bob"));
    assert!(!characters.primary.contains("James"));

    let servants = session.store().find_by_title("Servants List 1").unwrap();
    let slots = parse_slots(&servants.primary);
    assert_eq!((slots[0].word, slots[0].value), ("Servant", "James"));
    assert_eq!(session.roster_records().len(), 2);
}

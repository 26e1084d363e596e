//! Integration tests for the document store.
//!
//! These tests open several store handles on the same real directory and
//! exercise the locked read-modify-write cycle between them.

use std::fs;
use std::path::Path;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;
use toml::{Table, Value};

use cacophony_config::core::clock::FixedClock;
use cacophony_config::core::codec::coerce;
use cacophony_config::core::ops::lock::DocumentLock;
use cacophony_config::core::registry::Registry;
use cacophony_config::core::sections::{Audio, Device, Location, TestHosts, Windows};
use cacophony_config::core::store::{Store, StoreError};

// =============================================================================
// Test Fixtures
// =============================================================================

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 7, 14, 9, 30, 0).unwrap()
}

fn open(dir: &Path) -> Store {
    Store::builder(dir)
        .lock_timeout(Duration::from_secs(5))
        .open()
        .expect("open store")
}

fn open_with_clock(dir: &Path, clock: &Arc<FixedClock>) -> Store {
    Store::builder(dir)
        .clock(clock.clone())
        .lock_timeout(Duration::from_secs(5))
        .open()
        .expect("open store")
}

fn on_disk(dir: &Path) -> Table {
    let text = fs::read_to_string(dir.join("config.toml")).unwrap_or_default();
    text.parse().expect("document parses")
}

fn updated(store: &Store, section: &str) -> Option<DateTime<Utc>> {
    let value = store.get(&format!("{}.updated", section))?;
    coerce::to_timestamp(value).expect("updated is a timestamp")
}

fn table(text: &str) -> Table {
    toml::from_str(text).unwrap()
}

// =============================================================================
// Isolation and ordering
// =============================================================================

#[test]
fn writes_to_different_sections_are_both_kept() {
    let temp = TempDir::new().unwrap();
    let mut a = open(temp.path());
    let mut b = open(temp.path());

    a.set_field("location", "latitude", "-43.5", false).unwrap();
    // b's in-memory copy predates a's write
    b.set_field("device", "name", "pi-7", false).unwrap();

    let disk = on_disk(temp.path());
    assert_eq!(disk["location"]["latitude"].as_float(), Some(-43.5));
    assert_eq!(disk["device"]["name"].as_str(), Some("pi-7"));

    // b saw a's change when it reloaded under the lock
    assert_eq!(b.get("location.latitude"), Some(&Value::Float(-43.5)));
}

#[test]
fn same_section_last_writer_wins() {
    let temp = TempDir::new().unwrap();
    let mut a = open(temp.path());
    let mut b = open(temp.path());

    a.set(&Windows::defaults()).unwrap();
    b.set(&Windows {
        power_on: "06:00".into(),
        ..Windows::defaults()
    })
    .unwrap();

    let reopened = open(temp.path());
    let windows: Windows = reopened.unmarshal().unwrap();
    assert_eq!(windows.power_on, "06:00");
}

#[test]
fn reads_are_stale_until_update() {
    let temp = TempDir::new().unwrap();
    let mut reader = open(temp.path());
    let mut writer = open(temp.path());

    writer.set_field("device", "id", "42", false).unwrap();
    assert!(reader.get("device.id").is_none());

    reader.update().unwrap();
    assert_eq!(reader.get("device.id"), Some(&Value::Integer(42)));
}

#[test]
fn concurrent_threads_each_keep_their_section() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().to_path_buf();
    let writes = [
        ("device", "name", "pi-1"),
        ("audio", "card", "2"),
        ("ports", "managementd", "8080"),
        ("gpio", "modem-power", "GPIO5"),
        ("lepton", "spi-speed", "3000000"),
        ("windows", "power-off", "23:00"),
    ];
    let barrier = Arc::new(Barrier::new(writes.len()));

    let handles: Vec<_> = writes
        .iter()
        .map(|&(section, field, value)| {
            let dir = dir.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                let mut store = open(&dir);
                barrier.wait();
                store.set_field(section, field, value, false).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("writer thread");
    }

    let store = open(&dir);
    assert_eq!(store.get("device.name").and_then(Value::as_str), Some("pi-1"));
    assert_eq!(store.get("audio.card"), Some(&Value::Integer(2)));
    assert_eq!(store.get("ports.managementd"), Some(&Value::Integer(8080)));
    assert_eq!(
        store.get("gpio.modem-power").and_then(Value::as_str),
        Some("GPIO5")
    );
    assert_eq!(store.get("lepton.spi-speed"), Some(&Value::Integer(3_000_000)));
    assert_eq!(
        store.get("windows.power-off").and_then(Value::as_str),
        Some("23:00")
    );
}

// =============================================================================
// Change tracking
// =============================================================================

#[test]
fn every_mutation_stamps_its_section() {
    let temp = TempDir::new().unwrap();
    let clock = Arc::new(FixedClock::new(t0()));
    let mut store = open_with_clock(temp.path(), &clock);

    store.set(&Device {
        id: 1,
        name: "pi".into(),
        ..Default::default()
    })
    .unwrap();
    assert_eq!(updated(&store, "device"), Some(t0()));
    assert!(updated(&store, "location").is_none());

    clock.advance(chrono::Duration::minutes(1));
    store.set_field("device", "group", "orchard", false).unwrap();
    assert_eq!(updated(&store, "device"), Some(t0() + chrono::Duration::minutes(1)));

    clock.advance(chrono::Duration::minutes(1));
    store
        .set_from_map("location", table("latitude = 1.0"), false)
        .unwrap();
    assert_eq!(updated(&store, "location"), Some(t0() + chrono::Duration::minutes(2)));

    clock.advance(chrono::Duration::minutes(1));
    store.unset("device.group").unwrap();
    assert_eq!(updated(&store, "device"), Some(t0() + chrono::Duration::minutes(3)));

    // Stamp is persisted as a TOML datetime
    let disk = on_disk(temp.path());
    assert!(matches!(disk["device"]["updated"], Value::Datetime(_)));
}

#[test]
fn failed_write_leaves_updated_unchanged() {
    let temp = TempDir::new().unwrap();
    let clock = Arc::new(FixedClock::new(t0()));
    let mut store = open_with_clock(temp.path(), &clock);
    store.set_field("audio", "card", "1", false).unwrap();

    clock.advance(chrono::Duration::hours(1));
    assert!(store.set_field("audio", "card", "one", false).is_err());
    assert!(store
        .set_from_map("audio", table("nonsense = 1"), false)
        .is_err());

    assert_eq!(updated(&store, "audio"), Some(t0()));
    let reopened = open(temp.path());
    assert_eq!(updated(&reopened, "audio"), Some(t0()));
}

#[test]
fn reads_never_stamp() {
    let temp = TempDir::new().unwrap();
    let mut store = open(temp.path());
    store.set_field("audio", "card", "1", false).unwrap();
    let before = fs::read_to_string(temp.path().join("config.toml")).unwrap();

    let _: Audio = store.unmarshal().unwrap();
    let _ = store.get("audio.card");
    store.update().unwrap();

    let after = fs::read_to_string(temp.path().join("config.toml")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn hand_edited_section_names_ignore_case() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("config.toml"), "[Audio]\ncard = 3\n").unwrap();

    let mut store = open(temp.path());
    let audio: Audio = store.unmarshal().unwrap();
    assert_eq!(audio.card, 3);

    store.set_field("audio", "directory", "/var/audio", false).unwrap();
    let disk = on_disk(temp.path());
    assert!(disk.get("Audio").is_none());
    assert_eq!(disk["audio"]["card"].as_integer(), Some(3));
    assert_eq!(disk["audio"]["directory"].as_str(), Some("/var/audio"));
}

// =============================================================================
// Schema enforcement
// =============================================================================

#[test]
fn set_from_map_force_semantics() {
    let temp = TempDir::new().unwrap();
    let mut store = open(temp.path());

    let strict = store.set_from_map("audio", table("bogus-key = 'x'"), false);
    assert!(matches!(strict, Err(StoreError::InvalidField { .. })));
    assert!(!temp.path().join("config.toml").exists());

    store
        .set_from_map("audio", table("bogus-key = 'x'"), true)
        .unwrap();
    assert_eq!(store.get("audio.bogus-key").and_then(Value::as_str), Some("x"));
    assert_eq!(
        open(temp.path()).get("audio.bogus-key").and_then(Value::as_str),
        Some("x")
    );
}

#[test]
fn partial_field_update_keeps_siblings() {
    let temp = TempDir::new().unwrap();
    let mut store = open(temp.path());
    store
        .set(&Audio {
            directory: "/a".into(),
            card: 0,
            volume_control: "PCM".into(),
        })
        .unwrap();

    store.set_field("audio", "card", "5", false).unwrap();

    let audio: Audio = open(temp.path()).unmarshal().unwrap();
    assert_eq!(
        audio,
        Audio {
            directory: "/a".into(),
            card: 5,
            volume_control: "PCM".into(),
        }
    );
}

#[test]
fn set_from_map_omits_zero_values() {
    let temp = TempDir::new().unwrap();
    let mut store = open(temp.path());
    store.set_field("test-hosts", "ping-retries", "9", false).unwrap();

    store
        .set_from_map(
            "test-hosts",
            table("urls = ['1.1.1.1']\nping-wait-time = '0s'\nping-retries = 0"),
            false,
        )
        .unwrap();

    let section = on_disk(temp.path())["test-hosts"].as_table().unwrap().clone();
    assert!(section.contains_key("urls"));
    assert!(!section.contains_key("ping-wait-time"));
    assert!(!section.contains_key("ping-retries"));

    let mut hosts = TestHosts::defaults();
    store.unmarshal_into(&mut hosts).unwrap();
    assert_eq!(hosts.urls, vec!["1.1.1.1"]);
    assert_eq!(hosts.ping_retries, TestHosts::defaults().ping_retries);
}

#[test]
fn custom_registry_limits_sections() {
    let temp = TempDir::new().unwrap();
    let registry = Registry::builder()
        .register::<Location>()
        .unwrap()
        .build();
    let mut store = Store::builder(temp.path())
        .registry(Arc::new(registry))
        .open()
        .unwrap();

    assert!(matches!(
        store.set_field("audio", "card", "1", false),
        Err(StoreError::UnknownSection(_))
    ));
    store.set_field("location", "accuracy", "3.5", false).unwrap();
}

#[test]
fn stored_corruption_is_a_decode_error() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("config.toml"),
        "[location]\nlatitude = 'north'\n",
    )
    .unwrap();
    let store = open(temp.path());
    assert!(matches!(
        store.unmarshal::<Location>(),
        Err(StoreError::Decode(_))
    ));
}

// =============================================================================
// Locking
// =============================================================================

#[test]
fn lock_contention_times_out_then_succeeds() {
    let temp = TempDir::new().unwrap();
    let mut store = Store::builder(temp.path())
        .lock_timeout(Duration::from_millis(300))
        .open()
        .unwrap();

    let held = DocumentLock::acquire(&store.paths().lock_path(), Duration::ZERO).unwrap();
    let result = store.set_field("device", "id", "3", false);
    assert!(matches!(result, Err(StoreError::LockTimeout { .. })));
    assert!(!temp.path().join("config.toml").exists());

    drop(held);
    store.set_field("device", "id", "3", false).unwrap();
    assert_eq!(on_disk(temp.path())["device"]["id"].as_integer(), Some(3));
}

#[test]
fn open_waits_for_lock() {
    let temp = TempDir::new().unwrap();
    let lock_path = temp.path().join("config.toml.lock");
    let held = DocumentLock::acquire(&lock_path, Duration::ZERO).unwrap();

    let result = Store::builder(temp.path())
        .lock_timeout(Duration::from_millis(200))
        .open();
    assert!(matches!(result, Err(StoreError::LockTimeout { .. })));
    drop(held);
}

#[test]
fn lock_path_can_be_overridden() {
    let temp = TempDir::new().unwrap();
    let lock_path = temp.path().join("run").join("config.lock");
    let mut store = Store::builder(temp.path().join("etc"))
        .lock_path(&lock_path)
        .open()
        .unwrap();

    store.set_field("device", "name", "pi", false).unwrap();
    assert!(lock_path.exists());
    assert!(!temp.path().join("etc").join("config.toml.lock").exists());
}

// =============================================================================
// Unset
// =============================================================================

#[test]
fn unset_granularity() {
    let temp = TempDir::new().unwrap();
    let mut store = open(temp.path());
    store
        .set_from_map(
            "location",
            table("latitude = -43.5\nlongitude = 172.6\naltitude = 10.0"),
            false,
        )
        .unwrap();

    store.unset("location.latitude").unwrap();
    let location: Location = store.unmarshal().unwrap();
    assert_eq!(location.latitude, 0.0);
    assert_eq!(location.longitude, 172.6);

    assert!(matches!(
        store.unset("location.longitude.foo"),
        Err(StoreError::InvalidPath(_))
    ));

    store.unset("location").unwrap();
    let location: Location = open(temp.path()).unmarshal().unwrap();
    assert_eq!(location, Location::default());
}

// =============================================================================
// Batches
// =============================================================================

#[test]
fn batch_reaches_disk_only_on_write() {
    let temp = TempDir::new().unwrap();
    let mut batch = open(temp.path());
    batch.set_auto_write(false);

    batch.set_field("windows", "power-on", "-1h", false).unwrap();
    batch.set_field("windows", "power-off", "+1h", false).unwrap();
    assert!(batch.has_pending_writes());
    assert!(!temp.path().join("config.toml").exists());

    // Another process writes a different section mid-batch
    let mut other = open(temp.path());
    other.set_field("device", "name", "pi-9", false).unwrap();

    batch.write().unwrap();

    let disk = on_disk(temp.path());
    assert_eq!(disk["windows"]["power-on"].as_str(), Some("-1h"));
    assert_eq!(disk["windows"]["power-off"].as_str(), Some("+1h"));
    assert_eq!(disk["device"]["name"].as_str(), Some("pi-9"));
}

#[test]
fn failed_batch_writes_nothing() {
    let temp = TempDir::new().unwrap();
    let mut store = open(temp.path());
    store.set_field("device", "name", "before", false).unwrap();
    let before = fs::read_to_string(temp.path().join("config.toml")).unwrap();

    store.set_auto_write(false);
    store.set_field("device", "name", "after", false).unwrap();
    assert!(store.set_field("device", "nope", "x", false).is_err());
    store.discard().unwrap();

    let after = fs::read_to_string(temp.path().join("config.toml")).unwrap();
    assert_eq!(before, after);
    assert_eq!(store.get("device.name").and_then(Value::as_str), Some("before"));
}

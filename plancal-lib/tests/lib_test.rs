use anyhow::Result;
use chrono::{Duration, NaiveDate};
use plancal_lib::{
    monday_of, throttle::CoalescingTimer, Bounds, CalendarService, Config, ConfigError,
    DateWindow, DismissReason,
    DragController, DragError, DragPayload, DropDecision, DropOutcome, EntryKind, FileSizeStore,
    MemorySizeStore, ModalError, ModalManager, ModalPhase, ModalTarget, PickOutcome, PlanRecord,
    Position, ReloadOutcome, ResizeHandle, SaveOutcome, ScrollMetrics, ServiceError, Size,
    SizeConstraints, SizeStore, SqliteStore, StoreError, ValidationError, ViewportProbe,
    WeekStep, WindowManager, WorkoutEntry, WorkoutIndex, WorkoutStore, MAX_CONFIGURED_WEEKS,
};
use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::time::{Duration as StdDuration, Instant};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

fn record(id: i64, day: &str, kind: &str, description: &str) -> PlanRecord {
    PlanRecord {
        id: Some(id),
        date: day.to_string(),
        kind: Some(kind.to_string()),
        description: Some(description.to_string()),
        ..Default::default()
    }
}

// Store double that records every call in order.
#[derive(Default)]
struct RecordingStore {
    records: RefCell<Vec<PlanRecord>>,
    calls: RefCell<Vec<String>>,
    fail_writes: Cell<bool>,
    next_id: Cell<i64>,
}

impl RecordingStore {
    fn with_records(records: Vec<PlanRecord>) -> Self {
        let store = Self::default();
        store.next_id.set(100);
        *store.records.borrow_mut() = records;
        store
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    fn failure(&self) -> Result<(), StoreError> {
        if self.fail_writes.get() {
            Err(StoreError::Status {
                status: 500,
                body: "boom".into(),
            })
        } else {
            Ok(())
        }
    }
}

impl WorkoutStore for RecordingStore {
    fn load_all(&self) -> Result<Vec<PlanRecord>, StoreError> {
        self.calls.borrow_mut().push("load".into());
        Ok(self.records.borrow().clone())
    }

    fn create(&self, record: &PlanRecord) -> Result<i64, StoreError> {
        self.calls.borrow_mut().push(format!("create {}", record.date));
        self.failure()?;
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let mut stored = record.clone();
        stored.id = Some(id);
        self.records.borrow_mut().push(stored);
        Ok(id)
    }

    fn update(&self, id: i64, record: &PlanRecord) -> Result<(), StoreError> {
        self.calls.borrow_mut().push(format!("update {id}"));
        self.failure()?;
        let mut records = self.records.borrow_mut();
        let existing = records
            .iter_mut()
            .find(|r| r.id == Some(id))
            .ok_or(StoreError::NotFound(id))?;
        *existing = PlanRecord {
            id: Some(id),
            ..record.clone()
        };
        Ok(())
    }

    fn move_to(&self, id: i64, to: NaiveDate) -> Result<(), StoreError> {
        self.calls.borrow_mut().push(format!("move {id} {to}"));
        self.failure()?;
        let mut records = self.records.borrow_mut();
        let existing = records
            .iter_mut()
            .find(|r| r.id == Some(id))
            .ok_or(StoreError::NotFound(id))?;
        existing.date = to.to_string();
        Ok(())
    }

    fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.calls.borrow_mut().push(format!("delete {id}"));
        self.failure()?;
        self.records.borrow_mut().retain(|r| r.id != Some(id));
        Ok(())
    }
}

struct FixedViewport(bool);

impl ViewportProbe for FixedViewport {
    fn is_compact(&self) -> bool {
        self.0
    }
}

fn sample_records() -> Vec<PlanRecord> {
    vec![
        record(1, "2024-06-03", "planned", "Easy 5k"),
        record(2, "2024-06-03", "planned", "Strides"),
        record(3, "2024-06-03T07:15:00Z", "strava", "Morning Run"),
        record(4, "2024-06-04", "planned", "Intervals"),
    ]
}

// Helper creating a mounted service over the recording store, already loaded.
fn create_test_service(records: Vec<PlanRecord>) -> Result<CalendarService<RecordingStore>> {
    let mut service = CalendarService::new(
        Config::default(),
        PathBuf::from("test_config.toml"),
        RecordingStore::with_records(records),
    );
    service.reload()?;
    service.store().clear_calls();
    Ok(service)
}

fn test_modal() -> ModalManager<FixedViewport, MemorySizeStore> {
    ModalManager::new(
        FixedViewport(false),
        MemorySizeStore::default(),
        SizeConstraints::default(),
    )
}

// 600x500 anchor centres the default 400x300 dialog at (100, 100).
const ANCHOR: Bounds = Bounds {
    left: 0.0,
    top: 0.0,
    width: 600.0,
    height: 500.0,
};

fn unique_temp_dir(label: &str) -> Result<PathBuf> {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)?
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "plancal-{label}-{}-{nanos}",
        std::process::id()
    ));
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

// --- Date window ---

#[test]
fn test_window_initialize_is_contiguous_and_monday_aligned() {
    let manager = WindowManager::new(date(2024, 6, 5), 5, 5, StdDuration::from_millis(200));
    let window = manager.window();

    assert_eq!(window.len(), 77);
    assert_eq!(window.first(), date(2024, 4, 29));
    assert_eq!(window.last(), date(2024, 7, 14));
    assert_eq!(window.first(), monday_of(window.first()));
    assert!(window.contains(date(2024, 6, 5)));

    let dates = window.to_vec();
    for pair in dates.windows(2) {
        assert_eq!(pair[1] - pair[0], Duration::days(1));
    }
    assert_eq!(window.week_rows().count(), 11);
    assert_eq!(window.week_of(date(2024, 6, 5)), Some(5));
}

#[test]
fn test_window_expand_backward_preserves_existing_dates() {
    let mut manager = WindowManager::new(date(2024, 6, 5), 5, 5, StdDuration::from_millis(200));
    let before = manager.window().to_vec();

    let expansion = manager.evaluate(ScrollMetrics {
        scroll_top: 10.0,
        scroll_height: 1000.0,
        client_height: 400.0,
    });

    let after = manager.window().to_vec();
    assert!(!expansion.forward);
    assert_eq!(after.len(), before.len() + 7);
    assert_eq!(after[0], before[0] - Duration::days(7));
    assert_eq!(&after[7..], &before[..]);

    let compensation = expansion.backward.expect("backward expansion");
    // 100 units of content were added above the viewport.
    assert_eq!(compensation.apply(1100.0), 110.0);
    // The view scrolled to 40 before the expansion ran; the delta lands on top of that.
    assert_eq!(compensation.apply_to(40.0, 1100.0), 140.0);
}

#[test]
fn test_window_initialize_caps_weeks_and_stays_in_range() {
    let capped = DateWindow::initialize(date(2024, 6, 5), u32::MAX, u32::MAX);
    assert_eq!(capped.weeks(), 2 * MAX_CONFIGURED_WEEKS as usize + 1);
    assert!(capped.contains(date(2024, 6, 5)));

    // Not enough calendar before the centre: start at the centre's week instead of overflowing.
    let center = NaiveDate::MIN + Duration::days(20);
    let window = DateWindow::initialize(center, MAX_CONFIGURED_WEEKS, 1);
    assert_eq!(window.first(), monday_of(center));
    assert_eq!(window.weeks(), 2);
    assert!(window.contains(center));
}

#[test]
fn test_window_expand_forward_and_both_edges() {
    let mut manager = WindowManager::new(date(2024, 6, 5), 5, 5, StdDuration::from_millis(200));
    let before = manager.window().to_vec();

    let expansion = manager.evaluate(ScrollMetrics {
        scroll_top: 550.0,
        scroll_height: 1000.0,
        client_height: 400.0,
    });
    assert!(expansion.forward);
    assert!(expansion.backward.is_none());
    let after = manager.window().to_vec();
    assert_eq!(&after[..before.len()], &before[..]);
    assert_eq!(after.len(), before.len() + 7);

    // Short content is near both edges at once.
    let both = manager.evaluate(ScrollMetrics {
        scroll_top: 10.0,
        scroll_height: 500.0,
        client_height: 400.0,
    });
    assert!(both.forward);
    assert!(both.backward.is_some());
    assert_eq!(manager.window().len(), before.len() + 21);

    let idle = manager.evaluate(ScrollMetrics {
        scroll_top: 300.0,
        scroll_height: 1000.0,
        client_height: 400.0,
    });
    assert!(idle.is_empty());
}

#[test]
fn test_window_shift_week_and_today() {
    let mut manager = WindowManager::new(date(2024, 6, 5), 2, 2, StdDuration::from_millis(200));
    manager.shift_week(WeekStep::Forward);
    assert_eq!(manager.center(), date(2024, 6, 12));
    assert_eq!(manager.window().first(), date(2024, 5, 27));
    assert_eq!(manager.take_scroll_target(), Some(date(2024, 6, 12)));
    assert_eq!(manager.take_scroll_target(), None);

    manager.shift_week(WeekStep::Back);
    manager.shift_week(WeekStep::Back);
    assert_eq!(manager.center(), date(2024, 5, 29));

    manager.go_to_today(date(2024, 6, 5));
    assert_eq!(manager.window().len(), 35);
    assert_eq!(manager.window().first(), date(2024, 5, 20));
}

#[test]
fn test_window_pick_inside_and_outside() {
    let mut manager = WindowManager::new(date(2024, 6, 5), 5, 5, StdDuration::from_millis(200));
    manager.take_scroll_target();
    let before = *manager.window();

    assert_eq!(
        manager.pick(date(2024, 6, 20)),
        PickOutcome::ScrollTo(date(2024, 6, 20))
    );
    assert_eq!(*manager.window(), before);
    assert_eq!(manager.take_scroll_target(), Some(date(2024, 6, 20)));

    let far = date(2025, 1, 1);
    assert_eq!(manager.pick(far), PickOutcome::Recentered(far));
    assert!(manager.window().contains(far));
    assert_eq!(
        manager.window().first(),
        monday_of(far) - Duration::weeks(5)
    );
}

#[test]
fn test_window_pick_drops_scroll_sample_taken_before_the_jump() {
    let mut manager = WindowManager::new(date(2024, 6, 5), 5, 5, StdDuration::from_millis(200));
    manager.take_scroll_target();
    let near_top = ScrollMetrics {
        scroll_top: 0.0,
        scroll_height: 11.0,
        client_height: 4.0,
    };
    let t0 = Instant::now();
    manager.on_scroll(t0, near_top);
    assert!(manager.poll_scroll(t0).is_some()); // leading edge
    let weeks_after_first = manager.window().weeks();

    // Trailing sample still pending when the user picks a visible date.
    manager.on_scroll(t0 + StdDuration::from_millis(50), near_top);
    let picked = manager.window().first() + Duration::days(30);
    assert_eq!(manager.pick(picked), PickOutcome::ScrollTo(picked));

    assert!(manager
        .poll_scroll(t0 + StdDuration::from_secs(1))
        .is_none());
    assert_eq!(manager.window().weeks(), weeks_after_first);
    assert_eq!(manager.take_scroll_target(), Some(picked));
}

#[test]
fn test_initial_scroll_happens_once() {
    let mut manager = WindowManager::new(date(2024, 6, 5), 5, 5, StdDuration::from_millis(200));
    let metrics = ScrollMetrics {
        scroll_top: 0.0,
        scroll_height: 1000.0,
        client_height: 400.0,
    };
    assert_eq!(manager.initial_scroll(metrics), Some(300.0));
    assert_eq!(manager.initial_scroll(metrics), None);

    manager.recenter(date(2024, 9, 1));
    assert_eq!(manager.initial_scroll(metrics), None);
}

#[test]
fn test_scroll_evaluation_is_throttled() {
    let mut manager = WindowManager::new(date(2024, 6, 5), 5, 5, StdDuration::from_millis(200));
    let near_top = ScrollMetrics {
        scroll_top: 0.0,
        scroll_height: 1000.0,
        client_height: 400.0,
    };
    let t0 = Instant::now();

    manager.on_scroll(t0, near_top);
    assert!(manager.poll_scroll(t0).is_some());
    let len_after_first = manager.window().len();

    // A burst inside the interval collapses into one trailing evaluation.
    manager.on_scroll(t0 + StdDuration::from_millis(20), near_top);
    manager.on_scroll(t0 + StdDuration::from_millis(40), near_top);
    assert!(manager
        .poll_scroll(t0 + StdDuration::from_millis(100))
        .is_none());
    assert!(manager
        .poll_scroll(t0 + StdDuration::from_millis(200))
        .is_some());
    assert_eq!(manager.window().len(), len_after_first + 7);
    assert!(manager
        .poll_scroll(t0 + StdDuration::from_millis(300))
        .is_none());
}

#[test]
fn test_coalescing_timer_keeps_latest_sample() {
    let mut timer = CoalescingTimer::new(StdDuration::from_millis(200));
    let t0 = Instant::now();
    timer.schedule(t0, 1);
    assert_eq!(timer.poll(t0), Some(1));

    timer.schedule(t0 + StdDuration::from_millis(50), 2);
    timer.schedule(t0 + StdDuration::from_millis(60), 3);
    assert_eq!(
        timer.time_until_due(t0 + StdDuration::from_millis(100)),
        Some(StdDuration::from_millis(100))
    );
    assert_eq!(timer.poll(t0 + StdDuration::from_millis(199)), None);
    assert_eq!(timer.poll(t0 + StdDuration::from_millis(200)), Some(3));
    assert!(!timer.is_pending());

    timer.schedule(t0 + StdDuration::from_millis(250), 4);
    timer.cancel();
    assert_eq!(timer.poll(t0 + StdDuration::from_secs(1)), None);
}

#[test]
fn test_window_teardown_stops_scroll_work() {
    let mut manager = WindowManager::new(date(2024, 6, 5), 5, 5, StdDuration::from_millis(200));
    let t0 = Instant::now();
    manager.on_scroll(
        t0,
        ScrollMetrics {
            scroll_top: 0.0,
            scroll_height: 1000.0,
            client_height: 400.0,
        },
    );
    manager.teardown();
    assert!(manager.poll_scroll(t0 + StdDuration::from_secs(1)).is_none());
    assert_eq!(manager.time_until_scroll_eval(t0), None);
}

// --- Workout index ---

#[test]
fn test_index_groups_by_calendar_day() {
    let index = WorkoutIndex::build(sample_records());

    let monday = index.lookup(date(2024, 6, 3));
    assert_eq!(monday.planned.len(), 2);
    assert_eq!(
        monday.imported.as_ref().map(|e| e.description.as_str()),
        Some("Morning Run")
    );
    assert_eq!(monday.len(), 3);

    assert_eq!(index.lookup(date(2024, 6, 4)).planned.len(), 1);
    assert!(index.lookup(date(2024, 6, 10)).is_empty());
    assert_eq!(index.entry_count(), 4);
    assert_eq!(index.day_count(), 2);
}

#[test]
fn test_index_skips_bad_dates_and_defaults_unknown_types() {
    let index = WorkoutIndex::build(vec![
        record(1, "not-a-date", "planned", "Lost"),
        record(2, "2024-06-05", "yoga", "Flow"),
        PlanRecord {
            id: Some(3),
            date: "2024-06-05".into(),
            ..Default::default()
        },
    ]);
    assert_eq!(index.skipped(), 1);
    let bucket = index.lookup(date(2024, 6, 5));
    assert_eq!(bucket.planned.len(), 2);
    assert_eq!(bucket.planned[1].display_description(), "Planned workout");
    assert_eq!(EntryKind::from_wire(Some("STRAVA")), EntryKind::Imported);
    assert_eq!(EntryKind::from_wire(None), EntryKind::Planned);
}

#[test]
fn test_imported_entries_are_not_draggable_or_editable() -> Result<()> {
    let imported = WorkoutEntry::from_record(record(3, "2024-06-03", "strava", "Ride"))?;
    assert!(!imported.is_draggable());
    assert!(!imported.is_editable());

    let mut drag = DragController::new();
    assert_eq!(drag.start(&imported), Err(DragError::NotDraggable));
    assert!(!drag.is_dragging());

    let draft = WorkoutEntry::draft(date(2024, 6, 3));
    assert_eq!(drag.start(&draft), Err(DragError::NotDraggable));
    Ok(())
}

// --- Drag and drop ---

#[test]
fn test_drag_payload_format() -> Result<()> {
    let entry = WorkoutEntry::from_record(record(7, "2024-06-03", "planned", "Tempo"))?;
    let mut drag = DragController::new();
    let raw = drag.start(&entry)?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;
    assert_eq!(value["id"], 7);
    assert_eq!(value["date"], "2024-06-03");

    let legacy = DragPayload::decode(r#"{"id":7,"sourceDate":"2024-06-03"}"#)?;
    assert_eq!(legacy.source_date, date(2024, 6, 3));
    assert!(drag.is_valid_target(date(2024, 6, 4)));
    assert!(!drag.is_valid_target(date(2024, 6, 3)));
    Ok(())
}

#[test]
fn test_drop_on_source_date_makes_no_calls() -> Result<()> {
    let mut service = create_test_service(sample_records())?;
    let entry = service
        .index()
        .find(1)
        .cloned()
        .expect("entry 1 is indexed");
    let mut drag = DragController::new();
    let raw = drag.start(&entry)?;

    let outcome = service.reschedule(&mut drag, &raw, date(2024, 6, 3))?;
    assert_eq!(outcome, DropOutcome::Unchanged);
    assert!(service.store().calls().is_empty());
    assert!(!drag.is_dragging());
    Ok(())
}

#[test]
fn test_drop_on_other_date_moves_then_reloads() -> Result<()> {
    let mut service = create_test_service(sample_records())?;
    let entry = service.index().find(1).cloned().expect("entry 1 is indexed");
    let mut drag = DragController::new();
    let raw = drag.start(&entry)?;
    drag.drag_over(date(2024, 6, 7));
    assert_eq!(drag.hovered(), Some(date(2024, 6, 7)));

    let outcome = service.reschedule(&mut drag, &raw, date(2024, 6, 7))?;
    assert_eq!(
        outcome,
        DropOutcome::Moved {
            id: 1,
            to: date(2024, 6, 7)
        }
    );
    assert_eq!(
        service.store().calls(),
        vec!["move 1 2024-06-07".to_string(), "load".to_string()]
    );
    assert_eq!(service.lookup(date(2024, 6, 3)).planned.len(), 1);
    assert_eq!(service.lookup(date(2024, 6, 7)).planned[0].id, Some(1));
    assert!(!drag.is_busy());
    assert_eq!(drag.hovered(), None);
    Ok(())
}

#[test]
fn test_failed_move_leaves_index_untouched() -> Result<()> {
    let mut service = create_test_service(sample_records())?;
    service.store().fail_writes.set(true);
    let entry = service.index().find(4).cloned().expect("entry 4 is indexed");
    let mut drag = DragController::new();
    let raw = drag.start(&entry)?;

    let result = service.reschedule(&mut drag, &raw, date(2024, 6, 8));
    match result {
        Err(ServiceError::Store(e)) => assert_eq!(e.to_string(), "boom"),
        other => panic!("expected store error, got {other:?}"),
    }
    assert_eq!(service.store().calls(), vec!["move 4 2024-06-08".to_string()]);
    assert_eq!(service.lookup(date(2024, 6, 4)).planned[0].id, Some(4));
    assert!(service.lookup(date(2024, 6, 8)).is_empty());
    assert!(!drag.is_busy());
    Ok(())
}

#[test]
fn test_foreign_payload_is_ignored() -> Result<()> {
    let mut service = create_test_service(sample_records())?;
    let mut drag = DragController::new();
    let outcome = service.reschedule(&mut drag, "https://example.com/file.png", date(2024, 6, 8))?;
    assert_eq!(outcome, DropOutcome::Ignored);
    assert!(service.store().calls().is_empty());
    Ok(())
}

#[test]
fn test_second_drop_while_moving_is_rejected() -> Result<()> {
    let entry = WorkoutEntry::from_record(record(1, "2024-06-03", "planned", "Easy"))?;
    let mut drag = DragController::new();
    let raw = drag.start(&entry)?;
    let decision = drag.drop_on(&raw, date(2024, 6, 5))?;
    assert_eq!(
        decision,
        DropDecision::Move {
            id: 1,
            from: date(2024, 6, 3),
            to: date(2024, 6, 5)
        }
    );
    assert!(drag.is_busy());
    assert_eq!(drag.drop_on(&raw, date(2024, 6, 6)), Err(DragError::Busy));
    assert_eq!(drag.start(&entry), Err(DragError::Busy));

    drag.finish_move();
    assert!(!drag.is_busy());
    Ok(())
}

#[test]
fn test_move_entry_by_id() -> Result<()> {
    let mut service = create_test_service(sample_records())?;
    assert_eq!(
        service.move_entry(2, date(2024, 6, 3))?,
        DropOutcome::Unchanged
    );
    assert!(service.store().calls().is_empty());

    service.move_entry(2, date(2024, 6, 9))?;
    assert_eq!(service.lookup(date(2024, 6, 9)).planned.len(), 1);

    assert!(matches!(
        service.move_entry(3, date(2024, 6, 9)),
        Err(ServiceError::Drag(DragError::NotDraggable))
    ));
    assert!(matches!(
        service.move_entry(999, date(2024, 6, 9)),
        Err(ServiceError::Store(StoreError::NotFound(999)))
    ));
    Ok(())
}

// --- Floating modal ---

#[test]
fn test_modal_resize_from_west_edge_keeps_right_edge() -> Result<()> {
    let mut modal = test_modal();
    modal.open(
        ModalTarget::Add {
            date: date(2024, 6, 3),
        },
        ANCHOR,
    )?;
    assert_eq!(modal.position(), Some(Position { x: 100.0, y: 100.0 }));

    modal.on_resize(
        ResizeHandle::W,
        Size {
            width: 450.0,
            height: 300.0,
        },
    );
    assert_eq!(modal.position(), Some(Position { x: 50.0, y: 100.0 }));
    assert_eq!(modal.size().width, 450.0);
    Ok(())
}

#[test]
fn test_modal_resize_all_handles() -> Result<()> {
    let expected = [
        ("n", 100.0, 50.0),
        ("s", 100.0, 100.0),
        ("e", 100.0, 100.0),
        ("w", 50.0, 100.0),
        ("ne", 100.0, 50.0),
        ("nw", 50.0, 50.0),
        ("se", 100.0, 100.0),
        ("sw", 50.0, 100.0),
    ];
    for (name, x, y) in expected {
        let handle: ResizeHandle = name.parse()?;
        let mut modal = test_modal();
        modal.open(
            ModalTarget::Add {
                date: date(2024, 6, 3),
            },
            ANCHOR,
        )?;
        let new_size = Size {
            width: if handle.changes_width() { 450.0 } else { 400.0 },
            height: if handle.changes_height() { 350.0 } else { 300.0 },
        };
        modal.on_resize(handle, new_size);
        assert_eq!(
            modal.position(),
            Some(Position { x, y }),
            "handle {handle}"
        );
        assert_eq!(modal.size(), new_size, "handle {handle}");
    }
    Ok(())
}

#[test]
fn test_modal_size_is_clamped_and_persisted() -> Result<()> {
    let mut modal = test_modal();
    modal.open(
        ModalTarget::Add {
            date: date(2024, 6, 3),
        },
        ANCHOR,
    )?;
    modal.on_resize(
        ResizeHandle::SE,
        Size {
            width: 2000.0,
            height: 50.0,
        },
    );
    assert_eq!(
        modal.size(),
        Size {
            width: 800.0,
            height: 200.0
        }
    );
    modal.on_resize_stop(Size {
        width: 520.0,
        height: 380.0,
    })?;
    modal.request_dismiss(DismissReason::Cancel)?;
    modal.finish_transition();
    assert_eq!(modal.phase(), ModalPhase::Closed);

    // Reopening uses the persisted size.
    modal.open(
        ModalTarget::Add {
            date: date(2024, 6, 4),
        },
        ANCHOR,
    )?;
    assert_eq!(
        modal.size(),
        Size {
            width: 520.0,
            height: 380.0
        }
    );
    Ok(())
}

#[test]
fn test_modal_compact_viewport_is_centred_by_layout() -> Result<()> {
    let mut modal = ModalManager::new(
        FixedViewport(true),
        MemorySizeStore::default(),
        SizeConstraints::default(),
    );
    modal.open(
        ModalTarget::Add {
            date: date(2024, 6, 3),
        },
        ANCHOR,
    )?;
    assert!(modal.is_compact());
    assert_eq!(modal.position(), None);
    modal.on_resize(
        ResizeHandle::E,
        Size {
            width: 600.0,
            height: 300.0,
        },
    );
    assert_eq!(modal.size().width, 400.0);
    modal.on_drag_stop(Position { x: 5.0, y: 5.0 });
    assert_eq!(modal.position(), None);
    Ok(())
}

#[test]
fn test_modal_recenter_respects_user_move() -> Result<()> {
    let mut modal = test_modal();
    modal.open(
        ModalTarget::Add {
            date: date(2024, 6, 3),
        },
        ANCHOR,
    )?;
    modal.finish_transition();
    let wider = Bounds {
        width: 1000.0,
        ..ANCHOR
    };
    modal.recenter(wider);
    assert_eq!(modal.position(), Some(Position { x: 300.0, y: 100.0 }));

    modal.on_drag_stop(Position { x: 20.0, y: 30.0 });
    modal.recenter(ANCHOR);
    assert_eq!(modal.position(), Some(Position { x: 20.0, y: 30.0 }));
    Ok(())
}

#[test]
fn test_modal_cannot_dismiss_while_saving() -> Result<()> {
    let mut modal = test_modal();
    modal.open(
        ModalTarget::Add {
            date: date(2024, 6, 3),
        },
        ANCHOR,
    )?;
    modal.finish_transition();
    modal.draft_mut().description = "Long run".into();
    modal.begin_save()?;
    assert!(modal.is_saving());

    for reason in [
        DismissReason::Escape,
        DismissReason::Backdrop,
        DismissReason::Cancel,
    ] {
        assert!(matches!(
            modal.request_dismiss(reason),
            Err(ModalError::SaveInFlight)
        ));
    }
    assert!(matches!(modal.begin_save(), Err(ModalError::SaveInFlight)));

    modal.finish(Ok(()));
    assert_eq!(modal.phase(), ModalPhase::Closing);
    modal.finish_transition();
    assert_eq!(modal.phase(), ModalPhase::Closed);
    assert!(modal.target().is_none());
    Ok(())
}

#[test]
fn test_modal_description_validation() -> Result<()> {
    let mut modal = test_modal();
    modal.open(
        ModalTarget::Add {
            date: date(2024, 6, 3),
        },
        ANCHOR,
    )?;

    modal.draft_mut().description = "   ".into();
    assert!(matches!(
        modal.begin_save(),
        Err(ModalError::Validation(ValidationError::EmptyDescription))
    ));
    assert!(!modal.is_saving());

    modal.draft_mut().description = "x".repeat(151);
    assert!(matches!(
        modal.begin_save(),
        Err(ModalError::Validation(ValidationError::DescriptionTooLong(151)))
    ));

    modal.draft_mut().description = "x".repeat(150);
    assert!(modal.begin_save().is_ok());
    Ok(())
}

#[test]
fn test_modal_key_identifies_session() -> Result<()> {
    let add = ModalTarget::Add {
        date: date(2024, 6, 3),
    };
    assert_eq!(add.key().to_string(), "2024-06-03-new");
    let entry = WorkoutEntry::from_record(record(7, "2024-06-03", "planned", "Hills"))?;
    let edit = ModalTarget::Edit { entry };
    assert_eq!(edit.key().to_string(), "2024-06-03-7");
    assert_ne!(add.key(), edit.key());
    Ok(())
}

// --- Service save/delete through the dialog ---

#[test]
fn test_service_save_creates_then_reloads() -> Result<()> {
    let mut service = create_test_service(sample_records())?;
    let mut modal = test_modal();
    modal.open(
        ModalTarget::Add {
            date: date(2024, 6, 6),
        },
        ANCHOR,
    )?;
    modal.draft_mut().description = "  Recovery jog ".into();
    modal.draft_mut().notes = Some(" ".into());

    let outcome = service.save(&mut modal)?;
    assert_eq!(outcome, SaveOutcome::Created(100));
    assert_eq!(
        service.store().calls(),
        vec!["create 2024-06-06".to_string(), "load".to_string()]
    );
    assert_eq!(modal.phase(), ModalPhase::Closing);

    let saved = &service.lookup(date(2024, 6, 6)).planned[0];
    assert_eq!(saved.description, "Recovery jog");
    assert_eq!(saved.notes, None);
    assert_eq!(saved.kind, EntryKind::Planned);
    Ok(())
}

#[test]
fn test_service_save_failure_keeps_dialog_open() -> Result<()> {
    let mut service = create_test_service(sample_records())?;
    service.store().fail_writes.set(true);
    let entry = service.index().find(4).cloned().expect("entry 4 is indexed");
    let mut modal = test_modal();
    modal.open(ModalTarget::Edit { entry }, ANCHOR)?;
    modal.finish_transition();
    modal.draft_mut().description = "Hill repeats".into();

    assert!(service.save(&mut modal).is_err());
    assert_eq!(service.store().calls(), vec!["update 4".to_string()]);
    assert!(modal.is_visible());
    assert!(!modal.is_saving());
    assert_eq!(modal.error_message(), Some("boom"));
    assert_eq!(
        service.lookup(date(2024, 6, 4)).planned[0].description,
        "Intervals"
    );
    Ok(())
}

#[test]
fn test_service_edit_and_delete() -> Result<()> {
    let mut service = create_test_service(sample_records())?;
    let entry = service.index().find(4).cloned().expect("entry 4 is indexed");
    let mut modal = test_modal();
    modal.open(ModalTarget::Edit { entry: entry.clone() }, ANCHOR)?;
    modal.finish_transition();
    modal.draft_mut().description = "Hill repeats".into();
    assert_eq!(service.save(&mut modal)?, SaveOutcome::Updated(4));
    assert_eq!(
        service.lookup(date(2024, 6, 4)).planned[0].description,
        "Hill repeats"
    );
    modal.finish_transition();

    modal.open(ModalTarget::Edit { entry }, ANCHOR)?;
    modal.finish_transition();
    assert_eq!(service.delete(&mut modal)?, SaveOutcome::Deleted(4));
    assert!(service.lookup(date(2024, 6, 4)).is_empty());

    // Add sessions have nothing to delete.
    modal.finish_transition();
    modal.open(
        ModalTarget::Add {
            date: date(2024, 6, 4),
        },
        ANCHOR,
    )?;
    assert!(matches!(
        service.delete(&mut modal),
        Err(ServiceError::Modal(ModalError::NotDeletable))
    ));
    Ok(())
}

#[test]
fn test_teardown_discards_late_reloads() -> Result<()> {
    let mut service = create_test_service(sample_records())?;
    let before = service.index().entry_count();
    service.teardown();

    assert_eq!(service.reload()?, ReloadOutcome::Discarded);
    let outcome = service.apply_records(vec![record(9, "2024-06-09", "planned", "Late")]);
    assert_eq!(outcome, ReloadOutcome::Discarded);
    assert_eq!(service.index().entry_count(), before);
    assert!(service.lookup(date(2024, 6, 9)).is_empty());
    Ok(())
}

#[test]
fn test_create_plan_validates_description() -> Result<()> {
    let mut service = create_test_service(Vec::new())?;
    let result = service.create_plan(PlanRecord {
        date: "2024-06-03".into(),
        description: Some(String::new()),
        ..Default::default()
    });
    assert!(matches!(
        result,
        Err(ServiceError::Validation(ValidationError::EmptyDescription))
    ));
    assert!(service.store().calls().is_empty());
    Ok(())
}

// --- Local SQLite store ---

#[test]
fn test_sqlite_store_round_trip() -> Result<()> {
    let store = SqliteStore::open_in_memory()?;
    let mut service =
        CalendarService::new(Config::default(), PathBuf::from("test_config.toml"), store);

    let id = service.create_plan(PlanRecord {
        date: "2024-06-03".into(),
        description: Some("Easy 5k".into()),
        distance: Some(5.0),
        warmup_target: Some("Z1".into()),
        ..Default::default()
    })?;
    let entry = service.index().find(id).cloned().expect("created entry is indexed");
    assert_eq!(entry.date, date(2024, 6, 3));
    assert_eq!(entry.distance, Some(5.0));
    assert_eq!(entry.targets.warmup.as_deref(), Some("Z1"));

    service.move_entry(id, date(2024, 6, 5))?;
    assert_eq!(service.lookup(date(2024, 6, 5)).planned.len(), 1);

    service.delete_plan(id)?;
    assert_eq!(service.index().entry_count(), 0);

    assert!(matches!(
        service.store().move_to(id, date(2024, 6, 6)),
        Err(StoreError::NotFound(_))
    ));
    Ok(())
}

// --- Persisted UI state and config ---

#[test]
fn test_file_size_store_round_trip() -> Result<()> {
    let dir = unique_temp_dir("ui-state")?;
    let path = dir.join("ui_state.toml");
    std::fs::write(&path, "[other]\nkeep = 1\n")?;

    let mut store = FileSizeStore::new(&path);
    assert_eq!(store.load(), None);
    store.save(Size {
        width: 500.0,
        height: 400.0,
    })?;

    let reopened = FileSizeStore::in_dir(&dir);
    assert_eq!(
        reopened.load(),
        Some(Size {
            width: 500.0,
            height: 400.0
        })
    );
    let content = std::fs::read_to_string(&path)?;
    assert!(content.contains("[other]"));
    assert!(content.contains("modal_size"));

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}

#[test]
fn test_config_rejects_out_of_range_weeks() -> Result<()> {
    let dir = unique_temp_dir("config-weeks")?;
    let path = dir.join("config.toml");

    std::fs::write(&path, "weeks_back = 4000000000\n")?;
    match plancal_lib::load_config_util(&path) {
        Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, "weeks_back"),
        other => panic!("expected weeks_back to be rejected, got {:?}", other),
    }

    std::fs::write(&path, format!("weeks_forward = {}\n", MAX_CONFIGURED_WEEKS + 1))?;
    match plancal_lib::load_config_util(&path) {
        Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, "weeks_forward"),
        other => panic!("expected weeks_forward to be rejected, got {:?}", other),
    }

    std::fs::write(
        &path,
        format!("weeks_back = {0}\nweeks_forward = {0}\n", MAX_CONFIGURED_WEEKS),
    )?;
    let config = plancal_lib::load_config_util(&path)?;
    let manager = CalendarService::new(config, path.clone(), RecordingStore::default())
        .window_manager(date(2024, 6, 5));
    assert_eq!(
        manager.window().weeks(),
        2 * MAX_CONFIGURED_WEEKS as usize + 1
    );

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}

#[test]
fn test_config_rejects_unusable_modal_sizes() -> Result<()> {
    let dir = unique_temp_dir("config-sizes")?;
    let path = dir.join("config.toml");

    for (table, body) in [
        ("modal_min", "width = nan\nheight = 200.0"),
        ("modal_min", "width = 300.0\nheight = 0.0"),
        ("modal_max", "width = -800.0\nheight = 800.0"),
        ("modal_max", "width = inf\nheight = 800.0"),
    ] {
        std::fs::write(&path, format!("[{table}]\n{body}\n"))?;
        match plancal_lib::load_config_util(&path) {
            Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, table),
            other => panic!("expected [{table}] {body:?} to be rejected, got {:?}", other),
        }
    }

    // A persisted NaN size is ignored rather than fed to the dialog.
    std::fs::write(
        dir.join("ui_state.toml"),
        "[modal_size]\nwidth = nan\nheight = 300.0\n",
    )?;
    assert_eq!(FileSizeStore::in_dir(&dir).load(), None);

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}

#[test]
fn test_config_load_writes_defaults() -> Result<()> {
    let dir = unique_temp_dir("config")?;
    let path = dir.join("config.toml");

    let config = plancal_lib::load_config_util(&path)?;
    assert!(path.exists());
    assert_eq!(config.weeks_back, 5);
    assert_eq!(config.scroll_throttle(), StdDuration::from_millis(200));
    assert_eq!(config.modal_constraints(), SizeConstraints::default());

    std::fs::write(&path, "[theme]\nheader_color = \"Chartreuse\"\n")?;
    assert!(plancal_lib::load_config_util(&path).is_err());

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}

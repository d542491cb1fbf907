//! End-to-end scenarios over a fake two-display room
//!
//! A small rack of in-memory "hardware" stands in for the transports: set
//! handlers mutate it, update handlers read it back into the status
//! stores, and the activity hooks drive the devices exactly the way a room
//! configuration would. Clocks are driven by hand so every tick count is
//! deterministic.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use roomctl::{
    Activity, ActivityHooks, CommandSpec, DeviceBuilder, PhaseKind, PhaseTimings, PollingConfig,
    Qualifier, RoomError, RoomSystem, RoomSystemConfig, SchedulerConfig, StatusValue, SystemState,
};

/// In-memory stand-in for the room's transports
#[derive(Default)]
struct FakeRack {
    display_power: HashMap<String, bool>,
    ties: HashMap<i64, i64>,
}

type Rack = Arc<Mutex<FakeRack>>;

fn build_display(id: &str, rack: Rack) -> Arc<roomctl::Device> {
    let set_rack = Arc::clone(&rack);
    let update_rack = rack;
    let set_id = id.to_string();
    let update_id = id.to_string();

    DeviceBuilder::new(id)
        .name(format!("Display {id}"))
        .manufacturer("Acme")
        .model("VX-55")
        .refresh_limit(100)
        .command(CommandSpec::scalar("Power"))
        .on_set("Power", move |_, value, _| {
            // Transport accepts the command; confirmation arrives by poll.
            set_rack
                .lock()
                .display_power
                .insert(set_id.clone(), value.as_bool().unwrap_or(false));
            Ok(())
        })
        .on_update("Power", move |device, qualifier| {
            let powered = update_rack
                .lock()
                .display_power
                .get(&update_id)
                .copied()
                .unwrap_or(false);
            device.write_status("Power", powered, qualifier)?;
            Ok(())
        })
        .build()
        .unwrap()
}

fn build_switcher(rack: Rack) -> Arc<roomctl::Device> {
    let set_rack = Arc::clone(&rack);
    let update_rack = rack;

    DeviceBuilder::new("switcher")
        .name("Matrix Switcher")
        .manufacturer("Acme")
        .model("MX-84")
        .refresh_limit(100)
        .command(CommandSpec::new("Tie", ["Output"]))
        .on_set("Tie", move |device, value, qualifier| {
            let output = qualifier
                .get("Output")
                .and_then(StatusValue::as_int)
                .ok_or("missing Output parameter")?;
            let input = value.as_int().ok_or("tie value must be an input number")?;
            set_rack.lock().ties.insert(output, input);
            // Switch feedback is immediate on this transport.
            device.write_status("Tie", input, qualifier)?;
            Ok(())
        })
        .on_update("Tie", move |device, qualifier| {
            let ties = update_rack.lock().ties.clone();
            match qualifier.get("Output").and_then(StatusValue::as_int) {
                Some(output) => {
                    let input = ties.get(&output).copied().unwrap_or(0);
                    device.write_status("Tie", input, qualifier)?;
                }
                // An unaddressed poll refreshes every output.
                None => {
                    for output in 1..=4 {
                        let input = ties.get(&output).copied().unwrap_or(0);
                        device.write_status("Tie", input, &Qualifier::new().with("Output", output))?;
                    }
                }
            }
            Ok(())
        })
        .build()
        .unwrap()
}

struct TestRoom {
    system: RoomSystem,
    rack: Rack,
}

/// Wire a two-display room with hooks that power displays on startup and
/// untie everything on shutdown completion
fn build_room() -> TestRoom {
    let rack: Rack = Arc::new(Mutex::new(FakeRack::default()));

    let displays = vec![
        build_display("disp-left", Arc::clone(&rack)),
        build_display("disp-right", Arc::clone(&rack)),
    ];
    let switcher = build_switcher(Arc::clone(&rack));

    let startup_displays = displays.clone();
    let shutdown_displays = displays.clone();
    let probe_displays = displays.clone();
    let untie_switcher = Arc::clone(&switcher);

    let hooks = ActivityHooks {
        startup_actions: Box::new(move |_| {
            for display in &startup_displays {
                display.set("Power", true, &Qualifier::new()).unwrap();
            }
        }),
        shutdown_actions: Box::new(move || {
            for display in &shutdown_displays {
                display.set("Power", false, &Qualifier::new()).unwrap();
            }
        }),
        shutdown_complete: Box::new(move || {
            for output in 1..=4 {
                untie_switcher
                    .set("Tie", 0, &Qualifier::new().with("Output", output))
                    .unwrap();
            }
        }),
        wrapup_probe: Box::new(move |kind| {
            let want_powered = kind != PhaseKind::Shutdown;
            probe_displays.iter().all(|display| {
                display.read_status("Power", &Qualifier::new()).unwrap()
                    == Some(want_powered.into())
            })
        }),
        ..Default::default()
    };

    let config = RoomSystemConfig {
        timings: PhaseTimings {
            startup_max: 10,
            startup_min: 2,
            switch_max: 6,
            switch_min: 0,
            shutdown_max: 8,
            shutdown_min: 1,
            shutdown_confirm_max: 3,
        },
        idle_threshold: 5,
        // Inline polling keeps every scenario deterministic.
        scheduler: SchedulerConfig {
            workers: 0,
            queue_depth: 8,
        },
        ..Default::default()
    };

    let system = RoomSystem::with_config(config, hooks);
    for display in displays {
        system.add_device(display);
    }
    system.add_device(switcher);

    // Power feedback every active tick; ties on a slower cadence.
    for id in ["disp-left", "disp-right"] {
        system.add_polling(id, "Power", Qualifier::new(), 1, 10).unwrap();
    }
    system
        .add_polling("switcher", "Tie", Qualifier::new(), 2, 20)
        .unwrap();

    TestRoom { system, rack }
}

/// One coordinated tick of both clocks
fn tick(room: &TestRoom) {
    room.system.scheduler().advance();
    room.system.activity().tick();
}

#[test]
fn startup_finishes_early_on_device_feedback() {
    let room = build_room();
    room.system.poll_everything();

    assert!(room.system.system_start(Activity::Share));
    assert_eq!(room.system.state(), SystemState::Starting(Activity::Share));

    // Startup actions already told both displays to power on; polling
    // confirms on the first tick, and the minimum of 2 holds the phase
    // until tick 3.
    tick(&room);
    tick(&room);
    assert_eq!(room.system.state(), SystemState::Starting(Activity::Share));
    tick(&room);
    assert_eq!(room.system.state(), SystemState::Steady(Activity::Share));
    assert_eq!(room.system.current_activity(), Some(Activity::Share));
}

#[test]
fn startup_times_out_when_hardware_never_confirms() {
    let room = build_room();
    // Break the rack: displays ignore power commands.
    room.system.system_start(Activity::Share);
    room.rack.lock().display_power.clear();

    for _ in 0..10 {
        room.system.activity().tick(); // no polling at all
    }
    assert_eq!(room.system.state(), SystemState::Steady(Activity::Share));
}

#[test]
fn confirmed_shutdown_unties_every_destination() {
    let room = build_room();
    room.system.poll_everything();

    // Route something first.
    room.system
        .set("switcher", "Tie", 3, &Qualifier::new().with("Output", 1))
        .unwrap();
    room.system
        .set("switcher", "Tie", 2, &Qualifier::new().with("Output", 4))
        .unwrap();

    room.system.system_start(Activity::Share);
    for _ in 0..3 {
        tick(&room);
    }
    assert_eq!(room.system.state(), SystemState::Steady(Activity::Share));

    // Confirmation window expires unanswered and forces the shutdown.
    assert!(room.system.start_shutdown_confirmation());
    for _ in 0..3 {
        tick(&room);
    }
    assert_eq!(room.system.state(), SystemState::ShuttingDown);

    // Displays report off on the next poll; min 1 lets the phase wrap up.
    for _ in 0..2 {
        tick(&room);
    }
    assert_eq!(room.system.state(), SystemState::Off);

    // Completion force-untied all four outputs.
    for output in 1..=4 {
        assert_eq!(
            room.system
                .read_status("switcher", "Tie", &Qualifier::new().with("Output", output))
                .unwrap(),
            Some(0.into())
        );
    }
    assert!(room.rack.lock().ties.values().all(|&input| input == 0));
}

#[test]
fn cancelling_confirmation_returns_to_activity() {
    let room = build_room();
    room.system.poll_everything();
    room.system.system_start(Activity::GroupWork);
    for _ in 0..3 {
        tick(&room);
    }

    assert!(room.system.start_shutdown_confirmation());
    tick(&room);
    assert!(room.system.cancel_shutdown());
    assert_eq!(room.system.state(), SystemState::Steady(Activity::GroupWork));

    // While off it stays a no-op.
    let idle_room = build_room();
    assert!(!idle_room.system.start_shutdown_confirmation());
}

#[test]
fn widget_callbacks_ride_the_polling_cadence() {
    let room = build_room();
    let changes = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&changes);

    // One declaration covers polling and subscription.
    room.system
        .add_polling_with_callback(
            "disp-left",
            "Power",
            Qualifier::new(),
            1,
            10,
            Arc::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        )
        .unwrap();

    room.system.poll_everything(); // first write: off -> one change
    for _ in 0..3 {
        room.system.scheduler().advance(); // still off: no further changes
    }
    assert_eq!(changes.load(Ordering::SeqCst), 1);

    room.rack.lock().display_power.insert("disp-left".into(), true);
    room.system.scheduler().advance();
    assert_eq!(changes.load(Ordering::SeqCst), 2);
}

#[test]
fn polling_declarations_are_validated_up_front() {
    let rack: Rack = Arc::new(Mutex::new(FakeRack::default()));
    let display = build_display("disp-solo", Arc::clone(&rack));

    let config = RoomSystemConfig {
        scheduler: SchedulerConfig {
            workers: 0,
            queue_depth: 8,
        },
        ..Default::default()
    };
    let system = RoomSystem::with_config(config, ActivityHooks::default());

    // A typo in the room description fails at registration, not at poll time.
    let bogus = vec![PollingConfig {
        command: "Brightness".into(),
        qualifier: Qualifier::new(),
        active_every: 1,
        inactive_every: 10,
    }];
    assert!(system
        .add_device_with_polling(Arc::clone(&display), &bogus)
        .is_err());
    assert!(system.device("disp-solo").is_none());

    let declared = vec![PollingConfig {
        command: "Power".into(),
        qualifier: Qualifier::new(),
        active_every: 1,
        inactive_every: 10,
    }];
    system.add_device_with_polling(display, &declared).unwrap();

    rack.lock().display_power.insert("disp-solo".into(), true);
    system.poll_everything();
    assert_eq!(
        system
            .read_status("disp-solo", "Power", &Qualifier::new())
            .unwrap(),
        Some(true.into())
    );
}

#[test]
fn unknown_device_is_loud() {
    let room = build_room();
    let err = room
        .system
        .set("ghost", "Power", true, &Qualifier::new())
        .unwrap_err();
    assert!(matches!(err, RoomError::DeviceNotFound(_)));
}

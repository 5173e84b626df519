//! End-to-end session lifecycle tests over the deterministic backend

use std::cell::RefCell;
use std::rc::Rc;

use platform_shell::config::{GfxFlags, InitParams};
use platform_shell::gfx::sim::{SimBackend, SimWindow};
use platform_shell::gfx::tier::CapabilityTier;
use platform_shell::session::{Host, Session, SessionError};
use platform_shell::window::events::{Callbacks, MouseButton, WindowMessage};
use platform_shell::window::shell::ScriptedPump;

fn logging_callbacks(log: Rc<RefCell<Vec<String>>>) -> Callbacks {
    let mut callbacks = Callbacks::new();
    {
        let log = log.clone();
        callbacks.set_create_fn(move || log.borrow_mut().push("create".to_string()));
    }
    {
        let log = log.clone();
        callbacks.set_destroy_fn(move || log.borrow_mut().push("destroy".to_string()));
    }
    {
        let log = log.clone();
        callbacks.set_resize_fn(move |w, h| log.borrow_mut().push(format!("resize {w}x{h}")));
    }
    {
        let log = log.clone();
        callbacks.set_keypress_fn(move |ch, code| {
            log.borrow_mut().push(format!("keypress {ch} {code}"));
        });
    }
    {
        let log = log.clone();
        callbacks.set_mouse_down_fn(move |x, y, button| {
            log.borrow_mut().push(format!("mouse-down {x},{y} {button:?}"));
        });
    }
    callbacks
}

fn lifecycle_script() -> ScriptedPump {
    ScriptedPump::new([
        WindowMessage::Created,
        WindowMessage::KeyDown(65),
        WindowMessage::Char('a'),
        WindowMessage::Resized {
            width: 800,
            height: 600,
        },
        WindowMessage::MouseDown {
            x: 10,
            y: 20,
            button: MouseButton::Left,
        },
        WindowMessage::Destroyed,
    ])
}

#[test]
fn windowed_lifecycle_dispatches_callbacks_in_order() {
    let backend = SimBackend::new();
    let journal = backend.journal();
    let params = InitParams::new().with_size(1024, 768);

    let mut session = Session::windowed(
        backend,
        lifecycle_script(),
        SimWindow::new(1024, 768),
        "lifecycle",
        &params,
    )
    .expect("session");
    session.set_always_active(true);

    let log = Rc::new(RefCell::new(Vec::new()));
    let mut callbacks = logging_callbacks(log.clone());
    session.run(&mut callbacks);

    assert_eq!(
        *log.borrow(),
        vec![
            "create",
            "keypress a 65",
            "resize 800x600",
            "mouse-down 10,20 Left",
            "destroy",
        ]
    );

    // The swapchain followed the window size before the resize callback ran.
    assert_eq!((session.width(), session.height()), (800, 600));
    assert!(journal
        .events()
        .iter()
        .any(|e| e == "chain.resize 800x600"));
}

#[test]
fn swapchain_resize_precedes_the_resize_callback() {
    let backend = SimBackend::new();
    let journal = backend.journal();
    let params = InitParams::new();

    let mut session = Session::windowed(
        backend,
        ScriptedPump::new([
            WindowMessage::Resized {
                width: 640,
                height: 480,
            },
            WindowMessage::Destroyed,
        ]),
        SimWindow::new(1280, 720),
        "resize-order",
        &params,
    )
    .expect("session");
    session.set_always_active(true);

    let journal_probe = journal.clone();
    let resized_during_callback = Rc::new(RefCell::new(false));
    let seen = resized_during_callback.clone();
    let mut callbacks = Callbacks::new();
    callbacks.set_resize_fn(move |_, _| {
        let done = journal_probe
            .events()
            .iter()
            .any(|e| e == "chain.resize 640x480");
        *seen.borrow_mut() = done;
    });
    session.run(&mut callbacks);

    assert!(*resized_during_callback.borrow());
}

#[test]
fn session_teardown_releases_in_documented_order() {
    let backend = SimBackend::new();
    let journal = backend.journal();
    let params = InitParams::new();

    let session = Session::windowed(
        backend,
        ScriptedPump::default(),
        SimWindow::new(1280, 720),
        "teardown",
        &params,
    )
    .expect("session");

    journal.clear();
    drop(session);

    let events = journal.events();
    let position = |name: &str| {
        events
            .iter()
            .position(|e| e == name)
            .unwrap_or_else(|| panic!("missing {name} in {events:?}"))
    };

    assert!(position("dsv.release") < position("depthbuffer.release"));
    assert!(position("depthbuffer.release") < position("rtv.release"));
    assert!(position("rtv.release") < position("backbuffer.release"));
    assert!(position("backbuffer.release") < position("chain.release"));
    assert!(position("chain.release") < position("context.release"));
    assert!(position("context.release") < position("device.release"));
}

/// Pump that records window-system fullscreen exits.
struct ModeTrackingPump {
    inner: ScriptedPump,
    exits: Rc<RefCell<u32>>,
}

impl platform_shell::window::shell::MessagePump for ModeTrackingPump {
    fn poll(&mut self) -> Option<WindowMessage> {
        self.inner.poll()
    }

    fn wait(&mut self) -> WindowMessage {
        self.inner.wait()
    }

    fn exit_fullscreen(&mut self) {
        *self.exits.borrow_mut() += 1;
    }
}

#[test]
fn fullscreen_teardown_reaches_the_window_system() {
    let exits = Rc::new(RefCell::new(0u32));
    let pump = ModeTrackingPump {
        inner: ScriptedPump::default(),
        exits: exits.clone(),
    };
    let params = InitParams::new().with_flags(GfxFlags::FULLSCREEN | GfxFlags::VSYNC);

    let session = Session::windowed(
        SimBackend::new(),
        pump,
        SimWindow::new(1280, 720),
        "mode-switch",
        &params,
    )
    .expect("session");
    drop(session);
    assert_eq!(*exits.borrow(), 1);

    // A windowed session never asks for the mode switch.
    let exits = Rc::new(RefCell::new(0u32));
    let pump = ModeTrackingPump {
        inner: ScriptedPump::default(),
        exits: exits.clone(),
    };
    let session = Session::windowed(
        SimBackend::new(),
        pump,
        SimWindow::new(1280, 720),
        "windowed",
        &InitParams::new(),
    )
    .expect("session");
    drop(session);
    assert_eq!(*exits.borrow(), 0);
}

#[test]
fn fullscreen_session_exits_exclusive_mode_on_teardown() {
    let backend = SimBackend::new();
    let journal = backend.journal();
    let params = InitParams::new().with_flags(GfxFlags::FULLSCREEN | GfxFlags::VSYNC);

    let session = Session::windowed(
        backend,
        ScriptedPump::default(),
        SimWindow::new(1280, 720),
        "fullscreen",
        &params,
    )
    .expect("session");

    journal.clear();
    drop(session);

    let events = journal.events();
    let exit = events
        .iter()
        .position(|e| e == "chain.exit_fullscreen")
        .expect("exit_fullscreen");
    let release = events.iter().position(|e| e == "chain.release").expect("release");
    assert!(exit < release);
}

#[test]
fn device_only_binds_a_swapchain_to_the_caller_window() {
    let backend = SimBackend::new();
    let journal = backend.journal();
    let params = InitParams::new().with_size(800, 600);

    let mut session = Session::<_, ScriptedPump>::device_only(
        backend,
        SimWindow::new(800, 600),
        "headless",
        &params,
    )
    .expect("session");

    assert_eq!(session.tier(), CapabilityTier::Tier11_0);
    assert!(session.targets().is_some());
    assert!(journal
        .events()
        .iter()
        .any(|e| e.starts_with("chain.create 800x600")));

    // Presenting works exactly as in a windowed session.
    journal.clear();
    session.present().expect("present");
    assert_eq!(journal.events(), vec!["present vsync=true"]);
}

#[test]
fn device_only_run_returns_without_dispatching() {
    let params = InitParams::new();
    let mut session = Session::<_, ScriptedPump>::device_only(
        SimBackend::new(),
        SimWindow::new(1280, 720),
        "headless",
        &params,
    )
    .expect("session");

    let log = Rc::new(RefCell::new(Vec::new()));
    let mut callbacks = logging_callbacks(log.clone());
    session.run(&mut callbacks);
    assert!(log.borrow().is_empty());
}

#[test]
#[should_panic(expected = "device-only session has no window pump")]
fn device_only_pump_accessor_panics() {
    let params = InitParams::new();
    let session = Session::<_, ScriptedPump>::device_only(
        SimBackend::new(),
        SimWindow::new(1280, 720),
        "headless",
        &params,
    )
    .expect("session");
    let _ = session.pump();
}

#[test]
fn pump_stays_reachable_after_initialization() {
    let params = InitParams::new();
    let mut session = Session::windowed(
        SimBackend::new(),
        ScriptedPump::default(),
        SimWindow::new(1280, 720),
        "reachable",
        &params,
    )
    .expect("session");
    session.set_always_active(true);

    // Feeding the live pump through the accessor drives the next run.
    session.pump_mut().push(WindowMessage::Destroyed);

    let log = Rc::new(RefCell::new(Vec::new()));
    let mut callbacks = logging_callbacks(log.clone());
    session.run(&mut callbacks);
    assert_eq!(*log.borrow(), vec!["destroy"]);
}

#[test]
fn present_runs_against_a_ready_swapchain() {
    let backend = SimBackend::new();
    let journal = backend.journal();
    let params = InitParams::new();

    let mut session = Session::windowed(
        backend,
        ScriptedPump::default(),
        SimWindow::new(1280, 720),
        "present",
        &params,
    )
    .expect("session");

    journal.clear();
    session.present().expect("present");
    assert_eq!(journal.events(), vec!["present vsync=true"]);
}

#[test]
fn host_rejects_a_second_initialization() {
    let params = InitParams::new();
    let mut host = Host::new();
    host.init_windowed(
        SimBackend::new(),
        ScriptedPump::default(),
        SimWindow::new(1280, 720),
        "first",
        &params,
    )
    .expect("first init");

    let result = host.init_windowed(
        SimBackend::new(),
        ScriptedPump::default(),
        SimWindow::new(1280, 720),
        "second",
        &params,
    );
    assert!(matches!(result, Err(SessionError::AlreadyInitialized)));

    // Shutdown frees the slot for a later init.
    host.shutdown();
    assert!(!host.is_initialized());
    host.init_device_only(SimBackend::new(), SimWindow::new(1280, 720), "third", &params)
        .expect("re-init after shutdown");
}

#[test]
fn host_shutdown_without_a_session_is_a_no_op() {
    let mut host = Host::<SimBackend, ScriptedPump>::new();
    host.shutdown();
    host.shutdown();
    assert!(!host.is_initialized());
}

#[test]
fn host_runs_bound_callbacks_through_the_loop() {
    let params = InitParams::new();
    let mut host = Host::new();
    host.init_windowed(
        SimBackend::new(),
        lifecycle_script(),
        SimWindow::new(1280, 720),
        "hosted",
        &params,
    )
    .expect("init");
    host.session_mut().set_always_active(true);

    let count = Rc::new(RefCell::new(0u32));
    let probe = count.clone();
    host.set_keypress_fn(move |_, _| *probe.borrow_mut() += 1);
    host.run();

    assert_eq!(*count.borrow(), 1);
    assert!(host.is_initialized());
}

#[test]
fn display_inventory_reports_the_simulated_adapter() {
    let params = InitParams::new();
    let mut session = Session::windowed(
        SimBackend::new(),
        ScriptedPump::default(),
        SimWindow::new(1280, 720),
        "inventory",
        &params,
    )
    .expect("session");

    let inventory = session.display_inventory().expect("inventory");
    assert_eq!(inventory.adapters.len(), 1);
    assert_eq!(inventory.adapters[0].name, "Simulated Adapter");
}

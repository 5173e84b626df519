//! Message translation and the run loop
//!
//! [`Router`] is the translation state machine: it turns the raw message
//! stream into [`EventSink`] invocations with fixed ordering semantics, and
//! carries the active flag, the pending raw key code, and the quit latch.
//! [`run`] drives a [`MessagePump`] until quit: polling (and invoking the
//! update callback every iteration) while the window is active or the
//! always-active policy is set, blocking on the next message otherwise.

use std::collections::VecDeque;

use crate::display::OutputRecord;
use crate::window::events::{EventSink, WindowMessage};

/// Source of translated window messages.
///
/// `poll` never blocks; `wait` blocks until a message arrives. The run loop
/// chooses between them based on the active/always-active state.
pub trait MessagePump {
    /// Next pending message, if any, without blocking
    fn poll(&mut self) -> Option<WindowMessage>;

    /// Block until the next message arrives
    fn wait(&mut self) -> WindowMessage;

    /// Monitor inventory of the window system driving this pump
    fn outputs(&mut self) -> Vec<OutputRecord> {
        Vec::new()
    }

    /// Undo the window system's fullscreen mode switch. Called during
    /// session teardown after the chain has left exclusive mode; a pump
    /// without a real window has nothing to do.
    fn exit_fullscreen(&mut self) {}
}

/// Replays a scripted message sequence; the deterministic pump used by
/// tests and headless tooling.
#[derive(Default)]
pub struct ScriptedPump {
    queue: VecDeque<WindowMessage>,
    outputs: Vec<OutputRecord>,
}

impl ScriptedPump {
    /// A pump that will replay `messages` in order
    pub fn new(messages: impl IntoIterator<Item = WindowMessage>) -> Self {
        Self {
            queue: messages.into_iter().collect(),
            outputs: Vec::new(),
        }
    }

    /// Append a message to the script
    pub fn push(&mut self, message: WindowMessage) {
        self.queue.push_back(message);
    }

    /// Attach a scripted monitor inventory
    pub fn with_outputs(mut self, outputs: Vec<OutputRecord>) -> Self {
        self.outputs = outputs;
        self
    }
}

impl MessagePump for ScriptedPump {
    fn poll(&mut self) -> Option<WindowMessage> {
        self.queue.pop_front()
    }

    fn wait(&mut self) -> WindowMessage {
        // A scripted pump cannot block; an exhausted script quits so tests
        // never deadlock.
        self.queue.pop_front().unwrap_or(WindowMessage::Quit)
    }

    fn outputs(&mut self) -> Vec<OutputRecord> {
        self.outputs.clone()
    }
}

/// Message-translation state machine
pub struct Router {
    active: bool,
    always_active: bool,
    pending_key: u32,
    quit: bool,
    width: u32,
    height: u32,
}

impl Router {
    /// A router for a window of the given initial client size
    pub fn new(width: u32, height: u32, always_active: bool) -> Self {
        Self {
            active: false,
            always_active,
            pending_key: 0,
            quit: false,
            width,
            height,
        }
    }

    /// Whether the window currently has the foreground
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the loop polls even without focus
    pub fn always_active(&self) -> bool {
        self.always_active
    }

    /// Toggle the always-active scheduling policy
    pub fn set_always_active(&mut self, always_active: bool) {
        self.always_active = always_active;
    }

    /// Whether a quit signal has been observed
    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    /// Last known client width
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Last known client height
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Translate one message into sink invocations.
    ///
    /// `resize_hook` runs after a size change is accepted and before the
    /// sink's resize callback, so swapchain state is consistent before the
    /// application is told about the new size.
    pub fn dispatch(
        &mut self,
        message: WindowMessage,
        sink: &mut dyn EventSink,
        resize_hook: &mut dyn FnMut(u32, u32),
    ) {
        match message {
            WindowMessage::Created => sink.on_create(),
            WindowMessage::Destroyed => {
                sink.on_destroy();
                self.quit = true;
            }
            WindowMessage::Resized { width, height } => {
                // Minimize reports a logical zero size; ignore it.
                if width == 0 || height == 0 {
                    return;
                }
                self.width = width;
                self.height = height;
                resize_hook(width, height);
                sink.on_resize(width, height);
            }
            WindowMessage::Activated(active) => {
                self.active = active;
                sink.on_activate(active);
            }
            WindowMessage::KeyDown(code) => {
                // Character translation only becomes available after the
                // key-down message family completes; hold the raw code
                // until the paired character arrives.
                self.pending_key = code;
            }
            WindowMessage::Char(ch) => {
                sink.on_keypress(ch, self.pending_key);
                self.pending_key = 0;
            }
            WindowMessage::MouseDown { x, y, button } => sink.on_mouse_down(x, y, button),
            WindowMessage::MouseUp { x, y, button } => sink.on_mouse_up(x, y, button),
            WindowMessage::MouseMove { x, y } => sink.on_mouse_move(x, y),
            WindowMessage::Quit => self.quit = true,
        }
    }
}

/// Run one loop iteration: fetch a message (polling or blocking), dispatch
/// it, and invoke the update callback. Returns `false` once quit has been
/// observed.
pub fn pump_once<P: MessagePump + ?Sized>(
    pump: &mut P,
    router: &mut Router,
    sink: &mut dyn EventSink,
    resize_hook: &mut dyn FnMut(u32, u32),
) -> bool {
    let message = if router.is_active() || router.always_active() {
        pump.poll()
    } else {
        Some(pump.wait())
    };

    if let Some(message) = message {
        router.dispatch(message, sink, resize_hook);
    }
    if router.quit_requested() {
        return false;
    }
    sink.on_update();
    true
}

/// Drive the pump until a quit signal is observed.
///
/// This is the application's sole execution driver; it does not return
/// control until quit.
pub fn run<P: MessagePump + ?Sized>(
    pump: &mut P,
    router: &mut Router,
    sink: &mut dyn EventSink,
    resize_hook: &mut dyn FnMut(u32, u32),
) {
    while pump_once(pump, router, sink, resize_hook) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::events::MouseButton;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct RecordingSink {
        log: Rc<RefCell<Vec<String>>>,
        updates: usize,
    }

    impl RecordingSink {
        fn with_log(log: Rc<RefCell<Vec<String>>>) -> Self {
            Self { log, updates: 0 }
        }
    }

    impl EventSink for RecordingSink {
        fn on_create(&mut self) {
            self.log.borrow_mut().push("create".to_string());
        }
        fn on_destroy(&mut self) {
            self.log.borrow_mut().push("destroy".to_string());
        }
        fn on_resize(&mut self, width: u32, height: u32) {
            self.log.borrow_mut().push(format!("resize {width}x{height}"));
        }
        fn on_activate(&mut self, active: bool) {
            self.log.borrow_mut().push(format!("activate {active}"));
        }
        fn on_keypress(&mut self, ch: char, code: u32) {
            self.log.borrow_mut().push(format!("keypress {ch} {code}"));
        }
        fn on_update(&mut self) {
            self.updates += 1;
        }
        fn on_mouse_down(&mut self, x: i32, y: i32, button: MouseButton) {
            self.log
                .borrow_mut()
                .push(format!("mouse-down {x},{y} {button:?}"));
        }
        fn on_mouse_up(&mut self, x: i32, y: i32, button: MouseButton) {
            self.log
                .borrow_mut()
                .push(format!("mouse-up {x},{y} {button:?}"));
        }
        fn on_mouse_move(&mut self, x: i32, y: i32) {
            self.log.borrow_mut().push(format!("mouse-move {x},{y}"));
        }
    }

    #[test]
    fn scripted_sequence_dispatches_in_exact_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut sink = RecordingSink::with_log(log.clone());
        let mut pump = ScriptedPump::new([
            WindowMessage::Created,
            WindowMessage::KeyDown('A' as u32),
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
        ]);
        let mut router = Router::new(1280, 720, true);

        let hook_log = log.clone();
        let mut hook = move |w: u32, h: u32| hook_log.borrow_mut().push(format!("chain {w}x{h}"));
        run(&mut pump, &mut router, &mut sink, &mut hook);

        assert_eq!(
            *log.borrow(),
            vec![
                "create",
                "keypress a 65",
                "chain 800x600",
                "resize 800x600",
                "mouse-down 10,20 Left",
                "destroy",
            ]
        );
        assert!(router.quit_requested());
    }

    #[test]
    fn char_without_preceding_key_down_fires_with_code_zero() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut sink = RecordingSink::with_log(log.clone());
        let mut router = Router::new(1280, 720, true);
        let mut hook = |_: u32, _: u32| {};

        router.dispatch(WindowMessage::Char('x'), &mut sink, &mut hook);
        assert_eq!(*log.borrow(), vec!["keypress x 0"]);
    }

    #[test]
    fn pending_key_is_cleared_after_pairing() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut sink = RecordingSink::with_log(log.clone());
        let mut router = Router::new(1280, 720, true);
        let mut hook = |_: u32, _: u32| {};

        router.dispatch(WindowMessage::KeyDown(65), &mut sink, &mut hook);
        router.dispatch(WindowMessage::Char('a'), &mut sink, &mut hook);
        router.dispatch(WindowMessage::Char('b'), &mut sink, &mut hook);
        assert_eq!(*log.borrow(), vec!["keypress a 65", "keypress b 0"]);
    }

    #[test]
    fn minimize_size_message_is_ignored() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut sink = RecordingSink::with_log(log.clone());
        let mut router = Router::new(1280, 720, true);
        let mut hook_calls = 0;
        {
            let mut hook = |_: u32, _: u32| hook_calls += 1;
            router.dispatch(
                WindowMessage::Resized {
                    width: 0,
                    height: 0,
                },
                &mut sink,
                &mut hook,
            );
        }
        assert_eq!(hook_calls, 0);
        assert!(log.borrow().is_empty());
        assert_eq!((router.width(), router.height()), (1280, 720));
    }

    #[test]
    fn always_active_invokes_update_with_no_messages() {
        let mut sink = RecordingSink::default();
        let mut pump = ScriptedPump::default();
        let mut router = Router::new(1280, 720, true);
        let mut hook = |_: u32, _: u32| {};

        for _ in 0..5 {
            assert!(pump_once(&mut pump, &mut router, &mut sink, &mut hook));
        }
        assert_eq!(sink.updates, 5);
    }

    #[test]
    fn inactive_loop_blocks_without_update_until_a_message_arrives() {
        let mut sink = RecordingSink::default();
        // Inactive + not always-active: the loop must go through wait() and
        // never poll. The script ends with destroy, so run() terminates.
        let mut pump = ScriptedPump::new([WindowMessage::Destroyed]);
        let mut router = Router::new(1280, 720, false);
        let mut hook = |_: u32, _: u32| {};

        run(&mut pump, &mut router, &mut sink, &mut hook);
        assert_eq!(sink.updates, 0);
    }

    #[test]
    fn activation_updates_the_active_flag_before_the_callback() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut sink = RecordingSink::with_log(log.clone());
        let mut router = Router::new(1280, 720, false);
        let mut hook = |_: u32, _: u32| {};

        router.dispatch(WindowMessage::Activated(true), &mut sink, &mut hook);
        assert!(router.is_active());
        router.dispatch(WindowMessage::Activated(false), &mut sink, &mut hook);
        assert!(!router.is_active());
        assert_eq!(*log.borrow(), vec!["activate true", "activate false"]);
    }
}

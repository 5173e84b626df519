//! Window messages and the application event surface
//!
//! Raw platform messages are translated into [`WindowMessage`] values and
//! dispatched through the [`EventSink`] trait, one method per event kind.
//! Applications that prefer per-callback registration use [`Callbacks`],
//! a sink with nine independently nullable function slots.

/// Mouse button identifier delivered with button events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    /// Left button
    Left,
    /// Right button
    Right,
    /// Middle button
    Middle,
}

/// A translated window-system message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowMessage {
    /// The window finished creation
    Created,
    /// The window is being destroyed
    Destroyed,
    /// The client area changed size; minimize reports a logical zero size
    Resized {
        /// New client width, 0 when minimized
        width: u32,
        /// New client height, 0 when minimized
        height: u32,
    },
    /// The window moved to the foreground (`true`) or background (`false`)
    Activated(bool),
    /// A key went down; the raw code arrives before character translation
    KeyDown(u32),
    /// Character input, available after the key-down message completes
    Char(char),
    /// A mouse button was pressed at the given pixel position
    MouseDown {
        /// Cursor x in pixels
        x: i32,
        /// Cursor y in pixels
        y: i32,
        /// Which button
        button: MouseButton,
    },
    /// A mouse button was released at the given pixel position
    MouseUp {
        /// Cursor x in pixels
        x: i32,
        /// Cursor y in pixels
        y: i32,
        /// Which button
        button: MouseButton,
    },
    /// The cursor moved to the given pixel position
    MouseMove {
        /// Cursor x in pixels
        x: i32,
        /// Cursor y in pixels
        y: i32,
    },
    /// The platform requested loop termination
    Quit,
}

/// Receiver for translated window events.
///
/// Every method has a no-op default, so a sink implements only what it
/// cares about. All methods are invoked synchronously from the run loop,
/// in message order.
pub trait EventSink {
    /// Window finished creation
    fn on_create(&mut self) {}

    /// Window is being destroyed
    fn on_destroy(&mut self) {}

    /// Client area changed size; the swapchain has already been resized
    /// when this fires
    fn on_resize(&mut self, width: u32, height: u32) {
        let _ = (width, height);
    }

    /// Foreground/background transition
    fn on_activate(&mut self, active: bool) {
        let _ = active;
    }

    /// Translated character input paired with the raw key code that
    /// preceded it; `code` is 0 when no key-down preceded the character
    fn on_keypress(&mut self, ch: char, code: u32) {
        let _ = (ch, code);
    }

    /// One run-loop iteration elapsed
    fn on_update(&mut self) {}

    /// Mouse button pressed
    fn on_mouse_down(&mut self, x: i32, y: i32, button: MouseButton) {
        let _ = (x, y, button);
    }

    /// Mouse button released
    fn on_mouse_up(&mut self, x: i32, y: i32, button: MouseButton) {
        let _ = (x, y, button);
    }

    /// Cursor moved
    fn on_mouse_move(&mut self, x: i32, y: i32) {
        let _ = (x, y);
    }
}

/// Nine optional callback slots behind the [`EventSink`] interface.
///
/// Each slot is independently nullable and invoked only when bound;
/// setting a slot overwrites the prior binding.
#[derive(Default)]
pub struct Callbacks {
    create_fn: Option<Box<dyn FnMut()>>,
    destroy_fn: Option<Box<dyn FnMut()>>,
    resize_fn: Option<Box<dyn FnMut(u32, u32)>>,
    activate_fn: Option<Box<dyn FnMut(bool)>>,
    keypress_fn: Option<Box<dyn FnMut(char, u32)>>,
    update_fn: Option<Box<dyn FnMut()>>,
    mouse_down_fn: Option<Box<dyn FnMut(i32, i32, MouseButton)>>,
    mouse_up_fn: Option<Box<dyn FnMut(i32, i32, MouseButton)>>,
    mouse_move_fn: Option<Box<dyn FnMut(i32, i32)>>,
}

impl Callbacks {
    /// An empty callback table
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the create callback
    pub fn set_create_fn(&mut self, f: impl FnMut() + 'static) {
        self.create_fn = Some(Box::new(f));
    }

    /// Bind the destroy callback
    pub fn set_destroy_fn(&mut self, f: impl FnMut() + 'static) {
        self.destroy_fn = Some(Box::new(f));
    }

    /// Bind the resize callback
    pub fn set_resize_fn(&mut self, f: impl FnMut(u32, u32) + 'static) {
        self.resize_fn = Some(Box::new(f));
    }

    /// Bind the activate callback
    pub fn set_activate_fn(&mut self, f: impl FnMut(bool) + 'static) {
        self.activate_fn = Some(Box::new(f));
    }

    /// Bind the keypress callback
    pub fn set_keypress_fn(&mut self, f: impl FnMut(char, u32) + 'static) {
        self.keypress_fn = Some(Box::new(f));
    }

    /// Bind the per-frame update callback
    pub fn set_update_fn(&mut self, f: impl FnMut() + 'static) {
        self.update_fn = Some(Box::new(f));
    }

    /// Bind the mouse-down callback
    pub fn set_mouse_down_fn(&mut self, f: impl FnMut(i32, i32, MouseButton) + 'static) {
        self.mouse_down_fn = Some(Box::new(f));
    }

    /// Bind the mouse-up callback
    pub fn set_mouse_up_fn(&mut self, f: impl FnMut(i32, i32, MouseButton) + 'static) {
        self.mouse_up_fn = Some(Box::new(f));
    }

    /// Bind the mouse-move callback
    pub fn set_mouse_move_fn(&mut self, f: impl FnMut(i32, i32) + 'static) {
        self.mouse_move_fn = Some(Box::new(f));
    }
}

impl EventSink for Callbacks {
    fn on_create(&mut self) {
        if let Some(f) = self.create_fn.as_mut() {
            f();
        }
    }

    fn on_destroy(&mut self) {
        if let Some(f) = self.destroy_fn.as_mut() {
            f();
        }
    }

    fn on_resize(&mut self, width: u32, height: u32) {
        if let Some(f) = self.resize_fn.as_mut() {
            f(width, height);
        }
    }

    fn on_activate(&mut self, active: bool) {
        if let Some(f) = self.activate_fn.as_mut() {
            f(active);
        }
    }

    fn on_keypress(&mut self, ch: char, code: u32) {
        if let Some(f) = self.keypress_fn.as_mut() {
            f(ch, code);
        }
    }

    fn on_update(&mut self) {
        if let Some(f) = self.update_fn.as_mut() {
            f();
        }
    }

    fn on_mouse_down(&mut self, x: i32, y: i32, button: MouseButton) {
        if let Some(f) = self.mouse_down_fn.as_mut() {
            f(x, y, button);
        }
    }

    fn on_mouse_up(&mut self, x: i32, y: i32, button: MouseButton) {
        if let Some(f) = self.mouse_up_fn.as_mut() {
            f(x, y, button);
        }
    }

    fn on_mouse_move(&mut self, x: i32, y: i32) {
        if let Some(f) = self.mouse_move_fn.as_mut() {
            f(x, y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn unbound_slots_are_skipped() {
        let mut callbacks = Callbacks::new();
        // None of these may panic or require a binding.
        callbacks.on_create();
        callbacks.on_resize(800, 600);
        callbacks.on_keypress('a', 65);
    }

    #[test]
    fn setting_a_slot_overwrites_the_prior_binding() {
        let hits = Rc::new(RefCell::new(Vec::new()));
        let mut callbacks = Callbacks::new();

        let log = hits.clone();
        callbacks.set_update_fn(move || log.borrow_mut().push("first"));
        let log = hits.clone();
        callbacks.set_update_fn(move || log.borrow_mut().push("second"));

        callbacks.on_update();
        assert_eq!(*hits.borrow(), vec!["second"]);
    }
}

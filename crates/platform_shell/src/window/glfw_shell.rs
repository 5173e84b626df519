//! GLFW-based window shell
//!
//! Owns the native window, translates GLFW events into [`WindowMessage`]s,
//! and provides Vulkan surface creation for the graphics backend. GLFW has no
//! creation message of its own, so the shell queues one at construction time
//! so the application's create callback fires on the first loop iteration.
//!
//! Fullscreen is a window-system mode switch here: the shell creates the
//! window on the primary monitor when asked, and switches back to a centered
//! windowed mode on [`MessagePump::exit_fullscreen`] during teardown.

use std::collections::VecDeque;

use crate::display::{OutputRecord, RationalMode};
use crate::gfx::vulkan::{VkSurface, VulkanBackend};
use crate::window::events::{MouseButton, WindowMessage};
use crate::window::shell::MessagePump;
use crate::window::ShellError;

/// GLFW window wrapper with proper resource management
pub struct GlfwShell {
    glfw: glfw::Glfw,
    window: glfw::PWindow,
    events: glfw::GlfwReceiver<(f64, glfw::WindowEvent)>,
    queued: VecDeque<WindowMessage>,
    cursor: (i32, i32),
    windowed_size: (u32, u32),
    fullscreen: bool,
    name: String,
}

impl GlfwShell {
    /// Create a window with the given client size, centered when windowed
    /// or covering the primary monitor when `fullscreen` is set.
    ///
    /// The window is configured for Vulkan rendering, so no OpenGL context
    /// is attached.
    pub fn create(
        name: &str,
        width: u32,
        height: u32,
        fullscreen: bool,
    ) -> Result<Self, ShellError> {
        let mut glfw = glfw::init(glfw::fail_on_errors)
            .map_err(|e| ShellError::ClassRegistrationFailed(e.to_string()))?;

        glfw.window_hint(glfw::WindowHint::ClientApi(glfw::ClientApiHint::NoApi));
        glfw.window_hint(glfw::WindowHint::Resizable(true));

        let created = glfw.with_primary_monitor(|glfw, monitor| {
            let mode = match (fullscreen, monitor) {
                (true, Some(monitor)) => glfw::WindowMode::FullScreen(monitor),
                _ => glfw::WindowMode::Windowed,
            };
            glfw.create_window(width, height, name, mode)
        });
        let (mut window, events) = created.ok_or_else(|| {
            ShellError::WindowCreationFailed(format!("{width}x{height} \"{name}\""))
        })?;

        window.set_key_polling(true);
        window.set_char_polling(true);
        window.set_size_polling(true);
        window.set_close_polling(true);
        window.set_focus_polling(true);
        window.set_mouse_button_polling(true);
        window.set_cursor_pos_polling(true);

        if !fullscreen {
            center_on_primary(&mut glfw, &mut window);
        }

        log::info!(
            "Window created: \"{}\" {}x{} fullscreen={}",
            name,
            width,
            height,
            fullscreen
        );

        let mut queued = VecDeque::new();
        queued.push_back(WindowMessage::Created);

        Ok(Self {
            glfw,
            window,
            events,
            queued,
            cursor: (0, 0),
            windowed_size: (width, height),
            fullscreen,
            name: name.to_string(),
        })
    }

    /// Window title
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the window currently covers a monitor
    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Current client size
    pub fn client_size(&self) -> (u32, u32) {
        let (width, height) = self.window.get_size();
        (width as u32, height as u32)
    }

    /// Resize the client area and re-center the window
    pub fn readjust(&mut self, width: u32, height: u32) {
        self.windowed_size = (width, height);
        if self.fullscreen {
            return;
        }
        self.window.set_size(width as i32, height as i32);
        center_on_primary(&mut self.glfw, &mut self.window);
    }

    /// Make the window visible
    pub fn show(&mut self) {
        self.window.show();
    }

    /// Hide the window
    pub fn hide(&mut self) {
        self.window.hide();
    }

    /// Vulkan instance extensions GLFW requires for surface creation
    pub fn required_instance_extensions(&self) -> Result<Vec<String>, ShellError> {
        self.glfw.get_required_instance_extensions().ok_or_else(|| {
            ShellError::Platform("no Vulkan instance extensions available".to_string())
        })
    }

    /// Create a presentable surface on this window
    pub fn create_vulkan_surface(&mut self, backend: &VulkanBackend) -> Result<VkSurface, ShellError> {
        let mut surface = ash::vk::SurfaceKHR::null();
        let result =
            self.window
                .create_window_surface(backend.instance_handle(), std::ptr::null(), &mut surface);

        if result == ash::vk::Result::SUCCESS {
            Ok(backend.wrap_surface(surface))
        } else {
            Err(ShellError::Platform(format!(
                "surface creation failed: {result:?}"
            )))
        }
    }

    /// Display modes of every connected monitor, whole-hertz only
    pub fn monitor_modes(&mut self) -> Vec<OutputRecord> {
        self.glfw.with_connected_monitors(|_, monitors| {
            monitors
                .iter()
                .enumerate()
                .map(|(id, monitor)| {
                    OutputRecord::from_modes(
                        id as u32,
                        monitor.get_video_modes().into_iter().map(|mode| RationalMode {
                            width: mode.width,
                            height: mode.height,
                            numerator: mode.refresh_rate,
                            denominator: 1,
                        }),
                    )
                })
                .collect()
        })
    }

    fn drain_events(&mut self) {
        // flush_messages borrows the receiver, so translation happens into
        // a local queue first.
        let mut translated = Vec::new();
        for (_, event) in glfw::flush_messages(&self.events) {
            if let Some(message) = translate(event, &mut self.cursor) {
                translated.push(message);
            }
        }
        self.queued.extend(translated);
        if self.window.should_close() && !self.queued.contains(&WindowMessage::Destroyed) {
            self.window.set_should_close(false);
            self.queued.push_back(WindowMessage::Destroyed);
        }
    }
}

impl MessagePump for GlfwShell {
    fn poll(&mut self) -> Option<WindowMessage> {
        if let Some(message) = self.queued.pop_front() {
            return Some(message);
        }
        self.glfw.poll_events();
        self.drain_events();
        self.queued.pop_front()
    }

    fn wait(&mut self) -> WindowMessage {
        loop {
            if let Some(message) = self.queued.pop_front() {
                return message;
            }
            self.glfw.wait_events();
            self.drain_events();
        }
    }

    fn outputs(&mut self) -> Vec<OutputRecord> {
        self.monitor_modes()
    }

    fn exit_fullscreen(&mut self) {
        if !self.fullscreen {
            return;
        }
        let (width, height) = self.windowed_size;
        self.window.set_monitor(
            glfw::WindowMode::Windowed,
            0,
            0,
            width,
            height,
            None,
        );
        self.fullscreen = false;
        center_on_primary(&mut self.glfw, &mut self.window);
        log::info!("left fullscreen, restored {}x{} windowed", width, height);
    }
}

fn translate(event: glfw::WindowEvent, cursor: &mut (i32, i32)) -> Option<WindowMessage> {
    match event {
        glfw::WindowEvent::Size(width, height) => Some(WindowMessage::Resized {
            width: width.max(0) as u32,
            height: height.max(0) as u32,
        }),
        glfw::WindowEvent::Close => Some(WindowMessage::Destroyed),
        glfw::WindowEvent::Focus(focused) => Some(WindowMessage::Activated(focused)),
        glfw::WindowEvent::Key(key, _, glfw::Action::Press | glfw::Action::Repeat, _) => {
            Some(WindowMessage::KeyDown(key as u32))
        }
        glfw::WindowEvent::Char(ch) => Some(WindowMessage::Char(ch)),
        glfw::WindowEvent::CursorPos(x, y) => {
            *cursor = (x as i32, y as i32);
            Some(WindowMessage::MouseMove {
                x: cursor.0,
                y: cursor.1,
            })
        }
        glfw::WindowEvent::MouseButton(button, action, _) => {
            let button = match button {
                glfw::MouseButton::Button1 => MouseButton::Left,
                glfw::MouseButton::Button2 => MouseButton::Right,
                glfw::MouseButton::Button3 => MouseButton::Middle,
                _ => return None,
            };
            let (x, y) = *cursor;
            match action {
                glfw::Action::Press => Some(WindowMessage::MouseDown { x, y, button }),
                glfw::Action::Release => Some(WindowMessage::MouseUp { x, y, button }),
                glfw::Action::Repeat => None,
            }
        }
        _ => None,
    }
}

/// Client-area origin that centers the full window frame inside the given
/// work area. `frame` is (left, top, right, bottom) chrome thickness.
fn centered_origin(
    work_area: (i32, i32, i32, i32),
    client: (i32, i32),
    frame: (i32, i32, i32, i32),
) -> (i32, i32) {
    let (area_x, area_y, area_width, area_height) = work_area;
    let (client_width, client_height) = client;
    let (left, top, right, bottom) = frame;

    let outer_width = client_width + left + right;
    let outer_height = client_height + top + bottom;
    let x = area_x + (area_width - outer_width) / 2;
    let y = area_y + (area_height - outer_height) / 2;
    // set_pos places the client area, so shift past the frame border.
    (x + left, y + top)
}

fn center_on_primary(glfw: &mut glfw::Glfw, window: &mut glfw::PWindow) {
    let client = window.get_size();
    let frame = window.get_frame_size();

    glfw.with_primary_monitor(|_, monitor| {
        if let Some(monitor) = monitor {
            let (x, y) = centered_origin(monitor.get_workarea(), client, frame);
            window.set_pos(x, y);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centering_offsets_the_client_origin_by_both_frame_borders() {
        // 1000x1000 work area, 800x600 client, 8px side borders and a
        // 31px title bar: the outer frame is 816x639 at (92, 180), so the
        // client origin sits one border further in on both axes.
        let origin = centered_origin((0, 0, 1000, 1000), (800, 600), (8, 31, 8, 8));
        assert_eq!(origin, (92 + 8, 180 + 31));
    }

    #[test]
    fn centering_respects_the_work_area_origin() {
        let origin = centered_origin((100, 50, 1000, 1000), (800, 600), (0, 0, 0, 0));
        assert_eq!(origin, (200, 250));
    }
}

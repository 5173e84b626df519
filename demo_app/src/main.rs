//! Demo application for the platform session layer
//!
//! Opens a window, negotiates a device, and logs every lifecycle callback.
//! Pass `--modes` to print the adapter and display-mode inventory as JSON
//! instead of running the loop.

use platform_shell::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    platform_shell::logging::init();

    let params = InitParams::new()
        .with_size(1024, 768)
        .with_flags(GfxFlags::DEBUG | GfxFlags::VSYNC);

    let mut shell = GlfwShell::create(
        "platform-shell demo",
        1024,
        768,
        params.flags.contains(GfxFlags::FULLSCREEN),
    )?;
    let extensions = shell.required_instance_extensions()?;
    let backend = VulkanBackend::new(&extensions, params.flags.contains(GfxFlags::DEBUG))?;
    let surface = shell.create_vulkan_surface(&backend)?;

    if std::env::args().any(|arg| arg == "--modes") {
        let mut session = Session::windowed(backend, shell, surface, "modes", &params)?;
        println!("{}", session.display_inventory()?.to_json()?);
        return Ok(());
    }

    let mut session = Session::windowed(backend, shell, surface, "demo", &params)?;
    log::info!(
        "session ready: {}x{} at tier {}",
        session.width(),
        session.height(),
        session.tier()
    );

    let mut callbacks = Callbacks::new();
    callbacks.set_create_fn(|| log::info!("window created"));
    callbacks.set_destroy_fn(|| log::info!("window destroyed"));
    callbacks.set_resize_fn(|w, h| log::info!("resized to {}x{}", w, h));
    callbacks.set_activate_fn(|active| log::info!("active: {}", active));
    callbacks.set_keypress_fn(|ch, code| log::info!("key '{}' (code {})", ch, code));
    callbacks.set_mouse_down_fn(|x, y, button| log::info!("{:?} down at {},{}", button, x, y));
    callbacks.set_mouse_up_fn(|x, y, button| log::info!("{:?} up at {},{}", button, x, y));

    session.run(&mut callbacks);
    log::info!("loop exited");
    Ok(())
}

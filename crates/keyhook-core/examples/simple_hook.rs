#[cfg(windows)]
fn main() -> anyhow::Result<()> {
    use keyhook_core::{config, keyboard_hook, BindingSet, Profile};
    use std::path::Path;

    tracing_subscriber::fmt::init();

    println!("Starting Full Hook Test...");

    let profile = match Path::new("profile.json") {
        path if path.exists() => config::load_profile(path)?,
        _ => Profile::default(),
    };
    let path = Path::new("bindings.json");
    let bindings = if path.exists() {
        println!("Loading bindings from {:?}", path);
        config::load_bindings(path)?
    } else {
        println!("Bindings not found at {:?}, running in pass-through mode.", path);
        BindingSet::default()
    };

    keyboard_hook::install_hooks(profile, &bindings)?;

    let events = keyboard_hook::notifications();
    std::thread::spawn(move || {
        for event in events {
            println!("{:?}", event);
        }
    });

    keyboard_hook::run_event_loop();
    keyboard_hook::uninstall_hooks();
    Ok(())
}

#[cfg(not(windows))]
fn main() {
    eprintln!("simple_hook only runs on Windows.");
}

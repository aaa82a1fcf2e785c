use std::time::SystemTime;

use dijoy::backends::virtual_input::{VirtualController, VirtualInput};
use dijoy::{Config, ControllerService, DirectInput, EventFilter, LogListener, Substate};

fn main() -> dijoy::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Script a gamepad instead of real hardware
    let vi = VirtualInput::new();
    let pad = vi.attach(VirtualController::gamepad("Virtual Pad"));

    let di = DirectInput::with_api(vi.clone());
    for joystick in di.devices().iter()? {
        let joystick = joystick?;
        println!("{} -> {:?}", joystick.instance_name()?, joystick.counts());
    }

    let mut svc = ControllerService::new(di, Config::default())?;
    svc.bus_mut()
        .add_listener(LogListener::new(), EventFilter::All, None);

    // Inject some sample input and poll after each step
    let steps: [&dyn Fn(); 3] = [
        &|| vi.set_axis(&pad, 0, 750),
        &|| vi.press_button(&pad, 1),
        &|| vi.set_pov(&pad, 0, 27_000),
    ];
    svc.poll(SystemTime::now())?;
    for step in steps {
        step();
        let changed = svc.poll(SystemTime::now())?;
        if changed.contains(Substate::BUTTONS) {
            println!("buttons now: {:?}", svc.state().buttons.pressed);
        }
    }

    println!("{}", svc.controller().map(|c| c.read()).transpose()?.unwrap_or_default());
    Ok(())
}

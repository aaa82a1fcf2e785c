//! Open-time configuration and state reads.

use dijoy::backends::virtual_input::{VirtualController, VirtualInput};
use dijoy::device::{didft_make_instance, AxisMode, DeviceObject, DIDFT_ABSAXIS};
use dijoy::guid::GUID_POV;
use dijoy::{AxisConfig, ControllerIdentity, DirectInput, Error, Guid, HResult};

fn open_one(ctl: VirtualController) -> (VirtualInput, Guid, dijoy::Joystick<VirtualInput>) {
    let vi = VirtualInput::new();
    let id = vi.attach(ctl);
    let di = DirectInput::with_api(vi.clone());
    let joystick = di.open(id).unwrap();
    (vi, id, joystick)
}

#[test]
fn open_configures_every_axis() {
    let (vi, id, joystick) = open_one(VirtualController::flight_stick("Stick"));
    let probe = vi.probe(&id).unwrap();

    assert!(probe.format_set);
    assert_eq!(probe.axis_mode, Some(AxisMode::Absolute));
    assert!(probe.acquired);
    // Six axes plus two sliders, all axis objects.
    assert_eq!(probe.ranges.len(), 8);
    assert!(probe.ranges.values().all(|&r| r == (-1000, 1000)));
    assert_eq!(probe.deadzones.len(), 8);
    assert!(probe.deadzones.values().all(|&d| d == 1000));

    let counts = joystick.counts();
    assert_eq!(counts.axes, 8);
    assert_eq!(counts.sliders, 2);
    assert_eq!(counts.pov_hats, 2);
    assert_eq!(counts.buttons, 32);
}

#[test]
fn custom_axis_config_is_applied() {
    let vi = VirtualInput::new();
    let id = vi.attach(VirtualController::gamepad("Pad"));
    let di = DirectInput::with_api(vi.clone()).with_axis_config(AxisConfig {
        min: 0,
        max: 65535,
        deadzone: 250,
    });
    let _joystick = di.open(id).unwrap();

    let probe = vi.probe(&id).unwrap();
    assert!(probe.ranges.values().all(|&r| r == (0, 65535)));
    assert!(probe.deadzones.values().all(|&d| d == 250));
}

#[test]
fn rejected_axis_properties_do_not_fail_open() {
    let vi = VirtualInput::new();
    let id = vi.attach(VirtualController::gamepad("Pad"));
    // Deadzone above 10000 is refused by the device.
    let di = DirectInput::with_api(vi.clone()).with_axis_config(AxisConfig {
        min: -1000,
        max: 1000,
        deadzone: 20_000,
    });
    let joystick = di.open(id).unwrap();

    let probe = vi.probe(&id).unwrap();
    assert_eq!(probe.ranges.len(), 6);
    assert!(probe.deadzones.is_empty());
    assert_eq!(joystick.counts().axes, 6);
}

#[test]
fn pov_counted_by_type_guid_alone() {
    // An object that reports the POV GUID but axis type bits still counts as a POV.
    let odd = DeviceObject {
        guid_type: GUID_POV,
        obj_type: DIDFT_ABSAXIS | didft_make_instance(7),
        name: "Hat".into(),
    };
    let (_vi, _id, joystick) = open_one(VirtualController::new("Odd").with_axes(2).with_object(odd));
    let counts = joystick.counts();
    assert_eq!(counts.pov_hats, 1);
    assert_eq!(counts.axes, 3);
}

#[test]
fn state_reflects_device_buffer() {
    let (vi, id, joystick) = open_one(VirtualController::gamepad("Pad"));
    vi.set_axis(&id, 0, -1000);
    vi.set_axis(&id, 5, 640);
    vi.set_pov(&id, 0, 9000);
    vi.press_button(&id, 3);

    let st = joystick.state().unwrap();
    assert_eq!(st.x, -1000);
    assert_eq!(st.rz, 640);
    assert_eq!(st.pov_hats, vec![9000]);
    assert_eq!(st.buttons.len(), 10);
    assert_eq!(st.pressed().collect::<Vec<_>>(), vec![3]);
    assert!(st.sliders.is_empty());
}

#[test]
fn centered_pov_reads_as_minus_one() {
    let (_vi, _id, joystick) = open_one(VirtualController::gamepad("Pad"));
    assert_eq!(joystick.state().unwrap().pov_hats, vec![-1]);
}

#[test]
fn single_poll_failure_recovers() {
    let (vi, id, joystick) = open_one(VirtualController::gamepad("Pad"));
    let before = vi.probe(&id).unwrap();
    vi.fail_polls(&id, 1);

    assert!(joystick.state().is_ok());
    let after = vi.probe(&id).unwrap();
    assert_eq!(after.polls - before.polls, 2);
    assert_eq!(after.acquires - before.acquires, 1);
}

#[test]
fn second_poll_failure_is_surfaced() {
    let (vi, id, joystick) = open_one(VirtualController::gamepad("Pad"));
    vi.fail_polls(&id, 2);

    match joystick.state() {
        Err(Error::Native { call, code }) => {
            assert_eq!(call, "Poll");
            assert_eq!(code, HResult::DIERR_INPUTLOST);
        }
        other => panic!("expected Poll failure, got {other:?}"),
    }
}

#[test]
fn failed_reacquire_is_surfaced() {
    let (vi, id, joystick) = open_one(VirtualController::gamepad("Pad"));
    vi.unacquire(&id);
    vi.fail_acquires(&id, 1);

    let err = joystick.state().unwrap_err();
    assert_eq!(err.code(), Some(HResult::DIERR_OTHERAPPHASPRIO));
    assert!(err.to_string().starts_with("Acquire failed"));

    // Focus comes back: the next read acquires again.
    assert!(joystick.state().is_ok());
}

#[test]
fn initial_acquire_failure_is_deferred() {
    let vi = VirtualInput::new();
    let id = vi.attach(VirtualController::gamepad("Pad"));
    vi.fail_acquires(&id, 1);
    let di = DirectInput::with_api(vi.clone());

    let joystick = di.open(id).unwrap();
    assert!(!vi.probe(&id).unwrap().acquired);
    assert!(joystick.state().is_ok());
    assert!(vi.probe(&id).unwrap().acquired);
}

#[test]
fn unplugged_device_fails_reads() {
    let (vi, id, joystick) = open_one(VirtualController::gamepad("Pad"));
    vi.detach(&id);
    assert_eq!(
        joystick.state().unwrap_err().code(),
        Some(HResult::DIERR_UNPLUGGED)
    );
}

#[test]
fn identity_accessors() {
    let product = Guid::from_fields(0x028e_045e, 0, 0, *b"\0\0PIDVID");
    let ctl = VirtualController::gamepad("Controller (XBOX 360 For Windows)")
        .with_product_name("Xbox 360 Controller")
        .with_product(product);
    let (_vi, id, joystick) = open_one(ctl);

    assert_eq!(joystick.instance().unwrap(), id);
    assert_eq!(joystick.product().unwrap(), product);
    assert_eq!(
        joystick.instance_name().unwrap(),
        "Controller (XBOX 360 For Windows)"
    );
    assert_eq!(joystick.product_name().unwrap(), "Xbox 360 Controller");

    let meta = joystick.metadata().unwrap();
    assert_eq!(meta.vid, Some(0x045e));
    assert_eq!(meta.pid, Some(0x028e));
    assert_eq!(meta.type_label(), "gamepad");

    let identity = ControllerIdentity::of(&joystick).unwrap();
    assert_eq!(identity.instance, id);
    assert_eq!(identity.product_name, "Xbox 360 Controller");
}

//! Controller selection and the polling service.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, SystemTime};

use dijoy::backends::virtual_input::{VirtualController, VirtualInput};
use dijoy::controller::{attached, find_instance};
use dijoy::{
    Config, ControllerEvent, ControllerIdentity, ControllerService, DirectInput, Error,
    EventFilter, EventKind, Guid, HResult, InputListener, Substate,
};

#[derive(Clone, Default)]
struct Recorder(Rc<RefCell<Vec<ControllerEvent>>>);

impl InputListener for Recorder {
    fn on_input(&mut self, event: &ControllerEvent) {
        self.0.borrow_mut().push(event.clone());
    }
}

impl Recorder {
    fn kinds(&self) -> Vec<Substate> {
        self.0.borrow().iter().map(|e| e.kind.substate()).collect()
    }
}

struct Rig {
    vi: VirtualInput,
    a: Guid,
    b: Guid,
}

fn rig() -> Rig {
    let vi = VirtualInput::new();
    let a = vi.attach(VirtualController::gamepad("Pad A").with_product(Guid::from_u128(0xa)));
    let b = vi.attach(
        VirtualController::flight_stick("Stick B")
            .with_product_name("Flight Stick")
            .with_product(Guid::from_u128(0xb)),
    );
    Rig { vi, a, b }
}

fn wanted(instance: Guid, product: Guid, instance_name: &str, product_name: &str) -> ControllerIdentity {
    ControllerIdentity {
        instance,
        product,
        instance_name: instance_name.into(),
        product_name: product_name.into(),
    }
}

#[test]
fn find_instance_prefers_exact_instance() {
    let r = rig();
    let di = DirectInput::with_api(r.vi.clone());
    let (id, _j) = find_instance(&di, &wanted(r.b, Guid::from_u128(0xa), "Pad A", ""))
        .unwrap()
        .unwrap();
    assert_eq!(id.instance, r.b);
}

#[test]
fn find_instance_falls_back_through_passes() {
    let r = rig();
    let di = DirectInput::with_api(r.vi.clone());
    let unknown = Guid::from_u128(0xdead);

    let by_product = find_instance(&di, &wanted(unknown, Guid::from_u128(0xb), "", ""))
        .unwrap()
        .unwrap();
    assert_eq!(by_product.0.instance, r.b);

    let by_name = find_instance(&di, &wanted(unknown, unknown, "Stick B", "")).unwrap().unwrap();
    assert_eq!(by_name.0.instance, r.b);

    let by_product_name = find_instance(&di, &wanted(unknown, unknown, "", "Flight Stick"))
        .unwrap()
        .unwrap();
    assert_eq!(by_product_name.0.instance, r.b);

    // Nothing matches: first attached controller.
    let any = find_instance(&di, &wanted(unknown, unknown, "", "")).unwrap().unwrap();
    assert_eq!(any.0.instance, r.a);
}

#[test]
fn find_instance_on_empty_system() {
    let di = DirectInput::with_api(VirtualInput::new());
    assert!(find_instance(&di, &ControllerIdentity::default()).unwrap().is_none());
}

#[test]
fn find_instance_releases_rejected_candidates() {
    let r = rig();
    let di = DirectInput::with_api(r.vi.clone());
    let found = find_instance(&di, &wanted(r.b, Guid::NIL, "", "")).unwrap().unwrap();
    assert_eq!(r.vi.probe(&r.a).unwrap().refs, 0);
    assert_eq!(r.vi.probe(&r.b).unwrap().refs, 1);
    drop(found);
    assert_eq!(r.vi.probe(&r.b).unwrap().refs, 0);
}

#[test]
fn attached_lists_identities() {
    let r = rig();
    let di = DirectInput::with_api(r.vi.clone());
    let ids = attached(&di).unwrap();
    assert_eq!(ids.len(), 2);
    assert_eq!(ids[0].instance, r.a);
    assert_eq!(ids[1].product_name, "Flight Stick");
}

#[test]
fn service_selects_remembered_controller() {
    let r = rig();
    let toml = format!(
        "poll_interval_ms = 20\n\n[controller]\ninstance = \"{}\"\n",
        r.b
    );
    let config = Config::from_toml_str(&toml).unwrap();
    let svc = ControllerService::new(DirectInput::with_api(r.vi.clone()), config).unwrap();

    assert_eq!(svc.identity().unwrap().instance, r.b);
    assert_eq!(svc.poll_interval(), Duration::from_millis(20));
}

#[test]
fn poll_emits_one_event_per_changed_group() {
    let r = rig();
    let mut config = Config::default();
    config.controller = Some(wanted(r.a, Guid::NIL, "", ""));
    let mut svc = ControllerService::new(DirectInput::with_api(r.vi.clone()), config).unwrap();
    let rec = Recorder::default();
    svc.bus_mut().add_listener(rec.clone(), EventFilter::All, None);

    let t0 = SystemTime::now();
    // Lists start empty; axes start at zero and the pad is centered.
    let first = svc.poll(t0).unwrap();
    assert_eq!(first, Substate::BUTTONS | Substate::POV_HATS);
    assert_eq!(rec.kinds(), vec![Substate::BUTTONS, Substate::POV_HATS]);

    assert_eq!(svc.poll(t0).unwrap(), Substate::NONE);

    r.vi.set_axis(&r.a, 1, 750);
    r.vi.press_button(&r.a, 0);
    let t1 = t0 + Duration::from_millis(50);
    assert_eq!(svc.poll(t1).unwrap(), Substate::AXES | Substate::BUTTONS);

    let events = rec.0.borrow();
    assert_eq!(events.len(), 4);
    match &events[2].kind {
        EventKind::AxesChanged(axes) => {
            assert_eq!(axes.y, 750);
            assert_eq!(axes.at, t1);
        }
        other => panic!("expected axes first, got {other:?}"),
    }
    match &events[3].kind {
        EventKind::ButtonsChanged(b) => assert!(b.pressed[0]),
        other => panic!("expected buttons, got {other:?}"),
    }
    assert!(events.iter().all(|e| e.instance == r.a));
    assert_eq!(svc.state().at, t1);
}

#[test]
fn filtered_listeners_see_their_groups_only() {
    let r = rig();
    let mut svc = ControllerService::new(DirectInput::with_api(r.vi.clone()), Config::default()).unwrap();
    let pov = Recorder::default();
    svc.bus_mut()
        .add_listener(pov.clone(), EventFilter::Only(Substate::POV_HATS), None);

    svc.poll(SystemTime::now()).unwrap();
    r.vi.set_pov(&r.a, 0, 18_000);
    svc.poll(SystemTime::now()).unwrap();

    assert_eq!(pov.kinds(), vec![Substate::POV_HATS, Substate::POV_HATS]);
}

#[test]
fn idle_service_polls_nothing() {
    let vi = VirtualInput::new();
    let mut svc = ControllerService::new(DirectInput::with_api(vi.clone()), Config::default()).unwrap();
    assert!(svc.identity().is_none());
    assert_eq!(svc.poll(SystemTime::now()).unwrap(), Substate::NONE);
    assert!(svc.controllers().unwrap().is_empty());
}

#[test]
fn change_controller_switches_and_notifies() {
    let r = rig();
    let mut svc = ControllerService::new(DirectInput::with_api(r.vi.clone()), Config::default()).unwrap();
    assert_eq!(svc.identity().unwrap().instance, r.a);
    let rec = Recorder::default();
    svc.bus_mut().add_listener(rec.clone(), EventFilter::All, None);

    svc.change_controller(&wanted(r.b, Guid::NIL, "", "")).unwrap();
    assert_eq!(svc.identity().unwrap().instance, r.b);
    assert_eq!(svc.config().controller.as_ref().unwrap().instance, r.b);
    assert_eq!(rec.kinds(), vec![Substate::CONTROLLER]);
    // Previous handle released.
    assert_eq!(r.vi.probe(&r.a).unwrap().refs, 0);

    let list = svc.controllers().unwrap();
    let current: Vec<Guid> = list
        .iter()
        .filter(|c| c.current)
        .map(|c| c.identity.instance)
        .collect();
    assert_eq!(list.len(), 2);
    assert_eq!(current, vec![r.b]);
}

#[test]
fn change_controller_not_found_keeps_previous() {
    let r = rig();
    let mut svc = ControllerService::new(DirectInput::with_api(r.vi.clone()), Config::default()).unwrap();
    r.vi.detach(&r.a);
    r.vi.detach(&r.b);

    let err = svc
        .change_controller(&wanted(r.b, Guid::NIL, "Stick B", ""))
        .unwrap_err();
    assert!(matches!(err, Error::ControllerNotFound(_)));
    assert_eq!(svc.identity().unwrap().instance, r.a);
}

#[test]
fn read_failure_is_surfaced_by_poll() {
    let r = rig();
    let mut svc = ControllerService::new(DirectInput::with_api(r.vi.clone()), Config::default()).unwrap();
    r.vi.detach(&r.a);
    assert!(svc.poll(SystemTime::now()).is_err());
}

#[test]
fn run_stops_when_asked() {
    let r = rig();
    let mut config = Config::default();
    config.poll_interval_ms = 1;
    let mut svc = ControllerService::new(DirectInput::with_api(r.vi.clone()), config).unwrap();

    let mut polls = 0;
    svc.run(|_| {
        polls += 1;
        polls < 3
    });
    assert_eq!(polls, 3);
}

#[test]
fn run_keeps_polling_after_a_failed_read() {
    let r = rig();
    let mut config = Config::default();
    config.poll_interval_ms = 1;
    let mut svc = ControllerService::new(DirectInput::with_api(r.vi.clone()), config).unwrap();

    // Poll and the re-acquired retry both fail on the second cycle.
    let mut outcomes = Vec::new();
    svc.run(|polled| {
        outcomes.push(polled.map_err(|e| e.code()));
        if outcomes.len() == 1 {
            r.vi.fail_polls(&r.a, 2);
        }
        outcomes.len() < 4
    });

    assert_eq!(outcomes.len(), 4);
    assert!(outcomes[0].is_ok());
    assert_eq!(outcomes[1], Err(Some(HResult::DIERR_INPUTLOST)));
    assert!(outcomes[2].is_ok());
    assert!(outcomes[3].is_ok());
}

#[test]
fn invalid_config_is_rejected() {
    let mut config = Config::default();
    config.axis.deadzone = 10_001;
    let res = ControllerService::new(DirectInput::with_api(VirtualInput::new()), config);
    assert!(matches!(res, Err(Error::InvalidConfig(_))));
}

//! End-to-end sessions against the reference backends, built from TOML.

use glam::{Vec2, Vec3};
use pinata_core::{
    AudioCue, Camera, HapticCategory, InputDevice, LayerMask, Outcome, PinataConfig,
    PlacementOutcome, PlacementPath, Session,
};
use pinata_sim::{Impulse, SceneFile, SimWorld, parse_config};

const CEILING_ROOM: &str = r#"
    [camera]
    position = [0.0, 1.5, 2.0]
    look_at = [0.0, 2.5, 0.0]

    [[planes]]
    classification = "floor"
    position = [0.0, 0.0, 0.0]
    size = [8.0, 8.0]

    [[planes]]
    classification = "ceiling"
    position = [0.0, 2.5, 0.0]
    size = [8.0, 8.0]
"#;

const LOFT: &str = r#"
    [camera]
    position = [0.0, 1.5, 2.0]
    look_at = [0.0, 0.0, 0.0]

    [[planes]]
    classification = "floor"
    position = [0.0, 0.0, 0.0]
    size = [8.0, 8.0]

    [[colliders]]
    shape = { kind = "box", half_extents = [2.0, 0.05, 2.0] }
    center = [0.0, 2.4, 0.0]
    layer = 2
"#;

fn build_world(text: &str) -> SimWorld {
    SceneFile::parse(text).unwrap().build().unwrap()
}

fn new_session(config: PinataConfig, world: &SimWorld) -> Session {
    let mut session = Session::new(config).unwrap();
    session.set_tactile_output(Some(Box::new(world.tactile.clone())));
    session
}

fn place(session: &mut Session, world: &mut SimWorld) -> PlacementOutcome {
    let tap = world.camera.screen_center();
    session
        .place(
            tap,
            &world.camera,
            &world.planes,
            world.scene.as_ref(),
            &mut world.spawner,
        )
        .unwrap()
}

/// Camera level with the target body, looking straight at it.
fn facing_target(world: &SimWorld) -> Camera {
    let y = world.body().unwrap().borrow().frame().position().y;
    Camera::looking_at(
        Vec3::new(0.0, y, 2.0),
        Vec3::new(0.0, y, 0.0),
        60.0,
        world.camera.viewport,
    )
}

#[test]
fn ceiling_tap_end_to_end() {
    let config = parse_config("[placement]\nanchor_offset = 0.2\n").unwrap();
    let mut world = build_world(CEILING_ROOM);
    let mut session = new_session(config, &world);

    let PlacementOutcome::Placed { placement, correction } = place(&mut session, &mut world)
    else {
        panic!("expected a placement");
    };
    assert_eq!(placement.path, PlacementPath::ArCeiling);
    assert!((placement.pose.position.y - 2.3).abs() < 1e-4);
    assert!(!correction.unwrap().was_elevated);

    let object = session.object().unwrap().clone();
    assert!((object.anchor().position().y - 2.3).abs() < 1e-4);

    let viewer = facing_target(&world);
    assert!(session.tick(0.2, &viewer).is_empty());
    assert_eq!(session.tether().borrow().points().len(), 15);

    let start = viewer.screen_center();
    session.press(InputDevice::Touch, start);
    session.tick(0.1, &viewer);
    let mut audio = world.audio.clone();
    let outcome = session
        .release(
            InputDevice::Touch,
            start + Vec2::new(10.0, 0.0),
            &viewer,
            world.scene.as_ref(),
            Some(&mut audio),
        )
        .unwrap();

    let Outcome::Tap(strike) = outcome else {
        panic!("expected a tap, got {outcome:?}");
    };
    assert!((strike.impulse.length() - 7.0).abs() < 1e-4);
    assert_eq!(world.tactile.played(), vec![HapticCategory::LightImpact.index()]);
    assert_eq!(world.audio.cues(), vec![AudioCue::Tap]);

    let body = world.body().unwrap().clone();
    assert!(matches!(
        body.borrow().impulses(),
        [Impulse::Linear { .. }]
    ));
    let before = body.borrow().frame().position();
    world.step(0.05);
    let after = body.borrow().frame().position();
    assert!(after.z < before.z, "struck away from the viewer");

    // The tether follows the moved hook on the next frame
    session.tick(1.0 / 60.0, &viewer);
    let hook_end = *session.tether().borrow().points().last().unwrap();
    assert!((hook_end - after).length() < 1e-5);
}

#[test]
fn loft_probe_respects_layers() {
    let mut config = PinataConfig::default();
    config.placement.virtual_ceiling_layers = LayerMask::layer(2);
    let mut world = build_world(LOFT);
    let mut session = new_session(config, &world);
    let PlacementOutcome::Placed { placement, .. } = place(&mut session, &mut world) else {
        panic!("expected a placement");
    };
    assert_eq!(placement.path, PlacementPath::VirtualCeiling);
    assert!((placement.pose.position.y - 2.35).abs() < 1e-4);

    let mut config = PinataConfig::default();
    config.placement.virtual_ceiling_layers = LayerMask::layer(5);
    let mut world = build_world(LOFT);
    let mut session = new_session(config, &world);
    let PlacementOutcome::Placed { placement, .. } = place(&mut session, &mut world) else {
        panic!("expected a placement");
    };
    assert_eq!(placement.path, PlacementPath::FloorDefault);
    assert!((placement.pose.position.y - 2.4).abs() < 1e-4);
}

#[test]
fn swipe_spins_and_notifications_throttle() {
    let mut world = build_world(CEILING_ROOM);
    let mut session = new_session(PinataConfig::default(), &world);
    place(&mut session, &mut world);
    let viewer = facing_target(&world);
    session.tick(0.5, &viewer);

    let start = viewer.screen_center();
    session.press(InputDevice::Mouse, start);
    session.tick(0.5, &viewer);
    let outcome = session
        .release(
            InputDevice::Mouse,
            start - Vec2::new(150.0, 0.0),
            &viewer,
            world.scene.as_ref(),
            None,
        )
        .unwrap();
    let Outcome::Swipe(strike) = outcome else {
        panic!("expected a swipe, got {outcome:?}");
    };
    assert!(strike.impulse.x < 0.0);
    assert!((strike.impulse.length() - 60.0).abs() < 1e-2);
    assert!(world.body().unwrap().borrow().angular_velocity().length() > 0.0);

    assert!(session.request_haptic(HapticCategory::Success));
    assert!(!session.request_haptic(HapticCategory::Warning));
    session.tick(0.7, &viewer);
    assert!(session.request_haptic(HapticCategory::Error));
    assert_eq!(world.tactile.count(HapticCategory::Success), 1);
    assert_eq!(world.tactile.count(HapticCategory::Warning), 0);
}

#[test]
fn anchor_holds_while_target_swings() {
    let mut world = build_world(CEILING_ROOM);
    let mut session = new_session(PinataConfig::default(), &world);
    place(&mut session, &mut world);
    let object = session.object().unwrap().clone();
    let viewer = facing_target(&world);
    for _ in 0..120 {
        if object.state().released {
            break;
        }
        session.tick(1.0 / 60.0, &viewer);
    }
    assert!(object.state().released);
    let anchor = object.anchor().position();
    assert!((anchor.y - 2.5).abs() < 1e-4);

    let start = viewer.screen_center();
    session.press(InputDevice::Touch, start);
    session.tick(0.2, &viewer);
    let outcome = session
        .release(
            InputDevice::Touch,
            start + Vec2::new(200.0, 0.0),
            &viewer,
            world.scene.as_ref(),
            None,
        )
        .unwrap();
    assert!(matches!(outcome, Outcome::Swipe(_)), "got {outcome:?}");

    let body = world.body().unwrap().clone();
    for _ in 0..90 {
        world.step(1.0 / 60.0);
        session.tick(1.0 / 60.0, &viewer);
        assert!((object.anchor().position() - anchor).length() < 1e-4);
        let reach = body.borrow().frame().position().distance(anchor);
        assert!(reach <= 0.8 + 1e-3, "body at {reach} m from anchor");
    }
    assert!(body.borrow().frame().position().x > 0.0, "swung toward the swipe");

    let tether = session.tether();
    let points = tether.borrow().points().to_vec();
    assert!((points[0] - anchor).length() < 1e-5);
    let hook = body.borrow().frame().position();
    assert!((*points.last().unwrap() - hook).length() < 1e-5);
}

use super::*;
use crate::desktop::{InputEvent, Key, ScreenshotDesktop};
use crate::error::ErrorKind;
use crate::region::Context;
use crate::testing::{ScriptedMatcher, cand, context};
use std::time::Duration;

fn remote_screen(matcher: ScriptedMatcher) -> (Remote<Region>, Arc<LocalTransport>, Arc<ScreenshotDesktop>) {
    let desktop = Arc::new(ScreenshotDesktop::blank(200, 100));
    let ctx: Context = context(&desktop, &Arc::new(matcher));
    let (registry, transport) = ProxyRegistry::local();
    let remote = Remote::new(Arc::new(Region::full_screen(&ctx)), Arc::new(registry));
    (remote, transport, desktop)
}

#[test]
fn test_handle_display() {
    assert_eq!(Handle(255).to_string(), "obj_ff");
}

#[test]
fn test_primitives_pass_through() {
    let (registry, transport) = ProxyRegistry::local();

    assert_eq!(registry.proxify(true).unwrap(), RemoteValue::Bool(true));
    assert_eq!(registry.proxify(0.75).unwrap(), RemoteValue::Float(0.75));
    assert_eq!(registry.proxify(42u32).unwrap(), RemoteValue::Int(42));
    assert_eq!(
        registry.proxify("qt4gui_button").unwrap(),
        RemoteValue::Text("qt4gui_button".to_string())
    );
    assert_eq!(registry.proxify(None::<bool>).unwrap(), RemoteValue::Null);
    assert!(registry.is_empty());
    assert!(transport.is_empty());
}

#[test]
fn test_same_object_same_handle() {
    let (registry, transport) = ProxyRegistry::local();
    let location = Arc::new(Location::new(3, 4));

    let first = registry.proxify(location.clone()).unwrap();
    let second = registry.proxify(location.clone()).unwrap();
    let other = registry.proxify(Arc::new(Location::new(3, 4))).unwrap();

    assert_eq!(first, second);
    // Equal value, different object
    assert_ne!(first, other);
    assert_eq!(registry.len(), 2);
    assert_eq!(transport.len(), 2);
}

#[test]
fn test_last_match_twice_is_one_handle() {
    let (remote, transport, _) = remote_screen(ScriptedMatcher::always(vec![cand(10, 10, 20, 20, 0.9)]));

    let found = remote.find("shape_blue_circle", None).unwrap();
    let size = remote.registry().len();

    let first = remote.last_match().unwrap();
    let second = remote.last_match().unwrap();

    assert_eq!(first, found);
    assert_eq!(second, found);
    assert_eq!(remote.registry().len(), size);

    match transport.lookup(found.as_handle().unwrap()) {
        Some(RemoteObject::Match(m)) => {
            assert!(Arc::ptr_eq(&m, &remote.inner().last_match().unwrap()));
        }
        other => panic!("unexpected export {other:?}"),
    }
}

#[test]
fn test_mutation_visible_through_handle() {
    let (remote, transport, _) = remote_screen(
        ScriptedMatcher::always(vec![cand(5, 5, 4, 4, 0.95)])
            .then(vec![vec![cand(40, 20, 30, 30, 0.9)]]),
    );

    let dialog = remote.find("dialog", None).unwrap();
    let Some(RemoteObject::Match(dialog_match)) = transport.lookup(dialog.as_handle().unwrap())
    else {
        panic!("dialog not exported as a match");
    };

    // Search inside the exported match, not a copy of it
    let inner = Remote::new(dialog_match.clone(), remote.registry().clone());
    assert_eq!(inner.handle().unwrap(), dialog.as_handle().unwrap());
    inner.find("ok_button", None).unwrap();

    let Some(RemoteObject::Match(seen)) = transport.lookup(dialog.as_handle().unwrap()) else {
        panic!("dialog handle lost");
    };
    let button = seen.last_match().unwrap();
    assert_eq!(button.bbox().x, 45);
}

#[test]
fn test_find_all_returns_handle_list() {
    let (remote, _, _) = remote_screen(ScriptedMatcher::always(vec![
        cand(10, 10, 10, 10, 0.9),
        cand(50, 10, 10, 10, 0.95),
    ]));

    let found = remote.find_all("shape_red_box", None, false).unwrap();
    let items = found.as_list().unwrap();

    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|v| v.as_handle().is_some()));
    assert_ne!(items[0], items[1]);
    // The first match is also the last match
    assert_eq!(remote.last_match().unwrap(), items[0]);
}

#[test]
fn test_exists_absent_is_null() {
    let (remote, _, _) = remote_screen(ScriptedMatcher::nothing());

    assert_eq!(remote.exists("missing", None).unwrap(), RemoteValue::Null);
    assert_eq!(remote.last_match().unwrap(), RemoteValue::Null);
    assert_eq!(
        remote.wait_vanish("missing", None).unwrap(),
        RemoteValue::Bool(true)
    );
    assert_eq!(remote.sample("missing").unwrap(), RemoteValue::Float(0.0));
}

#[test]
fn test_actions_return_own_handle() {
    let (remote, _, desktop) = remote_screen(ScriptedMatcher::nothing());

    let clicked = remote.click(Location::new(7, 8), &[Key::Ctrl]).unwrap();
    let typed = remote.type_text("hello", &[]).unwrap();

    assert_eq!(clicked, RemoteValue::Object(remote.handle().unwrap()));
    assert_eq!(clicked, typed);
    assert_eq!(desktop.events().len(), 2);
    assert!(matches!(desktop.events()[1], InputEvent::Type { .. }));
}

#[test]
fn test_errors_become_faults() {
    let (remote, _, desktop) = remote_screen(ScriptedMatcher::nothing());

    let fault = remote.click("qt4gui_contextmenu_quit", &[]).unwrap_err();
    assert_eq!(fault.kind, ErrorKind::Find);
    assert!(fault.message.contains("qt4gui_contextmenu_quit"));
    assert!(desktop.events().is_empty());

    let fault = remote.find("missing", Duration::ZERO).unwrap_err();
    assert_eq!(fault.kind, ErrorKind::Find);

    let json = serde_json::to_string(&fault).unwrap();
    assert!(json.contains("\"kind\":\"find\""));
}

#[test]
fn test_not_find_fault_kind() {
    let (remote, _, _) = remote_screen(ScriptedMatcher::always(vec![cand(0, 0, 10, 10, 0.9)]));
    let fault = remote.wait_vanish("still_here", Duration::ZERO).unwrap_err();
    assert_eq!(fault.kind, ErrorKind::NotFind);
}

#[test]
fn test_nearby_and_mouse_location_are_fresh_objects() {
    let (remote, _, _) = remote_screen(ScriptedMatcher::nothing());

    let a = remote.nearby(10).unwrap();
    let b = remote.nearby(10).unwrap();
    assert_ne!(a, b);

    let here = remote.mouse_location().unwrap();
    assert!(here.as_handle().is_some());
}

#[test]
fn test_registered_behind_registry_back() {
    let transport = Arc::new(LocalTransport::new());
    let registry = ProxyRegistry::new(transport.clone());
    let object = RemoteObject::Location(Arc::new(Location::new(1, 1)));

    transport.register(object.clone()).unwrap();
    let err = registry.register(object).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[test]
fn test_concurrent_registration_is_idempotent() {
    let (registry, transport) = ProxyRegistry::local();
    let registry = Arc::new(registry);
    let location = Arc::new(Location::new(9, 9));

    let handles: Vec<Handle> = std::thread::scope(|s| {
        let workers: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                let location = location.clone();
                s.spawn(move || {
                    registry
                        .register(RemoteObject::Location(location))
                        .unwrap()
                })
            })
            .collect();
        workers.into_iter().map(|w| w.join().unwrap()).collect()
    });

    assert!(handles.iter().all(|h| *h == handles[0]));
    assert_eq!(transport.len(), 1);
}

#[test]
fn test_remote_value_json_shape() {
    let value = RemoteValue::List(vec![RemoteValue::Object(Handle(1)), RemoteValue::Null]);
    let json = serde_json::to_string(&value).unwrap();
    assert_eq!(
        json,
        r#"{"type":"list","value":[{"type":"object","value":1},{"type":"null"}]}"#
    );
}

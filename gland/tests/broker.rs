use gland::{Broker, Collected, Emitted, ListenFlags, Params, RouterError, Strategy, listener};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

mod common;
use common::{Hits, Journal, UserEvent};

#[test]
fn test_emit_reaches_listeners_in_registration_order() {
    let broker = Broker::new();
    let journal = Journal::<UserEvent>::new();
    broker
        .on_with("user:created", journal.listener("first"), ListenFlags::empty())
        .unwrap();
    broker
        .on_with("user:created", journal.listener("second"), ListenFlags::empty())
        .unwrap();

    let event = UserEvent::new(1, "ada");
    assert_eq!(
        broker.emit("user:created", event.clone()),
        Ok(Emitted::Delivered(2))
    );
    assert_eq!(
        journal.entries(),
        vec![("first", event.clone()), ("second", event)]
    );
}

#[test]
fn test_emit_without_listener_is_an_error() {
    let broker: Broker<UserEvent> = Broker::new();
    let err = broker.emit("y", UserEvent::new(1, "x")).unwrap_err();
    assert_eq!(err, RouterError::NoListeners("y".into()));
    assert_eq!(err.to_string(), "no listeners for event: y");
}

#[test]
fn test_once_fires_exactly_once() {
    let broker = Broker::new();
    let hits = Hits::default();
    let h = hits.clone();
    broker
        .once("boot", move |_: &u8, _| {
            h.0.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

    assert_eq!(broker.emit("boot", 0), Ok(Emitted::Delivered(1)));
    assert!(broker.emit("boot", 0).is_err());
    assert_eq!(hits.get(), 1);
}

#[test]
fn test_once_alongside_persistent_listener() {
    let broker = Broker::new();
    let once = Hits::default();
    let always = Hits::default();
    broker
        .on_with("tick", once.listener(), ListenFlags::ONCE)
        .unwrap();
    broker
        .on_with("tick", always.listener(), ListenFlags::empty())
        .unwrap();

    broker.emit("tick", 0u8).unwrap();
    broker.emit("tick", 0u8).unwrap();
    assert_eq!(once.get(), 1);
    assert_eq!(always.get(), 2);
}

#[test]
fn test_off_removes_only_the_given_listener() {
    let broker = Broker::new();
    let a = Hits::default();
    let b = Hits::default();
    let la = a.listener::<u8>();
    broker.on_with("x", la.clone(), ListenFlags::empty()).unwrap();
    broker.on_with("x", b.listener(), ListenFlags::empty()).unwrap();

    assert_eq!(broker.off("x", &la), 1);
    broker.emit("x", 0).unwrap();
    assert_eq!((a.get(), b.get()), (0, 1));
    assert_eq!(broker.off_all("x"), 1);
    assert!(!broker.has_listeners("x"));
}

#[test]
fn test_subscription_unsubscribes() {
    let broker = Broker::new();
    let hits = Hits::default();
    let sub = broker.on_with("x", hits.listener::<u8>(), ListenFlags::empty()).unwrap();
    assert!(sub.unsubscribe());
    assert!(broker.emit("x", 0).is_err());
}

#[test]
fn test_presence_tracks_listener_count() {
    let broker = Broker::new();
    let handles: Vec<_> = (0..3).map(|_| Hits::default().listener::<u8>()).collect();
    let check = |b: &Broker<u8>| {
        assert_eq!(b.has_listeners("p:q"), !b.listeners("p:q").is_empty());
    };

    check(&broker);
    for h in &handles {
        broker.on_with("p:q", h.clone(), ListenFlags::empty()).unwrap();
        check(&broker);
    }
    for h in &handles {
        broker.off("p:q", h);
        check(&broker);
    }
    assert!(broker.router().is_idle());
}

#[test]
fn test_wildcard_params_are_passed() {
    let broker: Broker<u32> = Broker::new();
    let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let s = seen.clone();
    broker
        .on("room:*room:user:*user", move |_, params: &Params| {
            s.lock().push((
                params.get("room").unwrap_or_default().to_string(),
                params.get("user").unwrap_or_default().to_string(),
            ));
        })
        .unwrap();

    broker.emit("room:lobby:user:ada", 0).unwrap();
    assert!(broker.emit("room:lobby:user", 0).is_err());
    assert_eq!(
        *seen.lock(),
        vec![("lobby".to_string(), "ada".to_string())]
    );
}

#[test]
fn test_request_strategies() {
    let broker: Broker<String> = Broker::new();
    broker.respond("calc", |_, _| Some("R1".to_string())).unwrap();
    broker.respond("calc", |_, _| Some("R2".to_string())).unwrap();

    let ask = |strategy| broker.request("calc", String::new(), strategy);
    assert_eq!(ask(Strategy::First), Collected::One(Some("R1".into())));
    assert_eq!(ask(Strategy::Last), Collected::One(Some("R2".into())));
    assert_eq!(
        ask(Strategy::All),
        Collected::All(vec!["R1".to_string(), "R2".to_string()])
    );
}

#[test]
fn test_request_without_responders_is_soft() {
    let broker: Broker<String> = Broker::new();
    assert_eq!(
        broker.request("nobody", String::new(), Strategy::First),
        Collected::One(None)
    );
    assert_eq!(
        broker.request("nobody", String::new(), Strategy::Last),
        Collected::One(None)
    );
    assert_eq!(
        broker.request("nobody", String::new(), Strategy::All),
        Collected::All(vec![])
    );
}

#[test]
fn test_request_ignores_plain_listeners() {
    let broker: Broker<u32> = Broker::new();
    let hits = Hits::default();
    broker.on_with("sum", hits.listener(), ListenFlags::empty()).unwrap();
    broker.respond("sum", |n, _| Some(n + 1)).unwrap();

    assert_eq!(broker.request("sum", 1, Strategy::All).into_all(), vec![2]);
    assert_eq!(hits.get(), 1);
}

#[test]
fn test_broadcast_fans_out_by_topic() {
    let broker = Broker::new();
    let journal = Journal::<UserEvent>::new();
    broker
        .on_with("user:created", journal.listener("created"), ListenFlags::empty())
        .unwrap();
    broker
        .on_with("user:updated", journal.listener("updated"), ListenFlags::empty())
        .unwrap();
    broker
        .on_with("order:placed", journal.listener("order"), ListenFlags::empty())
        .unwrap();

    let event = UserEvent::new(7, "grace");
    assert_eq!(broker.broadcast("user", event.clone()), 2);

    let mut tags: Vec<_> = journal
        .entries()
        .into_iter()
        .map(|(t, e)| {
            assert_eq!(e, event);
            t
        })
        .collect();
    tags.sort();
    assert_eq!(tags, vec!["created", "updated"]);
}

#[test]
fn test_reentrant_emit_from_listener() {
    let broker: Broker<u32> = Broker::new();
    let total = Arc::new(AtomicUsize::new(0));
    let t = total.clone();
    broker
        .on("leaf", move |n, _| {
            t.fetch_add(*n as usize, Ordering::SeqCst);
        })
        .unwrap();
    let inner = broker.clone();
    broker
        .on_with(
            "root",
            listener(move |n: &u32, _| {
                inner.emit("leaf", n * 10).unwrap();
            }),
            ListenFlags::empty(),
        )
        .unwrap();

    broker.emit("root", 4).unwrap();
    assert_eq!(total.load(Ordering::SeqCst), 40);
}

//! Random keyboard and server interleavings through the Runtime.
//!
//! The simulation driver checks the standard invariants on every render, so
//! a violation surfaces as a step error.

use murmur_app::{App, KeyInput, Runtime};
use murmur_client::ClientEvent;
use murmur_harness::{InvariantRegistry, SimDriver, SimEnv, run_until_idle};
use proptest::prelude::*;
use serde_json::json;

#[derive(Debug, Clone)]
enum Op {
    Key(KeyInput),
    Roster(Vec<&'static str>),
    Typing(Vec<&'static str>),
    Message(Option<&'static str>),
    Private(&'static str),
    Lost,
    Restored,
}

const NAMES: [&str; 4] = ["alice", "bob", "carol", "dave"];

fn key_strategy() -> impl Strategy<Value = KeyInput> {
    prop_oneof![
        6 => prop::sample::select(vec!['a', 'b', ' ', '/', 'j']).prop_map(KeyInput::Char),
        2 => Just(KeyInput::Tab),
        2 => Just(KeyInput::Enter),
        2 => Just(KeyInput::Backspace),
        1 => Just(KeyInput::Up),
        1 => Just(KeyInput::Down),
        1 => Just(KeyInput::Left),
    ]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let names = prop::sample::subsequence(NAMES.to_vec(), 0..=NAMES.len());
    prop_oneof![
        10 => key_strategy().prop_map(Op::Key),
        2 => names.clone().prop_map(Op::Roster),
        1 => names.prop_map(Op::Typing),
        2 => prop::option::of(prop::sample::select(vec!["global", "a", "b"]))
            .prop_map(Op::Message),
        1 => prop::sample::select(NAMES.to_vec()).prop_map(Op::Private),
        1 => Just(Op::Lost),
        1 => Just(Op::Restored),
    ]
}

fn user_id(name: &str) -> usize {
    NAMES.iter().position(|n| *n == name).unwrap_or_default() + 1
}

fn apply(driver: &SimDriver, op: Op) {
    match op {
        Op::Key(key) => driver.press(key),
        Op::Roster(names) => {
            let users: Vec<_> =
                names.iter().map(|n| json!({"id": user_id(n), "username": n})).collect();
            driver.inject_server_event("user_list", json!(users));
        },
        Op::Typing(names) => driver.inject_server_event("typing_users", json!(names)),
        Op::Message(room) => driver.inject_server_event(
            "receive_message",
            json!({"sender": "bob", "message": "m", "room": room}),
        ),
        Op::Private(from) => driver.inject_server_event(
            "private_message",
            json!({"sender": from, "senderId": user_id(from), "message": "p"}),
        ),
        Op::Lost => {
            driver.inject_client_event(ClientEvent::Disconnected { reason: "lost".into() });
        },
        Op::Restored => driver.inject_client_event(ClientEvent::Connected),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn view_invariants_hold(ops in prop::collection::vec(op_strategy(), 1..80)) {
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        rt.block_on(async {
            let driver = SimDriver::new().with_invariants(InvariantRegistry::standard());
            let app = App::with_username("alice");
            let mut runtime = Runtime::new(driver.clone(), SimEnv::new(), app);

            driver.press(KeyInput::Enter);
            run_until_idle(&mut runtime).await.unwrap();

            for op in ops {
                apply(&driver, op);
                if run_until_idle(&mut runtime).await.unwrap() {
                    break;
                }
            }
        });
    }

    #[test]
    fn nothing_is_sent_while_disconnected(keys in prop::collection::vec(key_strategy(), 1..40)) {
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        rt.block_on(async {
            let driver = SimDriver::new();
            let app = App::with_username("alice");
            let mut runtime = Runtime::new(driver.clone(), SimEnv::new(), app);

            driver.press(KeyInput::Enter);
            run_until_idle(&mut runtime).await.unwrap();
            driver.inject_client_event(ClientEvent::Disconnected { reason: "lost".into() });
            run_until_idle(&mut runtime).await.unwrap();
            driver.take_sent();

            for key in keys {
                driver.press(key);
            }
            run_until_idle(&mut runtime).await.unwrap();

            let names = driver.sent_event_names();
            assert!(names.is_empty(), "sent while disconnected: {names:?}");
        });
    }
}

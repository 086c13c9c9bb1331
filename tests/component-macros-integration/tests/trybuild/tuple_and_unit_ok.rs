use wiring_abstractions::{Inject, Injectable, Value};

#[derive(Default, Injectable)]
struct Marker;

#[derive(Default, Injectable)]
struct Pair(Inject<Marker>, #[inject("env[PAIR_NAME]")] Value<String>);

fn main() {
    assert!(Marker::type_descriptor().fields().is_empty());

    let fields = Pair::type_descriptor().fields();
    assert_eq!(fields[0].name, "0");
    assert_eq!(fields[1].name, "1");
    assert_eq!(fields[1].annotation, Some("env[PAIR_NAME]"));
}

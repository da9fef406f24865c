//! Property-based tests for section separator stripping.

mod common;
use common::TestEnv;

use core_config::{GlobalOptions, SeparatorPair, Slot};
use core_render::options::layered_options;
use core_render::{
    Callbacks, ComponentInstance, ComponentOptions, DrawContext, TextSegment, draw_section,
};
use proptest::prelude::*;

fn component(no: u64, slot: Slot, text: &str, transitional: Option<[&str; 2]>) -> ComponentInstance {
    let global = GlobalOptions {
        component_separators: SeparatorPair::new("|", "/"),
        ..GlobalOptions::default()
    };
    let mut spec = toml::Table::new();
    if let Some(pair) = transitional {
        spec.insert("separator".into(), toml::Value::try_from(pair).unwrap());
    }
    let tree = layered_options(&global, &toml::Table::new(), &spec);
    let options = ComponentOptions::resolve(tree, slot, no, &Callbacks::new()).unwrap();
    ComponentInstance::new("text", no, options, None, Box::new(TextSegment::new(text)))
}

fn slot_strategy() -> impl Strategy<Value = Slot> {
    prop::sample::select(Slot::ALL.to_vec())
}

proptest! {
    // Plain separators: non-empty texts joined by the side separator, nothing trailing.
    #[test]
    fn joins_non_empty_without_trailing_separator(
        texts in prop::collection::vec("[a-z]{0,3}", 0..6),
        slot in slot_strategy(),
    ) {
        let env = TestEnv::default();
        let ctx = DrawContext { env: &env, focused: true, pass: 1 };
        let mut components: Vec<_> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| component(i as u64 + 1, slot, t, None))
            .collect();
        let out = draw_section(&mut components, slot, "", &SeparatorPair::default(), &ctx);

        let sep = if slot.is_left() { "|" } else { "/" };
        let expected = texts
            .iter()
            .filter(|t| !t.is_empty())
            .map(|t| format!(" {t} "))
            .collect::<Vec<_>>()
            .join(sep);
        prop_assert_eq!(&out.text, &expected);
        prop_assert!(!out.text.ends_with(sep));
        prop_assert!(out.errors.is_empty());
    }

    // A second draw within the same pass changes nothing.
    #[test]
    fn same_pass_is_stable(texts in prop::collection::vec("[a-z]{0,3}", 1..5)) {
        let env = TestEnv::default();
        let ctx = DrawContext { env: &env, focused: true, pass: 7 };
        let mut components: Vec<_> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| component(i as u64 + 1, Slot::C, t, None))
            .collect();
        let first = draw_section(&mut components, Slot::C, "%#C#", &SeparatorPair::default(), &ctx);
        let second = draw_section(&mut components, Slot::C, "%#C#", &SeparatorPair::default(), &ctx);
        prop_assert_eq!(first.text, second.text);
    }

    // A transitional separator on either side never follows a plain separator.
    #[test]
    fn transitional_separator_claims_boundary(
        parts in prop::collection::vec(("[a-z]{0,2}", 0..3u8), 1..6),
    ) {
        let env = TestEnv::default();
        let ctx = DrawContext { env: &env, focused: true, pass: 1 };
        let mut components: Vec<_> = parts
            .iter()
            .enumerate()
            .map(|(i, (t, side))| {
                let transitional = match *side {
                    1 => Some(["(", ""]),
                    2 => Some(["", ")"]),
                    _ => None,
                };
                component(i as u64 + 1, Slot::B, t, transitional)
            })
            .collect();
        let out = draw_section(&mut components, Slot::B, "", &SeparatorPair::default(), &ctx);
        prop_assert!(!out.text.contains("|%s{"), "{}", out.text);
        prop_assert!(!out.text.ends_with('|'));

        let shown: Vec<_> = components.iter().filter(|c| !c.status().is_empty()).collect();
        for pair in shown.windows(2) {
            if pair[1].strip_previous_separator() {
                prop_assert!(!pair[0].status().ends_with('|'), "{}", out.text);
            }
        }
    }
}

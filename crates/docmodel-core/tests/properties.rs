use docmodel_core::{Change, ChangeLog, Model, ModelOptions};
use docmodel_path::{format_steps, parse_path, Step};
use docmodel_schema::SchemaRegistry;
use proptest::prelude::*;
use serde_json::json;

fn key_step() -> impl Strategy<Value = Step> {
    "[a-z_$][a-zA-Z0-9_$]{0,8}".prop_map(Step::Key)
}

fn any_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        key_step(),
        // computed keys: anything without brackets survives quoting
        "[a-zA-Z0-9_$ .]{1,8}".prop_map(Step::Key),
        (0i64..64).prop_map(Step::Index),
    ]
}

proptest! {
    #[test]
    fn format_then_parse_roundtrips(
        first in key_step(),
        rest in proptest::collection::vec(any_step(), 0..5),
    ) {
        let mut steps = vec![first];
        steps.extend(rest);
        let formatted = format_steps(&steps);
        let reparsed: Vec<Step> = parse_path(&formatted)
            .expect("formatted paths parse")
            .into_iter()
            .map(|p| p.step)
            .collect();
        prop_assert_eq!(reparsed, steps);
    }

    #[test]
    fn set_with_parents_then_get_roundtrips(
        first in key_step(),
        rest in proptest::collection::vec(
            prop_oneof![key_step(), (0i64..8).prop_map(Step::Index)],
            0..4,
        ),
        value in any::<i32>(),
    ) {
        let mut steps = vec![first];
        steps.extend(rest);
        let path = format_steps(&steps);
        let model = Model::new(json!({}), &SchemaRegistry::with_defaults(), ModelOptions::default())
            .expect("empty schema");
        model.set_with_parents(&path, json!(value)).expect("scaffolded write");
        prop_assert_eq!(model.get(&path).expect("readback"), Some(json!(value)));
    }

    #[test]
    fn changelog_ids_increase_without_gaps(
        paths in proptest::collection::vec("[a-z]{1,6}", 1..20),
        since in 0u64..25,
    ) {
        let mut log = ChangeLog::new();
        let mut last = 0;
        for path in &paths {
            let id = log.add(Change::single(path.clone(), json!(1), None));
            prop_assert_eq!(id, last + 1);
            last = id;
        }
        prop_assert_eq!(log.last_id(), paths.len() as u64);
        let expected = (paths.len() as u64).saturating_sub(since.max(1) - 1);
        prop_assert_eq!(log.since(since.max(1)).count() as u64, expected);
    }
}

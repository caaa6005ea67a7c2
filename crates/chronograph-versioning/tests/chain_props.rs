//! Property tests over random edit sequences on one node.

mod common;

use chronograph_common::types::{Value, Version};
use chronograph_engine::GraphAccess;
use chronograph_versioning::history;
use common::{read, versioned_db};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Edit {
    Set(i64),
    Remove,
    Touch,
}

fn edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        3 => any::<i64>().prop_map(Edit::Set),
        1 => Just(Edit::Remove),
        1 => Just(Edit::Touch),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn chain_resolves_every_version(initial in any::<i64>(), edits in prop::collection::vec(edit(), 1..12)) {
        let (db, versioning) = versioned_db();
        let session = db.session();

        let node = session
            .create_node_with_props(&[], [("value", Value::from(initial))])
            .unwrap();

        // expected[n - 1] is the value at version n.
        let mut expected = vec![Some(Value::from(initial))];
        let mut current = Some(Value::from(initial));
        for (i, edit) in edits.iter().enumerate() {
            match edit {
                Edit::Set(x) => {
                    session.set_node_property(node, "value", Value::from(*x)).unwrap();
                    current = Some(Value::from(*x));
                }
                Edit::Remove => {
                    session.remove_node_property(node, "value").unwrap();
                    current = None;
                }
                Edit::Touch => {
                    session.set_node_property(node, "touched", Value::from(i as i64)).unwrap();
                }
            }
            expected.push(current.clone());
        }

        let latest = versioning.latest_version(&session).unwrap();
        prop_assert_eq!(latest, Version::new(expected.len() as u64));

        for (n, value) in (1u64..).zip(&expected) {
            prop_assert_eq!(&read(&session, node, n, "value"), value);
        }

        let links = history::links(&session, node).unwrap();
        let ranges: Vec<_> = links.iter().map(|link| link.range.unwrap()).collect();

        // Head first, newest to oldest: open at the top, contiguous, ending at v1.
        prop_assert!(ranges[0].is_open());
        prop_assert_eq!(ranges[ranges.len() - 1].from(), Version::new(1));
        for pair in ranges.windows(2) {
            prop_assert!(pair[1].from() <= pair[1].to());
            prop_assert_eq!(pair[1].to().next(), pair[0].from());
        }

        // Exactly one link covers each version.
        for n in 1..=latest.as_u64() {
            let covering = links.iter().filter(|link| link.covers(Version::new(n))).count();
            prop_assert_eq!(covering, 1);
        }

        // No chain pointer leads back into the chain.
        let mut nodes: Vec<_> = links.iter().map(|link| link.node).collect();
        nodes.sort();
        nodes.dedup();
        prop_assert_eq!(nodes.len(), links.len());
        prop_assert!(session.contains_node(links[links.len() - 1].node));
    }
}

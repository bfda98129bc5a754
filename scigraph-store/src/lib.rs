//! The document store: schema-validated tree creation, materialization,
//! attribute replacement, cloning and link-graph introspection over a
//! pluggable one-object-atomic backend.

mod codec;
mod error;
mod id;
mod memstore;
mod ops;
mod resolver;
mod tracker;

pub use error::StoreError;
pub use id::{generate as generate_id, is_object_id};
pub use memstore::{DocumentStore, InMemoryStore};
pub use ops::clone::clone;
pub use ops::get::get;
pub use ops::graph::{make_link_digraph, safe_links, LinkGraph};
pub use ops::patch::patch;
pub use ops::post::post;
pub use resolver::{resolve_path_head, ResolvedPath, ResolvedPaths};
pub use tracker::ObjectTracker;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn beam_schema() -> serde_json::Value {
        serde_json::json!({
            "Beam": {
                "length": {"dtype": "f", "unit": "m", "shape": []},
                "height": {"dtype": "f", "unit": "m", "shape": []},
                "cs": {"dtype": "object", "shape": [], "link": "CrossSection"}
            },
            "CrossSection": {
                "area": {"dtype": "f", "unit": "m2", "shape": []}
            }
        })
    }

    /// Exercises the full arc (spec scenario S1-ish): post a beam with a
    /// nested cross-section, unit-convert on the way in, then get it back.
    #[test]
    fn post_then_get_round_trips_and_converts_units() {
        let store = InMemoryStore::new();
        store.schema_set("dms0", beam_schema(), false).unwrap();

        let data = serde_json::json!({
            "length": {"value": 2500, "unit": "mm"},
            "height": {"value": 20, "unit": "cm"},
            "cs": {"area": {"value": 100, "unit": "cm2"}}
        });
        let id = post(&store, "dms0", "Beam", data).unwrap();

        let got = get(&store, "dms0", "Beam", &id, None, -1, false, true, &HashSet::new()).unwrap();
        assert_eq!(got["length"]["value"], 2.5);
        assert_eq!(got["length"]["unit"], "m");
        assert_eq!(got["height"]["value"], 0.2);
        assert_eq!(got["_meta"]["id"], serde_json::Value::String(id));
    }

    /// Scenario S6: an integer-dtype schema rejects a fractional value.
    #[test]
    fn posting_a_float_into_an_int_dtype_fails() {
        let store = InMemoryStore::new();
        let schema = serde_json::json!({
            "Sample": { "count": {"dtype": "i", "shape": []} }
        });
        store.schema_set("dms0", schema, false).unwrap();
        let err = post(&store, "dms0", "Sample", serde_json::json!({"count": 2.5})).unwrap_err();
        assert!(matches!(err, StoreError::Quantity(_)));
    }

    #[test]
    fn shared_reference_comes_back_as_a_relative_path_when_tracking() {
        let store = InMemoryStore::new();
        let schema = serde_json::json!({
            "Root": {
                "a": {"dtype": "object", "shape": [], "link": "Leaf"},
                "b": {"dtype": "object", "shape": [], "link": "Leaf"}
            },
            "Leaf": { "name": {"dtype": "str", "shape": []} }
        });
        store.schema_set("dms0", schema, false).unwrap();

        let mut leaf = serde_json::Map::new();
        leaf.insert("name".to_string(), serde_json::json!("shared"));
        let leaf_id = store.insert_one("dms0", "Leaf", leaf).unwrap();

        let mut root_rec = serde_json::Map::new();
        root_rec.insert("a".to_string(), serde_json::Value::String(leaf_id.clone()));
        root_rec.insert("b".to_string(), serde_json::Value::String(leaf_id));
        let root_id = store.insert_one("dms0", "Root", root_rec).unwrap();

        let got = get(&store, "dms0", "Root", &root_id, None, -1, true, true, &HashSet::new()).unwrap();
        assert!(got["a"].is_object());
        assert_eq!(got["b"], serde_json::json!(".a"));
    }

    #[test]
    fn patch_replaces_an_attribute_in_place() {
        let store = InMemoryStore::new();
        store.schema_set("dms0", beam_schema(), false).unwrap();
        let id = post(
            &store,
            "dms0",
            "Beam",
            serde_json::json!({
                "length": {"value": 1.0, "unit": "m"},
                "height": {"value": 1.0, "unit": "m"},
                "cs": {"area": {"value": 0.01, "unit": "m2"}}
            }),
        )
        .unwrap();

        patch(&store, "dms0", "Beam", &id, "length", serde_json::json!({"value": 2.0, "unit": "m"})).unwrap();
        let got = get(&store, "dms0", "Beam", &id, Some("length"), -1, false, true, &HashSet::new()).unwrap();
        assert_eq!(got["value"], 2.0);
    }

    /// Scenario S3: at `max_level=0` the root's scalar attributes are
    /// still emitted, but a link attribute one level down is omitted
    /// entirely rather than descended into or replaced with `{}`.
    #[test]
    fn max_level_zero_keeps_scalars_but_omits_link_attributes() {
        let store = InMemoryStore::new();
        let schema = serde_json::json!({
            "BeamState": {
                "npointz": {"dtype": "i", "shape": []},
                "cs": {"dtype": "object", "shape": [], "link": "CrossSection"}
            },
            "CrossSection": {
                "area": {"dtype": "f", "unit": "m2", "shape": []}
            }
        });
        store.schema_set("dms0", schema, false).unwrap();

        let id = post(
            &store,
            "dms0",
            "BeamState",
            serde_json::json!({
                "npointz": 5,
                "cs": {"area": {"value": 0.01, "unit": "m2"}}
            }),
        )
        .unwrap();

        let got = get(&store, "dms0", "BeamState", &id, None, 0, true, false, &HashSet::new()).unwrap();
        assert_eq!(got["npointz"], 5);
        assert!(got.get("cs").is_none(), "link attribute should be omitted at max_level=0: {got:?}");
    }

    /// Scenario S4: a slice subscript fans a single PATCH out across every
    /// resolved leaf, applying the matching element of the data list to
    /// each in order.
    #[test]
    fn patch_fans_out_across_a_slice_of_linked_objects() {
        let store = InMemoryStore::new();
        let schema = serde_json::json!({
            "BeamState": {
                "csState": {"dtype": "object", "shape": [-1], "link": "CsState"}
            },
            "CsState": {
                "bendingMoment": {"dtype": "f", "unit": "kN*m", "shape": []}
            }
        });
        store.schema_set("dms0", schema, false).unwrap();

        let mut cs0 = serde_json::Map::new();
        cs0.insert("bendingMoment".to_string(), serde_json::json!({"value": 0.0, "unit": "kN*m"}));
        let cs0_id = store.insert_one("dms0", "CsState", cs0).unwrap();
        let mut cs1 = serde_json::Map::new();
        cs1.insert("bendingMoment".to_string(), serde_json::json!({"value": 0.0, "unit": "kN*m"}));
        let cs1_id = store.insert_one("dms0", "CsState", cs1).unwrap();

        let mut beam_state = serde_json::Map::new();
        beam_state.insert(
            "csState".to_string(),
            serde_json::json!([cs0_id.clone(), cs1_id.clone()]),
        );
        let id = store.insert_one("dms0", "BeamState", beam_state).unwrap();

        patch(
            &store,
            "dms0",
            "BeamState",
            &id,
            "csState[:].bendingMoment",
            serde_json::json!([
                {"value": 1, "unit": "kN*m"},
                {"value": 2, "unit": "kN*m"}
            ]),
        )
        .unwrap();

        let cs0_after = store.find_one("dms0", "CsState", &cs0_id).unwrap();
        let cs1_after = store.find_one("dms0", "CsState", &cs1_id).unwrap();
        assert_eq!(cs0_after["bendingMoment"]["value"], 1.0);
        assert_eq!(cs1_after["bendingMoment"]["value"], 2.0);
    }

    /// Scenario S5: cloning with a `shallow` set reuses the shared
    /// object's id as-is (it is not duplicated), while everything else on
    /// the path to the root is deep-copied with a new id and carries
    /// `_meta.upstream` back to its original.
    #[test]
    fn clone_with_shallow_reuses_the_shared_subtree() {
        let store = InMemoryStore::new();
        let schema = serde_json::json!({
            "BeamState": {
                "beam": {"dtype": "object", "shape": [], "link": "Beam"}
            },
            "Beam": {
                "cs": {"dtype": "object", "shape": [], "link": "CrossSection"}
            },
            "CrossSection": {
                "rve": {"dtype": "object", "shape": [], "link": "ConcreteRVE"}
            },
            "ConcreteRVE": {
                "name": {"dtype": "str", "shape": []}
            }
        });
        store.schema_set("dms0", schema, false).unwrap();

        let mut rve = serde_json::Map::new();
        rve.insert("name".to_string(), serde_json::json!("shared-rve"));
        let rve_id = store.insert_one("dms0", "ConcreteRVE", rve).unwrap();

        let mut cs = serde_json::Map::new();
        cs.insert("rve".to_string(), serde_json::Value::String(rve_id.clone()));
        let cs_id = store.insert_one("dms0", "CrossSection", cs).unwrap();

        let mut beam = serde_json::Map::new();
        beam.insert("cs".to_string(), serde_json::Value::String(cs_id.clone()));
        let beam_id = store.insert_one("dms0", "Beam", beam).unwrap();

        let mut beam_state = serde_json::Map::new();
        beam_state.insert("beam".to_string(), serde_json::Value::String(beam_id.clone()));
        let root_id = store.insert_one("dms0", "BeamState", beam_state).unwrap();

        let shallow: HashSet<String> = [rve_id.clone()].into_iter().collect();
        let cloned_root_id = clone(&store, "dms0", "BeamState", &root_id, &shallow).unwrap();
        assert_ne!(cloned_root_id, root_id);

        let cloned_root = store.find_one("dms0", "BeamState", &cloned_root_id).unwrap();
        assert_eq!(cloned_root["_meta"]["upstream"], serde_json::Value::String(root_id));

        let new_beam_id = cloned_root["beam"].as_str().unwrap().to_string();
        assert_ne!(new_beam_id, beam_id);
        let new_beam = store.find_one("dms0", "Beam", &new_beam_id).unwrap();

        let new_cs_id = new_beam["cs"].as_str().unwrap().to_string();
        assert_ne!(new_cs_id, cs_id);
        let new_cs = store.find_one("dms0", "CrossSection", &new_cs_id).unwrap();

        assert_eq!(new_cs["rve"], serde_json::Value::String(rve_id));
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Release accounting across whole workflows: every resource a wrapper owns
//! is released exactly once, and nothing the model owns is ever released.

use geowrap::{
    AttributeDictionary, Entity, Host, LoopInput, NativeRef, Ownership, Point3, TypedValue,
};

/// Asserts that no owned resource leaked and no release was refused.
fn assert_clean(host: &Host) {
    host.with_model(|model| {
        assert_eq!(model.outstanding(), 0, "leaked caller-owned resources");
        assert_eq!(model.rejected_releases(), 0, "refused release calls");
    });
}

#[test]
fn construct_attach_drop_never_releases() {
    let host = Host::new();
    let mut entity = Entity::create(&host);
    let key = entity.key().unwrap();
    assert_eq!(entity.ownership(), Ownership::Owned);

    assert!(host.add_entity(&mut entity));
    let alias = entity.clone();
    drop(entity);
    drop(alias);

    assert_eq!(host.with_model(|m| m.release_count(key.into())), 0);
    assert!(host.with_model(|m| m.contains(key.into())));
    assert_clean(&host);
}

#[test]
fn owned_wrappers_release_exactly_once() {
    let host = Host::new();
    let mut keys: Vec<NativeRef> = Vec::new();
    {
        let entity = Entity::create(&host);
        let dict = AttributeDictionary::new(&host, "loose");
        let value = TypedValue::of(&host, 1.5);
        keys.push(entity.key().unwrap().into());
        keys.push(dict.as_entity().key().unwrap().into());
        keys.push(value.key().unwrap().into());

        // Copies of owned wrappers are independent owned resources.
        let entity_copy = entity.clone();
        let dict_copy = dict.clone();
        let value_copy = value.clone();
        keys.push(entity_copy.key().unwrap().into());
        keys.push(dict_copy.as_entity().key().unwrap().into());
        keys.push(value_copy.key().unwrap().into());
    }

    host.with_model(|model| {
        for key in keys {
            assert_eq!(model.release_count(key), 1, "{key:?}");
        }
    });
    assert_clean(&host);
}

#[test]
fn linked_dictionary_is_released_with_its_entity() {
    let host = Host::new();
    let entity = Entity::create(&host);
    let mut dict = AttributeDictionary::new(&host, "style");
    let dict_key = dict.as_entity().key().unwrap();

    assert!(entity.set_attribute_in(&mut dict, "k", &TypedValue::of(&host, 1)));
    assert_eq!(dict.ownership(), Ownership::Attached);
    drop(dict);
    assert!(host.with_model(|m| m.contains(dict_key.into())));

    // The entity is still detached; dropping it takes the dictionary along.
    drop(entity);
    assert!(!host.with_model(|m| m.contains(dict_key.into())));
    assert_eq!(host.with_model(|m| m.release_count(dict_key.into())), 0);
    assert_clean(&host);
}

#[test]
fn views_of_model_geometry_never_release() {
    let host = Host::new();
    let input: LoopInput = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(4.0, 0.0, 0.0),
        Point3::new(4.0, 3.0, 0.0),
    ]
    .into_iter()
    .collect();

    let entities_before;
    {
        let lp = host.add_face(&input);
        let face = lp.face();
        face.set_attribute("meta", "area", &TypedValue::of(&host, 6.0));
        let _edges = lp.edges();
        let _vertices = lp.vertices();
        let _copy = face.clone();
        entities_before = host.with_model(|m| m.entity_count());
    }

    assert_eq!(host.with_model(|m| m.entity_count()), entities_before);
    assert_clean(&host);
}

#[test]
fn attribute_reads_return_owned_copies() {
    let host = Host::new();
    let mut entity = Entity::create(&host);
    host.add_entity(&mut entity);
    entity.set_attribute("d", "list", &{
        let mut list = TypedValue::new(&host);
        list.set_array(&[TypedValue::of(&host, 1), TypedValue::of(&host, 2)]);
        list
    });

    for _ in 0..3 {
        let value = entity.get_attribute("d", "list");
        assert_eq!(value.ownership(), Ownership::Owned);
        assert_eq!(value.array_value().len(), 2);
    }
    assert_clean(&host);
}

#[test]
fn wrappers_from_another_model_are_refused() {
    let host = Host::new();
    let other = Host::new();
    let mut foreign = Entity::create(&other);

    assert!(!host.add_entity(&mut foreign));
    assert_eq!(foreign.ownership(), Ownership::Owned);
    drop(foreign);
    assert_clean(&other);
    assert_clean(&host);
}

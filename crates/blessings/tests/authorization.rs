//! End-to-end authorization scenarios between principals.

use blessings::core::{Certificate, CertificateBuilder};
use blessings::{
    union_of_blessings, BlessingsExt, Blessings, CallParams, Caveat, CaveatId, Chain, Error,
};
use blessings_testkit::{call, call_at, multi_principal_fixtures, now_millis, TestFixture, HOUR_MS};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

#[test]
fn method_caveat_limits_names() {
    let alice = TestFixture::new();
    let b = alice.trusted_self_blessing("alice", vec![Caveat::method(["succeed"])]);

    assert_eq!(alice.names_for(&b, &call("succeed")), vec!["alice"]);
    assert!(alice.names_for(&b, &call("fail")).is_empty());
}

#[test]
fn expiry_caveat() {
    let alice = TestFixture::new();
    let now = now_millis();
    let b = alice.trusted_self_blessing("alice", vec![Caveat::expiry(now + HOUR_MS)]);

    assert_eq!(alice.names_for(&b, &call_at("Get", now)), vec!["alice"]);
    assert!(alice.names_for(&b, &call_at("Get", now + 2 * HOUR_MS)).is_empty());
}

#[test]
fn unrecognized_root_yields_nothing() {
    let parties = multi_principal_fixtures(2);
    let (alice, bob) = (&parties[0], &parties[1]);
    let b = alice.trusted_self_blessing("alice", vec![]);

    // Bob never added alice to his roots.
    assert!(bob.names_for(&b, &call("Get")).is_empty());

    // Trusting alice for a different name-space does not help.
    bob.principal.roots().add(&alice.public_key(), "bob/...").unwrap();
    assert!(bob.names_for(&b, &call("Get")).is_empty());

    bob.principal.roots().add(&alice.public_key(), "alice").unwrap();
    assert_eq!(bob.names_for(&b, &call("Get")), vec!["alice"]);
}

#[test]
fn union_over_different_keys_fails() {
    let parties = multi_principal_fixtures(2);
    let a = parties[0].trusted_self_blessing("alice", vec![]);
    let b = parties[1].trusted_self_blessing("bob", vec![]);

    assert!(matches!(
        union_of_blessings(&[a, b]),
        Err(Error::KeyMismatch { .. })
    ));
}

#[test]
fn union_for_call_is_union_of_operands() {
    let alice = TestFixture::new();
    let a = alice.trusted_self_blessing("alice", vec![Caveat::method(["Get"])]);
    let b = alice.trusted_self_blessing("alicia", vec![Caveat::method(["Put"])]);
    let c = alice.trusted_self_blessing("al", vec![]);
    let u = union_of_blessings(&[a.clone(), b.clone(), c.clone()]).unwrap();

    for method in ["Get", "Put", "Delete"] {
        let call = call(method);
        let mut expected: Vec<String> = [&a, &b, &c]
            .iter()
            .flat_map(|x| alice.names_for(x, &call))
            .collect();
        expected.sort();
        expected.dedup();
        assert_eq!(alice.names_for(&u, &call), expected);
    }
}

#[test]
fn delegated_blessing() {
    let parties = multi_principal_fixtures(2);
    let (p1, p2) = (&parties[0], &parties[1]);

    let alice = p1.principal.bless_self("alice", vec![]).unwrap();
    let friend = p1
        .principal
        .bless(p2.public_key(), &alice, "work/friend", vec![Caveat::unconstrained()])
        .unwrap();

    assert_eq!(friend.public_key(), Some(&p2.public_key()));

    p2.principal.add_to_roots(&alice).unwrap();
    assert_eq!(
        friend.for_call(&call("Get"), &p2.principal),
        vec!["alice/work/friend"]
    );
}

#[test]
fn bless_with_foreign_blessings_fails() {
    let parties = multi_principal_fixtures(3);
    let alice = parties[0].principal.bless_self("alice", vec![]).unwrap();

    // Bob cannot extend alice's blessing; only alice can.
    assert!(matches!(
        parties[1]
            .principal
            .bless(parties[2].public_key(), &alice, "friend", vec![]),
        Err(Error::KeyMismatch { .. })
    ));
}

#[test]
fn caveats_accumulate_along_the_chain() {
    let parties = multi_principal_fixtures(3);
    let (alice, bob, carol) = (&parties[0], &parties[1], &parties[2]);

    let root = alice.principal.bless_self("alice", vec![]).unwrap();
    let to_bob = alice
        .principal
        .bless(bob.public_key(), &root, "bob", vec![Caveat::method(["Get", "Put"])])
        .unwrap();
    let to_carol = bob
        .principal
        .bless(carol.public_key(), &to_bob, "carol", vec![Caveat::method(["Put"])])
        .unwrap();

    carol.principal.add_to_roots(&root).unwrap();
    assert_eq!(carol.names_for(&to_carol, &call("Put")), vec!["alice/bob/carol"]);
    // Bob's certificate allows Get; carol's does not.
    assert!(carol.names_for(&to_carol, &call("Get")).is_empty());
}

#[test]
fn presented_blessings_follow_store_policy() {
    let parties = multi_principal_fixtures(2);
    let (alice, bob) = (&parties[0], &parties[1]);

    let for_all = alice.principal.bless_self("alice", vec![]).unwrap();
    let for_bob = alice.principal.bless_self("alice-for-bob", vec![]).unwrap();
    let store = alice.principal.blessing_store();
    store.set(for_all.clone(), "...").unwrap();
    store.set(for_bob.clone(), "bob/...").unwrap();

    let bob_self = bob.trusted_self_blessing("bob", vec![]);
    let bob_names = bob.names_for(&bob_self, &call("Get"));
    assert_eq!(bob_names, vec!["bob"]);

    let presented = store.for_peer(&bob_names);
    assert_eq!(
        presented,
        Blessings::union([&for_all, &for_bob]).unwrap()
    );
    assert_eq!(store.for_peer(&["carol"]), for_all);
}

fn tampered(blessings: &Blessings, edit: impl FnOnce(&mut Vec<Certificate>)) -> Blessings {
    let chain = blessings.chains().next().unwrap();
    let mut certs = chain.certificates().to_vec();
    edit(&mut certs);
    let key = *blessings.public_key().unwrap();
    Blessings::from_chains(key, [Chain::new(certs).unwrap()]).unwrap()
}

#[test]
fn tampered_chains_are_excluded() {
    init_tracing();
    let parties = multi_principal_fixtures(2);
    let (alice, bob) = (&parties[0], &parties[1]);

    let root = alice.principal.bless_self("alice", vec![]).unwrap();
    let friend = alice
        .principal
        .bless(bob.public_key(), &root, "friend", vec![Caveat::method(["Get"])])
        .unwrap();
    bob.principal.add_to_roots(&root).unwrap();
    assert_eq!(bob.names_for(&friend, &call("Get")), vec!["alice/friend"]);

    // Renamed extension.
    let renamed = tampered(&friend, |certs| certs[1].extension = "boss".into());
    assert!(bob.names_for(&renamed, &call("Get")).is_empty());

    // Caveat stripped.
    let stripped = tampered(&friend, |certs| certs[1].caveats.clear());
    assert!(bob.names_for(&stripped, &call("Put")).is_empty());

    // Signature bytes flipped.
    let flipped = tampered(&friend, |certs| certs[1].signature.0[0] ^= 0xff);
    assert!(bob.names_for(&flipped, &call("Get")).is_empty());
}

#[test]
fn spliced_certificate_is_excluded() {
    let parties = multi_principal_fixtures(3);
    let (alice, bob, mallory) = (&parties[0], &parties[1], &parties[2]);

    let root = alice.principal.bless_self("alice", vec![]).unwrap();
    let other_root = alice.principal.bless_self("alice-other", vec![]).unwrap();
    bob.principal.add_to_roots(&root).unwrap();

    // A certificate alice issued under "alice-other" is moved under "alice".
    let grant = alice
        .principal
        .bless(mallory.public_key(), &other_root, "admin", vec![])
        .unwrap();
    let cert = grant.chains().next().unwrap().last().clone();
    let spliced = root.chains().next().unwrap().extend(cert);
    let spliced = Blessings::from_chains(mallory.public_key(), [spliced]).unwrap();

    assert!(bob.names_for(&spliced, &call("Get")).is_empty());
}

#[test]
fn forged_root_is_excluded() {
    let parties = multi_principal_fixtures(3);
    let (alice, bob, mallory) = (&parties[0], &parties[1], &parties[2]);
    let real = alice.principal.bless_self("alice", vec![]).unwrap();
    bob.principal.add_to_roots(&real).unwrap();

    // Mallory signs a root certificate claiming alice's key, then delegates.
    let forged_root = CertificateBuilder::new("alice", alice.public_key()).sign(&mallory.principal, None);
    let forged_ext = CertificateBuilder::new("friend", mallory.public_key())
        .sign(&mallory.principal, Some(&forged_root));
    let chain = Chain::new(vec![forged_root, forged_ext]).unwrap();
    let forged = Blessings::from_chains(mallory.public_key(), [chain]).unwrap();

    assert!(bob.names_for(&forged, &call("Get")).is_empty());
}

#[test]
fn unregistered_and_undecodable_caveats_exclude_chain() {
    let alice = TestFixture::new();
    let unknown = Caveat::new(CaveatId::from_bytes([0xee; 16]), &true).unwrap();
    let b = alice.trusted_self_blessing("alice", vec![unknown]);
    assert!(alice.names_for(&b, &call("Get")).is_empty());

    let garbled = Caveat::new(blessings::core::METHOD_CAVEAT, &42u32).unwrap();
    let b = alice.trusted_self_blessing("alicia", vec![garbled]);
    assert!(alice.names_for(&b, &call("Get")).is_empty());
}

#[test]
fn only_valid_chains_survive() {
    let alice = TestFixture::new();
    let get = alice.trusted_self_blessing("getter", vec![Caveat::method(["Get"])]);
    let put = alice.trusted_self_blessing("putter", vec![Caveat::method(["Put"])]);
    let both = union_of_blessings(&[get, put]).unwrap();

    assert_eq!(alice.names_for(&both, &call("Get")), vec!["getter"]);
    assert_eq!(alice.names_for(&both, &call("Put")), vec!["putter"]);
    assert!(alice.names_for(&both, &CallParams::new().method("Delete")).is_empty());
}

#[test]
fn empty_blessings_resolve_to_nothing() {
    let alice = TestFixture::new();
    assert!(alice.names_for(&Blessings::empty(), &call("Get")).is_empty());
    assert!(Blessings::empty().is_empty());
}

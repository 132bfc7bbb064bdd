//! End-to-end lifecycle of one issuer: issue, rotate, revoke, forged rotation.

use std::sync::atomic::{AtomicUsize, Ordering};

use keri_kernel::core::{Kel, KeyCommitment};
use keri_kernel::did;
use keri_kernel::{
    Entity, EntityConfig, KelError, KernelError, KeyRing, Keypair, TelStatus, Verification,
};
use proptest::prelude::*;
use serde_json::json;

fn k(seed: u8) -> Keypair {
    Keypair::from_seed(&[seed; 32])
}

fn issuer() -> Entity {
    Entity::incept(KeyRing::new(k(1), k(2)), EntityConfig::default()).unwrap()
}

#[test]
fn test_concurrent_mutations_serialize() -> anyhow::Result<()> {
    const WRITERS: usize = 4;
    const ROUNDS: usize = 12;

    let a = issuer();
    let mutations = AtomicUsize::new(0);
    let issued = std::sync::Mutex::new(Vec::new());

    let snapshots = std::thread::scope(|scope| {
        for w in 0..WRITERS {
            let (a, mutations, issued) = (&a, &mutations, &issued);
            scope.spawn(move || {
                for round in 0..ROUNDS {
                    if round % 4 == 3 {
                        a.rotate().unwrap();
                    } else {
                        let credential = a
                            .issue("test", json!({"writer": w, "round": round}))
                            .unwrap();
                        issued.lock().unwrap().push(credential);
                    }
                    mutations.fetch_add(1, Ordering::SeqCst);
                }
            });
        }

        let readers: Vec<_> = (0..2)
            .map(|_| {
                let a = &a;
                scope.spawn(move || {
                    (0..200)
                        .map(|_| a.current_state().unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        readers
            .into_iter()
            .flat_map(|r| r.join().unwrap())
            .collect::<Vec<_>>()
    });

    let kel = Kel::replay(a.kel_events()?)?;
    assert_eq!(kel.len(), 1 + mutations.load(Ordering::SeqCst));
    assert_eq!(kel.len(), 1 + WRITERS * ROUNDS);
    for (i, event) in kel.events().iter().enumerate() {
        assert_eq!(event.event.seq, i as u64);
    }
    assert_eq!(kel.current_state(), a.current_state()?);

    // Every snapshot is a state the log actually passed through.
    for snapshot in &snapshots {
        assert_eq!(kel.state_at(snapshot.seq).as_ref(), Some(snapshot));
    }

    for credential in issued.into_inner().unwrap() {
        assert_eq!(a.verify_local(&credential)?, Verification::Valid);
    }
    Ok(())
}

#[tokio::test]
async fn test_issue_rotate_revoke() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    // A incepts with K1, committing to H(K2).
    let a = issuer();
    let state = a.current_state()?;
    assert_eq!(state.signing_key, k(1).public_key());
    assert_eq!(state.next_commitment, KeyCommitment::of(&k(2).public_key()));

    let credential = a.issue("test", json!({"msg": "hi"}))?;
    assert_eq!(a.verify(&a.prefix(), &credential).await, Verification::Valid);

    // Rotate to K2, committing to H(K3).
    let rotated = a.rotate_to(k(3))?;
    assert_eq!(rotated.signing_key, k(2).public_key());
    assert_eq!(rotated.next_commitment, KeyCommitment::of(&k(3).public_key()));
    assert_eq!(rotated.prefix, a.prefix());

    // Still valid after rotation: the issuance was anchored under K1.
    assert_eq!(a.verify(&a.prefix(), &credential).await, Verification::Valid);

    a.revoke(&credential)?;
    assert_eq!(a.status_of(&credential.digest())?, TelStatus::Revoked);
    assert_eq!(a.verify(&a.prefix(), &credential).await, Verification::Revoked);

    // K9 was never committed to.
    let forged = a.rotate_with(k(9), k(10));
    assert!(matches!(
        forged,
        Err(KernelError::Kel(KelError::CommitmentMismatch { .. }))
    ));
    let after = a.current_state()?;
    assert_eq!(after.signing_key, k(2).public_key());
    assert_eq!(after.next_commitment, KeyCommitment::of(&k(3).public_key()));
    assert_eq!(after.seq, rotated.seq + 1);

    // The committed K3 still works.
    assert_eq!(a.rotate_to(k(4))?.signing_key, k(3).public_key());
    Ok(())
}

#[test]
fn test_kel_links() {
    let a = issuer();
    a.issue("test", json!(1)).unwrap();
    a.rotate().unwrap();
    a.issue("test", json!(2)).unwrap();

    let events = a.kel_events().unwrap();
    assert_eq!(events.len(), 4);
    for pair in events.windows(2) {
        assert_eq!(pair[1].event.prior, Some(pair[0].digest()));
        assert_eq!(pair[1].seq(), pair[0].seq() + 1);
    }
}

#[test]
fn test_did_document_tracks_rotation() {
    let a = issuer();
    let before = a.did_document().unwrap();
    assert_eq!(before, a.did_document().unwrap());

    a.rotate_to(k(3)).unwrap();
    let after = a.did_document().unwrap();
    assert_eq!(after.id, before.id);
    assert_ne!(after.verification_method, before.verification_method);
    assert_eq!(after, did::resolve(&a.current_state().unwrap()));
}

#[test]
fn test_revoke_unknown_credential() {
    let a = issuer();
    let b = Entity::new(EntityConfig::default()).unwrap();
    let foreign = b.issue("test", json!({})).unwrap();

    assert!(matches!(
        a.revoke(&foreign),
        Err(KernelError::Tel(keri_kernel::TelError::UnknownCredential(_)))
    ));
    assert_eq!(a.kel_events().unwrap().len(), 1);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_tampered_payload_never_verifies(msg in "[a-z]{1,16}", flip in 0usize..16) {
        let a = issuer();
        let credential = a.issue("test", json!({ "msg": msg.clone() })).unwrap();

        let mut bytes = msg.into_bytes();
        let i = flip % bytes.len();
        bytes[i] ^= 0x01;
        let tampered_msg = String::from_utf8_lossy(&bytes).into_owned();

        let mut tampered = credential.clone();
        tampered.datum.payload = json!({ "msg": tampered_msg });
        prop_assert_eq!(a.verify_local(&tampered).unwrap(), Verification::InvalidSignature);

        a.revoke(&credential).unwrap();
        prop_assert_eq!(a.verify_local(&tampered).unwrap(), Verification::InvalidSignature);
    }
}

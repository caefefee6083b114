//! Integration tests for the `resalt` module.

use std::sync::Arc;

use credguard_core::{
    CoreConfig, CredentialStore, CredentialVerifier, RecordAlgorithm, ResaltChain,
    ResaltSweepReport, VerificationOutcome,
};
use credguard_crypto::Algorithm;
use credguard_test::{FixedClock, MemoryCredentialStore, MemoryHistoryStore, SequenceSaltSource};

fn chain() -> ResaltChain {
    ResaltChain::new(Arc::new(SequenceSaltSource::new()))
}

fn verifier(store: Arc<MemoryCredentialStore>) -> CredentialVerifier {
    CredentialVerifier::new(
        store,
        Arc::new(MemoryHistoryStore::new()),
        Arc::new(FixedClock::default()),
        Arc::new(SequenceSaltSource::new()),
        CoreConfig {
            target_algorithm: Algorithm::KeyDerivation {
                iterations: std::num::NonZeroU32::new(1000).expect("non-zero"),
            },
            ..CoreConfig::default()
        },
    )
}

#[tokio::test]
async fn two_wraps_reach_depth_two_with_stable_origin() {
    let store = Arc::new(MemoryCredentialStore::new());
    let v = verifier(store.clone());
    let chain = chain();
    v.register("alice", "Secret1!", Some(Algorithm::WeakDigest))
        .await
        .expect("registers");
    let original_hash = store
        .get("alice")
        .await
        .expect("reads")
        .expect("exists")
        .hash
        .clone();

    assert_eq!(v.resalt(&chain, "alice").await.expect("wraps"), 1);
    let after_one = store.get("alice").await.expect("reads").expect("exists");
    let origin_after_one = after_one.origin.clone().expect("origin preserved");
    assert_eq!(origin_after_one.hash, original_hash);
    assert_eq!(origin_after_one.algorithm, Algorithm::WeakDigest);

    assert_eq!(v.resalt(&chain, "alice").await.expect("wraps"), 2);
    let after_two = store.get("alice").await.expect("reads").expect("exists");
    assert_eq!(after_two.chain_depth, 2);
    // The second wrap re-wraps the bytes but never touches the origin.
    assert_eq!(after_two.origin, Some(origin_after_one));
    assert_ne!(after_two.hash, after_one.hash);
    assert_eq!(after_two.algorithm, RecordAlgorithm::Wrapped);
}

#[tokio::test]
async fn verify_layer_checks_the_top_of_the_chain() {
    let store = Arc::new(MemoryCredentialStore::new());
    let v = verifier(store.clone());
    let chain = chain();
    v.register("alice", "Secret1!", Some(Algorithm::WeakDigest))
        .await
        .expect("registers");
    let pre_wrap = store.get("alice").await.expect("reads").expect("exists").hash;

    v.resalt(&chain, "alice").await.expect("wraps");
    let record = store.get("alice").await.expect("reads").expect("exists");
    assert!(chain.verify_layer(&record, &pre_wrap));
    assert!(!chain.verify_layer(&record, "not-the-pre-wrap-hash"));
}

#[tokio::test]
async fn wrapped_record_still_logs_in_via_origin_and_migrates() {
    let store = Arc::new(MemoryCredentialStore::new());
    let v = verifier(store.clone());
    let chain = chain();
    v.register("alice", "Secret1!", Some(Algorithm::WeakDigest))
        .await
        .expect("registers");
    v.resalt(&chain, "alice").await.expect("wraps");

    // Wrapping changed the bytes but not the verification function: the login
    // verifies against the origin, whose weak tier then triggers real migration.
    let outcome = v.login("alice", "Secret1!").await.expect("runs");
    assert_eq!(outcome, VerificationOutcome::VerifiedMigrated);

    let record = store.get("alice").await.expect("reads").expect("exists");
    assert_eq!(record.chain_depth, 0);
    assert!(record.origin.is_none());
    assert!(record.upgraded);
}

#[tokio::test]
async fn sweep_wraps_every_record() {
    let store = Arc::new(MemoryCredentialStore::new());
    let v = verifier(store.clone());
    let chain = chain();
    for subject in ["a", "b", "c"] {
        v.register(subject, "Secret1!", Some(Algorithm::WeakDigest))
            .await
            .expect("registers");
    }

    let report = v.resalt_sweep(&chain).await.expect("sweeps");
    assert_eq!(report, ResaltSweepReport { wrapped: 3, failed: 0 });
    for subject in ["a", "b", "c"] {
        let record = store.get(subject).await.expect("reads").expect("exists");
        assert_eq!(record.chain_depth, 1);
    }
}

#[tokio::test]
async fn concurrent_login_and_resalt_never_tear_the_record() {
    let store = Arc::new(MemoryCredentialStore::new());
    let v = Arc::new(verifier(store.clone()));
    let chain = chain();
    v.register("alice", "Secret1!", Some(Algorithm::WeakDigest))
        .await
        .expect("registers");

    let login = {
        let v = v.clone();
        async move { v.login("alice", "Secret1!").await }
    };
    let resalt = v.resalt(&chain, "alice");
    let (login_result, resalt_result) = tokio::join!(login, resalt);

    assert!(login_result.expect("login runs").is_verified());

    let record = store.get("alice").await.expect("reads").expect("exists");
    match record.algorithm {
        // Resalt won the race for the final write: it wrapped the already-migrated
        // record, so the origin must hold the full migrated material.
        RecordAlgorithm::Wrapped => {
            assert!(resalt_result.is_ok());
            assert_eq!(record.chain_depth, 1);
            let origin = record.origin.expect("origin preserved");
            assert!(origin.hash.starts_with("pbkdf2:"));
        }
        // Migration won: the wrap (applied before or after) was cleared by the
        // rehash, leaving a clean record at the target tier.
        RecordAlgorithm::Plain(ref algorithm) => {
            assert_eq!(algorithm.tier(), 2);
            assert_eq!(record.chain_depth, 0);
            assert!(record.origin.is_none());
        }
    }
}

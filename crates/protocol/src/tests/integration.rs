//! End-to-end session flows against a simulated Safe and an in-memory relay store.

use super::fixtures::*;
use crate::{
    CosignConfig, CosignEvent, CustomThresholdPolicy, EntryKind, TransferAsset, build_owner_change,
    build_rejection, build_transfer, is_executable, quorum_status,
};
use alloy_primitives::{Address, U256};
use cosign_primitives::{
    CosignError, OriginMetadata, OwnerAction, PendingTransactionRecord, SafeTxHash, compute_hash,
};
use cosign_relay::{RelayStore, SafeInfo};
use std::time::Duration;

const RECIPIENT: &str = "0x000000000000000000000000000000000000beef";

const USDC: TransferAsset = TransferAsset::Erc20 {
    token: TOKEN,
    decimals: 6,
};

async fn record(safe: &TestSafe, hash: SafeTxHash) -> PendingTransactionRecord {
    safe.relay.inner.transaction(hash).await.unwrap()
}

/// Owner indices ordered by address, descending.
fn owners_descending(safe: &TestSafe) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..safe.owners.len()).collect();
    indices.sort_by_key(|&i| std::cmp::Reverse(safe.address(i)));
    indices
}

mod round_trip {
    use super::*;

    #[tokio::test]
    async fn test_propose_confirm_execute() {
        let safe = TestSafe::new(3, 2, 7);
        let wallet = safe.wallet();
        let (alice, bob, carol) = (safe.session(0), safe.session(1), safe.session(2));

        let tx = build_transfer(&wallet, USDC, RECIPIENT, "500", 7).unwrap();
        let (h1, first) = alice.sign_and_propose(&wallet, tx).await.unwrap();
        assert_eq!(first.owner, safe.address(0));

        let view = bob.list_pending(&wallet).await.unwrap();
        assert_eq!(view.entries.len(), 1);
        let entry = &view.entries[0];
        assert_eq!(entry.record.safe_tx_hash, h1);
        assert_eq!(compute_hash(&wallet.domain(), &entry.record.transaction), h1);
        assert_eq!(
            entry.kind,
            EntryKind::TokenTransfer {
                token: TOKEN,
                recipient: cosign_primitives::normalize_address(RECIPIENT).unwrap(),
                amount: U256::from(500_000_000u64),
            }
        );
        assert!(!entry.executable);
        assert!(!entry.signed_by_me);

        bob.sign_existing(&wallet, &entry.record).await.unwrap();
        let confirmed = record(&safe, h1).await;
        assert_eq!(quorum_status(&confirmed, &wallet).collected, 2);
        assert!(is_executable(&confirmed, &wallet));

        let mut carol_wallet = wallet.clone();
        let receipt = carol.execute_and_wait(&mut carol_wallet, &confirmed).await.unwrap();
        assert_eq!(receipt.safe_tx_hash, h1);
        assert_eq!(carol_wallet.nonce(), 8);
        assert_eq!(safe.chain.contract().nonce(), 8);

        let sent = safe.chain.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, SAFE);
        let mut expected = vec![safe.address(0), safe.address(1)];
        expected.sort();
        assert_eq!(MockChain::signers_of(&sent[0], h1), expected);
    }

    #[tokio::test]
    async fn test_owner_change_updates_wallet() {
        let safe = TestSafe::new(3, 2, 0);
        let mut wallet = safe.wallet();
        let newcomer = anvil_accounts()[3].0;

        let action = OwnerAction::AddOwner {
            owner: newcomer,
            threshold: 3,
        };
        let tx = build_owner_change(&wallet, &action, 0).unwrap();
        let (hash, _) = safe.session(0).sign_and_propose(&wallet, tx).await.unwrap();

        let pending = safe.session(1).list_pending(&wallet).await.unwrap();
        assert_eq!(pending.entries[0].kind, EntryKind::OwnerChange(action));
        safe.session(1).sign_existing(&wallet, &pending.entries[0].record).await.unwrap();

        safe.session(2)
            .execute_and_wait(&mut wallet, &record(&safe, hash).await)
            .await
            .unwrap();

        assert!(wallet.is_owner(&newcomer));
        assert_eq!(wallet.threshold(), 3);
        assert_eq!(wallet, safe.chain.contract());
    }

    #[tokio::test]
    async fn test_receipt_wait_times_out() {
        let safe = TestSafe::new(2, 1, 0);
        safe.chain.stop_mining();
        let mut config = CosignConfig::default_test_config();
        config.chain.receipt_timeout = Duration::from_millis(100);
        let session = safe.session_with(0, config);
        let mut wallet = safe.wallet();

        let tx = build_transfer(&wallet, TransferAsset::Native, RECIPIENT, "0.5", 0).unwrap();
        let (hash, _) = session.sign_and_propose(&wallet, tx).await.unwrap();
        let err = session
            .execute_and_wait(&mut wallet, &record(&safe, hash).await)
            .await
            .unwrap_err();

        assert!(matches!(err, CosignError::NetworkTimeout { .. }), "{err}");
        assert_eq!(wallet.nonce(), 0);
    }
}

mod custom_threshold {
    use super::*;

    fn with_custom(required_signatures: u64) -> OriginMetadata {
        OriginMetadata::CustomThreshold {
            required_signatures,
        }
    }

    #[tokio::test]
    async fn test_custom_threshold_above_default_holds_execution() {
        let safe = TestSafe::new(3, 2, 7);
        let wallet = safe.wallet();

        let tx = build_transfer(&wallet, USDC, RECIPIENT, "500", 7)
            .unwrap()
            .with_origin(with_custom(3));
        let (hash, _) = safe.session(0).sign_and_propose(&wallet, tx).await.unwrap();
        safe.session(1)
            .sign_existing(&wallet, &record(&safe, hash).await)
            .await
            .unwrap();

        let confirmed = record(&safe, hash).await;
        assert_eq!(confirmed.confirmation_count(wallet.owners()), 2);
        assert!(!is_executable(&confirmed, &wallet));

        let err = safe.session(2).execute(&wallet, &confirmed).await.unwrap_err();
        assert_eq!(
            err,
            CosignError::InsufficientSignatures {
                collected: 2,
                required: 3
            }
        );
        assert!(err.is_waiting_on_signers());
        assert!(safe.chain.sent().is_empty());

        safe.session(2).sign_existing(&wallet, &confirmed).await.unwrap();
        assert!(is_executable(&record(&safe, hash).await, &wallet));
    }

    #[tokio::test]
    async fn test_strict_policy_refuses_low_custom_threshold() {
        let safe = TestSafe::new(3, 2, 0);
        let wallet = safe.wallet();
        let tx = build_rejection(&wallet, 0).unwrap().with_origin(with_custom(1));

        let err = safe.session(0).sign_and_propose(&wallet, tx).await.unwrap_err();
        assert_eq!(
            err,
            CosignError::CustomThresholdBelowDefault {
                custom: 1,
                default: 2
            }
        );
        assert!(err.is_validation());
        assert_eq!(safe.relay.calls(), 0);
    }

    #[tokio::test]
    async fn test_out_of_range_custom_threshold() {
        let safe = TestSafe::new(3, 2, 0);
        let wallet = safe.wallet();
        for custom in [0, 4] {
            let tx = build_rejection(&wallet, 0).unwrap().with_origin(with_custom(custom));
            let err = safe.session(0).sign_and_propose(&wallet, tx).await.unwrap_err();
            assert_eq!(
                err,
                CosignError::InvalidThreshold {
                    threshold: custom,
                    owners: 3
                }
            );
        }
        assert_eq!(safe.relay.calls(), 0);
    }

    #[tokio::test]
    async fn test_warn_policy_surfaces_onchain_gap() {
        let safe = TestSafe::new(3, 2, 0);
        let wallet = safe.wallet();
        let mut config = CosignConfig::default_test_config();
        config.policy.custom_threshold = CustomThresholdPolicy::Warn;
        let alice = safe.session_with(0, config);

        let tx = build_transfer(&wallet, TransferAsset::Native, RECIPIENT, "1", 0)
            .unwrap()
            .with_origin(with_custom(1));
        let (hash, _) = alice.sign_and_propose(&wallet, tx).await.unwrap();

        let proposed = record(&safe, hash).await;
        let status = quorum_status(&proposed, &wallet);
        assert!(status.is_met());
        assert!(status.below_onchain_threshold());

        let err = alice.execute(&wallet, &proposed).await.unwrap_err();
        assert!(
            matches!(
                err,
                CosignError::OnchainExecutionFailed {
                    below_onchain_threshold: true,
                    ..
                }
            ),
            "{err}"
        );
        assert!(err.is_waiting_on_signers());
        assert!(safe.chain.sent().is_empty());

        safe.session(1).sign_existing(&wallet, &proposed).await.unwrap();
        alice.execute(&wallet, &record(&safe, hash).await).await.unwrap();
        assert_eq!(safe.chain.contract().nonce(), 1);
    }
}

mod signature_ordering {
    use super::*;

    #[tokio::test]
    async fn test_signatures_attached_in_address_order() {
        let safe = TestSafe::new(3, 3, 0);
        let wallet = safe.wallet();
        let order = owners_descending(&safe);
        // Submission order [C, A, B] by address.
        let (c, a, b) = (order[0], order[2], order[1]);

        let tx = build_transfer(&wallet, TransferAsset::Native, RECIPIENT, "2", 0).unwrap();
        let (hash, _) = safe.session(c).sign_and_propose(&wallet, tx).await.unwrap();
        safe.session(a).sign_existing(&wallet, &record(&safe, hash).await).await.unwrap();
        safe.session(b).sign_existing(&wallet, &record(&safe, hash).await).await.unwrap();

        let confirmed = record(&safe, hash).await;
        let submitted: Vec<Address> = confirmed.confirmations.iter().map(|c| c.owner).collect();
        assert_eq!(submitted, vec![safe.address(c), safe.address(a), safe.address(b)]);

        safe.session(a).execute(&wallet, &confirmed).await.unwrap();
        let sent = safe.chain.sent();
        assert_eq!(
            MockChain::signers_of(&sent[0], hash),
            vec![safe.address(a), safe.address(b), safe.address(c)]
        );
    }
}

mod double_confirmation {
    use super::*;

    #[tokio::test]
    async fn test_second_confirmation_refused_before_network() {
        let safe = TestSafe::new(3, 2, 0);
        let wallet = safe.wallet();
        let alice = safe.session(0);

        let tx = build_transfer(&wallet, TransferAsset::Native, RECIPIENT, "1", 0).unwrap();
        let (hash, _) = alice.sign_and_propose(&wallet, tx).await.unwrap();
        let proposed = record(&safe, hash).await;

        let calls = safe.relay.calls();
        let err = alice.sign_existing(&wallet, &proposed).await.unwrap_err();
        assert_eq!(
            err,
            CosignError::AlreadySigned {
                owner: safe.address(0),
                safe_tx_hash: hash
            }
        );
        assert_eq!(safe.relay.calls(), calls);
        assert_eq!(record(&safe, hash).await.confirmations.len(), 1);
    }
}

mod quorum {
    use super::*;

    #[tokio::test]
    async fn test_executable_exactly_at_threshold() {
        let safe = TestSafe::new(5, 3, 0);
        let wallet = safe.wallet();

        let tx = build_transfer(&wallet, TransferAsset::Native, RECIPIENT, "1", 0).unwrap();
        let (hash, _) = safe.session(0).sign_and_propose(&wallet, tx).await.unwrap();
        assert!(!is_executable(&record(&safe, hash).await, &wallet));

        for (signed, owner) in (2..=5).zip(1..5) {
            let current = record(&safe, hash).await;
            safe.session(owner).sign_existing(&wallet, &current).await.unwrap();
            let updated = record(&safe, hash).await;
            assert_eq!(updated.confirmation_count(wallet.owners()), signed);
            assert_eq!(is_executable(&updated, &wallet), signed >= 3, "{signed} signatures");
        }
    }
}

mod rejection {
    use super::*;

    #[tokio::test]
    async fn test_executed_rejection_burns_nonce() {
        let safe = TestSafe::new(3, 2, 5);
        let mut wallet = safe.wallet();
        let (alice, bob, carol) = (safe.session(0), safe.session(1), safe.session(2));

        let tx = build_transfer(&wallet, TransferAsset::Native, RECIPIENT, "3", 5).unwrap();
        let (target, _) = alice.sign_and_propose(&wallet, tx).await.unwrap();
        let (rejection, _) = bob.reject(&wallet, &record(&safe, target).await).await.unwrap();

        let view = carol.list_pending(&wallet).await.unwrap();
        assert_eq!(view.at_nonce(5).count(), 2);
        let rejection_entry = view
            .entries
            .iter()
            .find(|e| e.record.safe_tx_hash == rejection)
            .unwrap();
        assert_eq!(
            rejection_entry.kind,
            EntryKind::Rejection {
                rejects: Some(target)
            }
        );

        carol.sign_existing(&wallet, &rejection_entry.record).await.unwrap();
        let receipt = carol
            .execute_and_wait(&mut wallet, &record(&safe, rejection).await)
            .await
            .unwrap();
        assert_eq!(wallet.nonce(), 6);
        safe.relay.inner.mark_executed(rejection, receipt.tx_hash).unwrap();

        let stale = record(&safe, target).await;
        assert!(!is_executable(&stale, &wallet));
        assert!(matches!(
            carol.sign_existing(&wallet, &stale).await,
            Err(CosignError::NonceConsumed { nonce: 5, current: 6 })
        ));
        assert!(matches!(
            alice.execute(&wallet, &stale).await,
            Err(CosignError::NonceConsumed { nonce: 5, .. })
        ));
        assert!(matches!(
            build_rejection(&wallet, 5),
            Err(CosignError::NonceConsumed { .. })
        ));

        let view = carol.list_pending(&wallet).await.unwrap();
        assert_eq!(view.entries.len(), 1);
        assert!(view.entries[0].stale);
        assert_eq!(view.executable().count(), 0);
        assert_eq!(safe.chain.sent().len(), 1);
    }
}

mod failed_execution {
    use super::*;

    #[tokio::test]
    async fn test_execution_failure_event_still_consumes_nonce() {
        let safe = TestSafe::new(2, 1, 0);
        let mut wallet = safe.wallet();
        let session = safe.session(0);

        let tx = build_transfer(&wallet, TransferAsset::Native, RECIPIENT, "1", 0).unwrap();
        let (target, _) = session.sign_and_propose(&wallet, tx).await.unwrap();
        let (rival, _) = session.reject(&wallet, &record(&safe, target).await).await.unwrap();
        assert!(is_executable(&record(&safe, rival).await, &wallet));

        safe.chain.fail_inner_calls();
        let err = session
            .execute_and_wait(&mut wallet, &record(&safe, target).await)
            .await
            .unwrap_err();
        assert!(
            matches!(
                err,
                CosignError::OnchainExecutionFailed {
                    below_onchain_threshold: false,
                    ..
                }
            ),
            "{err}"
        );

        assert_eq!(safe.chain.contract().nonce(), 1);
        assert_eq!(wallet.nonce(), 1);
        assert!(!is_executable(&record(&safe, rival).await, &wallet));
    }

    #[tokio::test]
    async fn test_executed_record_at_max_nonce() {
        let safe = TestSafe::new(2, 1, 0);
        let wallet = safe.wallet();
        let session = safe.session(0);

        let tx = build_rejection(&wallet, 0).unwrap();
        let (hash, _) = session.sign_and_propose(&wallet, tx).await.unwrap();
        let mut indexed = record(&safe, hash).await;
        indexed.transaction.nonce = u64::MAX;
        indexed.executed = true;
        safe.relay.inner.replace(indexed.clone());

        assert_eq!(
            session.execute(&wallet, &indexed).await.unwrap_err(),
            CosignError::NonceConsumed {
                nonce: u64::MAX,
                current: u64::MAX
            }
        );
        assert!(safe.chain.sent().is_empty());
    }
}

mod hash_mismatch {
    use super::*;

    #[tokio::test]
    async fn test_tampered_record_is_never_signed() {
        let safe = TestSafe::new(3, 2, 0);
        let wallet = safe.wallet();

        let tx = build_transfer(&wallet, TransferAsset::Native, RECIPIENT, "1", 0).unwrap();
        let (hash, _) = safe.session(0).sign_and_propose(&wallet, tx).await.unwrap();
        let mut tampered = record(&safe, hash).await;
        tampered.transaction.value = U256::from(10).pow(U256::from(21));
        safe.relay.inner.replace(tampered);

        let fetched = record(&safe, hash).await;
        let err = safe.session(1).sign_existing(&wallet, &fetched).await.unwrap_err();
        assert!(matches!(err, CosignError::HashMismatch { expected, .. } if expected == hash));
        assert_eq!(record(&safe, hash).await.confirmations.len(), 1);
    }

    #[tokio::test]
    async fn test_tampered_record_is_never_executed() {
        let safe = TestSafe::new(3, 2, 0);
        let wallet = safe.wallet();

        let tx = build_transfer(&wallet, USDC, RECIPIENT, "500", 0).unwrap();
        let (hash, _) = safe.session(0).sign_and_propose(&wallet, tx).await.unwrap();
        safe.session(1).sign_existing(&wallet, &record(&safe, hash).await).await.unwrap();
        let honest = record(&safe, hash).await;

        let mut tampered = honest.clone();
        tampered.transaction.to = Address::repeat_byte(0x66);
        safe.relay.inner.replace(tampered);

        let err = safe.session(2).execute(&wallet, &honest).await.unwrap_err();
        assert!(matches!(err, CosignError::HashMismatch { .. }), "{err}");
        assert!(safe.chain.sent().is_empty());
    }
}

mod signer_errors {
    use super::*;

    #[tokio::test]
    async fn test_signer_failures_surface() {
        let safe = TestSafe::new(3, 2, 0);
        let wallet = safe.wallet();
        let tx = build_rejection(&wallet, 0).unwrap();

        let disconnected = safe.session_for(MockSigner::disconnected(safe.chain.clone()));
        assert_eq!(
            disconnected.sign_and_propose(&wallet, tx.clone()).await.unwrap_err(),
            CosignError::SignerUnavailable
        );

        let rejecting =
            safe.session_for(MockSigner::rejecting(safe.owners[0].1.clone(), safe.chain.clone()));
        assert!(matches!(
            rejecting.sign_and_propose(&wallet, tx.clone()).await,
            Err(CosignError::SignerRejected(_))
        ));

        let (outsider, key) = anvil_accounts().remove(4);
        let stranger = safe.session_for(MockSigner::new(key, safe.chain.clone()));
        assert_eq!(
            stranger.sign_and_propose(&wallet, tx).await.unwrap_err(),
            CosignError::NotAnOwner(outsider)
        );

        assert_eq!(safe.relay.calls(), 0);
    }

    #[tokio::test]
    async fn test_outsider_cannot_confirm() {
        let safe = TestSafe::new(3, 2, 0);
        let wallet = safe.wallet();
        let tx = build_transfer(&wallet, TransferAsset::Native, RECIPIENT, "1", 0).unwrap();
        let (hash, _) = safe.session(0).sign_and_propose(&wallet, tx).await.unwrap();
        let proposed = record(&safe, hash).await;

        let (outsider, key) = anvil_accounts().remove(4);
        let stranger = safe.session_for(MockSigner::new(key, safe.chain.clone()));
        let calls = safe.relay.calls();
        assert_eq!(
            stranger.sign_existing(&wallet, &proposed).await.unwrap_err(),
            CosignError::NotAnOwner(outsider)
        );
        assert_eq!(safe.relay.calls(), calls);
        assert_eq!(record(&safe, hash).await.confirmations.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_proposal_refused_by_store() {
        let safe = TestSafe::new(3, 2, 0);
        let wallet = safe.wallet();
        let tx = build_rejection(&wallet, 0).unwrap();

        safe.session(0).sign_and_propose(&wallet, tx.clone()).await.unwrap();
        let err = safe.session(1).sign_and_propose(&wallet, tx).await.unwrap_err();
        assert!(matches!(err, CosignError::ProposalRejected { status: 422, .. }), "{err}");
    }
}

mod in_flight {
    use super::*;

    #[tokio::test]
    async fn test_concurrent_execution_is_refused() {
        let safe = TestSafe::new(2, 1, 0);
        let wallet = safe.wallet();
        safe.chain.delay_sends(Duration::from_millis(100));
        let session = safe.session(0);

        let tx = build_transfer(&wallet, TransferAsset::Native, RECIPIENT, "1", 0).unwrap();
        let (hash, _) = session.sign_and_propose(&wallet, tx).await.unwrap();
        let confirmed = record(&safe, hash).await;

        let (first, second) = tokio::join!(
            session.execute(&wallet, &confirmed),
            session.execute(&wallet, &confirmed)
        );
        let (won, lost): (Vec<_>, Vec<_>) = [first, second].into_iter().partition(Result::is_ok);
        assert_eq!(won.len(), 1);
        assert_eq!(lost[0].clone().unwrap_err(), CosignError::OperationInFlight(hash));
        assert_eq!(safe.chain.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_receipt_wait_keeps_record_in_flight() {
        let safe = TestSafe::new(2, 1, 0);
        safe.chain.stop_mining();
        let mut config = CosignConfig::default_test_config();
        config.chain.receipt_timeout = Duration::from_millis(300);
        let session = safe.session_with(0, config);
        let mut wallet = safe.wallet();
        let snapshot = wallet.clone();

        let tx = build_transfer(&wallet, TransferAsset::Native, RECIPIENT, "1", 0).unwrap();
        let (hash, _) = session.sign_and_propose(&wallet, tx).await.unwrap();
        let confirmed = record(&safe, hash).await;

        let (waited, again) = tokio::join!(session.execute_and_wait(&mut wallet, &confirmed), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            session.execute(&snapshot, &confirmed).await
        });
        assert!(matches!(waited, Err(CosignError::NetworkTimeout { .. })), "{waited:?}");
        assert_eq!(again.unwrap_err(), CosignError::OperationInFlight(hash));
        assert_eq!(safe.chain.sent().len(), 1);
    }
}

mod pending_view {
    use super::*;

    #[tokio::test]
    async fn test_listing_without_signer_session() {
        let safe = TestSafe::new(2, 1, 0);
        let wallet = safe.wallet();
        let tx = build_rejection(&wallet, 0).unwrap();
        safe.session(0).sign_and_propose(&wallet, tx).await.unwrap();

        let viewer = safe.session_for(MockSigner::disconnected(safe.chain.clone()));
        let view = viewer.list_pending(&wallet).await.unwrap();
        assert_eq!(view.entries.len(), 1);
        assert!(!view.entries[0].signed_by_me);
    }

    #[tokio::test]
    async fn test_signer_lookup_failure_is_reported() {
        let safe = TestSafe::new(2, 1, 0);
        let wallet = safe.wallet();
        let timeout = CosignError::NetworkTimeout {
            operation: "eth_accounts".into(),
            after: Duration::from_secs(5),
        };
        let session = safe.session_for(MockSigner::failing_lookup(
            safe.owners[0].1.clone(),
            safe.chain.clone(),
            timeout.clone(),
        ));

        assert_eq!(session.list_pending(&wallet).await.unwrap_err(), timeout);
    }
}

mod wallet_loading {
    use super::*;

    #[tokio::test]
    async fn test_load_from_chain() {
        let safe = TestSafe::new(3, 2, 4);
        let wallet = safe.session(0).load_wallet(SAFE).await.unwrap();
        assert_eq!(wallet, safe.wallet());
    }

    #[tokio::test]
    async fn test_undeployed_safe() {
        let safe = TestSafe::new(3, 2, 0);
        safe.chain.undeploy();
        assert_eq!(
            safe.session(0).load_wallet(SAFE).await.unwrap_err(),
            CosignError::NotDeployed(SAFE)
        );
    }

    #[tokio::test]
    async fn test_falls_back_to_relay_state() {
        let safe = TestSafe::new(3, 2, 0);
        safe.chain.fail_reads();
        let session = safe.session(0);

        assert!(matches!(
            session.load_wallet(SAFE).await,
            Err(CosignError::Chain(_))
        ));

        let owners: Vec<Address> = safe.owners.iter().map(|(a, _)| *a).collect();
        safe.relay.inner.register_safe(SafeInfo {
            address: SAFE,
            nonce: 9,
            threshold: 2,
            owners: owners.clone(),
            version: Some("1.3.0".into()),
        });
        let wallet = session.load_wallet(SAFE).await.unwrap();
        assert_eq!(wallet.owners(), owners.as_slice());
        assert_eq!(wallet.nonce(), 9);
    }
}

mod events {
    use super::*;

    #[tokio::test]
    async fn test_lifecycle_events() {
        let safe = TestSafe::new(2, 1, 0);
        let wallet = safe.wallet();
        let session = safe.session(0);
        let mut events = session.subscribe();

        let tx = build_transfer(&wallet, TransferAsset::Native, RECIPIENT, "1", 0).unwrap();
        let (hash, _) = session.sign_and_propose(&wallet, tx).await.unwrap();
        assert_eq!(
            events.try_recv().unwrap(),
            CosignEvent::Proposed {
                safe: SAFE,
                safe_tx_hash: hash,
                nonce: 0
            }
        );

        session.list_pending(&wallet).await.unwrap();
        assert_eq!(
            events.try_recv().unwrap(),
            CosignEvent::PendingRefreshed { safe: SAFE, count: 1 }
        );

        let tx_hash = session.execute(&wallet, &record(&safe, hash).await).await.unwrap();
        assert_eq!(
            events.try_recv().unwrap(),
            CosignEvent::Executed {
                safe: SAFE,
                safe_tx_hash: hash,
                tx_hash
            }
        );

        safe.session(1)
            .sign_existing(&wallet, &record(&safe, hash).await)
            .await
            .unwrap();
        assert!(events.try_recv().is_err(), "events are per session");
    }
}

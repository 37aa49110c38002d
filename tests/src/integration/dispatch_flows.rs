//! # Dispatch Flows
//!
//! Requests through the dispatcher into identity, unlock and pool creation.
//!
//! ## Properties Covered
//!
//! 1. Malformed command tags yield `InvalidCommand`
//! 2. A wrong-length token GUID fails with `ParameterError`, identity unchanged
//! 3. Setting the same token twice is a no-op the second time
//! 4. Unlocking an unencrypted dataset is an `ArgumentError` with no key load
//! 5. Unlocking an unlocked dataset is `AlreadyUnlocked` with no key load
//! 6. Unlocking a locked dataset loads the key exactly once; "already loaded" is success
//! 7. A wrong-length pool GUID fails with `InvalidGUID` before provisioning

#[cfg(test)]
mod tests {
    use super::super::*;
    use shared_storage::MemoryDataset;
    use shared_types::{fields, CommandTag, Envelope, ErrorKind, Token};

    const DATASET: &str = "zones/secure";

    fn set_token(guid_bytes: &[u8]) -> Envelope {
        request(CommandTag::SetSystemToken).with(fields::GUID, guid_bytes)
    }

    fn unlock(dataset: &str) -> Envelope {
        request(CommandTag::UnlockDataset).with(fields::DATASET, dataset)
    }

    // =========================================================================
    // COMMAND DECODING
    // =========================================================================

    #[test]
    fn test_absent_command_is_invalid_command() {
        let h = Harness::new();
        let reply = expect_error(
            h.send(Envelope::new().with(fields::POOL, SYSTEM_POOL)),
            ErrorKind::InvalidCommand,
        );
        assert_eq!(reply.message, "Unable to retrieve command value");
        assert!(!reply.cause_messages().is_empty());
    }

    #[test]
    fn test_out_of_range_command_is_invalid_command() {
        let h = Harness::new();
        for raw in [0, 11, i32::MAX, -7] {
            let reply = expect_error(
                h.send(Envelope::new().with(fields::COMMAND, raw)),
                ErrorKind::InvalidCommand,
            );
            assert_eq!(reply.message, format!("Invalid command value {raw}"));
        }
    }

    #[test]
    fn test_mistyped_command_is_invalid_command() {
        let h = Harness::new();
        expect_error(
            h.send(Envelope::new().with(fields::COMMAND, 9u32)),
            ErrorKind::InvalidCommand,
        );
    }

    #[test]
    fn test_invalid_command_touches_no_subsystem() {
        let h = Harness::new();
        h.memory.storage.add_dataset(DATASET, MemoryDataset::locked());
        expect_error(
            h.send(Envelope::new().with(fields::DATASET, DATASET)),
            ErrorKind::InvalidCommand,
        );
        assert_eq!(h.memory.storage.status_calls(), 0);
        assert_eq!(h.memory.tokens.lookups(), 0);
        assert_eq!(h.memory.provisioner.calls(), 0);
    }

    // =========================================================================
    // SYSTEM TOKEN
    // =========================================================================

    #[test]
    fn test_wrong_length_token_guid_leaves_identity_unchanged() {
        let h = Harness::new();
        h.memory.tokens.insert(Token::new(guid(1)));
        expect_success(h.send(set_token(guid(1).as_bytes())));
        let before = h.container.identity.snapshot();

        for len in [0usize, 15, 17, 32] {
            expect_error(h.send(set_token(&vec![1u8; len])), ErrorKind::ParameterError);
            assert_eq!(h.container.identity.snapshot(), before);
        }
    }

    #[test]
    fn test_missing_token_guid_is_parameter_error() {
        let h = Harness::new();
        expect_error(h.send(request(CommandTag::SetSystemToken)), ErrorKind::ParameterError);
        assert_eq!(h.container.identity.snapshot().token, None);
    }

    #[test]
    fn test_same_token_twice_is_noop() {
        let h = Harness::new();
        h.memory.tokens.insert(Token::new(guid(1)).with_label("slot-9a"));

        expect_success(h.send(set_token(guid(1).as_bytes())));
        let after_first = h.container.identity.snapshot();
        let lookups = h.memory.tokens.lookups();

        expect_success(h.send(set_token(guid(1).as_bytes())));
        assert_eq!(h.container.identity.snapshot(), after_first);
        assert_eq!(h.memory.tokens.lookups(), lookups);
    }

    #[test]
    fn test_unknown_token_propagates_not_found() {
        let h = Harness::new();
        expect_error(h.send(set_token(guid(7).as_bytes())), ErrorKind::NotFoundError);
        assert_eq!(h.container.identity.snapshot().token, None);
    }

    // =========================================================================
    // SYSTEM POOL
    // =========================================================================

    #[test]
    fn test_system_pool_validation() {
        let h = Harness::new();
        expect_error(
            h.send(request(CommandTag::SetSystemPool).with(fields::POOL, "mirror0")),
            ErrorKind::ParameterError,
        );
        expect_error(
            h.send(request(CommandTag::SetSystemPool).with(fields::POOL, "tank")),
            ErrorKind::NotFoundError,
        );
        assert_eq!(h.container.identity.snapshot().pool, None);

        h.designate_system_pool();
        assert_eq!(h.container.identity.snapshot().pool.as_deref(), Some(SYSTEM_POOL));
    }

    // =========================================================================
    // DATASET UNLOCK
    // =========================================================================

    #[test]
    fn test_unlock_unencrypted_dataset_is_argument_error() {
        let h = Harness::new();
        h.memory.storage.add_dataset(DATASET, MemoryDataset::plain());

        let reply = expect_error(h.send(unlock(DATASET)), ErrorKind::ArgumentError);
        assert!(reply.message.contains("does not appear to be encrypted"));
        assert_eq!(h.memory.storage.load_calls(), 0);
    }

    #[test]
    fn test_unlock_unlocked_dataset_is_already_unlocked() {
        let h = Harness::new();
        h.memory.storage.add_dataset(DATASET, MemoryDataset::unlocked());

        expect_error(h.send(unlock(DATASET)), ErrorKind::AlreadyUnlocked);
        assert_eq!(h.memory.storage.load_calls(), 0);
        assert_eq!(h.memory.vault.unlocks(), 0);
    }

    #[test]
    fn test_unlock_locked_dataset_loads_key_once() {
        let h = Harness::new();
        h.memory.tokens.insert(Token::new(guid(1)));
        h.memory
            .storage
            .add_dataset(DATASET, MemoryDataset::locked().with_key(b"wrapping-key".to_vec()));
        h.memory.vault.seal(DATASET, &guid(1), b"wrapping-key");
        expect_success(h.send(set_token(guid(1).as_bytes())));

        expect_success(h.send(unlock(DATASET)));
        assert_eq!(h.memory.storage.load_calls(), 1);
        assert!(h.memory.storage.is_key_loaded(DATASET));
    }

    #[test]
    fn test_unlock_already_loaded_by_another_consumer_is_success() {
        let h = Harness::new();
        h.memory.tokens.insert(Token::new(guid(1)));
        h.memory.storage.add_dataset(DATASET, MemoryDataset::locked());
        h.memory.vault.seal(DATASET, &guid(1), b"wrapping-key");
        h.memory.storage.preempt_next_load();

        expect_success(h.send(unlock(DATASET)));
        assert_eq!(h.memory.storage.load_calls(), 1);
    }

    #[test]
    fn test_unlock_without_recovery_box_fails_without_load() {
        let h = Harness::new();
        h.memory.storage.add_dataset(DATASET, MemoryDataset::locked());

        let reply = expect_error(h.send(unlock(DATASET)), ErrorKind::RecoveryBoxError);
        assert!(reply.message.contains(DATASET));
        assert_eq!(h.memory.storage.load_calls(), 0);
    }

    #[test]
    fn test_unlock_snapshot_is_parameter_error() {
        let h = Harness::new();
        expect_error(h.send(unlock("zones/secure@daily")), ErrorKind::ParameterError);
        assert_eq!(h.memory.storage.status_calls(), 0);
    }

    // =========================================================================
    // POOL CREATION
    // =========================================================================

    #[test]
    fn test_create_pool_wrong_guid_never_provisions() {
        let h = Harness::new();
        let reply = expect_error(
            h.send(request(CommandTag::CreatePool).with(fields::GUID, vec![0u8; 8])),
            ErrorKind::InvalidGUID,
        );
        assert_eq!(reply.message, "Bad guid length (8)");
        assert_eq!(h.memory.provisioner.calls(), 0);
    }

    #[test]
    fn test_create_pool_bad_template_never_provisions() {
        let h = Harness::new();
        expect_error(
            h.send(request(CommandTag::CreatePool).with(fields::TEMPLATE, b"{".to_vec())),
            ErrorKind::DecodeError,
        );
        expect_error(
            h.send(request(CommandTag::CreatePool).with(fields::DATASET, 5i32)),
            ErrorKind::ParameterError,
        );
        assert_eq!(h.memory.provisioner.calls(), 0);
    }

    #[test]
    fn test_create_pool_forwards_all_fields_once() {
        let h = Harness::new();
        let payload = expect_success(
            h.send(
                request(CommandTag::CreatePool)
                    .with(fields::DATASET, "zones/data")
                    .with(fields::GUID, guid(4).as_bytes().as_slice())
                    .with(fields::TEMPLATE, template(4))
                    .with(fields::RECOVERY_TOKEN, b"recovery".to_vec()),
            ),
        );
        assert_eq!(payload.lookup_str(fields::POOL).unwrap(), "zones/data");
        assert_eq!(payload.lookup_bytes(fields::GUID).unwrap(), guid(4).as_bytes());
        assert_eq!(h.memory.provisioner.calls(), 1);
        assert_eq!(
            h.memory.provisioner.seen(),
            vec![(Some("zones/data".to_string()), Some(guid(4)))]
        );
    }

    #[test]
    fn test_create_pool_with_no_fields_uses_defaults() {
        let h = Harness::new();
        let payload = expect_success(h.send(request(CommandTag::CreatePool)));
        assert_eq!(payload.lookup_str(fields::POOL).unwrap(), "zones");
        assert_eq!(h.memory.provisioner.seen(), vec![(None, None)]);
    }
}

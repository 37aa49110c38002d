//! # Recovery Flows
//!
//! Staging lifecycle of recovery templates and the challenge/response
//! handshake that recovers the system pool's key.
//!
//! ## Properties Covered
//!
//! - Activate and cancel with nothing staged are no-op successes
//! - Last staged template wins on activation
//! - A session whose requester exited can be taken over

#[cfg(test)]
mod tests {
    use super::super::*;
    use kb_05_recovery_session::{MemoryConfig, MemoryParty};
    use shared_storage::MemoryDataset;
    use shared_types::{fields, CommandTag, Envelope, ErrorKind, Guid};

    fn add(template: Vec<u8>, stage: bool) -> Envelope {
        request(CommandTag::AddRecovery)
            .with(fields::TEMPLATE, template)
            .with(fields::STAGE, stage)
    }

    fn installed_parts(h: &Harness) -> Vec<Guid> {
        h.memory
            .installer
            .installs()
            .iter()
            .map(|(_, t)| t.configs[0].parts[0].guid)
            .collect()
    }

    // =========================================================================
    // STAGING LIFECYCLE
    // =========================================================================

    #[test]
    fn test_activate_and_cancel_with_nothing_staged() {
        let h = Harness::new();
        h.designate_system_pool();

        expect_success(h.send(request(CommandTag::ActivateRecovery)));
        expect_success(h.send(request(CommandTag::CancelRecovery)));
        assert!(h.memory.installer.installs().is_empty());

        let listing = expect_success(h.send(request(CommandTag::ListRecovery)));
        assert!(!listing.lookup_bool(fields::STAGED).unwrap());
        assert!(!listing.contains(fields::EFFECTIVE));
    }

    #[test]
    fn test_activate_without_system_pool_when_nothing_staged() {
        let h = Harness::new();
        expect_success(h.send(request(CommandTag::ActivateRecovery)));
    }

    #[test]
    fn test_last_staged_template_wins() {
        let h = Harness::new();
        h.designate_system_pool();

        expect_success(h.send(add(template(1), true)));
        expect_success(h.send(add(template(2), true)));
        assert!(h.memory.installer.installs().is_empty());

        expect_success(h.send(request(CommandTag::ActivateRecovery)));
        assert_eq!(installed_parts(&h), vec![guid(2)]);
        assert_eq!(h.memory.installer.installs()[0].0, SYSTEM_POOL);

        let listing = expect_success(h.send(request(CommandTag::ListRecovery)));
        assert!(!listing.lookup_bool(fields::STAGED).unwrap());
        let effective = listing.lookup_envelope_array(fields::EFFECTIVE).unwrap();
        let parts = effective[0].lookup_envelope_array(fields::PARTS).unwrap();
        assert_eq!(parts[0].lookup_str(fields::GUID).unwrap(), guid(2).to_string());
        assert_eq!(parts[0].lookup_str(fields::NAME).unwrap(), "p2");
    }

    #[test]
    fn test_cancel_discards_staged() {
        let h = Harness::new();
        h.designate_system_pool();

        expect_success(h.send(add(template(1), true)));
        expect_success(h.send(request(CommandTag::CancelRecovery)));
        expect_success(h.send(request(CommandTag::ActivateRecovery)));
        assert!(h.memory.installer.installs().is_empty());
    }

    #[test]
    fn test_unstaged_add_applies_immediately() {
        let h = Harness::new();
        h.designate_system_pool();

        expect_success(h.send(add(template(3), true)));
        expect_success(h.send(add(template(5), false)));
        assert_eq!(installed_parts(&h), vec![guid(5)]);

        let listing = expect_success(h.send(request(CommandTag::ListRecovery)));
        assert!(listing.lookup_bool(fields::STAGED).unwrap());
        assert_eq!(listing.lookup_envelope_array(fields::PENDING).unwrap().len(), 1);
    }

    #[test]
    fn test_unstaged_add_requires_system_pool() {
        let h = Harness::new();
        expect_error(h.send(add(template(1), false)), ErrorKind::ArgumentError);
        assert!(h.memory.installer.installs().is_empty());
    }

    #[test]
    fn test_add_rejects_undecodable_template() {
        let h = Harness::new();
        h.designate_system_pool();
        expect_error(h.send(add(b"not json".to_vec(), true)), ErrorKind::DecodeError);
        expect_error(
            h.send(request(CommandTag::AddRecovery).with(fields::TEMPLATE, template(1))),
            ErrorKind::ParameterError,
        );

        let listing = expect_success(h.send(request(CommandTag::ListRecovery)));
        assert!(!listing.lookup_bool(fields::STAGED).unwrap());
    }

    // =========================================================================
    // RECOVERY HANDSHAKE
    // =========================================================================

    fn parties() -> Vec<MemoryParty> {
        vec![
            MemoryParty::new("alice", guid(0xA1), b"alice-secret".to_vec()),
            MemoryParty::new("bob", guid(0xB0), b"bob-secret".to_vec()),
            MemoryParty::new("carol", guid(0xC4), b"carol-secret".to_vec()),
        ]
    }

    fn recoverable() -> (Harness, Vec<MemoryParty>) {
        let h = Harness::new();
        h.memory
            .storage
            .add_dataset(SYSTEM_POOL, MemoryDataset::locked().with_key(b"pool-key".to_vec()));
        h.memory.vault.seal(SYSTEM_POOL, &guid(9), b"pool-key");
        let parties = parties();
        h.memory.challenger.register(
            SYSTEM_POOL,
            b"pool-key",
            vec![MemoryConfig {
                threshold: 2,
                parties: parties.clone(),
            }],
        );
        h.designate_system_pool();
        (h, parties)
    }

    fn answer(parties: &[MemoryParty], challenges: &[Envelope], name: &str) -> Vec<u8> {
        let challenge = challenges
            .iter()
            .find(|c| c.lookup_str(fields::PART).unwrap() == name)
            .unwrap();
        let party = parties.iter().find(|p| p.name == name).unwrap();
        party
            .answer(challenge.lookup_bytes(fields::CHALLENGE).unwrap())
            .unwrap()
    }

    fn respond(response: Vec<u8>) -> Envelope {
        request(CommandTag::RecoverResp).with(fields::RESPONSE, response)
    }

    #[test]
    fn test_two_of_three_recovers_pool_key() {
        let (h, parties) = recoverable();

        let started = expect_success(h.send(request(CommandTag::RecoverStart)));
        assert_eq!(started.lookup_u32(fields::REMAINING).unwrap(), 2);
        let challenges = started.lookup_envelope_array(fields::CHALLENGES).unwrap().to_vec();
        assert_eq!(challenges.len(), 3);

        let progress = expect_success(h.send(respond(answer(&parties, &challenges, "bob"))));
        assert_eq!(progress.lookup_u32(fields::REMAINING).unwrap(), 1);
        assert!(!progress.lookup_bool(fields::COMPLETE).unwrap());
        assert!(!h.memory.storage.is_key_loaded(SYSTEM_POOL));

        let done = expect_success(h.send(respond(answer(&parties, &challenges, "carol"))));
        assert_eq!(done.lookup_u32(fields::REMAINING).unwrap(), 0);
        assert!(done.lookup_bool(fields::COMPLETE).unwrap());
        assert!(h.memory.storage.is_key_loaded(SYSTEM_POOL));
        assert_eq!(h.container.session_api().session_owner(), None);
    }

    #[test]
    fn test_second_requester_is_refused_while_in_progress() {
        let (h, _parties) = recoverable();

        expect_success(h.send(request(CommandTag::RecoverStart)));
        let reply = expect_error(
            h.send_as(CLIENT_PID + 1, request(CommandTag::RecoverStart)),
            ErrorKind::RecoveryError,
        );
        assert!(reply.message.contains("already in progress"));
        expect_error(
            h.send_as(CLIENT_PID + 1, respond(vec![0; 32])),
            ErrorKind::RecoveryError,
        );
        assert_eq!(h.container.session_api().session_owner(), Some(CLIENT_PID));

        // same requester may restart
        expect_success(h.send(request(CommandTag::RecoverStart)));
    }

    #[test]
    fn test_session_of_exited_requester_is_reclaimed() {
        let (h, parties) = recoverable();
        let other = CLIENT_PID + 1;

        expect_success(h.send(request(CommandTag::RecoverStart)));
        h.memory.liveness.mark_exited(CLIENT_PID);

        let started = expect_success(h.send_as(other, request(CommandTag::RecoverStart)));
        assert_eq!(h.container.session_api().session_owner(), Some(other));
        let challenges = started.lookup_envelope_array(fields::CHALLENGES).unwrap().to_vec();

        expect_success(h.send_as(other, respond(answer(&parties, &challenges, "bob"))));
        let done = expect_success(h.send_as(other, respond(answer(&parties, &challenges, "carol"))));
        assert!(done.lookup_bool(fields::COMPLETE).unwrap());
        assert!(h.memory.storage.is_key_loaded(SYSTEM_POOL));
    }

    #[test]
    fn test_rejected_response_ends_session() {
        let (h, _parties) = recoverable();

        expect_success(h.send(request(CommandTag::RecoverStart)));
        let reply = h.send(respond(vec![0xEE; 32]));
        assert!(!reply.is_success());
        assert_eq!(h.container.session_api().session_owner(), None);
        expect_error(h.send(respond(vec![0xEE; 32])), ErrorKind::RecoveryError);
    }

    #[test]
    fn test_recover_start_requires_system_pool() {
        let h = Harness::new();
        expect_error(h.send(request(CommandTag::RecoverStart)), ErrorKind::ArgumentError);
        expect_error(h.send(request(CommandTag::RecoverResp)), ErrorKind::ParameterError);
    }

    #[test]
    fn test_recover_start_unknown_config() {
        let (h, _parties) = recoverable();
        let reply = h.send(request(CommandTag::RecoverStart).with(fields::CONFIG, 3u32));
        assert!(!reply.is_success());
        assert_eq!(h.container.session_api().session_owner(), None);
    }
}

use proptest::prelude::*;
use std::sync::Arc;

use orng_nullables::{NullLedger, NullResultSink};
use orng_oracle::{OracleConfig, OracleError, OracleService, RequestOutcome};
use orng_types::{Name, PermissionLevel};

fn name(s: &str) -> Name {
    Name::parse(s).unwrap()
}

fn auth(actor: &str) -> Vec<PermissionLevel> {
    vec![name(actor).active()]
}

/// A service with `keys` registered under synthetic moduli. Requests never
/// reach signature verification, so no real RSA keys are needed.
fn service(keys: u64, chance: u64) -> OracleService {
    let ledger = Arc::new(NullLedger::with_accounts(
        ["orng.wax", "oracle.wax", "dapp"].map(name),
    ));
    let mut service = OracleService::new(
        OracleConfig::default(),
        ledger,
        Arc::new(NullResultSink::new()),
    );
    for id in 0..keys {
        service
            .set_sig_pub_key(&auth("oracle.wax"), id, "10001", &format!("c{id:x}"))
            .unwrap();
    }
    if keys > 0 {
        service.set_chance(&auth("oracle.wax"), chance).unwrap();
    }
    service
}

fn request(service: &mut OracleService, signing_value: u64) -> Result<RequestOutcome, OracleError> {
    service.request_rand(&auth("dapp"), signing_value, signing_value, &name("dapp"))
}

proptest! {
    /// With scheduled rotation every key covers exactly `chance` jobs, so
    /// consecutive keys' `last` differ by `chance`.
    #[test]
    fn scheduled_rotation_spacing(chance in 1u64..8, requests in 1u64..40) {
        let keys = requests / chance + 2;
        let mut svc = service(keys, chance);
        for sv in 0..requests {
            prop_assert!(request(&mut svc, sv).is_ok());
        }

        let registry = &svc.state().keys;
        let lasts: Vec<u64> = registry.keys().filter_map(|k| k.last).collect();
        prop_assert_eq!(lasts[0], chance - 1);
        for pair in lasts.windows(2) {
            prop_assert_eq!(pair[1] - pair[0], chance);
        }
        let active = registry.active_key().unwrap().id;
        prop_assert_eq!(active, (requests - 1) / chance);
    }

    /// Accepted requests get contiguous ids no matter how many were
    /// rejected in between.
    #[test]
    fn job_ids_contiguous(values in proptest::collection::vec(0u64..20, 1..40)) {
        let mut svc = service(1, 1_000);
        let mut expected = 0;
        for sv in values {
            match request(&mut svc, sv) {
                Ok(RequestOutcome::Queued(id)) => {
                    prop_assert_eq!(id, expected);
                    expected += 1;
                }
                Err(OracleError::DuplicateSigningValue(dup)) => prop_assert_eq!(dup, sv),
                other => prop_assert!(false, "unexpected outcome {:?}", other),
            }
        }
        prop_assert_eq!(svc.state().jobs.len() as u64, expected);
    }

    /// Only the next counter value is accepted as a key id.
    #[test]
    fn out_of_order_key_ids_rejected(registered in 0u64..5, offset in 1u64..10, below in any::<bool>()) {
        let mut svc = service(registered, 10);
        let id = if below {
            match registered.checked_sub(offset) {
                Some(id) => id,
                None => return Ok(()),
            }
        } else {
            registered + offset
        };
        let result = svc.set_sig_pub_key(&auth("oracle.wax"), id, "10001", "fedcba");
        let is_out_of_order = matches!(result, Err(OracleError::OutOfOrderKey { .. }));
        prop_assert!(is_out_of_order);
    }

    /// A modulus with a leading zero nibble is refused whatever the exponent.
    #[test]
    fn leading_zero_modulus_rejected(exponent in "[0-9a-f]{1,8}", rest in "[0-9a-f]{0,32}") {
        let mut svc = service(0, 10);
        let result = svc.set_sig_pub_key(&auth("oracle.wax"), 0, &exponent, &format!("0{rest}"));
        let is_leading_zero = matches!(result, Err(OracleError::LeadingZeroModulus));
        prop_assert!(is_leading_zero);
    }

    /// Capping a dapp at its in-flight count blocks the next request; one
    /// more slot lets the identical request through.
    #[test]
    fn quota_boundary(in_flight in 0u64..10) {
        let mut svc = service(1, 1_000);
        for sv in 0..in_flight {
            prop_assert!(request(&mut svc, sv).is_ok());
        }
        svc.set_max_jobs(&auth("orng.wax"), &name("dapp"), in_flight).unwrap();
        let is_full = matches!(request(&mut svc, 999), Err(OracleError::QueueFull { .. }));
        prop_assert!(is_full);

        svc.set_max_jobs(&auth("orng.wax"), &name("dapp"), in_flight + 1).unwrap();
        prop_assert_eq!(request(&mut svc, 999).unwrap(), RequestOutcome::Queued(in_flight));
    }

    /// With cap C, appending C + 2 errors leaves the newest C.
    #[test]
    fn error_log_ring(cap in 0u64..8) {
        let mut svc = service(1, 1_000);
        request(&mut svc, 1).unwrap();
        let dapp = name("dapp");
        svc.set_error_size(&auth("dapp"), &dapp, cap).unwrap();

        let log_auth = vec![dapp.permission("ornglog").unwrap()];
        for i in 0..cap + 2 {
            svc.dapp_error(&log_auth, &dapp, 0, &i.to_string()).unwrap();
        }

        let kept: Vec<u64> = svc
            .state()
            .error_log
            .entries(&dapp)
            .map(|e| e.message.parse().unwrap())
            .collect();
        let expected: Vec<u64> = (2..cap + 2).collect();
        prop_assert_eq!(kept, expected);
    }
}

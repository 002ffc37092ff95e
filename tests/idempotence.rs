//! Property tests: patching twice equals patching once.

use proptest::prelude::*;
use zod_client_patcher::rules::DEFAULT_BANNER;
use zod_client_patcher::{load_from_str, Patcher};

/// Source fragments a generated client is made of, including already
/// patched calls, near misses and whitespace around the key argument.
fn fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("z.record(".to_string()),
        Just(".record(".to_string()),
        Just("z.string()".to_string()),
        Just("z.string(), ".to_string()),
        Just("z.record(z.string(), ".to_string()),
        Just("z.record( z.string() ,".to_string()),
        Just("z.records(".to_string()),
        Just(DEFAULT_BANNER.to_string()),
        Just(")".to_string()),
        Just(",".to_string()),
        Just("\n".to_string()),
        "[a-zA-Z_$ .(){},;\n]{0,12}",
    ]
}

fn source() -> impl Strategy<Value = String> {
    prop::collection::vec(fragment(), 0..24).prop_map(|parts| parts.concat())
}

/// Key types a user might write, including padded ones and ones that would
/// be matched as record calls; validation decides which are accepted.
fn key_type() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("z.string()".to_string()),
        Just(" z.string()".to_string()),
        Just("z.string() ".to_string()),
        Just("z.string().record(".to_string()),
        Just("z.record(z.string())".to_string()),
        Just("z.enum(['a'])".to_string()),
        "[ a-z.()]{0,12}",
    ]
}

fn banner_text() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(DEFAULT_BANNER.to_string()),
        Just("// fix .record( calls".to_string()),
        Just("/* z.record(T) */".to_string()),
        Just(" // padded".to_string()),
        "[ a-zA-Z/*.()@-]{0,24}",
    ]
}

proptest! {
    #[test]
    fn configured_patch_is_idempotent(
        key in key_type(),
        banner in banner_text(),
        body in source(),
        starts_with_banner in any::<bool>(),
    ) {
        let toml = format!("[banner]\ntext = \"{banner}\"\n\n[record]\nkey_type = \"{key}\"\n");
        let config = load_from_str(&toml);
        prop_assume!(config.is_ok());
        let patcher = Patcher::from_config(&config.unwrap());

        let input = if starts_with_banner {
            format!("{banner}{body}")
        } else {
            body
        };
        let once = patcher.transform(&input).unwrap();
        let twice = patcher.transform(&once.contents).unwrap();

        prop_assert_eq!(&twice.contents, &once.contents);
        prop_assert!(twice.is_noop());
        prop_assert!(once.contents.starts_with(banner.as_str()));
    }

    #[test]
    fn patch_is_idempotent(input in source()) {
        let patcher = Patcher::default();
        let once = patcher.transform(&input).unwrap();
        let twice = patcher.transform(&once.contents).unwrap();

        prop_assert_eq!(&twice.contents, &once.contents);
        prop_assert!(twice.is_noop());
    }

    #[test]
    fn output_starts_with_banner(input in source()) {
        let out = Patcher::default().transform(&input).unwrap();

        prop_assert!(out.contents.starts_with(DEFAULT_BANNER));
        if !input.starts_with(DEFAULT_BANNER) {
            let expected = format!("{DEFAULT_BANNER}\n");
            prop_assert!(out.contents.starts_with(&expected));
        }
    }

    #[test]
    fn every_record_call_has_key(input in source()) {
        let out = Patcher::default().transform(&input).unwrap();

        for (idx, _) in out.contents.match_indices(".record(") {
            let rest = &out.contents[idx + ".record(".len()..];
            prop_assert!(
                zod_client_patcher::call_site_already_has_string_key(rest, "z.string()"),
                "call at {} lacks key: {:?}",
                idx,
                out.contents
            );
        }
    }
}

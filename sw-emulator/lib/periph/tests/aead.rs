// Licensed under the Apache-2.0 license

use se_emu_periph::testing::HostDriver;
use se_emu_periph::{CommandId, KeyMetadata, KeyMode, ResponseCode, SecureElementConfig};

fn host() -> HostDriver {
    HostDriver::new(SecureElementConfig {
        rng_seed: Some(9),
        ..Default::default()
    })
}

fn key_meta(key: &[u8]) -> u32 {
    KeyMetadata::raw(KeyMode::Unprotected, 0, key.len() as u16).into()
}

#[test]
fn test_gcm_round_trip() {
    let mut host = host();
    let key = [0x11u8; 32];
    let iv = [0x22u8; 12];
    let aad = b"header";
    let pt = b"attack at dawn, bring snacks";
    let params = [key_meta(&key), 16, aad.len() as u32, pt.len() as u32];

    let (code, out) = host
        .run(
            CommandId::AesGcmEncrypt,
            0,
            &[b"", &key, &iv, aad, pt],
            &[pt.len(), 16],
            &params,
        )
        .unwrap();
    assert_eq!(code, ResponseCode::Ok);
    let (ct, tag) = (out[0].clone(), out[1].clone());
    assert_ne!(ct, pt);

    let (code, dec) = host
        .run(
            CommandId::AesGcmDecrypt,
            0,
            &[b"", &key, &iv, aad, &ct, &tag],
            &[pt.len()],
            &params,
        )
        .unwrap();
    assert_eq!(code, ResponseCode::Ok);
    assert_eq!(dec[0], pt);

    let mut bad_tag = tag.clone();
    bad_tag[0] ^= 1;
    let (code, dec) = host
        .run(
            CommandId::AesGcmDecrypt,
            0,
            &[b"", &key, &iv, aad, &ct, &bad_tag],
            &[pt.len()],
            &params,
        )
        .unwrap();
    assert_eq!(code, ResponseCode::CryptoError);
    // Plaintext is written before the tag is checked
    assert_eq!(dec[0], pt);
}

#[test]
fn test_gcm_truncated_tag() {
    let mut host = host();
    let key = [0x33u8; 16];
    let iv = [0x44u8; 12];
    let pt = [0x55u8; 40];
    let params = [key_meta(&key), 8, 1, pt.len() as u32];

    let (code, out) = host
        .run(CommandId::AesGcmEncrypt, 0, &[b"", &key, &iv, b"a", &pt], &[40, 8], &params)
        .unwrap();
    assert_eq!(code, ResponseCode::Ok);
    let (code, dec) = host
        .run(
            CommandId::AesGcmDecrypt,
            0,
            &[b"", &key, &iv, b"a", &out[0], &out[1]],
            &[40],
            &params,
        )
        .unwrap();
    assert_eq!(code, ResponseCode::Ok);
    assert_eq!(dec[0], pt);
}

#[test]
fn test_gcm_parameter_checks() {
    let mut host = host();
    let key = [0u8; 16];
    let inputs: [&[u8]; 5] = [b"", &key, &[0; 12], b"a", &[0; 16]];

    // Tag length outside the allowed set
    let (code, _) = host
        .run(CommandId::AesGcmEncrypt, 0, &inputs, &[16, 16], &[key_meta(&key), 5, 1, 16])
        .unwrap();
    assert_eq!(code, ResponseCode::InvalidParameter);

    // Only whole messages are supported
    let (code, _) = host
        .run(CommandId::AesGcmEncrypt, 0x0010, &inputs, &[16, 16], &[key_meta(&key), 16, 1, 16])
        .unwrap();
    assert_eq!(code, ResponseCode::Abort);

    // IV descriptor of the wrong size
    let (code, _) = host
        .run(
            CommandId::AesGcmEncrypt,
            0,
            &[b"", &key, &[0; 16], b"a", &[0; 16]],
            &[16, 16],
            &[key_meta(&key), 16, 1, 16],
        )
        .unwrap();
    assert_eq!(code, ResponseCode::InvalidParameter);
}

#[test]
fn test_ccm_short_nonce_rejected() {
    // NIST SP 800-38C example 1 uses a 7 byte nonce
    let mut host = host();
    let key = hex::decode("404142434445464748494a4b4c4d4e4f").unwrap();
    let nonce = hex::decode("10111213141516").unwrap();
    let aad = hex::decode("0001020304050607").unwrap();
    let pt = hex::decode("20212223").unwrap();
    let params = [key_meta(&key), 4 | (7 << 16), 8, 4];

    let (code, _) = host
        .run(CommandId::AesCcmEncrypt, 0, &[b"", &key, &nonce, &aad, &pt], &[4, 4], &params)
        .unwrap();
    assert_eq!(code, ResponseCode::InvalidParameter);
}

#[test]
fn test_ccm_round_trip() {
    let mut host = host();
    let key = [0x66u8; 16];
    let nonce = [0x77u8; 13];
    let aad = b"associated";
    let pt = b"ccm protected payload";
    let params = [
        key_meta(&key),
        16 | (13 << 16),
        aad.len() as u32,
        pt.len() as u32,
    ];

    let (code, out) = host
        .run(
            CommandId::AesCcmEncrypt,
            0,
            &[b"", &key, &nonce, aad, pt],
            &[pt.len(), 16],
            &params,
        )
        .unwrap();
    assert_eq!(code, ResponseCode::Ok);

    let (code, dec) = host
        .run(
            CommandId::AesCcmDecrypt,
            0,
            &[b"", &key, &nonce, aad, &out[0], &out[1]],
            &[pt.len()],
            &params,
        )
        .unwrap();
    assert_eq!(code, ResponseCode::Ok);
    assert_eq!(dec[0], pt);

    let mut bad_tag = out[1].clone();
    bad_tag[15] ^= 0x80;
    let (code, dec) = host
        .run(
            CommandId::AesCcmDecrypt,
            0,
            &[b"", &key, &nonce, aad, &out[0], &bad_tag],
            &[pt.len()],
            &params,
        )
        .unwrap();
    assert_eq!(code, ResponseCode::CryptoError);
    assert_eq!(dec[0], pt);
}

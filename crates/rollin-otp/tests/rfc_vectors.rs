//! End-to-end checks through the public API: encoded secret in, code out.

use rollin_otp::otp::{
    Algorithm, Base32Codec, EvaluatorConfig, HexCodec, KeyEncoding, OtpErrorKind, OtpEvaluator,
    OtpKind, OtpParameters, SecretBuffer,
};

const RFC4226_ASCII: &[u8] = b"12345678901234567890";

fn seed(algo: Algorithm) -> &'static [u8] {
    match algo {
        Algorithm::Sha1 => &b"12345678901234567890"[..],
        Algorithm::Sha256 => &b"12345678901234567890123456789012"[..],
        Algorithm::Sha512 => {
            &b"1234567890123456789012345678901234567890123456789012345678901234"[..]
        }
    }
}

// ── RFC 4226 Appendix D through Base32 ───────────────────────────────

#[test]
fn hotp_appendix_d_from_base32_secret() {
    let secret = Base32Codec::encode(RFC4226_ASCII);
    assert_eq!(secret, "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ");

    let expected = [
        "755224", "287082", "359152", "969429", "338314",
        "254676", "287922", "162583", "399871", "520489",
    ];
    let eval = OtpEvaluator::new();
    for (counter, exp) in expected.iter().enumerate() {
        let params = OtpParameters::hotp("rfc4226", secret.as_str(), counter as u64);
        let code = eval.evaluate(&params).unwrap();
        assert_eq!(&code.code, exp, "counter {}", counter);
        assert_eq!(code.kind, OtpKind::Hotp);
    }
}

// ── RFC 6238 Appendix B through Hex ──────────────────────────────────

#[test]
fn totp_appendix_b_from_hex_secret() {
    let table: &[(u64, &str, &str, &str)] = &[
        (59, "94287082", "46119246", "90693936"),
        (1111111109, "07081804", "68084774", "25091201"),
        (1111111111, "14050471", "67062674", "99943326"),
        (1234567890, "89005924", "91819424", "93441116"),
        (2000000000, "69279037", "90698825", "38618901"),
        (20000000000, "65353130", "77737706", "47863826"),
    ];
    let eval = OtpEvaluator::new();
    for &(time, sha1, sha256, sha512) in table {
        for (algo, exp) in [
            (Algorithm::Sha1, sha1),
            (Algorithm::Sha256, sha256),
            (Algorithm::Sha512, sha512),
        ] {
            let id = format!("{}-{}", algo, time);
            let params = OtpParameters::totp(id, HexCodec::encode(seed(algo)))
                .with_encoding(KeyEncoding::Hex)
                .with_algorithm(algo)
                .with_digits(8);
            let code = eval.evaluate_at(&params, time).unwrap();
            assert_eq!(code.code, exp, "{} at {}", algo, time);
            assert_eq!(code.elapsed_seconds as u64, time % 30);
        }
    }
}

// ── Tag parsing feeds the evaluator ──────────────────────────────────

#[test]
fn parameters_from_stored_ids() {
    let mut params = OtpParameters::totp(
        "stored",
        "31:32:33:34:35:36:37:38:39:30:31:32:33:34:35:36:37:38:39:30",
    );
    params.encoding = KeyEncoding::from_id(0).unwrap();
    params.kind = OtpKind::from_id(1).unwrap();
    params.algorithm = Algorithm::from_id(0).unwrap();
    params.counter = 9;
    assert_eq!(OtpEvaluator::new().evaluate(&params).unwrap().code, "520489");

    let err = Algorithm::from_id(7).unwrap_err();
    assert_eq!(err.kind, OtpErrorKind::UnknownAlgorithm);
}

#[test]
fn parameters_survive_json() {
    let params = OtpParameters::totp("json", "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ")
        .with_algorithm(Algorithm::Sha256)
        .with_digits(7);
    let json = serde_json::to_string(&params).unwrap();
    let back: OtpParameters = serde_json::from_str(&json).unwrap();
    let eval = OtpEvaluator::new();
    assert_eq!(
        eval.evaluate_at(&params, 1234).unwrap().code,
        eval.evaluate_at(&back, 1234).unwrap().code
    );
}

// ── Errors come back as values ───────────────────────────────────────

#[test]
fn failures_are_typed() {
    let eval = OtpEvaluator::with_config(EvaluatorConfig {
        normalise_base32: false,
        ..EvaluatorConfig::default()
    });
    let cases = [
        (OtpParameters::totp("short", "1234"), OtpErrorKind::DecodeFailure),
        (
            OtpParameters::totp("odd", "ABC").with_encoding(KeyEncoding::Hex),
            OtpErrorKind::DecodeFailure,
        ),
        (
            OtpParameters::totp("digits", "GEZDGNBV").with_digits(4),
            OtpErrorKind::InvalidParameters,
        ),
        (
            OtpParameters::totp("step", "GEZDGNBV").with_time_step(0),
            OtpErrorKind::InvalidParameters,
        ),
    ];
    for (params, kind) in cases {
        let err = eval.evaluate_at(&params, 59).unwrap_err();
        assert_eq!(err.kind, kind, "{}", params.identifier);
        assert!(!err.to_string().is_empty());
    }
}

// ── Codecs and buffer together ───────────────────────────────────────

#[test]
fn codecs_decode_into_equal_buffers() {
    let from_b32 = Base32Codec::decode("GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ").unwrap();
    let from_hex = HexCodec::decode("0x3132333435363738393031323334353637383930").unwrap();
    assert_eq!(from_b32, from_hex);
    assert_eq!(from_b32, SecretBuffer::from_bytes(RFC4226_ASCII));
    assert!(!format!("{:?}", from_b32).contains("3132"));
}

#[test]
fn empty_inputs() {
    assert_eq!(Base32Codec::encode(&[]), "");
    assert_eq!(HexCodec::encode(&[]), "");
    assert!(Base32Codec::decode("").unwrap().is_empty());
    assert!(HexCodec::decode("").unwrap().is_empty());
}

//! Step-level behavior across chunk boundaries.

use circuit::{
    locate_value, split_padded, AuthenticationWitness, CipherSuite, CircuitParams, Fr,
    HttpMachineState, HttpVerification, HttpWitness, JsonExtraction, JsonParserState,
    JsonWitness, KeyPathElement, PlaintextAuthentication, PublicIo, Step, StepError,
    BODY_LENGTH, CIPHERTEXT_CARRY, GLOBAL_DIGEST, HEADERS_DIGEST, HTTP_LENGTH,
    HTTP_MACHINE_STATE, JSON_LENGTH, JSON_STATE, NONCE_LEN, PLAINTEXT_LENGTH,
    SEQUENCE_DIGEST_HASH, UNMATCHED_STATEMENTS,
};
use commit::{data_hasher, hash_one, polynomial_digest, sequence_digest};
use p3_field::PrimeCharacteristicRing;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const RESPONSE_HEAD: &[u8] =
    b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nX-Request-Id: 42\r\n\r\n";

const TAYLOR: &[u8] =
    br#"{"data":{"items":[{"data":"Artist","profile":{"name":"Taylor Swift"}}]}}"#;

fn taylor_path() -> Vec<KeyPathElement> {
    vec![
        KeyPathElement::Object("data".into()),
        KeyPathElement::Object("items".into()),
        KeyPathElement::ArrayIndex(0),
        KeyPathElement::Object("profile".into()),
        KeyPathElement::Object("name".into()),
    ]
}

fn params(data_bytes: usize) -> CircuitParams {
    CircuitParams::new(data_bytes, 5, 4).expect("valid params")
}

fn challenge() -> Fr {
    Fr::from_canonical_u64(0x1234_5678_9abc_def1)
}

fn main_digests(x: Fr, lines: &[&str], params: &CircuitParams) -> Vec<Fr> {
    let mut digests: Vec<Fr> = lines
        .iter()
        .map(|l| polynomial_digest(l.as_bytes(), x, 0))
        .collect();
    digests.resize(params.main_digests_len(), Fr::ZERO);
    digests
}

fn http_step_in(x: Fr, plaintext: &[u8], statements: u64) -> PublicIo {
    let mut io = PublicIo::zero();
    io[GLOBAL_DIGEST] = polynomial_digest(plaintext, x, 0);
    io[HTTP_LENGTH] = Fr::ONE;
    io[UNMATCHED_STATEMENTS] = Fr::from_canonical_u64(statements);
    io[BODY_LENGTH] = Fr::ONE;
    io
}

fn run_http(
    params: CircuitParams,
    x: Fr,
    plaintext: &[u8],
    digests: &[Fr],
    mut io: PublicIo,
) -> Result<(PublicIo, Vec<u8>), StepError> {
    let step = HttpVerification::new(params);
    let mut machine_state = HttpMachineState::default().to_fields();
    let mut body = Vec::new();
    for chunk in split_padded(plaintext, params.data_bytes) {
        let out = step.step(
            &io,
            &HttpWitness {
                data: chunk,
                ciphertext_digest: x,
                machine_state,
                main_digests: digests.to_vec(),
            },
        )?;
        io = out.step_out;
        machine_state = out.carry.machine_state;
        body.extend(out.carry.body);
    }
    Ok((io, body))
}

fn json_step_in(x: Fr, body: &[u8], seq: Fr) -> PublicIo {
    let mut io = PublicIo::zero();
    io[GLOBAL_DIGEST] = polynomial_digest(body, x, 0);
    io[BODY_LENGTH] = x.exp_u64(body.len() as u64);
    io[JSON_LENGTH] = Fr::ONE;
    io[SEQUENCE_DIGEST_HASH] = hash_one(seq);
    io
}

fn run_json(
    params: CircuitParams,
    x: Fr,
    body: &[u8],
    seq: Fr,
    value_digest: Fr,
    mut io: PublicIo,
) -> Result<PublicIo, StepError> {
    let step = JsonExtraction::new(params);
    let mut state = JsonParserState::new(params.max_stack_height).to_fields();
    for chunk in split_padded(body, params.data_bytes) {
        let out = step.step(
            &io,
            &JsonWitness {
                data: chunk,
                ciphertext_digest: x,
                sequence_digest: seq,
                value_digest,
                state,
            },
        )?;
        io = out.step_out;
        state = out.carry;
    }
    Ok(io)
}

#[test]
fn authentication_is_chunk_size_invariant() {
    let mut rng = StdRng::seed_from_u64(42);
    let plaintext: Vec<u8> = (0..333).map(|_| rng.random()).collect();
    let suite = CipherSuite::Aes256Gcm;
    let key: Vec<u8> = (0..32).map(|_| rng.random()).collect();
    let nonce: [u8; NONCE_LEN] = rng.random();

    let mut ciphertext = plaintext.clone();
    suite
        .apply_keystream(&key, &nonce, suite.initial_counter(), &mut ciphertext)
        .expect("encrypt");

    let mut results = Vec::new();
    for data_bytes in [64, 128, 256, 512] {
        let chunks = split_padded(&ciphertext, data_bytes);
        let x = chunks.iter().fold(Fr::ZERO, |acc, c| data_hasher(c, acc));

        let step = PlaintextAuthentication::new(params(data_bytes));
        let mut io = PublicIo::zero();
        io[GLOBAL_DIGEST] = x;
        io[PLAINTEXT_LENGTH] = Fr::ONE;

        for (i, chunk) in chunks.into_iter().enumerate() {
            let witness = AuthenticationWitness {
                suite,
                key: key.clone(),
                nonce,
                counter: suite.counter_at(i * data_bytes),
                ciphertext: chunk,
                ciphertext_digest: x,
            };
            io = step.step(&io, &witness).expect("step").step_out;
        }

        assert_eq!(io[GLOBAL_DIGEST], polynomial_digest(&plaintext, x, 0));
        assert_eq!(io[PLAINTEXT_LENGTH], x.exp_u64(plaintext.len() as u64));
        assert_eq!(io[CIPHERTEXT_CARRY], x);
        results.push(io);
    }

    // Padding-only words are skipped, so the digest does not depend on chunking.
    assert!(results.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn wrong_key_leaves_ciphertext_in_ledger() {
    let suite = CipherSuite::Aes128Gcm;
    let nonce = [3u8; NONCE_LEN];
    let plaintext = b"HTTP/1.1 200 OK\r\n\r\n".to_vec();
    let mut ciphertext = plaintext.clone();
    suite
        .apply_keystream(&[1u8; 16], &nonce, 2, &mut ciphertext)
        .expect("encrypt");
    let chunk = split_padded(&ciphertext, 64).remove(0);
    let x = data_hasher(&chunk, Fr::ZERO);

    let mut io = PublicIo::zero();
    io[GLOBAL_DIGEST] = x;
    io[PLAINTEXT_LENGTH] = Fr::ONE;
    let out = PlaintextAuthentication::new(params(64))
        .step(
            &io,
            &AuthenticationWitness {
                suite,
                key: vec![2u8; 16],
                nonce,
                counter: 2,
                ciphertext: chunk,
                ciphertext_digest: x,
            },
        )
        .expect("step");

    assert_ne!(out.step_out[GLOBAL_DIGEST], polynomial_digest(&plaintext, x, 0));
}

#[test]
fn chacha_counter_overflow_is_an_error() {
    let suite = CipherSuite::ChaCha20Poly1305;
    let chunk = split_padded(&[0u8; 128], 128).remove(0);
    let x = data_hasher(&chunk, Fr::ZERO);

    let mut io = PublicIo::zero();
    io[GLOBAL_DIGEST] = x;
    io[PLAINTEXT_LENGTH] = Fr::ONE;
    let err = PlaintextAuthentication::new(params(128))
        .step(
            &io,
            &AuthenticationWitness {
                suite,
                key: vec![9u8; 32],
                nonce: [0u8; NONCE_LEN],
                counter: u32::MAX,
                ciphertext: chunk,
                ciphertext_digest: x,
            },
        )
        .unwrap_err();
    assert_eq!(
        err,
        StepError::CounterOverflow {
            counter: u32::MAX,
            len: 128
        }
    );
}

#[test]
fn http_matches_declared_lines() {
    let x = challenge();
    let p = params(64);
    let response = [RESPONSE_HEAD, TAYLOR].concat();
    let digests = main_digests(
        x,
        &["HTTP/1.1 200 OK", "content-type: application/json"],
        &p,
    );

    let (io, body) = run_http(p, x, &response, &digests, http_step_in(x, &response, 2))
        .expect("valid response");

    assert_eq!(body, TAYLOR);
    assert_eq!(io[GLOBAL_DIGEST], polynomial_digest(TAYLOR, x, 0));
    assert_eq!(io[HTTP_LENGTH], x.exp_u64(response.len() as u64));
    assert_eq!(io[HTTP_MACHINE_STATE], HttpMachineState::in_body().digest(x));
    assert_eq!(io[HTTP_MACHINE_STATE], Fr::from_canonical_u64(5));
    assert_eq!(io[UNMATCHED_STATEMENTS], Fr::ZERO);
    assert_eq!(
        io[HEADERS_DIGEST],
        digests[0..2].iter().copied().map(hash_one).sum::<Fr>()
    );
    assert_eq!(io[BODY_LENGTH], x.exp_u64(TAYLOR.len() as u64));
}

#[test]
fn http_wrong_header_value_stays_unmatched() {
    let x = challenge();
    let p = params(64);
    let response = [RESPONSE_HEAD, TAYLOR].concat();
    let digests = main_digests(
        x,
        &["HTTP/1.1 200 OK", "content-type: text/html"],
        &p,
    );

    let (io, _) = run_http(p, x, &response, &digests, http_step_in(x, &response, 2))
        .expect("valid response");
    assert_eq!(io[UNMATCHED_STATEMENTS], Fr::ONE);
}

#[test]
fn http_rejects_foreign_machine_state() {
    let x = challenge();
    let p = params(64);
    let response = [RESPONSE_HEAD, TAYLOR].concat();
    let digests = main_digests(x, &["HTTP/1.1 200 OK"], &p);
    let chunks = split_padded(&response, 64);

    let step = HttpVerification::new(p);
    let first = step
        .step(
            &http_step_in(x, &response, 1),
            &HttpWitness {
                data: chunks[0].clone(),
                ciphertext_digest: x,
                machine_state: HttpMachineState::default().to_fields(),
                main_digests: digests.clone(),
            },
        )
        .expect("first chunk");

    // Resume the second chunk from the initial state instead of the carry.
    let err = step
        .step(
            &first.step_out,
            &HttpWitness {
                data: chunks[1].clone(),
                ciphertext_digest: x,
                machine_state: HttpMachineState::default().to_fields(),
                main_digests: digests,
            },
        )
        .unwrap_err();
    assert_eq!(err, StepError::MachineStateMismatch);
}

#[test]
fn http_repeated_declared_header_counts_once() {
    let x = challenge();
    let p = params(64);
    let response = b"HTTP/1.1 200 OK\r\nSet-Cookie: a=1\r\nSet-Cookie: a=1\r\n\r\n{}";
    let digests = main_digests(x, &["HTTP/1.1 200 OK", "set-cookie: a=1"], &p);

    let (io, body) = run_http(p, x, response, &digests, http_step_in(x, response, 2))
        .expect("valid response");

    assert_eq!(body, b"{}");
    assert_eq!(io[UNMATCHED_STATEMENTS], Fr::ZERO);
    assert_eq!(
        io[HEADERS_DIGEST],
        digests[0..2].iter().copied().map(hash_one).sum::<Fr>()
    );
    assert_eq!(io[HTTP_MACHINE_STATE], HttpMachineState::in_body().digest(x));
}

#[test]
fn http_repeated_header_matches_each_declared_copy() {
    let x = challenge();
    let p = params(64);
    let response = b"HTTP/1.1 200 OK\r\nVary: Origin\r\nVary: Origin\r\n\r\n";
    let lines = ["HTTP/1.1 200 OK", "vary: Origin", "vary: Origin"];
    let digests = main_digests(x, &lines, &p);

    let (io, _) = run_http(p, x, response, &digests, http_step_in(x, response, 3))
        .expect("valid response");
    assert_eq!(io[UNMATCHED_STATEMENTS], Fr::ZERO);
    assert_eq!(
        io[HEADERS_DIGEST],
        digests[0..3].iter().copied().map(hash_one).sum::<Fr>()
    );
}

#[test]
fn http_rejects_bare_lf() {
    let x = challenge();
    let p = params(64);
    let response = b"HTTP/1.1 200 OK\nContent-Type: a\r\n\r\n";
    let digests = main_digests(x, &[], &p);
    let err = run_http(p, x, response, &digests, http_step_in(x, response, 0)).unwrap_err();
    assert!(matches!(err, StepError::MalformedHttp { offset: 15, .. }));
}

#[test]
fn json_extracts_taylor_swift() {
    let x = challenge();
    let p = params(64);
    let seq = sequence_digest(x, &taylor_path(), p.max_stack_height).expect("fits");
    let value_digest = polynomial_digest(b"Taylor Swift", x, 0);

    let io = run_json(p, x, TAYLOR, seq, value_digest, json_step_in(x, TAYLOR, seq))
        .expect("valid json");

    assert_eq!(io[GLOBAL_DIGEST], value_digest);
    assert_eq!(io[JSON_LENGTH], io[BODY_LENGTH]);
    assert_eq!(io[JSON_STATE], Fr::ZERO);
}

#[test]
fn json_missing_path_leaves_zero() {
    let x = challenge();
    let p = params(64);
    let path = [
        KeyPathElement::Object("data".into()),
        KeyPathElement::Object("missing".into()),
    ];
    let seq = sequence_digest(x, &path, p.max_stack_height).expect("fits");

    let io = run_json(p, x, TAYLOR, seq, Fr::ZERO, json_step_in(x, TAYLOR, seq))
        .expect("valid json");
    assert_eq!(io[GLOBAL_DIGEST], Fr::ZERO);
    assert_eq!(io[JSON_STATE], Fr::ZERO);
}

#[test]
fn json_container_value_does_not_match() {
    let x = challenge();
    let p = params(64);
    let path = [KeyPathElement::Object("a".into())];
    let seq = sequence_digest(x, &path, p.max_stack_height).expect("fits");

    let bodies: [&[u8]; 3] = [br#"{"a":{}}"#, br#"{"a":[1,2]}"#, br#"{"a":{"a":"x"}}"#];
    for body in bodies {
        assert_eq!(locate_value(body, x, seq, p.max_stack_height), Ok(None));

        let claimed = polynomial_digest(&body[5..body.len() - 1], x, 0);
        let io = run_json(p, x, body, seq, claimed, json_step_in(x, body, seq))
            .expect("valid json");
        assert_eq!(io[GLOBAL_DIGEST], Fr::ZERO);
        assert_eq!(io[JSON_STATE], Fr::ZERO);
    }
}

#[test]
fn json_wrong_value_digest_does_not_match() {
    let x = challenge();
    let p = params(64);
    let seq = sequence_digest(x, &taylor_path(), p.max_stack_height).expect("fits");
    let claimed = polynomial_digest(b"Someone Else", x, 0);

    let io = run_json(p, x, TAYLOR, seq, claimed, json_step_in(x, TAYLOR, seq))
        .expect("valid json");
    assert_eq!(io[GLOBAL_DIGEST], Fr::ZERO);
    assert_ne!(io[GLOBAL_DIGEST], claimed);
}

#[test]
fn json_rejects_wrong_sequence_digest() {
    let x = challenge();
    let p = params(64);
    let seq = sequence_digest(x, &taylor_path(), p.max_stack_height).expect("fits");
    let io = json_step_in(x, TAYLOR, seq);

    let err = run_json(p, x, TAYLOR, seq + Fr::ONE, Fr::ZERO, io).unwrap_err();
    assert_eq!(err, StepError::SequenceDigestMismatch);
}

#[test]
fn json_rejects_deep_nesting() {
    let x = challenge();
    let p = CircuitParams::new(64, 2, 4).expect("valid");
    let body = br#"{"a":{"b":{"c":1}}}"#;
    let seq = Fr::ZERO;
    let err = run_json(p, x, body, seq, Fr::ZERO, json_step_in(x, body, seq)).unwrap_err();
    assert_eq!(err, StepError::StackOverflow(2));
}

fn final_http(data_bytes: usize, response: &[u8]) -> (PublicIo, Vec<u8>) {
    let x = challenge();
    let p = params(data_bytes);
    let digests = main_digests(
        x,
        &["HTTP/1.1 200 OK", "x-request-id: 42"],
        &p,
    );
    run_http(p, x, response, &digests, http_step_in(x, response, 2)).expect("valid response")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn http_is_chunk_size_invariant(
        body in prop::collection::vec(any::<u8>(), 0..300),
        data_bytes in prop::sample::select(vec![64usize, 128, 192, 256]),
    ) {
        let response = [RESPONSE_HEAD, body.as_slice()].concat();
        let (whole, whole_body) = final_http(1024, &response);
        let (chunked, chunked_body) = final_http(data_bytes, &response);

        prop_assert_eq!(whole, chunked);
        prop_assert_eq!(&whole_body, &body);
        prop_assert_eq!(chunked_body, body);
    }

    #[test]
    fn json_is_chunk_size_invariant(
        data_bytes in prop::sample::select(vec![64usize, 128, 192]),
        padding in 0usize..40,
    ) {
        let x = challenge();
        // Whitespace before the document shifts every chunk boundary.
        let body = [vec![b' '; padding].as_slice(), TAYLOR].concat();
        let seq = sequence_digest(x, &taylor_path(), 5).expect("fits");
        let value_digest = polynomial_digest(b"Taylor Swift", x, 0);

        let io = json_step_in(x, &body, seq);
        let whole = run_json(params(1024), x, &body, seq, value_digest, io).expect("valid json");
        let chunked =
            run_json(params(data_bytes), x, &body, seq, value_digest, io).expect("valid json");

        prop_assert_eq!(whole, chunked);
        prop_assert_eq!(chunked[GLOBAL_DIGEST], value_digest);
    }
}

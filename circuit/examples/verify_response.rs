//! Example running every step over an encrypted JSON response and checking
//! the final accumulator against a manifest.

use std::time::Instant;

use circuit::{slot_name, CipherSuite, CircuitParams, Manifest, Session, StepKind, TlsRecord};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const MANIFEST: &str = r#"{
    "response": {
        "version": "HTTP/1.1",
        "status": "200",
        "message": "OK",
        "headers": {
            "Content-Type": ["application/json; charset=utf-8"]
        },
        "body": {
            "json": [
                {"type": "Object", "value": "data"},
                {"type": "Object", "value": "items"},
                {"type": "ArrayIndex", "value": 0},
                {"type": "Object", "value": "profile"},
                {"type": "Object", "value": "name"}
            ]
        }
    }
}"#;

fn main() {
    let body = r#"{"data":{"items":[{"data":"Artist","profile":{"name":"Taylor Swift"}}]}}"#;
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json; charset=utf-8\r\nContent-Length: {}\r\nCache-Control: no-store\r\n\r\n{body}",
        body.len()
    );

    let mut rng = StdRng::seed_from_u64(42);
    let suite = CipherSuite::ChaCha20Poly1305;
    let key: Vec<u8> = (0..suite.key_len()).map(|_| rng.random()).collect();
    let iv: [u8; 12] = rng.random();
    let record = TlsRecord::seal(suite, &key, iv, 0, response.as_bytes()).expect("seal");

    let params = CircuitParams::new(128, 5, 25).expect("params");
    let manifest = Manifest::from_json(MANIFEST).expect("manifest");
    let session = Session::new(params, manifest).expect("session");

    let start = Instant::now();
    let trace = session.run(&[record]).expect("run");
    let elapsed = start.elapsed();

    println!("cipher suite:           {suite}");
    println!("response bytes:         {}", response.len());
    println!("ciphertext digest:      {}", trace.commitments.ciphertext_digest);
    println!(
        "steps (auth/http/json): {}/{}/{}",
        trace.count(StepKind::Authentication),
        trace.count(StepKind::Http),
        trace.count(StepKind::Json)
    );
    println!(
        "extracted value:        {}",
        trace
            .value
            .as_deref()
            .map(String::from_utf8_lossy)
            .unwrap_or_default()
    );
    println!("witness generation:     {elapsed:?}");

    for (slot, value) in trace.step_out().as_slice().iter().enumerate() {
        println!("  [{slot:2}] {:<22} {value}", slot_name(slot));
    }

    match trace.verify() {
        Ok(()) => println!("verification: OK"),
        Err(err) => {
            eprintln!("verification failed: {err}");
            std::process::exit(1);
        }
    }
}

//! Literal end-to-end scenarios exercising both codecs at realistic scale.
//!
//! Smaller scenarios run under plain `cargo test`; the ones specified at
//! full scale (Scenario C's k = 10000) are `#[ignore]`d and meant for a
//! nightly/CI run with `cargo test -- --ignored`, mirroring how the PRNG's
//! exhaustive sample-count variants are handled.

use fountain_codes::degree::IdealSoliton;
use fountain_codes::lt::{DecodeMode, LtCodec};
use fountain_codes::rlf::RlfCodec;

fn repeated_pattern(byte_len: usize) -> Vec<u8> {
    const PATTERN: [u8; 4] = [0xDE, 0xAD, 0xBE, 0xEF];
    (0..byte_len).map(|i| PATTERN[i % PATTERN.len()]).collect()
}

/// Scenario A: LT batch decode, feeding every symbol before draining the
/// peeling queues (`DecodeMode::Deferred`), then a single explicit `decode`.
#[test]
fn scenario_a_lt_batch() {
    let input = repeated_pattern(16);
    let symbol_length = 2;
    let k = input.len() / symbol_length;
    assert_eq!(k, 8);

    let mut encoder = LtCodec::new(Box::new(IdealSoliton::new()));
    encoder.set_seed(100);
    encoder.set_input_data(&input);
    encoder.set_symbol_length(symbol_length).unwrap();

    let mut decoder = LtCodec::new(Box::new(IdealSoliton::new()));
    decoder.set_seed(100);
    decoder.set_input_data_size(input.len());
    decoder.set_symbol_length(symbol_length).unwrap();

    for n in 0..108 {
        let symbol = encoder.generate_symbol().unwrap();
        decoder.feed(&symbol, n, DecodeMode::Deferred);
    }

    assert!(decoder.decode());
    assert_eq!(decoder.decoded_buffer().as_deref(), Some(input.as_slice()));
}

/// Scenario B: RLF batch decode over a 1000-symbol input with ten extra
/// rows of slack.
#[test]
fn scenario_b_rlf_batch() {
    let input = repeated_pattern(2000);
    let symbol_length = 2;
    let k = input.len() / symbol_length;
    assert_eq!(k, 1000);

    let mut encoder = RlfCodec::new();
    encoder.set_seed(13);
    encoder.set_input_data(&input);
    encoder.set_symbol_length(symbol_length).unwrap();

    let mut decoder = RlfCodec::new();
    decoder.set_seed(13);
    decoder.set_input_data_size(input.len());
    decoder.set_symbol_length(symbol_length).unwrap();

    for n in 0..(k + 10) {
        let symbol = encoder.generate_symbol().unwrap();
        decoder.feed(&symbol, n);
    }

    assert!(decoder.decode(false));
    assert_eq!(decoder.decoded_buffer().as_deref(), Some(input.as_slice()));
}

/// Scenario C, scaled down: LT on-the-fly decoding, one symbol at a time,
/// stopping as soon as `feed` itself reports completion. Records overhead
/// relative to k the same way the full-scale scenario does.
#[test]
fn scenario_c_lt_on_the_fly_scaled() {
    let symbol_length = 2;
    let k = 500usize;
    let input = repeated_pattern(k * symbol_length);

    let mut overheads = Vec::new();
    for seed in 100u32..105 {
        let mut encoder = LtCodec::new(Box::new(IdealSoliton::new()));
        encoder.set_seed(seed);
        encoder.set_input_data(&input);
        encoder.set_symbol_length(symbol_length).unwrap();

        let mut decoder = LtCodec::new(Box::new(IdealSoliton::new()));
        decoder.set_seed(seed);
        decoder.set_input_data_size(input.len());
        decoder.set_symbol_length(symbol_length).unwrap();

        let mut fed = 0usize;
        loop {
            let symbol = encoder.generate_symbol().unwrap();
            let done = decoder.feed(&symbol, fed, DecodeMode::Eager);
            fed += 1;
            if done {
                break;
            }
            assert!(fed < k * 4, "runaway on-the-fly decode for seed {seed}");
        }
        overheads.push((fed - k) as f64 / k as f64);
        assert_eq!(
            decoder.decoded_buffer().as_deref(),
            Some(input.as_slice())
        );
    }

    let mean = overheads.iter().sum::<f64>() / overheads.len() as f64;
    assert!(mean.is_finite());
    assert!(mean < 0.3, "mean overhead {mean} too high");
}

/// Scenario C at the literal spec scale (k = 10000, seeds 100..109).
#[test]
#[ignore]
fn scenario_c_lt_on_the_fly_full_scale() {
    let symbol_length = 2;
    let k = 10_000usize;
    let input = repeated_pattern(k * symbol_length);

    let mut overheads = Vec::new();
    for seed in 100u32..110 {
        let mut encoder = LtCodec::new(Box::new(IdealSoliton::new()));
        encoder.set_seed(seed);
        encoder.set_input_data(&input);
        encoder.set_symbol_length(symbol_length).unwrap();

        let mut decoder = LtCodec::new(Box::new(IdealSoliton::new()));
        decoder.set_seed(seed);
        decoder.set_input_data_size(input.len());
        decoder.set_symbol_length(symbol_length).unwrap();

        let mut fed = 0usize;
        loop {
            let symbol = encoder.generate_symbol().unwrap();
            let done = decoder.feed(&symbol, fed, DecodeMode::Eager);
            fed += 1;
            if done {
                break;
            }
            assert!(fed < k * 4, "runaway on-the-fly decode for seed {seed}");
        }
        overheads.push((fed - k) as f64 / k as f64);
    }

    let mean = overheads.iter().sum::<f64>() / overheads.len() as f64;
    assert!(mean.is_finite());
    assert!(mean < 0.3, "mean overhead {mean} too high");
}

/// Scenario E: two independently constructed `LtCodec`s with the same
/// seed/k/distribution draw the same degree sequence and edge sets.
#[test]
fn scenario_e_degree_replay() {
    let symbol_length = 4;
    let k = 64;
    let input = repeated_pattern(k * symbol_length);

    let mut a = LtCodec::new(Box::new(IdealSoliton::new()));
    a.set_seed(55);
    a.set_input_data(&input);
    a.set_symbol_length(symbol_length).unwrap();

    let mut b = LtCodec::new(Box::new(IdealSoliton::new()));
    b.set_seed(55);
    b.set_input_data(&input);
    b.set_symbol_length(symbol_length).unwrap();

    for _ in 0..64 {
        let sym_a = a.generate_symbol().unwrap();
        let sym_b = b.generate_symbol().unwrap();
        assert_eq!(sym_a, sym_b);
        assert_eq!(a.symbol_degree(), b.symbol_degree());
    }
}

//! Property-based tests for decoder robustness
//!
//! Hostile or random cartridges must fail with typed errors, never panic,
//! and every decode must be deterministic.

use cart8::memory::RAW_CARTRIDGE_SIZE;
use cart8::stegano::CARRIER_BYTES;
use cart8::{codec, Cartridge, CARRIER_HEIGHT, CARRIER_WIDTH, LEGACY_MAGIC, MAX_SOURCE_BYTES, PXA_MAGIC};
use proptest::prelude::*;

fn embed(bytes: &[u8]) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(bytes.len() * 4);
    for &b in bytes {
        rgba.push(b & 3);
        rgba.push((b >> 2) & 3);
        rgba.push((b >> 4) & 3);
        rgba.push((b >> 6) & 3);
    }
    rgba
}

proptest! {
    #[test]
    fn prop_decode_never_panics_on_arbitrary_bytes(
        data in prop::collection::vec(any::<u8>(), 0..2048)
    ) {
        let _ = codec::decode(&data);
    }

    #[test]
    fn prop_decode_never_panics_behind_valid_signatures(
        magic in prop_oneof![Just(LEGACY_MAGIC), Just(PXA_MAGIC)],
        tail in prop::collection::vec(any::<u8>(), 0..2048)
    ) {
        let mut data = magic.to_vec();
        data.extend_from_slice(&tail);
        let _ = codec::decode(&data);
    }

    #[test]
    fn prop_decode_is_deterministic(
        data in prop::collection::vec(any::<u8>(), 0..512)
    ) {
        let first = codec::decode(&data);
        let second = codec::decode(&data);
        match (first, second) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            (Err(a), Err(b)) => prop_assert_eq!(a.to_string(), b.to_string()),
            _ => prop_assert!(false, "same input decoded to Ok and Err"),
        }
    }

    #[test]
    fn prop_pxa_respects_stated_output_length(
        expected in any::<u16>(),
        total in any::<u16>(),
        payload in prop::collection::vec(any::<u8>(), 0..512)
    ) {
        let mut data = PXA_MAGIC.to_vec();
        data.extend_from_slice(&expected.to_be_bytes());
        data.extend_from_slice(&total.to_be_bytes());
        data.extend_from_slice(&payload);

        if let Ok(out) = codec::decode(&data) {
            prop_assert!(out.len() <= (expected as usize).min(MAX_SOURCE_BYTES));
        }
    }

    #[test]
    fn prop_carrier_pipeline_never_panics(
        seed in any::<u8>(),
        magic in any::<[u8; 4]>(),
        payload in prop::collection::vec(any::<u8>(), 0..1024)
    ) {
        let mut stream = vec![seed; RAW_CARTRIDGE_SIZE];
        stream.extend_from_slice(&magic);
        stream.extend_from_slice(&payload);
        stream.resize(CARRIER_BYTES, 0);

        // Either a cartridge or a typed error; panics fail the case.
        let _ = Cartridge::from_rgba(&embed(&stream), CARRIER_WIDTH, CARRIER_HEIGHT);
    }

    #[test]
    fn prop_gfx_rows_round_trip(
        row in prop::collection::vec(any::<u8>(), 64)
    ) {
        let mut line = String::with_capacity(128);
        for byte in &row {
            line.push(std::char::from_digit((byte & 0xf) as u32, 16).unwrap());
            line.push(std::char::from_digit((byte >> 4) as u32, 16).unwrap());
        }

        let (memory, _) = cart8::text::parse(&format!("__gfx__\n{}\n", line)).unwrap();
        prop_assert_eq!(&memory.sprite_sheet()[..64], &row[..]);
    }

    #[test]
    fn prop_map_rows_round_trip(
        row in prop::collection::vec(any::<u8>(), 128)
    ) {
        let mut line = String::with_capacity(256);
        for byte in &row {
            line.push_str(&format!("{:02x}", byte));
        }

        let (memory, _) = cart8::text::parse(&format!("__map__\n{}\n", line)).unwrap();
        for (x, &sprite) in row.iter().enumerate() {
            prop_assert_eq!(memory.map_sprite(x, 0), sprite);
        }
    }

    #[test]
    fn prop_gff_rows_round_trip(
        row in prop::collection::vec(any::<u8>(), 128)
    ) {
        let mut line = String::with_capacity(256);
        for byte in &row {
            line.push_str(&format!("{:02x}", byte));
        }

        let (memory, _) = cart8::text::parse(&format!("__gff__\n{}\n", line)).unwrap();
        for (sprite, &flags) in row.iter().enumerate() {
            prop_assert_eq!(memory.sprite_flags(sprite), flags);
        }
    }

    #[test]
    fn prop_lua_lines_pass_through(
        lines in prop::collection::vec("[a-z0-9 =+().]{1,30}", 0..20)
    ) {
        let text = format!("__lua__\n{}\n", lines.join("\n"));
        let (_, source) = cart8::text::parse(&text).unwrap();

        let expected: String = lines.iter().map(|l| format!("{}\n", l)).collect();
        prop_assert_eq!(source, expected);
    }
}

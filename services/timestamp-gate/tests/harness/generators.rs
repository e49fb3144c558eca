// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Query-string generators for attack simulation.

/// Queries whose timestamp is `offset` seconds from `now`, padded with
/// unrelated parameters so the key lands in different positions.
pub fn generate_offset_queries(now: i64, offsets: &[i64]) -> Vec<String> {
    offsets
        .iter()
        .enumerate()
        .map(|(i, offset)| {
            let ts = now + offset;
            match i % 3 {
                0 => format!("timestamp={ts}"),
                1 => format!("a={i}&timestamp={ts}&b=x"),
                _ => format!("sig=abc&n={i}&timestamp={ts}"),
            }
        })
        .collect()
}

/// Replayed requests: captured at `now - age` for each age.
pub fn generate_replays(now: i64, ages: impl Iterator<Item = i64>) -> Vec<String> {
    let offsets: Vec<i64> = ages.map(|age| -age).collect();
    generate_offset_queries(now, &offsets)
}

/// Values that must never parse as a timestamp.
pub fn generate_malformed_values() -> Vec<&'static str> {
    vec![
        "",
        "abc",
        "-1",
        "+1000",
        " 1000",
        "1000 ",
        "1000%20",
        "10.5",
        "1e3",
        "0x3e8",
        "１０００", // full-width digits
        "99999999999999999999999999",
        "1000;1",
    ]
}

/// Queries that look like they carry a timestamp but do not.
pub fn generate_key_smuggling(now: i64) -> Vec<String> {
    vec![
        format!("timestamps={now}"),
        format!("Timestamp={now}"),
        format!("TIMESTAMP={now}"),
        format!("xtimestamp={now}"),
        format!("time_stamp={now}"),
        format!("timestamp%3D{now}"),
        format!("a=timestamp={now}"),
        "timestamp".to_string(),
        format!("{now}"),
        "&&&".to_string(),
        "=".to_string(),
        String::new(),
    ]
}

/// Raw byte inputs that are not valid UTF-8 or are truncated.
pub fn generate_hostile_bytes() -> Vec<Vec<u8>> {
    vec![
        b"timestamp=\xff\xfe".to_vec(),
        b"\xff&timestamp".to_vec(),
        b"timestamp=1000\x00".to_vec(),
        b"timestam".to_vec(),
        b"t".to_vec(),
        b"&".to_vec(),
        b"timestamp=&".to_vec(),
        vec![b'&'; 4096],
        {
            let mut long = b"timestamp=".to_vec();
            long.extend(std::iter::repeat(b'9').take(10_000));
            long
        },
    ]
}
